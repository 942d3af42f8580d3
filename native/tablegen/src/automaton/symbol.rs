//! Input symbols for automaton transitions.

/// The empty symbol. Transitions on it are epsilon moves and only carry
/// that meaning inside an NFA.
pub const EPSILON: &str = "";

/// Glyph used when an epsilon symbol is rendered as text.
pub const EPSILON_GLYPH: &str = "ε";

/// Check if a symbol is an epsilon transition.
#[inline]
pub fn is_epsilon(symbol: &str) -> bool {
    symbol.is_empty()
}

/// Render a symbol for display, substituting the epsilon glyph for the
/// empty symbol.
#[inline]
pub fn display_symbol(symbol: &str) -> &str {
    if is_epsilon(symbol) {
        EPSILON_GLYPH
    } else {
        symbol
    }
}
