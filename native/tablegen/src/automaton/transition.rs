//! Labeled edges between named states.

use crate::automaton::error::{AutomatonError, Result};
use crate::automaton::symbol::{EPSILON, EPSILON_GLYPH, display_symbol};
use std::fmt;
use std::str::FromStr;

/// An edge on `symbol` to the state named `destination`.
///
/// The empty symbol is an epsilon edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transition {
    pub symbol: String,
    pub destination: String,
}

impl Transition {
    pub fn new(symbol: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "=({})=> {}", display_symbol(&self.symbol), self.destination)
    }
}

impl FromStr for Transition {
    type Err = AutomatonError;

    /// Parse the `=(symbol)=> destination` form produced by `Display`.
    ///
    /// The destination is everything after the last `)=> ` and is kept
    /// verbatim, surrounding whitespace included.
    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix("=(")
            .ok_or_else(|| AutomatonError::TransitionFormat(format!("{s:?}: expected \"=(\" at start")))?;
        let (symbol, destination) = rest.rsplit_once(")=> ").ok_or_else(|| {
            AutomatonError::TransitionFormat(format!("{s:?}: expected \")=> \" before destination"))
        })?;

        if destination.is_empty() {
            return Err(AutomatonError::TransitionFormat(format!("{s:?}: empty destination")));
        }

        let symbol = if symbol == EPSILON_GLYPH { EPSILON } else { symbol };
        Ok(Self::new(symbol, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(Transition::new("a", "B").to_string(), "=(a)=> B");
        assert_eq!(Transition::new("", "B").to_string(), "=(ε)=> B");
    }

    #[test]
    fn test_parse_round_trip() {
        for t in [
            Transition::new("a", "B"),
            Transition::new("", "{A, B}"),
            Transition::new("id", "12"),
            Transition::new("(", "paren"),
            Transition::new("a b", "C"),
            Transition::new("a", " B"),
            Transition::new("a", "B "),
            Transition::new("x)=> y", "B"),
        ] {
            assert_eq!(t.to_string().parse::<Transition>().unwrap(), t);
        }
    }

    #[test]
    fn test_parse_epsilon_glyph() {
        let t: Transition = "=(ε)=> Q".parse().unwrap();
        assert_eq!(t.symbol, "");
        assert_eq!(t.destination, "Q");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("(a)=> B".parse::<Transition>().is_err());
        assert!("=(a)> B".parse::<Transition>().is_err());
        assert!("=(a)=>B".parse::<Transition>().is_err());
        assert!(" =(a)=> B".parse::<Transition>().is_err());
        assert!(matches!(
            "=(a)=> ".parse::<Transition>(),
            Err(AutomatonError::TransitionFormat(_))
        ));
    }
}
