//! Human-readable dumps of automata.

use std::fmt;

/// Options controlling [`DFA::render_with`](crate::automaton::DFA::render_with)
/// and [`NFA::render_with`](crate::automaton::NFA::render_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Append each state's payload (its `Debug` form) after the state.
    pub show_values: bool,
}

/// Order names numerically when every one of them is an integer, and
/// lexicographically otherwise.
pub(crate) fn render_order(mut names: Vec<String>) -> Vec<String> {
    let numeric: Option<Vec<(i64, String)>> = names
        .iter()
        .map(|n| n.parse::<i64>().ok().map(|v| (v, n.clone())))
        .collect();

    match numeric {
        Some(mut keyed) => {
            keyed.sort();
            keyed.into_iter().map(|(_, n)| n).collect()
        }
        None => {
            names.sort();
            names
        }
    }
}

/// Lay out an automaton header followed by one state per line.
pub(crate) fn render_states<S, E>(
    kind: &str,
    start: &str,
    states: impl IntoIterator<Item = (S, E)>,
    options: RenderOptions,
) -> String
where
    S: fmt::Display,
    E: fmt::Debug,
{
    let mut out = format!("<{kind} start={start}\n");
    for (state, value) in states {
        let line = if options.show_values {
            format!("    {state} value={value:?}\n")
        } else {
            format!("    {state}\n")
        };
        out.push_str(&line);
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_numeric_order() {
        assert_eq!(
            render_order(names(&["10", "2", "0", "1"])),
            names(&["0", "1", "2", "10"])
        );
    }

    #[test]
    fn test_mixed_falls_back_to_lexicographic() {
        assert_eq!(
            render_order(names(&["10", "b", "2", "a"])),
            names(&["10", "2", "a", "b"])
        );
    }

    #[test]
    fn test_render_states() {
        let out = render_states("DFA", "0", [("(0)", 1u8)], RenderOptions { show_values: true });
        assert_eq!(out, "<DFA start=0\n    (0) value=1\n>");
    }

    #[test]
    fn test_render_states_without_values() {
        let out = render_states("NFA", "A", [("(A)", ()), ("((B))", ())], RenderOptions::default());
        assert_eq!(out, "<NFA start=A\n    (A)\n    ((B))\n>");

        let empty = render_states("DFA", "", Vec::<(&str, ())>::new(), RenderOptions::default());
        assert_eq!(empty, "<DFA start=\n>");
    }
}
