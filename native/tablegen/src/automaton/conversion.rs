//! Structural conversions between NFA and DFA without subset construction.

use crate::automaton::arena::StateArena;
use crate::automaton::dfa::DFA;
use crate::automaton::error::{AutomatonError, Result};
use crate::automaton::nfa::NFA;
use crate::automaton::state::{DfaState, NfaState};
use itertools::Itertools;
use std::collections::HashMap;

/// Copy an NFA that has no real nondeterminism into a DFA, keeping state
/// names, orderings, payloads and the start state.
///
/// The empty symbol is copied as an ordinary symbol; callers must not pass
/// automata with true epsilon moves. Repeated transitions on one symbol are
/// accepted as long as they all lead to the same state.
pub fn deterministic_nfa_to_dfa<E: Clone>(nfa: &NFA<E>) -> Result<DFA<E>> {
    let mut states = StateArena::default();

    for name in nfa.states() {
        let Some(state) = nfa.states.get(&name) else {
            continue;
        };

        let mut transitions = HashMap::new();
        for (symbol, candidates) in state.transitions.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            let Some(first) = candidates.first() else {
                continue;
            };
            if candidates.iter().any(|t| t.destination != first.destination) {
                return Err(AutomatonError::NonDeterministic {
                    state: name.clone(),
                    symbol: symbol.clone(),
                });
            }
            if first.destination.is_empty() {
                return Err(AutomatonError::EmptyDestination {
                    state: name.clone(),
                    symbol: symbol.clone(),
                });
            }
            transitions.insert(symbol.clone(), first.clone());
        }

        states.insert(DfaState {
            name: state.name.clone(),
            ordering: state.ordering,
            value: state.value.clone(),
            accepting: state.accepting,
            transitions,
        });
    }

    Ok(DFA {
        start: nfa.start.clone(),
        order: nfa.order,
        states,
    })
}

impl<E: Clone> DFA<E> {
    /// The same automaton as an NFA with one-element transition lists.
    pub fn to_nfa(&self) -> NFA<E> {
        let mut states = StateArena::default();
        for (_, state) in self.states.iter() {
            states.insert(NfaState {
                name: state.name.clone(),
                ordering: state.ordering,
                value: state.value.clone(),
                accepting: state.accepting,
                transitions: state
                    .transitions
                    .iter()
                    .map(|(symbol, t)| (symbol.clone(), vec![t.clone()]))
                    .collect(),
            });
        }

        NFA {
            start: self.start.clone(),
            order: self.order,
            states,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::transition::Transition;

    fn line() -> NFA<u8> {
        let mut nfa = NFA::new();
        nfa.add_state("a", false);
        nfa.add_state("b", false);
        nfa.add_state("c", true);
        nfa.set_start("a");
        nfa.add_transition("a", "x", "b");
        nfa.add_transition("a", "x", "b");
        nfa.add_transition("b", "y", "c");
        nfa.set_value("c", 4);
        nfa
    }

    #[test]
    fn test_deterministic_copy() {
        let dfa = deterministic_nfa_to_dfa(&line()).unwrap();
        assert_eq!(dfa.start(), "a");
        assert_eq!(dfa.states(), vec!["a", "b", "c"]);
        assert_eq!(dfa.next("a", "x"), Some("b"));
        assert_eq!(dfa.next("b", "y"), Some("c"));
        assert!(dfa.is_accepting("c"));
        assert_eq!(*dfa.get_value("c"), 4);
        assert_eq!(dfa.state("c").map(|s| s.ordering()), Some(2));
    }

    #[test]
    fn test_conflicting_transitions_fail() {
        let mut nfa = line();
        nfa.add_transition("a", "x", "c");
        assert_eq!(
            deterministic_nfa_to_dfa(&nfa),
            Err(AutomatonError::NonDeterministic {
                state: "a".into(),
                symbol: "x".into(),
            })
        );
    }

    #[test]
    fn test_empty_destination_fails() {
        let mut nfa = line();
        // only reachable by editing the transition table directly
        let state: &mut NfaState<u8> = nfa.existing_mut("b");
        state
            .transitions
            .insert("z".into(), vec![Transition::new("z", "")]);
        let err = deterministic_nfa_to_dfa(&nfa).unwrap_err();
        assert!(matches!(err, AutomatonError::EmptyDestination { ref state, .. } if state == "b"));
    }

    #[test]
    fn test_epsilon_is_an_ordinary_symbol() {
        let mut nfa = line();
        nfa.add_transition("c", "", "a");
        let dfa = deterministic_nfa_to_dfa(&nfa).unwrap();
        assert_eq!(dfa.next("c", ""), Some("a"));
    }

    #[test]
    fn test_to_nfa_round_trip() {
        let dfa = deterministic_nfa_to_dfa(&line()).unwrap();
        let nfa = dfa.to_nfa();
        assert_eq!(nfa.next_set("a", "x"), vec!["b"]);
        assert_eq!(deterministic_nfa_to_dfa(&nfa), Ok(dfa));
    }
}
