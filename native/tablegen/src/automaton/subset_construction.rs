//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::automaton::dfa::DFA;
use crate::automaton::error::{AutomatonError, Result};
use crate::automaton::nfa::NFA;
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::BTreeSet;

/// Limits applied by [`nfa_to_dfa_with_config`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetConstructionConfig {
    /// Maximum number of DFA states (0 = unlimited)
    pub max_dfa_states: usize,
}

/// Name of the DFA state standing for a set of NFA states, e.g. `{A, B, C}`.
///
/// Members are sorted, so equal sets always get equal names.
pub fn canonical_set_name<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let members = names
        .into_iter()
        .map(|n| n.as_ref().to_string())
        .sorted()
        .join(", ");
    format!("{{{members}}}")
}

/// Convert an epsilon-NFA to a DFA using the powerset construction.
///
/// Each DFA state's payload is `reduce` folded over the payloads of its
/// member NFA states, starting from `E::default()`. A DFA state accepts if
/// any member accepts. An NFA without a valid start state yields an empty
/// DFA.
pub fn nfa_to_dfa<E, R>(nfa: &NFA<E>, reduce: R) -> DFA<E>
where
    E: Default,
    R: Fn(E, &E) -> E,
{
    match construct(nfa, reduce, usize::MAX) {
        Ok(dfa) => dfa,
        Err(err) => unreachable!("unbounded subset construction failed: {err}"),
    }
}

/// [`nfa_to_dfa`] with limits. Fails once the DFA would grow past
/// `config.max_dfa_states`.
pub fn nfa_to_dfa_with_config<E, R>(
    nfa: &NFA<E>,
    reduce: R,
    config: &SubsetConstructionConfig,
) -> Result<DFA<E>>
where
    E: Default,
    R: Fn(E, &E) -> E,
{
    let max = match config.max_dfa_states {
        0 => usize::MAX,
        n => n,
    };
    construct(nfa, reduce, max)
}

fn construct<E, R>(nfa: &NFA<E>, reduce: R, max_states: usize) -> Result<DFA<E>>
where
    E: Default,
    R: Fn(E, &E) -> E,
{
    let mut dfa = DFA::new();

    // Initial DFA state is the epsilon closure of the NFA start state
    let initial_set = nfa.epsilon_closure(nfa.start());
    if initial_set.is_empty() {
        return Ok(dfa);
    }

    let symbols = nfa.input_symbols();
    log::debug!(
        "subset construction over {} NFA states and {} symbols",
        nfa.len(),
        symbols.len()
    );

    // Every DFA state discovered so far, by canonical name
    let mut discovered: IndexMap<String, BTreeSet<String>> = IndexMap::new();
    // Names of discovered but unprocessed states
    let mut unmarked: BTreeSet<String> = BTreeSet::new();

    let initial_name = canonical_set_name(&initial_set);
    discover(nfa, &mut dfa, &mut discovered, &mut unmarked, &initial_name, initial_set, max_states)?;
    dfa.set_start(&initial_name);

    while let Some(current_name) = unmarked.pop_first() {
        let current_set = &discovered[&current_name];
        log::trace!("processing DFA state {current_name}");

        let value = current_set
            .iter()
            .fold(E::default(), |acc, s| reduce(acc, nfa.get_value(s)));

        let mut moves = Vec::new();
        for symbol in &symbols {
            let next_set = nfa.epsilon_closure_of_set(&nfa.move_set(current_set, symbol));
            if next_set.is_empty() {
                // No transition on this symbol
                continue;
            }
            moves.push((symbol, next_set));
        }

        dfa.set_value(&current_name, value);
        for (symbol, next_set) in moves {
            let next_name = canonical_set_name(&next_set);
            if !discovered.contains_key(&next_name) {
                discover(nfa, &mut dfa, &mut discovered, &mut unmarked, &next_name, next_set, max_states)?;
            }
            dfa.add_transition(&current_name, symbol, &next_name);
        }
    }

    log::debug!("subset construction produced {} DFA states", dfa.len());
    Ok(dfa)
}

/// Register a newly seen subset as an unmarked DFA state.
fn discover<E: Default>(
    nfa: &NFA<E>,
    dfa: &mut DFA<E>,
    discovered: &mut IndexMap<String, BTreeSet<String>>,
    unmarked: &mut BTreeSet<String>,
    name: &str,
    set: BTreeSet<String>,
    max_states: usize,
) -> Result<()> {
    if dfa.len() >= max_states {
        return Err(AutomatonError::StateLimitExceeded {
            states: dfa.len() + 1,
            max: max_states,
        });
    }

    let accepting = set.iter().any(|s| nfa.is_accepting(s));
    dfa.add_state(name, accepting);
    discovered.insert(name.to_string(), set);
    unmarked.insert(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::nfa::tests::dragon_nfa;

    const START: &str = "{A, B, C, D, H, I}";
    const AFTER_0: &str = "{A, B, C, D, F, G, H, I}";
    const AFTER_1: &str = "{A, B, C, D, E, G, H, I, J}";

    #[test]
    fn test_canonical_set_name() {
        assert_eq!(canonical_set_name(["C", "A", "B"]), "{A, B, C}");
        assert_eq!(canonical_set_name(Vec::<String>::new()), "{}");
    }

    #[test]
    fn test_subset_construction_dragon() {
        let dfa = nfa_to_dfa(&dragon_nfa(), |acc, _| acc);

        assert_eq!(dfa.len(), 3);
        assert_eq!(dfa.start(), START);
        assert_eq!(dfa.states(), vec![AFTER_1, AFTER_0, START]);

        for state in [START, AFTER_0, AFTER_1] {
            assert_eq!(dfa.next(state, "0"), Some(AFTER_0), "{state} on 0");
            assert_eq!(dfa.next(state, "1"), Some(AFTER_1), "{state} on 1");
        }
        assert!(dfa.is_accepting(AFTER_1));
        assert!(!dfa.is_accepting(START));
        assert!(!dfa.is_accepting(AFTER_0));
        assert_eq!(dfa.validate(), Ok(()));
    }

    #[test]
    fn test_payload_reduction() {
        let mut nfa: NFA<Vec<String>> = NFA::new();
        nfa.add_state("0", false);
        nfa.add_state("1", false);
        nfa.add_state("2", true);
        nfa.set_start("0");
        nfa.add_transition("0", "", "1");
        nfa.add_transition("1", "a", "2");
        for name in ["0", "1", "2"] {
            nfa.set_value(name, vec![format!("item{name}")]);
        }

        let dfa = nfa_to_dfa(&nfa, |mut acc, v| {
            acc.extend(v.iter().cloned());
            acc
        });

        assert_eq!(dfa.start(), "{0, 1}");
        assert_eq!(dfa.get_value("{0, 1}"), &vec!["item0", "item1"]);
        assert_eq!(dfa.get_value("{2}"), &vec!["item2"]);
        assert_eq!(dfa.next("{0, 1}", "a"), Some("{2}"));
        assert!(dfa.get_transitions("{2}").is_empty());
    }

    #[test]
    fn test_empty_nfa() {
        let nfa: NFA<()> = NFA::new();
        let dfa = nfa_to_dfa(&nfa, |acc, _| acc);
        assert!(dfa.is_empty());
        assert_eq!(dfa.start(), "");
    }

    #[test]
    fn test_state_limit() {
        let config = SubsetConstructionConfig { max_dfa_states: 2 };
        let err = nfa_to_dfa_with_config(&dragon_nfa(), |acc, _| acc, &config).unwrap_err();
        assert_eq!(err, AutomatonError::StateLimitExceeded { states: 3, max: 2 });

        let unlimited = SubsetConstructionConfig::default();
        let dfa = nfa_to_dfa_with_config(&dragon_nfa(), |acc, _| acc, &unlimited).unwrap();
        assert_eq!(dfa.len(), 3);
    }
}
