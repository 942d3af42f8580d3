//! Deterministic finite automaton with named states and attached payloads.

use crate::automaton::arena::StateArena;
use crate::automaton::error::{AutomatonError, InvariantViolation, Result, violated};
use crate::automaton::render::{RenderOptions, render_order, render_states};
use crate::automaton::state::DfaState;
use crate::automaton::transition::Transition;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A Deterministic Finite Automaton.
///
/// Every state carries a payload of type `E` that the automaton stores but
/// never interprets. `Clone` produces a fully independent deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DFA<E> {
    /// Name of the start state; empty until set.
    pub(crate) start: String,
    /// Ordering stamp for the next created state.
    pub(crate) order: u64,
    pub(crate) states: StateArena<DfaState<E>>,
}

impl<E> Default for DFA<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> DFA<E> {
    /// Create a new empty DFA.
    pub fn new() -> Self {
        Self {
            start: String::new(),
            order: 0,
            states: StateArena::default(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// # Panics
    ///
    /// If `name` is not a state of this automaton.
    pub fn set_start(&mut self, name: &str) {
        if !self.states.contains(name) {
            violated(InvariantViolation::UnknownState(name.to_string()));
        }
        self.start = name.to_string();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains(name)
    }

    pub fn state(&self, name: &str) -> Option<&DfaState<E>> {
        self.states.get(name)
    }

    /// Add a state. Does nothing if a state of that name already exists.
    pub fn add_state(&mut self, name: &str, accepting: bool)
    where
        E: Default,
    {
        if self.states.contains(name) {
            return;
        }
        self.states
            .insert(DfaState::new(name.to_string(), self.order, accepting));
        self.order += 1;
    }

    /// # Panics
    ///
    /// If `name` is not a state of this automaton.
    pub fn set_value(&mut self, name: &str, value: E) {
        self.existing_mut(name).value = value;
    }

    /// # Panics
    ///
    /// If `name` is not a state of this automaton.
    pub fn get_value(&self, name: &str) -> &E {
        &self.existing(name).value
    }

    /// # Panics
    ///
    /// If `name` is not a state of this automaton.
    pub fn set_accepting(&mut self, name: &str, accepting: bool) {
        self.existing_mut(name).accepting = accepting;
    }

    /// Whether `name` is an accepting state; `false` for unknown states.
    pub fn is_accepting(&self, name: &str) -> bool {
        self.states.get(name).is_some_and(|s| s.accepting)
    }

    /// Add a transition, replacing any existing transition from `from` on
    /// `symbol`.
    ///
    /// # Panics
    ///
    /// If either `from` or `to` is not a state of this automaton.
    pub fn add_transition(&mut self, from: &str, symbol: &str, to: &str) {
        if !self.states.contains(to) {
            violated(InvariantViolation::UnknownState(to.to_string()));
        }
        let state = self.existing_mut(from);
        let transition = Transition::new(symbol, to);
        if state.transitions.get(symbol) == Some(&transition) {
            return;
        }
        state.transitions.insert(symbol.to_string(), transition);
    }

    /// Remove the transition from `from` on `symbol`, only if it leads to `to`.
    pub fn remove_transition(&mut self, from: &str, symbol: &str, to: &str) {
        let Some(state) = self.states.get_mut(from) else {
            return;
        };
        if state
            .transitions
            .get(symbol)
            .is_some_and(|t| t.destination == to)
        {
            state.transitions.remove(symbol);
        }
    }

    /// Remove a state. Does nothing if the state does not exist.
    ///
    /// # Panics
    ///
    /// If any transition in the automaton still targets `name`.
    pub fn remove_state(&mut self, name: &str) {
        if !self.states.contains(name) {
            return;
        }
        for (_, state) in self.states.iter() {
            if state.transitions.values().any(|t| t.destination == name) {
                violated(InvariantViolation::StillReferenced {
                    state: name.to_string(),
                    from: state.name.clone(),
                });
            }
        }
        self.states.remove(name);
    }

    /// The state reached from `from` on `symbol`, if any.
    pub fn next(&self, from: &str, symbol: &str) -> Option<&str> {
        self.states
            .get(from)?
            .transitions
            .get(symbol)
            .map(|t| t.destination.as_str())
    }

    /// `(symbol, destination)` pairs leaving `from`, sorted by symbol.
    pub fn get_transitions(&self, from: &str) -> Vec<(String, String)> {
        self.states
            .get(from)
            .map(|s| {
                s.transitions()
                    .map(|t| (t.symbol.clone(), t.destination.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All state names, sorted.
    pub fn states(&self) -> Vec<String> {
        self.states.names()
    }

    /// Check reachability, dangling transitions and the start state, and
    /// report every problem found at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        let mut referenced: HashSet<&str> = HashSet::new();

        for name in self.states() {
            let Some(state) = self.states.get(&name) else {
                continue;
            };
            for t in state.transitions() {
                if !self.states.contains(&t.destination) {
                    problems.push(format!(
                        "state {name:?} has a transition on {:?} to non-existent state {:?}",
                        t.symbol, t.destination
                    ));
                } else if t.destination != name {
                    referenced.insert(t.destination.as_str());
                }
            }
        }

        for name in self.states() {
            if name != self.start && !referenced.contains(name.as_str()) {
                problems.push(format!("state {name:?} is unreachable"));
            }
        }

        if !self.states.contains(&self.start) {
            problems.push(format!("start state {:?} does not exist", self.start));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AutomatonError::Validation(problems))
        }
    }

    /// Rename every state to `"0"`, `"1"`, ... with the start state as `"0"`
    /// and the rest in creation order.
    ///
    /// # Panics
    ///
    /// If no start state is set.
    pub fn number_states(&mut self)
    where
        E: Clone,
    {
        if !self.states.contains(&self.start) {
            violated(InvariantViolation::NoStartState);
        }

        let numbered = self.renumbered();
        log::debug!("numbered {} DFA states", numbered.len());
        *self = numbered;
    }

    fn renumbered(&self) -> DFA<E>
    where
        E: Clone,
    {
        let mut ordered: Vec<&DfaState<E>> = self.states.iter().map(|(_, s)| s).collect();
        ordered.sort_by_key(|s| (s.name != self.start, s.ordering));

        let renames: HashMap<&str, String> = ordered
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.as_str(), i.to_string()))
            .collect();

        let mut numbered = DFA::new();
        for state in &ordered {
            let name = renames[state.name.as_str()].clone();
            let transitions = state
                .transitions
                .iter()
                .map(|(symbol, t)| {
                    let destination = renames
                        .get(t.destination.as_str())
                        .cloned()
                        .unwrap_or_else(|| t.destination.clone());
                    (symbol.clone(), Transition::new(symbol.clone(), destination))
                })
                .collect();
            numbered.states.insert(DfaState {
                name,
                ordering: numbered.order,
                value: state.value.clone(),
                accepting: state.accepting,
                transitions,
            });
            numbered.order += 1;
        }
        numbered.start = "0".to_string();
        numbered
    }

    /// States in display order.
    fn display_order(&self) -> impl Iterator<Item = &DfaState<E>> + '_ {
        render_order(self.states())
            .into_iter()
            .filter_map(move |name| self.states.get(&name))
    }

    pub fn render(&self) -> String {
        render_states(
            "DFA",
            &self.start,
            self.display_order().map(|s| (s, ())),
            RenderOptions::default(),
        )
    }

    pub fn render_with_values(&self) -> String
    where
        E: fmt::Debug,
    {
        self.render_with(RenderOptions { show_values: true })
    }

    pub fn render_with(&self, options: RenderOptions) -> String
    where
        E: fmt::Debug,
    {
        render_states(
            "DFA",
            &self.start,
            self.display_order().map(|s| (s, &s.value)),
            options,
        )
    }

    fn existing(&self, name: &str) -> &DfaState<E> {
        match self.states.get(name) {
            Some(state) => state,
            None => violated(InvariantViolation::UnknownState(name.to_string())),
        }
    }

    fn existing_mut(&mut self, name: &str) -> &mut DfaState<E> {
        match self.states.get_mut(name) {
            Some(state) => state,
            None => violated(InvariantViolation::UnknownState(name.to_string())),
        }
    }
}

impl<E> fmt::Display for DFA<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> DFA<u32> {
        let mut dfa = DFA::new();
        dfa.add_state("A", false);
        dfa.add_state("B", false);
        dfa.add_state("C", true);
        dfa.set_start("A");
        dfa.add_transition("A", "x", "B");
        dfa.add_transition("B", "y", "C");
        dfa
    }

    #[test]
    fn test_add_state_is_idempotent() {
        let mut dfa = abc();
        dfa.set_value("A", 7);
        dfa.add_state("A", true);
        assert_eq!(dfa.len(), 3);
        assert_eq!(*dfa.get_value("A"), 7);
        assert!(!dfa.is_accepting("A"));
        assert_eq!(dfa.state("C").map(|s| s.ordering()), Some(2));
    }

    #[test]
    fn test_last_transition_wins() {
        let mut dfa = abc();
        dfa.add_transition("A", "x", "C");
        assert_eq!(dfa.next("A", "x"), Some("C"));
        assert_eq!(dfa.get_transitions("A"), vec![("x".to_string(), "C".to_string())]);
    }

    #[test]
    fn test_next_missing() {
        let dfa = abc();
        assert_eq!(dfa.next("A", "y"), None);
        assert_eq!(dfa.next("Z", "x"), None);
        assert!(dfa.get_transitions("Z").is_empty());
    }

    #[test]
    fn test_remove_transition_requires_exact_triple() {
        let mut dfa = abc();
        dfa.remove_transition("A", "x", "C");
        assert_eq!(dfa.next("A", "x"), Some("B"));
        dfa.remove_transition("A", "x", "B");
        assert_eq!(dfa.next("A", "x"), None);
        dfa.remove_transition("Z", "x", "B");
    }

    #[test]
    fn test_remove_state() {
        let mut dfa = abc();
        dfa.remove_transition("B", "y", "C");
        dfa.remove_state("C");
        dfa.remove_state("C");
        assert_eq!(dfa.states(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    #[should_panic(expected = "still the target")]
    fn test_remove_referenced_state_panics() {
        let mut dfa = abc();
        dfa.remove_state("C");
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_transition_to_unknown_state_panics() {
        let mut dfa = abc();
        dfa.add_transition("A", "z", "Q");
    }

    #[test]
    #[should_panic(expected = "state \"Q\" does not exist")]
    fn test_transition_from_unknown_state_panics() {
        let mut dfa = abc();
        dfa.add_transition("Q", "a", "A");
    }

    #[test]
    #[should_panic(expected = "state \"Q\" does not exist")]
    fn test_set_value_unknown_state_panics() {
        let mut dfa = abc();
        dfa.set_value("Q", 7);
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_get_value_unknown_state_panics() {
        let dfa = abc();
        dfa.get_value("Q");
    }

    #[test]
    fn test_states_sorted() {
        let mut dfa: DFA<()> = DFA::new();
        for name in ["q", "b", "z", "a"] {
            dfa.add_state(name, false);
        }
        assert_eq!(dfa.states(), vec!["a", "b", "q", "z"]);
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(abc().validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut dfa = abc();
        dfa.add_state("D", false);
        dfa.add_transition("D", "w", "D");
        // dangling edges can only come from decoding
        dfa.states
            .get_mut("C")
            .unwrap()
            .transitions
            .insert("z".into(), Transition::new("z", "GONE"));

        let err = dfa.validate().unwrap_err().to_string();
        assert!(err.contains("\"D\" is unreachable"), "{err}");
        assert!(err.contains("non-existent state \"GONE\""), "{err}");
        assert_eq!(err.lines().count(), 2);
    }

    #[test]
    fn test_validate_missing_start() {
        let dfa: DFA<()> = DFA::new();
        let err = dfa.validate().unwrap_err().to_string();
        assert!(err.contains("start state \"\" does not exist"));
    }

    #[test]
    fn test_number_states() {
        let mut dfa: DFA<u32> = DFA::new();
        dfa.add_state("m", false);
        dfa.add_state("s", false);
        dfa.add_state("a", true);
        dfa.set_start("s");
        dfa.add_transition("s", "x", "a");
        dfa.add_transition("a", "y", "m");
        dfa.set_value("m", 5);

        dfa.number_states();
        assert_eq!(dfa.start(), "0");
        assert_eq!(dfa.states(), vec!["0", "1", "2"]);
        assert_eq!(dfa.next("0", "x"), Some("2"));
        assert_eq!(dfa.next("2", "y"), Some("1"));
        assert_eq!(*dfa.get_value("1"), 5);
        assert!(dfa.is_accepting("2"));

        let once = dfa.clone();
        dfa.number_states();
        assert_eq!(dfa, once);
    }

    #[test]
    #[should_panic(expected = "no start state")]
    fn test_number_states_without_start_panics() {
        let mut dfa: DFA<()> = DFA::new();
        dfa.add_state("A", false);
        dfa.number_states();
    }

    #[test]
    fn test_clone_is_independent() {
        let original = abc();
        let mut copy = original.clone();
        copy.add_transition("A", "x", "C");
        copy.set_value("B", 9);
        assert_eq!(original.next("A", "x"), Some("B"));
        assert_eq!(*original.get_value("B"), 0);
    }

    #[test]
    fn test_render() {
        let mut dfa: DFA<u32> = DFA::new();
        for name in ["10", "2", "1"] {
            dfa.add_state(name, name == "10");
        }
        dfa.set_start("1");
        dfa.add_transition("1", "a", "2");
        dfa.add_transition("2", "b", "10");
        assert_eq!(
            dfa.render(),
            "<DFA start=1\n    (1 =(a)=> 2)\n    (2 =(b)=> 10)\n    ((10))\n>"
        );
        assert!(dfa.render_with_values().contains("((10)) value=0"));
    }
}
