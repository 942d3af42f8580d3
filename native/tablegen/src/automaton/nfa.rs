//! Nondeterministic finite automaton with epsilon moves.

use crate::automaton::arena::StateArena;
use crate::automaton::error::{AutomatonError, InvariantViolation, Result, violated};
use crate::automaton::render::{RenderOptions, render_order, render_states};
use crate::automaton::state::{NfaState, StateId, StateSet};
use crate::automaton::symbol::{EPSILON, is_epsilon};
use crate::automaton::transition::Transition;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Prefix given to the left-hand automaton's states by [`NFA::join`].
pub const JOIN_LEFT_PREFIX: &str = "1:";
/// Prefix given to the right-hand automaton's states by [`NFA::join`].
pub const JOIN_RIGHT_PREFIX: &str = "2:";

/// A `(from, symbol, to)` edge given by state names.
pub type Edge<'a> = (&'a str, &'a str, &'a str);

/// A Non-deterministic Finite Automaton.
///
/// Each symbol of a state maps to a list of transitions; the empty symbol
/// is an epsilon move. `Clone` produces a fully independent deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NFA<E> {
    pub(crate) start: String,
    pub(crate) order: u64,
    pub(crate) states: StateArena<NfaState<E>>,
}

impl<E> Default for NFA<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> NFA<E> {
    /// Create a new empty NFA.
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

    pub fn state(&self, name: &str) -> Option<&NfaState<E>> {
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
            .insert(NfaState::new(name.to_string(), self.order, accepting));
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
        match self.states.get(name) {
            Some(state) => &state.value,
            None => violated(InvariantViolation::UnknownState(name.to_string())),
        }
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

    /// Append a transition from `from` on `symbol` to `to`. Use [`EPSILON`]
    /// for an epsilon move.
    ///
    /// # Panics
    ///
    /// If either `from` or `to` is not a state of this automaton.
    pub fn add_transition(&mut self, from: &str, symbol: &str, to: &str) {
        if !self.states.contains(to) {
            violated(InvariantViolation::UnknownState(to.to_string()));
        }
        self.existing_mut(from)
            .transitions
            .entry(symbol.to_string())
            .or_default()
            .push(Transition::new(symbol, to));
    }

    /// Remove the first transition from `from` on `symbol` to `to`, if any.
    pub fn remove_transition(&mut self, from: &str, symbol: &str, to: &str) {
        let Some(state) = self.states.get_mut(from) else {
            return;
        };
        let Some(transitions) = state.transitions.get_mut(symbol) else {
            return;
        };
        if let Some(pos) = transitions.iter().position(|t| t.destination == to) {
            transitions.remove(pos);
        }
        if transitions.is_empty() {
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
            if state.transitions().any(|t| t.destination == name) {
                violated(InvariantViolation::StillReferenced {
                    state: name.to_string(),
                    from: state.name.clone(),
                });
            }
        }
        self.states.remove(name);
    }

    /// Destinations of every transition from `from` on `symbol`, in the
    /// order they were added.
    pub fn next_set(&self, from: &str, symbol: &str) -> Vec<String> {
        self.states
            .get(from)
            .and_then(|s| s.transitions.get(symbol))
            .map(|ts| ts.iter().map(|t| t.destination.clone()).collect())
            .unwrap_or_default()
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

    /// Names of accepting states, sorted.
    pub fn accepting_states(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .states
            .iter()
            .filter(|(_, s)| s.accepting)
            .map(|(_, s)| s.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Every non-epsilon symbol used by any transition, sorted.
    pub fn input_symbols(&self) -> Vec<String> {
        let symbols: BTreeSet<&str> = self
            .states
            .iter()
            .flat_map(|(_, s)| s.transitions.iter())
            .filter(|(symbol, ts)| !is_epsilon(symbol) && !ts.is_empty())
            .map(|(symbol, _)| symbol.as_str())
            .collect();
        symbols.into_iter().map(str::to_string).collect()
    }

    /// States reachable from `name` through zero or more epsilon moves.
    /// Empty if `name` does not exist.
    pub fn epsilon_closure(&self, name: &str) -> BTreeSet<String> {
        let ids = self.closure_ids(self.states.id(name));
        self.names_of(&ids)
    }

    /// Union of the epsilon closures of every state in `names`.
    pub fn epsilon_closure_of_set(&self, names: &BTreeSet<String>) -> BTreeSet<String> {
        let ids = self.closure_ids(names.iter().filter_map(|n| self.states.id(n)));
        self.names_of(&ids)
    }

    /// States reached in exactly one step on `symbol` from any state in
    /// `names`. Unknown names are skipped.
    ///
    /// # Panics
    ///
    /// If `symbol` is the epsilon symbol; use [`NFA::epsilon_closure_of_set`]
    /// for epsilon moves.
    pub fn move_set(&self, names: &BTreeSet<String>, symbol: &str) -> BTreeSet<String> {
        if is_epsilon(symbol) {
            violated(InvariantViolation::EpsilonMove);
        }

        names
            .iter()
            .filter_map(|n| self.states.get(n))
            .filter_map(|s| s.transitions.get(symbol))
            .flatten()
            .map(|t| t.destination.clone())
            .collect()
    }

    /// Epsilon closure over state ids, by depth-first traversal of epsilon
    /// edges only.
    fn closure_ids(&self, seeds: impl IntoIterator<Item = StateId>) -> StateSet {
        let mut closure = StateSet::with_capacity(self.states.len());
        let mut stack: Vec<StateId> = seeds.into_iter().collect();

        while let Some(id) = stack.pop() {
            if !closure.insert(id) {
                continue;
            }

            let Some(epsilons) = self.states.by_id(id).and_then(|s| s.transitions.get(EPSILON))
            else {
                continue;
            };
            for t in epsilons {
                if let Some(dest) = self.states.id(&t.destination) {
                    if !closure.contains(dest) {
                        stack.push(dest);
                    }
                }
            }
        }

        closure
    }

    fn names_of(&self, ids: &StateSet) -> BTreeSet<String> {
        ids.iter()
            .filter_map(|id| self.states.by_id(id))
            .map(|s| s.name.clone())
            .collect()
    }

    /// Build a new NFA holding both automata side by side, bridged by
    /// explicit edges.
    ///
    /// States of `self` are renamed with [`JOIN_LEFT_PREFIX`] and states of
    /// `other` with [`JOIN_RIGHT_PREFIX`]. `from_to_other` edges name a state
    /// of `self` and a state of `other` by their original names, and
    /// `other_to_from` the reverse. `add_accept` and `remove_accept` take
    /// the prefixed names. The start state is `self`'s start, prefixed.
    ///
    /// # Panics
    ///
    /// If an edge or acceptance change names a state that does not exist on
    /// its side.
    pub fn join(
        &self,
        other: &NFA<E>,
        from_to_other: &[Edge<'_>],
        other_to_from: &[Edge<'_>],
        add_accept: &[&str],
        remove_accept: &[&str],
    ) -> Result<NFA<E>>
    where
        E: Clone + Default,
    {
        if from_to_other.is_empty() {
            return Err(AutomatonError::EmptyJoin);
        }

        let mut joined = NFA::new();
        for (prefix, side) in [(JOIN_LEFT_PREFIX, self), (JOIN_RIGHT_PREFIX, other)] {
            for state in side.by_ordering() {
                let name = format!("{prefix}{}", state.name);
                joined.add_state(&name, state.accepting);
                joined.set_value(&name, state.value.clone());
            }
        }
        for (prefix, side) in [(JOIN_LEFT_PREFIX, self), (JOIN_RIGHT_PREFIX, other)] {
            for (_, state) in side.states.iter() {
                for t in state.transitions() {
                    joined.add_transition(
                        &format!("{prefix}{}", state.name),
                        &t.symbol,
                        &format!("{prefix}{}", t.destination),
                    );
                }
            }
        }

        for &(from, symbol, to) in from_to_other {
            joined.add_transition(
                &format!("{JOIN_LEFT_PREFIX}{from}"),
                symbol,
                &format!("{JOIN_RIGHT_PREFIX}{to}"),
            );
        }
        for &(from, symbol, to) in other_to_from {
            joined.add_transition(
                &format!("{JOIN_RIGHT_PREFIX}{from}"),
                symbol,
                &format!("{JOIN_LEFT_PREFIX}{to}"),
            );
        }

        for name in add_accept {
            joined.set_accepting(name, true);
        }
        for name in remove_accept {
            joined.set_accepting(name, false);
        }

        if !self.start.is_empty() {
            joined.set_start(&format!("{JOIN_LEFT_PREFIX}{}", self.start));
        }
        Ok(joined)
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
        log::debug!("numbered {} NFA states", numbered.len());
        *self = numbered;
    }

    fn renumbered(&self) -> NFA<E>
    where
        E: Clone,
    {
        let mut ordered = self.by_ordering();
        ordered.sort_by_key(|s| s.name != self.start);

        let renames: HashMap<String, String> = ordered
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i.to_string()))
            .collect();

        let mut numbered = NFA::new();
        for state in &ordered {
            let mut copy = NfaState {
                name: renames[&state.name].clone(),
                ordering: numbered.order,
                value: state.value.clone(),
                accepting: state.accepting,
                transitions: state.transitions.clone(),
            };
            copy.retarget_all(&renames);
            numbered.states.insert(copy);
            numbered.order += 1;
        }
        numbered.start = "0".to_string();
        numbered
    }

    /// States oldest first.
    fn by_ordering(&self) -> Vec<&NfaState<E>> {
        let mut states: Vec<&NfaState<E>> = self.states.iter().map(|(_, s)| s).collect();
        states.sort_by_key(|s| s.ordering);
        states
    }

    /// Point every transition whose destination is a key of `renames` at
    /// the mapped name.
    pub(crate) fn retarget_all(&mut self, renames: &HashMap<String, String>) {
        for state in self.states.values_mut() {
            state.retarget_all(renames);
        }
    }

    fn display_order(&self) -> impl Iterator<Item = &NfaState<E>> + '_ {
        render_order(self.states())
            .into_iter()
            .filter_map(move |name| self.states.get(&name))
    }

    pub fn render(&self) -> String {
        render_states(
            "NFA",
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
            "NFA",
            &self.start,
            self.display_order().map(|s| (s, &s.value)),
            options,
        )
    }

    pub(crate) fn existing_mut(&mut self, name: &str) -> &mut NfaState<E> {
        match self.states.get_mut(name) {
            Some(state) => state,
            None => violated(InvariantViolation::UnknownState(name.to_string())),
        }
    }
}

impl<E> fmt::Display for NFA<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
