//! State records and state-id sets.

use crate::automaton::transition::Transition;
use fixedbitset::FixedBitSet;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

/// Index of a state slot inside an automaton's arena.
///
/// Ids are stable for the lifetime of a state and never reused while the
/// automaton is alive; names are the public identity.
pub(crate) type StateId = u32;

/// A set of state ids backed by a growable bit set.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// Create a new empty state set with the given capacity.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Insert a state, returning `true` if it was not already present.
    pub(crate) fn insert(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    pub(crate) fn contains(&self, state: StateId) -> bool {
        self.bits.contains(state as usize)
    }

    /// Iterate over all states in ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Name lookup shared by DFA and NFA state records; the arena indexes
/// states by it on insert.
pub(crate) trait NamedState {
    fn name(&self) -> &str;
}

/// A state of a [`DFA`](crate::automaton::DFA): at most one transition per
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState<E> {
    pub(crate) name: String,
    pub(crate) ordering: u64,
    pub(crate) value: E,
    pub(crate) accepting: bool,
    pub(crate) transitions: HashMap<String, Transition>,
}

impl<E: Default> DfaState<E> {
    pub(crate) fn new(name: String, ordering: u64, accepting: bool) -> Self {
        Self {
            name,
            ordering,
            value: E::default(),
            accepting,
            transitions: HashMap::new(),
        }
    }
}

impl<E> DfaState<E> {
    pub fn ordering(&self) -> u64 {
        self.ordering
    }

    pub fn value(&self) -> &E {
        &self.value
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Transitions sorted by symbol.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(_, t)| t)
    }
}

impl<E> NamedState for DfaState<E> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<E> fmt::Display for DfaState<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_state(f, &self.name, self.accepting, self.transitions())
    }
}

/// A state of an [`NFA`](crate::automaton::NFA): every symbol maps to a
/// list of transitions, kept in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaState<E> {
    pub(crate) name: String,
    pub(crate) ordering: u64,
    pub(crate) value: E,
    pub(crate) accepting: bool,
    pub(crate) transitions: HashMap<String, Vec<Transition>>,
}

impl<E: Default> NfaState<E> {
    pub(crate) fn new(name: String, ordering: u64, accepting: bool) -> Self {
        Self {
            name,
            ordering,
            value: E::default(),
            accepting,
            transitions: HashMap::new(),
        }
    }
}

impl<E> NfaState<E> {
    pub fn ordering(&self) -> u64 {
        self.ordering
    }

    pub fn value(&self) -> &E {
        &self.value
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Transitions sorted by symbol, insertion order within a symbol.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .flat_map(|(_, ts)| ts.iter())
    }

    /// Whether the exact edge is already present.
    pub(crate) fn has_transition(&self, t: &Transition) -> bool {
        self.transitions
            .get(&t.symbol)
            .is_some_and(|ts| ts.contains(t))
    }

    /// Point every transition whose destination is a key of `renames` at
    /// the mapped name.
    pub(crate) fn retarget_all(&mut self, renames: &HashMap<String, String>) {
        for t in self.transitions.values_mut().flatten() {
            if let Some(to) = renames.get(&t.destination) {
                t.destination.clone_from(to);
            }
        }
    }
}

impl<E> NamedState for NfaState<E> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<E> fmt::Display for NfaState<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_state(f, &self.name, self.accepting, self.transitions())
    }
}

/// `(A =(a)=> B, =(b)=> C)`, with doubled parentheses for accepting states.
fn fmt_state<'a>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    accepting: bool,
    transitions: impl Iterator<Item = &'a Transition>,
) -> fmt::Result {
    let (open, close) = if accepting { ("((", "))") } else { ("(", ")") };
    write!(f, "{open}{name}")?;
    for (i, t) in transitions.enumerate() {
        let sep = if i == 0 { " " } else { ", " };
        write!(f, "{sep}{t}")?;
    }
    write!(f, "{close}")
}
