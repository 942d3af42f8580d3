//! Id-indexed state storage with a name lookup.
//!
//! States live in slots addressed by [`StateId`]. Removing a state clears
//! its slot without shifting the others, so ids held across a mutation
//! either still point at the same state or at an empty slot, until
//! [`StateArena::compact`] packs the live states and reassigns ids.

use crate::automaton::state::{NamedState, StateId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct StateArena<S> {
    slots: Vec<Option<S>>,
    index: HashMap<String, StateId>,
}

impl<S> Default for StateArena<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<S: NamedState> StateArena<S> {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn id(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&S> {
        self.id(name).and_then(|id| self.by_id(id))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut S> {
        let id = self.id(name)?;
        self.slots.get_mut(id as usize).and_then(Option::as_mut)
    }

    pub fn by_id(&self, id: StateId) -> Option<&S> {
        self.slots.get(id as usize).and_then(Option::as_ref)
    }

    /// Store a state whose name is not yet present.
    pub fn insert(&mut self, state: S) -> StateId {
        debug_assert!(!self.contains(state.name()));
        let id = self.slots.len() as StateId;
        self.index.insert(state.name().to_string(), id);
        self.slots.push(Some(state));
        id
    }

    pub fn remove(&mut self, name: &str) -> Option<S> {
        let id = self.index.remove(name)?;
        self.slots.get_mut(id as usize).and_then(Option::take)
    }

    /// Drop empty slots, keeping live states in slot order. Ids change;
    /// names don't.
    pub fn compact(&mut self) {
        let slots: Vec<Option<S>> = self.slots.drain(..).filter(Option::is_some).collect();
        self.index.clear();
        for (id, state) in slots.iter().enumerate() {
            if let Some(state) = state {
                self.index.insert(state.name().to_string(), id as StateId);
            }
        }
        self.slots = slots;
    }

    /// Number of slots, empty ones included.
    #[cfg(test)]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Live states in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &S)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|s| (id as StateId, s)))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut S> + '_ {
        self.slots.iter_mut().flatten()
    }

    /// All names, sorted lexicographically.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Equal when both hold the same named states, regardless of slot layout.
impl<S: NamedState + PartialEq> PartialEq for StateArena<S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(_, s)| other.get(s.name()).is_some_and(|o| o == s))
    }
}

impl<S: NamedState + Eq> Eq for StateArena<S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::state::DfaState;

    fn state(name: &str, ordering: u64) -> DfaState<()> {
        DfaState::new(name.to_string(), ordering, false)
    }

    #[test]
    fn test_insert_remove_keeps_ids() {
        let mut arena = StateArena::default();
        let a = arena.insert(state("A", 0));
        let b = arena.insert(state("B", 1));
        assert_eq!(arena.len(), 2);

        assert!(arena.remove("A").is_some());
        assert!(arena.by_id(a).is_none());
        assert_eq!(arena.by_id(b).map(|s| s.name()), Some("B"));
        assert_eq!(arena.id("B"), Some(b));
        assert!(arena.remove("A").is_none());
    }

    #[test]
    fn test_compact_drops_holes() {
        let mut arena = StateArena::default();
        arena.insert(state("A", 0));
        arena.insert(state("B", 1));
        arena.insert(state("C", 2));
        arena.remove("A");
        arena.remove("C");
        assert_eq!(arena.slot_count(), 3);

        arena.compact();
        assert_eq!(arena.slot_count(), 1);
        assert_eq!(arena.id("B"), Some(0));
        assert_eq!(arena.get("B").map(|s| s.ordering()), Some(1));
        assert!(arena.get("A").is_none());

        let d = arena.insert(state("D", 3));
        assert_eq!(d, 1);
        assert_eq!(arena.names(), vec!["B".to_string(), "D".to_string()]);
    }

    #[test]
    fn test_eq_ignores_layout() {
        let mut left = StateArena::default();
        left.insert(state("X", 0));
        left.insert(state("A", 1));
        left.remove("X");

        let mut right = StateArena::default();
        right.insert(state("A", 1));

        assert_eq!(left, right);
    }
}
