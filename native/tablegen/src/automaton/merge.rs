//! Collapsing of NFA states whose payloads are equivalent.
//!
//! Used to fold LR(1) item sets sharing a core into LALR(1) states, but
//! generic over the payload: the caller decides which payloads merge, how
//! merged payloads combine and what the survivors are called.

use crate::automaton::error::{InvariantViolation, violated};
use crate::automaton::nfa::NFA;
use std::collections::{BTreeSet, HashMap, HashSet};

impl<E: Clone + Default> NFA<E> {
    /// Merge every group of states whose payloads satisfy `merge_cond`.
    ///
    /// Passes repeat until one finds nothing to merge. Within a pass states
    /// are scanned in name order; each unmerged state `S` collects every
    /// other unmerged state `O` with `merge_cond(value(S), value(O))`, and
    /// the group is replaced by a single state whose payload is `reduce`
    /// folded over the members' payloads starting from `E::default()`. The
    /// merged state accepts if any member did, inherits every member's
    /// outgoing transitions (without exact duplicates) and receives every
    /// transition that targeted a member.
    ///
    /// Merged states carry temporary numeric names until all passes are
    /// done, then are renamed to `name_fn(payload)`.
    ///
    /// # Panics
    ///
    /// If a final name collides with a state that was not merged, or two
    /// merged states receive the same final name.
    pub fn merge_states_by_value<C, R, N>(&mut self, merge_cond: C, reduce: R, name_fn: N)
    where
        C: Fn(&E, &E) -> bool,
        R: Fn(E, &E) -> E,
        N: Fn(&E) -> String,
    {
        let mut temporaries: BTreeSet<String> = BTreeSet::new();
        let mut next_temporary: u64 = 0;
        let mut pass = 0;

        loop {
            pass += 1;
            let mut consumed: HashSet<String> = HashSet::new();
            let mut groups = 0;

            for name in self.states() {
                if consumed.contains(&name) {
                    continue;
                }
                let value = self.get_value(&name);
                let others: Vec<String> = self
                    .states()
                    .into_iter()
                    .filter(|o| *o != name && !consumed.contains(o))
                    .filter(|o| merge_cond(value, self.get_value(o)))
                    .collect();
                if others.is_empty() {
                    continue;
                }

                let mut members = Vec::with_capacity(others.len() + 1);
                members.push(name);
                members.extend(others);

                let temporary = loop {
                    let candidate = next_temporary.to_string();
                    next_temporary += 1;
                    if !self.contains(&candidate) {
                        break candidate;
                    }
                };
                log::trace!("merging {members:?} into {temporary}");

                self.collapse(&members, &temporary, &reduce);

                for member in &members {
                    temporaries.remove(member);
                }
                consumed.extend(members);
                consumed.insert(temporary.clone());
                temporaries.insert(temporary);
                groups += 1;
            }

            log::debug!("merge pass {pass}: {groups} groups merged, {} states remain", self.len());
            if groups == 0 {
                break;
            }
        }

        self.rename_temporaries(&temporaries, &name_fn);
        self.states.compact();
    }

    /// Replace `members` by one new state named `temporary`.
    fn collapse<R>(&mut self, members: &[String], temporary: &str, reduce: &R)
    where
        R: Fn(E, &E) -> E,
    {
        let value = members
            .iter()
            .fold(E::default(), |acc, m| reduce(acc, self.get_value(m)));
        let accepting = members.iter().any(|m| self.is_accepting(m));

        self.add_state(temporary, accepting);
        self.set_value(temporary, value);

        let renames: HashMap<String, String> = members
            .iter()
            .map(|m| (m.clone(), temporary.to_string()))
            .collect();
        self.retarget_all(&renames);
        if renames.contains_key(&self.start) {
            self.start = temporary.to_string();
        }

        let outgoing: Vec<_> = members
            .iter()
            .filter_map(|m| self.states.get(m))
            .flat_map(|s| s.transitions().cloned().collect::<Vec<_>>())
            .collect();
        let merged = self.existing_mut(temporary);
        for t in outgoing {
            if !merged.has_transition(&t) {
                merged.transitions.entry(t.symbol.clone()).or_default().push(t);
            }
        }

        for member in members {
            self.states.remove(member);
        }
    }

    /// Give every surviving temporary state its final name.
    fn rename_temporaries<N>(&mut self, temporaries: &BTreeSet<String>, name_fn: &N)
    where
        N: Fn(&E) -> String,
    {
        let mut renames: HashMap<String, String> = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();

        for temporary in temporaries {
            let name = name_fn(self.get_value(temporary));
            let collides_outside = self.contains(&name) && !temporaries.contains(&name);
            if collides_outside || !taken.insert(name.clone()) {
                violated(InvariantViolation::NameCollision(name));
            }
            renames.insert(temporary.clone(), name);
        }

        let pending: Vec<_> = temporaries
            .iter()
            .filter_map(|t| self.states.remove(t))
            .collect();
        for mut state in pending {
            state.name.clone_from(&renames[&state.name]);
            self.states.insert(state);
        }

        self.retarget_all(&renames);
        if let Some(start) = renames.get(&self.start) {
            self.start.clone_from(start);
        }
    }
}
