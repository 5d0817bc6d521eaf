//! Subset construction: NFA → DFA conversion.
//!
//! Standard powerset construction by breadth-first traversal over sets of
//! NFA states:
//! 1. Seed with the epsilon closure of the NFA start state.
//! 2. For each unvisited set, compute per-character successor sets and
//!    canonicalize each through the identity cache.
//! 3. A set is marked visited only after all its transitions are recorded;
//!    re-encountering a visited set is a no-op, so NFA cycles terminate.
//! 4. A DFA state's accept flag and token label are fixed at creation from
//!    the NFA states it represents.
//!
//! Epsilon transitions are eliminated as a side effect.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::nfa::epsilon_closure;
use super::{Dfa, DfaState, Nfa, StateId};

/// Convert the NFA reachable from `start` into a DFA.
///
/// The DFA start state is always id 0. Identical NFA-state sets always
/// canonicalize to the same DFA state; the sorted id vector is the cache
/// key, so set contents are compared once per lookup and never mutated
/// after creation.
pub fn subset_construction(nfa: &Nfa, start: StateId) -> Dfa {
    let mut dfa = Dfa { states: Vec::new(), start: 0 };
    let mut cache: HashMap<Vec<StateId>, StateId> = HashMap::new();
    let mut visited: HashSet<Vec<StateId>> = HashSet::new();
    let mut frontier: VecDeque<Vec<StateId>> = VecDeque::new();

    let start_set = epsilon_closure(nfa, &[start]);
    intern(nfa, &mut dfa, &mut cache, &start_set);
    frontier.push_back(start_set);

    while let Some(current_set) = frontier.pop_front() {
        if visited.contains(&current_set) {
            continue;
        }
        let current = cache[&current_set];

        // Every character any represented NFA state can move on.
        let alphabet: BTreeSet<u8> = current_set
            .iter()
            .flat_map(|&s| nfa.states[s as usize].transitions.keys().copied())
            .collect();

        for byte in alphabet {
            let mut successors: Vec<StateId> = Vec::new();
            for &s in &current_set {
                if let Some(&t) = nfa.states[s as usize].transitions.get(&byte) {
                    successors.push(t);
                }
            }
            let next_set = epsilon_closure(nfa, &successors);
            let next = intern(nfa, &mut dfa, &mut cache, &next_set);
            dfa.states[current as usize].transitions.insert(byte, next);
            frontier.push_back(next_set);
        }

        visited.insert(current_set);
    }

    dfa
}

/// Canonicalize an NFA-state set to a DFA state, creating one if the set has
/// not been seen. Accept flag and token label are computed here, once.
fn intern(
    nfa: &Nfa,
    dfa: &mut Dfa,
    cache: &mut HashMap<Vec<StateId>, StateId>,
    set: &[StateId],
) -> StateId {
    if let Some(&existing) = cache.get(set) {
        return existing;
    }

    let mut accept = false;
    let mut labels: Vec<&str> = Vec::new();
    // `set` is sorted ascending, and NFA ids are creation-ordered, so the
    // aggregated label lists rules in declaration order.
    for &s in set {
        let state = &nfa.states[s as usize];
        if state.accept {
            accept = true;
            if !state.token.is_empty() {
                labels.push(&state.token);
            }
        }
    }

    let id = dfa.states.len() as StateId;
    dfa.states.push(DfaState {
        nfa_states: set.to_vec(),
        transitions: Default::default(),
        accept,
        token: labels.join(" "),
    });
    cache.insert(set.to_vec(), id);
    id
}
