//! Automata infrastructure for scanner generation.
//!
//! Provides the NFA/DFA model shared by the compilation pipeline:
//! `Spec -> Regex Parser -> NFA -> DFA -> Transition Table -> Scanner`

pub mod cursor;
pub mod nfa;
pub mod regex;
pub mod subset;
pub mod table;

use std::collections::{BTreeMap, BTreeSet};

/// Identifier for an automaton state.
pub type StateId = u32;

/// A sentinel value representing a non-existent / dead state.
pub const DEAD_STATE: StateId = u32::MAX;

/// A set of byte codes. Ordered iteration keeps automaton construction
/// deterministic; membership is what matters semantically.
pub type CharSet = BTreeSet<u8>;

/// NFA state with single-character and epsilon transitions.
///
/// Each state has at most one successor per input byte. A regex alternative
/// over several bytes is expressed as several map entries, never as several
/// successors for one byte — nondeterminism lives only in epsilon edges and
/// in distinct states sharing input bytes.
#[derive(Debug, Clone)]
pub struct NfaState {
    /// Successor states reachable without consuming input.
    pub epsilon: Vec<StateId>,
    /// Labeled transitions: input byte -> successor state.
    pub transitions: BTreeMap<u8, StateId>,
    /// Whether this state accepts.
    pub accept: bool,
    /// Token type produced on acceptance. Empty until a rule labels its
    /// final exit state.
    pub token: String,
}

impl NfaState {
    /// Create a new non-accepting state with no transitions.
    pub fn new() -> Self {
        NfaState {
            epsilon: Vec::new(),
            transitions: BTreeMap::new(),
            accept: false,
            token: String::new(),
        }
    }

    /// Create a new accepting state (unlabeled).
    pub fn accepting() -> Self {
        NfaState { accept: true, ..NfaState::new() }
    }
}

impl Default for NfaState {
    fn default() -> Self {
        Self::new()
    }
}

/// An NFA fragment: a sub-automaton with one entry and one exit state.
///
/// Fragments are combined destructively by the composition operators in
/// [`nfa`]; once passed to an operator the handle must not be reused, except
/// that `x+` deliberately threads the same operand through star and
/// concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfaFragment {
    pub entry: StateId,
    pub exit: StateId,
}

/// Arena of NFA states. All cross-references are by [`StateId`], so cyclic
/// graphs (Kleene-star back edges) need no shared ownership.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    pub states: Vec<NfaState>,
}

impl Nfa {
    /// Create an empty arena.
    pub fn new() -> Self {
        Nfa { states: Vec::new() }
    }

    /// Add a state and return its id. Ids are monotonic and stable for the
    /// lifetime of one build.
    pub fn add_state(&mut self, state: NfaState) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(state);
        id
    }

    /// Add an epsilon transition `from -> to`.
    pub fn add_epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from as usize].epsilon.push(to);
    }

    /// Set the single successor of `from` on `byte`.
    pub fn set_transition(&mut self, from: StateId, byte: u8, to: StateId) {
        self.states[from as usize].transitions.insert(byte, to);
    }

    /// Create a fresh two-state fragment with no transitions. The exit is
    /// accepting (and unlabeled) until a composition operator or the
    /// pipeline decides otherwise.
    pub fn fragment(&mut self) -> NfaFragment {
        let entry = self.add_state(NfaState::new());
        let exit = self.add_state(NfaState::accepting());
        NfaFragment { entry, exit }
    }
}

/// DFA state produced by subset construction.
#[derive(Debug, Clone)]
pub struct DfaState {
    /// The exact set of NFA states this state represents, sorted ascending.
    /// Frozen at creation; identity of a DFA state is this set.
    pub nfa_states: Vec<StateId>,
    /// Deterministic transitions: input byte -> successor. Absent = reject.
    pub transitions: BTreeMap<u8, StateId>,
    /// True iff any represented NFA state accepts.
    pub accept: bool,
    /// Space-joined token labels of all represented accepting NFA states,
    /// in ascending NFA-id order (= rule declaration order).
    pub token: String,
}

/// A complete DFA with a designated start state.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: StateId,
}

impl Dfa {
    /// Successor of `state` on `byte`, or [`DEAD_STATE`].
    pub fn transition(&self, state: StateId, byte: u8) -> StateId {
        self.states[state as usize]
            .transitions
            .get(&byte)
            .copied()
            .unwrap_or(DEAD_STATE)
    }
}

/// The set of all printable ASCII codes, 32 through 126. This is what the
/// regex wildcard `.` expands to.
pub fn printable_ascii() -> CharSet {
    (32u8..=126).collect()
}
