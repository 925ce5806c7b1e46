//! Deterministic automaton types.
//!
//! The replay engine drives a [`Dfa`] produced by subset construction from a
//! raw nondeterministic description (see [`description`] and [`build`]).
//! Deterministic states are arena-indexed integers assigned in discovery
//! order; the DEAD sink state is never materialized — an undefined
//! `(state, symbol)` combination is simply `None` in the transition table.

pub mod build;
pub mod description;

pub use build::build;
pub use description::{AutomatonDescription, RawState, RawTransition, StateKind};

/// Index of a deterministic state, assigned in discovery order.
pub type StateId = usize;

/// A deterministic, totally-defined automaton over single-character symbols.
///
/// The transition table is dense: one row per state, one column per
/// alphabet symbol (in sorted alphabet order). `None` is the DEAD state.
#[derive(Debug, Clone)]
pub struct Dfa {
    alphabet: Vec<char>,
    initial: StateId,
    finals: Vec<StateId>,
    transitions: Vec<Vec<Option<StateId>>>,
    labels: Vec<String>,
}

impl Dfa {
    pub(crate) fn new(
        alphabet: Vec<char>,
        initial: StateId,
        finals: Vec<StateId>,
        transitions: Vec<Vec<Option<StateId>>>,
        labels: Vec<String>,
    ) -> Self {
        debug_assert!(transitions.iter().all(|row| row.len() == alphabet.len()));
        Self {
            alphabet,
            initial,
            finals,
            transitions,
            labels,
        }
    }

    /// Number of deterministic states (DEAD excluded).
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// The sorted alphabet of single-character symbols.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Whether `symbol` is part of the alphabet.
    pub fn contains_symbol(&self, symbol: char) -> bool {
        self.symbol_index(symbol).is_some()
    }

    /// The initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// All final states, sorted by id.
    pub fn finals(&self) -> &[StateId] {
        &self.finals
    }

    /// Whether `state` is a final state.
    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.binary_search(&state).is_ok()
    }

    /// Attempt one transition. `None` means the DEAD state: the
    /// combination is undefined or the symbol is out of the alphabet.
    pub fn step(&self, state: StateId, symbol: char) -> Option<StateId> {
        let column = self.symbol_index(symbol)?;
        self.transitions[state][column]
    }

    /// Debug label of a state (the canonical subset of raw state names).
    pub fn label(&self, state: StateId) -> &str {
        &self.labels[state]
    }

    fn symbol_index(&self, symbol: char) -> Option<usize> {
        self.alphabet.binary_search(&symbol).ok()
    }
}

/// Shortest transition-count distance from every state to the chosen
/// final state. Computed once per automaton, never mutated.
#[derive(Debug, Clone)]
pub struct DistanceTable {
    distances: Vec<u32>,
    target: StateId,
}

impl DistanceTable {
    /// Sentinel distance for states that cannot reach the final state.
    pub const UNREACHABLE: u32 = u32::MAX / 2;

    pub(crate) fn new(distances: Vec<u32>, target: StateId) -> Self {
        Self { distances, target }
    }

    /// The final state distances are measured to.
    pub fn target(&self) -> StateId {
        self.target
    }

    /// Distance from `state` to the chosen final state.
    ///
    /// Must never be queried for DEAD, which has no entry; passing a
    /// materialized state id is the caller's invariant.
    pub fn distance(&self, state: StateId) -> u32 {
        self.distances[state]
    }

    /// Whether `state` can reach the chosen final state at all.
    pub fn is_reachable(&self, state: StateId) -> bool {
        self.distances[state] < Self::UNREACHABLE
    }
}
