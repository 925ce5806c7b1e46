//! Stateful trace replay.
//!
//! Consumes the symbol stream extracted from a trace and drives automaton
//! transitions while updating per-symbol and per-pair statistics. A
//! rejected transition is a routine outcome, modeled as an explicit
//! result, never an error: the engine counts the symbol once, then
//! attempts the transition up to twice — once from the current state and,
//! on rejection, once more (uncounted) from a fresh initial state, so a
//! symbol that cannot extend the current partial match can still start a
//! new one without double-counting.

use crate::automaton::{Dfa, DistanceTable, StateId};
use crate::catalog::{EventCatalog, EventPairCatalog};
use crate::metrics::{DistanceHistogram, EventCounter, EventPairCounter};
use chrono::TimeDelta;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Final statistics of one replay pass.
#[derive(Debug)]
pub struct ReplayMetrics {
    /// Tracked symbols and their descriptors.
    pub catalog: EventCatalog,
    /// Legal adjacent-symbol pairs.
    pub pair_catalog: EventPairCatalog,
    /// Per-symbol counters, one per catalog entry.
    pub events: BTreeMap<char, EventCounter>,
    /// Per-pair counters, one per legal pair.
    pub pairs: BTreeMap<(char, char), EventPairCounter>,
    /// Multiset of reached distances.
    pub histogram: DistanceHistogram,
    /// Offsets of observed crashes, in trace order.
    pub crashes: Vec<TimeDelta>,
}

/// The replay state machine.
pub struct ReplayEngine {
    dfa: Dfa,
    distances: DistanceTable,
    catalog: EventCatalog,
    pair_catalog: EventPairCatalog,
    current: StateId,
    last_symbol: Option<char>,
    events: BTreeMap<char, EventCounter>,
    pairs: BTreeMap<(char, char), EventPairCounter>,
    histogram: DistanceHistogram,
    crashes: Vec<TimeDelta>,
}

impl ReplayEngine {
    /// Create an engine positioned at the initial state, with zeroed
    /// counters for every catalog entry and legal pair, and the histogram
    /// seeded with the initial state's distance.
    pub fn new(
        dfa: Dfa,
        distances: DistanceTable,
        catalog: EventCatalog,
        pair_catalog: EventPairCatalog,
    ) -> Self {
        let events = catalog
            .symbols()
            .map(|symbol| (symbol, EventCounter::default()))
            .collect();
        let pairs = pair_catalog
            .iter()
            .map(|pair| (pair, EventPairCounter::default()))
            .collect();
        let histogram = DistanceHistogram::seeded(distances.distance(dfa.initial()));
        let current = dfa.initial();

        Self {
            dfa,
            distances,
            catalog,
            pair_catalog,
            current,
            last_symbol: None,
            events,
            pairs,
            histogram,
            crashes: Vec::new(),
        }
    }

    /// Present one event symbol to the automaton.
    ///
    /// Out-of-alphabet symbols are a no-op; callers are expected to
    /// pre-filter, but the engine is safe against unfiltered input. The
    /// symbol is counted exactly once, independent of whether either
    /// transition attempt succeeds.
    pub fn observe_event(&mut self, symbol: char, at: TimeDelta) {
        if !self.dfa.contains_symbol(symbol) {
            return;
        }

        if let Some(counter) = self.events.get_mut(&symbol) {
            counter.trigger_at(at);
        }
        if let Some(previous) = self.last_symbol {
            if let Some(counter) = self.pairs.get_mut(&(previous, symbol)) {
                counter.trigger_at(at);
            }
        }
        self.last_symbol = Some(symbol);

        if !self.advance(symbol) {
            // Rejected: discard progress, then one uncounted retry as the
            // start of a new match.
            self.current = self.dfa.initial();
            if !self.advance(symbol) {
                debug!(%symbol, "Symbol rejected twice, dropped as noise");
            }
        }
    }

    /// Record a warning trigger; no automaton effect. Symbols without a
    /// catalog entry are absorbed.
    pub fn observe_warning(&mut self, symbol: char, at: TimeDelta) {
        if let Some(counter) = self.events.get_mut(&symbol) {
            counter.warn_at(at);
        }
    }

    /// Record a crash; no automaton or counter effect.
    pub fn observe_crash(&mut self, at: TimeDelta) {
        self.crashes.push(at);
    }

    /// Current automaton state (exposed for inspection and tests).
    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn events(&self) -> &BTreeMap<char, EventCounter> {
        &self.events
    }

    pub fn pairs(&self) -> &BTreeMap<(char, char), EventPairCounter> {
        &self.pairs
    }

    pub fn histogram(&self) -> &DistanceHistogram {
        &self.histogram
    }

    pub fn crashes(&self) -> &[TimeDelta] {
        &self.crashes
    }

    /// Consume the engine at end of pass, yielding the final statistics.
    pub fn into_metrics(self) -> ReplayMetrics {
        ReplayMetrics {
            catalog: self.catalog,
            pair_catalog: self.pair_catalog,
            events: self.events,
            pairs: self.pairs,
            histogram: self.histogram,
            crashes: self.crashes,
        }
    }

    /// One transition attempt from the current state. On acceptance the
    /// resulting distance is recorded and a final state resets scanning
    /// to the initial state; on rejection the current state is left
    /// untouched for the caller to handle.
    fn advance(&mut self, symbol: char) -> bool {
        match self.dfa.step(self.current, symbol) {
            Some(next) => {
                self.histogram.reach(self.distances.distance(next));
                if self.dfa.is_final(next) {
                    trace!(
                        state = self.dfa.label(next),
                        "Reached final state, rescanning from initial"
                    );
                    self.current = self.dfa.initial();
                } else {
                    self.current = next;
                }
                true
            }
            None => false,
        }
    }
}
