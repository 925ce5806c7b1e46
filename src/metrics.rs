//! Per-symbol, per-pair and distance statistics.
//!
//! Counters are mutated exclusively by the replay engine during a single
//! sequential pass. Trigger offsets are signed durations from session
//! start; each "first" field is set once, on the first observation only.

use chrono::TimeDelta;
use std::collections::BTreeMap;

/// Trigger statistics for one tracked symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCounter {
    count: u64,
    warning_count: u64,
    first_trigger: Option<TimeDelta>,
    first_warning: Option<TimeDelta>,
}

impl EventCounter {
    pub(crate) fn trigger_at(&mut self, at: TimeDelta) {
        self.count += 1;
        if self.first_trigger.is_none() {
            self.first_trigger = Some(at);
        }
    }

    pub(crate) fn warn_at(&mut self, at: TimeDelta) {
        self.warning_count += 1;
        if self.first_warning.is_none() {
            self.first_warning = Some(at);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn warning_count(&self) -> u64 {
        self.warning_count
    }

    pub fn first_trigger(&self) -> Option<TimeDelta> {
        self.first_trigger
    }

    pub fn first_warning(&self) -> Option<TimeDelta> {
        self.first_warning
    }
}

/// Trigger statistics for one legal ordered symbol pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPairCounter {
    count: u64,
    first_trigger: Option<TimeDelta>,
}

impl EventPairCounter {
    pub(crate) fn trigger_at(&mut self, at: TimeDelta) {
        self.count += 1;
        if self.first_trigger.is_none() {
            self.first_trigger = Some(at);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn first_trigger(&self) -> Option<TimeDelta> {
        self.first_trigger
    }
}

/// Multiset of reached distances to the final state.
///
/// Seeded at engine construction with the distance of the initial state,
/// so min and max are always defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceHistogram {
    counts: BTreeMap<u32, u64>,
}

impl DistanceHistogram {
    pub(crate) fn seeded(initial_distance: u32) -> Self {
        let mut counts = BTreeMap::new();
        counts.insert(initial_distance, 1);
        Self { counts }
    }

    pub(crate) fn reach(&mut self, distance: u32) {
        *self.counts.entry(distance).or_insert(0) += 1;
    }

    /// Smallest distance reached during the run.
    pub fn min(&self) -> u32 {
        // Non-empty by construction (seed entry).
        *self.counts.keys().next().unwrap_or(&0)
    }

    /// Largest distance reached during the run.
    pub fn max(&self) -> u32 {
        *self.counts.keys().next_back().unwrap_or(&0)
    }

    pub fn count_of(&self, distance: u32) -> u64 {
        self.counts.get(&distance).copied().unwrap_or(0)
    }

    /// `(distance, occurrence count)` entries in ascending distance order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.counts.iter().map(|(&d, &c)| (d, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trigger_is_set_once() {
        let mut counter = EventCounter::default();
        counter.trigger_at(TimeDelta::seconds(5));
        counter.trigger_at(TimeDelta::seconds(9));
        assert_eq!(counter.count(), 2);
        assert_eq!(counter.first_trigger(), Some(TimeDelta::seconds(5)));
    }

    #[test]
    fn warnings_do_not_touch_trigger_stats() {
        let mut counter = EventCounter::default();
        counter.warn_at(TimeDelta::seconds(3));
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.warning_count(), 1);
        assert_eq!(counter.first_trigger(), None);
        assert_eq!(counter.first_warning(), Some(TimeDelta::seconds(3)));
    }

    #[test]
    fn histogram_min_max_include_seed() {
        let mut histogram = DistanceHistogram::seeded(4);
        histogram.reach(2);
        histogram.reach(2);
        assert_eq!(histogram.min(), 2);
        assert_eq!(histogram.max(), 4);
        assert_eq!(histogram.count_of(2), 2);
        assert_eq!(histogram.count_of(4), 1);
        assert_eq!(histogram.count_of(7), 0);
    }
}
