//! Immutable result snapshots.
//!
//! [`AnalysisResult`] is assembled once at the end of a replay pass and
//! exposed read-only to an external renderer. [`AnalysisSummary`] is the
//! flat per-run digest collected into batch summary trees; it serializes
//! so a renderer can dump it directly.

use crate::catalog::{EventCatalog, EventPairCatalog};
use crate::metrics::{DistanceHistogram, EventCounter, EventPairCounter};
use crate::replay::ReplayMetrics;
use chrono::TimeDelta;
use serde::Serialize;
use std::collections::BTreeMap;

/// Flat digest of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    /// Fraction of tracked symbols triggered at least once; `None` when
    /// the catalog is empty.
    pub event_coverage: Option<f64>,
    /// Fraction of legal pairs triggered at least once; `None` when the
    /// pair set is empty.
    pub event_pair_coverage: Option<f64>,
    /// Smallest distance reached during the run.
    pub min_distance: u32,
    /// Largest distance reached during the run.
    pub max_distance: u32,
    pub elapsed_seconds: i64,
    pub has_crash: bool,
    /// Canonical one-line rendering: `(<EC>, <EPC>, <min>/<max>, <has_crash>)`.
    pub rendered: String,
}

/// Complete, immutable result of one analysis run.
#[derive(Debug)]
pub struct AnalysisResult {
    dir_name: String,
    app_name: String,
    bug_id: String,
    tool_name: String,
    reason: String,
    elapsed: TimeDelta,
    catalog: EventCatalog,
    pair_catalog: EventPairCatalog,
    events: BTreeMap<char, EventCounter>,
    pairs: BTreeMap<(char, char), EventPairCounter>,
    histogram: DistanceHistogram,
    crashes: Vec<TimeDelta>,
    event_coverage: Option<f64>,
    pair_coverage: Option<f64>,
    summary: AnalysisSummary,
}

impl AnalysisResult {
    pub(crate) fn new(
        dir_name: String,
        app_name: String,
        bug_id: String,
        tool_name: String,
        reason: String,
        elapsed: TimeDelta,
        metrics: ReplayMetrics,
    ) -> Self {
        let event_coverage = coverage(metrics.events.values().map(EventCounter::count));
        let pair_coverage = coverage(metrics.pairs.values().map(EventPairCounter::count));
        let has_crash = !metrics.crashes.is_empty();

        let min_distance = metrics.histogram.min();
        let max_distance = metrics.histogram.max();
        let rendered = format!(
            "({}, {}, {}/{}, {})",
            render_coverage(event_coverage),
            render_coverage(pair_coverage),
            min_distance,
            max_distance,
            has_crash
        );

        let summary = AnalysisSummary {
            event_coverage,
            event_pair_coverage: pair_coverage,
            min_distance,
            max_distance,
            elapsed_seconds: elapsed.num_seconds(),
            has_crash,
            rendered,
        };

        Self {
            dir_name,
            app_name,
            bug_id,
            tool_name,
            reason,
            elapsed,
            catalog: metrics.catalog,
            pair_catalog: metrics.pair_catalog,
            events: metrics.events,
            pairs: metrics.pairs,
            histogram: metrics.histogram,
            crashes: metrics.crashes,
            event_coverage,
            pair_coverage,
            summary,
        }
    }

    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn bug_id(&self) -> &str {
        &self.bug_id
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Root-cause text shown when all expected events happened.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.elapsed
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn pair_catalog(&self) -> &EventPairCatalog {
        &self.pair_catalog
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

    /// Offsets of observed crashes, in trace order.
    pub fn crashes(&self) -> &[TimeDelta] {
        &self.crashes
    }

    pub fn has_crash(&self) -> bool {
        !self.crashes.is_empty()
    }

    pub fn event_coverage(&self) -> Option<f64> {
        self.event_coverage
    }

    pub fn event_pair_coverage(&self) -> Option<f64> {
        self.pair_coverage
    }

    pub fn summary(&self) -> &AnalysisSummary {
        &self.summary
    }
}

/// Fraction of counters with a non-zero count; `None` over an empty set.
fn coverage(counts: impl ExactSizeIterator<Item = u64>) -> Option<f64> {
    let total = counts.len();
    if total == 0 {
        return None;
    }
    let covered = counts.filter(|&count| count > 0).count();
    Some(covered as f64 / total as f64)
}

fn render_coverage(coverage: Option<f64>) -> String {
    match coverage {
        None => "None".to_string(),
        Some(value) if value >= 1.0 => "100%".to_string(),
        Some(value) => format!("{:.2}%", value * 100.0),
    }
}
