//! Batch analysis of multiple targets.
//!
//! Each target is an independent unit of work; any per-target [`Error`]
//! is caught, logged and recorded without aborting the run, and a single
//! failure never discards results already computed for other targets.

use crate::error::Error;
use crate::report::{AnalysisResult, AnalysisSummary};
use crate::session::AnalysisSession;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One target that failed, with the error that stopped it.
#[derive(Debug)]
pub struct FailedTarget {
    pub dir: PathBuf,
    pub error: Error,
}

/// Aggregate tool → app → bug → summaries tree over a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    tree: BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<AnalysisSummary>>>>,
    failed_targets: Vec<PathBuf>,
}

impl BatchSummary {
    fn add(&mut self, result: &AnalysisResult) {
        self.tree
            .entry(result.tool_name().to_string())
            .or_default()
            .entry(result.app_name().to_string())
            .or_default()
            .entry(result.bug_id().to_string())
            .or_default()
            .push(result.summary().clone());
    }

    fn record_failure(&mut self, dir: &Path) {
        self.failed_targets.push(dir.to_path_buf());
    }

    /// The tool → app → bug → summaries tree.
    pub fn tree(
        &self,
    ) -> &BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<AnalysisSummary>>>> {
        &self.tree
    }

    pub fn failed_targets(&self) -> &[PathBuf] {
        &self.failed_targets
    }
}

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchReport {
    /// Per-target results, in completion order.
    pub results: Vec<AnalysisResult>,
    /// Targets that failed, with their errors.
    pub failures: Vec<FailedTarget>,
    /// The aggregate summary tree.
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Analyze every target sequentially.
pub fn run_batch<P: AsRef<Path>>(targets: &[P]) -> BatchReport {
    info!(targets = targets.len(), "Batch analysis starts");
    let outcomes = targets
        .iter()
        .map(|dir| (dir.as_ref().to_path_buf(), analyze_target(dir.as_ref())))
        .collect();
    fold_outcomes(outcomes)
}

/// Analyze targets in parallel. Each target's pipeline shares no mutable
/// state; outcomes are folded on the calling thread.
#[cfg(feature = "parallel")]
pub fn run_batch_parallel<P: AsRef<Path> + Sync>(targets: &[P]) -> BatchReport {
    use rayon::prelude::*;

    info!(targets = targets.len(), "Parallel batch analysis starts");
    let outcomes = targets
        .par_iter()
        .map(|dir| (dir.as_ref().to_path_buf(), analyze_target(dir.as_ref())))
        .collect();
    fold_outcomes(outcomes)
}

fn analyze_target(dir: &Path) -> Result<AnalysisResult, Error> {
    AnalysisSession::open(dir)?.run()
}

fn fold_outcomes(outcomes: Vec<(PathBuf, Result<AnalysisResult, Error>)>) -> BatchReport {
    let mut report = BatchReport {
        results: Vec::new(),
        failures: Vec::new(),
        summary: BatchSummary::default(),
    };

    for (dir, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                report.summary.add(&result);
                report.results.push(result);
            }
            Err(err) => {
                error!(dir = %dir.display(), %err, "Target analysis failed");
                report.summary.record_failure(&dir);
                report.failures.push(FailedTarget { dir, error: err });
            }
        }
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Batch analysis completed"
    );
    for (idx, failure) in report.failures.iter().enumerate() {
        info!(index = idx, dir = %failure.dir.display(), "Analysis failure");
    }

    report
}
