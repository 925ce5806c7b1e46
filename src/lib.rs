//! fuzztrace: automaton-based analysis of Android fuzzing trace logs.
//!
//! Evaluates recorded logcat traces of automated app-testing sessions
//! against a formal behavioral model: a finite automaton over the named
//! events the app is expected to exhibit while a known bug is reproduced.
//! Replaying a trace through the automaton yields coverage, timing and
//! distance-to-goal metrics describing how closely the run matched the
//! expected behavior.
//!
//! The pipeline:
//!
//! 1. A raw nondeterministic description (produced by an external
//!    converter) is turned into a deterministic automaton with a
//!    precomputed distance-to-acceptance table ([`automaton`]).
//! 2. Event descriptors and the legal adjacent-pair set are derived from
//!    the target configuration and the automaton ([`catalog`]).
//! 3. Trace lines are classified into timestamped records ([`logcat`])
//!    and streamed through the stateful replay engine ([`replay`]).
//! 4. [`session`] drives one full run per target; [`batch`] runs many
//!    targets, absorbing per-target failures.
//!
//! # Quick Start
//!
//! ```ignore
//! use fuzztrace::{AnalysisSession, run_batch};
//!
//! // One target: a result directory plus its sibling artifacts.
//! let result = AnalysisSession::open("results/instrumented-myapp-#42.apk.monkey.result".as_ref())?
//!     .run()?;
//! println!("{}", result.summary().rendered);
//!
//! // Many targets, run to completion even when some fail.
//! let report = run_batch(&targets);
//! println!("{} ok, {} failed", report.succeeded(), report.failed());
//! ```
//!
//! The crate never installs a tracing subscriber; process-wide logging
//! lifecycle belongs to the embedding binary.

pub mod automaton;
pub mod batch;
pub mod catalog;
pub mod error;
pub mod logcat;
pub mod metrics;
pub mod replay;
pub mod report;
pub mod session;
pub mod target;

// Re-export core types for convenience
pub use automaton::{build, AutomatonDescription, Dfa, DistanceTable, StateId};
pub use batch::{run_batch, BatchReport, BatchSummary, FailedTarget};
pub use catalog::{EventCatalog, EventDescriptor, EventPairCatalog};
pub use error::{Error, FuzzResult};
pub use logcat::{LogRecord, LogRecordParser, DEFAULT_MARKER};
pub use metrics::{DistanceHistogram, EventCounter, EventPairCounter};
pub use replay::{ReplayEngine, ReplayMetrics};
pub use report::{AnalysisResult, AnalysisSummary};
pub use session::AnalysisSession;
pub use target::{Target, TargetConfig};

#[cfg(feature = "parallel")]
pub use batch::run_batch_parallel;
