//! Typed errors for fuzztrace.
//!
//! Provides structured error types instead of anyhow for better
//! library ergonomics and pattern matching. Every variant of [`Error`]
//! is fatal to the single target being analyzed, but the batch driver
//! catches the whole family and continues with the next target.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for fuzztrace operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Error while building the deterministic automaton.
    #[error("Automaton build error: {0}")]
    Automaton(#[from] AutomatonBuildError),

    /// Error in per-target configuration files.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Unparseable start timestamp in the time-record artifact.
    #[error("Start time error: {0}")]
    StartTime(#[from] StartTimeError),

    /// A required artifact file is absent or the target directory is malformed.
    #[error("Missing artifact: {0}")]
    MissingArtifact(#[from] MissingArtifactError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error while turning a raw automaton description into a DFA.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AutomatonBuildError {
    /// No state is marked INITIAL.
    #[error("Automaton description declares no initial state")]
    MissingInitial,

    /// More than one state is marked INITIAL.
    #[error("Automaton description declares multiple initial states (ids {first} and {second})")]
    MultipleInitial { first: u32, second: u32 },

    /// No state is marked FINAL.
    #[error("Automaton description declares no final state")]
    MissingFinal,

    /// A transition references a state id that is not declared.
    #[error("Transition {from} -> {to} references undeclared state id {unknown}")]
    DanglingStateRef { from: u32, to: u32, unknown: u32 },

    /// A transition label is empty (epsilon edges are not supported).
    #[error("Transition {from} -> {to} has an empty symbol (epsilon edges are not supported)")]
    EmptySymbol { from: u32, to: u32 },

    /// A transition label is longer than one character.
    #[error("Transition {from} -> {to} reads '{read}', expected a single character")]
    MultiCharSymbol { from: u32, to: u32, read: String },

    /// The description document could not be read or deserialized.
    #[error("Failed to load automaton description {path}: {reason}")]
    Document { path: PathBuf, reason: String },

    /// A conversion-report wrapper carries no conversion result.
    #[error("Conversion report {path} contains no conversions")]
    EmptyConversionReport { path: PathBuf },
}

/// Error in per-target configuration files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// Failed to read the configuration file.
    #[error("Failed to read configuration {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// Failed to deserialize the configuration file.
    #[error("Failed to parse configuration {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Unparseable start timestamp in the time-record artifact.
///
/// End-timestamp problems are deliberately not represented here: a bad
/// or absent end line degrades to the last observed trace timestamp.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StartTimeError {
    /// The first line of the time-record artifact did not match the
    /// tool's time format.
    #[error("Unparseable start time '{value}' in {path} (expected format '{format}')")]
    Unparseable {
        path: PathBuf,
        value: String,
        format: String,
    },

    /// The time-record artifact is empty.
    #[error("Time record {path} has no start line")]
    Empty { path: PathBuf },
}

/// A required artifact file is absent, or the target directory name
/// does not follow the result-directory naming convention.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MissingArtifactError {
    /// A required file does not exist.
    #[error("Required artifact {0} does not exist")]
    NotFound(PathBuf),

    /// The target directory name is not `instrumented-<app>-#<bug>.apk.<tool>.result`.
    #[error("Target directory name '{dir}' does not match 'instrumented-<app>-#<bug>.apk.<tool>.result'")]
    MalformedTargetName { dir: String },
}

/// Result type alias using fuzztrace's Error.
pub type FuzzResult<T> = std::result::Result<T, Error>;
