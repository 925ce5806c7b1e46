//! One full analysis run.
//!
//! Resolves the target layout and time window, builds the automaton and
//! catalogs, streams the trace through the line parser into the replay
//! engine, and assembles the result snapshot.

use crate::automaton::{self, AutomatonDescription};
use crate::catalog::{EventCatalog, EventPairCatalog};
use crate::error::{Error, StartTimeError};
use crate::logcat::{LogRecord, LogRecordParser};
use crate::replay::ReplayEngine;
use crate::report::AnalysisResult;
use crate::target::{time_format, Target, TargetConfig};
use chrono::NaiveDateTime;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// A resolved target with its loaded configuration, ready to run.
pub struct AnalysisSession {
    target: Target,
    config: TargetConfig,
}

impl AnalysisSession {
    /// Resolve a result directory and load its configuration.
    pub fn open(dir: &Path) -> Result<Self, Error> {
        let target = Target::resolve(dir)?;
        let config = TargetConfig::load(&target.config_path)?;
        info!(
            dir = %target.dir_name,
            app = %config.app_name,
            bug = %config.bug_id,
            tool = %target.tool_name,
            "Opened analysis target"
        );
        Ok(Self { target, config })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Execute the analysis: one sequential pass over the trace.
    pub fn run(&self) -> Result<AnalysisResult, Error> {
        let description = AutomatonDescription::load(&self.target.description_path)?;
        let (dfa, distances) = automaton::build(&description)?;
        let catalog = EventCatalog::from_config(&dfa, &self.config.events, &self.config.warnings);
        let pair_catalog = EventPairCatalog::from_dfa(&dfa);
        debug!(
            symbols = catalog.len(),
            pairs = pair_catalog.len(),
            "Built event catalogs"
        );

        let (start, end) = self.read_time_window()?;
        let mut engine = ReplayEngine::new(dfa, distances, catalog, pair_catalog);
        let mut parser = LogRecordParser::new(start);

        let trace = std::fs::File::open(&self.target.logcat_path)?;
        for line in BufReader::new(trace).lines() {
            let line = line?;
            match parser.parse_line(&line) {
                Some(LogRecord::Event { symbol, at }) => engine.observe_event(symbol, at - start),
                Some(LogRecord::Warning { symbol, at }) => {
                    engine.observe_warning(symbol, at - start)
                }
                Some(LogRecord::Crash { at }) => engine.observe_crash(at - start),
                Some(LogRecord::Plain { .. }) | None => {}
            }
        }

        // Fallback chain: end line, then last trace timestamp, then the
        // start time itself (the parser is seeded with it).
        let end = end.unwrap_or_else(|| parser.last_timestamp());
        let elapsed = end - start;
        info!(
            dir = %self.target.dir_name,
            elapsed_seconds = elapsed.num_seconds(),
            "Trace replay finished"
        );

        Ok(AnalysisResult::new(
            self.target.dir_name.clone(),
            self.config.app_name.clone(),
            self.config.bug_id.clone(),
            self.target.tool_name.clone(),
            self.config.all_events_happened.clone(),
            elapsed,
            engine.into_metrics(),
        ))
    }

    /// Parse the two-line time-record artifact. A malformed start line is
    /// fatal; a malformed or absent end line degrades to `None`.
    fn read_time_window(&self) -> Result<(NaiveDateTime, Option<NaiveDateTime>), Error> {
        let path = &self.target.time_record_path;
        let format = time_format(&self.target.tool_name);
        let content = std::fs::read_to_string(path)?;
        let mut lines = content.lines();

        let start_line = lines.next().ok_or_else(|| StartTimeError::Empty {
            path: path.clone(),
        })?;
        let start = NaiveDateTime::parse_from_str(start_line.trim_end(), format).map_err(|_| {
            StartTimeError::Unparseable {
                path: path.clone(),
                value: start_line.to_string(),
                format: format.to_string(),
            }
        })?;

        let end = lines
            .next()
            .and_then(|line| NaiveDateTime::parse_from_str(line.trim_end(), format).ok());
        if end.is_none() {
            debug!(path = %path.display(), "No parseable end time, will fall back to the trace");
        }

        Ok((start, end))
    }
}
