//! Trace line classification.
//!
//! Turns raw logcat lines into typed, timestamped [`LogRecord`]s. The
//! parser keeps a running "current timestamp" so that crash and plain
//! lines carry the time of the last parseable prefix. Only lines bearing
//! the instrumentation marker token are inspected for event, warning or
//! crash content; everything else is a plain line.

use chrono::{Datelike, NaiveDateTime};

/// Instrumentation tag flagging lines of interest in the trace.
pub const DEFAULT_MARKER: &str = "Themis";

const EVENT_TOKEN: &str = "event ";
const WARNING_TOKEN: &str = "warning";
const CRASH_TOKEN: &str = "crash!";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One classified trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRecord {
    /// An instrumented event trigger.
    Event { symbol: char, at: NaiveDateTime },
    /// An instrumented warning trigger.
    Warning { symbol: char, at: NaiveDateTime },
    /// An app crash, recorded with the running timestamp.
    Crash { at: NaiveDateTime },
    /// Any other line; only advances the running timestamp.
    Plain { at: NaiveDateTime },
}

/// Stateful line classifier.
///
/// Constructed from the session start time, which supplies the year for
/// timestamp reconstruction (logcat prefixes carry no year) and the
/// initial "last known timestamp".
#[derive(Debug)]
pub struct LogRecordParser {
    year: i32,
    marker: String,
    last_seen: NaiveDateTime,
}

impl LogRecordParser {
    pub fn new(start: NaiveDateTime) -> Self {
        Self::with_marker(start, DEFAULT_MARKER)
    }

    pub fn with_marker(start: NaiveDateTime, marker: &str) -> Self {
        Self {
            year: start.year(),
            marker: marker.to_string(),
            last_seen: start,
        }
    }

    /// Timestamp of the most recent line with a parseable time prefix
    /// (the session start time until one is seen).
    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.last_seen
    }

    /// Classify one raw trace line.
    ///
    /// Returns `None` for structural separator lines (leading `---`),
    /// which neither update the running timestamp nor produce a record.
    pub fn parse_line(&mut self, line: &str) -> Option<LogRecord> {
        if line.starts_with("---") {
            return None;
        }

        let now = match self.parse_timestamp(line) {
            Some(at) => {
                self.last_seen = at;
                at
            }
            // Unparseable prefix: ignorable, carries the last known time.
            None => return Some(LogRecord::Plain { at: self.last_seen }),
        };

        if !line.contains(&self.marker) {
            return Some(LogRecord::Plain { at: now });
        }

        // ASCII lowercasing preserves byte offsets, so positions found in
        // `lower` index into `line` as well.
        let lower = line.to_ascii_lowercase();

        if lower.contains(CRASH_TOKEN) {
            return Some(LogRecord::Crash { at: now });
        }

        let event = lower.find(EVENT_TOKEN);
        let warning = lower.find(WARNING_TOKEN);
        let (is_event, id_start) = match (event, warning) {
            (None, None) => return Some(LogRecord::Plain { at: now }),
            (Some(e), None) => (true, e + EVENT_TOKEN.len()),
            (None, Some(w)) => (false, w + WARNING_TOKEN.len()),
            (Some(e), Some(w)) if e < w => (true, e + EVENT_TOKEN.len()),
            (Some(e), Some(w)) if w < e => (false, w + WARNING_TOKEN.len()),
            _ => return Some(LogRecord::Plain { at: now }),
        };

        let Some(symbol) = extract_symbol(&line[id_start..]) else {
            // Missing ':' terminator or an invalid id: never miscode it.
            return Some(LogRecord::Plain { at: now });
        };

        Some(if is_event {
            LogRecord::Event { symbol, at: now }
        } else {
            LogRecord::Warning { symbol, at: now }
        })
    }

    /// Reconstruct the full timestamp from the `MM-DD HH:MM:SS.mmm`
    /// prefix by prefixing the session year; milliseconds are dropped.
    fn parse_timestamp(&self, line: &str) -> Option<NaiveDateTime> {
        let mut parts = line.split_whitespace();
        let date = parts.next()?;
        let time = parts.next()?.split('.').next()?;
        NaiveDateTime::parse_from_str(&format!("{}-{date} {time}", self.year), TIMESTAMP_FORMAT)
            .ok()
    }
}

/// Read the raw id up to the next `:` and canonicalize it.
fn extract_symbol(rest: &str) -> Option<char> {
    let (raw, _) = rest.split_once(':')?;
    canonicalize_symbol(raw.trim())
}

/// Canonicalize a raw symbol id to a single alphabet character.
///
/// A one-character id passes through unchanged. A multi-character id that
/// parses as an integer in `10..=35` folds to `'a'..='z'` (base-36-style
/// digit-to-letter folding). Anything else is invalid and yields `None`.
pub fn canonicalize_symbol(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Some(symbol),
        (Some(_), Some(_)) => {
            let value: u32 = raw.parse().ok()?;
            if (10..=35).contains(&value) {
                char::from_u32(u32::from('a') + value - 10)
            } else {
                None
            }
        }
        (None, _) => None,
    }
}
