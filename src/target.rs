//! Per-target layout and configuration.
//!
//! A target is one `instrumented-<app>-#<bug>.apk.<tool>.result` directory
//! plus its sibling configuration and automaton-description artifacts.
//! Directory *scanning* is the caller's job; this module only resolves the
//! conventional artifact paths for a single result directory and loads the
//! per-app configuration.

use crate::error::{ConfigurationError, Error, MissingArtifactError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Descriptive configuration for one event symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInfo {
    pub info: String,
    pub reason: String,
    pub dependency: String,
}

/// Per-app target configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub app_name: String,
    pub bug_id: String,
    pub warnings: BTreeMap<String, String>,
    pub events: BTreeMap<String, EventInfo>,
    pub all_events_happened: String,
}

impl TargetConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = serde_json::from_str(&content).map_err(|e| ConfigurationError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }
}

/// One resolved analysis target with its artifact paths.
#[derive(Debug, Clone)]
pub struct Target {
    /// The result directory itself.
    pub dir: PathBuf,
    /// File name of the result directory.
    pub dir_name: String,
    /// App name parsed from the directory name.
    pub app_name: String,
    /// Bug id parsed from the directory name, with its leading `#`.
    pub bug_id: String,
    /// Normalized tool name.
    pub tool_name: String,
    /// Sibling `<app>/configuration-<bug>.json`.
    pub config_path: PathBuf,
    /// Sibling `<app>/<bug-sans-#>-NFA.json` description document.
    pub description_path: PathBuf,
    /// `logcat.log` inside the result directory.
    pub logcat_path: PathBuf,
    /// `<tool>_testing_time_on_emulator.txt` inside the result directory.
    pub time_record_path: PathBuf,
}

impl Target {
    /// Parse the result-directory name and derive the conventional
    /// artifact paths, verifying that each required file exists.
    pub fn resolve(dir: &Path) -> Result<Self, Error> {
        let dir_name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| malformed(dir))?
            .to_string();

        let rest = dir_name
            .strip_prefix("instrumented-")
            .ok_or_else(|| malformed(dir))?;
        let hash = rest.find("-#").ok_or_else(|| malformed(dir))?;
        let apk = rest[hash..].find(".apk.").ok_or_else(|| malformed(dir))? + hash;
        let result = rest[apk..].find(".result").ok_or_else(|| malformed(dir))? + apk;

        let app_name = rest[..hash].to_string();
        let bug_id = rest[hash + 1..apk].to_string();
        let tool_name = normalize_tool(&rest[apk + ".apk.".len()..result].to_ascii_lowercase());

        let base = dir.parent().unwrap_or_else(|| Path::new("."));
        let config_path = base.join(&app_name).join(format!("configuration-{bug_id}.json"));
        let description_path = base.join(&app_name).join(format!("{}-NFA.json", &bug_id[1..]));
        let logcat_path = dir.join("logcat.log");
        let time_record_path = dir.join(format!("{tool_name}_testing_time_on_emulator.txt"));

        for path in [&config_path, &description_path, &logcat_path, &time_record_path] {
            if !path.exists() {
                return Err(MissingArtifactError::NotFound(path.clone()).into());
            }
            debug!(path = %path.display(), "Using artifact");
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            dir_name,
            app_name,
            bug_id,
            tool_name,
            config_path,
            description_path,
            logcat_path,
            time_record_path,
        })
    }
}

fn malformed(dir: &Path) -> Error {
    MissingArtifactError::MalformedTargetName {
        dir: dir.display().to_string(),
    }
    .into()
}

/// Canonical tool name, resolving historical aliases.
pub fn normalize_tool(raw: &str) -> String {
    match raw {
        "combodroid" => "combo".to_string(),
        "droidbot.dfs.greedy" => "droidbot".to_string(),
        other => other.to_string(),
    }
}

/// Time-record format for a *normalized* tool name.
pub fn time_format(tool: &str) -> &'static str {
    match tool {
        "combo" => "%Y-%m-%d-%H-%M-%S",
        _ => "%Y-%m-%d-%H:%M:%S",
    }
}
