//! End-to-end session tests over on-disk target layouts.

use fuzztrace::{AnalysisSession, Error};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const NFA_JSON: &str = r#"{
    "states": [
        {"id": 0, "name": "q0", "type": "INITIAL"},
        {"id": 1, "name": "q1", "type": "NORMAL"},
        {"id": 2, "name": "q2", "type": "FINAL"}
    ],
    "transitions": [
        {"from": 0, "to": 1, "read": "a"},
        {"from": 1, "to": 2, "read": "b"}
    ]
}"#;

const CONFIG_JSON: &str = r##"{
    "app_name": "myapp",
    "bug_id": "#42",
    "warnings": {"a": "list not refreshed"},
    "events": {
        "a": {"info": "open the list", "reason": "entry point", "dependency": ""},
        "b": {"info": "rotate the screen", "reason": "state loss", "dependency": "a"}
    },
    "all_events_happened": "state lost on rotation"
}"##;

/// Lay out one complete target under `root` and return the result dir.
fn write_target(root: &Path, tool: &str, time_record: &str, logcat: &str) -> PathBuf {
    let app_dir = root.join("myapp");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("configuration-#42.json"), CONFIG_JSON).unwrap();
    std::fs::write(app_dir.join("42-NFA.json"), NFA_JSON).unwrap();

    let result_dir = root.join(format!("instrumented-myapp-#42.apk.{tool}.result"));
    std::fs::create_dir_all(&result_dir).unwrap();
    std::fs::write(result_dir.join("logcat.log"), logcat).unwrap();

    let normalized = fuzztrace::target::normalize_tool(&tool.to_ascii_lowercase());
    std::fs::write(
        result_dir.join(format!("{normalized}_testing_time_on_emulator.txt")),
        time_record,
    )
    .unwrap();

    result_dir
}

fn default_logcat() -> String {
    let mut log = String::new();
    let mut w = |line: &str| writeln!(log, "{line}").unwrap();
    w("--------- beginning of main");
    w("05-24 13:01:00.123  1234  5678 I Themis: Event a: opened the list");
    w("05-24 13:01:30.000  1234  5678 I ActivityManager: unrelated chatter");
    w("05-24 13:02:00.456  1234  5678 I Themis: Event b: rotated");
    w("05-24 13:03:00.789  1234  5678 W Themis: Warning a: list not refreshed");
    w("05-24 13:04:00.000  1234  5678 E Themis: Crash! java.lang.NullPointerException");
    log
}

#[test]
fn full_run_produces_expected_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let target = write_target(
        dir.path(),
        "monkey",
        "2023-05-24-13:00:00\n2023-05-24-13:10:00\n",
        &default_logcat(),
    );

    let result = AnalysisSession::open(&target).unwrap().run().unwrap();

    assert_eq!(result.app_name(), "myapp");
    assert_eq!(result.bug_id(), "#42");
    assert_eq!(result.tool_name(), "monkey");
    assert_eq!(result.reason(), "state lost on rotation");
    assert_eq!(result.elapsed().num_seconds(), 600);

    assert_eq!(result.events()[&'a'].count(), 1);
    assert_eq!(result.events()[&'b'].count(), 1);
    assert_eq!(result.events()[&'a'].warning_count(), 1);
    assert_eq!(
        result.events()[&'a'].first_trigger().unwrap().num_seconds(),
        60
    );
    assert_eq!(result.pairs()[&('a', 'b')].count(), 1);

    assert_eq!(result.event_coverage(), Some(1.0));
    assert_eq!(result.event_pair_coverage(), Some(1.0));

    // Seed at distance 2, q1 once, the final state once.
    assert_eq!(result.histogram().count_of(2), 1);
    assert_eq!(result.histogram().count_of(1), 1);
    assert_eq!(result.histogram().count_of(0), 1);

    assert!(result.has_crash());
    assert_eq!(result.crashes().len(), 1);
    assert_eq!(result.crashes()[0].num_seconds(), 240);

    assert_eq!(result.summary().rendered, "(100%, 100%, 0/2, true)");
}

#[test]
fn missing_end_time_falls_back_to_last_trace_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let target = write_target(
        dir.path(),
        "monkey",
        "2023-05-24-13:00:00\n",
        &default_logcat(),
    );

    let result = AnalysisSession::open(&target).unwrap().run().unwrap();
    // Last parseable trace line is the crash at 13:04:00.
    assert_eq!(result.elapsed().num_seconds(), 240);
}

#[test]
fn unparseable_end_time_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let target = write_target(
        dir.path(),
        "monkey",
        "2023-05-24-13:00:00\nnot a timestamp\n",
        &default_logcat(),
    );

    let result = AnalysisSession::open(&target).unwrap().run().unwrap();
    assert_eq!(result.elapsed().num_seconds(), 240);
}

#[test]
fn empty_trace_yields_zero_elapsed() {
    let dir = tempfile::tempdir().unwrap();
    let target = write_target(dir.path(), "monkey", "2023-05-24-13:00:00\n", "");

    let result = AnalysisSession::open(&target).unwrap().run().unwrap();
    assert_eq!(result.elapsed().num_seconds(), 0);
    assert!(!result.has_crash());
    assert_eq!(result.event_coverage(), Some(0.0));
    // Only the seeded initial distance.
    assert_eq!(result.histogram().min(), 2);
    assert_eq!(result.histogram().max(), 2);
}

#[test]
fn malformed_start_time_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let target = write_target(dir.path(), "monkey", "yesterday at noon\n", &default_logcat());

    let result = AnalysisSession::open(&target).unwrap().run();
    assert!(matches!(result, Err(Error::StartTime(_))));
}

#[test]
fn combodroid_uses_its_own_time_format() {
    let dir = tempfile::tempdir().unwrap();
    // Dash-separated time fields, and the directory carries the raw alias.
    let target = write_target(
        dir.path(),
        "combodroid",
        "2023-05-24-13-00-00\n2023-05-24-13-05-00\n",
        &default_logcat(),
    );

    let session = AnalysisSession::open(&target).unwrap();
    assert_eq!(session.target().tool_name, "combo");

    let result = session.run().unwrap();
    assert_eq!(result.elapsed().num_seconds(), 300);
}

#[test]
fn missing_logcat_is_a_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let target = write_target(dir.path(), "monkey", "2023-05-24-13:00:00\n", "");
    std::fs::remove_file(target.join("logcat.log")).unwrap();

    let result = AnalysisSession::open(&target);
    assert!(matches!(result, Err(Error::MissingArtifact(_))));
}

#[test]
fn malformed_configuration_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = write_target(dir.path(), "monkey", "2023-05-24-13:00:00\n", "");
    std::fs::write(dir.path().join("myapp/configuration-#42.json"), "{broken").unwrap();

    let result = AnalysisSession::open(&target);
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn numeric_ids_fold_into_the_alphabet() {
    // Alphabet {a, b}; the trace uses the numeric spellings 10 and 11.
    let mut log = String::new();
    let mut w = |line: &str| writeln!(log, "{line}").unwrap();
    w("05-24 13:01:00.000 I Themis: Event 10: opened");
    w("05-24 13:02:00.000 I Themis: Event 11: rotated");
    w("05-24 13:03:00.000 I Themis: Event 36: out of range, ignored");

    let dir = tempfile::tempdir().unwrap();
    let target = write_target(dir.path(), "monkey", "2023-05-24-13:00:00\n", &log);

    let result = AnalysisSession::open(&target).unwrap().run().unwrap();
    assert_eq!(result.events()[&'a'].count(), 1);
    assert_eq!(result.events()[&'b'].count(), 1);
    assert_eq!(result.histogram().count_of(0), 1);
}
