//! Tests for the batch driver's failure resilience and aggregation.

use fuzztrace::{run_batch, Error};
use std::path::{Path, PathBuf};

const NFA_JSON: &str = r#"{
    "states": [
        {"id": 0, "name": "q0", "type": "INITIAL"},
        {"id": 1, "name": "q1", "type": "FINAL"}
    ],
    "transitions": [{"from": 0, "to": 1, "read": "a"}]
}"#;

fn config_json(app: &str) -> String {
    format!(
        r##"{{
            "app_name": "{app}",
            "bug_id": "#7",
            "warnings": {{}},
            "events": {{"a": {{"info": "tap", "reason": "", "dependency": ""}}}},
            "all_events_happened": "done"
        }}"##
    )
}

fn write_target(root: &Path, app: &str) -> PathBuf {
    let app_dir = root.join(app);
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("configuration-#7.json"), config_json(app)).unwrap();
    std::fs::write(app_dir.join("7-NFA.json"), NFA_JSON).unwrap();

    let result_dir = root.join(format!("instrumented-{app}-#7.apk.monkey.result"));
    std::fs::create_dir_all(&result_dir).unwrap();
    std::fs::write(
        result_dir.join("logcat.log"),
        "05-24 13:00:30.000 I Themis: Event a: tapped\n",
    )
    .unwrap();
    std::fs::write(
        result_dir.join("monkey_testing_time_on_emulator.txt"),
        "2023-05-24-13:00:00\n2023-05-24-13:01:00\n",
    )
    .unwrap();

    result_dir
}

#[test]
fn one_broken_target_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_target(dir.path(), "goodapp");
    let broken = write_target(dir.path(), "badapp");
    // Break the second target's automaton description.
    std::fs::write(dir.path().join("badapp/7-NFA.json"), "{not json").unwrap();

    let report = run_batch(&[good, broken.clone()]);

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].dir, broken);
    assert!(matches!(report.failures[0].error, Error::Automaton(_)));
    assert_eq!(report.summary.failed_targets(), &[broken]);

    // The good target's result survived intact.
    let result = &report.results[0];
    assert_eq!(result.app_name(), "goodapp");
    assert_eq!(result.event_coverage(), Some(1.0));
}

#[test]
fn any_per_target_error_kind_is_absorbed() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_target(dir.path(), "goodapp");

    // Start-time failure.
    let bad_time = write_target(dir.path(), "badtime");
    std::fs::write(
        bad_time.join("monkey_testing_time_on_emulator.txt"),
        "not a time\n",
    )
    .unwrap();

    // Missing artifact.
    let missing = write_target(dir.path(), "missing");
    std::fs::remove_file(missing.join("logcat.log")).unwrap();

    let report = run_batch(&[good, bad_time, missing]);

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 2);
    assert!(report
        .failures
        .iter()
        .any(|f| matches!(f.error, Error::StartTime(_))));
    assert!(report
        .failures
        .iter()
        .any(|f| matches!(f.error, Error::MissingArtifact(_))));
}

#[test]
fn summaries_aggregate_by_tool_app_and_bug() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_target(dir.path(), "appone");
    let second = write_target(dir.path(), "apptwo");

    let report = run_batch(&[first, second]);
    assert_eq!(report.failed(), 0);

    let tree = report.summary.tree();
    let monkey = tree.get("monkey").unwrap();
    assert_eq!(monkey.len(), 2);
    let summaries = monkey.get("appone").unwrap().get("#7").unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].event_coverage, Some(1.0));
    assert!(!summaries[0].has_crash);
}

#[test]
fn empty_batch_reports_nothing() {
    let report = run_batch::<PathBuf>(&[]);
    assert_eq!(report.succeeded(), 0);
    assert_eq!(report.failed(), 0);
    assert!(report.summary.tree().is_empty());
}
