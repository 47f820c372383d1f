mod common;

use common::{notekeep, notekeep_at, run_json};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_binary_runs() {
    notekeep().arg("--version").assert().success();
}

#[test]
fn test_binary_help() {
    notekeep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("track"));
}

#[test]
fn test_track_then_summary() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("notekeep.db");

    let tracked = run_json(notekeep_at(&db).args([
        "track",
        "note_created",
        "--user",
        "u1",
        "--data",
        r#"{"note_id":"n1"}"#,
    ]));
    assert_eq!(tracked["success"], true);
    assert_eq!(tracked["data"]["event_type"], "note_created");
    assert_eq!(tracked["data"]["event_data"]["note_id"], "n1");
    assert_eq!(tracked["data"]["ip_address"], "unknown");

    run_json(notekeep_at(&db).args(["track", "page_view", "--user", "u2"]));

    let summary = run_json(notekeep_at(&db).args(["summary", "--user", "u1", "--days", "7"]));
    assert_eq!(summary["success"], true);
    assert_eq!(summary["period"], "7 days");
    assert_eq!(summary["user_id"], "u1");
    assert_eq!(summary["data"]["total_events"], 1);

    let everyone = run_json(notekeep_at(&db).arg("summary"));
    assert_eq!(everyone["user_id"], "all");
    assert_eq!(everyone["data"]["total_events"], 2);
}

#[test]
fn test_track_unknown_event_type_fails() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("notekeep.db");

    notekeep_at(&db)
        .args(["track", "note_exploded"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("\"field\":\"event_type\""));

    let summary = run_json(notekeep_at(&db).arg("summary"));
    assert_eq!(summary["data"]["total_events"], 0);
}

#[test]
fn test_summary_rejects_bad_days() {
    let dir = tempdir().unwrap();

    notekeep_at(&dir.path().join("notekeep.db"))
        .args(["summary", "--days", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn test_tags_and_stats_on_empty_database() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("notekeep.db");

    let tags = run_json(notekeep_at(&db).args(["tags", "--limit", "5"]));
    assert_eq!(tags["success"], true);
    assert_eq!(tags["data"], serde_json::json!([]));
    assert_eq!(tags["total_unique_tags"], 0);

    let stats = run_json(notekeep_at(&db).args(["stats", "--user", "u1"]));
    assert_eq!(stats["user_id"], "u1");
    assert_eq!(stats["data"]["total_notes"], 0);
    assert_eq!(stats["data"]["creation_pattern"], serde_json::json!({}));
}

#[test]
fn test_config_file_sets_defaults() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("notekeep.toml");
    std::fs::write(
        &config,
        format!(
            "database_path = {:?}\ndefault_summary_days = 14\n",
            dir.path().join("from-config.db")
        ),
    )
    .unwrap();

    let summary = run_json(notekeep().arg("--config").arg(&config).arg("summary"));
    assert_eq!(summary["period"], "14 days");
    assert!(dir.path().join("from-config.db").exists());
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempdir().unwrap();

    notekeep()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("stats")
        .assert()
        .failure()
        .code(1);
}
