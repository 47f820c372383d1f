use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::Path;

/// Command for the notekeep binary with config lookup isolated from the host
pub fn notekeep() -> Command {
    let mut cmd = cargo_bin_cmd!("notekeep");
    cmd.env_remove("NOTEKEEP_CONFIG")
        .env_remove("NOTEKEEP_DATABASE")
        .env_remove("NOTEKEEP_LOG");
    cmd
}

/// Command bound to a database file
pub fn notekeep_at(db: &Path) -> Command {
    let mut cmd = notekeep();
    cmd.arg("--database").arg(db);
    cmd
}

/// Run a command expected to succeed and parse its stdout as JSON
#[allow(dead_code)]
pub fn run_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
