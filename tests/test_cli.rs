use assert_cmd::Command;
use predicates::prelude::*;

mod common;

fn tracker_cmd(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("claude-tracker").unwrap();
    cmd.env("CLAUDE_HOME", home)
        .env("CLAUDE_TRACKER_HISTORY_FILE", home.join("usage_history.json"))
        .env("ANTHROPIC_API_KEY", "")
        .env("LOG_LEVEL", "error");
    cmd
}

#[test]
fn test_report_json_on_empty_home() -> anyhow::Result<()> {
    let home = common::setup_claude_home()?;

    tracker_cmd(home.path())
        .args(["report", "--json", "--skip-probe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"aggregate\""))
        .stdout(predicate::str::contains("\"totalSessions\": 0"));
    Ok(())
}

#[test]
fn test_report_json_with_sessions() -> anyhow::Result<()> {
    let home = common::setup_claude_home()?;
    common::write_transcript(
        home.path(),
        "-Users-test-workspace-demo",
        "session.jsonl",
        &common::sample_lines(),
    )?;

    tracker_cmd(home.path())
        .args(["report", "--json", "--skip-probe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalSessions\": 1"))
        .stdout(predicate::str::contains("\"totalInputTokens\": 100"))
        .stdout(predicate::str::contains("\"project\": \"demo\""));

    // The pass persisted a snapshot.
    let history = std::fs::read_to_string(home.path().join("usage_history.json"))?;
    assert!(history.contains("\"total_sessions\": 1"));
    Ok(())
}

#[test]
fn test_report_human_readable() -> anyhow::Result<()> {
    let home = common::setup_claude_home()?;
    common::write_transcript(
        home.path(),
        "-Users-test-workspace-demo",
        "session.jsonl",
        &common::sample_lines(),
    )?;

    tracker_cmd(home.path())
        .args(["report", "--skip-probe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CLAUDE CODE - LOCAL USAGE"))
        .stdout(predicate::str::contains("TOP PROJECTS"))
        .stdout(predicate::str::contains("API PRICING REFERENCE"));
    Ok(())
}

#[test]
fn test_history_command() -> anyhow::Result<()> {
    let home = common::setup_claude_home()?;

    tracker_cmd(home.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshots stored : 0"));
    Ok(())
}

#[test]
fn test_probe_without_key_is_not_an_error() -> anyhow::Result<()> {
    let home = common::setup_claude_home()?;

    tracker_cmd(home.path())
        .arg("probe")
        .assert()
        .success()
        .stdout(predicate::str::contains("probe skipped"));
    Ok(())
}
