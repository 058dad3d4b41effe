//! Integration tests for the `leaflink` CLI binary.
//!
//! These validate argument parsing, help output, shell completions, and
//! error handling — all without a live backend or broker.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `leaflink` binary with env isolation.
///
/// Clears all `LEAFLINK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn leaflink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("leaflink");
    cmd.env("HOME", "/tmp/leaflink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/leaflink-cli-test-nonexistent")
        .env_remove("LEAFLINK_SERVER")
        .env_remove("LEAFLINK_TOKEN")
        .env_remove("LEAFLINK_NAMESPACE")
        .env_remove("LEAFLINK_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = leaflink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    leaflink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("plant")
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("pair")),
    );
}

#[test]
fn test_version_flag() {
    leaflink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("leaflink"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    leaflink_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    leaflink_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    leaflink_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = leaflink_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_plants_requires_login() {
    let output = leaflink_cmd().arg("plants").output().unwrap();
    assert_eq!(output.status.code(), Some(3), "Expected auth exit code");
    let text = combined_output(&output);
    assert!(
        text.contains("signed in") || text.contains("login"),
        "Expected a sign-in hint:\n{text}"
    );
}

#[test]
fn test_watch_requires_login() {
    leaflink_cmd()
        .args(["watch", "some-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("login").or(predicate::str::contains("signed in")));
}

#[test]
fn test_invalid_output_format() {
    let output = leaflink_cmd()
        .args(["--output", "invalid", "plants"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` renders defaults even when no file exists.
    leaflink_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("namespace"));
}

#[test]
fn test_config_path_prints_path() {
    leaflink_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_subcommands_exist() {
    leaflink_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("path")),
    );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_watch_help_lists_flags() {
    leaflink_cmd()
        .args(["watch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--interval").and(predicate::str::contains("--once")));
}

#[test]
fn test_pair_help_lists_skip_wait() {
    leaflink_cmd()
        .args(["pair", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-wait"));
}
