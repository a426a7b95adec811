//! Integration tests for the `oss` binary's command-line surface.
//!
//! None of these reach the point of running a worker; the end-to-end run
//! with real worker processes lives in the worker crate.

use std::process::{Command, Output};

fn oss(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oss"))
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("OSS_TASK_QUOTA")
        .env_remove("OSS_CONCURRENCY")
        .env_remove("OSS_TIME_LIMIT")
        .env_remove("OSS_LAUNCH_INTERVAL_MS")
        .env_remove("OSS_CLOCK_REGION")
        .env_remove("OSS_WORKER_BIN")
        .output()
        .expect("failed to run oss")
}

#[test]
fn help_prints_usage_and_exits_zero() {
    let out = oss(&["-h"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("-n"));
    assert!(stdout.contains("-i"));
}

#[test]
fn unknown_flag_is_rejected() {
    let out = oss(&["--bogus"]);
    assert!(!out.status.success());
}

#[test]
fn zero_task_quota_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let region = dir.path().join("clock");
    let out = oss(&["-n", "0", "--region", region.to_str().unwrap()]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid configuration"));
    assert!(!region.exists(), "no shared state before validation");
}

#[test]
fn zero_time_limit_is_a_configuration_error() {
    let out = oss(&["-n", "1", "-t", "0"]);
    assert!(!out.status.success());
}

#[test]
fn negative_concurrency_is_rejected() {
    let out = oss(&["-n", "1", "-s", "-1"]);
    assert!(!out.status.success());
}

#[test]
fn missing_worker_binary_fails_and_releases_region() {
    let dir = tempfile::tempdir().unwrap();
    let region = dir.path().join("clock");
    let missing = dir.path().join("no-such-worker");
    let out = oss(&[
        "-n",
        "1",
        "-s",
        "1",
        "-t",
        "1",
        "-i",
        "0",
        "--worker-bin",
        missing.to_str().unwrap(),
        "--region",
        region.to_str().unwrap(),
    ]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("scheduler aborted"));
    assert!(!region.exists());
}

#[test]
fn config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("oss.toml");
    std::fs::write(&config, "task_quota = 0\n").unwrap();

    let out = oss(&["--config", config.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("task quota"));
}
