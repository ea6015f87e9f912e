// crates/tunebench-runner/tests/docker_cli.rs
// ============================================================================
// Module: Docker CLI Tests
// Description: DockerCli behavior against a scripted stand-in binary.
// Purpose: Verify log following carries both container output streams.
// ============================================================================

//! Docker CLI tests.

#![cfg(unix)]
#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use tunebench_runner::DockerCli;
use tunebench_runner::Environment;
use tunebench_runner::EnvironmentError;
use tunebench_runner::EnvironmentHandle;

/// Writes an executable shell script standing in for `docker`.
fn fake_docker(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Handle for the BenchBase container.
fn benchbase() -> EnvironmentHandle {
    EnvironmentHandle {
        name: "tunebench-benchbase".to_string(),
        id: "abc123".to_string(),
    }
}

/// Collects every line `follow_logs` forwards.
fn followed(docker: &DockerCli) -> (Result<(), EnvironmentError>, Vec<String>) {
    let mut lines = Vec::new();
    let result = docker.follow_logs(&benchbase(), &mut |line: &str| lines.push(line.to_string()));
    lines.sort();
    (result, lines)
}

/// Tests followed logs carry both output streams.
#[test]
fn followed_logs_carry_both_output_streams() {
    // Both scripts are written before either runs so no write handle is open
    // while a child executes.
    let dir = TempDir::new().unwrap();
    let streaming = fake_docker(
        dir.path(),
        "docker-ok",
        "echo out-line\necho err-line >&2\necho \"args: $*\"",
    );
    let failing = fake_docker(dir.path(), "docker-fail", "echo 'No such container' >&2\nexit 1");

    let (result, lines) = followed(&DockerCli::with_binary(streaming));
    result.unwrap();
    assert_eq!(
        lines,
        vec![
            "args: logs --follow tunebench-benchbase".to_string(),
            "err-line".to_string(),
            "out-line".to_string(),
        ]
    );

    let (result, lines) = followed(&DockerCli::with_binary(failing));
    assert!(matches!(result, Err(EnvironmentError::Backend(_))));
    assert_eq!(lines, vec!["No such container".to_string()]);
}
