// crates/tunebench-runner/src/docker.rs
// ============================================================================
// Module: Docker CLI Environment
// Description: Environment implementation backed by the `docker` binary.
// Purpose: Launch, inspect, and tear down benchmark containers.
// Dependencies: std::{process, sync::mpsc, thread}, crate::interfaces
// ============================================================================

//! ## Overview
//! [`DockerCli`] drives containers through the `docker` command line. Every
//! call is a blocking subprocess; argument lists are built as vectors and
//! never pass through a shell. Missing containers are reported as
//! [`EnvironmentError::NotFound`] by matching the CLI's "No such" messages.
//!
//! Followed logs carry both container streams. Each pipe is drained on its
//! own reader thread and lines reach the caller on the calling thread, in
//! arrival order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;
use std::sync::mpsc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::interfaces::Environment;
use crate::interfaces::EnvironmentError;
use crate::interfaces::EnvironmentHandle;
use crate::interfaces::EnvironmentStatus;
use crate::interfaces::ExecOutput;
use crate::interfaces::LaunchSpec;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default Docker binary name.
pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// Markers the CLI prints for missing objects.
const NOT_FOUND_MARKERS: [&str; 2] = ["No such container", "No such object"];

// ============================================================================
// SECTION: Docker CLI
// ============================================================================

/// Docker command-line environment.
#[derive(Debug, Clone)]
pub struct DockerCli {
    /// Docker binary path or name.
    binary: PathBuf,
}

impl DockerCli {
    /// Uses the `docker` binary found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_DOCKER_BINARY)
    }

    /// Uses a specific Docker binary.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Checks that the Docker daemon answers.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Backend`] when `docker info` fails.
    pub fn ensure_available(&self) -> Result<(), EnvironmentError> {
        let output = self.output(&["info".to_string()])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EnvironmentError::Backend(format!("docker info failed: {}", stderr.trim())));
        }
        Ok(())
    }

    /// Runs the binary and captures its output.
    fn output(&self, args: &[String]) -> Result<Output, EnvironmentError> {
        Command::new(&self.binary).args(args).stdin(Stdio::null()).output().map_err(|err| {
            EnvironmentError::Backend(format!("failed to spawn {}: {err}", self.binary.display()))
        })
    }

    /// Runs the binary and returns trimmed stdout, classifying failures.
    fn checked(&self, name: &str, args: &[String]) -> Result<String, EnvironmentError> {
        let output = self.output(args)?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }
        let verb = args.first().map_or("", String::as_str);
        Err(classify_failure(name, verb, &String::from_utf8_lossy(&output.stderr)))
    }

    /// Reads one `docker inspect` template field.
    fn inspect(&self, name: &str, template: &str) -> Result<String, EnvironmentError> {
        let args = ["inspect", "--format", template, name].map(ToString::to_string);
        self.checked(name, &args)
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for DockerCli {
    fn launch(&self, spec: &LaunchSpec) -> Result<EnvironmentHandle, EnvironmentError> {
        let id = self.checked(&spec.name, &launch_args(spec))?;
        Ok(EnvironmentHandle {
            name: spec.name.clone(),
            id,
        })
    }

    fn get(&self, name: &str) -> Result<Option<EnvironmentHandle>, EnvironmentError> {
        match self.inspect(name, "{{.Id}}") {
            Ok(id) => Ok(Some(EnvironmentHandle {
                name: name.to_string(),
                id,
            })),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn status(&self, handle: &EnvironmentHandle) -> Result<EnvironmentStatus, EnvironmentError> {
        let label = self.inspect(&handle.name, "{{.State.Status}}")?;
        Ok(EnvironmentStatus::from_label(&label))
    }

    fn stop(&self, handle: &EnvironmentHandle) -> Result<(), EnvironmentError> {
        self.checked(&handle.name, &["stop".to_string(), handle.name.clone()]).map(|_| ())
    }

    fn remove(&self, handle: &EnvironmentHandle, force: bool) -> Result<(), EnvironmentError> {
        let mut args = vec!["rm".to_string()];
        if force {
            args.push("--force".to_string());
        }
        args.push(handle.name.clone());
        self.checked(&handle.name, &args).map(|_| ())
    }

    fn exec(
        &self,
        handle: &EnvironmentHandle,
        command: &[String],
    ) -> Result<ExecOutput, EnvironmentError> {
        let mut args = vec!["exec".to_string(), handle.name.clone()];
        args.extend(command.iter().cloned());
        let output = self.output(&args)?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() && is_not_found(&stderr) {
            return Err(EnvironmentError::NotFound {
                name: handle.name.clone(),
            });
        }
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&stderr);
        Ok(ExecOutput {
            exit_code: output.status.code().map_or(-1, i64::from),
            output: text,
        })
    }

    fn wait(&self, handle: &EnvironmentHandle) -> Result<i64, EnvironmentError> {
        let code = self.checked(&handle.name, &["wait".to_string(), handle.name.clone()])?;
        code.parse::<i64>().map_err(|_| {
            EnvironmentError::Backend(format!("docker wait returned a non-numeric code: {code}"))
        })
    }

    fn follow_logs(
        &self,
        handle: &EnvironmentHandle,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<(), EnvironmentError> {
        let mut child = Command::new(&self.binary)
            .args(["logs", "--follow", handle.name.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| EnvironmentError::Backend(format!("failed to follow logs: {err}")))?;
        let unavailable = || EnvironmentError::Backend("log stream unavailable".to_string());
        let stdout = child.stdout.take().ok_or_else(unavailable)?;
        let stderr = child.stderr.take().ok_or_else(unavailable)?;
        let (sender, receiver) = mpsc::channel();
        thread::scope(|scope| {
            let err_sender = sender.clone();
            scope.spawn(move || send_lines(stdout, &sender));
            scope.spawn(move || send_lines(stderr, &err_sender));
            for line in receiver {
                on_line(&line);
            }
        });
        let status = child
            .wait()
            .map_err(|err| EnvironmentError::Backend(format!("log stream failed: {err}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(EnvironmentError::Backend(format!("docker logs exited with {status}")))
        }
    }
}

// ============================================================================
// SECTION: Argument Construction
// ============================================================================

/// Builds the `docker run` argument list for a launch spec.
///
/// Containers always start detached; the command follows the image.
#[must_use]
pub fn launch_args(spec: &LaunchSpec) -> Vec<String> {
    let mut args = vec!["run".to_string(), "--detach".to_string(), "--name".to_string()];
    args.push(spec.name.clone());
    if spec.privileged {
        args.push("--privileged".to_string());
    }
    if spec.network_host {
        args.push("--network".to_string());
        args.push("host".to_string());
    }
    if let Some(user) = &spec.user {
        args.push("--user".to_string());
        args.push(user.clone());
    }
    if let Some(cpus) = spec.limits.cpus {
        args.push("--cpus".to_string());
        args.push(cpus.to_string());
    }
    if let Some(memory) = spec.limits.memory_gb {
        args.push("--memory".to_string());
        args.push(format!("{memory}g"));
    }
    for volume in &spec.volumes {
        let mode = if volume.read_only { "ro" } else { "rw" };
        args.push("--volume".to_string());
        args.push(format!("{}:{}:{mode}", volume.host.display(), volume.container));
    }
    for (key, value) in &spec.env {
        args.push("--env".to_string());
        args.push(format!("{key}={value}"));
    }
    for port in &spec.ports {
        args.push("--publish".to_string());
        args.push(format!("{}:{}/{}", port.host_port, port.container_port, port.protocol));
    }
    args.push(spec.image.clone());
    args.extend(spec.command.iter().cloned());
    args
}

/// Sends each line of `stream` until it closes or the receiver is gone.
fn send_lines(stream: impl Read, sender: &Sender<String>) {
    for line in BufReader::new(stream).lines() {
        let Ok(line) = line else {
            break;
        };
        if sender.send(line).is_err() {
            break;
        }
    }
}

/// Returns true when CLI output reports a missing object.
fn is_not_found(stderr: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|marker| stderr.contains(marker))
}

/// Maps a failed CLI call to an environment error.
fn classify_failure(name: &str, verb: &str, stderr: &str) -> EnvironmentError {
    if is_not_found(stderr) {
        EnvironmentError::NotFound {
            name: name.to_string(),
        }
    } else {
        EnvironmentError::Backend(format!("docker {verb} {name} failed: {}", stderr.trim()))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;
    use crate::interfaces::PortMapping;
    use crate::interfaces::ResourceLimits;
    use crate::interfaces::VolumeMount;

    #[test]
    fn missing_container_messages_map_to_not_found() {
        let err = classify_failure(
            "tunebench-mysql",
            "inspect",
            "Error: No such object: tunebench-mysql\n",
        );
        assert!(err.is_not_found());
        let err = classify_failure("tunebench-mysql", "stop", "permission denied\n");
        assert_eq!(
            err,
            EnvironmentError::Backend(
                "docker stop tunebench-mysql failed: permission denied".to_string()
            )
        );
    }

    #[test]
    fn launch_args_follow_flag_order() {
        let mut spec = LaunchSpec::new("mysql:8.0", "tunebench-mysql");
        spec.privileged = true;
        spec.user = Some("1000:1000".to_string());
        spec.limits = ResourceLimits {
            cpus: Some(4.0),
            memory_gb: Some(8.5),
        };
        spec.volumes.push(VolumeMount::read_only("/data/custom.cnf", "/etc/mysql/conf.d/c.cnf"));
        spec.env.insert("MYSQL_USER".to_string(), "admin".to_string());
        spec.ports.push(PortMapping::tcp(3306, 3307));
        spec.command = vec!["--skip-log-bin".to_string()];

        let args = launch_args(&spec);

        let expected = [
            "run",
            "--detach",
            "--name",
            "tunebench-mysql",
            "--privileged",
            "--user",
            "1000:1000",
            "--cpus",
            "4",
            "--memory",
            "8.5g",
            "--volume",
            "/data/custom.cnf:/etc/mysql/conf.d/c.cnf:ro",
            "--env",
            "MYSQL_USER=admin",
            "--publish",
            "3307:3306/tcp",
            "mysql:8.0",
            "--skip-log-bin",
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn host_network_spec_has_no_published_ports() {
        let mut spec = LaunchSpec::new("benchbase:latest", "tunebench-benchbase");
        spec.network_host = true;

        let args = launch_args(&spec);

        let expected = [
            "run",
            "--detach",
            "--name",
            "tunebench-benchbase",
            "--network",
            "host",
            "benchbase:latest",
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn missing_binary_is_a_backend_error() {
        let docker = DockerCli::with_binary("/nonexistent/tunebench-docker");
        let err = docker.ensure_available().unwrap_err();
        assert!(matches!(err, EnvironmentError::Backend(_)));
    }
}
