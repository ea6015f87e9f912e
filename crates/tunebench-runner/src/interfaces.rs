// crates/tunebench-runner/src/interfaces.rs
// ============================================================================
// Module: Runner Interfaces
// Description: Backend-agnostic traits for environments, probes, and time.
// Purpose: Keep the lifecycle controller independent of Docker and sockets.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The lifecycle controller only talks to external systems through these
//! traits. [`Environment`] manages named, isolated runtime instances (Docker
//! containers in production), [`ReadinessProbe`] answers whether the
//! provisioned service accepts connections, and [`Clock`] supplies monotonic
//! time and sleeping so polling loops can be driven virtually in tests.
//!
//! Environment names are unique: launching a name that already exists is an
//! error, so callers remove stale instances first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Environment Types
// ============================================================================

/// Handle to a launched environment instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentHandle {
    /// Unique environment name.
    pub name: String,
    /// Backend identifier (container id).
    pub id: String,
}

/// Lifecycle status reported by the environment backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentStatus {
    /// Created but not started.
    Created,
    /// Running.
    Running,
    /// Paused.
    Paused,
    /// Restarting.
    Restarting,
    /// Being removed.
    Removing,
    /// Exited.
    Exited,
    /// Dead.
    Dead,
    /// Status label not recognized.
    Unknown(String),
}

impl EnvironmentStatus {
    /// Parses a Docker status label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns the status label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Exited => "exited",
            Self::Dead => "dead",
            Self::Unknown(label) => label,
        }
    }

    /// Returns true when the instance is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true when the instance has stopped and will not recover.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited | Self::Dead)
    }
}

impl fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host directory mounted into an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Absolute host path.
    pub host: PathBuf,
    /// Path inside the environment.
    pub container: String,
    /// Mount read-only when true.
    pub read_only: bool,
}

impl VolumeMount {
    /// Builds a read-write mount.
    #[must_use]
    pub fn read_write(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            read_only: false,
        }
    }

    /// Builds a read-only mount.
    #[must_use]
    pub fn read_only(host: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            read_only: true,
        }
    }
}

/// Published port mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// Port inside the environment.
    pub container_port: u16,
    /// Port on the host.
    pub host_port: u16,
    /// Transport protocol label.
    pub protocol: String,
}

impl PortMapping {
    /// Builds a TCP mapping.
    #[must_use]
    pub fn tcp(container_port: u16, host_port: u16) -> Self {
        Self {
            container_port,
            host_port,
            protocol: "tcp".to_string(),
        }
    }
}

/// CPU and memory caps for an environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// CPU cap in virtual CPUs.
    pub cpus: Option<f64>,
    /// Memory cap in GiB.
    pub memory_gb: Option<f64>,
}

impl ResourceLimits {
    /// Returns limits that cap nothing.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            cpus: None,
            memory_gb: None,
        }
    }

    /// Returns true when no cap is set.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.cpus.is_none() && self.memory_gb.is_none()
    }
}

/// Everything needed to launch one environment instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Image reference.
    pub image: String,
    /// Unique instance name.
    pub name: String,
    /// Host directory mounts.
    pub volumes: Vec<VolumeMount>,
    /// Environment variables.
    pub env: BTreeMap<String, String>,
    /// Published ports.
    pub ports: Vec<PortMapping>,
    /// Resource caps.
    pub limits: ResourceLimits,
    /// Optional `uid:gid` to run as.
    pub user: Option<String>,
    /// Run with extended privileges.
    pub privileged: bool,
    /// Share the host network namespace.
    pub network_host: bool,
    /// Command arguments passed after the image.
    pub command: Vec<String>,
}

impl LaunchSpec {
    /// Builds a spec with no mounts, ports, limits, or command.
    #[must_use]
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            volumes: Vec::new(),
            env: BTreeMap::new(),
            ports: Vec::new(),
            limits: ResourceLimits::unlimited(),
            user: None,
            privileged: false,
            network_host: false,
            command: Vec::new(),
        }
    }
}

/// Result of running a command inside an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutput {
    /// Process exit code.
    pub exit_code: i64,
    /// Combined output text.
    pub output: String,
}

impl ExecOutput {
    /// Returns true when the command exited with code zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

// ============================================================================
// SECTION: Environment Errors
// ============================================================================

/// Environment backend errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    /// Named instance does not exist.
    #[error("environment not found: {name}")]
    NotFound {
        /// Instance name.
        name: String,
    },
    /// Backend call failed.
    #[error("environment backend error: {0}")]
    Backend(String),
}

impl EnvironmentError {
    /// Returns true for [`EnvironmentError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Isolated runtime manager.
pub trait Environment {
    /// Launches a new instance and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when the backend cannot launch it.
    fn launch(&self, spec: &LaunchSpec) -> Result<EnvironmentHandle, EnvironmentError>;

    /// Looks up an instance by name.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Backend`] when the lookup fails.
    fn get(&self, name: &str) -> Result<Option<EnvironmentHandle>, EnvironmentError>;

    /// Reports the current status of an instance.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::NotFound`] when the instance is gone.
    fn status(&self, handle: &EnvironmentHandle) -> Result<EnvironmentStatus, EnvironmentError>;

    /// Stops a running instance.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when the instance cannot be stopped.
    fn stop(&self, handle: &EnvironmentHandle) -> Result<(), EnvironmentError>;

    /// Removes an instance, killing it first when `force` is set.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when the instance cannot be removed.
    fn remove(&self, handle: &EnvironmentHandle, force: bool) -> Result<(), EnvironmentError>;

    /// Runs a command inside a running instance and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when the command cannot be started.
    fn exec(
        &self,
        handle: &EnvironmentHandle,
        command: &[String],
    ) -> Result<ExecOutput, EnvironmentError>;

    /// Blocks until the instance exits and returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when waiting fails.
    fn wait(&self, handle: &EnvironmentHandle) -> Result<i64, EnvironmentError>;

    /// Streams the instance's log lines until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when the log stream cannot be opened.
    fn follow_logs(
        &self,
        handle: &EnvironmentHandle,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<(), EnvironmentError>;
}

// ============================================================================
// SECTION: Readiness
// ============================================================================

/// Connectivity check for a provisioned service.
pub trait ReadinessProbe {
    /// Returns true when the service accepts connections.
    fn is_ready(&self) -> bool;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Monotonic time source with sleeping.
pub trait Clock: Send + Sync {
    /// Returns monotonic time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Sleeps for the given duration.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}
