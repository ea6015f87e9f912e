// crates/tunebench-runner/src/drivers/mod.rs
// ============================================================================
// Module: Target Drivers
// Description: Target-specific provisioning, execution, and collection.
// Purpose: Keep the lifecycle controller free of per-target details.
// Dependencies: tunebench-core, crate::{interfaces, error, state}
// ============================================================================

//! ## Overview
//! A [`TargetDriver`] owns one target's configuration space and knows how to
//! launch its environment, run its workload, and read its results. The
//! lifecycle controller sequences the stages; drivers fill them in.
//!
//! - [`DatabaseDriver`]: MySQL server plus a BenchBase workload container.
//! - [`CompilerDriver`]: long-lived GCC or LLVM benchmark container driven
//!   through `exec`.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod compiler;
mod database;

pub use compiler::CompilerDriver;
pub use compiler::load_programs;
pub use database::BENCHBASE_WORKLOADS;
pub use database::DatabaseDriver;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use tunebench_core::ConfigurationSpace;
use tunebench_core::EncodedConfiguration;
use tunebench_core::Encoder;
use tunebench_core::Target;

use crate::error::StageError;
use crate::interfaces::Environment;
use crate::interfaces::EnvironmentError;
use crate::interfaces::EnvironmentHandle;
use crate::interfaces::LaunchSpec;
use crate::state::MetricsRecord;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Callback receiving workload log lines in attached mode.
pub type LogSink<'a> = Option<&'a mut dyn FnMut(&str)>;

/// How the primary environment is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionMode {
    /// With the encoded configuration and resource limits applied.
    Configured,
    /// Without custom configuration or limits, for data loading.
    Bare,
}

/// Readiness polling bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPlan {
    /// Delay between checks.
    pub interval: Duration,
    /// Total time allowed.
    pub timeout: Duration,
}

// ============================================================================
// SECTION: Driver Trait
// ============================================================================

/// Target-specific lifecycle stages.
pub trait TargetDriver {
    /// Returns the target served.
    fn target(&self) -> Target;

    /// Returns the workload identifier.
    fn workload(&self) -> &str;

    /// Returns the primary environment name.
    fn environment_name(&self) -> &str;

    /// Returns the configuration space.
    fn space(&self) -> &ConfigurationSpace;

    /// Returns the configuration space for mutation.
    fn space_mut(&mut self) -> &mut ConfigurationSpace;

    /// Returns the encoder for the space.
    fn encoder(&self) -> &Encoder;

    /// Builds the primary environment launch spec.
    ///
    /// Writing host-side configuration files happens here.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when host files cannot be prepared.
    fn prepare_launch(
        &self,
        encoded: Option<&EncodedConfiguration>,
        mode: ProvisionMode,
    ) -> Result<LaunchSpec, StageError>;

    /// Returns readiness bounds for the provisioning mode.
    fn readiness_plan(&self, mode: ProvisionMode) -> ReadinessPlan;

    /// Runs the workload against the ready environment.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when the workload fails.
    fn execute(
        &self,
        environment: &dyn Environment,
        handle: &EnvironmentHandle,
        encoded: &EncodedConfiguration,
        logs: LogSink<'_>,
    ) -> Result<(), StageError>;

    /// Parses the results artifact.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::MissingArtifact`] or
    /// [`StageError::InvalidArtifact`] when results are unusable.
    fn collect(&self) -> Result<MetricsRecord, StageError>;

    /// Returns true when the target has a data loading phase.
    fn supports_data_loading(&self) -> bool;

    /// Loads benchmark data into a ready, bare environment.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when loading fails.
    fn load_data(
        &self,
        environment: &dyn Environment,
        logs: LogSink<'_>,
    ) -> Result<(), StageError>;

    /// Returns the command that shuts the service down gracefully.
    fn shutdown_command(&self) -> Option<Vec<String>>;

    /// Returns how long a graceful shutdown may take.
    fn stop_timeout(&self) -> Duration;
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves a host path against the working directory.
fn absolute(path: &Path) -> Result<PathBuf, StageError> {
    std::path::absolute(path)
        .map_err(|err| StageError::Io(format!("cannot resolve {}: {err}", path.display())))
}

/// Force-removes an instance by name, ignoring absence.
fn remove_if_present(environment: &dyn Environment, name: &str) -> Result<(), EnvironmentError> {
    let Some(handle) = environment.get(name)? else {
        return Ok(());
    };
    match environment.remove(&handle, true) {
        Err(err) if err.is_not_found() => Ok(()),
        other => other,
    }
}

/// Forwards captured output lines to an attached log sink.
fn forward_lines(output: &str, logs: LogSink<'_>) {
    if let Some(on_line) = logs {
        for line in output.lines() {
            on_line(line);
        }
    }
}
