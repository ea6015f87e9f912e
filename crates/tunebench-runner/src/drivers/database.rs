// crates/tunebench-runner/src/drivers/database.rs
// ============================================================================
// Module: Database Driver
// Description: MySQL server environment with BenchBase workloads.
// Purpose: Provision MySQL with a rendered option file and measure it.
// Dependencies: tunebench-core, tunebench-config, crate::{results, probe}
// ============================================================================

//! ## Overview
//! The primary environment is a MySQL server publishing port 3306 on the
//! configured host port, with the data directory mounted and, in configured
//! mode, the rendered option file mounted into `conf.d`. BenchBase runs in a
//! second container on the host network, reads its XML config from the
//! config directory, and writes `*.summary.json` into the results directory.
//!
//! Data loading provisions MySQL bare (no option file, no limits) and runs
//! BenchBase with `--create=true --load=true`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::time::Duration;

use tunebench_config::DatabaseConfig;
use tunebench_config::TuneBenchConfig;
use tunebench_core::ConfigurationSpace;
use tunebench_core::EncodedConfiguration;
use tunebench_core::Encoder;
use tunebench_core::SpaceDefinition;
use tunebench_core::Target;

use super::LogSink;
use super::ProvisionMode;
use super::ReadinessPlan;
use super::TargetDriver;
use super::absolute;
use super::remove_if_present;
use crate::error::StageError;
use crate::error::TargetError;
use crate::interfaces::Environment;
use crate::interfaces::EnvironmentError;
use crate::interfaces::EnvironmentHandle;
use crate::interfaces::LaunchSpec;
use crate::interfaces::PortMapping;
use crate::interfaces::ResourceLimits;
use crate::interfaces::VolumeMount;
use crate::probe::MysqlHandshakeProbe;
use crate::results::clear_results_dir;
use crate::results::find_summary;
use crate::results::parse_benchbase_summary;
use crate::results::read_artifact;
use crate::state::MetricsRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// BenchBase workloads supported against MySQL.
pub const BENCHBASE_WORKLOADS: [&str; 7] =
    ["tpcc", "twitter", "smallbank", "sibench", "voter", "seats", "tatp"];

/// MySQL port inside the container.
pub const MYSQL_CONTAINER_PORT: u16 = 3306;

/// Data directory inside the MySQL container.
const MYSQL_DATA_MOUNT: &str = "/var/lib/mysql";
/// Option file path inside the MySQL container.
const MYSQL_OPTION_FILE_MOUNT: &str = "/etc/mysql/conf.d/custom.cnf";
/// BenchBase config directory inside its container.
const BENCHBASE_CONFIG_MOUNT: &str = "/benchbase/config";
/// BenchBase results directory inside its container.
const BENCHBASE_RESULTS_MOUNT: &str = "/benchbase/results";

// ============================================================================
// SECTION: Driver
// ============================================================================

/// BenchBase phase to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BenchbasePhase {
    /// Create schema and load data.
    Load,
    /// Execute the measured workload.
    Execute,
}

/// MySQL and BenchBase driver.
#[derive(Debug, Clone)]
pub struct DatabaseDriver {
    /// Database settings.
    config: DatabaseConfig,
    /// BenchBase workload name.
    workload: String,
    /// MySQL knob space.
    space: ConfigurationSpace,
    /// Option file encoder.
    encoder: Encoder,
}

impl DatabaseDriver {
    /// Builds a driver over an existing MySQL space.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::UnsupportedWorkload`] when the workload is not
    /// a BenchBase workload.
    pub fn new(
        config: DatabaseConfig,
        workload: &str,
        space: ConfigurationSpace,
    ) -> Result<Self, TargetError> {
        if !BENCHBASE_WORKLOADS.contains(&workload) {
            return Err(TargetError::UnsupportedWorkload {
                target: Target::Mysql,
                workload: workload.to_string(),
                supported: BENCHBASE_WORKLOADS.iter().map(ToString::to_string).collect(),
            });
        }
        Ok(Self {
            config,
            workload: workload.to_string(),
            space,
            encoder: Target::Mysql.encoder(),
        })
    }

    /// Builds a driver, loading the knob definition named by configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError`] when the definition cannot be loaded or the
    /// workload is unsupported.
    pub fn from_config(config: &TuneBenchConfig, workload: &str) -> Result<Self, TargetError> {
        let definition = SpaceDefinition::from_path(&config.database.knob_definition)?;
        let space = Target::Mysql.build_space(&definition)?;
        Self::new(config.database.clone(), workload, space)
    }

    /// Returns a readiness probe for the published MySQL port.
    #[must_use]
    pub fn probe(&self) -> MysqlHandshakeProbe {
        MysqlHandshakeProbe::new(self.config.mysql_host.clone(), self.config.mysql_port)
    }

    /// Returns the database settings.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Builds the BenchBase container spec for a phase.
    fn benchbase_spec(&self, phase: BenchbasePhase) -> Result<LaunchSpec, StageError> {
        let workload = &self.workload;
        let mut spec = LaunchSpec::new(
            self.config.benchbase_image.clone(),
            self.config.benchbase_container_name.clone(),
        );
        spec.network_host = true;
        spec.user.clone_from(&self.config.run_as_user);
        spec.volumes = vec![
            VolumeMount::read_only(
                absolute(&self.config.benchbase_config_dir)?,
                BENCHBASE_CONFIG_MOUNT,
            ),
            VolumeMount::read_write(
                absolute(&self.config.benchbase_results_dir)?,
                BENCHBASE_RESULTS_MOUNT,
            ),
        ];
        let mut command = vec![
            "--bench".to_string(),
            workload.clone(),
            "--config".to_string(),
            format!("{BENCHBASE_CONFIG_MOUNT}/sample_{workload}_config.xml"),
        ];
        match phase {
            BenchbasePhase::Load => {
                command.push("--create=true".to_string());
                command.push("--load=true".to_string());
            }
            BenchbasePhase::Execute => {
                command.extend(
                    [
                        "--execute=true",
                        "--sample",
                        "1",
                        "--interval-monitor",
                        "1000",
                        "--json-histograms",
                        "results/histograms.json",
                    ]
                    .map(ToString::to_string),
                );
            }
        }
        spec.command = command;
        Ok(spec)
    }

    /// Runs one BenchBase phase to completion.
    ///
    /// The container is removed whether or not the phase finished.
    fn run_benchbase(
        &self,
        environment: &dyn Environment,
        phase: BenchbasePhase,
        logs: LogSink<'_>,
    ) -> Result<(), StageError> {
        let name = &self.config.benchbase_container_name;
        remove_if_present(environment, name)?;
        let handle = environment.launch(&self.benchbase_spec(phase)?)?;
        let finished = await_exit(environment, &handle, logs);
        let removed = remove_if_present(environment, name);
        let exit_code = finished?;
        removed?;
        if exit_code != 0 {
            return Err(StageError::WorkloadFailed {
                workload: self.workload.clone(),
                exit_code,
            });
        }
        Ok(())
    }

    /// Writes the rendered option file to the host.
    fn write_option_file(&self, contents: &str) -> Result<(), StageError> {
        let path = &self.config.mysql_config_file;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                StageError::Io(format!("cannot create {}: {err}", parent.display()))
            })?;
        }
        fs::write(path, contents)
            .map_err(|err| StageError::Io(format!("cannot write {}: {err}", path.display())))
    }
}

/// Streams logs when attached, then waits for the container to exit.
fn await_exit(
    environment: &dyn Environment,
    handle: &EnvironmentHandle,
    logs: LogSink<'_>,
) -> Result<i64, EnvironmentError> {
    if let Some(on_line) = logs {
        environment.follow_logs(handle, on_line)?;
    }
    environment.wait(handle)
}

impl TargetDriver for DatabaseDriver {
    fn target(&self) -> Target {
        Target::Mysql
    }

    fn workload(&self) -> &str {
        &self.workload
    }

    fn environment_name(&self) -> &str {
        &self.config.mysql_container_name
    }

    fn space(&self) -> &ConfigurationSpace {
        &self.space
    }

    fn space_mut(&mut self) -> &mut ConfigurationSpace {
        &mut self.space
    }

    fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    fn prepare_launch(
        &self,
        encoded: Option<&EncodedConfiguration>,
        mode: ProvisionMode,
    ) -> Result<LaunchSpec, StageError> {
        let config = &self.config;
        let mut spec =
            LaunchSpec::new(config.mysql_image.clone(), config.mysql_container_name.clone());
        spec.volumes
            .push(VolumeMount::read_write(absolute(&config.mysql_data_dir)?, MYSQL_DATA_MOUNT));
        spec.ports.push(PortMapping::tcp(MYSQL_CONTAINER_PORT, config.mysql_port));
        spec.user.clone_from(&config.run_as_user);
        for (key, value) in [
            ("MYSQL_ROOT_PASSWORD", &config.mysql_root_password),
            ("MYSQL_USER", &config.mysql_user),
            ("MYSQL_PASSWORD", &config.mysql_password),
            ("MYSQL_DATABASE", &config.mysql_database),
        ] {
            spec.env.insert(key.to_string(), value.clone());
        }
        if mode == ProvisionMode::Configured {
            if let Some(encoded) = encoded {
                self.write_option_file(encoded.as_str())?;
                spec.volumes.push(VolumeMount::read_only(
                    absolute(&config.mysql_config_file)?,
                    MYSQL_OPTION_FILE_MOUNT,
                ));
            }
            spec.limits = ResourceLimits {
                cpus: Some(config.mysql_vcpus),
                memory_gb: Some(config.mysql_mem_gb),
            };
        }
        Ok(spec)
    }

    fn readiness_plan(&self, mode: ProvisionMode) -> ReadinessPlan {
        let timeout = match mode {
            ProvisionMode::Configured => self.config.start_timeout(),
            ProvisionMode::Bare => self.config.load_timeout(),
        };
        ReadinessPlan {
            interval: self.config.poll_interval(),
            timeout,
        }
    }

    fn execute(
        &self,
        environment: &dyn Environment,
        _handle: &EnvironmentHandle,
        _encoded: &EncodedConfiguration,
        logs: LogSink<'_>,
    ) -> Result<(), StageError> {
        clear_results_dir(&self.config.benchbase_results_dir)?;
        self.run_benchbase(environment, BenchbasePhase::Execute, logs)
    }

    fn collect(&self) -> Result<MetricsRecord, StageError> {
        let path = find_summary(&self.config.benchbase_results_dir)?;
        let text = read_artifact(&path)?;
        parse_benchbase_summary(&text).map_err(|reason| StageError::InvalidArtifact {
            path,
            reason,
        })
    }

    fn supports_data_loading(&self) -> bool {
        true
    }

    fn load_data(
        &self,
        environment: &dyn Environment,
        logs: LogSink<'_>,
    ) -> Result<(), StageError> {
        self.run_benchbase(environment, BenchbasePhase::Load, logs)
    }

    fn shutdown_command(&self) -> Option<Vec<String>> {
        Some(vec![
            "mysqladmin".to_string(),
            "shutdown".to_string(),
            "-u".to_string(),
            "root".to_string(),
            format!("-p{}", self.config.mysql_root_password),
        ])
    }

    fn stop_timeout(&self) -> Duration {
        self.config.stop_timeout()
    }
}
