// crates/tunebench-runner/src/drivers/compiler.rs
// ============================================================================
// Module: Compiler Driver
// Description: GCC and LLVM benchmark container driven through exec.
// Purpose: Compile and time one benchmark program under encoded flags.
// Dependencies: serde, serde_json, tunebench-core, tunebench-config
// ============================================================================

//! ## Overview
//! The compiler environment is a privileged, long-lived container that idles
//! on `sleep infinity`. Each run executes the benchmark script inside it with
//! the encoded flags; the script writes `<gcc|llvm>_results.json` into the
//! mounted results directory. Programs come from `programs.json` in the
//! config directory, whose `cbench` and `polybench` arrays form the catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tunebench_config::CompilerConfig;
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
use super::forward_lines;
use crate::error::StageError;
use crate::error::TargetError;
use crate::interfaces::Environment;
use crate::interfaces::EnvironmentHandle;
use crate::interfaces::LaunchSpec;
use crate::interfaces::ResourceLimits;
use crate::interfaces::VolumeMount;
use crate::results::parse_compiler_results;
use crate::results::read_artifact;
use crate::state::MetricsRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Results directory inside the compiler container.
pub const COMPILER_RESULTS_MOUNT: &str = "/benchmark/results";

/// Benchmark entry script inside the compiler container.
const RUN_SCRIPT: &str = "/benchmark/run.sh";

/// Maximum `programs.json` size accepted.
const MAX_PROGRAMS_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Program Catalog
// ============================================================================

/// `programs.json` layout.
#[derive(Debug, Deserialize)]
struct ProgramCatalog {
    /// cBench programs.
    #[serde(default)]
    cbench: Vec<String>,
    /// PolyBench programs.
    #[serde(default)]
    polybench: Vec<String>,
}

/// Loads the benchmark program catalog.
///
/// # Errors
///
/// Returns [`TargetError::Catalog`] when the file is missing, too large, or
/// malformed.
pub fn load_programs(path: &Path) -> Result<Vec<String>, TargetError> {
    let metadata = fs::metadata(path)
        .map_err(|err| TargetError::Catalog(format!("cannot read {}: {err}", path.display())))?;
    if metadata.len() > MAX_PROGRAMS_BYTES {
        return Err(TargetError::Catalog(format!(
            "{} exceeds {MAX_PROGRAMS_BYTES} bytes",
            path.display()
        )));
    }
    let text = fs::read_to_string(path)
        .map_err(|err| TargetError::Catalog(format!("cannot read {}: {err}", path.display())))?;
    let catalog: ProgramCatalog = serde_json::from_str(&text)
        .map_err(|err| TargetError::Catalog(format!("invalid {}: {err}", path.display())))?;
    Ok(catalog.cbench.into_iter().chain(catalog.polybench).collect())
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// GCC or LLVM benchmark driver.
#[derive(Debug, Clone)]
pub struct CompilerDriver {
    /// Compiler settings.
    config: CompilerConfig,
    /// Compiler target.
    target: Target,
    /// Benchmark program.
    workload: String,
    /// Flag or pass space.
    space: ConfigurationSpace,
    /// Flag encoder.
    encoder: Encoder,
}

impl CompilerDriver {
    /// Builds a driver over an existing space.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::WrongTarget`] for non-compiler targets and
    /// [`TargetError::UnsupportedWorkload`] when the program is not in the
    /// catalog.
    pub fn new(
        config: CompilerConfig,
        target: Target,
        workload: &str,
        programs: &[String],
        space: ConfigurationSpace,
    ) -> Result<Self, TargetError> {
        if !target.is_compiler() {
            return Err(TargetError::WrongTarget {
                target,
                driver: "compiler",
            });
        }
        if !programs.iter().any(|program| program == workload) {
            return Err(TargetError::UnsupportedWorkload {
                target,
                workload: workload.to_string(),
                supported: programs.to_vec(),
            });
        }
        Ok(Self {
            config,
            target,
            workload: workload.to_string(),
            space,
            encoder: target.encoder(),
        })
    }

    /// Builds a driver from configuration, loading the catalog and the
    /// target's knob definition.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError`] when loading fails or the program is not
    /// supported.
    pub fn from_config(
        config: &TuneBenchConfig,
        target: Target,
        workload: &str,
    ) -> Result<Self, TargetError> {
        let definition_path = match target {
            Target::Gcc => &config.compiler.gcc_knob_definition,
            Target::Llvm => &config.compiler.llvm_knob_definition,
            Target::Mysql => {
                return Err(TargetError::WrongTarget {
                    target,
                    driver: "compiler",
                });
            }
        };
        let programs = load_programs(&config.compiler.programs_file())?;
        let definition = SpaceDefinition::from_path(definition_path)?;
        let space = target.build_space(&definition)?;
        Self::new(config.compiler.clone(), target, workload, &programs, space)
    }

    /// Returns the host path of the results file.
    #[must_use]
    pub fn results_file(&self) -> PathBuf {
        self.config.results_dir.join(format!("{}_results.json", self.target.as_str()))
    }

    /// Returns the compiler label the benchmark script expects.
    const fn compiler_label(&self) -> &'static str {
        match self.target {
            Target::Llvm => "LLVM",
            Target::Gcc | Target::Mysql => "GCC",
        }
    }
}

impl TargetDriver for CompilerDriver {
    fn target(&self) -> Target {
        self.target
    }

    fn workload(&self) -> &str {
        &self.workload
    }

    fn environment_name(&self) -> &str {
        &self.config.container_name
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
        _encoded: Option<&EncodedConfiguration>,
        _mode: ProvisionMode,
    ) -> Result<LaunchSpec, StageError> {
        let results_dir = absolute(&self.config.results_dir)?;
        fs::create_dir_all(&results_dir).map_err(|err| {
            StageError::Io(format!("cannot create {}: {err}", results_dir.display()))
        })?;
        let mut spec =
            LaunchSpec::new(self.config.docker_image.clone(), self.config.container_name.clone());
        spec.privileged = true;
        spec.volumes.push(VolumeMount::read_write(results_dir, COMPILER_RESULTS_MOUNT));
        spec.limits = ResourceLimits {
            cpus: self.config.vcpus,
            memory_gb: self.config.mem_gb,
        };
        spec.command = vec!["/bin/sleep".to_string(), "infinity".to_string()];
        Ok(spec)
    }

    fn readiness_plan(&self, _mode: ProvisionMode) -> ReadinessPlan {
        ReadinessPlan {
            interval: self.config.poll_interval(),
            timeout: self.config.start_timeout(),
        }
    }

    fn execute(
        &self,
        environment: &dyn Environment,
        handle: &EnvironmentHandle,
        encoded: &EncodedConfiguration,
        logs: LogSink<'_>,
    ) -> Result<(), StageError> {
        let results_file = self.results_file();
        if results_file.is_file() {
            fs::remove_file(&results_file).map_err(|err| {
                StageError::Io(format!("cannot remove {}: {err}", results_file.display()))
            })?;
        }
        let command = vec![
            "/bin/bash".to_string(),
            RUN_SCRIPT.to_string(),
            self.compiler_label().to_string(),
            self.workload.clone(),
            "--flags".to_string(),
            encoded.as_str().to_string(),
        ];
        let output = environment.exec(handle, &command)?;
        forward_lines(&output.output, logs);
        if !output.success() {
            return Err(StageError::WorkloadFailed {
                workload: self.workload.clone(),
                exit_code: output.exit_code,
            });
        }
        Ok(())
    }

    fn collect(&self) -> Result<MetricsRecord, StageError> {
        let path = self.results_file();
        let text = read_artifact(&path)?;
        parse_compiler_results(&text, &self.workload).map_err(|reason| {
            StageError::InvalidArtifact {
                path,
                reason,
            }
        })
    }

    fn supports_data_loading(&self) -> bool {
        false
    }

    fn load_data(
        &self,
        _environment: &dyn Environment,
        _logs: LogSink<'_>,
    ) -> Result<(), StageError> {
        Ok(())
    }

    fn shutdown_command(&self) -> Option<Vec<String>> {
        None
    }

    fn stop_timeout(&self) -> Duration {
        self.config.stop_timeout()
    }
}
