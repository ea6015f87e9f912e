// crates/tunebench-runner/tests/common/mod.rs
// ============================================================================
// Module: Runner Test Helpers
// Description: Harnesses, probes, and fixtures for lifecycle tests.
// Purpose: Build controllers over the in-memory environment and temp dirs.
// ============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use tempfile::TempDir;
use tunebench_config::CompilerConfig;
use tunebench_config::DatabaseConfig;
use tunebench_core::ConfigurationSpace;
use tunebench_core::ParameterDefinition;
use tunebench_core::ParameterValue;
use tunebench_core::SpaceDefinition;
use tunebench_core::Target;
use tunebench_runner::AlwaysReady;
use tunebench_runner::CompilerDriver;
use tunebench_runner::ControllerSettings;
use tunebench_runner::DatabaseDriver;
use tunebench_runner::ExecOutput;
use tunebench_runner::InMemoryEnvironment;
use tunebench_runner::LifecycleController;
use tunebench_runner::ManualClock;
use tunebench_runner::MemoryRunEventSink;
use tunebench_runner::ReadinessProbe;

/// One gibibyte.
pub const GIB: i64 = 1024 * 1024 * 1024;

/// MySQL container name used by the harness.
pub const MYSQL_NAME: &str = "tunebench-mysql";

/// BenchBase container name used by the harness.
pub const BENCHBASE_NAME: &str = "tunebench-benchbase";

/// Compiler container name used by the harness.
pub const COMPILER_NAME: &str = "tunebench-compiler";

/// BenchBase summary with every metric the parser understands.
pub const SUMMARY_JSON: &str = r#"{
  "Benchmark Type": "tpcc",
  "Latency Distribution": {
    "95th Percentile Latency (microseconds)": 1800.5,
    "Average Latency (microseconds)": 950.0,
    "Median Latency (microseconds)": 900,
    "99th Percentile Latency (microseconds)": 4100
  },
  "Throughput (requests/second)": 512.25,
  "Goodput (requests/second)": 505.0
}"#;

/// Compiler report for `bzip2`.
pub const GCC_RESULTS_JSON: &str = r#"{
  "bzip2": {
    "execution_time": 1.5,
    "avrg_exec_time": 1.4,
    "compilation_time": 3.2,
    "file_size": 1024,
    "maxrss": 2048,
    "PAPI_TOT_CYC": 1000000,
    "compiler": "gcc"
  },
  "gsm": null
}"#;

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Probe that turns ready after a fixed number of checks.
pub struct ScriptedProbe {
    /// Checks needed before reporting ready; `None` never reports ready.
    ready_after: Option<usize>,
    /// Checks performed.
    checks: AtomicUsize,
}

impl ScriptedProbe {
    /// Ready on the first check.
    pub fn ready() -> Self {
        Self::ready_after(1)
    }

    /// Ready on the `checks`-th check.
    pub fn ready_after(checks: usize) -> Self {
        Self {
            ready_after: Some(checks),
            checks: AtomicUsize::new(0),
        }
    }

    /// Never ready.
    pub fn never() -> Self {
        Self {
            ready_after: None,
            checks: AtomicUsize::new(0),
        }
    }
}

impl ReadinessProbe for ScriptedProbe {
    fn is_ready(&self) -> bool {
        let seen = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        self.ready_after.is_some_and(|needed| seen >= needed)
    }
}

// ============================================================================
// SECTION: Spaces
// ============================================================================

/// Returns a MySQL space with the redo log knobs plus one enum knob.
pub fn mysql_space() -> ConfigurationSpace {
    let definition = SpaceDefinition::default()
        .with_parameter(
            "innodb_log_file_size",
            ParameterDefinition::integer(4 * 1024 * 1024, 512 * GIB, Some(48 * 1024 * 1024)),
        )
        .with_parameter("innodb_log_files_in_group", ParameterDefinition::integer(2, 100, Some(2)))
        .with_parameter("innodb_thread_concurrency", ParameterDefinition::integer(0, 1000, Some(0)))
        .with_parameter(
            "innodb_flush_log_at_trx_commit",
            ParameterDefinition::enumeration(
                vec![
                    ParameterValue::Integer(0),
                    ParameterValue::Integer(1),
                    ParameterValue::Integer(2),
                ],
                Some(ParameterValue::Integer(1)),
            ),
        );
    Target::Mysql.build_space(&definition).unwrap()
}

/// Returns a small GCC space.
pub fn gcc_space() -> ConfigurationSpace {
    let definition = SpaceDefinition::default()
        .with_parameter(
            "align-loops",
            ParameterDefinition::integer(0, 10, Some(1)).with_scope("Align"),
        )
        .with_parameter("inline-functions", ParameterDefinition::boolean(true))
        .with_parameter("tree-vectorize", ParameterDefinition::boolean(false));
    Target::Gcc.build_space(&definition).unwrap()
}

// ============================================================================
// SECTION: Database Harness
// ============================================================================

/// Controller type used by database lifecycle tests.
pub type DatabaseController =
    LifecycleController<DatabaseDriver, InMemoryEnvironment, ScriptedProbe, ManualClock>;

/// Temp-dir backed MySQL and BenchBase fixture.
pub struct DatabaseHarness {
    /// Owns every host path used by the run.
    pub dir: TempDir,
    /// Database settings pointing into `dir`.
    pub config: DatabaseConfig,
    /// Shared virtual clock.
    pub clock: ManualClock,
    /// Captured run events.
    pub sink: Arc<MemoryRunEventSink>,
}

impl DatabaseHarness {
    /// Builds a fixture with default timeouts.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let config = DatabaseConfig {
            mysql_container_name: MYSQL_NAME.to_string(),
            benchbase_container_name: BENCHBASE_NAME.to_string(),
            mysql_config_file: root.join("mysql/custom.cnf"),
            mysql_data_dir: root.join("mysql/data"),
            knob_definition: root.join("definitions/mysql.json"),
            benchbase_config_dir: root.join("benchbase/config"),
            benchbase_results_dir: root.join("benchbase/results"),
            ..DatabaseConfig::default()
        };
        Self {
            dir,
            config,
            clock: ManualClock::new(),
            sink: Arc::new(MemoryRunEventSink::new()),
        }
    }

    /// Path BenchBase writes its summary to.
    pub fn summary_path(&self) -> PathBuf {
        self.config.benchbase_results_dir.join("20261016_120000.summary.json")
    }

    /// Environment where BenchBase succeeds and MySQL shuts down on request.
    pub fn environment(&self) -> InMemoryEnvironment {
        InMemoryEnvironment::new()
            .with_artifact(BENCHBASE_NAME, self.summary_path(), SUMMARY_JSON)
            .with_exec_output("mysqladmin", success(), true)
    }

    /// Builds a controller over a fresh driver.
    pub fn controller(
        &self,
        environment: InMemoryEnvironment,
        probe: ScriptedProbe,
        settings: ControllerSettings,
    ) -> DatabaseController {
        let driver = DatabaseDriver::new(self.config.clone(), "tpcc", mysql_space()).unwrap();
        LifecycleController::new(
            driver,
            environment,
            probe,
            self.clock.clone(),
            self.sink.clone(),
            settings,
        )
    }
}

// ============================================================================
// SECTION: Compiler Harness
// ============================================================================

/// Controller type used by compiler lifecycle tests.
pub type CompilerController =
    LifecycleController<CompilerDriver, InMemoryEnvironment, AlwaysReady, ManualClock>;

/// Temp-dir backed GCC fixture.
pub struct CompilerHarness {
    /// Owns every host path used by the run.
    pub dir: TempDir,
    /// Compiler settings pointing into `dir`.
    pub config: CompilerConfig,
    /// Captured run events.
    pub sink: Arc<MemoryRunEventSink>,
}

impl CompilerHarness {
    /// Builds a fixture with default timeouts.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let config = CompilerConfig {
            container_name: COMPILER_NAME.to_string(),
            config_dir: root.join("compiler/config"),
            results_dir: root.join("compiler/results"),
            ..CompilerConfig::default()
        };
        Self {
            dir,
            config,
            sink: Arc::new(MemoryRunEventSink::new()),
        }
    }

    /// Environment whose benchmark script writes the GCC report.
    pub fn environment(&self) -> InMemoryEnvironment {
        let report = self.config.results_dir.join("gcc_results.json");
        InMemoryEnvironment::new().with_artifact(COMPILER_NAME, report, GCC_RESULTS_JSON)
    }

    /// Builds a controller benchmarking `program` with GCC.
    pub fn controller(
        &self,
        environment: InMemoryEnvironment,
        program: &str,
    ) -> CompilerController {
        let programs = vec!["bzip2".to_string(), "gsm".to_string()];
        let driver =
            CompilerDriver::new(self.config.clone(), Target::Gcc, program, &programs, gcc_space())
                .unwrap();
        LifecycleController::new(
            driver,
            environment,
            AlwaysReady,
            ManualClock::new(),
            self.sink.clone(),
            ControllerSettings::default(),
        )
    }
}

/// Successful exec output.
pub fn success() -> ExecOutput {
    ExecOutput {
        exit_code: 0,
        output: String::new(),
    }
}
