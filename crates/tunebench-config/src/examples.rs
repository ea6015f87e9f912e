// crates/tunebench-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `tunebench.toml`. Every value matches the built-in
//! default except where noted, so the example doubles as a reference for
//! the full key set.

/// Returns a canonical example `tunebench.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[general]
debug_mode = false
# event_log = "tunebench-events.jsonl"
max_random_attempts = 1000

[database]
mysql_image = "mysql:8.0"
mysql_container_name = "tunebench-mysql"
mysql_vcpus = 4.0
mysql_mem_gb = 8.0
mysql_host = "127.0.0.1"
mysql_port = 3307
mysql_user = "admin"
mysql_password = "password"
mysql_root_password = "password"
mysql_database = "benchbase"
mysql_config_file = "mysql/custom.cnf"
mysql_data_dir = "mysql/data"
knob_definition = "definitions/mysql.json"
benchbase_image = "benchbase:latest"
benchbase_container_name = "tunebench-benchbase"
benchbase_config_dir = "benchbase/config"
benchbase_results_dir = "benchbase/results"
start_timeout_secs = 60
load_timeout_secs = 600
poll_interval_secs = 5
stop_timeout_secs = 60
# run_as_user = "1000:1000"

[compiler]
docker_image = "compiler-benchmark:0.1"
container_name = "tunebench-compiler"
config_dir = "compiler/config"
results_dir = "compiler/results"
gcc_knob_definition = "definitions/gcc.json"
llvm_knob_definition = "definitions/llvm.json"
start_timeout_secs = 30
poll_interval_secs = 1
stop_timeout_secs = 10
# vcpus = 2.0
# mem_gb = 4.0
"#,
    )
}
