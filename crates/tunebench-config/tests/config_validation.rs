//! Config defaults, loading, and validation tests for tunebench-config.
// crates/tunebench-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate defaults, file loading limits, and field invariants.
// Purpose: Ensure invalid configuration fails closed before any run starts.
// =============================================================================

use std::fs;
use std::time::Duration;

use tempfile::tempdir;
use tunebench_config::ConfigError;
use tunebench_config::MAX_CONFIG_FILE_SIZE;
use tunebench_config::TuneBenchConfig;
use tunebench_config::config_toml_example;

mod common;

type TestResult = Result<(), String>;

/// Tests empty config uses documented defaults.
#[test]
fn empty_config_uses_documented_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.database.start_timeout() != Duration::from_secs(60)
        || config.database.load_timeout() != Duration::from_secs(600)
        || config.database.poll_interval() != Duration::from_secs(5)
        || config.database.stop_timeout() != Duration::from_secs(60)
    {
        return Err("database timeouts should default to 60/600/5/60 seconds".to_string());
    }
    if config.database.mysql_port != 3307 || config.general.max_random_attempts != 1000 {
        return Err("unexpected default port or attempt cap".to_string());
    }
    if config.general.debug_mode || config.general.event_log.is_some() {
        return Err("debug mode and event log should be off by default".to_string());
    }
    if config != TuneBenchConfig::default() {
        return Err("parsed empty config should equal Default".to_string());
    }
    Ok(())
}

/// Tests canonical example parses and validates.
#[test]
fn canonical_example_parses_and_validates() -> TestResult {
    let config =
        TuneBenchConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    if config != TuneBenchConfig::default() {
        return Err("example should mirror the defaults".to_string());
    }
    Ok(())
}

/// Tests non positive resource limits are rejected.
#[test]
fn non_positive_resource_limits_are_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.mysql_vcpus = 0.0;
    common::assert_invalid(config.validate(), "database.mysql_vcpus must be positive")?;

    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.mysql_mem_gb = f64::NAN;
    common::assert_invalid(config.validate(), "database.mysql_mem_gb")?;

    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.compiler.mem_gb = Some(-2.0);
    common::assert_invalid(config.validate(), "compiler.mem_gb")?;
    Ok(())
}

/// Tests poll interval must fit inside timeouts.
#[test]
fn poll_interval_must_fit_inside_timeouts() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.poll_interval_secs = 120;
    common::assert_invalid(
        config.validate(),
        "database.poll_interval_secs must not exceed database.start_timeout_secs",
    )?;

    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.compiler.poll_interval_secs = 0;
    common::assert_invalid(config.validate(), "compiler.poll_interval_secs")?;

    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.load_timeout_secs = 0;
    common::assert_invalid(config.validate(), "database.load_timeout_secs")?;
    Ok(())
}

/// Tests container names must be distinct and non empty.
#[test]
fn container_names_must_be_distinct_and_non_empty() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.benchbase_container_name = config.database.mysql_container_name.clone();
    common::assert_invalid(config.validate(), "must differ")?;

    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.compiler.container_name = "  ".to_string();
    common::assert_invalid(config.validate(), "compiler.container_name must be non-empty")?;
    Ok(())
}

/// Tests zero port and empty paths are rejected.
#[test]
fn zero_port_and_empty_paths_are_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.mysql_port = 0;
    common::assert_invalid(config.validate(), "database.mysql_port")?;

    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.benchbase_results_dir = "".into();
    common::assert_invalid(config.validate(), "database.benchbase_results_dir")?;
    Ok(())
}

/// Tests unknown keys fail to parse.
#[test]
fn unknown_keys_fail_to_parse() -> TestResult {
    match TuneBenchConfig::from_toml_str("[database]\nmysql_vcpu = 2.0\n") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(err) => Err(format!("expected parse error, got {err}")),
        Ok(_) => Err("expected parse error, got a config".to_string()),
    }
}

/// Tests load reads explicit path and enforces size limit.
#[test]
fn load_reads_explicit_path_and_enforces_size_limit() -> TestResult {
    let dir = tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("tunebench.toml");
    fs::write(&path, "[general]\ndebug_mode = true\n").map_err(|err| err.to_string())?;
    let config = TuneBenchConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if !config.general.debug_mode {
        return Err("debug_mode should be loaded from file".to_string());
    }

    let oversized = dir.path().join("big.toml");
    let mut content = String::from("[general]\n");
    content.push_str(&"#".repeat(MAX_CONFIG_FILE_SIZE));
    fs::write(&oversized, content).map_err(|err| err.to_string())?;
    common::assert_invalid(TuneBenchConfig::load(Some(&oversized)).map(drop), "size limit")?;

    let missing = dir.path().join("missing.toml");
    match TuneBenchConfig::load(Some(&missing)) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(err) => Err(format!("expected io error, got {err}")),
        Ok(_) => Err("expected io error, got a config".to_string()),
    }
}
