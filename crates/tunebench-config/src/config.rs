// crates/tunebench-config/src/config.rs
// ============================================================================
// Module: tunebench Configuration
// Description: Configuration loading and validation for tunebench.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has complete defaults, so an empty file is a valid
//! configuration. Validation rejects empty names, non-positive resource
//! limits, and polling intervals longer than the timeouts they serve.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "tunebench.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "TUNEBENCH_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a container or image name.
pub(crate) const MAX_NAME_LENGTH: usize = 255;
/// Default cap on whole-space samples drawn by random runs.
pub(crate) const DEFAULT_MAX_RANDOM_ATTEMPTS: usize = 1000;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Top-level tunebench configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuneBenchConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// MySQL and BenchBase settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// GCC and LLVM benchmark settings.
    #[serde(default)]
    pub compiler: CompilerConfig,
}

impl TuneBenchConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then `TUNEBENCH_CONFIG`, then
    /// `tunebench.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general.validate()?;
        self.database.validate()?;
        self.compiler.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: General
// ============================================================================

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Stream workload logs and block until exit instead of waiting silently.
    #[serde(default)]
    pub debug_mode: bool,
    /// Append run events as JSON lines to this file instead of stderr.
    #[serde(default)]
    pub event_log: Option<PathBuf>,
    /// Cap on whole-space samples drawn by random runs.
    #[serde(default = "default_max_random_attempts")]
    pub max_random_attempts: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            event_log: None,
            max_random_attempts: default_max_random_attempts(),
        }
    }
}

impl GeneralConfig {
    /// Validates general settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.event_log {
            validate_path_string("general.event_log", &path.to_string_lossy())?;
        }
        if self.max_random_attempts == 0 {
            return Err(ConfigError::Invalid(
                "general.max_random_attempts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// MySQL server and BenchBase load generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// MySQL server image.
    #[serde(default = "default_mysql_image")]
    pub mysql_image: String,
    /// MySQL container name.
    #[serde(default = "default_mysql_container_name")]
    pub mysql_container_name: String,
    /// CPU limit for configured runs, in virtual CPUs.
    #[serde(default = "default_mysql_vcpus")]
    pub mysql_vcpus: f64,
    /// Memory limit for configured runs, in GiB.
    #[serde(default = "default_mysql_mem_gb")]
    pub mysql_mem_gb: f64,
    /// Host address the server is published on.
    #[serde(default = "default_mysql_host")]
    pub mysql_host: String,
    /// Host port mapped to the server's 3306.
    #[serde(default = "default_mysql_port")]
    pub mysql_port: u16,
    /// Application user created at first start.
    #[serde(default = "default_mysql_user")]
    pub mysql_user: String,
    /// Application user password.
    #[serde(default = "default_mysql_password")]
    pub mysql_password: String,
    /// Root password, also used for graceful shutdown.
    #[serde(default = "default_mysql_password")]
    pub mysql_root_password: String,
    /// Database created at first start.
    #[serde(default = "default_mysql_database")]
    pub mysql_database: String,
    /// Host path of the generated option file.
    #[serde(default = "default_mysql_config_file")]
    pub mysql_config_file: PathBuf,
    /// Host data directory mounted at `/var/lib/mysql`.
    #[serde(default = "default_mysql_data_dir")]
    pub mysql_data_dir: PathBuf,
    /// MySQL knob definition JSON.
    #[serde(default = "default_mysql_knob_definition")]
    pub knob_definition: PathBuf,
    /// BenchBase image.
    #[serde(default = "default_benchbase_image")]
    pub benchbase_image: String,
    /// BenchBase container name.
    #[serde(default = "default_benchbase_container_name")]
    pub benchbase_container_name: String,
    /// Host directory holding `sample_<workload>_config.xml` files.
    #[serde(default = "default_benchbase_config_dir")]
    pub benchbase_config_dir: PathBuf,
    /// Host directory BenchBase writes results into.
    #[serde(default = "default_benchbase_results_dir")]
    pub benchbase_results_dir: PathBuf,
    /// Readiness timeout for benchmark bring-up, in seconds.
    #[serde(default = "default_db_start_timeout_secs")]
    pub start_timeout_secs: u64,
    /// Readiness timeout for data loading, in seconds.
    #[serde(default = "default_db_load_timeout_secs")]
    pub load_timeout_secs: u64,
    /// Readiness poll interval, in seconds.
    #[serde(default = "default_db_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Graceful shutdown timeout, in seconds.
    #[serde(default = "default_db_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
    /// Container user as `uid:gid`, when the data directory needs it.
    #[serde(default)]
    pub run_as_user: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            mysql_image: default_mysql_image(),
            mysql_container_name: default_mysql_container_name(),
            mysql_vcpus: default_mysql_vcpus(),
            mysql_mem_gb: default_mysql_mem_gb(),
            mysql_host: default_mysql_host(),
            mysql_port: default_mysql_port(),
            mysql_user: default_mysql_user(),
            mysql_password: default_mysql_password(),
            mysql_root_password: default_mysql_password(),
            mysql_database: default_mysql_database(),
            mysql_config_file: default_mysql_config_file(),
            mysql_data_dir: default_mysql_data_dir(),
            knob_definition: default_mysql_knob_definition(),
            benchbase_image: default_benchbase_image(),
            benchbase_container_name: default_benchbase_container_name(),
            benchbase_config_dir: default_benchbase_config_dir(),
            benchbase_results_dir: default_benchbase_results_dir(),
            start_timeout_secs: default_db_start_timeout_secs(),
            load_timeout_secs: default_db_load_timeout_secs(),
            poll_interval_secs: default_db_poll_interval_secs(),
            stop_timeout_secs: default_db_stop_timeout_secs(),
            run_as_user: None,
        }
    }
}

impl DatabaseConfig {
    /// Returns the bring-up readiness timeout.
    #[must_use]
    pub const fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    /// Returns the data-loading readiness timeout.
    #[must_use]
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Returns the readiness poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the graceful shutdown timeout.
    #[must_use]
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// Validates database settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_name("database.mysql_image", &self.mysql_image)?;
        validate_name("database.mysql_container_name", &self.mysql_container_name)?;
        validate_name("database.benchbase_image", &self.benchbase_image)?;
        validate_name("database.benchbase_container_name", &self.benchbase_container_name)?;
        if self.mysql_container_name.trim() == self.benchbase_container_name.trim() {
            return Err(ConfigError::Invalid(
                "database.mysql_container_name and database.benchbase_container_name must differ"
                    .to_string(),
            ));
        }
        validate_limit("database.mysql_vcpus", self.mysql_vcpus)?;
        validate_limit("database.mysql_mem_gb", self.mysql_mem_gb)?;
        validate_name("database.mysql_host", &self.mysql_host)?;
        if self.mysql_port == 0 {
            return Err(ConfigError::Invalid("database.mysql_port must be non-zero".to_string()));
        }
        validate_name("database.mysql_user", &self.mysql_user)?;
        validate_name("database.mysql_database", &self.mysql_database)?;
        if self.mysql_root_password.is_empty() {
            return Err(ConfigError::Invalid(
                "database.mysql_root_password must be non-empty".to_string(),
            ));
        }
        validate_path_buf("database.mysql_config_file", &self.mysql_config_file)?;
        validate_path_buf("database.mysql_data_dir", &self.mysql_data_dir)?;
        validate_path_buf("database.knob_definition", &self.knob_definition)?;
        validate_path_buf("database.benchbase_config_dir", &self.benchbase_config_dir)?;
        validate_path_buf("database.benchbase_results_dir", &self.benchbase_results_dir)?;
        validate_timeouts(
            "database",
            self.poll_interval_secs,
            &[
                ("start_timeout_secs", self.start_timeout_secs),
                ("load_timeout_secs", self.load_timeout_secs),
            ],
        )?;
        if self.stop_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "database.stop_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(user) = &self.run_as_user {
            validate_name("database.run_as_user", user)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// GCC and LLVM benchmark container settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Compiler benchmark image.
    #[serde(default = "default_compiler_image")]
    pub docker_image: String,
    /// Compiler container name.
    #[serde(default = "default_compiler_container_name")]
    pub container_name: String,
    /// Directory holding `programs.json`.
    #[serde(default = "default_compiler_config_dir")]
    pub config_dir: PathBuf,
    /// Host directory mounted as the benchmark harness results directory.
    #[serde(default = "default_compiler_results_dir")]
    pub results_dir: PathBuf,
    /// GCC knob definition JSON.
    #[serde(default = "default_gcc_knob_definition")]
    pub gcc_knob_definition: PathBuf,
    /// LLVM knob definition JSON.
    #[serde(default = "default_llvm_knob_definition")]
    pub llvm_knob_definition: PathBuf,
    /// Readiness timeout for the long-lived container, in seconds.
    #[serde(default = "default_compiler_start_timeout_secs")]
    pub start_timeout_secs: u64,
    /// Readiness poll interval, in seconds.
    #[serde(default = "default_compiler_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Stop timeout, in seconds.
    #[serde(default = "default_compiler_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
    /// Optional CPU limit, in virtual CPUs.
    #[serde(default)]
    pub vcpus: Option<f64>,
    /// Optional memory limit, in GiB.
    #[serde(default)]
    pub mem_gb: Option<f64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            docker_image: default_compiler_image(),
            container_name: default_compiler_container_name(),
            config_dir: default_compiler_config_dir(),
            results_dir: default_compiler_results_dir(),
            gcc_knob_definition: default_gcc_knob_definition(),
            llvm_knob_definition: default_llvm_knob_definition(),
            start_timeout_secs: default_compiler_start_timeout_secs(),
            poll_interval_secs: default_compiler_poll_interval_secs(),
            stop_timeout_secs: default_compiler_stop_timeout_secs(),
            vcpus: None,
            mem_gb: None,
        }
    }
}

impl CompilerConfig {
    /// Returns the readiness timeout.
    #[must_use]
    pub const fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    /// Returns the readiness poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the stop timeout.
    #[must_use]
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// Returns the path of the workload catalog.
    #[must_use]
    pub fn programs_file(&self) -> PathBuf {
        self.config_dir.join("programs.json")
    }

    /// Validates compiler settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_name("compiler.docker_image", &self.docker_image)?;
        validate_name("compiler.container_name", &self.container_name)?;
        validate_path_buf("compiler.config_dir", &self.config_dir)?;
        validate_path_buf("compiler.results_dir", &self.results_dir)?;
        validate_path_buf("compiler.gcc_knob_definition", &self.gcc_knob_definition)?;
        validate_path_buf("compiler.llvm_knob_definition", &self.llvm_knob_definition)?;
        validate_timeouts(
            "compiler",
            self.poll_interval_secs,
            &[("start_timeout_secs", self.start_timeout_secs)],
        )?;
        if self.stop_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "compiler.stop_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(vcpus) = self.vcpus {
            validate_limit("compiler.vcpus", vcpus)?;
        }
        if let Some(mem_gb) = self.mem_gb {
            validate_limit("compiler.mem_gb", mem_gb)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path.
fn validate_path_buf(field: &str, value: &Path) -> Result<(), ConfigError> {
    validate_path_string(field, &value.to_string_lossy())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an image, container, or account name.
fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!("{field} must not contain whitespace")));
    }
    Ok(())
}

/// Validates a CPU or memory limit.
fn validate_limit(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid(format!("{field} must be positive and finite")));
    }
    Ok(())
}

/// Validates a poll interval against the timeouts it serves.
fn validate_timeouts(
    section: &str,
    poll_interval_secs: u64,
    timeouts: &[(&str, u64)],
) -> Result<(), ConfigError> {
    if poll_interval_secs == 0 {
        return Err(ConfigError::Invalid(format!(
            "{section}.poll_interval_secs must be greater than zero"
        )));
    }
    for (field, timeout) in timeouts {
        if *timeout == 0 {
            return Err(ConfigError::Invalid(format!(
                "{section}.{field} must be greater than zero"
            )));
        }
        if poll_interval_secs > *timeout {
            return Err(ConfigError::Invalid(format!(
                "{section}.poll_interval_secs must not exceed {section}.{field}"
            )));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default cap on random-run samples.
const fn default_max_random_attempts() -> usize {
    DEFAULT_MAX_RANDOM_ATTEMPTS
}

/// Default MySQL image.
fn default_mysql_image() -> String {
    "mysql:8.0".to_string()
}

/// Default MySQL container name.
fn default_mysql_container_name() -> String {
    "tunebench-mysql".to_string()
}

/// Default MySQL CPU limit.
const fn default_mysql_vcpus() -> f64 {
    4.0
}

/// Default MySQL memory limit in GiB.
const fn default_mysql_mem_gb() -> f64 {
    8.0
}

/// Default MySQL host address.
fn default_mysql_host() -> String {
    "127.0.0.1".to_string()
}

/// Default MySQL host port.
const fn default_mysql_port() -> u16 {
    3307
}

/// Default MySQL application user.
fn default_mysql_user() -> String {
    "admin".to_string()
}

/// Default MySQL passwords.
fn default_mysql_password() -> String {
    "password".to_string()
}

/// Default MySQL database.
fn default_mysql_database() -> String {
    "benchbase".to_string()
}

/// Default option file path.
fn default_mysql_config_file() -> PathBuf {
    PathBuf::from("mysql/custom.cnf")
}

/// Default MySQL data directory.
fn default_mysql_data_dir() -> PathBuf {
    PathBuf::from("mysql/data")
}

/// Default MySQL knob definition.
fn default_mysql_knob_definition() -> PathBuf {
    PathBuf::from("definitions/mysql.json")
}

/// Default BenchBase image.
fn default_benchbase_image() -> String {
    "benchbase:latest".to_string()
}

/// Default BenchBase container name.
fn default_benchbase_container_name() -> String {
    "tunebench-benchbase".to_string()
}

/// Default BenchBase config directory.
fn default_benchbase_config_dir() -> PathBuf {
    PathBuf::from("benchbase/config")
}

/// Default BenchBase results directory.
fn default_benchbase_results_dir() -> PathBuf {
    PathBuf::from("benchbase/results")
}

/// Default database bring-up timeout.
const fn default_db_start_timeout_secs() -> u64 {
    60
}

/// Default data-loading timeout.
const fn default_db_load_timeout_secs() -> u64 {
    600
}

/// Default database poll interval.
const fn default_db_poll_interval_secs() -> u64 {
    5
}

/// Default database graceful stop timeout.
const fn default_db_stop_timeout_secs() -> u64 {
    60
}

/// Default compiler image.
fn default_compiler_image() -> String {
    "compiler-benchmark:0.1".to_string()
}

/// Default compiler container name.
fn default_compiler_container_name() -> String {
    "tunebench-compiler".to_string()
}

/// Default compiler config directory.
fn default_compiler_config_dir() -> PathBuf {
    PathBuf::from("compiler/config")
}

/// Default compiler results directory.
fn default_compiler_results_dir() -> PathBuf {
    PathBuf::from("compiler/results")
}

/// Default GCC knob definition.
fn default_gcc_knob_definition() -> PathBuf {
    PathBuf::from("definitions/gcc.json")
}

/// Default LLVM knob definition.
fn default_llvm_knob_definition() -> PathBuf {
    PathBuf::from("definitions/llvm.json")
}

/// Default compiler readiness timeout.
const fn default_compiler_start_timeout_secs() -> u64 {
    30
}

/// Default compiler poll interval.
const fn default_compiler_poll_interval_secs() -> u64 {
    1
}

/// Default compiler stop timeout.
const fn default_compiler_stop_timeout_secs() -> u64 {
    10
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

    #[test]
    fn validate_path_string_rejects_empty_string() {
        let result = validate_path_string("test_path", "  ");
        assert!(result.unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_component_too_long() {
        let long_component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path_string("test_path", &format!("./{long_component}"));
        assert!(result.unwrap_err().to_string().contains("component too long"));
    }

    #[test]
    fn validate_name_rejects_whitespace() {
        let result = validate_name("database.mysql_image", "mysql 8");
        assert!(result.unwrap_err().to_string().contains("whitespace"));
    }

    #[test]
    fn validate_limit_rejects_non_finite() {
        assert!(validate_limit("x", f64::NAN).is_err());
        assert!(validate_limit("x", f64::INFINITY).is_err());
        assert!(validate_limit("x", -1.0).is_err());
        assert!(validate_limit("x", 0.5).is_ok());
    }

    #[test]
    fn resolve_path_prefers_explicit_path() {
        let resolved = resolve_path(Some(Path::new("custom.toml"))).unwrap();
        assert_eq!(resolved, PathBuf::from("custom.toml"));
    }
}
