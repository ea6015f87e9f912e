// crates/tunebench-runner/src/results.rs
// ============================================================================
// Module: Results Parsing
// Description: Read benchmark artifacts into metric records.
// Purpose: Turn BenchBase summaries and compiler reports into metrics.
// Dependencies: serde_json, crate::{error, state}
// ============================================================================

//! ## Overview
//! BenchBase writes `<timestamp>.summary.json`; the required metrics are the
//! 95th percentile latency (microseconds) and throughput (requests/second).
//! Compiler runs write `<gcc|llvm>_results.json`, an object keyed by program
//! whose value is null when the run failed. Artifacts are read with a size
//! cap, and results directories are emptied before each execution so stale
//! files are never collected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;

use crate::error::StageError;
use crate::state::MetricsRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum artifact size accepted.
pub const MAX_ARTIFACT_BYTES: u64 = 16 * 1024 * 1024;

/// Suffix of BenchBase summary files.
pub const SUMMARY_SUFFIX: &str = ".summary.json";

/// 95th percentile latency in microseconds.
pub const METRIC_LATENCY: &str = "latency";
/// Throughput in requests per second.
pub const METRIC_THROUGHPUT: &str = "throughput";
/// Average latency in microseconds.
pub const METRIC_LATENCY_AVG: &str = "latency_avg";
/// Median latency in microseconds.
pub const METRIC_LATENCY_MEDIAN: &str = "latency_median";
/// 99th percentile latency in microseconds.
pub const METRIC_LATENCY_P99: &str = "latency_p99";
/// Goodput in requests per second.
pub const METRIC_GOODPUT: &str = "goodput";

/// Fields every compiler result must carry.
pub const REQUIRED_COMPILER_METRICS: [&str; 3] =
    ["execution_time", "compilation_time", "file_size"];

/// Summary key holding the latency distribution.
const LATENCY_DISTRIBUTION: &str = "Latency Distribution";
/// Summary key holding throughput.
const THROUGHPUT_KEY: &str = "Throughput (requests/second)";
/// Summary key holding goodput.
const GOODPUT_KEY: &str = "Goodput (requests/second)";
/// Required latency key inside the distribution.
const P95_KEY: &str = "95th Percentile Latency (microseconds)";
/// Optional latency keys inside the distribution.
const OPTIONAL_LATENCY_KEYS: [(&str, &str); 3] = [
    ("Average Latency (microseconds)", METRIC_LATENCY_AVG),
    ("Median Latency (microseconds)", METRIC_LATENCY_MEDIAN),
    ("99th Percentile Latency (microseconds)", METRIC_LATENCY_P99),
];

// ============================================================================
// SECTION: Parsers
// ============================================================================

/// Parses a BenchBase summary document.
///
/// # Errors
///
/// Returns a reason string when the document is not JSON or lacks the
/// required latency or throughput values.
pub fn parse_benchbase_summary(text: &str) -> Result<MetricsRecord, String> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| format!("summary is not valid json: {err}"))?;
    let distribution = root
        .get(LATENCY_DISTRIBUTION)
        .and_then(Value::as_object)
        .ok_or_else(|| format!("missing \"{LATENCY_DISTRIBUTION}\""))?;
    let mut metrics = MetricsRecord::new();
    metrics.insert(METRIC_LATENCY, required_number(distribution, P95_KEY)?);
    let throughput = root.get(THROUGHPUT_KEY).and_then(Value::as_f64);
    metrics.insert(
        METRIC_THROUGHPUT,
        throughput.ok_or_else(|| format!("missing numeric \"{THROUGHPUT_KEY}\""))?,
    );
    for (key, metric) in OPTIONAL_LATENCY_KEYS {
        if let Some(value) = distribution.get(key).and_then(Value::as_f64) {
            metrics.insert(metric, value);
        }
    }
    if let Some(goodput) = root.get(GOODPUT_KEY).and_then(Value::as_f64) {
        metrics.insert(METRIC_GOODPUT, goodput);
    }
    Ok(metrics)
}

/// Parses a compiler results document for one program.
///
/// Every numeric field of the program's entry becomes a metric.
///
/// # Errors
///
/// Returns a reason string when the program is absent, its run failed
/// (null entry), or a required field is missing.
pub fn parse_compiler_results(text: &str, program: &str) -> Result<MetricsRecord, String> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| format!("results are not valid json: {err}"))?;
    let entry = root.get(program).ok_or_else(|| format!("no results for {program}"))?;
    if entry.is_null() {
        return Err(format!("benchmark {program} reported no results"));
    }
    let fields =
        entry.as_object().ok_or_else(|| format!("results for {program} are not an object"))?;
    let mut metrics = MetricsRecord::new();
    for (name, value) in fields {
        if let Some(number) = value.as_f64() {
            metrics.insert(name.clone(), number);
        }
    }
    for required in REQUIRED_COMPILER_METRICS {
        if !metrics.contains(required) {
            return Err(format!("missing numeric \"{required}\" for {program}"));
        }
    }
    Ok(metrics)
}

/// Reads a required number from a JSON object.
fn required_number(object: &Map<String, Value>, key: &str) -> Result<f64, String> {
    object.get(key).and_then(Value::as_f64).ok_or_else(|| format!("missing numeric \"{key}\""))
}

// ============================================================================
// SECTION: Artifact Files
// ============================================================================

/// Finds the BenchBase summary in a results directory.
///
/// When several summaries exist the lexicographically last name wins.
///
/// # Errors
///
/// Returns [`StageError::MissingArtifact`] when the directory is missing or
/// holds no summary.
pub fn find_summary(dir: &Path) -> Result<PathBuf, StageError> {
    let missing = || StageError::MissingArtifact {
        path: dir.join(format!("*{SUMMARY_SUFFIX}")),
    };
    let entries = fs::read_dir(dir).map_err(|_| missing())?;
    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(SUMMARY_SUFFIX))
        })
        .max()
        .ok_or_else(missing)
}

/// Reads an artifact as UTF-8 with the size cap applied.
///
/// # Errors
///
/// Returns [`StageError::MissingArtifact`] when the file does not exist and
/// [`StageError::InvalidArtifact`] when it is too large or not UTF-8.
pub fn read_artifact(path: &Path) -> Result<String, StageError> {
    let file = fs::File::open(path).map_err(|_| StageError::MissingArtifact {
        path: path.to_path_buf(),
    })?;
    let invalid = |reason: String| StageError::InvalidArtifact {
        path: path.to_path_buf(),
        reason,
    };
    let mut bytes = Vec::new();
    file.take(MAX_ARTIFACT_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|err| invalid(format!("read failed: {err}")))?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_ARTIFACT_BYTES {
        return Err(invalid(format!("exceeds {MAX_ARTIFACT_BYTES} bytes")));
    }
    String::from_utf8(bytes).map_err(|_| invalid("not valid utf-8".to_string()))
}

/// Removes every file in a results directory, creating it when absent.
///
/// Subdirectories are left in place.
///
/// # Errors
///
/// Returns [`StageError::Io`] when the directory cannot be created or a file
/// cannot be removed.
pub fn clear_results_dir(dir: &Path) -> Result<(), StageError> {
    fs::create_dir_all(dir)
        .map_err(|err| StageError::Io(format!("cannot create {}: {err}", dir.display())))?;
    let entries = fs::read_dir(dir)
        .map_err(|err| StageError::Io(format!("cannot list {}: {err}", dir.display())))?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_file() {
            fs::remove_file(&path)
                .map_err(|err| StageError::Io(format!("cannot remove {}: {err}", path.display())))?;
        }
    }
    Ok(())
}
