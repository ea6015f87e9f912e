// crates/tunebench-runner/tests/events.rs
// ============================================================================
// Module: Run Event Sink Tests
// Description: File and memory sinks plus configuration-driven selection.
// Purpose: Verify run events are persisted as JSON lines.
// ============================================================================

//! Run event sink tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::fs;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use tunebench_config::GeneralConfig;
use tunebench_runner::EventLevel;
use tunebench_runner::FileRunEventSink;
use tunebench_runner::MemoryRunEventSink;
use tunebench_runner::RunEvent;
use tunebench_runner::RunEventSink;
use tunebench_runner::RunState;
use tunebench_runner::sink_from_config;

/// Builds an info event for the MySQL environment.
fn event(name: &'static str) -> RunEvent {
    RunEvent::new(name, EventLevel::Info, "tunebench-mysql", "tpcc", "message")
}

/// Tests file sink appends json lines.
#[test]
fn file_sink_appends_json_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.jsonl");
    let sink = FileRunEventSink::new(&path).unwrap();

    sink.record(&event("state_transition").with_state(RunState::Provisioning));
    sink.record(&event("run_completed").with_detail(json!({"latency": 1.5})));

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = text.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "state_transition");
    assert_eq!(lines[0]["state"], "provisioning");
    assert_eq!(lines[0]["level"], "info");
    assert!(lines[0].get("detail").is_none());
    assert_eq!(lines[1]["detail"]["latency"], 1.5);
    assert!(lines[1].get("state").is_none());
}

/// Tests configured event log selects file sink.
#[test]
fn configured_event_log_selects_file_sink() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.jsonl");
    let config = GeneralConfig {
        event_log: Some(path.clone()),
        ..GeneralConfig::default()
    };

    let sink = sink_from_config(&config).unwrap();
    sink.record(&event("environment_ready"));

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"environment_ready\""));
    assert!(text.ends_with('\n'));
}

/// Tests unwritable event log is an error.
#[test]
fn unwritable_event_log_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = GeneralConfig {
        event_log: Some(dir.path().join("missing/run.jsonl")),
        ..GeneralConfig::default()
    };

    assert!(sink_from_config(&config).is_err());
}

/// Tests memory sink keeps emission order.
#[test]
fn memory_sink_keeps_emission_order() {
    let sink = MemoryRunEventSink::new();

    sink.record(&event("environment_provisioned"));
    sink.record(&event("environment_ready"));

    assert_eq!(sink.event_names(), vec!["environment_provisioned", "environment_ready"]);
    assert_eq!(sink.events()[1].workload, "tpcc");
}
