// crates/tunebench-runner/src/events.rs
// ============================================================================
// Module: Run Events
// Description: Structured lifecycle events and their sinks.
// Purpose: Emit JSON-line run logs without a hard logging dependency.
// Dependencies: serde, serde_json, tunebench-config, crate::state
// ============================================================================

//! ## Overview
//! The controller reports every state transition, readiness retry, teardown
//! decision, and attached workload log line as a [`RunEvent`]. Sinks decide
//! where events go: stderr, an append-only JSON-lines file, memory, or
//! nowhere. Sinks never fail the run; write errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;
use tunebench_config::GeneralConfig;

use crate::state::RunState;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Routine progress.
    Info,
    /// Recoverable problem.
    Warn,
    /// Failure.
    Error,
}

/// Run lifecycle event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RunEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: EventLevel,
    /// Environment name.
    pub environment: String,
    /// Workload identifier.
    pub workload: String,
    /// Run state when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<RunState>,
    /// Human-readable message.
    pub message: String,
    /// Structured detail when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl RunEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(
        event: &'static str,
        level: EventLevel,
        environment: impl Into<String>,
        workload: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            level,
            environment: environment.into(),
            workload: workload.into(),
            state: None,
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches the run state.
    #[must_use]
    pub fn with_state(mut self, state: RunState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches structured detail.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Run event sink.
pub trait RunEventSink: Send + Sync {
    /// Records a run event.
    fn record(&self, event: &RunEvent);
}

/// Run event sink that logs to stderr.
pub struct StderrRunEventSink;

impl RunEventSink for StderrRunEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Run event sink that appends JSON lines to a file.
pub struct FileRunEventSink {
    /// File handle guarded for concurrent writes.
    file: Mutex<std::fs::File>,
}

impl FileRunEventSink {
    /// Opens a file-backed run event sink.
    ///
    /// # Errors
    ///
    /// Returns an error when the log file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunEventSink for FileRunEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op run event sink.
pub struct NoopRunEventSink;

impl RunEventSink for NoopRunEventSink {
    fn record(&self, _event: &RunEvent) {}
}

/// Run event sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryRunEventSink {
    /// Recorded events in emission order.
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryRunEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns recorded event identifiers in emission order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .map(|events| events.iter().map(|event| event.event).collect())
            .unwrap_or_default()
    }
}

impl RunEventSink for MemoryRunEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Builds the sink selected by configuration.
///
/// A configured `event_log` path selects the file sink; otherwise events go
/// to stderr.
///
/// # Errors
///
/// Returns an error when the event log file cannot be opened.
pub fn sink_from_config(config: &GeneralConfig) -> io::Result<Arc<dyn RunEventSink>> {
    match &config.event_log {
        Some(path) => Ok(Arc::new(FileRunEventSink::new(path)?)),
        None => Ok(Arc::new(StderrRunEventSink)),
    }
}
