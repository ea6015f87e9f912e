// crates/tunebench-runner/src/lib.rs
// ============================================================================
// Module: tunebench Runner Library
// Description: Benchmark lifecycle controller and its external interfaces.
// Purpose: Drive provision, readiness, execution, collection, and teardown.
// Dependencies: tunebench-core, tunebench-config, serde_json, rand
// ============================================================================

//! ## Overview
//! The runner turns a configuration space into measured results. A
//! [`LifecycleController`] validates knobs, encodes them, provisions a fresh
//! environment, waits for readiness under a timeout, runs the workload,
//! parses the results artifact, and tears environments down gracefully with a
//! forced fallback.
//!
//! External systems sit behind interfaces: [`Environment`] for containers,
//! [`ReadinessProbe`] for connectivity checks, [`Clock`] for time, and
//! [`RunEventSink`] for structured run events. [`DockerCli`] and
//! [`InMemoryEnvironment`] are the provided environments.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod clock;
pub mod controller;
pub mod docker;
pub mod drivers;
pub mod error;
pub mod events;
pub mod interfaces;
pub mod memory;
pub mod poll;
pub mod probe;
pub mod results;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::ManualClock;
pub use clock::SystemClock;
pub use controller::ControllerSettings;
pub use controller::LifecycleController;
pub use docker::DockerCli;
pub use drivers::CompilerDriver;
pub use drivers::DatabaseDriver;
pub use drivers::ProvisionMode;
pub use drivers::ReadinessPlan;
pub use drivers::TargetDriver;
pub use error::RunError;
pub use error::StageError;
pub use error::TargetError;
pub use events::EventLevel;
pub use events::FileRunEventSink;
pub use events::MemoryRunEventSink;
pub use events::NoopRunEventSink;
pub use events::RunEvent;
pub use events::RunEventSink;
pub use events::StderrRunEventSink;
pub use events::sink_from_config;
pub use interfaces::Clock;
pub use interfaces::Environment;
pub use interfaces::EnvironmentError;
pub use interfaces::EnvironmentHandle;
pub use interfaces::EnvironmentStatus;
pub use interfaces::ExecOutput;
pub use interfaces::LaunchSpec;
pub use interfaces::PortMapping;
pub use interfaces::ReadinessProbe;
pub use interfaces::ResourceLimits;
pub use interfaces::VolumeMount;
pub use memory::InMemoryEnvironment;
pub use probe::AlwaysReady;
pub use probe::MysqlHandshakeProbe;
pub use state::BenchmarkRun;
pub use state::MetricsRecord;
pub use state::RunState;
