// crates/tunebench-runner/src/controller.rs
// ============================================================================
// Module: Lifecycle Controller
// Description: Validate, provision, await readiness, execute, and collect.
// Purpose: Run one benchmark per call and always clean up after failures.
// Dependencies: rand, serde_json, tunebench-core, crate::{drivers, poll}
// ============================================================================

//! ## Overview
//! [`LifecycleController`] drives a [`TargetDriver`] through one run:
//!
//! 1. Apply the requested knobs to the space. Invalid input is rejected
//!    before anything is provisioned.
//! 2. Encode the configuration.
//! 3. Tear down any previous instance, then provision a fresh one.
//! 4. Poll status and the readiness probe until ready or timed out.
//! 5. Execute the workload (attached in debug mode) and parse its results.
//! 6. Tear the environment down, then report the run as completed.
//!
//! A timeout leaves the environment running for inspection. Every other
//! stage failure tears the environment down best-effort before the error is
//! returned. When the final teardown fails after collection, the run ends in
//! `Failed` with its metrics kept on the record and the teardown error is
//! returned.
//!
//! Teardown tries a graceful shutdown first and falls back to a forced stop
//! and remove; an absent environment is a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::json;
use tunebench_config::GeneralConfig;
use tunebench_core::ConfigurationSpace;
use tunebench_core::DEFAULT_MAX_RANDOM_ATTEMPTS;
use tunebench_core::EncodedConfiguration;
use tunebench_core::ParameterValue;

use crate::drivers::LogSink;
use crate::drivers::ProvisionMode;
use crate::drivers::ReadinessPlan;
use crate::drivers::TargetDriver;
use crate::error::RunError;
use crate::error::StageError;
use crate::events::EventLevel;
use crate::events::RunEvent;
use crate::events::RunEventSink;
use crate::interfaces::Clock;
use crate::interfaces::Environment;
use crate::interfaces::EnvironmentError;
use crate::interfaces::EnvironmentHandle;
use crate::interfaces::ReadinessProbe;
use crate::poll::PollOutcome;
use crate::poll::poll_until;
use crate::state::BenchmarkRun;
use crate::state::MetricsRecord;
use crate::state::RunState;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Interval between status checks while waiting for a graceful shutdown.
pub const STOP_POLL_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Controller behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Stream workload logs as events.
    pub debug_mode: bool,
    /// Sampling cap for random configurations.
    pub max_random_attempts: usize,
}

impl ControllerSettings {
    /// Builds settings from the general configuration section.
    #[must_use]
    pub const fn from_config(config: &GeneralConfig) -> Self {
        Self {
            debug_mode: config.debug_mode,
            max_random_attempts: config.max_random_attempts,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debug_mode: false,
            max_random_attempts: DEFAULT_MAX_RANDOM_ATTEMPTS,
        }
    }
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Benchmark lifecycle controller.
pub struct LifecycleController<D, E, P, C> {
    /// Target driver.
    driver: D,
    /// Environment backend.
    environment: E,
    /// Readiness probe.
    probe: P,
    /// Time source.
    clock: C,
    /// Run event sink.
    sink: Arc<dyn RunEventSink>,
    /// Behavior switches.
    settings: ControllerSettings,
    /// Most recent run record.
    last_run: Option<BenchmarkRun>,
}

impl<D, E, P, C> LifecycleController<D, E, P, C>
where
    D: TargetDriver,
    E: Environment,
    P: ReadinessProbe,
    C: Clock,
{
    /// Creates a controller.
    #[must_use]
    pub fn new(
        driver: D,
        environment: E,
        probe: P,
        clock: C,
        sink: Arc<dyn RunEventSink>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            driver,
            environment,
            probe,
            clock,
            sink,
            settings,
            last_run: None,
        }
    }

    /// Returns the target driver.
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Returns the environment backend.
    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// Returns the configuration space.
    #[must_use]
    pub fn space(&self) -> &ConfigurationSpace {
        self.driver.space()
    }

    /// Returns the configuration space for direct edits.
    pub fn space_mut(&mut self) -> &mut ConfigurationSpace {
        self.driver.space_mut()
    }

    /// Returns the most recent run record.
    #[must_use]
    pub const fn last_run(&self) -> Option<&BenchmarkRun> {
        self.last_run.as_ref()
    }

    // ------------------------------------------------------------------------
    // Runs
    // ------------------------------------------------------------------------

    /// Applies `knobs` and benchmarks the resulting configuration.
    ///
    /// An empty map benchmarks the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Rejected`] without provisioning when a knob is
    /// unknown, out of range, or breaks a constraint,
    /// [`RunError::Stage`] when a lifecycle stage fails, and
    /// [`RunError::Teardown`] when the environment cannot be removed after
    /// collection.
    pub fn run(
        &mut self,
        knobs: &BTreeMap<String, ParameterValue>,
    ) -> Result<MetricsRecord, RunError> {
        if let Err(err) = self.driver.space_mut().set_many(knobs) {
            self.record(self.event("run_rejected", EventLevel::Warn, err.to_string()));
            return Err(RunError::Rejected(err));
        }
        self.run_current()
    }

    /// Samples a constraint-satisfying configuration and benchmarks it.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Rejected`] when sampling exhausts its attempts.
    /// Otherwise fails like [`LifecycleController::run`].
    pub fn run_with_random(&mut self) -> Result<MetricsRecord, RunError> {
        let mut rng = rand::thread_rng();
        self.run_with_rng(&mut rng)
    }

    /// Samples with the given generator and benchmarks the result.
    ///
    /// # Errors
    ///
    /// Same as [`LifecycleController::run_with_random`].
    pub fn run_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<MetricsRecord, RunError> {
        let attempts = self.settings.max_random_attempts;
        match self.driver.space_mut().randomize_all(rng, attempts) {
            Ok(used) => {
                let message = format!("sampled configuration in {used} attempt(s)");
                self.record(self.event("random_sampled", EventLevel::Info, message));
            }
            Err(err) => {
                self.record(self.event("run_rejected", EventLevel::Warn, err.to_string()));
                return Err(RunError::Rejected(err));
            }
        }
        self.run_current()
    }

    /// Benchmarks the space's current configuration.
    fn run_current(&mut self) -> Result<MetricsRecord, RunError> {
        let encoded = match self.driver.encoder().encode(self.driver.space()) {
            Ok(encoded) => encoded,
            Err(err) => {
                self.record(self.event("encode_failed", EventLevel::Error, err.to_string()));
                return Err(RunError::Encode(err));
            }
        };
        let mut run = BenchmarkRun::new(self.driver.workload(), self.driver.environment_name());
        let result = self.drive(&mut run, &encoded);
        self.last_run = Some(run);
        result
    }

    /// Sequences the lifecycle stages for one run.
    fn drive(
        &self,
        run: &mut BenchmarkRun,
        encoded: &EncodedConfiguration,
    ) -> Result<MetricsRecord, RunError> {
        self.enter(run, RunState::Provisioning)?;
        let handle = match self.provision(Some(encoded), ProvisionMode::Configured) {
            Ok(handle) => handle,
            Err(err) => return Err(self.abort(run, err)),
        };
        run.attach(handle.clone());

        self.enter(run, RunState::AwaitingReady)?;
        let plan = self.driver.readiness_plan(ProvisionMode::Configured);
        if let Err(err) = self.await_ready(&handle, plan) {
            return Err(self.abort(run, err));
        }

        self.enter(run, RunState::Executing)?;
        let executed = self.with_logs(|logs| {
            self.driver.execute(&self.environment, &handle, encoded, logs)
        });
        if let Err(err) = executed {
            return Err(self.abort(run, err));
        }

        self.enter(run, RunState::Collecting)?;
        let metrics = match self.driver.collect() {
            Ok(metrics) => metrics,
            Err(err) => return Err(self.abort(run, err)),
        };
        run.record_metrics(metrics.clone());
        if let Err(err) = self.teardown_environment(self.driver.environment_name()) {
            self.enter(run, RunState::Failed)?;
            self.record(self.event("teardown_failed", EventLevel::Error, err.to_string()));
            return Err(RunError::Teardown(err));
        }
        self.enter(run, RunState::Completed)?;

        let mut event = self.event("run_completed", EventLevel::Info, "metrics collected");
        if let Ok(detail) = serde_json::to_value(&metrics) {
            event = event.with_detail(detail);
        }
        self.record(event);
        Ok(metrics)
    }

    /// Ends a run after a stage failure.
    fn abort(&self, run: &mut BenchmarkRun, source: StageError) -> RunError {
        let state = run.state();
        let timed_out = source.is_timeout();
        let terminal = if timed_out { RunState::TimedOut } else { RunState::Failed };
        // Every active state accepts Failed; timeouts never reach Collecting.
        let _ = run.transition(terminal);
        let (name, level) = if timed_out {
            ("run_timed_out", EventLevel::Warn)
        } else {
            ("run_failed", EventLevel::Error)
        };
        let detail = json!({
            "state": state,
            "error": source.to_string(),
        });
        self.record(
            self.event(name, level, source.to_string()).with_state(terminal).with_detail(detail),
        );
        if !timed_out {
            self.teardown_best_effort();
        }
        RunError::Stage {
            state,
            source,
        }
    }

    /// Advances a run and reports the transition.
    fn enter(&self, run: &mut BenchmarkRun, next: RunState) -> Result<(), RunError> {
        let from = run.state();
        run.transition(next).map_err(|source| RunError::Stage {
            state: from,
            source,
        })?;
        let message = format!("{from} -> {next}");
        self.record(self.event("state_transition", EventLevel::Info, message).with_state(next));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Data Loading
    // ------------------------------------------------------------------------

    /// Loads benchmark data into a bare environment, then tears it down.
    ///
    /// Targets without a data loading phase return immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Stage`] when provisioning, readiness, or loading
    /// fails, and [`RunError::Teardown`] when the final teardown fails.
    pub fn prepare(&self) -> Result<(), RunError> {
        if !self.driver.supports_data_loading() {
            self.record(self.event("data_load_skipped", EventLevel::Info, "no data to load"));
            return Ok(());
        }
        let handle = self
            .provision(None, ProvisionMode::Bare)
            .map_err(|err| self.fail_data_load(RunState::Provisioning, err))?;
        let plan = self.driver.readiness_plan(ProvisionMode::Bare);
        self.await_ready(&handle, plan)
            .map_err(|err| self.fail_data_load(RunState::AwaitingReady, err))?;
        self.with_logs(|logs| self.driver.load_data(&self.environment, logs))
            .map_err(|err| self.fail_data_load(RunState::Executing, err))?;
        self.teardown_environment(self.driver.environment_name()).map_err(RunError::Teardown)?;
        self.record(self.event("data_load_completed", EventLevel::Info, "benchmark data loaded"));
        Ok(())
    }

    /// Reports a data loading failure, cleaning up unless it timed out.
    fn fail_data_load(&self, state: RunState, source: StageError) -> RunError {
        self.record(self.event("data_load_failed", EventLevel::Error, source.to_string()));
        if !source.is_timeout() {
            self.teardown_best_effort();
        }
        RunError::Stage {
            state,
            source,
        }
    }

    // ------------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------------

    /// Replaces any previous instance with a freshly launched one.
    fn provision(
        &self,
        encoded: Option<&EncodedConfiguration>,
        mode: ProvisionMode,
    ) -> Result<EnvironmentHandle, StageError> {
        self.teardown_environment(self.driver.environment_name())?;
        let spec = self.driver.prepare_launch(encoded, mode)?;
        let handle = self.environment.launch(&spec)?;
        let detail = json!({
            "id": handle.id,
            "image": spec.image,
        });
        self.record(
            self.event("environment_provisioned", EventLevel::Info, "environment launched")
                .with_detail(detail),
        );
        Ok(handle)
    }

    /// Polls until the environment runs and the probe reports ready.
    fn await_ready(
        &self,
        handle: &EnvironmentHandle,
        plan: ReadinessPlan,
    ) -> Result<(), StageError> {
        let outcome = poll_until(&self.clock, plan.interval, plan.timeout, |attempt| {
            let status = self.environment.status(handle)?;
            if status.is_terminal() {
                return Err(StageError::EnvironmentExited {
                    name: handle.name.clone(),
                    status,
                });
            }
            if status.is_running() && self.probe.is_ready() {
                return Ok(Some(()));
            }
            let message = format!("attempt {attempt}: not ready ({status})");
            self.record(self.event("readiness_retry", EventLevel::Info, message));
            Ok(None)
        })?;
        match outcome {
            PollOutcome::Ready(()) => {
                self.record(self.event("environment_ready", EventLevel::Info, "ready"));
                Ok(())
            }
            PollOutcome::TimedOut {
                waited,
            } => Err(StageError::ReadinessTimeout {
                name: handle.name.clone(),
                waited,
            }),
        }
    }

    /// Calls `stage` with a log sink when running attached.
    fn with_logs<T>(&self, stage: impl FnOnce(LogSink<'_>) -> T) -> T {
        if self.settings.debug_mode {
            let forward: &mut dyn FnMut(&str) = &mut |line: &str| {
                self.record(self.event("workload_log", EventLevel::Info, line));
            };
            stage(Some(forward))
        } else {
            stage(None)
        }
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Stops and removes the primary environment.
    ///
    /// Calling it when nothing is running is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Teardown`] when both graceful and forced teardown
    /// fail.
    pub fn teardown(&self) -> Result<(), RunError> {
        self.teardown_environment(self.driver.environment_name()).map_err(RunError::Teardown)
    }

    /// Tears down and reports failures instead of returning them.
    fn teardown_best_effort(&self) {
        if let Err(err) = self.teardown_environment(self.driver.environment_name()) {
            self.record(self.event("teardown_failed", EventLevel::Error, err.to_string()));
        }
    }

    /// Graceful teardown with a forced fallback.
    fn teardown_environment(&self, name: &str) -> Result<(), EnvironmentError> {
        let Some(handle) = self.environment.get(name)? else {
            self.record(self.event("teardown_skipped", EventLevel::Info, "nothing to tear down"));
            return Ok(());
        };
        match self.graceful_stop(&handle) {
            Ok(()) => {
                let message = "stopped and removed";
                self.record(self.event("teardown_graceful", EventLevel::Info, message));
                Ok(())
            }
            Err(err) => {
                self.record(self.event("teardown_fallback", EventLevel::Warn, err.to_string()));
                self.force_remove(&handle)
            }
        }
    }

    /// Requests shutdown, waits for the instance to stop, then removes it.
    fn graceful_stop(&self, handle: &EnvironmentHandle) -> Result<(), StageError> {
        let status = self.environment.status(handle)?;
        if !status.is_running() {
            ignore_not_found(self.environment.remove(handle, true))?;
            return Ok(());
        }
        if let Some(command) = self.driver.shutdown_command() {
            let output = self.environment.exec(handle, &command)?;
            if !output.success() {
                return Err(StageError::ShutdownFailed {
                    name: handle.name.clone(),
                    exit_code: output.exit_code,
                });
            }
            let outcome =
                poll_until(&self.clock, STOP_POLL_INTERVAL, self.driver.stop_timeout(), |_| {
                    match self.environment.status(handle) {
                        Ok(status) => Ok((!status.is_running()).then_some(())),
                        Err(err) if err.is_not_found() => Ok(Some(())),
                        Err(err) => Err(StageError::from(err)),
                    }
                })?;
            if let PollOutcome::TimedOut {
                waited,
            } = outcome
            {
                return Err(StageError::StopTimeout {
                    name: handle.name.clone(),
                    waited,
                });
            }
        }
        ignore_not_found(self.environment.stop(handle))?;
        ignore_not_found(self.environment.remove(handle, false))?;
        Ok(())
    }

    /// Stops and force-removes an instance, tolerating a failed stop.
    fn force_remove(&self, handle: &EnvironmentHandle) -> Result<(), EnvironmentError> {
        if let Err(err) = self.environment.stop(handle)
            && !err.is_not_found()
        {
            self.record(self.event("teardown_stop_failed", EventLevel::Warn, err.to_string()));
        }
        ignore_not_found(self.environment.remove(handle, true))
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Builds an event for the current driver.
    fn event(
        &self,
        event: &'static str,
        level: EventLevel,
        message: impl Into<String>,
    ) -> RunEvent {
        RunEvent::new(
            event,
            level,
            self.driver.environment_name(),
            self.driver.workload(),
            message,
        )
    }

    /// Sends an event to the sink.
    fn record(&self, event: RunEvent) {
        self.sink.record(&event);
    }
}

/// Treats a missing instance as already handled.
fn ignore_not_found(result: Result<(), EnvironmentError>) -> Result<(), EnvironmentError> {
    match result {
        Err(err) if err.is_not_found() => Ok(()),
        other => other,
    }
}
