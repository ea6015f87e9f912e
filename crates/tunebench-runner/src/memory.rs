// crates/tunebench-runner/src/memory.rs
// ============================================================================
// Module: In-Memory Environment
// Description: Scriptable environment that simulates container lifecycles.
// Purpose: Exercise the lifecycle controller without a container runtime.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryEnvironment`] keeps instances in a shared map and records every
//! call it receives. Behavior is scripted per instance name: the status after
//! launch, failures of launch, stop, remove, and wait, exec results keyed by
//! program, exit codes, log lines, and result artifacts written to disk when
//! a workload runs. Clones share state, so a test can keep one clone for
//! inspection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::interfaces::Environment;
use crate::interfaces::EnvironmentError;
use crate::interfaces::EnvironmentHandle;
use crate::interfaces::EnvironmentStatus;
use crate::interfaces::ExecOutput;
use crate::interfaces::LaunchSpec;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Simulated instance.
#[derive(Debug, Clone)]
struct Instance {
    /// Generated identifier.
    id: String,
    /// Current status.
    status: EnvironmentStatus,
}

/// Scripted response for commands run through `exec`.
#[derive(Debug, Clone)]
struct ExecRule {
    /// First command argument the rule matches.
    program: String,
    /// Output returned.
    output: ExecOutput,
    /// Marks the instance exited after the command.
    exits_instance: bool,
}

/// Scripted behavior keyed by instance name.
#[derive(Debug, Clone, Default)]
struct Script {
    /// Status assigned on launch (default running).
    launch_status: BTreeMap<String, EnvironmentStatus>,
    /// Launch failures.
    launch_failures: BTreeMap<String, String>,
    /// Names whose stop call fails.
    stop_failures: BTreeSet<String>,
    /// Names whose remove call fails.
    remove_failures: BTreeSet<String>,
    /// Wait failures.
    wait_failures: BTreeMap<String, String>,
    /// Exec responses.
    exec_rules: Vec<ExecRule>,
    /// Exit codes reported by `wait`.
    exit_codes: BTreeMap<String, i64>,
    /// Log lines streamed by `follow_logs`.
    logs: BTreeMap<String, Vec<String>>,
    /// Files written when a workload runs inside the instance.
    artifacts: BTreeMap<String, Vec<(PathBuf, String)>>,
}

/// Shared simulator state.
#[derive(Debug, Default)]
struct InMemoryState {
    /// Live instances.
    instances: BTreeMap<String, Instance>,
    /// Launch counter for identifiers.
    launched: u64,
    /// Call log (`verb:name`).
    calls: Vec<String>,
    /// Launch specs received.
    launches: Vec<LaunchSpec>,
    /// Commands received through `exec`.
    execs: Vec<Vec<String>>,
    /// Scripted behavior.
    script: Script,
}

impl InMemoryState {
    /// Returns a mutable instance or `NotFound`.
    fn instance_mut(&mut self, name: &str) -> Result<&mut Instance, EnvironmentError> {
        self.instances.get_mut(name).ok_or_else(|| EnvironmentError::NotFound {
            name: name.to_string(),
        })
    }

    /// Writes the artifacts scripted for `name`.
    fn write_artifacts(&self, name: &str) -> Result<(), EnvironmentError> {
        let Some(artifacts) = self.script.artifacts.get(name) else {
            return Ok(());
        };
        for (path, contents) in artifacts {
            std::fs::write(path, contents).map_err(|err| {
                EnvironmentError::Backend(format!(
                    "failed to write artifact {}: {err}",
                    path.display()
                ))
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Scriptable in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEnvironment {
    /// Shared simulator state.
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status instances named `name` get on launch.
    #[must_use]
    pub fn with_launch_status(self, name: &str, status: EnvironmentStatus) -> Self {
        self.script(|script| {
            script.launch_status.insert(name.to_string(), status);
        })
    }

    /// Makes launches of `name` fail.
    #[must_use]
    pub fn with_launch_failure(self, name: &str, message: &str) -> Self {
        self.script(|script| {
            script.launch_failures.insert(name.to_string(), message.to_string());
        })
    }

    /// Makes stop calls for `name` fail.
    #[must_use]
    pub fn with_stop_failure(self, name: &str) -> Self {
        self.script(|script| {
            script.stop_failures.insert(name.to_string());
        })
    }

    /// Makes remove calls for `name` fail, forced or not.
    #[must_use]
    pub fn with_remove_failure(self, name: &str) -> Self {
        self.script(|script| {
            script.remove_failures.insert(name.to_string());
        })
    }

    /// Makes `wait` on `name` fail with `message`.
    #[must_use]
    pub fn with_wait_failure(self, name: &str, message: &str) -> Self {
        self.script(|script| {
            script.wait_failures.insert(name.to_string(), message.to_string());
        })
    }

    /// Scripts the output of commands whose first argument is `program`.
    #[must_use]
    pub fn with_exec_output(self, program: &str, output: ExecOutput, exits_instance: bool) -> Self {
        self.script(|script| {
            script.exec_rules.push(ExecRule {
                program: program.to_string(),
                output,
                exits_instance,
            });
        })
    }

    /// Sets the exit code `wait` reports for `name`.
    #[must_use]
    pub fn with_exit_code(self, name: &str, code: i64) -> Self {
        self.script(|script| {
            script.exit_codes.insert(name.to_string(), code);
        })
    }

    /// Sets the log lines streamed for `name`.
    #[must_use]
    pub fn with_logs(self, name: &str, lines: &[&str]) -> Self {
        self.script(|script| {
            script
                .logs
                .insert(name.to_string(), lines.iter().map(ToString::to_string).collect());
        })
    }

    /// Writes `contents` to `path` whenever a workload runs in `name`.
    #[must_use]
    pub fn with_artifact(self, name: &str, path: impl Into<PathBuf>, contents: &str) -> Self {
        let path = path.into();
        self.script(|script| {
            script
                .artifacts
                .entry(name.to_string())
                .or_default()
                .push((path, contents.to_string()));
        })
    }

    /// Adds an instance as if it had been launched earlier.
    pub fn insert_instance(&self, name: &str, status: EnvironmentStatus) {
        if let Ok(mut state) = self.state.lock() {
            state.launched += 1;
            let id = format!("mem-{}", state.launched);
            state.instances.insert(
                name.to_string(),
                Instance {
                    id,
                    status,
                },
            );
        }
    }

    /// Overrides the status of a live instance.
    pub fn set_status(&self, name: &str, status: EnvironmentStatus) {
        if let Ok(mut state) = self.state.lock()
            && let Some(instance) = state.instances.get_mut(name)
        {
            instance.status = status;
        }
    }

    /// Returns the call log.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().map(|state| state.calls.clone()).unwrap_or_default()
    }

    /// Returns every launch spec received, in order.
    #[must_use]
    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.state.lock().map(|state| state.launches.clone()).unwrap_or_default()
    }

    /// Returns every command received through `exec`, in order.
    #[must_use]
    pub fn exec_commands(&self) -> Vec<Vec<String>> {
        self.state.lock().map(|state| state.execs.clone()).unwrap_or_default()
    }

    /// Returns the status of a live instance.
    #[must_use]
    pub fn status_of(&self, name: &str) -> Option<EnvironmentStatus> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.instances.get(name).map(|instance| instance.status.clone()))
    }

    /// Returns live instance names.
    #[must_use]
    pub fn instance_names(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.instances.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Applies a script change and returns the environment.
    fn script(self, change: impl FnOnce(&mut Script)) -> Self {
        if let Ok(mut state) = self.state.lock() {
            change(&mut state.script);
        }
        self
    }

    /// Locks the state and logs the call.
    fn enter(
        &self,
        verb: &str,
        name: &str,
    ) -> Result<MutexGuard<'_, InMemoryState>, EnvironmentError> {
        let mut state = self.state.lock().map_err(|_| {
            EnvironmentError::Backend("in-memory environment mutex poisoned".to_string())
        })?;
        state.calls.push(format!("{verb}:{name}"));
        Ok(state)
    }
}

impl Environment for InMemoryEnvironment {
    fn launch(&self, spec: &LaunchSpec) -> Result<EnvironmentHandle, EnvironmentError> {
        let mut state = self.enter("launch", &spec.name)?;
        if let Some(message) = state.script.launch_failures.get(&spec.name) {
            return Err(EnvironmentError::Backend(message.clone()));
        }
        if state.instances.contains_key(&spec.name) {
            return Err(EnvironmentError::Backend(format!(
                "environment name {} already in use",
                spec.name
            )));
        }
        state.launched += 1;
        let id = format!("mem-{}", state.launched);
        let status = state
            .script
            .launch_status
            .get(&spec.name)
            .cloned()
            .unwrap_or(EnvironmentStatus::Running);
        state.instances.insert(
            spec.name.clone(),
            Instance {
                id: id.clone(),
                status,
            },
        );
        state.launches.push(spec.clone());
        Ok(EnvironmentHandle {
            name: spec.name.clone(),
            id,
        })
    }

    fn get(&self, name: &str) -> Result<Option<EnvironmentHandle>, EnvironmentError> {
        let state = self.enter("get", name)?;
        Ok(state.instances.get(name).map(|instance| EnvironmentHandle {
            name: name.to_string(),
            id: instance.id.clone(),
        }))
    }

    fn status(&self, handle: &EnvironmentHandle) -> Result<EnvironmentStatus, EnvironmentError> {
        let mut state = self.enter("status", &handle.name)?;
        Ok(state.instance_mut(&handle.name)?.status.clone())
    }

    fn stop(&self, handle: &EnvironmentHandle) -> Result<(), EnvironmentError> {
        let mut state = self.enter("stop", &handle.name)?;
        if state.script.stop_failures.contains(&handle.name) {
            return Err(EnvironmentError::Backend(format!("stop of {} failed", handle.name)));
        }
        state.instance_mut(&handle.name)?.status = EnvironmentStatus::Exited;
        Ok(())
    }

    fn remove(&self, handle: &EnvironmentHandle, force: bool) -> Result<(), EnvironmentError> {
        let verb = if force { "remove_force" } else { "remove" };
        let mut state = self.enter(verb, &handle.name)?;
        if state.script.remove_failures.contains(&handle.name) {
            return Err(EnvironmentError::Backend(format!("remove of {} failed", handle.name)));
        }
        let running = state.instance_mut(&handle.name)?.status.is_running();
        if running && !force {
            return Err(EnvironmentError::Backend(format!(
                "cannot remove running environment {}",
                handle.name
            )));
        }
        state.instances.remove(&handle.name);
        Ok(())
    }

    fn exec(
        &self,
        handle: &EnvironmentHandle,
        command: &[String],
    ) -> Result<ExecOutput, EnvironmentError> {
        let mut state = self.enter("exec", &handle.name)?;
        state.execs.push(command.to_vec());
        if !state.instance_mut(&handle.name)?.status.is_running() {
            return Err(EnvironmentError::Backend(format!(
                "environment {} is not running",
                handle.name
            )));
        }
        let program = command.first().map_or("", String::as_str);
        let rule = state.script.exec_rules.iter().find(|rule| rule.program == program).cloned();
        match rule {
            Some(rule) => {
                if rule.exits_instance {
                    state.instance_mut(&handle.name)?.status = EnvironmentStatus::Exited;
                } else if rule.output.success() {
                    state.write_artifacts(&handle.name)?;
                }
                Ok(rule.output)
            }
            None => {
                state.write_artifacts(&handle.name)?;
                Ok(ExecOutput {
                    exit_code: 0,
                    output: String::new(),
                })
            }
        }
    }

    fn wait(&self, handle: &EnvironmentHandle) -> Result<i64, EnvironmentError> {
        let mut state = self.enter("wait", &handle.name)?;
        if let Some(message) = state.script.wait_failures.get(&handle.name) {
            return Err(EnvironmentError::Backend(message.clone()));
        }
        let code = state.script.exit_codes.get(&handle.name).copied().unwrap_or(0);
        if code == 0 {
            state.write_artifacts(&handle.name)?;
        }
        state.instance_mut(&handle.name)?.status = EnvironmentStatus::Exited;
        Ok(code)
    }

    fn follow_logs(
        &self,
        handle: &EnvironmentHandle,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<(), EnvironmentError> {
        let lines = {
            let mut state = self.enter("follow_logs", &handle.name)?;
            state.instance_mut(&handle.name)?;
            state.script.logs.get(&handle.name).cloned().unwrap_or_default()
        };
        for line in &lines {
            on_line(line);
        }
        Ok(())
    }
}
