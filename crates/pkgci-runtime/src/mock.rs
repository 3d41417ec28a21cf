use crate::backend::{CommandRunner, Invocation};
use crate::RuntimeError;
use std::collections::HashSet;
use std::sync::Mutex;

/// Runner that records invocations instead of executing them.
///
/// Every program succeeds unless listed with [`fail_program`](Self::fail_program).
/// `command_exists` answers from the set given to [`with_command`](Self::with_command).
#[derive(Default)]
pub struct MockRunner {
    calls: Mutex<Vec<Invocation>>,
    failing: HashSet<String>,
    available: HashSet<String>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_command(mut self, program: &str) -> Self {
        self.available.insert(program.to_owned());
        self
    }

    #[must_use]
    pub fn fail_program(mut self, program: &str) -> Self {
        self.failing.insert(program.to_owned());
        self
    }

    /// Invocations seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    fn run(&self, invocation: &Invocation) -> Result<(), RuntimeError> {
        self.calls
            .lock()
            .map_err(|e| RuntimeError::Spawn {
                command: invocation.to_string(),
                source: std::io::Error::other(format!("mutex poisoned: {e}")),
            })?
            .push(invocation.clone());

        if self.failing.contains(&invocation.program) {
            return Err(RuntimeError::CommandFailed {
                command: invocation.to_string(),
                code: Some(1),
            });
        }
        Ok(())
    }

    fn command_exists(&self, program: &str) -> bool {
        self.available.contains(program)
    }
}
