use crate::backend::{CommandRunner, Invocation};
use crate::RuntimeError;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Runs commands on the host, streaming their output to our stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn name(&self) -> &str {
        "system"
    }

    fn run(&self, invocation: &Invocation) -> Result<(), RuntimeError> {
        info!("+ {invocation}");
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            // our stdout is reserved for command results
            .stdout(Stdio::from(std::io::stderr()))
            .stderr(Stdio::inherit());
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd.status().map_err(|source| RuntimeError::Spawn {
            command: invocation.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(RuntimeError::CommandFailed {
                command: invocation.to_string(),
                code: status.code(),
            });
        }
        debug!("command completed: {}", invocation.program);
        Ok(())
    }

    fn command_exists(&self, program: &str) -> bool {
        let exists = Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        debug!("command '{program}' exists: {exists}");
        exists
    }
}
