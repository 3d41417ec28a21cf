use crate::RuntimeError;
use std::fmt;
use std::path::PathBuf;

/// One external command: program, arguments, extra environment and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes external commands on behalf of the installer and builder.
pub trait CommandRunner: Send + Sync {
    fn name(&self) -> &str;

    /// Run to completion, streaming output to stderr. A non-zero exit is an error.
    fn run(&self, invocation: &Invocation) -> Result<(), RuntimeError>;

    /// Whether `program` resolves on `PATH`.
    fn command_exists(&self, program: &str) -> bool;
}

pub fn select_runner(name: &str) -> Result<Box<dyn CommandRunner>, RuntimeError> {
    match name {
        "system" => Ok(Box::new(crate::process::SystemRunner::new())),
        "mock" => Ok(Box::new(crate::mock::MockRunner::new())),
        other => Err(RuntimeError::RunnerUnavailable(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_env_and_args() {
        let inv = Invocation::new("paru")
            .args(["-B", "--noconfirm", "./"])
            .env("CCACHE_DIR", "/tmp/ccache");
        assert_eq!(
            inv.to_string(),
            "CCACHE_DIR=/tmp/ccache paru -B --noconfirm ./"
        );
    }

    #[test]
    fn display_without_args() {
        assert_eq!(Invocation::new("true").to_string(), "true");
    }

    #[test]
    fn select_known_runners() {
        assert_eq!(select_runner("system").unwrap().name(), "system");
        assert_eq!(select_runner("mock").unwrap().name(), "mock");
    }

    #[test]
    fn select_unknown_runner_fails() {
        assert!(matches!(
            select_runner("docker"),
            Err(RuntimeError::RunnerUnavailable(_))
        ));
    }
}
