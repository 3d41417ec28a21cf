//! Execution layer for pkgci: everything that touches the host.
//!
//! External commands go through the [`CommandRunner`] trait so the dependency
//! installer and package builder can be driven by the real system
//! ([`SystemRunner`]) or a recording double ([`MockRunner`]). Prerequisite
//! checks report missing host tools before any work starts.

pub mod backend;
pub mod builder;
pub mod deps;
pub mod mock;
pub mod prereq;
pub mod process;
pub mod settings;

pub use backend::{select_runner, CommandRunner, Invocation};
pub use builder::{find_matching, find_packages, PackageBuilder, PACKAGE_GLOB};
pub use deps::{resolve_install_set, DependencyInstaller, InstallOutcome};
pub use mock::MockRunner;
pub use prereq::{check_build_prereqs, check_deps_prereqs, format_missing, MissingPrereq};
pub use process::SystemRunner;
pub use settings::{BuildSettings, PackageManagerSettings};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command failed ({}): {command}", exit_label(*.code))]
    CommandFailed { command: String, code: Option<i32> },
    #[error("{message}: {}", packages.join(" "))]
    Dependency {
        message: String,
        packages: Vec<String>,
    },
    #[error("no package files were generated; the build may have failed or the PKGBUILD may not produce any packages")]
    NoPackages,
    #[error("invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },
    #[error("runner '{0}' is not available (expected 'system' or 'mock')")]
    RunnerUnavailable(String),
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_owned(),
    }
}
