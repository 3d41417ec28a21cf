//! Orchestration for pkgci package builds.
//!
//! [`Pipeline`] reads a [`Config`] and drives each CI stage: dependency
//! installation and package building through `pkgci-runtime`, artifact
//! collection into the output directory, and the dotenv version file consumed
//! by later CI jobs.

pub mod artifacts;
pub mod config;
pub mod pipeline;
pub mod version;

pub use artifacts::{
    ArtifactCollector, ArtifactKind, ArtifactOperation, CollectedArtifact, CollectionSummary,
};
pub use config::{ArtifactSettings, Config, DEFAULT_CONFIG_FILE};
pub use pipeline::{BuildReport, Pipeline, Stage};
pub use version::{CiEnv, VersionInfo, LOCAL_JOB_ID};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] pkgci_schema::ManifestError),
    #[error("runtime error: {0}")]
    Runtime(#[from] pkgci_runtime::RuntimeError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("no package files (*.pkg.tar.*) were found to collect into {}", output_dir.display())]
    NoPackagesCollected { output_dir: PathBuf },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
