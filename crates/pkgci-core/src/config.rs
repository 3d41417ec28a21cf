use crate::CoreError;
use pkgci_runtime::{BuildSettings, PackageManagerSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the work dir when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "pkgci.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Trace the manifest parser through a [`pkgci_schema::TracingObserver`].
    pub debug: bool,
    /// Manifest path, relative to `work_dir` unless absolute.
    pub manifest: PathBuf,
    pub work_dir: PathBuf,
    /// `system` runs real commands, `mock` only records them.
    pub runner: String,
    pub package_manager: PackageManagerSettings,
    pub build: BuildSettings,
    pub artifacts: ArtifactSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            manifest: PathBuf::from("PKGBUILD"),
            work_dir: PathBuf::from("."),
            runner: "system".to_owned(),
            package_manager: PackageManagerSettings::default(),
            build: BuildSettings::default(),
            artifacts: ArtifactSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactSettings {
    pub output_dir: PathBuf,
    pub version_file: PathBuf,
    /// Glob patterns matched against file names in the work dir.
    pub patterns: Vec<String>,
    /// Copy `PKGBUILD` and `.SRCINFO` instead of moving them.
    pub preserve_sources: bool,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("artifacts"),
            version_file: PathBuf::from("version.env"),
            patterns: ["*.pkg.tar.*", "*.log", "PKGBUILD", ".SRCINFO"]
                .map(str::to_owned)
                .to_vec(),
            preserve_sources: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, CoreError> {
        let config: Self =
            toml::from_str(input).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CoreError::Config(msg) => CoreError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Load `explicit` if given, else `pkgci.toml` in `work_dir` if it exists,
    /// else the defaults. `work_dir` always wins over a value in the file.
    pub fn discover(work_dir: &Path, explicit: Option<&Path>) -> Result<Self, CoreError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let candidate = work_dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    debug!("using config file {}", candidate.display());
                    Self::load(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.work_dir = work_dir.to_path_buf();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.package_manager.primary.trim().is_empty() {
            return Err(CoreError::Config(
                "package_manager.primary must not be empty".to_owned(),
            ));
        }
        if self.build.command.trim().is_empty() {
            return Err(CoreError::Config("build.command must not be empty".to_owned()));
        }
        if self.artifacts.patterns.is_empty() {
            return Err(CoreError::Config(
                "artifacts.patterns must list at least one pattern".to_owned(),
            ));
        }
        if let Some(bad) = self
            .artifacts
            .patterns
            .iter()
            .find(|p| glob::Pattern::new(p).is_err() || p.contains('/'))
        {
            return Err(CoreError::Config(format!(
                "invalid artifact pattern '{bad}' (expected a file name glob)"
            )));
        }
        if !matches!(self.runner.as_str(), "system" | "mock") {
            return Err(CoreError::Config(format!(
                "unknown runner '{}', expected 'system' or 'mock'",
                self.runner
            )));
        }
        Ok(())
    }

    /// `path` unchanged if absolute, else joined onto the work dir.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.artifacts.output_dir)
    }

    pub fn version_file(&self) -> PathBuf {
        self.resolve(&self.artifacts.version_file)
    }
}
