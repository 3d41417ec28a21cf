use crate::artifacts::{ArtifactCollector, CollectedArtifact};
use crate::config::Config;
use crate::version::{CiEnv, VersionInfo};
use crate::CoreError;
use chrono::{DateTime, Utc};
use pkgci_runtime::{
    check_build_prereqs, check_deps_prereqs, select_runner, CommandRunner, DependencyInstaller,
    InstallOutcome, MissingPrereq, PackageBuilder,
};
use pkgci_schema::{
    parse_manifest_file, parse_manifest_file_observed, PackageManifest, TracingObserver,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Stages that need host tools before they can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Deps,
    Build,
}

/// Result of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub manifest: PackageManifest,
    /// Paths removed by the pre-build clean; empty when cleaning was off.
    pub cleaned: Vec<PathBuf>,
    pub packages: Vec<PathBuf>,
}

/// Ties the manifest parser to the installer, builder, collector and version
/// emitter. Every stage reads the same [`Config`].
pub struct Pipeline {
    config: Config,
    runner: Arc<dyn CommandRunner>,
}

impl Pipeline {
    /// Validate `config` and pick the runner it names.
    pub fn new(config: Config) -> Result<Self, CoreError> {
        config.validate()?;
        let runner: Arc<dyn CommandRunner> = Arc::from(select_runner(&config.runner)?);
        Ok(Self { config, runner })
    }

    pub fn with_runner(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Parse the configured manifest, tracing every step when `debug` is set.
    pub fn load_manifest(&self) -> Result<PackageManifest, CoreError> {
        let path = self.config.manifest_path();
        info!("parsing {}", path.display());
        let manifest = if self.config.debug {
            parse_manifest_file_observed(&path, &mut TracingObserver::new())?
        } else {
            parse_manifest_file(&path)?
        };
        info!("package: {} {}", manifest.name(), manifest.full_version());
        Ok(manifest)
    }

    pub fn check_prereqs(&self, stage: Stage) -> Vec<MissingPrereq> {
        match stage {
            Stage::Deps => check_deps_prereqs(&self.config.package_manager, self.runner()),
            Stage::Build => check_build_prereqs(&self.config.build, self.runner()),
        }
    }

    pub fn install_dependencies(&self) -> Result<(PackageManifest, InstallOutcome), CoreError> {
        let manifest = self.load_manifest()?;
        let installer = DependencyInstaller::new(&self.config.package_manager, self.runner());
        let outcome = installer.install(&manifest)?;
        Ok((manifest, outcome))
    }

    pub fn build(&self) -> Result<BuildReport, CoreError> {
        let manifest = self.load_manifest()?;
        let builder = PackageBuilder::new(&self.config.build, &self.config.work_dir, self.runner());
        let cleaned = if self.config.build.clean {
            builder.clean()?
        } else {
            Vec::new()
        };
        let packages = builder.build(&manifest)?;
        Ok(BuildReport {
            manifest,
            cleaned,
            packages,
        })
    }

    /// Collect artifacts. Does not read the manifest.
    pub fn collect_artifacts(&self) -> Result<Vec<CollectedArtifact>, CoreError> {
        ArtifactCollector::new(
            &self.config.artifacts,
            &self.config.work_dir,
            self.config.output_dir(),
        )
        .collect()
    }

    /// Write the version file to `output`, or the configured location.
    /// A relative `output` is taken from the work dir.
    pub fn emit_version(
        &self,
        output: Option<&Path>,
        ci: &CiEnv,
        build_date: DateTime<Utc>,
    ) -> Result<(VersionInfo, PathBuf), CoreError> {
        let manifest = self.load_manifest()?;
        let info = VersionInfo::from_manifest(&manifest, ci, build_date);
        let path = output.map_or_else(|| self.config.version_file(), |p| self.config.resolve(p));
        info.write(&path)?;
        Ok((info, path))
    }
}
