use crate::config::ArtifactSettings;
use crate::CoreError;
use pkgci_runtime::find_matching;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SOURCE_FILES: [&str; 2] = ["PKGBUILD", ".SRCINFO"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactOperation {
    Copied,
    Moved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedArtifact {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub operation: ArtifactOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactKind {
    Package,
    Log,
    Source,
    Other,
}

impl ArtifactKind {
    pub fn of(file_name: &str) -> Self {
        if file_name.contains(".pkg.tar.") {
            Self::Package
        } else if file_name.ends_with(".log") {
            Self::Log
        } else if SOURCE_FILES.contains(&file_name) {
            Self::Source
        } else {
            Self::Other
        }
    }
}

impl CollectedArtifact {
    pub fn kind(&self) -> ArtifactKind {
        self.source
            .file_name()
            .map_or(ArtifactKind::Other, |n| ArtifactKind::of(&n.to_string_lossy()))
    }
}

/// Gathers build outputs from the work dir into the output dir.
pub struct ArtifactCollector<'a> {
    settings: &'a ArtifactSettings,
    work_dir: PathBuf,
    output_dir: PathBuf,
}

impl<'a> ArtifactCollector<'a> {
    pub fn new(
        settings: &'a ArtifactSettings,
        work_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            work_dir: work_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Collect every file matching the configured patterns.
    ///
    /// Fails with [`CoreError::NoPackagesCollected`] when none of the collected
    /// files is a package archive. Files already moved stay moved.
    pub fn collect(&self) -> Result<Vec<CollectedArtifact>, CoreError> {
        info!("collecting artifacts to {}", self.output_dir.display());
        fs::create_dir_all(&self.output_dir)?;

        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for pattern in &self.settings.patterns {
            let files = find_matching(&self.work_dir, pattern)?;
            debug!("pattern {pattern} matched {} file(s)", files.len());
            for file in files {
                if !seen.insert(file.clone()) {
                    continue;
                }
                collected.push(self.collect_file(&file)?);
            }
        }

        if !collected
            .iter()
            .any(|a| a.kind() == ArtifactKind::Package)
        {
            return Err(CoreError::NoPackagesCollected {
                output_dir: self.output_dir.clone(),
            });
        }
        info!("collected {} artifact(s)", collected.len());
        Ok(collected)
    }

    fn should_copy(&self, file_name: &str) -> bool {
        self.settings.preserve_sources && SOURCE_FILES.contains(&file_name)
    }

    fn collect_file(&self, source: &Path) -> Result<CollectedArtifact, CoreError> {
        let Some(file_name) = source.file_name() else {
            return Err(CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("no file name in {}", source.display()),
            )));
        };
        let destination = self.output_dir.join(file_name);

        let operation = if self.should_copy(&file_name.to_string_lossy()) {
            fs::copy(source, &destination)?;
            info!("  copied {} -> {}", source.display(), destination.display());
            ArtifactOperation::Copied
        } else {
            move_file(source, &destination)?;
            info!("  moved {} -> {}", source.display(), destination.display());
            ArtifactOperation::Moved
        };

        Ok(CollectedArtifact {
            source: source.to_path_buf(),
            destination,
            operation,
        })
    }
}

/// Rename, falling back to copy and remove when crossing filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Err(e) = fs::rename(from, to) {
        debug!("rename {} failed ({e}), copying instead", from.display());
        fs::copy(from, to)?;
        if let Err(e) = fs::remove_file(from) {
            warn!("copied {} but could not remove it: {e}", from.display());
            return Err(e);
        }
    }
    Ok(())
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub total: usize,
    pub packages: usize,
    pub logs: usize,
    pub sources: usize,
    pub others: usize,
    pub copied: usize,
    pub moved: usize,
}

impl CollectionSummary {
    pub fn from_artifacts(artifacts: &[CollectedArtifact]) -> Self {
        let mut summary = Self {
            total: artifacts.len(),
            ..Self::default()
        };
        for artifact in artifacts {
            match artifact.kind() {
                ArtifactKind::Package => summary.packages += 1,
                ArtifactKind::Log => summary.logs += 1,
                ArtifactKind::Source => summary.sources += 1,
                ArtifactKind::Other => summary.others += 1,
            }
            match artifact.operation {
                ArtifactOperation::Copied => summary.copied += 1,
                ArtifactOperation::Moved => summary.moved += 1,
            }
        }
        summary
    }
}

impl fmt::Display for CollectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} artifact(s): {} package(s), {} log(s), {} source file(s), {} other; {} copied, {} moved",
            self.total, self.packages, self.logs, self.sources, self.others, self.copied, self.moved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for f in files {
            fs::write(dir.path().join(f), f.as_bytes()).unwrap();
        }
        dir
    }

    #[test]
    fn collects_and_classifies() {
        let dir = setup(&[
            "demo-1.0-1-x86_64.pkg.tar.zst",
            "build.log",
            "PKGBUILD",
            ".SRCINFO",
            "notes.txt",
        ]);
        let settings = ArtifactSettings::default();
        let out = dir.path().join("artifacts");
        let collector = ArtifactCollector::new(&settings, dir.path(), &out);
        let artifacts = collector.collect().unwrap();

        assert_eq!(artifacts.len(), 4);
        assert!(out.join("demo-1.0-1-x86_64.pkg.tar.zst").is_file());
        assert!(!dir.path().join("demo-1.0-1-x86_64.pkg.tar.zst").exists());
        assert!(!dir.path().join("build.log").exists());
        // sources are copied, not moved
        assert!(dir.path().join("PKGBUILD").is_file());
        assert!(out.join("PKGBUILD").is_file());
        assert!(dir.path().join("notes.txt").is_file());

        let summary = CollectionSummary::from_artifacts(&artifacts);
        assert_eq!(
            summary,
            CollectionSummary {
                total: 4,
                packages: 1,
                logs: 1,
                sources: 2,
                others: 0,
                copied: 2,
                moved: 2,
            }
        );
    }

    #[test]
    fn sources_moved_without_preserve() {
        let dir = setup(&["x-1-1-any.pkg.tar.xz", "PKGBUILD"]);
        let settings = ArtifactSettings {
            preserve_sources: false,
            ..ArtifactSettings::default()
        };
        let out = dir.path().join("out");
        let artifacts = ArtifactCollector::new(&settings, dir.path(), &out)
            .collect()
            .unwrap();
        assert!(artifacts
            .iter()
            .all(|a| a.operation == ArtifactOperation::Moved));
        assert!(!dir.path().join("PKGBUILD").exists());
    }

    #[test]
    fn no_packages_is_error() {
        let dir = setup(&["build.log", "PKGBUILD"]);
        let settings = ArtifactSettings::default();
        let out = dir.path().join("artifacts");
        let err = ArtifactCollector::new(&settings, dir.path(), &out)
            .collect()
            .unwrap_err();
        assert!(matches!(err, CoreError::NoPackagesCollected { .. }));
        assert!(out.is_dir());
    }

    #[test]
    fn overlapping_patterns_collect_once() {
        let dir = setup(&["x-1-1-any.pkg.tar.zst", "PKGBUILD"]);
        let settings = ArtifactSettings {
            patterns: vec!["PKGBUILD".to_owned(), "*".to_owned(), "*.pkg.tar.*".to_owned()],
            ..ArtifactSettings::default()
        };
        let out = tempfile::tempdir().unwrap();
        let artifacts = ArtifactCollector::new(&settings, dir.path(), out.path())
            .collect()
            .unwrap();
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn kind_classification() {
        assert_eq!(ArtifactKind::of("a-1-1-any.pkg.tar.zst"), ArtifactKind::Package);
        assert_eq!(ArtifactKind::of("build.log"), ArtifactKind::Log);
        assert_eq!(ArtifactKind::of(".SRCINFO"), ArtifactKind::Source);
        assert_eq!(ArtifactKind::of("README"), ArtifactKind::Other);
    }

    #[test]
    fn summary_display() {
        let s = CollectionSummary {
            total: 3,
            packages: 1,
            logs: 1,
            sources: 1,
            others: 0,
            copied: 1,
            moved: 2,
        };
        assert_eq!(
            s.to_string(),
            "3 artifact(s): 1 package(s), 1 log(s), 1 source file(s), 0 other; 1 copied, 2 moved"
        );
    }
}
