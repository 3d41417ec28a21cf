use crate::observer::{NoopObserver, ParseObserver};
use crate::parser::ManifestParser;
use crate::types::{ArrayField, ScalarField};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on the size of a manifest file.
pub const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error(
        "manifest incomplete: missing required variables (found pkgname='{name}', \
         pkgver='{version}', pkgrel='{release}')"
    )]
    Incomplete {
        name: String,
        version: String,
        release: String,
    },
    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Package metadata extracted from a PKGBUILD.
///
/// Only the parser constructs this type, and only when `name`, `version` and
/// `release` are all non-empty. Array fields hold every assignment to their
/// identifier concatenated in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    name: String,
    version: String,
    release: String,
    architectures: Vec<String>,
    runtime_deps: Vec<String>,
    build_deps: Vec<String>,
    check_deps: Vec<String>,
}

impl PackageManifest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn architectures(&self) -> &[String] {
        &self.architectures
    }

    pub fn runtime_deps(&self) -> &[String] {
        &self.runtime_deps
    }

    pub fn build_deps(&self) -> &[String] {
        &self.build_deps
    }

    pub fn check_deps(&self) -> &[String] {
        &self.check_deps
    }

    /// `version-release`, as used in package file names.
    pub fn full_version(&self) -> String {
        format!("{}-{}", self.version, self.release)
    }

    /// Runtime, build and check dependencies, in that order.
    pub fn all_dependencies(&self) -> Vec<String> {
        self.runtime_deps
            .iter()
            .chain(&self.build_deps)
            .chain(&self.check_deps)
            .cloned()
            .collect()
    }

    pub fn has_dependencies(&self) -> bool {
        !self.runtime_deps.is_empty() || !self.build_deps.is_empty() || !self.check_deps.is_empty()
    }
}

/// Mutable state the parser fills in before the validity check.
#[derive(Debug, Default)]
pub(crate) struct ManifestBuilder {
    name: String,
    version: String,
    release: String,
    architectures: Vec<String>,
    runtime_deps: Vec<String>,
    build_deps: Vec<String>,
    check_deps: Vec<String>,
}

impl ManifestBuilder {
    /// Set a scalar if it is still unset. Returns whether the value was taken.
    pub(crate) fn set_scalar(&mut self, field: ScalarField, value: &str) -> bool {
        let slot = match field {
            ScalarField::Name => &mut self.name,
            ScalarField::Version => &mut self.version,
            ScalarField::Release => &mut self.release,
        };
        if !slot.is_empty() || value.is_empty() {
            return false;
        }
        value.clone_into(slot);
        true
    }

    pub(crate) fn append(&mut self, field: ArrayField, tokens: Vec<String>) {
        let slot = match field {
            ArrayField::Architectures => &mut self.architectures,
            ArrayField::RuntimeDeps => &mut self.runtime_deps,
            ArrayField::BuildDeps => &mut self.build_deps,
            ArrayField::CheckDeps => &mut self.check_deps,
        };
        slot.extend(tokens);
    }

    pub(crate) fn scalars(&self) -> (&str, &str, &str) {
        (&self.name, &self.version, &self.release)
    }

    pub(crate) fn finish(self) -> Result<PackageManifest, ManifestError> {
        if self.name.is_empty() || self.version.is_empty() || self.release.is_empty() {
            return Err(ManifestError::Incomplete {
                name: self.name,
                version: self.version,
                release: self.release,
            });
        }
        Ok(PackageManifest {
            name: self.name,
            version: self.version,
            release: self.release,
            architectures: self.architectures,
            runtime_deps: self.runtime_deps,
            build_deps: self.build_deps,
            check_deps: self.check_deps,
        })
    }
}

pub fn parse_manifest_str(input: &str) -> Result<PackageManifest, ManifestError> {
    parse_manifest_str_observed(input, &mut NoopObserver)
}

pub fn parse_manifest_str_observed(
    input: &str,
    observer: &mut dyn ParseObserver,
) -> Result<PackageManifest, ManifestError> {
    ManifestParser::with_observer(observer).parse(input)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<PackageManifest, ManifestError> {
    parse_manifest_file_observed(path, &mut NoopObserver)
}

pub fn parse_manifest_file_observed(
    path: impl AsRef<Path>,
    observer: &mut dyn ParseObserver,
) -> Result<PackageManifest, ManifestError> {
    let content = read_manifest(path.as_ref())?;
    parse_manifest_str_observed(&content, observer)
}

/// Read a manifest into memory, refusing anything over [`MAX_MANIFEST_BYTES`].
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    let io_err = |source: io::Error| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    };

    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(io_err(e)),
    };
    if !meta.is_file() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(io_err)?;
    let mut content = String::new();
    file.take(MAX_MANIFEST_BYTES + 1)
        .read_to_string(&mut content)
        .map_err(io_err)?;
    if content.len() as u64 > MAX_MANIFEST_BYTES {
        return Err(io_err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("manifest exceeds {MAX_MANIFEST_BYTES} bytes"),
        )));
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "pkgname=foo\npkgver=1.2.3\npkgrel=2\ndepends=(bash 'coreutils' \"glibc\")\n";

    #[test]
    fn parses_basic_manifest() {
        let m = parse_manifest_str(BASIC).unwrap();
        assert_eq!(m.name(), "foo");
        assert_eq!(m.version(), "1.2.3");
        assert_eq!(m.release(), "2");
        assert_eq!(m.runtime_deps(), ["bash", "coreutils", "glibc"]);
        assert!(m.architectures().is_empty());
        assert!(m.build_deps().is_empty());
        assert!(m.check_deps().is_empty());
    }

    #[test]
    fn full_version_joins_version_and_release() {
        let m = parse_manifest_str(BASIC).unwrap();
        assert_eq!(m.full_version(), "1.2.3-2");
    }

    #[test]
    fn all_dependencies_keeps_class_order() {
        let m = parse_manifest_str(
            "pkgname=a\npkgver=1\npkgrel=1\n\
             checkdepends=(check1)\nmakedepends=(make1)\ndepends=(run1 run2)\n",
        )
        .unwrap();
        assert_eq!(m.all_dependencies(), vec!["run1", "run2", "make1", "check1"]);
        assert!(m.has_dependencies());
    }

    #[test]
    fn no_dependencies_is_valid() {
        let m = parse_manifest_str("pkgname=a\npkgver=1\npkgrel=1\n").unwrap();
        assert!(!m.has_dependencies());
        assert!(m.all_dependencies().is_empty());
    }

    #[test]
    fn incomplete_reports_partial_values() {
        let err = parse_manifest_str("pkgname=foo\npkgver=1.0\n").unwrap_err();
        match err {
            ManifestError::Incomplete {
                name,
                version,
                release,
            } => {
                assert_eq!(name, "foo");
                assert_eq!(version, "1.0");
                assert_eq!(release, "");
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_message_lists_found_values() {
        let err = parse_manifest_str("pkgver=3\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("manifest incomplete"));
        assert!(msg.contains("pkgver='3'"));
        assert!(msg.contains("pkgname=''"));
    }

    #[test]
    fn file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_manifest_file(dir.path().join("PKGBUILD")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_manifest_file(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn parses_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PKGBUILD");
        std::fs::write(&path, BASIC).unwrap();
        let m = parse_manifest_file(&path).unwrap();
        assert_eq!(m.name(), "foo");
    }

    #[test]
    fn oversized_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PKGBUILD");
        let mut content = String::from(BASIC);
        content.push_str(&"#".repeat(MAX_MANIFEST_BYTES as usize));
        std::fs::write(&path, content).unwrap();
        let err = parse_manifest_file(&path).unwrap_err();
        match err {
            ManifestError::Io { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn file_at_size_limit_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PKGBUILD");
        let mut content = String::from(BASIC);
        let padding = MAX_MANIFEST_BYTES as usize - content.len();
        content.push_str(&"#".repeat(padding));
        std::fs::write(&path, &content).unwrap();
        assert_eq!(content.len() as u64, MAX_MANIFEST_BYTES);
        assert!(parse_manifest_file(&path).is_ok());
    }

    #[test]
    fn serializes_all_fields() {
        let m = parse_manifest_str(BASIC).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["name"], "foo");
        assert_eq!(json["runtime_deps"][2], "glibc");
        assert!(json["architectures"].as_array().unwrap().is_empty());
    }
}
