use crate::backend::{CommandRunner, Invocation};
use crate::settings::BuildSettings;
use crate::RuntimeError;
use pkgci_schema::PackageManifest;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Glob matched against package archives produced by makepkg.
pub const PACKAGE_GLOB: &str = "*.pkg.tar.*";

/// Directories makepkg leaves behind in the build directory.
const BUILD_DIRS: [&str; 2] = ["src", "pkg"];

/// Find package archives directly inside `dir`, sorted by path.
pub fn find_packages(dir: &Path) -> Result<Vec<PathBuf>, RuntimeError> {
    find_matching(dir, PACKAGE_GLOB)
}

/// Files directly inside `dir` whose name matches `pattern`, sorted.
pub fn find_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, RuntimeError> {
    let full = format!(
        "{}/{pattern}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let paths = glob::glob(&full).map_err(|e| RuntimeError::Glob {
        pattern: full.clone(),
        message: e.to_string(),
    })?;

    let mut found = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => found.push(path),
            Ok(_) => {}
            Err(e) => warn!("error reading path for pattern {pattern}: {e}"),
        }
    }
    found.sort();
    Ok(found)
}

pub struct PackageBuilder<'a> {
    settings: &'a BuildSettings,
    work_dir: PathBuf,
    runner: &'a dyn CommandRunner,
}

impl<'a> PackageBuilder<'a> {
    pub fn new(
        settings: &'a BuildSettings,
        work_dir: impl Into<PathBuf>,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            settings,
            work_dir: work_dir.into(),
            runner,
        }
    }

    /// Remove package archives and makepkg's `src/` and `pkg/` from the work dir.
    /// Returns what was removed; anything already absent is skipped.
    pub fn clean(&self) -> Result<Vec<PathBuf>, RuntimeError> {
        info!("cleaning previous build artifacts");
        let mut removed = Vec::new();

        for path in find_packages(&self.work_dir)? {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!("removed package file {}", path.display());
                    removed.push(path);
                }
                Err(e) => warn!("failed to remove {}: {e}", path.display()),
            }
        }

        for dir in BUILD_DIRS {
            let path = self.work_dir.join(dir);
            if !path.exists() {
                continue;
            }
            std::fs::remove_dir_all(&path)?;
            debug!("removed directory {}", path.display());
            removed.push(path);
        }
        Ok(removed)
    }

    pub fn invocation(&self) -> Invocation {
        let mut inv = Invocation::new(self.settings.command.as_str())
            .args(self.settings.build_args.iter().cloned())
            .arg("./")
            .current_dir(&self.work_dir);
        if self.settings.sign {
            inv = inv.arg("--sign");
        }
        if self.settings.use_ccache {
            inv = inv.env(
                "CCACHE_DIR",
                self.settings.ccache_dir.to_string_lossy().into_owned(),
            );
        }
        inv
    }

    /// Build the package and return the archives it produced.
    pub fn build(&self, manifest: &PackageManifest) -> Result<Vec<PathBuf>, RuntimeError> {
        info!(
            "building package {} {}",
            manifest.name(),
            manifest.full_version()
        );

        self.runner.run(&self.invocation())?;

        let packages = find_packages(&self.work_dir)?;
        if packages.is_empty() {
            return Err(RuntimeError::NoPackages);
        }
        info!("build completed, generated {} package(s)", packages.len());

        let listing = Invocation::new("ls")
            .arg("-la")
            .args(packages.iter().map(|p| p.to_string_lossy().into_owned()));
        if let Err(e) = self.runner.run(&listing) {
            warn!("could not list package files: {e}");
        }
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;
    use pkgci_schema::parse_manifest_str;
    use std::fs;

    fn manifest() -> PackageManifest {
        parse_manifest_str("pkgname=demo\npkgver=1.0\npkgrel=1\n").unwrap()
    }

    #[test]
    fn invocation_matches_defaults() {
        let settings = BuildSettings::default();
        let runner = MockRunner::new();
        let builder = PackageBuilder::new(&settings, "/work", &runner);
        let inv = builder.invocation();
        assert_eq!(inv.program, "paru");
        assert_eq!(inv.args, ["-B", "--noconfirm", "./"]);
        assert_eq!(
            inv.env,
            vec![("CCACHE_DIR".to_owned(), "/home/builder/.ccache".to_owned())]
        );
        assert_eq!(inv.cwd.as_deref(), Some(Path::new("/work")));
    }

    #[test]
    fn invocation_with_sign_and_without_ccache() {
        let settings = BuildSettings {
            sign: true,
            use_ccache: false,
            ..BuildSettings::default()
        };
        let runner = MockRunner::new();
        let builder = PackageBuilder::new(&settings, "/work", &runner);
        let inv = builder.invocation();
        assert_eq!(inv.args.last().map(String::as_str), Some("--sign"));
        assert!(inv.env.is_empty());
    }

    #[test]
    fn build_returns_sorted_packages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("demo-1.0-1-x86_64.pkg.tar.zst"), b"b").unwrap();
        fs::write(dir.path().join("demo-debug-1.0-1-x86_64.pkg.tar.zst"), b"a").unwrap();
        fs::write(dir.path().join("build.log"), b"log").unwrap();

        let settings = BuildSettings::default();
        let runner = MockRunner::new();
        let builder = PackageBuilder::new(&settings, dir.path(), &runner);
        let packages = builder.build(&manifest()).unwrap();

        let names: Vec<_> = packages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "demo-1.0-1-x86_64.pkg.tar.zst",
                "demo-debug-1.0-1-x86_64.pkg.tar.zst"
            ]
        );
        let calls = runner.calls();
        assert_eq!(calls[0].program, "paru");
        assert_eq!(calls[1].program, "ls");
    }

    #[test]
    fn build_without_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = BuildSettings::default();
        let runner = MockRunner::new();
        let builder = PackageBuilder::new(&settings, dir.path(), &runner);
        assert!(matches!(
            builder.build(&manifest()),
            Err(RuntimeError::NoPackages)
        ));
    }

    #[test]
    fn failed_build_command_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let settings = BuildSettings::default();
        let runner = MockRunner::new().fail_program("paru");
        let builder = PackageBuilder::new(&settings, dir.path(), &runner);
        assert!(matches!(
            builder.build(&manifest()),
            Err(RuntimeError::CommandFailed { .. })
        ));
    }

    #[test]
    fn listing_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x-1-1-any.pkg.tar.xz"), b"x").unwrap();
        let settings = BuildSettings::default();
        let runner = MockRunner::new().fail_program("ls");
        let builder = PackageBuilder::new(&settings, dir.path(), &runner);
        assert_eq!(builder.build(&manifest()).unwrap().len(), 1);
    }

    #[test]
    fn clean_removes_packages_and_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x-1-1-any.pkg.tar.zst"), b"x").unwrap();
        fs::write(dir.path().join("PKGBUILD"), b"pkgname=x").unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();

        let settings = BuildSettings::default();
        let runner = MockRunner::new();
        let builder = PackageBuilder::new(&settings, dir.path(), &runner);
        let removed = builder.clean().unwrap();

        assert_eq!(removed.len(), 3);
        assert!(!dir.path().join("src").exists());
        assert!(!dir.path().join("pkg").exists());
        assert!(dir.path().join("PKGBUILD").exists());
    }

    #[test]
    fn clean_on_empty_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let settings = BuildSettings::default();
        let runner = MockRunner::new();
        let builder = PackageBuilder::new(&settings, dir.path(), &runner);
        assert!(builder.clean().unwrap().is_empty());
    }

    #[test]
    fn find_matching_escapes_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("odd[dir]");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a.log"), b"").unwrap();
        let found = find_matching(&dir, "*.log").unwrap();
        assert_eq!(found, vec![dir.join("a.log")]);
    }
}
