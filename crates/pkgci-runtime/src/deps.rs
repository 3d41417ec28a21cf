use crate::backend::{CommandRunner, Invocation};
use crate::settings::PackageManagerSettings;
use crate::RuntimeError;
use pkgci_schema::PackageManifest;
use tracing::{info, warn};

/// Apply the Rust toolchain rewrite to a dependency list.
///
/// `rust` and `rustup` are removed. If either was present, `rustup` is
/// appended unless it is already installed, in which case `cargo` is removed
/// as well since rustup provides it. `rustup_present` is only consulted when
/// one of the two was listed. Relative order of other entries is kept.
pub fn resolve_install_set(
    deps: Vec<String>,
    rustup_present: impl FnOnce() -> bool,
) -> Vec<String> {
    let mut wants_rust = false;
    let mut filtered: Vec<String> = Vec::with_capacity(deps.len());
    for dep in deps {
        match dep.as_str() {
            "rust" | "rustup" => wants_rust = true,
            _ => filtered.push(dep),
        }
    }

    if wants_rust {
        if rustup_present() {
            info!("rustup is already available, skipping rust package");
            filtered.retain(|dep| dep != "cargo");
        } else {
            info!("installing rustup for the Rust toolchain");
            filtered.push("rustup".to_owned());
        }
    }
    filtered
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The manifest declares no dependencies.
    NothingDeclared,
    /// Every declared dependency was rewritten away.
    AlreadySatisfied,
    Installed { manager: String, packages: Vec<String> },
}

pub struct DependencyInstaller<'a> {
    settings: &'a PackageManagerSettings,
    runner: &'a dyn CommandRunner,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(settings: &'a PackageManagerSettings, runner: &'a dyn CommandRunner) -> Self {
        Self { settings, runner }
    }

    /// The package list that [`install`](Self::install) would hand to the package manager.
    pub fn plan(&self, manifest: &PackageManifest) -> Vec<String> {
        let deps = manifest.all_dependencies();
        if self.settings.handle_rust_conflict {
            resolve_install_set(deps, || self.runner.command_exists("rustup"))
        } else {
            deps
        }
    }

    pub fn install(&self, manifest: &PackageManifest) -> Result<InstallOutcome, RuntimeError> {
        if !manifest.has_dependencies() {
            info!("no dependencies found in PKGBUILD");
            return Ok(InstallOutcome::NothingDeclared);
        }
        info!("found dependencies: {:?}", manifest.all_dependencies());

        let packages = self.plan(manifest);
        if packages.is_empty() {
            info!("all dependencies are already satisfied");
            return Ok(InstallOutcome::AlreadySatisfied);
        }

        let manager = self.install_packages(&packages)?;
        Ok(InstallOutcome::Installed { manager, packages })
    }

    fn install_packages(&self, packages: &[String]) -> Result<String, RuntimeError> {
        let primary = &self.settings.primary;
        let invocation = Invocation::new(primary.as_str())
            .args(self.settings.install_args.iter().cloned())
            .args(packages.iter().cloned());

        info!("installing packages with {primary}: {packages:?}");
        let primary_err = match self.runner.run(&invocation) {
            Ok(()) => return Ok(primary.clone()),
            Err(e) => e,
        };
        warn!("primary package manager {primary} failed: {primary_err}");

        let Some(fallback) = &self.settings.fallback else {
            return Err(RuntimeError::Dependency {
                message: format!("failed to install dependencies with {primary}"),
                packages: packages.to_vec(),
            });
        };

        info!("trying fallback package manager: sudo {fallback}");
        let invocation = Invocation::new("sudo")
            .arg(fallback.as_str())
            .args(self.settings.install_args.iter().cloned())
            .args(packages.iter().cloned());
        match self.runner.run(&invocation) {
            Ok(()) => Ok(fallback.clone()),
            Err(e) => {
                warn!("fallback installation failed: {e}");
                Err(RuntimeError::Dependency {
                    message: "all package managers failed to install dependencies".to_owned(),
                    packages: packages.to_vec(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRunner;
    use pkgci_schema::parse_manifest_str;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn manifest(body: &str) -> PackageManifest {
        parse_manifest_str(&format!("pkgname=t\npkgver=1\npkgrel=1\n{body}")).unwrap()
    }

    #[test]
    fn rust_without_rustup_installs_rustup() {
        let out = resolve_install_set(strings(&["rust", "cmake"]), || false);
        assert_eq!(out, ["cmake", "rustup"]);
    }

    #[test]
    fn rust_with_rustup_drops_cargo() {
        let out = resolve_install_set(strings(&["rust", "cargo", "cmake"]), || true);
        assert_eq!(out, ["cmake"]);
    }

    #[test]
    fn rustup_entry_is_treated_like_rust() {
        let out = resolve_install_set(strings(&["rustup", "rust", "git"]), || false);
        assert_eq!(out, ["git", "rustup"]);
    }

    #[test]
    fn cargo_is_kept_without_rust_entries() {
        let probed = std::cell::Cell::new(false);
        let out = resolve_install_set(strings(&["cargo", "git"]), || {
            probed.set(true);
            true
        });
        assert_eq!(out, ["cargo", "git"]);
        assert!(!probed.get(), "rustup should only be probed when rust is listed");
    }

    #[test]
    fn nothing_declared() {
        let settings = PackageManagerSettings::default();
        let runner = MockRunner::new();
        let installer = DependencyInstaller::new(&settings, &runner);
        let outcome = installer.install(&manifest("")).unwrap();
        assert_eq!(outcome, InstallOutcome::NothingDeclared);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn already_satisfied_when_only_rust_and_rustup_present() {
        let settings = PackageManagerSettings::default();
        let runner = MockRunner::new().with_command("rustup");
        let installer = DependencyInstaller::new(&settings, &runner);
        let outcome = installer.install(&manifest("makedepends=(rust cargo)")).unwrap();
        assert_eq!(outcome, InstallOutcome::AlreadySatisfied);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn installs_with_primary_manager() {
        let settings = PackageManagerSettings::default();
        let runner = MockRunner::new();
        let installer = DependencyInstaller::new(&settings, &runner);
        let outcome = installer
            .install(&manifest("depends=(glibc)\nmakedepends=(rust cmake)"))
            .unwrap();
        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                manager: "paru".to_owned(),
                packages: strings(&["glibc", "cmake", "rustup"]),
            }
        );
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "paru");
        assert_eq!(
            calls[0].args,
            strings(&["-S", "--noconfirm", "--needed", "--asdeps", "glibc", "cmake", "rustup"])
        );
    }

    #[test]
    fn falls_back_to_sudo_pacman() {
        let settings = PackageManagerSettings::default();
        let runner = MockRunner::new().fail_program("paru");
        let installer = DependencyInstaller::new(&settings, &runner);
        let outcome = installer.install(&manifest("depends=(zlib)")).unwrap();
        assert_eq!(
            outcome,
            InstallOutcome::Installed {
                manager: "pacman".to_owned(),
                packages: strings(&["zlib"]),
            }
        );
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].program, "sudo");
        assert_eq!(calls[1].args[0], "pacman");
        assert_eq!(calls[1].args.last().map(String::as_str), Some("zlib"));
    }

    #[test]
    fn both_managers_failing_is_dependency_error() {
        let settings = PackageManagerSettings::default();
        let runner = MockRunner::new().fail_program("paru").fail_program("sudo");
        let installer = DependencyInstaller::new(&settings, &runner);
        let err = installer.install(&manifest("depends=(zlib)")).unwrap_err();
        match err {
            RuntimeError::Dependency { packages, .. } => assert_eq!(packages, ["zlib"]),
            other => panic!("expected Dependency, got {other:?}"),
        }
    }

    #[test]
    fn no_fallback_configured() {
        let settings = PackageManagerSettings {
            fallback: None,
            ..PackageManagerSettings::default()
        };
        let runner = MockRunner::new().fail_program("paru");
        let installer = DependencyInstaller::new(&settings, &runner);
        assert!(installer.install(&manifest("depends=(zlib)")).is_err());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn rewrite_can_be_disabled() {
        let settings = PackageManagerSettings {
            handle_rust_conflict: false,
            ..PackageManagerSettings::default()
        };
        let runner = MockRunner::new();
        let installer = DependencyInstaller::new(&settings, &runner);
        assert_eq!(
            installer.plan(&manifest("makedepends=(rust cargo)")),
            ["rust", "cargo"]
        );
    }
}
