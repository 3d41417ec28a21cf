use crate::backend::CommandRunner;
use crate::settings::{BuildSettings, PackageManagerSettings};
use std::fmt;

/// A missing prerequisite with actionable install instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPrereq {
    pub name: String,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

impl fmt::Display for MissingPrereq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  - {}: {} (install: {})",
            self.name, self.purpose, self.install_hint
        )
    }
}

fn hint_for(program: &str) -> &'static str {
    match program {
        "paru" => "build from the AUR: git clone https://aur.archlinux.org/paru-bin.git && makepkg -si",
        "yay" => "build from the AUR: git clone https://aur.archlinux.org/yay-bin.git && makepkg -si",
        "pacman" => "run on an Arch Linux based image",
        "sudo" => "pacman -S sudo",
        "makepkg" => "pacman -S pacman (makepkg ships with it)",
        "ccache" => "pacman -S ccache",
        _ => "install it with your package manager",
    }
}

fn require(
    runner: &dyn CommandRunner,
    program: &str,
    purpose: &'static str,
    missing: &mut Vec<MissingPrereq>,
) {
    if !runner.command_exists(program) {
        missing.push(MissingPrereq {
            name: program.to_owned(),
            purpose,
            install_hint: hint_for(program),
        });
    }
}

/// Tools needed to install dependencies.
///
/// The fallback manager and `sudo` only count when the primary manager is absent,
/// since they are never reached otherwise.
pub fn check_deps_prereqs(
    settings: &PackageManagerSettings,
    runner: &dyn CommandRunner,
) -> Vec<MissingPrereq> {
    let mut missing = Vec::new();
    if runner.command_exists(&settings.primary) {
        return missing;
    }
    match &settings.fallback {
        Some(fallback) => {
            require(runner, fallback, "fallback dependency installation", &mut missing);
            require(runner, "sudo", "running the fallback package manager", &mut missing);
            if !missing.is_empty() {
                require(
                    runner,
                    &settings.primary,
                    "dependency installation",
                    &mut missing,
                );
            }
        }
        None => require(
            runner,
            &settings.primary,
            "dependency installation",
            &mut missing,
        ),
    }
    missing
}

/// Tools needed to build the package.
pub fn check_build_prereqs(
    settings: &BuildSettings,
    runner: &dyn CommandRunner,
) -> Vec<MissingPrereq> {
    let mut missing = Vec::new();
    require(runner, &settings.command, "building the package", &mut missing);
    require(runner, "makepkg", "package assembly", &mut missing);
    if settings.use_ccache {
        require(runner, "ccache", "compiler caching", &mut missing);
    }
    missing
}

/// Format a list of missing prerequisites into a user-friendly error message.
pub fn format_missing(missing: &[MissingPrereq]) -> String {
    use std::fmt::Write as _;
    let mut msg = String::from("missing prerequisites:\n");
    for m in missing {
        let _ = writeln!(msg, "{m}");
    }
    msg.push_str("\npkgci needs these tools on the build host. Set PKGCI_SKIP_PREREQS=1 to bypass this check.");
    msg
}
