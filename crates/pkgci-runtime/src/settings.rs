use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How dependencies are installed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageManagerSettings {
    /// Tried first, run as the current user (an AUR helper such as `paru`).
    pub primary: String,
    /// Run through `sudo` when the primary manager fails.
    pub fallback: Option<String>,
    /// Arguments placed before the package list for both managers.
    pub install_args: Vec<String>,
    /// Replace `rust` with `rustup` (or drop it when `rustup` is installed).
    pub handle_rust_conflict: bool,
}

impl Default for PackageManagerSettings {
    fn default() -> Self {
        Self {
            primary: "paru".to_owned(),
            fallback: Some("pacman".to_owned()),
            install_args: ["-S", "--noconfirm", "--needed", "--asdeps"]
                .map(str::to_owned)
                .to_vec(),
            handle_rust_conflict: true,
        }
    }
}

/// How the package itself is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    pub command: String,
    pub build_args: Vec<String>,
    pub clean: bool,
    pub sign: bool,
    pub use_ccache: bool,
    pub ccache_dir: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            command: "paru".to_owned(),
            build_args: ["-B", "--noconfirm"].map(str::to_owned).to_vec(),
            clean: false,
            sign: false,
            use_ccache: true,
            ccache_dir: PathBuf::from("/home/builder/.ccache"),
        }
    }
}
