use crate::CoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use pkgci_schema::PackageManifest;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

/// Job id used when the build does not run under CI.
pub const LOCAL_JOB_ID: &str = "local";

/// CI variables that feed into the version file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnv {
    pub commit_tag: Option<String>,
    pub job_id: Option<String>,
}

impl CiEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            commit_tag: get("CI_COMMIT_TAG"),
            job_id: get("CI_JOB_ID"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub pkg_release: String,
    pub full_version: String,
    pub package_name: String,
    pub tag_version: String,
    pub build_job_id: String,
    pub build_date: String,
    pub arch: Vec<String>,
}

impl VersionInfo {
    pub fn from_manifest(
        manifest: &PackageManifest,
        ci: &CiEnv,
        build_date: DateTime<Utc>,
    ) -> Self {
        Self {
            version: manifest.version().to_owned(),
            pkg_release: manifest.release().to_owned(),
            full_version: manifest.full_version(),
            package_name: manifest.name().to_owned(),
            tag_version: ci
                .commit_tag
                .clone()
                .unwrap_or_else(|| manifest.version().to_owned()),
            build_job_id: ci.job_id.clone().unwrap_or_else(|| LOCAL_JOB_ID.to_owned()),
            build_date: build_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            arch: manifest.architectures().to_vec(),
        }
    }

    /// Render as a dotenv file consumable by later CI stages.
    pub fn to_env_file(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "VERSION={}", self.version);
        let _ = writeln!(out, "PKG_RELEASE={}", self.pkg_release);
        let _ = writeln!(out, "FULL_VERSION={}", self.full_version);
        let _ = writeln!(out, "PACKAGE_NAME={}", self.package_name);
        let _ = writeln!(out, "TAG_VERSION={}", self.tag_version);
        let _ = writeln!(out, "BUILD_JOB_ID={}", self.build_job_id);
        let _ = writeln!(out, "BUILD_DATE={}", self.build_date);
        let _ = writeln!(out, "ARCH=\"{}\"", self.arch.join(" "));
        out
    }

    /// Parse a file produced by [`to_env_file`](Self::to_env_file).
    ///
    /// Blank lines and `#` comments are skipped, values lose surrounding quotes,
    /// and missing keys fall back to empty strings (`local` for the job id).
    pub fn parse_env_file(content: &str) -> Self {
        let mut vars: HashMap<&str, &str> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                vars.insert(key.trim(), value.trim().trim_matches('"'));
            }
        }

        let get = |key: &str| vars.get(key).map(|v| (*v).to_owned()).unwrap_or_default();
        let version = get("VERSION");
        let pkg_release = get("PKG_RELEASE");
        let full_version = vars
            .get("FULL_VERSION")
            .map_or_else(|| format!("{version}-{pkg_release}"), |v| (*v).to_owned());
        let tag_version = vars
            .get("TAG_VERSION")
            .map_or_else(|| version.clone(), |v| (*v).to_owned());
        let build_job_id = vars
            .get("BUILD_JOB_ID")
            .map_or_else(|| LOCAL_JOB_ID.to_owned(), |v| (*v).to_owned());

        Self {
            full_version,
            package_name: get("PACKAGE_NAME"),
            tag_version,
            build_job_id,
            build_date: get("BUILD_DATE"),
            arch: get("ARCH").split_whitespace().map(str::to_owned).collect(),
            version,
            pkg_release,
        }
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        debug!("loading version information from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse_env_file(&content))
    }

    pub fn write(&self, path: &Path) -> Result<(), CoreError> {
        info!("writing version information to {}", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_env_file())?;
        Ok(())
    }
}
