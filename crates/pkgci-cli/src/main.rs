mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_MANIFEST_ERROR, EXIT_PROCESS_ERROR};
use pkgci_core::{Config, Pipeline, Stage};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "pkgci",
    version,
    about = "Build Arch Linux packages from a PKGBUILD in CI"
)]
struct Cli {
    /// Path to the PKGBUILD (relative to the work dir).
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Directory holding the PKGBUILD and receiving build output.
    #[arg(long, default_value = ".", global = true)]
    work_dir: PathBuf,

    /// TOML configuration file (defaults to pkgci.toml in the work dir, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Log progress of each step.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --debug).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    /// Trace the PKGBUILD parser and log at debug level.
    #[arg(long, default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install the dependencies declared in the PKGBUILD.
    Deps,
    /// Build the package.
    Build {
        /// Remove previous packages and makepkg's src/ and pkg/ first.
        #[arg(long, default_value_t = false)]
        clean: bool,
        /// Sign the built packages.
        #[arg(long, default_value_t = false)]
        sign: bool,
    },
    /// Collect packages, logs and sources into the output directory.
    Artifacts {
        /// Output directory (overrides the config file).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the dotenv version file for later CI stages.
    Version {
        /// Output file (overrides the config file).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the package metadata extracted from the PKGBUILD.
    Inspect,
    /// Check that the host has the tools needed to install and build.
    Doctor,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PKGCI_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let result = run(&cli);
    finish(result)
}

fn run(cli: &Cli) -> Result<u8, String> {
    let pipeline = || -> Result<Pipeline, String> {
        let config = load_config(cli)?;
        Pipeline::new(config).map_err(|e| e.to_string())
    };
    let json = cli.json;

    match &cli.command {
        Commands::Deps => {
            let p = pipeline()?;
            require_prereqs(&p, Stage::Deps)?;
            commands::deps::run(&p, json)
        }
        Commands::Build { .. } => {
            let p = pipeline()?;
            require_prereqs(&p, Stage::Build)?;
            commands::build::run(&p, json)
        }
        Commands::Artifacts { .. } => commands::artifacts::run(&pipeline()?, json),
        Commands::Version { output } => {
            commands::version::run(&pipeline()?, output.as_deref(), json)
        }
        Commands::Inspect => commands::inspect::run(&pipeline()?, json),
        Commands::Doctor => commands::doctor::run(&pipeline()?, json),
        Commands::Completions { shell } => commands::completions::run::<Cli>(*shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(dir),
    }
}

fn require_prereqs(pipeline: &Pipeline, stage: Stage) -> Result<(), String> {
    if std::env::var("PKGCI_SKIP_PREREQS").as_deref() == Ok("1") {
        return Ok(());
    }
    let missing = pipeline.check_prereqs(stage);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(pkgci_runtime::format_missing(&missing))
    }
}

/// Layer the CLI flags over the configuration file.
fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config =
        Config::discover(&cli.work_dir, cli.config.as_deref()).map_err(|e| e.to_string())?;
    if let Some(manifest) = &cli.manifest {
        config.manifest.clone_from(manifest);
    }
    if cli.debug {
        config.debug = true;
    }
    debug!(
        "work dir {}, manifest {}, runner {}",
        config.work_dir.display(),
        config.manifest_path().display(),
        config.runner
    );
    match &cli.command {
        Commands::Build { clean, sign } => {
            config.build.clean |= *clean;
            config.build.sign |= *sign;
        }
        Commands::Artifacts {
            output: Some(output),
        } => config.artifacts.output_dir.clone_from(output),
        _ => {}
    }
    Ok(config)
}

fn finish(result: Result<u8, String>) -> ExitCode {
    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("manifest error:") {
        EXIT_MANIFEST_ERROR
    } else if msg.starts_with("runtime error:") {
        EXIT_PROCESS_ERROR
    } else {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_mapping() {
        assert_eq!(
            exit_code_for("manifest error: manifest not found: PKGBUILD"),
            EXIT_MANIFEST_ERROR
        );
        assert_eq!(
            exit_code_for("runtime error: command failed (exit code 1): paru -B"),
            EXIT_PROCESS_ERROR
        );
        assert_eq!(exit_code_for("configuration error: bad"), EXIT_FAILURE);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "pkgci",
            "--work-dir",
            dir.path().to_str().unwrap(),
            "--manifest",
            "pkg/PKGBUILD",
            "--debug",
            "build",
            "--clean",
            "--sign",
        ]);
        let config = load_config(&cli).unwrap();
        assert!(config.debug);
        assert!(config.build.clean);
        assert!(config.build.sign);
        assert_eq!(config.manifest_path(), dir.path().join("pkg/PKGBUILD"));
    }

    #[test]
    fn artifacts_output_override() {
        let cli = Cli::parse_from(["pkgci", "--work-dir", "/w", "artifacts", "-o", "dist"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("/w/dist"));
    }
}
