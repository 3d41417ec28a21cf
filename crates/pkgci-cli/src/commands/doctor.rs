use super::{json_pretty, EXIT_FAILURE, EXIT_SUCCESS};
use console::Style;
use pkgci_core::{Pipeline, Stage};
use serde::Serialize;

pub fn run(pipeline: &Pipeline, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();

    let config = pipeline.config();
    checks.push(Check::info(
        "config",
        &format!(
            "Runner '{}', work dir {}",
            pipeline.runner().name(),
            config.work_dir.display()
        ),
    ));

    check_manifest(pipeline, &mut checks);
    check_tool(pipeline, "which", "Command lookup", &mut checks);
    check_stage(
        pipeline,
        Stage::Deps,
        "dependency_prereqs",
        "Dependency installation",
        &mut checks,
    );
    check_stage(
        pipeline,
        Stage::Build,
        "build_prereqs",
        "Package build",
        &mut checks,
    );
    if let Some(fallback) = &config.package_manager.fallback {
        if pipeline.runner().command_exists("sudo") {
            checks.push(Check::pass(
                "sudo",
                &format!("sudo available for {fallback} fallback"),
            ));
        } else {
            checks.push(Check::warn(
                "sudo",
                &format!("sudo not found; the {fallback} fallback cannot run"),
            ));
        }
    }

    let all_pass = checks.iter().all(|c| c.status != Status::Fail);
    print_results(&checks, all_pass, json_output)
}

fn check_manifest(pipeline: &Pipeline, checks: &mut Vec<Check>) {
    match pipeline.load_manifest() {
        Ok(m) => checks.push(Check::pass(
            "manifest",
            &format!("PKGBUILD parsed: {} {}", m.name(), m.full_version()),
        )),
        Err(e) => checks.push(Check::fail("manifest", &e.to_string())),
    }
}

fn check_tool(pipeline: &Pipeline, tool: &str, purpose: &str, checks: &mut Vec<Check>) {
    if pipeline.runner().command_exists(tool) {
        checks.push(Check::pass(tool, &format!("{purpose}: {tool} found")));
    } else {
        checks.push(Check::fail(tool, &format!("{purpose}: {tool} not found")));
    }
}

fn check_stage(
    pipeline: &Pipeline,
    stage: Stage,
    name: &str,
    label: &str,
    checks: &mut Vec<Check>,
) {
    let missing = pipeline.check_prereqs(stage);
    if missing.is_empty() {
        checks.push(Check::pass(name, &format!("{label} prerequisites satisfied")));
    } else {
        checks.push(Check::fail(
            name,
            &format!("{label}: {}", pkgci_runtime::format_missing(&missing)),
        ));
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks,
        });
        println!("{}", json_pretty(&json)?);
    } else {
        println!("{}\n", Style::new().bold().apply_to("pkgci doctor"));
        for check in checks {
            let icon = match check.status {
                Status::Pass => Style::new().green().apply_to("✓"),
                Status::Fail => Style::new().red().apply_to("✗"),
                Status::Warn => Style::new().yellow().apply_to("⚠"),
                Status::Info => Style::new().dim().apply_to("ℹ"),
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Pass,
    Fail,
    Warn,
    Info,
}

#[derive(Debug, Serialize)]
struct Check {
    name: String,
    status: Status,
    message: String,
}

impl Check {
    fn new(name: &str, status: Status, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status,
            message: message.to_owned(),
        }
    }

    fn pass(name: &str, message: &str) -> Self {
        Self::new(name, Status::Pass, message)
    }

    fn fail(name: &str, message: &str) -> Self {
        Self::new(name, Status::Fail, message)
    }

    fn warn(name: &str, message: &str) -> Self {
        Self::new(name, Status::Warn, message)
    }

    fn info(name: &str, message: &str) -> Self {
        Self::new(name, Status::Info, message)
    }
}
