use super::{json_pretty, EXIT_SUCCESS};
use pkgci_core::Pipeline;
use pkgci_runtime::InstallOutcome;

pub fn run(pipeline: &Pipeline, json: bool) -> Result<u8, String> {
    let (manifest, outcome) = pipeline.install_dependencies().map_err(|e| e.to_string())?;

    if json {
        let (status, manager, packages) = match &outcome {
            InstallOutcome::NothingDeclared => ("nothing_declared", None, Vec::new()),
            InstallOutcome::AlreadySatisfied => ("already_satisfied", None, Vec::new()),
            InstallOutcome::Installed { manager, packages } => {
                ("installed", Some(manager.as_str()), packages.clone())
            }
        };
        let payload = serde_json::json!({
            "package": manifest.name(),
            "declared": manifest.all_dependencies(),
            "status": status,
            "manager": manager,
            "installed": packages,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        match outcome {
            InstallOutcome::NothingDeclared => println!("no dependencies declared"),
            InstallOutcome::AlreadySatisfied => println!("all dependencies already satisfied"),
            InstallOutcome::Installed { manager, packages } => {
                println!("installed {} package(s) with {manager}", packages.len());
                println!("  {}", packages.join(" "));
            }
        }
    }
    Ok(EXIT_SUCCESS)
}
