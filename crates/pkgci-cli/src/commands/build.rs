use super::{display_name, json_pretty, EXIT_SUCCESS};
use pkgci_core::Pipeline;

pub fn run(pipeline: &Pipeline, json: bool) -> Result<u8, String> {
    let report = pipeline.build().map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        if !report.cleaned.is_empty() {
            println!("cleaned {} path(s)", report.cleaned.len());
        }
        println!(
            "built {} {} ({} package(s))",
            report.manifest.name(),
            report.manifest.full_version(),
            report.packages.len()
        );
        for package in &report.packages {
            println!("  {}", display_name(package));
        }
    }
    Ok(EXIT_SUCCESS)
}
