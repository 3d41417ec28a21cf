use super::{json_pretty, EXIT_SUCCESS};
use pkgci_core::Pipeline;

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_owned()
    } else {
        items.join(" ")
    }
}

pub fn run(pipeline: &Pipeline, json: bool) -> Result<u8, String> {
    let manifest = pipeline.load_manifest().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&manifest)?);
    } else {
        println!("name:          {}", manifest.name());
        println!("version:       {}", manifest.version());
        println!("release:       {}", manifest.release());
        println!("full_version:  {}", manifest.full_version());
        println!("arch:          {}", list(manifest.architectures()));
        println!("depends:       {}", list(manifest.runtime_deps()));
        println!("makedepends:   {}", list(manifest.build_deps()));
        println!("checkdepends:  {}", list(manifest.check_deps()));
    }
    Ok(EXIT_SUCCESS)
}
