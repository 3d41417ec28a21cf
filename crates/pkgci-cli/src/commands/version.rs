use super::{json_pretty, EXIT_SUCCESS};
use pkgci_core::{CiEnv, Pipeline};
use std::path::Path;

pub fn run(pipeline: &Pipeline, output: Option<&Path>, json: bool) -> Result<u8, String> {
    let (info, path) = pipeline
        .emit_version(output, &CiEnv::from_env(), chrono::Utc::now())
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "path": path,
            "version": info,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        print!("{}", info.to_env_file());
    }
    Ok(EXIT_SUCCESS)
}
