use super::{display_name, json_pretty, spin_fail, spin_ok, spinner, EXIT_SUCCESS};
use pkgci_core::{ArtifactOperation, CollectionSummary, Pipeline};

pub fn run(pipeline: &Pipeline, json: bool) -> Result<u8, String> {
    let pb = if json {
        None
    } else {
        Some(spinner("collecting artifacts..."))
    };

    let artifacts = match pipeline.collect_artifacts() {
        Ok(a) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "artifacts collected");
            }
            a
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "artifact collection failed");
            }
            return Err(e.to_string());
        }
    };
    let summary = CollectionSummary::from_artifacts(&artifacts);

    if json {
        let payload = serde_json::json!({
            "output_dir": pipeline.config().output_dir(),
            "artifacts": artifacts,
            "summary": summary,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!("{}", pipeline.config().output_dir().display());
        for artifact in &artifacts {
            let verb = match artifact.operation {
                ArtifactOperation::Copied => "copied",
                ArtifactOperation::Moved => "moved ",
            };
            println!("  {verb} {}", display_name(&artifact.destination));
        }
        println!("{summary}");
    }
    Ok(EXIT_SUCCESS)
}
