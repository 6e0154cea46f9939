//! Validate command - check a manifest before converting it

use k8s2aca_core::{
    CoreError, ManifestDocument, ManifestSet, ManifestSummary, RECOGNIZED_KINDS, load_manifest_file,
};
use std::path::Path;

use crate::display;
use crate::error::{CliError, Result};

pub fn run(path: &Path, json_output: bool) -> Result<()> {
    let outcome = inspect(path);

    if !json_output {
        let summary = outcome?;
        display::print_summary(path, &summary);
        return Ok(());
    }

    let output = match &outcome {
        Ok(summary) => serde_json::json!({
            "valid": true,
            "message": "Valid Kubernetes manifest",
            "workloads": summary.workloads,
            "configMaps": summary.config_maps,
            "secrets": summary.secrets,
            "services": summary.services,
            "ingresses": summary.ingresses,
            "unsupported": summary.unsupported,
        }),
        Err(err) => serde_json::json!({
            "valid": false,
            "message": err.to_string(),
        }),
    };
    let rendered =
        serde_json::to_string_pretty(&output).map_err(|e| CliError::other(e.to_string()))?;
    println!("{}", rendered);

    if let Err(err) = outcome {
        std::process::exit(err.exit_code());
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<ManifestSummary> {
    let documents = load_manifest_file(path).map_err(|e| match e {
        CoreError::Parse { .. } => CliError::Parse {
            message: format!("Invalid YAML format: {}", e),
        },
        other => other.into(),
    })?;
    summarize(documents)
}

/// Classify the stream and reject ones with nothing Kubernetes in them
fn summarize(documents: Vec<ManifestDocument>) -> Result<ManifestSummary> {
    if documents.is_empty() {
        return Err(CliError::validation_with_help(
            "File is empty or contains no valid YAML documents",
            "Provide at least one Kubernetes object",
        ));
    }

    let set = ManifestSet::classify(documents)?;
    let summary = set.summary();
    if summary.recognized() == 0 {
        return Err(CliError::validation_with_help(
            "No valid Kubernetes resources found in the file",
            format!("Recognized kinds: {}", RECOGNIZED_KINDS.join(", ")),
        ));
    }

    Ok(summary)
}
