//! Convert command - Kubernetes manifests to ACA templates
//!
//! Each workload of the input writes two files: the ACA template and its
//! migration report.

use k8s2aca_convert::{ConvertOptions, WorkloadConversion, convert_with_options};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::display;
use crate::error::{CliError, Result};
use crate::resolver::{self, GpuChoice, VolumeStrategy};

/// Arguments of `k8s2aca convert`
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub json: bool,
    pub non_interactive: bool,
    pub gpu_sku: Option<GpuChoice>,
    pub volume_strategy: Option<VolumeStrategy>,
    pub report_unsupported_once: bool,
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    let input = fs::read(&args.input).map_err(|e| CliError::io_at(&args.input, e))?;

    let preferences = resolver::preferences(args.gpu_sku, args.volume_strategy);
    let mut resolver = resolver::build(args.non_interactive, preferences);
    let options = ConvertOptions {
        report_unsupported_once: args.report_unsupported_once,
    };
    let result = convert_with_options(&input, resolver.as_mut(), options)?;

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).map_err(|e| CliError::io_at(dir, e))?;
    }

    let workloads: Vec<(&str, &str)> = result
        .workloads
        .iter()
        .map(|w| (w.app_name(), w.kind.as_str()))
        .collect();
    let paths = output_paths(args.output.as_deref(), args.output_dir.as_deref(), &workloads);
    let mut json_items = Vec::new();

    for (workload, (template_path, report_path)) in result.workloads.iter().zip(&paths) {
        let yaml = workload.template.to_yaml()?;
        fs::write(template_path, &yaml).map_err(|e| CliError::io_at(template_path, e))?;
        fs::write(report_path, workload.report.to_string())
            .map_err(|e| CliError::io_at(report_path, e))?;
        tracing::debug!(
            template = %template_path.display(),
            report = %report_path.display(),
            "wrote workload artifacts"
        );

        if args.json {
            json_items.push(json_item(workload)?);
        } else {
            display::print_workload(workload, template_path, report_path);
        }
    }

    if args.json {
        let output = serde_json::to_string_pretty(&json_items)
            .map_err(|e| CliError::other(e.to_string()))?;
        println!("{}", output);
    }

    Ok(())
}

fn json_item(workload: &WorkloadConversion) -> Result<serde_json::Value> {
    let template =
        serde_json::to_value(&workload.template).map_err(|e| CliError::other(e.to_string()))?;
    let report: Vec<String> = workload
        .report
        .entries()
        .iter()
        .map(|e| e.to_string())
        .collect();

    Ok(serde_json::json!({
        "workload": workload.app_name(),
        "kind": workload.kind.as_str(),
        "aca_template": template,
        "migration_report": report,
        "success": true,
    }))
}

/// Template and report path for each `(name, kind)` workload
///
/// A name whose files are already taken in this run gets the lowercased
/// kind appended, then a counter.
fn output_paths(
    output: Option<&Path>,
    output_dir: Option<&Path>,
    workloads: &[(&str, &str)],
) -> Vec<(PathBuf, PathBuf)> {
    let multiple = workloads.len() > 1;
    let mut taken = HashSet::new();

    workloads
        .iter()
        .map(|(name, kind)| {
            let kind = kind.to_lowercase();
            let mut attempt = 0;
            loop {
                let stem = match attempt {
                    0 => name.to_string(),
                    1 => format!("{}-{}", name, kind),
                    n => format!("{}-{}-{}", name, kind, n),
                };
                attempt += 1;

                let (template, report) = artifact_paths(output, output_dir, &stem, multiple);
                if !taken.contains(&template) && !taken.contains(&report) {
                    if attempt > 1 {
                        tracing::debug!(name = %name, stem = %stem, "renamed repeated workload");
                    }
                    taken.insert(template.clone());
                    taken.insert(report.clone());
                    break (template, report);
                }
            }
        })
        .collect()
}

/// Where a workload's template and report are written
///
/// The report takes the template's place with `.migration.txt` as its
/// extension. An explicit output path is shared by every workload, so with
/// several workloads the name is appended to its stem.
fn artifact_paths(
    output: Option<&Path>,
    output_dir: Option<&Path>,
    stem: &str,
    multiple: bool,
) -> (PathBuf, PathBuf) {
    match output {
        Some(path) if multiple => {
            let base = format!(
                "{}-{}",
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                stem
            );
            let template = match path.extension() {
                Some(ext) => format!("{}.{}", base, ext.to_string_lossy()),
                None => base.clone(),
            };
            (
                path.with_file_name(template),
                path.with_file_name(format!("{}.migration.txt", base)),
            )
        }
        Some(path) => (path.to_path_buf(), path.with_extension("migration.txt")),
        None => {
            let dir = output_dir.unwrap_or_else(|| Path::new("."));
            (
                dir.join(format!("{}.aca.yaml", stem)),
                dir.join(format!("{}.aca.migration.txt", stem)),
            )
        }
    }
}
