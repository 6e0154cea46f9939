//! Display formatting for CLI output

use console::{Style, style};
use k8s2aca_convert::{MigrationReport, Severity, WorkloadConversion};
use k8s2aca_core::ManifestSummary;
use std::path::Path;

/// Print the outcome of one converted workload
pub fn print_workload(workload: &WorkloadConversion, template_path: &Path, report_path: &Path) {
    println!(
        "{} {} '{}' converted",
        style("✓").green().bold(),
        workload.kind,
        workload.app_name()
    );
    println!(
        "  {} {}",
        style("Template:").dim(),
        style(template_path.display()).cyan()
    );
    println!(
        "  {} {}",
        style("Report:  ").dim(),
        style(report_path.display()).cyan()
    );
    print_report(&workload.report);
    println!();
}

fn print_report(report: &MigrationReport) {
    if report.is_empty() {
        println!("  {} {}", style("✓").green(), style("No migration notes").dim());
        return;
    }

    for entry in report.entries() {
        let color = Style::from_dotted_str(entry.severity.color());
        println!(
            "  {} {}",
            color.apply_to(entry.severity.icon()),
            entry.message
        );
    }

    let counts = [
        (Severity::Error, "error"),
        (Severity::Unsupported, "unsupported"),
        (Severity::Warning, "warning"),
    ]
    .into_iter()
    .map(|(severity, label)| (report.count_by_severity(severity), label))
    .filter(|(count, _)| *count > 0)
    .map(|(count, label)| format!("{} {}", count, label))
    .collect::<Vec<_>>();

    if !counts.is_empty() {
        println!(
            "  {} {}",
            style("→").blue(),
            style(format!("{} (review recommended)", counts.join(", "))).dim()
        );
    }
}

/// Print a manifest summary for `validate`
pub fn print_summary(path: &Path, summary: &ManifestSummary) {
    println!(
        "{} {} is a valid manifest ({} document{})",
        style("✓").green().bold(),
        path.display(),
        summary.documents,
        if summary.documents == 1 { "" } else { "s" }
    );

    let rows = [
        ("Workloads", summary.workloads),
        ("ConfigMaps", summary.config_maps),
        ("Secrets", summary.secrets),
        ("Services", summary.services),
        ("Ingresses", summary.ingresses),
    ];
    for (label, count) in rows {
        println!("  {:<12} {}", style(label).dim(), count);
    }

    if summary.unsupported > 0 {
        println!(
            "  {:<12} {}",
            style("Unsupported").magenta(),
            summary.unsupported
        );
    }
    if summary.workloads == 0 {
        println!(
            "  {} {}",
            style("⚠").yellow(),
            style("No Deployment, ReplicaSet or Pod to convert").dim()
        );
    }
}
