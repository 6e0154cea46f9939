//! k8s2aca CLI - Kubernetes manifests to Azure Container Apps templates

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;
mod resolver;

use commands::convert::ConvertArgs;
use resolver::{GpuChoice, VolumeStrategy};

#[derive(Parser)]
#[command(name = "k8s2aca")]
#[command(author = "k8s2aca Contributors")]
#[command(version)]
#[command(about = "Convert Kubernetes manifests to Azure Container Apps templates", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert workloads to ACA templates and migration reports
    Convert {
        /// Kubernetes manifest (multi-document YAML)
        input: PathBuf,

        /// Template output file (default: <name>.aca.yaml per workload)
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Directory for generated files
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Never prompt; unanswered choices are skipped
        #[arg(long)]
        non_interactive: bool,

        /// GPU SKU for containers requesting GPUs
        #[arg(long, value_enum, env = "K8S2ACA_GPU_SKU")]
        gpu_sku: Option<GpuChoice>,

        /// Handling of volumes without an ACA equivalent
        #[arg(long, value_enum, env = "K8S2ACA_VOLUME_STRATEGY")]
        volume_strategy: Option<VolumeStrategy>,

        /// Note unsupported resources in the first workload's report only
        #[arg(long)]
        report_unsupported_once: bool,
    },

    /// Check that a file is a Kubernetes manifest
    Validate {
        /// Kubernetes manifest (multi-document YAML)
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "k8s2aca=debug" } else { "k8s2aca=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            output_dir,
            json,
            non_interactive,
            gpu_sku,
            volume_strategy,
            report_unsupported_once,
        } => commands::convert::run(&ConvertArgs {
            input,
            output,
            output_dir,
            json,
            non_interactive,
            gpu_sku,
            volume_strategy,
            report_unsupported_once,
        }),

        Commands::Validate { input, json } => commands::validate::run(&input, json),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
