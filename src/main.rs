//! amp - DeploymentConfig convergence and zync monitoring manifests

use std::path::PathBuf;
use std::sync::Arc;

use clap::builder::PossibleValuesParser;
use clap::{CommandFactory, Parser, Subcommand};
use kube::CustomResourceExt;
use tracing::error;

use amp::commands::{mutate_manifests, render_monitoring};
use amp_common::crd::DeploymentConfig;
use amp_common::telemetry::{init_telemetry, LogFormat, TelemetryConfig};
use amp_common::TracingDiffReporter;
use amp_monitoring::ZyncOptions;
use amp_reconcilers::MUTATOR_NAMES;

/// amp - converge OpenShift DeploymentConfigs for the API management operator
#[derive(Parser, Debug)]
#[command(name = "amp", version, about, long_about = None)]
struct Cli {
    /// Print the DeploymentConfig CRD and exit
    #[arg(long)]
    crd: bool,

    /// Log output format
    #[arg(long, global = true, env = "AMP_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Converge an existing DeploymentConfig toward a desired one
    ///
    /// Prints the converged existing manifest when anything changed, or a
    /// one-line notice when the pair is already in sync. Every detected
    /// difference is logged.
    Mutate(MutateArgs),

    /// Print the zync PodMonitors, PrometheusRules and GrafanaDashboard
    Monitoring(MonitoringArgs),
}

/// Mutate mode arguments
#[derive(Parser, Debug)]
struct MutateArgs {
    /// Reconciler pipeline to run
    #[arg(long, default_value = "generic", value_parser = PossibleValuesParser::new(MUTATOR_NAMES))]
    mutator: String,

    /// Path to the last-observed DeploymentConfig
    #[arg(long)]
    existing: PathBuf,

    /// Path to the DeploymentConfig the operator wants
    #[arg(long)]
    desired: PathBuf,
}

/// Monitoring mode arguments
#[derive(Parser, Debug)]
struct MonitoringArgs {
    /// Namespace the zync deployments run in
    #[arg(long, env = "AMP_NAMESPACE")]
    namespace: String,

    /// Value of the `app` label on zync pods
    #[arg(long, env = "AMP_APP_LABEL", default_value = "3scale-api-management")]
    app_label: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        format: cli.log_format,
        ..Default::default()
    })?;

    if cli.crd {
        let crd = serde_yaml::to_string(&DeploymentConfig::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
        println!("{crd}");
        return Ok(());
    }

    match cli.command {
        Some(Commands::Mutate(args)) => run_mutate(args),
        Some(Commands::Monitoring(args)) => run_monitoring(args),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Run a mutator over two manifest files
fn run_mutate(args: MutateArgs) -> anyhow::Result<()> {
    let existing = std::fs::read_to_string(&args.existing)
        .map_err(|e| anyhow::anyhow!("Failed to read {:?}: {}", args.existing, e))?;
    let desired = std::fs::read_to_string(&args.desired)
        .map_err(|e| anyhow::anyhow!("Failed to read {:?}: {}", args.desired, e))?;

    let outcome = match mutate_manifests(
        &args.mutator,
        &existing,
        &desired,
        Arc::new(TracingDiffReporter),
    ) {
        Ok(outcome) => outcome,
        Err(e) if e.is_fatal() => {
            // Desired object was built wrong; never requeue
            error!(error = %e, object = e.object().unwrap_or_default(), "fatal invariant violation");
            std::process::abort();
        }
        Err(e) => return Err(e.into()),
    };

    print!("{}", outcome.render()?);
    Ok(())
}

/// Print all zync monitoring manifests
fn run_monitoring(args: MonitoringArgs) -> anyhow::Result<()> {
    let yaml = render_monitoring(&args.namespace, &ZyncOptions::new(args.app_label))?;
    print!("{yaml}");
    Ok(())
}
