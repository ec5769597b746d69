//! GitLab Runner installer CLI.
//!
//! Installs a GitLab Runner onto a Kubernetes cluster by driving
//! kubectl and helm, renders the Helm values and RBAC manifest as
//! typed documents, and emits a sample pipeline file.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use runnerctl::commands::check::CheckCommand;
use runnerctl::commands::install::InstallCommand;
use runnerctl::commands::render::RenderCommand;
use runnerctl::commands::uninstall::UninstallCommand;

/// GitLab Runner installer for Kubernetes.
#[derive(Parser)]
#[command(
    name = "runnerctl",
    version,
    about = "Install a GitLab Runner on Kubernetes",
    long_about = "Install a GitLab Runner on a Kubernetes cluster.\n\n\
                  This CLI ensures the namespace and registry pull secret,\n\
                  applies a scoped RBAC manifest, renders the Helm values,\n\
                  installs or upgrades the gitlab-runner chart, and waits\n\
                  for the runner pods to become ready."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install or upgrade the runner on the current cluster.
    Install(InstallCommand),

    /// Run preflight checks without installing anything.
    Check(CheckCommand),

    /// Render the generated files without touching the cluster.
    Render(RenderCommand),

    /// Remove the runner release and its generated cluster objects.
    Uninstall(UninstallCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("info,runnerctl=debug")
    } else {
        EnvFilter::new("warn,runnerctl=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Install(cmd) => cmd.run().await,
        Commands::Check(cmd) => cmd.run(),
        Commands::Render(cmd) => cmd.run(),
        Commands::Uninstall(cmd) => cmd.run(),
    }
}
