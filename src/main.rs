//! # apictl
//!
//! Command-line client for API management servers.
//!
//! ## Quick Start
//!
//! ```bash
//! # Register an environment and log in with OAuth2 client credentials
//! apictl env add dev --apim https://localhost:9443
//! apictl login dev --client-id <id>
//!
//! # List APIs and import an application
//! apictl get apis -e dev
//! apictl import-app -f qa/apps/SampleApp.zip -e dev
//!
//! # Import an API with per-environment deployment parameters
//! apictl import-api -f PizzaShackAPI_1.0.0.zip -e dev --params api_params.yaml
//! ```
//!
//! ## Configuration
//!
//! - `main_config.yaml` - remote environments
//! - `keys.yaml` - client credentials per environment
//!
//! Both live in `~/.config/apictl/` unless `APICTL_CONFIG_DIR` is set.

use anyhow::Result;
use apictl::{commands, Cli};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Main entry point for apictl
///
/// Initializes logging, parses command-line arguments and delegates to the
/// appropriate command handler.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli.cmd.unwrap_or_else(|| {
        eprintln!("No command provided. Use --help to see available commands.");
        std::process::exit(1);
    });
    commands::run(cmd, cli.insecure).await
}
