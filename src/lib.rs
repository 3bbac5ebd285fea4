//! # apictl library
//!
//! Core functionality of the apictl CLI: environment variable substitution,
//! deployment parameter loading and the API management client.

use clap::Parser;

pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod envsubst;
pub mod error;
pub mod params;

/// CLI tool for moving APIs and applications between API management environments
///
/// apictl imports and exports API and application archives against the
/// management REST API of each configured environment, authenticating with
/// OAuth2 client credentials. Deployment parameters and other files can carry
/// `${VAR}` placeholders that are resolved from the process environment.
#[derive(Parser)]
#[command(
    name = "apictl",
    version,
    about = "CLI tool for importing and exporting APIs and applications",
    long_about = "A command-line client for API management servers.\n\nImports and exports API and application archives per environment, authenticates with OAuth2\nclient credentials and resolves ${VAR} placeholders in deployment parameter files."
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub cmd: Option<commands::Commands>,
}
