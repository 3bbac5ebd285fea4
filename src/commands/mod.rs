use anyhow::{Context, Result};
use clap::Subcommand;

use crate::{
    client::{http_client, ApimClient},
    config::load_main_config,
    constants::DEFAULT_SCOPES,
    credentials::{fetch_access_token, KeyStore},
};

pub mod completions;
pub mod env;
pub mod export_app;
pub mod get;
pub mod import_api;
pub mod import_app;
pub mod login;
pub mod params;
pub mod substitute;

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Manage remote environments in the main config (add/list/remove)")]
    Env {
        #[command(subcommand)]
        cmd: env::EnvCommands,
    },
    #[command(about = "Store OAuth2 client credentials for an environment")]
    Login(login::LoginArgs),
    #[command(about = "Forget the stored credentials of an environment")]
    Logout { environment: String },
    #[command(about = "List resources of an environment")]
    Get {
        #[command(subcommand)]
        cmd: get::GetCommands,
    },
    #[command(about = "Import an API archive, optionally applying deployment parameters")]
    ImportApi(import_api::ImportApiArgs),
    #[command(about = "Import an application archive")]
    ImportApp(import_app::ImportAppArgs),
    #[command(about = "Export an application archive")]
    ExportApp(export_app::ExportAppArgs),
    #[command(about = "Replace ${VAR} placeholders in a file or every file of a folder")]
    Substitute(substitute::SubstituteArgs),
    #[command(about = "Validate a deployment params file and show its environments")]
    Params(params::ParamsArgs),
    #[command(about = "Emit shell completion scripts (bash/zsh/fish)")]
    Completions { shell: String },
}

pub async fn run(cmd: Commands, insecure: bool) -> Result<()> {
    match cmd {
        Commands::Env { cmd } => env::run(cmd),
        Commands::Login(args) => login::run(args),
        Commands::Logout { environment } => login::logout(&environment),
        Commands::Get { cmd } => get::run(cmd, insecure).await,
        Commands::ImportApi(args) => import_api::run(args, insecure).await,
        Commands::ImportApp(args) => import_app::run(args, insecure).await,
        Commands::ExportApp(args) => export_app::run(args, insecure).await,
        Commands::Substitute(args) => substitute::run(args),
        Commands::Params(args) => params::run(args),
        Commands::Completions { shell } => completions::run(shell),
    }
}

/// Resolve an environment, obtain an access token and build its client
pub(crate) async fn connect(environment: &str, insecure: bool) -> Result<ApimClient> {
    let main = load_main_config()?;
    let env = main.require_environment(environment)?;
    let credential = KeyStore::load()?.get(environment)?;

    let http = http_client(insecure)?;
    let token = fetch_access_token(&http, &env.token_endpoint(), &credential, DEFAULT_SCOPES)
        .await
        .with_context(|| format!("getting an access token for '{environment}'"))?;
    ApimClient::new(env, &token, insecure)
}
