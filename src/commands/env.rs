use crate::config::{load_main_config, save_main_config, EnvironmentConfig};
use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    /// List configured environments
    List,
    /// Add a new environment
    Add {
        name: String,
        /// Base URL of the management server
        #[arg(long)]
        apim: String,
        /// Publisher REST API endpoint (derived from --apim if omitted)
        #[arg(long)]
        publisher: Option<String>,
        /// Admin REST API endpoint (derived from --apim if omitted)
        #[arg(long)]
        admin: Option<String>,
        /// OAuth2 token endpoint (derived from --apim if omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove an environment by name
    Remove { name: String },
}

pub fn run(cmd: EnvCommands) -> Result<()> {
    let mut main = load_main_config()?;

    match cmd {
        EnvCommands::List => {
            if main.environments.is_empty() {
                println!("(no environments defined)");
            } else {
                for e in &main.environments {
                    println!(" - {} → {}", e.name, e.apim);
                    println!("     publisher: {}", e.publisher_endpoint());
                    println!("     admin:     {}", e.admin_endpoint());
                    println!("     token:     {}", e.token_endpoint());
                }
            }
        }
        EnvCommands::Add {
            name,
            apim,
            publisher,
            admin,
            token,
        } => {
            main.add_environment(EnvironmentConfig {
                name: name.clone(),
                apim,
                publisher,
                admin,
                token,
            })?;
            save_main_config(&main)?;
            println!("✅ Added environment '{name}' successfully");
        }
        EnvCommands::Remove { name } => {
            if main.remove_environment(&name) {
                save_main_config(&main)?;
                println!("removed '{name}'");
            } else {
                println!("no such environment '{name}'");
            }
        }
    }

    Ok(())
}
