use crate::{
    config::load_main_config,
    credentials::{Credential, KeyStore},
};
use anyhow::Result;
use clap::Args;
use dialoguer::Password;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Environment to log in to
    pub environment: String,
    #[arg(long)]
    pub client_id: String,
    /// Prompted for when omitted
    #[arg(long)]
    pub client_secret: Option<String>,
}

pub fn run(args: LoginArgs) -> Result<()> {
    let main = load_main_config()?;
    main.require_environment(&args.environment)?;

    let client_secret = match args.client_secret {
        Some(secret) => secret,
        None => Password::new()
            .with_prompt(format!("Client secret for '{}'", args.environment))
            .interact()?,
    };
    if client_secret.is_empty() {
        anyhow::bail!("client secret cannot be empty");
    }

    let mut store = KeyStore::load()?;
    store.set(
        &args.environment,
        &Credential {
            client_id: args.client_id,
            client_secret,
        },
    );
    store.save()?;
    println!("✅ Logged in to '{}'", args.environment);
    Ok(())
}

pub fn logout(environment: &str) -> Result<()> {
    let mut store = KeyStore::load()?;
    if store.remove(environment) {
        store.save()?;
        println!("Logged out from '{environment}'");
    } else {
        println!("not logged in to '{environment}'");
    }
    Ok(())
}
