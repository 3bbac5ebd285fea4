use crate::{config::export_dir, constants::EXPORTED_APPS_DIR_NAME};
use anyhow::{Context, Result};
use clap::Args;
use std::{fs, path::PathBuf};

#[derive(Args, Debug)]
pub struct ExportAppArgs {
    /// Name of the application
    #[arg(short, long)]
    pub name: String,
    /// Owner of the application
    #[arg(short, long)]
    pub owner: String,
    #[arg(short, long)]
    pub environment: String,
    /// Include consumer keys in the archive
    #[arg(long)]
    pub with_keys: bool,
}

/// Location an exported application archive is written to
pub fn export_path(environment: &str, owner: &str, name: &str) -> PathBuf {
    export_dir()
        .join(EXPORTED_APPS_DIR_NAME)
        .join(environment)
        .join(format!("{owner}_{name}.zip"))
}

pub async fn run(args: ExportAppArgs, insecure: bool) -> Result<()> {
    let client = super::connect(&args.environment, insecure).await?;
    let data = client
        .export_application(&args.name, &args.owner, args.with_keys)
        .await
        .with_context(|| format!("exporting application '{}'", args.name))?;

    let target = export_path(&args.environment, &args.owner, &args.name);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, &data).with_context(|| format!("writing {}", target.display()))?;
    println!(
        "✅ Successfully exported Application '{}' to {}",
        args.name,
        target.display()
    );
    Ok(())
}
