use crate::{
    client::{ImportAppOptions, ImportOutcome},
    config::export_dir,
    constants::EXPORTED_APPS_DIR_NAME,
};
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Args, Debug)]
pub struct ImportAppArgs {
    /// Application archive, either a path or a file in the exported apps directory
    #[arg(short, long)]
    pub file: PathBuf,
    #[arg(short, long)]
    pub environment: String,
    /// Owner to assign to the imported application
    #[arg(short, long)]
    pub owner: Option<String>,
    #[arg(long)]
    pub preserve_owner: bool,
    #[arg(short, long)]
    pub skip_subscriptions: bool,
    /// Skip importing the application keys
    #[arg(long)]
    pub skip_keys: bool,
    /// Update the application if it already exists
    #[arg(long)]
    pub update: bool,
}

/// Use `file` as given when it exists, otherwise look for it under `export_root`
pub fn resolve_import_file(file: &Path, export_root: &Path) -> Result<PathBuf> {
    if file.is_file() {
        return Ok(file.to_path_buf());
    }
    let candidate = export_root.join(file);
    debug!("{} not found, trying {}", file.display(), candidate.display());
    if candidate.is_file() {
        return Ok(candidate);
    }
    anyhow::bail!(
        "application archive {} not found (also looked in {})",
        file.display(),
        export_root.display()
    )
}

pub async fn run(args: ImportAppArgs, insecure: bool) -> Result<()> {
    let apps_dir = export_dir().join(EXPORTED_APPS_DIR_NAME);
    let archive = resolve_import_file(&args.file, &apps_dir)?;
    println!("ZipFilePath: {}", archive.display());

    let client = super::connect(&args.environment, insecure).await?;
    let options = ImportAppOptions {
        owner: args.owner,
        preserve_owner: args.preserve_owner,
        skip_subscriptions: args.skip_subscriptions,
        skip_keys: args.skip_keys,
        update: args.update,
    };
    let outcome = client
        .import_application(&archive, &options)
        .await
        .with_context(|| format!("importing application {}", archive.display()))?;

    match outcome {
        ImportOutcome::Imported => println!("✅ Successfully imported Application!"),
        ImportOutcome::PartiallyImported => println!(
            "Partially imported Application\nNOTE: One or more subscriptions were not imported due to unavailability of APIs/Tiers"
        ),
    }
    Ok(())
}
