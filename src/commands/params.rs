use crate::params::ParameterSet;
use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ParamsFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Deployment params file
    pub file: PathBuf,
    /// Print the resolved settings of a single environment
    #[arg(long = "env")]
    pub environment: Option<String>,
    #[arg(long, value_enum, default_value_t = ParamsFormat::Yaml)]
    pub format: ParamsFormat,
}

pub fn run(args: ParamsArgs) -> Result<()> {
    let set = ParameterSet::from_path(&args.file)
        .with_context(|| format!("loading params from {}", args.file.display()))?;

    let Some(name) = args.environment else {
        println!("Environments in {}:", args.file.display());
        for env in &set.environments {
            println!(" - {}", env.name);
        }
        return Ok(());
    };

    let env = set.environment(&name).ok_or_else(|| match set.closest_name(&name) {
        Some(hint) => anyhow!("environment '{name}' not found. Did you mean '{hint}'?"),
        None => anyhow!("environment '{name}' not found"),
    })?;
    match args.format {
        ParamsFormat::Yaml => print!("{}", serde_yaml::to_string(env)?),
        ParamsFormat::Json => println!("{}", serde_json::to_string_pretty(env)?),
    }
    Ok(())
}
