use crate::envsubst::{substitute_in_file, substitute_in_folder, ProcessEnv};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SubstituteArgs {
    /// File or folder to rewrite in place
    pub path: PathBuf,
    /// Only touch files ending with this suffix (repeatable), e.g. `--ext .yaml`
    #[arg(long = "ext")]
    pub extensions: Vec<String>,
}

pub fn run(args: SubstituteArgs) -> Result<()> {
    if args.path.is_dir() {
        let count = substitute_in_folder(&args.path, &args.extensions, &ProcessEnv)
            .with_context(|| format!("substituting variables under {}", args.path.display()))?;
        println!("✅ substituted variables in {count} file(s)");
    } else {
        let rewritten = substitute_in_file(&args.path, &args.extensions, &ProcessEnv)
            .with_context(|| format!("substituting variables in {}", args.path.display()))?;
        if rewritten {
            println!("✅ substituted variables in {}", args.path.display());
        } else {
            println!("skipped {} (extension not selected)", args.path.display());
        }
    }
    Ok(())
}
