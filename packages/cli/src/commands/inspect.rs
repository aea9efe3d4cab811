use super::load_fragment;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Markup file to read
    pub file: PathBuf,

    /// Print the snapshot on a single line
    #[arg(long)]
    pub compact: bool,
}

/// Print the document model read from a file as JSON
pub fn inspect(args: InspectArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let snapshot = load_fragment(&args.file, &config)?.snapshot();

    let json = if args.compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{}", json);

    Ok(())
}
