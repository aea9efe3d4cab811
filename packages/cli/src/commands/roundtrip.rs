use super::{load_fragment, ROOT_TAG};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_core::{render_fragment, VElement};
use quire_html::{compile_children, CompileOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RoundtripArgs {
    /// Markup file to read
    pub file: PathBuf,

    /// Write the HTML here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write everything on one line (overrides config)
    #[arg(long)]
    pub compact: bool,
}

/// Read markup, build the document model, render it and write it back as HTML
pub fn roundtrip(args: RoundtripArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let html = roundtrip_file(&args.file, &config, !args.compact)?;

    match &args.out {
        Some(out) => {
            fs::write(out, &html)?;
            println!(
                "  {} {} → {}",
                "✓".green(),
                args.file.display(),
                out.display()
            );
        }
        None => print!("{}", html),
    }

    Ok(())
}

pub fn roundtrip_file(file: &Path, config: &Config, pretty: bool) -> Result<String> {
    let fragment = load_fragment(file, config)?;
    let tree = render_fragment(&fragment, VElement::new(ROOT_TAG));
    let options = CompileOptions {
        pretty: config.pretty && pretty,
        ..Default::default()
    };
    Ok(compile_children(&tree, options)?)
}
