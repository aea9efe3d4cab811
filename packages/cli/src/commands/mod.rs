pub mod init;
pub mod inspect;
pub mod roundtrip;

pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use roundtrip::{roundtrip, RoundtripArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use quire_core::{Fragment, Parser};
use quire_dom::parse_fragment;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Root element the markup of an input file is read into
pub const ROOT_TAG: &str = "body";

/// Read `file` and parse it into a fragment with the configured translators
pub fn load_fragment(file: &Path, config: &Config) -> Result<Fragment> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let root = parse_fragment(&source, ROOT_TAG)
        .with_context(|| format!("Cannot parse {}", file.display()))?;

    let fragment = Parser::new(config.parser_options()?).parse(&root);
    debug!(file = %file.display(), length = fragment.len(), "Loaded fragment");
    Ok(fragment)
}
