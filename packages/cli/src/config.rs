use anyhow::Context;
use quire_core::ParserOptions;
use quire_presets::PresetSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Quire configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Template translators by name, tried in this order
    #[serde(default = "default_templates")]
    pub templates: Vec<String>,

    /// Format translators by name
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Skip whitespace-only text nodes when reading markup
    #[serde(default)]
    pub ignore_whitespace: bool,

    /// Indent the generated HTML
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_templates() -> Vec<String> {
    PresetSet::standard()
        .template_names()
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_formats() -> Vec<String> {
    PresetSet::standard()
        .format_names()
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Cannot read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", DEFAULT_CONFIG_NAME))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_CONFIG_NAME)
    }

    /// Parser options holding the configured translators
    pub fn parser_options(&self) -> anyhow::Result<ParserOptions> {
        let options = PresetSet::standard()
            .options_from_names(self.templates.as_slice(), self.formats.as_slice())?;
        Ok(options.ignore_whitespace(self.ignore_whitespace))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            formats: default_formats(),
            ignore_whitespace: false,
            pretty: default_pretty(),
        }
    }
}
