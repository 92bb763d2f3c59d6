//! Configuration file support for pydown
//!
//! Loads `.pydown.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use pydown_core::logging;
use pydown_fixer::fixers::ConfigValue;
use pydown_fixer::{FixerConfig, IndentStyle, LineEnding, WhitespaceConfig};
use pydown_rules::RewriteOptions;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".pydown.toml";

/// Contents of `.pydown.toml`; every table is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub rules: RulesConfig,
    pub rewrite: RewriteOptions,
    pub format: FormatConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File converted when none is given on the command line
    pub default: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// If set, only these rules will run
    pub enabled: Option<Vec<String>>,
    /// Rules to exclude (applied after enabled)
    pub disabled: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Run the layout fixers on the unparsed text
    pub enabled: bool,
    /// External formatter command, run after the fixers
    pub command: Option<Vec<String>>,
    pub indent: IndentStyle,
    pub line_ending: LineEnding,
    /// Longest allowed run of blank lines
    pub max_blank_lines: Option<usize>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            indent: IndentStyle::default(),
            line_ending: LineEnding::default(),
            max_blank_lines: None,
        }
    }
}

impl FormatConfig {
    pub fn fixer_config(&self) -> FixerConfig {
        let mut config = FixerConfig::from(&WhitespaceConfig::new(self.indent, self.line_ending));
        if let Some(max) = self.max_blank_lines {
            config
                .options
                .insert("max_blank_lines".to_string(), ConfigValue::Number(max));
        }
        config
    }
}

impl Config {
    /// Find and load `.pydown.toml` starting at the current directory
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Find and load the nearest `.pydown.toml` in `start_dir` or above it
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let Some(path) = start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
        else {
            return Ok(None);
        };
        Ok(Some((Self::load_path(&path)?, path)))
    }

    pub fn load_path(path: &Path) -> Result<Config> {
        logging::log_config_load(path);
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Rules to run: `--rule` names when given, else `[rules] enabled` (or
    /// every rule) minus `[rules] disabled`
    pub fn effective_rules(&self, all_rules: &[&str], cli_rules: &[String]) -> HashSet<String> {
        if !cli_rules.is_empty() {
            return cli_rules.iter().cloned().collect();
        }

        let candidates: Vec<String> = match &self.rules.enabled {
            Some(enabled) => enabled.clone(),
            None => all_rules.iter().map(|name| name.to_string()).collect(),
        };
        candidates
            .into_iter()
            .filter(|name| !self.rules.disabled.contains(name))
            .collect()
    }
}
