//! Run configuration: input/output roots and title cleanup rules
//!
//! A [`Config`] is built once before the run starts and passed by reference
//! to every stage. It can be loaded from a TOML file and then overridden
//! from the command line.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid title rule '{0}': expected STYLE=TEXT or STYLE=FIND=REPLACE")]
    InvalidRule(String),
}

/// Substitution applied to a title when cleanup is enabled
///
/// In TOML a plain string is a [`TitleRule::Remove`] and a two-element
/// array is a [`TitleRule::ReplaceFirst`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TitleRule {
    /// Remove the first occurrence of the text
    Remove(String),
    /// Replace the first occurrence of the first string with the second
    ReplaceFirst(String, String),
}

impl TitleRule {
    /// Apply the rule to a title, touching only the first match
    pub fn apply(&self, title: &str) -> String {
        match self {
            TitleRule::Remove(text) => title.replacen(text.as_str(), "", 1),
            TitleRule::ReplaceFirst(find, with) => title.replacen(find.as_str(), with, 1),
        }
    }
}

/// Configuration for a library generation run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root folder holding one directory per style
    pub input: PathBuf,
    /// Folder receiving the generated `.xml` libraries
    pub output: PathBuf,
    /// Drop the subvariant name from titles (`camera blue` becomes `camera`)
    pub hide_subvariant: bool,
    /// Apply [`Config::substitutions`] to titles
    pub title_cleanup: bool,
    /// Style name -> title rule
    pub substitutions: BTreeMap<String, TitleRule>,
}

/// TOML structure for deserializing configuration files
///
/// Every field is optional so a file only overrides what it names.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    hide_subvariant: Option<bool>,
    title_cleanup: Option<bool>,
    substitutions: Option<BTreeMap<String, TitleRule>>,
}

impl Default for Config {
    fn default() -> Self {
        let substitutions = [
            ("circle", TitleRule::Remove("c_".to_string())),
            ("square", TitleRule::Remove("sq_".to_string())),
        ]
        .into_iter()
        .map(|(style, rule)| (style.to_string(), rule))
        .collect();

        Self {
            input: PathBuf::from("svg"),
            output: PathBuf::from("draw.io_libraries"),
            hide_subvariant: true,
            title_cleanup: true,
            substitutions,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file, on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Set the input root
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the output root
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Enable or disable hiding the subvariant in titles
    pub fn with_hide_subvariant(mut self, hide: bool) -> Self {
        self.hide_subvariant = hide;
        self
    }

    /// Enable or disable title cleanup
    pub fn with_title_cleanup(mut self, cleanup: bool) -> Self {
        self.title_cleanup = cleanup;
        self
    }

    /// Set (or replace) the rule for a style
    pub fn with_rule(mut self, style: impl Into<String>, rule: TitleRule) -> Self {
        self.substitutions.insert(style.into(), rule);
        self
    }

    /// Drop every configured rule
    pub fn without_rules(mut self) -> Self {
        self.substitutions.clear();
        self
    }

    /// Look up the rule for a style
    pub fn rule_for(&self, style: &str) -> Option<&TitleRule> {
        self.substitutions.get(style)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    /// Parse configuration from a TOML string, on top of the defaults
    ///
    /// A `[substitutions]` table replaces the default rules entirely.
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Config::default();

        if let Some(input) = parsed.input {
            config.input = input;
        }
        if let Some(output) = parsed.output {
            config.output = output;
        }
        if let Some(hide) = parsed.hide_subvariant {
            config.hide_subvariant = hide;
        }
        if let Some(cleanup) = parsed.title_cleanup {
            config.title_cleanup = cleanup;
        }
        if let Some(substitutions) = parsed.substitutions {
            config.substitutions = substitutions;
        }

        Ok(config)
    }
}

/// Parse a command-line rule: `STYLE=TEXT` or `STYLE=FIND=REPLACE`
pub fn parse_rule(spec: &str) -> Result<(String, TitleRule), ConfigError> {
    let mut parts = spec.splitn(3, '=');
    let style = parts.next().unwrap_or_default();
    let find = parts.next();
    let replace = parts.next();

    match (style, find, replace) {
        ("", _, _) | (_, None, _) | (_, Some(""), _) => Err(ConfigError::InvalidRule(spec.to_string())),
        (style, Some(find), None) => Ok((style.to_string(), TitleRule::Remove(find.to_string()))),
        (style, Some(find), Some(replace)) => Ok((
            style.to_string(),
            TitleRule::ReplaceFirst(find.to_string(), replace.to_string()),
        )),
    }
}
