use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::tagging::markup::is_valid_tag_type;

/// Application configuration module
/// This module handles loading, validating and saving the tagging settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default transcript language code (ISO)
    #[serde(default = "default_language")]
    pub language: String,

    /// Tag types accepted in transcripts
    #[serde(default = "default_tag_types")]
    pub tag_types: Vec<TagTypeConfig>,

    /// SQLite database file; a per-user data directory location when unset
    #[serde(default)]
    pub database_path: Option<String>,

    /// Refuse to replace stored tags when a parse produced errors
    #[serde(default = "default_true")]
    pub abort_on_errors: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// One valid tag type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TagTypeConfig {
    /// Name used in markup, `<c.NAME>`
    pub name: String,

    /// Human readable label
    #[serde(default)]
    pub display_name: String,

    /// Whether entries of this type are inserted by auto-tagging
    #[serde(default = "default_true")]
    pub auto_tag: bool,
}

impl TagTypeConfig {
    pub fn new(name: &str, display_name: &str) -> Self {
        TagTypeConfig {
            name: name.to_string(),
            display_name: display_name.to_string(),
            auto_tag: true,
        }
    }

    /// Display name, falling back to the markup name
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "mi".to_string()
}

fn default_tag_types() -> Vec<TagTypeConfig> {
    vec![
        TagTypeConfig::new("tangata", "Tangata"),
        TagTypeConfig::new("iwihapu", "Iwi / Hapū"),
        TagTypeConfig::new("kainga", "Kāinga"),
        TagTypeConfig::new("ingoaarohe", "Ingoa Arohe"),
        TagTypeConfig::new("kirehu", "Kīrehu"),
        TagTypeConfig::new("korerorero", "Kōrerorero"),
    ]
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        config.save(path)?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.language)?;

        if self.tag_types.is_empty() {
            return Err(anyhow!("At least one tag type must be configured"));
        }

        let mut seen = HashSet::new();
        for tag_type in &self.tag_types {
            if !is_valid_tag_type(&tag_type.name) {
                return Err(anyhow!(
                    "Invalid tag type name '{}': only letters, digits and '_' are allowed",
                    tag_type.name
                ));
            }
            if !seen.insert(tag_type.name.as_str()) {
                return Err(anyhow!("Duplicate tag type: {}", tag_type.name));
            }
        }

        Ok(())
    }

    /// Names of every valid tag type
    pub fn valid_types(&self) -> Vec<String> {
        self.tag_types.iter().map(|t| t.name.clone()).collect()
    }

    /// Names of tag types eligible for auto-tagging
    pub fn auto_tag_types(&self) -> Vec<String> {
        self.tag_types
            .iter()
            .filter(|t| t.auto_tag)
            .map(|t| t.name.clone())
            .collect()
    }

    /// Label for a tag type name
    pub fn type_label<'a>(&'a self, name: &'a str) -> &'a str {
        self.tag_types
            .iter()
            .find(|t| t.name == name)
            .map_or(name, |t| t.label())
    }

    /// Configured database path, or `None` to use the default location
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database_path.as_ref().map(PathBuf::from)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            tag_types: default_tag_types(),
            database_path: None,
            abort_on_errors: true,
            log_level: LogLevel::default(),
        }
    }
}
