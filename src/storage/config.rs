//! Configuration handling for tasktree
//!
//! Configuration is read from an explicit path (`--config` or
//! `TASKTREE_CONFIG`), otherwise from `config.toml` in the platform config
//! directory (e.g. `~/.config/tasktree/config.toml`). Missing files mean
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::seed::SeedSource;
use crate::domain::{CascadeMode, IdStrategy, StoreOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for the task store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Whether un-completing a task also flows down to its subtree
    pub cascade: CascadeMode,

    /// How new task ids are generated
    pub ids: IdStrategy,
}

impl StoreConfig {
    pub fn options(&self) -> StoreOptions {
        StoreOptions {
            ids: self.ids,
            cascade: self.cascade,
        }
    }
}

/// Settings for the initial task list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed file (JSON array or JSONL)
    pub path: Option<PathBuf>,

    /// Start from the built-in sample list when no path is given
    pub builtin: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            path: None,
            builtin: true,
        }
    }
}

impl SeedConfig {
    pub fn source(&self) -> SeedSource {
        match &self.path {
            Some(path) => SeedSource::File(path.clone()),
            None if self.builtin => SeedSource::Builtin,
            None => SeedSource::Empty,
        }
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings for printed output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (text or json)
    pub format: OutputFormat,
}

/// Full configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub seed: SeedConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Loads configuration from `explicit`, or from the default location
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "tasktree", "tasktree")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the default config file path
    pub fn default_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Parses a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parses config TOML
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")
    }
}
