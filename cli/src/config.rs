use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite document store
    pub database_path: PathBuf,
    /// Where the signed-in user is remembered between runs
    pub session_path: PathBuf,
    /// tracing filter directive; `NOTECASE_LOG` takes precedence
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("notecase.db"),
            session_path: PathBuf::from("session.json"),
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Resolve relative paths against the directory holding the config file
    pub fn resolve_paths(mut self, config_path: &Path) -> Self {
        if let Some(base) = config_path.parent() {
            if self.database_path.is_relative() {
                self.database_path = base.join(&self.database_path);
            }
            if self.session_path.is_relative() {
                self.session_path = base.join(&self.session_path);
            }
        }
        self
    }
}

/// Load the config at `path`, writing the defaults there first if the file
/// does not exist yet.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config).context("Failed to serialize default config")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        return Ok(config.resolve_paths(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config.resolve_paths(path))
}
