//! Layered CLI configuration
//!
//! Resolution order: command-line flag, then environment variable, then the
//! optional TOML config file at `~/.config/datasette-cli/config.toml`.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::ConnectionConfig;

/// Settings read from the optional config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub token_template: Option<String>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub token: Option<String>,
    pub token_template: Option<String>,
}

impl Settings {
    pub fn connection(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(&self.url, self.token.clone());
        if let Some(template) = &self.token_template {
            config = config.with_token_template(template);
        }
        config
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("datasette-cli").join("config.toml"))
}

/// Load the config file if present. A missing file yields defaults.
pub fn load_file_config() -> Result<FileConfig> {
    let Some(path) = config_path() else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Resolve settings with flag > environment > config file precedence.
/// A missing URL is a fatal input error before any request is attempted.
pub fn resolve(
    url_flag: Option<String>,
    token_flag: Option<String>,
    template_flag: Option<String>,
) -> Result<Settings> {
    let file = load_file_config()?;
    merge(url_flag, token_flag, template_flag, file)
}

fn merge(
    url_flag: Option<String>,
    token_flag: Option<String>,
    template_flag: Option<String>,
    file: FileConfig,
) -> Result<Settings> {
    let url = url_flag
        .or_else(|| env::var("DATASETTE_URL").ok())
        .or(file.url)
        .context(
            "No Datasette URL configured: pass --url, set DATASETTE_URL, \
             or add 'url' to the config file",
        )?;
    let token = token_flag
        .or_else(|| env::var("DATASETTE_TOKEN").ok())
        .or(file.token)
        .filter(|token| !token.is_empty());
    let token_template = template_flag
        .or_else(|| env::var("DATASETTE_TOKEN_TEMPLATE").ok())
        .or(file.token_template);
    Ok(Settings {
        url,
        token,
        token_template,
    })
}
