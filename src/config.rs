//! Configuration management for apictl
//!
//! The main config (`main_config.yaml`) lists the remote API management
//! environments the CLI can talk to. It lives in `~/.config/apictl/`, or in
//! the directory named by `APICTL_CONFIG_DIR`.
//!
//! `${VAR}` placeholders in the file are substituted from the process
//! environment before parsing; an unset variable is an error.
//!
//! # Example
//!
//! ```yaml
//! environments:
//!   - name: dev
//!     apim: https://localhost:9443
//!   - name: prod
//!     apim: https://apim.example.com
//!     token: https://gateway.example.com/oauth2/token
//! ```

use crate::constants::{
    ADMIN_API_PATH, APICTL_CONFIG_DIR_ENV, CONFIG_DIR_NAME, EXPORT_DIR_NAME, MAIN_CONFIG_FILE,
    PUBLISHER_API_PATH, TOKEN_PATH,
};
use crate::envsubst::{substitute_braced, ProcessEnv};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::debug;

/// Remote environment definition
///
/// Only `apim` is required; the publisher, admin and token endpoints are
/// derived from it unless given explicitly.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Unique name used with `-e/--environment`
    pub name: String,
    /// Base URL of the management server
    pub apim: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl EnvironmentConfig {
    fn base(&self) -> &str {
        self.apim.trim_end_matches('/')
    }

    pub fn publisher_endpoint(&self) -> String {
        self.publisher
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.base(), PUBLISHER_API_PATH))
    }

    pub fn admin_endpoint(&self) -> String {
        self.admin
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.base(), ADMIN_API_PATH))
    }

    pub fn token_endpoint(&self) -> String {
        self.token
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.base(), TOKEN_PATH))
    }
}

/// Contents of `main_config.yaml`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MainConfig {
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
}

impl MainConfig {
    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Like [`MainConfig::environment`] but with a helpful error
    pub fn require_environment(&self, name: &str) -> anyhow::Result<&EnvironmentConfig> {
        self.environment(name).ok_or_else(|| {
            let known: Vec<&str> = self.environments.iter().map(|e| e.name.as_str()).collect();
            if known.is_empty() {
                anyhow!("environment '{name}' is not configured. Add it with 'apictl env add'")
            } else {
                anyhow!(
                    "environment '{name}' is not configured. Available environments: {}",
                    known.join(", ")
                )
            }
        })
    }

    pub fn add_environment(&mut self, env: EnvironmentConfig) -> anyhow::Result<()> {
        if self.environment(&env.name).is_some() {
            anyhow::bail!("environment '{}' already exists", env.name);
        }
        self.environments.push(env);
        Ok(())
    }

    /// Returns whether an environment was removed
    pub fn remove_environment(&mut self, name: &str) -> bool {
        let before = self.environments.len();
        self.environments.retain(|e| e.name != name);
        self.environments.len() != before
    }
}

/// Directory holding the main config, keys and exported archives
pub fn config_dir() -> PathBuf {
    env::var(APICTL_CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push(CONFIG_DIR_NAME);
            p
        })
}

pub fn main_config_path() -> PathBuf {
    config_dir().join(MAIN_CONFIG_FILE)
}

pub fn export_dir() -> PathBuf {
    config_dir().join(EXPORT_DIR_NAME)
}

pub fn load_main_config() -> anyhow::Result<MainConfig> {
    load_main_config_from(&main_config_path())
}

/// Load a main config file; a missing file is an empty config
pub fn load_main_config_from(path: &Path) -> anyhow::Result<MainConfig> {
    if !path.exists() {
        debug!("No main config at {}, using defaults", path.display());
        return Ok(MainConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading main config {}", path.display()))?;
    let data = substitute_braced(&raw, &ProcessEnv)
        .with_context(|| format!("expanding variables in {}", path.display()))?;
    let cfg: MainConfig = serde_yaml::from_str(&data)
        .with_context(|| format!("parsing main config {}", path.display()))?;
    Ok(cfg)
}

pub fn save_main_config(cfg: &MainConfig) -> anyhow::Result<()> {
    save_main_config_to(cfg, &main_config_path())
}

pub fn save_main_config_to(cfg: &MainConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_yaml::to_string(cfg)?;
    fs::write(path, data)?;
    debug!("Saved main config to {}", path.display());
    Ok(())
}
