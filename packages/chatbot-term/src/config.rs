//! Client configuration
//!
//! Layered lowest to highest: built-in defaults, `config.toml` in the
//! platform config directory, `CHATBOT_*` environment variables, then
//! command-line flags (applied by `main`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_ENV: &str = "CHATBOT_API_URL";
pub const AUTH_URL_ENV: &str = "CHATBOT_AUTH_URL";
pub const AUTH_KEY_ENV: &str = "CHATBOT_AUTH_KEY";
pub const CONFIG_FILE_ENV: &str = "CHATBOT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chatbot backend, without the `/api/v1` prefix
    pub api_url: String,
    /// Auth service (Supabase project URL)
    pub auth_url: String,
    /// Public (anon) key sent to the auth service
    pub auth_key: String,
    /// Pause between a successful sign-up and the jump to login
    pub redirect_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            auth_url: "http://localhost:54321".to_string(),
            auth_key: String::new(),
            redirect_delay_ms: 2000,
        }
    }
}

impl Config {
    /// Get the default config file path.
    ///
    /// Can be overridden with the `CHATBOT_CONFIG` environment variable.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = non_empty_var(CONFIG_FILE_ENV) {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("com", "adolago", "chatbot")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from a file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(non_empty_var);
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(url) = lookup(AUTH_URL_ENV) {
            self.auth_url = url;
        }
        if let Some(key) = lookup(AUTH_KEY_ENV) {
            self.auth_key = key;
        }
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
