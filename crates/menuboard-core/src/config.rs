//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend URL, request timeout, the last restaurant and
//! email used to sign in, and the cache TTL.
//!
//! Configuration is stored at `~/.config/menuboard/config.json`. The
//! `MENUBOARD_SUPABASE_URL` and `MENUBOARD_TIMEOUT_MS` environment variables
//! override the file; `MENUBOARD_SUPABASE_KEY` overrides the keychain.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::DEFAULT_TIMEOUT_MS;
use crate::auth::CredentialStore;
use crate::cache::DEFAULT_TTL_MINUTES;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "menuboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_SUPABASE_URL: &str = "MENUBOARD_SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "MENUBOARD_SUPABASE_KEY";
pub const ENV_TIMEOUT_MS: &str = "MENUBOARD_TIMEOUT_MS";

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_cache_ttl() -> i64 {
    DEFAULT_TTL_MINUTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub supabase_url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    pub restaurant_id: Option<String>,
    pub last_email: Option<String>,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            restaurant_id: None,
            last_email: None,
            cache_ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }
}

impl Config {
    /// Load from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var(ENV_SUPABASE_URL).filter(|v| !v.trim().is_empty()) {
            self.supabase_url = Some(url.trim().to_string());
        }
        if let Some(raw) = var(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.timeout_ms = ms,
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_TIMEOUT_MS),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_ttl_minutes)
    }

    /// The API key: environment first, then the keychain entry for the
    /// configured URL.
    pub fn api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(ENV_SUPABASE_KEY) {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }
        let url = self
            .supabase_url
            .as_deref()
            .context("No backend URL configured")?;
        CredentialStore::get_api_key(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.cache_ttl_minutes, 3);
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"supabase_url":"https://x.supabase.co"}"#).unwrap();
        assert_eq!(config.supabase_url.as_deref(), Some("https://x.supabase.co"));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.cache_ttl_minutes, DEFAULT_TTL_MINUTES);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (ENV_SUPABASE_URL, " https://env.supabase.co "),
            (ENV_TIMEOUT_MS, "2500"),
        ]));
        assert_eq!(config.supabase_url.as_deref(), Some("https://env.supabase.co"));
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn test_invalid_timeout_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_TIMEOUT_MS, "soon"), (ENV_SUPABASE_URL, "")]));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.supabase_url.is_none());
    }
}
