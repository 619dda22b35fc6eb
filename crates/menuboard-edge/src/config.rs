use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use menuboard_core::config::{ENV_SUPABASE_KEY, ENV_SUPABASE_URL};
use tracing::{info, warn};

pub const ENV_PORT: &str = "MENUBOARD_EDGE_PORT";
pub const ENV_MAX_AGE: &str = "MENUBOARD_EDGE_MAX_AGE";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_key: String,
    /// How long a menu stays in the memory cache, and the advertised max-age
    pub max_age: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            port: try_load(ENV_PORT, "8787")?,
            supabase_url: require(ENV_SUPABASE_URL)?,
            supabase_key: require(ENV_SUPABASE_KEY)?,
            max_age: Duration::from_secs(try_load(ENV_MAX_AGE, "300")?),
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require(key: &str) -> Result<String> {
    var(key)
        .map(|v| v.trim().to_string())
        .with_context(|| format!("Environment variable {key} must be set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim().parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow::anyhow!("Invalid {key} value {raw:?}: {e}")
    })
}
