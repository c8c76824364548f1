//! Runtime configuration from the environment
//!
//! Loaded once at startup, after `dotenvy` has pulled in a local `.env`.
//! Everything has a sane default so a bare environment still runs.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Scheme store JSON document
    pub store_path: PathBuf,
    /// Odds table JSON; missing file falls back to built-in defaults
    pub odds_path: PathBuf,
    /// Randomized pre-dispatch delay bounds
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// How long a sent order may wait for a channel acknowledgement
    pub confirm_ttl_secs: u64,
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} must be an integer, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            store_path: env::var("BOT_STORE_PATH")
                .unwrap_or_else(|_| "schemes.json".to_string())
                .into(),
            odds_path: env::var("BOT_ODDS_PATH")
                .unwrap_or_else(|_| "odds.json".to_string())
                .into(),
            delay_min_ms: env_u64("BOT_DELAY_MIN_MS", 1500)?,
            delay_max_ms: env_u64("BOT_DELAY_MAX_MS", 5000)?,
            confirm_ttl_secs: env_u64("BOT_CONFIRM_TTL_SECS", 90)?,
        };
        if config.delay_max_ms < config.delay_min_ms {
            anyhow::bail!(
                "BOT_DELAY_MAX_MS ({}) is below BOT_DELAY_MIN_MS ({})",
                config.delay_max_ms,
                config.delay_min_ms
            );
        }
        Ok(config)
    }
}
