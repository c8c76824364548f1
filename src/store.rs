//! Scheme store
//!
//! The scheme list and global settings persist as one JSON document. The
//! core treats it as load/save of structured records; unknown rule or stake
//! discriminators fail the load rather than silently defaulting. Runtime
//! sub-state is skipped on both paths.

use crate::error::BotError;
use crate::risk::GlobalRisk;
use crate::scheme::Scheme;
use crate::stake::GlobalStake;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Settings that apply across every scheme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default)]
    pub stake: GlobalStake,
    #[serde(default)]
    pub risk: GlobalRisk,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemeStore {
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    #[serde(default)]
    pub settings: GlobalSettings,
}

impl SchemeStore {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BotError::StoreMissing(path.display().to_string()).into());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scheme store {}", path.display()))?;
        let store: Self = serde_json::from_str(&raw).map_err(BotError::StoreInvalid)?;
        info!("[Store] loaded {} scheme(s) from {}", store.schemes.len(), path.display());
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serializing scheme store")?;
        std::fs::write(path, raw)
            .with_context(|| format!("writing scheme store {}", path.display()))?;
        Ok(())
    }

    /// Static validation of every scheme, for the pre-flight check.
    pub fn validate(&self) -> Result<(), BotError> {
        for scheme in &self.schemes {
            scheme
                .validate()
                .map_err(|reason| BotError::SchemeInvalid { id: scheme.id, reason })?;
        }
        Ok(())
    }
}
