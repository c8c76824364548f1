//! Odds table
//!
//! Externally maintained payout odds per game family and play mode, loaded
//! from a JSON file. Settlement treats a missing entry as odds 0 (the order
//! settles with no payout); the pre-flight check surfaces it as an error
//! instead so a misconfigured scheme is caught before it runs.

use crate::error::BotError;
use crate::types::{GameFamily, PlayMode};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OddsEntry {
    family: GameFamily,
    play_mode: PlayMode,
    odds: Decimal,
}

/// Payout odds keyed by (family, play mode).
#[derive(Debug, Clone)]
pub struct OddsTable {
    entries: HashMap<(GameFamily, PlayMode), Decimal>,
}

impl Default for OddsTable {
    /// The common book: even-money markets paid at 1.98
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert((GameFamily::Lucky28, PlayMode::Standard), dec!(1.98));
        entries.insert((GameFamily::Quick10, PlayMode::Standard), dec!(1.98));
        entries.insert((GameFamily::FiveStar, PlayMode::Positional), dec!(1.98));
        entries.insert((GameFamily::FiveStar, PlayMode::DragonTiger), dec!(1.98));
        Self { entries }
    }
}

impl OddsTable {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading odds table {}", path.display()))?;
        let list: Vec<OddsEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing odds table {}", path.display()))?;
        let entries = list
            .into_iter()
            .map(|e| ((e.family, e.play_mode), e.odds))
            .collect();
        Ok(Self { entries })
    }

    /// Odds for settlement. Missing entries pay nothing.
    pub fn get(&self, family: GameFamily, play_mode: PlayMode) -> Decimal {
        match self.entries.get(&(family, play_mode)) {
            Some(odds) => *odds,
            None => {
                warn!("[Odds] no entry for {} / {}, paying 0", family, play_mode);
                Decimal::ZERO
            }
        }
    }

    /// Strict lookup for the pre-flight check.
    pub fn require(&self, family: GameFamily, play_mode: PlayMode) -> Result<Decimal, BotError> {
        self.entries
            .get(&(family, play_mode))
            .copied()
            .ok_or_else(|| BotError::OddsMissing {
                family: family.to_string(),
                play_mode: play_mode.to_string(),
            })
    }
}
