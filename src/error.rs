//! Typed errors for configuration and store handling

use thiserror::Error;

/// Domain errors that callers may want to match on.
///
/// Strategy evaluation never surfaces these — a bad scheme fails closed and
/// returns no bet. These are for the load/validate paths where the process
/// genuinely cannot continue.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("scheme store not found at {0}")]
    StoreMissing(String),

    #[error("scheme store is malformed: {0}")]
    StoreInvalid(#[from] serde_json::Error),

    #[error("scheme {id}: {reason}")]
    SchemeInvalid { id: u32, reason: String },

    #[error("no odds configured for {family} / {play_mode}")]
    OddsMissing { family: String, play_mode: String },
}
