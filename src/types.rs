//! Core types for the channel betting bot

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One inbound text message from a monitored channel.
///
/// This is the only thing the core consumes from the chat transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: i64,
    pub sender_id: i64,
    pub message_id: i64,
    /// Set when this message is a reply to one of ours (bet confirmations)
    pub reply_to: Option<i64>,
    pub text: String,
}

/// Game family a channel runs. Determines message patterns, result
/// normalization and order formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameFamily {
    /// Three numbers summed to 0-27, big/small split at 14, triple tag
    Lucky28,
    /// Single digit 0-9, big/small split at 5
    Quick10,
    /// Five-digit draw with position selectors and dragon/tiger head-to-head
    FiveStar,
}

impl fmt::Display for GameFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameFamily::Lucky28 => write!(f, "lucky28"),
            GameFamily::Quick10 => write!(f, "quick10"),
            GameFamily::FiveStar => write!(f, "fivestar"),
        }
    }
}

/// How a scheme reads a raw result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Big/small + odd/even over the whole result (sum or single digit)
    Standard,
    /// One selected position of a multi-digit draw, big/small + odd/even
    Positional,
    /// Two selected positions compared head-to-head: dragon/tiger/tie
    DragonTiger,
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayMode::Standard => write!(f, "standard"),
            PlayMode::Positional => write!(f, "positional"),
            PlayMode::DragonTiger => write!(f, "dragon_tiger"),
        }
    }
}

/// Lifecycle event classified from one inbound channel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Irrelevant, unparseable, or duplicate — dropped without error
    Unknown,
    /// A new round opened for betting
    StartBetting { round_id: String },
    /// The current round closed for betting
    StopBetting,
    /// A result was posted for a round
    LotteryResult { round_id: String, result: String },
}

/// Raw classification of a message before duplicate suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Unknown,
    Start,
    Stop,
    Result,
}

/// Outcome of parsing a reply to one of our bet commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Rejected(String),
}

/// Order lifecycle.
///
/// The two meanings the legacy design packed into one "pending settlement"
/// status are explicit here: `Created` is generated-not-yet-sent,
/// `AwaitingDraw` is confirmed-waiting-for-a-result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Generated, not yet dispatched
    Created,
    /// Dispatched, waiting for the channel to acknowledge
    AwaitingConfirmation,
    /// Acknowledged, waiting for the round's result
    AwaitingDraw,
    /// Result arrived and payout was computed
    Settled,
    /// Dispatch or confirmation failed; remark carries the reason
    BetFailed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Settled | OrderStatus::BetFailed | OrderStatus::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::AwaitingConfirmation => write!(f, "awaiting confirmation"),
            OrderStatus::AwaitingDraw => write!(f, "awaiting draw"),
            OrderStatus::Settled => write!(f, "settled"),
            OrderStatus::BetFailed => write!(f, "failed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One bet order placed (or simulated) for a scheme in a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub channel_id: i64,
    pub round_id: String,
    pub scheme_id: u32,
    pub family: GameFamily,
    /// Bet tokens, e.g. ["大", "单"]
    pub tokens: Vec<String>,
    pub multiplier: u32,
    /// Total stake: base × multiplier × token count
    pub amount: Decimal,
    pub simulated: bool,
    pub status: OrderStatus,
    /// Transport message id of our bet command, for confirmation matching
    pub message_id: Option<i64>,
    /// Raw result once the round is drawn
    pub result: Option<String>,
    pub payout: Option<Decimal>,
    /// Free-text failure reason
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Token list serialized the way it is shown and stored
    pub fn content(&self) -> String {
        self.tokens.join("|")
    }

    /// Net result of a settled order (payout minus stake)
    pub fn net(&self) -> Option<Decimal> {
        self.payout.map(|p| p - self.amount)
    }
}

/// Aggregate performance figures, real and simulated kept apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotStats {
    pub total_orders: i64,
    pub settled_orders: i64,
    pub failed_orders: i64,
    pub winning_orders: i64,
    pub real_profit: Decimal,
    pub real_turnover: Decimal,
    pub sim_profit: Decimal,
    pub sim_turnover: Decimal,
}

impl BotStats {
    pub fn win_rate(&self) -> f64 {
        if self.settled_orders == 0 {
            0.0
        } else {
            (self.winning_orders as f64 / self.settled_orders as f64) * 100.0
        }
    }
}
