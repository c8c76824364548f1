//! Game-family adapters
//!
//! One fixed lifecycle engine lives in `context.rs`; everything that varies
//! per game family sits behind the `GameAdapter` capability trait: message
//! classification, round id / result extraction, result normalization into
//! semantic tags, order command formatting and confirmation parsing.
//! Implementations are selected through `adapter_for`, keyed by family.

pub mod fivestar;
pub mod lucky28;
pub mod quick10;

pub use fivestar::FiveStar;
pub use lucky28::Lucky28;
pub use quick10::Quick10;

use crate::types::{Confirmation, GameFamily, MessageKind, PlayMode};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

/// Capability interface implemented once per game family.
pub trait GameAdapter: Send + Sync {
    fn family(&self) -> GameFamily;

    /// Classify one inbound text. Field extraction happens separately so the
    /// lifecycle engine can apply duplicate suppression before acting.
    fn classify(&self, text: &str) -> MessageKind;

    /// Round id from a start-betting notice
    fn extract_round_id(&self, text: &str) -> Option<String>;

    /// (round id, canonical raw result) from a result notice
    fn extract_result(&self, text: &str) -> Option<(String, String)>;

    /// Map a raw result to semantic tags for the given play mode and
    /// position selectors. Total and deterministic: malformed input or a
    /// selector mismatch yields an empty set, never an error.
    fn normalize(&self, raw: &str, mode: PlayMode, positions: &[usize]) -> Vec<String>;

    /// Render the outbound bet command. `stake_each` is the per-token stake
    /// (base × multiplier).
    fn format_order(&self, tokens: &[String], stake_each: Decimal) -> String {
        format_tokens(tokens, stake_each)
    }

    /// Parse a reply to one of our bet commands
    fn parse_confirmation(&self, text: &str) -> Option<Confirmation> {
        default_confirmation(text)
    }
}

static LUCKY28: Lucky28 = Lucky28;
static QUICK10: Quick10 = Quick10;
static FIVESTAR: FiveStar = FiveStar;

/// Registry lookup, keyed by game family
pub fn adapter_for(family: GameFamily) -> &'static dyn GameAdapter {
    match family {
        GameFamily::Lucky28 => &LUCKY28,
        GameFamily::Quick10 => &QUICK10,
        GameFamily::FiveStar => &FIVESTAR,
    }
}

/// The opposite tag for reverse betting. Tags without a two-sided
/// complement (triple, tie) have none.
pub fn complement(tag: &str) -> Option<&'static str> {
    match tag {
        "大" => Some("小"),
        "小" => Some("大"),
        "单" => Some("双"),
        "双" => Some("单"),
        "龙" => Some("虎"),
        "虎" => Some("龙"),
        _ => None,
    }
}

/// Complements of every tag that has one, preserving order
pub fn complement_set(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|t| complement(t).map(str::to_string))
        .collect()
}

/// Synonym table used when rendering bet commands, so outbound text varies
/// between rounds.
fn synonym(tag: &str) -> String {
    let choices: &[&str] = match tag {
        "大" => &["大", "da"],
        "小" => &["小", "xiao"],
        "单" => &["单", "dan"],
        "双" => &["双", "shuang"],
        "龙" => &["龙", "long"],
        "虎" => &["虎", "hu"],
        "和" => &["和", "he"],
        "豹子" => &["豹子", "bz"],
        other => return other.to_string(),
    };
    choices
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(tag)
        .to_string()
}

/// Default command rendering: "<token><stake>" pairs joined by spaces,
/// e.g. "大100 单100".
pub(crate) fn format_tokens(tokens: &[String], stake_each: Decimal) -> String {
    tokens
        .iter()
        .map(|t| format!("{}{}", synonym(t), stake_each))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shared confirmation grammar: channels ack with a success or failure
/// phrase in the reply. Anything else is not a confirmation.
pub(crate) fn default_confirmation(text: &str) -> Option<Confirmation> {
    if text.contains("成功") || text.contains("已接单") {
        Some(Confirmation::Accepted)
    } else if text.contains("失败") || text.contains("余额不足") || text.contains("未接单") {
        Some(Confirmation::Rejected(text.trim().to_string()))
    } else {
        None
    }
}

/// Big/small and odd/even tags for a single digit with the given midpoint
/// (digit >= midpoint counts as big).
pub(crate) fn digit_tags(digit: u32, midpoint: u32) -> Vec<String> {
    let mut tags = Vec::with_capacity(2);
    tags.push(if digit >= midpoint { "大" } else { "小" }.to_string());
    tags.push(if digit % 2 == 1 { "单" } else { "双" }.to_string());
    tags
}
