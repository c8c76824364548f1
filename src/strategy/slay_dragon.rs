//! Slay-dragon / follow-dragon rule
//!
//! Streak detection and continuation identical to the number-trend rule's
//! streak mode, but over a single monitored tag set with one shared
//! continuation counter: the first qualifying tag in iteration order wins
//! the round and the rest are skipped. Reverse bets break the streak (slay),
//! follow bets ride it.

use super::number_trend::bet_tokens;
use super::RuleCtx;
use crate::scheme::{DrawRuleState, TrendBet, TrendMode};

/// Serve the single locked continuation bet if one is pending. Unlike the
/// number-trend rule's per-tag counters, this rule carries exactly one.
fn continuation(state: &mut DrawRuleState) -> Option<Vec<String>> {
    if state.remaining == 0 {
        return None;
    }
    state.remaining -= 1;
    let bet = state.locked_bet.clone();
    if state.remaining == 0 {
        state.locked_bet.clear();
    }
    Some(bet)
}

pub fn next_bet(
    tags: &[String],
    threshold: u32,
    bet: &TrendBet,
    continue_rounds: u32,
    state: &mut DrawRuleState,
    ctx: &RuleCtx<'_>,
) -> Vec<String> {
    if let Some(locked) = continuation(state) {
        return locked;
    }
    if threshold == 0 {
        return Vec::new();
    }

    // First qualifying tag only
    let Some(hit) = tags
        .iter()
        .find(|tag| ctx.run_len(tag, TrendMode::Streak) >= threshold)
    else {
        return Vec::new();
    };

    let tokens = bet_tokens(bet, std::slice::from_ref(hit));
    if tokens.is_empty() {
        return tokens;
    }
    if continue_rounds > 0 {
        state.locked_bet = tokens.clone();
        state.remaining = continue_rounds;
    }
    tokens
}
