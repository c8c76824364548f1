//! Branch-trend rule
//!
//! Single-sequence variant of the pattern rule with three phases. Idle
//! monitors one fixed pattern; a match places one fixed first bet. The next
//! result decides the branch: the win sequence or the loss sequence, entered
//! at index 0. From then on each round re-evaluates the prior step: an
//! outcome matching the active branch advances it, the opposite outcome
//! switches to the other sequence at index 0, and exhausting the active
//! sequence returns to idle. Stop-on-win resets to idle from any phase.

use super::{meaning, RuleCtx};
use crate::scheme::{DrawRuleState, RulePhase};

fn nth(seq: &str, index: usize) -> Option<char> {
    seq.chars().nth(index)
}

#[allow(clippy::too_many_arguments)]
pub fn next_bet(
    monitor: &str,
    first_bet: char,
    win_seq: &str,
    loss_seq: &str,
    zero: &str,
    one: &str,
    stop_on_win: bool,
    state: &mut DrawRuleState,
    ctx: &RuleCtx<'_>,
) -> Vec<String> {
    let latest = ctx.latest_symbol(zero, one);
    // An unreadable result holds the current phase: no bet, no judging
    if latest.is_none() && state.phase != RulePhase::Idle {
        return Vec::new();
    }

    match state.phase {
        RulePhase::Initial => {
            let won = latest == Some(first_bet);
            if won && stop_on_win {
                state.phase = RulePhase::Idle;
            } else {
                let seq = if won { win_seq } else { loss_seq };
                match nth(seq, 0) {
                    Some(symbol) => {
                        state.phase = RulePhase::Branch { winning: won, step: 0 };
                        return vec![meaning(symbol, zero, one)];
                    }
                    None => state.phase = RulePhase::Idle,
                }
            }
        }
        RulePhase::Branch { winning, step } => {
            let seq = if winning { win_seq } else { loss_seq };
            let prior = nth(seq, step);
            let won = prior.is_some() && latest == prior;
            if won && stop_on_win {
                state.phase = RulePhase::Idle;
            } else if won == winning {
                // Outcome matches the active branch: advance it
                let next = step + 1;
                match nth(seq, next) {
                    Some(symbol) => {
                        state.phase = RulePhase::Branch { winning, step: next };
                        return vec![meaning(symbol, zero, one)];
                    }
                    None => state.phase = RulePhase::Idle,
                }
            } else {
                // Opposite outcome: switch to the other sequence
                let other = if won { win_seq } else { loss_seq };
                match nth(other, 0) {
                    Some(symbol) => {
                        state.phase = RulePhase::Branch { winning: won, step: 0 };
                        return vec![meaning(symbol, zero, one)];
                    }
                    None => state.phase = RulePhase::Idle,
                }
            }
        }
        _ => {}
    }

    // Idle: re-arm the monitor
    if ctx.pattern_matches(monitor, zero, one) {
        state.phase = RulePhase::Initial;
        return vec![meaning(first_bet, zero, one)];
    }
    Vec::new()
}
