//! Result-follow rule
//!
//! Every result acts as a trigger: a result translating to '0' starts
//! sequence A, a '1' starts sequence B. While a sequence is active each
//! round judges the prior step's bet against the just-revealed result. A win
//! with stop-on-win resets to idle; a loss (or a win without stop-on-win)
//! advances to the next character; running off the end resets to idle. After
//! any reset the fresh result is re-evaluated as a trigger in the same call.

use super::{meaning, RuleCtx};
use crate::scheme::{DrawRuleState, RulePhase};

pub fn next_bet(
    seq_zero: &str,
    seq_one: &str,
    zero: &str,
    one: &str,
    stop_on_win: bool,
    state: &mut DrawRuleState,
    ctx: &RuleCtx<'_>,
) -> Vec<String> {
    let latest = ctx.latest_symbol(zero, one);

    if let RulePhase::Following { one: active_one, step } = state.phase {
        // An unreadable result holds the step: no bet, no advance
        let Some(latest) = latest else {
            return Vec::new();
        };
        let seq = if active_one { seq_one } else { seq_zero };
        let prior = seq.chars().nth(step);
        let won = prior == Some(latest);
        if won && stop_on_win {
            state.phase = RulePhase::Idle;
        } else {
            let next = step + 1;
            match seq.chars().nth(next) {
                Some(symbol) => {
                    state.phase = RulePhase::Following { one: active_one, step: next };
                    return vec![meaning(symbol, zero, one)];
                }
                None => state.phase = RulePhase::Idle,
            }
        }
    }

    // Idle: the just-revealed result selects which sequence to start
    let Some(symbol) = latest else {
        return Vec::new();
    };
    let (seq, is_one) = if symbol == '1' {
        (seq_one, true)
    } else {
        (seq_zero, false)
    };
    match seq.chars().next() {
        Some(first) => {
            state.phase = RulePhase::Following { one: is_one, step: 0 };
            vec![meaning(first, zero, one)]
        }
        None => Vec::new(),
    }
}
