//! Pattern-trend rule
//!
//! A list of independently configured monitor/bet pattern pairs over the 0/1
//! alphabet, at most one executing at a time. Idle: each pair's monitor
//! pattern is compared, most-recent-last, against the translated history of
//! equal length (exact match; an untranslatable entry aborts the comparison
//! for that pair). On a match the pair starts executing and its bet
//! pattern's first symbol is bet. While executing, each round checks the
//! prior bet symbol against the just-revealed result: a win with
//! stop-on-win resets to idle, otherwise the step advances and the next
//! symbol is bet; running off the end of the bet pattern resets to idle.
//! After a reset the rule falls through to idle monitoring in the same call,
//! so a pattern can re-arm immediately.

use super::{meaning, RuleCtx};
use crate::scheme::{DrawRuleState, PatternPair, RulePhase};

pub fn next_bet(
    pairs: &[PatternPair],
    zero: &str,
    one: &str,
    stop_on_win: bool,
    state: &mut DrawRuleState,
    ctx: &RuleCtx<'_>,
) -> Vec<String> {
    if let RulePhase::Executing { pair, step } = state.phase {
        match pairs.get(pair) {
            Some(active) => {
                // An unreadable result holds the step: no bet, no advance
                let Some(latest) = ctx.latest_symbol(zero, one) else {
                    return Vec::new();
                };
                let bet_chars: Vec<char> = active.bet.chars().collect();
                let prior = bet_chars.get(step).copied();
                let won = prior == Some(latest);
                if won && stop_on_win {
                    state.phase = RulePhase::Idle;
                } else {
                    let next = step + 1;
                    if next >= bet_chars.len() {
                        state.phase = RulePhase::Idle;
                    } else {
                        state.phase = RulePhase::Executing { pair, step: next };
                        return vec![meaning(bet_chars[next], zero, one)];
                    }
                }
            }
            // Config changed under us; drop back to monitoring
            None => state.phase = RulePhase::Idle,
        }
    }

    // Idle: first pair whose monitor matches starts executing
    for (index, pair) in pairs.iter().enumerate() {
        if ctx.pattern_matches(&pair.monitor, zero, one) {
            if let Some(first) = pair.bet.chars().next() {
                state.phase = RulePhase::Executing { pair: index, step: 0 };
                return vec![meaning(first, zero, one)];
            }
        }
    }
    Vec::new()
}
