//! Number-trend rule
//!
//! Counts a run per monitored tag (omission or streak) from the most recent
//! result backward; a tag qualifies once its run reaches the threshold.
//! Under the ANY policy every qualifying tag is bet; under ALL nothing is
//! bet until every monitored tag qualifies, and then all are. Bet content is
//! a fixed list, the qualifying tags themselves (follow) or their
//! complements (reverse). Multi-round continuation is tracked per tag: a
//! triggered tag repeats its bet for N further rounds without re-evaluating,
//! while the remaining tags keep being evaluated and can trigger alongside
//! a running continuation.

use super::RuleCtx;
use crate::game::complement_set;
use crate::scheme::{DrawRuleState, TrendBet, TrendMode, TriggerPolicy};

pub(super) fn bet_tokens(bet: &TrendBet, triggered: &[String]) -> Vec<String> {
    match bet {
        TrendBet::Fixed { tokens } => tokens.clone(),
        TrendBet::Follow => triggered.to_vec(),
        TrendBet::Reverse => complement_set(triggered),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn next_bet(
    tags: &[String],
    mode: TrendMode,
    threshold: u32,
    policy: TriggerPolicy,
    bet: &TrendBet,
    continue_rounds: u32,
    state: &mut DrawRuleState,
    ctx: &RuleCtx<'_>,
) -> Vec<String> {
    if tags.is_empty() || threshold == 0 {
        return Vec::new();
    }

    // Tags riding an earlier trigger keep betting and skip evaluation;
    // everything else is evaluated fresh
    let mut continuing: Vec<&String> = Vec::new();
    let mut fresh: Vec<&String> = Vec::new();
    for tag in tags {
        if state.tag_locks.get(tag).copied().unwrap_or(0) > 0 {
            continuing.push(tag);
        } else {
            fresh.push(tag);
        }
    }
    for tag in &continuing {
        if let Some(remaining) = state.tag_locks.get_mut(*tag) {
            *remaining -= 1;
            if *remaining == 0 {
                state.tag_locks.remove(*tag);
            }
        }
    }

    let qualifying: Vec<&String> = fresh
        .iter()
        .copied()
        .filter(|tag| ctx.run_len(tag, mode) >= threshold)
        .collect();
    let triggered: Vec<&String> = match policy {
        TriggerPolicy::Any => qualifying,
        TriggerPolicy::All => {
            // Continuing tags already proved themselves; the rest must all
            // qualify together
            if !fresh.is_empty() && qualifying.len() == fresh.len() {
                fresh.clone()
            } else {
                Vec::new()
            }
        }
    };

    let mut tokens: Vec<String> = Vec::new();
    for tag in tags {
        let continued = continuing.iter().any(|t| *t == tag);
        let fired = triggered.iter().any(|t| *t == tag);
        if !continued && !fired {
            continue;
        }
        let per_tag = bet_tokens(bet, std::slice::from_ref(tag));
        if per_tag.is_empty() {
            // Reverse of a tag without a complement fails closed
            continue;
        }
        for token in per_tag {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        if fired && continue_rounds > 0 {
            state.tag_locks.insert(tag.clone(), continue_rounds);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testutil::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_omission_trigger_follow() {
        // Five consecutive non-大 results in a fresh context
        let history = lucky28_history(&[SMALL, SMALL, SMALL, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let mut state = DrawRuleState::default();
        let bet = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            5,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            0,
            &mut state,
            &ctx,
        );
        assert_eq!(bet, vec!["大"]);
    }

    #[test]
    fn test_omission_trigger_reverse() {
        let history = lucky28_history(&[SMALL, SMALL, SMALL, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let mut state = DrawRuleState::default();
        let bet = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            5,
            TriggerPolicy::Any,
            &TrendBet::Reverse,
            0,
            &mut state,
            &ctx,
        );
        assert_eq!(bet, vec!["小"]);
    }

    #[test]
    fn test_below_threshold_no_bet() {
        let history = lucky28_history(&[SMALL, SMALL, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let mut state = DrawRuleState::default();
        let bet = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            5,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            0,
            &mut state,
            &ctx,
        );
        assert!(bet.is_empty());
    }

    #[test]
    fn test_all_policy_requires_every_tag() {
        // 小 and 单 both streak for 3; 大 never appears
        let history = lucky28_history(&[SMALL, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let mut state = DrawRuleState::default();

        // 小 qualifies, 大 does not — ALL bets nothing
        let bet = next_bet(
            &tags(&["小", "大"]),
            TrendMode::Streak,
            3,
            TriggerPolicy::All,
            &TrendBet::Follow,
            0,
            &mut state,
            &ctx,
        );
        assert!(bet.is_empty());

        // Both 小 and 单 qualify — ALL bets all monitored tags
        let bet = next_bet(
            &tags(&["小", "单"]),
            TrendMode::Streak,
            3,
            TriggerPolicy::All,
            &TrendBet::Follow,
            0,
            &mut state,
            &ctx,
        );
        assert_eq!(bet, vec!["小", "单"]);
    }

    #[test]
    fn test_continuation_locks_bet() {
        let history = lucky28_history(&[SMALL, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let mut state = DrawRuleState::default();
        let first = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            3,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            2,
            &mut state,
            &ctx,
        );
        assert_eq!(first, vec!["大"]);
        assert_eq!(state.tag_locks.get("大"), Some(&2));

        // The run is now broken, but the locked bet repeats regardless
        let broken = lucky28_history(&[SMALL, SMALL, SMALL, BIG]);
        let ctx = lucky28_ctx(&broken);
        let second = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            3,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            2,
            &mut state,
            &ctx,
        );
        assert_eq!(second, vec!["大"]);
        let third = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            3,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            2,
            &mut state,
            &ctx,
        );
        assert_eq!(third, vec!["大"]);
        assert!(state.tag_locks.is_empty());

        // Counter exhausted and trigger no longer holds — nothing
        let fourth = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            3,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            2,
            &mut state,
            &ctx,
        );
        assert!(fourth.is_empty());
    }

    #[test]
    fn test_tag_qualifying_mid_continuation_also_bets() {
        // 大 triggers after two straight SMALL and locks for two rounds
        let history = lucky28_history(&[SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let mut state = DrawRuleState::default();
        let first = next_bet(
            &tags(&["大", "单"]),
            TrendMode::Omission,
            2,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            2,
            &mut state,
            &ctx,
        );
        assert_eq!(first, vec!["大"]);

        // 单's omission run is only 1 — the lock alone bets
        let history = lucky28_history(&[SMALL, SMALL, BIG]);
        let ctx = lucky28_ctx(&history);
        let second = next_bet(
            &tags(&["大", "单"]),
            TrendMode::Omission,
            2,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            2,
            &mut state,
            &ctx,
        );
        assert_eq!(second, vec!["大"]);

        // 单 reaches its threshold while 大's continuation is still live:
        // both are bet, and 单 now carries its own counter
        let history = lucky28_history(&[SMALL, SMALL, BIG, BIG]);
        let ctx = lucky28_ctx(&history);
        let third = next_bet(
            &tags(&["大", "单"]),
            TrendMode::Omission,
            2,
            TriggerPolicy::Any,
            &TrendBet::Follow,
            2,
            &mut state,
            &ctx,
        );
        assert_eq!(third, vec!["大", "单"]);
        assert_eq!(state.tag_locks.get("单"), Some(&2));
        assert!(state.tag_locks.get("大").is_none());
    }

    #[test]
    fn test_fixed_bet_content() {
        let history = lucky28_history(&[SMALL, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let mut state = DrawRuleState::default();
        let bet = next_bet(
            &tags(&["大"]),
            TrendMode::Omission,
            3,
            TriggerPolicy::Any,
            &TrendBet::Fixed { tokens: tags(&["豹子"]) },
            0,
            &mut state,
            &ctx,
        );
        assert_eq!(bet, vec!["豹子"]);
    }
}
