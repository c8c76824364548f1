//! Follow-last rule
//!
//! Normalize the most recent result and walk the configured trigger list in
//! order. A trigger matches when every one of its required tokens is present
//! in the tag set (AND semantics); a trigger containing the wildcard "*"
//! anywhere matches unconditionally. The first matching trigger's bet wins.

use super::RuleCtx;
use crate::scheme::FollowTrigger;

pub fn next_bet(triggers: &[FollowTrigger], ctx: &RuleCtx<'_>) -> Vec<String> {
    let Some(latest) = ctx.history.latest() else {
        return Vec::new();
    };
    let tags = ctx.tags(&latest.raw);
    if tags.is_empty() {
        return Vec::new();
    }
    for trigger in triggers {
        if trigger.when.is_empty() {
            continue;
        }
        // A wildcard anywhere in the token set matches unconditionally
        let matches = trigger.when.iter().any(|t| t == "*")
            || trigger
                .when
                .iter()
                .all(|required| tags.iter().any(|t| t == required));
        if matches {
            return trigger.bet.clone();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testutil::*;

    fn trigger(when: &[&str], bet: &[&str]) -> FollowTrigger {
        FollowTrigger {
            when: when.iter().map(|s| s.to_string()).collect(),
            bet: bet.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_first_matching_trigger_wins() {
        let history = lucky28_history(&[BIG]);
        let ctx = lucky28_ctx(&history);
        let triggers = vec![
            trigger(&["小"], &["大"]),
            trigger(&["大", "双"], &["小", "单"]),
            trigger(&["大"], &["单"]),
        ];
        // BIG normalizes to {大, 双}; the second trigger is the first match
        assert_eq!(next_bet(&triggers, &ctx), vec!["小", "单"]);
    }

    #[test]
    fn test_and_semantics() {
        let history = lucky28_history(&[BIG]);
        let ctx = lucky28_ctx(&history);
        // 大 present but 单 is not — no match
        let triggers = vec![trigger(&["大", "单"], &["小"])];
        assert!(next_bet(&triggers, &ctx).is_empty());
    }

    #[test]
    fn test_wildcard_beside_other_tokens_short_circuits() {
        let history = lucky28_history(&[BIG]);
        let ctx = lucky28_ctx(&history);
        // 单 is absent from {大, 双}, but the wildcard overrides the AND fold
        let triggers = vec![trigger(&["单", "*"], &["小"])];
        assert_eq!(next_bet(&triggers, &ctx), vec!["小"]);
    }

    #[test]
    fn test_wildcard_matches_anything() {
        let history = lucky28_history(&[SMALL]);
        let ctx = lucky28_ctx(&history);
        let triggers = vec![trigger(&["*"], &["豹子"])];
        assert_eq!(next_bet(&triggers, &ctx), vec!["豹子"]);
    }

    #[test]
    fn test_no_history_or_untranslatable_bets_nothing() {
        let empty = lucky28_history(&[]);
        let ctx = lucky28_ctx(&empty);
        assert!(next_bet(&[trigger(&["*"], &["大"])], &ctx).is_empty());

        let garbage = lucky28_history(&[GARBAGE]);
        let ctx = lucky28_ctx(&garbage);
        assert!(next_bet(&[trigger(&["*"], &["大"])], &ctx).is_empty());
    }
}
