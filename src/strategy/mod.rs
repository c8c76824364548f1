//! Draw-rule strategies
//!
//! Seven interchangeable rules behind one contract: given a scheme's
//! configuration and the channel's history, decide this round's bet tokens
//! (possibly none), mutating only the scheme's runtime sub-state. Called
//! once per start-betting event.
//!
//! Shared edge-case policy: a history entry that cannot be normalized or
//! translated is never silently skipped — it breaks omission/streak runs and
//! aborts pattern comparisons.

pub mod branch_trend;
pub mod fixed;
pub mod follow_last;
pub mod number_trend;
pub mod pattern_trend;
pub mod result_follow;
pub mod slay_dragon;

use crate::game::{adapter_for, GameAdapter};
use crate::history::History;
use crate::scheme::{DrawRuleConfig, Scheme, TrendMode};
use crate::types::PlayMode;

/// Everything a rule needs to read the channel, bundled so the variants
/// share one normalization path.
pub struct RuleCtx<'a> {
    pub(crate) adapter: &'static dyn GameAdapter,
    pub(crate) mode: PlayMode,
    pub(crate) positions: &'a [usize],
    pub(crate) history: &'a History,
}

impl<'a> RuleCtx<'a> {
    pub fn new(scheme: &'a Scheme, history: &'a History) -> Self {
        Self {
            adapter: adapter_for(scheme.family),
            mode: scheme.play_mode,
            positions: &scheme.positions,
            history,
        }
    }

    /// Semantic tags of a raw result under this scheme's play mode
    pub fn tags(&self, raw: &str) -> Vec<String> {
        self.adapter.normalize(raw, self.mode, self.positions)
    }

    /// Translate a raw result into the two-symbol alphabet. `None` when the
    /// result is untranslatable (malformed, or carries neither meaning).
    pub fn translate(&self, raw: &str, zero: &str, one: &str) -> Option<char> {
        let tags = self.tags(raw);
        if tags.iter().any(|t| t == zero) {
            Some('0')
        } else if tags.iter().any(|t| t == one) {
            Some('1')
        } else {
            None
        }
    }

    /// Symbol of the most recent result, if any
    pub fn latest_symbol(&self, zero: &str, one: &str) -> Option<char> {
        self.history
            .latest()
            .and_then(|r| self.translate(&r.raw, zero, one))
    }

    /// The `len` most recent results translated oldest-first, for comparing
    /// against a monitor pattern most-recent-last. `None` when history is
    /// too short or any entry is untranslatable.
    pub fn translated_window(&self, len: usize, zero: &str, one: &str) -> Option<Vec<char>> {
        if len == 0 || self.history.len() < len {
            return None;
        }
        let mut window = Vec::with_capacity(len);
        for record in self.history.iter().take(len) {
            window.push(self.translate(&record.raw, zero, one)?);
        }
        window.reverse();
        Some(window)
    }

    /// Exact match of a monitor pattern against the translated history
    pub fn pattern_matches(&self, pattern: &str, zero: &str, one: &str) -> bool {
        let wanted: Vec<char> = pattern.chars().collect();
        match self.translated_window(wanted.len(), zero, one) {
            Some(window) => window == wanted,
            None => false,
        }
    }

    /// Length of the current run for a tag, counted from the most recent
    /// result backward. Omission counts consecutive non-occurrences, streak
    /// consecutive occurrences; the first entry breaking the run — or an
    /// entry with no tags at all — stops counting.
    pub fn run_len(&self, tag: &str, mode: TrendMode) -> u32 {
        let mut count = 0;
        for record in self.history.iter() {
            let tags = self.tags(&record.raw);
            if tags.is_empty() {
                break;
            }
            let present = tags.iter().any(|t| t == tag);
            let extends = match mode {
                TrendMode::Omission => !present,
                TrendMode::Streak => present,
            };
            if !extends {
                break;
            }
            count += 1;
        }
        count
    }
}

/// The real-world tag a pattern symbol stands for
pub(crate) fn meaning(symbol: char, zero: &str, one: &str) -> String {
    if symbol == '0' { zero.to_string() } else { one.to_string() }
}

/// Evaluate the scheme's draw rule for the round that just opened.
///
/// Mutates the scheme's runtime sub-state; a misconfigured rule returns no
/// bet rather than failing.
pub fn next_bet(scheme: &mut Scheme, history: &History) -> Vec<String> {
    let ctx = RuleCtx {
        adapter: adapter_for(scheme.family),
        mode: scheme.play_mode,
        positions: &scheme.positions,
        history,
    };
    let state = &mut scheme.rule_state;
    match &scheme.draw_rule {
        DrawRuleConfig::Fixed { tokens } => fixed::next_bet(tokens),
        DrawRuleConfig::FollowLast { triggers } => follow_last::next_bet(triggers, &ctx),
        DrawRuleConfig::NumberTrend { tags, mode, threshold, policy, bet, continue_rounds } => {
            number_trend::next_bet(tags, *mode, *threshold, *policy, bet, *continue_rounds, state, &ctx)
        }
        DrawRuleConfig::SlayDragon { tags, threshold, bet, continue_rounds } => {
            slay_dragon::next_bet(tags, *threshold, bet, *continue_rounds, state, &ctx)
        }
        DrawRuleConfig::PatternTrend { pairs, zero_means, one_means, stop_on_win } => {
            pattern_trend::next_bet(pairs, zero_means, one_means, *stop_on_win, state, &ctx)
        }
        DrawRuleConfig::BranchTrend {
            monitor,
            first_bet,
            win_seq,
            loss_seq,
            zero_means,
            one_means,
            stop_on_win,
        } => branch_trend::next_bet(
            monitor, *first_bet, win_seq, loss_seq, zero_means, one_means, *stop_on_win, state, &ctx,
        ),
        DrawRuleConfig::ResultFollow { seq_zero, seq_one, zero_means, one_means, stop_on_win } => {
            result_follow::next_bet(seq_zero, seq_one, zero_means, one_means, *stop_on_win, state, &ctx)
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::history::ResultRecord;
    use crate::types::GameFamily;

    /// Lucky28 history built oldest-first from raw results
    pub fn lucky28_history(raws: &[&str]) -> History {
        let mut history = History::new();
        for (i, raw) in raws.iter().enumerate() {
            history.insert_result(ResultRecord::new(format!("{}", 100 + i), *raw));
        }
        history
    }

    pub fn lucky28_ctx(history: &History) -> RuleCtx<'_> {
        RuleCtx {
            adapter: adapter_for(GameFamily::Lucky28),
            mode: PlayMode::Standard,
            positions: &[],
            history,
        }
    }

    /// A big/even result (sum 18)
    pub const BIG: &str = "5+6+7=18";
    /// A small/odd result (sum 9)
    pub const SMALL: &str = "2+3+4=9";
    /// A result no normalizer can read
    pub const GARBAGE: &str = "void";
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;

    #[test]
    fn test_run_len_omission_and_streak() {
        let history = lucky28_history(&[BIG, SMALL, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        assert_eq!(ctx.run_len("大", TrendMode::Omission), 3);
        assert_eq!(ctx.run_len("小", TrendMode::Streak), 3);
        assert_eq!(ctx.run_len("单", TrendMode::Streak), 3);
    }

    #[test]
    fn test_run_len_stops_at_untranslatable() {
        let history = lucky28_history(&[SMALL, SMALL, GARBAGE, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        // Counting from the newest backward hits the garbage entry after two
        assert_eq!(ctx.run_len("大", TrendMode::Omission), 2);
    }

    #[test]
    fn test_translated_window_most_recent_last() {
        let history = lucky28_history(&[BIG, SMALL, SMALL]);
        let ctx = lucky28_ctx(&history);
        let window = ctx.translated_window(3, "大", "小").unwrap();
        assert_eq!(window, vec!['0', '1', '1']);
        assert!(ctx.pattern_matches("011", "大", "小"));
        assert!(!ctx.pattern_matches("110", "大", "小"));
    }

    #[test]
    fn test_window_aborts_on_untranslatable() {
        let history = lucky28_history(&[BIG, GARBAGE, SMALL]);
        let ctx = lucky28_ctx(&history);
        assert!(ctx.translated_window(3, "大", "小").is_none());
        assert!(!ctx.pattern_matches("011", "大", "小"));
        // Shorter window that avoids the garbage entry still works
        assert!(ctx.translated_window(1, "大", "小").is_some());
    }

    #[test]
    fn test_window_requires_enough_history() {
        let history = lucky28_history(&[BIG]);
        let ctx = lucky28_ctx(&history);
        assert!(ctx.translated_window(2, "大", "小").is_none());
    }
}
