//! Scheme configuration
//!
//! A scheme binds a channel + game family + play mode to a draw rule, a
//! stake progression and risk limits. Draw-rule and stake configs are tagged
//! unions — the discriminator is explicit and unknown kinds are rejected at
//! deserialization instead of silently defaulting.
//!
//! Runtime sub-state (rule phase, continuation counters, stake cursor) is
//! working memory: `#[serde(skip)]`, reset-safe on restart, never persisted.

use crate::types::{GameFamily, PlayMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One trigger row for the follow-last rule: every token in `when` must be
/// present in the latest result's tags (the wildcard "*" matches anything).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowTrigger {
    pub when: Vec<String>,
    pub bet: Vec<String>,
}

/// What a trend run counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMode {
    /// Consecutive rounds the tag did NOT appear
    Omission,
    /// Consecutive rounds the tag DID appear
    Streak,
}

/// When a multi-tag trend fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Bet every tag whose run reached the threshold
    Any,
    /// Bet only once every monitored tag qualifies, then bet them all
    All,
}

/// What a triggered trend actually bets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendBet {
    /// A fixed token list regardless of which tag triggered
    Fixed { tokens: Vec<String> },
    /// The qualifying tag itself
    Follow,
    /// The game's complement of the qualifying tag
    Reverse,
}

/// One monitor/bet pattern pair over the 0/1 alphabet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternPair {
    pub monitor: String,
    pub bet: String,
}

/// Draw-rule configuration. A closed, enumerated set — not a rule DSL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawRuleConfig {
    /// Always bet the same tokens
    Fixed { tokens: Vec<String> },
    /// Bet according to what the last round's result looked like
    FollowLast { triggers: Vec<FollowTrigger> },
    /// Omission/streak counting over monitored tags
    NumberTrend {
        tags: Vec<String>,
        mode: TrendMode,
        threshold: u32,
        policy: TriggerPolicy,
        bet: TrendBet,
        /// Repeat the triggered bet unconditionally for this many further rounds
        #[serde(default)]
        continue_rounds: u32,
    },
    /// Streak chaser/breaker: first qualifying tag wins, single continuation
    /// counter
    SlayDragon {
        tags: Vec<String>,
        threshold: u32,
        bet: TrendBet,
        #[serde(default)]
        continue_rounds: u32,
    },
    /// Independent monitor/bet pattern pairs, at most one executing
    PatternTrend {
        pairs: Vec<PatternPair>,
        /// Real-world tag the symbol '0' stands for
        zero_means: String,
        /// Real-world tag the symbol '1' stands for
        one_means: String,
        #[serde(default)]
        stop_on_win: bool,
    },
    /// Single monitor pattern branching into win/loss sequences
    BranchTrend {
        monitor: String,
        first_bet: char,
        win_seq: String,
        loss_seq: String,
        zero_means: String,
        one_means: String,
        #[serde(default)]
        stop_on_win: bool,
    },
    /// Every result (re)starts one of two sequences by its symbol
    ResultFollow {
        seq_zero: String,
        seq_one: String,
        zero_means: String,
        one_means: String,
        #[serde(default)]
        stop_on_win: bool,
    },
}

/// Where a sequence-stepping rule currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RulePhase {
    #[default]
    Idle,
    /// PatternTrend: pair index + step into its bet pattern
    Executing { pair: usize, step: usize },
    /// BranchTrend: the one fixed first bet is out
    Initial,
    /// BranchTrend: stepping the win (true) or loss (false) sequence
    Branch { winning: bool, step: usize },
    /// ResultFollow: stepping sequence B (true = triggered by '1') or A
    Following { one: bool, step: usize },
}

/// Draw-rule working memory. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct DrawRuleState {
    /// Single continuation lock for the slay-dragon rule: the bet to repeat
    /// and rounds left
    pub locked_bet: Vec<String>,
    pub remaining: u32,
    /// Per-tag continuation counters for the number-trend rule
    pub tag_locks: HashMap<String, u32>,
    pub phase: RulePhase,
}

impl DrawRuleState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Whether the linear cursor steps forward on a loss (default, loss-chasing)
/// or on a win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceOn {
    #[default]
    Loss,
    Win,
}

/// Stake-progression configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StakeConfig {
    /// Ordered multiplier sequence walked by a cursor
    Linear {
        multipliers: Vec<u32>,
        #[serde(default)]
        advance_on: AdvanceOn,
    },
}

/// Stake working memory. Not persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct StakeState {
    pub cursor: usize,
}

/// Per-scheme stop limits, applied only when no rotation rule covers the
/// scheme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemeRisk {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub stop_profit: Decimal,
    #[serde(default)]
    pub stop_loss: Decimal,
}

/// Running accumulators, real and simulated kept apart. Persisted with the
/// scheme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemeLedger {
    #[serde(default)]
    pub real_profit: Decimal,
    #[serde(default)]
    pub real_turnover: Decimal,
    #[serde(default)]
    pub sim_profit: Decimal,
    #[serde(default)]
    pub sim_turnover: Decimal,
}

impl SchemeLedger {
    pub fn record(&mut self, simulated: bool, net: Decimal, turnover: Decimal) {
        if simulated {
            self.sim_profit += net;
            self.sim_turnover += turnover;
        } else {
            self.real_profit += net;
            self.real_turnover += turnover;
        }
    }
}

/// A user-configured betting scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheme {
    pub id: u32,
    pub name: String,
    pub enabled: bool,
    pub channel_id: i64,
    pub family: GameFamily,
    pub play_mode: PlayMode,
    /// 1-based position selectors for multi-digit games
    #[serde(default)]
    pub positions: Vec<usize>,
    pub base_stake: Decimal,
    /// Simulated schemes never dispatch; orders settle on paper
    #[serde(default)]
    pub simulated: bool,
    pub stake: StakeConfig,
    pub draw_rule: DrawRuleConfig,
    #[serde(default)]
    pub risk: SchemeRisk,
    #[serde(default)]
    pub ledger: SchemeLedger,

    #[serde(skip)]
    pub rule_state: DrawRuleState,
    #[serde(skip)]
    pub stake_state: StakeState,
}

fn pattern_ok(p: &str) -> bool {
    !p.is_empty() && p.chars().all(|c| c == '0' || c == '1')
}

impl Scheme {
    /// Static sanity checks, used by the `check` subcommand before running.
    pub fn validate(&self) -> Result<(), String> {
        match self.play_mode {
            PlayMode::Positional if self.positions.len() != 1 => {
                return Err("positional play mode needs exactly one position selector".into());
            }
            PlayMode::DragonTiger if self.positions.len() != 2 => {
                return Err("dragon/tiger play mode needs exactly two position selectors".into());
            }
            _ => {}
        }
        if self.base_stake <= Decimal::ZERO {
            return Err("base stake must be positive".into());
        }
        match &self.stake {
            StakeConfig::Linear { multipliers, .. } if multipliers.is_empty() => {
                return Err("stake multiplier sequence is empty".into());
            }
            _ => {}
        }
        match &self.draw_rule {
            DrawRuleConfig::Fixed { tokens } if tokens.is_empty() => {
                Err("fixed rule has no tokens".into())
            }
            DrawRuleConfig::FollowLast { triggers } if triggers.is_empty() => {
                Err("follow-last rule has no triggers".into())
            }
            DrawRuleConfig::NumberTrend { tags, threshold, .. }
            | DrawRuleConfig::SlayDragon { tags, threshold, .. } => {
                if tags.is_empty() {
                    Err("trend rule monitors no tags".into())
                } else if *threshold == 0 {
                    Err("trend threshold must be at least 1".into())
                } else {
                    Ok(())
                }
            }
            DrawRuleConfig::PatternTrend { pairs, .. } => {
                if pairs.is_empty() {
                    return Err("pattern rule has no pairs".into());
                }
                for pair in pairs {
                    if !pattern_ok(&pair.monitor) || !pattern_ok(&pair.bet) {
                        return Err(format!(
                            "pattern pair {}/{} must be non-empty strings of 0 and 1",
                            pair.monitor, pair.bet
                        ));
                    }
                }
                Ok(())
            }
            DrawRuleConfig::BranchTrend { monitor, first_bet, win_seq, loss_seq, .. } => {
                if !pattern_ok(monitor) || !pattern_ok(win_seq) || !pattern_ok(loss_seq) {
                    Err("branch patterns must be non-empty strings of 0 and 1".into())
                } else if *first_bet != '0' && *first_bet != '1' {
                    Err("branch first bet must be 0 or 1".into())
                } else {
                    Ok(())
                }
            }
            DrawRuleConfig::ResultFollow { seq_zero, seq_one, .. } => {
                if !pattern_ok(seq_zero) || !pattern_ok(seq_one) {
                    Err("follow sequences must be non-empty strings of 0 and 1".into())
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

/// Test fixture shared across module tests
#[cfg(test)]
pub(crate) fn scheme_with_rule(rule: DrawRuleConfig) -> Scheme {
    use rust_decimal_macros::dec;
    Scheme {
        id: 1,
        name: "test".into(),
        enabled: true,
        channel_id: 1,
        family: GameFamily::Lucky28,
        play_mode: PlayMode::Standard,
        positions: Vec::new(),
        base_stake: dec!(10),
        simulated: true,
        stake: StakeConfig::Linear {
            multipliers: vec![1, 2, 5],
            advance_on: AdvanceOn::Loss,
        },
        draw_rule: rule,
        risk: SchemeRisk::default(),
        ledger: SchemeLedger::default(),
        rule_state: DrawRuleState::default(),
        stake_state: StakeState::default(),
    }
}
