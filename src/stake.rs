//! Stake progression
//!
//! Scheme-local progression walks an ordered multiplier sequence with a
//! cursor: read the multiplier at the cursor before betting, then on
//! settlement advance it one step on a loss and reset it on a win (or the
//! inverse under the win-advance policy). A cursor that ran off the sequence
//! (config shortened underneath it) recovers by wrapping to the start.
//!
//! The global override, when enabled, ignores all scheme-local cursors and
//! picks the multiplier from a threshold table keyed by the magnitude of the
//! running global profit/loss.

use crate::scheme::{AdvanceOn, Scheme, StakeConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which sign of the global ledger the override table reacts to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeDirection {
    #[default]
    Profit,
    Loss,
}

/// One override row: applies once the ledger magnitude reaches `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeTier {
    pub threshold: Decimal,
    pub multiplier: u32,
}

/// Global multiplier override. Disabled by default; when enabled every
/// scheme bets the table multiplier instead of its own progression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalStake {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub direction: StakeDirection,
    /// Fallback when no tier matches or the ledger sign disagrees
    #[serde(default)]
    pub base: u32,
    #[serde(default)]
    pub table: Vec<StakeTier>,
}

impl GlobalStake {
    /// Table lookup against the current global profit/loss. The highest
    /// threshold not exceeding the magnitude wins; a sign mismatch with the
    /// configured direction falls back to the base multiplier.
    fn lookup(&self, global_pl: Decimal) -> u32 {
        let sign_ok = match self.direction {
            StakeDirection::Profit => global_pl > Decimal::ZERO,
            StakeDirection::Loss => global_pl < Decimal::ZERO,
        };
        if !sign_ok {
            return self.base;
        }
        let magnitude = global_pl.abs();
        self.table
            .iter()
            .filter(|tier| tier.threshold <= magnitude)
            .max_by_key(|tier| tier.threshold)
            .map(|tier| tier.multiplier)
            .unwrap_or(self.base)
    }
}

/// The multiplier to bet this round. `global_pl` is the running global
/// profit/loss matching the scheme's simulation flag.
pub fn next_multiplier(scheme: &mut Scheme, global: &GlobalStake, global_pl: Decimal) -> u32 {
    if global.enabled {
        return global.lookup(global_pl);
    }
    let StakeConfig::Linear { multipliers, .. } = &scheme.stake;
    if multipliers.is_empty() {
        return 0;
    }
    if scheme.stake_state.cursor >= multipliers.len() {
        warn!(
            "[Stake] scheme {} cursor {} out of range, wrapping to start",
            scheme.id, scheme.stake_state.cursor
        );
        scheme.stake_state.cursor = 0;
    }
    multipliers[scheme.stake_state.cursor]
}

/// Advance the scheme's cursor after settlement. `won` means the order
/// netted a profit.
pub fn update_state(scheme: &mut Scheme, won: bool) {
    let StakeConfig::Linear { advance_on, .. } = &scheme.stake;
    let advance = match advance_on {
        AdvanceOn::Loss => !won,
        AdvanceOn::Win => won,
    };
    if advance {
        scheme.stake_state.cursor += 1;
    } else {
        scheme.stake_state.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{scheme_with_rule, DrawRuleConfig};
    use rust_decimal_macros::dec;

    fn scheme_with_multipliers(multipliers: Vec<u32>) -> Scheme {
        let mut scheme = scheme_with_rule(DrawRuleConfig::Fixed { tokens: vec!["大".into()] });
        scheme.stake = StakeConfig::Linear { multipliers, advance_on: AdvanceOn::Loss };
        scheme
    }

    #[test]
    fn test_linear_progression_default_policy() {
        let mut scheme = scheme_with_multipliers(vec![10, 20, 50]);
        let off = GlobalStake::default();

        assert_eq!(next_multiplier(&mut scheme, &off, Decimal::ZERO), 10);
        update_state(&mut scheme, false);
        assert_eq!(scheme.stake_state.cursor, 1);
        assert_eq!(next_multiplier(&mut scheme, &off, Decimal::ZERO), 20);
        update_state(&mut scheme, true);
        assert_eq!(scheme.stake_state.cursor, 0);
        assert_eq!(next_multiplier(&mut scheme, &off, Decimal::ZERO), 10);
    }

    #[test]
    fn test_win_advance_policy_inverts() {
        let mut scheme = scheme_with_multipliers(vec![1, 2]);
        scheme.stake = StakeConfig::Linear { multipliers: vec![1, 2], advance_on: AdvanceOn::Win };
        update_state(&mut scheme, true);
        assert_eq!(scheme.stake_state.cursor, 1);
        update_state(&mut scheme, false);
        assert_eq!(scheme.stake_state.cursor, 0);
    }

    #[test]
    fn test_out_of_range_cursor_wraps() {
        let mut scheme = scheme_with_multipliers(vec![10, 20]);
        scheme.stake_state.cursor = 7;
        let off = GlobalStake::default();
        assert_eq!(next_multiplier(&mut scheme, &off, Decimal::ZERO), 10);
        assert_eq!(scheme.stake_state.cursor, 0);
    }

    #[test]
    fn test_global_override_highest_threshold() {
        let mut scheme = scheme_with_multipliers(vec![10]);
        let global = GlobalStake {
            enabled: true,
            direction: StakeDirection::Loss,
            base: 1,
            table: vec![
                StakeTier { threshold: dec!(50), multiplier: 2 },
                StakeTier { threshold: dec!(100), multiplier: 4 },
                StakeTier { threshold: dec!(200), multiplier: 8 },
            ],
        };
        // Down 120: the 100 tier is the highest not exceeding the magnitude
        assert_eq!(next_multiplier(&mut scheme, &global, dec!(-120)), 4);
        // Down 10: below every tier, base applies
        assert_eq!(next_multiplier(&mut scheme, &global, dec!(-10)), 1);
    }

    #[test]
    fn test_global_override_direction_mismatch() {
        let mut scheme = scheme_with_multipliers(vec![10]);
        let global = GlobalStake {
            enabled: true,
            direction: StakeDirection::Profit,
            base: 3,
            table: vec![StakeTier { threshold: dec!(50), multiplier: 9 }],
        };
        // Profit-triggered table while the ledger is negative: base
        assert_eq!(next_multiplier(&mut scheme, &global, dec!(-80)), 3);
        assert_eq!(next_multiplier(&mut scheme, &global, dec!(80)), 9);
    }
}
