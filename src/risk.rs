//! Risk control and scheme rotation
//!
//! Two duties. Before betting, `can_place_bet` gates on the schedule window
//! (which may wrap past midnight) and, when no rotation rules are
//! configured, on global stop-profit/stop-loss/stop-turnover against the
//! aggregate real figures. After each settlement, `process_settlement`
//! either rotates schemes (first matching rule wins, the scheme's own stops
//! never fire) or applies the scheme's independent stop-profit/stop-loss by
//! disabling it in place. Simulated figures never trip any threshold.

use crate::scheme::Scheme;
use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Which side of a scheme's ledger triggers its rotation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateWhen {
    /// Real profit reached the scheme's stop-profit
    Profit,
    /// Real loss reached the scheme's stop-loss
    Loss,
}

/// Hand over from one scheme to another when the source hits its limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationRule {
    pub source: u32,
    pub when: RotateWhen,
    pub target: u32,
}

/// Daily betting window. `start > end` wraps past midnight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Schedule {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Schedule {
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.start <= self.end {
            now >= self.start && now <= self.end
        } else {
            now >= self.start || now <= self.end
        }
    }
}

/// Global risk settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalRisk {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub stop_profit: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub stop_turnover: Option<Decimal>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub rotations: Vec<RotationRule>,
}

/// Whether betting is allowed right now.
pub fn can_place_bet(risk: &GlobalRisk, schemes: &[Scheme], now: NaiveTime) -> bool {
    if let Some(window) = &risk.schedule {
        if !window.contains(now) {
            return false;
        }
    }
    // With rotation rules configured, rotation is the only stop mechanism
    if !risk.enabled || !risk.rotations.is_empty() {
        return true;
    }

    let profit: Decimal = schemes.iter().map(|s| s.ledger.real_profit).sum();
    let turnover: Decimal = schemes.iter().map(|s| s.ledger.real_turnover).sum();

    if let Some(limit) = risk.stop_profit {
        if profit >= limit {
            warn!("[Risk] global stop-profit hit ({} >= {})", profit, limit);
            return false;
        }
    }
    if let Some(limit) = risk.stop_loss {
        if profit <= -limit.abs() {
            warn!("[Risk] global stop-loss hit ({} <= -{})", profit, limit.abs());
            return false;
        }
    }
    if let Some(limit) = risk.stop_turnover {
        if turnover >= limit {
            warn!("[Risk] global stop-turnover hit ({} >= {})", turnover, limit);
            return false;
        }
    }
    true
}

fn rule_fires(rule: &RotationRule, scheme: &Scheme) -> bool {
    match rule.when {
        RotateWhen::Profit => {
            scheme.risk.stop_profit > Decimal::ZERO
                && scheme.ledger.real_profit >= scheme.risk.stop_profit
        }
        RotateWhen::Loss => {
            scheme.risk.stop_loss > Decimal::ZERO
                && scheme.ledger.real_profit <= -scheme.risk.stop_loss.abs()
        }
    }
}

/// Post-settlement hook for one scheme.
///
/// Rotation rules for the scheme, when present, are exclusive: they are
/// evaluated in configured order and the scheme's own stops are skipped
/// entirely. The first firing rule zeroes the source's real accumulators,
/// disables it and enables the target.
pub fn process_settlement(schemes: &mut [Scheme], scheme_id: u32, risk: &GlobalRisk) {
    let rules: Vec<RotationRule> = risk
        .rotations
        .iter()
        .filter(|r| r.source == scheme_id)
        .cloned()
        .collect();

    if !rules.is_empty() {
        for rule in rules {
            let fired = schemes
                .iter()
                .find(|s| s.id == scheme_id)
                .is_some_and(|s| rule_fires(&rule, s));
            if !fired {
                continue;
            }
            if let Some(source) = schemes.iter_mut().find(|s| s.id == scheme_id) {
                source.ledger.real_profit = Decimal::ZERO;
                source.ledger.real_turnover = Decimal::ZERO;
                source.enabled = false;
            }
            if let Some(target) = schemes.iter_mut().find(|s| s.id == rule.target) {
                target.enabled = true;
            } else {
                warn!("[Risk] rotation target scheme {} not found", rule.target);
            }
            info!("[Risk] rotated scheme {} -> {}", scheme_id, rule.target);
            return;
        }
        return;
    }

    // No rotation rules: the scheme's own stops apply, disabling in place
    let Some(scheme) = schemes.iter_mut().find(|s| s.id == scheme_id) else {
        return;
    };
    if !scheme.risk.enabled {
        return;
    }
    let profit = scheme.ledger.real_profit;
    if scheme.risk.stop_profit > Decimal::ZERO && profit >= scheme.risk.stop_profit {
        scheme.enabled = false;
        info!("[Risk] scheme {} stopped on profit {}", scheme_id, profit);
    } else if scheme.risk.stop_loss > Decimal::ZERO && profit <= -scheme.risk.stop_loss.abs() {
        scheme.enabled = false;
        info!("[Risk] scheme {} stopped on loss {}", scheme_id, profit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{scheme_with_rule, DrawRuleConfig};
    use rust_decimal_macros::dec;

    fn scheme(id: u32) -> Scheme {
        let mut s = scheme_with_rule(DrawRuleConfig::Fixed { tokens: vec!["大".into()] });
        s.id = id;
        s
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_schedule_window_wraps_midnight() {
        let window = Schedule { start: time(22, 0), end: time(2, 0) };
        assert!(window.contains(time(23, 30)));
        assert!(window.contains(time(1, 0)));
        assert!(!window.contains(time(12, 0)));

        let plain = Schedule { start: time(9, 0), end: time(17, 0) };
        assert!(plain.contains(time(12, 0)));
        assert!(!plain.contains(time(20, 0)));
    }

    #[test]
    fn test_global_stop_profit_gates() {
        let mut s = scheme(1);
        s.ledger.real_profit = dec!(150);
        let risk = GlobalRisk {
            enabled: true,
            stop_profit: Some(dec!(100)),
            ..Default::default()
        };
        assert!(!can_place_bet(&risk, &[s], time(12, 0)));
    }

    #[test]
    fn test_rotation_rules_disable_global_thresholds() {
        let mut s = scheme(1);
        s.ledger.real_profit = dec!(150);
        let risk = GlobalRisk {
            enabled: true,
            stop_profit: Some(dec!(100)),
            rotations: vec![RotationRule { source: 1, when: RotateWhen::Profit, target: 2 }],
            ..Default::default()
        };
        assert!(can_place_bet(&risk, &[s], time(12, 0)));
    }

    #[test]
    fn test_simulated_profit_never_gates() {
        let mut s = scheme(1);
        s.ledger.sim_profit = dec!(500);
        let risk = GlobalRisk {
            enabled: true,
            stop_profit: Some(dec!(100)),
            ..Default::default()
        };
        assert!(can_place_bet(&risk, &[s], time(12, 0)));
    }

    #[test]
    fn test_rotation_fires_and_is_exclusive() {
        let mut source = scheme(1);
        source.risk.enabled = true;
        source.risk.stop_profit = dec!(100);
        source.ledger.real_profit = dec!(120);
        source.ledger.real_turnover = dec!(400);
        let mut target = scheme(2);
        target.enabled = false;
        let mut schemes = vec![source, target];

        let risk = GlobalRisk {
            rotations: vec![RotationRule { source: 1, when: RotateWhen::Profit, target: 2 }],
            ..Default::default()
        };
        process_settlement(&mut schemes, 1, &risk);

        // Source reset and handed over, not stopped by its own limits
        assert!(!schemes[0].enabled);
        assert_eq!(schemes[0].ledger.real_profit, Decimal::ZERO);
        assert_eq!(schemes[0].ledger.real_turnover, Decimal::ZERO);
        assert!(schemes[1].enabled);
    }

    #[test]
    fn test_first_matching_rotation_wins() {
        let mut source = scheme(1);
        source.risk.stop_profit = dec!(100);
        source.ledger.real_profit = dec!(120);
        let mut schemes = vec![source, scheme(2), scheme(3)];
        schemes[1].enabled = false;
        schemes[2].enabled = false;

        let risk = GlobalRisk {
            rotations: vec![
                RotationRule { source: 1, when: RotateWhen::Profit, target: 2 },
                RotationRule { source: 1, when: RotateWhen::Profit, target: 3 },
            ],
            ..Default::default()
        };
        process_settlement(&mut schemes, 1, &risk);
        assert!(schemes[1].enabled);
        assert!(!schemes[2].enabled);
    }

    #[test]
    fn test_own_stop_loss_disables_in_place() {
        let mut s = scheme(1);
        s.risk.enabled = true;
        s.risk.stop_loss = dec!(50);
        s.ledger.real_profit = dec!(-60);
        let mut schemes = vec![s];
        process_settlement(&mut schemes, 1, &GlobalRisk::default());
        assert!(!schemes[0].enabled);
        // Accumulators untouched without a rotation
        assert_eq!(schemes[0].ledger.real_profit, dec!(-60));
    }
}
