//! Settlement
//!
//! On a result event, every order still awaiting the draw for that
//! channel+round is judged: the result is normalized under the owning
//! scheme's play mode, the order's tokens are counted against the tag set,
//! and payout = win count × multiplier × odds × base stake. Ledger updates
//! (scheme and global, split real/simulated), the stake-cursor advance and
//! the risk hook all happen inside the same lock scope. One order's problem
//! never blocks its siblings.

use crate::game::adapter_for;
use crate::odds::OddsTable;
use crate::orders::OrderBook;
use crate::risk::{self, GlobalRisk};
use crate::scheme::Scheme;
use crate::stake;
use crate::types::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Process-wide running figures. The balance moves on confirmation (stake
/// out) and on real settlement (payout in); profit and turnover move only
/// here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalLedger {
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub real_profit: Decimal,
    #[serde(default)]
    pub real_turnover: Decimal,
    #[serde(default)]
    pub sim_profit: Decimal,
    #[serde(default)]
    pub sim_turnover: Decimal,
}

impl GlobalLedger {
    pub fn record(&mut self, simulated: bool, net: Decimal, turnover: Decimal) {
        if simulated {
            self.sim_profit += net;
            self.sim_turnover += turnover;
        } else {
            self.real_profit += net;
            self.real_turnover += turnover;
        }
    }

    /// The running profit figure matching a scheme's simulation flag.
    pub fn profit(&self, simulated: bool) -> Decimal {
        if simulated { self.sim_profit } else { self.real_profit }
    }
}

/// Settle all open orders for a drawn round. Returns how many settled.
pub async fn settle_round(
    channel_id: i64,
    round_id: &str,
    raw_result: &str,
    book: &Mutex<OrderBook>,
    schemes: &Mutex<Vec<Scheme>>,
    ledger: &Mutex<GlobalLedger>,
    odds: &OddsTable,
    risk_cfg: &GlobalRisk,
) -> usize {
    let mut schemes = schemes.lock().await;
    let mut book = book.lock().await;
    let mut ledger = ledger.lock().await;

    let mut settled_schemes: Vec<u32> = Vec::new();
    let mut settled = 0;

    for order in book.awaiting_draw_mut(channel_id, round_id) {
        let Some(scheme) = schemes.iter_mut().find(|s| s.id == order.scheme_id) else {
            warn!(
                "[Settle] order {} references missing scheme {}, cancelling",
                order.id, order.scheme_id
            );
            order.status = OrderStatus::Cancelled;
            order.remark = Some("scheme no longer exists".into());
            continue;
        };

        let tags = adapter_for(order.family).normalize(
            raw_result,
            scheme.play_mode,
            &scheme.positions,
        );
        if tags.is_empty() {
            warn!("[Settle] result '{}' unreadable for order {}", raw_result, order.id);
        }
        let win_count = order.tokens.iter().filter(|t| tags.contains(t)).count();
        let payout = Decimal::from(win_count as u64)
            * Decimal::from(order.multiplier)
            * odds.get(order.family, scheme.play_mode)
            * scheme.base_stake;
        let net = payout - order.amount;

        order.status = OrderStatus::Settled;
        order.result = Some(raw_result.to_string());
        order.payout = Some(payout);
        info!(
            "[Settle] order {} round {} {}: {}/{} tokens hit, payout {}, net {}",
            order.id, round_id, order.content(), win_count, order.tokens.len(), payout, net
        );

        scheme.ledger.record(order.simulated, net, order.amount);
        ledger.record(order.simulated, net, order.amount);
        if !order.simulated {
            ledger.balance += payout;
        }
        stake::update_state(scheme, net > Decimal::ZERO);

        if !settled_schemes.contains(&scheme.id) {
            settled_schemes.push(scheme.id);
        }
        settled += 1;
    }

    for scheme_id in settled_schemes {
        risk::process_settlement(&mut schemes, scheme_id, risk_cfg);
    }
    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::build_order;
    use crate::scheme::{scheme_with_rule, DrawRuleConfig};
    use rust_decimal_macros::dec;

    fn fixture(base_stake: Decimal) -> Scheme {
        let mut scheme = scheme_with_rule(DrawRuleConfig::Fixed {
            tokens: vec!["大".into(), "单".into()],
        });
        scheme.base_stake = base_stake;
        scheme
    }

    async fn settle_one(
        scheme: Scheme,
        tokens: Vec<String>,
        multiplier: u32,
        raw_result: &str,
    ) -> (Vec<Scheme>, OrderBook, GlobalLedger) {
        let mut order = build_order(&scheme, "100", tokens, multiplier);
        order.status = OrderStatus::AwaitingDraw;
        let channel_id = scheme.channel_id;

        let book = Mutex::new(OrderBook::default());
        book.lock().await.push(order);
        let schemes = Mutex::new(vec![scheme]);
        let ledger = Mutex::new(GlobalLedger::default());

        let n = settle_round(
            channel_id,
            "100",
            raw_result,
            &book,
            &schemes,
            &ledger,
            &OddsTable::default(),
            &GlobalRisk::default(),
        )
        .await;
        assert_eq!(n, 1);
        (schemes.into_inner(), book.into_inner(), ledger.into_inner())
    }

    #[tokio::test]
    async fn test_two_token_win_arithmetic() {
        // 3+5+9=17: sum 17 is big and odd, both tokens hit
        let scheme = fixture(dec!(1));
        let (schemes, book, ledger) =
            settle_one(scheme, vec!["大".into(), "单".into()], 3, "3+5+9=17").await;

        let order = book.iter().next().unwrap();
        assert_eq!(order.status, OrderStatus::Settled);
        // 2 hits × multiplier 3 × odds 1.98 × base 1
        assert_eq!(order.payout, Some(dec!(11.88)));
        // amount was 1 × 3 × 2 = 6
        assert_eq!(order.net(), Some(dec!(5.88)));
        assert_eq!(ledger.sim_profit, dec!(5.88));
        assert_eq!(ledger.sim_turnover, dec!(6));
        assert_eq!(schemes[0].ledger.sim_profit, dec!(5.88));
        // A win resets the stake cursor
        assert_eq!(schemes[0].stake_state.cursor, 0);
    }

    #[tokio::test]
    async fn test_loss_advances_stake_cursor() {
        // 2+3+4=9: small and odd, the 大 token misses
        let scheme = fixture(dec!(10));
        let (schemes, book, _) = settle_one(scheme, vec!["大".into()], 1, "2+3+4=9").await;
        let order = book.iter().next().unwrap();
        assert_eq!(order.payout, Some(Decimal::ZERO));
        assert_eq!(order.net(), Some(dec!(-10)));
        assert_eq!(schemes[0].stake_state.cursor, 1);
    }

    #[tokio::test]
    async fn test_real_settlement_credits_balance() {
        let mut scheme = fixture(dec!(1));
        scheme.simulated = false;
        let (_, _, ledger) = settle_one(scheme, vec!["大".into()], 1, "3+5+9=17").await;
        assert_eq!(ledger.real_profit, dec!(0.98));
        assert_eq!(ledger.balance, dec!(1.98));
        assert_eq!(ledger.sim_profit, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_orphan_order_cancelled_sibling_settles() {
        let scheme = fixture(dec!(1));
        let mut orphan = build_order(&scheme, "100", vec!["大".into()], 1);
        orphan.status = OrderStatus::AwaitingDraw;
        orphan.scheme_id = 999;
        let mut good = build_order(&scheme, "100", vec!["大".into()], 1);
        good.status = OrderStatus::AwaitingDraw;
        let good_id = good.id;

        let book = Mutex::new(OrderBook::default());
        {
            let mut b = book.lock().await;
            b.push(orphan);
            b.push(good);
        }
        let channel_id = scheme.channel_id;
        let schemes = Mutex::new(vec![scheme]);
        let ledger = Mutex::new(GlobalLedger::default());

        let n = settle_round(
            channel_id,
            "100",
            "3+5+9=17",
            &book,
            &schemes,
            &ledger,
            &OddsTable::default(),
            &GlobalRisk::default(),
        )
        .await;
        assert_eq!(n, 1);

        let book = book.into_inner();
        let statuses: Vec<_> = book.iter().map(|o| (o.id, o.status)).collect();
        assert!(statuses.contains(&(good_id, OrderStatus::Settled)));
        assert!(statuses.iter().any(|(_, s)| *s == OrderStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_already_settled_round_is_a_noop() {
        let scheme = fixture(dec!(1));
        let (schemes, book, ledger) = settle_one(scheme, vec!["大".into()], 1, "3+5+9=17").await;

        let book = Mutex::new(book);
        let schemes = Mutex::new(schemes);
        let ledger = Mutex::new(ledger);
        let n = settle_round(
            1,
            "100",
            "3+5+9=17",
            &book,
            &schemes,
            &ledger,
            &OddsTable::default(),
            &GlobalRisk::default(),
        )
        .await;
        assert_eq!(n, 0);
    }
}
