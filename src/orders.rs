//! Order generation and dispatch
//!
//! An order is built the moment a draw rule and the stake engine agree on a
//! bet. Simulated orders go straight to awaiting-draw and never touch the
//! transport. Live orders are recorded first, then delivered after a
//! randomized human-like delay; the shared book is only locked to record
//! outcomes, never across the delay or the send itself. A failed dispatch
//! marks the order failed but keeps it in the book for audit.

use crate::game::adapter_for;
use crate::scheme::Scheme;
use crate::transport::Transport;
use crate::types::{BotStats, GameFamily, Order, OrderStatus};
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Construct an order for a scheme's bet this round.
///
/// Amount is base stake × multiplier × token count. Simulated schemes skip
/// dispatch entirely, so their orders start in awaiting-draw.
pub fn build_order(scheme: &Scheme, round_id: &str, tokens: Vec<String>, multiplier: u32) -> Order {
    let amount =
        scheme.base_stake * Decimal::from(multiplier) * Decimal::from(tokens.len() as u64);
    let status = if scheme.simulated {
        OrderStatus::AwaitingDraw
    } else {
        OrderStatus::Created
    };
    Order {
        id: Uuid::new_v4(),
        channel_id: scheme.channel_id,
        round_id: round_id.to_string(),
        scheme_id: scheme.id,
        family: scheme.family,
        tokens,
        multiplier,
        amount,
        simulated: scheme.simulated,
        status,
        message_id: None,
        result: None,
        payout: None,
        remark: None,
        created_at: Utc::now(),
        sent_at: None,
    }
}

/// The shared order list. Wrapped in one `Mutex` by the engine; every
/// mutation happens inside a single lock scope.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn push(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn find_mut(&mut self, id: Uuid) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// The order a channel reply is confirming, if any.
    pub fn confirmation_target(&mut self, channel_id: i64, reply_to: i64) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| {
            o.channel_id == channel_id
                && o.status == OrderStatus::AwaitingConfirmation
                && o.message_id == Some(reply_to)
        })
    }

    /// Orders still waiting on this channel+round's result.
    pub fn awaiting_draw_mut(&mut self, channel_id: i64, round_id: &str) -> Vec<&mut Order> {
        self.orders
            .iter_mut()
            .filter(|o| {
                o.channel_id == channel_id
                    && o.round_id == round_id
                    && o.status == OrderStatus::AwaitingDraw
            })
            .collect()
    }

    /// Unconfirmed orders whose dispatch is older than `ttl`.
    pub fn stale_unconfirmed_mut(&mut self, ttl: Duration) -> Vec<&mut Order> {
        let now = Utc::now();
        self.orders
            .iter_mut()
            .filter(|o| {
                o.status == OrderStatus::AwaitingConfirmation
                    && o.sent_at.is_some_and(|sent| {
                        (now - sent).to_std().map(|age| age >= ttl).unwrap_or(false)
                    })
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Aggregate view over everything in the book.
    pub fn stats(&self) -> BotStats {
        let mut stats = BotStats::default();
        for order in &self.orders {
            stats.total_orders += 1;
            match order.status {
                OrderStatus::Settled => {
                    stats.settled_orders += 1;
                    let net = order.net().unwrap_or_default();
                    if net > Decimal::ZERO {
                        stats.winning_orders += 1;
                    }
                    if order.simulated {
                        stats.sim_profit += net;
                        stats.sim_turnover += order.amount;
                    } else {
                        stats.real_profit += net;
                        stats.real_turnover += order.amount;
                    }
                }
                OrderStatus::BetFailed => stats.failed_orders += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Delivers live orders through the transport with a randomized pre-send
/// delay.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    delay_min_ms: u64,
    delay_max_ms: u64,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, delay_min_ms: u64, delay_max_ms: u64) -> Self {
        Self { transport, delay_min_ms, delay_max_ms }
    }

    fn pick_delay(&self) -> Duration {
        let lo = self.delay_min_ms;
        let hi = self.delay_max_ms.max(lo);
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }

    /// Deliver one recorded order. The book is locked only to write the
    /// outcome back.
    pub async fn deliver(
        &self,
        book: &Mutex<OrderBook>,
        order_id: Uuid,
        channel_id: i64,
        family: GameFamily,
        tokens: Vec<String>,
        stake_each: Decimal,
    ) {
        let delay = self.pick_delay();
        tokio::time::sleep(delay).await;

        let text = adapter_for(family).format_order(&tokens, stake_each);
        match self.transport.send(channel_id, &text).await {
            Ok(message_id) => {
                let mut book = book.lock().await;
                if let Some(order) = book.find_mut(order_id) {
                    order.status = OrderStatus::AwaitingConfirmation;
                    order.message_id = Some(message_id);
                    order.sent_at = Some(Utc::now());
                    info!(
                        "[Dispatch] order {} sent to channel {} as msg {} ({})",
                        order_id, channel_id, message_id, order.content()
                    );
                }
            }
            Err(e) => {
                let mut book = book.lock().await;
                if let Some(order) = book.find_mut(order_id) {
                    order.status = OrderStatus::BetFailed;
                    order.remark = Some(format!("dispatch failed: {e:#}"));
                    warn!("[Dispatch] order {} failed: {:#}", order_id, e);
                }
            }
        }
    }
}
