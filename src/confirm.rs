//! Confirmation matching
//!
//! Channel replies to our bet commands are correlated by the replied-to
//! message id against orders awaiting confirmation. An acceptance moves the
//! order to awaiting-draw and debits the live balance; a rejection marks it
//! failed with the channel's own words. A periodic sweep demotes orders the
//! channel never answered.

use crate::game::adapter_for;
use crate::orders::OrderBook;
use crate::settlement::GlobalLedger;
use crate::types::{Confirmation, InboundMessage, OrderStatus};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Try to resolve an inbound reply against a pending order. Returns true
/// when an order was updated.
pub async fn handle_reply(
    book: &Mutex<OrderBook>,
    ledger: &Mutex<GlobalLedger>,
    msg: &InboundMessage,
) -> bool {
    let Some(reply_to) = msg.reply_to else {
        return false;
    };

    let debit = {
        let mut book = book.lock().await;
        let Some(order) = book.confirmation_target(msg.channel_id, reply_to) else {
            debug!(
                "[Confirm] reply {} in channel {} matches no pending order",
                reply_to, msg.channel_id
            );
            return false;
        };
        match adapter_for(order.family).parse_confirmation(&msg.text) {
            Some(Confirmation::Accepted) => {
                order.status = OrderStatus::AwaitingDraw;
                info!("[Confirm] order {} accepted ({})", order.id, order.content());
                Some(order.amount)
            }
            Some(Confirmation::Rejected(reason)) => {
                order.status = OrderStatus::BetFailed;
                order.remark = Some(reason.clone());
                warn!("[Confirm] order {} rejected: {}", order.id, reason);
                None
            }
            None => {
                debug!("[Confirm] unreadable reply for order {}: {}", order.id, msg.text);
                return false;
            }
        }
    };

    if let Some(amount) = debit {
        ledger.lock().await.balance -= amount;
    }
    true
}

/// Demote orders stuck awaiting confirmation beyond `ttl`. Returns how many
/// were demoted.
pub async fn sweep_stale(book: &Mutex<OrderBook>, ttl: Duration) -> usize {
    let mut book = book.lock().await;
    let mut demoted = 0;
    for order in book.stale_unconfirmed_mut(ttl) {
        order.status = OrderStatus::BetFailed;
        order.remark = Some("confirmation timeout".into());
        warn!("[Confirm] order {} timed out awaiting confirmation", order.id);
        demoted += 1;
    }
    demoted
}
