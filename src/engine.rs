//! Event routing and channel workers
//!
//! One serialized worker per channel: each worker owns its game context and
//! processes that channel's messages strictly in arrival order, while
//! channels run independently. Workers are created lazily, on the first
//! message from a channel that has an enabled scheme. Confirmation replies
//! bypass the lifecycle path entirely and go straight to the matcher.
//!
//! The pre-dispatch delay runs in spawned tasks so one channel's wait never
//! stalls another channel's round.

use crate::config::Config;
use crate::confirm;
use crate::context::ChannelGameContext;
use crate::history::History;
use crate::odds::OddsTable;
use crate::orders::{build_order, Dispatcher, OrderBook};
use crate::risk;
use crate::settlement::{self, GlobalLedger};
use crate::stake;
use crate::store::{GlobalSettings, SchemeStore};
use crate::strategy;
use crate::transport::Transport;
use crate::types::{BotStats, GameEvent, GameFamily, InboundMessage};
use chrono::Local;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// State every worker and background task hangs on to.
#[derive(Clone)]
struct Shared {
    schemes: Arc<Mutex<Vec<crate::scheme::Scheme>>>,
    book: Arc<Mutex<OrderBook>>,
    ledger: Arc<Mutex<GlobalLedger>>,
    odds: Arc<OddsTable>,
    settings: Arc<GlobalSettings>,
    dispatcher: Arc<Dispatcher>,
}

/// Evaluate every enabled scheme on this channel for a freshly opened round
/// and fire off the resulting orders.
async fn open_round(shared: &Shared, channel_id: i64, round_id: &str, history: &History) {
    let (real_profit, sim_profit) = {
        let ledger = shared.ledger.lock().await;
        (ledger.profit(false), ledger.profit(true))
    };

    struct Job {
        order_id: uuid::Uuid,
        family: GameFamily,
        tokens: Vec<String>,
        stake_each: Decimal,
    }
    let mut orders = Vec::new();
    let mut jobs: Vec<Job> = Vec::new();

    {
        let mut schemes = shared.schemes.lock().await;
        if !risk::can_place_bet(&shared.settings.risk, &schemes, Local::now().time()) {
            info!("[Round] channel {} round {}: betting gated off", channel_id, round_id);
            return;
        }
        for scheme in schemes
            .iter_mut()
            .filter(|s| s.enabled && s.channel_id == channel_id)
        {
            let tokens = strategy::next_bet(scheme, history);
            if tokens.is_empty() {
                continue;
            }
            let global_pl = if scheme.simulated { sim_profit } else { real_profit };
            let multiplier = stake::next_multiplier(scheme, &shared.settings.stake, global_pl);
            if multiplier == 0 {
                debug!("[Round] scheme {} multiplier 0, skipping", scheme.id);
                continue;
            }
            let order = build_order(scheme, round_id, tokens.clone(), multiplier);
            info!(
                "[Round] scheme {} round {} bets {} x{} for {}{}",
                scheme.id,
                round_id,
                order.content(),
                multiplier,
                order.amount,
                if scheme.simulated { " (paper)" } else { "" }
            );
            if !scheme.simulated {
                jobs.push(Job {
                    order_id: order.id,
                    family: scheme.family,
                    tokens,
                    stake_each: scheme.base_stake * Decimal::from(multiplier),
                });
            }
            orders.push(order);
        }
    }

    {
        let mut book = shared.book.lock().await;
        for order in orders {
            book.push(order);
        }
    }

    for job in jobs {
        let dispatcher = shared.dispatcher.clone();
        let book = shared.book.clone();
        tokio::spawn(async move {
            dispatcher
                .deliver(&book, job.order_id, channel_id, job.family, job.tokens, job.stake_each)
                .await;
        });
    }
}

async fn run_channel_worker(
    shared: Shared,
    channel_id: i64,
    family: GameFamily,
    mut rx: mpsc::Receiver<InboundMessage>,
) {
    let mut ctx = ChannelGameContext::new(channel_id, family);
    info!("[Worker] channel {} ({}) up", channel_id, family);
    while let Some(msg) = rx.recv().await {
        match ctx.handle(&msg.text) {
            GameEvent::StartBetting { round_id } => {
                open_round(&shared, channel_id, &round_id, &ctx.history).await;
            }
            GameEvent::LotteryResult { round_id, result } => {
                let settled = settlement::settle_round(
                    channel_id,
                    &round_id,
                    &result,
                    &shared.book,
                    &shared.schemes,
                    &shared.ledger,
                    &shared.odds,
                    &shared.settings.risk,
                )
                .await;
                if settled > 0 {
                    info!(
                        "[Worker] channel {} round {} settled {} order(s)",
                        channel_id, round_id, settled
                    );
                }
            }
            GameEvent::StopBetting | GameEvent::Unknown => {}
        }
    }
}

/// The bot core: routes inbound messages to channel workers and owns the
/// shared state.
pub struct Engine {
    shared: Shared,
    workers: HashMap<i64, mpsc::Sender<InboundMessage>>,
    confirm_ttl: Duration,
}

impl Engine {
    pub fn new(
        store: SchemeStore,
        odds: OddsTable,
        transport: Arc<dyn Transport>,
        config: &Config,
    ) -> Self {
        let dispatcher =
            Dispatcher::new(transport, config.delay_min_ms, config.delay_max_ms);
        Self {
            shared: Shared {
                schemes: Arc::new(Mutex::new(store.schemes)),
                book: Arc::new(Mutex::new(OrderBook::default())),
                ledger: Arc::new(Mutex::new(GlobalLedger::default())),
                odds: Arc::new(odds),
                settings: Arc::new(store.settings),
                dispatcher: Arc::new(dispatcher),
            },
            workers: HashMap::new(),
            confirm_ttl: Duration::from_secs(config.confirm_ttl_secs),
        }
    }

    /// Background task demoting orders stuck awaiting confirmation.
    pub fn spawn_confirmation_sweeper(&self) -> JoinHandle<()> {
        let book = self.shared.book.clone();
        let ttl = self.confirm_ttl;
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(Duration::from_secs(10));
            loop {
                tick.tick().await;
                confirm::sweep_stale(&book, ttl).await;
            }
        })
    }

    /// Route one inbound message. Replies go to the confirmation matcher;
    /// everything else to the channel's worker, if it deserves one.
    pub async fn handle_message(&mut self, msg: InboundMessage) {
        if msg.reply_to.is_some() {
            confirm::handle_reply(&self.shared.book, &self.shared.ledger, &msg).await;
            return;
        }
        let Some(worker) = self.worker_for(msg.channel_id).await else {
            return;
        };
        // A closed worker only happens at shutdown; drop the message
        let _ = worker.send(msg).await;
    }

    /// The channel's worker queue, lazily spawning one for channels with an
    /// enabled scheme.
    async fn worker_for(&mut self, channel_id: i64) -> Option<mpsc::Sender<InboundMessage>> {
        if let Some(tx) = self.workers.get(&channel_id) {
            return Some(tx.clone());
        }
        let family = {
            let schemes = self.shared.schemes.lock().await;
            schemes
                .iter()
                .find(|s| s.enabled && s.channel_id == channel_id)
                .map(|s| s.family)?
        };
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(run_channel_worker(self.shared.clone(), channel_id, family, rx));
        self.workers.insert(channel_id, tx.clone());
        Some(tx)
    }

    pub async fn stats(&self) -> BotStats {
        self.shared.book.lock().await.stats()
    }

    pub fn schemes(&self) -> Arc<Mutex<Vec<crate::scheme::Scheme>>> {
        self.shared.schemes.clone()
    }

    pub fn ledger(&self) -> Arc<Mutex<GlobalLedger>> {
        self.shared.ledger.clone()
    }
}
