//! Per-channel game context
//!
//! One fixed lifecycle state machine shared by every game family; everything
//! family-specific goes through the `GameAdapter`. The context owns the
//! channel's history and the duplicate suppression that makes re-delivered
//! start notices and repeated draws no-ops.

use crate::game::{adapter_for, GameAdapter};
use crate::history::{History, ResultRecord};
use crate::types::{GameEvent, GameFamily, MessageKind};
use tracing::debug;

/// State for one monitored channel.
#[derive(Debug)]
pub struct ChannelGameContext {
    pub channel_id: i64,
    pub family: GameFamily,
    /// Round currently open for betting, if any
    pub current_round: Option<String>,
    pub history: History,
}

impl ChannelGameContext {
    pub fn new(channel_id: i64, family: GameFamily) -> Self {
        Self {
            channel_id,
            family,
            current_round: None,
            history: History::new(),
        }
    }

    fn adapter(&self) -> &'static dyn GameAdapter {
        adapter_for(self.family)
    }

    /// Classify one inbound text into a lifecycle event.
    ///
    /// A start notice whose round id was already seen, or a draw whose round
    /// id already exists in history, classifies as `Unknown` — processing a
    /// lifecycle message twice must never have an effect.
    pub fn handle(&mut self, text: &str) -> GameEvent {
        let adapter = self.adapter();
        match adapter.classify(text) {
            MessageKind::Start => {
                let Some(round_id) = adapter.extract_round_id(text) else {
                    return GameEvent::Unknown;
                };
                if !self.history.mark_round_seen(&round_id) {
                    debug!(
                        "[Context] channel {} ignoring duplicate start for round {}",
                        self.channel_id, round_id
                    );
                    return GameEvent::Unknown;
                }
                self.current_round = Some(round_id.clone());
                GameEvent::StartBetting { round_id }
            }
            MessageKind::Stop => {
                GameEvent::StopBetting
            }
            MessageKind::Result => {
                let Some((round_id, result)) = adapter.extract_result(text) else {
                    return GameEvent::Unknown;
                };
                if !self
                    .history
                    .insert_result(ResultRecord::new(round_id.clone(), result.clone()))
                {
                    debug!(
                        "[Context] channel {} ignoring duplicate draw for round {}",
                        self.channel_id, round_id
                    );
                    return GameEvent::Unknown;
                }
                GameEvent::LotteryResult { round_id, result }
            }
            MessageKind::Unknown => GameEvent::Unknown,
        }
    }
}
