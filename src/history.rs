//! Per-channel result history
//!
//! Bounded, newest-first record of past round results plus a bounded set of
//! round ids we have already reacted to. Both caps are 50; the seen-set is
//! what makes duplicate start notices and duplicate draws no-ops.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// History and seen-set capacity
pub const HISTORY_CAP: usize = 50;

/// One past round result as captured from the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub round_id: String,
    /// Raw result text, e.g. "3+5+9=17" or "52814"
    pub raw: String,
    pub captured_at: DateTime<Utc>,
}

impl ResultRecord {
    pub fn new(round_id: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            round_id: round_id.into(),
            raw: raw.into(),
            captured_at: Utc::now(),
        }
    }
}

/// Bounded, newest-first history for one channel.
#[derive(Debug, Default, Clone)]
pub struct History {
    records: VecDeque<ResultRecord>,
    seen_rounds: VecDeque<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a round id as seen. Returns false if it was already seen,
    /// in which case nothing changes.
    pub fn mark_round_seen(&mut self, round_id: &str) -> bool {
        if self.seen_rounds.iter().any(|r| r == round_id) {
            return false;
        }
        self.seen_rounds.push_front(round_id.to_string());
        self.seen_rounds.truncate(HISTORY_CAP);
        true
    }

    /// Insert a result at the head. Returns false (and leaves history
    /// untouched) if a record with this round id already exists —
    /// duplicate draws are ignored, never overwritten.
    pub fn insert_result(&mut self, record: ResultRecord) -> bool {
        if self.records.iter().any(|r| r.round_id == record.round_id) {
            return false;
        }
        self.records.push_front(record);
        self.records.truncate(HISTORY_CAP);
        true
    }

    /// Most recent result, if any
    pub fn latest(&self) -> Option<&ResultRecord> {
        self.records.front()
    }

    /// Newest-first iteration
    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
