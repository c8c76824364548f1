//! FiveStar family: five-digit draws with position selectors
//!
//! Broadcast shapes:
//!   start:  "第20240801期开始投注"
//!   result: "第20240801期开奖：52814"
//!
//! Positional mode reads exactly one selected position (1-based) as a digit
//! with the usual big/small (>= 5) and odd/even split. DragonTiger mode
//! compares exactly two positions head-to-head: first higher is dragon,
//! lower is tiger, equal is tie. A wrong selector count produces no tags.

use super::{digit_tags, GameAdapter};
use crate::types::{GameFamily, MessageKind, PlayMode};
use regex::Regex;
use std::sync::OnceLock;

const DIGIT_MIDPOINT: u32 = 5;

pub struct FiveStar;

fn round_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"第\s*(\d+)\s*期").expect("valid regex"))
}

fn result_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"第\s*(\d+)\s*期\s*开[奖出][:：]?\s*(\d{5})(?:\D|$)").expect("valid regex")
    })
}

/// Digit at a 1-based position of a five-digit raw result
fn digit_at(raw: &str, position: usize) -> Option<u32> {
    if !(1..=5).contains(&position) {
        return None;
    }
    raw.chars().nth(position - 1)?.to_digit(10)
}

impl GameAdapter for FiveStar {
    fn family(&self) -> GameFamily {
        GameFamily::FiveStar
    }

    fn classify(&self, text: &str) -> MessageKind {
        if result_re().is_match(text) {
            MessageKind::Result
        } else if text.contains("开始投注") && round_re().is_match(text) {
            MessageKind::Start
        } else if text.contains("停止投注") || text.contains("封盘") {
            MessageKind::Stop
        } else {
            MessageKind::Unknown
        }
    }

    fn extract_round_id(&self, text: &str) -> Option<String> {
        round_re().captures(text).map(|c| c[1].to_string())
    }

    fn extract_result(&self, text: &str) -> Option<(String, String)> {
        let caps = result_re().captures(text)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    fn normalize(&self, raw: &str, mode: PlayMode, positions: &[usize]) -> Vec<String> {
        let raw = raw.trim();
        if raw.len() != 5 || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Vec::new();
        }
        match mode {
            PlayMode::Positional => {
                // Exactly one selector for digit/parity queries
                let [pos] = positions else { return Vec::new() };
                match digit_at(raw, *pos) {
                    Some(d) => digit_tags(d, DIGIT_MIDPOINT),
                    None => Vec::new(),
                }
            }
            PlayMode::DragonTiger => {
                // Exactly two selectors for the head-to-head comparison
                let [first, second] = positions else { return Vec::new() };
                let (Some(a), Some(b)) = (digit_at(raw, *first), digit_at(raw, *second)) else {
                    return Vec::new();
                };
                let tag = match a.cmp(&b) {
                    std::cmp::Ordering::Greater => "龙",
                    std::cmp::Ordering::Less => "虎",
                    std::cmp::Ordering::Equal => "和",
                };
                vec![tag.to_string()]
            }
            PlayMode::Standard => Vec::new(),
        }
    }
}
