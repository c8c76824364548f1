//! Quick10 family: one digit 0-9 per round
//!
//! Broadcast shapes:
//!   start:  "第123期开始投注"
//!   result: "第123期开奖：7"
//!
//! Digit >= 5 is big, parity gives odd/even.

use super::{digit_tags, GameAdapter};
use crate::types::{GameFamily, MessageKind, PlayMode};
use regex::Regex;
use std::sync::OnceLock;

const DIGIT_MIDPOINT: u32 = 5;

pub struct Quick10;

fn round_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"第\s*(\d+)\s*期").expect("valid regex"))
}

fn result_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"第\s*(\d+)\s*期\s*开[奖出][:：]?\s*(\d)(?:\D|$)").expect("valid regex")
    })
}

impl GameAdapter for Quick10 {
    fn family(&self) -> GameFamily {
        GameFamily::Quick10
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

    fn normalize(&self, raw: &str, mode: PlayMode, _positions: &[usize]) -> Vec<String> {
        if mode != PlayMode::Standard {
            return Vec::new();
        }
        let raw = raw.trim();
        if raw.len() != 1 {
            return Vec::new();
        }
        match raw.parse::<u32>() {
            Ok(digit) if digit <= 9 => digit_tags(digit, DIGIT_MIDPOINT),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_and_extract() {
        let g = Quick10;
        assert_eq!(g.classify("第55期开始投注"), MessageKind::Start);
        assert_eq!(g.classify("第55期开奖：7"), MessageKind::Result);
        assert_eq!(g.extract_result("第55期开奖：7"), Some(("55".into(), "7".into())));
        assert_eq!(g.extract_round_id("第55期开始投注"), Some("55".into()));
    }

    #[test]
    fn test_normalize() {
        let g = Quick10;
        assert_eq!(g.normalize("7", PlayMode::Standard, &[]), vec!["大", "单"]);
        assert_eq!(g.normalize("4", PlayMode::Standard, &[]), vec!["小", "双"]);
        assert_eq!(g.normalize("5", PlayMode::Standard, &[]), vec!["大", "单"]);
    }

    #[test]
    fn test_normalize_fails_closed() {
        let g = Quick10;
        assert!(g.normalize("77", PlayMode::Standard, &[]).is_empty());
        assert!(g.normalize("x", PlayMode::Standard, &[]).is_empty());
        assert!(g.normalize("7", PlayMode::Positional, &[1]).is_empty());
    }
}
