//! Lucky28 family: three numbers summed to 0-27
//!
//! Broadcast shapes this adapter understands:
//!   start:  "第123456期开始投注，封盘时间30秒"
//!   stop:   "第123456期停止投注" / "封盘"
//!   result: "第123456期开奖：3+5+9=17"
//!
//! Sum >= 14 is big, parity gives odd/even, three equal numbers add the
//! triple tag.

use super::{digit_tags, GameAdapter};
use crate::types::{GameFamily, MessageKind, PlayMode};
use regex::Regex;
use std::sync::OnceLock;

/// Big/small midpoint for the 0-27 sum
const SUM_MIDPOINT: u32 = 14;

pub struct Lucky28;

fn round_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"第\s*(\d+)\s*期").expect("valid regex"))
}

fn result_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"第\s*(\d+)\s*期.*?(\d)\s*\+\s*(\d)\s*\+\s*(\d)\s*=\s*(\d{1,2})")
            .expect("valid regex")
    })
}

fn raw_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d)\+(\d)\+(\d)=(\d{1,2})$").expect("valid regex"))
}

impl GameAdapter for Lucky28 {
    fn family(&self) -> GameFamily {
        GameFamily::Lucky28
    }

    fn classify(&self, text: &str) -> MessageKind {
        if result_re().is_match(text) {
            MessageKind::Result
        } else if text.contains("开始投注") && round_re().is_match(text) {
            // Start notices often mention the seal time ("封盘时间30秒"),
            // so start must be checked before stop
            MessageKind::Start
        } else if text.contains("停止投注") || text.contains("封盘") {
            MessageKind::Stop
        } else {
            MessageKind::Unknown
        }
    }

    fn extract_round_id(&self, text: &str) -> Option<String> {
        round_re()
            .captures(text)
            .map(|c| c[1].to_string())
    }

    fn extract_result(&self, text: &str) -> Option<(String, String)> {
        let caps = result_re().captures(text)?;
        let raw = format!("{}+{}+{}={}", &caps[2], &caps[3], &caps[4], &caps[5]);
        Some((caps[1].to_string(), raw))
    }

    fn normalize(&self, raw: &str, mode: PlayMode, _positions: &[usize]) -> Vec<String> {
        if mode != PlayMode::Standard {
            return Vec::new();
        }
        let caps = match raw_re().captures(raw.trim()) {
            Some(c) => c,
            None => return Vec::new(),
        };
        let a: u32 = caps[1].parse().unwrap_or(0);
        let b: u32 = caps[2].parse().unwrap_or(0);
        let c: u32 = caps[3].parse().unwrap_or(0);
        let sum: u32 = match caps[4].parse() {
            Ok(s) if s <= 27 => s,
            _ => return Vec::new(),
        };
        let mut tags = digit_tags(sum, SUM_MIDPOINT);
        if a == b && b == c {
            tags.push("豹子".to_string());
        }
        tags
    }
}
