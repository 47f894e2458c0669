//! Channel-specific message text.

use crate::format::human_utc;

use super::{AlertKind, AlertPayload};

/// Hard limit for a post on X, in characters.
pub const X_MAX_CHARS: usize = 280;

const HASHTAGS: &str = "#Ethereum #GasFees #ETHGas";

/// `"increased above 20"` style parts of a cross alert.
struct CrossWords {
    verb: &'static str,
    boundary: &'static str,
    threshold: String,
    change: String,
}

fn cross_words(p: &AlertPayload) -> Option<CrossWords> {
    let AlertKind::Cross { event, delta } = p.kind else {
        return None;
    };
    let verb = if delta > 0.0 { "increased" } else { "decreased" };
    Some(CrossWords {
        verb,
        boundary: event.direction.as_str(),
        threshold: format!("{}", event.threshold),
        change: format!("{verb} by {:.2} Gwei", delta.abs()),
    })
}

/// One-line summary, used as title/subject.
pub fn headline(p: &AlertPayload) -> String {
    match cross_words(p) {
        Some(w) => format!("Gas fee {} {} {} Gwei", w.verb, w.boundary, w.threshold),
        None => "Gas snapshot".to_string(),
    }
}

fn cost_line(p: &AlertPayload) -> Option<String> {
    p.eth_price_usd
        .filter(|_| p.eth_transfer_usd > 0.0)
        .map(|_| format!("• ETH transfer: ${:.4}\n", p.eth_transfer_usd))
}

/// Telegram Markdown, long form with a block link.
pub fn telegram(p: &AlertPayload) -> String {
    let first = match cross_words(p) {
        Some(w) => format!(
            "⛽️ Gas fee {} {} {} Gwei\n• Current base fee: {} Gwei ({})\n",
            w.verb, w.boundary, w.threshold, p.base_fee_fmt, w.change
        ),
        None => format!("📊 Daily gas snapshot\n• Base fee: {} Gwei\n", p.base_fee_fmt),
    };
    format!(
        "{first}• Suggested prices:\n   - Safe: {} Gwei\n   - Propose: {} Gwei\n   - Fast: {} Gwei\n{}• Block: [#{block}](https://etherscan.io/block/{block})\n• Time: {}",
        p.safe_fmt,
        p.propose_fmt,
        p.fast_fmt,
        cost_line(p).unwrap_or_default(),
        human_utc(p.at),
        block = p.block,
    )
}

/// Short form for X, truncated to [`X_MAX_CHARS`].
pub fn x_post(p: &AlertPayload) -> String {
    let first = match cross_words(p) {
        Some(w) => format!(
            "⛽️ Gas {} {} {} Gwei\nBase {} Gwei ({})",
            w.verb, w.boundary, w.threshold, p.base_fee_fmt, w.change
        ),
        None => format!("📊 Gas snapshot\nBase {} Gwei", p.base_fee_fmt),
    };
    let text = format!(
        "{first}\nSafe {} | Prop {} | Fast {}\nBlk {}\n{HASHTAGS}",
        p.safe_fmt, p.propose_fmt, p.fast_fmt, p.block
    );
    truncate_chars(&text, X_MAX_CHARS)
}

/// Plain multi-line body for e-mail, Slack and Discord.
pub fn plain(p: &AlertPayload) -> String {
    let mut out = match cross_words(p) {
        Some(w) => format!("Base fee: {} Gwei ({})\n", p.base_fee_fmt, w.change),
        None => format!("Base fee: {} Gwei\n", p.base_fee_fmt),
    };
    out.push_str(&format!(
        "Safe: {} Gwei | Propose: {} Gwei | Fast: {} Gwei\n",
        p.safe_fmt, p.propose_fmt, p.fast_fmt
    ));
    if let Some(line) = cost_line(p) {
        out.push_str(line.trim_start_matches("• "));
    }
    out.push_str(&format!("Block: {}\nTime: {}", p.block, human_utc(p.at)));
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cross::{CrossEvent, Direction};
    use chrono::{TimeZone, Utc};

    fn cross(delta: f64, direction: Direction) -> AlertPayload {
        AlertPayload {
            kind: AlertKind::Cross {
                event: CrossEvent { threshold: 20.0, direction },
                delta,
            },
            base_fee: 21.234,
            prev_fee: 19.0,
            base_fee_fmt: "21.2".into(),
            safe_fmt: "21.0".into(),
            propose_fmt: "21.5".into(),
            fast_fmt: "22.0".into(),
            block: "19000001".into(),
            eth_price_usd: Some(2000.0),
            eth_transfer_usd: 0.8918,
            at: Utc.with_ymd_and_hms(2025, 5, 19, 8, 9, 20).unwrap(),
        }
    }

    #[test]
    fn cross_headline_names_direction_and_level() {
        assert_eq!(
            headline(&cross(2.234, Direction::Above)),
            "Gas fee increased above 20 Gwei"
        );
        assert_eq!(
            headline(&cross(-1.0, Direction::Below)),
            "Gas fee decreased below 20 Gwei"
        );
    }

    #[test]
    fn telegram_has_change_link_and_time() {
        let t = telegram(&cross(2.234, Direction::Above));
        assert!(t.starts_with("⛽️ Gas fee increased above 20 Gwei"));
        assert!(t.contains("(increased by 2.23 Gwei)"));
        assert!(t.contains("[#19000001](https://etherscan.io/block/19000001)"));
        assert!(t.contains("• ETH transfer: $0.8918"));
        assert!(t.ends_with("2025-05-19 08:09:20 UTC"));
    }

    #[test]
    fn heartbeat_reads_as_snapshot() {
        let mut p = cross(0.0, Direction::Above);
        p.kind = AlertKind::Heartbeat;
        p.eth_price_usd = None;
        assert_eq!(headline(&p), "Gas snapshot");
        assert!(telegram(&p).starts_with("📊 Daily gas snapshot\n• Base fee: 21.2 Gwei"));
        assert!(x_post(&p).starts_with("📊 Gas snapshot\nBase 21.2 Gwei"));
        assert!(!telegram(&p).contains("ETH transfer"));
        assert!(x_post(&p).ends_with(HASHTAGS));
    }

    #[test]
    fn x_post_respects_length_limit() {
        let mut p = cross(2.0, Direction::Above);
        p.block = "9".repeat(400);
        assert_eq!(x_post(&p).chars().count(), X_MAX_CHARS);
        assert!(x_post(&cross(2.0, Direction::Above)).chars().count() < X_MAX_CHARS);
    }
}
