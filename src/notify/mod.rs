//! Outbound notifications.
//!
//! The engine hands over a transport-neutral [`AlertPayload`]; each channel
//! renders its own text. Delivery is best-effort: failures are logged and
//! counted, never retried here and never propagated to the caller.

pub mod discord;
pub mod email;
pub mod render;
pub mod slack;
pub mod telegram;
pub mod x;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::counter;

use crate::cross::CrossEvent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertKind {
    Heartbeat,
    Cross { event: CrossEvent, delta: f64 },
}

/// Everything a channel needs to render an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPayload {
    pub kind: AlertKind,
    pub base_fee: f64,
    pub prev_fee: f64,
    pub base_fee_fmt: String,
    pub safe_fmt: String,
    pub propose_fmt: String,
    pub fast_fmt: String,
    pub block: String,
    pub eth_price_usd: Option<f64>,
    /// Base-fee cost of a plain ETH transfer, 0 when no price is cached.
    pub eth_transfer_usd: f64,
    pub at: DateTime<Utc>,
}

impl AlertPayload {
    pub fn is_heartbeat(&self) -> bool {
        matches!(self.kind, AlertKind::Heartbeat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Telegram,
    X,
    Discord,
    Slack,
    Email,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Telegram,
        Channel::X,
        Channel::Discord,
        Channel::Slack,
        Channel::Email,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Telegram => "telegram",
            Channel::X => "x",
            Channel::Discord => "discord",
            Channel::Slack => "slack",
            Channel::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telegram" | "tg" => Ok(Channel::Telegram),
            "x" | "twitter" => Ok(Channel::X),
            "discord" => Ok(Channel::Discord),
            "slack" => Ok(Channel::Slack),
            "email" | "smtp" => Ok(Channel::Email),
            other => Err(format!("unknown channel {other:?}")),
        }
    }
}

/// One transport.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;
    async fn send(&self, payload: &AlertPayload) -> Result<()>;
}

/// Where the monitor hands rendered alerts.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Attempt delivery on every configured transport in `channels`.
    /// Never fails; the report says what happened.
    async fn deliver(&self, payload: &AlertPayload, channels: &[Channel]) -> DeliveryReport;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryReport {
    pub delivered: Vec<Channel>,
    pub failed: Vec<(Channel, String)>,
}

impl DeliveryReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fan-out over the transports that have credentials.
#[derive(Default)]
pub struct NotifierMux {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Build every channel whose credentials are present in the environment.
    pub fn from_env(timeout: Duration) -> Self {
        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
        if let Some(n) = telegram::TelegramNotifier::from_env(timeout) {
            notifiers.push(Box::new(n));
        }
        if let Some(n) = x::XNotifier::from_env(timeout) {
            notifiers.push(Box::new(n));
        }
        if let Some(n) = discord::DiscordNotifier::from_env(timeout) {
            notifiers.push(Box::new(n));
        }
        if let Some(n) = slack::SlackNotifier::from_env(timeout) {
            notifiers.push(Box::new(n));
        }
        if let Some(n) = email::EmailSender::from_env(timeout) {
            notifiers.push(Box::new(n));
        }

        let enabled: Vec<&str> = notifiers.iter().map(|n| n.channel().as_str()).collect();
        if enabled.is_empty() {
            tracing::warn!("no notification channel configured; alerts will only be logged");
        } else {
            tracing::info!(channels = ?enabled, "notification channels ready");
        }
        Self { notifiers }
    }

    pub fn channels(&self) -> Vec<Channel> {
        self.notifiers.iter().map(|n| n.channel()).collect()
    }
}

#[async_trait::async_trait]
impl NotificationSink for NotifierMux {
    async fn deliver(&self, payload: &AlertPayload, channels: &[Channel]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for n in self.notifiers.iter().filter(|n| channels.contains(&n.channel())) {
            let channel = n.channel();
            match n.send(payload).await {
                Ok(()) => {
                    tracing::debug!(%channel, "notification delivered");
                    report.delivered.push(channel);
                }
                Err(e) => {
                    tracing::warn!(%channel, error = %format!("{e:#}"), "notification delivery failed");
                    counter!("ethfee_delivery_failures_total", "channel" => channel.as_str())
                        .increment(1);
                    report.failed.push((channel, format!("{e:#}")));
                }
            }
        }
        report
    }
}
