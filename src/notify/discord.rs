use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;

use super::telegram::non_empty_env;
use super::{render, AlertKind, AlertPayload, Channel, Notifier};

const COLOR_UP: u32 = 0xE0_4F_4F;
const COLOR_DOWN: u32 = 0x3C_B3_71;
const COLOR_SNAPSHOT: u32 = 0x5B_6E_E1;

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn from_env(timeout: Duration) -> Option<Self> {
        let Some(url) = non_empty_env("DISCORD_WEBHOOK_URL") else {
            tracing::debug!("Discord disabled (no DISCORD_WEBHOOK_URL)");
            return None;
        };
        Some(Self::new(url).with_timeout(timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    fn channel(&self) -> Channel {
        Channel::Discord
    }

    async fn send(&self, alert: &AlertPayload) -> Result<()> {
        let color = match alert.kind {
            AlertKind::Heartbeat => COLOR_SNAPSHOT,
            AlertKind::Cross { delta, .. } if delta > 0.0 => COLOR_UP,
            AlertKind::Cross { .. } => COLOR_DOWN,
        };
        let payload = DiscordWebhookPayload::embed(
            &render::headline(alert),
            &render::plain(alert),
            color,
        );

        let rsp = self
            .client
            .post(&self.webhook)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow!("Discord webhook request failed: {e}"))?;
        rsp.error_for_status_ref()
            .map_err(|e| anyhow!("Discord webhook HTTP error: {e}"))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct DiscordEmbed {
    title: String,
    description: String,
    color: u32,
}

#[derive(Serialize)]
struct DiscordWebhookPayload {
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn embed(title: &str, description: &str, color: u32) -> Self {
        Self {
            content: None,
            embeds: vec![DiscordEmbed {
                title: title.to_string(),
                description: description.to_string(),
                color,
            }],
        }
    }
}
