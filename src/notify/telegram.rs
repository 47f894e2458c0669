use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

use super::{render, AlertPayload, Channel, Notifier};

const API_BASE: &str = "https://api.telegram.org";

/// Posts to a bot chat (`@channel` or a numeric `-100…` id).
pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    api_base: String,
    client: Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            token,
            chat_id,
            api_base: API_BASE.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    /// `None` unless both `TG_BOT_TOKEN` and `TG_CHAT_ID` are set.
    pub fn from_env(timeout: Duration) -> Option<Self> {
        let token = non_empty_env("TG_BOT_TOKEN");
        let chat_id = non_empty_env("TG_CHAT_ID");
        match (token, chat_id) {
            (Some(t), Some(c)) => Some(Self::new(t, c).with_timeout(timeout)),
            _ => {
                tracing::debug!("Telegram disabled (TG_BOT_TOKEN / TG_CHAT_ID missing)");
                None
            }
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point at a different API host (tests, self-hosted bot API).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> Channel {
        Channel::Telegram
    }

    async fn send(&self, payload: &AlertPayload) -> Result<()> {
        let text = render::telegram(payload);
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: &text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        self.client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("telegram sendMessage")?
            .error_for_status()
            .context("telegram non-2xx")?;
        Ok(())
    }
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
