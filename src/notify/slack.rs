use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use super::telegram::non_empty_env;
use super::{render, AlertPayload, Channel, Notifier};

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn from_env(timeout: Duration) -> Option<Self> {
        let Some(url) = non_empty_env("SLACK_WEBHOOK_URL") else {
            tracing::debug!("Slack disabled (no SLACK_WEBHOOK_URL)");
            return None;
        };
        Some(Self::new(url).with_timeout(timeout))
    }

    /// Optional builder for tests/tools
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    fn channel(&self) -> Channel {
        Channel::Slack
    }

    async fn send(&self, payload: &AlertPayload) -> Result<()> {
        let text = format!(
            "*{}*\n{}",
            render::headline(payload),
            render::plain(payload)
        );
        let body = serde_json::json!({ "text": text });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}
