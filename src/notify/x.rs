use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use super::telegram::non_empty_env;
use super::{render, AlertPayload, Channel, Notifier};

const TWEETS_URL: &str = "https://api.twitter.com/2/tweets";

/// Publishes a post on X through the v2 API with an OAuth 2.0 user token.
pub struct XNotifier {
    access_token: String,
    endpoint: String,
    client: Client,
    timeout: Duration,
}

impl XNotifier {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            endpoint: TWEETS_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    /// `None` when `X_USER_ACCESS_TOKEN` is absent; posting is then disabled.
    pub fn from_env(timeout: Duration) -> Option<Self> {
        match non_empty_env("X_USER_ACCESS_TOKEN") {
            Some(token) => Some(Self::new(token).with_timeout(timeout)),
            None => {
                tracing::debug!("X disabled (X_USER_ACCESS_TOKEN missing)");
                None
            }
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl Notifier for XNotifier {
    fn channel(&self) -> Channel {
        Channel::X
    }

    async fn send(&self, payload: &AlertPayload) -> Result<()> {
        let body = serde_json::json!({ "text": render::x_post(payload) });
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("x post")?
            .error_for_status()
            .context("x non-2xx")?;
        Ok(())
    }
}
