use std::time::Duration;

use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::telegram::non_empty_env;
use super::{render, AlertPayload, Channel, Notifier};

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// Needs `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS`, `NOTIFY_EMAIL_FROM` and
    /// `NOTIFY_EMAIL_TO`. A partial or invalid setup disables the channel.
    pub fn from_env(timeout: Duration) -> Option<Self> {
        let vars = [
            "SMTP_HOST",
            "SMTP_USER",
            "SMTP_PASS",
            "NOTIFY_EMAIL_FROM",
            "NOTIFY_EMAIL_TO",
        ]
        .map(non_empty_env);
        let [Some(host), Some(user), Some(pass), Some(from), Some(to)] = vars else {
            tracing::debug!("e-mail disabled (SMTP settings incomplete)");
            return None;
        };

        match Self::build(&host, user, pass, &from, &to, timeout) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "e-mail disabled");
                None
            }
        }
    }

    fn build(
        host: &str,
        user: String,
        pass: String,
        from: &str,
        to: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .context("invalid SMTP_HOST")?
            .credentials(Credentials::new(user, pass))
            .timeout(Some(timeout))
            .build();
        let from = from.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        let to = to.parse().context("invalid NOTIFY_EMAIL_TO")?;
        Ok(Self { mailer, from, to })
    }
}

#[async_trait::async_trait]
impl Notifier for EmailSender {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(&self, payload: &AlertPayload) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("ethfee: {}", render::headline(payload)))
            .header(header::ContentType::TEXT_PLAIN)
            .body(render::plain(payload))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
