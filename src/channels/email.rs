//! Emails error messages to the configured administrators over SMTP.

use crate::config::EmailConfig;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tokio::task;
use tracing::{debug, info, instrument};

/// A client that can mail a message to the administrators.
#[async_trait]
pub trait AdminMailer: Send + Sync {
    /// Sends `body` with `subject` to every configured admin address.
    async fn mail_admins(&self, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Sends admin mail through an SMTP relay.
pub struct EmailChannel {
    config: EmailConfig,
}

impl EmailChannel {
    /// Creates a new `EmailChannel` from its configuration section.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Builds and submits one message per admin address. Blocking; runs
    /// on the blocking thread pool.
    fn send_messages(config: &EmailConfig, subject: &str, body: &str) -> anyhow::Result<()> {
        let from: Mailbox = config.from.parse()?;

        let mut builder = SmtpTransport::relay(&config.smtp_host)?;
        if let Some(port) = config.smtp_port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        let mailer = builder.build();

        for admin in &config.admins {
            let email = Message::builder()
                .from(from.clone())
                .to(admin.parse()?)
                .subject(subject)
                .body(body.to_string())?;
            mailer.send(&email)?;
        }
        Ok(())
    }
}

#[async_trait]
impl AdminMailer for EmailChannel {
    #[instrument(skip(self, body), fields(admins = self.config.admins.len()))]
    async fn mail_admins(&self, subject: &str, body: &str) -> anyhow::Result<()> {
        if self.config.admins.is_empty() {
            debug!("No admin addresses configured, skipping email");
            return Ok(());
        }

        let config = self.config.clone();
        let subject = subject.to_string();
        let body = body.to_string();
        task::spawn_blocking(move || Self::send_messages(&config, &subject, &body)).await??;

        info!("Emailed error report to admins.");
        Ok(())
    }
}

#[cfg(test)]
mod email_channel_tests {
    use super::*;

    fn test_config(admins: Vec<String>) -> EmailConfig {
        EmailConfig {
            from: "errors@example.com".to_string(),
            admins,
            smtp_host: "smtp.example.invalid".to_string(),
            smtp_port: None,
            smtp_username: None,
            smtp_password: None,
        }
    }

    #[tokio::test]
    async fn test_no_admins_is_a_noop() {
        let channel = EmailChannel::new(test_config(vec![]));

        // Must return without ever touching the SMTP relay.
        let result = channel.mail_admins("subject", "body").await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_bad_admin_address_is_an_error() {
        let config = test_config(vec!["not an address".to_string()]);
        let result = EmailChannel::send_messages(&config, "subject", "body");
        assert!(result.is_err());
    }
}
