//! Routes an error report to the channels its kind calls for.

use crate::channels::{AdminMailer, ChatPoster};
use crate::formatting;
use crate::report::{Report, ReportKind};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Errors surfaced by a dispatch. Email delivery failures are logged and
/// swallowed, so only the chat path can fail a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("chat notification failed")]
    Chat(#[source] anyhow::Error),
}

/// Formats reports and hands them to the delivery channels.
///
/// The chat channel is optional; deployments without an error bot only
/// get admin email.
pub struct Dispatcher {
    mailer: Arc<dyn AdminMailer>,
    chat: Option<Arc<dyn ChatPoster>>,
    skip_server_chat: bool,
}

impl Dispatcher {
    /// Creates a new `Dispatcher`.
    pub fn new(
        mailer: Arc<dyn AdminMailer>,
        chat: Option<Arc<dyn ChatPoster>>,
        skip_server_chat: bool,
    ) -> Self {
        Self {
            mailer,
            chat,
            skip_server_chat,
        }
    }

    /// Stamps the report with its deployment name and routes it by kind.
    pub async fn report_error(
        &self,
        deployment_name: &str,
        kind: ReportKind,
        mut report: Report,
    ) -> Result<(), DispatchError> {
        report.deployment = Some(deployment_name.to_string());
        match kind {
            ReportKind::Browser => self.notify_browser_error(&report).await,
            ReportKind::Server => self.notify_server_error(&report).await,
        }
    }

    /// Browser reports go to the chat stream first (when configured),
    /// then to admin email.
    pub async fn notify_browser_error(&self, report: &Report) -> Result<(), DispatchError> {
        if let Some(chat) = &self.chat {
            let message = formatting::chat_browser(report);
            chat.post(&message.subject, &message.body)
                .await
                .map_err(DispatchError::Chat)?;
        }

        let message = formatting::email_browser(report);
        self.mail_admins_best_effort(&message.subject, &message.body)
            .await;
        info!(kind = "browser", "Dispatched error report");
        Ok(())
    }

    /// Server reports go to admin email first, then to the chat stream
    /// unless server chat is suppressed.
    pub async fn notify_server_error(&self, report: &Report) -> Result<(), DispatchError> {
        let message = formatting::email_server(report);
        self.mail_admins_best_effort(&message.subject, &message.body)
            .await;

        if !self.skip_server_chat {
            if let Some(chat) = &self.chat {
                let message = formatting::chat_server(report);
                chat.post(&message.subject, &message.body)
                    .await
                    .map_err(DispatchError::Chat)?;
            }
        }
        info!(kind = "server", "Dispatched error report");
        Ok(())
    }

    /// The email path swallows delivery errors: a broken SMTP relay must
    /// not lose the remaining channels of a dispatch.
    async fn mail_admins_best_effort(&self, subject: &str, body: &str) {
        if let Err(e) = self.mailer.mail_admins(subject, body).await {
            error!(error = %e, "Failed to email error report to admins");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RequestContext;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Capturing fakes sharing one delivery log, so channel order is
    /// observable.
    #[derive(Clone, Default)]
    struct DeliveryLog {
        entries: Arc<Mutex<Vec<(&'static str, String, String)>>>,
    }

    impl DeliveryLog {
        fn entries(&self) -> Vec<(&'static str, String, String)> {
            self.entries.lock().unwrap().clone()
        }
    }

    struct FakeMailer {
        log: DeliveryLog,
        fail: bool,
    }

    #[async_trait]
    impl AdminMailer for FakeMailer {
        async fn mail_admins(&self, subject: &str, body: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("smtp relay down");
            }
            self.log.entries.lock().unwrap().push((
                "email",
                subject.to_string(),
                body.to_string(),
            ));
            Ok(())
        }
    }

    struct FakeChat {
        log: DeliveryLog,
        fail: bool,
    }

    #[async_trait]
    impl ChatPoster for FakeChat {
        async fn post(&self, topic: &str, content: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("webhook rejected");
            }
            self.log.entries.lock().unwrap().push((
                "chat",
                topic.to_string(),
                content.to_string(),
            ));
            Ok(())
        }
    }

    fn dispatcher(
        log: &DeliveryLog,
        with_chat: bool,
        skip_server_chat: bool,
    ) -> Dispatcher {
        let mailer = Arc::new(FakeMailer {
            log: log.clone(),
            fail: false,
        });
        let chat: Option<Arc<dyn ChatPoster>> = with_chat.then(|| {
            Arc::new(FakeChat {
                log: log.clone(),
                fail: false,
            }) as Arc<dyn ChatPoster>
        });
        Dispatcher::new(mailer, chat, skip_server_chat)
    }

    fn browser_report() -> Report {
        Report {
            user_email: Some("ada@example.com".to_string()),
            message: Some("TypeError: x is undefined".to_string()),
            ..Default::default()
        }
    }

    fn server_report() -> Report {
        Report {
            node: Some("host7".to_string()),
            message: Some("ValueError: bad width".to_string()),
            request: Some(RequestContext::default()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_browser_report_goes_chat_then_email() {
        let log = DeliveryLog::default();
        let dispatcher = dispatcher(&log, true, false);

        dispatcher
            .report_error("staging", ReportKind::Browser, browser_report())
            .await
            .unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "chat");
        assert_eq!(entries[0].1, "JS error: ada@example.com");
        assert_eq!(entries[1].0, "email");
        assert!(entries[1].1.starts_with("Browser error for "));
    }

    #[tokio::test]
    async fn test_server_report_goes_email_then_chat() {
        let log = DeliveryLog::default();
        let dispatcher = dispatcher(&log, true, false);

        dispatcher
            .report_error("prod", ReportKind::Server, server_report())
            .await
            .unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "email");
        assert_eq!(entries[1].0, "chat");
        assert_eq!(entries[1].1, "host7: ValueError: bad width");
    }

    #[tokio::test]
    async fn test_report_error_stamps_deployment() {
        let log = DeliveryLog::default();
        let dispatcher = dispatcher(&log, true, false);

        dispatcher
            .report_error("staging", ReportKind::Browser, browser_report())
            .await
            .unwrap();

        let entries = log.entries();
        // The deployment name came from the dispatch call, not the report.
        assert!(entries[0].2.contains("on staging deployment"));
    }

    #[tokio::test]
    async fn test_no_chat_channel_means_email_only() {
        let log = DeliveryLog::default();
        let dispatcher = dispatcher(&log, false, false);

        dispatcher
            .report_error("prod", ReportKind::Server, server_report())
            .await
            .unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "email");
    }

    #[tokio::test]
    async fn test_skip_server_chat_suppresses_chat_for_server_only() {
        let log = DeliveryLog::default();
        let dispatcher = dispatcher(&log, true, true);

        dispatcher
            .report_error("prod", ReportKind::Server, server_report())
            .await
            .unwrap();
        dispatcher
            .report_error("prod", ReportKind::Browser, browser_report())
            .await
            .unwrap();

        let channels: Vec<&str> = log.entries().iter().map(|e| e.0).collect();
        assert_eq!(channels, vec!["email", "chat", "email"]);
    }

    #[tokio::test]
    async fn test_email_failure_is_swallowed() {
        let log = DeliveryLog::default();
        let mailer = Arc::new(FakeMailer {
            log: log.clone(),
            fail: true,
        });
        let chat = Arc::new(FakeChat {
            log: log.clone(),
            fail: false,
        });
        let dispatcher = Dispatcher::new(mailer, Some(chat), false);

        let result = dispatcher
            .report_error("prod", ReportKind::Server, server_report())
            .await;

        assert!(result.is_ok());
        // The chat channel still ran after the email failure.
        let channels: Vec<&str> = log.entries().iter().map(|e| e.0).collect();
        assert_eq!(channels, vec!["chat"]);
    }

    #[tokio::test]
    async fn test_chat_failure_surfaces() {
        let log = DeliveryLog::default();
        let mailer = Arc::new(FakeMailer {
            log: log.clone(),
            fail: false,
        });
        let chat = Arc::new(FakeChat {
            log: log.clone(),
            fail: true,
        });
        let dispatcher = Dispatcher::new(mailer, Some(chat), false);

        let result = dispatcher
            .report_error("prod", ReportKind::Server, server_report())
            .await;

        assert!(matches!(result, Err(DispatchError::Chat(_))));
        // Email had already been delivered before the chat failure.
        let channels: Vec<&str> = log.entries().iter().map(|e| e.0).collect();
        assert_eq!(channels, vec!["email"]);
    }
}
