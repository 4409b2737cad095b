//! Posts error messages to the internal team-chat stream.

use crate::config::ChatConfig;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::task;
use tracing::{error, info, instrument};

/// A client that can post a message to the team-chat stream.
#[async_trait]
pub trait ChatPoster: Send + Sync {
    /// Posts `content` under `topic` on the errors stream.
    async fn post(&self, topic: &str, content: &str) -> anyhow::Result<()>;
}

/// Posts messages to a chat webhook as the error bot.
pub struct ChatChannel {
    webhook_url: String,
    stream: String,
    timeout: std::time::Duration,
}

impl ChatChannel {
    /// Creates a new `ChatChannel` from its configuration section.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            webhook_url: config.webhook_url.clone(),
            stream: config.stream.clone(),
            timeout: std::time::Duration::from_secs(10),
        }
    }

    /// Sends the request in a blocking manner.
    fn send_request(
        client: reqwest::blocking::Client,
        webhook_url: &str,
        payload: &Value,
    ) -> anyhow::Result<()> {
        let response = client.post(webhook_url).json(payload).send();

        match response {
            Ok(res) => {
                if res.status().is_success() {
                    Ok(())
                } else {
                    let status = res.status();
                    let text = res.text().unwrap_or_default();
                    error!(
                        status = %status,
                        body = %text,
                        "Failed to post chat notification"
                    );
                    anyhow::bail!(
                        "Failed to post chat notification: status {}, body: {}",
                        status,
                        text
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "HTTP request to chat webhook failed");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl ChatPoster for ChatChannel {
    #[instrument(skip(self, content), fields(stream = %self.stream))]
    async fn post(&self, topic: &str, content: &str) -> anyhow::Result<()> {
        let payload = json!({
            "stream": self.stream,
            "topic": topic,
            "content": content,
        });

        let webhook_url = self.webhook_url.clone();
        let timeout = self.timeout;
        let result = task::spawn_blocking(move || {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .context("building HTTP client")?;
            Self::send_request(client, &webhook_url, &payload)
        })
        .await;

        match result {
            Ok(Ok(())) => {
                info!("Posted error report to chat stream.");
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(e) => {
                error!(error = %e, "Chat notification task failed");
                Err(e.into())
            }
        }
    }
}
