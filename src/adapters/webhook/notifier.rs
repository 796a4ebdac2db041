//! Notifier posting messages to a Slack-style incoming webhook.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use std::time::Duration;

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::Notification;
use crate::domain::ports::Notifier;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

pub struct WebhookNotifier {
    http_client: ReqwestClient,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> OrchestratorResult<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| OrchestratorError::Upstream(e.to_string()))?;

        Ok(Self {
            http_client,
            webhook_url: webhook_url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> OrchestratorResult<()> {
        let message = notification.message();
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&WebhookPayload { text: &message })
            .send()
            .await
            .map_err(|e| OrchestratorError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::Upstream(format!(
                "webhook returned {status}: {body}"
            )));
        }
        Ok(())
    }
}
