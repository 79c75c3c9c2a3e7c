use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::json;

use crate::domain::errors::{ConfigError, NotifyError};
use crate::domain::traits::WebhookSender;

/// Slack incoming webhook
pub struct SlackWebhook {
    client: Client,
    url: String,
}

impl SlackWebhook {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Build from the webhook url held in an environment variable.
    /// Unset or empty fails here, before any request is made.
    pub fn from_env_var(name: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let url = std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnv(name.to_string()))?;
        Self::new(url, timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WebhookSender for SlackWebhook {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Webhook delivery failed with status {}: {}", status, body);
            return Err(NotifyError::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Webhook delivered alert");
        Ok(())
    }
}
