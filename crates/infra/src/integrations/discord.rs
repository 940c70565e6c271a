//! Discord webhook notifier for contact messages

use async_trait::async_trait;
use homedash_core::ContactNotifier;
use homedash_domain::{ContactMessage, HomedashError, Result};
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// Posts contact messages to a Discord webhook as an embed.
pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>, http: Client) -> Self {
        Self { http, webhook_url: webhook_url.into() }
    }
}

#[async_trait]
impl ContactNotifier for DiscordNotifier {
    async fn send(&self, message: &ContactMessage) -> Result<()> {
        let payload = json!({
            "embeds": [{
                "title": "New contact message",
                "color": 5814783,
                "fields": [
                    { "name": "Name", "value": message.name, "inline": true },
                    { "name": "Email", "value": message.email, "inline": true },
                    { "name": "Message", "value": message.message }
                ]
            }]
        });

        let response = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| HomedashError::RemoteUnavailable(format!("webhook request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(HomedashError::RemoteUnavailable(format!(
                "webhook returned {status}"
            )));
        }

        info!(from = %message.email, "contact message forwarded");

        Ok(())
    }
}
