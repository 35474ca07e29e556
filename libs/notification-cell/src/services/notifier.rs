// libs/notification-cell/src/services/notifier.rs
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::models::{EmailMessage, NotificationError};

/// Outbound email channel. Delivery is best-effort; callers only log failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError>;
}

/// Sends through a JSON email API (`POST {url}` with a bearer key).
pub struct HttpEmailNotifier {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpEmailNotifier {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.external_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url: config.email_api_url.clone(),
            api_key: config.email_api_key.clone(),
            from: config.email_from.clone(),
        }
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        if message.to.trim().is_empty() {
            return Err(NotificationError::NotConfigured("recipient address is empty".to_string()));
        }

        debug!("Sending email '{}' to {}", message.subject, message.to);

        let response = self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [message.to],
                "subject": message.subject,
                "html": message.html_body,
                "text": message.text_body,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Transport(format!("request timed out: {}", e))
                } else {
                    NotificationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected { status: status.as_u16(), body });
        }

        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        info!("Email (not sent, no provider configured) to {}: {}", message.to, message.subject);
        debug!("Email body:\n{}", message.text_body);
        Ok(())
    }
}

pub fn notifier_from_config(config: &AppConfig) -> Arc<dyn Notifier> {
    if config.is_email_configured() {
        Arc::new(HttpEmailNotifier::new(config))
    } else {
        Arc::new(LogNotifier)
    }
}
