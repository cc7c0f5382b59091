use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use tracing::error;

/// Push transport keyed by a channel identifier. Subscribed observers (live
/// dashboards) converge on current state from these messages without polling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, channel: &str, payload: &JsonValue) -> Result<()>;
}

/// Payload shapes published after each mutating operation. The identifier is
/// always the generated key, never a storage key.
pub fn start_payload(hash: &str, proctor: &str) -> JsonValue {
    json!({ "hash": hash, "proctor": proctor, "status": "OK" })
}

pub fn stop_payload(hash: &str) -> JsonValue {
    json!({ "hash": hash, "status": "submitted" })
}

pub fn status_payload(hash: &str, attempt_status: &str) -> JsonValue {
    json!({ "hash": hash, "status": attempt_status })
}

#[derive(Clone)]
pub struct PushGatewayNotifier {
    client: Client,
    gateway_url: String,
}

impl PushGatewayNotifier {
    pub fn new(gateway_url: String) -> Self {
        Self {
            client: Client::new(),
            gateway_url,
        }
    }
}

#[async_trait]
impl Notifier for PushGatewayNotifier {
    async fn publish(&self, channel: &str, payload: &JsonValue) -> Result<()> {
        let message = json!({ "channel": channel, "data": payload });
        let response = self
            .client
            .post(&self.gateway_url)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            error!(
                "Push gateway rejected message for channel {}: {}",
                channel,
                response.status()
            );
        }
        Ok(())
    }
}
