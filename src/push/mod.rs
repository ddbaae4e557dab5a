pub mod fcm;
pub mod fcm_auth;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

pub use fcm::FcmProvider;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    SendFailed(String),
}

/// A single message addressed to one destination token.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushMessage {
    pub fn new(token: &str, title: &str, body: &str, data: &Map<String, Value>) -> Self {
        Self {
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data: stringify_data(data),
        }
    }
}

/// Provider data payloads only carry string values; non-string JSON values
/// are sent as their compact JSON text.
pub fn stringify_data(data: &Map<String, Value>) -> HashMap<String, String> {
    data.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Per-message outcomes of a batch send, in input order.
#[derive(Debug, Default)]
pub struct BatchResponse {
    pub responses: Vec<std::result::Result<String, PushError>>,
}

impl BatchResponse {
    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }
}

#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Delivers one message and returns the provider's message id.
    async fn send(&self, message: &PushMessage) -> std::result::Result<String, PushError>;

    /// Delivers every message independently. Individual failures are
    /// reported in the response, not as an error.
    async fn send_each(&self, messages: &[PushMessage]) -> std::result::Result<BatchResponse, PushError>;
}
