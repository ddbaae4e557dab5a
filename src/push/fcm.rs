use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use super::{fcm_auth::ServiceAccountAuth, BatchResponse, PushError, PushMessage, PushProvider};
use crate::state::FcmConfig;

const FCM_API_URL: &str = "https://fcm.googleapis.com/v1/projects";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_IN_FLIGHT: usize = 32;

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FcmErrorResponse {
    error: FcmError,
}

#[derive(Debug, Deserialize)]
struct FcmError {
    message: String,
}

/// Firebase Cloud Messaging over the HTTP v1 API.
pub struct FcmProvider {
    client: Client,
    send_url: String,
    auth: ServiceAccountAuth,
}

impl FcmProvider {
    pub fn new(config: &FcmConfig) -> Result<Self, PushError> {
        if config.project_id.is_empty() {
            return Err(PushError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PushError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let auth = ServiceAccountAuth::new(&config.client_email, &config.private_key, client.clone())?;

        Ok(Self {
            client,
            send_url: format!("{}/{}/messages:send", FCM_API_URL, config.project_id),
            auth,
        })
    }

    async fn send_with_token(
        &self,
        message: &PushMessage,
        access_token: &str,
    ) -> Result<String, PushError> {
        let request = FcmRequest {
            message: FcmMessage {
                token: &message.token,
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
            },
        };

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PushError::Connection(format!("Failed to connect to FCM: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::SendFailed(error_message(status, &body)));
        }

        let fcm_response: FcmResponse = response
            .json()
            .await
            .map_err(|e| PushError::SendFailed(format!("Failed to parse FCM response: {}", e)))?;

        Ok(fcm_response.name)
    }
}

/// FCM reports failures as `{"error": {"message": ...}}`; fall back to the
/// raw body for anything else.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<FcmErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => format!("FCM API returned error status {}: {}", status, body),
    }
}

/// Polls at most `limit` futures at once; outputs keep the input order.
async fn run_in_order<F>(pending: Vec<F>, limit: usize) -> Vec<F::Output>
where
    F: Future,
{
    stream::iter(pending).buffered(limit).collect().await
}

#[async_trait]
impl PushProvider for FcmProvider {
    async fn send(&self, message: &PushMessage) -> Result<String, PushError> {
        let access_token = self.auth.access_token().await?;
        let message_id = self.send_with_token(message, &access_token).await?;

        tracing::info!(message_id = %message_id, "Push notification sent via FCM");

        Ok(message_id)
    }

    async fn send_each(&self, messages: &[PushMessage]) -> Result<BatchResponse, PushError> {
        let access_token = self.auth.access_token().await?;

        let pending: Vec<_> = messages
            .iter()
            .map(|message| self.send_with_token(message, &access_token))
            .collect();
        let responses = run_in_order(pending, MAX_IN_FLIGHT).await;

        for (message, response) in messages.iter().zip(&responses) {
            if let Err(e) = response {
                tracing::warn!(token = %message.token, error = %e, "FCM delivery failed");
            }
        }

        Ok(BatchResponse { responses })
    }
}
