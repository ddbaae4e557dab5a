use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    notification_models::{NewNotification, Notification},
    notification_repository::NotificationRepository,
};
use crate::{
    error::{AppError, Result},
    push::{PushMessage, PushProvider},
    token::token_repository::TokenRepository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub success_count: usize,
    pub failure_count: usize,
}

/// Sends push notifications and keeps their history.
#[derive(Clone)]
pub struct NotificationService {
    tokens: Arc<dyn TokenRepository>,
    notifications: Arc<dyn NotificationRepository>,
    push: Arc<dyn PushProvider>,
}

impl NotificationService {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        notifications: Arc<dyn NotificationRepository>,
        push: Arc<dyn PushProvider>,
    ) -> Self {
        Self {
            tokens,
            notifications,
            push,
        }
    }

    /// Delivers to the user's registered token, records the send and returns
    /// the provider message id.
    pub async fn send_to_user(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        data: Map<String, Value>,
    ) -> Result<String> {
        let registration = self
            .tokens
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User token not found".to_string()))?;

        let message = PushMessage::new(&registration.fcm_token, title, body, &data);
        let message_id = self.push.send(&message).await?;

        let record = NewNotification {
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data,
            sent_at: Utc::now(),
            firebase_message_id: Some(message_id.clone()),
        };

        // The push has already gone out; a failed insert is reported but not undone.
        if let Err(e) = self.notifications.create(&record).await {
            tracing::error!(
                user_id = %user_id,
                message_id = %message_id,
                "Notification delivered but not recorded: {}",
                e
            );
            return Err(e);
        }

        tracing::info!(user_id = %user_id, message_id = %message_id, "Sent notification");

        Ok(message_id)
    }

    /// Sends to every registration and records one row per recipient,
    /// whatever its delivery outcome.
    pub async fn broadcast(
        &self,
        title: &str,
        body: &str,
        data: Map<String, Value>,
    ) -> Result<BroadcastOutcome> {
        let registrations = self.tokens.find_all().await?;

        if registrations.is_empty() {
            tracing::info!("Broadcast skipped: no registered tokens");
            return Ok(BroadcastOutcome {
                success_count: 0,
                failure_count: 0,
            });
        }

        let messages: Vec<PushMessage> = registrations
            .iter()
            .map(|r| PushMessage::new(&r.fcm_token, title, body, &data))
            .collect();

        let response = self.push.send_each(&messages).await?;

        let sent_at = Utc::now();
        let records: Vec<NewNotification> = registrations
            .into_iter()
            .map(|r| NewNotification {
                user_id: r.user_id,
                title: title.to_string(),
                body: body.to_string(),
                data: data.clone(),
                sent_at,
                firebase_message_id: None,
            })
            .collect();

        self.notifications.create_many(&records).await?;

        let outcome = BroadcastOutcome {
            success_count: response.success_count(),
            failure_count: response.failure_count(),
        };

        tracing::info!(
            recipients = records.len(),
            success_count = outcome.success_count,
            failure_count = outcome.failure_count,
            "Broadcast notification"
        );

        Ok(outcome)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        self.notifications.find_all_by_user(user_id).await
    }

    /// Stamps `read_at` without checking that the notification exists.
    pub async fn mark_read(&self, notification_id: Uuid) -> Result<()> {
        let rows = self
            .notifications
            .mark_as_read(notification_id, Utc::now())
            .await?;

        if rows == 0 {
            tracing::debug!(notification_id = %notification_id, "Mark read matched no notification");
        }

        Ok(())
    }
}
