use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::notification_models::{NewNotification, Notification};
use crate::error::Result;

// Six binds per row keeps each statement well under Postgres' 65535 limit.
const INSERT_CHUNK_ROWS: usize = 1000;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> Result<Notification>;

    /// Inserts every row; returns the number written.
    async fn create_many(&self, notifications: &[NewNotification]) -> Result<u64>;

    /// Most recently sent first.
    async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<Notification>>;

    /// Returns the number of rows touched, which may be zero.
    async fn mark_as_read(&self, id: Uuid, read_at: DateTime<Utc>) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<Notification> {
        let created = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, title, body, data, sent_at, firebase_message_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
        .bind(&notification.user_id)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(Value::Object(notification.data.clone()))
        .bind(notification.sent_at)
        .bind(&notification.firebase_message_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn create_many(&self, notifications: &[NewNotification]) -> Result<u64> {
        let mut written = 0;

        for chunk in notifications.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO notifications (user_id, title, body, data, sent_at, firebase_message_id) ",
            );

            builder.push_values(chunk, |mut row, notification| {
                row.push_bind(notification.user_id.clone())
                    .push_bind(notification.title.clone())
                    .push_bind(notification.body.clone())
                    .push_bind(Value::Object(notification.data.clone()))
                    .push_bind(notification.sent_at)
                    .push_bind(notification.firebase_message_id.clone());
            });

            written += builder.build().execute(&self.pool).await?.rows_affected();
        }

        Ok(written)
    }

    async fn find_all_by_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY sent_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn mark_as_read(&self, id: Uuid, read_at: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("UPDATE notifications SET read_at = $1 WHERE id = $2")
            .bind(read_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
