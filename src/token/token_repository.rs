use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::token_models::TokenRegistration;
use crate::error::Result;

/// Storage for the one destination token each user has registered.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Inserts the registration, or overwrites token and timestamp when the
    /// user already has one.
    async fn upsert(
        &self,
        user_id: &str,
        fcm_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<TokenRegistration>;

    async fn find_by_user(&self, user_id: &str) -> Result<Option<TokenRegistration>>;

    async fn find_all(&self) -> Result<Vec<TokenRegistration>>;
}

#[derive(Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn upsert(
        &self,
        user_id: &str,
        fcm_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<TokenRegistration> {
        let registration = sqlx::query_as::<_, TokenRegistration>(
            "INSERT INTO user_tokens (user_id, fcm_token, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id)
             DO UPDATE SET fcm_token = EXCLUDED.fcm_token, updated_at = EXCLUDED.updated_at
             RETURNING user_id, fcm_token, updated_at"
        )
        .bind(user_id)
        .bind(fcm_token)
        .bind(updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(registration)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<TokenRegistration>> {
        let registration = sqlx::query_as::<_, TokenRegistration>(
            "SELECT user_id, fcm_token, updated_at FROM user_tokens WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    async fn find_all(&self) -> Result<Vec<TokenRegistration>> {
        let registrations = sqlx::query_as::<_, TokenRegistration>(
            "SELECT user_id, fcm_token, updated_at FROM user_tokens"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }
}
