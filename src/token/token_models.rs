use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TokenRegistration {
    pub user_id: String,
    pub fcm_token: String,
    pub updated_at: DateTime<Utc>,
}
