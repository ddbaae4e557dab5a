use axum::{extract::State, Json};
use chrono::Utc;
use validator::Validate;

use super::token_dto::{RegisterTokenRequest, RegisterTokenResponse};
use crate::{
    error::{AppError, Result},
    extract::AppJson,
    state::AppState,
};

/// Register (or replace) the push token for a user
#[utoipa::path(
    post,
    path = "/api/register-token",
    request_body = RegisterTokenRequest,
    responses(
        (status = 200, description = "Token registered", body = RegisterTokenResponse),
        (status = 400, description = "userId and fcmToken are required"),
        (status = 500, description = "Datastore failure")
    ),
    tag = "tokens"
)]
pub async fn register_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterTokenRequest>,
) -> Result<Json<RegisterTokenResponse>> {
    payload
        .validate()
        .map_err(|_| AppError::Validation("userId and fcmToken are required".to_string()))?;

    // Both fields are present and non-empty once validation passes.
    let user_id = payload.user_id.unwrap_or_default();
    let fcm_token = payload.fcm_token.unwrap_or_default();

    state
        .token_repository
        .upsert(&user_id, &fcm_token, Utc::now())
        .await?;

    tracing::info!(user_id = %user_id, "Registered push token");

    Ok(Json(RegisterTokenResponse {
        success: true,
        message: "Token registered successfully".to_string(),
    }))
}
