use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use super::notification_dto::{
    BroadcastNotificationRequest, BroadcastNotificationResponse, MarkReadResponse,
    NotificationListResponse, SendNotificationRequest, SendNotificationResponse,
};
use crate::{
    error::{AppError, Result},
    extract::AppJson,
    state::AppState,
};

/// Send a notification to one user's registered token
#[utoipa::path(
    post,
    path = "/api/send-notification",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification sent", body = SendNotificationResponse),
        (status = 400, description = "userId, title, and body are required"),
        (status = 404, description = "User token not found"),
        (status = 500, description = "Datastore or push provider failure")
    ),
    tag = "notifications"
)]
pub async fn send_notification(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    payload
        .validate()
        .map_err(|_| AppError::Validation("userId, title, and body are required".to_string()))?;

    let user_id = payload.user_id.unwrap_or_default();
    let title = payload.title.unwrap_or_default();
    let body = payload.body.unwrap_or_default();

    let message_id = state
        .notification_service
        .send_to_user(&user_id, &title, &body, payload.data.unwrap_or_default())
        .await?;

    Ok(Json(SendNotificationResponse {
        success: true,
        message_id,
    }))
}

/// Get a user's notification history, newest first
#[utoipa::path(
    get,
    path = "/api/notifications/{userId}",
    params(
        ("userId" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "List of notifications", body = NotificationListResponse),
        (status = 500, description = "Datastore failure")
    ),
    tag = "notifications"
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<NotificationListResponse>> {
    let notifications = state.notification_service.list_for_user(&user_id).await?;

    Ok(Json(NotificationListResponse { notifications }))
}

/// Mark notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/{notificationId}/read",
    params(
        ("notificationId" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = MarkReadResponse),
        (status = 400, description = "notificationId is not a UUID; rejected here instead of failing in the datastore"),
        (status = 500, description = "Datastore failure")
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<MarkReadResponse>> {
    let notification_id = Uuid::parse_str(&notification_id)
        .map_err(|_| AppError::Validation("notificationId must be a valid UUID".to_string()))?;

    state.notification_service.mark_read(notification_id).await?;

    Ok(Json(MarkReadResponse { success: true }))
}

/// Send a notification to every registered token
#[utoipa::path(
    post,
    path = "/api/broadcast-notification",
    request_body = BroadcastNotificationRequest,
    responses(
        (status = 200, description = "Broadcast sent", body = BroadcastNotificationResponse),
        (status = 400, description = "title and body are required"),
        (status = 500, description = "Datastore or push provider failure")
    ),
    tag = "notifications"
)]
pub async fn broadcast_notification(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BroadcastNotificationRequest>,
) -> Result<Json<BroadcastNotificationResponse>> {
    payload
        .validate()
        .map_err(|_| AppError::Validation("title and body are required".to_string()))?;

    let title = payload.title.unwrap_or_default();
    let body = payload.body.unwrap_or_default();

    let outcome = state
        .notification_service
        .broadcast(&title, &body, payload.data.unwrap_or_default())
        .await?;

    Ok(Json(BroadcastNotificationResponse {
        success: true,
        success_count: outcome.success_count,
        failure_count: outcome.failure_count,
    }))
}
