use crate::{
    health::{self, HealthResponse},
    notification::{self, Notification},
    state::AppState,
    token::{self, TokenRegistration},
};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        token::token_handlers::register_token,
        notification::notification_handlers::send_notification,
        notification::notification_handlers::get_notifications,
        notification::notification_handlers::mark_notification_read,
        notification::notification_handlers::broadcast_notification,
    ),
    components(
        schemas(
            HealthResponse,
            TokenRegistration,
            token::RegisterTokenRequest,
            token::RegisterTokenResponse,
            Notification,
            notification::SendNotificationRequest,
            notification::SendNotificationResponse,
            notification::NotificationListResponse,
            notification::MarkReadResponse,
            notification::BroadcastNotificationRequest,
            notification::BroadcastNotificationResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "tokens", description = "Push token registration"),
        (name = "notifications", description = "Push delivery and history")
    )
)]
struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The list and mark-read routes share one parameter segment.
    let notification_routes = Router::new()
        .route("/:id", get(notification::get_notifications))
        .route("/:id/read", put(notification::mark_notification_read));

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/register-token", post(token::register_token))
        .route("/send-notification", post(notification::send_notification))
        .route(
            "/broadcast-notification",
            post(notification::broadcast_notification),
        )
        .nest("/notifications", notification_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
