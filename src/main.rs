mod db;
mod error;
mod extract;
mod health;
mod notification;
mod push;
mod routes;
mod state;
mod token;

#[cfg(test)]
mod test_support;

use anyhow::Context;
use db::create_pool;
use notification::PgNotificationRepository;
use push::FcmProvider;
use routes::create_router;
use state::{AppState, Config};
use std::sync::Arc;
use token::PgTokenRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,push_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let push_provider = FcmProvider::new(&config.fcm).context("Failed to initialize FCM")?;

    let state = AppState::new(
        Arc::new(PgTokenRepository::new(db.clone())),
        Arc::new(PgNotificationRepository::new(db)),
        Arc::new(push_provider),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
