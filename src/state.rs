use anyhow::Context;
use std::sync::Arc;

use crate::{
    notification::{notification_repository::NotificationRepository, NotificationService},
    push::PushProvider,
    token::token_repository::TokenRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub token_repository: Arc<dyn TokenRepository>,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(
        token_repository: Arc<dyn TokenRepository>,
        notification_repository: Arc<dyn NotificationRepository>,
        push_provider: Arc<dyn PushProvider>,
    ) -> Self {
        let notification_service = NotificationService::new(
            token_repository.clone(),
            notification_repository,
            push_provider,
        );

        Self {
            token_repository,
            notification_service,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub fcm: FcmConfig,
}

#[derive(Clone)]
pub struct FcmConfig {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            fcm: FcmConfig {
                project_id: required("FIREBASE_PROJECT_ID")?,
                client_email: required("FIREBASE_CLIENT_EMAIL")?,
                private_key: unescape_newlines(&required("FIREBASE_PRIVATE_KEY")?),
            },
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{} must be set", name))
}

/// Private keys pasted into a single-line env var carry literal `\n`.
fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}
