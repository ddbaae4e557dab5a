use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::PushError;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceAccountClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl ServiceAccountClaims {
    /// Claims for a one-hour assertion issued at `now`.
    pub fn new(client_email: &str, now: DateTime<Utc>) -> Self {
        Self {
            iss: client_email.to_string(),
            scope: FCM_SCOPE.to_string(),
            aud: TOKEN_URL.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    // Refresh a minute early so a token never expires mid-request.
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(60) < self.expires_at
    }
}

/// Mints and caches OAuth2 access tokens for a Google service account.
pub struct ServiceAccountAuth {
    client_email: String,
    key: EncodingKey,
    client: Client,
    cached: RwLock<Option<AccessToken>>,
}

impl ServiceAccountAuth {
    pub fn new(client_email: &str, private_key_pem: &str, client: Client) -> Result<Self, PushError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
            PushError::Configuration(format!("Invalid FIREBASE_PRIVATE_KEY: {}", e))
        })?;

        Ok(Self {
            client_email: client_email.to_string(),
            key,
            client,
            cached: RwLock::new(None),
        })
    }

    pub async fn access_token(&self) -> Result<String, PushError> {
        let now = Utc::now();

        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.token.clone());
            }
        }

        let token = self.fetch_token(now).await?;
        let value = token.token.clone();
        *cached = Some(token);

        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, PushError> {
        let claims = ServiceAccountClaims::new(&self.client_email, now);

        encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(|e| {
            PushError::Authentication(format!("Failed to sign service account assertion: {}", e))
        })
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<AccessToken, PushError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                PushError::Connection(format!("Failed to connect to Google OAuth2: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Authentication(format!(
                "Google OAuth2 returned error status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            PushError::Authentication(format!("Failed to parse Google OAuth2 response: {}", e))
        })?;

        tracing::debug!(expires_in = token.expires_in, "Obtained FCM access token");

        Ok(AccessToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_cover_one_hour() {
        let now = Utc::now();
        let claims = ServiceAccountClaims::new("relay@project.iam.gserviceaccount.com", now);

        assert_eq!(claims.iss, "relay@project.iam.gserviceaccount.com");
        assert_eq!(claims.scope, FCM_SCOPE);
        assert_eq!(claims.aud, TOKEN_URL);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_freshness() {
        let now = Utc::now();
        let token = AccessToken {
            token: "ya29.token".to_string(),
            expires_at: now + Duration::seconds(3599),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(3540)));
    }

    #[test]
    fn test_rejects_invalid_key() {
        let result = ServiceAccountAuth::new("relay@example.com", "not a pem", Client::new());
        assert!(matches!(result, Err(PushError::Configuration(_))));
    }
}
