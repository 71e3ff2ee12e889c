//! Access token acquisition
//!
//! The Graph client attaches `Authorization: Bearer <token>` to every request.
//! Tokens come from a [`TokenProvider`]: either a fixed token handed in by the
//! caller, or an OAuth2 client-credentials exchange cached until shortly
//! before expiry.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::{ClientError, ClientResult};

/// Source of bearer tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> ClientResult<String>;
}

/// Pre-acquired token
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> ClientResult<String> {
        Ok(self.0.clone())
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Client-credentials token provider with an in-memory cache
#[derive(Debug)]
pub struct ClientCredentials {
    http_client: reqwest::Client,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: RwLock<Option<CachedToken>>,
    /// Refresh this long before expiry (default: 5 minutes)
    grace_period: Duration,
}

impl ClientCredentials {
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        scope: impl Into<String>,
        timeout_secs: u64,
    ) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: scope.into(),
            cached: RwLock::new(None),
            grace_period: Duration::minutes(5),
        })
    }

    async fn acquire(&self) -> ClientResult<CachedToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| ClientError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Auth(format!("Malformed token response: {e}")))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentials {
    async fn access_token(&self) -> ClientResult<String> {
        {
            let cache = self.cached.read().await;
            if let Some(token) = cache.as_ref()
                && !token.is_expired(self.grace_period)
            {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!(endpoint = %self.token_endpoint, "Refreshing access token");
        let fresh = self.acquire().await?;
        let token = fresh.access_token.clone();
        *self.cached.write().await = Some(fresh);
        Ok(token)
    }
}
