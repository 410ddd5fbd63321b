//! Access tokens for app-only Graph access.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{GRAPH_SCOPE, GraphConfig};
use crate::error::AuthError;
use crate::model::TokenResponse;

/// Tokens are renewed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the endpoint does not report one.
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

/// Source of bearer tokens for Graph requests.
pub trait TokenSupplier: Send + Sync {
    /// A token valid for at least the next request.
    fn access_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send;
}

/// A fixed bearer token acquired out of band.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenSupplier for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// OAuth2 client-credentials flow against the identity platform.
///
/// The token is kept in memory and renewed shortly before it expires, so
/// long traversals do not start failing half-way through.
pub struct ClientCredentials {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentials {
    pub fn new(http: reqwest::Client, config: &GraphConfig) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            cached: Mutex::new(None),
        }
    }

    async fn request(&self) -> Result<CachedToken, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let value = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LIFETIME);

        debug!(expires_in_secs = lifetime.as_secs(), "Access token acquired");
        Ok(CachedToken {
            value,
            refresh_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        })
    }
}

impl TokenSupplier for ClientCredentials {
    async fn access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }

        let token = self.request().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
