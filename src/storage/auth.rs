//! Ambient access-token provider for Cloud APIs
//!
//! Tokens come from the environment or the metadata server, never from
//! embedded literals. Fetched tokens are cached until shortly before expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::errors::{Result, TranslatorError};

/// Env var consulted before the metadata server
const TOKEN_ENV_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Metadata endpoint serving default service-account tokens
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh margin before the reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// A fetched token and its expiry deadline
#[derive(Debug, Clone)]
struct CachedToken {
    /// Bearer token value
    value: String,
    /// Instant after which the token must not be reused
    expires_at: Instant,
}

/// Token response shape of the metadata server
#[derive(serde::Deserialize)]
struct TokenResponse {
    /// Bearer token value
    access_token: String,
    /// Remaining lifetime in seconds
    expires_in: u64,
}

/// Fetches bearer tokens from the ambient environment
#[derive(Debug, Clone)]
pub struct AccessTokenProvider {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Last token fetched from the metadata server
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl AccessTokenProvider {
    /// Create a provider sharing an existing HTTP client
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Current bearer token
    ///
    /// Resolution order: `GOOGLE_OAUTH_ACCESS_TOKEN`, then the cached
    /// metadata-server token, then a fresh metadata-server fetch.
    pub async fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                return Ok(token);
            }
        }

        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Instant::now() + EXPIRY_MARGIN {
                    return Ok(token.value.clone());
                }
            }
        }

        let fresh = self.fetch_from_metadata().await?;
        let value = fresh.value.clone();
        {
            let mut cached = self.cached.write().await;
            *cached = Some(fresh);
        }
        debug!("Refreshed access token from metadata server");
        Ok(value)
    }

    /// Ask the metadata server for a service-account token
    async fn fetch_from_metadata(&self) -> Result<CachedToken> {
        let response = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| TranslatorError::Unauthenticated {
                message: format!("metadata server unreachable: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(TranslatorError::Unauthenticated {
                message: format!("metadata server returned {}", response.status()),
            });
        }

        let body: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| TranslatorError::Unauthenticated {
                    message: format!("malformed token response: {}", e),
                })?;

        Ok(CachedToken {
            value: body.access_token,
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_token_wins() {
        std::env::set_var(TOKEN_ENV_VAR, "test_token");
        let provider = AccessTokenProvider::new(reqwest::Client::new());
        assert_eq!(provider.token().await.unwrap(), "test_token");
        std::env::remove_var(TOKEN_ENV_VAR);
    }
}
