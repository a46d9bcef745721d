//! GCS adapter for the object-store contract
//!
//! Talks to the storage JSON API over plain HTTP. Object keys are
//! percent-encoded wherever they appear in a URL path.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::info;

use crate::core::errors::{Result, TranslatorError};
use crate::storage::auth::AccessTokenProvider;
use crate::storage::store::ObjectStore;

/// One entry of a list response
#[derive(Debug, Deserialize)]
struct ListedObject {
    /// Object key
    name: String,
}

/// List response shape; `items` is absent when nothing matches
#[derive(Debug, Deserialize)]
struct ListResponse {
    /// Matched objects
    #[serde(default)]
    items: Vec<ListedObject>,
}

/// Object store backed by the GCS JSON API
#[derive(Debug, Clone)]
pub struct GcsStore {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Base URL, overridable for tests
    endpoint: String,
    /// Ambient credential provider
    auth: AccessTokenProvider,
}

/// Percent-encode an object key for use in a URL path
fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, NON_ALPHANUMERIC).to_string()
}

/// Map a transport failure to a storage error tagged with the operation
fn storage_error(operation: &str, err: impl std::fmt::Display) -> TranslatorError {
    TranslatorError::Storage {
        operation: operation.to_string(),
        message: err.to_string(),
    }
}

impl GcsStore {
    /// Create a store against an endpoint
    pub fn new(client: reqwest::Client, endpoint: String, auth: AccessTokenProvider) -> Self {
        Self {
            client,
            endpoint,
            auth,
        }
    }

    /// Turn a non-success response into a storage error carrying the body
    async fn fail(operation: &str, response: reqwest::Response) -> TranslatorError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        TranslatorError::Storage {
            operation: operation.to_string(),
            message: format!("{}: {}", status, body),
        }
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoint,
            bucket,
            encode_key(key)
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.auth.token().await?)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| storage_error("upload", e))?;

        if !response.status().is_success() {
            return Err(Self::fail("upload", response).await);
        }

        info!("File uploaded to gs://{}/{}", bucket, key);
        Ok(())
    }

    async fn list_by_prefix(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let url = format!("{}/storage/v1/b/{}/o", self.endpoint, bucket);

        let response = self
            .client
            .get(&url)
            .query(&[("prefix", prefix)])
            .bearer_auth(self.auth.token().await?)
            .send()
            .await
            .map_err(|e| storage_error("list", e))?;

        if !response.status().is_success() {
            return Err(Self::fail("list", response).await);
        }

        let listing: ListResponse = response.json().await.map_err(|e| storage_error("list", e))?;
        Ok(listing.items.into_iter().map(|item| item.name).collect())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            bucket,
            encode_key(key)
        );

        let response = self
            .client
            .delete(&url)
            .bearer_auth(self.auth.token().await?)
            .send()
            .await
            .map_err(|e| storage_error("delete", e))?;

        // An already-deleted object keeps prefix cleanup idempotent
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        if !response.status().is_success() {
            return Err(Self::fail("delete", response).await);
        }

        Ok(())
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        only_if_absent: bool,
    ) -> Result<()> {
        let mut url = format!(
            "{}/storage/v1/b/{}/o/{}/copyTo/b/{}/o/{}",
            self.endpoint,
            src_bucket,
            encode_key(src_key),
            dst_bucket,
            encode_key(dst_key)
        );

        if only_if_absent {
            url.push_str("?ifGenerationMatch=0");
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.auth.token().await?)
            .header("Content-Length", "0")
            .send()
            .await
            .map_err(|e| storage_error("copy", e))?;

        if only_if_absent && response.status() == reqwest::StatusCode::PRECONDITION_FAILED {
            return Err(TranslatorError::RoutingConflict {
                key: dst_key.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(Self::fail("copy", response).await);
        }

        Ok(())
    }
}
