//! Cloud Translation v3 adapter

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::core::config::AppConfig;
use crate::core::errors::{Result, TranslatorError};
use crate::core::models::OperationHandle;
use crate::storage::auth::AccessTokenProvider;
use crate::translate::service::{BatchRequest, DocumentRequest, DocumentTranslator};

/// Translation client over the v3 REST surface
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    /// Shared HTTP client
    client: reqwest::Client,
    /// Base URL, overridable for tests
    endpoint: String,
    /// Request parent: `projects/{project}/locations/{location}`
    parent: String,
    /// Ambient credential provider
    auth: AccessTokenProvider,
    /// Delay between operation polls
    poll_interval: Duration,
    /// Upper bound on operation polls
    max_poll_attempts: u32,
}

/// Normalize a non-OK provider response into the error taxonomy
///
/// The raw body travels verbatim inside the variant so an operator can see
/// exactly what the provider said.
fn normalize_failure(status: u16, body: &str, source: &str, dest: &str) -> TranslatorError {
    let lowered = body.to_ascii_lowercase();
    match status {
        401 | 403 => TranslatorError::Unauthenticated {
            message: body.to_string(),
        },
        400 if lowered.contains("language") => TranslatorError::InvalidLanguagePair {
            src: source.to_string(),
            dest: dest.to_string(),
        },
        400 if lowered.contains("mime") || lowered.contains("format") || lowered.contains("document") => {
            TranslatorError::UnsupportedDocumentFormat {
                message: body.to_string(),
            }
        }
        429 | 500..=599 => TranslatorError::ProviderUnavailable {
            message: format!("{}: {}", status, body),
        },
        _ => TranslatorError::ProviderRejected {
            message: body.to_string(),
        },
    }
}

/// Extract the inline translated bytes from a sync response
fn parse_document_response(json: &serde_json::Value) -> Result<Vec<u8>> {
    let encoded = json["documentTranslation"]["byteStreamOutputs"]
        .get(0)
        .and_then(|v| v.as_str())
        .ok_or_else(|| TranslatorError::InvalidResponse {
            message: "no byte stream in response".to_string(),
        })?;

    BASE64
        .decode(encoded)
        .map_err(|e| TranslatorError::InvalidResponse {
            message: format!("byte stream is not valid base64: {}", e),
        })
}

/// Read the page count from a terminal operation resource
fn parse_total_pages(json: &serde_json::Value) -> u64 {
    json["metadata"]["totalPages"]
        .as_u64()
        .or_else(|| json["response"]["totalPages"].as_u64())
        .unwrap_or(0)
}

impl GoogleTranslator {
    /// Create a translator bound to a project and location
    pub fn new(client: reqwest::Client, config: &AppConfig, auth: AccessTokenProvider) -> Self {
        Self {
            client,
            endpoint: config.translation_endpoint.clone(),
            parent: config.parent(),
            auth,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts,
        }
    }

    /// POST a request body to `{parent}:{verb}` and return the parsed JSON
    async fn call(
        &self,
        verb: &str,
        body: &serde_json::Value,
        source: &str,
        dest: &str,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/v3/{}:{}", self.endpoint, self.parent, verb);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.auth.token().await?)
            .json(body)
            .send()
            .await
            .map_err(|e| TranslatorError::ProviderUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(normalize_failure(status.as_u16(), &text, source, dest));
        }

        response
            .json()
            .await
            .map_err(|e| TranslatorError::InvalidResponse {
                message: e.to_string(),
            })
    }

    /// Fetch the current state of a long-running operation
    async fn fetch_operation(&self, handle: &OperationHandle) -> Result<serde_json::Value> {
        let url = format!("{}/v3/{}", self.endpoint, handle);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.auth.token().await?)
            .send()
            .await
            .map_err(|e| TranslatorError::ProviderUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(normalize_failure(status.as_u16(), &text, "", ""));
        }

        response
            .json()
            .await
            .map_err(|e| TranslatorError::InvalidResponse {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl DocumentTranslator for GoogleTranslator {
    async fn translate_document(&self, request: &DocumentRequest) -> Result<Vec<u8>> {
        let body = serde_json::json!({
            "source_language_code": request.source_code,
            "target_language_code": request.dest_code,
            "document_input_config": {
                "gcs_source": {"input_uri": request.input_uri},
                "mime_type": request.mime_type,
            },
            "document_output_config": {
                "gcs_destination": {"output_uri_prefix": request.output_uri_prefix}
            },
        });

        debug!(
            "Translating {} from {} to {}",
            request.input_uri, request.source_code, request.dest_code
        );

        // One-shot: a failed user-initiated translation is resubmitted by
        // the user, not retried here.
        let json = self
            .call(
                "translateDocument",
                &body,
                &request.source_code,
                &request.dest_code,
            )
            .await?;

        parse_document_response(&json)
    }

    async fn start_batch(&self, request: &BatchRequest) -> Result<OperationHandle> {
        let body = serde_json::json!({
            "source_language_code": request.source_code,
            "target_language_codes": request.dest_codes,
            "input_configs": [{
                "gcs_source": {"input_uri": request.input_uri},
            }],
            "output_config": {
                "gcs_destination": {"output_uri_prefix": request.output_uri_prefix}
            },
        });

        let dest = request.dest_codes.join(",");
        let json = self
            .call("batchTranslateDocument", &body, &request.source_code, &dest)
            .await?;

        let name = json["name"]
            .as_str()
            .ok_or_else(|| TranslatorError::InvalidResponse {
                message: "no operation name in response".to_string(),
            })?;

        info!("Batch translation submitted as operation {}", name);
        Ok(OperationHandle(name.to_string()))
    }

    async fn await_operation(&self, handle: &OperationHandle) -> Result<u64> {
        for attempt in 0..self.max_poll_attempts {
            if attempt > 0 {
                sleep(self.poll_interval).await;
            }

            let json = self.fetch_operation(handle).await?;

            if !json["done"].as_bool().unwrap_or(false) {
                debug!("Waiting for operation {} to complete", handle);
                continue;
            }

            if let Some(error) = json.get("error") {
                return Err(TranslatorError::ProviderRejected {
                    message: error.to_string(),
                });
            }

            let total_pages = parse_total_pages(&json);
            info!("Operation {} done, total pages: {}", handle, total_pages);
            return Ok(total_pages);
        }

        Err(TranslatorError::OperationTimeout {
            name: handle.to_string(),
        })
    }
}
