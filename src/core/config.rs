//! Configuration management

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::registry;

/// Runtime configuration for the translation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cloud project the translation requests are billed to
    pub project_id: String,
    /// Service region, e.g. `us-central1`
    pub location: String,
    /// Scratch bucket for interactive jobs
    pub staging_bucket: String,
    /// Bucket watched for batch input objects
    pub input_bucket: String,
    /// Bucket batch results are written to
    pub output_bucket: String,
    /// Bucket malformed batch inputs are routed to
    pub error_bucket: String,
    /// Target language codes for batch jobs
    pub batch_target_codes: Vec<String>,
    /// Base URL of the translation API
    pub translation_endpoint: String,
    /// Base URL of the object-storage API
    pub storage_endpoint: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay between long-running operation polls in milliseconds
    pub poll_interval_ms: u64,
    /// Upper bound on operation polls before giving up
    pub max_poll_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project_id: std::env::var("PROJECT_ID").unwrap_or_default(),
            location: "us-central1".to_string(),
            staging_bucket: "translation_hub_tmp".to_string(),
            input_bucket: "docs_input".to_string(),
            output_bucket: "docs_output".to_string(),
            error_bucket: "docs_error".to_string(),
            batch_target_codes: vec!["en".to_string()],
            translation_endpoint: "https://translation.googleapis.com".to_string(),
            storage_endpoint: "https://storage.googleapis.com".to_string(),
            timeout_ms: 30000,
            poll_interval_ms: 2000,
            max_poll_attempts: 150,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let project_id = std::env::var("PROJECT_ID")
            .map_err(|_| anyhow::anyhow!("PROJECT_ID environment variable is required"))?;

        let location =
            std::env::var("LOCATION").unwrap_or_else(|_| "us-central1".to_string());

        let staging_bucket = std::env::var("TMP_BUCKET")
            .unwrap_or_else(|_| "translation_hub_tmp".to_string());

        let input_bucket =
            std::env::var("INPUT_BUCKET").unwrap_or_else(|_| "docs_input".to_string());

        let output_bucket =
            std::env::var("OUTPUT_BUCKET").unwrap_or_else(|_| "docs_output".to_string());

        let error_bucket =
            std::env::var("ERROR_BUCKET").unwrap_or_else(|_| "docs_error".to_string());

        let batch_target_codes = std::env::var("BATCH_TARGET_LANGS")
            .unwrap_or_else(|_| "en".to_string())
            .split(',')
            .map(|code| code.trim().to_ascii_lowercase())
            .filter(|code| !code.is_empty())
            .collect();

        let translation_endpoint = std::env::var("TRANSLATION_ENDPOINT")
            .unwrap_or_else(|_| "https://translation.googleapis.com".to_string());

        let storage_endpoint = std::env::var("STORAGE_ENDPOINT")
            .unwrap_or_else(|_| "https://storage.googleapis.com".to_string());

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        let poll_interval_ms = std::env::var("OPERATION_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse::<u64>()?;

        let max_poll_attempts = std::env::var("OPERATION_MAX_POLLS")
            .unwrap_or_else(|_| "150".to_string())
            .parse::<u32>()?;

        Ok(Self {
            project_id,
            location,
            staging_bucket,
            input_bucket,
            output_bucket,
            error_bucket,
            batch_target_codes,
            translation_endpoint,
            storage_endpoint,
            timeout_ms,
            poll_interval_ms,
            max_poll_attempts,
        })
    }

    /// Load and validate configuration
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::from_env()?;
        config.validate()?;
        info!(
            "Configuration loaded for project {} in {}",
            config.project_id, config.location
        );
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.project_id.is_empty() {
            return Err(anyhow::anyhow!("project_id is required"));
        }

        if self.location.is_empty() {
            return Err(anyhow::anyhow!("location is required"));
        }

        for bucket in [
            &self.staging_bucket,
            &self.input_bucket,
            &self.output_bucket,
            &self.error_bucket,
        ] {
            if bucket.is_empty() {
                return Err(anyhow::anyhow!("bucket names must not be empty"));
            }
        }

        if self.input_bucket == self.error_bucket {
            return Err(anyhow::anyhow!(
                "input and error bucket must differ, error routing would collide"
            ));
        }

        if self.batch_target_codes.is_empty() {
            return Err(anyhow::anyhow!("at least one batch target language is required"));
        }

        for code in &self.batch_target_codes {
            if !registry::is_supported_code(code) {
                return Err(anyhow::anyhow!("unsupported batch target language: {}", code));
            }
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        if self.max_poll_attempts == 0 {
            return Err(anyhow::anyhow!("max_poll_attempts must be greater than 0"));
        }

        Ok(())
    }

    /// Request parent resource: `projects/{project}/locations/{location}`
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.location)
    }
}
