//! Translation provider contract

use async_trait::async_trait;

use crate::core::errors::Result;
use crate::core::models::OperationHandle;

/// Request for the synchronous single-document call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    /// Source language code
    pub source_code: String,
    /// Destination language code
    pub dest_code: String,
    /// Storage-addressed URI of the staged input
    pub input_uri: String,
    /// Prefix the provider writes intermediate output under
    pub output_uri_prefix: String,
    /// MIME type of the input document
    pub mime_type: String,
}

/// Request for the asynchronous batch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Source language code
    pub source_code: String,
    /// Destination language codes
    pub dest_codes: Vec<String>,
    /// Storage-addressed URI of the input object
    pub input_uri: String,
    /// Prefix the provider writes translated documents under
    pub output_uri_prefix: String,
}

/// Operations of the external translation provider
///
/// The synchronous call blocks until the provider returns inline bytes or an
/// error; the batch pair submits a long-running operation and awaits its
/// terminal state. Every non-OK provider response is normalized into the
/// error taxonomy before it reaches the orchestrator.
#[async_trait]
pub trait DocumentTranslator: Send + Sync {
    /// Translate one document, returning the translated bytes inline
    async fn translate_document(&self, request: &DocumentRequest) -> Result<Vec<u8>>;

    /// Submit a batch translation, returning a pollable operation handle
    async fn start_batch(&self, request: &BatchRequest) -> Result<OperationHandle>;

    /// Block until the operation reaches a terminal state
    ///
    /// Returns the total translated page count on success.
    async fn await_operation(&self, handle: &OperationHandle) -> Result<u64>;
}
