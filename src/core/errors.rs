//! Custom error types for translation orchestration

use thiserror::Error;

/// Errors produced while validating, staging or translating a document
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// Language name or code outside the supported set
    #[error("Language not supported: {name}")]
    UnsupportedLanguage {
        /// The rejected display name or code
        name: String,
    },

    /// File extension outside the supported set
    #[error("Extension not supported: {extension}. Supported extensions: .doc, .docx, .pdf, .ppt, .pptx, .xls, .xlsx")]
    UnsupportedFormat {
        /// The rejected extension, leading dot included
        extension: String,
    },

    /// Source and destination language are identical
    #[error("Source and destination language cannot be the same")]
    SameLanguage,

    /// Submission carried no file bytes
    #[error("No file was provided")]
    MissingFile,

    /// Object storage operation failed
    #[error("Storage error during {operation}: {message}")]
    Storage {
        /// Which storage call failed (upload, list, delete, copy)
        operation: String,
        /// Backend-reported failure
        message: String,
    },

    /// Move to the error location found an existing destination object
    #[error("Object already exists at error location: {key}")]
    RoutingConflict {
        /// Destination key that was already occupied
        key: String,
    },

    /// Credentials missing, expired or rejected
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// Credential failure detail
        message: String,
    },

    /// Provider rejected the language pair
    #[error("Invalid language pair: {src} -> {dest}")]
    InvalidLanguagePair {
        /// Source language code sent to the provider
        src: String,
        /// Destination language code sent to the provider
        dest: String,
    },

    /// Provider rejected the document format
    #[error("Unsupported document format: {message}")]
    UnsupportedDocumentFormat {
        /// Provider-reported detail
        message: String,
    },

    /// Provider unreachable, overloaded or failing internally
    #[error("Translation provider unavailable: {message}")]
    ProviderUnavailable {
        /// Transport or status detail
        message: String,
    },

    /// Provider refused the request; message kept verbatim for diagnosis
    #[error("Translation provider rejected the request: {message}")]
    ProviderRejected {
        /// Raw provider response body
        message: String,
    },

    /// Long-running operation never reached a terminal state
    #[error("Operation did not complete: {name}")]
    OperationTimeout {
        /// Operation resource name
        name: String,
    },

    /// Response body did not match the expected shape
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// What was missing or malformed
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslatorError {
    /// True for failures rejected before any side effect was attempted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TranslatorError::UnsupportedLanguage { .. }
                | TranslatorError::UnsupportedFormat { .. }
                | TranslatorError::SameLanguage
                | TranslatorError::MissingFile
        )
    }
}

impl From<anyhow::Error> for TranslatorError {
    fn from(err: anyhow::Error) -> Self {
        TranslatorError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_grouping() {
        assert!(TranslatorError::SameLanguage.is_validation());
        assert!(TranslatorError::UnsupportedFormat {
            extension: ".txt".to_string()
        }
        .is_validation());

        let service = TranslatorError::ProviderRejected {
            message: "quota".to_string(),
        };
        assert!(!service.is_validation());
    }
}
