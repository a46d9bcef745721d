//! Core data models for translation jobs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::errors::{Result, TranslatorError};
use crate::core::registry;

/// A file name split into stem, optional language tag and extension
///
/// A trailing `_xx` suffix is recognized as a language tag only when `xx` is
/// a supported code, so `contract_fr.docx` parses to stem `contract` while
/// `summary_v2.pdf` keeps its full stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    /// File name as submitted
    pub original: String,
    /// Stem before the extension, language tag still attached
    pub raw_stem: String,
    /// Stem with a recognized language tag stripped
    pub stem: String,
    /// Language tag found at the end of the stem, if any
    pub language_tag: Option<String>,
    /// Extension including the leading dot; empty when the name has none
    pub extension: String,
}

impl DocumentName {
    /// Parse a submitted file name
    pub fn parse(name: &str) -> Self {
        let (raw_stem, extension) = match name.rfind('.') {
            Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx..].to_string()),
            _ => (name.to_string(), String::new()),
        };

        let (stem, language_tag) = match raw_stem.rsplit_once('_') {
            Some((head, tail)) if !head.is_empty() && registry::is_supported_code(tail) => {
                (head.to_string(), Some(tail.to_ascii_lowercase()))
            }
            _ => (raw_stem.clone(), None),
        };

        Self {
            original: name.to_string(),
            raw_stem,
            stem,
            language_tag,
            extension,
        }
    }

    /// Staging key for this document: `{stem}/{original}`
    pub fn staging_key(&self) -> String {
        format!("{}/{}", self.stem, self.original)
    }

    /// Job-scoped staging prefix: `{stem}/`
    pub fn staging_prefix(&self) -> String {
        format!("{}/", self.stem)
    }

    /// Output file name for a destination code: `{stem}_{dest}{ext}`
    pub fn translated_name(&self, dest_code: &str) -> String {
        format!("{}_{}{}", self.stem, dest_code, self.extension)
    }

    /// Trailing two characters of the raw stem, lowercased
    ///
    /// The batch flow reads the source language from the end of the file
    /// name; `None` when the stem is shorter than two characters.
    pub fn source_hint(&self) -> Option<String> {
        let mut chars = self.raw_stem.chars();
        let last = chars.next_back()?;
        let second_last = chars.next_back()?;
        Some(
            format!("{}{}", second_last, last)
                .to_ascii_lowercase(),
        )
    }
}

/// A validated source/destination language pair
///
/// Both codes are members of the supported set and differ from each other.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    /// Source language code
    pub source: String,
    /// Destination language code
    pub dest: String,
}

impl LanguagePair {
    /// Build a pair from display names, resolving through the registry
    pub fn from_display_names(source: &str, dest: &str) -> Result<Self> {
        if source == dest {
            return Err(TranslatorError::SameLanguage);
        }
        Ok(Self {
            source: registry::language_code(source)?.to_string(),
            dest: registry::language_code(dest)?.to_string(),
        })
    }

    /// Build a pair from already-resolved codes
    pub fn from_codes(source: &str, dest: &str) -> Result<Self> {
        let source = source.to_ascii_lowercase();
        let dest = dest.to_ascii_lowercase();
        if !registry::is_supported_code(&source) {
            return Err(TranslatorError::UnsupportedLanguage { name: source });
        }
        if !registry::is_supported_code(&dest) {
            return Err(TranslatorError::UnsupportedLanguage { name: dest });
        }
        if source == dest {
            return Err(TranslatorError::SameLanguage);
        }
        Ok(Self { source, dest })
    }
}

/// An interactive submission: file bytes plus language display names
#[derive(Debug, Clone)]
pub struct Submission {
    /// Name of the uploaded file
    pub file_name: String,
    /// Raw document bytes
    pub bytes: Vec<u8>,
    /// Source language display name
    pub source_lang: String,
    /// Destination language display name
    pub dest_lang: String,
}

/// One accepted submission advancing through the staging pipeline
///
/// Owned exclusively by the orchestrator for its lifetime; the staged copies
/// under `staging_prefix` are removed on terminal success or failure.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    /// Parsed document name
    pub document: DocumentName,
    /// Validated language pair
    pub languages: LanguagePair,
    /// Resolved MIME type of the document
    pub mime_type: String,
    /// Bucket holding the staged input and intermediate output
    pub staging_bucket: String,
}

impl TranslationJob {
    /// Create a job bound to a staging bucket
    pub fn new(
        staging_bucket: &str,
        document: DocumentName,
        languages: LanguagePair,
        mime_type: &str,
    ) -> Self {
        Self {
            document,
            languages,
            mime_type: mime_type.to_string(),
            staging_bucket: staging_bucket.to_string(),
        }
    }

    /// Key of the staged input object
    pub fn staging_key(&self) -> String {
        self.document.staging_key()
    }

    /// Prefix shared by every staged object of this job
    pub fn staging_prefix(&self) -> String {
        self.document.staging_prefix()
    }

    /// Storage-addressed URI of the staged input
    pub fn input_uri(&self) -> String {
        format!("gs://{}/{}", self.staging_bucket, self.staging_key())
    }

    /// Output URI prefix inside the staging bucket
    pub fn output_uri_prefix(&self) -> String {
        format!("gs://{}/{}", self.staging_bucket, self.staging_prefix())
    }

    /// File name offered for download
    pub fn translated_name(&self) -> String {
        self.document.translated_name(&self.languages.dest)
    }
}

/// Translated document handed to the result sink
#[derive(Debug, Clone)]
pub struct TranslationResult {
    /// Translated document bytes
    pub bytes: Vec<u8>,
    /// Download file name
    pub file_name: String,
    /// MIME type of the translated document
    pub mime_type: String,
}

/// Terminal state of one interactive job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// The delivered translation
    pub result: TranslationResult,
    /// Set when staged-object cleanup failed after a delivered success
    pub cleanup_warning: Option<String>,
}

/// Storage object-created notification payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEvent {
    /// Object name inside the bucket
    pub name: String,
    /// Bucket the object was created in
    pub bucket: String,
    /// Content type reported by the storage backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Creation timestamp reported by the storage backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<DateTime<Utc>>,
}

/// Terminal summary of one batch job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Pages translated across all targets
    pub total_pages: u64,
    /// Output URI prefix the translated documents were written under
    pub output_prefix: String,
}

/// Opaque handle to a provider-side long-running operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(pub String);

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
