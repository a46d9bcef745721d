//! Static language and MIME registries
//!
//! Pure lookup tables; both resolvers are total over the supported sets and
//! fail with a typed error for everything else. Callers must reject a
//! submission here before any storage write happens.

use crate::core::errors::{Result, TranslatorError};

/// Human-readable language names and their translation codes
const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("French", "fr"),
    ("English", "en"),
    ("Spanish", "es"),
    ("Italian", "it"),
];

/// Supported document extensions and their MIME types
const SUPPORTED_MIME_TYPES: &[(&str, &str)] = &[
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".pdf", "application/pdf"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (
        ".pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (".xls", "application/vnd.ms-excel"),
    (
        ".xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
];

/// Resolve a language display name to its code
///
/// Names are matched case-sensitively against the fixed supported set.
pub fn language_code(display_name: &str) -> Result<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(name, _)| *name == display_name)
        .map(|(_, code)| *code)
        .ok_or_else(|| TranslatorError::UnsupportedLanguage {
            name: display_name.to_string(),
        })
}

/// Resolve a file extension (leading dot included) to its MIME type
pub fn mime_type(extension: &str) -> Result<&'static str> {
    SUPPORTED_MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| TranslatorError::UnsupportedFormat {
            extension: extension.to_string(),
        })
}

/// Whether a language code belongs to the supported set
///
/// Codes arrive lowercased from the registry but uppercased tags show up in
/// file names, so the check is case-insensitive.
pub fn is_supported_code(code: &str) -> bool {
    SUPPORTED_LANGUAGES
        .iter()
        .any(|(_, c)| c.eq_ignore_ascii_case(code))
}

/// All supported (display name, code) pairs
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    SUPPORTED_LANGUAGES
}
