//! Docs Translator - document translation orchestration service
//!
//! Stages office/PDF documents into temporary object storage, invokes the
//! Cloud Translation document API (synchronously for interactive submissions,
//! as a long-running batch operation for storage-event jobs) and guarantees
//! staged intermediate state is cleaned up whichever way a job ends.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod core;
pub mod orchestrator;
pub mod server;
pub mod sink;
pub mod storage;
pub mod translate;

// Re-export key types for convenience
pub use crate::core::{
    config::AppConfig,
    errors::{Result, TranslatorError},
    models::{BatchOutcome, JobOutcome, StorageEvent, Submission, TranslationResult},
};
pub use crate::orchestrator::Orchestrator;
pub use crate::storage::{GcsStore, ObjectStore};
pub use crate::translate::{DocumentTranslator, GoogleTranslator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
