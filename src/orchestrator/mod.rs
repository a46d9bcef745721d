//! Job orchestration for interactive and event-triggered flows
//!
//! One state machine drives both flows: validate, stage, translate, clean
//! up, deliver. The interactive flow translates synchronously and returns
//! the bytes; the batch flow submits a long-running operation and awaits its
//! terminal state. Staged objects never outlive their job, whichever way the
//! job ends.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::AppConfig;
use crate::core::errors::{Result, TranslatorError};
use crate::core::models::{
    BatchOutcome, DocumentName, JobOutcome, LanguagePair, StorageEvent, Submission,
    TranslationJob, TranslationResult,
};
use crate::core::registry;
use crate::storage::auth::AccessTokenProvider;
use crate::storage::gcs::GcsStore;
use crate::storage::store::{delete_by_prefix, move_object, ObjectStore};
use crate::translate::google::GoogleTranslator;
use crate::translate::service::{BatchRequest, DocumentRequest, DocumentTranslator};

/// Sequences staging, translation and cleanup for one job at a time
///
/// Holds no per-job state; each call owns its job end to end, so concurrent
/// jobs only share the store and translator, which are safe to share.
pub struct Orchestrator {
    /// Staging and routing storage
    store: Arc<dyn ObjectStore>,
    /// External translation provider
    translator: Arc<dyn DocumentTranslator>,
    /// Runtime configuration
    config: Arc<AppConfig>,
}

impl Orchestrator {
    /// Create an orchestrator over explicit collaborators
    pub fn new(
        store: Arc<dyn ObjectStore>,
        translator: Arc<dyn DocumentTranslator>,
        config: AppConfig,
    ) -> Self {
        Self {
            store,
            translator,
            config: Arc::new(config),
        }
    }

    /// Create an orchestrator wired to the production adapters
    pub fn from_config(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let auth = AccessTokenProvider::new(client.clone());
        let store = Arc::new(GcsStore::new(
            client.clone(),
            config.storage_endpoint.clone(),
            auth.clone(),
        ));
        let translator = Arc::new(GoogleTranslator::new(client, &config, auth));

        Ok(Self::new(store, translator, config))
    }

    /// Run one interactive submission to a terminal state
    ///
    /// Stages the upload, translates synchronously and purges the staging
    /// prefix before returning. A cleanup failure after a delivered success
    /// is reported as a warning on the outcome, never as a job failure.
    pub async fn translate_submission(&self, submission: Submission) -> Result<JobOutcome> {
        if submission.bytes.is_empty() {
            return Err(TranslatorError::MissingFile);
        }
        if submission.source_lang == submission.dest_lang {
            return Err(TranslatorError::SameLanguage);
        }

        let languages =
            LanguagePair::from_display_names(&submission.source_lang, &submission.dest_lang)?;
        let document = DocumentName::parse(&submission.file_name);
        let mime_type = registry::mime_type(&document.extension)?;

        let job = TranslationJob::new(
            &self.config.staging_bucket,
            document,
            languages,
            mime_type,
        );

        debug!(
            "Staging submission at gs://{}/{}",
            job.staging_bucket,
            job.staging_key()
        );
        self.store
            .put(
                &job.staging_bucket,
                &job.staging_key(),
                submission.bytes,
                &job.mime_type,
            )
            .await?;

        let request = DocumentRequest {
            source_code: job.languages.source.clone(),
            dest_code: job.languages.dest.clone(),
            input_uri: job.input_uri(),
            output_uri_prefix: job.output_uri_prefix(),
            mime_type: job.mime_type.clone(),
        };

        let bytes = match self.translator.translate_document(&request).await {
            Ok(bytes) => bytes,
            Err(err) => {
                // The input was staged, so it must be purged even though the
                // job failed; the original error is what the caller sees.
                if let Err(cleanup_err) = self.cleanup(&job).await {
                    warn!(
                        "Cleanup after failed translation also failed: {}",
                        cleanup_err
                    );
                }
                return Err(err);
            }
        };

        let cleanup_warning = match self.cleanup(&job).await {
            Ok(_) => None,
            Err(cleanup_err) => {
                warn!("Cleanup after delivery failed: {}", cleanup_err);
                Some(cleanup_err.to_string())
            }
        };

        info!(
            "Translated {} to {}",
            job.document.original,
            job.translated_name()
        );

        Ok(JobOutcome {
            result: TranslationResult {
                bytes,
                file_name: job.translated_name(),
                mime_type: job.mime_type.clone(),
            },
            cleanup_warning,
        })
    }

    /// Run one batch job triggered by an object-created notification
    ///
    /// Inputs failing format or language pre-validation are moved to the
    /// error bucket before the job fails. Provider failures leave the input
    /// in place: those may be transient, a malformed input never is.
    pub async fn handle_object_created(&self, event: &StorageEvent) -> Result<BatchOutcome> {
        let document = DocumentName::parse(&event.name);

        if let Err(err) = registry::mime_type(&document.extension) {
            self.route_to_error(&event.bucket, &event.name).await?;
            return Err(err);
        }

        let source_code = match document.source_hint() {
            Some(code)
                if registry::is_supported_code(&code)
                    && !self.config.batch_target_codes.contains(&code) =>
            {
                code
            }
            other => {
                self.route_to_error(&event.bucket, &event.name).await?;
                return Err(TranslatorError::UnsupportedLanguage {
                    name: other.unwrap_or_default(),
                });
            }
        };

        let output_prefix = format!(
            "gs://{}/{}/",
            self.config.output_bucket, document.raw_stem
        );
        let request = BatchRequest {
            source_code,
            dest_codes: self.config.batch_target_codes.clone(),
            input_uri: format!("gs://{}/{}", event.bucket, event.name),
            output_uri_prefix: output_prefix.clone(),
        };

        let handle = self.translator.start_batch(&request).await?;
        info!("Waiting for operation {} to complete", handle);
        let total_pages = self.translator.await_operation(&handle).await?;

        Ok(BatchOutcome {
            total_pages,
            output_prefix,
        })
    }

    /// Remove every staged object belonging to a job
    async fn cleanup(&self, job: &TranslationJob) -> Result<usize> {
        delete_by_prefix(
            self.store.as_ref(),
            &job.staging_bucket,
            &job.staging_prefix(),
        )
        .await
    }

    /// Move a malformed input to the error bucket
    async fn route_to_error(&self, bucket: &str, key: &str) -> Result<()> {
        warn!(
            "Routing gs://{}/{} to error bucket {}",
            bucket, key, self.config.error_bucket
        );
        move_object(self.store.as_ref(), bucket, key, &self.config.error_bucket).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::core::models::OperationHandle;

    /// In-memory object store recording calls
    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
        put_calls: AtomicUsize,
        fail_deletes: bool,
    }

    impl MemoryStore {
        fn with_object(self, bucket: &str, key: &str, bytes: &[u8]) -> Self {
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), bytes.to_vec());
            self
        }

        fn contains(&self, bucket: &str, key: &str) -> bool {
            self.objects
                .lock()
                .unwrap()
                .contains_key(&(bucket.to_string(), key.to_string()))
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put(
            &self,
            bucket: &str,
            key: &str,
            bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<()> {
            self.put_calls.fetch_add(1, Ordering::SeqCst);
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), bytes);
            Ok(())
        }

        async fn list_by_prefix(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .keys()
                .filter(|(b, k)| b == bucket && k.starts_with(prefix))
                .map(|(_, k)| k.clone())
                .collect())
        }

        async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
            if self.fail_deletes {
                return Err(TranslatorError::Storage {
                    operation: "delete".to_string(),
                    message: "injected failure".to_string(),
                });
            }
            self.objects
                .lock()
                .unwrap()
                .remove(&(bucket.to_string(), key.to_string()));
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
            let mut objects = self.objects.lock().unwrap();
            let dst = (dst_bucket.to_string(), dst_key.to_string());
            if only_if_absent && objects.contains_key(&dst) {
                return Err(TranslatorError::RoutingConflict {
                    key: dst_key.to_string(),
                });
            }
            let bytes = objects
                .get(&(src_bucket.to_string(), src_key.to_string()))
                .cloned()
                .ok_or_else(|| TranslatorError::Storage {
                    operation: "copy".to_string(),
                    message: "source object missing".to_string(),
                })?;
            objects.insert(dst, bytes);
            Ok(())
        }
    }

    /// Scripted translator recording requests
    struct FakeTranslator {
        sync_response: Option<Vec<u8>>,
        batch_fails: bool,
        total_pages: u64,
        sync_requests: Mutex<Vec<DocumentRequest>>,
        batch_requests: Mutex<Vec<BatchRequest>>,
    }

    impl FakeTranslator {
        fn succeeding(bytes: &[u8]) -> Self {
            Self {
                sync_response: Some(bytes.to_vec()),
                batch_fails: false,
                total_pages: 4,
                sync_requests: Mutex::new(Vec::new()),
                batch_requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                sync_response: None,
                batch_fails: true,
                total_pages: 0,
                sync_requests: Mutex::new(Vec::new()),
                batch_requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.sync_requests.lock().unwrap().len() + self.batch_requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DocumentTranslator for FakeTranslator {
        async fn translate_document(&self, request: &DocumentRequest) -> Result<Vec<u8>> {
            self.sync_requests.lock().unwrap().push(request.clone());
            match &self.sync_response {
                Some(bytes) => Ok(bytes.clone()),
                None => Err(TranslatorError::ProviderRejected {
                    message: "provider said no".to_string(),
                }),
            }
        }

        async fn start_batch(&self, request: &BatchRequest) -> Result<OperationHandle> {
            self.batch_requests.lock().unwrap().push(request.clone());
            if self.batch_fails {
                return Err(TranslatorError::ProviderUnavailable {
                    message: "backend error".to_string(),
                });
            }
            Ok(OperationHandle("operations/op-1".to_string()))
        }

        async fn await_operation(&self, _handle: &OperationHandle) -> Result<u64> {
            Ok(self.total_pages)
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            project_id: "test-project".to_string(),
            ..Default::default()
        }
    }

    fn orchestrator(
        store: Arc<MemoryStore>,
        translator: Arc<FakeTranslator>,
    ) -> Orchestrator {
        Orchestrator::new(store, translator, test_config())
    }

    fn submission(file_name: &str, source: &str, dest: &str) -> Submission {
        Submission {
            file_name: file_name.to_string(),
            bytes: b"%PDF-1.4 content".to_vec(),
            source_lang: source.to_string(),
            dest_lang: dest.to_string(),
        }
    }

    #[tokio::test]
    async fn test_interactive_success_stages_translates_and_cleans_up() {
        let store = Arc::new(MemoryStore::default());
        let translator = Arc::new(FakeTranslator::succeeding(b"translated"));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let outcome = orchestrator
            .translate_submission(submission("contract_fr.docx", "French", "English"))
            .await
            .unwrap();

        assert_eq!(outcome.result.file_name, "contract_en.docx");
        assert_eq!(
            outcome.result.mime_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(outcome.result.bytes, b"translated".to_vec());
        assert!(outcome.cleanup_warning.is_none());

        let request = translator.sync_requests.lock().unwrap()[0].clone();
        assert_eq!(request.source_code, "fr");
        assert_eq!(request.dest_code, "en");
        assert_eq!(
            request.input_uri,
            "gs://translation_hub_tmp/contract/contract_fr.docx"
        );
        assert_eq!(
            request.output_uri_prefix,
            "gs://translation_hub_tmp/contract/"
        );

        // The staging prefix is empty once the job is done
        let staged = store
            .list_by_prefix("translation_hub_tmp", "contract/")
            .await
            .unwrap();
        assert!(staged.is_empty());
    }

    #[tokio::test]
    async fn test_same_language_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::default());
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let err = orchestrator
            .translate_submission(submission("contract_fr.docx", "French", "French"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::SameLanguage));
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_language_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::default());
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let err = orchestrator
            .translate_submission(submission("contract_fr.docx", "German", "English"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::UnsupportedLanguage { .. }));
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_extension_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::default());
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let err = orchestrator
            .translate_submission(submission("notes.txt", "French", "English"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::UnsupportedFormat { .. }));
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let store = Arc::new(MemoryStore::default());
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator);

        let mut sub = submission("contract_fr.docx", "French", "English");
        sub.bytes.clear();

        let err = orchestrator.translate_submission(sub).await.unwrap_err();
        assert!(matches!(err, TranslatorError::MissingFile));
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_translation_still_cleans_staging_prefix() {
        let store = Arc::new(MemoryStore::default());
        let translator = Arc::new(FakeTranslator::failing());
        let orchestrator = orchestrator(store.clone(), translator);

        let err = orchestrator
            .translate_submission(submission("contract_fr.docx", "French", "English"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::ProviderRejected { .. }));
        assert_eq!(store.put_calls.load(Ordering::SeqCst), 1);

        let staged = store
            .list_by_prefix("translation_hub_tmp", "contract/")
            .await
            .unwrap();
        assert!(staged.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_failure_does_not_mask_delivery() {
        let store = Arc::new(MemoryStore {
            fail_deletes: true,
            ..Default::default()
        });
        let translator = Arc::new(FakeTranslator::succeeding(b"translated"));
        let orchestrator = orchestrator(store, translator);

        let outcome = orchestrator
            .translate_submission(submission("contract_fr.docx", "French", "English"))
            .await
            .unwrap();

        assert_eq!(outcome.result.file_name, "contract_en.docx");
        assert!(outcome.cleanup_warning.is_some());
    }

    fn event(name: &str) -> StorageEvent {
        StorageEvent {
            name: name.to_string(),
            bucket: "docs_input".to_string(),
            content_type: None,
            time_created: None,
        }
    }

    #[tokio::test]
    async fn test_batch_unsupported_language_routed_to_error_bucket() {
        let store = Arc::new(
            MemoryStore::default().with_object("docs_input", "invoice_de.pdf", b"pdf"),
        );
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let err = orchestrator
            .handle_object_created(&event("invoice_de.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TranslatorError::UnsupportedLanguage { name } if name == "de"
        ));
        assert!(store.contains("docs_error", "invoice_de.pdf"));
        assert!(!store.contains("docs_input", "invoice_de.pdf"));
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_unsupported_extension_routed_to_error_bucket() {
        let store =
            Arc::new(MemoryStore::default().with_object("docs_input", "notes_fr.txt", b"txt"));
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let err = orchestrator
            .handle_object_created(&event("notes_fr.txt"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::UnsupportedFormat { .. }));
        assert!(store.contains("docs_error", "notes_fr.txt"));
        assert!(!store.contains("docs_input", "notes_fr.txt"));
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_source_equal_to_target_routed_to_error_bucket() {
        let store =
            Arc::new(MemoryStore::default().with_object("docs_input", "report_en.pdf", b"pdf"));
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let err = orchestrator
            .handle_object_created(&event("report_en.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::UnsupportedLanguage { .. }));
        assert!(store.contains("docs_error", "report_en.pdf"));
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_success_submits_and_keeps_input() {
        let store =
            Arc::new(MemoryStore::default().with_object("docs_input", "report_fr.pdf", b"pdf"));
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator.clone());

        let outcome = orchestrator
            .handle_object_created(&event("report_fr.pdf"))
            .await
            .unwrap();

        assert_eq!(outcome.total_pages, 4);
        assert_eq!(outcome.output_prefix, "gs://docs_output/report_fr/");

        let request = translator.batch_requests.lock().unwrap()[0].clone();
        assert_eq!(request.source_code, "fr");
        assert_eq!(request.dest_codes, vec!["en".to_string()]);
        assert_eq!(request.input_uri, "gs://docs_input/report_fr.pdf");

        // Successful batch jobs leave the input where it was
        assert!(store.contains("docs_input", "report_fr.pdf"));
        assert!(!store.contains("docs_error", "report_fr.pdf"));
    }

    #[tokio::test]
    async fn test_batch_provider_failure_leaves_input_in_place() {
        let store =
            Arc::new(MemoryStore::default().with_object("docs_input", "report_fr.pdf", b"pdf"));
        let translator = Arc::new(FakeTranslator::failing());
        let orchestrator = orchestrator(store.clone(), translator);

        let err = orchestrator
            .handle_object_created(&event("report_fr.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::ProviderUnavailable { .. }));
        assert!(store.contains("docs_input", "report_fr.pdf"));
        assert!(!store.contains("docs_error", "report_fr.pdf"));
    }

    #[tokio::test]
    async fn test_error_routing_conflict_is_fatal() {
        let store = Arc::new(
            MemoryStore::default()
                .with_object("docs_input", "invoice_de.pdf", b"new")
                .with_object("docs_error", "invoice_de.pdf", b"old"),
        );
        let translator = Arc::new(FakeTranslator::succeeding(b""));
        let orchestrator = orchestrator(store.clone(), translator);

        let err = orchestrator
            .handle_object_created(&event("invoice_de.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslatorError::RoutingConflict { .. }));
        // The aborted move leaves the input untouched
        assert!(store.contains("docs_input", "invoice_de.pdf"));
    }
}
