//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;
use tracing::info;

use crate::core::config::AppConfig;
use crate::core::models::{StorageEvent, Submission};
use crate::orchestrator::Orchestrator;
use crate::sink;

/// Commands for the docs translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a single document
    Doc {
        /// Input file (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Source language display name, e.g. French
        #[arg(long)]
        source_lang: String,

        /// Destination language display name, e.g. English
        #[arg(short, long)]
        target_lang: String,

        /// Directory the translated document is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Run the batch flow for one input object, as a storage event would
    Event {
        /// Object name inside the input bucket
        #[arg(short, long)]
        name: String,

        /// Bucket holding the object (default: configured input bucket)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Enable debug mode
        #[arg(long)]
        debug: bool,
    },
}

/// Handle single-document translation command
pub async fn handle_doc(
    file: PathBuf,
    source_lang: String,
    target_lang: String,
    output: PathBuf,
) -> anyhow::Result<()> {
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("input path has no usable file name"))?
        .to_string();

    info!("Translating {} from {} to {}", file_name, source_lang, target_lang);

    let bytes = tokio::fs::read(&file).await?;

    let config = AppConfig::load()?;
    let orchestrator = Orchestrator::from_config(config)?;

    let outcome = orchestrator
        .translate_submission(Submission {
            file_name,
            bytes,
            source_lang,
            dest_lang: target_lang,
        })
        .await?;

    let path = sink::write_to_dir(&outcome.result, &output).await?;

    println!("✅ Translation completed!");
    println!("   Output: {}", path.display());
    if let Some(warning) = outcome.cleanup_warning {
        eprintln!("⚠️  Staged files were not fully cleaned up: {}", warning);
    }

    Ok(())
}

/// Handle batch event command
pub async fn handle_event(name: String, bucket: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let bucket = bucket.unwrap_or_else(|| config.input_bucket.clone());

    info!("Running batch flow for gs://{}/{}", bucket, name);

    let orchestrator = Orchestrator::from_config(config)?;
    let event = StorageEvent {
        name,
        bucket,
        content_type: None,
        time_created: None,
    };

    let outcome = orchestrator.handle_object_created(&event).await?;

    println!("✅ Batch translation completed!");
    println!("   Total pages: {}", outcome.total_pages);
    println!("   Output: {}", outcome.output_prefix);

    Ok(())
}

/// Handle server command
pub async fn handle_server(host: String, port: u16, debug: bool) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    if debug {
        std::env::set_var("RUST_LOG", "debug");
    }

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port).await?;

    Ok(())
}
