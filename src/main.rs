//! Main entry point for the docs translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod core;
mod orchestrator;
mod server;
mod sink;
mod storage;
mod translate;

use cli::commands::Commands;

/// Docs Translator - document translation orchestration service
#[derive(Parser, Debug)]
#[command(name = "docs-translator", version, about, long_about = None)]
struct Args {
    /// Cloud project id (optional, defaults to PROJECT_ID env var)
    #[arg(long)]
    project: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    let log_level = if std::env::var("RUST_LOG").is_ok() {
        std::env::var("RUST_LOG").unwrap()
    } else {
        "info".to_string()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_PKG_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Override config with CLI args if provided
    if let Some(project) = args.project {
        std::env::set_var("PROJECT_ID", project);
    }

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    // Execute command
    match args.command {
        Some(Commands::Doc {
            file,
            source_lang,
            target_lang,
            output,
        }) => {
            cli::commands::handle_doc(file, source_lang, target_lang, output).await?;
        }
        Some(Commands::Event { name, bucket }) => {
            cli::commands::handle_event(name, bucket).await?;
        }
        Some(Commands::Server { host, port, debug }) => {
            cli::commands::handle_server(host, port, debug).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
