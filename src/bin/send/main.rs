#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends a single email described by a JSON document

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use mailroom::{
    domain::communication::emails::{parse, EmailService},
    infrastructure::config::MailroomConfig,
};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
#[command(about = "Send an email described by a JSON document")]
pub struct Args {
    /// Path to the email document, or `-` for stdin
    pub document: PathBuf,

    /// The provider, credentials and templates
    #[clap(flatten)]
    pub mailroom: MailroomConfig,
}

fn read_document(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("failed to read stdin");
    }

    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv {
        debug!("no .env file loaded: {}", e);
    }

    let args = Args::parse();

    let email = parse(&read_document(&args.document)?)?;

    match args.mailroom.email_service().send_email(email).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);

            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let report = json!({
                "error": err.to_string(),
                "kind": err.kind(),
                "retryable": err.is_retryable(),
                "details": err.raw_payload(),
            });

            eprintln!("{}", serde_json::to_string_pretty(&report)?);

            Ok(ExitCode::FAILURE)
        }
    }
}
