#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! REST API for sending email

use anyhow::Result;
use clap::Parser;
use mailroom::infrastructure::{
    config::MailroomConfig,
    http::{HttpServer, HttpServerConfig},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The provider, credentials and templates
    #[clap(flatten)]
    pub mailroom: MailroomConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = dotenv {
        debug!("no .env file loaded: {}", e);
    }

    let args = Args::parse();

    info!(provider = %args.mailroom.mailer.provider, "starting mailroom");

    HttpServer::new(args.mailroom.email_service(), args.server)
        .await?
        .run()
        .await
}
