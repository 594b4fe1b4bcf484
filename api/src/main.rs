//! Seriesjoin API Server Binary
//!
//! Entry point for the Seriesjoin CSV export server.

#![deny(unsafe_code)]

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    api::run_server().await
}
