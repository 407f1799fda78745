//! docman-migrate - one-shot DocMan to valor lawsuit migration.
//!
//! Reads lawsuit categories, their folders and documents from a legacy
//! Joomla DocMan database and rebuilds them in the valor lawsuit schema.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docman_migrate::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "docman_migrate=info"
    } else {
        "docman_migrate=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
