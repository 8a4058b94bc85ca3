use anyhow::Result;
use marine_site::{config, db, server};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marine_site=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting marine site content API");

    // Load configuration from environment
    let config = config::Config::from_env()?;
    info!(
        "Default locale: {}, enabled: {:?}",
        config.locales.default_locale(),
        config.locales.enabled()
    );

    let database = db::Database::new(&config.database_url).await?;
    info!("✓ Connected to database");

    let port = config.port;
    let state = server::AppState::new(Arc::new(database), config);
    server::serve(state, port).await
}
