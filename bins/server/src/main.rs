//! Khata API Server
//!
//! Main entry point for the posting engine service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use khata_api::{AppState, create_router};
use khata_core::posting::{PostingEngine, PostingOptions};
use khata_db::{LedgerRepository, connect_with_pool};
use khata_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let json = config.logging.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "khata=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .context("jwt.access_token_expiry_secs is too large")?,
    });

    let options = PostingOptions::from(&config.posting);
    info!(
        transaction_prefix = %options.transaction_prefix,
        invoice_prefix = %options.invoice_prefix,
        "Posting engine configured"
    );
    let engine = PostingEngine::new(LedgerRepository::new(db), options);

    let app = create_router(AppState::new(engine, jwt_service));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
