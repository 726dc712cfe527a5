//! logrelay log ingestion relay.
//!
//! Main entry point. Wires configuration, storage, and the notification
//! transport into the HTTP server and coordinates startup and shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use logrelay_api::{AppState, Config, Credentials, Pipeline};
use logrelay_core::Storage;
use logrelay_notify::{ChatTarget, ClientConfig, Notifier, TelegramTransport};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting logrelay");
    info!(
        server_addr = %format!("{}:{}", config.host, config.port),
        database_url = %config.database_url_masked(),
        max_connections = config.database_max_connections,
        write_token = Config::secret_state(config.write_token.as_ref()),
        ably_webhook_secret = Config::secret_state(config.ably_webhook_secret.as_ref()),
        telegram_bot_token = Config::secret_state(config.telegram_bot_token.as_ref()),
        telegram_chat_id = Config::secret_state(config.telegram_chat_id.as_ref()),
        "Configuration loaded"
    );
    let addr = config.parse_server_addr()?;

    let db_pool = create_database_pool(&config).await?;
    let storage = Storage::new(db_pool.clone());
    storage.health_check().await.context("Failed to verify database connection")?;
    info!("Database connection pool established");

    let transport = TelegramTransport::new(ClientConfig {
        api_base: config.telegram_api_base.clone(),
        ..ClientConfig::default()
    })
    .context("Failed to build chat transport")?;
    let target =
        ChatTarget::from_parts(config.telegram_bot_token.clone(), config.telegram_chat_id.clone());
    let notifier = Notifier::new(Arc::new(transport), target);
    if !notifier.is_enabled() {
        warn!("Telegram bot token or chat id not configured, notifications disabled");
    }

    if config.write_token.is_none() {
        warn!("WRITE_TOKEN not configured, every /api request will be rejected");
    }
    if config.ably_webhook_secret.is_none() {
        warn!("ABLY_WEBHOOK_SECRET not configured, every /ably request will be rejected");
    }

    let state = AppState::new(Credentials::from(&config), Pipeline::new(Arc::new(storage), notifier));

    info!(addr = %addr, "logrelay is ready to receive logs");
    logrelay_api::start_server(state, addr).await.context("Server failed")?;

    db_pool.close().await;
    info!("Database connections closed");

    info!("logrelay shutdown complete");
    Ok(())
}

/// Initializes tracing, preferring `RUST_LOG` from the process environment.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    let mut retries = 0;
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) if retries < MAX_RETRIES => {
                retries += 1;
                warn!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    error = %e,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}
