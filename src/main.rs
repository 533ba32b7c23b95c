//! Flipkit entitlement service binary.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flipkit::adapters::http::entitlement::{entitlement_router, EntitlementAppState};
use flipkit::adapters::postgres::{
    PostgresAccountStore, PostgresCreditGrantStore, PostgresLedgerStore,
    PostgresWebhookEventRepository,
};
use flipkit::config::AppConfig;
use flipkit::domain::billing::PaymentWebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = EntitlementAppState {
        accounts: Arc::new(PostgresAccountStore::new(pool.clone())),
        ledgers: Arc::new(PostgresLedgerStore::new(pool.clone())),
        grants: Arc::new(PostgresCreditGrantStore::new(pool.clone())),
        webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool)),
        verifier: Arc::new(PaymentWebhookVerifier::new(
            config.payment.webhook_secret.clone(),
        )),
    };

    let app = Router::new()
        .nest("/api", entitlement_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state);

    let addr = config.server.socket_addr()?;
    info!(%addr, "flipkit entitlement service listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
