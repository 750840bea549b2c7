//! Coursegate server binary.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use coursegate::adapters::http::payments::PaymentsAppState;
use coursegate::adapters::http::app_router;
use coursegate::adapters::postgres::PostgresEnrollmentStore;
use coursegate::adapters::razorpay::{RazorpayClient, RazorpayConfig};
use coursegate::config::AppConfig;
use coursegate::domain::payment::SignatureVerifier;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let store = Arc::new(PostgresEnrollmentStore::new(
        pool,
        config.database.statement_timeout(),
    ));
    let gateway = Arc::new(RazorpayClient::new(RazorpayConfig::from_payment_config(
        &config.payment,
    )));
    let verifier = Arc::new(SignatureVerifier::new(
        config.payment.razorpay_key_secret.clone(),
    ));

    let state = PaymentsAppState {
        gateway,
        store,
        verifier,
        default_currency: config.payment.default_currency.clone(),
    };

    let app = app_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        test_mode = config.payment.is_test_mode(),
        "coursegate listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
