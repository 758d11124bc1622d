// src/main.rs

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studio_bff::config::AppConfig;
use studio_bff::error::{trace, ErrorClassifier};
use studio_bff::{db, routes, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("studio_bff=debug,tower_http=info,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let classifier = Arc::new(ErrorClassifier::new(config.diagnostic_mode()));
    trace::install_panic_hook();
    if classifier.is_diagnostic() {
        trace::force_backtraces(true);
        tracing::warn!(app_env = %config.app_env, "diagnostic error responses enabled; never run this in production");
    }

    let pool = db::connect(&config).await?;
    let app = routes::router(AppState { pool, classifier });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API listening");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
