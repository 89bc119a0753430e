//! AquaWatch Backend
//! Mission: water-quality surveillance and outbreak reporting API server

use anyhow::{Context, Result};
use aquawatch_backend::{
    api::{create_router, AppState},
    auth::{otp::OtpManager, token::TokenService},
    config::Config,
    sms::LogSmsNotifier,
    store::{
        AdvisoryStore, CitizenStore, Database, OfficialStore, SymptomReportStore, WaterDataStore,
    },
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("💧 AquaWatch backend starting...");

    // Fails fast when JWT_SECRET or DATABASE_PATH is missing.
    let config = Config::from_env()?;

    let db = Database::open(&config.database_path)?;
    let citizens = Arc::new(CitizenStore::new(db.clone()));
    let officials = Arc::new(OfficialStore::new(db.clone()));
    let water = Arc::new(WaterDataStore::new(db.clone()));
    let reports = Arc::new(SymptomReportStore::new(db.clone()));
    let advisories = Arc::new(AdvisoryStore::new(db));

    let tokens = Arc::new(TokenService::new(&config.jwt_secret));
    let otp = Arc::new(OtpManager::new(
        citizens.clone(),
        tokens.clone(),
        Arc::new(LogSmsNotifier),
        config.otp_policy,
    ));

    info!(
        "🔐 Auth ready (OTP ttl: {}s, max attempts: {})",
        config.otp_policy.max_age_secs, config.otp_policy.max_attempts
    );

    let state = AppState {
        citizens,
        officials,
        water,
        reports,
        advisories,
        otp,
        tokens,
        frontend_url: config.frontend_url.clone(),
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 AquaWatch API listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aquawatch_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
