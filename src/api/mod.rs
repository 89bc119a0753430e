//! HTTP Surface
//! Mission: wire routes to stores and managers behind the role guards

pub mod dashboard;
pub mod gov_auth;
pub mod user_auth;
pub mod water_data;

use crate::auth::guard::{citizen_guard, official_guard};
use crate::auth::otp::OtpManager;
use crate::auth::token::TokenService;
use crate::error::ApiError;
use crate::store::{AdvisoryStore, CitizenStore, OfficialStore, SymptomReportStore, WaterDataStore};
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared application state. Cloned per request; everything inside is
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub citizens: Arc<CitizenStore>,
    pub officials: Arc<OfficialStore>,
    pub water: Arc<WaterDataStore>,
    pub reports: Arc<SymptomReportStore>,
    pub advisories: Arc<AdvisoryStore>,
    pub otp: Arc<OtpManager>,
    pub tokens: Arc<TokenService>,
    pub frontend_url: String,
}

/// Build the full application router.
///
/// Three route groups: public (auth entry points and water-data reads),
/// citizen-guarded (profile and dashboard), official-guarded (profile and
/// water-data writes).
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/user/request-otp", post(user_auth::request_otp))
        .route("/api/user/verify-otp", post(user_auth::verify_otp))
        .route("/api/government/register", post(gov_auth::register))
        .route("/api/government/login", post(gov_auth::login))
        .route("/api/waterdata", get(water_data::list_all))
        .route("/api/waterdata/filter", get(water_data::filter))
        .route("/api/waterdata/:id", get(water_data::by_id));

    let citizen_routes = Router::new()
        .route("/api/user/profile", get(user_auth::profile))
        .route("/api/user-dashboard/greeting", get(dashboard::greeting))
        .route("/api/user-dashboard/latest-reports", get(dashboard::latest_reports))
        .route("/api/user-dashboard/report/:id", get(dashboard::report_by_id))
        .route("/api/user-dashboard/report/:id/download", get(dashboard::download_report))
        .route("/api/user-dashboard/report/:id/share", post(dashboard::share_report))
        .route("/api/user-dashboard/alerts", get(dashboard::alerts))
        .route("/api/user-dashboard/daily-tips", get(dashboard::daily_tips))
        .route("/api/user-dashboard/symptom-report", post(dashboard::submit_symptom_report))
        .route("/api/user-dashboard/my-symptoms", get(dashboard::my_symptoms))
        .route_layer(middleware::from_fn_with_state(state.clone(), citizen_guard));

    let official_routes = Router::new()
        .route("/api/government/profile", get(gov_auth::profile))
        .route("/api/waterdata/add", post(water_data::add))
        .route_layer(middleware::from_fn_with_state(state.clone(), official_guard));

    Router::new()
        .merge(public)
        .merge(citizen_routes)
        .merge(official_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Parse a path segment as a record id; anything malformed is an early 400.
pub(crate) fn parse_id_param(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid report id"))
}

async fn root() -> &'static str {
    "💧 AquaWatch API is running"
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    timestamp: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
