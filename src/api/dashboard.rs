//! Citizen Dashboard Endpoints
//! Mission: the feeds and report tools behind the citizen guard

use crate::api::{parse_id_param, AppState};
use crate::error::ApiError;
use crate::models::{Alert, CitizenProfile, DailyTip, SymptomReport, WaterRecord};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

const LATEST_FEED_LIMIT: usize = 10;
const ALERT_FEED_LIMIT: usize = 5;

/// Personalized greeting - GET /api/user-dashboard/greeting
pub async fn greeting(Extension(citizen): Extension<CitizenProfile>) -> Json<Value> {
    Json(json!({ "name": citizen.name }))
}

/// Both feeds, ten newest each - GET /api/user-dashboard/latest-reports
#[derive(Debug, Serialize)]
pub struct LatestReports {
    pub water_reports: Vec<WaterRecord>,
    pub symptom_reports: Vec<SymptomReport>,
}

pub async fn latest_reports(
    State(state): State<AppState>,
) -> Result<Json<LatestReports>, ApiError> {
    Ok(Json(LatestReports {
        water_reports: state.water.latest(LATEST_FEED_LIMIT)?,
        symptom_reports: state.reports.latest(LATEST_FEED_LIMIT)?,
    }))
}

/// Water report details - GET /api/user-dashboard/report/:id
pub async fn report_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WaterRecord>, ApiError> {
    let id = parse_id_param(&id)?;
    state
        .water
        .find_by_id(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Report not found"))
}

/// CSV download - GET /api/user-dashboard/report/:id/download
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id_param(&id)?;
    let record = state
        .water
        .find_by_id(&id)?
        .ok_or_else(|| ApiError::not_found("Report not found"))?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=report_{}.csv", record.id),
        ),
    ];

    Ok((headers, record.to_csv()).into_response())
}

/// Shareable link - POST /api/user-dashboard/report/:id/share
pub async fn share_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id_param(&id)?;
    let record = state
        .water
        .find_by_id(&id)?
        .ok_or_else(|| ApiError::not_found("Report not found"))?;

    let link = format!(
        "{}/reports/{}",
        state.frontend_url.trim_end_matches('/'),
        record.id
    );

    Ok(Json(json!({
        "message": "Report ready to share",
        "link": link,
    })))
}

/// Five newest alerts - GET /api/user-dashboard/alerts
pub async fn alerts(State(state): State<AppState>) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(state.advisories.latest_alerts(ALERT_FEED_LIMIT)?))
}

/// Newest tip, or null before any exist - GET /api/user-dashboard/daily-tips
pub async fn daily_tips(State(state): State<AppState>) -> Result<Json<Option<DailyTip>>, ApiError> {
    Ok(Json(state.advisories.latest_tip()?))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymptomReportBody {
    pub symptoms: Option<Vec<String>>,
    pub location: Option<String>,
}

/// Submit symptoms - POST /api/user-dashboard/symptom-report
pub async fn submit_symptom_report(
    State(state): State<AppState>,
    Extension(citizen): Extension<CitizenProfile>,
    Json(body): Json<SymptomReportBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let symptoms = body.symptoms.filter(|s| !s.is_empty());
    let location = body.location.filter(|l| !l.is_empty());

    let (Some(symptoms), Some(location)) = (symptoms, location) else {
        return Err(ApiError::validation("Symptoms and location are required"));
    };

    let report = state.reports.create(&citizen.id, &symptoms, &location)?;
    info!("🩺 Symptom report from {} ({} symptoms)", location, report.symptoms.len());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Symptoms reported successfully",
            "report": report,
        })),
    ))
}

/// Caller's own reports - GET /api/user-dashboard/my-symptoms
pub async fn my_symptoms(
    State(state): State<AppState>,
    Extension(citizen): Extension<CitizenProfile>,
) -> Result<Json<Vec<SymptomReport>>, ApiError> {
    Ok(Json(state.reports.for_citizen(&citizen.id)?))
}
