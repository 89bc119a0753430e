//! Water Data Endpoints
//! Mission: record measurements (officials) and serve reads (public)

use crate::api::{parse_id_param, AppState};
use crate::error::ApiError;
use crate::models::{OfficialProfile, WaterRecord};
use crate::store::NewWaterRecord;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddWaterBody {
    pub year: Option<i32>,
    pub district: Option<String>,
    pub week: Option<u32>,
    pub rainfall_mm: Option<f64>,
    pub ph: Option<f64>,
    pub turbidity_ntu: Option<f64>,
    pub ecoli_contamination: Option<bool>,
    pub cases: Option<i64>,
    pub outbreak: Option<bool>,
}

/// Record a measurement - POST /api/waterdata/add (official guard)
pub async fn add(
    State(state): State<AppState>,
    Extension(official): Extension<OfficialProfile>,
    Json(body): Json<AddWaterBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new = validate(body)?;
    let record = state.water.insert(new, &official.id)?;

    info!("💧 Water record added for {} week {} by {}", record.district, record.week, official.gov_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Water data recorded successfully",
            "record": record,
        })),
    ))
}

/// All measurements, newest first - GET /api/waterdata
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<WaterRecord>>, ApiError> {
    Ok(Json(state.water.all()?))
}

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub district: Option<String>,
    pub week: Option<u32>,
    pub year: Option<i32>,
}

/// Filtered measurements - GET /api/waterdata/filter?district=&week=&year=
pub async fn filter(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<WaterRecord>>, ApiError> {
    let records = state
        .water
        .filter(query.district.as_deref(), query.week, query.year)?;
    Ok(Json(records))
}

/// One measurement - GET /api/waterdata/:id
pub async fn by_id(
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

fn validate(body: AddWaterBody) -> Result<NewWaterRecord, ApiError> {
    let year = required(body.year, "year")?;
    let district = body
        .district
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::validation("district is required"))?;

    let week = required(body.week, "week")?;
    if !(1..=52).contains(&week) {
        return Err(ApiError::validation("week must be between 1 and 52"));
    }

    let ph = required(body.ph, "ph")?;
    if !(0.0..=14.0).contains(&ph) {
        return Err(ApiError::validation("ph must be between 0 and 14"));
    }

    Ok(NewWaterRecord {
        year,
        district,
        week,
        rainfall_mm: required(body.rainfall_mm, "rainfall_mm")?,
        ph,
        turbidity_ntu: required(body.turbidity_ntu, "turbidity_ntu")?,
        ecoli_contamination: required(body.ecoli_contamination, "ecoli_contamination")?,
        cases: body.cases.unwrap_or(0),
        outbreak: body.outbreak.unwrap_or(false),
    })
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{} is required", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_body() -> AddWaterBody {
        AddWaterBody {
            year: Some(2025),
            district: Some("Bhubaneswar".to_string()),
            week: Some(12),
            rainfall_mm: Some(42.5),
            ph: Some(7.2),
            turbidity_ntu: Some(3.1),
            ecoli_contamination: Some(false),
            cases: None,
            outbreak: None,
        }
    }

    #[test]
    fn test_validate_defaults() {
        let new = validate(full_body()).unwrap();
        assert_eq!(new.cases, 0);
        assert!(!new.outbreak);
    }

    #[test]
    fn test_validate_missing_field() {
        let mut body = full_body();
        body.district = None;
        let err = validate(body).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "district is required"));
    }

    #[test]
    fn test_validate_week_range() {
        let mut body = full_body();
        body.week = Some(53);
        assert!(matches!(validate(body), Err(ApiError::Validation(_))));

        let mut body = full_body();
        body.week = Some(0);
        assert!(matches!(validate(body), Err(ApiError::Validation(_))));

        let mut body = full_body();
        body.week = Some(52);
        assert!(validate(body).is_ok());
    }

    #[test]
    fn test_validate_ph_range() {
        let mut body = full_body();
        body.ph = Some(14.5);
        assert!(matches!(validate(body), Err(ApiError::Validation(_))));

        let mut body = full_body();
        body.ph = Some(0.0);
        assert!(validate(body).is_ok());
    }

    #[test]
    fn test_validate_blank_district() {
        let mut body = full_body();
        body.district = Some("   ".to_string());
        assert!(matches!(validate(body), Err(ApiError::Validation(_))));
    }
}
