//! Government Auth Endpoints
//! Mission: official registration, password login, and the official profile

use crate::api::AppState;
use crate::error::ApiError;
use crate::models::{OfficialProfile, Role};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterBody {
    pub name: Option<String>,
    /// Accepts the camelCase spelling older clients send.
    #[serde(alias = "govId")]
    pub gov_id: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register an official - POST /api/government/register
///
/// Open endpoint used during setup and seeding. Duplicate gov ids or emails
/// come back as 409.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(name), Some(gov_id), Some(email), Some(password)) = (
        non_empty(body.name),
        non_empty(body.gov_id),
        non_empty(body.email),
        non_empty(body.password),
    ) else {
        return Err(ApiError::validation("name, govId, email and password are required"));
    };

    if password.len() < 8 {
        return Err(ApiError::validation("Password must be at least 8 characters"));
    }

    state
        .officials
        .create(&gov_id, &name, &email, &password)
        .map_err(|e| ApiError::conflict_or_internal(e, "User with this govId or email already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Government user registered successfully" })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginBody {
    #[serde(alias = "govId")]
    pub gov_id: Option<String>,
    pub password: Option<String>,
}

/// Log in with gov id and password - POST /api/government/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError> {
    let (Some(gov_id), Some(password)) = (non_empty(body.gov_id), non_empty(body.password)) else {
        return Err(ApiError::validation("govId and password are required"));
    };

    let official = state
        .officials
        .find_by_gov_id(&gov_id)?
        .ok_or_else(|| ApiError::not_found("Government user not found"))?;

    if !state.officials.verify_password(&official, &password)? {
        warn!("❌ Failed official login: {}", gov_id);
        return Err(ApiError::validation("Invalid credentials"));
    }

    let token = state.tokens.issue_for_role(&official.id, Role::Official)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "role": Role::Official,
    })))
}

/// Current official profile - GET /api/government/profile (official guard)
pub async fn profile(Extension(official): Extension<OfficialProfile>) -> Json<OfficialProfile> {
    Json(official)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
