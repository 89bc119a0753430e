//! Citizen Auth Endpoints
//! Mission: the OTP login flow and the citizen profile

use crate::api::AppState;
use crate::error::ApiError;
use crate::models::CitizenProfile;
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestOtpBody {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Request an OTP - POST /api/user/request-otp
///
/// First contact registers the citizen; later requests replace the pending
/// code. The code itself travels over the SMS side channel, never in the
/// response.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestOtpBody>,
) -> Result<Json<Value>, ApiError> {
    state
        .otp
        .request_otp(body.phone.as_deref(), body.name.as_deref(), body.email.as_deref())?;

    Ok(Json(json!({ "message": "OTP sent successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyOtpBody {
    pub phone: Option<String>,
    pub otp: Option<String>,
}

/// Verify the OTP and log in - POST /api/user/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<Value>, ApiError> {
    let session = state
        .otp
        .verify_otp(body.phone.as_deref(), body.otp.as_deref())?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": session.token,
        "user": session.citizen,
    })))
}

/// Current citizen profile - GET /api/user/profile (citizen guard)
pub async fn profile(Extension(citizen): Extension<CitizenProfile>) -> Json<CitizenProfile> {
    Json(citizen)
}
