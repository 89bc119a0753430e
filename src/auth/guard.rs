//! Access Guard
//! Mission: resolve bearer tokens into principals before handlers run

use crate::api::AppState;
use crate::auth::token::{Claims, TokenService};
use crate::error::ApiError;
use crate::models::{CitizenProfile, OfficialProfile, Role};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Guard for citizen-only routes. On success the resolved `CitizenProfile`
/// is attached to request extensions.
pub async fn citizen_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(state, req, next, Role::Citizen).await
}

/// Guard for official-only routes, attaching an `OfficialProfile`.
pub async fn official_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(state, req, next, Role::Official).await
}

/// One pipeline for both roles: extract, verify, resolve, attach. The
/// expected role selects the principal resolver.
async fn authorize(
    state: AppState,
    mut req: Request,
    next: Next,
    expected: Role,
) -> Result<Response, ApiError> {
    let claims = verify_bearer(&state.tokens, req.headers(), expected)?;

    let subject = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::auth("Not authorized, token failed"))?;

    match expected {
        Role::Citizen => {
            let citizen = state
                .citizens
                .find_by_id(&subject)?
                .ok_or_else(|| ApiError::auth("Not authorized, user not found"))?;
            req.extensions_mut()
                .insert(CitizenProfile::from_citizen(&citizen));
        }
        Role::Official => {
            let official = state
                .officials
                .find_by_id(&subject)?
                .ok_or_else(|| ApiError::auth("Not authorized, government user not found"))?;
            req.extensions_mut()
                .insert(OfficialProfile::from_official(&official));
        }
    }

    Ok(next.run(req).await)
}

/// Header extraction, token verification, and role isolation. A token for
/// the wrong role fails exactly like a forged one.
fn verify_bearer(
    tokens: &TokenService,
    headers: &HeaderMap,
    expected: Role,
) -> Result<Claims, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::auth("Not authorized, no token provided"))?;

    let claims = tokens
        .verify(token)
        .map_err(|_| ApiError::auth("Not authorized, token failed"))?;

    if claims.role != expected {
        return Err(ApiError::auth("Not authorized, token failed"));
    }

    Ok(claims)
}
