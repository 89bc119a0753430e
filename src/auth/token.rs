//! Session Tokens
//! Mission: tamper-evident identity and role claims with per-role lifetimes

use crate::models::Role;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Citizen sessions last a week, official sessions a day.
const CITIZEN_TTL_SECS: i64 = 7 * 24 * 3600;
const OFFICIAL_TTL_SECS: i64 = 24 * 3600;

/// Clock skew tolerated when checking expiry.
const LEEWAY_SECS: u64 = 30;

/// Default session lifetime for a role.
pub fn ttl_for(role: Role) -> Duration {
    Duration::seconds(match role {
        Role::Citizen => CITIZEN_TTL_SECS,
        Role::Official => OFFICIAL_TTL_SECS,
    })
}

/// Claims carried by every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id.
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies signed session tokens (HS256). The signing secret is
/// injected at construction and never read from the environment here.
pub struct TokenService {
    secret: String,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    /// Sign a token for `subject` with an explicit lifetime.
    pub fn issue(&self, subject: &Uuid, role: Role, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(ttl)
            .context("Token lifetime overflows")?;

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp().max(0) as usize,
            exp: expires.timestamp().max(0) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign session token")
    }

    /// Sign a token with the role's default lifetime.
    pub fn issue_for_role(&self, subject: &Uuid, role: Role) -> Result<String> {
        self.issue(subject, role, ttl_for(role))
    }

    /// Decode and verify a token. Bad signature, wrong shape, and expiry
    /// (beyond the leeway) all fail the same way.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = LEEWAY_SECS;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .context("Invalid or expired token")?;

        Ok(data.claims)
    }
}
