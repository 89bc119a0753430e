//! Runtime Configuration
//! Mission: read process-wide settings once at startup and fail fast on gaps

use anyhow::{bail, Context, Result};
use std::env;

/// Bounds on a pending OTP. A zero value disables that bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpPolicy {
    /// Seconds a code stays valid after issuance.
    pub max_age_secs: u64,
    /// Failed verification attempts allowed before the code is refused.
    pub max_attempts: u32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            max_age_secs: 600,
            max_attempts: 5,
        }
    }
}

impl OtpPolicy {
    /// Policy with no expiry and no attempt cap.
    pub fn unbounded() -> Self {
        Self {
            max_age_secs: 0,
            max_attempts: 0,
        }
    }
}

/// Process configuration, loaded once in `main` and handed to constructors.
/// Secrets are never read from the environment anywhere else.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub jwt_secret: String,
    pub port: u16,
    pub frontend_url: String,
    pub otp_policy: OtpPolicy,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// `DATABASE_PATH` and `JWT_SECRET` are required. Everything else has a
    /// sensible default.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            env::var("DATABASE_PATH").context("DATABASE_PATH must be set (path to the SQLite database)")?;

        let jwt_secret =
            env::var("JWT_SECRET").context("JWT_SECRET must be set (refusing to issue unsigned tokens)")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET is set but empty");
        }

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let otp_policy = OtpPolicy {
            max_age_secs: env::var("OTP_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(OtpPolicy::default().max_age_secs),
            max_attempts: env::var("OTP_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(OtpPolicy::default().max_attempts),
        };

        Ok(Self {
            database_path,
            jwt_secret,
            port,
            frontend_url,
            otp_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_otp_policy() {
        let policy = OtpPolicy::default();
        assert_eq!(policy.max_age_secs, 600);
        assert_eq!(policy.max_attempts, 5);
    }

    #[test]
    fn test_unbounded_policy_disables_limits() {
        let policy = OtpPolicy::unbounded();
        assert_eq!(policy.max_age_secs, 0);
        assert_eq!(policy.max_attempts, 0);
    }
}
