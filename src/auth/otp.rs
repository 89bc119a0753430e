//! OTP Manager
//! Mission: issue, verify, and retire one-time login codes for citizens

use crate::auth::token::TokenService;
use crate::config::OtpPolicy;
use crate::error::ApiError;
use crate::models::{CitizenProfile, Role};
use crate::sms::SmsNotifier;
use crate::store::CitizenStore;
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a successful verification: a signed session token plus the
/// sanitized citizen it belongs to.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub citizen: CitizenProfile,
}

/// One-time code lifecycle. Codes are single-use (cleared on successful
/// verification) and additionally bounded by the configured policy.
pub struct OtpManager {
    citizens: Arc<CitizenStore>,
    tokens: Arc<TokenService>,
    sms: Arc<dyn SmsNotifier>,
    policy: OtpPolicy,
}

impl OtpManager {
    pub fn new(
        citizens: Arc<CitizenStore>,
        tokens: Arc<TokenService>,
        sms: Arc<dyn SmsNotifier>,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            citizens,
            tokens,
            sms,
            policy,
        }
    }

    /// Six decimal digits, uniform over [100000, 999999].
    fn generate_code() -> String {
        rand::thread_rng().gen_range(100_000..=999_999).to_string()
    }

    /// Issue a code for `phone`, creating the citizen on first contact.
    /// The code is durably stored before the delivery stub runs; requesting
    /// again simply replaces the previous code.
    pub fn request_otp(
        &self,
        phone: Option<&str>,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), ApiError> {
        let phone = phone
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::validation("Phone number is required"))?;

        let code = Self::generate_code();

        match self.citizens.find_by_phone(phone)? {
            Some(citizen) => self.citizens.set_pending_otp(&citizen.id, &code)?,
            None => {
                self.citizens
                    .create(phone, name, email, Some(&code))
                    .map_err(|e| {
                        ApiError::conflict_or_internal(e, "User with this phone or email already exists")
                    })?;
            }
        }

        self.sms.send_otp(phone, &code);
        info!("🔐 OTP issued for {}", phone);
        Ok(())
    }

    /// Verify `otp` for `phone`. The code is compared verbatim. On success it
    /// is cleared before the session is handed out, so it can never be
    /// replayed.
    pub fn verify_otp(&self, phone: Option<&str>, otp: Option<&str>) -> Result<Session, ApiError> {
        let (phone, otp) = match (
            phone.filter(|p| !p.is_empty()),
            otp.filter(|o| !o.is_empty()),
        ) {
            (Some(p), Some(o)) => (p, o),
            _ => return Err(ApiError::validation("Phone and OTP are required")),
        };

        let citizen = self
            .citizens
            .find_by_phone(phone)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let Some(pending) = citizen.pending_otp.as_deref() else {
            // No code outstanding: never requested, or already used.
            return Err(ApiError::validation("Invalid OTP"));
        };

        if self.policy.max_attempts > 0 && citizen.otp_attempts >= self.policy.max_attempts {
            warn!("⚠️ OTP attempt limit reached for {}", phone);
            return Err(ApiError::validation("Too many attempts, request a new OTP"));
        }

        if self.policy.max_age_secs > 0 {
            let expired = citizen.otp_issued_at.map_or(true, |issued| {
                Utc::now().signed_duration_since(issued).num_seconds()
                    > self.policy.max_age_secs as i64
            });
            if expired {
                return Err(ApiError::validation("OTP expired, request a new one"));
            }
        }

        // Exact string comparison, no normalization.
        if pending != otp {
            self.citizens.record_failed_attempt(&citizen.id)?;
            return Err(ApiError::validation("Invalid OTP"));
        }

        self.citizens.clear_pending_otp(&citizen.id)?;

        let token = self.tokens.issue_for_role(&citizen.id, Role::Citizen)?;
        info!("✅ Citizen login: {}", phone);

        Ok(Session {
            token,
            citizen: CitizenProfile::from_citizen(&citizen),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;
    use parking_lot::Mutex;
    use tempfile::NamedTempFile;

    /// Captures sent codes instead of logging them.
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl SmsNotifier for RecordingNotifier {
        fn send_otp(&self, phone: &str, code: &str) {
            self.sent.lock().push((phone.to_string(), code.to_string()));
        }
    }

    struct Fixture {
        manager: OtpManager,
        citizens: Arc<CitizenStore>,
        notifier: Arc<RecordingNotifier>,
        file: NamedTempFile,
    }

    fn fixture(policy: OtpPolicy) -> Fixture {
        let file = NamedTempFile::new().unwrap();
        let db = Database::open(file.path().to_str().unwrap()).unwrap();
        let citizens = Arc::new(CitizenStore::new(db));
        let tokens = Arc::new(TokenService::new("test-secret-key-12345"));
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OtpManager::new(
            citizens.clone(),
            tokens,
            notifier.clone(),
            policy,
        );
        Fixture {
            manager,
            citizens,
            notifier,
            file,
        }
    }

    fn last_sent_code(f: &Fixture) -> String {
        f.notifier.sent.lock().last().unwrap().1.clone()
    }

    #[test]
    fn test_request_creates_citizen_and_sends_code() {
        let f = fixture(OtpPolicy::default());

        f.manager
            .request_otp(Some("9998887776"), Some("Asha"), None)
            .unwrap();

        let citizen = f.citizens.find_by_phone("9998887776").unwrap().unwrap();
        let code = last_sent_code(&f);
        assert_eq!(citizen.pending_otp.as_deref(), Some(code.as_str()));
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_request_without_phone_fails() {
        let f = fixture(OtpPolicy::default());
        let err = f.manager.request_otp(None, None, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Phone number is required"));

        let err = f.manager.request_otp(Some(""), None, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_verify_is_single_use() {
        let f = fixture(OtpPolicy::default());
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let code = last_sent_code(&f);

        let session = f
            .manager
            .verify_otp(Some("9998887776"), Some(&code))
            .unwrap();
        assert!(!session.token.is_empty());
        assert_eq!(session.citizen.phone, "9998887776");

        // Same code again must fail.
        let err = f
            .manager
            .verify_otp(Some("9998887776"), Some(&code))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Invalid OTP"));
    }

    #[test]
    fn test_mismatch_keeps_code_usable() {
        let f = fixture(OtpPolicy::default());
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let code = last_sent_code(&f);

        let wrong = if code == "111111" { "222222" } else { "111111" };
        let err = f
            .manager
            .verify_otp(Some("9998887776"), Some(wrong))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Invalid OTP"));

        // The stored code survived the mismatch.
        f.manager.verify_otp(Some("9998887776"), Some(&code)).unwrap();
    }

    #[test]
    fn test_padded_code_is_a_mismatch() {
        let f = fixture(OtpPolicy::default());
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let code = last_sent_code(&f);

        // Comparison is verbatim: surrounding whitespace is not stripped.
        let err = f
            .manager
            .verify_otp(Some("9998887776"), Some(&format!("  {}  ", code)))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Invalid OTP"));

        // The stored code is untouched and the exact form still logs in.
        let citizen = f.citizens.find_by_phone("9998887776").unwrap().unwrap();
        assert_eq!(citizen.pending_otp.as_deref(), Some(code.as_str()));
        f.manager.verify_otp(Some("9998887776"), Some(&code)).unwrap();
    }

    #[test]
    fn test_padded_phone_matches_nothing() {
        let f = fixture(OtpPolicy::default());
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let code = last_sent_code(&f);

        let err = f
            .manager
            .verify_otp(Some(" 9998887776 "), Some(&code))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_reissue_replaces_previous_code() {
        let f = fixture(OtpPolicy::default());
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let first = last_sent_code(&f);

        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let second = last_sent_code(&f);

        let citizen = f.citizens.find_by_phone("9998887776").unwrap().unwrap();
        assert_eq!(citizen.pending_otp.as_deref(), Some(second.as_str()));
        if first != second {
            let err = f
                .manager
                .verify_otp(Some("9998887776"), Some(&first))
                .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
    }

    #[test]
    fn test_unknown_phone_is_not_found() {
        let f = fixture(OtpPolicy::default());
        let err = f
            .manager
            .verify_otp(Some("0000000000"), Some("123456"))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg == "User not found"));
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        let f = fixture(OtpPolicy::default());
        let err = f.manager.verify_otp(Some("9998887776"), None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Phone and OTP are required"));

        let err = f.manager.verify_otp(None, Some("123456")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_attempt_limit_locks_out_correct_code() {
        let f = fixture(OtpPolicy {
            max_age_secs: 0,
            max_attempts: 2,
        });
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let code = last_sent_code(&f);
        let wrong = if code == "111111" { "222222" } else { "111111" };

        for _ in 0..2 {
            let _ = f.manager.verify_otp(Some("9998887776"), Some(wrong));
        }

        // Even the right code is refused once the limit is hit.
        let err = f
            .manager
            .verify_otp(Some("9998887776"), Some(&code))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("Too many attempts")));
    }

    #[test]
    fn test_expired_code_is_refused() {
        let f = fixture(OtpPolicy {
            max_age_secs: 60,
            max_attempts: 0,
        });
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let code = last_sent_code(&f);

        // Backdate the issuance far past the 60s window.
        let conn = rusqlite::Connection::open(f.file.path()).unwrap();
        let past = (Utc::now() - chrono::Duration::seconds(3600)).to_rfc3339();
        conn.execute(
            "UPDATE citizens SET otp_issued_at = ?1 WHERE phone = ?2",
            rusqlite::params![past, "9998887776"],
        )
        .unwrap();

        let err = f
            .manager
            .verify_otp(Some("9998887776"), Some(&code))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("OTP expired")));
    }

    #[test]
    fn test_unbounded_policy_accepts_old_code() {
        let f = fixture(OtpPolicy::unbounded());
        f.manager.request_otp(Some("9998887776"), None, None).unwrap();
        let code = last_sent_code(&f);

        let conn = rusqlite::Connection::open(f.file.path()).unwrap();
        let past = (Utc::now() - chrono::Duration::seconds(86_400)).to_rfc3339();
        conn.execute(
            "UPDATE citizens SET otp_issued_at = ?1 WHERE phone = ?2",
            rusqlite::params![past, "9998887776"],
        )
        .unwrap();

        f.manager.verify_otp(Some("9998887776"), Some(&code)).unwrap();
    }
}
