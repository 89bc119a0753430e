//! Citizen Store
//! Mission: citizen accounts plus their transient OTP login state

use crate::models::Citizen;
use crate::store::{parse_ts, Database};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use tracing::info;
use uuid::Uuid;

/// Citizen accounts keyed by phone number. Phone is unique; email is unique
/// when present (NULLs do not collide).
pub struct CitizenStore {
    db: Database,
}

impl CitizenStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Citizen> {
        Ok(Citizen {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            phone: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            pending_otp: row.get(4)?,
            otp_issued_at: row.get::<_, Option<String>>(5)?.map(|s| parse_ts(&s)),
            otp_attempts: row.get(6)?,
            created_at: parse_ts(&row.get::<_, String>(7)?),
        })
    }

    /// Insert a new citizen, optionally with an already-issued OTP. A
    /// duplicate phone or email surfaces as a constraint violation.
    pub fn create(
        &self,
        phone: &str,
        name: Option<&str>,
        email: Option<&str>,
        pending_otp: Option<&str>,
    ) -> Result<Citizen> {
        let now = Utc::now();
        let citizen = Citizen {
            id: Uuid::new_v4(),
            phone: phone.to_string(),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            pending_otp: pending_otp.map(str::to_string),
            otp_issued_at: pending_otp.map(|_| now),
            otp_attempts: 0,
            created_at: now,
        };

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO citizens (id, phone, name, email, pending_otp, otp_issued_at, otp_attempts, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                citizen.id.to_string(),
                citizen.phone,
                citizen.name,
                citizen.email,
                citizen.pending_otp,
                citizen.otp_issued_at.map(|t| t.to_rfc3339()),
                citizen.created_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert citizen")?;

        info!("✅ Registered citizen: {}", citizen.phone);
        Ok(citizen)
    }

    pub fn find_by_phone(&self, phone: &str) -> Result<Option<Citizen>> {
        let conn = self.db.conn();
        let result = conn.query_row(
            "SELECT id, phone, name, email, pending_otp, otp_issued_at, otp_attempts, created_at
             FROM citizens WHERE phone = ?1",
            params![phone],
            Self::from_row,
        );

        match result {
            Ok(citizen) => Ok(Some(citizen)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<Citizen>> {
        let conn = self.db.conn();
        let result = conn.query_row(
            "SELECT id, phone, name, email, pending_otp, otp_issued_at, otp_attempts, created_at
             FROM citizens WHERE id = ?1",
            params![id.to_string()],
            Self::from_row,
        );

        match result {
            Ok(citizen) => Ok(Some(citizen)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the pending OTP with a fresh code and reset the attempt
    /// counter. Last write wins when two requests race.
    pub fn set_pending_otp(&self, id: &Uuid, code: &str) -> Result<()> {
        let conn = self.db.conn();
        let changed = conn.execute(
            "UPDATE citizens SET pending_otp = ?1, otp_issued_at = ?2, otp_attempts = 0 WHERE id = ?3",
            params![code, Utc::now().to_rfc3339(), id.to_string()],
        )?;
        if changed == 0 {
            bail!("Citizen {} not found", id);
        }
        Ok(())
    }

    /// Clear the pending OTP after a successful verification so the code
    /// can never be replayed.
    pub fn clear_pending_otp(&self, id: &Uuid) -> Result<()> {
        let conn = self.db.conn();
        conn.execute(
            "UPDATE citizens SET pending_otp = NULL, otp_issued_at = NULL, otp_attempts = 0 WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }

    /// Count one failed verification against the pending code. The code
    /// itself stays in place.
    pub fn record_failed_attempt(&self, id: &Uuid) -> Result<()> {
        let conn = self.db.conn();
        conn.execute(
            "UPDATE citizens SET otp_attempts = otp_attempts + 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }
}
