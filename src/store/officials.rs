//! Official Store
//! Mission: government accounts with bcrypt-hashed passwords

use crate::models::Official;
use crate::store::{parse_ts, Database};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Row};
use tracing::info;
use uuid::Uuid;

/// Government official accounts, keyed by gov id. The plaintext password
/// never touches the database.
pub struct OfficialStore {
    db: Database,
}

impl OfficialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Official> {
        Ok(Official {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            gov_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
            created_at: parse_ts(&row.get::<_, String>(5)?),
        })
    }

    /// Register an official. A duplicate gov id or email surfaces as a
    /// constraint violation.
    pub fn create(&self, gov_id: &str, name: &str, email: &str, password: &str) -> Result<Official> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let official = Official {
            id: Uuid::new_v4(),
            gov_id: gov_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO officials (id, gov_id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                official.id.to_string(),
                official.gov_id,
                official.name,
                official.email,
                official.password_hash,
                official.created_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert official")?;

        info!("✅ Registered official: {} ({})", official.gov_id, official.email);
        Ok(official)
    }

    pub fn find_by_gov_id(&self, gov_id: &str) -> Result<Option<Official>> {
        let conn = self.db.conn();
        let result = conn.query_row(
            "SELECT id, gov_id, name, email, password_hash, created_at
             FROM officials WHERE gov_id = ?1",
            params![gov_id],
            Self::from_row,
        );

        match result {
            Ok(official) => Ok(Some(official)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<Official>> {
        let conn = self.db.conn();
        let result = conn.query_row(
            "SELECT id, gov_id, name, email, password_hash, created_at
             FROM officials WHERE id = ?1",
            params![id.to_string()],
            Self::from_row,
        );

        match result {
            Ok(official) => Ok(Some(official)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a login password against the stored hash.
    pub fn verify_password(&self, official: &Official, password: &str) -> Result<bool> {
        verify(password, &official.password_hash).context("Failed to verify password")
    }
}
