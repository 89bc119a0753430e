//! SQLite Store
//! Mission: durable persistence for citizens, officials, measurements,
//! symptom reports, and advisories behind one shared connection

mod advisories;
mod citizens;
mod officials;
mod reports;
mod water;

pub use advisories::AdvisoryStore;
pub use citizens::CitizenStore;
pub use officials::OfficialStore;
pub use reports::SymptomReportStore;
pub use water::{NewWaterRecord, WaterDataStore};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{info, warn};

/// Uniqueness (phone, email, gov id) is enforced here so duplicates surface
/// as constraint violations instead of racy pre-checks.
const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS citizens (
    id TEXT PRIMARY KEY,
    phone TEXT NOT NULL UNIQUE,
    name TEXT,
    email TEXT UNIQUE,
    pending_otp TEXT,
    otp_issued_at TEXT,
    otp_attempts INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS officials (
    id TEXT PRIMARY KEY,
    gov_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS water_records (
    id TEXT PRIMARY KEY,
    year INTEGER NOT NULL,
    district TEXT NOT NULL,
    week INTEGER NOT NULL,
    rainfall_mm REAL NOT NULL,
    ph REAL NOT NULL,
    turbidity_ntu REAL NOT NULL,
    ecoli_contamination INTEGER NOT NULL,
    cases INTEGER NOT NULL DEFAULT 0,
    outbreak INTEGER NOT NULL DEFAULT 0,
    reported_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_water_created ON water_records(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_water_district_week ON water_records(district, week);

CREATE TABLE IF NOT EXISTS symptom_reports (
    id TEXT PRIMARY KEY,
    citizen_id TEXT NOT NULL,
    symptoms TEXT NOT NULL,
    location TEXT NOT NULL,
    reported_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_symptoms_citizen ON symptom_reports(citizen_id, reported_at DESC);

CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    district TEXT,
    severity TEXT NOT NULL DEFAULT 'medium',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS daily_tips (
    id TEXT PRIMARY KEY,
    message TEXT NOT NULL,
    date TEXT NOT NULL
);
"#;

/// Shared handle to the backing SQLite database. Cheap to clone; all stores
/// created from one handle serialize their access through the same mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database (creating the file if needed) and apply the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap_or_default();
        if !journal_mode.eq_ignore_ascii_case("wal") {
            warn!("⚠️ WAL not active, journal_mode = {}", journal_mode);
        }

        info!("📊 Store ready at {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

/// True when a store error is a UNIQUE-constraint violation (duplicate
/// phone, email, or gov id).
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Timestamps are stored as RFC 3339 text; rows we wrote ourselves always
/// parse, anything corrupt collapses to the epoch minimum.
pub(crate) fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_applies_schema() {
        let file = NamedTempFile::new().unwrap();
        let db = Database::open(file.path().to_str().unwrap()).unwrap();

        let count: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('citizens', 'officials', 'water_records', 'symptom_reports', 'alerts', 'daily_tips')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_open_is_idempotent() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        drop(Database::open(&path).unwrap());
        Database::open(&path).unwrap();
    }

    #[test]
    fn test_parse_ts_roundtrip() {
        let now = Utc::now();
        assert_eq!(parse_ts(&now.to_rfc3339()), now);
        assert_eq!(parse_ts("not a timestamp"), DateTime::<Utc>::MIN_UTC);
    }
}
