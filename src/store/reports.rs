//! Symptom Report Store
//! Mission: citizen-submitted symptom reports, newest first

use crate::models::SymptomReport;
use crate::store::{parse_ts, Database};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

/// Symptom reports. The symptom list is stored as a JSON array in one
/// column; reports are append-only.
pub struct SymptomReportStore {
    db: Database,
}

impl SymptomReportStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<SymptomReport> {
        Ok(SymptomReport {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            citizen_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            symptoms: serde_json::from_str(&row.get::<_, String>(2)?).unwrap_or_default(),
            location: row.get(3)?,
            reported_at: parse_ts(&row.get::<_, String>(4)?),
        })
    }

    pub fn create(&self, citizen_id: &Uuid, symptoms: &[String], location: &str) -> Result<SymptomReport> {
        let report = SymptomReport {
            id: Uuid::new_v4(),
            citizen_id: *citizen_id,
            symptoms: symptoms.to_vec(),
            location: location.to_string(),
            reported_at: Utc::now(),
        };

        let symptoms_json =
            serde_json::to_string(&report.symptoms).context("Failed to encode symptom list")?;

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO symptom_reports (id, citizen_id, symptoms, location, reported_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                report.id.to_string(),
                report.citizen_id.to_string(),
                symptoms_json,
                report.location,
                report.reported_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert symptom report")?;

        Ok(report)
    }

    /// The `limit` newest reports across all citizens.
    pub fn latest(&self, limit: usize) -> Result<Vec<SymptomReport>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, citizen_id, symptoms, location, reported_at
             FROM symptom_reports ORDER BY reported_at DESC LIMIT ?1",
        )?;

        let reports = stmt
            .query_map(params![limit as i64], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reports)
    }

    /// Every report this citizen has submitted, newest first.
    pub fn for_citizen(&self, citizen_id: &Uuid) -> Result<Vec<SymptomReport>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, citizen_id, symptoms, location, reported_at
             FROM symptom_reports WHERE citizen_id = ?1 ORDER BY reported_at DESC",
        )?;

        let reports = stmt
            .query_map(params![citizen_id.to_string()], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_store() -> (SymptomReportStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let db = Database::open(file.path().to_str().unwrap()).unwrap();
        (SymptomReportStore::new(db), file)
    }

    #[test]
    fn test_create_and_read_back() {
        let (store, _file) = test_store();
        let citizen = Uuid::new_v4();

        let symptoms = vec!["fever".to_string(), "diarrhea".to_string()];
        let report = store.create(&citizen, &symptoms, "Ward 3").unwrap();

        let mine = store.for_citizen(&citizen).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, report.id);
        assert_eq!(mine[0].symptoms, symptoms);
        assert_eq!(mine[0].location, "Ward 3");
    }

    #[test]
    fn test_for_citizen_is_scoped() {
        let (store, _file) = test_store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.create(&alice, &["fever".to_string()], "Ward 1").unwrap();
        store.create(&bob, &["nausea".to_string()], "Ward 2").unwrap();

        let for_alice = store.for_citizen(&alice).unwrap();
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].location, "Ward 1");
    }

    #[test]
    fn test_latest_limit_and_order() {
        let (store, _file) = test_store();
        let citizen = Uuid::new_v4();

        for i in 0..4 {
            store
                .create(&citizen, &["fever".to_string()], &format!("Ward {}", i))
                .unwrap();
        }

        let latest = store.latest(2).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].location, "Ward 3");
        assert_eq!(latest[1].location, "Ward 2");
    }
}
