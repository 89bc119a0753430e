//! Water Data Store
//! Mission: weekly district measurements, newest first

use crate::models::WaterRecord;
use crate::store::{parse_ts, Database};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

/// Validated fields for a new measurement. Range checks (week, pH) happen at
/// the handler boundary before this is built.
#[derive(Debug, Clone)]
pub struct NewWaterRecord {
    pub year: i32,
    pub district: String,
    pub week: u32,
    pub rainfall_mm: f64,
    pub ph: f64,
    pub turbidity_ntu: f64,
    pub ecoli_contamination: bool,
    pub cases: i64,
    pub outbreak: bool,
}

pub struct WaterDataStore {
    db: Database,
}

impl WaterDataStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<WaterRecord> {
        Ok(WaterRecord {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            year: row.get(1)?,
            district: row.get(2)?,
            week: row.get(3)?,
            rainfall_mm: row.get(4)?,
            ph: row.get(5)?,
            turbidity_ntu: row.get(6)?,
            ecoli_contamination: row.get(7)?,
            cases: row.get(8)?,
            outbreak: row.get(9)?,
            reported_by: Uuid::parse_str(&row.get::<_, String>(10)?).unwrap_or_default(),
            created_at: parse_ts(&row.get::<_, String>(11)?),
        })
    }

    /// Insert a measurement attributed to the reporting official.
    pub fn insert(&self, new: NewWaterRecord, reported_by: &Uuid) -> Result<WaterRecord> {
        let record = WaterRecord {
            id: Uuid::new_v4(),
            year: new.year,
            district: new.district,
            week: new.week,
            rainfall_mm: new.rainfall_mm,
            ph: new.ph,
            turbidity_ntu: new.turbidity_ntu,
            ecoli_contamination: new.ecoli_contamination,
            cases: new.cases,
            outbreak: new.outbreak,
            reported_by: *reported_by,
            created_at: Utc::now(),
        };

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO water_records
             (id, year, district, week, rainfall_mm, ph, turbidity_ntu, ecoli_contamination, cases, outbreak, reported_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.id.to_string(),
                record.year,
                record.district,
                record.week,
                record.rainfall_mm,
                record.ph,
                record.turbidity_ntu,
                record.ecoli_contamination,
                record.cases,
                record.outbreak,
                record.reported_by.to_string(),
                record.created_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert water record")?;

        Ok(record)
    }

    /// All measurements, newest first.
    pub fn all(&self) -> Result<Vec<WaterRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, year, district, week, rainfall_mm, ph, turbidity_ntu, ecoli_contamination, cases, outbreak, reported_by, created_at
             FROM water_records ORDER BY created_at DESC",
        )?;

        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// The `limit` newest measurements.
    pub fn latest(&self, limit: usize) -> Result<Vec<WaterRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, year, district, week, rainfall_mm, ph, turbidity_ntu, ecoli_contamination, cases, outbreak, reported_by, created_at
             FROM water_records ORDER BY created_at DESC LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit as i64], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Measurements matching every filter that is present. District matches
    /// exactly, no normalization.
    pub fn filter(
        &self,
        district: Option<&str>,
        week: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<WaterRecord>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, year, district, week, rainfall_mm, ph, turbidity_ntu, ecoli_contamination, cases, outbreak, reported_by, created_at
             FROM water_records
             WHERE (?1 IS NULL OR district = ?1)
               AND (?2 IS NULL OR week = ?2)
               AND (?3 IS NULL OR year = ?3)
             ORDER BY created_at DESC",
        )?;

        let records = stmt
            .query_map(params![district, week, year], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn find_by_id(&self, id: &Uuid) -> Result<Option<WaterRecord>> {
        let conn = self.db.conn();
        let result = conn.query_row(
            "SELECT id, year, district, week, rainfall_mm, ph, turbidity_ntu, ecoli_contamination, cases, outbreak, reported_by, created_at
             FROM water_records WHERE id = ?1",
            params![id.to_string()],
            Self::from_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_store() -> (WaterDataStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let db = Database::open(file.path().to_str().unwrap()).unwrap();
        (WaterDataStore::new(db), file)
    }

    fn sample(district: &str, week: u32) -> NewWaterRecord {
        NewWaterRecord {
            year: 2025,
            district: district.to_string(),
            week,
            rainfall_mm: 42.5,
            ph: 7.2,
            turbidity_ntu: 3.1,
            ecoli_contamination: false,
            cases: 0,
            outbreak: false,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let (store, _file) = test_store();
        let official = Uuid::new_v4();

        let record = store.insert(sample("Bhubaneswar", 12), &official).unwrap();
        let loaded = store.find_by_id(&record.id).unwrap().unwrap();

        assert_eq!(loaded.district, "Bhubaneswar");
        assert_eq!(loaded.week, 12);
        assert_eq!(loaded.reported_by, official);
        assert!(!loaded.ecoli_contamination);

        assert!(store.find_by_id(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_all_and_latest_are_newest_first() {
        let (store, _file) = test_store();
        let official = Uuid::new_v4();

        store.insert(sample("A", 1), &official).unwrap();
        store.insert(sample("B", 2), &official).unwrap();
        store.insert(sample("C", 3), &official).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].district, "C");
        assert_eq!(all[2].district, "A");

        let latest = store.latest(2).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].district, "C");
        assert_eq!(latest[1].district, "B");
    }

    #[test]
    fn test_filter_combinations() {
        let (store, _file) = test_store();
        let official = Uuid::new_v4();

        store.insert(sample("Bhubaneswar", 12), &official).unwrap();
        store.insert(sample("Bhubaneswar", 13), &official).unwrap();
        store.insert(sample("Cuttack", 12), &official).unwrap();

        let by_district = store.filter(Some("Bhubaneswar"), None, None).unwrap();
        assert_eq!(by_district.len(), 2);

        let by_both = store.filter(Some("Bhubaneswar"), Some(12), None).unwrap();
        assert_eq!(by_both.len(), 1);
        assert_eq!(by_both[0].week, 12);

        let by_week = store.filter(None, Some(12), None).unwrap();
        assert_eq!(by_week.len(), 2);

        let none = store.filter(Some("Puri"), None, None).unwrap();
        assert!(none.is_empty());

        // District match is exact.
        let exact = store.filter(Some("bhubaneswar"), None, None).unwrap();
        assert!(exact.is_empty());

        let unfiltered = store.filter(None, None, None).unwrap();
        assert_eq!(unfiltered.len(), 3);
    }
}
