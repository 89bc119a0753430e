//! Advisory Store
//! Mission: broadcast alerts and the daily tip feed

use crate::models::{Alert, AlertSeverity, DailyTip};
use crate::store::{parse_ts, Database};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use tracing::info;
use uuid::Uuid;

/// Alerts and daily tips. Both are written by the seed tool, read by the
/// citizen dashboard.
pub struct AdvisoryStore {
    db: Database,
}

impl AdvisoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn alert_from_row(row: &Row<'_>) -> rusqlite::Result<Alert> {
        Ok(Alert {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            title: row.get(1)?,
            description: row.get(2)?,
            district: row.get(3)?,
            severity: AlertSeverity::from_str(&row.get::<_, String>(4)?)
                .unwrap_or(AlertSeverity::Medium),
            created_at: parse_ts(&row.get::<_, String>(5)?),
        })
    }

    pub fn insert_alert(
        &self,
        title: &str,
        description: Option<&str>,
        district: Option<&str>,
        severity: AlertSeverity,
    ) -> Result<Alert> {
        let alert = Alert {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.map(str::to_string),
            district: district.map(str::to_string),
            severity,
            created_at: Utc::now(),
        };

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO alerts (id, title, description, district, severity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                alert.id.to_string(),
                alert.title,
                alert.description,
                alert.district,
                alert.severity.as_str(),
                alert.created_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert alert")?;

        info!("📢 Alert published: {} [{}]", alert.title, alert.severity.as_str());
        Ok(alert)
    }

    /// The `limit` newest alerts.
    pub fn latest_alerts(&self, limit: usize) -> Result<Vec<Alert>> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, district, severity, created_at
             FROM alerts ORDER BY created_at DESC LIMIT ?1",
        )?;

        let alerts = stmt
            .query_map(params![limit as i64], Self::alert_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(alerts)
    }

    pub fn insert_tip(&self, message: &str) -> Result<DailyTip> {
        let tip = DailyTip {
            id: Uuid::new_v4(),
            message: message.to_string(),
            date: Utc::now(),
        };

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO daily_tips (id, message, date) VALUES (?1, ?2, ?3)",
            params![tip.id.to_string(), tip.message, tip.date.to_rfc3339()],
        )
        .context("Failed to insert daily tip")?;

        Ok(tip)
    }

    /// The most recent tip, if any exist yet.
    pub fn latest_tip(&self) -> Result<Option<DailyTip>> {
        let conn = self.db.conn();
        let result = conn.query_row(
            "SELECT id, message, date FROM daily_tips ORDER BY date DESC LIMIT 1",
            [],
            |row| {
                Ok(DailyTip {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                    message: row.get(1)?,
                    date: parse_ts(&row.get::<_, String>(2)?),
                })
            },
        );

        match result {
            Ok(tip) => Ok(Some(tip)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_store() -> (AdvisoryStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let db = Database::open(file.path().to_str().unwrap()).unwrap();
        (AdvisoryStore::new(db), file)
    }

    #[test]
    fn test_alerts_newest_first_with_limit() {
        let (store, _file) = test_store();

        for i in 0..6 {
            store
                .insert_alert(&format!("Alert {}", i), None, None, AlertSeverity::High)
                .unwrap();
        }

        let latest = store.latest_alerts(5).unwrap();
        assert_eq!(latest.len(), 5);
        assert_eq!(latest[0].title, "Alert 5");
        assert_eq!(latest[4].title, "Alert 1");
    }

    #[test]
    fn test_alert_fields_roundtrip() {
        let (store, _file) = test_store();

        store
            .insert_alert(
                "Contamination warning",
                Some("Boil water before drinking"),
                Some("Cuttack"),
                AlertSeverity::High,
            )
            .unwrap();

        let alerts = store.latest_alerts(5).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].description.as_deref(), Some("Boil water before drinking"));
        assert_eq!(alerts[0].district.as_deref(), Some("Cuttack"));
        assert_eq!(alerts[0].severity, AlertSeverity::High);
    }

    #[test]
    fn test_latest_tip_picks_newest() {
        let (store, _file) = test_store();
        assert!(store.latest_tip().unwrap().is_none());

        store.insert_tip("Wash hands before meals").unwrap();
        store.insert_tip("Boil drinking water for one minute").unwrap();

        let tip = store.latest_tip().unwrap().unwrap();
        assert_eq!(tip.message, "Boil drinking water for one minute");
    }
}
