//! Domain Models
//! Mission: the entities shared by stores, auth, and the HTTP surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Principal roles. Every session token carries exactly one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "citizen")]
    Citizen,
    #[serde(rename = "official")]
    Official,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Citizen => "citizen",
            Role::Official => "official",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "citizen" => Some(Role::Citizen),
            // Earlier deployments labelled officials "government".
            "official" | "government" => Some(Role::Official),
            _ => None,
        }
    }
}

/// Citizen account, keyed by phone number. The pending OTP trio is transient
/// login state and never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Citizen {
    pub id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub pending_otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub otp_attempts: u32,
    pub created_at: DateTime<Utc>,
}

/// Citizen view with login state stripped. This is what guards attach to
/// requests and what profile endpoints return.
#[derive(Debug, Clone, Serialize)]
pub struct CitizenProfile {
    pub id: Uuid,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CitizenProfile {
    pub fn from_citizen(citizen: &Citizen) -> Self {
        Self {
            id: citizen.id,
            phone: citizen.phone.clone(),
            name: citizen.name.clone(),
            email: citizen.email.clone(),
            created_at: citizen.created_at,
        }
    }
}

/// Government official account. Passwords are stored bcrypt-hashed and the
/// hash never leaves the store layer in a response.
#[derive(Debug, Clone, Serialize)]
pub struct Official {
    pub id: Uuid,
    pub gov_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Official view safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct OfficialProfile {
    pub id: Uuid,
    pub gov_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl OfficialProfile {
    pub fn from_official(official: &Official) -> Self {
        Self {
            id: official.id,
            gov_id: official.gov_id.clone(),
            name: official.name.clone(),
            email: official.email.clone(),
            role: Role::Official,
            created_at: official.created_at,
        }
    }
}

/// One weekly water-quality measurement for a district.
#[derive(Debug, Clone, Serialize)]
pub struct WaterRecord {
    pub id: Uuid,
    pub year: i32,
    pub district: String,
    /// ISO week, 1..=52.
    pub week: u32,
    pub rainfall_mm: f64,
    /// 0..=14.
    pub ph: f64,
    pub turbidity_ntu: f64,
    pub ecoli_contamination: bool,
    pub cases: i64,
    pub outbreak: bool,
    /// Official who recorded the measurement.
    pub reported_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl WaterRecord {
    /// Render the record as a one-row CSV document in the fixed report
    /// template (header line plus one data line).
    pub fn to_csv(&self) -> String {
        format!(
            "Year,District,Week,Rainfall_mm,pH,Turbidity_NTU,Ecoli_Contamination,Cases,Outbreak\n{},{},{},{},{},{},{},{},{}",
            self.year,
            self.district,
            self.week,
            self.rainfall_mm,
            self.ph,
            self.turbidity_ntu,
            self.ecoli_contamination,
            self.cases,
            self.outbreak
        )
    }
}

/// Citizen-submitted symptom report.
#[derive(Debug, Clone, Serialize)]
pub struct SymptomReport {
    pub id: Uuid,
    pub citizen_id: Uuid,
    pub symptoms: Vec<String>,
    pub location: String,
    pub reported_at: DateTime<Utc>,
}

/// Health alert severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(AlertSeverity::Low),
            "medium" => Some(AlertSeverity::Medium),
            "high" => Some(AlertSeverity::High),
            _ => None,
        }
    }
}

/// Broadcast health alert, optionally scoped to one district.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub district: Option<String>,
    pub severity: AlertSeverity,
    pub created_at: DateTime<Utc>,
}

/// Tip of the day shown on the citizen dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DailyTip {
    pub id: Uuid,
    pub message: String,
    pub date: DateTime<Utc>,
}
