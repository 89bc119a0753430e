//! Seed Tool
//! Registers officials and publishes starter advisories straight through the
//! stores. Alerts and daily tips have no public write routes, so this is how
//! they enter the system.

use anyhow::Result;
use aquawatch_backend::{
    models::AlertSeverity,
    store::{AdvisoryStore, Database, OfficialStore},
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "aquawatch-seed", about = "Seed officials, alerts, and daily tips")]
struct Args {
    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH")]
    database: String,

    /// Register an official with this gov id (requires --name, --email, --password)
    #[arg(long)]
    gov_id: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Publish an alert with this title
    #[arg(long)]
    alert: Option<String>,

    #[arg(long)]
    alert_description: Option<String>,

    #[arg(long)]
    alert_district: Option<String>,

    /// low, medium, or high
    #[arg(long, default_value = "medium")]
    alert_severity: String,

    /// Insert a daily tip
    #[arg(long)]
    tip: Option<String>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    let db = Database::open(&args.database)?;

    if let Some(gov_id) = &args.gov_id {
        let (Some(name), Some(email), Some(password)) = (&args.name, &args.email, &args.password)
        else {
            anyhow::bail!("--gov-id requires --name, --email, and --password");
        };

        let officials = OfficialStore::new(db.clone());
        let official = officials.create(gov_id, name, email, password)?;
        println!("Registered official {} ({})", official.gov_id, official.id);
    }

    let advisories = AdvisoryStore::new(db);

    if let Some(title) = &args.alert {
        let severity = AlertSeverity::from_str(&args.alert_severity)
            .ok_or_else(|| anyhow::anyhow!("Unknown severity: {}", args.alert_severity))?;
        let alert = advisories.insert_alert(
            title,
            args.alert_description.as_deref(),
            args.alert_district.as_deref(),
            severity,
        )?;
        println!("Published alert {} ({})", alert.title, alert.id);
    }

    if let Some(message) = &args.tip {
        let tip = advisories.insert_tip(message)?;
        println!("Inserted daily tip ({})", tip.id);
    }

    Ok(())
}
