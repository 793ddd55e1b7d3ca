//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting Recur web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    match recur_server::GenerationScheduleConfig::from_env() {
        Some(config) => println!(
            "   ⏰ Scheduled generation: every {} hour(s) (RECUR_GENERATE_INTERVAL_HOURS)",
            config.interval_hours
        ),
        None => println!(
            "   💡 Tip: Set RECUR_GENERATE_INTERVAL_HOURS to generate due templates automatically"
        ),
    }

    let db = open_db(db_path)?;
    recur_server::serve(db, host, port)
        .await
        .context("Server error")?;

    Ok(())
}
