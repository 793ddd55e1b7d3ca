//! Background scheduler for recurring expense generation
//!
//! Enabled via environment variable:
//!
//! - `RECUR_GENERATE_INTERVAL_HOURS`: Interval in hours between due checks
//!   (e.g., "1" for hourly, "24" for daily)
//!
//! Every tick runs the due batch for every plan. Running from a single
//! background task keeps batches within one process from overlapping.

use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use recur_core::engine::{Clock, RecurringEngine};
use recur_core::Database;

/// Configuration for scheduled generation
#[derive(Debug, Clone)]
pub struct GenerationScheduleConfig {
    /// Interval between due checks in hours
    pub interval_hours: u64,
}

impl GenerationScheduleConfig {
    /// Parse configuration from environment variables
    ///
    /// Returns None if scheduling is not configured (RECUR_GENERATE_INTERVAL_HOURS not set)
    pub fn from_env() -> Option<Self> {
        let interval_hours: u64 = std::env::var("RECUR_GENERATE_INTERVAL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())?;

        if interval_hours == 0 {
            warn!("RECUR_GENERATE_INTERVAL_HOURS is 0, scheduled generation disabled");
            return None;
        }

        Some(Self { interval_hours })
    }
}

/// Start the generation scheduler as a background task
///
/// The first tick fires immediately so templates due today are generated
/// at startup.
pub fn start_generation_scheduler(db: Database, config: GenerationScheduleConfig, clock: Clock) {
    info!(
        "Starting generation scheduler: every {} hour(s)",
        config.interval_hours
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.interval_hours * 3600));

        loop {
            ticker.tick().await;
            run_scheduled_generation(&db, clock);
        }
    });
}

/// Run the due batch for every plan, returning the number of generated expenses
fn run_scheduled_generation(db: &Database, clock: Clock) -> usize {
    let plans = match db.list_plans() {
        Ok(plans) => plans,
        Err(e) => {
            error!("Scheduled generation could not list plans: {}", e);
            return 0;
        }
    };

    let engine = RecurringEngine::with_clock(db, db, clock);
    let mut generated = 0;

    for plan in plans {
        match engine.check_and_generate_for_plan(plan.id) {
            Ok(result) => generated += result.generated_count,
            Err(e) => error!(plan_id = plan.id, "Scheduled generation failed: {}", e),
        }
    }

    info!("Scheduled generation complete: {} expense(s) created", generated);
    generated
}
