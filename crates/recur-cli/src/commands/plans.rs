//! Plan command implementations

use anyhow::Result;
use recur_core::db::Database;

use super::truncate;

pub fn cmd_plans_list(db: &Database) -> Result<()> {
    let plans = db.list_plans()?;

    if plans.is_empty() {
        println!("No plans yet. Create one with:");
        println!("  recur plans add --name Household");
        return Ok(());
    }

    println!();
    println!("📒 Plans");
    println!("   ─────────────────────────────────────────────");

    for plan in plans {
        println!(
            "   {:>4} │ {:28} │ {}",
            plan.id,
            truncate(&plan.name, 28),
            plan.currency
        );
    }

    Ok(())
}

pub fn cmd_plans_add(db: &Database, name: &str, currency: &str) -> Result<()> {
    let id = db.create_plan(name, currency)?;
    println!("✅ Created plan {} (ID: {})", name.trim(), id);
    Ok(())
}
