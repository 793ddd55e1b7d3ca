//! Pattern detection and suggestion commands

use anyhow::{bail, Result};
use recur_core::db::Database;
use recur_core::engine::RecurringEngine;

use super::{format_amount, truncate};

pub fn cmd_detect(
    db: &Database,
    plan_id: i64,
    min_occurrences: Option<usize>,
    json: bool,
) -> Result<()> {
    let plan = db.require_plan(plan_id)?;
    let suggestions =
        RecurringEngine::new(db, db).detect_recurring_patterns(plan_id, min_occurrences)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    println!("🔍 Detecting recurring patterns in {}...", plan.name);

    if suggestions.is_empty() {
        println!("   No recurring patterns found.");
        return Ok(());
    }

    println!();
    for (i, s) in suggestions.iter().enumerate() {
        println!(
            "   {:>2}. {:24} │ {:>10} {} {:<11} │ {:<14} │ {:>3.0}% ({} txns)",
            i + 1,
            truncate(&s.name, 24),
            format_amount(s.amount),
            s.currency.as_deref().unwrap_or(&plan.currency),
            s.frequency.as_str(),
            s.category.as_str(),
            s.confidence * 100.0,
            s.source_expense_ids.len()
        );
    }
    println!();
    println!(
        "   Accept one with: recur suggestions accept --plan {} --index N --bucket B",
        plan_id
    );

    Ok(())
}

/// Re-run detection and accept the suggestion at the 1-based `index`
pub fn cmd_suggestions_accept(
    db: &Database,
    plan_id: i64,
    index: usize,
    bucket_id: i64,
) -> Result<()> {
    db.require_plan(plan_id)?;
    let engine = RecurringEngine::new(db, db);
    let suggestions = engine.detect_recurring_patterns(plan_id, None)?;

    let Some(suggestion) = index.checked_sub(1).and_then(|i| suggestions.get(i)) else {
        bail!(
            "No suggestion #{} (detection found {})",
            index,
            suggestions.len()
        );
    };

    let template = engine.create_template_from_suggestion(plan_id, suggestion, bucket_id)?;
    println!(
        "✅ Created template {} (ID: {}) - {} {}",
        template.name,
        template.id,
        format_amount(template.amount),
        template.frequency
    );
    if let Some(next) = engine.next_generation_date(&template) {
        println!("   Next generation: {}", next);
    }

    Ok(())
}
