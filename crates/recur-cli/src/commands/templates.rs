//! Recurring template command implementations

use anyhow::{anyhow, bail, Result};
use recur_core::db::Database;
use recur_core::engine::RecurringEngine;
use recur_core::schedule::anchor_day;
use recur_core::store::TemplateStore;

use super::{format_amount, truncate};

pub fn cmd_templates_list(db: &Database, plan_id: i64) -> Result<()> {
    let plan = db.require_plan(plan_id)?;
    let templates = db.templates_by_plan(plan_id)?;

    if templates.is_empty() {
        println!("No templates in {}. Find candidates with:", plan.name);
        println!("  recur detect --plan {}", plan_id);
        return Ok(());
    }

    let engine = RecurringEngine::new(db, db);

    println!();
    println!("🔁 Recurring templates in {}", plan.name);
    println!("   ─────────────────────────────────────────────────────────────");

    for t in templates {
        let status_icon = if t.is_active { "✅" } else { "⏸️ " };
        let next = engine
            .next_generation_date(&t)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "paused".to_string());
        println!(
            "   {} {:>4} │ {:24} │ {:>10} {} │ day {:>2} │ next {}",
            status_icon,
            t.id,
            truncate(&t.name, 24),
            format_amount(t.amount),
            t.currency.as_deref().unwrap_or(&plan.currency),
            anchor_day(&t),
            next
        );
    }

    Ok(())
}

pub fn cmd_templates_from_expense(
    db: &Database,
    expense_id: i64,
    day: Option<u32>,
) -> Result<()> {
    let expense = db
        .get_expense(expense_id)?
        .ok_or_else(|| anyhow!("Expense not found: {}", expense_id))?;

    let template = RecurringEngine::new(db, db).create_template_from_expense(&expense, day)?;
    println!(
        "✅ Created template {} (ID: {}) on day {}",
        template.name,
        template.id,
        anchor_day(&template)
    );
    Ok(())
}

pub fn cmd_templates_set_active(db: &Database, id: i64, active: bool) -> Result<()> {
    db.set_template_active(id, active)?;
    if active {
        println!("✅ Template {} enabled", id);
    } else {
        println!("⏸️  Template {} disabled", id);
    }
    Ok(())
}

pub fn cmd_templates_set_day(db: &Database, id: i64, day: Option<u32>) -> Result<()> {
    db.update_template_schedule(id, day)?;
    let template = db
        .get_template(id)?
        .ok_or_else(|| anyhow!("Template not found: {}", id))?;

    let source = if day.is_some() { "day" } else { "creation day" };
    println!(
        "📅 {} now generates on {} {}",
        template.name,
        source,
        anchor_day(&template)
    );
    Ok(())
}

pub fn cmd_templates_delete(db: &Database, id: i64) -> Result<()> {
    if !db.delete_template(id)? {
        bail!("Template not found: {}", id);
    }
    println!("🗑️  Template {} deleted (generated expenses kept)", id);
    Ok(())
}

pub fn cmd_templates_next(db: &Database, id: i64) -> Result<()> {
    let template = db
        .get_template(id)?
        .ok_or_else(|| anyhow!("Template not found: {}", id))?;

    match RecurringEngine::new(db, db).next_generation_date(&template) {
        Some(date) => println!("📅 {} next generates on {}", template.name, date),
        None => println!("⏸️  {} is disabled", template.name),
    }
    Ok(())
}
