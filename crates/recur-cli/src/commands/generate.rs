//! Expense generation commands

use anyhow::{bail, Result};
use recur_core::db::Database;
use recur_core::engine::RecurringEngine;
use recur_core::models::BatchResult;

use super::format_amount;

/// Generate from one template now, or run the due batch for a plan
pub fn cmd_generate(db: &Database, template_id: Option<i64>, plan_id: Option<i64>) -> Result<()> {
    let engine = RecurringEngine::new(db, db);

    match (template_id, plan_id) {
        (Some(id), _) => {
            let Some(expense) = engine.generate_now(id)? else {
                bail!("Template not found: {}", id);
            };
            println!(
                "✅ Generated {} {} on {} (expense ID: {})",
                expense.name,
                format_amount(expense.amount),
                expense.effective_date(),
                expense.id
            );
            Ok(())
        }
        (None, Some(plan_id)) => {
            let plan = db.require_plan(plan_id)?;
            println!("⚙️  Generating due templates for {}...", plan.name);
            let result = engine.check_and_generate_for_plan(plan_id)?;
            print_batch_result(&result);
            Ok(())
        }
        (None, None) => bail!("Pass --template <id> or --plan <id>"),
    }
}

fn print_batch_result(result: &BatchResult) {
    println!(
        "   {} due, {} generated, {} failed",
        result.checked_count,
        result.generated_count,
        result.errors.len()
    );
    for failure in &result.errors {
        println!(
            "   ⚠️  {} (ID: {}): {}",
            failure.template_name, failure.template_id, failure.error_message
        );
    }
}
