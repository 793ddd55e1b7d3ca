//! Expense command implementations (list, add, CSV import)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use recur_core::db::Database;
use recur_core::import::{parse_amount, parse_expense_csv};
use recur_core::models::{ExpenseCategory, Frequency, NewExpense};
use recur_core::store::TransactionStore;

use super::{format_amount, truncate};

pub fn cmd_expenses_list(db: &Database, plan_id: i64, limit: i64) -> Result<()> {
    let plan = db.require_plan(plan_id)?;
    let expenses = db.list_expenses(plan_id, Some(limit))?;

    if expenses.is_empty() {
        println!("No expenses in plan {}.", plan.name);
        return Ok(());
    }

    println!();
    println!("💳 Expenses in {} (newest first)", plan.name);
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in expenses {
        let marker = if expense.template_id.is_some() { "🔁" } else { "  " };
        println!(
            "   {} {} │ {:28} │ {:>10} {} │ {}",
            marker,
            expense.effective_date(),
            truncate(&expense.name, 28),
            format_amount(expense.amount),
            expense.currency.as_deref().unwrap_or(&plan.currency),
            expense.category
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_expenses_add(
    db: &Database,
    plan_id: i64,
    name: &str,
    amount: &str,
    category: &str,
    bucket_id: i64,
    date: Option<&str>,
    currency: Option<&str>,
) -> Result<()> {
    db.require_plan(plan_id)?;

    let amount = parse_amount(amount)?;
    let category: ExpenseCategory = category.parse().map_err(anyhow::Error::msg)?;
    let transaction_date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => chrono::Local::now().date_naive(),
    };

    let expense = db.create_expense(&NewExpense {
        plan_id,
        name: name.to_string(),
        amount,
        frequency: Frequency::Monthly,
        category,
        currency: currency.map(|c| c.to_uppercase()),
        transaction_date: Some(transaction_date),
        bucket_id,
        is_fixed: false,
        notes: None,
        template_id: None,
    })?;

    println!(
        "✅ Recorded {} {} on {} (ID: {})",
        expense.name,
        format_amount(expense.amount),
        transaction_date,
        expense.id
    );
    Ok(())
}

pub fn cmd_import(db: &Database, plan_id: i64, bucket_id: i64, file: &Path) -> Result<()> {
    let plan = db.require_plan(plan_id)?;

    println!("📥 Importing {} into {}...", file.display(), plan.name);

    let reader = std::fs::File::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let expenses = parse_expense_csv(reader, plan_id, bucket_id)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    for expense in &expenses {
        db.create_expense(expense)?;
    }

    println!("✅ Imported {} expense(s)", expenses.len());
    println!("   Look for recurring charges with: recur detect --plan {}", plan_id);
    Ok(())
}
