//! Expense operations

use rusqlite::{params, OptionalExtension};

use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, ExpenseCategory, Frequency, NewExpense};
use crate::store::TransactionStore;

const EXPENSE_COLUMNS: &str = "id, plan_id, name, amount, frequency, category, currency, \
     transaction_date, bucket_id, is_fixed, notes, template_id, created_at, updated_at";

fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
    let frequency_str: String = row.get(4)?;
    let category_str: String = row.get(5)?;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    Ok(Expense {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        frequency: frequency_str.parse().unwrap_or(Frequency::Monthly),
        category: category_str.parse().unwrap_or(ExpenseCategory::Other),
        currency: row.get(6)?,
        transaction_date: parse_date(row.get(7)?),
        bucket_id: row.get(8)?,
        is_fixed: row.get(9)?,
        notes: row.get(10)?,
        template_id: row.get(11)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

impl Database {
    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
                params![id],
                row_to_expense,
            )
            .optional()?;
        Ok(expense)
    }

    /// List a plan's expenses, newest first
    pub fn list_expenses(&self, plan_id: i64, limit: Option<i64>) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM expenses
            WHERE plan_id = ?
            ORDER BY COALESCE(transaction_date, date(created_at)) DESC, id DESC
            LIMIT ?
            "#,
            EXPENSE_COLUMNS
        ))?;
        // SQLite treats a negative LIMIT as "no limit"
        let expenses = stmt
            .query_map(params![plan_id, limit.unwrap_or(-1)], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// Expenses generated by a template, oldest first
    pub fn expenses_for_template(&self, template_id: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE template_id = ? ORDER BY id",
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(params![template_id], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }
}

impl TransactionStore for Database {
    fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        if expense.name.trim().is_empty() {
            return Err(Error::InvalidData("Expense name is required".to_string()));
        }

        let id = {
            let conn = self.conn()?;
            conn.execute(
                r#"
                INSERT INTO expenses (plan_id, name, amount, frequency, category, currency,
                                      transaction_date, bucket_id, is_fixed, notes, template_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    expense.plan_id,
                    expense.name.trim(),
                    expense.amount,
                    expense.frequency.as_str(),
                    expense.category.as_str(),
                    expense.currency,
                    expense.transaction_date.map(|d| d.to_string()),
                    expense.bucket_id,
                    expense.is_fixed,
                    expense.notes,
                    expense.template_id,
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    /// All of a plan's expenses in chronological order
    fn expenses_by_plan(&self, plan_id: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM expenses
            WHERE plan_id = ?
            ORDER BY COALESCE(transaction_date, date(created_at)), id
            "#,
            EXPENSE_COLUMNS
        ))?;
        let expenses = stmt
            .query_map(params![plan_id], row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }
}
