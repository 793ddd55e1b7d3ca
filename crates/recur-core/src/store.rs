//! Storage seams consumed by the engine
//!
//! The engine never talks to SQLite directly. [`Database`](crate::db::Database)
//! implements both traits; tests substitute wrappers that inject failures.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Expense, NewExpense, NewRecurringTemplate, RecurringTemplate};

/// Persistence for recurring templates
pub trait TemplateStore: Send + Sync {
    fn get_template(&self, id: i64) -> Result<Option<RecurringTemplate>>;

    fn create_template(&self, template: &NewRecurringTemplate) -> Result<RecurringTemplate>;

    fn update_last_generated(&self, id: i64, date: NaiveDate) -> Result<()>;

    /// Active templates of the plan that are due on `today`.
    ///
    /// Implementations must apply [`schedule::is_due_on`](crate::schedule::is_due_on).
    fn templates_for_today(&self, plan_id: i64, today: NaiveDate) -> Result<Vec<RecurringTemplate>>;

    fn templates_by_plan(&self, plan_id: i64) -> Result<Vec<RecurringTemplate>>;

    fn active_templates_by_plan(&self, plan_id: i64) -> Result<Vec<RecurringTemplate>>;
}

/// Persistence for expense records
pub trait TransactionStore: Send + Sync {
    fn create_expense(&self, expense: &NewExpense) -> Result<Expense>;

    fn expenses_by_plan(&self, plan_id: i64) -> Result<Vec<Expense>>;
}
