//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use recur_core::models::{Expense, ExpenseCategory, Frequency, NewExpense};
use recur_core::store::TransactionStore;

/// Query params for listing expenses
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    pub limit: Option<i64>,
}

/// Request body for recording an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub name: String,
    /// Minor currency units
    pub amount: i64,
    pub frequency: Option<Frequency>,
    pub category: Option<ExpenseCategory>,
    pub currency: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub bucket_id: i64,
    #[serde(default)]
    pub is_fixed: bool,
    pub notes: Option<String>,
}

/// GET /api/plans/:plan_id/expenses - List a plan's expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
    Query(query): Query<ListExpensesQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    state.db.require_plan(plan_id)?;

    let limit = query.limit.unwrap_or(100).clamp(1, MAX_PAGE_LIMIT);
    Ok(Json(state.db.list_expenses(plan_id, Some(limit))?))
}

/// POST /api/plans/:plan_id/expenses - Record an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    state.db.require_plan(plan_id)?;

    if req.amount < 0 {
        return Err(AppError::bad_request("Amount must not be negative"));
    }

    let expense = state.db.create_expense(&NewExpense {
        plan_id,
        name: req.name,
        amount: req.amount,
        frequency: req.frequency.unwrap_or(Frequency::Monthly),
        category: req.category.unwrap_or(ExpenseCategory::Other),
        currency: req.currency.map(|c| c.to_uppercase()),
        transaction_date: req.transaction_date,
        bucket_id: req.bucket_id,
        is_fixed: req.is_fixed,
        notes: req.notes,
        template_id: None,
    })?;

    Ok(Json(expense))
}
