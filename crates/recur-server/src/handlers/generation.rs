//! Expense generation handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use recur_core::models::{BatchResult, Expense};

/// POST /api/templates/:id/generate - Generate one expense now, ignoring the schedule
pub async fn generate_now(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    state
        .engine()
        .generate_now(id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("Template {} not found", id)))
}

/// POST /api/plans/:plan_id/generate - Generate every template due today
pub async fn generate_for_plan(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
) -> Result<Json<BatchResult>, AppError> {
    state.db.require_plan(plan_id)?;
    Ok(Json(state.engine().check_and_generate_for_plan(plan_id)?))
}
