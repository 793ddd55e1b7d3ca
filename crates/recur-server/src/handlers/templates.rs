//! Recurring template handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState, SuccessResponse};
use recur_core::models::RecurringTemplate;
use recur_core::store::TemplateStore;

#[derive(Debug, Deserialize)]
pub struct FromExpenseRequest {
    pub expense_id: i64,
    /// Anchor day (1-31); the creation day is used when absent
    pub day_of_month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    /// New anchor day (1-31); null reverts to the creation day
    pub day_of_month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct NextDateResponse {
    pub template_id: i64,
    /// Absent for inactive templates
    pub next_due_date: Option<NaiveDate>,
}

fn find_template(state: &AppState, id: i64) -> Result<RecurringTemplate, AppError> {
    state
        .db
        .get_template(id)?
        .ok_or_else(|| AppError::not_found(&format!("Template {} not found", id)))
}

/// GET /api/plans/:plan_id/templates - List all of a plan's templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
) -> Result<Json<Vec<RecurringTemplate>>, AppError> {
    state.db.require_plan(plan_id)?;
    Ok(Json(state.db.templates_by_plan(plan_id)?))
}

/// GET /api/plans/:plan_id/templates/due - Templates that generate today
pub async fn list_due_templates(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
) -> Result<Json<Vec<RecurringTemplate>>, AppError> {
    state.db.require_plan(plan_id)?;
    Ok(Json(state.engine().templates_due_today(plan_id)?))
}

/// POST /api/templates/from-expense - Repeat an existing expense
pub async fn create_template_from_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FromExpenseRequest>,
) -> Result<Json<RecurringTemplate>, AppError> {
    let expense = state
        .db
        .get_expense(req.expense_id)?
        .ok_or_else(|| AppError::not_found(&format!("Expense {} not found", req.expense_id)))?;

    let template = state
        .engine()
        .create_template_from_expense(&expense, req.day_of_month)?;
    Ok(Json(template))
}

/// GET /api/templates/:id - Get a single template
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RecurringTemplate>, AppError> {
    Ok(Json(find_template(&state, id)?))
}

/// DELETE /api/templates/:id - Delete a template (generated expenses are kept)
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !state.db.delete_template(id)? {
        return Err(AppError::not_found(&format!("Template {} not found", id)));
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/templates/:id/active - Enable or disable a template
pub async fn set_template_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<RecurringTemplate>, AppError> {
    state.db.set_template_active(id, req.active)?;
    Ok(Json(find_template(&state, id)?))
}

/// POST /api/templates/:id/schedule - Move a template to another anchor day
pub async fn update_template_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<RecurringTemplate>, AppError> {
    state.db.update_template_schedule(id, req.day_of_month)?;
    Ok(Json(find_template(&state, id)?))
}

/// GET /api/templates/:id/next - Next scheduled generation date
pub async fn next_generation_date(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<NextDateResponse>, AppError> {
    let template = find_template(&state, id)?;
    Ok(Json(NextDateResponse {
        template_id: id,
        next_due_date: state.engine().next_generation_date(&template),
    }))
}
