//! Plan handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use recur_core::models::Plan;

/// Request body for creating a plan
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    /// ISO currency code, defaults to USD
    pub currency: Option<String>,
}

/// GET /api/plans - List all plans
pub async fn list_plans(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Plan>>, AppError> {
    Ok(Json(state.db.list_plans()?))
}

/// POST /api/plans - Create a plan
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<Json<Plan>, AppError> {
    let currency = req.currency.as_deref().unwrap_or("USD");
    let id = state.db.create_plan(&req.name, currency)?;
    Ok(Json(state.db.require_plan(id)?))
}

/// GET /api/plans/:plan_id - Get a single plan
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
) -> Result<Json<Plan>, AppError> {
    Ok(Json(state.db.require_plan(plan_id)?))
}
