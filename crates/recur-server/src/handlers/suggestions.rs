//! Recurring pattern suggestion handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use recur_core::models::{RecurringTemplate, TemplateSuggestion};

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    /// Minimum group size (default 2)
    pub min_occurrences: Option<usize>,
}

/// Request body for accepting a suggestion
#[derive(Debug, Deserialize)]
pub struct AcceptSuggestionRequest {
    pub suggestion: TemplateSuggestion,
    /// Budget bucket the new template charges against
    pub bucket_id: i64,
}

/// GET /api/plans/:plan_id/suggestions - Detect recurring patterns
pub async fn list_suggestions(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<TemplateSuggestion>>, AppError> {
    state.db.require_plan(plan_id)?;

    let suggestions = state
        .engine()
        .detect_recurring_patterns(plan_id, query.min_occurrences)?;
    Ok(Json(suggestions))
}

/// POST /api/plans/:plan_id/suggestions/accept - Turn a suggestion into a template
pub async fn accept_suggestion(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<i64>,
    Json(req): Json<AcceptSuggestionRequest>,
) -> Result<Json<RecurringTemplate>, AppError> {
    state.db.require_plan(plan_id)?;

    let template = state
        .engine()
        .create_template_from_suggestion(plan_id, &req.suggestion, req.bucket_id)?;
    Ok(Json(template))
}
