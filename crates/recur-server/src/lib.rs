//! Recur Web Server
//!
//! Axum-based REST API over the recurring-transaction engine: plans,
//! expenses, detected suggestions, templates, and generation.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use recur_core::db::Database;
use recur_core::engine::{Clock, RecurringEngine};

mod handlers;
mod scheduler;

pub use scheduler::{start_generation_scheduler, GenerationScheduleConfig};

/// Maximum number of expenses returned by a list call
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Source of "today" for scheduling and generation
    pub clock: Clock,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

impl AppState {
    /// Engine bound to the server database and clock
    pub fn engine(&self) -> RecurringEngine<'_> {
        RecurringEngine::with_clock(&self.db, &self.db, self.config.clock)
    }
}

/// Simple success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    let cors = build_cors(&config);
    let state = Arc::new(AppState { db, config });

    let api_routes = Router::new()
        // Plans
        .route(
            "/plans",
            get(handlers::list_plans).post(handlers::create_plan),
        )
        .route("/plans/:plan_id", get(handlers::get_plan))
        // Expenses
        .route(
            "/plans/:plan_id/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        // Detection
        .route(
            "/plans/:plan_id/suggestions",
            get(handlers::list_suggestions),
        )
        .route(
            "/plans/:plan_id/suggestions/accept",
            post(handlers::accept_suggestion),
        )
        // Templates
        .route("/plans/:plan_id/templates", get(handlers::list_templates))
        .route(
            "/plans/:plan_id/templates/due",
            get(handlers::list_due_templates),
        )
        .route(
            "/templates/from-expense",
            post(handlers::create_template_from_expense),
        )
        .route(
            "/templates/:id",
            get(handlers::get_template).delete(handlers::delete_template),
        )
        .route("/templates/:id/active", post(handlers::set_template_active))
        .route(
            "/templates/:id/schedule",
            post(handlers::update_template_schedule),
        )
        .route("/templates/:id/next", get(handlers::next_generation_date))
        // Generation
        .route("/templates/:id/generate", post(handlers::generate_now))
        .route("/plans/:plan_id/generate", post(handlers::generate_for_plan));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    // Start the generation scheduler if configured
    if let Some(schedule) = GenerationScheduleConfig::from_env() {
        start_generation_scheduler(db.clone(), schedule, config.clock);
    }

    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// API error type
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes keep their message; everything else is internal
        match err.downcast_ref::<recur_core::Error>() {
            Some(e @ recur_core::Error::NotFound(_)) => return Self::not_found(&e.to_string()),
            Some(recur_core::Error::InvalidData(msg)) => return Self::bad_request(msg),
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
