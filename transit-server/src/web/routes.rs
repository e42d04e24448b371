//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::domain::{InvalidStopId, StopId};
use crate::network::{NetworkSnapshot, NetworkSource, SourceError};
use crate::planner::{LookupKind, PlanError, PlannedRoute};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/route", get(plan_route))
        .route("/api/stops/search", get(search_stops))
        .route("/api/search", get(lookup))
        .route("/api/network", get(network_status))
        .route("/api/network/refresh", post(refresh_network))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// A missing id is treated like a blank one.
fn parse_stop(raw: Option<&str>) -> Result<StopId, AppError> {
    raw.unwrap_or_default()
        .parse()
        .map_err(|e: InvalidStopId| AppError::BadRequest {
            message: e.to_string(),
            code: "INVALID_STOP",
        })
}

/// Plan the cheapest route between two stops.
async fn plan_route(
    State(state): State<AppState>,
    Query(req): Query<RouteQuery>,
) -> Result<Json<PlannedRoute>, AppError> {
    let from = parse_stop(req.from.as_deref())?;
    let to = parse_stop(req.to.as_deref())?;

    let planned = state.planner.plan(from, to).await?;
    Ok(Json(PlannedRoute::clone(&planned)))
}

/// Search stops by name.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchQuery>,
) -> Json<StopSearchResponse> {
    let stops = state
        .planner
        .search_stops(req.q.as_deref().unwrap_or_default(), req.limit)
        .await
        .into_iter()
        .map(StopResult::from)
        .collect();

    Json(StopSearchResponse { stops })
}

/// Look up stops, edges or routes matching a free-text query.
///
/// Unknown types and blank queries give an empty list.
async fn lookup(
    State(state): State<AppState>,
    Query(req): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let kind = match req.kind.as_deref().unwrap_or("stops").parse::<LookupKind>() {
        Ok(kind) => kind,
        Err(e) => {
            debug!("{e}");
            return Json(Vec::new());
        }
    };
    let query = req.query.unwrap_or_default();

    let results = state.planner.lookup(kind, &query).await;
    Json(SearchResult::from_lookup(results))
}

fn status(state: &AppState, snapshot: &NetworkSnapshot) -> NetworkStatusResponse {
    let source = state.planner.source().describe();
    NetworkStatusResponse::new(snapshot, source, state.planner.cache_entry_count())
}

/// Describe the snapshot in use.
async fn network_status(State(state): State<AppState>) -> Json<NetworkStatusResponse> {
    let snapshot = state.planner.snapshot().await;
    Json(status(&state, &snapshot))
}

/// Rebuild the snapshot from the source now.
async fn refresh_network(
    State(state): State<AppState>,
) -> Result<Json<NetworkStatusResponse>, AppError> {
    let snapshot = state.planner.refresh().await?;
    info!(version = snapshot.version(), "refresh requested over HTTP");

    Ok(Json(status(&state, &snapshot)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
        code: &'static str,
    },
    NotFound {
        message: String,
        code: &'static str,
    },
    /// The network source failed
    Upstream { message: String },
    Internal { message: String },
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        let message = e.to_string();
        let code = e.code();
        match e {
            PlanError::InvalidStop(_) | PlanError::SameStop(_) => {
                AppError::BadRequest { message, code }
            }
            PlanError::NoRoute { .. } => AppError::NotFound { message, code },
        }
    }
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Config(message) => AppError::Internal { message },
            other => AppError::Upstream {
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { message, code } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NotFound { message, code } => (StatusCode::NOT_FOUND, code, message),
            AppError::Upstream { message } => {
                (StatusCode::BAD_GATEWAY, "SOURCE_UNAVAILABLE", message)
            }
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
            }
        };

        if status.is_server_error() {
            error!(%status, code, "{message}");
        } else {
            warn!(%status, code, "{message}");
        }

        let body = Json(ErrorResponse {
            error: message,
            code,
        });
        (status, body).into_response()
    }
}
