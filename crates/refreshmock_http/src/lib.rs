//! HTTP surface for the incremental-refresh mock service.
//!
//! # Responsibility
//! - Route `/`, `/health`, `/api/issues` and `/api/projects`.
//! - Translate query parameters into an `UpdatedAtRange`; a repeated
//!   parameter keeps its last value.
//! - Map query-service results to JSON responses.
//!
//! # Invariants
//! - Endpoints are read-only.
//! - Under the fail-soft policy every collection request answers 200.
//! - Any origin, method and header passes CORS.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::error;
use refreshmock_core::{Collection, QueryService, SharedStore, UpdatedAtRange};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub const ISSUES_PATH: &str = "/api/issues";
pub const PROJECTS_PATH: &str = "/api/projects";
pub const HEALTH_PATH: &str = "/health";
pub const MIN_PARAM: &str = "updatedAt_min";
pub const MAX_PARAM: &str = "updatedAt_max";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    queries: Arc<QueryService<SharedStore>>,
}

impl AppState {
    pub fn new(queries: QueryService<SharedStore>) -> Self {
        Self {
            queries: Arc::new(queries),
        }
    }
}

/// Optional `updatedAt` window carried in the query string.
#[derive(Debug, Default)]
pub struct RangeParams {
    pub updated_at_min: Option<String>,
    pub updated_at_max: Option<String>,
}

impl RangeParams {
    /// Folds decoded query pairs; unknown keys are ignored and the last
    /// occurrence of a bound wins.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                MIN_PARAM => params.updated_at_min = Some(value),
                MAX_PARAM => params.updated_at_max = Some(value),
                _ => {}
            }
        }
        params
    }

    pub fn to_range(&self) -> UpdatedAtRange {
        UpdatedAtRange::new(
            self.updated_at_min.as_deref(),
            self.updated_at_max.as_deref(),
        )
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

/// Builds the service router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route(HEALTH_PATH, get(health))
        .route(ISSUES_PATH, get(list_issues))
        .route(PROJECTS_PATH, get(list_projects))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "Incremental refresh mock API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "issues": ISSUES_PATH,
            "projects": PROJECTS_PATH,
            "health": HEALTH_PATH,
        },
        "usage": "Use updatedAt_min (inclusive) and updatedAt_max (exclusive) for incremental filters, e.g. ?updatedAt_min=2024-01-15T10:30:00",
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "service is running",
    })
}

async fn list_issues(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    list_collection(state, Collection::Issues, RangeParams::from_pairs(pairs)).await
}

async fn list_projects(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    list_collection(state, Collection::Projects, RangeParams::from_pairs(pairs)).await
}

async fn list_collection(state: AppState, collection: Collection, params: RangeParams) -> Response {
    let range = params.to_range();
    let queries = state.queries;
    let outcome = tokio::task::spawn_blocking(move || queries.list(collection, &range)).await;

    let message = match outcome {
        Ok(Ok(rows)) => return (StatusCode::OK, Json(rows)).into_response(),
        Ok(Err(err)) => err.to_string(),
        Err(join_err) => format!("query task failed: {join_err}"),
    };
    error!(
        "event=http_list module=http status=error collection={} error={}",
        collection, message
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::RangeParams;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn last_repeated_bound_wins_and_unknown_keys_are_ignored() {
        let params = RangeParams::from_pairs(pairs(&[
            ("updatedAt_min", "2024-01-20T00:00:00"),
            ("page", "2"),
            ("updatedAt_min", "2024-01-22T00:00:00"),
        ]));
        assert_eq!(params.updated_at_min.as_deref(), Some("2024-01-22T00:00:00"));
        assert_eq!(params.updated_at_max, None);
    }

    #[test]
    fn empty_params_map_to_unbounded_range() {
        let params = RangeParams {
            updated_at_min: Some(String::new()),
            updated_at_max: None,
        };
        assert!(params.to_range().is_unbounded());
    }

    #[test]
    fn params_keep_both_bounds() {
        let params = RangeParams {
            updated_at_min: Some("2024-01-15T10:00:00".to_string()),
            updated_at_max: Some("2024-01-16T10:00:00".to_string()),
        };
        let range = params.to_range();
        assert_eq!(range.min(), Some("2024-01-15T10:00:00"));
        assert_eq!(range.max(), Some("2024-01-16T10:00:00"));
    }
}
