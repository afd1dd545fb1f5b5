//! HTTP handlers for the search page and its JSON API.
//!
//! Every API response carries `success`; failures add `error` and use the
//! status code the core error maps to.

use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sora_fts::config::{AppInfo, PipelineDefaults};
use sora_fts::SearchError;
use std::sync::Arc;
use tracing::{debug, warn};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Query string of `/api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// The search page.
pub async fn handle_index() -> Html<String> {
    Html(
        INDEX_HTML
            .replace("{{title}}", AppInfo::TITLE)
            .replace(
                "{{score_precision}}",
                &PipelineDefaults::SCORE_PRECISION.to_string(),
            ),
    )
}

/// Readiness of both stages, plus index statistics once ready.
pub async fn handle_status(State(state): State<Arc<AppState>>) -> Response {
    let readiness = state.app.readiness();
    let stats = if readiness.ready {
        match state.app.index_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => return error_response(e),
        }
    } else {
        None
    };

    Json(json!({
        "success": true,
        "readiness": readiness,
        "labels": {
            "tokenizer": readiness.tokenizer.label(),
            "store": readiness.store.label(),
        },
        "stats": stats,
    }))
    .into_response()
}

/// Submit `q` as the current query, or return the current view without it.
pub async fn handle_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let view = match params.q {
        Some(q) => {
            debug!("Search request: {:?}", q);
            state.app.submit_query(&q).await
        }
        None => state.app.view(),
    };
    success_response(&view)
}

/// All indexed documents with their token strings.
pub async fn handle_documents(State(state): State<Arc<AppState>>) -> Response {
    match state.app.documents().await {
        Ok(documents) => Json(json!({"success": true, "documents": documents})).into_response(),
        Err(e) => error_response(e),
    }
}

/// Flatten `data` into a `{success: true, ...}` object.
fn success_response<T: Serialize>(data: &T) -> Response {
    match serde_json::to_value(data) {
        Ok(Value::Object(mut map)) => {
            map.insert("success".to_string(), Value::Bool(true));
            Json(Value::Object(map)).into_response()
        }
        Ok(other) => Json(json!({"success": true, "data": other})).into_response(),
        Err(e) => error_response(SearchError::Other(format!(
            "Failed to serialize response: {}",
            e
        ))),
    }
}

fn error_response(err: SearchError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() && !err.is_retryable() {
        warn!("Request failed: {}", err);
    }
    (
        status,
        Json(json!({"success": false, "error": err.to_string()})),
    )
        .into_response()
}
