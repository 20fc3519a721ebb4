//! HTTP route handlers: the page shell and the JSON API.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use liquiscope_core::{Selection, SymbolOption, ThemeMode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AppState, Session};

// ============================================================================
// PAGE SHELL
// ============================================================================

pub async fn index_page() -> impl IntoResponse {
    Html(include_str!("../static/index.html"))
}

pub async fn serve_styles() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css")],
        include_str!("../static/styles.css"),
    )
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================================
// API HANDLERS (JSON)
// ============================================================================

/// Selector entries from the startup catalog.
pub async fn api_symbols(State(state): State<Arc<AppState>>) -> Json<Vec<SymbolOption>> {
    Json(state.catalog.clone())
}

/// Raw widget values. Missing or blank means unselected.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub symbol: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Charts and table for one selection, themed for the caller's session.
pub async fn api_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, ApiError> {
    let session = Session::from_headers(&headers);
    let selection = Selection::parse(
        query.symbol.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )?;
    let theme = state.sessions.theme(session.id()).await;

    // Cache reads block; keep them off the async workers.
    let dashboard = Arc::clone(&state.dashboard);
    let view = tokio::task::spawn_blocking(move || dashboard.render(&selection, theme)).await??;

    debug!(rows = view.table.rows.len(), %theme, "dashboard rendered");
    Ok(session.attach(Json(view).into_response()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub theme: ThemeMode,
}

pub async fn api_theme(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = Session::from_headers(&headers);
    let theme = state.sessions.theme(session.id()).await;
    session.attach(Json(ThemeResponse { theme }).into_response())
}

/// Flip the caller's theme.
pub async fn api_theme_toggle(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = Session::from_headers(&headers);
    let theme = state.sessions.toggle(session.id()).await;
    debug!(%theme, "theme toggled");
    session.attach(Json(ThemeResponse { theme }).into_response())
}
