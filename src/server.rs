//! HTTP surface: `GET /api/advocates` and `GET /healthz`.
//!
//! The router is a thin adapter. Query parameters are parsed leniently into a
//! [`SearchRequest`] (anything unusable takes the default), the executor runs
//! the search, and any failure becomes one generic 500 with no partial body.

use advodir_core::config::SearchConfig;
use advodir_core::{AdvocateStore, SearchExecutor, SearchRequest};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Body of every failed search.
pub const FAILURE_MESSAGE: &str = "Failed to fetch advocates";

/// Raw query string parameters. Kept as strings so that malformed numbers
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocateParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
}

impl AdvocateParams {
    pub fn to_request(&self, limits: &SearchConfig) -> SearchRequest {
        SearchRequest::from_params(
            self.page.as_deref(),
            self.page_size.as_deref(),
            self.search.as_deref(),
            limits,
        )
    }
}

struct AppState<S> {
    executor: Arc<SearchExecutor<S>>,
    limits: SearchConfig,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            limits: self.limits.clone(),
        }
    }
}

/// Build the application router over a shared executor.
pub fn router<S>(executor: Arc<SearchExecutor<S>>, limits: SearchConfig) -> Router
where
    S: AdvocateStore + 'static,
{
    Router::new()
        .route("/api/advocates", get(list_advocates::<S>))
        .route("/healthz", get(healthz))
        .with_state(AppState { executor, limits })
}

/// Serve `app` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn list_advocates<S>(
    State(state): State<AppState<S>>,
    Query(params): Query<AdvocateParams>,
) -> Response
where
    S: AdvocateStore + 'static,
{
    let request = params.to_request(&state.limits);
    match state.executor.execute(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "advocate search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": FAILURE_MESSAGE })),
            )
                .into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
