// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP Gateway for linkmap.
//!
//! `GET /redirect` resolves or refreshes a code and redirects to
//! `GET /retrieve`, which answers with the triple as JSON. Store calls are
//! blocking file I/O and run on the blocking pool.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use linkmap_core::{Code, LinkError, LookupRequest, MappingStore, UpsertRequest};

use crate::metrics;

/// Gateway state shared across threads
#[derive(Clone)]
struct GatewayState {
    store: Arc<MappingStore>,
}

/// Failures surfaced by a handler.
#[derive(Debug, Error)]
enum GatewayError {
    #[error(transparent)]
    Store(#[from] LinkError),

    #[error("Blocking store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(LinkError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Store(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Store(e) => e.kind(),
            Self::Join(_) => "join",
        }
    }
}

pub fn router(store: Arc<MappingStore>) -> Router {
    metrics::init();

    Router::new()
        .route("/redirect", get(redirect_handler))
        .route("/retrieve", get(retrieve_handler))
        .route("/metrics", get(metrics_endpoint))
        .layer(TraceLayer::new_for_http())
        .with_state(GatewayState { store })
}

pub async fn start_gateway(addr: SocketAddr, store: Arc<MappingStore>) -> std::io::Result<()> {
    let app = router(store);

    tracing::info!("Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// Run a store call on the blocking pool and time it.
async fn run_store<T, F>(operation: &'static str, f: F) -> Result<T, GatewayError>
where
    F: FnOnce() -> Result<T, LinkError> + Send + 'static,
    T: Send + 'static,
{
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(f).await;
    metrics::STORE_DURATION
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());

    let result = result?.map_err(GatewayError::from);
    if let Err(e) = &result {
        metrics::record_error(e.kind());
    }
    result
}

fn redirect_to(code: &Code) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("/retrieve?our_param={}", code))],
    )
        .into_response()
}

async fn redirect_handler(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let param = |name: &str| params.get(name).map(String::as_str);
    // Presence alone turns refresh on, whatever its value.
    let refresh = params.contains_key("refresh");

    let request = match UpsertRequest::from_params(
        param("keyword"),
        param("src"),
        param("creative"),
        refresh,
    ) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Error: {}", e)).into_response();
        }
    };

    let store = Arc::clone(&state.store);
    let result = run_store("upsert", move || {
        store.upsert(&request.triple, request.refresh)
    })
    .await;

    match result {
        Ok(outcome) => {
            metrics::record_upsert(outcome.action.name());
            redirect_to(&outcome.code)
        }
        // The table already holds the new code; only the audit entry is missing.
        Err(GatewayError::Store(LinkError::HistoryAppend { committed, .. })) => {
            metrics::record_upsert("refreshed");
            redirect_to(&committed)
        }
        Err(e) => {
            tracing::error!(error = %e, "Upsert failed");
            let body = match e.status() {
                StatusCode::SERVICE_UNAVAILABLE => "Error: Mapping table busy, retry",
                _ => "Error: Failed to store mapping",
            };
            (e.status(), body).into_response()
        }
    }
}

async fn retrieve_handler(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let request = match LookupRequest::from_param(params.get("our_param").map(String::as_str)) {
        Ok(request) => request,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing our_param" })),
            )
                .into_response();
        }
    };

    let store = Arc::clone(&state.store);
    let code = request.code.clone();
    let result = run_store("lookup", move || store.lookup(&request.code)).await;

    match result {
        Ok(Some(triple)) => {
            metrics::record_lookup(true);
            (StatusCode::OK, Json(triple)).into_response()
        }
        Ok(None) => {
            metrics::record_lookup(false);
            tracing::info!(code = %code, "our_param not found");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "our_param not found" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(code = %code, error = %e, "Lookup failed");
            (
                e.status(),
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::metrics_handler(),
    )
}
