//! HTTP router for docgate

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use docgate_core::{RequestId, REQUEST_ID_HEADER};
use docgate_documents::{routes, DocumentState};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, Instrument};

use crate::config::Settings;

/// Create the main application router
pub fn create_router(state: DocumentState, settings: &Settings) -> Router {
    let bucket = settings.bucket_name.clone();

    // Uploads come from browser frontends on arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(move || health_check(bucket.clone())))
        .merge(routes(Arc::new(state)))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(assign_request_id))
}

async fn health_check(bucket: String) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "running", "bucket": bucket })),
    )
}

/// Tag every request with an ID, reusing the client's `x-request-id` when present
async fn assign_request_id(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(RequestId::with_id)
        .unwrap_or_default();

    let span = info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
