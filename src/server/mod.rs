//! Reference HTTP server for the collection API.
//!
//! Requires the `server` feature. Uses axum. Serves any collection name over
//! an [`InMemoryRemote`], scoping data to the bearer token of each request.
//!
//! ## Routes
//!
//! - `GET /{collection}/` - list the caller's items.
//! - `POST /{collection}/` - body `{ "product_id": .. }`, returns the created item (201),
//!   or the existing one (200) when the product is already listed.
//! - `DELETE /{collection}/{id}` - remove one wrapper item (204).
//! - `GET /health` - `{ "ok": true }`.
//!
//! Errors are `{ "detail": message }` with the matching status.
//!
//! ## Example
//!
//! ```ignore
//! use herd_sync::{server, InMemoryRemote};
//!
//! let app = server::router(InMemoryRemote::new());
//! // or
//! server::serve(InMemoryRemote::new(), "0.0.0.0:8000").await?;
//! ```

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use log::debug;
use serde_json::json;

use crate::collection::ItemId;
use crate::remote::{AddRequest, InMemoryRemote, RemoteCollection, RemoteError};

/// Build an axum `Router` serving collections from `backend`.
pub fn router(backend: InMemoryRemote) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/:collection/", get(list_handler).post(create_handler))
        .route("/:collection/:id", delete(delete_handler))
        .with_state(backend)
}

/// Serve `backend` over HTTP at the given address (e.g. `"0.0.0.0:8000"`).
pub async fn serve(backend: InMemoryRemote, addr: &str) -> Result<(), std::io::Error> {
    let app = router(backend);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /:collection/`
async fn list_handler(
    State(backend): State<InMemoryRemote>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    let remote = match scoped(&backend, &headers) {
        Ok(remote) => remote,
        Err(response) => return response,
    };
    match remote.list(&collection).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => error_response(err),
    }
}

/// `POST /:collection/`
///
/// The body is read raw so that malformed JSON gets a `detail` error like
/// every other failure.
async fn create_handler(
    State(backend): State<InMemoryRemote>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let remote = match scoped(&backend, &headers) {
        Ok(remote) => remote,
        Err(response) => return response,
    };
    let request: AddRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("rejecting {} create body: {}", collection, e);
            return detail(StatusCode::BAD_REQUEST, "product_id is required.");
        }
    };

    match remote.create_or_get(&collection, &request) {
        Ok((item, true)) => (StatusCode::CREATED, Json(item)).into_response(),
        Ok((item, false)) => (StatusCode::OK, Json(item)).into_response(),
        Err(err) => error_response(err),
    }
}

/// `DELETE /:collection/:id`
async fn delete_handler(
    State(backend): State<InMemoryRemote>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let remote = match scoped(&backend, &headers) {
        Ok(remote) => remote,
        Err(response) => return response,
    };
    match remote.delete(&collection, &ItemId::new(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

/// The backend as seen by the bearer of the request's token.
fn scoped(backend: &InMemoryRemote, headers: &HeaderMap) -> Result<InMemoryRemote, Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    match token {
        Some(token) => Ok(backend.for_owner(token)),
        None => {
            debug!("rejecting request without bearer token");
            Err(detail(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ))
        }
    }
}

fn error_response(err: RemoteError) -> Response {
    let status = match &err {
        RemoteError::Rejected { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        RemoteError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        RemoteError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    detail(status, err.message())
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
