//! The `POST /rpc` and `GET /health` endpoints.
//!
//! Generic over the Guardian's two collaborators: `run.rs` wires concrete
//! `AccChainView`/`InMemoryDataServer` types, while integration tests wire
//! test doubles directly.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bubble_guardian::{ChainView, DataServer, Guardian};
use serde_json::json;
use tracing::instrument;

use crate::jsonrpc::{http_status_for, parse_method, RpcRequest, RpcResponse};

pub struct AppState<C: ChainView, D: DataServer> {
    pub guardian: Arc<Guardian<C, D>>,
}

impl<C: ChainView, D: DataServer> Clone for AppState<C, D> {
    fn clone(&self) -> Self {
        AppState {
            guardian: self.guardian.clone(),
        }
    }
}

pub fn routes<C, D>(state: AppState<C, D>) -> Router
where
    C: ChainView + 'static,
    D: DataServer + 'static,
{
    Router::new()
        .route("/", get(get_root))
        .route("/health", get(get_health))
        .route("/rpc", post(post_rpc::<C, D>))
        .with_state(state)
}

#[instrument(skip_all)]
async fn get_root() -> impl IntoResponse {
    let pkg_name = env!("CARGO_PKG_NAME");
    (axum::http::StatusCode::OK, format!("Hello from {pkg_name}!"))
}

#[instrument(skip_all)]
async fn get_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// `POST /rpc`: decodes the envelope, dispatches to `Guardian::post`, and
/// maps the outcome back into `{result}` or `{error: {code, message}}`.
///
/// `subscribe`/`unsubscribe` are accepted structurally here but this
/// synchronous HTTP endpoint has no stateful transport to push notifications
/// over; a WebSocket front end (out of scope for this server) would thread
/// a real `SubscriptionListener` through in its place.
#[instrument(skip_all, fields(method = %req.method))]
async fn post_rpc<C, D>(State(state): State<AppState<C, D>>, Json(req): Json<RpcRequest>) -> Response
where
    C: ChainView + 'static,
    D: DataServer + 'static,
{
    let id = req.id.clone();

    let method = match parse_method(&req.method) {
        Ok(m) => m,
        Err(err) => return respond(id, Err(err)),
    };

    let result = state.guardian.post(method, req.params, req.signature, None).await;
    respond(id, result)
}

fn respond(
    id: Option<serde_json::Value>,
    result: Result<serde_json::Value, bubble_guardian_types::BubbleError>,
) -> Response {
    match result {
        Ok(value) => Json(RpcResponse::ok(id, value)).into_response(),
        Err(err) => {
            let status = http_status_for(err.code());
            (status, Json(RpcResponse::err(id, &err))).into_response()
        }
    }
}
