//! The RPC envelope: a JSON-RPC-flavored request/response shape carrying a
//! Bubble Protocol `method`/`params`/`signature` triple.
//!
//! This is deliberately thin: structural decoding only. Everything past
//! `params`/`signature` shape is the Guardian's job.

use bubble_guardian_types::{BubbleError, ErrorCode, Method, RequestParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound RPC envelope: `{id, method, params}` plus the request's own
/// `signature` field, which the wire protocol nests inside `params` for
/// `getPermissions` et al. but which this server accepts at the envelope's
/// top level for clarity, mirroring how a WebSocket frame separates
/// transport framing from payload.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: RequestParams,
    pub signature: Value,
}

/// A successful or failed RPC response, carrying the numeric wire error
/// code on failure.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    pub fn ok(id: Option<Value>, result: Value) -> Self {
        RpcResponse {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Option<Value>, error: &BubbleError) -> Self {
        RpcResponse {
            id,
            result: None,
            error: Some(RpcError {
                code: error.code().code(),
                message: error.to_string(),
            }),
        }
    }
}

/// Parses the wire `method` string into the fixed [`Method`] enum, surfacing
/// `MethodNotFound` for anything else — the only error this layer produces
/// itself rather than forwarding from the Guardian.
pub fn parse_method(raw: &str) -> Result<Method, BubbleError> {
    Method::parse(raw)
}

/// Maps a [`BubbleError`] to its wire HTTP status: structural/not-found
/// errors are client mistakes (`4xx`); authorization and lifecycle errors
/// are `403`-flavored; failures are server-side (`5xx`).
pub fn http_status_for(code: ErrorCode) -> axum::http::StatusCode {
    use axum::http::StatusCode;
    match code {
        ErrorCode::InvalidRequest | ErrorCode::InvalidMethodParams => StatusCode::BAD_REQUEST,
        ErrorCode::MethodNotFound => StatusCode::NOT_FOUND,
        ErrorCode::BlockchainNotSupported => StatusCode::BAD_REQUEST,
        ErrorCode::BubbleTerminated | ErrorCode::PermissionDenied | ErrorCode::AuthenticationFailure => {
            StatusCode::FORBIDDEN
        }
        ErrorCode::MethodFailed => StatusCode::BAD_GATEWAY,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
