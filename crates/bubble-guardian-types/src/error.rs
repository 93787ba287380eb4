//! The stable error taxonomy surfaced to Guardian callers.
//!
//! Every variant carries one of the nine numeric JSON-RPC-style codes from
//! the wire protocol. The core never logs these (observability is a
//! transport/data-server concern) — it only classifies and propagates them.

use std::fmt;

/// Numeric error codes surfaced to clients, matching the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest,
    MethodNotFound,
    InvalidMethodParams,
    BlockchainNotSupported,
    BubbleTerminated,
    PermissionDenied,
    AuthenticationFailure,
    MethodFailed,
    InternalError,
}

impl ErrorCode {
    /// The numeric code surfaced on the wire.
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidMethodParams => -32602,
            ErrorCode::BlockchainNotSupported => -32000,
            ErrorCode::BubbleTerminated => -32001,
            ErrorCode::PermissionDenied => -32002,
            ErrorCode::AuthenticationFailure => -32003,
            ErrorCode::MethodFailed => -32004,
            ErrorCode::InternalError => -32005,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by the Guardian pipeline and its collaborators.
///
/// Structural errors abort before any I/O; authorization/lifecycle errors
/// are raised only after permissions have been consulted; failure errors
/// wrap collaborator faults that are themselves uncategorized.
#[derive(Debug, thiserror::Error)]
pub enum BubbleError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("{message}")]
    InvalidMethodParams {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Blockchain not supported")]
    BlockchainNotSupported,

    #[error("Bubble has been terminated")]
    BubbleTerminated,

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidSignature {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    MethodFailed(String),

    #[error("{0}")]
    InternalError(String),
}

impl BubbleError {
    pub fn invalid_method_params(message: impl Into<String>) -> Self {
        BubbleError::InvalidMethodParams {
            message: message.into(),
            cause: None,
        }
    }

    pub fn invalid_method_params_with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BubbleError::InvalidMethodParams {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn invalid_signature(message: impl Into<String>) -> Self {
        BubbleError::InvalidSignature {
            message: message.into(),
            cause: None,
        }
    }

    pub fn invalid_signature_with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BubbleError::InvalidSignature {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The numeric code this error maps to on the wire.
    pub fn code(&self) -> ErrorCode {
        match self {
            BubbleError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            BubbleError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            BubbleError::InvalidMethodParams { .. } => ErrorCode::InvalidMethodParams,
            BubbleError::BlockchainNotSupported => ErrorCode::BlockchainNotSupported,
            BubbleError::BubbleTerminated => ErrorCode::BubbleTerminated,
            BubbleError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            BubbleError::InvalidSignature { .. } => ErrorCode::AuthenticationFailure,
            BubbleError::MethodFailed(_) => ErrorCode::MethodFailed,
            BubbleError::InternalError(_) => ErrorCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_wire_protocol_table() {
        assert_eq!(ErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::InvalidMethodParams.code(), -32602);
        assert_eq!(ErrorCode::BlockchainNotSupported.code(), -32000);
        assert_eq!(ErrorCode::BubbleTerminated.code(), -32001);
        assert_eq!(ErrorCode::PermissionDenied.code(), -32002);
        assert_eq!(ErrorCode::AuthenticationFailure.code(), -32003);
        assert_eq!(ErrorCode::MethodFailed.code(), -32004);
        assert_eq!(ErrorCode::InternalError.code(), -32005);
    }

    #[test]
    fn bubble_terminated_maps_to_its_own_code() {
        assert_eq!(BubbleError::BubbleTerminated.code(), ErrorCode::BubbleTerminated);
    }
}
