//! The RPC method set and the structural shape of request parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BubbleError;
use crate::hex_id::Hex20;

/// The twelve RPC methods the Guardian recognizes. There is no runtime
/// registry: every method this core can ever dispatch is listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    Create,
    Write,
    Append,
    Read,
    Delete,
    Mkdir,
    List,
    GetPermissions,
    Subscribe,
    Unsubscribe,
    Terminate,
    Ping,
}

impl Method {
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Method::Create => "create",
            Method::Write => "write",
            Method::Append => "append",
            Method::Read => "read",
            Method::Delete => "delete",
            Method::Mkdir => "mkdir",
            Method::List => "list",
            Method::GetPermissions => "getPermissions",
            Method::Subscribe => "subscribe",
            Method::Unsubscribe => "unsubscribe",
            Method::Terminate => "terminate",
            Method::Ping => "ping",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BubbleError> {
        match s {
            "create" => Ok(Method::Create),
            "write" => Ok(Method::Write),
            "append" => Ok(Method::Append),
            "read" => Ok(Method::Read),
            "delete" => Ok(Method::Delete),
            "mkdir" => Ok(Method::Mkdir),
            "list" => Ok(Method::List),
            "getPermissions" => Ok(Method::GetPermissions),
            "subscribe" => Ok(Method::Subscribe),
            "unsubscribe" => Ok(Method::Unsubscribe),
            "terminate" => Ok(Method::Terminate),
            "ping" => Ok(Method::Ping),
            other => Err(BubbleError::MethodNotFound(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire_str())
    }
}

/// Structural shape of `params`, before any filename parsing or signature
/// recovery. `version` absent means a legacy v0 request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParams {
    pub version: Option<u64>,
    #[serde(default)]
    pub timestamp: u64,
    pub nonce: String,
    pub chain_id: u64,
    pub contract: Hex20,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub options: Option<serde_json::Value>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Legacy-v0 only: must equal `"\x19Ethereum Signed Message:\n64"` when
    /// present.
    #[serde(default)]
    pub signature_prefix: Option<String>,
}

impl RequestParams {
    pub fn is_legacy_v0(&self) -> bool {
        self.version.is_none()
    }

    pub fn file_or_root(&self) -> &str {
        self.file.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_wire_strings() {
        for m in [
            Method::Create,
            Method::Write,
            Method::Append,
            Method::Read,
            Method::Delete,
            Method::Mkdir,
            Method::List,
            Method::GetPermissions,
            Method::Subscribe,
            Method::Unsubscribe,
            Method::Terminate,
            Method::Ping,
        ] {
            assert_eq!(Method::parse(m.as_wire_str()).unwrap(), m);
        }
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let err = Method::parse("nonsense").unwrap_err();
        assert!(matches!(err, BubbleError::MethodNotFound(_)));
    }

    #[test]
    fn absent_version_is_legacy() {
        let json = serde_json::json!({
            "nonce": "n",
            "chainId": 1,
            "contract": "0xabcdef0123456789abcdef0123456789abcdef01",
        });
        let params: RequestParams = serde_json::from_value(json).unwrap();
        assert!(params.is_legacy_v0());
        assert_eq!(params.file_or_root(), "");
    }
}
