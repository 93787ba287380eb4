//! Canonical, fixed-field-order forms hashed by the signature engine.
//!
//! The producer order here IS the wire order for every signer and verifier
//! in this codebase: fields are declared in the exact order the EIP-712 type
//! strings list them, so a struct's `Serialize` impl (derived, declaration
//! order) always matches what a client signed — no generic re-sorting
//! serializer sits between the wire and the hash.

use serde::Serialize;

use crate::hex_id::Hex20;

/// Mirrors the EIP-712 `Request` type and the compact-JSON `rpc`-context
/// digest input alike: `version, method, timestamp, nonce, chainId,
/// contract, file, data, options`.
#[derive(Debug, Clone, Serialize)]
pub struct SignableRequest {
    pub version: u64,
    pub method: String,
    pub timestamp: u64,
    pub nonce: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub contract: Hex20,
    /// Empty string when the request has no `file`.
    pub file: String,
    /// Empty string when the request has no `data`.
    pub data: String,
    /// JSON-serialized `options`; `"{}"` when absent.
    pub options: String,
}

/// Mirrors the EIP-712 `Delegation` type: `version, delegate, expires,
/// permissions`. The domain omits `chainId`.
#[derive(Debug, Clone, Serialize)]
pub struct SignableDelegation {
    pub version: u64,
    pub delegate: Hex20,
    /// Unix seconds, or `u64::MAX` as the EIP-712 encoding of `"never"`.
    pub expires: u64,
    pub permissions: SignablePermissionsForm,
}

/// The wire encoding of `permissions` for hashing: either the literal string
/// or the list of `Permission` entries, each with `provider` defaulted to
/// `""` for a `contract`-type entry (the EIP-712 `Permission` type always
/// carries all four fields).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SignablePermissionsForm {
    All(&'static str),
    List(Vec<SignablePermissionEntry>),
}

impl SignablePermissionsForm {
    pub fn all() -> Self {
        SignablePermissionsForm::All("all-permissions")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignablePermissionEntry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub chain: u64,
    pub contract: Hex20,
    /// `""` when absent, per the fixed EIP-712 `Permission` type.
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn field_order_is_declaration_order() {
        let req = SignableRequest {
            version: 1,
            method: "read".into(),
            timestamp: 0,
            nonce: "n".into(),
            chain_id: 1,
            contract: Hex20::from_str("0xabcdef0123456789abcdef0123456789abcdef01").unwrap(),
            file: String::new(),
            data: String::new(),
            options: "{}".into(),
        };
        let json = serde_json::to_string(&req).unwrap();
        let version_pos = json.find("version").unwrap();
        let method_pos = json.find("method").unwrap();
        let contract_pos = json.find("contract").unwrap();
        let options_pos = json.find("options").unwrap();
        assert!(version_pos < method_pos);
        assert!(method_pos < contract_pos);
        assert!(contract_pos < options_pos);
    }

    #[test]
    fn all_permissions_serializes_as_bare_string() {
        let json = serde_json::to_string(&SignablePermissionsForm::all()).unwrap();
        assert_eq!(json, "\"all-permissions\"");
    }
}
