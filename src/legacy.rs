//! Legacy v0 request detection and rewrite into the modern signature shape.

use bubble_guardian_types::BubbleError;
use serde_json::{json, Value};

/// The only `signaturePrefix` a legacy v0 request is allowed to carry.
pub const LEGACY_EIP191_PREFIX: &str = "\u{19}Ethereum Signed Message:\n64";

/// True when the request has no `version` and `signature` is either a raw
/// hex string or the bare `"public"` sentinel.
pub fn is_legacy_v0(has_version: bool, signature_value: &Value) -> bool {
    if has_version {
        return false;
    }
    match signature_value {
        Value::String(s) => s == "public" || is_hex_string(s),
        _ => false,
    }
}

fn is_hex_string(s: &str) -> bool {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_hexdigit())
}

/// Rewrites a legacy signature value into `{type: "plain"|"eip191"|"public", signature}`.
pub fn rewrite(signature_value: &Value, signature_prefix: Option<&str>) -> Result<Value, BubbleError> {
    let Value::String(raw) = signature_value else {
        return Err(BubbleError::invalid_method_params(
            "legacy signature must be a hex string or \"public\"",
        ));
    };

    if raw == "public" {
        return Ok(json!({ "type": "public" }));
    }

    let kind = match signature_prefix {
        None => "plain",
        Some(p) if p == LEGACY_EIP191_PREFIX => "eip191",
        Some(_) => {
            return Err(BubbleError::invalid_method_params(
                "signaturePrefix must be the standard 64-byte EIP-191 prefix",
            ))
        }
    };

    Ok(json!({ "type": kind, "signature": raw }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_raw_hex_as_legacy() {
        assert!(is_legacy_v0(false, &Value::String("0xabcd".into())));
        assert!(is_legacy_v0(false, &Value::String("public".into())));
        assert!(!is_legacy_v0(true, &Value::String("0xabcd".into())));
        assert!(!is_legacy_v0(
            false,
            &json!({"type": "plain", "signature": "0xabcd"})
        ));
    }

    #[test]
    fn rewrites_plain_without_prefix() {
        let rewritten = rewrite(&Value::String("0xabcd".into()), None).unwrap();
        assert_eq!(rewritten, json!({"type": "plain", "signature": "0xabcd"}));
    }

    #[test]
    fn rewrites_eip191_with_standard_prefix() {
        let rewritten = rewrite(&Value::String("0xabcd".into()), Some(LEGACY_EIP191_PREFIX)).unwrap();
        assert_eq!(rewritten, json!({"type": "eip191", "signature": "0xabcd"}));
    }

    #[test]
    fn rejects_nonstandard_prefix() {
        assert!(rewrite(&Value::String("0xabcd".into()), Some("bogus")).is_err());
    }

    #[test]
    fn rewrites_public_sentinel() {
        let rewritten = rewrite(&Value::String("public".into()), None).unwrap();
        assert_eq!(rewritten, json!({"type": "public"}));
    }
}
