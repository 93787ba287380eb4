//! Signature recovery across the four contexts, and the delegation-aware
//! resolution of a request's effective identity.

use alloy_primitives::{keccak256, Signature, B256};
use bubble_guardian_types::{
    BubbleError, ContentId, Delegation, Expiry, Hex20, Permission, Permissions, SignableDelegation,
    SignablePermissionEntry, SignablePermissionsForm, SignableRequest, PUBLIC_SIGNATORY,
};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::chain_view::ChainView;
use crate::eip712;
use crate::legacy;

/// The four contexts a digest can be computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Rpc,
    Delegate,
    Message,
    Digest,
}

/// What gets hashed (or, for `Digest`, used directly as the hash).
pub enum DigestInput<'a> {
    Rpc(&'a SignableRequest),
    Delegate(&'a SignableDelegation),
    Message(&'a str),
    Digest(&'a [u8]),
}

impl<'a> DigestInput<'a> {
    pub fn context(&self) -> Context {
        match self {
            DigestInput::Rpc(_) => Context::Rpc,
            DigestInput::Delegate(_) => Context::Delegate,
            DigestInput::Message(_) => Context::Message,
            DigestInput::Digest(_) => Context::Digest,
        }
    }

    fn canonical_bytes(&self) -> Result<Vec<u8>, BubbleError> {
        match self {
            DigestInput::Rpc(req) => serde_json::to_vec(req)
                .map_err(|e| BubbleError::invalid_method_params_with_cause("cannot serialize request", e)),
            DigestInput::Delegate(deleg) => serde_json::to_vec(deleg)
                .map_err(|e| BubbleError::invalid_method_params_with_cause("cannot serialize delegation", e)),
            DigestInput::Message(s) => Ok(s.as_bytes().to_vec()),
            DigestInput::Digest(bytes) => Ok(bytes.to_vec()),
        }
    }
}

fn as_object(sig_value: &Value) -> Result<&Map<String, Value>, BubbleError> {
    sig_value
        .as_object()
        .ok_or_else(|| BubbleError::invalid_signature("signature must be an object"))
}

fn signature_hex(obj: &Map<String, Value>) -> Result<&str, BubbleError> {
    obj.get("signature")
        .and_then(Value::as_str)
        .ok_or_else(|| BubbleError::invalid_signature("signature object missing \"signature\" hex"))
}

fn decode_signature_bytes(raw: &str) -> Result<[u8; 65], BubbleError> {
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(stripped)
        .map_err(|e| BubbleError::invalid_signature_with_cause("signature is not valid hex", e))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| BubbleError::invalid_signature(format!("signature must be 65 bytes, got {len}")))
}

fn recover_from_prehash(hash: B256, sig_bytes: [u8; 65]) -> Result<Hex20, BubbleError> {
    let signature = Signature::from_raw_array(&sig_bytes)
        .map_err(|e| BubbleError::invalid_signature_with_cause("malformed signature", e))?;
    let address = signature
        .recover_address_from_prehash(&hash)
        .map_err(|e| BubbleError::invalid_signature_with_cause("signature did not recover to an address", e))?;
    Ok(Hex20::from(address))
}

fn digest_as_prehash(input: &DigestInput) -> Result<B256, BubbleError> {
    match input {
        DigestInput::Digest(bytes) => {
            let arr: [u8; 32] = (*bytes)
                .try_into()
                .map_err(|_| BubbleError::invalid_signature("digest must be exactly 32 bytes"))?;
            Ok(B256::from(arr))
        }
        _ => Ok(keccak256(input.canonical_bytes()?)),
    }
}

fn eip191_wrap(message: &[u8]) -> B256 {
    let mut data = Vec::with_capacity(26 + message.len());
    data.extend_from_slice(b"\x19Ethereum Signed Message:\n");
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

fn eip191_prehash(input: &DigestInput) -> Result<B256, BubbleError> {
    match input {
        DigestInput::Digest(bytes) => {
            let arr: [u8; 32] = (*bytes)
                .try_into()
                .map_err(|_| BubbleError::invalid_signature("digest must be exactly 32 bytes"))?;
            Ok(eip191_wrap(&arr))
        }
        _ => Ok(eip191_wrap(&input.canonical_bytes()?)),
    }
}

fn recover_eip712(input: &DigestInput, obj: &Map<String, Value>, chain_id: u64) -> Result<Hex20, BubbleError> {
    let raw = signature_hex(obj)?;
    let sig_bytes = decode_signature_bytes(raw)?;
    let digest = match input {
        DigestInput::Rpc(req) => {
            eip712::signing_digest(eip712::rpc_domain_separator(chain_id), eip712::request_struct_hash(req))
        }
        DigestInput::Delegate(deleg) => {
            eip712::signing_digest(eip712::delegate_domain_separator(), eip712::delegation_struct_hash(deleg))
        }
        DigestInput::Message(_) | DigestInput::Digest(_) => {
            return Err(BubbleError::invalid_signature(
                "eip712 signatures are only valid in rpc or delegate context",
            ))
        }
    };
    recover_from_prehash(digest, sig_bytes)
}

/// Recovers the address that produced `sig_value` over `input`. Does not
/// look at, or resolve, any nested `delegate` object.
pub fn recover_raw(input: DigestInput, sig_value: &Value, chain_id: u64) -> Result<Hex20, BubbleError> {
    let obj = as_object(sig_value)?;
    let sig_type = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| BubbleError::invalid_signature("signature missing \"type\""))?;

    match sig_type {
        "public" => Hex20::from_str(PUBLIC_SIGNATORY)
            .map_err(|e| BubbleError::invalid_signature_with_cause("malformed public signatory constant", e)),
        "plain" => {
            let sig_bytes = decode_signature_bytes(signature_hex(obj)?)?;
            recover_from_prehash(digest_as_prehash(&input)?, sig_bytes)
        }
        "eip191" => {
            let sig_bytes = decode_signature_bytes(signature_hex(obj)?)?;
            recover_from_prehash(eip191_prehash(&input)?, sig_bytes)
        }
        "eip712" => recover_eip712(&input, obj, chain_id),
        other => Err(BubbleError::invalid_signature(format!(
            "unknown signature type \"{other}\""
        ))),
    }
}

fn to_signable_permissions(permissions: &Permissions) -> SignablePermissionsForm {
    match permissions {
        Permissions::All => SignablePermissionsForm::all(),
        Permissions::List(entries) => SignablePermissionsForm::List(
            entries
                .iter()
                .map(|p| match p {
                    Permission::Contract { chain, contract } => SignablePermissionEntry {
                        kind: "contract",
                        chain: *chain,
                        contract: *contract,
                        provider: String::new(),
                    },
                    Permission::Bubble {
                        chain,
                        contract,
                        provider,
                    } => SignablePermissionEntry {
                        kind: "bubble",
                        chain: *chain,
                        contract: *contract,
                        provider: provider.clone(),
                    },
                })
                .collect(),
        ),
    }
}

fn delegate_denied() -> BubbleError {
    BubbleError::PermissionDenied("delegate denied".into())
}

async fn resolve_delegate(
    delegate_value: &Value,
    outer_signer: Hex20,
    chain_view: &dyn ChainView,
    content_id: &ContentId,
    now_secs: u64,
) -> Result<Hex20, BubbleError> {
    let delegation: Delegation = serde_json::from_value(delegate_value.clone())
        .map_err(|e| BubbleError::invalid_method_params_with_cause("cannot decode delegate", e))?;

    let delegation_signature_value = delegate_value
        .get("signature")
        .ok_or_else(|| BubbleError::invalid_method_params("delegate missing \"signature\""))?;

    let signable = SignableDelegation {
        version: delegation.version,
        delegate: delegation.delegate,
        expires: match delegation.expires {
            Expiry::Never => u64::MAX,
            Expiry::At(t) => t,
        },
        permissions: to_signable_permissions(&delegation.permissions),
    };

    let delegator = recover_raw(DigestInput::Delegate(&signable), delegation_signature_value, 0)
        .map_err(|e| BubbleError::invalid_method_params_with_cause("cannot decode delegate", e))?;

    if !delegation.is_relevant(now_secs) {
        return Err(delegate_denied());
    }
    if !delegation.delegate_matches(outer_signer) {
        return Err(delegate_denied());
    }

    let hash = keccak256(
        serde_json::to_vec(&signable)
            .map_err(|e| BubbleError::invalid_method_params_with_cause("cannot serialize delegate", e))?,
    );
    let revoked = chain_view
        .has_been_revoked(hash.0)
        .await
        .map_err(|_| delegate_denied())?;
    if revoked {
        return Err(delegate_denied());
    }

    if !delegation.permissions.matches(content_id) {
        return Err(delegate_denied());
    }

    Ok(delegator)
}

/// The full `rpc`-context identity resolution: legacy rewrite, outer
/// signature recovery, and (if present) nested delegation resolution.
///
/// Returns the effective signatory permissions should be checked against:
/// the outer signer, or the delegation's own signatory when a valid,
/// relevant, non-revoked, content-matching delegation is attached.
pub async fn resolve_effective_signatory(
    req: &SignableRequest,
    has_version: bool,
    raw_signature_value: &Value,
    signature_prefix: Option<&str>,
    chain_view: &dyn ChainView,
    content_id: &ContentId,
    now_secs: u64,
) -> Result<Hex20, BubbleError> {
    let signature_value = if legacy::is_legacy_v0(has_version, raw_signature_value) {
        legacy::rewrite(raw_signature_value, signature_prefix)?
    } else {
        raw_signature_value.clone()
    };

    let outer_signer = recover_raw(DigestInput::Rpc(req), &signature_value, req.chain_id)?;

    let Some(delegate_value) = signature_value.get("delegate") else {
        return Ok(outer_signer);
    };

    resolve_delegate(delegate_value, outer_signer, chain_view, content_id, now_secs).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_view::test_support::FakeChainView;
    use serde_json::json;

    fn sample_request() -> SignableRequest {
        SignableRequest {
            version: 1,
            method: "read".into(),
            timestamp: 0,
            nonce: "n".into(),
            chain_id: 1,
            contract: Hex20::from_str("0xabcdef0123456789abcdef0123456789abcdef01").unwrap(),
            file: String::new(),
            data: String::new(),
            options: "{}".into(),
        }
    }

    #[test]
    fn public_signature_always_recovers_the_constant() {
        let req = sample_request();
        let signer = recover_raw(DigestInput::Rpc(&req), &json!({"type": "public"}), 1).unwrap();
        assert_eq!(signer, Hex20::from_str(PUBLIC_SIGNATORY).unwrap());
    }

    #[test]
    fn missing_type_is_structural() {
        let req = sample_request();
        let err = recover_raw(DigestInput::Rpc(&req), &json!({"signature": "0xab"}), 1).unwrap_err();
        assert!(matches!(err, BubbleError::InvalidSignature { .. }));
    }

    #[test]
    fn unknown_type_is_structural() {
        let req = sample_request();
        let err = recover_raw(DigestInput::Rpc(&req), &json!({"type": "bogus"}), 1).unwrap_err();
        assert!(matches!(err, BubbleError::InvalidSignature { .. }));
    }

    #[test]
    fn wrong_length_signature_is_structural() {
        let req = sample_request();
        let err = recover_raw(
            DigestInput::Rpc(&req),
            &json!({"type": "plain", "signature": "0xabcd"}),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, BubbleError::InvalidSignature { .. }));
    }

    #[test]
    fn eip712_rejected_outside_rpc_and_delegate_context() {
        let err = recover_raw(
            DigestInput::Message("hello"),
            &json!({"type": "eip712", "signature": "0x".to_string() + &"ab".repeat(65)}),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, BubbleError::InvalidSignature { .. }));
    }

    fn public_only(delegate: Option<Value>) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("type".into(), json!("public"));
        if let Some(d) = delegate {
            obj.insert("delegate".into(), d);
        }
        Value::Object(obj)
    }

    fn public_signatory() -> Hex20 {
        Hex20::from_str(PUBLIC_SIGNATORY).unwrap()
    }

    #[tokio::test]
    async fn resolves_to_outer_signer_without_a_delegate() {
        let req = sample_request();
        let chain = FakeChainView::new(1);
        let cid = ContentId::new(1, req.contract, "host");
        let signer = resolve_effective_signatory(&req, true, &public_only(None), None, &chain, &cid, 0)
            .await
            .unwrap();
        assert_eq!(signer, public_signatory());
    }

    #[tokio::test]
    async fn resolves_to_delegator_with_all_permissions_delegate() {
        let req = sample_request();
        let chain = FakeChainView::new(1);
        let cid = ContentId::new(1, req.contract, "host");

        let delegate = json!({
            "version": 1,
            "delegate": PUBLIC_SIGNATORY,
            "expires": "never",
            "permissions": "all-permissions",
            "signature": {"type": "public"},
        });

        let signer = resolve_effective_signatory(
            &req,
            true,
            &public_only(Some(delegate)),
            None,
            &chain,
            &cid,
            0,
        )
        .await
        .unwrap();
        assert_eq!(signer, public_signatory());
    }

    #[tokio::test]
    async fn delegate_denied_when_expired() {
        let req = sample_request();
        let chain = FakeChainView::new(1);
        let cid = ContentId::new(1, req.contract, "host");

        let delegate = json!({
            "version": 1,
            "delegate": PUBLIC_SIGNATORY,
            "expires": 100,
            "permissions": "all-permissions",
            "signature": {"type": "public"},
        });

        let err = resolve_effective_signatory(&req, true, &public_only(Some(delegate)), None, &chain, &cid, 200)
            .await
            .unwrap_err();
        assert!(matches!(err, BubbleError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn delegate_denied_when_revoked() {
        let req = sample_request();
        let chain = FakeChainView::new(1);
        let cid = ContentId::new(1, req.contract, "host");

        let signable = SignableDelegation {
            version: 1,
            delegate: public_signatory(),
            expires: u64::MAX,
            permissions: SignablePermissionsForm::all(),
        };
        let hash = keccak256(serde_json::to_vec(&signable).unwrap());
        chain.set_revoked(hash.0, true);

        let delegate = json!({
            "version": 1,
            "delegate": PUBLIC_SIGNATORY,
            "expires": "never",
            "permissions": "all-permissions",
            "signature": {"type": "public"},
        });

        let err = resolve_effective_signatory(&req, true, &public_only(Some(delegate)), None, &chain, &cid, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BubbleError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn delegate_denied_when_content_does_not_match() {
        let req = sample_request();
        let chain = FakeChainView::new(1);
        let cid = ContentId::new(1, req.contract, "host-b");

        let delegate = json!({
            "version": 1,
            "delegate": PUBLIC_SIGNATORY,
            "expires": "never",
            "permissions": [
                {"type": "bubble", "chain": 1, "contract": req.contract.to_lowercase_hex(), "provider": "host-a"}
            ],
            "signature": {"type": "public"},
        });

        let err = resolve_effective_signatory(&req, true, &public_only(Some(delegate)), None, &chain, &cid, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, BubbleError::PermissionDenied(_)));
    }
}
