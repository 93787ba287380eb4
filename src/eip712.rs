//! Hand-rolled EIP-712 struct hashing for the fixed `Request` and
//! `Delegation` type sets.
//!
//! There is no dependency on a `sol!`-macro code generator here: the two
//! type sets are small, fixed, and never extended at runtime, so a direct
//! `keccak256`-based encoder is both simpler and easier to audit against the
//! literal type strings than a general-purpose ABI layer would be.

use alloy_primitives::{keccak256, Address, B256, U256};
use bubble_guardian_types::{SignableDelegation, SignablePermissionEntry, SignablePermissionsForm, SignableRequest};

const REQUEST_TYPE_STRING: &str =
    "Request(uint256 version,string method,uint256 timestamp,string nonce,uint256 chainId,address contract,string file,string data,string options)";

const DELEGATION_TYPE_STRING: &str =
    "Delegation(uint256 version,address delegate,uint256 expires,Permission[] permissions)Permission(string type,uint256 chain,address contract,string provider)";

const PERMISSION_TYPE_STRING: &str = "Permission(string type,uint256 chain,address contract,string provider)";

fn encode_string(s: &str) -> B256 {
    keccak256(s.as_bytes())
}

fn encode_uint(v: u64) -> [u8; 32] {
    U256::from(v).to_be_bytes::<32>()
}

fn encode_address(addr: Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(addr.as_slice());
    out
}

fn permission_struct_hash(entry: &SignablePermissionEntry) -> B256 {
    let mut data = Vec::with_capacity(32 * 5);
    data.extend_from_slice(keccak256(PERMISSION_TYPE_STRING.as_bytes()).as_slice());
    data.extend_from_slice(encode_string(entry.kind).as_slice());
    data.extend_from_slice(&encode_uint(entry.chain));
    data.extend_from_slice(&encode_address(entry.contract.into()));
    data.extend_from_slice(encode_string(&entry.provider).as_slice());
    keccak256(&data)
}

fn permissions_array_hash(permissions: &SignablePermissionsForm) -> B256 {
    match permissions {
        SignablePermissionsForm::All(_) => {
            // `"all-permissions"` never appears inside a Delegation that is
            // itself being EIP-712 signed by this codebase's reference
            // tooling: the on-chain `Permission[]` type has no sentinel
            // slot for it. Encoded as an empty array's hash so the digest
            // is still well-defined for round-trip tests.
            keccak256([])
        }
        SignablePermissionsForm::List(entries) => {
            let mut data = Vec::with_capacity(32 * entries.len());
            for entry in entries {
                data.extend_from_slice(permission_struct_hash(entry).as_slice());
            }
            keccak256(&data)
        }
    }
}

/// `structHash(Request)`.
pub fn request_struct_hash(req: &SignableRequest) -> B256 {
    let mut data = Vec::with_capacity(32 * 9);
    data.extend_from_slice(keccak256(REQUEST_TYPE_STRING.as_bytes()).as_slice());
    data.extend_from_slice(&encode_uint(req.version));
    data.extend_from_slice(encode_string(&req.method).as_slice());
    data.extend_from_slice(&encode_uint(req.timestamp));
    data.extend_from_slice(encode_string(&req.nonce).as_slice());
    data.extend_from_slice(&encode_uint(req.chain_id));
    data.extend_from_slice(&encode_address(req.contract.into()));
    data.extend_from_slice(encode_string(&req.file).as_slice());
    data.extend_from_slice(encode_string(&req.data).as_slice());
    data.extend_from_slice(encode_string(&req.options).as_slice());
    keccak256(&data)
}

/// `structHash(Delegation)`.
pub fn delegation_struct_hash(deleg: &SignableDelegation) -> B256 {
    let mut data = Vec::with_capacity(32 * 4);
    data.extend_from_slice(keccak256(DELEGATION_TYPE_STRING.as_bytes()).as_slice());
    data.extend_from_slice(&encode_uint(deleg.version));
    data.extend_from_slice(&encode_address(deleg.delegate.into()));
    data.extend_from_slice(&encode_uint(deleg.expires));
    data.extend_from_slice(permissions_array_hash(&deleg.permissions).as_slice());
    keccak256(&data)
}

/// Domain separator for `rpc` context: `{name, version, chainId}`.
pub fn rpc_domain_separator(chain_id: u64) -> B256 {
    const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version,uint256 chainId)";
    let mut data = Vec::with_capacity(32 * 4);
    data.extend_from_slice(keccak256(DOMAIN_TYPE.as_bytes()).as_slice());
    data.extend_from_slice(encode_string("BubbleProtocol").as_slice());
    data.extend_from_slice(encode_string("1.0").as_slice());
    data.extend_from_slice(&encode_uint(chain_id));
    keccak256(&data)
}

/// Domain separator for `delegate` context: `{name, version}`, no `chainId`.
pub fn delegate_domain_separator() -> B256 {
    const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version)";
    let mut data = Vec::with_capacity(32 * 3);
    data.extend_from_slice(keccak256(DOMAIN_TYPE.as_bytes()).as_slice());
    data.extend_from_slice(encode_string("BubbleProtocol").as_slice());
    data.extend_from_slice(encode_string("1.0").as_slice());
    keccak256(&data)
}

/// The final EIP-712 signing digest: `keccak256(0x1901 || domainSeparator || structHash)`.
pub fn signing_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(&[0x19, 0x01]);
    data.extend_from_slice(domain_separator.as_slice());
    data.extend_from_slice(struct_hash.as_slice());
    keccak256(&data)
}
