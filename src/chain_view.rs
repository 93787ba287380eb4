//! The abstract boundary to the blockchain.
//!
//! The core depends only on this trait — never on an RPC client directly —
//! so that the reference adapter (`bubble-guardian-acc`) and any test double
//! are interchangeable.

use async_trait::async_trait;
use bubble_guardian_types::{Hex20, Hex32, PermissionBits};

/// A chain-level failure, distinct from an authorization outcome.
///
/// `Reverted` and `Unavailable` are kept apart so the Guardian can map them
/// to `METHOD_FAILED` and `INTERNAL_ERROR` respectively without guessing at
/// error-message substrings — the adapter that actually talks to the chain
/// is the only place that knows what a revert looks like on the wire.
#[derive(Debug, thiserror::Error)]
pub enum ChainViewError {
    #[error("execution reverted")]
    Reverted,
    #[error("blockchain unavailable: {0}")]
    Unavailable(String),
}

/// Abstract boundary to the blockchain: permission consultation, chain
/// identity, delegation revocation, and contract-address validation.
#[async_trait]
pub trait ChainView: Send + Sync {
    /// Reads the ACC's 256-bit permission bitmap for `account` over
    /// `file_id` under `contract`.
    async fn get_permissions(
        &self,
        contract: Hex20,
        account: Hex20,
        file_id: Hex32,
    ) -> Result<PermissionBits, ChainViewError>;

    /// The chain id this view serves, compared against `params.chainId`.
    fn get_chain_id(&self) -> u64;

    /// Whether the delegation identified by `delegate_hash` has been revoked.
    async fn has_been_revoked(&self, delegate_hash: [u8; 32]) -> Result<bool, ChainViewError>;

    /// Whether `contract` is a well-formed, recognized contract address.
    fn validate_contract(&self, contract: &str) -> bool;
}
