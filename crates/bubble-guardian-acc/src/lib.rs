//! A reference [`ChainView`](bubble_guardian::ChainView) that reads a real
//! Access Control Contract over JSON-RPC via `alloy`.
//!
//! The Guardian core never depends on this crate: it is a concrete,
//! swappable collaborator. It is read-only — no signer, no gas filler, no
//! nonce management — because the Guardian never submits transactions, only
//! reads permission and revocation state.

use std::str::FromStr;

use alloy_primitives::{Address, B256};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_sol_types::sol;
use async_trait::async_trait;
use bubble_guardian::{ChainView, ChainViewError};
use bubble_guardian_types::{Hex20, Hex32, PermissionBits};

sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IAccessControlContract {
        function getAccessPermissions(address account, bytes32 contentId) external view returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IDelegateRegistry {
        function isRevoked(bytes32 delegateHash) external view returns (bool);
    }
}

/// Construction-time failures: distinct from [`ChainViewError`], which
/// covers failures in the already-connected steady state.
#[derive(Debug, thiserror::Error)]
pub enum AccChainViewError {
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),
}

fn classify_transport_error(err: impl std::fmt::Display) -> ChainViewError {
    let message = err.to_string();
    if message.contains("execution reverted") {
        ChainViewError::Reverted
    } else {
        ChainViewError::Unavailable(message)
    }
}

/// Read-only `ChainView` backed by a single JSON-RPC endpoint.
///
/// One instance serves exactly one chain (`chain_id`); the Guardian rejects
/// requests for any other `chainId` before this type is ever consulted.
/// Delegation revocation is tracked by a separate registry contract, since
/// a bubble's ACC and the registry that tracks delegate revocations are
/// deployed independently in the reference network this adapter targets.
pub struct AccChainView {
    chain_id: u64,
    provider: RootProvider,
    delegate_registry: Address,
}

impl AccChainView {
    /// Connects to `rpc_url` and serves `chain_id` as this view's chain
    /// identity, consulting `delegate_registry` for revocations.
    pub fn connect_http(
        chain_id: u64,
        rpc_url: &str,
        delegate_registry: Address,
    ) -> Result<Self, AccChainViewError> {
        let url = rpc_url
            .parse()
            .map_err(|_| AccChainViewError::InvalidRpcUrl(rpc_url.to_string()))?;
        let provider = ProviderBuilder::new().connect_http(url);
        Ok(AccChainView {
            chain_id,
            provider,
            delegate_registry,
        })
    }

    fn acc(&self, contract: Hex20) -> IAccessControlContract::IAccessControlContractInstance<&RootProvider> {
        let address: Address = contract.into();
        IAccessControlContract::new(address, &self.provider)
    }

    fn registry(&self) -> IDelegateRegistry::IDelegateRegistryInstance<&RootProvider> {
        IDelegateRegistry::new(self.delegate_registry, &self.provider)
    }
}

#[async_trait]
impl ChainView for AccChainView {
    #[tracing::instrument(skip(self), err)]
    async fn get_permissions(
        &self,
        contract: Hex20,
        account: Hex20,
        file_id: Hex32,
    ) -> Result<PermissionBits, ChainViewError> {
        let account_address: Address = account.into();
        let content_id = B256::from(file_id.as_bytes());
        let bits = self
            .acc(contract)
            .getAccessPermissions(account_address, content_id)
            .call()
            .await
            .map_err(classify_transport_error)?;
        Ok(PermissionBits::from_u256(bits))
    }

    fn get_chain_id(&self) -> u64 {
        self.chain_id
    }

    #[tracing::instrument(skip(self), err)]
    async fn has_been_revoked(&self, delegate_hash: [u8; 32]) -> Result<bool, ChainViewError> {
        self.registry()
            .isRevoked(B256::from(delegate_hash))
            .call()
            .await
            .map_err(classify_transport_error)
    }

    fn validate_contract(&self, contract: &str) -> bool {
        Address::from_str(contract).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> AccChainView {
        AccChainView::connect_http(1, "http://localhost:8545", Address::ZERO).unwrap()
    }

    #[test]
    fn validate_contract_accepts_well_formed_address() {
        let view = view();
        assert!(view.validate_contract("0xabcdef0123456789abcdef0123456789abcdef01"));
        assert!(!view.validate_contract("not-an-address"));
    }

    #[test]
    fn rejects_malformed_rpc_url() {
        assert!(AccChainView::connect_http(1, "not a url", Address::ZERO).is_err());
    }

    #[test]
    fn get_chain_id_returns_configured_id() {
        assert_eq!(view().get_chain_id(), 1);
    }
}
