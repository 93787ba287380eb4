//! Identifies the piece of content a delegation permission is checked against.

use crate::hex_id::Hex20;

/// `{chain, contract, provider}`, synthesized by the Guardian from
/// `(params.chainId, params.contract, hostDomain)` for each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId {
    pub chain: u64,
    pub contract: Hex20,
    pub provider: String,
}

impl ContentId {
    pub fn new(chain: u64, contract: Hex20, provider: impl Into<String>) -> Self {
        ContentId {
            chain,
            contract,
            provider: provider.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn constructs_from_parts() {
        let contract = Hex20::from_str("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        let cid = ContentId::new(1, contract, "host.example.com");
        assert_eq!(cid.chain, 1);
        assert_eq!(cid.provider, "host.example.com");
    }
}
