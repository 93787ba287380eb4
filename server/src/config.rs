//! Server configuration: CLI flags, environment fallback, and the one
//! chain/ACC deployment this process serves.
//!
//! A `clap`-parsed CLI surface layered over `serde` defaults that themselves
//! fall back to environment variables, so the same binary runs unconfigured
//! in a container (env vars only) or fully pinned from a config file.

use std::net::IpAddr;
use std::str::FromStr;

use alloy_primitives::Address;
use clap::Parser;
use serde::Deserialize;

/// CLI arguments for the Bubble Guardian HTTP server.
#[derive(Parser, Debug)]
#[command(name = "bubble-guardian-server")]
#[command(about = "Bubble Protocol Guardian HTTP/JSON-RPC server")]
pub struct CliArgs {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "HOST", default_value_t = config_defaults::default_host())]
    pub host: IpAddr,

    /// Port to bind the HTTP listener to.
    #[arg(long, env = "PORT", default_value_t = config_defaults::default_port())]
    pub port: u16,

    /// Chain id this Guardian serves; requests for any other `chainId` are
    /// rejected with `BlockchainNotSupported`.
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: u64,

    /// JSON-RPC HTTP endpoint for the chain named by `chain_id`.
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Address of the delegation-revocation registry contract.
    #[arg(long, env = "DELEGATE_REGISTRY")]
    pub delegate_registry: String,

    /// The provider identifier matched against `bubble`-type delegations.
    #[arg(long, env = "HOST_DOMAIN")]
    pub host_domain: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid delegate registry address {0:?}: {1}")]
    InvalidRegistryAddress(String, alloy_primitives::hex::FromHexError),
}

/// Resolved, validated server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub chain_id: u64,
    pub rpc_url: String,
    pub delegate_registry: Address,
    pub host_domain: String,
}

impl Config {
    /// Parses CLI args (with environment fallback per field) into a
    /// validated `Config`.
    pub fn load() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        let delegate_registry = Address::from_str(&args.delegate_registry)
            .map_err(|e| ConfigError::InvalidRegistryAddress(args.delegate_registry.clone(), e))?;
        Ok(Config {
            host: args.host,
            port: args.port,
            chain_id: args.chain_id,
            rpc_url: args.rpc_url,
            delegate_registry,
            host_domain: args.host_domain,
        })
    }
}

pub mod config_defaults {
    use std::env;
    use std::net::IpAddr;

    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// `$PORT` env var, falling back to `8080`.
    pub fn default_port() -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT)
    }

    /// `$HOST` env var, falling back to `0.0.0.0`.
    pub fn default_host() -> IpAddr {
        env::var("HOST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(IpAddr::V4(DEFAULT_HOST.parse().unwrap()))
    }
}
