//! Bubble Guardian HTTP server entrypoint.
//!
//! Exposes the Guardian's `post` pipeline over a single JSON-RPC-flavored
//! `POST /rpc` endpoint, backed by a real Access Control Contract
//! (`bubble-guardian-acc`) and an in-memory `DataServer`
//! (`bubble-guardian-memory`).
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control the bind address
//! - `CHAIN_ID`, `RPC_URL`, `DELEGATE_REGISTRY`, `HOST_DOMAIN` configure the
//!   chain view

mod config;
mod handlers;
mod jsonrpc;
mod run;
mod sig_down;

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run::run().await {
        eprintln!("{e}");
        process::exit(1);
    }
}
