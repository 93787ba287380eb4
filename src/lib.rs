//! Bubble Guardian: the request-level authorization gatekeeper that sits
//! between untrusted RPC clients and a Bubble Protocol back-end storage
//! service.
//!
//! This crate hosts everything that is not a leaf type (see
//! `bubble_guardian_types`): the signature/delegation recovery engine, the
//! `ChainView`/`DataServer` collaborator boundaries, the `Guardian`
//! orchestrator, and `ProtectedSubscription`. It depends on no chain RPC
//! client and no concrete storage backend — both are reached only through
//! the trait objects in [`chain_view`] and [`data_server`]; concrete,
//! runnable implementations live in the sibling `bubble-guardian-acc` and
//! `bubble-guardian-memory` crates.

pub mod chain_view;
pub mod data_server;
pub mod eip712;
mod legacy;
pub mod sig;
pub mod subscription;

pub mod guardian;

pub use bubble_guardian_types as types;
pub use chain_view::{ChainView, ChainViewError};
pub use data_server::{DataServer, DataServerError, SubscriptionListener};
pub use guardian::Guardian;
pub use sig::{resolve_effective_signatory, Context, DigestInput};
pub use subscription::ProtectedSubscription;

pub use bubble_guardian_types::{
    BubbleError, BubbleFilename, ContentId, Delegation, ErrorCode, Expiry, Hex20, Hex32, Method,
    Permission, PermissionBits, Permissions, RequestParams, ROOT_SENTINEL,
};
