//! Leaf types for Bubble Guardian.
//!
//! Pure data and parsing: no async, no I/O, no blockchain client. Everything
//! here is shared by the signature engine, the `Guardian` orchestrator, the
//! reference `ChainView`/`DataServer` adapters, and the HTTP front end.

pub mod content_id;
pub mod delegation;
pub mod error;
pub mod filename;
pub mod hex_id;
pub mod permissions;
pub mod request;
pub mod signable;

pub use content_id::ContentId;
pub use delegation::{Delegation, Expiry, Permission, Permissions};
pub use error::{BubbleError, ErrorCode};
pub use filename::BubbleFilename;
pub use hex_id::{Hex20, Hex32, ROOT_SENTINEL};
pub use permissions::PermissionBits;
pub use request::{Method, RequestParams};
pub use signable::{SignableDelegation, SignablePermissionEntry, SignablePermissionsForm, SignableRequest};

/// The compile-time public signatory, returned unconditionally for a
/// `public`-typed signature.
pub const PUBLIC_SIGNATORY: &str = "0x99e2c875341d1cbb70432e35f5350f29bf20aa52";
