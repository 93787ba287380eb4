//! The abstract boundary to bubble storage.
//!
//! Out of scope for the core per the Guardian's own spec: actual byte
//! storage, file listing, and pub/sub fan-out are somebody else's problem.
//! `bubble-guardian-memory` supplies a usable reference implementation.

use async_trait::async_trait;
use bubble_guardian_types::{BubbleError, Hex20};
use serde_json::Value;
use std::sync::Arc;

/// A `DataServer` failure. `Bubble` carries an already-categorized error
/// (e.g. a specific `PermissionDenied` the data server itself detected);
/// `Other` is normalized to `InternalError` by the Guardian.
#[derive(Debug, thiserror::Error)]
pub enum DataServerError {
    #[error(transparent)]
    Bubble(#[from] BubbleError),
    #[error("{0}")]
    Other(String),
}

impl DataServerError {
    /// Folds this error into the stable taxonomy, wrapping `Other` as
    /// `InternalError`.
    pub fn into_bubble_error(self) -> BubbleError {
        match self {
            DataServerError::Bubble(e) => e,
            DataServerError::Other(message) => BubbleError::InternalError(message),
        }
    }
}

/// Receives subscription notifications and forwarded errors. Returns
/// `Err` to signal the back-end should tear the subscription down.
#[async_trait]
pub trait SubscriptionListener: Send + Sync {
    async fn notify(
        &self,
        subscription_id: &str,
        result: Option<Value>,
        error: Option<BubbleError>,
    ) -> Result<(), BubbleError>;
}

/// The storage and pub/sub operations the Guardian dispatches to once a
/// request has cleared authorization.
#[async_trait]
pub trait DataServer: Send + Sync {
    async fn create(&self, contract: Hex20, options: Option<Value>) -> Result<Value, DataServerError>;

    async fn write(
        &self,
        contract: Hex20,
        file: String,
        data: String,
        options: Option<Value>,
    ) -> Result<Value, DataServerError>;

    async fn append(
        &self,
        contract: Hex20,
        file: String,
        data: String,
        options: Option<Value>,
    ) -> Result<Value, DataServerError>;

    async fn read(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError>;

    async fn list(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError>;

    async fn delete(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError>;

    async fn mkdir(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError>;

    async fn subscribe(
        &self,
        contract: Hex20,
        file: String,
        listener: Arc<dyn SubscriptionListener>,
        options: Option<Value>,
    ) -> Result<Value, DataServerError>;

    async fn unsubscribe(&self, subscription_id: String, options: Option<Value>) -> Result<Value, DataServerError>;

    async fn terminate(&self, contract: Hex20, options: Option<Value>) -> Result<Value, DataServerError>;
}
