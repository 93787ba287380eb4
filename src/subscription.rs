//! Re-checks read permission on each subscription notification.

use async_trait::async_trait;
use bubble_guardian_types::{BubbleError, Hex20, Hex32};
use serde_json::Value;
use std::sync::Arc;

use crate::chain_view::ChainView;
use crate::data_server::SubscriptionListener;

/// Wraps a client-supplied listener so that every notification is gated on
/// a fresh permission check, not the permission bits read at subscribe time.
///
/// An additional chain round-trip per notification is the deliberate cost
/// of closing the window between a revocation and the next delivered event.
pub struct ProtectedSubscription<C: ChainView> {
    chain_view: Arc<C>,
    contract: Hex20,
    file_id: Hex32,
    signatory: Hex20,
    inner: Arc<dyn SubscriptionListener>,
}

impl<C: ChainView> ProtectedSubscription<C> {
    pub fn new(
        chain_view: Arc<C>,
        contract: Hex20,
        file_id: Hex32,
        signatory: Hex20,
        inner: Arc<dyn SubscriptionListener>,
    ) -> Self {
        ProtectedSubscription {
            chain_view,
            contract,
            file_id,
            signatory,
            inner,
        }
    }
}

#[async_trait]
impl<C: ChainView> SubscriptionListener for ProtectedSubscription<C> {
    async fn notify(
        &self,
        subscription_id: &str,
        result: Option<Value>,
        error: Option<BubbleError>,
    ) -> Result<(), BubbleError> {
        let still_permitted = self
            .chain_view
            .get_permissions(self.contract, self.signatory, self.file_id)
            .await
            .map(|bits| bits.can_read())
            .unwrap_or(false);

        if !still_permitted {
            self.inner
                .notify(subscription_id, None, Some(BubbleError::PermissionDenied("subscription terminated".into())))
                .await
                .ok();
            return Err(BubbleError::PermissionDenied("subscription terminated".into()));
        }

        self.inner.notify(subscription_id, result, error).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_view::test_support::FakeChainView;
    use bubble_guardian_types::PermissionBits;
    use std::str::FromStr;
    use std::sync::Mutex;

    struct RecordingListener {
        calls: Mutex<Vec<(String, Option<Value>, Option<String>)>>,
    }

    impl RecordingListener {
        fn new() -> Self {
            RecordingListener {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SubscriptionListener for RecordingListener {
        async fn notify(
            &self,
            subscription_id: &str,
            result: Option<Value>,
            error: Option<BubbleError>,
        ) -> Result<(), BubbleError> {
            self.calls.lock().unwrap().push((
                subscription_id.to_string(),
                result,
                error.map(|e| e.to_string()),
            ));
            Ok(())
        }
    }

    fn addr(s: &str) -> Hex20 {
        Hex20::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn forwards_when_still_permitted() {
        let chain = Arc::new(FakeChainView::new(1));
        let contract = addr("0xabcdef0123456789abcdef0123456789abcdef01");
        let signatory = addr("0x1111111111111111111111111111111111111111");
        let file_id = Hex32::from_bytes([0u8; 32]);
        chain.set_permissions(
            contract,
            signatory,
            file_id,
            PermissionBits::from_u256(alloy_primitives::U256::from(1u8) << 253),
        );

        let inner = Arc::new(RecordingListener::new());
        let protected = ProtectedSubscription::new(chain, contract, file_id, signatory, inner.clone());

        let result = protected
            .notify("sub-1", Some(serde_json::json!({"ok": true})), None)
            .await;
        assert!(result.is_ok());
        assert_eq!(inner.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tears_down_when_permission_revoked() {
        let chain = Arc::new(FakeChainView::new(1));
        let contract = addr("0xabcdef0123456789abcdef0123456789abcdef01");
        let signatory = addr("0x1111111111111111111111111111111111111111");
        let file_id = Hex32::from_bytes([0u8; 32]);
        // no permissions registered: FakeChainView defaults to zero bits.

        let inner = Arc::new(RecordingListener::new());
        let protected = ProtectedSubscription::new(chain, contract, file_id, signatory, inner.clone());

        let result = protected.notify("sub-1", Some(serde_json::json!({})), None).await;
        assert!(matches!(result, Err(BubbleError::PermissionDenied(_))));
        let calls = inner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, None);
        assert!(calls[0].2.is_some());
    }
}
