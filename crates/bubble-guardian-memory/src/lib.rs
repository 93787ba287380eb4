//! A reference [`DataServer`](bubble_guardian::DataServer): in-memory file
//! storage with broadcast-based pub/sub fan-out.
//!
//! The Guardian core never depends on this crate: out of scope per the
//! core's own spec, actual byte storage and subscription delivery are
//! somebody else's problem. This is a concrete, realistic stand-in for the
//! abstract collaborator, good enough to run the server and integration
//! tests against without a real storage backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bubble_guardian::{DataServer, DataServerError, SubscriptionListener};
use bubble_guardian_types::{BubbleError, Hex20};
use serde_json::{json, Value};
use tokio::sync::broadcast;

/// One bubble's contents: files keyed by their full filename
/// (`permissionedPart` or `permissionedPart/segment`), directory ids known
/// to exist, and whether the bubble has been terminated.
#[derive(Default)]
struct Bubble {
    files: HashMap<String, String>,
    directories: std::collections::HashSet<String>,
    terminated: bool,
}

/// A pending subscription: the filename it watches and the channel its
/// notifications are published on.
struct Subscription {
    contract: Hex20,
    file: String,
    sender: broadcast::Sender<Notification>,
}

#[derive(Clone)]
struct Notification {
    result: Option<Value>,
    error_message: Option<String>,
}

/// An in-memory, process-local `DataServer`. State does not survive
/// restart; subscriptions do not survive the owning tokio runtime.
pub struct InMemoryDataServer {
    bubbles: Mutex<HashMap<Hex20, Bubble>>,
    subscriptions: Mutex<HashMap<String, Subscription>>,
    next_subscription_id: Mutex<u64>,
}

impl Default for InMemoryDataServer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDataServer {
    pub fn new() -> Self {
        InMemoryDataServer {
            bubbles: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            next_subscription_id: Mutex::new(0),
        }
    }

    fn with_bubble<R>(&self, contract: Hex20, f: impl FnOnce(&mut Bubble) -> R) -> R {
        let mut bubbles = self.bubbles.lock().unwrap();
        let bubble = bubbles.entry(contract).or_default();
        f(bubble)
    }

    fn directory_of(file: &str) -> &str {
        file.split('/').next().unwrap_or(file)
    }

    fn publish(&self, contract: Hex20, file: &str, notification: Notification) {
        let subscriptions = self.subscriptions.lock().unwrap();
        for sub in subscriptions.values() {
            if sub.contract == contract && sub.file == file {
                // A lagging or closed receiver is not this publisher's problem.
                let _ = sub.sender.send(notification.clone());
            }
        }
    }
}

#[async_trait]
impl DataServer for InMemoryDataServer {
    #[tracing::instrument(skip(self, options))]
    async fn create(&self, contract: Hex20, options: Option<Value>) -> Result<Value, DataServerError> {
        let _ = options;
        self.with_bubble(contract, |b| *b = Bubble::default());
        Ok(json!({"created": true}))
    }

    #[tracing::instrument(skip(self, data, options))]
    async fn write(
        &self,
        contract: Hex20,
        file: String,
        data: String,
        options: Option<Value>,
    ) -> Result<Value, DataServerError> {
        let _ = options;
        self.with_bubble(contract, |b| {
            b.directories.insert(Self::directory_of(&file).to_string());
            b.files.insert(file.clone(), data);
        });
        self.publish(
            contract,
            &file,
            Notification {
                result: Some(json!({"file": file, "event": "write"})),
                error_message: None,
            },
        );
        Ok(json!({"written": true}))
    }

    #[tracing::instrument(skip(self, data, options))]
    async fn append(
        &self,
        contract: Hex20,
        file: String,
        data: String,
        options: Option<Value>,
    ) -> Result<Value, DataServerError> {
        let _ = options;
        self.with_bubble(contract, |b| {
            b.directories.insert(Self::directory_of(&file).to_string());
            b.files.entry(file.clone()).or_default().push_str(&data);
        });
        self.publish(
            contract,
            &file,
            Notification {
                result: Some(json!({"file": file, "event": "append"})),
                error_message: None,
            },
        );
        Ok(json!({"appended": true}))
    }

    #[tracing::instrument(skip(self, options))]
    async fn read(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError> {
        let _ = options;
        let bubbles = self.bubbles.lock().unwrap();
        let data = bubbles
            .get(&contract)
            .and_then(|b| b.files.get(&file))
            .cloned()
            .ok_or_else(|| DataServerError::Bubble(BubbleError::MethodFailed(format!("no such file: {file}"))))?;
        Ok(json!({"data": data}))
    }

    #[tracing::instrument(skip(self, options))]
    async fn list(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError> {
        let _ = options;
        let bubbles = self.bubbles.lock().unwrap();
        let entries: Vec<&str> = bubbles
            .get(&contract)
            .map(|b| {
                b.files
                    .keys()
                    .filter(|f| f.starts_with(&file) && f.as_str() != file)
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!(entries))
    }

    #[tracing::instrument(skip(self, options))]
    async fn delete(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError> {
        let _ = options;
        self.with_bubble(contract, |b| {
            b.files.remove(&file);
        });
        Ok(json!({"deleted": true}))
    }

    #[tracing::instrument(skip(self, options))]
    async fn mkdir(&self, contract: Hex20, file: String, options: Option<Value>) -> Result<Value, DataServerError> {
        let _ = options;
        self.with_bubble(contract, |b| {
            b.directories.insert(file.clone());
        });
        Ok(json!({"created": true}))
    }

    #[tracing::instrument(skip(self, listener, options))]
    async fn subscribe(
        &self,
        contract: Hex20,
        file: String,
        listener: Arc<dyn SubscriptionListener>,
        options: Option<Value>,
    ) -> Result<Value, DataServerError> {
        let _ = options;
        let subscription_id = {
            let mut next = self.next_subscription_id.lock().unwrap();
            let id = format!("sub-{next}");
            *next += 1;
            id
        };

        let (sender, mut receiver) = broadcast::channel(64);
        self.subscriptions.lock().unwrap().insert(
            subscription_id.clone(),
            Subscription {
                contract,
                file: file.clone(),
                sender,
            },
        );

        let forwarded_id = subscription_id.clone();
        tokio::spawn(async move {
            while let Ok(notification) = receiver.recv().await {
                let error = notification
                    .error_message
                    .map(BubbleError::InternalError);
                if listener
                    .notify(&forwarded_id, notification.result, error)
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        Ok(json!({"subscriptionId": subscription_id}))
    }

    #[tracing::instrument(skip(self, options))]
    async fn unsubscribe(&self, subscription_id: String, options: Option<Value>) -> Result<Value, DataServerError> {
        let _ = options;
        self.subscriptions.lock().unwrap().remove(&subscription_id);
        Ok(json!({"unsubscribed": true}))
    }

    #[tracing::instrument(skip(self, options))]
    async fn terminate(&self, contract: Hex20, options: Option<Value>) -> Result<Value, DataServerError> {
        let _ = options;
        self.with_bubble(contract, |b| b.terminated = true);
        Ok(json!({"terminated": true}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Mutex as StdMutex;

    fn contract() -> Hex20 {
        Hex20::from_str("0xabcdef0123456789abcdef0123456789abcdef01").unwrap()
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let server = InMemoryDataServer::new();
        server
            .write(contract(), "0xdir/notes.txt".into(), "hello".into(), None)
            .await
            .unwrap();
        let result = server.read(contract(), "0xdir/notes.txt".into(), None).await.unwrap();
        assert_eq!(result, json!({"data": "hello"}));
    }

    #[tokio::test]
    async fn append_extends_existing_content() {
        let server = InMemoryDataServer::new();
        server
            .write(contract(), "0xdir/notes.txt".into(), "hello".into(), None)
            .await
            .unwrap();
        server
            .append(contract(), "0xdir/notes.txt".into(), " world".into(), None)
            .await
            .unwrap();
        let result = server.read(contract(), "0xdir/notes.txt".into(), None).await.unwrap();
        assert_eq!(result, json!({"data": "hello world"}));
    }

    #[tokio::test]
    async fn read_missing_file_fails() {
        let server = InMemoryDataServer::new();
        let err = server.read(contract(), "0xdir/missing.txt".into(), None).await.unwrap_err();
        assert!(matches!(err, DataServerError::Bubble(BubbleError::MethodFailed(_))));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let server = InMemoryDataServer::new();
        server
            .write(contract(), "0xdir/notes.txt".into(), "hello".into(), None)
            .await
            .unwrap();
        server.delete(contract(), "0xdir/notes.txt".into(), None).await.unwrap();
        assert!(server.read(contract(), "0xdir/notes.txt".into(), None).await.is_err());
    }

    struct RecordingListener {
        received: Arc<StdMutex<Vec<Value>>>,
    }

    #[async_trait]
    impl SubscriptionListener for RecordingListener {
        async fn notify(
            &self,
            _subscription_id: &str,
            result: Option<Value>,
            _error: Option<BubbleError>,
        ) -> Result<(), BubbleError> {
            if let Some(r) = result {
                self.received.lock().unwrap().push(r);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn subscribers_are_notified_on_write() {
        let server = InMemoryDataServer::new();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let listener = Arc::new(RecordingListener {
            received: received.clone(),
        });

        server
            .subscribe(contract(), "0xdir/notes.txt".into(), listener, None)
            .await
            .unwrap();

        // Let the forwarding task register its receiver before publishing.
        tokio::task::yield_now().await;

        server
            .write(contract(), "0xdir/notes.txt".into(), "hello".into(), None)
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_stops_future_notifications() {
        let server = InMemoryDataServer::new();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let listener = Arc::new(RecordingListener {
            received: received.clone(),
        });

        let subscribe_result = server
            .subscribe(contract(), "0xdir/notes.txt".into(), listener, None)
            .await
            .unwrap();
        let subscription_id = subscribe_result["subscriptionId"].as_str().unwrap().to_string();

        server.unsubscribe(subscription_id, None).await.unwrap();
        tokio::task::yield_now().await;

        server
            .write(contract(), "0xdir/notes.txt".into(), "hello".into(), None)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(received.lock().unwrap().is_empty());
    }
}
