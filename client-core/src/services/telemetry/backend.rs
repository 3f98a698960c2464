//! Realtime backend implementations.
//!
//! The websocket backend speaks a small JSON frame protocol to the realtime
//! endpoint: `{"action": "subscribe", "path": …}` after connecting, server
//! pushes `{"path": …, "data": {…}}` snapshots, and writes go out as
//! `{"action": "merge", "path": …, "data": {…}}`. The in-memory backend
//! implements the same contract over process-local state for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::core::error::{CoreError, Result};
use crate::core::service::RealtimeBackend;

const MAX_CONNECTION_ATTEMPTS: u32 = 5;
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Snapshot frame pushed by the realtime endpoint.
#[derive(Debug, Deserialize)]
struct SnapshotFrame {
    path: String,
    data: Value,
}

/// Websocket-backed realtime database client.
pub struct WsRealtimeBackend {
    url: String,
}

impl WsRealtimeBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl RealtimeBackend for WsRealtimeBackend {
    async fn merge(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        let (mut socket, _) = connect_async(&self.url)
            .await
            .map_err(|e| CoreError::Subscription(format!("connect {}: {e}", self.url)))?;
        let frame = json!({"action": "merge", "path": path, "data": Value::Object(fields)});
        socket
            .send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| CoreError::Subscription(format!("merge {path}: {e}")))?;
        let _ = socket.close(None).await;
        Ok(())
    }

    fn subscribe(&self, path: &str) -> async_channel::Receiver<Result<Value>> {
        let (tx, rx) = async_channel::unbounded();
        let url = self.url.clone();
        let path = path.to_string();
        tokio::spawn(async move {
            run_subscription(url, path, tx).await;
        });
        rx
    }
}

/// Connection loop for one subscription: connect, announce the path, and
/// forward matching snapshots. Reconnects with capped exponential backoff;
/// after too many consecutive connection failures the subscriber gets one
/// terminal error and the loop ends.
async fn run_subscription(url: String, path: String, tx: async_channel::Sender<Result<Value>>) {
    let mut reconnect_delay = Duration::from_secs(1);
    let mut failed_attempts: u32 = 0;

    loop {
        match connect_async(&url).await {
            Ok((mut socket, _)) => {
                failed_attempts = 0;
                reconnect_delay = Duration::from_secs(1);
                debug!(url = %url, path = %path, "realtime subscription connected");

                let announce = json!({"action": "subscribe", "path": path});
                if let Err(e) = socket.send(Message::Text(announce.to_string())).await {
                    warn!(path = %path, error = %e, "failed to announce subscription");
                } else {
                    while let Some(message) = socket.next().await {
                        match message {
                            Ok(Message::Text(text)) => {
                                let frame: SnapshotFrame = match serde_json::from_str(&text) {
                                    Ok(frame) => frame,
                                    Err(e) => {
                                        debug!(error = %e, "ignoring unparseable realtime frame");
                                        continue;
                                    }
                                };
                                if frame.path != path {
                                    continue;
                                }
                                if tx.send(Ok(frame.data)).await.is_err() {
                                    // Subscriber gone; stop for good.
                                    let _ = socket.close(None).await;
                                    return;
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Ok(_) => continue,
                            Err(e) => {
                                warn!(path = %path, error = %e, "realtime stream error");
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                failed_attempts += 1;
                if failed_attempts >= MAX_CONNECTION_ATTEMPTS {
                    warn!(
                        url = %url,
                        path = %path,
                        attempts = failed_attempts,
                        "giving up on realtime subscription"
                    );
                    let _ = tx
                        .send(Err(CoreError::Subscription(format!(
                            "connection failed after {failed_attempts} attempts: {e}"
                        ))))
                        .await;
                    return;
                }
                warn!(url = %url, error = %e, "realtime connect failed, will retry");
            }
        }

        if tx.is_closed() {
            return;
        }
        sleep(reconnect_delay).await;
        reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY);
    }
}

/// In-memory realtime database: records keyed by path, snapshot fan-out to
/// subscribers. Used by tests and offline demos.
#[derive(Default)]
pub struct MemoryRealtimeBackend {
    records: RwLock<HashMap<String, Value>>,
    senders: RwLock<HashMap<String, Vec<async_channel::Sender<Result<Value>>>>>,
    merges: AtomicUsize,
}

impl MemoryRealtimeBackend {
    /// Number of merges that actually reached the backend.
    pub fn merge_count(&self) -> usize {
        self.merges.load(Ordering::SeqCst)
    }

    /// Current record at `path`, if any.
    pub fn record(&self, path: &str) -> Option<Value> {
        self.records.read().get(path).cloned()
    }
}

#[async_trait]
impl RealtimeBackend for MemoryRealtimeBackend {
    async fn merge(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        let snapshot = {
            let mut records = self.records.write();
            let record = records
                .entry(path.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = record {
                for (key, value) in fields {
                    map.insert(key, value);
                }
            }
            record.clone()
        };
        self.merges.fetch_add(1, Ordering::SeqCst);

        let mut senders = self.senders.write();
        if let Some(list) = senders.get_mut(path) {
            list.retain(|tx| tx.try_send(Ok(snapshot.clone())).is_ok());
        }
        Ok(())
    }

    fn subscribe(&self, path: &str) -> async_channel::Receiver<Result<Value>> {
        let (tx, rx) = async_channel::unbounded();
        if let Some(current) = self.records.read().get(path) {
            let _ = tx.try_send(Ok(current.clone()));
        }
        self.senders
            .write()
            .entry(path.to_string())
            .or_default()
            .push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_merge_creates_and_updates_record() {
        let backend = MemoryRealtimeBackend::default();
        let mut fields = Map::new();
        fields.insert("latitude".to_string(), Value::from(1.5));
        backend.merge("vehicles/v1", fields).await.unwrap();

        let mut fields = Map::new();
        fields.insert("load".to_string(), Value::from(9.0));
        backend.merge("vehicles/v1", fields).await.unwrap();

        let record = backend.record("vehicles/v1").unwrap();
        assert_eq!(record["latitude"], 1.5);
        assert_eq!(record["load"], 9.0);
        assert_eq!(backend.merge_count(), 2);
    }

    #[tokio::test]
    async fn test_memory_subscribe_sees_current_then_updates() {
        let backend = MemoryRealtimeBackend::default();
        let mut fields = Map::new();
        fields.insert("load".to_string(), Value::from(1.0));
        backend.merge("vehicles/v1", fields).await.unwrap();

        let rx = backend.subscribe("vehicles/v1");
        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first["load"], 1.0);

        let mut fields = Map::new();
        fields.insert("load".to_string(), Value::from(2.0));
        backend.merge("vehicles/v1", fields).await.unwrap();
        let second = rx.recv().await.unwrap().unwrap();
        assert_eq!(second["load"], 2.0);
    }
}
