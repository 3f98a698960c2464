//! # Telemetry Channel
//!
//! Per-vehicle subscriptions to the realtime position/load feed. This is a
//! continuous push stream, deliberately separate from the resource cache:
//! telemetry is high-frequency, has no staleness window, and only the
//! latest sample per vehicle is worth keeping.
//!
//! One upstream feed is held per vehicle and fanned out to however many
//! subscribers that vehicle has. Samples for one vehicle are delivered in
//! arrival order, with no smoothing or buffering: latest-sample-wins. Feed
//! failures go to each subscriber's error callback and never touch the
//! resource cache or the session.

mod backend;

pub use backend::{MemoryRealtimeBackend, WsRealtimeBackend};
pub use shared::dto::telemetry::{TelemetrySample, TelemetryUpdate, VehicleTelemetry};

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::core::error::{CoreError, Result};
use crate::core::service::RealtimeBackend;

fn vehicle_path(vehicle_id: &str) -> String {
    format!("vehicles/{vehicle_id}")
}

struct Subscriber {
    on_sample: Box<dyn Fn(TelemetrySample) + Send + Sync>,
    on_error: Box<dyn Fn(CoreError) + Send + Sync>,
}

struct VehicleFeed {
    subscribers: HashMap<u64, Arc<Subscriber>>,
    latest: Option<TelemetrySample>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct TelemetryState {
    feeds: HashMap<String, VehicleFeed>,
    next_id: u64,
}

/// Process-wide telemetry handle. Cheap to clone; clones share feeds.
#[derive(Clone)]
pub struct TelemetryChannel {
    backend: Arc<dyn RealtimeBackend>,
    state: Arc<RwLock<TelemetryState>>,
}

impl TelemetryChannel {
    pub fn new(backend: Arc<dyn RealtimeBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(TelemetryState::default())),
        }
    }

    /// Start observing a vehicle. Must be called from within a tokio
    /// runtime. The latest retained sample, if any, is delivered to the new
    /// subscriber right away; further samples arrive as the backend pushes
    /// them, until the returned handle is unsubscribed (or dropped).
    pub fn subscribe<S, E>(&self, vehicle_id: &str, on_sample: S, on_error: E) -> Subscription
    where
        S: Fn(TelemetrySample) + Send + Sync + 'static,
        E: Fn(CoreError) + Send + Sync + 'static,
    {
        let subscriber = Arc::new(Subscriber {
            on_sample: Box::new(on_sample),
            on_error: Box::new(on_error),
        });

        let (id, latest) = {
            let mut state = self.state.write();
            let id = state.next_id;
            state.next_id += 1;

            let feed = match state.feeds.entry(vehicle_id.to_string()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let receiver = self.backend.subscribe(&vehicle_path(vehicle_id));
                    let task =
                        spawn_feed(Arc::clone(&self.state), vehicle_id.to_string(), receiver);
                    tracing::debug!(vehicle_id, "telemetry feed opened");
                    entry.insert(VehicleFeed {
                        subscribers: HashMap::new(),
                        latest: None,
                        task,
                    })
                }
            };
            feed.subscribers.insert(id, Arc::clone(&subscriber));
            (id, feed.latest.clone())
        };

        if let Some(sample) = latest {
            (subscriber.on_sample)(sample);
        }

        Subscription {
            channel: self.clone(),
            vehicle_id: vehicle_id.to_string(),
            id,
            active: AtomicBool::new(true),
        }
    }

    /// Push this client's own position/load upstream as a partial merge:
    /// only the provided fields overwrite the remote record. An update with
    /// no fields is rejected before any write happens.
    pub async fn publish(&self, vehicle_id: &str, update: TelemetryUpdate) -> Result<()> {
        let fields = update.into_fields();
        if fields.is_empty() {
            return Err(CoreError::Validation(format!(
                "telemetry update for {vehicle_id} has no fields"
            )));
        }
        self.backend.merge(&vehicle_path(vehicle_id), fields).await
    }

    /// Tear down every feed. Part of logout: subscriptions must not outlive
    /// the identity they were opened under.
    pub fn shutdown(&self) {
        let mut state = self.state.write();
        for (vehicle_id, feed) in state.feeds.drain() {
            feed.task.abort();
            tracing::debug!(vehicle_id = %vehicle_id, "telemetry feed torn down");
        }
    }

    /// Number of vehicles with a live upstream feed.
    pub fn active_vehicles(&self) -> usize {
        self.state.read().feeds.len()
    }

    fn remove_subscriber(&self, vehicle_id: &str, id: u64) {
        let mut state = self.state.write();
        let feed_empty = match state.feeds.get_mut(vehicle_id) {
            Some(feed) => {
                feed.subscribers.remove(&id);
                feed.subscribers.is_empty()
            }
            None => false,
        };
        if feed_empty {
            if let Some(feed) = state.feeds.remove(vehicle_id) {
                feed.task.abort();
                tracing::debug!(vehicle_id, "last subscriber gone, telemetry feed closed");
            }
        }
    }
}

/// Handle for one `(vehicle, subscriber)` pair. `unsubscribe` is idempotent
/// and also runs on drop, so a forgotten handle cannot leak its feed for
/// the rest of the session.
pub struct Subscription {
    channel: TelemetryChannel,
    vehicle_id: String,
    id: u64,
    active: AtomicBool,
}

impl Subscription {
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.channel.remove_subscriber(&self.vehicle_id, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

fn spawn_feed(
    state: Arc<RwLock<TelemetryState>>,
    vehicle_id: String,
    receiver: async_channel::Receiver<Result<Value>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(message) = receiver.recv().await {
            match message {
                Ok(value) => {
                    let telemetry: VehicleTelemetry = match serde_json::from_value(value) {
                        Ok(telemetry) => telemetry,
                        Err(e) => {
                            deliver_error(
                                &state,
                                &vehicle_id,
                                CoreError::Subscription(format!(
                                    "malformed snapshot for {vehicle_id}: {e}"
                                )),
                            );
                            continue;
                        }
                    };
                    let sample = TelemetrySample {
                        vehicle_id: vehicle_id.clone(),
                        latitude: telemetry.latitude,
                        longitude: telemetry.longitude,
                        load: telemetry.load,
                        observed_at: Utc::now(),
                    };
                    let subscribers = {
                        let mut state = state.write();
                        match state.feeds.get_mut(&vehicle_id) {
                            Some(feed) => {
                                feed.latest = Some(sample.clone());
                                feed.subscribers.values().cloned().collect::<Vec<_>>()
                            }
                            // Feed was torn down while a snapshot was in
                            // transit; nothing left to deliver to.
                            None => break,
                        }
                    };
                    for subscriber in subscribers {
                        (subscriber.on_sample)(sample.clone());
                    }
                }
                Err(error) => deliver_error(&state, &vehicle_id, error),
            }
        }
        tracing::debug!(vehicle_id = %vehicle_id, "telemetry feed ended");
    })
}

fn deliver_error(state: &Arc<RwLock<TelemetryState>>, vehicle_id: &str, error: CoreError) {
    let subscribers = state
        .read()
        .feeds
        .get(vehicle_id)
        .map(|feed| feed.subscribers.values().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    for subscriber in subscribers {
        (subscriber.on_error)(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn channel() -> (TelemetryChannel, Arc<MemoryRealtimeBackend>) {
        let backend = Arc::new(MemoryRealtimeBackend::default());
        (
            TelemetryChannel::new(backend.clone() as Arc<dyn RealtimeBackend>),
            backend,
        )
    }

    fn collector() -> (
        Arc<Mutex<Vec<TelemetrySample>>>,
        impl Fn(TelemetrySample) + Send + Sync + 'static,
    ) {
        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let samples = Arc::clone(&samples);
            move |sample| samples.lock().push(sample)
        };
        (samples, sink)
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_subscribe_receives_published_samples() {
        let (channel, _backend) = channel();
        let (samples, sink) = collector();
        let _subscription = channel.subscribe("v1", sink, |_| {});

        channel
            .publish(
                "v1",
                TelemetryUpdate {
                    latitude: Some(10.8),
                    longitude: Some(106.6),
                    load: Some(120.0),
                },
            )
            .await
            .unwrap();

        wait_until(|| !samples.lock().is_empty()).await;
        let sample = samples.lock()[0].clone();
        assert_eq!(sample.vehicle_id, "v1");
        assert_eq!(sample.latitude, 10.8);
        assert_eq!(sample.load, 120.0);
    }

    #[tokio::test]
    async fn test_samples_arrive_in_publish_order() {
        let (channel, _backend) = channel();
        let (samples, sink) = collector();
        let _subscription = channel.subscribe("v1", sink, |_| {});

        for load in [10.0, 20.0, 30.0] {
            channel
                .publish(
                    "v1",
                    TelemetryUpdate {
                        load: Some(load),
                        ..TelemetryUpdate::default()
                    },
                )
                .await
                .unwrap();
        }

        wait_until(|| samples.lock().len() == 3).await;
        let loads: Vec<f64> = samples.lock().iter().map(|s| s.load).collect();
        assert_eq!(loads, vec![10.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn test_new_subscriber_gets_latest_sample() {
        let (channel, _backend) = channel();
        channel
            .publish(
                "v2",
                TelemetryUpdate {
                    latitude: Some(1.0),
                    longitude: Some(2.0),
                    load: Some(5.0),
                },
            )
            .await
            .unwrap();

        // First subscriber primes the feed from the backend's current value.
        let (first_samples, first_sink) = collector();
        let _first = channel.subscribe("v2", first_sink, |_| {});
        wait_until(|| !first_samples.lock().is_empty()).await;

        // A late subscriber is served the retained sample synchronously.
        let (late_samples, late_sink) = collector();
        let _late = channel.subscribe("v2", late_sink, |_| {});
        assert_eq!(late_samples.lock().len(), 1);
        assert_eq!(late_samples.lock()[0].load, 5.0);
    }

    #[tokio::test]
    async fn test_empty_publish_rejected_without_write() {
        let (channel, backend) = channel();
        let result = channel.publish("v1", TelemetryUpdate::default()).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(backend.merge_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_merge_preserves_other_fields() {
        let (channel, backend) = channel();
        channel
            .publish(
                "v1",
                TelemetryUpdate {
                    latitude: Some(10.0),
                    longitude: Some(20.0),
                    load: None,
                },
            )
            .await
            .unwrap();
        channel
            .publish(
                "v1",
                TelemetryUpdate {
                    load: Some(75.0),
                    ..TelemetryUpdate::default()
                },
            )
            .await
            .unwrap();

        let record = backend.record("vehicles/v1").unwrap();
        assert_eq!(record["latitude"], 10.0);
        assert_eq!(record["longitude"], 20.0);
        assert_eq!(record["load"], 75.0);
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent_and_closes_feed() {
        let (channel, _backend) = channel();
        let (_samples, sink) = collector();
        let subscription = channel.subscribe("v1", sink, |_| {});
        assert_eq!(channel.active_vehicles(), 1);

        subscription.unsubscribe();
        subscription.unsubscribe();
        assert_eq!(channel.active_vehicles(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let (channel, _backend) = channel();
        {
            let (_samples, sink) = collector();
            let _subscription = channel.subscribe("v1", sink, |_| {});
            assert_eq!(channel.active_vehicles(), 1);
        }
        assert_eq!(channel.active_vehicles(), 0);
    }

    #[tokio::test]
    async fn test_one_feed_fans_out_to_many_subscribers() {
        let (channel, _backend) = channel();
        let (first_samples, first_sink) = collector();
        let (second_samples, second_sink) = collector();
        let _first = channel.subscribe("v1", first_sink, |_| {});
        let _second = channel.subscribe("v1", second_sink, |_| {});
        assert_eq!(channel.active_vehicles(), 1);

        channel
            .publish(
                "v1",
                TelemetryUpdate {
                    load: Some(42.0),
                    ..TelemetryUpdate::default()
                },
            )
            .await
            .unwrap();

        wait_until(|| !first_samples.lock().is_empty() && !second_samples.lock().is_empty()).await;
    }

    #[tokio::test]
    async fn test_shutdown_tears_down_every_feed() {
        let (channel, _backend) = channel();
        let (_s1, sink1) = collector();
        let (_s2, sink2) = collector();
        let _a = channel.subscribe("v1", sink1, |_| {});
        let _b = channel.subscribe("v2", sink2, |_| {});
        assert_eq!(channel.active_vehicles(), 2);

        channel.shutdown();
        assert_eq!(channel.active_vehicles(), 0);
    }
}
