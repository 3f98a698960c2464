//! # Notification Router
//!
//! Translates asynchronous push events into cache invalidations and,
//! depending on how the notification reached us, a navigation intent for
//! the embedding application to act on. Pure dispatch table, no state: the
//! same normalized event routes the same way whether it arrived in the
//! foreground, was tapped from the background, or launched the app cold.

use serde_json::Value;

use crate::cache::{ResourceCache, ResourceKey};

/// How the push event reached the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryContext {
    /// Arrived while the app was visible; refresh data, do not navigate.
    Foreground,
    /// The user tapped the notification while the app was backgrounded.
    Background,
    /// The notification launched the app from a dead process.
    ColdStart,
}

/// Normalized push event. `kind` is kept raw so an unrecognized value
/// degrades to the default route instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: String,
    pub ref_id: Option<String>,
    pub context: DeliveryContext,
}

impl NotificationEvent {
    /// Normalize a provider payload (`data` map with `type` and `refId`).
    /// Payloads without a `type` are malformed and yield `None`; they are
    /// dropped without ever surfacing an error to the user.
    pub fn from_payload(data: &Value, context: DeliveryContext) -> Option<Self> {
        let kind = data.get("type")?.as_str()?.to_string();
        let ref_id = data
            .get("refId")
            .or_else(|| data.get("ref_id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(Self {
            kind,
            ref_id,
            context,
        })
    }
}

/// Where the embedding application should navigate for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    OrderDetail(String),
    RouteDetail(String),
    DispatchDetail(String),
    /// Default location for system messages and anything unrecognized.
    Home,
}

pub struct NotificationRouter {
    cache: ResourceCache,
}

impl NotificationRouter {
    pub fn new(cache: ResourceCache) -> Self {
        Self { cache }
    }

    /// Route one event: invalidate the prefixes implied by its kind and
    /// return the navigation intent when the delivery context asks for one
    /// (cold start, or tapped from the background). Never panics; an
    /// unrecognized kind invalidates nothing and routes home.
    pub fn on_event(&self, event: &NotificationEvent) -> Option<NavigationIntent> {
        let intent = match (event.kind.to_ascii_lowercase().as_str(), &event.ref_id) {
            ("order", Some(ref_id)) => {
                // Both the detail and every list that may contain it.
                self.cache
                    .invalidate(&ResourceKey::from(["orders", ref_id.as_str()]));
                self.cache.invalidate(&ResourceKey::from(["orders"]));
                self.invalidate_feed();
                NavigationIntent::OrderDetail(ref_id.clone())
            }
            ("route", Some(ref_id)) => {
                self.cache
                    .invalidate(&ResourceKey::from(["routes", ref_id.as_str()]));
                self.invalidate_feed();
                NavigationIntent::RouteDetail(ref_id.clone())
            }
            ("dispatch", Some(ref_id)) => {
                self.cache
                    .invalidate(&ResourceKey::from(["dispatches", ref_id.as_str()]));
                self.invalidate_feed();
                NavigationIntent::DispatchDetail(ref_id.clone())
            }
            ("system", _) => {
                self.invalidate_feed();
                NavigationIntent::Home
            }
            (kind, _) => {
                tracing::debug!(kind, "dropping unrecognized notification kind");
                NavigationIntent::Home
            }
        };

        match event.context {
            DeliveryContext::ColdStart | DeliveryContext::Background => Some(intent),
            DeliveryContext::Foreground => None,
        }
    }

    /// Every delivered push corresponds to a new persisted notification
    /// record, so the notification feed is refreshed alongside.
    fn invalidate_feed(&self) {
        self.cache.invalidate(&ResourceKey::from(["notifications"]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use serde_json::json;

    async fn populated_cache() -> ResourceCache {
        let cache = ResourceCache::new(CacheConfig::default());
        let keys = [
            ResourceKey::from(["orders"]),
            ResourceKey::from(["orders", "X"]),
            ResourceKey::from(["orders", "pending"]),
            ResourceKey::from(["routes", "r1"]),
            ResourceKey::from(["dispatches", "d1"]),
            ResourceKey::from(["notifications"]),
            ResourceKey::from(["depots"]),
        ];
        for key in keys {
            let _: Value = cache
                .fetch(key, || async { Ok(json!({})) })
                .await
                .unwrap();
        }
        cache
    }

    fn event(kind: &str, ref_id: &str, context: DeliveryContext) -> NotificationEvent {
        NotificationEvent {
            kind: kind.to_string(),
            ref_id: Some(ref_id.to_string()),
            context,
        }
    }

    // ========== Routing Table ==========

    #[tokio::test]
    async fn test_order_event_invalidates_orders_and_navigates() {
        let cache = populated_cache().await;
        let router = NotificationRouter::new(cache.clone());

        let intent = router.on_event(&event("order", "X", DeliveryContext::ColdStart));
        assert_eq!(intent, Some(NavigationIntent::OrderDetail("X".into())));

        assert!(cache.read(&ResourceKey::from(["orders"])).is_none());
        assert!(cache.read(&ResourceKey::from(["orders", "X"])).is_none());
        assert!(cache.read(&ResourceKey::from(["orders", "pending"])).is_none());
        assert!(cache.read(&ResourceKey::from(["notifications"])).is_none());
        // Unrelated resources untouched.
        assert!(cache.read(&ResourceKey::from(["depots"])).is_some());
        assert!(cache.read(&ResourceKey::from(["routes", "r1"])).is_some());
    }

    #[tokio::test]
    async fn test_route_and_dispatch_targets_do_not_overlap() {
        let cache = populated_cache().await;
        let router = NotificationRouter::new(cache.clone());

        router.on_event(&event("route", "r1", DeliveryContext::Background));
        assert!(cache.read(&ResourceKey::from(["routes", "r1"])).is_none());
        assert!(cache.read(&ResourceKey::from(["dispatches", "d1"])).is_some());

        router.on_event(&event("dispatch", "d1", DeliveryContext::Background));
        assert!(cache.read(&ResourceKey::from(["dispatches", "d1"])).is_none());
    }

    #[tokio::test]
    async fn test_foreground_event_invalidates_without_navigation() {
        let cache = populated_cache().await;
        let router = NotificationRouter::new(cache.clone());

        let intent = router.on_event(&event("order", "X", DeliveryContext::Foreground));
        assert_eq!(intent, None);
        assert!(cache.read(&ResourceKey::from(["orders", "X"])).is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_kind_invalidates_nothing() {
        let cache = populated_cache().await;
        let router = NotificationRouter::new(cache.clone());

        let intent = router.on_event(&event("promotion", "p1", DeliveryContext::ColdStart));
        assert_eq!(intent, Some(NavigationIntent::Home));

        assert!(cache.read(&ResourceKey::from(["orders"])).is_some());
        assert!(cache.read(&ResourceKey::from(["notifications"])).is_some());
    }

    #[tokio::test]
    async fn test_event_kind_is_case_insensitive() {
        let cache = populated_cache().await;
        let router = NotificationRouter::new(cache.clone());

        // Provider payloads carry the enum name in upper case.
        let intent = router.on_event(&event("ORDER", "X", DeliveryContext::ColdStart));
        assert_eq!(intent, Some(NavigationIntent::OrderDetail("X".into())));
    }

    // ========== Payload Normalization ==========

    #[test]
    fn test_from_payload_normalizes_all_contexts() {
        let data = json!({"type": "ORDER", "refId": "o7"});
        for context in [
            DeliveryContext::Foreground,
            DeliveryContext::Background,
            DeliveryContext::ColdStart,
        ] {
            let event = NotificationEvent::from_payload(&data, context).unwrap();
            assert_eq!(event.kind, "ORDER");
            assert_eq!(event.ref_id.as_deref(), Some("o7"));
            assert_eq!(event.context, context);
        }
    }

    #[test]
    fn test_from_payload_drops_malformed() {
        assert!(
            NotificationEvent::from_payload(&json!({"refId": "o7"}), DeliveryContext::Foreground)
                .is_none()
        );
        assert!(
            NotificationEvent::from_payload(&json!("not an object"), DeliveryContext::Foreground)
                .is_none()
        );
    }
}
