//! # Core Wiring
//!
//! The process-scoped aggregate owning the singletons: session store,
//! resource cache, telemetry channel, gateway, and notification router.
//! Explicit lifecycle: `init` restores the persisted session before any
//! UI decision is made, `logout` clears identity-scoped state everywhere.
//! Components are injected at the seams (`SessionStorage`,
//! `RealtimeBackend`, `FeedbackSink`) so each can be replaced in tests.

pub mod error;
pub mod service;

use std::sync::Arc;

use crate::cache::ResourceCache;
use crate::config::CoreConfig;
use crate::core::error::Result;
use crate::core::service::{FeedbackSink, RealtimeBackend, SessionStorage};
use crate::feedback::{ChannelFeedback, Feedback};
use crate::push::NotificationRouter;
use crate::services::api::client::Gateway;
use crate::services::telemetry::{TelemetryChannel, WsRealtimeBackend};
use crate::session::{FileSessionStorage, MemorySessionStorage, SessionStore};

pub struct Core {
    session: Arc<SessionStore>,
    cache: ResourceCache,
    telemetry: TelemetryChannel,
    gateway: Gateway,
    router: NotificationRouter,
    feedback: Arc<dyn FeedbackSink>,
}

impl Core {
    /// Wire the singletons and restore the persisted session. Called once
    /// at app start, before the first screen is chosen.
    pub fn init(
        config: CoreConfig,
        storage: Arc<dyn SessionStorage>,
        backend: Arc<dyn RealtimeBackend>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Result<Self> {
        let session = Arc::new(SessionStore::new(storage));
        let restored = session.restore()?;
        tracing::info!(restored, "session restore complete");

        let cache = ResourceCache::new(config.cache.clone());
        let telemetry = TelemetryChannel::new(backend);
        let gateway = Gateway::new(
            &config,
            Arc::clone(&session),
            cache.clone(),
            telemetry.clone(),
            Arc::clone(&feedback),
        );
        let router = NotificationRouter::new(cache.clone());

        Ok(Self {
            session,
            cache,
            telemetry,
            gateway,
            router,
            feedback,
        })
    }

    /// `init` with the production defaults: a session file under the
    /// platform config dir (in-memory when the platform has none), the
    /// websocket realtime backend, and a channel feedback sink whose
    /// receiver is handed back for the UI to drain.
    pub fn bootstrap(config: CoreConfig) -> Result<(Self, async_channel::Receiver<Feedback>)> {
        let storage: Arc<dyn SessionStorage> = match config
            .session_file
            .clone()
            .or_else(FileSessionStorage::default_path)
        {
            Some(path) => Arc::new(FileSessionStorage::new(path)),
            None => Arc::new(MemorySessionStorage::default()),
        };
        let backend = Arc::new(WsRealtimeBackend::new(config.realtime_url.clone()));
        let (feedback, feedback_rx) = ChannelFeedback::new();
        let core = Self::init(config, storage, backend, Arc::new(feedback))?;
        Ok((core, feedback_rx))
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn telemetry(&self) -> &TelemetryChannel {
        &self.telemetry
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn router(&self) -> &NotificationRouter {
        &self.router
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Sign out. Clears the persisted session, flushes every cached
    /// resource (all of it is potentially role-scoped), and tears down
    /// every telemetry subscription. Safe to call when already signed out.
    pub fn logout(&self) -> Result<()> {
        self.session.clear_session()?;
        self.cache.flush();
        self.telemetry.shutdown();
        self.feedback.success("Logged out successfully");
        tracing::info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResourceKey;
    use crate::feedback::NullFeedback;
    use crate::services::telemetry::{MemoryRealtimeBackend, TelemetryUpdate};
    use crate::session::Session;
    use serde_json::{json, Value};
    use shared::dto::auth::Role;

    fn test_core() -> Core {
        Core::init(
            CoreConfig::default(),
            Arc::new(MemorySessionStorage::default()),
            Arc::new(MemoryRealtimeBackend::default()),
            Arc::new(NullFeedback),
        )
        .unwrap()
    }

    fn session() -> Session {
        Session {
            token: "jwt".into(),
            user_id: "u1".into(),
            username: "dispatcher-one".into(),
            role: Role::Dispatcher,
            device_token: None,
        }
    }

    #[tokio::test]
    async fn test_logout_clears_session_cache_and_telemetry() {
        let core = test_core();
        core.session().set_session(session()).unwrap();

        let key = ResourceKey::from(["orders"]);
        let _: Value = core
            .cache()
            .fetch(key.clone(), || async { Ok(json!([])) })
            .await
            .unwrap();
        let subscription = core.telemetry().subscribe("v1", |_| {}, |_| {});

        assert!(core.is_authenticated());
        assert!(core.cache().read(&key).is_some());
        assert_eq!(core.telemetry().active_vehicles(), 1);

        core.logout().unwrap();

        assert!(!core.is_authenticated());
        assert!(core.session().token().is_none());
        assert!(core.cache().read(&key).is_none());
        assert_eq!(core.telemetry().active_vehicles(), 0);

        // Logout is idempotent.
        core.logout().unwrap();
        subscription.unsubscribe();
    }

    #[tokio::test]
    async fn test_init_restores_persisted_session() {
        let storage = Arc::new(MemorySessionStorage::default());
        {
            let first = Core::init(
                CoreConfig::default(),
                storage.clone(),
                Arc::new(MemoryRealtimeBackend::default()),
                Arc::new(NullFeedback),
            )
            .unwrap();
            first.session().set_session(session()).unwrap();
        }

        let second = Core::init(
            CoreConfig::default(),
            storage,
            Arc::new(MemoryRealtimeBackend::default()),
            Arc::new(NullFeedback),
        )
        .unwrap();
        assert!(second.is_authenticated());
        assert_eq!(second.session().user_id().as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_driver_can_publish_after_login() {
        let core = test_core();
        core.session().set_session(session()).unwrap();
        core.telemetry()
            .publish(
                "v1",
                TelemetryUpdate {
                    latitude: Some(10.0),
                    longitude: Some(106.0),
                    load: Some(80.0),
                },
            )
            .await
            .unwrap();
    }
}
