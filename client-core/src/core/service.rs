//! # Service Traits
//!
//! Traits for dependency injection at the external seams, enabling better
//! testability and modularity. Production implementations live next to the
//! component that owns the seam; in-memory implementations back the tests.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::error::Result;
use crate::feedback::Feedback;
use crate::session::Session;

/// Consumer of user-visible call outcomes (toasts).
///
/// The gateway forwards every call result here exactly once; the sink is a
/// pure side-effect consumer and never feeds back into the data model.
pub trait FeedbackSink: Send + Sync {
    fn push(&self, feedback: Feedback);

    fn success(&self, message: &str) {
        self.push(Feedback::success(message));
    }

    fn error(&self, message: &str) {
        self.push(Feedback::error(message));
    }
}

/// Durable, origin-scoped storage for the authenticated session, read on
/// cold start to decide initial authenticated state before any UI is shown.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Realtime-database seam used by the telemetry channel.
///
/// Records live at path-like keys (`vehicles/{vehicleId}`); reads are
/// whole-object snapshots, writes are partial-field merges.
#[async_trait]
pub trait RealtimeBackend: Send + Sync {
    /// Merge `fields` into the record at `path`, creating it if absent.
    async fn merge(&self, path: &str, fields: Map<String, Value>) -> Result<()>;

    /// Subscribe to snapshots of the record at `path`. The current value, if
    /// any, is delivered first; dropping the receiver ends the subscription.
    fn subscribe(&self, path: &str) -> async_channel::Receiver<Result<Value>>;
}
