//! # Session Store
//!
//! Holds the authenticated identity and bearer token, persisted so a
//! restart restores the session without re-authentication. Process-wide
//! singleton; mutated only by login, logout, and device-token refresh.
//! Consumers must re-read the token per call rather than caching it, so a
//! logout takes effect on the very next outbound request.

mod storage;

pub use storage::{FileSessionStorage, MemorySessionStorage};

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::dto::auth::Role;

use crate::core::error::Result;
use crate::core::service::SessionStorage;

/// The authenticated session. `device_token` is the push-provider messaging
/// token registered for this device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub device_token: Option<String>,
}

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    /// Load the persisted session, if any. Called once at startup, before
    /// any UI decides between the login and main screens.
    pub fn restore(&self) -> Result<bool> {
        let restored = self.storage.load()?;
        let found = restored.is_some();
        *self.current.write() = restored;
        Ok(found)
    }

    pub fn set_session(&self, session: Session) -> Result<()> {
        self.storage.save(&session)?;
        *self.current.write() = Some(session);
        Ok(())
    }

    /// Forget the session. Idempotent; clearing an absent session is a
    /// no-op. Cache flush and telemetry teardown are driven by the owner
    /// of the sign-out (`Core::logout` or the gateway's auth-expired path).
    pub fn clear_session(&self) -> Result<()> {
        // In-memory state goes first: even if the storage backend fails,
        // the next outbound call must see no token.
        *self.current.write() = None;
        self.storage.clear()
    }

    /// Current bearer token. Callers attach this per request.
    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.user_id.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.current.read().as_ref().map(|s| s.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Refresh the device messaging token. Without an active session there
    /// is nothing to attach it to; the next login carries it instead.
    pub fn set_device_token(&self, token: &str) -> Result<()> {
        let updated = {
            let mut current = self.current.write();
            match current.as_mut() {
                Some(session) => {
                    session.device_token = Some(token.to_string());
                    Some(session.clone())
                }
                None => None,
            }
        };
        match updated {
            Some(session) => self.storage.save(&session),
            None => {
                tracing::debug!("device token refreshed with no active session");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            token: "jwt-abc".into(),
            user_id: "u1".into(),
            username: "driver-one".into(),
            role: Role::Driver,
            device_token: Some("fcm-1".into()),
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemorySessionStorage::default()))
    }

    #[test]
    fn test_set_and_clear_session() {
        let store = store();
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);

        store.set_session(session()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("jwt-abc"));
        assert_eq!(store.role(), Some(Role::Driver));

        store.clear_session().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
        // Idempotent.
        store.clear_session().unwrap();
    }

    #[test]
    fn test_restore_round_trips_through_storage() {
        let storage = Arc::new(MemorySessionStorage::default());
        let first = SessionStore::new(storage.clone());
        first.set_session(session()).unwrap();

        // A new store over the same storage sees the persisted session.
        let second = SessionStore::new(storage);
        assert!(!second.is_authenticated());
        assert!(second.restore().unwrap());
        assert_eq!(second.session(), Some(session()));
    }

    #[test]
    fn test_device_token_refresh_updates_session() {
        let store = store();
        store.set_session(session()).unwrap();
        store.set_device_token("fcm-2").unwrap();
        assert_eq!(
            store.session().unwrap().device_token.as_deref(),
            Some("fcm-2")
        );
    }

    #[test]
    fn test_device_token_without_session_is_noop() {
        let store = store();
        store.set_device_token("fcm-2").unwrap();
        assert!(store.session().is_none());
    }
}
