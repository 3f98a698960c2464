//! Session persistence backends.

use std::fs;
use std::io;
use std::path::PathBuf;

use parking_lot::RwLock;

use crate::core::error::{CoreError, Result};
use crate::core::service::SessionStorage;
use crate::session::Session;

/// JSON file under the platform config directory. The desktop analogue of
/// the mobile client's secure store: owner-readable only on unix.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config dir>/haulpoint/session.json`, when the platform reports a
    /// config directory at all.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("haulpoint").join("session.json"))
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::Storage(format!("read {:?}: {e}", self.path))),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt session file must not brick startup; treat it
                // as signed out.
                tracing::warn!(path = ?self.path, error = %e, "discarding unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::Storage(format!("create {parent:?}: {e}")))?;
        }
        let raw = serde_json::to_string_pretty(session)
            .map_err(|e| CoreError::Storage(format!("encode session: {e}")))?;
        fs::write(&self.path, raw)
            .map_err(|e| CoreError::Storage(format!("write {:?}: {e}", self.path)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(&self.path, permissions) {
                tracing::warn!(path = ?self.path, error = %e, "failed to restrict session file permissions");
            }
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Storage(format!("remove {:?}: {e}", self.path))),
        }
    }
}

/// In-memory storage for tests and ephemeral (incognito-style) sessions.
#[derive(Default)]
pub struct MemorySessionStorage {
    session: RwLock<Option<Session>>,
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.read().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.write() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.write() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dto::auth::Role;

    fn session() -> Session {
        Session {
            token: "jwt".into(),
            user_id: "u9".into(),
            username: "customer-nine".into(),
            role: Role::Customer,
            device_token: None,
        }
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));

        assert_eq!(storage.load().unwrap(), None);
        storage.save(&session()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session()));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        // Clearing twice is fine.
        storage.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileSessionStorage::new(path);
        assert_eq!(storage.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileSessionStorage::new(path.clone());
        storage.save(&session()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
