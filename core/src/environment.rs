//! Environment traits — injected dependencies for the stores.
//!
//! All ambient facilities the stores depend on (time, durable client
//! storage) sit behind traits so tests can substitute deterministic
//! implementations.

use crate::error::Error;
use crate::types::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Clock trait - abstracts time operations for testability
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The durable session record: current user plus bearer token
///
/// Both fields are persisted and cleared together, never independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// The authenticated user profile
    pub user: User,
    /// Opaque bearer token
    pub token: String,
}

/// Durable client storage for the session record
///
/// Implementations are synchronous: the record is small and lives on the
/// client machine (a file, a keychain entry). `load` treats corrupt data as
/// absent — a damaged record must never prevent the process from starting
/// unauthenticated.
pub trait CredentialStore: Send + Sync {
    /// Read the stored session, if a valid one exists
    fn load(&self) -> Option<StoredSession>;

    /// Persist the session record
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] when the record cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), Error>;

    /// Remove the stored record; idempotent
    fn clear(&self);
}

/// File-backed credential store writing one JSON record
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store writing to the given path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> Option<StoredSession> {
        let bytes = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Discarding corrupt session record");
                None
            },
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), Error> {
        let bytes = serde_json::to_vec(session)
            .map_err(|e| Error::Storage(e.to_string()))?;
        std::fs::write(&self.path, bytes).map_err(|e| Error::Storage(e.to_string()))
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to clear session record");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Role, UserId};

    fn sample_user() -> User {
        User {
            id: UserId::from("u-1"),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            role: Role::User,
            profile_image_url: None,
        }
    }

    #[test]
    fn file_store_round_trips_session() {
        let dir = std::env::temp_dir().join("evently-core-test-roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let store = JsonFileStore::new(dir.join("session.json"));

        let session = StoredSession {
            user: sample_user(),
            token: "token-1".to_string(),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.clear();
        assert_eq!(store.load(), None);
        // Clearing twice is fine
        store.clear();
    }

    #[test]
    fn corrupt_record_is_discarded() {
        let dir = std::env::temp_dir().join("evently-core-test-corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = JsonFileStore::new(path);
        assert_eq!(store.load(), None);
    }
}
