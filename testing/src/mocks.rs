//! Mock implementations of the environment traits.

use chrono::{DateTime, Duration, Utc};
use evently_core::{Clock, CredentialStore, Error, StoredSession};
use std::sync::RwLock;

/// Controllable clock for deterministic tests
///
/// Starts at a fixed instant and only moves when told to, making cache TTL
/// behavior reproducible.
///
/// # Example
///
/// ```
/// use evently_testing::mocks::FixedClock;
/// use evently_core::Clock;
/// use chrono::{Duration, Utc};
///
/// let clock = FixedClock::new(Utc::now());
/// let before = clock.now();
/// clock.advance(Duration::seconds(61));
/// assert_eq!(clock.now(), before + Duration::seconds(61));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    time: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock frozen at the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: RwLock::new(time),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut time = self
            .time
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *time += by;
    }

    /// Set the clock to an absolute time
    pub fn set(&self, to: DateTime<Utc>) {
        let mut time = self
            .time
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *time = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .time
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// In-memory credential store
///
/// Behaves like the durable client storage without touching the
/// filesystem. `load` after `clear` returns `None`, like the real thing.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: RwLock<Option<StoredSession>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a session record
    #[must_use]
    pub const fn with_session(session: StoredSession) -> Self {
        Self {
            record: RwLock::new(Some(session)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<StoredSession> {
        self.record
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn save(&self, session: &StoredSession) -> Result<(), Error> {
        let mut record = self
            .record
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *record = Some(session.clone());
        Ok(())
    }

    fn clear(&self) {
        let mut record = self
            .record
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *record = None;
    }
}
