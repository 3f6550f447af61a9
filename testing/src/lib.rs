//! # Evently Testing
//!
//! Testing utilities and mock implementations for the Evently client.
//!
//! This crate provides:
//! - [`mocks::FixedClock`]: deterministic time for cache TTL tests
//! - [`mocks::MemoryCredentialStore`]: durable storage without a filesystem
//! - [`gateway::MockGateway`]: the full gateway contract over in-memory
//!   collections, with scripted failures, fetch counters, and a hold gate
//!   for exercising the stale-response guard
//! - [`fixtures`]: sample users, events, bookings, and unsigned JWTs
//!
//! ## Example
//!
//! ```
//! use evently_core::{Gateway, SessionHandle};
//! use evently_testing::{fixtures, gateway::MockGateway, mocks};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let storage = Arc::new(mocks::MemoryCredentialStore::new());
//! let session = Arc::new(SessionHandle::new(storage));
//! let clock = Arc::new(mocks::test_clock());
//! let gateway = MockGateway::new(Arc::clone(&session), clock);
//!
//! gateway.seed_events(vec![fixtures::event("ev-1", "Music")]);
//! let page = gateway
//!     .list_events(1, 6, &evently_core::EventFilters::none())
//!     .await
//!     .unwrap();
//! assert_eq!(page.events.len(), 1);
//! # });
//! ```

pub mod fixtures;
pub mod gateway;
pub mod mocks;

// Re-export commonly used items
pub use gateway::MockGateway;
pub use mocks::{test_clock, FixedClock, MemoryCredentialStore};

/// Install a fmt subscriber honoring `RUST_LOG` for test output
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
