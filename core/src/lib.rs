//! # Evently Core
//!
//! Domain types, errors, and environment traits for the Evently client.
//!
//! This crate is the leaf of the workspace: it defines what an event, a
//! booking, and a session *are*, the shared error taxonomy, and the traits
//! behind which the stateful stores reach their dependencies.
//!
//! ## Core Concepts
//!
//! - **Types**: server-assigned identifiers, [`Event`], [`Booking`],
//!   [`User`], filter criteria, and the pagination cursor
//! - **Gateway**: the single egress trait for all remote calls
//! - **Session**: the shared handle over the active identity and token
//! - **Environment**: [`Clock`] and [`CredentialStore`] traits so time and
//!   durable storage stay testable
//!
//! ## Architecture Principles
//!
//! - One owner per piece of shared state, full-value replacement on change
//! - Explicit dependency injection, no ambient globals
//! - Typed errors that pass through unchanged unless context can be added

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod claims;
pub mod environment;
pub mod error;
pub mod filters;
pub mod gateway;
pub mod page;
pub mod session;
pub mod types;

pub use claims::TokenClaims;
pub use environment::{Clock, CredentialStore, JsonFileStore, StoredSession, SystemClock};
pub use error::{Error, Result};
pub use filters::{BookedFilter, EventFilters, SortDirection};
pub use gateway::{EventPage, Gateway, LoginOutcome};
pub use page::{PageCursor, DEFAULT_PAGE_SIZE};
pub use session::SessionHandle;
pub use types::{
    Booking, BookingId, Event, EventDraft, EventId, ImageFile, ImageSource, ProfileUpdate,
    Role, User, UserId,
};
