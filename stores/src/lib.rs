//! # Evently Stores
//!
//! Stateful components of the Evently client, generic over the gateway:
//!
//! - [`SessionStore`]: login, registration, logout, profile management
//! - [`EventDirectory`]: paginated, filtered event listing with a
//!   short-lived per-event cache
//! - [`BookingIndex`]: the active identity's booking set
//! - [`UserRoster`]: the admin-facing user list
//!
//! Each store holds its state behind a lock that is never held across a
//! network call; reads are full-value clones. Cross-store effects (a
//! deleted event purging bookings, a booked-events view resolving through
//! the directory) are wired by passing the peer store to the method that
//! needs it, so the stores compose without reference cycles.

pub mod bookings;
pub mod directory;
pub mod roster;
pub mod session;

pub use bookings::BookingIndex;
pub use directory::EventDirectory;
pub use roster::UserRoster;
pub use session::SessionStore;
