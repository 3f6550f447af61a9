//! The remote gateway abstraction.
//!
//! Every network interaction goes through one implementation of
//! [`Gateway`]; the stores never see transport details. The production
//! implementation lives in `evently-gateway`; tests script responses
//! through the mock in `evently-testing`.

use crate::error::Result;
use crate::filters::EventFilters;
use crate::page::PageCursor;
use crate::types::{
    Booking, Event, EventDraft, EventId, ImageFile, ProfileUpdate, User, UserId,
};

/// One page of events plus the updated cursor
#[derive(Clone, Debug, PartialEq)]
pub struct EventPage {
    /// The events on this page, at most `cursor.page_size` of them
    pub events: Vec<Event>,
    /// Updated pagination cursor
    pub cursor: PageCursor,
}

/// Successful login response: the profile and its bearer token
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    /// The authenticated user profile
    pub user: User,
    /// Opaque bearer token for subsequent requests
    pub token: String,
}

/// The sole egress point for all remote calls
///
/// Implementations attach the bearer token (when present) to every
/// request, clear the shared session on an unauthorized response, and map
/// HTTP failures to the [`crate::Error`] taxonomy. Every call is
/// fire-once: no retries, no queuing.
#[allow(async_fn_in_trait)]
pub trait Gateway: Send + Sync {
    /// Authenticate with credentials
    ///
    /// # Errors
    ///
    /// [`crate::Error::Auth`] on invalid credentials; network and parse
    /// errors pass through.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome>;

    /// Register a new account
    ///
    /// A success here creates no session; callers follow up with
    /// [`Gateway::login`].
    ///
    /// # Errors
    ///
    /// [`crate::Error::Registration`] when the server rejects the account
    /// (e.g. duplicate email).
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()>;

    /// Fetch one page of events matching the filters
    ///
    /// # Errors
    ///
    /// Network, parse, and API errors per the taxonomy.
    async fn list_events(
        &self,
        page: u32,
        page_size: u32,
        filters: &EventFilters,
    ) -> Result<EventPage>;

    /// Fetch a single event; `None` when the server has no such event
    ///
    /// # Errors
    ///
    /// Network, parse, and API errors per the taxonomy. A missing event is
    /// not an error.
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>>;

    /// Create an event (admin only, enforced server side)
    ///
    /// # Errors
    ///
    /// [`crate::Error::Validation`] on a malformed draft; network and API
    /// errors pass through.
    async fn create_event(&self, draft: &EventDraft) -> Result<Event>;

    /// Update an event (admin only, enforced server side)
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] when the event no longer exists;
    /// [`crate::Error::Validation`] on a malformed draft.
    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> Result<Event>;

    /// Delete an event (admin only, enforced server side)
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] when the event no longer exists.
    async fn delete_event(&self, id: &EventId) -> Result<()>;

    /// Fetch all bookings of the active identity
    ///
    /// # Errors
    ///
    /// [`crate::Error::Unauthenticated`] when no valid token accompanies
    /// the request.
    async fn my_bookings(&self) -> Result<Vec<Booking>>;

    /// Book an event for the active identity
    ///
    /// # Errors
    ///
    /// [`crate::Error::Conflict`] when the pair is already booked;
    /// [`crate::Error::NotFound`] when the event is gone.
    async fn book_event(&self, id: &EventId) -> Result<Booking>;

    /// Fetch all users (admin only, enforced server side)
    ///
    /// # Errors
    ///
    /// Network, parse, and API errors per the taxonomy.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Flip a user's role between user and admin (admin only)
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] when the user does not exist.
    async fn toggle_role(&self, id: &UserId) -> Result<User>;

    /// Upload a profile image, returning its hosted URL
    ///
    /// # Errors
    ///
    /// [`crate::Error::Validation`] when the server rejects the file.
    async fn upload_profile_image(&self, file: &ImageFile) -> Result<String>;

    /// Update the active user's own profile
    ///
    /// # Errors
    ///
    /// [`crate::Error::Unauthenticated`] when no valid token accompanies
    /// the request.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User>;

    /// Delete the active user's account
    ///
    /// # Errors
    ///
    /// [`crate::Error::Unauthenticated`] when no valid token accompanies
    /// the request.
    async fn delete_account(&self) -> Result<()>;
}
