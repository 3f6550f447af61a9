//! The booking index: which events the active identity has booked.

use evently_core::{Booking, Error, Event, EventId, Gateway, Result, SessionHandle};
use std::sync::{Arc, RwLock};

use crate::directory::EventDirectory;

/// Membership index over the active identity's bookings
///
/// The set is loaded whole and mutated optimistically: a successful booking
/// appends the server's record, a failed one leaves the set untouched. All
/// membership answers are scoped to the active identity; with no session
/// the set behaves as empty.
pub struct BookingIndex<G> {
    gateway: Arc<G>,
    session: Arc<SessionHandle>,
    state: RwLock<Vec<Booking>>,
}

impl<G: Gateway> BookingIndex<G> {
    /// Create an empty index
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<SessionHandle>) -> Self {
        Self {
            gateway,
            session,
            state: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Booking>> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Booking>> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The currently loaded bookings
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        self.read().clone()
    }

    /// Fetch all bookings of the active identity
    ///
    /// Without a session the set is simply emptied; that is not an error.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors; the local set is unchanged on failure.
    pub async fn load_for_user(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            self.write().clear();
            return Ok(());
        }

        let bookings = self.gateway.my_bookings().await?;
        tracing::debug!(count = bookings.len(), "Loaded bookings");
        *self.write() = bookings;
        Ok(())
    }

    /// Whether the active identity has booked the given event
    ///
    /// Always false when unauthenticated, and false for any event absent
    /// from the loaded set.
    #[must_use]
    pub fn is_booked(&self, event_id: &EventId) -> bool {
        let Some(user_id) = self.session.user_id() else {
            return false;
        };
        self.read()
            .iter()
            .any(|booking| &booking.event_id == event_id && booking.user_id == user_id)
    }

    /// Book an event for the active identity
    ///
    /// Fails before any network call when no identity is active, or when
    /// the event is not in the directory's currently known set (a stale or
    /// removed listing must not be bookable). On success the server's
    /// booking record is appended to the local set; on any failure,
    /// including a duplicate booking, the set is unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthenticated`] without a session; [`Error::NotFound`]
    /// for an unknown event; [`Error::Conflict`] when the pair is already
    /// booked; other gateway errors pass through.
    pub async fn book(&self, event_id: &EventId, directory: &EventDirectory<G>) -> Result<Booking> {
        if !self.session.is_authenticated() {
            return Err(Error::Unauthenticated);
        }
        if !directory.contains(event_id) {
            return Err(Error::not_found("Event", event_id.as_str()));
        }

        let booking = self.gateway.book_event(event_id).await?;
        tracing::debug!(event = %event_id, booking = %booking.id, "Booked event");
        self.write().push(booking.clone());
        Ok(booking)
    }

    /// Resolve the loaded bookings to their full events for display
    ///
    /// Resolution goes through the directory so fresh cache entries and
    /// the loaded page are reused. A booking whose event can no longer be
    /// resolved is skipped with a warning rather than failing the whole
    /// list; the remaining bookings still resolve.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthenticated`] without a session.
    pub async fn resolve_booked_events(
        &self,
        directory: &EventDirectory<G>,
    ) -> Result<Vec<Event>> {
        if !self.session.is_authenticated() {
            return Err(Error::Unauthenticated);
        }

        let bookings = self.bookings();
        let mut events = Vec::with_capacity(bookings.len());
        for booking in &bookings {
            match directory.get_event(&booking.event_id).await {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {
                    tracing::warn!(event = %booking.event_id, "Booked event no longer exists, skipping");
                },
                Err(e) => {
                    tracing::warn!(event = %booking.event_id, error = %e, "Booked event failed to resolve, skipping");
                },
            }
        }
        Ok(events)
    }

    /// Drop every booking referencing the given event
    ///
    /// Called by the directory when an event is deleted.
    pub fn remove_event(&self, event_id: &EventId) {
        let mut bookings = self.write();
        let before = bookings.len();
        bookings.retain(|booking| &booking.event_id != event_id);
        let removed = before - bookings.len();
        if removed > 0 {
            tracing::debug!(event = %event_id, removed, "Purged bookings for deleted event");
        }
    }

    /// Empty the local set (on logout)
    pub fn clear(&self) {
        self.write().clear();
    }
}

impl<G> std::fmt::Debug for BookingIndex<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bookings = self
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f.debug_struct("BookingIndex")
            .field("bookings", &bookings.len())
            .finish_non_exhaustive()
    }
}
