//! The event directory: a paginated, filtered view over the remote event
//! collection with a short-lived per-event cache.

use chrono::{DateTime, Utc};
use evently_core::{
    Clock, Event, EventDraft, EventFilters, EventId, Gateway, PageCursor, Result,
    SessionHandle, DEFAULT_PAGE_SIZE,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::bookings::BookingIndex;

/// How long a cached event snapshot stays fresh
const CACHE_TTL_SECS: i64 = 60;

/// A cached event snapshot and when it was fetched
#[derive(Clone, Debug)]
struct CacheEntry {
    event: Event,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        (now - self.fetched_at).num_seconds() < CACHE_TTL_SECS
    }
}

#[derive(Debug)]
struct DirectoryState {
    events: Vec<Event>,
    filters: EventFilters,
    cursor: PageCursor,
    cache: HashMap<EventId, CacheEntry>,
}

/// Paginated, filtered, cached view over the remote event collection
///
/// The directory owns its state exclusively and replaces it whole on every
/// change; locks are never held across a network call. Concurrent fetches
/// are serialized by outcome, not by cancellation: every fetch carries a
/// sequence number and a response is applied only while it is still the
/// newest one issued, so a slow superseded response can never overwrite
/// fresher state.
pub struct EventDirectory<G> {
    gateway: Arc<G>,
    session: Arc<SessionHandle>,
    clock: Arc<dyn Clock>,
    state: RwLock<DirectoryState>,
    issued: AtomicU64,
}

impl<G: Gateway> EventDirectory<G> {
    /// Create an empty directory with the default page size
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<SessionHandle>, clock: Arc<dyn Clock>) -> Self {
        Self::with_page_size(gateway, session, clock, DEFAULT_PAGE_SIZE)
    }

    /// Create an empty directory with a custom page size
    #[must_use]
    pub fn with_page_size(
        gateway: Arc<G>,
        session: Arc<SessionHandle>,
        clock: Arc<dyn Clock>,
        page_size: u32,
    ) -> Self {
        Self {
            gateway,
            session,
            clock,
            state: RwLock::new(DirectoryState {
                events: Vec::new(),
                filters: EventFilters::none(),
                cursor: PageCursor::initial(page_size.max(1)),
                cache: HashMap::new(),
            }),
            issued: AtomicU64::new(0),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, DirectoryState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, DirectoryState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The currently loaded page of events
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.read().events.clone()
    }

    /// The current pagination cursor
    #[must_use]
    pub fn cursor(&self) -> PageCursor {
        self.read().cursor
    }

    /// The current filter criteria
    #[must_use]
    pub fn filters(&self) -> EventFilters {
        self.read().filters.clone()
    }

    /// Whether an event is present on the currently loaded page
    #[must_use]
    pub fn contains(&self, id: &EventId) -> bool {
        self.read().events.iter().any(|event| &event.id == id)
    }

    /// Fetch the current page with the current filters
    ///
    /// # Errors
    ///
    /// Propagates gateway errors for the most recent request; a response
    /// that has been superseded by a newer request is discarded silently.
    pub async fn refresh(&self) -> Result<()> {
        let (page, page_size, filters) = {
            let state = self.read();
            (
                state.cursor.current_page,
                state.cursor.page_size,
                state.filters.clone(),
            )
        };
        self.fetch(page, page_size, filters).await
    }

    /// Replace the filter criteria and reload from page 1
    ///
    /// A filter change mid-pagination must never show page N of an
    /// unrelated result set, so the page always resets.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors from the reload.
    pub async fn set_filters(&self, filters: EventFilters) -> Result<()> {
        {
            let mut state = self.write();
            state.filters = filters;
            state.cursor.current_page = 1;
        }
        self.refresh().await
    }

    /// Move to another page and reload
    ///
    /// The requested page is clamped into `[1, total_pages]` before any
    /// fetch is issued.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors from the reload.
    pub async fn set_page(&self, page: u32) -> Result<()> {
        {
            let mut state = self.write();
            let clamped = state.cursor.clamp_page(page);
            if clamped != page {
                tracing::debug!(requested = page, clamped, "Clamped page request");
            }
            state.cursor.current_page = clamped;
        }
        self.refresh().await
    }

    /// Change the page size and reload
    ///
    /// # Errors
    ///
    /// Propagates gateway errors from the reload.
    pub async fn set_page_size(&self, page_size: u32) -> Result<()> {
        {
            let mut state = self.write();
            state.cursor.page_size = page_size.max(1);
        }
        self.refresh().await
    }

    async fn fetch(&self, page: u32, page_size: u32, filters: EventFilters) -> Result<()> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(seq, page, page_size, "Fetching events page");

        let result = self.gateway.list_events(page, page_size, &filters).await;

        if self.issued.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, "Discarding superseded events response");
            return Ok(());
        }

        let fetched = result?;
        let mut state = self.write();
        state.events = fetched.events;
        state.cursor = fetched.cursor;
        Ok(())
    }

    /// Resolve a single event
    ///
    /// Resolution order: fresh cache entry, then the currently loaded
    /// page, then a remote fetch. Every path refreshes the cache entry's
    /// timestamp. Returns `None` when the gateway has no such event.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors from the remote fetch.
    pub async fn get_event(&self, id: &EventId) -> Result<Option<Event>> {
        let now = self.clock.now();

        {
            let state = self.read();
            if let Some(entry) = state.cache.get(id) {
                if entry.is_fresh(now) {
                    return Ok(Some(entry.event.clone()));
                }
            }
        }

        let local = {
            let state = self.read();
            state.events.iter().find(|event| &event.id == id).cloned()
        };
        if let Some(event) = local {
            self.cache_entry(event.clone(), now);
            return Ok(Some(event));
        }

        match self.gateway.get_event(id).await? {
            Some(event) => {
                self.cache_entry(event.clone(), now);
                Ok(Some(event))
            },
            None => Ok(None),
        }
    }

    /// Drop the cache entry for one event
    ///
    /// Called after updates and deletes so stale data is never served.
    pub fn invalidate(&self, id: &EventId) {
        let mut state = self.write();
        if state.cache.remove(id).is_some() {
            tracing::debug!(event = %id, "Invalidated cache entry");
        }
    }

    fn cache_entry(&self, event: Event, now: DateTime<Utc>) {
        let mut state = self.write();
        state.cache.insert(
            event.id.clone(),
            CacheEntry {
                event,
                fetched_at: now,
            },
        );
    }

    /// Create an event and prepend it to the loaded page
    ///
    /// The creator identity is filled in from the active session when the
    /// draft does not carry one. On failure the local list is unchanged.
    ///
    /// # Errors
    ///
    /// Propagates gateway errors; the server enforces the admin
    /// requirement and draft validation.
    pub async fn create_event(&self, mut draft: EventDraft) -> Result<Event> {
        if draft.created_by.is_none() {
            draft.created_by = self.session.user_id();
        }

        let event = self.gateway.create_event(&draft).await?;
        tracing::debug!(event = %event.id, "Created event");

        let mut state = self.write();
        state.events.insert(0, event.clone());
        state.cursor.total_events += 1;
        drop(state);
        Ok(event)
    }

    /// Update an event, replacing it in place on the loaded page
    ///
    /// The cache entry is invalidated so the next read sees the server's
    /// version. On failure the local list is unchanged.
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::NotFound`] when the event no longer exists
    /// remotely;
    /// other gateway errors pass through.
    pub async fn update_event(&self, id: &EventId, mut draft: EventDraft) -> Result<Event> {
        if draft.created_by.is_none() {
            draft.created_by = self.session.user_id();
        }

        let updated = self.gateway.update_event(id, &draft).await?;
        tracing::debug!(event = %id, "Updated event");

        let mut state = self.write();
        if let Some(slot) = state.events.iter_mut().find(|event| &event.id == id) {
            *slot = updated.clone();
        }
        state.cache.remove(id);
        drop(state);
        Ok(updated)
    }

    /// Delete an event, removing it from the page, the cache, and the
    /// given booking index
    ///
    /// On failure all local state is unchanged.
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::NotFound`] when the event no longer exists
    /// remotely;
    /// other gateway errors pass through.
    pub async fn delete_event(&self, id: &EventId, bookings: &BookingIndex<G>) -> Result<()> {
        self.gateway.delete_event(id).await?;
        tracing::debug!(event = %id, "Deleted event");

        {
            let mut state = self.write();
            state.events.retain(|event| &event.id != id);
            state.cursor.total_events = state.cursor.total_events.saturating_sub(1);
            state.cache.remove(id);
        }
        bookings.remove_event(id);
        Ok(())
    }
}

impl<G> std::fmt::Debug for EventDirectory<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f.debug_struct("EventDirectory")
            .field("events", &state.events.len())
            .field("cursor", &state.cursor)
            .finish_non_exhaustive()
    }
}
