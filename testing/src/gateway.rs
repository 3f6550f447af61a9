//! Scripted in-memory gateway.
//!
//! [`MockGateway`] implements the full [`Gateway`] trait against in-memory
//! collections, with the same error behavior as the HTTP implementation:
//! bad credentials fail with [`Error::Auth`], duplicate bookings with
//! [`Error::Conflict`], and an expired token clears the shared session.
//! Tests can script one-off failures, count remote fetches, and hold a
//! listing response open to exercise the stale-response guard.

use crate::mocks::FixedClock;
use evently_core::{
    Booking, BookingId, Clock, Error, Event, EventDraft, EventFilters, EventId, EventPage,
    Gateway, ImageFile, ImageSource, LoginOutcome, PageCursor, ProfileUpdate, Result, Role,
    SessionHandle, SortDirection, User, UserId,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// A registered account the mock will accept credentials for
#[derive(Clone, Debug)]
struct Account {
    email: String,
    password: String,
    user: User,
    token: String,
}

/// Remote-fetch counters, one per read operation tests care about
#[derive(Debug, Default)]
pub struct CallCounts {
    list_events: AtomicUsize,
    get_event: AtomicUsize,
    my_bookings: AtomicUsize,
    book_event: AtomicUsize,
}

impl CallCounts {
    /// Number of `list_events` calls issued so far
    #[must_use]
    pub fn list_events(&self) -> usize {
        self.list_events.load(Ordering::SeqCst)
    }

    /// Number of `get_event` calls issued so far
    #[must_use]
    pub fn get_event(&self) -> usize {
        self.get_event.load(Ordering::SeqCst)
    }

    /// Number of `my_bookings` calls issued so far
    #[must_use]
    pub fn my_bookings(&self) -> usize {
        self.my_bookings.load(Ordering::SeqCst)
    }

    /// Number of `book_event` calls issued so far
    #[must_use]
    pub fn book_event(&self) -> usize {
        self.book_event.load(Ordering::SeqCst)
    }
}

/// In-memory implementation of the remote gateway
pub struct MockGateway {
    session: Arc<SessionHandle>,
    clock: Arc<FixedClock>,
    accounts: Mutex<Vec<Account>>,
    events: Mutex<Vec<Event>>,
    bookings: Mutex<Vec<Booking>>,
    users: Mutex<Vec<User>>,
    scripted_failures: Mutex<VecDeque<Error>>,
    held_list: Mutex<Option<oneshot::Receiver<()>>>,
    token_expired: Mutex<bool>,
    next_id: AtomicU64,
    /// Remote-fetch counters
    pub calls: CallCounts,
}

impl MockGateway {
    /// Create an empty mock sharing the given session handle
    #[must_use]
    pub fn new(session: Arc<SessionHandle>, clock: Arc<FixedClock>) -> Self {
        Self {
            session,
            clock,
            accounts: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            bookings: Mutex::new(Vec::new()),
            users: Mutex::new(Vec::new()),
            scripted_failures: Mutex::new(VecDeque::new()),
            held_list: Mutex::new(None),
            token_expired: Mutex::new(false),
            next_id: AtomicU64::new(1),
            calls: CallCounts::default(),
        }
    }

    /// Register an account the mock will accept at login
    pub fn add_account(&self, email: &str, password: &str, user: User, token: &str) {
        self.lock_accounts().push(Account {
            email: email.to_string(),
            password: password.to_string(),
            user,
            token: token.to_string(),
        });
    }

    /// Seed the server-side event collection
    pub fn seed_events(&self, events: Vec<Event>) {
        *self.lock_events() = events;
    }

    /// Seed the server-side booking collection
    pub fn seed_bookings(&self, bookings: Vec<Booking>) {
        *self.lock_bookings() = bookings;
    }

    /// Seed the server-side user roster
    pub fn seed_users(&self, users: Vec<User>) {
        *self.lock_users() = users;
    }

    /// Make the next call fail with the given error
    pub fn fail_next(&self, error: Error) {
        self.lock(&self.scripted_failures).push_back(error);
    }

    /// Make the next authenticated call behave like an expired token:
    /// the session is cleared and the call fails unauthenticated
    pub fn expire_token(&self) {
        *self.lock(&self.token_expired) = true;
    }

    /// Hold the next `list_events` response until the returned sender
    /// fires (or is dropped), to let a newer request overtake it
    #[must_use]
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.lock(&self.held_list) = Some(rx);
        tx
    }

    /// The server-side events, for assertions
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.lock_events().clone()
    }

    /// The server-side bookings, for assertions
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        self.lock_bookings().clone()
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_accounts(&self) -> std::sync::MutexGuard<'_, Vec<Account>> {
        self.lock(&self.accounts)
    }

    fn lock_events(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        self.lock(&self.events)
    }

    fn lock_bookings(&self) -> std::sync::MutexGuard<'_, Vec<Booking>> {
        self.lock(&self.bookings)
    }

    fn lock_users(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.lock(&self.users)
    }

    fn take_scripted(&self) -> Option<Error> {
        self.lock(&self.scripted_failures).pop_front()
    }

    /// The active user per the shared session, after simulating token
    /// expiry when scripted
    fn require_auth(&self) -> Result<UserId> {
        let expired = {
            let mut flag = self.lock(&self.token_expired);
            std::mem::take(&mut *flag)
        };
        if expired {
            self.session.clear();
            return Err(Error::Unauthenticated);
        }
        self.session.user_id().ok_or(Error::Unauthenticated)
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{n}")
    }

    fn apply_filters(events: &[Event], filters: &EventFilters) -> Vec<Event> {
        let mut matching: Vec<Event> = events
            .iter()
            .filter(|event| {
                filters
                    .category
                    .as_ref()
                    .is_none_or(|category| &event.category == category)
            })
            .filter(|event| {
                filters
                    .start_date
                    .is_none_or(|start| event.date.date_naive() >= start)
            })
            .filter(|event| {
                filters
                    .end_date
                    .is_none_or(|end| event.date.date_naive() <= end)
            })
            .cloned()
            .collect();

        match filters.sort.unwrap_or_default() {
            SortDirection::Ascending => matching.sort_by_key(|event| event.date),
            SortDirection::Descending => {
                matching.sort_by_key(|event| std::cmp::Reverse(event.date));
            },
        }
        matching
    }
}

impl Gateway for MockGateway {
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }

        let accounts = self.lock_accounts();
        accounts
            .iter()
            .find(|account| account.email == email && account.password == password)
            .map(|account| LoginOutcome {
                user: account.user.clone(),
                token: account.token.clone(),
            })
            .ok_or(Error::Auth)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }

        let id = self.fresh_id("user");
        let mut accounts = self.lock_accounts();
        if accounts.iter().any(|account| account.email == email) {
            return Err(Error::Registration("Email already in use".to_string()));
        }

        let user = User {
            id: UserId::new(id.clone()),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::User,
            profile_image_url: None,
        };
        accounts.push(Account {
            email: email.to_string(),
            password: password.to_string(),
            user,
            token: crate::fixtures::jwt_for(&id, Role::User),
        });
        Ok(())
    }

    async fn list_events(
        &self,
        page: u32,
        page_size: u32,
        filters: &EventFilters,
    ) -> Result<EventPage> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.calls.list_events.fetch_add(1, Ordering::SeqCst);

        let gate = self.lock(&self.held_list).take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        let matching = Self::apply_filters(&self.lock_events(), filters);

        let total = matching.len() as u64;
        let size = page_size.max(1);
        let total_pages = u32::try_from(total.div_ceil(u64::from(size))).unwrap_or(u32::MAX).max(1);
        let start = (page.saturating_sub(1) * size) as usize;
        let events: Vec<Event> = matching
            .into_iter()
            .skip(start)
            .take(size as usize)
            .collect();

        Ok(EventPage {
            events,
            cursor: PageCursor {
                current_page: page,
                page_size,
                total_pages,
                total_events: total,
                has_more: page < total_pages,
            },
        })
    }

    async fn get_event(&self, id: &EventId) -> Result<Option<Event>> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.calls.get_event.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .lock_events()
            .iter()
            .find(|event| &event.id == id)
            .cloned())
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.require_auth()?;

        let event = Event {
            id: EventId::new(self.fresh_id("ev")),
            name: draft.name.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            date: draft.date,
            venue: draft.venue.clone(),
            price: draft.price,
            image_url: match &draft.image {
                Some(ImageSource::Url(url)) => Some(url.clone()),
                Some(ImageSource::File(file)) => {
                    Some(format!("https://cdn.test/{}", file.file_name))
                },
                None => None,
            },
            created_by: draft.created_by.clone(),
        };
        self.lock_events().push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> Result<Event> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.require_auth()?;

        let mut events = self.lock_events();
        let existing = events
            .iter_mut()
            .find(|event| &event.id == id)
            .ok_or_else(|| Error::not_found("Event", id))?;

        existing.name = draft.name.clone();
        existing.description = draft.description.clone();
        existing.category = draft.category.clone();
        existing.date = draft.date;
        existing.venue = draft.venue.clone();
        existing.price = draft.price;
        if let Some(ImageSource::Url(url)) = &draft.image {
            existing.image_url = Some(url.clone());
        }
        Ok(existing.clone())
    }

    async fn delete_event(&self, id: &EventId) -> Result<()> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.require_auth()?;

        let mut events = self.lock_events();
        let before = events.len();
        events.retain(|event| &event.id != id);
        if events.len() == before {
            return Err(Error::not_found("Event", id));
        }
        drop(events);

        // The server cascades: bookings of a deleted event disappear too
        self.lock_bookings().retain(|booking| &booking.event_id != id);
        Ok(())
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        let user_id = self.require_auth()?;
        self.calls.my_bookings.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .lock_bookings()
            .iter()
            .filter(|booking| booking.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn book_event(&self, id: &EventId) -> Result<Booking> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        let user_id = self.require_auth()?;
        self.calls.book_event.fetch_add(1, Ordering::SeqCst);

        if !self.lock_events().iter().any(|event| &event.id == id) {
            return Err(Error::not_found("Event", id));
        }

        let mut bookings = self.lock_bookings();
        let duplicate = bookings
            .iter()
            .any(|booking| &booking.event_id == id && booking.user_id == user_id);
        if duplicate {
            return Err(Error::Conflict(
                "You have already booked this event".to_string(),
            ));
        }

        let booking = Booking {
            id: BookingId::new(self.fresh_id("bk")),
            event_id: id.clone(),
            user_id,
            status: "confirmed".to_string(),
            booked_at: self.clock.now(),
        };
        bookings.push(booking.clone());
        Ok(booking)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.require_auth()?;
        Ok(self.lock_users().clone())
    }

    async fn toggle_role(&self, id: &UserId) -> Result<User> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.require_auth()?;

        let mut users = self.lock_users();
        let user = users
            .iter_mut()
            .find(|user| &user.id == id)
            .ok_or_else(|| Error::not_found("User", id))?;
        user.role = user.role.toggled();
        Ok(user.clone())
    }

    async fn upload_profile_image(&self, file: &ImageFile) -> Result<String> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.require_auth()?;
        Ok(format!("https://cdn.test/{}", file.file_name))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        self.require_auth()?;

        let mut user = self.session.user().ok_or(Error::Unauthenticated)?;
        user.name.clone_from(&update.name);
        match &update.image {
            Some(ImageSource::Url(url)) => user.profile_image_url = Some(url.clone()),
            Some(ImageSource::File(file)) => {
                user.profile_image_url = Some(format!("https://cdn.test/{}", file.file_name));
            },
            None => {},
        }
        Ok(user)
    }

    async fn delete_account(&self) -> Result<()> {
        if let Some(error) = self.take_scripted() {
            return Err(error);
        }
        let user_id = self.require_auth()?;
        self.lock_accounts().retain(|account| account.user.id != user_id);
        Ok(())
    }
}

impl std::fmt::Debug for MockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGateway").finish_non_exhaustive()
    }
}
