//! Integration tests for the booking index: membership, optimistic
//! insertion, and resolution of booked events through the directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use evently_core::{Clock, Error, EventId, Role, SessionHandle};
use evently_stores::{BookingIndex, EventDirectory, SessionStore};
use evently_testing::{fixtures, FixedClock, MemoryCredentialStore, MockGateway};
use std::sync::Arc;

struct Harness {
    session: Arc<SessionHandle>,
    gateway: Arc<MockGateway>,
    clock: Arc<FixedClock>,
}

fn harness() -> Harness {
    evently_testing::init_tracing();
    let storage = Arc::new(MemoryCredentialStore::new());
    let session = Arc::new(SessionHandle::new(storage));
    let clock = Arc::new(evently_testing::test_clock());
    let gateway = Arc::new(MockGateway::new(Arc::clone(&session), Arc::clone(&clock)));
    Harness {
        session,
        gateway,
        clock,
    }
}

impl Harness {
    fn directory(&self) -> EventDirectory<MockGateway> {
        EventDirectory::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.session),
            Arc::clone(&self.clock) as Arc<dyn Clock>,
        )
    }

    fn bookings(&self) -> BookingIndex<MockGateway> {
        BookingIndex::new(Arc::clone(&self.gateway), Arc::clone(&self.session))
    }

    async fn login(&self) {
        let user = fixtures::user("u-1", "Dana");
        let token = fixtures::jwt_for("u-1", Role::User);
        self.gateway
            .add_account("dana@example.com", "secret", user, &token);

        let store = SessionStore::new(Arc::clone(&self.gateway), Arc::clone(&self.session));
        store.login("dana@example.com", "secret").await.unwrap();
    }
}

#[tokio::test]
async fn load_without_identity_yields_empty_set() {
    let h = harness();
    h.gateway
        .seed_bookings(vec![fixtures::booking("bk-1", "ev-1", "u-1")]);
    let bookings = h.bookings();

    bookings.load_for_user().await.unwrap();

    assert!(bookings.bookings().is_empty());
    assert_eq!(h.gateway.calls.my_bookings(), 0);
}

#[tokio::test]
async fn load_fetches_only_own_bookings() {
    let h = harness();
    h.login().await;
    h.gateway.seed_bookings(vec![
        fixtures::booking("bk-1", "ev-1", "u-1"),
        fixtures::booking("bk-2", "ev-2", "u-other"),
    ]);
    let bookings = h.bookings();

    bookings.load_for_user().await.unwrap();

    assert_eq!(bookings.bookings().len(), 1);
    assert!(bookings.is_booked(&EventId::from("ev-1")));
    assert!(!bookings.is_booked(&EventId::from("ev-2")));
}

#[tokio::test]
async fn is_booked_is_false_without_identity() {
    let h = harness();
    let bookings = h.bookings();
    assert!(!bookings.is_booked(&EventId::from("ev-1")));
}

#[tokio::test]
async fn unauthenticated_booking_fails_before_any_network_call() {
    let h = harness();
    h.gateway.seed_events(vec![fixtures::event("ev-1", "Music")]);
    let directory = h.directory();
    directory.refresh().await.unwrap();
    let bookings = h.bookings();

    let result = bookings.book(&EventId::from("ev-1"), &directory).await;

    assert!(matches!(result, Err(Error::Unauthenticated)));
    assert_eq!(h.gateway.calls.book_event(), 0);
}

#[tokio::test]
async fn booking_an_unknown_event_fails_before_any_network_call() {
    let h = harness();
    h.login().await;
    h.gateway.seed_events(vec![fixtures::event("ev-1", "Music")]);
    let directory = h.directory();
    directory.refresh().await.unwrap();
    let bookings = h.bookings();

    let result = bookings.book(&EventId::from("ev-stale"), &directory).await;

    assert!(matches!(result, Err(Error::NotFound { .. })));
    assert_eq!(h.gateway.calls.book_event(), 0);
}

#[tokio::test]
async fn successful_booking_appends_to_the_set() {
    let h = harness();
    h.login().await;
    h.gateway.seed_events(vec![fixtures::event("ev-1", "Music")]);
    let directory = h.directory();
    directory.refresh().await.unwrap();
    let bookings = h.bookings();

    let id = EventId::from("ev-1");
    let booking = bookings.book(&id, &directory).await.unwrap();

    assert_eq!(booking.event_id, id);
    assert!(bookings.is_booked(&id));
    assert_eq!(bookings.bookings().len(), 1);
}

#[tokio::test]
async fn double_booking_conflicts_and_leaves_the_set_unchanged() {
    let h = harness();
    h.login().await;
    h.gateway.seed_events(vec![fixtures::event("ev-1", "Music")]);
    let directory = h.directory();
    directory.refresh().await.unwrap();
    let bookings = h.bookings();

    let id = EventId::from("ev-1");
    bookings.book(&id, &directory).await.unwrap();
    let second = bookings.book(&id, &directory).await;

    assert!(matches!(second, Err(Error::Conflict(_))));
    assert_eq!(bookings.bookings().len(), 1);
}

#[tokio::test]
async fn resolution_requires_an_identity() {
    let h = harness();
    let directory = h.directory();
    let bookings = h.bookings();

    let result = bookings.resolve_booked_events(&directory).await;
    assert!(matches!(result, Err(Error::Unauthenticated)));
}

#[tokio::test]
async fn resolution_skips_bookings_whose_event_is_gone() {
    let h = harness();
    h.login().await;
    h.gateway.seed_events(vec![
        fixtures::event("ev-1", "Music"),
        fixtures::event("ev-2", "Tech"),
    ]);
    h.gateway.seed_bookings(vec![
        fixtures::booking("bk-1", "ev-1", "u-1"),
        fixtures::booking("bk-2", "ev-gone", "u-1"),
        fixtures::booking("bk-3", "ev-2", "u-1"),
    ]);
    let directory = h.directory();
    directory.refresh().await.unwrap();
    let bookings = h.bookings();
    bookings.load_for_user().await.unwrap();

    let resolved = bookings.resolve_booked_events(&directory).await.unwrap();

    let ids: Vec<&str> = resolved.iter().map(|event| event.id.as_str()).collect();
    assert_eq!(ids, vec!["ev-1", "ev-2"]);
}

#[tokio::test]
async fn clear_empties_the_set() {
    let h = harness();
    h.login().await;
    h.gateway
        .seed_bookings(vec![fixtures::booking("bk-1", "ev-1", "u-1")]);
    let bookings = h.bookings();
    bookings.load_for_user().await.unwrap();
    assert_eq!(bookings.bookings().len(), 1);

    bookings.clear();
    assert!(bookings.bookings().is_empty());
}
