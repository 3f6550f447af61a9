//! Integration tests for the event directory: pagination, filters, the
//! per-event cache, and the stale-response guard.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use evently_core::{
    Clock, Error, EventDraft, EventFilters, EventId, Role, SessionHandle,
};
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

    async fn login(&self, role: Role) {
        let user = fixtures::user("u-1", "Dana");
        let token = fixtures::jwt_for("u-1", role);
        self.gateway
            .add_account("dana@example.com", "secret", user, &token);

        let store = SessionStore::new(Arc::clone(&self.gateway), Arc::clone(&self.session));
        store.login("dana@example.com", "secret").await.unwrap();
    }

    /// Seven events across two pages: ev-1..ev-6 on page 1, ev-7 on page 2
    fn seed_seven(&self) {
        self.gateway.seed_events(
            (1..=7)
                .map(|n| {
                    let category = if n % 2 == 0 { "Music" } else { "Tech" };
                    fixtures::event_on(&format!("ev-{n}"), category, fixtures::day(6, n))
                })
                .collect(),
        );
    }
}

#[tokio::test]
async fn refresh_loads_first_page() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();

    directory.refresh().await.unwrap();

    let cursor = directory.cursor();
    assert_eq!(directory.events().len(), 6);
    assert_eq!(cursor.current_page, 1);
    assert_eq!(cursor.total_pages, 2);
    assert_eq!(cursor.total_events, 7);
    assert!(cursor.has_more);
}

#[tokio::test]
async fn filter_change_resets_to_page_one() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();

    directory.refresh().await.unwrap();
    directory.set_page(2).await.unwrap();
    assert_eq!(directory.cursor().current_page, 2);

    directory
        .set_filters(EventFilters {
            category: Some("Music".to_string()),
            ..EventFilters::none()
        })
        .await
        .unwrap();

    let cursor = directory.cursor();
    assert_eq!(cursor.current_page, 1);
    assert_eq!(cursor.total_events, 3);
    assert!(directory
        .events()
        .iter()
        .all(|event| event.category == "Music"));
}

#[tokio::test]
async fn out_of_range_page_request_is_clamped() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();

    directory.refresh().await.unwrap();
    directory.set_page(99).await.unwrap();

    let cursor = directory.cursor();
    assert_eq!(cursor.current_page, 2);
    assert_eq!(directory.events().len(), 1);
    assert!(!cursor.has_more);
}

#[tokio::test]
async fn superseded_listing_response_is_discarded() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();
    directory.refresh().await.unwrap();

    // Hold the next response open so a newer request can overtake it
    let release = h.gateway.hold_next_list();
    let stale = directory.refresh();
    let fresh = async {
        directory.set_page(2).await.unwrap();
        let _ = release.send(());
    };
    let (stale_result, ()) = tokio::join!(stale, fresh);

    // The stale response resolves without error and without effect
    stale_result.unwrap();
    assert_eq!(directory.cursor().current_page, 2);
    assert_eq!(directory.events().len(), 1);
    assert_eq!(directory.events()[0].id, EventId::from("ev-7"));
}

#[tokio::test]
async fn get_event_on_loaded_page_issues_no_remote_call() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();
    directory.refresh().await.unwrap();

    let event = directory
        .get_event(&EventId::from("ev-3"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(event.id, EventId::from("ev-3"));
    assert_eq!(h.gateway.calls.get_event(), 0);
}

#[tokio::test]
async fn get_event_cache_expires_after_one_minute() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();
    directory.refresh().await.unwrap();

    // ev-7 is not on the loaded page, so the first resolve goes remote
    let off_page = EventId::from("ev-7");
    directory.get_event(&off_page).await.unwrap().unwrap();
    assert_eq!(h.gateway.calls.get_event(), 1);

    // Within the TTL the cached snapshot is served
    h.clock.advance(chrono::Duration::seconds(59));
    directory.get_event(&off_page).await.unwrap().unwrap();
    assert_eq!(h.gateway.calls.get_event(), 1);

    // Past the TTL the entry is stale and refetched
    h.clock.advance(chrono::Duration::seconds(2));
    directory.get_event(&off_page).await.unwrap().unwrap();
    assert_eq!(h.gateway.calls.get_event(), 2);
}

#[tokio::test]
async fn invalidation_forces_the_next_resolve_to_go_remote() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();

    let off_page = EventId::from("ev-7");
    directory.get_event(&off_page).await.unwrap().unwrap();
    assert_eq!(h.gateway.calls.get_event(), 1);

    directory.invalidate(&off_page);

    directory.get_event(&off_page).await.unwrap().unwrap();
    assert_eq!(h.gateway.calls.get_event(), 2);
}

#[tokio::test]
async fn get_event_of_unknown_id_is_none() {
    let h = harness();
    h.seed_seven();
    let directory = h.directory();

    let resolved = directory.get_event(&EventId::from("ev-missing")).await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn create_event_prepends_and_fills_creator() {
    let h = harness();
    h.seed_seven();
    h.login(Role::Admin).await;
    let directory = h.directory();
    directory.refresh().await.unwrap();

    let draft = EventDraft {
        name: "Jazz Night".to_string(),
        description: "An evening of live jazz".to_string(),
        category: "Music".to_string(),
        date: fixtures::day(8, 20),
        venue: "Blue Note".to_string(),
        price: 40.0,
        image: None,
        created_by: None,
    };
    let created = directory.create_event(draft).await.unwrap();

    assert_eq!(created.created_by.as_ref().map(|id| id.as_str()), Some("u-1"));
    assert_eq!(directory.events()[0].id, created.id);
    assert_eq!(directory.cursor().total_events, 8);
}

#[tokio::test]
async fn failed_create_leaves_directory_unchanged() {
    let h = harness();
    h.seed_seven();
    h.login(Role::Admin).await;
    let directory = h.directory();
    directory.refresh().await.unwrap();

    h.gateway
        .fail_next(Error::Validation("Price must be non-negative".to_string()));
    let draft = EventDraft {
        name: "Broken".to_string(),
        description: String::new(),
        category: "Music".to_string(),
        date: fixtures::day(8, 20),
        venue: "Nowhere".to_string(),
        price: -1.0,
        image: None,
        created_by: None,
    };
    let result = directory.create_event(draft).await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(directory.events().len(), 6);
    assert_eq!(directory.cursor().total_events, 7);
}

#[tokio::test]
async fn update_event_replaces_in_place() {
    let h = harness();
    h.seed_seven();
    h.login(Role::Admin).await;
    let directory = h.directory();
    directory.refresh().await.unwrap();

    let id = EventId::from("ev-2");
    let draft = EventDraft {
        name: "Renamed Festival".to_string(),
        description: "Updated".to_string(),
        category: "Music".to_string(),
        date: fixtures::day(6, 2),
        venue: "Riverside Park".to_string(),
        price: 30.0,
        image: None,
        created_by: None,
    };
    let updated = directory.update_event(&id, draft).await.unwrap();

    assert_eq!(updated.name, "Renamed Festival");
    let on_page = directory
        .events()
        .into_iter()
        .find(|event| event.id == id)
        .unwrap();
    assert_eq!(on_page.name, "Renamed Festival");
    assert_eq!(directory.events().len(), 6);
}

#[tokio::test]
async fn delete_event_purges_page_cache_and_bookings() {
    let h = harness();
    h.seed_seven();
    h.login(Role::Admin).await;
    let directory = h.directory();
    let bookings = h.bookings();

    h.gateway
        .seed_bookings(vec![fixtures::booking("bk-1", "ev-1", "u-1")]);
    directory.refresh().await.unwrap();
    bookings.load_for_user().await.unwrap();

    let id = EventId::from("ev-1");
    directory.get_event(&id).await.unwrap().unwrap();
    assert!(bookings.is_booked(&id));

    directory.delete_event(&id, &bookings).await.unwrap();

    assert!(!directory.contains(&id));
    assert_eq!(directory.cursor().total_events, 6);
    assert!(!bookings.is_booked(&id));
    // The cache entry is gone too: resolving now asks the server, which
    // no longer has the event
    assert!(directory.get_event(&id).await.unwrap().is_none());
}
