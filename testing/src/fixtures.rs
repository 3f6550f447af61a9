//! Sample data builders for tests.

use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use evently_core::{Booking, BookingId, Event, EventId, Role, User, UserId};

/// A user profile with the given id and name
#[must_use]
pub fn user(id: &str, name: &str) -> User {
    User {
        id: UserId::from(id),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role: Role::User,
        profile_image_url: None,
    }
}

/// An admin profile with the given id
#[must_use]
pub fn admin(id: &str) -> User {
    User {
        role: Role::Admin,
        ..user(id, "Admin")
    }
}

/// A fixed date inside the test window
///
/// # Panics
///
/// Never panics for the hardcoded arguments used here.
#[must_use]
#[allow(clippy::expect_used)]
pub fn day(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, 18, 0, 0)
        .single()
        .expect("hardcoded date should always be valid")
}

/// An event with the given id and category on the given date
#[must_use]
pub fn event_on(id: &str, category: &str, date: DateTime<Utc>) -> Event {
    Event {
        id: EventId::from(id),
        name: format!("Event {id}"),
        description: "A test event".to_string(),
        category: category.to_string(),
        date,
        venue: "Riverside Park".to_string(),
        price: 25.0,
        image_url: None,
        created_by: None,
    }
}

/// An event with the given id and category on a fixed date
#[must_use]
pub fn event(id: &str, category: &str) -> Event {
    event_on(id, category, day(6, 15))
}

/// A booking linking the given user to the given event
#[must_use]
pub fn booking(id: &str, event_id: &str, user_id: &str) -> Booking {
    Booking {
        id: BookingId::from(id),
        event_id: EventId::from(event_id),
        user_id: UserId::from(user_id),
        status: "confirmed".to_string(),
        booked_at: day(5, 1),
    }
}

/// An unsigned JWT whose payload carries the given subject and role
///
/// The client never verifies signatures, so a fixed header and a dummy
/// signature segment are enough for claim decoding.
#[must_use]
pub fn jwt_for(user_id: &str, role: Role) -> String {
    let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = engine.encode(format!(r#"{{"id":"{user_id}","role":"{role}"}}"#));
    format!("{header}.{payload}.test-signature")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use evently_core::TokenClaims;

    #[test]
    fn jwt_fixture_decodes_to_its_role() {
        let token = jwt_for("u-1", Role::Admin);
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.derived_role(), Role::Admin);
        assert_eq!(claims.id.as_deref(), Some("u-1"));
    }
}
