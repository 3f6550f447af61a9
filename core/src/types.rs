//! Domain types for the Evently client.
//!
//! Identifiers are server-assigned opaque strings; the client never mints
//! them. Wire field names follow the remote API (camelCase, `_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a server-assigned identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id! {
    /// Unique identifier for an event
    EventId
}

string_id! {
    /// Unique identifier for a user
    UserId
}

string_id! {
    /// Unique identifier for a booking
    BookingId
}

// ============================================================================
// Users and roles
// ============================================================================

/// Role of an authenticated user
///
/// Authorization decisions derive the role from the bearer token claims, not
/// from this stored field (see [`crate::claims`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user: browse and book events
    #[default]
    User,
    /// Administrator: manage events and user roles
    Admin,
}

impl Role {
    /// Check whether this role grants administrative access
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// The opposite role (used by the admin role toggle)
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::User => Self::Admin,
            Self::Admin => Self::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A user profile as returned by the remote API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Email address (unique per account)
    pub email: String,
    /// Display-only role cache; the token claim is authoritative
    #[serde(default)]
    pub role: Role,
    /// Hosted profile image, if one was uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

// ============================================================================
// Events
// ============================================================================

/// A bookable event as returned by the remote API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Server-assigned identifier, stable across edits
    #[serde(rename = "_id")]
    pub id: EventId,
    /// Event name
    pub name: String,
    /// Long-form description
    pub description: String,
    /// Category label used for filtering (e.g. "Music")
    pub category: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue name
    pub venue: String,
    /// Ticket price; non-negative
    pub price: f64,
    /// Hosted image for the event card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Identity that created the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

/// Binary image data submitted as part of a multipart form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    /// Original file name, forwarded to the server
    pub file_name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// MIME type, if known (e.g. `image/jpeg`)
    pub content_type: Option<String>,
}

/// Image attached to an event or profile submission
///
/// A submission carries either an uploaded file or an external URL, never
/// both; the variant makes the exclusivity structural. When the caller has
/// both at hand, the file wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Binary upload, sent as a multipart file part
    File(ImageFile),
    /// External image URL, sent as a plain form field
    Url(String),
}

/// Fields submitted when creating or updating an event
///
/// Sent to the server as a multipart form; `image` becomes either a file
/// part or an `imageUrl` field depending on its variant.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDraft {
    /// Event name
    pub name: String,
    /// Long-form description
    pub description: String,
    /// Category label
    pub category: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue name
    pub venue: String,
    /// Ticket price; the server rejects negative values
    pub price: f64,
    /// Optional image, file or URL
    pub image: Option<ImageSource>,
    /// Creator identity, filled in from the active session
    pub created_by: Option<UserId>,
}

// ============================================================================
// Bookings
// ============================================================================

/// A booking linking one user to one event
///
/// The server enforces at most one booking per (user, event) pair; a
/// duplicate attempt fails with a conflict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Server-assigned identifier
    #[serde(rename = "_id")]
    pub id: BookingId,
    /// The booked event
    pub event_id: EventId,
    /// The booking user
    pub user_id: UserId,
    /// Server-side booking status (display only)
    #[serde(default)]
    pub status: String,
    /// When the booking was made
    #[serde(alias = "bookedDate")]
    pub booked_at: DateTime<Utc>,
}

/// Fields submitted when updating the active user's own profile
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileUpdate {
    /// New display name
    pub name: String,
    /// Optional new profile image, file or URL
    pub image: Option<ImageSource>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_wire_names() {
        let json = r#"{
            "_id": "ev-1",
            "name": "Summer Music Festival",
            "description": "Live performances across multiple stages.",
            "category": "Music",
            "date": "2025-07-25T16:00:00Z",
            "venue": "Riverside Park",
            "price": 150.0,
            "imageUrl": "https://example.com/festival.jpg",
            "createdBy": "user-9"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, EventId::from("ev-1"));
        assert_eq!(event.category, "Music");
        assert_eq!(event.image_url.as_deref(), Some("https://example.com/festival.jpg"));
        assert_eq!(event.created_by, Some(UserId::from("user-9")));
    }

    #[test]
    fn booking_accepts_legacy_booked_date_field() {
        let json = r#"{
            "_id": "bk-1",
            "eventId": "ev-1",
            "userId": "user-1",
            "status": "confirmed",
            "bookedDate": "2025-05-01T12:00:00Z"
        }"#;

        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.event_id, EventId::from("ev-1"));
        assert_eq!(booking.status, "confirmed");
    }

    #[test]
    fn user_role_defaults_to_user() {
        let json = r#"{"_id": "u-1", "name": "Dana", "email": "dana@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.role.is_admin());
    }

    #[test]
    fn role_toggle_flips_both_ways() {
        assert_eq!(Role::User.toggled(), Role::Admin);
        assert_eq!(Role::Admin.toggled(), Role::User);
    }
}
