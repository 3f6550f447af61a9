//! Error taxonomy for the Evently client.
//!
//! One error type is shared across the gateway and the stores. Components
//! add context only where they can (e.g. the booking index reporting a
//! missing event before any network call); everything else passes through
//! unchanged for the UI layer to present. No operation retries on failure,
//! and a failed mutation leaves prior in-memory state intact.

use thiserror::Error;

/// Convenience alias used throughout the workspace
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the Evently client
#[derive(Debug, Error)]
pub enum Error {
    /// Login rejected: invalid email or password
    #[error("Invalid email or password")]
    Auth,

    /// Registration rejected by the server (e.g. duplicate email)
    #[error("Registration failed: {0}")]
    Registration(String),

    /// Operation requires an active session
    #[error("You must be logged in to perform this action")]
    Unauthenticated,

    /// A referenced resource does not exist
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of resource ("Event", "User", ...)
        resource: &'static str,
        /// The identifier that failed to resolve
        id: String,
    },

    /// The server rejected a duplicate operation (e.g. booking twice)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The server rejected a malformed submission
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Transport-level failure (connection, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The server returned an error status with no more specific mapping
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the server
        message: String,
    },

    /// Durable client storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Required configuration is missing or malformed
    #[error("Missing configuration: {0}")]
    Config(String),

    /// Bearer token claims could not be decoded
    #[error("Token decoding failed: {0}")]
    Token(String),
}

impl Error {
    /// Create a [`Error::NotFound`] for a resource and identifier
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// True when the error means the session is no longer valid
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_resource_and_id() {
        let err = Error::not_found("Event", "ev-42");
        assert_eq!(err.to_string(), "Event with id ev-42 not found");
    }

    #[test]
    fn unauthenticated_is_detected() {
        assert!(Error::Unauthenticated.is_unauthenticated());
        assert!(!Error::Auth.is_unauthenticated());
    }
}
