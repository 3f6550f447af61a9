//! Shared session state.
//!
//! [`SessionHandle`] is the one owner of "who is logged in right now". The
//! session store drives it through login/logout, and the HTTP gateway reads
//! the token from it on every request — and clears it when the server says
//! the token is no longer valid. Constructed once at app start and injected
//! into both; there is no ambient global.

use crate::claims::TokenClaims;
use crate::environment::{CredentialStore, StoredSession};
use crate::error::Error;
use crate::types::{Role, User, UserId};
use std::sync::{Arc, RwLock};

/// The active identity, token, and the role derived from its claims
#[derive(Clone, Debug)]
struct ActiveSession {
    user: User,
    token: String,
    role: Role,
}

/// Shared handle over the active session and its durable record
///
/// In-memory state and durable storage always move together: activating
/// persists before exposing the session, clearing wipes both. All reads are
/// full-value clones so no caller ever observes a partial update.
pub struct SessionHandle {
    active: RwLock<Option<ActiveSession>>,
    storage: Arc<dyn CredentialStore>,
}

impl SessionHandle {
    /// Create an unauthenticated handle backed by the given storage
    #[must_use]
    pub fn new(storage: Arc<dyn CredentialStore>) -> Self {
        Self {
            active: RwLock::new(None),
            storage,
        }
    }

    /// Activate a session: persist it, then make it current
    ///
    /// The role is derived from the token claims; a token whose claims
    /// cannot be decoded grants plain user access.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] when the durable record cannot be
    /// written; the in-memory session is left unchanged in that case.
    pub fn activate(&self, mut user: User, token: String) -> Result<(), Error> {
        let role = match TokenClaims::decode(&token) {
            Ok(claims) => claims.derived_role(),
            Err(e) => {
                tracing::warn!(error = %e, "Token claims undecodable, assuming user role");
                Role::User
            },
        };
        // Keep the profile field in sync as a display cache
        user.role = role;

        self.storage.save(&StoredSession {
            user: user.clone(),
            token: token.clone(),
        })?;

        let mut active = self
            .active
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *active = Some(ActiveSession { user, token, role });
        Ok(())
    }

    /// Clear the active session and its durable record; idempotent
    pub fn clear(&self) {
        {
            let mut active = self
                .active
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *active = None;
        }
        self.storage.clear();
    }

    /// Re-activate a previously persisted session without touching the
    /// network
    ///
    /// Returns true when a stored record was found and activated. Invalid
    /// or corrupt records are discarded by the storage layer, so the
    /// process simply starts unauthenticated.
    pub fn restore(&self) -> bool {
        let Some(stored) = self.storage.load() else {
            return false;
        };

        let role = TokenClaims::decode(&stored.token)
            .map(|claims| claims.derived_role())
            .unwrap_or_default();
        let mut user = stored.user;
        user.role = role;

        let mut active = self
            .active
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *active = Some(ActiveSession {
            user,
            token: stored.token,
            role,
        });
        true
    }

    /// Replace the stored user profile (after a profile update), keeping
    /// the token
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] when re-persisting fails.
    pub fn replace_user(&self, user: User) -> Result<(), Error> {
        let token = {
            let active = self
                .active
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            match active.as_ref() {
                Some(session) => session.token.clone(),
                None => return Err(Error::Unauthenticated),
            }
        };

        self.storage.save(&StoredSession {
            user: user.clone(),
            token: token.clone(),
        })?;

        let mut active = self
            .active
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(session) = active.as_mut() {
            session.user = user;
        }
        Ok(())
    }

    /// The active user profile, if any
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.active
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// The active user's identifier, if any
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.active
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|session| session.user.id.clone())
    }

    /// The active bearer token, if any
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|session| session.token.clone())
    }

    /// Whether an identity is active
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    /// Whether the active identity holds the admin role, per its token
    /// claims
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .is_some_and(|session| session.role.is_admin())
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
