//! The session store: login, registration, logout, and profile
//! management for the active identity.

use evently_core::{Gateway, ImageFile, ProfileUpdate, Result, SessionHandle, User};
use std::sync::Arc;

/// Drives the shared session through the authentication lifecycle
///
/// The store owns no session state of its own; it operates on the shared
/// [`SessionHandle`] that the gateway also reads. Login activates the
/// handle (persisting the credentials), logout clears it, and restore
/// re-activates a persisted session without touching the network.
pub struct SessionStore<G> {
    gateway: Arc<G>,
    session: Arc<SessionHandle>,
}

impl<G: Gateway> SessionStore<G> {
    /// Create a store over the shared session
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<SessionHandle>) -> Self {
        Self { gateway, session }
    }

    /// Authenticate and activate the session
    ///
    /// On success the session is persisted and the role is derived from
    /// the returned token's claims. On failure the session is unchanged.
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::Auth`] on invalid credentials;
    /// [`evently_core::Error::Storage`] when the session cannot be
    /// persisted; network errors pass through.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let outcome = self.gateway.login(email, password).await?;
        let fallback = outcome.user.clone();
        self.session.activate(outcome.user, outcome.token)?;

        // activate() rewrites the role from the token claims
        let user = self.session.user().unwrap_or(fallback);
        tracing::info!(user = %user.id, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Register a new account, then log in with the same credentials
    ///
    /// Registration alone creates no session; the follow-up login does.
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::Registration`] when the server rejects the
    /// account (e.g. duplicate email); login errors pass through.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User> {
        self.gateway.register(name, email, password).await?;
        tracing::info!(email, "Registered account");
        self.login(email, password).await
    }

    /// Clear the active session and its durable record; idempotent
    pub fn logout(&self) {
        self.session.clear();
        tracing::info!("Logged out");
    }

    /// Re-activate a persisted session without touching the network
    ///
    /// Returns true when a stored session was found and activated.
    pub fn restore(&self) -> bool {
        let restored = self.session.restore();
        if restored {
            tracing::info!("Restored persisted session");
        }
        restored
    }

    /// The active user profile, if any
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    /// Whether an identity is active
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Whether the active identity holds the admin role
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    /// Update the active user's own profile
    ///
    /// The server's updated profile replaces the stored one; the token is
    /// kept.
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::Unauthenticated`] without a session;
    /// validation and network errors pass through.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let user = self.gateway.update_profile(update).await?;
        self.session.replace_user(user.clone())?;
        tracing::info!(user = %user.id, "Updated profile");
        Ok(user)
    }

    /// Upload a profile image, returning its hosted URL
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::Validation`] when the server rejects the
    /// file; network errors pass through.
    pub async fn upload_profile_image(&self, file: &ImageFile) -> Result<String> {
        let url = self.gateway.upload_profile_image(file).await?;
        tracing::debug!(url, "Uploaded profile image");
        Ok(url)
    }

    /// Delete the active user's account and clear the session
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::Unauthenticated`] without a session; the
    /// session is cleared only after the server confirms the deletion.
    pub async fn delete_account(&self) -> Result<()> {
        self.gateway.delete_account().await?;
        self.session.clear();
        tracing::info!("Deleted account");
        Ok(())
    }
}

impl<G> std::fmt::Debug for SessionStore<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
