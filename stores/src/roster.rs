//! The user roster: the admin-facing list of all accounts.

use evently_core::{Gateway, Result, User, UserId};
use std::sync::{Arc, RwLock};

/// Admin view over all registered users
///
/// Role toggles replace the local entry with the server's updated record,
/// so the roster never invents state the server has not confirmed.
pub struct UserRoster<G> {
    gateway: Arc<G>,
    state: RwLock<Vec<User>>,
}

impl<G: Gateway> UserRoster<G> {
    /// Create an empty roster
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: RwLock::new(Vec::new()),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<User>> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The currently loaded users
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Fetch all users; the server enforces the admin requirement
    ///
    /// # Errors
    ///
    /// Propagates gateway errors; the local list is unchanged on failure.
    pub async fn load(&self) -> Result<()> {
        let users = self.gateway.list_users().await?;
        tracing::debug!(count = users.len(), "Loaded user roster");
        *self.write() = users;
        Ok(())
    }

    /// Flip a user's role between user and admin
    ///
    /// On success the server's updated record replaces the local entry; on
    /// failure the roster is unchanged.
    ///
    /// # Errors
    ///
    /// [`evently_core::Error::NotFound`] when the user does not exist;
    /// other gateway errors pass through.
    pub async fn toggle_role(&self, id: &UserId) -> Result<User> {
        let updated = self.gateway.toggle_role(id).await?;
        tracing::info!(user = %id, role = %updated.role, "Toggled role");

        let mut users = self.write();
        if let Some(slot) = users.iter_mut().find(|user| &user.id == id) {
            *slot = updated.clone();
        }
        drop(users);
        Ok(updated)
    }
}

impl<G> std::fmt::Debug for UserRoster<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let users = self
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f.debug_struct("UserRoster")
            .field("users", &users.len())
            .finish_non_exhaustive()
    }
}
