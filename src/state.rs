//! Application state management.

use crate::auth::{IdentityStore, User};
use crate::config::Config;
use crate::db::{BondRepository, InMemoryBondRepository, StoreError};
use crate::registry::IsinVerifier;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bond storage.
    pub bonds: Arc<dyn BondRepository>,
    /// ISIN registry client.
    pub verifier: Arc<dyn IsinVerifier>,
    /// Known users and their API keys.
    pub identities: Arc<IdentityStore>,
}

impl AppState {
    /// Creates a state with in-memory storage.
    #[must_use]
    pub fn new(verifier: Arc<dyn IsinVerifier>) -> Self {
        Self::with_repository(Arc::new(InMemoryBondRepository::new()), verifier)
    }

    /// Creates a state on the given storage backend.
    #[must_use]
    pub fn with_repository(
        bonds: Arc<dyn BondRepository>,
        verifier: Arc<dyn IsinVerifier>,
    ) -> Self {
        Self {
            bonds,
            verifier,
            identities: Arc::new(IdentityStore::new()),
        }
    }

    /// Registers the configured users. Users without a key get a generated
    /// one; the generated keys are returned so they can be handed out.
    ///
    /// # Errors
    /// Returns an error if an owner cannot be recorded in storage.
    pub async fn register_users(&self, config: &Config) -> Result<Vec<(i64, String)>, StoreError> {
        let mut issued = Vec::new();

        for entry in &config.users {
            let user = User {
                id: entry.id,
                is_staff: entry.is_staff,
                is_superuser: entry.is_superuser,
            };
            self.bonds.ensure_owner(user.id).await?;
            match &entry.api_key {
                Some(key) => self.identities.register(user, key),
                None => issued.push((user.id, self.identities.issue_key(user))),
            }
        }

        info!("Registered {} users", config.users.len());
        Ok(issued)
    }

    /// Removes a user and, with it, every bond the user owns.
    ///
    /// # Errors
    /// Returns an error if storage fails.
    pub async fn remove_user(&self, user_id: i64) -> Result<u64, StoreError> {
        self.identities.remove(user_id);
        let removed = self.bonds.remove_owner(user_id).await?;
        info!("Removed user {} and {} bonds", user_id, removed);
        Ok(removed)
    }
}
