//! User identities, API keys and access rules.

use crate::error::ApiError;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix for generated API keys.
const API_KEY_PREFIX: &str = "bk_";

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    /// User id.
    pub id: i64,
    /// Staff can access every user's bonds.
    pub is_staff: bool,
    /// Superusers can access every user's bonds.
    pub is_superuser: bool,
}

impl User {
    /// A user without elevated roles.
    #[must_use]
    pub fn regular(id: i64) -> Self {
        Self {
            id,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Whether the user can see other users' data.
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// Allows `user` to act on data owned by `owner_id`.
///
/// # Errors
/// Returns [`ApiError::PermissionDenied`] unless the user owns the data or
/// holds an elevated role.
pub fn authorize(user: &User, owner_id: i64) -> Result<(), ApiError> {
    if user.id == owner_id || user.is_elevated() {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}

/// Users and their API keys. Keys are only kept as SHA-256 hashes.
#[derive(Debug, Default)]
pub struct IdentityStore {
    /// Users indexed by id.
    users: DashMap<i64, User>,
    /// Key hashes mapped to user ids.
    hash_to_user: DashMap<String, i64>,
}

impl IdentityStore {
    /// Create an empty identity store.
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            hash_to_user: DashMap::new(),
        }
    }

    /// Generate a new API key.
    fn generate_key() -> String {
        let random_part = Uuid::new_v4().to_string().replace('-', "");
        format!("{}{}", API_KEY_PREFIX, random_part)
    }

    /// Hash an API key.
    fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Registers a user reachable through `raw_key`.
    pub fn register(&self, user: User, raw_key: &str) {
        self.users.insert(user.id, user);
        self.hash_to_user.insert(Self::hash_key(raw_key), user.id);
    }

    /// Registers a user under a freshly generated key and returns the key.
    /// The raw key is not stored and cannot be recovered later.
    pub fn issue_key(&self, user: User) -> String {
        let raw_key = Self::generate_key();
        self.register(user, &raw_key);
        raw_key
    }

    /// Resolves an API key to its user.
    pub fn authenticate(&self, raw_key: &str) -> Option<User> {
        let user_id = *self.hash_to_user.get(&Self::hash_key(raw_key))?;
        self.get(user_id)
    }

    /// Get a user by id.
    pub fn get(&self, user_id: i64) -> Option<User> {
        self.users.get(&user_id).map(|entry| *entry)
    }

    /// Removes a user and every key pointing at it.
    pub fn remove(&self, user_id: i64) -> Option<User> {
        let (_, user) = self.users.remove(&user_id)?;
        self.hash_to_user.retain(|_, id| *id != user_id);
        Some(user)
    }

    /// Get the number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_is_authorized() {
        assert!(authorize(&User::regular(5), 5).is_ok());
    }

    #[test]
    fn test_staff_and_superuser_are_authorized() {
        let staff = User {
            id: 1,
            is_staff: true,
            is_superuser: false,
        };
        let superuser = User {
            id: 2,
            is_staff: false,
            is_superuser: true,
        };
        assert!(authorize(&staff, 99).is_ok());
        assert!(authorize(&superuser, 99).is_ok());
    }

    #[test]
    fn test_other_user_is_denied() {
        let result = authorize(&User::regular(1), 2);
        assert!(matches!(result, Err(ApiError::PermissionDenied)));
    }

    #[test]
    fn test_register_and_authenticate() {
        let store = IdentityStore::new();
        store.register(User::regular(7), "secret");

        assert_eq!(store.authenticate("secret"), Some(User::regular(7)));
        assert_eq!(store.authenticate("wrong"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_issue_key() {
        let store = IdentityStore::new();
        let key = store.issue_key(User::regular(3));

        assert!(key.starts_with(API_KEY_PREFIX));
        assert_eq!(store.authenticate(&key).map(|u| u.id), Some(3));
    }

    #[test]
    fn test_keys_are_hashed() {
        let store = IdentityStore::new();
        store.register(User::regular(1), "plain-key");
        assert!(!store.hash_to_user.contains_key("plain-key"));
    }

    #[test]
    fn test_remove_revokes_keys() {
        let store = IdentityStore::new();
        let key = store.issue_key(User::regular(4));
        store.register(User::regular(4), "second-key");

        assert!(store.remove(4).is_some());
        assert!(store.authenticate(&key).is_none());
        assert!(store.authenticate("second-key").is_none());
        assert!(store.is_empty());
        assert!(store.remove(4).is_none());
    }
}
