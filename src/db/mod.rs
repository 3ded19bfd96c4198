//! Bond persistence: PostgreSQL or in-memory.

mod memory;
mod pool;
mod postgres;
mod schema;

pub use memory::InMemoryBondRepository;
pub use pool::DatabasePool;
pub use postgres::PgBondRepository;
pub use schema::BondRow;

use crate::models::Bond;
use async_trait::async_trait;
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another bond already uses the ISIN.
    #[error("bond with this isin already exists: {0}")]
    DuplicateIsin(String),
    /// Database driver error.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    /// A stored row cannot be turned back into a bond.
    #[error("corrupt bond record: {0}")]
    Corrupt(String),
}

/// Storage for bonds, keyed by ISIN and grouped by owner.
#[async_trait]
pub trait BondRepository: Send + Sync {
    /// Makes `owner_id` known to the store so bonds can reference it.
    async fn ensure_owner(&self, owner_id: i64) -> Result<(), StoreError>;

    /// Forgets an owner together with every bond it owns. Returns the number
    /// of bonds removed.
    async fn remove_owner(&self, owner_id: i64) -> Result<u64, StoreError>;

    /// Stores a new bond.
    async fn insert(&self, bond: &Bond) -> Result<(), StoreError>;

    /// Looks a bond up by ISIN.
    async fn find_by_isin(&self, isin: &str) -> Result<Option<Bond>, StoreError>;

    /// Bonds owned by `owner_id`, oldest first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Bond>, StoreError>;

    /// Replaces the stored bond with the same ISIN. Returns false if absent.
    async fn update(&self, bond: &Bond) -> Result<bool, StoreError>;

    /// Deletes a bond. Returns false if absent.
    async fn delete(&self, isin: &str) -> Result<bool, StoreError>;
}
