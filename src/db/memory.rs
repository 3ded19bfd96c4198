//! In-memory bond repository, used when no database is configured.

use super::{BondRepository, StoreError};
use crate::models::Bond;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Bonds kept in insertion order behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryBondRepository {
    bonds: RwLock<Vec<Bond>>,
}

impl InMemoryBondRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bonds.
    pub fn len(&self) -> usize {
        self.bonds.read().len()
    }

    /// Whether no bonds are stored.
    pub fn is_empty(&self) -> bool {
        self.bonds.read().is_empty()
    }
}

#[async_trait]
impl BondRepository for InMemoryBondRepository {
    async fn ensure_owner(&self, _owner_id: i64) -> Result<(), StoreError> {
        Ok(())
    }

    async fn remove_owner(&self, owner_id: i64) -> Result<u64, StoreError> {
        let mut bonds = self.bonds.write();
        let before = bonds.len();
        bonds.retain(|bond| bond.owner_id != owner_id);
        Ok((before - bonds.len()) as u64)
    }

    async fn insert(&self, bond: &Bond) -> Result<(), StoreError> {
        let mut bonds = self.bonds.write();
        if bonds.iter().any(|existing| existing.isin == bond.isin) {
            return Err(StoreError::DuplicateIsin(bond.isin.clone()));
        }
        bonds.push(bond.clone());
        Ok(())
    }

    async fn find_by_isin(&self, isin: &str) -> Result<Option<Bond>, StoreError> {
        Ok(self.bonds.read().iter().find(|bond| bond.isin == isin).cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Bond>, StoreError> {
        Ok(self
            .bonds
            .read()
            .iter()
            .filter(|bond| bond.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, bond: &Bond) -> Result<bool, StoreError> {
        let mut bonds = self.bonds.write();
        match bonds.iter_mut().find(|existing| existing.isin == bond.isin) {
            Some(existing) => {
                *existing = bond.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, isin: &str) -> Result<bool, StoreError> {
        let mut bonds = self.bonds.write();
        let before = bonds.len();
        bonds.retain(|bond| bond.isin != isin);
        Ok(bonds.len() < before)
    }
}
