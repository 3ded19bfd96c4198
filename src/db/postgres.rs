//! PostgreSQL-backed bond repository.

use super::{BondRepository, BondRow, DatabasePool, StoreError};
use crate::models::Bond;
use async_trait::async_trait;

const SELECT_BOND: &str = r#"
    SELECT isin, emission_name, value, interest, purchase_date, maturity_date,
           interest_payment_frequency, owner_id
    FROM bonds
"#;

/// Bond repository on a PostgreSQL pool.
#[derive(Clone)]
pub struct PgBondRepository {
    db: DatabasePool,
}

impl PgBondRepository {
    /// Wraps a connected pool. Migrations must already have run.
    #[must_use]
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }
}

fn map_insert_error(err: sqlx::Error, isin: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateIsin(isin.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl BondRepository for PgBondRepository {
    async fn ensure_owner(&self, owner_id: i64) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(owner_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn remove_owner(&self, owner_id: i64) -> Result<u64, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        let (owned,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bonds WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        // bonds.owner_id cascades
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(owned.max(0) as u64)
    }

    async fn insert(&self, bond: &Bond) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO bonds (isin, emission_name, value, interest, purchase_date,
                               maturity_date, interest_payment_frequency, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&bond.isin)
        .bind(&bond.emission_name)
        .bind(bond.value)
        .bind(bond.interest)
        .bind(bond.purchase_date)
        .bind(bond.maturity_date)
        .bind(bond.frequency.code())
        .bind(bond.owner_id)
        .execute(self.db.pool())
        .await
        .map_err(|e| map_insert_error(e, &bond.isin))?;
        Ok(())
    }

    async fn find_by_isin(&self, isin: &str) -> Result<Option<Bond>, StoreError> {
        let row: Option<BondRow> = sqlx::query_as(&format!("{SELECT_BOND} WHERE isin = $1"))
            .bind(isin)
            .fetch_optional(self.db.pool())
            .await?;
        row.map(Bond::try_from).transpose()
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Bond>, StoreError> {
        let rows: Vec<BondRow> =
            sqlx::query_as(&format!("{SELECT_BOND} WHERE owner_id = $1 ORDER BY id"))
                .bind(owner_id)
                .fetch_all(self.db.pool())
                .await?;
        rows.into_iter().map(Bond::try_from).collect()
    }

    async fn update(&self, bond: &Bond) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE bonds
            SET emission_name = $2, value = $3, interest = $4, purchase_date = $5,
                maturity_date = $6, interest_payment_frequency = $7
            WHERE isin = $1
            "#,
        )
        .bind(&bond.isin)
        .bind(&bond.emission_name)
        .bind(bond.value)
        .bind(bond.interest)
        .bind(bond.purchase_date)
        .bind(bond.maturity_date)
        .bind(bond.frequency.code())
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, isin: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM bonds WHERE isin = $1")
            .bind(isin)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
