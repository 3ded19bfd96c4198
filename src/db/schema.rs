//! Database row types.

use super::StoreError;
use crate::frequency::PaymentFrequency;
use crate::models::Bond;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Bond row as stored in the `bonds` table.
#[derive(Debug, Clone, FromRow)]
pub struct BondRow {
    /// ISIN, unique.
    pub isin: String,
    /// Emission name.
    pub emission_name: String,
    /// Principal value.
    pub value: f64,
    /// Interest rate in percent.
    pub interest: f64,
    /// Purchase timestamp.
    pub purchase_date: DateTime<Utc>,
    /// Maturity timestamp.
    pub maturity_date: DateTime<Utc>,
    /// Single-letter frequency code.
    pub interest_payment_frequency: String,
    /// Owning user.
    pub owner_id: i64,
}

impl TryFrom<BondRow> for Bond {
    type Error = StoreError;

    fn try_from(row: BondRow) -> Result<Self, Self::Error> {
        let frequency = PaymentFrequency::from_code(&row.interest_payment_frequency)
            .ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "bond {} has unknown frequency code {:?}",
                    row.isin, row.interest_payment_frequency
                ))
            })?;

        Ok(Bond {
            isin: row.isin,
            emission_name: row.emission_name,
            value: row.value,
            interest: row.interest,
            purchase_date: row.purchase_date,
            maturity_date: row.maturity_date,
            frequency,
            owner_id: row.owner_id,
        })
    }
}
