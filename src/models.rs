//! Bond records and the request/response models of the REST API.

use crate::frequency::PaymentFrequency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wire format for timestamps, always rendered in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A fixed-income holding owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    /// ISIN, unique across all bonds.
    pub isin: String,
    /// Name of the emission.
    pub emission_name: String,
    /// Principal, never negative.
    pub value: f64,
    /// Annual interest rate in percent; may be negative.
    pub interest: f64,
    /// When the bond was bought.
    pub purchase_date: DateTime<Utc>,
    /// When the bond matures. Always after `purchase_date`.
    pub maturity_date: DateTime<Utc>,
    /// Interest payment frequency.
    pub frequency: PaymentFrequency,
    /// Id of the owning user.
    pub owner_id: i64,
}

/// Formats a timestamp the way the API renders it.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Bond representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BondResponse {
    /// Name of the emission.
    pub emission_name: String,
    /// ISIN code.
    pub isin: String,
    /// Principal value.
    pub value: f64,
    /// Annual interest rate in percent.
    pub interest: f64,
    /// Purchase timestamp (`YYYY-MM-DDTHH:MM:SSZ`).
    pub purchase_date: String,
    /// Maturity timestamp (`YYYY-MM-DDTHH:MM:SSZ`).
    pub maturity_date: String,
    /// Interest payment frequency, long form.
    pub interest_payment_frequency: PaymentFrequency,
    /// Owner user id.
    pub user: i64,
}

impl From<&Bond> for BondResponse {
    fn from(bond: &Bond) -> Self {
        Self {
            emission_name: bond.emission_name.clone(),
            isin: bond.isin.clone(),
            value: bond.value,
            interest: bond.interest,
            purchase_date: format_timestamp(&bond.purchase_date),
            maturity_date: format_timestamp(&bond.maturity_date),
            interest_payment_frequency: bond.frequency,
            user: bond.owner_id,
        }
    }
}

/// Request body for creating a bond.
///
/// Handlers read the body as raw JSON so that every field can be reported
/// individually; this type documents the expected shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBondRequest {
    /// Name of the emission.
    pub emmision_name: String,
    /// ISIN code (12 characters).
    pub isin: String,
    /// Principal value, zero or more.
    pub value: f64,
    /// Annual interest rate in percent.
    pub interest: f64,
    /// Purchase timestamp, `YYYY-MM-DDTHH:MM:SSZ` or with an explicit offset.
    pub purchase_date: String,
    /// Maturity timestamp, after the purchase timestamp.
    pub maturity_date: String,
    /// `D`, `W`, `M`, `Y` or `Daily`, `Weekly`, `Monthly`, `Yearly`.
    pub interest_payment_frequency: String,
}

/// Request body for a partial bond update. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateBondRequest {
    /// New emission name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emmision_name: Option<String>,
    /// New principal value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// New interest rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<f64>,
    /// New purchase timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    /// New maturity timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<String>,
    /// New interest payment frequency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_payment_frequency: Option<String>,
}

/// Aggregate statistics over one user's bonds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserStatisticsResponse {
    /// Mean interest rate.
    pub avg_interest: f64,
    /// Projected value of all bonds at maturity.
    pub future_value: f64,
    /// Sum of principal values.
    pub total_value: f64,
    /// The bond that matures first.
    pub next_maturity: BondResponse,
}

/// Response after deleting a bond.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteBondResponse {
    /// Confirmation message.
    pub message: String,
    /// ISIN of the deleted bond.
    pub isin: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}
