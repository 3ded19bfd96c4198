//! Request and response types for the bonds API.

use serde::{Deserialize, Serialize};


/// How often a bond pays interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
    /// Every year.
    Yearly,
}

impl std::fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

// ============================================================================
// Bonds
// ============================================================================

/// A bond as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondResponse {
    /// Name of the emission.
    pub emission_name: String,
    /// ISIN.
    pub isin: String,
    /// Nominal value.
    pub value: f64,
    /// Interest rate in percent.
    pub interest: f64,
    /// Purchase timestamp, `YYYY-MM-DDTHH:MM:SSZ`.
    pub purchase_date: String,
    /// Maturity timestamp, `YYYY-MM-DDTHH:MM:SSZ`.
    pub maturity_date: String,
    /// Interest payment frequency.
    pub interest_payment_frequency: PaymentFrequency,
    /// Owner user id.
    pub user: i64,
}

/// Request to create a bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBondRequest {
    /// Name of the emission.
    pub emmision_name: String,
    /// ISIN.
    pub isin: String,
    /// Nominal value.
    pub value: f64,
    /// Interest rate in percent.
    pub interest: f64,
    /// Purchase timestamp.
    pub purchase_date: String,
    /// Maturity timestamp.
    pub maturity_date: String,
    /// Frequency code (`D`, `W`, `M`, `Y`) or name.
    pub interest_payment_frequency: String,
}

/// Request to update some attributes of a bond. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBondRequest {
    /// Name of the emission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emmision_name: Option<String>,
    /// Nominal value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Interest rate in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<f64>,
    /// Purchase timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    /// Maturity timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<String>,
    /// Frequency code or name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_payment_frequency: Option<String>,
}

/// Response to a deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBondResponse {
    /// Confirmation message.
    pub message: String,
    /// ISIN of the deleted bond.
    pub isin: String,
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregates over one user's bonds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatisticsResponse {
    /// Mean interest rate.
    pub avg_interest: f64,
    /// Sum of future values.
    pub future_value: f64,
    /// Sum of nominal values.
    pub total_value: f64,
    /// Bond with the earliest maturity.
    pub next_maturity: BondResponse,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}
