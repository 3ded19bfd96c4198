//! Interest payment frequency and payment counting.
//!
//! A frequency travels in two forms: the single-letter code that is persisted
//! (`D`, `W`, `M`, `Y`) and the display name that appears on the wire
//! (`Daily`, `Weekly`, `Monthly`, `Yearly`).

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How often a bond pays its interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PaymentFrequency {
    /// Interest paid every day.
    Daily,
    /// Interest paid every week.
    Weekly,
    /// Interest paid every calendar month.
    Monthly,
    /// Interest paid every calendar year.
    Yearly,
}

impl PaymentFrequency {
    /// All frequencies, in ascending period length.
    pub const ALL: [PaymentFrequency; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    /// Single-letter storage code.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Daily => "D",
            Self::Weekly => "W",
            Self::Monthly => "M",
            Self::Yearly => "Y",
        }
    }

    /// Human-readable name used in API responses.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    /// Resolves an exact storage code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    /// Parses user input: either the code or the full name, case-insensitive.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL.into_iter().find(|f| {
            f.code().eq_ignore_ascii_case(input) || f.display_name().eq_ignore_ascii_case(input)
        })
    }

    /// Number of interest payments between `start` and `end`.
    ///
    /// Days and weeks count elapsed time; months and years are calendar
    /// differences that ignore the day of month.
    #[must_use]
    pub fn payments_between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        match self {
            Self::Daily => (end - start).num_days(),
            Self::Weekly => (end - start).num_days() / 7,
            Self::Monthly => {
                i64::from(end.year() - start.year()) * 12 + i64::from(end.month())
                    - i64::from(start.month())
            }
            Self::Yearly => i64::from(end.year() - start.year()),
        }
    }
}

impl std::fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Counts payments for a stored frequency code. Unknown codes yield zero.
#[must_use]
pub fn count_payments(start: DateTime<Utc>, end: DateTime<Utc>, code: &str) -> i64 {
    PaymentFrequency::from_code(code)
        .map(|frequency| frequency.payments_between(start, end))
        .unwrap_or(0)
}
