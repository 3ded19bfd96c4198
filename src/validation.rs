//! Attribute validation for bond create and update requests.
//!
//! Raw JSON input is overlaid onto a [`BondDraft`] (empty for a create, seeded
//! from the stored bond for a partial update). The finished draft is checked as
//! a whole, and only then is a newly supplied ISIN confirmed with the registry.

use crate::frequency::PaymentFrequency;
use crate::models::Bond;
use crate::registry::{IsinStatus, IsinVerifier, RegistryError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;


/// Input timestamp layout; a trailing `Z` is accepted as `+0000`.
pub const INPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Longest accepted emission name.
pub const MAX_EMISSION_NAME_LEN: usize = 180;

/// Longest accepted ISIN.
pub const MAX_ISIN_LEN: usize = 12;

/// Keys a partial update may carry.
pub const UPDATABLE_ATTRIBUTES: [&str; 7] = [
    "emmision_name",
    "emission_name",
    "value",
    "interest",
    "purchase_date",
    "maturity_date",
    "interest_payment_frequency",
];

/// Reasons a request's attributes are rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required attribute absent on create.
    #[error("Invalid {0}: this field is required")]
    Missing(&'static str),

    /// Emission name is not a usable string.
    #[error("Invalid emission name: {0}")]
    InvalidName(String),

    /// Timestamp failed to parse.
    #[error("Invalid {field}: {reason}")]
    InvalidDate {
        /// Which date.
        field: &'static str,
        /// Parser message.
        reason: String,
    },

    /// Numeric attribute is not a number.
    #[error("Invalid {field}: {raw} is not a number")]
    NotANumber {
        /// Which attribute.
        field: &'static str,
        /// The offending input.
        raw: String,
    },

    /// Principal below zero.
    #[error("Invalid value: value must be greater than 0")]
    NegativeValue,

    /// ISIN is not a non-empty string of at most 12 ASCII letters and digits.
    #[error("Invalid ISIN code: {0}")]
    MalformedIsin(String),

    /// Registry does not know the ISIN.
    #[error("Invalid ISIN code")]
    InvalidIsin,

    /// Frequency is neither a known code nor a known name.
    #[error("Invalid interest payment frequency")]
    InvalidFrequency,

    /// Dates out of order.
    #[error("Maturity date must be greater than purchase date")]
    MaturityNotAfterPurchase,

    /// Key not accepted by a partial update.
    #[error("Invalid attribute: {0}")]
    UnknownAttribute(String),

    /// Registry lookup could not complete.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Fully validated bond attributes, not yet bound to an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct BondAttributes {
    /// Emission name.
    pub emission_name: String,
    /// ISIN code.
    pub isin: String,
    /// Principal value.
    pub value: f64,
    /// Interest rate in percent.
    pub interest: f64,
    /// Purchase timestamp.
    pub purchase_date: DateTime<Utc>,
    /// Maturity timestamp.
    pub maturity_date: DateTime<Utc>,
    /// Payment frequency.
    pub frequency: PaymentFrequency,
}

impl BondAttributes {
    /// Binds the attributes to an owner.
    #[must_use]
    pub fn into_bond(self, owner_id: i64) -> Bond {
        Bond {
            isin: self.isin,
            emission_name: self.emission_name,
            value: self.value,
            interest: self.interest,
            purchase_date: self.purchase_date,
            maturity_date: self.maturity_date,
            frequency: self.frequency,
            owner_id,
        }
    }
}

/// Bond attributes under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondDraft {
    /// Emission name.
    pub emission_name: Option<String>,
    /// ISIN code.
    pub isin: Option<String>,
    /// Principal value.
    pub value: Option<f64>,
    /// Interest rate.
    pub interest: Option<f64>,
    /// Purchase timestamp.
    pub purchase_date: Option<DateTime<Utc>>,
    /// Maturity timestamp.
    pub maturity_date: Option<DateTime<Utc>>,
    /// Payment frequency.
    pub frequency: Option<PaymentFrequency>,
}

impl BondDraft {
    /// Draft holding every attribute of a stored bond.
    #[must_use]
    pub fn from_bond(bond: &Bond) -> Self {
        Self {
            emission_name: Some(bond.emission_name.clone()),
            isin: Some(bond.isin.clone()),
            value: Some(bond.value),
            interest: Some(bond.interest),
            purchase_date: Some(bond.purchase_date),
            maturity_date: Some(bond.maturity_date),
            frequency: Some(bond.frequency),
        }
    }

    /// Overlays the attributes present in `raw`, validating each one.
    ///
    /// # Errors
    /// Returns the first attribute that fails its own rules.
    pub fn apply(&mut self, raw: &Map<String, Value>) -> Result<(), ValidationError> {
        if let Some(name) = supplied(raw, "emmision_name").or_else(|| supplied(raw, "emission_name")) {
            self.emission_name = Some(parse_name(name)?);
        }
        if let Some(date) = supplied(raw, "purchase_date") {
            self.purchase_date = Some(parse_date(date, "purchase date")?);
        }
        if let Some(date) = supplied(raw, "maturity_date") {
            self.maturity_date = Some(parse_date(date, "maturity date")?);
        }
        if let Some(value) = supplied(raw, "value") {
            let value = parse_number(value, "value")?;
            if value < 0.0 {
                return Err(ValidationError::NegativeValue);
            }
            self.value = Some(value);
        }
        if let Some(interest) = supplied(raw, "interest") {
            self.interest = Some(parse_number(interest, "interest")?);
        }
        if let Some(isin) = supplied(raw, "isin") {
            self.isin = Some(parse_isin(isin)?);
        }
        if let Some(frequency) = supplied(raw, "interest_payment_frequency") {
            self.frequency = Some(
                frequency
                    .as_str()
                    .and_then(PaymentFrequency::parse)
                    .ok_or(ValidationError::InvalidFrequency)?,
            );
        }
        Ok(())
    }

    /// Checks completeness and date ordering.
    ///
    /// # Errors
    /// Returns [`ValidationError::Missing`] for the first absent attribute, or
    /// [`ValidationError::MaturityNotAfterPurchase`].
    pub fn finish(self) -> Result<BondAttributes, ValidationError> {
        let emission_name = self.emission_name.ok_or(ValidationError::Missing("emission name"))?;
        let purchase_date = self.purchase_date.ok_or(ValidationError::Missing("purchase date"))?;
        let maturity_date = self.maturity_date.ok_or(ValidationError::Missing("maturity date"))?;
        let value = self.value.ok_or(ValidationError::Missing("value"))?;
        let interest = self.interest.ok_or(ValidationError::Missing("interest"))?;
        let isin = self.isin.ok_or(ValidationError::Missing("ISIN code"))?;
        let frequency = self
            .frequency
            .ok_or(ValidationError::Missing("interest payment frequency"))?;

        if purchase_date >= maturity_date {
            return Err(ValidationError::MaturityNotAfterPurchase);
        }

        Ok(BondAttributes {
            emission_name,
            isin,
            value,
            interest,
            purchase_date,
            maturity_date,
            frequency,
        })
    }
}

/// Validates raw request attributes.
///
/// With `partial` set, attributes absent from `raw` are carried over from
/// `existing`; otherwise every attribute is required. The registry is called
/// once, and only when `raw` supplies an ISIN.
///
/// # Errors
/// Returns a [`ValidationError`] describing the first rejected attribute.
pub async fn validate(
    raw: &Map<String, Value>,
    existing: Option<&Bond>,
    partial: bool,
    verifier: &dyn IsinVerifier,
) -> Result<BondAttributes, ValidationError> {
    let mut draft = match (partial, existing) {
        (true, Some(bond)) => BondDraft::from_bond(bond),
        _ => BondDraft::default(),
    };
    draft.apply(raw)?;
    let attributes = draft.finish()?;

    if supplied(raw, "isin").is_some() {
        match verifier.verify(&attributes.isin).await? {
            IsinStatus::Valid => {}
            IsinStatus::Rejected => return Err(ValidationError::InvalidIsin),
        }
    }

    Ok(attributes)
}

/// Rejects keys a partial update may not touch.
///
/// # Errors
/// Returns [`ValidationError::UnknownAttribute`] naming the first such key.
pub fn check_updatable(raw: &Map<String, Value>) -> Result<(), ValidationError> {
    match raw.keys().find(|key| !UPDATABLE_ATTRIBUTES.contains(&key.as_str())) {
        Some(key) => Err(ValidationError::UnknownAttribute(key.clone())),
        None => Ok(()),
    }
}

/// Parses `YYYY-MM-DDTHH:MM:SS±HHMM`, with `Z` standing for UTC.
///
/// # Errors
/// Returns the chrono parse error.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let normalized = match input.strip_suffix('Z') {
        Some(rest) => format!("{rest}+0000"),
        None => input.to_string(),
    };
    DateTime::parse_from_str(&normalized, INPUT_TIMESTAMP_FORMAT).map(|ts| ts.with_timezone(&Utc))
}

// JSON null counts as absent.
fn supplied<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

fn parse_name(value: &Value) -> Result<String, ValidationError> {
    let name = value
        .as_str()
        .ok_or_else(|| ValidationError::InvalidName("expected a string".to_string()))?;
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName("may not be blank".to_string()));
    }
    if name.chars().count() > MAX_EMISSION_NAME_LEN {
        return Err(ValidationError::InvalidName(format!(
            "at most {MAX_EMISSION_NAME_LEN} characters allowed"
        )));
    }
    Ok(name.to_string())
}

fn parse_date(value: &Value, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
    let text = value.as_str().ok_or_else(|| ValidationError::InvalidDate {
        field,
        reason: format!("{value} is not a string"),
    })?;
    parse_timestamp(text).map_err(|err| ValidationError::InvalidDate {
        field,
        reason: err.to_string(),
    })
}

fn parse_number(value: &Value, field: &'static str) -> Result<f64, ValidationError> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            raw: value.to_string(),
        })
}

fn parse_isin(value: &Value) -> Result<String, ValidationError> {
    let isin = value
        .as_str()
        .ok_or_else(|| ValidationError::MalformedIsin("expected a string".to_string()))?;
    if isin.is_empty() {
        return Err(ValidationError::MalformedIsin("may not be blank".to_string()));
    }
    if isin.chars().count() > MAX_ISIN_LEN {
        return Err(ValidationError::MalformedIsin(format!(
            "at most {MAX_ISIN_LEN} characters allowed"
        )));
    }
    // appended verbatim to the registry URL
    if !isin.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::MalformedIsin(
            "only letters and digits allowed".to_string(),
        ));
    }
    Ok(isin.to_string())
}
