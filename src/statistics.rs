//! Per-user aggregate statistics over bond holdings.

use crate::frequency::count_payments;
use crate::models::Bond;

/// Aggregates over a non-empty set of bonds.
#[derive(Debug, Clone, PartialEq)]
pub struct BondStatistics<'a> {
    /// Arithmetic mean of the interest rates.
    pub avg_interest: f64,
    /// Sum of principal values.
    pub total_value: f64,
    /// Sum of each bond compounded over its payment count.
    pub future_value: f64,
    /// Bond with the earliest maturity; the first one wins ties.
    pub next_maturity: &'a Bond,
}

/// Value of a bond at maturity: `value * (1 + interest/100)^payments`.
#[must_use]
pub fn future_value(bond: &Bond) -> f64 {
    let payments = count_payments(
        bond.purchase_date,
        bond.maturity_date,
        bond.frequency.code(),
    );
    bond.value * (1.0 + bond.interest / 100.0).powf(payments as f64)
}

/// Aggregates `bonds`. Returns `None` when there are none.
#[must_use]
pub fn aggregate(bonds: &[Bond]) -> Option<BondStatistics<'_>> {
    let (first, rest) = bonds.split_first()?;

    let mut total_interest = first.interest;
    let mut total_value = first.value;
    let mut total_future = future_value(first);
    let mut next_maturity = first;

    for bond in rest {
        total_interest += bond.interest;
        total_value += bond.value;
        total_future += future_value(bond);
        if bond.maturity_date < next_maturity.maturity_date {
            next_maturity = bond;
        }
    }

    Some(BondStatistics {
        avg_interest: total_interest / bonds.len() as f64,
        total_value,
        future_value: total_future,
        next_maturity,
    })
}
