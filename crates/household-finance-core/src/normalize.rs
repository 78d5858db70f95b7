//! Periodicity normalization for cash-flow records.

use serde::{Deserialize, Serialize};

use crate::profile::{CashFlowRecord, Period};
use crate::types::Money;

const MONTHS_PER_YEAR: i64 = 12;

/// A cash-flow record reduced to its canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum NormalizedFlow {
    /// Recurring amount per month.
    Monthly(Money),
    /// Point-in-time amount, settled against assets.
    OneTime(Money),
}

/// Monthly equivalent of a recurring amount.
///
/// Yearly amounts are divided by 12 with ties rounded to even; monthly
/// amounts pass through. One-time amounts have no monthly equivalent.
pub fn to_monthly(amount: Money, period: Period) -> Option<Money> {
    match period {
        Period::Monthly => Some(amount),
        Period::Yearly => Some(Money::from_minor(div_round_half_even(
            amount.minor(),
            MONTHS_PER_YEAR,
        ))),
        Period::OneTime => None,
    }
}

/// Yearly amount equivalent to a monthly one.
pub fn to_yearly_equivalent(monthly: Money) -> Money {
    Money::from_minor(monthly.minor() * MONTHS_PER_YEAR)
}

pub fn normalize(record: &CashFlowRecord) -> NormalizedFlow {
    match to_monthly(record.amount, record.period) {
        Some(monthly) => NormalizedFlow::Monthly(monthly),
        None => NormalizedFlow::OneTime(record.amount),
    }
}

/// Integer division rounding to the nearest quotient, ties to even.
fn div_round_half_even(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.div_euclid(denominator);
    let twice_remainder = 2 * numerator.rem_euclid(denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}
