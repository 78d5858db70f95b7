use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::error::HouseholdFinanceError;
use crate::HouseholdFinanceResult;

/// Largest absolute amount accepted at the input boundary (10^15 minor units).
pub const MAX_INPUT_AMOUNT: i64 = 1_000_000_000_000_000;

const MINOR_PER_MAJOR: i64 = 100;
const MAJOR_PER_TEN_THOUSAND: i64 = 10_000;
const BPS_PER_UNIT: Decimal = dec!(10000);

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A monetary amount in the smallest currency unit.
///
/// There is exactly one canonical representation. Amounts quoted in major
/// units or in ten-thousand units must go through the named constructors,
/// so a magnitude mix-up shows up at the call site instead of in a total.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Amounts entered in units of ten thousand major units.
    pub const fn from_ten_thousands(units: i64) -> Self {
        Money(units * MAJOR_PER_TEN_THOUSAND * MINOR_PER_MAJOR)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn max(self, other: Money) -> Money {
        Money(self.0.max(other.0))
    }

    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Round a minor-unit decimal to the nearest minor unit, ties to even.
    pub fn from_decimal_rounded(value: Decimal) -> HouseholdFinanceResult<Money> {
        Self::from_decimal_with(value, RoundingStrategy::MidpointNearestEven)
    }

    /// Round a minor-unit decimal up to the next whole minor unit.
    pub fn from_decimal_ceil(value: Decimal) -> HouseholdFinanceResult<Money> {
        Self::from_decimal_with(value, RoundingStrategy::ToPositiveInfinity)
    }

    fn from_decimal_with(
        value: Decimal,
        strategy: RoundingStrategy,
    ) -> HouseholdFinanceResult<Money> {
        value
            .round_dp_with_strategy(0, strategy)
            .to_i64()
            .map(Money)
            .ok_or_else(|| HouseholdFinanceError::InvalidInput {
                field: "amount".into(),
                reason: format!("{value} minor units does not fit a monetary value"),
            })
    }

    /// Boundary check shared by every record type: non-negative and bounded.
    pub fn ensure_non_negative(self, field: &str) -> HouseholdFinanceResult<Money> {
        if self.0 < 0 {
            return Err(HouseholdFinanceError::InvalidInput {
                field: field.into(),
                reason: format!("amount must be >= 0, got {}", self.0),
            });
        }
        if self.0 > MAX_INPUT_AMOUNT {
            return Err(HouseholdFinanceError::InvalidInput {
                field: field.into(),
                reason: format!("amount exceeds {MAX_INPUT_AMOUNT} minor units"),
            });
        }
        Ok(self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

// ---------------------------------------------------------------------------
// Basis points
// ---------------------------------------------------------------------------

/// Fixed-point percentage: 1 bp = 0.01%, 10_000 bp = 100%.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BasisPoints(i64);

impl BasisPoints {
    pub const ZERO: BasisPoints = BasisPoints(0);
    pub const ONE_HUNDRED_PERCENT: BasisPoints = BasisPoints(10_000);

    pub const fn new(bps: i64) -> Self {
        BasisPoints(bps)
    }

    pub const fn from_percent(percent: i64) -> Self {
        BasisPoints(percent * 100)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// As a decimal fraction (500 bp -> 0.05).
    pub fn to_rate(self) -> Decimal {
        Decimal::from(self.0) / BPS_PER_UNIT
    }

    pub fn percent(self) -> Decimal {
        Decimal::from(self.0) / dec!(100)
    }

    /// `numerator / denominator` in basis points, ties to even.
    /// Callers guarantee a non-zero denominator.
    pub(crate) fn from_ratio(numerator: Decimal, denominator: Decimal) -> BasisPoints {
        let bps = (numerator * BPS_PER_UNIT / denominator)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        BasisPoints(bps.to_i64().unwrap_or(if bps.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        }))
    }

    /// Rejects annual rates outside [-100%, 100%].
    pub fn ensure_annual_rate(self, field: &str) -> HouseholdFinanceResult<BasisPoints> {
        if self.0 < -10_000 || self.0 > 10_000 {
            return Err(HouseholdFinanceError::InvalidInput {
                field: field.into(),
                reason: format!("rate must be within [-10000, 10000] bp, got {}", self.0),
            });
        }
        Ok(self)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

// ---------------------------------------------------------------------------
// Output envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation. Carries nothing run-dependent, so two
/// runs over the same profile serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub monetary_unit: String,
    pub percentage_unit: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    warnings: Vec<String>,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            monetary_unit: "minor_currency_unit_i64".to_string(),
            percentage_unit: "basis_points".to_string(),
        },
    }
}
