use serde::{Deserialize, Serialize};

use crate::aggregate::HousingPosition;
use crate::config::{BandDirection, BandThreshold, RatioBands};
use crate::growth::amortized_payment;
use crate::profile::DebtRecord;
use crate::types::{BasisPoints, Money};
use crate::HouseholdFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Stable,
    Moderate,
    Elevated,
}

/// Why a ratio has no value. Distinct from a computed zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    NoIncome,
    NotOwnerOccupied,
    NoPropertyValue,
    NoTarget,
    NoGap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RatioValue {
    Defined { value: BasisPoints, band: Band },
    Undefined { reason: UndefinedReason },
}

impl RatioValue {
    pub fn value(&self) -> Option<BasisPoints> {
        match self {
            RatioValue::Defined { value, .. } => Some(*value),
            RatioValue::Undefined { .. } => None,
        }
    }

    pub fn band(&self) -> Option<Band> {
        match self {
            RatioValue::Defined { band, .. } => Some(*band),
            RatioValue::Undefined { .. } => None,
        }
    }

    fn undefined(reason: UndefinedReason) -> Self {
        RatioValue::Undefined { reason }
    }
}

/// Amounts the ratios are computed from; carried on the snapshot so a
/// report can be rebuilt from it alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioInputs {
    pub monthly_income: Money,
    pub monthly_expense: Money,
    pub total_debt: Money,
    pub housing: Option<HousingPosition>,
    pub monthly_debt_service: Money,
    pub monthly_pension_income: Money,
    pub education_target: Money,
    pub education_saved: Money,
    pub projected_retirement_fund: Option<Money>,
    pub target_retirement_fund: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioReport {
    pub savings_rate: RatioValue,
    pub loan_to_value: RatioValue,
    pub debt_to_income: RatioValue,
    pub debt_service: RatioValue,
    pub pension_replacement: RatioValue,
    pub education_coverage: RatioValue,
    pub retirement_fund_adequacy: RatioValue,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub fn classify(value: BasisPoints, threshold: &BandThreshold) -> Band {
    match threshold.direction {
        BandDirection::LowerIsBetter if value <= threshold.stable => Band::Stable,
        BandDirection::LowerIsBetter if value <= threshold.moderate => Band::Moderate,
        BandDirection::HigherIsBetter if value >= threshold.stable => Band::Stable,
        BandDirection::HigherIsBetter if value >= threshold.moderate => Band::Moderate,
        _ => Band::Elevated,
    }
}

fn banded(
    numerator: Money,
    denominator: Money,
    threshold: &BandThreshold,
    when_zero: UndefinedReason,
) -> RatioValue {
    if denominator.is_zero() {
        return RatioValue::undefined(when_zero);
    }
    let value = BasisPoints::from_ratio(numerator.to_decimal(), denominator.to_decimal());
    RatioValue::Defined {
        value,
        band: classify(value, threshold),
    }
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// `(income − expense) / income`; may be negative.
pub fn savings_rate(income: Money, expense: Money, threshold: &BandThreshold) -> RatioValue {
    banded(income - expense, income, threshold, UndefinedReason::NoIncome)
}

/// Mortgage balance over property value, owner-occupied homes only.
pub fn loan_to_value(housing: Option<&HousingPosition>, threshold: &BandThreshold) -> RatioValue {
    match housing {
        None => RatioValue::undefined(UndefinedReason::NotOwnerOccupied),
        Some(home) => banded(
            home.loan_balance,
            home.property_value,
            threshold,
            UndefinedReason::NoPropertyValue,
        ),
    }
}

/// Total debt over annual income.
pub fn debt_to_income(
    total_debt: Money,
    monthly_income: Money,
    threshold: &BandThreshold,
) -> RatioValue {
    let annual_income = Money::from_minor(monthly_income.minor() * 12);
    banded(total_debt, annual_income, threshold, UndefinedReason::NoIncome)
}

/// Estimated monthly debt service over monthly income.
pub fn debt_service_ratio(
    monthly_debt_service: Money,
    monthly_income: Money,
    threshold: &BandThreshold,
) -> RatioValue {
    banded(
        monthly_debt_service,
        monthly_income,
        threshold,
        UndefinedReason::NoIncome,
    )
}

/// Monthly pension income over pre-retirement monthly income.
pub fn pension_replacement_rate(
    monthly_pension_income: Money,
    monthly_income: Money,
    threshold: &BandThreshold,
) -> RatioValue {
    banded(
        monthly_pension_income,
        monthly_income,
        threshold,
        UndefinedReason::NoIncome,
    )
}

/// Education savings over the planned education cost.
pub fn education_coverage(saved: Money, target: Money, threshold: &BandThreshold) -> RatioValue {
    banded(saved, target, threshold, UndefinedReason::NoTarget)
}

/// Projected retirement fund over the target fund.
pub fn retirement_fund_adequacy(
    projected: Option<Money>,
    target: Option<Money>,
    threshold: &BandThreshold,
) -> RatioValue {
    match (projected, target) {
        (Some(projected), Some(target)) => {
            banded(projected, target, threshold, UndefinedReason::NoTarget)
        }
        _ => RatioValue::undefined(UndefinedReason::NoTarget),
    }
}

/// Level payment of every debt summed; each debt amortizes over its own
/// remaining term, or `default_months` when it has none.
pub fn monthly_debt_service(
    debts: &[DebtRecord],
    default_months: u32,
) -> HouseholdFinanceResult<Money> {
    let mut total = Money::ZERO;
    for debt in debts {
        let months = debt.remaining_months.unwrap_or(default_months);
        total += amortized_payment(debt.principal, debt.annual_rate, months)?.monthly_payment;
    }
    Ok(total)
}

pub fn ratio_report(inputs: &RatioInputs, bands: &RatioBands) -> RatioReport {
    RatioReport {
        savings_rate: savings_rate(
            inputs.monthly_income,
            inputs.monthly_expense,
            &bands.savings_rate,
        ),
        loan_to_value: loan_to_value(inputs.housing.as_ref(), &bands.loan_to_value),
        debt_to_income: debt_to_income(
            inputs.total_debt,
            inputs.monthly_income,
            &bands.debt_to_income,
        ),
        debt_service: debt_service_ratio(
            inputs.monthly_debt_service,
            inputs.monthly_income,
            &bands.debt_service,
        ),
        pension_replacement: pension_replacement_rate(
            inputs.monthly_pension_income,
            inputs.monthly_income,
            &bands.pension_replacement,
        ),
        education_coverage: education_coverage(
            inputs.education_saved,
            inputs.education_target,
            &bands.education_coverage,
        ),
        retirement_fund_adequacy: retirement_fund_adequacy(
            inputs.projected_retirement_fund,
            inputs.target_retirement_fund,
            &bands.retirement_fund_adequacy,
        ),
    }
}
