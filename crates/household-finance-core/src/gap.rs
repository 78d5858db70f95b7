use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::HouseholdTotals;
use crate::config::EngineConfig;
use crate::error::HouseholdFinanceError;
use crate::growth::solve_contribution;
use crate::profile::{ensure_retirement_age, HouseholdProfile, Person};
use crate::ratios::{classify, RatioValue, UndefinedReason};
use crate::types::{BasisPoints, Money};
use crate::HouseholdFinanceResult;

/// Funding need between retirement and the first pension payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReport {
    pub person: String,
    pub retirement_age: u32,
    pub pension_start_age: u32,
    pub gap_years: u32,
    pub monthly_expense_during_gap: Money,
    pub required_gap_fund: Money,
    pub liquid_assets: Money,
    /// `max(0, required_gap_fund − liquid_assets)`.
    pub shortfall: Money,
    /// Capped at 100%; undefined when there is no gap to fund.
    pub preparation_rate: RatioValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_to_retirement: Option<u32>,
    /// Level saving that, with liquid assets growing at the assumed return,
    /// funds the gap by retirement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_monthly_saving: Option<Money>,
}

/// Gap report for the household's primary person.
pub fn retirement_gap(
    profile: &HouseholdProfile,
    config: &EngineConfig,
) -> HouseholdFinanceResult<GapReport> {
    let totals = HouseholdTotals::from_profile(profile)?;
    let person = profile
        .primary()
        .ok_or_else(|| HouseholdFinanceError::invalid("people", "no 'self' person"))?;
    gap_for_person(profile, &totals, person, config)
}

/// Gap report for any retiring member of the household.
pub fn gap_for_person(
    profile: &HouseholdProfile,
    totals: &HouseholdTotals,
    person: &Person,
    config: &EngineConfig,
) -> HouseholdFinanceResult<GapReport> {
    let retirement_age = profile.retirement_age_of(person).ok_or_else(|| {
        HouseholdFinanceError::InsufficientData(format!(
            "no retirement age for '{}' or the household",
            person.id
        ))
    })?;
    let pension_start_age = ensure_retirement_age(
        "pension_start_age",
        person
            .pension_start_age
            .unwrap_or(config.national_pension.full_benefit_age),
    )?;

    let gap_years = pension_start_age.saturating_sub(retirement_age);
    let monthly_expense_during_gap = profile
        .targets
        .retirement_monthly_expense
        .unwrap_or(totals.monthly_expense);
    let required_gap_fund = monthly_expense_during_gap
        .minor()
        .checked_mul(12 * i64::from(gap_years))
        .map(Money::from_minor)
        .ok_or_else(|| {
            HouseholdFinanceError::invalid(
                "monthly_expense_during_gap",
                format!("{gap_years} years of spending exceeds the representable range"),
            )
        })?;
    let liquid_assets = totals.assets.liquid();
    let shortfall = (required_gap_fund - liquid_assets).max(Money::ZERO);

    let preparation_rate = if required_gap_fund.is_zero() {
        RatioValue::Undefined {
            reason: UndefinedReason::NoGap,
        }
    } else {
        let raw = BasisPoints::from_ratio(
            liquid_assets.to_decimal().max(Decimal::ZERO),
            required_gap_fund.to_decimal(),
        );
        let value = raw.min(BasisPoints::ONE_HUNDRED_PERCENT);
        RatioValue::Defined {
            value,
            band: classify(value, &config.bands.retirement_fund_adequacy),
        }
    };

    let months_to_retirement = person
        .age_on(profile.as_of)
        .map(|age| retirement_age.saturating_sub(age) * 12);
    let required_monthly_saving = match months_to_retirement {
        Some(months) if months > 0 && shortfall > Money::ZERO => Some(
            solve_contribution(
                required_gap_fund,
                liquid_assets.max(Money::ZERO),
                config.assumed_return,
                months,
            )?
            .monthly_contribution,
        ),
        Some(_) => Some(Money::ZERO),
        None => None,
    };

    log::debug!(
        "gap for '{}': retire {} pension {} -> {} years, fund {} liquid {}",
        person.id,
        retirement_age,
        pension_start_age,
        gap_years,
        required_gap_fund,
        liquid_assets
    );

    Ok(GapReport {
        person: person.id.clone(),
        retirement_age,
        pension_start_age,
        gap_years,
        monthly_expense_during_gap,
        required_gap_fund,
        liquid_assets,
        shortfall,
        preparation_rate,
        months_to_retirement,
        required_monthly_saving,
    })
}
