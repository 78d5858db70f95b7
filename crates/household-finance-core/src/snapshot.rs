use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::{AssetTotals, HouseholdTotals, HousingPosition, PensionTotals};
use crate::config::EngineConfig;
use crate::growth::{amortized_payment, project_balance, solve_contribution};
use crate::profile::HouseholdProfile;
use crate::ratios::{monthly_debt_service, ratio_report, RatioInputs, RatioReport};
use crate::types::Money;
use crate::HouseholdFinanceResult;

/// Liquid assets of the household carried forward to the primary person's
/// retirement, with the current monthly surplus saved every month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementProjection {
    pub months_to_retirement: u32,
    pub monthly_saving: Money,
    pub projected_fund: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_fund: Option<Money>,
    /// Level saving needed to reach the target instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_monthly_saving: Option<Money>,
}

/// Derived view of a profile. Always rebuilt from the profile, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub as_of: NaiveDate,
    pub monthly_income: Money,
    pub monthly_expense: Money,
    pub monthly_surplus: Money,
    pub assets: AssetTotals,
    pub total_debt: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing: Option<HousingPosition>,
    pub net_worth: Money,
    pub pensions: PensionTotals,
    /// Known benefits plus annuitized balances.
    pub monthly_pension_income: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retirement_projection: Option<RetirementProjection>,
    pub ratio_inputs: RatioInputs,
    pub ratios: RatioReport,
}

fn annuitized_pension(
    pensions: &PensionTotals,
    config: &EngineConfig,
) -> HouseholdFinanceResult<Money> {
    let payout_months = config.annuity_payout_years * 12;
    let annuity = amortized_payment(
        pensions.accumulated_balance,
        config.annuitization_rate,
        payout_months,
    )?;
    Ok(pensions.known_monthly_benefit + annuity.monthly_payment)
}

fn retirement_projection(
    profile: &HouseholdProfile,
    totals: &HouseholdTotals,
    config: &EngineConfig,
) -> HouseholdFinanceResult<Option<RetirementProjection>> {
    let Some(primary) = profile.primary() else {
        return Ok(None);
    };
    let (Some(age), Some(retirement_age)) =
        (primary.age_on(profile.as_of), profile.retirement_age_of(primary))
    else {
        return Ok(None);
    };

    let months = retirement_age.saturating_sub(age) * 12;
    let liquid = totals.assets.liquid().max(Money::ZERO);
    let monthly_saving = (totals.monthly_income - totals.monthly_expense).max(Money::ZERO);
    let projected_fund = project_balance(liquid, monthly_saving, config.assumed_return, months)?;

    let target_fund = profile.targets.retirement_fund;
    let required_monthly_saving = match target_fund {
        Some(target) if months > 0 => Some(
            solve_contribution(target, liquid, config.assumed_return, months)?
                .monthly_contribution,
        ),
        _ => None,
    };

    Ok(Some(RetirementProjection {
        months_to_retirement: months,
        monthly_saving,
        projected_fund,
        target_fund,
        required_monthly_saving,
    }))
}

pub fn build_snapshot(
    profile: &HouseholdProfile,
    config: &EngineConfig,
) -> HouseholdFinanceResult<FinancialSnapshot> {
    let totals = HouseholdTotals::from_profile(profile)?;
    let monthly_pension_income = annuitized_pension(&totals.pensions, config)?;
    let debt_service = monthly_debt_service(&profile.debts, config.default_amortization_months)?;
    let projection = retirement_projection(profile, &totals, config)?;

    let ratio_inputs = RatioInputs {
        monthly_income: totals.monthly_income,
        monthly_expense: totals.monthly_expense,
        total_debt: totals.total_debt,
        housing: totals.housing,
        monthly_debt_service: debt_service,
        monthly_pension_income,
        education_target: profile.education_goals.iter().map(|g| g.target_cost).sum(),
        education_saved: profile.education_goals.iter().map(|g| g.saved).sum(),
        projected_retirement_fund: projection.as_ref().map(|p| p.projected_fund),
        target_retirement_fund: profile.targets.retirement_fund,
    };
    let ratios = ratio_report(&ratio_inputs, &config.bands);

    log::trace!(
        "snapshot as of {}: income {} expense {} net worth {}",
        profile.as_of,
        totals.monthly_income,
        totals.monthly_expense,
        totals.net_worth
    );

    Ok(FinancialSnapshot {
        as_of: profile.as_of,
        monthly_income: totals.monthly_income,
        monthly_expense: totals.monthly_expense,
        monthly_surplus: totals.monthly_income - totals.monthly_expense,
        assets: totals.assets,
        total_debt: totals.total_debt,
        housing: totals.housing,
        net_worth: totals.net_worth,
        pensions: totals.pensions,
        monthly_pension_income,
        retirement_projection: projection,
        ratio_inputs,
        ratios,
    })
}
