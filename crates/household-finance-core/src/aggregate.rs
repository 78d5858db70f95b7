//! Summation of normalized records into household totals.

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, NormalizedFlow};
use crate::profile::{
    AssetClass, CashFlowCategory, DebtKind, HouseholdProfile, Housing, PensionBenefit,
};
use crate::types::Money;
use crate::HouseholdFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Asset totals per class. `cash` already includes a rental deposit and the
/// net of one-time cash flows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTotals {
    pub cash: Money,
    pub investment: Money,
    pub real_estate_equity: Money,
}

impl AssetTotals {
    /// Assets that can fund spending without selling property.
    pub fn liquid(&self) -> Money {
        self.cash + self.investment
    }
}

/// Owner-occupied home position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingPosition {
    pub property_value: Money,
    pub loan_balance: Money,
    pub equity: Money,
}

/// Pension entitlements summed by representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionTotals {
    pub known_monthly_benefit: Money,
    pub accumulated_balance: Money,
}

/// Everything the ratio, gap and snapshot layers need from raw records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdTotals {
    pub monthly_income: Money,
    pub monthly_expense: Money,
    pub one_time_net: Money,
    pub assets: AssetTotals,
    pub total_debt: Money,
    pub housing: Option<HousingPosition>,
    pub net_worth: Money,
    pub pensions: PensionTotals,
}

impl HouseholdTotals {
    /// Validate the profile at the boundary, then sum it.
    pub fn from_profile(profile: &HouseholdProfile) -> HouseholdFinanceResult<Self> {
        profile.validate()?;
        let housing = housing_position(profile);
        Ok(Self {
            monthly_income: monthly_income(profile),
            monthly_expense: monthly_expense(profile),
            one_time_net: one_time_net(profile),
            assets: total_assets_by_class(profile),
            total_debt: total_debt(profile),
            housing,
            net_worth: net_worth(profile),
            pensions: pension_totals(profile),
        })
    }
}

// ---------------------------------------------------------------------------
// Sums
// ---------------------------------------------------------------------------

fn monthly_flow(profile: &HouseholdProfile, income: bool) -> Money {
    profile
        .cash_flows
        .iter()
        .filter(|f| f.category.is_income() == income)
        .filter_map(|f| match normalize(f) {
            NormalizedFlow::Monthly(m) => Some(m),
            NormalizedFlow::OneTime(_) => None,
        })
        .sum()
}

pub fn monthly_income(profile: &HouseholdProfile) -> Money {
    monthly_flow(profile, true)
}

pub fn monthly_expense(profile: &HouseholdProfile) -> Money {
    monthly_flow(profile, false)
}

/// Monthly amount for a single category.
pub fn monthly_by_category(profile: &HouseholdProfile, category: CashFlowCategory) -> Money {
    profile
        .cash_flows
        .iter()
        .filter(|f| f.category == category)
        .filter_map(|f| match normalize(f) {
            NormalizedFlow::Monthly(m) => Some(m),
            NormalizedFlow::OneTime(_) => None,
        })
        .sum()
}

/// One-time income minus one-time expense.
pub fn one_time_net(profile: &HouseholdProfile) -> Money {
    profile
        .cash_flows
        .iter()
        .filter_map(|f| match normalize(f) {
            NormalizedFlow::OneTime(m) if f.category.is_income() => Some(m),
            NormalizedFlow::OneTime(m) => Some(-m),
            NormalizedFlow::Monthly(_) => None,
        })
        .sum()
}

pub fn total_assets_by_class(profile: &HouseholdProfile) -> AssetTotals {
    let mut totals = AssetTotals::default();
    for asset in &profile.assets {
        match asset.class {
            AssetClass::Cash => totals.cash += asset.value,
            AssetClass::Investment => totals.investment += asset.value,
            AssetClass::RealEstateEquity => totals.real_estate_equity += asset.value,
        }
    }
    if let Some(Housing::Rented { deposit }) = profile.housing {
        totals.cash += deposit;
    }
    totals.cash += one_time_net(profile);
    totals
}

pub fn total_debt(profile: &HouseholdProfile) -> Money {
    profile.debts.iter().map(|d| d.principal).sum()
}

pub fn mortgage_balance(profile: &HouseholdProfile) -> Money {
    profile
        .debts
        .iter()
        .filter(|d| d.kind == DebtKind::Mortgage)
        .map(|d| d.principal)
        .sum()
}

/// Equity in the home, only for owner-occupied housing.
pub fn housing_position(profile: &HouseholdProfile) -> Option<HousingPosition> {
    match profile.housing {
        Some(Housing::OwnerOccupied { property_value }) => {
            let loan_balance = mortgage_balance(profile);
            Some(HousingPosition {
                property_value,
                loan_balance,
                equity: property_value - loan_balance,
            })
        }
        _ => None,
    }
}

/// Cash + investment + other real-estate equity + home equity − debt.
///
/// A mortgage netted into home equity is not subtracted a second time.
pub fn net_worth(profile: &HouseholdProfile) -> Money {
    let assets = total_assets_by_class(profile);
    let debt = total_debt(profile);
    let (home_equity, netted_debt) = match housing_position(profile) {
        Some(home) => (home.equity, home.loan_balance),
        None => (Money::ZERO, Money::ZERO),
    };
    assets.cash + assets.investment + assets.real_estate_equity + home_equity
        - (debt - netted_debt)
}

pub fn pension_totals(profile: &HouseholdProfile) -> PensionTotals {
    let mut totals = PensionTotals::default();
    for pension in &profile.pensions {
        match pension.benefit {
            PensionBenefit::MonthlyBenefit(m) => totals.known_monthly_benefit += m,
            PensionBenefit::AccumulatedBalance(b) => totals.accumulated_balance += b,
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{AssetRecord, CashFlowRecord, DebtRecord, Period};
    use crate::types::BasisPoints;
    use chrono::NaiveDate;

    fn profile() -> HouseholdProfile {
        HouseholdProfile::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "me")
    }

    fn flow(category: CashFlowCategory, major: i64, period: Period) -> CashFlowRecord {
        CashFlowRecord {
            owner: "me".into(),
            category,
            amount: Money::from_major(major),
            period,
        }
    }

    fn debt(kind: DebtKind, major: i64) -> DebtRecord {
        DebtRecord {
            owner: "me".into(),
            kind,
            principal: Money::from_major(major),
            annual_rate: BasisPoints::new(400),
            remaining_months: None,
        }
    }

    #[test]
    fn test_empty_profile_sums_to_zero() {
        let totals = HouseholdTotals::from_profile(&profile()).unwrap();
        assert_eq!(totals.monthly_income, Money::ZERO);
        assert_eq!(totals.monthly_expense, Money::ZERO);
        assert_eq!(totals.net_worth, Money::ZERO);
        assert_eq!(totals.housing, None);
    }

    #[test]
    fn test_income_mixes_periods() {
        let mut p = profile();
        p.cash_flows.push(flow(CashFlowCategory::LaborIncome, 4_000, Period::Monthly));
        p.cash_flows.push(flow(CashFlowCategory::BusinessIncome, 24_000, Period::Yearly));
        p.cash_flows.push(flow(CashFlowCategory::FixedExpense, 1_500, Period::Monthly));
        p.cash_flows.push(flow(CashFlowCategory::VariableExpense, 6_000, Period::Yearly));
        assert_eq!(monthly_income(&p), Money::from_major(6_000));
        assert_eq!(monthly_expense(&p), Money::from_major(2_000));
        assert_eq!(
            monthly_by_category(&p, CashFlowCategory::BusinessIncome),
            Money::from_major(2_000)
        );
    }

    #[test]
    fn test_one_time_flows_settle_into_cash() {
        let mut p = profile();
        p.cash_flows.push(flow(CashFlowCategory::LaborIncome, 10_000, Period::OneTime));
        p.cash_flows.push(flow(CashFlowCategory::FixedExpense, 3_000, Period::OneTime));
        assert_eq!(monthly_income(&p), Money::ZERO);
        assert_eq!(total_assets_by_class(&p).cash, Money::from_major(7_000));
    }

    #[test]
    fn test_owner_occupied_net_worth_nets_mortgage_once() {
        let mut p = profile();
        p.assets.push(AssetRecord {
            owner: "me".into(),
            class: AssetClass::Cash,
            value: Money::from_major(50_000),
            expected_return: None,
        });
        p.assets.push(AssetRecord {
            owner: "me".into(),
            class: AssetClass::Investment,
            value: Money::from_major(100_000),
            expected_return: None,
        });
        p.housing = Some(Housing::OwnerOccupied {
            property_value: Money::from_major(500_000),
        });
        p.debts.push(debt(DebtKind::Mortgage, 300_000));
        p.debts.push(debt(DebtKind::Personal, 20_000));

        let home = housing_position(&p).unwrap();
        assert_eq!(home.equity, Money::from_major(200_000));
        assert_eq!(total_debt(&p), Money::from_major(320_000));
        // 50k + 100k + 200k equity - 20k personal loan
        assert_eq!(net_worth(&p), Money::from_major(330_000));
    }

    #[test]
    fn test_rented_deposit_is_cash_not_equity() {
        let mut p = profile();
        p.housing = Some(Housing::Rented {
            deposit: Money::from_major(80_000),
        });
        p.debts.push(debt(DebtKind::DepositLoan, 30_000));
        assert_eq!(housing_position(&p), None);
        assert_eq!(total_assets_by_class(&p).cash, Money::from_major(80_000));
        assert_eq!(net_worth(&p), Money::from_major(50_000));
    }

    #[test]
    fn test_invalid_profile_rejected_at_boundary() {
        let mut p = profile();
        p.debts.push(DebtRecord {
            annual_rate: BasisPoints::new(-100),
            ..debt(DebtKind::Personal, 1)
        });
        assert!(HouseholdTotals::from_profile(&p).is_err());
    }
}
