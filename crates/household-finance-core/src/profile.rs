use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::HouseholdFinanceError;
use crate::growth::MAX_PROJECTION_MONTHS;
use crate::types::{BasisPoints, Money};
use crate::HouseholdFinanceResult;

pub const MIN_RETIREMENT_AGE: u32 = 30;
pub const MAX_RETIREMENT_AGE: u32 = 100;
pub const MAX_LIFE_EXPECTANCY: u32 = 120;

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    #[serde(rename = "self")]
    Primary,
    Spouse,
    Child,
    DependentParent,
}

impl PersonRole {
    /// Only the earning adults carry retirement and pension parameters.
    pub fn plans_retirement(self) -> bool {
        matches!(self, PersonRole::Primary | PersonRole::Spouse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub role: PersonRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_age: Option<u32>,
    /// Age at which national pension payments start, when it differs from
    /// the statutory full-benefit age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pension_start_age: Option<u32>,
}

impl Person {
    /// Completed years of age on `on`; `None` without a date of birth.
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        if dob > on {
            return None;
        }
        let mut age = on.year() - dob.year();
        if (on.month(), on.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Monthly,
    Yearly,
    /// Not part of the recurring flow; settles against cash-like assets.
    OneTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowCategory {
    LaborIncome,
    BusinessIncome,
    FixedExpense,
    VariableExpense,
}

impl CashFlowCategory {
    pub fn is_income(self) -> bool {
        matches!(
            self,
            CashFlowCategory::LaborIncome | CashFlowCategory::BusinessIncome
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowRecord {
    pub owner: String,
    pub category: CashFlowCategory,
    pub amount: Money,
    pub period: Period,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Cash,
    Investment,
    RealEstateEquity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub owner: String,
    pub class: AssetClass,
    pub value: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<BasisPoints>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    /// Secured by the owner-occupied home; drives LTV and housing equity.
    Mortgage,
    /// Loan backing a rental deposit.
    DepositLoan,
    Personal,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtRecord {
    pub owner: String,
    pub kind: DebtKind,
    pub principal: Money,
    pub annual_rate: BasisPoints,
    /// Remaining amortization term; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_months: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PensionTier {
    National,
    Occupational,
    Personal,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum PensionBenefit {
    MonthlyBenefit(Money),
    /// Balance to be annuitized at retirement.
    AccumulatedBalance(Money),
}

impl PensionBenefit {
    pub fn amount(self) -> Money {
        match self {
            PensionBenefit::MonthlyBenefit(m) | PensionBenefit::AccumulatedBalance(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionEntitlement {
    pub owner: String,
    pub tier: PensionTier,
    pub benefit: PensionBenefit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Housing {
    OwnerOccupied { property_value: Money },
    Rented { deposit: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationGoal {
    pub child: String,
    pub target_cost: Money,
    pub saved: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementTargets {
    /// Household-level retirement age, used when a person has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_fund: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_expectancy: Option<u32>,
    /// Monthly spending planned for retirement; current spending otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_monthly_expense: Option<Money>,
}

// ---------------------------------------------------------------------------
// Household profile
// ---------------------------------------------------------------------------

/// Aggregate root handed to the engine on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdProfile {
    /// Valuation date; ages are measured against it.
    pub as_of: NaiveDate,
    pub people: Vec<Person>,
    #[serde(default)]
    pub cash_flows: Vec<CashFlowRecord>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    #[serde(default)]
    pub debts: Vec<DebtRecord>,
    #[serde(default)]
    pub pensions: Vec<PensionEntitlement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing: Option<Housing>,
    #[serde(default)]
    pub education_goals: Vec<EducationGoal>,
    #[serde(default)]
    pub targets: RetirementTargets,
}

impl HouseholdProfile {
    /// A profile with only the primary person and nothing else.
    pub fn empty(as_of: NaiveDate, primary_id: &str) -> Self {
        Self {
            as_of,
            people: vec![Person {
                id: primary_id.to_string(),
                role: PersonRole::Primary,
                date_of_birth: None,
                retirement_age: None,
                pension_start_age: None,
            }],
            cash_flows: Vec::new(),
            assets: Vec::new(),
            debts: Vec::new(),
            pensions: Vec::new(),
            housing: None,
            education_goals: Vec::new(),
            targets: RetirementTargets::default(),
        }
    }

    pub fn primary(&self) -> Option<&Person> {
        self.people.iter().find(|p| p.role == PersonRole::Primary)
    }

    pub fn spouse(&self) -> Option<&Person> {
        self.people.iter().find(|p| p.role == PersonRole::Spouse)
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    /// Retirement age for a person, falling back to the household target.
    pub fn retirement_age_of(&self, person: &Person) -> Option<u32> {
        person.retirement_age.or(self.targets.retirement_age)
    }

    pub fn life_expectancy_or(&self, default: u32) -> u32 {
        self.targets.life_expectancy.unwrap_or(default)
    }

    /// Boundary validation. Invalid values are reported, never coerced.
    pub fn validate(&self) -> HouseholdFinanceResult<()> {
        self.validate_people()?;

        let ids: HashSet<&str> = self.people.iter().map(|p| p.id.as_str()).collect();
        let known = |field: &str, owner: &str| -> HouseholdFinanceResult<()> {
            if ids.contains(owner) {
                Ok(())
            } else {
                Err(HouseholdFinanceError::invalid(
                    field,
                    format!("owner '{owner}' is not a member of the household"),
                ))
            }
        };

        for (i, flow) in self.cash_flows.iter().enumerate() {
            known(&format!("cash_flows[{i}].owner"), &flow.owner)?;
            flow.amount
                .ensure_non_negative(&format!("cash_flows[{i}].amount"))?;
        }
        for (i, asset) in self.assets.iter().enumerate() {
            known(&format!("assets[{i}].owner"), &asset.owner)?;
            asset.value.ensure_non_negative(&format!("assets[{i}].value"))?;
            if let Some(rate) = asset.expected_return {
                rate.ensure_annual_rate(&format!("assets[{i}].expected_return"))?;
            }
        }
        for (i, debt) in self.debts.iter().enumerate() {
            known(&format!("debts[{i}].owner"), &debt.owner)?;
            debt.principal
                .ensure_non_negative(&format!("debts[{i}].principal"))?;
            let field = format!("debts[{i}].annual_rate");
            if debt.annual_rate < BasisPoints::ZERO {
                return Err(HouseholdFinanceError::invalid(
                    field,
                    format!("interest rate must be >= 0, got {}", debt.annual_rate.value()),
                ));
            }
            debt.annual_rate.ensure_annual_rate(&field)?;
            if let Some(months) = debt.remaining_months {
                if !(1..=MAX_PROJECTION_MONTHS).contains(&months) {
                    return Err(HouseholdFinanceError::invalid(
                        format!("debts[{i}].remaining_months"),
                        format!(
                            "remaining term must be within [1, {MAX_PROJECTION_MONTHS}] months, \
                             got {months}"
                        ),
                    ));
                }
            }
        }
        for (i, pension) in self.pensions.iter().enumerate() {
            known(&format!("pensions[{i}].owner"), &pension.owner)?;
            pension
                .benefit
                .amount()
                .ensure_non_negative(&format!("pensions[{i}].benefit"))?;
        }
        match self.housing {
            Some(Housing::OwnerOccupied { property_value }) => {
                property_value.ensure_non_negative("housing.property_value")?;
            }
            Some(Housing::Rented { deposit }) => {
                deposit.ensure_non_negative("housing.deposit")?;
            }
            None => {}
        }
        for (i, goal) in self.education_goals.iter().enumerate() {
            match self.person(&goal.child) {
                Some(p) if p.role == PersonRole::Child => {}
                _ => {
                    return Err(HouseholdFinanceError::invalid(
                        format!("education_goals[{i}].child"),
                        format!("'{}' is not a child of the household", goal.child),
                    ))
                }
            }
            goal.target_cost
                .ensure_non_negative(&format!("education_goals[{i}].target_cost"))?;
            goal.saved
                .ensure_non_negative(&format!("education_goals[{i}].saved"))?;
        }
        self.validate_targets()
    }

    fn validate_people(&self) -> HouseholdFinanceResult<()> {
        let primaries = self
            .people
            .iter()
            .filter(|p| p.role == PersonRole::Primary)
            .count();
        if primaries != 1 {
            return Err(HouseholdFinanceError::invalid(
                "people",
                format!("exactly one 'self' person is required, found {primaries}"),
            ));
        }
        if self
            .people
            .iter()
            .filter(|p| p.role == PersonRole::Spouse)
            .count()
            > 1
        {
            return Err(HouseholdFinanceError::invalid(
                "people",
                "at most one spouse is allowed",
            ));
        }

        let mut seen = HashSet::new();
        for (i, person) in self.people.iter().enumerate() {
            if !seen.insert(person.id.as_str()) {
                return Err(HouseholdFinanceError::invalid(
                    format!("people[{i}].id"),
                    format!("duplicate person id '{}'", person.id),
                ));
            }
            if let Some(dob) = person.date_of_birth {
                if dob > self.as_of {
                    return Err(HouseholdFinanceError::invalid(
                        format!("people[{i}].date_of_birth"),
                        format!("{dob} is after the valuation date {}", self.as_of),
                    ));
                }
            }
            for (name, age) in [
                ("retirement_age", person.retirement_age),
                ("pension_start_age", person.pension_start_age),
            ] {
                let Some(age) = age else { continue };
                if !person.role.plans_retirement() {
                    return Err(HouseholdFinanceError::invalid(
                        format!("people[{i}].{name}"),
                        format!("only self or spouse may carry a {name}"),
                    ));
                }
                ensure_retirement_age(&format!("people[{i}].{name}"), age)?;
            }
        }
        Ok(())
    }

    fn validate_targets(&self) -> HouseholdFinanceResult<()> {
        if let Some(age) = self.targets.retirement_age {
            ensure_retirement_age("targets.retirement_age", age)?;
        }
        if let Some(fund) = self.targets.retirement_fund {
            fund.ensure_non_negative("targets.retirement_fund")?;
        }
        if let Some(expense) = self.targets.retirement_monthly_expense {
            expense.ensure_non_negative("targets.retirement_monthly_expense")?;
        }
        if let Some(horizon) = self.targets.life_expectancy {
            ensure_life_expectancy("targets.life_expectancy", horizon)?;
        }
        Ok(())
    }
}

pub(crate) fn ensure_life_expectancy(field: &str, age: u32) -> HouseholdFinanceResult<u32> {
    if !(MIN_RETIREMENT_AGE..=MAX_LIFE_EXPECTANCY).contains(&age) {
        return Err(HouseholdFinanceError::invalid(
            field,
            format!("must be within [{MIN_RETIREMENT_AGE}, {MAX_LIFE_EXPECTANCY}], got {age}"),
        ));
    }
    Ok(age)
}

pub(crate) fn ensure_retirement_age(field: &str, age: u32) -> HouseholdFinanceResult<u32> {
    if !(MIN_RETIREMENT_AGE..=MAX_RETIREMENT_AGE).contains(&age) {
        return Err(HouseholdFinanceError::invalid(
            field,
            format!("must be within [{MIN_RETIREMENT_AGE}, {MAX_RETIREMENT_AGE}], got {age}"),
        ));
    }
    Ok(age)
}
