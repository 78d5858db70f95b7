use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::NationalPensionConfig;
use crate::error::HouseholdFinanceError;
use crate::profile::Person;
use crate::types::{BasisPoints, Money};
use crate::HouseholdFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Indexed monthly income for one contribution year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeYear {
    pub year: i32,
    pub monthly_income: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionEstimate {
    pub a_value: Money,
    /// Average of the income history before clamping.
    pub raw_b_value: Money,
    /// B value after the configured floor and ceiling.
    pub b_value: Money,
    pub contribution_start_age: u32,
    pub contribution_years: u32,
    /// Benefit if claimed at the full-benefit age.
    pub full_age_monthly_benefit: Money,
    pub claim_age: u32,
    pub adjustment: BasisPoints,
    pub monthly_benefit: Money,
}

// ---------------------------------------------------------------------------
// Formula
// ---------------------------------------------------------------------------

/// Average of the indexed monthly incomes, ties to even.
fn average_income(history: &[IncomeYear]) -> HouseholdFinanceResult<Money> {
    if history.is_empty() {
        return Err(HouseholdFinanceError::InsufficientData(
            "income history is empty; the B value cannot be derived".into(),
        ));
    }
    let mut total = Decimal::ZERO;
    for (i, entry) in history.iter().enumerate() {
        entry
            .monthly_income
            .ensure_non_negative(&format!("income_history[{i}].monthly_income"))?;
        total += entry.monthly_income.to_decimal();
    }
    Money::from_decimal_rounded(total / Decimal::from(history.len()))
}

/// Age contributions began: first history year minus birth year when both
/// are known, the configured default otherwise.
fn contribution_start_age(
    config: &NationalPensionConfig,
    person: &Person,
    history: &[IncomeYear],
) -> u32 {
    let first_year = history.iter().map(|h| h.year).min();
    match (person.date_of_birth, first_year) {
        (Some(dob), Some(first)) if first >= dob.year() => (first - dob.year()) as u32,
        _ => config.contribution_start_age,
    }
}

/// Claiming-curve delta, or an error when the age is outside the window.
pub fn claiming_adjustment(
    config: &NationalPensionConfig,
    claim_age: u32,
) -> HouseholdFinanceResult<BasisPoints> {
    config.adjustment_for(claim_age).ok_or_else(|| {
        let (first, last) = config.claiming_window();
        HouseholdFinanceError::invalid(
            "claim_age",
            format!("{claim_age} is outside the claiming window [{first}, {last}]"),
        )
    })
}

fn apply_adjustment(full_age_benefit: Decimal, delta: BasisPoints) -> Decimal {
    full_age_benefit * (Decimal::ONE + delta.to_rate())
}

/// Full-age benefit scaled by the claiming curve.
pub fn adjust_for_claim_age(
    config: &NationalPensionConfig,
    full_age_benefit: Money,
    claim_age: u32,
) -> HouseholdFinanceResult<Money> {
    full_age_benefit.ensure_non_negative("full_age_benefit")?;
    let delta = claiming_adjustment(config, claim_age)?;
    Money::from_decimal_rounded(apply_adjustment(full_age_benefit.to_decimal(), delta))
}

/// `(A + B) × contributionYears × accrualRate`, adjusted for the claim age.
///
/// `contributionYears = clamp(claimAge − startAge, 0, maxYears)`.
pub fn estimate_national_pension(
    config: &NationalPensionConfig,
    person: &Person,
    income_history: &[IncomeYear],
    claim_age: u32,
) -> HouseholdFinanceResult<PensionEstimate> {
    if !person.role.plans_retirement() {
        return Err(HouseholdFinanceError::invalid(
            "person.role",
            format!("'{}' does not accrue a national pension", person.id),
        ));
    }
    let delta = claiming_adjustment(config, claim_age)?;
    let raw_b_value = average_income(income_history)?;
    let b_value = raw_b_value.max(config.b_min).min(config.b_max);

    let start_age = contribution_start_age(config, person, income_history);
    let contribution_years = claim_age
        .saturating_sub(start_age)
        .min(config.max_contribution_years);

    let full_age = (config.a_value + b_value).to_decimal()
        * Decimal::from(contribution_years)
        * config.accrual_rate.to_rate();

    log::debug!(
        "national pension for '{}': B {} -> {}, {} contribution years, claim age {}",
        person.id,
        raw_b_value,
        b_value,
        contribution_years,
        claim_age
    );

    Ok(PensionEstimate {
        a_value: config.a_value,
        raw_b_value,
        b_value,
        contribution_start_age: start_age,
        contribution_years,
        full_age_monthly_benefit: Money::from_decimal_rounded(full_age)?,
        claim_age,
        adjustment: delta,
        monthly_benefit: Money::from_decimal_rounded(apply_adjustment(full_age, delta))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClaimingAdjustment;
    use crate::profile::PersonRole;
    use chrono::NaiveDate;

    fn config() -> NationalPensionConfig {
        NationalPensionConfig {
            a_value: Money::from_major(3_000),
            b_min: Money::from_major(500),
            b_max: Money::from_major(6_000),
            accrual_rate: BasisPoints::new(100),
            contribution_start_age: 25,
            max_contribution_years: 40,
            full_benefit_age: 65,
            claiming_adjustments: vec![
                ClaimingAdjustment { age: 63, delta: BasisPoints::new(-1200) },
                ClaimingAdjustment { age: 64, delta: BasisPoints::new(-600) },
                ClaimingAdjustment { age: 65, delta: BasisPoints::ZERO },
                ClaimingAdjustment { age: 66, delta: BasisPoints::new(720) },
            ],
        }
    }

    fn person(role: PersonRole) -> Person {
        Person {
            id: "me".into(),
            role,
            date_of_birth: None,
            retirement_age: None,
            pension_start_age: None,
        }
    }

    fn history(monthly_major: i64) -> Vec<IncomeYear> {
        (2000..2010)
            .map(|year| IncomeYear {
                year,
                monthly_income: Money::from_major(monthly_major),
            })
            .collect()
    }

    #[test]
    fn test_full_age_formula() {
        // (3000 + 4000) * 40 years * 1% = 2800
        let est = estimate_national_pension(
            &config(),
            &person(PersonRole::Primary),
            &history(4_000),
            65,
        )
        .unwrap();
        assert_eq!(est.contribution_years, 40);
        assert_eq!(est.full_age_monthly_benefit, Money::from_major(2_800));
        assert_eq!(est.monthly_benefit, Money::from_major(2_800));
    }

    #[test]
    fn test_b_value_is_clamped() {
        let est = estimate_national_pension(
            &config(),
            &person(PersonRole::Primary),
            &history(9_000),
            65,
        )
        .unwrap();
        assert_eq!(est.raw_b_value, Money::from_major(9_000));
        assert_eq!(est.b_value, Money::from_major(6_000));

        let low = estimate_national_pension(
            &config(),
            &person(PersonRole::Primary),
            &history(100),
            65,
        )
        .unwrap();
        assert_eq!(low.b_value, Money::from_major(500));
    }

    #[test]
    fn test_early_claim_reduces_benefit() {
        // 38 years: (3000 + 4000) * 38 * 1% = 2660, then -12%
        let est = estimate_national_pension(
            &config(),
            &person(PersonRole::Primary),
            &history(4_000),
            63,
        )
        .unwrap();
        assert_eq!(est.contribution_years, 38);
        assert_eq!(est.full_age_monthly_benefit, Money::from_major(2_660));
        assert_eq!(est.monthly_benefit, Money::from_minor(234_080));
    }

    #[test]
    fn test_contribution_years_capped_and_floored() {
        let mut cfg = config();
        cfg.max_contribution_years = 10;
        let est = estimate_national_pension(
            &cfg,
            &person(PersonRole::Primary),
            &history(4_000),
            65,
        )
        .unwrap();
        assert_eq!(est.contribution_years, 10);

        cfg.contribution_start_age = 70;
        let none = estimate_national_pension(
            &cfg,
            &person(PersonRole::Primary),
            &history(4_000),
            65,
        )
        .unwrap();
        assert_eq!(none.contribution_years, 0);
        assert_eq!(none.monthly_benefit, Money::ZERO);
    }

    #[test]
    fn test_start_age_from_birth_year() {
        let mut p = person(PersonRole::Spouse);
        p.date_of_birth = NaiveDate::from_ymd_opt(1975, 3, 1);
        let est = estimate_national_pension(&config(), &p, &history(4_000), 65).unwrap();
        assert_eq!(est.contribution_start_age, 25);
        assert_eq!(est.contribution_years, 40);
    }

    #[test]
    fn test_claim_age_outside_window() {
        let err = estimate_national_pension(
            &config(),
            &person(PersonRole::Primary),
            &history(4_000),
            62,
        )
        .unwrap_err();
        assert!(matches!(err, HouseholdFinanceError::InvalidInput { .. }));
    }

    #[test]
    fn test_child_has_no_pension() {
        let child = person(PersonRole::Child);
        assert!(estimate_national_pension(&config(), &child, &history(4_000), 65).is_err());
    }

    #[test]
    fn test_empty_history() {
        let err = estimate_national_pension(
            &config(),
            &person(PersonRole::Primary),
            &[],
            65,
        )
        .unwrap_err();
        assert!(matches!(err, HouseholdFinanceError::InsufficientData(_)));
    }

    #[test]
    fn test_adjust_for_claim_age() {
        let late = adjust_for_claim_age(&config(), Money::from_major(1_000), 66).unwrap();
        assert_eq!(late, Money::from_major(1_072));
    }
}
