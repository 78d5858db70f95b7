use chrono::NaiveDate;
use household_finance_core::config::ClaimingAdjustment;
use household_finance_core::growth::{amortized_payment, project_balance, required_contribution};
use household_finance_core::national_pension::IncomeYear;
use household_finance_core::profile::{
    AssetClass, AssetRecord, CashFlowCategory, CashFlowRecord, DebtKind, DebtRecord,
    EducationGoal, HouseholdProfile, Housing, PensionBenefit, PensionEntitlement, PensionTier,
    Period, Person, PersonRole,
};
use household_finance_core::ratios::{Band, RatioValue, UndefinedReason};
use household_finance_core::scenarios::{compare_return_scenarios, ScenarioParameter};
use household_finance_core::{BasisPoints, Engine, HouseholdFinanceError, Money};
use pretty_assertions::assert_eq;

// ===========================================================================
// Fixtures
// ===========================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn person(id: &str, role: PersonRole, born: i32, retire: Option<u32>) -> Person {
    Person {
        id: id.into(),
        role,
        date_of_birth: Some(date(born, 1, 1)),
        retirement_age: retire,
        pension_start_age: None,
    }
}

/// Two earners, one child, owner-occupied home with a mortgage.
fn sample_household() -> HouseholdProfile {
    let mut profile = HouseholdProfile::empty(date(2024, 1, 1), "me");
    profile.people = vec![
        person("me", PersonRole::Primary, 1979, Some(60)),
        person("partner", PersonRole::Spouse, 1981, Some(62)),
        Person {
            id: "kid".into(),
            role: PersonRole::Child,
            date_of_birth: Some(date(2015, 5, 1)),
            retirement_age: None,
            pension_start_age: None,
        },
    ];
    profile.cash_flows = vec![
        CashFlowRecord {
            owner: "me".into(),
            category: CashFlowCategory::LaborIncome,
            amount: Money::from_major(6_000),
            period: Period::Monthly,
        },
        CashFlowRecord {
            owner: "partner".into(),
            category: CashFlowCategory::BusinessIncome,
            amount: Money::from_major(24_000),
            period: Period::Yearly,
        },
        CashFlowRecord {
            owner: "me".into(),
            category: CashFlowCategory::FixedExpense,
            amount: Money::from_major(3_500),
            period: Period::Monthly,
        },
        CashFlowRecord {
            owner: "partner".into(),
            category: CashFlowCategory::VariableExpense,
            amount: Money::from_major(18_000),
            period: Period::Yearly,
        },
    ];
    profile.assets = vec![
        AssetRecord {
            owner: "me".into(),
            class: AssetClass::Cash,
            value: Money::from_major(40_000),
            expected_return: None,
        },
        AssetRecord {
            owner: "partner".into(),
            class: AssetClass::Investment,
            value: Money::from_major(160_000),
            expected_return: Some(BasisPoints::new(550)),
        },
    ];
    profile.debts = vec![DebtRecord {
        owner: "me".into(),
        kind: DebtKind::Mortgage,
        principal: Money::from_major(250_000),
        annual_rate: BasisPoints::new(450),
        remaining_months: Some(300),
    }];
    profile.housing = Some(Housing::OwnerOccupied {
        property_value: Money::from_major(500_000),
    });
    profile.pensions = vec![
        PensionEntitlement {
            owner: "me".into(),
            tier: PensionTier::National,
            benefit: PensionBenefit::MonthlyBenefit(Money::from_major(1_200)),
        },
        PensionEntitlement {
            owner: "partner".into(),
            tier: PensionTier::Occupational,
            benefit: PensionBenefit::AccumulatedBalance(Money::from_major(90_000)),
        },
    ];
    profile.education_goals = vec![EducationGoal {
        child: "kid".into(),
        target_cost: Money::from_major(80_000),
        saved: Money::from_major(20_000),
    }];
    profile.targets.retirement_fund = Some(Money::from_major(1_200_000));
    profile
}

// ===========================================================================
// Snapshot and ratios
// ===========================================================================

#[test]
fn test_snapshot_totals() {
    let snap = Engine::default().snapshot(&sample_household()).unwrap();

    // 6000 + 24000/12
    assert_eq!(snap.monthly_income, Money::from_major(8_000));
    // 3500 + 18000/12
    assert_eq!(snap.monthly_expense, Money::from_major(5_000));
    assert_eq!(snap.monthly_surplus, Money::from_major(3_000));
    // 40k + 160k + (500k - 250k)
    assert_eq!(snap.net_worth, Money::from_major(450_000));
    assert_eq!(snap.housing.unwrap().equity, Money::from_major(250_000));
}

#[test]
fn test_ratio_report_values() {
    let snap = Engine::default().snapshot(&sample_household()).unwrap();
    let ratios = &snap.ratios;

    // 3000 / 8000 = 37.5%
    assert_eq!(ratios.savings_rate.value(), Some(BasisPoints::new(3750)));
    assert_eq!(ratios.savings_rate.band(), Some(Band::Stable));
    // 250k / 500k = 50%
    assert_eq!(ratios.loan_to_value.value(), Some(BasisPoints::new(5000)));
    assert_eq!(ratios.loan_to_value.band(), Some(Band::Moderate));
    // 250k / 96k
    assert_eq!(ratios.debt_to_income.value(), Some(BasisPoints::new(26042)));
    assert_eq!(ratios.debt_to_income.band(), Some(Band::Elevated));
    // 20k / 80k
    assert_eq!(ratios.education_coverage.value(), Some(BasisPoints::new(2500)));
    assert!(ratios.debt_service.value().unwrap() > BasisPoints::ZERO);
    assert!(ratios.pension_replacement.value().unwrap() > BasisPoints::ZERO);
    assert!(ratios.retirement_fund_adequacy.value().is_some());
}

#[test]
fn test_no_income_household() {
    let profile = HouseholdProfile::empty(date(2024, 1, 1), "me");
    let snap = Engine::default().snapshot(&profile).unwrap();
    assert_eq!(
        snap.ratios.savings_rate,
        RatioValue::Undefined { reason: UndefinedReason::NoIncome }
    );
    assert_eq!(
        snap.ratios.debt_to_income,
        RatioValue::Undefined { reason: UndefinedReason::NoIncome }
    );
    assert_eq!(
        snap.ratios.loan_to_value,
        RatioValue::Undefined { reason: UndefinedReason::NotOwnerOccupied }
    );
}

#[test]
fn test_invalid_profile_surfaces_field() {
    let mut profile = sample_household();
    profile.people[0].retirement_age = Some(101);
    match Engine::default().snapshot(&profile) {
        Err(HouseholdFinanceError::InvalidInput { field, .. }) => {
            assert_eq!(field, "people[0].retirement_age")
        }
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn test_rerun_is_bit_identical() {
    let engine = Engine::default();
    let profile = sample_household();
    let a = serde_json::to_string(&engine.analyze(&profile).unwrap()).unwrap();
    let b = serde_json::to_string(&engine.analyze(&profile).unwrap()).unwrap();
    assert_eq!(a, b);
}

// ===========================================================================
// Growth projector
// ===========================================================================

#[test]
fn test_annuity_scenario_matches_closed_form() {
    let fv = project_balance(
        Money::ZERO,
        Money::from_minor(750_000),
        BasisPoints::new(500),
        240,
    )
    .unwrap();
    let i = 0.05f64 / 12.0;
    let closed = 750_000f64 * ((1.0 + i).powi(240) - 1.0) / i;
    assert!((fv.minor() as f64 - closed).abs() <= 1.0);
}

#[test]
fn test_required_contribution_round_trip() {
    let target = Money::from_major(500_000);
    let principal = Money::from_major(20_000);
    let solved = required_contribution(target, principal, BasisPoints::new(500), 240).unwrap();
    let reached = project_balance(
        principal,
        solved.monthly_contribution,
        BasisPoints::new(500),
        240,
    )
    .unwrap();
    assert!(reached >= target);
    // one minor unit less per month falls short
    let short = project_balance(
        principal,
        solved.monthly_contribution - Money::from_minor(1),
        BasisPoints::new(500),
        240,
    )
    .unwrap();
    assert!(short < target || solved.exact_monthly_contribution.fract().is_zero());
}

#[test]
fn test_amortized_payment_covers_principal() {
    let p = amortized_payment(Money::from_major(250_000), BasisPoints::new(450), 300).unwrap();
    assert!(p.total_paid > Money::from_major(250_000));
    assert_eq!(p.total_interest, p.total_paid - Money::from_major(250_000));
}

// ===========================================================================
// National pension and scenarios
// ===========================================================================

#[test]
fn test_claiming_ages_monotone_table_arg_max() {
    let engine = Engine::default();
    let cmp = engine
        .compare_claiming_ages(Money::from_major(1_000), 90, &[60, 62, 65, 67, 70])
        .unwrap();
    for candidate in &cmp.ranked {
        assert!(cmp.best.outcome >= candidate.outcome);
    }
    assert_eq!(cmp.best.rank, 1);
    // 1000 * 1.36 * 240 months beats 1000 * 0.70 * 360 months
    assert_eq!(cmp.best.parameter, ScenarioParameter::ClaimAge(70));
}

#[test]
fn test_custom_adjustment_table_from_json() {
    let json = r#"{
        "national_pension": {
            "full_benefit_age": 64,
            "claiming_adjustments": [
                {"age": 63, "delta": -500},
                {"age": 64, "delta": 0},
                {"age": 65, "delta": 800}
            ]
        }
    }"#;
    let engine = Engine::from_json(json).unwrap();
    assert_eq!(
        engine.config().national_pension.claiming_adjustments[2],
        ClaimingAdjustment { age: 65, delta: BasisPoints::new(800) }
    );
    let cmp = engine.compare_claiming_ages(Money::from_major(1_000), 66, &[63, 64, 65]).unwrap();
    // 950 * 36 = 34,200 beats 1000 * 24 and 1080 * 12
    assert_eq!(cmp.best.parameter, ScenarioParameter::ClaimAge(63));
}

#[test]
fn test_estimate_national_pension_through_engine() {
    let engine = Engine::default();
    let me = person("me", PersonRole::Primary, 1979, Some(60));
    let history: Vec<IncomeYear> = (2006..2024)
        .map(|year| IncomeYear {
            year,
            monthly_income: Money::from_major(3_500_000),
        })
        .collect();
    let estimate = engine.estimate_national_pension(&me, &history, 65).unwrap();
    assert_eq!(estimate.contribution_start_age, 27);
    assert_eq!(estimate.contribution_years, 38);
    assert_eq!(estimate.adjustment, BasisPoints::ZERO);
    assert_eq!(estimate.monthly_benefit, estimate.full_age_monthly_benefit);
}

#[test]
fn test_return_scenarios_report_spread() {
    let rates = [BasisPoints::new(200), BasisPoints::new(500), BasisPoints::new(800)];
    let cmp = compare_return_scenarios(
        Money::from_major(100_000),
        Money::from_major(500),
        20,
        &rates,
    )
    .unwrap();
    assert_eq!(cmp.best.parameter, ScenarioParameter::AnnualReturn(BasisPoints::new(800)));
    assert_eq!(cmp.worst.parameter, ScenarioParameter::AnnualReturn(BasisPoints::new(200)));
    assert!(cmp.spread > Money::ZERO);
}

// ===========================================================================
// Gap analyzer
// ===========================================================================

#[test]
fn test_gap_when_retiring_at_pension_age() {
    let mut profile = sample_household();
    profile.people[0].retirement_age = Some(65);
    let gap = Engine::default().retirement_gap(&profile).unwrap();
    assert_eq!(gap.gap_years, 0);
    assert_eq!(gap.required_gap_fund, Money::ZERO);
    assert_eq!(
        gap.preparation_rate,
        RatioValue::Undefined { reason: UndefinedReason::NoGap }
    );
}

#[test]
fn test_analyze_reports_both_earners() {
    let output = Engine::default().analyze(&sample_household()).unwrap();
    let report = output.result;
    let primary = report.retirement_gap.unwrap();
    let spouse = report.spouse_retirement_gap.unwrap();
    assert_eq!(primary.gap_years, 5);
    assert_eq!(spouse.gap_years, 3);
    assert!(report.claiming_ages.is_some());
    assert!(output.warnings.iter().any(|w| w.starts_with("Debt-to-income")));
    assert_eq!(output.metadata.monetary_unit, "minor_currency_unit_i64");
}
