use serde::{Deserialize, Serialize};

use crate::error::HouseholdFinanceError;
use crate::growth::MAX_PROJECTION_MONTHS;
use crate::profile::{MAX_LIFE_EXPECTANCY, MIN_RETIREMENT_AGE};
use crate::types::{BasisPoints, Money};
use crate::HouseholdFinanceResult;

// ---------------------------------------------------------------------------
// Ratio classification bands
// ---------------------------------------------------------------------------

/// Which side of the scale is healthy for a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandDirection {
    /// Debt-style ratios: smaller is safer.
    LowerIsBetter,
    /// Coverage-style ratios: larger is safer.
    HigherIsBetter,
}

/// Three-band classification cut-offs for one ratio.
///
/// For `LowerIsBetter`: `v <= stable` is stable, `v <= moderate` is moderate,
/// anything above is elevated. `HigherIsBetter` mirrors this with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandThreshold {
    pub direction: BandDirection,
    pub stable: BasisPoints,
    pub moderate: BasisPoints,
}

impl BandThreshold {
    pub const fn lower_is_better(stable: i64, moderate: i64) -> Self {
        Self {
            direction: BandDirection::LowerIsBetter,
            stable: BasisPoints::new(stable),
            moderate: BasisPoints::new(moderate),
        }
    }

    pub const fn higher_is_better(stable: i64, moderate: i64) -> Self {
        Self {
            direction: BandDirection::HigherIsBetter,
            stable: BasisPoints::new(stable),
            moderate: BasisPoints::new(moderate),
        }
    }

    fn validate(&self, name: &str) -> HouseholdFinanceResult<()> {
        let ordered = match self.direction {
            BandDirection::LowerIsBetter => self.stable <= self.moderate,
            BandDirection::HigherIsBetter => self.stable >= self.moderate,
        };
        if !ordered {
            return Err(HouseholdFinanceError::Configuration(format!(
                "band '{name}': stable cut-off {} and moderate cut-off {} are out of order for {:?}",
                self.stable.value(),
                self.moderate.value(),
                self.direction
            )));
        }
        Ok(())
    }
}

/// Classification bands for every ratio the engine reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioBands {
    pub savings_rate: BandThreshold,
    pub loan_to_value: BandThreshold,
    pub debt_to_income: BandThreshold,
    pub debt_service: BandThreshold,
    pub pension_replacement: BandThreshold,
    pub education_coverage: BandThreshold,
    pub retirement_fund_adequacy: BandThreshold,
}

impl Default for RatioBands {
    fn default() -> Self {
        Self {
            savings_rate: BandThreshold::higher_is_better(3000, 1000),
            loan_to_value: BandThreshold::lower_is_better(4000, 6000),
            debt_to_income: BandThreshold::lower_is_better(15000, 25000),
            debt_service: BandThreshold::lower_is_better(3000, 4000),
            pension_replacement: BandThreshold::higher_is_better(7000, 4000),
            education_coverage: BandThreshold::higher_is_better(8000, 4000),
            retirement_fund_adequacy: BandThreshold::higher_is_better(10000, 7000),
        }
    }
}

impl RatioBands {
    fn validate(&self) -> HouseholdFinanceResult<()> {
        self.savings_rate.validate("savings_rate")?;
        self.loan_to_value.validate("loan_to_value")?;
        self.debt_to_income.validate("debt_to_income")?;
        self.debt_service.validate("debt_service")?;
        self.pension_replacement.validate("pension_replacement")?;
        self.education_coverage.validate("education_coverage")?;
        self.retirement_fund_adequacy
            .validate("retirement_fund_adequacy")
    }
}

// ---------------------------------------------------------------------------
// National pension
// ---------------------------------------------------------------------------

/// One point of the early/late claiming curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimingAdjustment {
    pub age: u32,
    /// Change to the full-age benefit; negative when claiming early.
    pub delta: BasisPoints,
}

/// Constants of the earnings-indexed national pension formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NationalPensionConfig {
    /// Economy-wide average indexed monthly income.
    pub a_value: Money,
    /// Floor and ceiling applied to the individual average (B value).
    pub b_min: Money,
    pub b_max: Money,
    /// Benefit accrued per contribution year, as a share of (A + B).
    pub accrual_rate: BasisPoints,
    pub contribution_start_age: u32,
    pub max_contribution_years: u32,
    pub full_benefit_age: u32,
    /// Lookup table, ascending by age. Ages outside the table cannot claim.
    pub claiming_adjustments: Vec<ClaimingAdjustment>,
}

impl Default for NationalPensionConfig {
    fn default() -> Self {
        let schedule: [(u32, i64); 11] = [
            (60, -3000),
            (61, -2400),
            (62, -1800),
            (63, -1200),
            (64, -600),
            (65, 0),
            (66, 720),
            (67, 1440),
            (68, 2160),
            (69, 2880),
            (70, 3600),
        ];
        Self {
            a_value: Money::from_major(2_989_237),
            b_min: Money::from_major(390_000),
            b_max: Money::from_major(6_170_000),
            accrual_rate: BasisPoints::new(50),
            contribution_start_age: 27,
            max_contribution_years: 40,
            full_benefit_age: 65,
            claiming_adjustments: schedule
                .iter()
                .map(|&(age, delta)| ClaimingAdjustment {
                    age,
                    delta: BasisPoints::new(delta),
                })
                .collect(),
        }
    }
}

impl NationalPensionConfig {
    fn validate(&self) -> HouseholdFinanceResult<()> {
        if self.a_value.is_negative() {
            return Err(HouseholdFinanceError::Configuration(
                "national_pension.a_value must be >= 0".into(),
            ));
        }
        if self.b_min.is_negative() || self.b_min > self.b_max {
            return Err(HouseholdFinanceError::Configuration(format!(
                "national_pension B band is malformed: min {} max {}",
                self.b_min, self.b_max
            )));
        }
        if self.accrual_rate <= BasisPoints::ZERO {
            return Err(HouseholdFinanceError::Configuration(
                "national_pension.accrual_rate must be > 0".into(),
            ));
        }
        if self.max_contribution_years == 0 {
            return Err(HouseholdFinanceError::Configuration(
                "national_pension.max_contribution_years must be > 0".into(),
            ));
        }
        if self.claiming_adjustments.is_empty() {
            return Err(HouseholdFinanceError::Configuration(
                "national_pension.claiming_adjustments is empty".into(),
            ));
        }
        for pair in self.claiming_adjustments.windows(2) {
            if pair[1].age <= pair[0].age {
                return Err(HouseholdFinanceError::Configuration(format!(
                    "claiming_adjustments must be strictly ascending by age (found {} after {})",
                    pair[1].age, pair[0].age
                )));
            }
        }
        if let Some(bad) = self
            .claiming_adjustments
            .iter()
            .find(|a| a.delta.value() <= -BasisPoints::ONE_HUNDRED_PERCENT.value())
        {
            return Err(HouseholdFinanceError::Configuration(format!(
                "claiming adjustment at age {} removes the whole benefit",
                bad.age
            )));
        }
        match self.adjustment_for(self.full_benefit_age) {
            Some(delta) if delta == BasisPoints::ZERO => Ok(()),
            Some(delta) => Err(HouseholdFinanceError::Configuration(format!(
                "full benefit age {} must carry a zero adjustment, found {}",
                self.full_benefit_age,
                delta.value()
            ))),
            None => Err(HouseholdFinanceError::Configuration(format!(
                "claiming_adjustments has no entry for full benefit age {}",
                self.full_benefit_age
            ))),
        }
    }

    /// Exact-age lookup in the claiming curve.
    pub fn adjustment_for(&self, age: u32) -> Option<BasisPoints> {
        self.claiming_adjustments
            .binary_search_by_key(&age, |a| a.age)
            .ok()
            .map(|idx| self.claiming_adjustments[idx].delta)
    }

    pub fn claiming_window(&self) -> (u32, u32) {
        let first = self.claiming_adjustments.first().map_or(0, |a| a.age);
        let last = self.claiming_adjustments.last().map_or(0, |a| a.age);
        (first, last)
    }
}

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// All tunable data the engine consumes. Every field has a default, so a
/// partial JSON document only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub bands: RatioBands,
    pub national_pension: NationalPensionConfig,
    /// Amortization term assumed for debts without a remaining term.
    pub default_amortization_months: u32,
    /// Household horizon used when the profile does not set one.
    pub default_life_expectancy: u32,
    /// Payout period used to annuitize accumulated pension balances.
    pub annuity_payout_years: u32,
    pub annuitization_rate: BasisPoints,
    /// Return assumed when projecting liquid assets to retirement.
    pub assumed_return: BasisPoints,
    /// Claim ages compared in the combined household report.
    pub report_claim_ages: Vec<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bands: RatioBands::default(),
            national_pension: NationalPensionConfig::default(),
            default_amortization_months: 360,
            default_life_expectancy: 90,
            annuity_payout_years: 20,
            annuitization_rate: BasisPoints::new(300),
            assumed_return: BasisPoints::new(400),
            report_claim_ages: vec![60, 62, 65, 67, 70],
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> HouseholdFinanceResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| HouseholdFinanceError::Configuration(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HouseholdFinanceResult<()> {
        self.bands.validate()?;
        self.national_pension.validate()?;
        if !(1..=MAX_PROJECTION_MONTHS).contains(&self.default_amortization_months) {
            return Err(HouseholdFinanceError::Configuration(format!(
                "default_amortization_months {} is outside [1, {MAX_PROJECTION_MONTHS}]",
                self.default_amortization_months
            )));
        }
        if !(MIN_RETIREMENT_AGE..=MAX_LIFE_EXPECTANCY).contains(&self.default_life_expectancy) {
            return Err(HouseholdFinanceError::Configuration(format!(
                "default_life_expectancy {} is outside [{MIN_RETIREMENT_AGE}, {MAX_LIFE_EXPECTANCY}]",
                self.default_life_expectancy
            )));
        }
        let max_payout_years = MAX_PROJECTION_MONTHS / 12;
        if !(1..=max_payout_years).contains(&self.annuity_payout_years) {
            return Err(HouseholdFinanceError::Configuration(format!(
                "annuity_payout_years {} is outside [1, {max_payout_years}]",
                self.annuity_payout_years
            )));
        }
        if self.annuitization_rate < BasisPoints::ZERO {
            return Err(HouseholdFinanceError::Configuration(
                "annuitization_rate must be >= 0".into(),
            ));
        }
        self.annuitization_rate
            .ensure_annual_rate("annuitization_rate")
            .map_err(|e| HouseholdFinanceError::Configuration(e.to_string()))?;
        self.assumed_return
            .ensure_annual_rate("assumed_return")
            .map_err(|e| HouseholdFinanceError::Configuration(e.to_string()))?;
        Ok(())
    }
}
