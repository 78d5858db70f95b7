use serde::{Deserialize, Serialize};

use crate::aggregate::HouseholdTotals;
use crate::config::EngineConfig;
use crate::error::HouseholdFinanceError;
use crate::gap::{gap_for_person, retirement_gap, GapReport};
use crate::national_pension::{estimate_national_pension, IncomeYear, PensionEstimate};
use crate::profile::{HouseholdProfile, PensionBenefit, PensionTier, Person};
use crate::ratios::{ratio_report, Band, RatioReport, RatioValue};
use crate::scenarios::{compare_claiming_ages, ClaimingComparison};
use crate::snapshot::{build_snapshot, FinancialSnapshot};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::HouseholdFinanceResult;

/// Everything the guidance layer renders for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdReport {
    pub snapshot: FinancialSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retirement_gap: Option<GapReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_retirement_gap: Option<GapReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claiming_ages: Option<ClaimingComparison>,
}

/// The projection engine: a validated configuration and the operations
/// that depend on it. Holds no per-profile state.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Malformed lookup tables or bands fail here, not at call time.
    pub fn new(config: EngineConfig) -> HouseholdFinanceResult<Self> {
        config.validate()?;
        log::debug!(
            "engine configured: full benefit age {}, claiming window {:?}",
            config.national_pension.full_benefit_age,
            config.national_pension.claiming_window()
        );
        Ok(Self { config })
    }

    pub fn from_json(json: &str) -> HouseholdFinanceResult<Self> {
        Self::new(EngineConfig::from_json(json)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(
        &self,
        profile: &HouseholdProfile,
    ) -> HouseholdFinanceResult<FinancialSnapshot> {
        build_snapshot(profile, &self.config)
    }

    /// Re-derives the ratio report from a snapshot's inputs.
    pub fn ratios(&self, snapshot: &FinancialSnapshot) -> RatioReport {
        ratio_report(&snapshot.ratio_inputs, &self.config.bands)
    }

    pub fn estimate_national_pension(
        &self,
        person: &Person,
        income_history: &[IncomeYear],
        claim_age: u32,
    ) -> HouseholdFinanceResult<PensionEstimate> {
        estimate_national_pension(&self.config.national_pension, person, income_history, claim_age)
    }

    pub fn compare_claiming_ages(
        &self,
        full_age_benefit: Money,
        life_expectancy: u32,
        candidate_ages: &[u32],
    ) -> HouseholdFinanceResult<ClaimingComparison> {
        compare_claiming_ages(
            &self.config.national_pension,
            full_age_benefit,
            life_expectancy,
            candidate_ages,
        )
    }

    pub fn retirement_gap(&self, profile: &HouseholdProfile) -> HouseholdFinanceResult<GapReport> {
        retirement_gap(profile, &self.config)
    }

    /// Snapshot, gap reports and a claiming-age comparison in one envelope.
    /// Parts that lack the data they need are skipped with a warning.
    pub fn analyze(
        &self,
        profile: &HouseholdProfile,
    ) -> HouseholdFinanceResult<ComputationOutput<HouseholdReport>> {
        let mut warnings: Vec<String> = Vec::new();
        let snapshot = self.snapshot(profile)?;
        let totals = HouseholdTotals::from_profile(profile)?;

        let mut gap_of = |person: Option<&Person>| -> HouseholdFinanceResult<Option<GapReport>> {
            let Some(person) = person else {
                return Ok(None);
            };
            match gap_for_person(profile, &totals, person, &self.config) {
                Ok(report) => Ok(Some(report)),
                Err(HouseholdFinanceError::InsufficientData(reason)) => {
                    warnings.push(format!("Retirement gap skipped: {reason}"));
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        };
        let retirement_gap = gap_of(profile.primary())?;
        let spouse_retirement_gap = gap_of(profile.spouse())?;

        let claiming_ages = self.report_claiming(profile, &mut warnings)?;

        if snapshot.monthly_surplus.is_negative() {
            warnings.push(format!(
                "Monthly expense exceeds income by {} minor units",
                -snapshot.monthly_surplus.minor()
            ));
        }
        for (name, ratio) in ratio_entries(&snapshot.ratios) {
            if let RatioValue::Defined { value, band: Band::Elevated } = ratio {
                warnings.push(format!("{name} is in the elevated band ({value})"));
            }
        }

        log::debug!(
            "analyzed household as of {} with {} warnings",
            profile.as_of,
            warnings.len()
        );

        Ok(with_metadata(
            "Household retirement projection (monthly compounding, level-payment amortization, \
             earnings-indexed national pension)",
            warnings,
            HouseholdReport {
                snapshot,
                retirement_gap,
                spouse_retirement_gap,
                claiming_ages,
            },
        ))
    }

    fn report_claiming(
        &self,
        profile: &HouseholdProfile,
        warnings: &mut Vec<String>,
    ) -> HouseholdFinanceResult<Option<ClaimingComparison>> {
        let Some(primary) = profile.primary() else {
            return Ok(None);
        };
        let baseline: Money = profile
            .pensions
            .iter()
            .filter(|p| p.owner == primary.id && p.tier == PensionTier::National)
            .filter_map(|p| match p.benefit {
                PensionBenefit::MonthlyBenefit(m) => Some(m),
                PensionBenefit::AccumulatedBalance(_) => None,
            })
            .sum();
        if baseline.is_zero() {
            warnings.push("Claiming-age comparison skipped: no national pension benefit".into());
            return Ok(None);
        }

        let table = &self.config.national_pension;
        let ages: Vec<u32> = self
            .config
            .report_claim_ages
            .iter()
            .copied()
            .filter(|age| table.adjustment_for(*age).is_some())
            .collect();
        if ages.is_empty() {
            warnings.push(
                "Claiming-age comparison skipped: no report ages in the adjustment table".into(),
            );
            return Ok(None);
        }

        let horizon = profile.life_expectancy_or(self.config.default_life_expectancy);
        self.compare_claiming_ages(baseline, horizon, &ages).map(Some)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

fn ratio_entries(report: &RatioReport) -> [(&'static str, &RatioValue); 7] {
    [
        ("Savings rate", &report.savings_rate),
        ("Loan-to-value", &report.loan_to_value),
        ("Debt-to-income", &report.debt_to_income),
        ("Debt service ratio", &report.debt_service),
        ("Pension replacement", &report.pension_replacement),
        ("Education coverage", &report.education_coverage),
        ("Retirement fund adequacy", &report.retirement_fund_adequacy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClaimingAdjustment;
    use chrono::NaiveDate;

    fn profile() -> HouseholdProfile {
        HouseholdProfile::empty(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "me")
    }

    #[test]
    fn test_bad_table_fails_at_construction() {
        let mut config = EngineConfig::default();
        config.national_pension.claiming_adjustments = vec![ClaimingAdjustment {
            age: 60,
            delta: crate::types::BasisPoints::new(-3000),
        }];
        assert!(matches!(
            Engine::new(config),
            Err(HouseholdFinanceError::Configuration(_))
        ));
    }

    #[test]
    fn test_ratios_rebuilt_from_snapshot() {
        let engine = Engine::default();
        let snap = engine.snapshot(&profile()).unwrap();
        assert_eq!(engine.ratios(&snap), snap.ratios);
    }

    #[test]
    fn test_analyze_warns_on_missing_data() {
        let output = Engine::default().analyze(&profile()).unwrap();
        assert!(output.result.retirement_gap.is_none());
        assert!(output.result.claiming_ages.is_none());
        assert!(output.warnings.iter().any(|w| w.starts_with("Retirement gap skipped")));
        assert!(output.warnings.iter().any(|w| w.starts_with("Claiming-age comparison skipped")));
    }

    #[test]
    fn test_analyze_compares_claiming_ages() {
        let mut p = profile();
        p.pensions.push(crate::profile::PensionEntitlement {
            owner: "me".into(),
            tier: PensionTier::National,
            benefit: PensionBenefit::MonthlyBenefit(Money::from_major(1_000)),
        });
        let output = Engine::default().analyze(&p).unwrap();
        let claiming = output.result.claiming_ages.unwrap();
        assert_eq!(claiming.ranked.len(), 5);
        assert_eq!(claiming.life_expectancy, 90);
    }

    #[test]
    fn test_report_ages_filtered_by_adjustment_table() {
        let mut p = profile();
        p.pensions.push(crate::profile::PensionEntitlement {
            owner: "me".into(),
            tier: PensionTier::National,
            benefit: PensionBenefit::MonthlyBenefit(Money::from_major(1_000)),
        });
        let mut config = EngineConfig::default();
        config.report_claim_ages = vec![55, 61, 65, 75];
        let claiming = Engine::new(config.clone())
            .unwrap()
            .analyze(&p)
            .unwrap()
            .result
            .claiming_ages
            .unwrap();
        let mut ages: Vec<u32> = claiming
            .ranked
            .iter()
            .filter_map(|r| match r.parameter {
                crate::scenarios::ScenarioParameter::ClaimAge(age) => Some(age),
                crate::scenarios::ScenarioParameter::AnnualReturn(_) => None,
            })
            .collect();
        ages.sort_unstable();
        assert_eq!(ages, vec![61, 65]);

        config.report_claim_ages = vec![55, 75];
        let output = Engine::new(config).unwrap().analyze(&p).unwrap();
        assert!(output.result.claiming_ages.is_none());
        assert!(output
            .warnings
            .iter()
            .any(|w| w.ends_with("no report ages in the adjustment table")));
    }
}
