//! Parameter-grid comparisons over the growth projector and the national
//! pension estimator. Each candidate is evaluated independently; results
//! are collected in candidate order and only then ranked, so the outcome is
//! the same with or without the `parallel` feature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::NationalPensionConfig;
use crate::error::HouseholdFinanceError;
use crate::growth::project_balance;
use crate::national_pension::adjust_for_claim_age;
use crate::profile::ensure_life_expectancy;
use crate::types::{BasisPoints, Money};
use crate::HouseholdFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScenarioParameter {
    ClaimAge(u32),
    AnnualReturn(BasisPoints),
}

/// One evaluated candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// 1 is the best outcome.
    pub rank: usize,
    pub parameter: ScenarioParameter,
    /// Monthly benefit for claiming scenarios; absent for return scenarios.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_amount: Option<Money>,
    /// Lifetime payout or final balance.
    pub outcome: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimingComparison {
    pub life_expectancy: u32,
    pub ranked: Vec<ScenarioResult>,
    pub best: ScenarioResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnComparison {
    pub years: u32,
    pub ranked: Vec<ScenarioResult>,
    pub best: ScenarioResult,
    pub worst: ScenarioResult,
    /// Best minus worst final balance.
    pub spread: Money,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn evaluate<T, R, F>(candidates: &[T], f: F) -> HouseholdFinanceResult<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> HouseholdFinanceResult<R> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        candidates.par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        candidates.iter().map(f).collect()
    }
}

/// Highest outcome first; equal outcomes keep parameter order.
fn rank(mut results: Vec<ScenarioResult>) -> Vec<ScenarioResult> {
    results.sort_by(|a, b| match b.outcome.cmp(&a.outcome) {
        Ordering::Equal => a.parameter.cmp(&b.parameter),
        other => other,
    });
    for (idx, result) in results.iter_mut().enumerate() {
        result.rank = idx + 1;
    }
    results
}

fn ensure_candidates<T>(candidates: &[T], what: &str) -> HouseholdFinanceResult<()> {
    if candidates.is_empty() {
        return Err(HouseholdFinanceError::InsufficientData(format!(
            "at least one candidate {what} is required"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Comparisons
// ---------------------------------------------------------------------------

/// Lifetime payout for each claim age: adjusted monthly benefit times the
/// months remaining until `life_expectancy`.
pub fn compare_claiming_ages(
    config: &NationalPensionConfig,
    full_age_benefit: Money,
    life_expectancy: u32,
    candidate_ages: &[u32],
) -> HouseholdFinanceResult<ClaimingComparison> {
    ensure_candidates(candidate_ages, "claim age")?;
    ensure_life_expectancy("life_expectancy", life_expectancy)?;

    let results = evaluate(candidate_ages, |&age| {
        let monthly = adjust_for_claim_age(config, full_age_benefit, age)?;
        let months = i64::from(life_expectancy.saturating_sub(age)) * 12;
        let outcome = monthly.minor().checked_mul(months).ok_or_else(|| {
            HouseholdFinanceError::invalid(
                "full_age_benefit",
                format!("lifetime payout from age {age} exceeds the representable range"),
            )
        })?;
        Ok(ScenarioResult {
            rank: 0,
            parameter: ScenarioParameter::ClaimAge(age),
            monthly_amount: Some(monthly),
            outcome: Money::from_minor(outcome),
        })
    })?;

    let ranked = rank(results);
    let best = ranked[0];
    log::debug!(
        "compared {} claim ages to age {}: best {:?} pays {}",
        ranked.len(),
        life_expectancy,
        best.parameter,
        best.outcome
    );

    Ok(ClaimingComparison {
        life_expectancy,
        ranked,
        best,
    })
}

/// Final balance of `balance` (plus an optional level contribution) after
/// `years` under each candidate annual return.
pub fn compare_return_scenarios(
    balance: Money,
    monthly_contribution: Money,
    years: u32,
    candidate_rates: &[BasisPoints],
) -> HouseholdFinanceResult<ReturnComparison> {
    ensure_candidates(candidate_rates, "return rate")?;
    let months = years.checked_mul(12).ok_or_else(|| {
        HouseholdFinanceError::invalid("years", format!("{years} years is out of range"))
    })?;

    let results = evaluate(candidate_rates, |&rate| {
        Ok(ScenarioResult {
            rank: 0,
            parameter: ScenarioParameter::AnnualReturn(rate),
            monthly_amount: None,
            outcome: project_balance(balance, monthly_contribution, rate, months)?,
        })
    })?;

    let ranked = rank(results);
    let best = ranked[0];
    let worst = ranked[ranked.len() - 1];
    log::debug!(
        "compared {} return scenarios over {} years: spread {}",
        ranked.len(),
        years,
        best.outcome - worst.outcome
    );

    Ok(ReturnComparison {
        years,
        spread: best.outcome - worst.outcome,
        ranked,
        best,
        worst,
    })
}
