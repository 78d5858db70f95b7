use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use household_finance_core::growth::{self, ContributionSchedule};
use household_finance_core::national_pension::IncomeYear;
use household_finance_core::profile::{HouseholdProfile, Person};
use household_finance_core::scenarios;
use household_finance_core::{BasisPoints, Engine, Money};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Engine from an optional JSON configuration; defaults when absent.
fn engine(config_json: Option<String>) -> NapiResult<Engine> {
    match config_json {
        Some(json) => Engine::from_json(&json).map_err(to_napi_error),
        None => Ok(Engine::default()),
    }
}

fn parse_profile(profile_json: &str) -> NapiResult<HouseholdProfile> {
    serde_json::from_str(profile_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Household
// ---------------------------------------------------------------------------

#[napi]
pub fn household_snapshot(profile_json: String, config_json: Option<String>) -> NapiResult<String> {
    let profile = parse_profile(&profile_json)?;
    let output = engine(config_json)?.snapshot(&profile).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn household_ratios(profile_json: String, config_json: Option<String>) -> NapiResult<String> {
    let profile = parse_profile(&profile_json)?;
    let engine = engine(config_json)?;
    let snapshot = engine.snapshot(&profile).map_err(to_napi_error)?;
    serde_json::to_string(&engine.ratios(&snapshot)).map_err(to_napi_error)
}

#[napi]
pub fn retirement_gap(profile_json: String, config_json: Option<String>) -> NapiResult<String> {
    let profile = parse_profile(&profile_json)?;
    let output = engine(config_json)?
        .retirement_gap(&profile)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_household(profile_json: String, config_json: Option<String>) -> NapiResult<String> {
    let profile = parse_profile(&profile_json)?;
    let output = engine(config_json)?.analyze(&profile).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ProjectionRequest {
    #[serde(default)]
    principal: Money,
    schedule: ContributionSchedule,
    annual_rate: BasisPoints,
    months: u32,
}

#[derive(Deserialize)]
struct ContributionRequest {
    target: Money,
    #[serde(default)]
    principal: Money,
    annual_rate: BasisPoints,
    months: u32,
}

#[derive(Deserialize)]
struct PaymentRequest {
    principal: Money,
    annual_rate: BasisPoints,
    months: u32,
}

#[derive(Deserialize)]
struct ReturnScenarioRequest {
    balance: Money,
    #[serde(default)]
    monthly_contribution: Money,
    years: u32,
    rates: Vec<BasisPoints>,
}

#[napi]
pub fn project_balance(input_json: String) -> NapiResult<String> {
    let input: ProjectionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = growth::project_schedule(
        input.principal,
        &input.schedule,
        input.annual_rate,
        input.months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn projection_path(input_json: String) -> NapiResult<String> {
    let input: ProjectionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = growth::projection_path(
        input.principal,
        &input.schedule,
        input.annual_rate,
        input.months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn required_contribution(input_json: String) -> NapiResult<String> {
    let input: ContributionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = growth::required_contribution(
        input.target,
        input.principal,
        input.annual_rate,
        input.months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortized_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = growth::amortized_payment(input.principal, input.annual_rate, input.months)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_return_scenarios(input_json: String) -> NapiResult<String> {
    let input: ReturnScenarioRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = scenarios::compare_return_scenarios(
        input.balance,
        input.monthly_contribution,
        input.years,
        &input.rates,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// National pension
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PensionRequest {
    person: Person,
    income_history: Vec<IncomeYear>,
    claim_age: Option<u32>,
}

#[derive(Deserialize)]
struct ClaimingRequest {
    full_age_benefit: Money,
    life_expectancy: Option<u32>,
    ages: Option<Vec<u32>>,
}

#[napi]
pub fn estimate_national_pension(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: PensionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let engine = engine(config_json)?;
    let claim_age = input
        .claim_age
        .unwrap_or(engine.config().national_pension.full_benefit_age);
    let output = engine
        .estimate_national_pension(&input.person, &input.income_history, claim_age)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_claiming_ages(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: ClaimingRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let engine = engine(config_json)?;
    let life_expectancy = input
        .life_expectancy
        .unwrap_or(engine.config().default_life_expectancy);
    let ages = input
        .ages
        .unwrap_or_else(|| engine.config().report_claim_ages.clone());
    let output = engine
        .compare_claiming_ages(input.full_age_benefit, life_expectancy, &ages)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
