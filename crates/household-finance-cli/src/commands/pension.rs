use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use household_finance_core::national_pension::IncomeYear;
use household_finance_core::profile::Person;
use household_finance_core::{with_metadata, Engine, Money};

use super::read_input;

/// Arguments for a national pension estimate
#[derive(Args)]
pub struct NationalPensionArgs {
    /// Path to a JSON/YAML file with `person` and `income_history`
    #[arg(long)]
    pub input: Option<String>,

    /// Claiming age (defaults to the request, then the full benefit age)
    #[arg(long)]
    pub claim_age: Option<u32>,
}

/// Arguments for a claiming-age comparison
#[derive(Args)]
pub struct CompareClaimingArgs {
    /// Monthly benefit at the full benefit age, in minor units
    #[arg(long)]
    pub benefit: i64,

    /// Age through which payments are summed
    #[arg(long)]
    pub life_expectancy: Option<u32>,

    /// Comma-separated candidate ages (defaults to the configured report ages)
    #[arg(long, value_delimiter = ',')]
    pub ages: Option<Vec<u32>>,
}

#[derive(Debug, Deserialize)]
struct NationalPensionRequest {
    person: Person,
    income_history: Vec<IncomeYear>,
    #[serde(default)]
    claim_age: Option<u32>,
}

pub fn run_national_pension(
    engine: &Engine,
    args: NationalPensionArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: NationalPensionRequest =
        read_input(args.input.as_deref(), "the national pension estimate")?;
    let claim_age = args
        .claim_age
        .or(request.claim_age)
        .unwrap_or(engine.config().national_pension.full_benefit_age);

    let estimate =
        engine.estimate_national_pension(&request.person, &request.income_history, claim_age)?;
    let output = with_metadata(
        "Earnings-indexed national pension with claiming-age adjustment",
        Vec::new(),
        estimate,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_compare_claiming(
    engine: &Engine,
    args: CompareClaimingArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let life_expectancy = args
        .life_expectancy
        .unwrap_or(engine.config().default_life_expectancy);
    let ages = args
        .ages
        .unwrap_or_else(|| engine.config().report_claim_ages.clone());

    let result = engine.compare_claiming_ages(
        Money::from_minor(args.benefit),
        life_expectancy,
        &ages,
    )?;
    let output = with_metadata(
        "Cumulative benefit from claiming age to life expectancy, ranked highest first",
        Vec::new(),
        result,
    );
    Ok(serde_json::to_value(output)?)
}
