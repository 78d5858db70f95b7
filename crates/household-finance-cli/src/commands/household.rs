use clap::Args;
use serde_json::Value;

use household_finance_core::aggregate::HouseholdTotals;
use household_finance_core::gap::gap_for_person;
use household_finance_core::profile::HouseholdProfile;
use household_finance_core::{with_metadata, Engine};

use super::read_input;

/// Arguments for commands that take a household profile
#[derive(Args)]
pub struct ProfileArgs {
    /// Path to the household profile (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the retirement gap
#[derive(Args)]
pub struct GapArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Person to analyse (defaults to the primary person)
    #[arg(long)]
    pub person: Option<String>,
}

fn load_profile(args: &ProfileArgs) -> Result<HouseholdProfile, Box<dyn std::error::Error>> {
    read_input(args.input.as_deref(), "the household profile")
}

pub fn run_snapshot(
    engine: &Engine,
    args: ProfileArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = load_profile(&args)?;
    let snapshot = engine.snapshot(&profile)?;
    let output = with_metadata("Household financial snapshot", Vec::new(), snapshot);
    Ok(serde_json::to_value(output)?)
}

pub fn run_ratios(engine: &Engine, args: ProfileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = load_profile(&args)?;
    let snapshot = engine.snapshot(&profile)?;
    let output = with_metadata(
        "Household health ratios (basis points, banded)",
        Vec::new(),
        engine.ratios(&snapshot),
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_gap(engine: &Engine, args: GapArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = load_profile(&args.profile)?;
    let report = match args.person.as_deref() {
        Some(id) => {
            let person = profile
                .person(id)
                .ok_or_else(|| format!("no person '{id}' in the household"))?;
            let totals = HouseholdTotals::from_profile(&profile)?;
            gap_for_person(&profile, &totals, person, engine.config())?
        }
        None => engine.retirement_gap(&profile)?,
    };
    let output = with_metadata(
        "Retirement-to-pension gap funded from liquid assets",
        Vec::new(),
        report,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_analyze(
    engine: &Engine,
    args: ProfileArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = load_profile(&args)?;
    Ok(serde_json::to_value(engine.analyze(&profile)?)?)
}
