use clap::Args;
use serde::Serialize;
use serde_json::Value;

use household_finance_core::growth::{
    self, amortized_payment, projection_path, required_contribution, ContributionSchedule,
    ProjectionYear,
};
use household_finance_core::scenarios::compare_return_scenarios;
use household_finance_core::{with_metadata, BasisPoints, Money};

/// Arguments for a forward projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Opening balance, in minor units
    #[arg(long, default_value_t = 0)]
    pub principal: i64,

    /// Level monthly contribution, in minor units
    #[arg(long, default_value_t = 0)]
    pub contribution: i64,

    /// Annual return in basis points (500 = 5%)
    #[arg(long, allow_hyphen_values = true)]
    pub rate_bp: i64,

    /// Horizon in months
    #[arg(long)]
    pub months: u32,

    /// Include the year-by-year path
    #[arg(long)]
    pub path: bool,
}

/// Arguments for the inverse solve
#[derive(Args)]
pub struct RequiredContributionArgs {
    /// Target balance, in minor units
    #[arg(long)]
    pub target: i64,

    /// Opening balance, in minor units
    #[arg(long, default_value_t = 0)]
    pub principal: i64,

    /// Annual return in basis points
    #[arg(long, allow_hyphen_values = true)]
    pub rate_bp: i64,

    /// Horizon in months
    #[arg(long)]
    pub months: u32,
}

/// Arguments for a level loan payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Outstanding principal, in minor units
    #[arg(long)]
    pub principal: i64,

    /// Annual interest rate in basis points
    #[arg(long)]
    pub rate_bp: i64,

    /// Remaining term in months
    #[arg(long)]
    pub months: u32,
}

/// Arguments for a return-scenario comparison
#[derive(Args)]
pub struct CompareReturnsArgs {
    /// Opening balance, in minor units
    #[arg(long)]
    pub balance: i64,

    /// Level monthly contribution, in minor units
    #[arg(long, default_value_t = 0)]
    pub contribution: i64,

    /// Horizon in years
    #[arg(long)]
    pub years: u32,

    /// Comma-separated annual returns in basis points (e.g. "200,500,800")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub rates_bp: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct ProjectionOutput {
    final_balance: Money,
    months: u32,
    annual_rate: BasisPoints,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<Vec<ProjectionYear>>,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let principal = Money::from_minor(args.principal);
    let contribution = Money::from_minor(args.contribution);
    let rate = BasisPoints::new(args.rate_bp);

    let final_balance = growth::project_balance(principal, contribution, rate, args.months)?;
    let path = if args.path {
        Some(projection_path(
            principal,
            &ContributionSchedule::Level(contribution),
            rate,
            args.months,
        )?)
    } else {
        None
    };

    let output = with_metadata(
        "Monthly compounding, end-of-month contributions",
        Vec::new(),
        ProjectionOutput {
            final_balance,
            months: args.months,
            annual_rate: rate,
            path,
        },
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_required_contribution(
    args: RequiredContributionArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let result = required_contribution(
        Money::from_minor(args.target),
        Money::from_minor(args.principal),
        BasisPoints::new(args.rate_bp),
        args.months,
    )?;
    let output = with_metadata(
        "Closed-form level contribution, rounded up to the next minor unit",
        Vec::new(),
        result,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = amortized_payment(
        Money::from_minor(args.principal),
        BasisPoints::new(args.rate_bp),
        args.months,
    )?;
    let output = with_metadata(
        "Level-payment amortization, rounded up to the next minor unit",
        Vec::new(),
        result,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_compare_returns(args: CompareReturnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rates: Vec<BasisPoints> = args.rates_bp.iter().copied().map(BasisPoints::new).collect();
    let result = compare_return_scenarios(
        Money::from_minor(args.balance),
        Money::from_minor(args.contribution),
        args.years,
        &rates,
    )?;
    let output = with_metadata(
        "Final balance per annual return, ranked highest first",
        Vec::new(),
        result,
    );
    Ok(serde_json::to_value(output)?)
}
