mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::growth::{CompareReturnsArgs, PaymentArgs, ProjectArgs, RequiredContributionArgs};
use commands::household::{GapArgs, ProfileArgs};
use commands::pension::{CompareClaimingArgs, NationalPensionArgs};

/// Household retirement projections
#[derive(Parser)]
#[command(
    name = "hfe",
    version,
    about = "Household retirement projections",
    long_about = "Derives net worth, health ratios, growth projections, national pension \
                  estimates, claiming-age comparisons and the retirement funding gap from a \
                  household profile. Amounts are integer minor units, rates basis points."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (JSON or YAML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a household profile into a financial snapshot
    Snapshot(ProfileArgs),
    /// Banded health ratios for a household profile
    Ratios(ProfileArgs),
    /// Retirement-to-pension funding gap
    Gap(GapArgs),
    /// Snapshot, gaps and claiming comparison in one report
    Analyze(ProfileArgs),
    /// Project a balance forward under monthly compounding
    Project(ProjectArgs),
    /// Level monthly contribution needed to reach a target
    RequiredContribution(RequiredContributionArgs),
    /// Level monthly payment that retires a loan
    Payment(PaymentArgs),
    /// Estimate the national pension from an income history
    NationalPension(NationalPensionArgs),
    /// Compare cumulative national pension across claiming ages
    CompareClaiming(CompareClaimingArgs),
    /// Compare final balances across annual return assumptions
    CompareReturns(CompareReturnsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn run(
    command: Commands,
    config: Option<&str>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let engine = commands::build_engine(config)?;

    match command {
        Commands::Snapshot(args) => commands::household::run_snapshot(&engine, args),
        Commands::Ratios(args) => commands::household::run_ratios(&engine, args),
        Commands::Gap(args) => commands::household::run_gap(&engine, args),
        Commands::Analyze(args) => commands::household::run_analyze(&engine, args),
        Commands::Project(args) => commands::growth::run_project(args),
        Commands::RequiredContribution(args) => commands::growth::run_required_contribution(args),
        Commands::Payment(args) => commands::growth::run_payment(args),
        Commands::NationalPension(args) => commands::pension::run_national_pension(&engine, args),
        Commands::CompareClaiming(args) => commands::pension::run_compare_claiming(&engine, args),
        Commands::CompareReturns(args) => commands::growth::run_compare_returns(args),
        Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command, cli.config.as_deref()) {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
