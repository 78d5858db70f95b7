//! Household retirement projection engine.
//!
//! Turns a household's raw financial inputs (cash flows, assets, debts and
//! pension entitlements) into the derived metrics used to drive guidance:
//! net worth, savings rate, debt ratios, pension replacement, growth
//! projections, claiming-age comparisons and the retirement funding gap.
//!
//! Every public operation is pure. Monetary amounts are integer minor units
//! ([`Money`]) and percentages are fixed-point basis points ([`BasisPoints`]).

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod gap;
pub mod growth;
pub mod national_pension;
pub mod normalize;
pub mod profile;
pub mod ratios;
pub mod scenarios;
pub mod snapshot;
pub mod types;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::HouseholdFinanceError;
pub use types::*;

/// Standard result type for all household-finance operations
pub type HouseholdFinanceResult<T> = Result<T, HouseholdFinanceError>;
