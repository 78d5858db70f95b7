use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::HouseholdFinanceError;
use crate::types::{BasisPoints, Money};
use crate::HouseholdFinanceResult;

/// Longest horizon accepted by the projector (100 years).
pub const MAX_PROJECTION_MONTHS: u32 = 1200;

const MONTHS_PER_YEAR_BPS: Decimal = dec!(120000);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Contributions made at the end of each simulated month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amounts", rename_all = "snake_case")]
pub enum ContributionSchedule {
    /// The same amount every month.
    Level(Money),
    /// One amount per month; months past the end contribute nothing.
    Irregular(Vec<Money>),
}

impl ContributionSchedule {
    fn amount_for(&self, month_index: usize) -> Money {
        match self {
            ContributionSchedule::Level(m) => *m,
            ContributionSchedule::Irregular(amounts) => {
                amounts.get(month_index).copied().unwrap_or(Money::ZERO)
            }
        }
    }

    fn validate(&self) -> HouseholdFinanceResult<()> {
        match self {
            ContributionSchedule::Level(m) => {
                m.ensure_non_negative("monthly_contribution")?;
            }
            ContributionSchedule::Irregular(amounts) => {
                for (i, m) in amounts.iter().enumerate() {
                    m.ensure_non_negative(&format!("contributions[{i}]"))?;
                }
            }
        }
        Ok(())
    }
}

/// Year-end row of a projection path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub contributions: Money,
    pub investment_return: Money,
    pub ending_balance: Money,
}

/// Output of the inverse solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredContribution {
    /// Level monthly contribution, rounded up so the target is reached.
    pub monthly_contribution: Money,
    /// Unrounded solution, in minor units.
    pub exact_monthly_contribution: Decimal,
    /// Target minus the grown principal; zero or negative means no saving is needed.
    pub shortfall: Money,
}

/// How a level payment was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    LevelPayment,
    /// The annuity formula is undefined at 0%; principal is split evenly.
    ZeroRateStraightLine,
    NoPrincipal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizedPayment {
    /// Rounded up to the next minor unit.
    pub monthly_payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    pub method: PaymentMethod,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn monthly_rate(annual_rate: BasisPoints) -> Decimal {
    Decimal::from(annual_rate.value()) / MONTHS_PER_YEAR_BPS
}

fn overflow(context: &str) -> HouseholdFinanceError {
    HouseholdFinanceError::invalid(context, "projection exceeds the representable range")
}

/// Compute (1 + rate)^n via iterative multiplication (avoids Decimal::powd drift).
fn compound(rate: Decimal, n: u32) -> HouseholdFinanceResult<Decimal> {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| overflow("compound_factor"))?;
    }
    Ok(result)
}

fn validate_horizon(months: u32) -> HouseholdFinanceResult<()> {
    if months > MAX_PROJECTION_MONTHS {
        return Err(HouseholdFinanceError::invalid(
            "months",
            format!("horizon must be <= {MAX_PROJECTION_MONTHS} months, got {months}"),
        ));
    }
    Ok(())
}

/// One month: interest on the opening balance, then the contribution.
fn step(
    balance: Decimal,
    rate: Decimal,
    contribution: Decimal,
) -> HouseholdFinanceResult<(Decimal, Decimal)> {
    let interest = balance
        .checked_mul(rate)
        .ok_or_else(|| overflow("balance"))?;
    let closing = balance
        .checked_add(interest)
        .and_then(|b| b.checked_add(contribution))
        .ok_or_else(|| overflow("balance"))?;
    Ok((closing, interest))
}

fn simulate(
    principal: Decimal,
    schedule: &ContributionSchedule,
    annual_rate: BasisPoints,
    months: u32,
) -> HouseholdFinanceResult<Decimal> {
    let rate = monthly_rate(annual_rate);
    let mut balance = principal;
    for month in 0..months as usize {
        let contribution = schedule.amount_for(month).to_decimal();
        (balance, _) = step(balance, rate, contribution)?;
    }
    Ok(balance)
}

// ---------------------------------------------------------------------------
// Forward simulation
// ---------------------------------------------------------------------------

/// Balance after `months` of monthly compounding with end-of-month contributions.
pub fn project_balance(
    principal: Money,
    monthly_contribution: Money,
    annual_rate: BasisPoints,
    months: u32,
) -> HouseholdFinanceResult<Money> {
    project_schedule(
        principal,
        &ContributionSchedule::Level(monthly_contribution),
        annual_rate,
        months,
    )
}

/// Forward simulation under an arbitrary contribution schedule.
pub fn project_schedule(
    principal: Money,
    schedule: &ContributionSchedule,
    annual_rate: BasisPoints,
    months: u32,
) -> HouseholdFinanceResult<Money> {
    principal.ensure_non_negative("principal")?;
    schedule.validate()?;
    annual_rate.ensure_annual_rate("annual_rate")?;
    validate_horizon(months)?;

    let balance = simulate(principal.to_decimal(), schedule, annual_rate, months)?;
    Money::from_decimal_rounded(balance)
}

/// Unrounded forward simulation with a level contribution, in minor units.
///
/// Lets a fractional contribution from [`required_contribution`] be checked
/// against its target without the minor-unit rounding of the inputs.
pub fn project_balance_exact(
    principal: Decimal,
    monthly_contribution: Decimal,
    annual_rate: BasisPoints,
    months: u32,
) -> HouseholdFinanceResult<Decimal> {
    annual_rate.ensure_annual_rate("annual_rate")?;
    validate_horizon(months)?;
    let rate = monthly_rate(annual_rate);
    let mut balance = principal;
    for _ in 0..months {
        (balance, _) = step(balance, rate, monthly_contribution)?;
    }
    Ok(balance)
}

/// Year-by-year path of the same simulation as [`project_schedule`].
/// A trailing partial year is reported as its own row.
pub fn projection_path(
    principal: Money,
    schedule: &ContributionSchedule,
    annual_rate: BasisPoints,
    months: u32,
) -> HouseholdFinanceResult<Vec<ProjectionYear>> {
    principal.ensure_non_negative("principal")?;
    schedule.validate()?;
    annual_rate.ensure_annual_rate("annual_rate")?;
    validate_horizon(months)?;

    let rate = monthly_rate(annual_rate);
    let mut balance = principal.to_decimal();
    let mut rows = Vec::new();
    let mut year_contrib = Decimal::ZERO;
    let mut year_return = Decimal::ZERO;

    for month in 0..months {
        let contribution = schedule.amount_for(month as usize).to_decimal();
        let (closing, interest) = step(balance, rate, contribution)?;
        balance = closing;
        year_contrib += contribution;
        year_return += interest;

        if (month + 1) % 12 == 0 || month + 1 == months {
            rows.push(ProjectionYear {
                year: month / 12 + 1,
                contributions: Money::from_decimal_rounded(year_contrib)?,
                investment_return: Money::from_decimal_rounded(year_return)?,
                ending_balance: Money::from_decimal_rounded(balance)?,
            });
            year_contrib = Decimal::ZERO;
            year_return = Decimal::ZERO;
        }
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Inverse solve
// ---------------------------------------------------------------------------

/// Level monthly contribution that grows `principal` to `target` in `months`.
///
/// `C = (FV − P·(1+i)^n) · i / ((1+i)^n − 1)`, or `shortfall / n` at 0%.
/// Never negative: a principal that already reaches the target needs nothing.
pub fn required_contribution(
    target: Money,
    principal: Money,
    annual_rate: BasisPoints,
    months: u32,
) -> HouseholdFinanceResult<RequiredContribution> {
    target.ensure_non_negative("target")?;
    principal.ensure_non_negative("principal")?;
    solve_contribution(target, principal, annual_rate, months)
}

/// Inverse solve for amounts derived inside the engine (summed assets,
/// gap funds). These are not caller input, so the input ceiling does not
/// apply; only the sign is checked.
pub(crate) fn solve_contribution(
    target: Money,
    principal: Money,
    annual_rate: BasisPoints,
    months: u32,
) -> HouseholdFinanceResult<RequiredContribution> {
    for (field, amount) in [("target", target), ("principal", principal)] {
        if amount.is_negative() {
            return Err(HouseholdFinanceError::invalid(
                field,
                format!("amount must be >= 0, got {amount}"),
            ));
        }
    }
    annual_rate.ensure_annual_rate("annual_rate")?;
    validate_horizon(months)?;

    let i = monthly_rate(annual_rate);
    let growth = compound(i, months)?;
    let grown_principal = principal
        .to_decimal()
        .checked_mul(growth)
        .ok_or_else(|| overflow("principal"))?;
    let shortfall = target.to_decimal() - grown_principal;
    let shortfall_money = Money::from_decimal_rounded(shortfall)?;

    if shortfall <= Decimal::ZERO {
        return Ok(RequiredContribution {
            monthly_contribution: Money::ZERO,
            exact_monthly_contribution: Decimal::ZERO,
            shortfall: shortfall_money,
        });
    }
    if months == 0 {
        return Err(HouseholdFinanceError::invalid(
            "months",
            "target exceeds principal but there are no months left to contribute",
        ));
    }

    let exact = if i.is_zero() {
        shortfall / Decimal::from(months)
    } else {
        let annuity_growth = growth - Decimal::ONE;
        if annuity_growth.is_zero() {
            return Err(HouseholdFinanceError::invalid(
                "annual_rate",
                "rate too small to solve the annuity factor",
            ));
        }
        shortfall
            .checked_mul(i)
            .and_then(|v| v.checked_div(annuity_growth))
            .ok_or_else(|| overflow("monthly_contribution"))?
    };

    Ok(RequiredContribution {
        monthly_contribution: Money::from_decimal_ceil(exact)?,
        exact_monthly_contribution: exact,
        shortfall: shortfall_money,
    })
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// Level payment `P · i / (1 − (1+i)^−n)` for a fully amortizing loan.
pub fn amortized_payment(
    principal: Money,
    annual_rate: BasisPoints,
    total_months: u32,
) -> HouseholdFinanceResult<AmortizedPayment> {
    principal.ensure_non_negative("principal")?;
    if annual_rate < BasisPoints::ZERO {
        return Err(HouseholdFinanceError::invalid(
            "annual_rate",
            format!("loan rate must be >= 0, got {}", annual_rate.value()),
        ));
    }
    annual_rate.ensure_annual_rate("annual_rate")?;
    validate_horizon(total_months)?;
    if total_months == 0 {
        return Err(HouseholdFinanceError::invalid(
            "total_months",
            "amortization term must be > 0 months",
        ));
    }

    if principal.is_zero() {
        return Ok(AmortizedPayment {
            monthly_payment: Money::ZERO,
            total_paid: Money::ZERO,
            total_interest: Money::ZERO,
            method: PaymentMethod::NoPrincipal,
        });
    }

    let n = Decimal::from(total_months);
    let (exact, method) = if annual_rate.value() == 0 {
        (principal.to_decimal() / n, PaymentMethod::ZeroRateStraightLine)
    } else {
        let i = monthly_rate(annual_rate);
        let growth = compound(i, total_months)?;
        let payment = principal
            .to_decimal()
            .checked_mul(i)
            .and_then(|v| v.checked_mul(growth))
            .and_then(|v| v.checked_div(growth - Decimal::ONE))
            .ok_or_else(|| overflow("monthly_payment"))?;
        (payment, PaymentMethod::LevelPayment)
    };

    let monthly_payment = Money::from_decimal_ceil(exact)?;
    let total_paid = Money::from_minor(monthly_payment.minor() * i64::from(total_months));
    Ok(AmortizedPayment {
        monthly_payment,
        total_paid,
        total_interest: total_paid - principal,
        method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bps(v: i64) -> BasisPoints {
        BasisPoints::new(v)
    }

    #[test]
    fn test_zero_rate_is_plain_sum() {
        let fv = project_balance(
            Money::from_minor(1000),
            Money::from_minor(100),
            bps(0),
            12,
        )
        .unwrap();
        assert_eq!(fv, Money::from_minor(2200));
    }

    #[test]
    fn test_contribution_lands_after_interest() {
        // 12% / yr = 1% / month; month 1: 1000 * 1.01 + 100 = 1110
        let fv = project_balance(
            Money::from_minor(1000),
            Money::from_minor(100),
            bps(1200),
            1,
        )
        .unwrap();
        assert_eq!(fv, Money::from_minor(1110));
    }

    #[test]
    fn test_matches_closed_form_annuity() {
        let c = 750_000f64;
        let i = 0.05f64 / 12.0;
        let closed = c * ((1.0 + i).powi(240) - 1.0) / i;
        let fv = project_balance(Money::ZERO, Money::from_minor(750_000), bps(500), 240).unwrap();
        assert!(
            (fv.minor() as f64 - closed).abs() <= 1.0,
            "simulated {fv} vs closed form {closed}"
        );
    }

    #[test]
    fn test_irregular_schedule() {
        let schedule = ContributionSchedule::Irregular(vec![
            Money::from_minor(100),
            Money::from_minor(0),
            Money::from_minor(300),
        ]);
        let fv = project_schedule(Money::ZERO, &schedule, bps(0), 5).unwrap();
        assert_eq!(fv, Money::from_minor(400));
    }

    #[test]
    fn test_path_ends_at_projected_balance() {
        let schedule = ContributionSchedule::Level(Money::from_major(500));
        let path = projection_path(Money::from_major(10_000), &schedule, bps(600), 30).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[2].year, 3);
        let fv = project_schedule(Money::from_major(10_000), &schedule, bps(600), 30).unwrap();
        assert_eq!(path.last().unwrap().ending_balance, fv);
    }

    #[test]
    fn test_horizon_limit() {
        let over = MAX_PROJECTION_MONTHS + 1;
        assert!(project_balance(Money::ZERO, Money::ZERO, bps(0), over).is_err());
    }

    #[test]
    fn test_required_contribution_zero_when_principal_suffices() {
        let r = required_contribution(
            Money::from_major(100),
            Money::from_major(100),
            bps(500),
            12,
        )
        .unwrap();
        assert_eq!(r.monthly_contribution, Money::ZERO);
        assert!(r.shortfall <= Money::ZERO);
    }

    #[test]
    fn test_required_contribution_zero_rate() {
        let r = required_contribution(Money::from_minor(1200), Money::ZERO, bps(0), 12).unwrap();
        assert_eq!(r.monthly_contribution, Money::from_minor(100));
    }

    #[test]
    fn test_required_contribution_no_months() {
        assert!(required_contribution(Money::from_minor(1), Money::ZERO, bps(500), 0).is_err());
    }

    #[test]
    fn test_rounded_up_contribution_reaches_target() {
        let target = Money::from_major(1_000_000);
        let r = required_contribution(target, Money::from_major(50_000), bps(450), 300).unwrap();
        let reached = project_balance(
            Money::from_major(50_000),
            r.monthly_contribution,
            bps(450),
            300,
        )
        .unwrap();
        assert!(reached >= target);
    }

    #[test]
    fn test_derived_target_above_input_ceiling_is_solved() {
        let target = Money::from_minor(crate::types::MAX_INPUT_AMOUNT * 4);
        assert!(required_contribution(target, Money::ZERO, bps(400), 120).is_err());
        let solved = solve_contribution(target, Money::ZERO, bps(400), 120).unwrap();
        assert!(solved.monthly_contribution > Money::ZERO);
        assert!(solve_contribution(Money::from_minor(-1), Money::ZERO, bps(400), 120).is_err());
    }

    #[test]
    fn test_amortized_payment_known_value() {
        // 100,000.00 at 6% over 360 months -> 599.55
        let p = amortized_payment(Money::from_major(100_000), bps(600), 360).unwrap();
        assert_eq!(p.monthly_payment, Money::from_minor(59_956));
        assert_eq!(p.method, PaymentMethod::LevelPayment);
    }

    #[test]
    fn test_amortized_payment_zero_rate_is_flagged() {
        let p = amortized_payment(Money::from_minor(1200), bps(0), 12).unwrap();
        assert_eq!(p.monthly_payment, Money::from_minor(100));
        assert_eq!(p.method, PaymentMethod::ZeroRateStraightLine);
    }

    #[test]
    fn test_amortized_payment_no_principal() {
        let p = amortized_payment(Money::ZERO, bps(500), 360).unwrap();
        assert_eq!(p.monthly_payment, Money::ZERO);
        assert_eq!(p.method, PaymentMethod::NoPrincipal);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_monotone_in_rate(
            p in 0i64..10_000_000_000, c in 0i64..100_000_000,
            r in 0i64..2_000, dr in 0i64..500, n in 0u32..480
        ) {
            let lo = project_balance(
                Money::from_minor(p),
                Money::from_minor(c),
                bps(r),
                n,
            )
            .unwrap();
            let hi = project_balance(
                Money::from_minor(p),
                Money::from_minor(c),
                bps(r + dr),
                n,
            )
            .unwrap();
            prop_assert!(hi >= lo);
        }

        #[test]
        fn prop_monotone_in_contribution(
            p in 0i64..10_000_000_000, c in 0i64..100_000_000,
            dc in 0i64..10_000_000, r in 0i64..2_000, n in 0u32..480
        ) {
            let lo = project_balance(
                Money::from_minor(p),
                Money::from_minor(c),
                bps(r),
                n,
            )
            .unwrap();
            let hi = project_balance(
                Money::from_minor(p),
                Money::from_minor(c + dc),
                bps(r),
                n,
            )
            .unwrap();
            prop_assert!(hi >= lo);
        }

        #[test]
        fn prop_monotone_in_months(
            p in 0i64..10_000_000_000, c in 0i64..100_000_000,
            r in 0i64..2_000, n in 0u32..480, dn in 0u32..120
        ) {
            let lo = project_balance(
                Money::from_minor(p),
                Money::from_minor(c),
                bps(r),
                n,
            )
            .unwrap();
            let hi = project_balance(
                Money::from_minor(p),
                Money::from_minor(c),
                bps(r),
                n + dn,
            )
            .unwrap();
            prop_assert!(hi >= lo);
        }

        #[test]
        fn prop_required_contribution_inverts_projection(
            p in 0i64..1_000_000_000, target in 0i64..100_000_000_000,
            r in 0i64..1_500, n in 1u32..480
        ) {
            let solved = required_contribution(
                Money::from_minor(target),
                Money::from_minor(p),
                bps(r),
                n,
            )
            .unwrap();
            prop_assert!(solved.monthly_contribution >= Money::ZERO);
            if solved.shortfall > Money::ZERO {
                let fv = project_balance_exact(
                    Decimal::from(p), solved.exact_monthly_contribution, bps(r), n,
                ).unwrap();
                prop_assert!((fv - Decimal::from(target)).abs() <= Decimal::ONE);
            }
        }

        #[test]
        fn prop_payments_cover_principal(
            principal in 1i64..10_000_000_000, r in 1i64..3_000, n in 1u32..480
        ) {
            let p = amortized_payment(Money::from_minor(principal), bps(r), n).unwrap();
            prop_assert!(p.monthly_payment.minor() * i64::from(n) >= principal);
        }
    }
}
