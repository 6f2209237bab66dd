//! Day earnings calculation.
//!
//! This is the single entry point used by the attendance tracker: it
//! measures the elapsed time and dispatches to the rule of the worker's
//! pay policy.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{AuditStep, DayEarnings, PayPolicy};

use super::block_rounding::calculate_block_pay;
use super::elapsed::elapsed_minutes;
use super::proportional_day::calculate_proportional_day_pay;

/// The result of calculating a day's earnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarningsCalculation {
    /// Billable duration and pay.
    pub earnings: DayEarnings,
    /// Audit steps in order: elapsed time, then the pay rule.
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates the billable duration and earnings of a completed day.
///
/// The result depends only on the arguments, so a stored record can always
/// be reproduced from its raw entry and exit times.
///
/// # Errors
///
/// Returns a validation error if the pay policy has a non-positive rate or
/// the day's pay does not fit in a [`Decimal`](rust_decimal::Decimal).
///
/// # Examples
///
/// ```
/// use attendance_payroll::calculation::calculate_day_earnings;
/// use attendance_payroll::models::PayPolicy;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let entry = NaiveDateTime::parse_from_str("2026-03-02 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let exit = NaiveDateTime::parse_from_str("2026-03-02 10:25:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let policy = PayPolicy::Hourly { hourly_rate: Decimal::new(20, 0) };
///
/// let result = calculate_day_earnings(entry, exit, &policy).unwrap();
/// assert_eq!(result.earnings.total_minutes, 60);
/// assert_eq!(result.earnings.amount, Decimal::new(20, 0));
/// ```
pub fn calculate_day_earnings(
    entry_time: NaiveDateTime,
    exit_time: NaiveDateTime,
    policy: &PayPolicy,
) -> EngineResult<EarningsCalculation> {
    policy.validate()?;

    let elapsed = elapsed_minutes(entry_time, exit_time);
    let mut audit_steps = vec![elapsed.audit_step];

    let earnings = match *policy {
        PayPolicy::Hourly { hourly_rate } => {
            let result = calculate_block_pay(elapsed.minutes, hourly_rate)?;
            audit_steps.push(result.audit_step);
            result.earnings
        }
        PayPolicy::DailyWage {
            daily_wage,
            standard_hours,
        } => {
            let result =
                calculate_proportional_day_pay(elapsed.minutes, daily_wage, standard_hours)?;
            audit_steps.push(result.audit_step);
            result.earnings
        }
    };

    debug!(
        scheme = policy.scheme(),
        elapsed_minutes = elapsed.minutes,
        total_minutes = earnings.total_minutes,
        earnings = %earnings.amount,
        "Calculated day earnings"
    );

    Ok(EarningsCalculation {
        earnings,
        audit_steps,
    })
}
