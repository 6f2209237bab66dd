//! Proportional pay for daily-wage workers.
//!
//! Daily-wage workers earn the share of their daily wage that their time
//! present represents of the standard day. There is no block truncation and
//! no cap: working past the standard day increases pay linearly.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, DayEarnings};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// The result of applying the proportional-day rule.
#[derive(Debug, Clone)]
pub struct ProportionalDayResult {
    /// Fraction of the standard day worked (may exceed one).
    pub day_fraction: Decimal,
    /// Billable duration and pay.
    pub earnings: DayEarnings,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Calculates proportional pay for `elapsed_minutes`.
///
/// `daily_earning = (hours / standard_hours) * daily_wage`, evaluated as
/// `minutes * daily_wage / (standard_hours * 60)` so that whole-hour inputs
/// stay exact.
///
/// # Errors
///
/// Returns a validation error if `standard_hours` is zero or if a figure
/// does not fit in a [`Decimal`].
///
/// # Examples
///
/// ```
/// use attendance_payroll::calculation::calculate_proportional_day_pay;
/// use rust_decimal::Decimal;
///
/// // 4 hours of an 8-hour, 400/day job
/// let result = calculate_proportional_day_pay(240, Decimal::new(400, 0), Decimal::new(8, 0)).unwrap();
/// assert_eq!(result.earnings.total_hours, Decimal::new(4, 0));
/// assert_eq!(result.earnings.amount, Decimal::new(200, 0));
/// ```
pub fn calculate_proportional_day_pay(
    elapsed_minutes: i64,
    daily_wage: Decimal,
    standard_hours: Decimal,
) -> EngineResult<ProportionalDayResult> {
    let minutes = elapsed_minutes.max(0);
    let worked = Decimal::from(minutes);
    let standard_minutes = standard_hours
        .checked_mul(MINUTES_PER_HOUR)
        .ok_or_else(|| overflow("standard_hours"))?;

    let total_hours = worked / MINUTES_PER_HOUR;
    let day_fraction = worked
        .checked_div(standard_minutes)
        .ok_or_else(|| overflow("standard_hours"))?;
    let amount = worked
        .checked_mul(daily_wage)
        .and_then(|paid| paid.checked_div(standard_minutes))
        .ok_or_else(|| overflow("daily_wage"))?;

    let audit_step = AuditStep {
        rule_id: "proportional_day".to_string(),
        rule_name: "Proportional Daily Wage".to_string(),
        input: serde_json::json!({
            "elapsed_minutes": minutes,
            "daily_wage": daily_wage.normalize().to_string(),
            "standard_hours": standard_hours.normalize().to_string()
        }),
        output: serde_json::json!({
            "total_minutes": minutes,
            "total_hours": total_hours.normalize().to_string(),
            "day_fraction": day_fraction.normalize().to_string(),
            "earnings": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} hours of a {} hour day x ${} = ${}",
            total_hours.round_dp(2).normalize(),
            standard_hours.normalize(),
            daily_wage.normalize(),
            amount.round_dp(2).normalize()
        ),
    };

    Ok(ProportionalDayResult {
        day_fraction,
        earnings: DayEarnings {
            total_minutes: minutes,
            total_hours,
            amount,
        },
        audit_step,
    })
}

fn overflow(field: &str) -> EngineError {
    EngineError::validation(field, "out of range for pay calculation")
}
