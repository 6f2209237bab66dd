//! Block-rounded pay for hourly workers.
//!
//! Hourly workers are paid per complete 30-minute block at half their
//! hourly rate. Any remainder shorter than a block is discarded, never
//! rounded up.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, DayEarnings};

/// Length of a billable block in minutes.
pub const BLOCK_MINUTES: i64 = 30;

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// The result of applying block rounding to a day.
#[derive(Debug, Clone)]
pub struct BlockPayResult {
    /// Number of complete blocks worked.
    pub blocks: i64,
    /// Minutes discarded because they did not fill a block.
    pub discarded_minutes: i64,
    /// Billable duration and pay.
    pub earnings: DayEarnings,
    /// The audit step recording the calculation.
    pub audit_step: AuditStep,
}

/// Calculates block-rounded pay for `elapsed_minutes` at `hourly_rate`.
///
/// `total_minutes` is the largest multiple of [`BLOCK_MINUTES`] not
/// exceeding the elapsed minutes, and the amount is
/// `blocks * (hourly_rate / 2)`.
///
/// # Errors
///
/// Returns a validation error on `hourly_rate` if the amount does not fit
/// in a [`Decimal`].
///
/// # Examples
///
/// ```
/// use attendance_payroll::calculation::calculate_block_pay;
/// use rust_decimal::Decimal;
///
/// // 85 minutes at 20/hour pays two blocks
/// let result = calculate_block_pay(85, Decimal::new(20, 0)).unwrap();
/// assert_eq!(result.blocks, 2);
/// assert_eq!(result.earnings.total_minutes, 60);
/// assert_eq!(result.earnings.amount, Decimal::new(20, 0));
/// ```
pub fn calculate_block_pay(elapsed_minutes: i64, hourly_rate: Decimal) -> EngineResult<BlockPayResult> {
    let elapsed = elapsed_minutes.max(0);
    let blocks = elapsed / BLOCK_MINUTES;
    let total_minutes = blocks * BLOCK_MINUTES;
    let discarded_minutes = elapsed - total_minutes;

    let block_rate = hourly_rate / Decimal::TWO;
    let amount = Decimal::from(blocks)
        .checked_mul(block_rate)
        .ok_or_else(|| EngineError::validation("hourly_rate", "too large to calculate pay"))?;
    let total_hours = Decimal::from(total_minutes) / MINUTES_PER_HOUR;

    let audit_step = AuditStep {
        rule_id: "block_rounding".to_string(),
        rule_name: "30-Minute Block Rounding".to_string(),
        input: serde_json::json!({
            "elapsed_minutes": elapsed,
            "hourly_rate": hourly_rate.normalize().to_string(),
            "block_minutes": BLOCK_MINUTES
        }),
        output: serde_json::json!({
            "blocks": blocks,
            "total_minutes": total_minutes,
            "discarded_minutes": discarded_minutes,
            "total_hours": total_hours.normalize().to_string(),
            "earnings": amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} minutes = {} complete blocks ({} minutes discarded) x ${} = ${}",
            elapsed,
            blocks,
            discarded_minutes,
            block_rate.normalize(),
            amount.normalize()
        ),
    };

    Ok(BlockPayResult {
        blocks,
        discarded_minutes,
        earnings: DayEarnings {
            total_minutes,
            total_hours,
            amount,
        },
        audit_step,
    })
}
