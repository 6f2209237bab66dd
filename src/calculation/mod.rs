//! Calculation logic for the attendance and payroll engine.
//!
//! This module turns an entry/exit pair into billable duration and pay:
//! elapsed-time measurement, 30-minute block rounding for hourly workers,
//! and proportional daily-wage pay. All functions are pure.

mod block_rounding;
mod earnings;
mod elapsed;
mod proportional_day;

pub use block_rounding::{BLOCK_MINUTES, BlockPayResult, calculate_block_pay};
pub use earnings::{EarningsCalculation, calculate_day_earnings};
pub use elapsed::{ElapsedResult, elapsed_minutes};
pub use proportional_day::{ProportionalDayResult, calculate_proportional_day_pay};
