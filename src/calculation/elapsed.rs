//! Elapsed time between entry and exit.

use chrono::NaiveDateTime;

use crate::models::AuditStep;

/// The result of measuring the time between entry and exit.
#[derive(Debug, Clone)]
pub struct ElapsedResult {
    /// Whole minutes present, never negative.
    pub minutes: i64,
    /// The audit step recording the measurement.
    pub audit_step: AuditStep,
}

/// Measures the whole minutes between `entry_time` and `exit_time`.
///
/// Seconds are truncated and a negative span is clamped to zero.
///
/// # Examples
///
/// ```
/// use attendance_payroll::calculation::elapsed_minutes;
/// use chrono::NaiveDateTime;
///
/// let entry = NaiveDateTime::parse_from_str("2026-03-02 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let exit = NaiveDateTime::parse_from_str("2026-03-02 10:25:59", "%Y-%m-%d %H:%M:%S").unwrap();
/// assert_eq!(elapsed_minutes(entry, exit).minutes, 85);
/// ```
pub fn elapsed_minutes(entry_time: NaiveDateTime, exit_time: NaiveDateTime) -> ElapsedResult {
    let raw = (exit_time - entry_time).num_minutes();
    let minutes = raw.max(0);

    let reasoning = if raw < 0 {
        format!("Exit precedes entry by {} minutes; clamped to 0", -raw)
    } else {
        format!("{} whole minutes between entry and exit", minutes)
    };

    ElapsedResult {
        minutes,
        audit_step: AuditStep {
            rule_id: "elapsed_time".to_string(),
            rule_name: "Elapsed Time Measurement".to_string(),
            input: serde_json::json!({
                "entry_time": entry_time.to_string(),
                "exit_time": exit_time.to_string()
            }),
            output: serde_json::json!({
                "elapsed_minutes": minutes
            }),
            reasoning,
        },
    }
}
