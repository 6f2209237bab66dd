//! Audit trail types.

use serde::{Deserialize, Serialize};

/// A single recorded calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule
/// application so that stored figures can be traced back to raw events.
///
/// # Example
///
/// ```
/// use attendance_payroll::models::AuditStep;
///
/// let step = AuditStep {
///     rule_id: "block_rounding".to_string(),
///     rule_name: "30-Minute Block Rounding".to_string(),
///     input: serde_json::json!({"elapsed_minutes": 85, "hourly_rate": "20"}),
///     output: serde_json::json!({"total_minutes": 60, "earnings": "20"}),
///     reasoning: "2 complete blocks x $10 = $20".to_string(),
/// };
/// assert_eq!(step.output["total_minutes"], 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}
