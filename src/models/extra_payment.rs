//! Extra payment model.
//!
//! Extra payments are ad-hoc ledger entries (bonus, overtime, deduction,
//! advance) recorded against a worker and a date, independent of attendance.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DateRange, WorkerId};

/// The kind of an extra payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Discretionary bonus.
    Bonus,
    /// Overtime recorded explicitly rather than derived from attendance.
    Overtime,
    /// Amount withheld from pay.
    Deduction,
    /// Amount paid ahead of the pay run.
    Advance,
}

/// An immutable ledger entry.
///
/// `amount` is always a positive magnitude; its sign is applied at
/// aggregation time from `payment_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPayment {
    /// Auto-increment identifier assigned by the ledger.
    pub id: u64,
    /// The worker the payment belongs to.
    pub worker_id: WorkerId,
    /// The day the payment applies to.
    pub date: NaiveDate,
    /// Positive magnitude of the payment.
    pub amount: Decimal,
    /// The kind of payment.
    pub payment_type: PaymentType,
    /// Why the payment was made.
    pub description: String,
    /// Optional free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the entry was appended.
    pub recorded_at: NaiveDateTime,
}

/// A validated payment waiting to be appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExtraPayment {
    /// The worker the payment belongs to.
    pub worker_id: WorkerId,
    /// The day the payment applies to.
    pub date: NaiveDate,
    /// Positive magnitude of the payment.
    pub amount: Decimal,
    /// The kind of payment.
    pub payment_type: PaymentType,
    /// Why the payment was made.
    pub description: String,
    /// Optional free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// When the entry was appended.
    pub recorded_at: NaiveDateTime,
}

impl NewExtraPayment {
    /// Turns the pending entry into a stored one with the given id.
    pub fn with_id(self, id: u64) -> ExtraPayment {
        ExtraPayment {
            id,
            worker_id: self.worker_id,
            date: self.date,
            amount: self.amount,
            payment_type: self.payment_type,
            description: self.description,
            notes: self.notes,
            recorded_at: self.recorded_at,
        }
    }
}

/// Selects ledger entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFilter {
    /// Only this worker, or every worker when `None`.
    #[serde(default)]
    pub worker_id: Option<WorkerId>,
    /// Only dates inside this range, or every date when `None`.
    #[serde(default)]
    pub range: Option<DateRange>,
    /// Only this kind, or every kind when `None`.
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
}

impl PaymentFilter {
    /// Returns true if the payment passes every populated criterion.
    pub fn matches(&self, payment: &ExtraPayment) -> bool {
        self.worker_id.is_none_or(|id| id == payment.worker_id)
            && self.range.is_none_or(|r| r.contains(payment.date))
            && self.payment_type.is_none_or(|t| t == payment.payment_type)
    }
}
