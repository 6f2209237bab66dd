//! Extra payments ledger.
//!
//! An append-only collection of bonus, overtime, deduction and advance
//! entries. Appending never touches attendance records.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::clock::Clock;
use crate::config::PaymentRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{ExtraPayment, NewExtraPayment, PaymentFilter, PaymentType, WorkerId};
use crate::store::{PaymentStore, WorkerStore};

/// A payment as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// The worker the payment belongs to.
    pub worker_id: WorkerId,
    /// The day the payment applies to.
    pub date: NaiveDate,
    /// Positive magnitude.
    pub amount: Decimal,
    /// The kind of payment.
    pub payment_type: PaymentType,
    /// Why the payment was made.
    pub description: String,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

/// Validates and appends ledger entries.
pub struct PaymentLedger {
    payments: Arc<dyn PaymentStore>,
    workers: Arc<dyn WorkerStore>,
    clock: Arc<dyn Clock>,
    rules: PaymentRules,
}

impl PaymentLedger {
    /// Creates a ledger over the given stores.
    pub fn new(
        payments: Arc<dyn PaymentStore>,
        workers: Arc<dyn WorkerStore>,
        clock: Arc<dyn Clock>,
        rules: PaymentRules,
    ) -> Self {
        Self {
            payments,
            workers,
            clock,
            rules,
        }
    }

    /// Appends a payment.
    ///
    /// # Errors
    ///
    /// - `Validation` if the amount is not positive or the description is blank
    /// - `NotFound` if the worker is not registered
    pub fn add_payment(&self, request: PaymentRequest) -> EngineResult<ExtraPayment> {
        if request.amount <= Decimal::ZERO {
            return Err(EngineError::validation("amount", "must be greater than zero"));
        }
        if request.description.trim().is_empty() {
            return Err(EngineError::validation("description", "must not be empty"));
        }
        if self.workers.get(request.worker_id)?.is_none() {
            return Err(EngineError::not_found("worker", request.worker_id));
        }

        let notes = request.notes.filter(|n| !n.trim().is_empty());

        let stored = self.payments.append(NewExtraPayment {
            worker_id: request.worker_id,
            date: request.date,
            amount: request.amount,
            payment_type: request.payment_type,
            description: request.description,
            notes,
            recorded_at: self.clock.now(),
        })?;

        info!(
            payment_id = stored.id,
            worker_id = %stored.worker_id,
            date = %stored.date,
            payment_type = ?stored.payment_type,
            amount = %stored.amount,
            "Extra payment recorded"
        );
        Ok(stored)
    }

    /// Returns matching entries in insertion order.
    pub fn list_payments(&self, filter: &PaymentFilter) -> EngineResult<Vec<ExtraPayment>> {
        Ok(self
            .payments
            .list()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }

    /// The payment's effect on aggregate pay.
    pub fn signed_amount(&self, payment: &ExtraPayment) -> Decimal {
        self.rules.signed_amount(payment.payment_type, payment.amount)
    }

    /// The sign rules in force.
    pub fn rules(&self) -> PaymentRules {
        self.rules
    }
}
