//! Configuration types for the engine.
//!
//! This module contains the strongly-typed settings deserialized from
//! `engine.yaml`. Every section has defaults, so an empty file is valid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{PaymentType, WeekStart};

/// Whether a ledger entry adds to or subtracts from pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSign {
    /// Adds the amount.
    Add,
    /// Subtracts the amount.
    Subtract,
}

/// Default figures applied when a registration omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayDefaults {
    /// Hourly rate for the hourly scheme.
    pub hourly_rate: Decimal,
    /// Standard day length for the daily-wage scheme.
    pub standard_hours: Decimal,
}

impl Default for PayDefaults {
    fn default() -> Self {
        Self {
            hourly_rate: Decimal::new(1500, 2),
            standard_hours: Decimal::new(8, 0),
        }
    }
}

/// Sign rules for ledger entries.
///
/// Deductions always subtract; bonus and overtime always add. Only the
/// treatment of advances is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentRules {
    /// How an advance affects aggregate pay.
    pub advance: PaymentSign,
}

impl Default for PaymentRules {
    fn default() -> Self {
        Self {
            advance: PaymentSign::Add,
        }
    }
}

impl PaymentRules {
    /// Returns the sign applied to a payment type.
    pub fn sign_of(&self, payment_type: PaymentType) -> PaymentSign {
        match payment_type {
            PaymentType::Bonus | PaymentType::Overtime => PaymentSign::Add,
            PaymentType::Deduction => PaymentSign::Subtract,
            PaymentType::Advance => self.advance,
        }
    }

    /// Applies the sign of `payment_type` to a positive `amount`.
    pub fn signed_amount(&self, payment_type: PaymentType, amount: Decimal) -> Decimal {
        match self.sign_of(payment_type) {
            PaymentSign::Add => amount,
            PaymentSign::Subtract => -amount,
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// First day of the `this_week` period.
    pub week_start: WeekStart,
}

/// History settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Records per history page when the caller does not choose.
    pub page_size: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { page_size: 30 }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Registration defaults.
    pub defaults: PayDefaults,
    /// Ledger sign rules.
    pub payments: PaymentRules,
    /// Report settings.
    pub reports: ReportSettings,
    /// History settings.
    pub history: HistorySettings,
}

impl EngineSettings {
    /// Checks values serde cannot constrain.
    pub fn validate(&self) -> EngineResult<()> {
        if self.defaults.hourly_rate <= Decimal::ZERO {
            return Err(EngineError::validation(
                "defaults.hourly_rate",
                "must be greater than zero",
            ));
        }
        if self.defaults.standard_hours <= Decimal::ZERO {
            return Err(EngineError::validation(
                "defaults.standard_hours",
                "must be greater than zero",
            ));
        }
        if self.history.page_size == 0 {
            return Err(EngineError::validation(
                "history.page_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
