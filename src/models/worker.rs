//! Worker model and related types.
//!
//! This module defines the [`Worker`] struct together with its [`Identity`]
//! and [`PayPolicy`] sum types.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Unique identifier of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a worker can be reached. At least one channel is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// Email address only.
    Email {
        /// The email address.
        email: String,
    },
    /// Phone number only.
    Phone {
        /// The phone number.
        phone: String,
    },
    /// Both an email address and a phone number.
    Both {
        /// The email address.
        email: String,
        /// The phone number.
        phone: String,
    },
}

impl Identity {
    /// Builds an identity from optional email and phone values.
    ///
    /// Blank strings count as absent. Fails with a validation error when
    /// neither channel is supplied or when a supplied value is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_payroll::models::Identity;
    ///
    /// let identity = Identity::from_parts(None, Some("+91 98765 43210".to_string())).unwrap();
    /// assert_eq!(identity.phone(), Some("+91 98765 43210"));
    /// assert!(Identity::from_parts(None, None).is_err());
    /// ```
    pub fn from_parts(email: Option<String>, phone: Option<String>) -> EngineResult<Self> {
        let email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());

        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(EngineError::validation("email", "must contain '@'"));
            }
        }
        if let Some(phone) = &phone {
            if !phone.chars().any(|c| c.is_ascii_digit()) {
                return Err(EngineError::validation("phone", "must contain digits"));
            }
        }

        match (email, phone) {
            (Some(email), Some(phone)) => Ok(Identity::Both { email, phone }),
            (Some(email), None) => Ok(Identity::Email { email }),
            (None, Some(phone)) => Ok(Identity::Phone { phone }),
            (None, None) => Err(EngineError::validation(
                "identity",
                "an email or a phone number is required",
            )),
        }
    }

    /// Returns the email address, if any.
    pub fn email(&self) -> Option<&str> {
        match self {
            Identity::Email { email } | Identity::Both { email, .. } => Some(email),
            Identity::Phone { .. } => None,
        }
    }

    /// Returns the phone number, if any.
    pub fn phone(&self) -> Option<&str> {
        match self {
            Identity::Phone { phone } | Identity::Both { phone, .. } => Some(phone),
            Identity::Email { .. } => None,
        }
    }
}

/// The pay scheme a worker is paid under.
///
/// A worker has exactly one policy; the two schemes are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum PayPolicy {
    /// Paid per completed 30-minute block at half the hourly rate.
    Hourly {
        /// Currency per hour.
        hourly_rate: Decimal,
    },
    /// Paid a share of the daily wage proportional to hours present.
    DailyWage {
        /// Currency per standard day.
        daily_wage: Decimal,
        /// Length of the standard day in hours.
        standard_hours: Decimal,
    },
}

impl PayPolicy {
    /// Checks that every rate in the policy is strictly positive.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            PayPolicy::Hourly { hourly_rate } => {
                if *hourly_rate <= Decimal::ZERO {
                    return Err(EngineError::validation("hourly_rate", "must be greater than zero"));
                }
            }
            PayPolicy::DailyWage {
                daily_wage,
                standard_hours,
            } => {
                if *daily_wage <= Decimal::ZERO {
                    return Err(EngineError::validation("daily_wage", "must be greater than zero"));
                }
                if *standard_hours <= Decimal::ZERO {
                    return Err(EngineError::validation(
                        "standard_hours",
                        "must be greater than zero",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Short name of the scheme, as used in audit output.
    pub fn scheme(&self) -> &'static str {
        match self {
            PayPolicy::Hourly { .. } => "hourly",
            PayPolicy::DailyWage { .. } => "daily_wage",
        }
    }
}

/// A worker whose attendance is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique identifier for the worker.
    pub id: WorkerId,
    /// Display and login name.
    pub username: String,
    /// Contact identity.
    pub identity: Identity,
    /// How the worker is paid.
    pub pay_policy: PayPolicy,
    /// Inactive workers cannot mark attendance.
    pub active: bool,
    /// When the worker was registered.
    pub created_at: NaiveDateTime,
}
