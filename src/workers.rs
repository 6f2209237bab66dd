//! Worker registry.
//!
//! Registers workers, applies partial updates and deactivation. Workers are
//! never deleted so their attendance history keeps resolving.

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::config::PayDefaults;
use crate::error::{EngineError, EngineResult};
use crate::models::{Identity, PayPolicy, Worker, WorkerId};
use crate::store::{NewWorkerRecord, WorkerStore};

/// Pay scheme as submitted at registration, before defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum PayRequest {
    /// Hourly scheme; the configured default rate is used when omitted.
    Hourly {
        /// Currency per hour.
        #[serde(default)]
        hourly_rate: Option<Decimal>,
    },
    /// Daily-wage scheme; the configured standard day is used when omitted.
    DailyWage {
        /// Currency per standard day.
        daily_wage: Decimal,
        /// Length of the standard day in hours.
        #[serde(default)]
        standard_hours: Option<Decimal>,
    },
}

impl PayRequest {
    fn resolve(self, defaults: &PayDefaults) -> PayPolicy {
        match self {
            PayRequest::Hourly { hourly_rate } => PayPolicy::Hourly {
                hourly_rate: hourly_rate.unwrap_or(defaults.hourly_rate),
            },
            PayRequest::DailyWage {
                daily_wage,
                standard_hours,
            } => PayPolicy::DailyWage {
                daily_wage,
                standard_hours: standard_hours.unwrap_or(defaults.standard_hours),
            },
        }
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorker {
    /// Display and login name.
    pub username: String,
    /// Email address, if any.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number, if any.
    #[serde(default)]
    pub phone: Option<String>,
    /// How the worker is paid.
    pub pay: PayRequest,
}

/// Partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerUpdate {
    /// New username.
    #[serde(default)]
    pub username: Option<String>,
    /// New email address. Replaces the whole identity together with `phone`.
    #[serde(default)]
    pub email: Option<String>,
    /// New phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// New pay scheme.
    #[serde(default)]
    pub pay: Option<PayRequest>,
    /// New active flag.
    #[serde(default)]
    pub active: Option<bool>,
}

/// Registers and maintains workers.
///
/// Writes go through one lock, so the uniqueness check and the store write
/// happen as a single step. The registry must be the only writer of its
/// store.
pub struct WorkerRegistry {
    workers: Arc<dyn WorkerStore>,
    clock: Arc<dyn Clock>,
    defaults: PayDefaults,
    writes: Mutex<()>,
}

impl WorkerRegistry {
    /// Creates a registry over the given store.
    pub fn new(workers: Arc<dyn WorkerStore>, clock: Arc<dyn Clock>, defaults: PayDefaults) -> Self {
        Self {
            workers,
            clock,
            defaults,
            writes: Mutex::new(()),
        }
    }

    /// Registers a new, active worker.
    ///
    /// # Errors
    ///
    /// `Validation` if the username is blank, the identity is missing or
    /// malformed, a rate is not positive, or the username, email or phone is
    /// already taken.
    pub fn register(&self, new_worker: NewWorker) -> EngineResult<Worker> {
        let username = normalize_username(&new_worker.username)?;
        let identity = Identity::from_parts(new_worker.email, new_worker.phone)?;
        let pay_policy = new_worker.pay.resolve(&self.defaults);
        pay_policy.validate()?;

        let worker = {
            let _writes = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
            self.ensure_unique(None, &username, &identity)?;
            self.workers.insert(NewWorkerRecord {
                username,
                identity,
                pay_policy,
                created_at: self.clock.now(),
            })?
        };

        info!(
            worker_id = %worker.id,
            username = %worker.username,
            scheme = worker.pay_policy.scheme(),
            "Worker registered"
        );
        Ok(worker)
    }

    /// Applies a partial update.
    ///
    /// Supplying either `email` or `phone` rebuilds the identity from the
    /// supplied values; the other channel is kept unless also supplied.
    pub fn update(&self, worker_id: WorkerId, update: WorkerUpdate) -> EngineResult<Worker> {
        let _writes = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        let mut worker = self.get(worker_id)?;

        if let Some(username) = update.username {
            worker.username = normalize_username(&username)?;
        }
        if update.email.is_some() || update.phone.is_some() {
            let email = update
                .email
                .or_else(|| worker.identity.email().map(str::to_string));
            let phone = update
                .phone
                .or_else(|| worker.identity.phone().map(str::to_string));
            worker.identity = Identity::from_parts(email, phone)?;
        }
        if let Some(pay) = update.pay {
            let policy = pay.resolve(&self.defaults);
            policy.validate()?;
            worker.pay_policy = policy;
        }
        if let Some(active) = update.active {
            worker.active = active;
        }

        self.ensure_unique(Some(worker_id), &worker.username, &worker.identity)?;
        self.workers.update(worker.clone())?;

        info!(worker_id = %worker_id, active = worker.active, "Worker updated");
        Ok(worker)
    }

    /// Marks the worker inactive.
    pub fn deactivate(&self, worker_id: WorkerId) -> EngineResult<Worker> {
        self.update(
            worker_id,
            WorkerUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
    }

    /// Returns the worker.
    pub fn get(&self, worker_id: WorkerId) -> EngineResult<Worker> {
        self.workers
            .get(worker_id)?
            .ok_or_else(|| EngineError::not_found("worker", worker_id))
    }

    /// Returns workers ordered by id, optionally only the active ones.
    pub fn list(&self, active_only: bool) -> EngineResult<Vec<Worker>> {
        Ok(self
            .workers
            .list()?
            .into_iter()
            .filter(|w| !active_only || w.active)
            .collect())
    }

    fn ensure_unique(
        &self,
        exclude: Option<WorkerId>,
        username: &str,
        identity: &Identity,
    ) -> EngineResult<()> {
        for other in self.workers.list()? {
            if Some(other.id) == exclude {
                continue;
            }
            if other.username.eq_ignore_ascii_case(username) {
                return Err(EngineError::validation("username", "already exists"));
            }
            if identity.email().is_some_and(|e| other.identity.email() == Some(e)) {
                return Err(EngineError::validation("email", "already exists"));
            }
            if identity.phone().is_some_and(|p| other.identity.phone() == Some(p)) {
                return Err(EngineError::validation("phone", "already exists"));
            }
        }
        Ok(())
    }
}

fn normalize_username(username: &str) -> EngineResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(EngineError::validation("username", "must not be empty"));
    }
    Ok(username.to_string())
}
