//! Storage collaborators.
//!
//! The engine treats persistence as three small repository traits. Records
//! are keyed by (worker, date), payments by an auto-increment id, and workers
//! by [`WorkerId`]. [`InMemoryStore`] implements all three.

mod key_lock;
mod memory;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, DateRange, ExtraPayment, Identity, NewExtraPayment, PayPolicy, Worker,
    WorkerId,
};

pub use key_lock::KeyedLocks;
pub use memory::InMemoryStore;

/// Attendance records keyed by (worker, date).
pub trait AttendanceStore: Send + Sync {
    /// Returns the record for the worker and day, if any.
    fn get(&self, worker_id: WorkerId, date: NaiveDate) -> EngineResult<Option<AttendanceRecord>>;

    /// Inserts or replaces the record under its (worker, date) key.
    fn put(&self, record: AttendanceRecord) -> EngineResult<()>;

    /// Returns records for one worker (or all) whose date is inside `range`
    /// (or any date), in no particular order.
    fn list(
        &self,
        worker_id: Option<WorkerId>,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<AttendanceRecord>>;
}

/// Append-only ledger of extra payments.
pub trait PaymentStore: Send + Sync {
    /// Assigns the next id and stores the entry in one atomic step.
    fn append(&self, payment: NewExtraPayment) -> EngineResult<ExtraPayment>;

    /// Returns every entry in insertion order.
    fn list(&self) -> EngineResult<Vec<ExtraPayment>>;
}

/// A worker waiting to be assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkerRecord {
    /// Display and login name.
    pub username: String,
    /// Contact identity.
    pub identity: Identity,
    /// How the worker is paid.
    pub pay_policy: PayPolicy,
    /// When the worker was registered.
    pub created_at: chrono::NaiveDateTime,
}

/// Registered workers.
pub trait WorkerStore: Send + Sync {
    /// Assigns the next id and stores the worker as active.
    fn insert(&self, worker: NewWorkerRecord) -> EngineResult<Worker>;

    /// Returns the worker, if registered.
    fn get(&self, worker_id: WorkerId) -> EngineResult<Option<Worker>>;

    /// Replaces a registered worker.
    fn update(&self, worker: Worker) -> EngineResult<()>;

    /// Returns every worker ordered by id.
    fn list(&self) -> EngineResult<Vec<Worker>>;
}
