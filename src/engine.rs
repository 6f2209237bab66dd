//! The engine facade.
//!
//! [`AttendanceEngine`] wires the registry, tracker, ledger and aggregator
//! to one set of stores and one clock, and is the surface a transport layer
//! calls into.

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::attendance::AttendanceTracker;
use crate::calculation::EarningsCalculation;
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigLoader, EngineSettings};
use crate::error::EngineResult;
use crate::ledger::{PaymentLedger, PaymentRequest};
use crate::models::{
    AttendanceRecord, Dashboard, DateRange, ExtraPayment, HistoryPage, PaymentFilter, PaymentType,
    Report, ReportPeriod, Worker, WorkerFilter, WorkerId, WorkerStatement,
};
use crate::report::ReportAggregator;
use crate::store::{AttendanceStore, InMemoryStore, PaymentStore, WorkerStore};
use crate::workers::{NewWorker, WorkerRegistry, WorkerUpdate};

/// Attendance and payroll operations over shared stores.
///
/// The engine is `Send + Sync`; share it behind an `Arc` to serve
/// concurrent callers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use attendance_payroll::clock::FixedClock;
/// use attendance_payroll::config::EngineSettings;
/// use attendance_payroll::engine::AttendanceEngine;
/// use attendance_payroll::workers::{NewWorker, PayRequest};
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDateTime::parse_from_str("2026-03-02 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let engine = AttendanceEngine::in_memory(EngineSettings::default(), Arc::new(FixedClock::new(start)));
///
/// let worker = engine
///     .register_worker(NewWorker {
///         username: "ravi".to_string(),
///         email: Some("ravi@example.com".to_string()),
///         phone: None,
///         pay: PayRequest::Hourly { hourly_rate: Some(Decimal::new(20, 0)) },
///     })
///     .unwrap();
///
/// engine.mark_entry(worker.id, start).unwrap();
/// let record = engine
///     .mark_exit(worker.id, start + chrono::TimeDelta::minutes(85))
///     .unwrap();
/// assert_eq!(record.total_minutes(), 60);
/// assert_eq!(record.earnings(), Decimal::new(20, 0));
/// ```
pub struct AttendanceEngine {
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
    registry: WorkerRegistry,
    tracker: AttendanceTracker,
    ledger: PaymentLedger,
    reports: ReportAggregator,
}

impl AttendanceEngine {
    /// Creates an engine over caller-supplied stores.
    pub fn new(
        settings: EngineSettings,
        clock: Arc<dyn Clock>,
        workers: Arc<dyn WorkerStore>,
        records: Arc<dyn AttendanceStore>,
        payments: Arc<dyn PaymentStore>,
    ) -> Self {
        let registry = WorkerRegistry::new(workers.clone(), clock.clone(), settings.defaults.clone());
        let tracker = AttendanceTracker::new(
            workers.clone(),
            records.clone(),
            clock.clone(),
            settings.history.page_size,
        );
        let ledger = PaymentLedger::new(
            payments.clone(),
            workers.clone(),
            clock.clone(),
            settings.payments,
        );
        let reports = ReportAggregator::new(
            workers,
            records,
            payments,
            clock.clone(),
            settings.payments,
            settings.reports.week_start,
        );

        Self {
            settings,
            clock,
            registry,
            tracker,
            ledger,
            reports,
        }
    }

    /// Creates an engine backed by a fresh [`InMemoryStore`].
    pub fn in_memory(settings: EngineSettings, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(settings, clock, store.clone(), store.clone(), store)
    }

    /// Loads settings from `config_dir` and creates an in-memory engine on
    /// the system clock.
    pub fn from_config_dir<P: AsRef<Path>>(config_dir: P) -> EngineResult<Self> {
        let settings = ConfigLoader::load(config_dir)?.into_settings();
        Ok(Self::in_memory(settings, Arc::new(SystemClock)))
    }

    /// The settings in force.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The engine's clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // Workers

    /// Registers a worker.
    pub fn register_worker(&self, new_worker: NewWorker) -> EngineResult<Worker> {
        self.registry.register(new_worker)
    }

    /// Applies a partial update to a worker.
    pub fn update_worker(&self, worker_id: WorkerId, update: WorkerUpdate) -> EngineResult<Worker> {
        self.registry.update(worker_id, update)
    }

    /// Marks a worker inactive.
    pub fn deactivate_worker(&self, worker_id: WorkerId) -> EngineResult<Worker> {
        self.registry.deactivate(worker_id)
    }

    /// Returns a worker.
    pub fn get_worker(&self, worker_id: WorkerId) -> EngineResult<Worker> {
        self.registry.get(worker_id)
    }

    /// Returns workers ordered by id.
    pub fn list_workers(&self, active_only: bool) -> EngineResult<Vec<Worker>> {
        self.registry.list(active_only)
    }

    // Attendance

    /// Marks entry at `timestamp`.
    pub fn mark_entry(&self, worker_id: WorkerId, timestamp: NaiveDateTime) -> EngineResult<AttendanceRecord> {
        self.tracker.mark_entry_at(worker_id, timestamp)
    }

    /// Marks exit at `timestamp` and settles the day's pay.
    pub fn mark_exit(&self, worker_id: WorkerId, timestamp: NaiveDateTime) -> EngineResult<AttendanceRecord> {
        self.tracker.mark_exit_at(worker_id, timestamp)
    }

    /// Marks entry at the clock's current time.
    pub fn mark_entry_now(&self, worker_id: WorkerId) -> EngineResult<AttendanceRecord> {
        self.tracker.mark_entry(worker_id)
    }

    /// Marks exit at the clock's current time.
    pub fn mark_exit_now(&self, worker_id: WorkerId) -> EngineResult<AttendanceRecord> {
        self.tracker.mark_exit(worker_id)
    }

    /// Returns the worker's record for `date`, if any.
    pub fn get_record(&self, worker_id: WorkerId, date: NaiveDate) -> EngineResult<Option<AttendanceRecord>> {
        self.tracker.get_record(worker_id, date)
    }

    /// Returns the worker's record for today, if any.
    pub fn today_record(&self, worker_id: WorkerId) -> EngineResult<Option<AttendanceRecord>> {
        self.tracker.today_record(worker_id)
    }

    /// Returns the worker's records, newest first.
    pub fn list_history(
        &self,
        worker_id: WorkerId,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        self.tracker.list_history(worker_id, range)
    }

    /// Returns one page of the worker's history.
    pub fn history_page(
        &self,
        worker_id: WorkerId,
        page: usize,
        per_page: Option<usize>,
    ) -> EngineResult<HistoryPage> {
        self.tracker.history_page(worker_id, page, per_page)
    }

    /// Shows how a completed day's figures were derived.
    pub fn explain_record(&self, worker_id: WorkerId, date: NaiveDate) -> EngineResult<EarningsCalculation> {
        self.tracker.explain_record(worker_id, date)
    }

    // Ledger

    /// Appends an extra payment.
    pub fn add_extra_payment(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
        amount: Decimal,
        payment_type: PaymentType,
        description: &str,
    ) -> EngineResult<ExtraPayment> {
        self.ledger.add_payment(PaymentRequest {
            worker_id,
            date,
            amount,
            payment_type,
            description: description.to_string(),
            notes: None,
        })
    }

    /// Appends an extra payment with every optional field.
    pub fn record_payment(&self, request: PaymentRequest) -> EngineResult<ExtraPayment> {
        self.ledger.add_payment(request)
    }

    /// Returns ledger entries for one worker (or all) within `range` (or
    /// any date), in insertion order.
    pub fn list_extra_payments(
        &self,
        worker_id: Option<WorkerId>,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<ExtraPayment>> {
        self.ledger.list_payments(&PaymentFilter {
            worker_id,
            range,
            payment_type: None,
        })
    }

    /// Returns ledger entries matching an arbitrary filter.
    pub fn filter_extra_payments(&self, filter: &PaymentFilter) -> EngineResult<Vec<ExtraPayment>> {
        self.ledger.list_payments(filter)
    }

    // Reports

    /// Generates a period report.
    pub fn generate_report(&self, filter: WorkerFilter, period: ReportPeriod) -> EngineResult<Report> {
        self.reports.generate_report(filter, period)
    }

    /// Builds a worker's pay statement over `range`.
    pub fn worker_statement(&self, worker_id: WorkerId, range: DateRange) -> EngineResult<WorkerStatement> {
        self.reports.worker_statement(worker_id, range)
    }

    /// Builds the administrator overview.
    pub fn dashboard(&self) -> EngineResult<Dashboard> {
        self.reports.dashboard()
    }
}
