//! Report models.
//!
//! This module contains the output types of the report aggregator: the
//! period [`Report`], the per-worker [`WorkerStatement`], the at-a-glance
//! [`Dashboard`] and the paginated [`HistoryPage`].

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AttendanceRecord, AttendanceState, DateRange, ExtraPayment, ReportPeriod, WorkerId};

/// Which workers a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "worker_id", rename_all = "snake_case")]
pub enum WorkerFilter {
    /// Every registered worker.
    All,
    /// A single worker.
    Worker(WorkerId),
}

impl WorkerFilter {
    /// Returns the single worker selected, if any.
    pub fn worker_id(&self) -> Option<WorkerId> {
        match self {
            WorkerFilter::All => None,
            WorkerFilter::Worker(id) => Some(*id),
        }
    }
}

/// One attendance day in a report.
///
/// Incomplete days appear with zero derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// The worker.
    pub worker_id: WorkerId,
    /// The worker's username.
    pub worker_name: String,
    /// The attendance day.
    pub date: NaiveDate,
    /// Arrival, if marked.
    pub entry_time: Option<NaiveDateTime>,
    /// Departure, if marked.
    pub exit_time: Option<NaiveDateTime>,
    /// Lifecycle state of the day.
    pub state: AttendanceState,
    /// Billable hours.
    pub total_hours: Decimal,
    /// Earnings for the day.
    pub daily_earning: Decimal,
}

/// Aggregated totals for a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Distinct workers with at least one record or payment in range.
    pub total_workers: usize,
    /// Attendance records in range.
    pub total_days: usize,
    /// Sum of billable hours.
    pub total_hours: Decimal,
    /// Sum of attendance earnings.
    pub attendance_earnings: Decimal,
    /// Sum of signed extra payments.
    pub extra_payments_total: Decimal,
    /// `attendance_earnings + extra_payments_total`.
    pub total_earnings: Decimal,
}

/// A generated period report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// When the report was generated.
    pub generated_at: NaiveDateTime,
    /// The workers covered.
    pub filter: WorkerFilter,
    /// The requested period.
    pub period: ReportPeriod,
    /// The period resolved against the generation date.
    pub range: DateRange,
    /// Aggregated totals.
    pub summary: ReportSummary,
    /// One row per attendance record, ordered by date then worker.
    pub details: Vec<ReportRow>,
    /// Ledger entries in range, in insertion order.
    pub extra_payments: Vec<ExtraPayment>,
}

/// Pay statement for one worker over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatement {
    /// The worker.
    pub worker_id: WorkerId,
    /// The worker's username.
    pub worker_name: String,
    /// The statement range.
    pub range: DateRange,
    /// Sum of billable hours.
    pub total_hours: Decimal,
    /// Sum of attendance earnings.
    pub attendance_earnings: Decimal,
    /// Sum of signed extra payments.
    pub extra_payments_total: Decimal,
    /// Amount due: attendance earnings plus signed extras.
    pub final_amount: Decimal,
    /// Attendance records in range, oldest first.
    pub records: Vec<AttendanceRecord>,
    /// Ledger entries in range, in insertion order.
    pub payments: Vec<ExtraPayment>,
}

/// Attendance snapshot for the current day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySnapshot {
    /// Workers who have marked entry.
    pub present: usize,
    /// Workers who have marked exit.
    pub completed: usize,
    /// Billable hours so far.
    pub total_hours: Decimal,
    /// Attendance earnings so far.
    pub total_earnings: Decimal,
}

/// Hours and attendance earnings over a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Billable hours.
    pub total_hours: Decimal,
    /// Attendance earnings.
    pub total_earnings: Decimal,
}

/// Administrator overview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Registered workers.
    pub total_workers: usize,
    /// The current day.
    pub today: DaySnapshot,
    /// The current week.
    pub this_week: PeriodTotals,
    /// The current month.
    pub this_month: PeriodTotals,
}

/// One page of a worker's attendance history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Records on this page, newest first.
    pub records: Vec<AttendanceRecord>,
    /// Records across all pages.
    pub total: usize,
    /// Number of pages.
    pub pages: usize,
    /// The page returned, starting at 1.
    pub current_page: usize,
}
