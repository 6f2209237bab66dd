//! Report aggregation.
//!
//! Reports are read-only scans over the attendance and payment stores. A
//! report generated while a transition is in flight may or may not include
//! it; no lock is taken.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::PaymentRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AttendanceState, Dashboard, DateRange, DaySnapshot, ExtraPayment,
    PaymentFilter, PeriodTotals, Report, ReportPeriod, ReportRow, ReportSummary, WeekStart,
    Worker, WorkerFilter, WorkerId, WorkerStatement,
};
use crate::store::{AttendanceStore, PaymentStore, WorkerStore};

/// Sums records and signed payments into a report summary.
///
/// Decimal addition is exact, so the result does not depend on the order
/// of either slice.
///
/// # Example
///
/// ```
/// use attendance_payroll::config::PaymentRules;
/// use attendance_payroll::report::summarize;
/// use rust_decimal::Decimal;
///
/// let summary = summarize(&[], &[], &PaymentRules::default());
/// assert_eq!(summary.total_days, 0);
/// assert_eq!(summary.total_earnings, Decimal::ZERO);
/// ```
pub fn summarize(
    records: &[AttendanceRecord],
    payments: &[ExtraPayment],
    rules: &PaymentRules,
) -> ReportSummary {
    let workers: BTreeSet<WorkerId> = records
        .iter()
        .map(|r| r.worker_id())
        .chain(payments.iter().map(|p| p.worker_id))
        .collect();

    let total_hours: Decimal = records.iter().map(|r| r.total_hours()).sum();
    let attendance_earnings: Decimal = records.iter().map(|r| r.earnings()).sum();
    let extra_payments_total: Decimal = payments
        .iter()
        .map(|p| rules.signed_amount(p.payment_type, p.amount))
        .sum();

    ReportSummary {
        total_workers: workers.len(),
        total_days: records.len(),
        total_hours,
        attendance_earnings,
        extra_payments_total,
        total_earnings: attendance_earnings + extra_payments_total,
    }
}

/// Builds reports, statements and the dashboard.
pub struct ReportAggregator {
    workers: Arc<dyn WorkerStore>,
    records: Arc<dyn AttendanceStore>,
    payments: Arc<dyn PaymentStore>,
    clock: Arc<dyn Clock>,
    rules: PaymentRules,
    week_start: WeekStart,
}

impl ReportAggregator {
    /// Creates an aggregator over the given stores.
    pub fn new(
        workers: Arc<dyn WorkerStore>,
        records: Arc<dyn AttendanceStore>,
        payments: Arc<dyn PaymentStore>,
        clock: Arc<dyn Clock>,
        rules: PaymentRules,
        week_start: WeekStart,
    ) -> Self {
        Self {
            workers,
            records,
            payments,
            clock,
            rules,
            week_start,
        }
    }

    /// Generates a report for the workers in `filter` over `period`.
    ///
    /// The period is resolved against the clock's current date. An empty
    /// period yields a zero summary and no rows.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `filter` names an unregistered worker
    /// - `Validation` if a custom period ends before it starts
    pub fn generate_report(&self, filter: WorkerFilter, period: ReportPeriod) -> EngineResult<Report> {
        let generated_at = self.clock.now();
        let range = period.resolve(generated_at.date(), self.week_start)?;

        let workers = self.workers.list()?;
        if let Some(id) = filter.worker_id() {
            if !workers.iter().any(|w| w.id == id) {
                return Err(EngineError::not_found("worker", id));
            }
        }

        let records = self.records.list(filter.worker_id(), Some(range))?;
        let extra_payments = self.payments_in(filter.worker_id(), range)?;
        let summary = summarize(&records, &extra_payments, &self.rules);

        let names = worker_names(&workers);
        let mut details: Vec<ReportRow> = records
            .iter()
            .map(|record| ReportRow {
                worker_id: record.worker_id(),
                worker_name: names.get(&record.worker_id()).cloned().unwrap_or_default(),
                date: record.date(),
                entry_time: record.entry_time(),
                exit_time: record.exit_time(),
                state: record.state(),
                total_hours: record.total_hours(),
                daily_earning: record.earnings(),
            })
            .collect();
        details.sort_by_key(|row| (row.date, row.worker_id));

        let report = Report {
            report_id: Uuid::new_v4(),
            generated_at,
            filter,
            period,
            range,
            summary,
            details,
            extra_payments,
        };

        info!(
            report_id = %report.report_id,
            start = %range.start,
            end = %range.end,
            total_days = report.summary.total_days,
            total_earnings = %report.summary.total_earnings,
            "Report generated"
        );
        Ok(report)
    }

    /// Builds the pay statement of one worker over `range`.
    pub fn worker_statement(&self, worker_id: WorkerId, range: DateRange) -> EngineResult<WorkerStatement> {
        let worker = self
            .workers
            .get(worker_id)?
            .ok_or_else(|| EngineError::not_found("worker", worker_id))?;

        let mut records = self.records.list(Some(worker_id), Some(range))?;
        records.sort_by_key(|r| r.date());
        let payments = self.payments_in(Some(worker_id), range)?;
        let summary = summarize(&records, &payments, &self.rules);

        Ok(WorkerStatement {
            worker_id,
            worker_name: worker.username,
            range,
            total_hours: summary.total_hours,
            attendance_earnings: summary.attendance_earnings,
            extra_payments_total: summary.extra_payments_total,
            final_amount: summary.total_earnings,
            records,
            payments,
        })
    }

    /// Builds the administrator overview for the clock's current date.
    pub fn dashboard(&self) -> EngineResult<Dashboard> {
        let today = self.clock.today();
        let total_workers = self.workers.list()?.len();

        let todays = self.records.list(None, Some(DateRange::single_day(today)?))?;
        let snapshot = DaySnapshot {
            present: todays.iter().filter(|r| r.entry_time().is_some()).count(),
            completed: todays
                .iter()
                .filter(|r| r.state() == AttendanceState::Completed)
                .count(),
            total_hours: todays.iter().map(|r| r.total_hours()).sum(),
            total_earnings: todays.iter().map(|r| r.earnings()).sum(),
        };

        Ok(Dashboard {
            total_workers,
            today: snapshot,
            this_week: self.period_totals(ReportPeriod::ThisWeek, today)?,
            this_month: self.period_totals(ReportPeriod::ThisMonth, today)?,
        })
    }

    fn period_totals(&self, period: ReportPeriod, today: NaiveDate) -> EngineResult<PeriodTotals> {
        let range = period.resolve(today, self.week_start)?;
        let records = self.records.list(None, Some(range))?;
        Ok(PeriodTotals {
            total_hours: records.iter().map(|r| r.total_hours()).sum(),
            total_earnings: records.iter().map(|r| r.earnings()).sum(),
        })
    }

    fn payments_in(&self, worker_id: Option<WorkerId>, range: DateRange) -> EngineResult<Vec<ExtraPayment>> {
        let filter = PaymentFilter {
            worker_id,
            range: Some(range),
            payment_type: None,
        };
        Ok(self
            .payments
            .list()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }
}

fn worker_names(workers: &[Worker]) -> HashMap<WorkerId, String> {
    workers.iter().map(|w| (w.id, w.username.clone())).collect()
}
