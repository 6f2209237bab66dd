//! Attendance state machine.
//!
//! Each (worker, date) moves `NotStarted -> Entered -> Completed`. The
//! [`AttendanceTracker`] enforces the legal transitions, calls the
//! calculator on exit, and persists the result. Transitions for the same
//! key are serialized; different keys proceed in parallel.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::calculation::{EarningsCalculation, calculate_day_earnings};
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceEvent, AttendanceRecord, AttendanceState, DateRange, HistoryPage, Worker, WorkerId,
};
use crate::store::{AttendanceStore, KeyedLocks, WorkerStore};

/// Records entries and exits and derives each day's pay.
pub struct AttendanceTracker {
    workers: Arc<dyn WorkerStore>,
    records: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks<(WorkerId, NaiveDate)>,
    page_size: usize,
}

impl AttendanceTracker {
    /// Creates a tracker over the given stores.
    pub fn new(
        workers: Arc<dyn WorkerStore>,
        records: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
        page_size: usize,
    ) -> Self {
        Self {
            workers,
            records,
            clock,
            locks: KeyedLocks::default(),
            page_size,
        }
    }

    /// Marks entry at the clock's current time.
    pub fn mark_entry(&self, worker_id: WorkerId) -> EngineResult<AttendanceRecord> {
        self.mark_entry_at(worker_id, self.clock.now())
    }

    /// Marks entry at `at`, opening the record for `at`'s date.
    ///
    /// # Errors
    ///
    /// - `AlreadyMarked` if entry was already marked that day
    /// - `RecordClosed` if the day is completed
    /// - `NotFound` / `Validation` for an unknown or inactive worker
    pub fn mark_entry_at(
        &self,
        worker_id: WorkerId,
        at: NaiveDateTime,
    ) -> EngineResult<AttendanceRecord> {
        self.active_worker(worker_id)?;
        let date = at.date();
        self.locks
            .with_lock((worker_id, date), || self.open_day(worker_id, date, at))
    }

    fn open_day(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
        at: NaiveDateTime,
    ) -> EngineResult<AttendanceRecord> {
        if let Some(existing) = self.records.get(worker_id, date)? {
            match existing.state() {
                AttendanceState::Entered => {
                    warn!(worker_id = %worker_id, date = %date, "Entry already marked");
                    return Err(EngineError::AlreadyMarked {
                        worker_id,
                        date,
                        event: AttendanceEvent::Entry,
                    });
                }
                AttendanceState::Completed => {
                    warn!(worker_id = %worker_id, date = %date, "Entry on closed day");
                    return Err(EngineError::RecordClosed { worker_id, date });
                }
                AttendanceState::NotStarted => {}
            }
        }

        let record = AttendanceRecord::open(worker_id, date, at);
        self.records.put(record.clone())?;

        info!(worker_id = %worker_id, date = %date, entry_time = %at, "Entry marked");
        Ok(record)
    }

    /// Marks exit at the clock's current time.
    pub fn mark_exit(&self, worker_id: WorkerId) -> EngineResult<AttendanceRecord> {
        self.mark_exit_at(worker_id, self.clock.now())
    }

    /// Marks exit at `at` and settles the day's pay.
    ///
    /// # Errors
    ///
    /// - `EntryMissing` if no entry was marked for `at`'s date
    /// - `AlreadyMarked` if exit was already marked that day
    /// - `InvalidTimeRange` if `at` precedes the entry
    /// - `NotFound` / `Validation` for an unknown or inactive worker
    pub fn mark_exit_at(
        &self,
        worker_id: WorkerId,
        at: NaiveDateTime,
    ) -> EngineResult<AttendanceRecord> {
        let worker = self.active_worker(worker_id)?;
        let date = at.date();
        self.locks
            .with_lock((worker_id, date), || self.close_day(&worker, date, at))
    }

    fn close_day(
        &self,
        worker: &Worker,
        date: NaiveDate,
        at: NaiveDateTime,
    ) -> EngineResult<AttendanceRecord> {
        let worker_id = worker.id;
        let record = self
            .records
            .get(worker_id, date)?
            .ok_or(EngineError::EntryMissing { worker_id, date })?;

        let entry_time = match (record.state(), record.entry_time()) {
            (AttendanceState::Completed, _) => {
                warn!(worker_id = %worker_id, date = %date, "Exit already marked");
                return Err(EngineError::AlreadyMarked {
                    worker_id,
                    date,
                    event: AttendanceEvent::Exit,
                });
            }
            (_, Some(entry_time)) => entry_time,
            (_, None) => return Err(EngineError::EntryMissing { worker_id, date }),
        };

        if at < entry_time {
            warn!(
                worker_id = %worker_id,
                entry_time = %entry_time,
                exit_time = %at,
                "Exit precedes entry"
            );
            return Err(EngineError::InvalidTimeRange {
                entry_time,
                exit_time: at,
            });
        }

        let calculation = calculate_day_earnings(entry_time, at, &worker.pay_policy)?;
        let completed = record.completed(at, calculation.earnings, worker.pay_policy);
        self.records.put(completed.clone())?;

        info!(
            worker_id = %worker_id,
            date = %date,
            total_minutes = completed.total_minutes(),
            earnings = %completed.earnings(),
            "Exit marked"
        );
        Ok(completed)
    }

    /// Returns the worker's record for `date`, if any.
    pub fn get_record(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>> {
        self.worker(worker_id)?;
        self.records.get(worker_id, date)
    }

    /// Returns the worker's record for the clock's current date, if any.
    pub fn today_record(&self, worker_id: WorkerId) -> EngineResult<Option<AttendanceRecord>> {
        self.get_record(worker_id, self.clock.today())
    }

    /// Returns the state of the worker's day.
    pub fn state_of(&self, worker_id: WorkerId, date: NaiveDate) -> EngineResult<AttendanceState> {
        Ok(self
            .get_record(worker_id, date)?
            .map_or(AttendanceState::NotStarted, |r| r.state()))
    }

    /// Returns the worker's records, newest first.
    pub fn list_history(
        &self,
        worker_id: WorkerId,
        range: Option<DateRange>,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        self.worker(worker_id)?;
        let mut records = self.records.list(Some(worker_id), range)?;
        records.sort_by(|a, b| b.date().cmp(&a.date()));
        Ok(records)
    }

    /// Returns one page of the worker's history, newest first.
    ///
    /// Pages start at 1. `per_page` defaults to the configured page size.
    pub fn history_page(
        &self,
        worker_id: WorkerId,
        page: usize,
        per_page: Option<usize>,
    ) -> EngineResult<HistoryPage> {
        let per_page = per_page.unwrap_or(self.page_size);
        if page == 0 {
            return Err(EngineError::validation("page", "pages start at 1"));
        }
        if per_page == 0 {
            return Err(EngineError::validation("per_page", "must be greater than zero"));
        }

        let history = self.list_history(worker_id, None)?;
        let total = history.len();
        let records = history
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Ok(HistoryPage {
            records,
            total,
            pages: total.div_ceil(per_page),
            current_page: page,
        })
    }

    /// Recomputes a completed day from its raw entry and exit times.
    ///
    /// The returned figures always equal the stored ones; the audit steps
    /// show how they were derived.
    pub fn explain_record(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
    ) -> EngineResult<EarningsCalculation> {
        let record = self
            .get_record(worker_id, date)?
            .ok_or_else(|| EngineError::not_found("attendance record", format!("{}/{}", worker_id, date)))?;

        match (record.entry_time(), record.exit_time(), record.pay_policy()) {
            (Some(entry_time), Some(exit_time), Some(policy)) => {
                calculate_day_earnings(entry_time, exit_time, &policy)
            }
            _ => Err(EngineError::validation("record", "day is not completed")),
        }
    }

    fn worker(&self, worker_id: WorkerId) -> EngineResult<Worker> {
        self.workers
            .get(worker_id)?
            .ok_or_else(|| EngineError::not_found("worker", worker_id))
    }

    fn active_worker(&self, worker_id: WorkerId) -> EngineResult<Worker> {
        let worker = self.worker(worker_id)?;
        if !worker.active {
            return Err(EngineError::validation("worker", "worker is inactive"));
        }
        Ok(worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Identity, PayPolicy};
    use crate::store::{InMemoryStore, NewWorkerRecord};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Barrier;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    struct Fixture {
        tracker: AttendanceTracker,
        store: Arc<InMemoryStore>,
        clock: Arc<FixedClock>,
        worker_id: WorkerId,
    }

    fn create_fixture(policy: PayPolicy) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(FixedClock::new(make_datetime("2026-03-02", "09:00:00")));
        let worker = store
            .insert(NewWorkerRecord {
                username: "ravi".to_string(),
                identity: Identity::Phone {
                    phone: "9876543210".to_string(),
                },
                pay_policy: policy,
                created_at: make_datetime("2026-03-01", "08:00:00"),
            })
            .unwrap();
        let tracker = AttendanceTracker::new(store.clone(), store.clone(), clock.clone(), 30);
        Fixture {
            tracker,
            store,
            clock,
            worker_id: worker.id,
        }
    }

    fn hourly_fixture() -> Fixture {
        create_fixture(PayPolicy::Hourly {
            hourly_rate: dec("20"),
        })
    }

    /// AT-001: entry then exit completes the day
    #[test]
    fn test_entry_then_exit_completes_day() {
        let f = hourly_fixture();
        let entered = f.tracker.mark_entry(f.worker_id).unwrap();
        assert_eq!(entered.state(), AttendanceState::Entered);

        f.clock.set(make_datetime("2026-03-02", "10:25:00"));
        let done = f.tracker.mark_exit(f.worker_id).unwrap();

        assert_eq!(done.state(), AttendanceState::Completed);
        assert_eq!(done.total_minutes(), 60);
        assert_eq!(done.earnings(), dec("20.00"));
        assert_eq!(
            f.tracker.get_record(f.worker_id, make_date("2026-03-02")).unwrap(),
            Some(done)
        );
    }

    /// AT-002: second entry is rejected and does not overwrite
    #[test]
    fn test_second_entry_is_already_marked() {
        let f = hourly_fixture();
        let first = f.tracker.mark_entry(f.worker_id).unwrap();

        f.clock.set(make_datetime("2026-03-02", "09:05:00"));
        let result = f.tracker.mark_entry(f.worker_id);
        assert!(matches!(
            result,
            Err(EngineError::AlreadyMarked {
                event: AttendanceEvent::Entry,
                ..
            })
        ));

        let stored = f
            .tracker
            .get_record(f.worker_id, make_date("2026-03-02"))
            .unwrap()
            .unwrap();
        assert_eq!(stored.entry_time(), first.entry_time());
    }

    /// AT-003: exit before entry creates nothing
    #[test]
    fn test_exit_without_entry_is_entry_missing() {
        let f = hourly_fixture();
        let result = f.tracker.mark_exit(f.worker_id);
        assert!(matches!(result, Err(EngineError::EntryMissing { .. })));
        assert_eq!(
            f.tracker.get_record(f.worker_id, make_date("2026-03-02")).unwrap(),
            None
        );
    }

    /// AT-004: clock skew is rejected, not clamped
    #[test]
    fn test_exit_earlier_than_entry_is_invalid_time_range() {
        let f = hourly_fixture();
        f.tracker
            .mark_entry_at(f.worker_id, make_datetime("2026-03-02", "10:00:00"))
            .unwrap();

        let result = f
            .tracker
            .mark_exit_at(f.worker_id, make_datetime("2026-03-02", "09:59:00"));
        assert!(matches!(result, Err(EngineError::InvalidTimeRange { .. })));
        assert_eq!(
            f.tracker.state_of(f.worker_id, make_date("2026-03-02")).unwrap(),
            AttendanceState::Entered
        );
    }

    /// AT-005: completed day rejects a new entry as closed and a second exit
    /// as already marked
    #[test]
    fn test_completed_day_is_closed() {
        let f = hourly_fixture();
        f.tracker.mark_entry(f.worker_id).unwrap();
        f.clock.set(make_datetime("2026-03-02", "17:00:00"));
        let done = f.tracker.mark_exit(f.worker_id).unwrap();

        f.clock.set(make_datetime("2026-03-02", "18:00:00"));
        assert!(matches!(
            f.tracker.mark_entry(f.worker_id),
            Err(EngineError::RecordClosed { .. })
        ));
        assert!(matches!(
            f.tracker.mark_exit(f.worker_id),
            Err(EngineError::AlreadyMarked {
                event: AttendanceEvent::Exit,
                ..
            })
        ));

        // Nothing drifted
        for _ in 0..3 {
            assert_eq!(
                f.tracker.get_record(f.worker_id, make_date("2026-03-02")).unwrap(),
                Some(done.clone())
            );
        }
    }

    /// AT-006: a new calendar day starts fresh
    #[test]
    fn test_next_day_starts_not_started() {
        let f = hourly_fixture();
        f.tracker.mark_entry(f.worker_id).unwrap();
        f.clock.set(make_datetime("2026-03-02", "17:00:00"));
        f.tracker.mark_exit(f.worker_id).unwrap();

        f.clock.set(make_datetime("2026-03-03", "09:00:00"));
        assert_eq!(
            f.tracker.state_of(f.worker_id, make_date("2026-03-03")).unwrap(),
            AttendanceState::NotStarted
        );
        assert!(f.tracker.mark_entry(f.worker_id).is_ok());
    }

    #[test]
    fn test_exit_after_midnight_targets_new_day() {
        let f = hourly_fixture();
        f.tracker
            .mark_entry_at(f.worker_id, make_datetime("2026-03-02", "22:00:00"))
            .unwrap();
        let result = f
            .tracker
            .mark_exit_at(f.worker_id, make_datetime("2026-03-03", "01:00:00"));
        assert!(matches!(result, Err(EngineError::EntryMissing { date, .. }) if date == make_date("2026-03-03")));
    }

    #[test]
    fn test_zero_length_day_is_not_an_error() {
        let f = hourly_fixture();
        f.tracker.mark_entry(f.worker_id).unwrap();
        let done = f.tracker.mark_exit(f.worker_id).unwrap();
        assert_eq!(done.total_minutes(), 0);
        assert_eq!(done.earnings(), Decimal::ZERO);
    }

    #[test]
    fn test_daily_wage_worker() {
        let f = create_fixture(PayPolicy::DailyWage {
            daily_wage: dec("400"),
            standard_hours: dec("8"),
        });
        f.tracker.mark_entry(f.worker_id).unwrap();
        f.clock.set(make_datetime("2026-03-02", "13:00:00"));
        let done = f.tracker.mark_exit(f.worker_id).unwrap();
        assert_eq!(done.total_hours(), dec("4"));
        assert_eq!(done.earnings(), dec("200.00"));
    }

    #[test]
    fn test_unknown_worker_is_not_found() {
        let f = hourly_fixture();
        let result = f.tracker.mark_entry(WorkerId(999));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
        assert!(matches!(
            f.tracker.get_record(WorkerId(999), make_date("2026-03-02")),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_inactive_worker_cannot_mark() {
        let f = hourly_fixture();
        let mut worker = WorkerStore::get(f.store.as_ref(), f.worker_id).unwrap().unwrap();
        worker.active = false;
        f.store.update(worker).unwrap();

        let result = f.tracker.mark_entry(f.worker_id);
        assert!(matches!(result, Err(EngineError::Validation { field, .. }) if field == "worker"));
    }

    #[test]
    fn test_explain_uses_policy_at_settlement() {
        let f = hourly_fixture();
        f.tracker.mark_entry(f.worker_id).unwrap();
        f.clock.set(make_datetime("2026-03-02", "10:25:00"));
        let done = f.tracker.mark_exit(f.worker_id).unwrap();

        // A later raise does not change how the settled day is explained
        let mut worker = WorkerStore::get(f.store.as_ref(), f.worker_id).unwrap().unwrap();
        worker.pay_policy = PayPolicy::Hourly {
            hourly_rate: dec("30"),
        };
        f.store.update(worker).unwrap();

        let explained = f
            .tracker
            .explain_record(f.worker_id, make_date("2026-03-02"))
            .unwrap();
        assert_eq!(explained.earnings.amount, done.earnings());
        assert_eq!(explained.earnings.total_minutes, done.total_minutes());
        assert_eq!(explained.audit_steps[1].output["discarded_minutes"], 25);
    }

    #[test]
    fn test_explain_incomplete_day_is_rejected() {
        let f = hourly_fixture();
        f.tracker.mark_entry(f.worker_id).unwrap();
        assert!(matches!(
            f.tracker.explain_record(f.worker_id, make_date("2026-03-02")),
            Err(EngineError::Validation { .. })
        ));
        assert!(matches!(
            f.tracker.explain_record(f.worker_id, make_date("2026-03-05")),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_history_is_newest_first_and_paginated() {
        let f = hourly_fixture();
        for day in 2..=6 {
            let date = format!("2026-03-0{}", day);
            f.tracker
                .mark_entry_at(f.worker_id, make_datetime(&date, "09:00:00"))
                .unwrap();
            f.tracker
                .mark_exit_at(f.worker_id, make_datetime(&date, "17:00:00"))
                .unwrap();
        }

        let history = f.tracker.list_history(f.worker_id, None).unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].date(), make_date("2026-03-06"));
        assert_eq!(history[4].date(), make_date("2026-03-02"));

        let range = DateRange::new(make_date("2026-03-03"), make_date("2026-03-05")).unwrap();
        let ranged = f.tracker.list_history(f.worker_id, Some(range)).unwrap();
        assert_eq!(
            ranged.iter().map(|r| r.date()).collect::<Vec<_>>(),
            vec![make_date("2026-03-04"), make_date("2026-03-03")]
        );

        let page = f.tracker.history_page(f.worker_id, 2, Some(2)).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.records[0].date(), make_date("2026-03-04"));

        let beyond = f.tracker.history_page(f.worker_id, 9, Some(2)).unwrap();
        assert!(beyond.records.is_empty());

        assert!(f.tracker.history_page(f.worker_id, 0, None).is_err());
        assert!(f.tracker.history_page(f.worker_id, 1, Some(0)).is_err());
    }

    #[test]
    fn test_concurrent_entries_yield_one_success() {
        let f = hourly_fixture();
        let tracker = Arc::new(f.tracker);
        let at = make_datetime("2026-03-02", "09:00:00");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                let worker_id = f.worker_id;
                std::thread::spawn(move || {
                    tracker.mark_entry_at(worker_id, at + chrono::TimeDelta::seconds(i))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
            e,
            EngineError::AlreadyMarked { .. }
        )));
    }

    #[test]
    fn test_concurrent_exits_settle_once() {
        let f = hourly_fixture();
        f.tracker.mark_entry(f.worker_id).unwrap();
        let tracker = Arc::new(f.tracker);
        let barrier = Arc::new(Barrier::new(8));
        let at = make_datetime("2026-03-02", "17:00:00");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                let barrier = Arc::clone(&barrier);
                let worker_id = f.worker_id;
                std::thread::spawn(move || {
                    barrier.wait();
                    tracker.mark_exit_at(worker_id, at + chrono::TimeDelta::minutes(i))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
            e,
            EngineError::AlreadyMarked {
                event: AttendanceEvent::Exit,
                ..
            }
        )));
    }

    #[test]
    fn test_lock_slots_are_released_after_each_transition() {
        let f = hourly_fixture();
        let first = make_datetime("2026-03-02", "09:00:00");
        for day in 0..500 {
            let entry = first + chrono::TimeDelta::days(day);
            f.tracker.mark_entry_at(f.worker_id, entry).unwrap();
            f.tracker
                .mark_exit_at(f.worker_id, entry + chrono::TimeDelta::hours(8))
                .unwrap();
        }
        // Failed transitions release their slot too
        assert!(f.tracker.mark_exit_at(f.worker_id, first - chrono::TimeDelta::days(1)).is_err());
        assert!(f.tracker.mark_entry_at(f.worker_id, first).is_err());

        assert_eq!(f.tracker.locks.len().unwrap(), 0);
        assert_eq!(f.tracker.list_history(f.worker_id, None).unwrap().len(), 500);
    }

    #[test]
    fn test_rate_too_large_to_pay_is_rejected_and_day_stays_open() {
        let f = create_fixture(PayPolicy::Hourly {
            hourly_rate: Decimal::MAX,
        });
        f.tracker.mark_entry(f.worker_id).unwrap();

        f.clock.set(make_datetime("2026-03-02", "10:30:00"));
        let result = f.tracker.mark_exit(f.worker_id);
        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "hourly_rate"
        ));
        assert_eq!(
            f.tracker.state_of(f.worker_id, make_date("2026-03-02")).unwrap(),
            AttendanceState::Entered
        );

        // The worker is still usable once the rate is fixed
        let mut worker = WorkerStore::get(f.store.as_ref(), f.worker_id).unwrap().unwrap();
        worker.pay_policy = PayPolicy::Hourly {
            hourly_rate: dec("20"),
        };
        f.store.update(worker).unwrap();
        let done = f.tracker.mark_exit(f.worker_id).unwrap();
        assert_eq!(done.earnings(), dec("30.00"));
    }
}
