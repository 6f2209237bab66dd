//! Attendance record model.
//!
//! A record exists per (worker, calendar date). Its derived fields are only
//! ever written by the attendance tracker when the day is completed, so they
//! are kept private and exposed through accessors.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PayPolicy, WorkerId};

/// The lifecycle state of a single day's attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    /// No entry has been recorded yet.
    NotStarted,
    /// Entry recorded, exit pending.
    Entered,
    /// Entry and exit recorded; the day is closed.
    Completed,
}

/// An attendance event a worker can mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceEvent {
    /// Arrival.
    Entry,
    /// Departure.
    Exit,
}

impl fmt::Display for AttendanceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceEvent::Entry => write!(f, "entry"),
            AttendanceEvent::Exit => write!(f, "exit"),
        }
    }
}

/// Duration and pay derived from one completed day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEarnings {
    /// Billable minutes after the pay policy's rounding rule.
    pub total_minutes: i64,
    /// Billable hours.
    pub total_hours: Decimal,
    /// Amount earned for the day.
    pub amount: Decimal,
}

impl DayEarnings {
    /// Earnings of a day with no billable time.
    pub const ZERO: DayEarnings = DayEarnings {
        total_minutes: 0,
        total_hours: Decimal::ZERO,
        amount: Decimal::ZERO,
    };
}

/// One worker's attendance for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    worker_id: WorkerId,
    date: NaiveDate,
    entry_time: Option<NaiveDateTime>,
    exit_time: Option<NaiveDateTime>,
    total_minutes: i64,
    total_hours: Decimal,
    earnings: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pay_policy: Option<PayPolicy>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl AttendanceRecord {
    /// Opens a record for the day with the entry already set.
    pub(crate) fn open(worker_id: WorkerId, date: NaiveDate, entry_time: NaiveDateTime) -> Self {
        Self {
            worker_id,
            date,
            entry_time: Some(entry_time),
            exit_time: None,
            total_minutes: 0,
            total_hours: Decimal::ZERO,
            earnings: Decimal::ZERO,
            pay_policy: None,
            created_at: entry_time,
            updated_at: entry_time,
        }
    }

    /// Returns a completed copy of this record, paid under `policy`.
    pub(crate) fn completed(
        &self,
        exit_time: NaiveDateTime,
        earnings: DayEarnings,
        policy: PayPolicy,
    ) -> Self {
        Self {
            exit_time: Some(exit_time),
            total_minutes: earnings.total_minutes,
            total_hours: earnings.total_hours,
            earnings: earnings.amount,
            pay_policy: Some(policy),
            updated_at: exit_time,
            ..self.clone()
        }
    }

    /// The worker this record belongs to.
    pub fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    /// The calendar day of the record.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// When the worker arrived.
    pub fn entry_time(&self) -> Option<NaiveDateTime> {
        self.entry_time
    }

    /// When the worker left.
    pub fn exit_time(&self) -> Option<NaiveDateTime> {
        self.exit_time
    }

    /// Billable minutes; zero until the day is completed.
    pub fn total_minutes(&self) -> i64 {
        self.total_minutes
    }

    /// Billable hours; zero until the day is completed.
    pub fn total_hours(&self) -> Decimal {
        self.total_hours
    }

    /// Earnings for the day; zero until the day is completed.
    pub fn earnings(&self) -> Decimal {
        self.earnings
    }

    /// The pay policy the day was settled under; set once completed.
    pub fn pay_policy(&self) -> Option<PayPolicy> {
        self.pay_policy
    }

    /// When the record was created.
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// When the record last changed.
    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Derives the lifecycle state from the recorded timestamps.
    pub fn state(&self) -> AttendanceState {
        match (self.entry_time, self.exit_time) {
            (None, _) => AttendanceState::NotStarted,
            (Some(_), None) => AttendanceState::Entered,
            (Some(_), Some(_)) => AttendanceState::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_record() -> AttendanceRecord {
        AttendanceRecord::open(
            WorkerId(1),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            make_datetime("2026-03-02 09:00:00"),
        )
    }

    #[test]
    fn test_open_record_is_entered_with_zero_derived_fields() {
        let record = make_record();
        assert_eq!(record.state(), AttendanceState::Entered);
        assert_eq!(record.total_minutes(), 0);
        assert_eq!(record.total_hours(), Decimal::ZERO);
        assert_eq!(record.earnings(), Decimal::ZERO);
        assert_eq!(record.exit_time(), None);
    }

    #[test]
    fn test_completed_record_carries_earnings() {
        let record = make_record();
        let exit = make_datetime("2026-03-02 10:25:00");
        let policy = PayPolicy::Hourly {
            hourly_rate: Decimal::new(20, 0),
        };
        let done = record.completed(
            exit,
            DayEarnings {
                total_minutes: 60,
                total_hours: Decimal::ONE,
                amount: Decimal::new(2000, 2),
            },
            policy,
        );

        assert_eq!(done.state(), AttendanceState::Completed);
        assert_eq!(done.exit_time(), Some(exit));
        assert_eq!(done.total_minutes(), 60);
        assert_eq!(done.earnings(), Decimal::new(20, 0));
        assert_eq!(done.created_at(), record.created_at());
        assert_eq!(done.updated_at(), exit);
        assert_eq!(done.pay_policy(), Some(policy));
        // The source record is untouched
        assert_eq!(record.state(), AttendanceState::Entered);
    }

    #[test]
    fn test_record_serialization() {
        let record = make_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["worker_id"], 1);
        assert_eq!(json["date"], "2026-03-02");
        assert_eq!(json["entry_time"], "2026-03-02T09:00:00");
        assert!(json["exit_time"].is_null());
        assert!(json.get("pay_policy").is_none());

        let back: AttendanceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceState::NotStarted).unwrap(),
            "\"not_started\""
        );
        assert_eq!(AttendanceEvent::Exit.to_string(), "exit");
    }
}
