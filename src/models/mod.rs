//! Core data models for the attendance and payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance_record;
mod audit;
mod extra_payment;
mod period;
mod report;
mod worker;

pub use attendance_record::{AttendanceEvent, AttendanceRecord, AttendanceState, DayEarnings};
pub use audit::AuditStep;
pub use extra_payment::{ExtraPayment, NewExtraPayment, PaymentFilter, PaymentType};
pub use period::{DateRange, ReportPeriod, WeekStart};
pub use report::{
    Dashboard, DaySnapshot, HistoryPage, PeriodTotals, Report, ReportRow, ReportSummary,
    WorkerFilter, WorkerStatement,
};
pub use worker::{Identity, PayPolicy, Worker, WorkerId};
