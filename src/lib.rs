//! Attendance tracking and payroll computation engine
//!
//! This crate records daily entry and exit per worker, derives billable
//! duration and earnings from each worker's pay policy, keeps an append-only
//! ledger of extra payments, and aggregates both into period reports.
//! Transport, authentication and persistence technology are left to the
//! embedding application.

#![warn(missing_docs)]

pub mod attendance;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod models;
pub mod report;
pub mod store;
pub mod workers;
