//! Configuration loading and management for the engine.
//!
//! This module provides functionality to load engine settings from YAML,
//! including registration defaults, ledger sign rules, and report settings.
//!
//! # Example
//!
//! ```no_run
//! use attendance_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("History page size: {}", config.settings().history.page_size);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, SETTINGS_FILE};
pub use types::{
    EngineSettings, HistorySettings, PayDefaults, PaymentRules, PaymentSign, ReportSettings,
};
