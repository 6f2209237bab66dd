//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::EngineSettings;

/// Name of the settings file inside a configuration directory.
pub const SETTINGS_FILE: &str = "engine.yaml";

/// Loads and provides access to engine settings.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// └── engine.yaml   # Pay defaults, ledger sign rules, report and history settings
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_payroll::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Week starts on {:?}", loader.settings().reports.week_start);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    settings: EngineSettings,
}

impl ConfigLoader {
    /// Loads settings from `engine.yaml` in the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or unknown values (`ConfigParseError`)
    /// - A value is out of range (`Validation`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let settings_path = path.as_ref().join(SETTINGS_FILE);
        let path_str = settings_path.display().to_string();

        let content = fs::read_to_string(&settings_path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let loader = Self::parse(&content, &path_str)?;
        info!(path = %path_str, "Loaded engine settings");
        Ok(loader)
    }

    /// Parses settings from an in-memory YAML document.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_payroll::config::{ConfigLoader, PaymentSign};
    ///
    /// let loader = ConfigLoader::from_yaml_str("payments:\n  advance: subtract\n").unwrap();
    /// assert_eq!(loader.settings().payments.advance, PaymentSign::Subtract);
    /// ```
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, path: &str) -> EngineResult<Self> {
        // An empty document deserializes as unit, not as an empty mapping
        let settings = if content.trim().is_empty() {
            EngineSettings::default()
        } else {
            serde_yaml::from_str::<EngineSettings>(content).map_err(|e| {
                EngineError::ConfigParseError {
                    path: path.to_string(),
                    message: e.to_string(),
                }
            })?
        };
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Returns the loaded settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Consumes the loader, returning the settings.
    pub fn into_settings(self) -> EngineSettings {
        self.settings
    }
}
