// RoboLog - GPL-3.0-or-later
// This file is part of RoboLog.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// RoboLog is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// RoboLog is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with RoboLog.  If not, see <https://www.gnu.org/licenses/>.

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const LOG_DIRECTORY_ENV: &str = "LOG_DIRECTORY";
pub const REPORTS_DIRECTORY_ENV: &str = "REPORTS_DIRECTORY";

/// Scalar knobs consumed by the analysis core, stored as JSON in the config
/// directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub log_directory: PathBuf,
    pub reports_directory: PathBuf,
    /// Glob patterns, tried in order, relative to `log_directory`
    pub file_patterns: Vec<String>,
    pub stop_window_minutes: f64,
    /// Meters
    pub movement_threshold: f64,
    pub stop_dedup_minutes: f64,
    pub lookback_tasks: usize,
    pub complaint_window_minutes: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("./logs"),
            reports_directory: PathBuf::from("./reports"),
            file_patterns: ["*.log", "*.txt", "*.INFO", "*.WARNING", "*.ERROR"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            stop_window_minutes: 10.0,
            movement_threshold: 0.01,
            stop_dedup_minutes: 5.0,
            lookback_tasks: 2,
            complaint_window_minutes: 30.0,
        }
    }
}

impl AnalyzerConfig {
    /// Get the path to the user config file
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("robolog").join("config.json"))
    }

    /// Load the user config, falling back to defaults when it is missing or
    /// unreadable. Environment overrides are applied on top.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| {
                Self::load_from(&path)
                    .inspect_err(|e| warn!("Ignoring config file: {e}"))
                    .ok()
            })
            .unwrap_or_else(|| {
                info!("No usable config found, using defaults");
                Self::default()
            });
        config.apply_env();
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| AnalyzerError::Config(format!("{}: {e}", path.display())))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `LOG_DIRECTORY` and `REPORTS_DIRECTORY` win over the file.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var_os(LOG_DIRECTORY_ENV),
            std::env::var_os(REPORTS_DIRECTORY_ENV),
        );
    }

    fn apply_overrides(
        &mut self,
        log_directory: Option<std::ffi::OsString>,
        reports_directory: Option<std::ffi::OsString>,
    ) {
        if let Some(dir) = log_directory.filter(|d| !d.is_empty()) {
            self.log_directory = dir.into();
        }
        if let Some(dir) = reports_directory.filter(|d| !d.is_empty()) {
            self.reports_directory = dir.into();
        }
    }

    /// Save to the user config path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| AnalyzerError::Config("could not determine config directory".into()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AnalyzerError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| AnalyzerError::io(path, e))?;
        info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"lookback_tasks": 4, "stop_window_minutes": 5}"#)
            .expect("write");

        let config = AnalyzerConfig::load_from(&path).expect("load");
        assert_eq!(config.lookback_tasks, 4);
        assert!((config.stop_window_minutes - 5.0).abs() < f64::EPSILON);
        assert!((config.complaint_window_minutes - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.file_patterns.len(), 5);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = AnalyzerConfig {
            movement_threshold: 0.05,
            ..AnalyzerConfig::default()
        };
        config.save_to(&path).expect("save");
        assert_eq!(AnalyzerConfig::load_from(&path).expect("load"), config);
    }

    #[test]
    fn test_corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            AnalyzerConfig::load_from(&path),
            Err(AnalyzerError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = AnalyzerConfig::default();
        config.apply_overrides(Some("/data/robot".into()), Some(String::new().into()));
        assert_eq!(config.log_directory, PathBuf::from("/data/robot"));
        assert_eq!(config.reports_directory, PathBuf::from("./reports"));
    }
}
