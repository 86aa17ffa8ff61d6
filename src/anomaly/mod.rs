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

pub mod keyword;
pub mod summary;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use keyword::detect_anomalies;
pub use summary::{AnomalySummary, HealthLevel, SystemHealth};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    SensorOffline,
    MechanicalIssue,
    CpuHigh,
    SpeedAnomaly,
    LocalizationDrop,
    BatteryLow,
}

impl AnomalyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SensorOffline => "sensor_offline",
            Self::MechanicalIssue => "mechanical_issue",
            Self::CpuHigh => "cpu_high",
            Self::SpeedAnomaly => "speed_anomaly",
            Self::LocalizationDrop => "localization_drop",
            Self::BatteryLow => "battery_low",
        }
    }

    /// Severity before the ERROR/WARN override.
    #[must_use]
    pub const fn base_severity(self) -> Severity {
        match self {
            Self::MechanicalIssue | Self::CpuHigh | Self::LocalizationDrop => Severity::High,
            Self::SensorOffline | Self::SpeedAnomaly | Self::BatteryLow => Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Final severity for a line. The raw text wins over the table: `ERROR`
/// forces high, otherwise `WARN` forces medium. Both checks are
/// case-sensitive.
#[must_use]
pub fn assess_severity(kind: AnomalyKind, raw: &str) -> Severity {
    if raw.contains("ERROR") {
        Severity::High
    } else if raw.contains("WARN") {
        Severity::Medium
    } else {
        kind.base_severity()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub timestamp: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub description: String,
    pub file: String,
    pub line_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_beats_table() {
        assert_eq!(assess_severity(AnomalyKind::SensorOffline, "sensor offline"), Severity::Medium);
        assert_eq!(
            assess_severity(AnomalyKind::SensorOffline, "[ERROR] sensor offline"),
            Severity::High
        );
        assert_eq!(
            assess_severity(AnomalyKind::CpuHigh, "[WARN] cpu load 95"),
            Severity::Medium
        );
        // lowercase does not trigger the override
        assert_eq!(
            assess_severity(AnomalyKind::BatteryLow, "error: battery low"),
            Severity::Medium
        );
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&AnomalyKind::LocalizationDrop).expect("serialize");
        assert_eq!(json, "\"localization_drop\"");
        assert_eq!(AnomalyKind::LocalizationDrop.as_str(), "localization_drop");
    }
}
