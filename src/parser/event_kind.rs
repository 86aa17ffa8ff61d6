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

use super::PatternTable;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Coarse category of an in-task event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Navigation,
    Sensor,
    System,
    Error,
    Warning,
    Status,
    General,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Sensor => "sensor",
            Self::System => "system",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Status => "status",
            Self::General => "general",
        }
    }
}

const EVENT_KIND_PATTERNS: &[(EventKind, &[&str])] = &[
    (EventKind::Navigation, &[r"navigation", r"导航", r"路径", r"goal"]),
    (EventKind::Sensor, &[r"sensor", r"传感器", r"激光雷达", r"camera"]),
    (EventKind::System, &[r"cpu", r"memory", r"battery", r"temperature"]),
    (EventKind::Error, &[r"error", r"fail", r"异常", r"错误"]),
    (EventKind::Warning, &[r"warn", r"警告", r"注意"]),
    (EventKind::Status, &[r"status", r"状态", r"online", r"offline"]),
];

static EVENT_KINDS: LazyLock<PatternTable<EventKind>> =
    LazyLock::new(|| PatternTable::new(EVENT_KIND_PATTERNS));

#[must_use]
pub fn classify_event(line: &str) -> EventKind {
    EVENT_KINDS.first_match(line).unwrap_or(EventKind::General)
}
