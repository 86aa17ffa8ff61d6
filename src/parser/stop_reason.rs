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

//! Explicit stop causes logged by the navigation stack.

use super::{LogLine, PatternTable};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ObstacleBlocked,
    NavigationError,
    SensorFailure,
    BatteryLow,
    SystemError,
}

impl StopReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ObstacleBlocked => "obstacle_blocked",
            Self::NavigationError => "navigation_error",
            Self::SensorFailure => "sensor_failure",
            Self::BatteryLow => "battery_low",
            Self::SystemError => "system_error",
        }
    }

    #[must_use]
    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::ObstacleBlocked => "Clear obstacles on the route and review obstacle avoidance parameters",
            Self::NavigationError => "Re-check localization and map quality; relocalize the robot if needed",
            Self::SensorFailure => "Inspect sensor connections and restart the perception stack",
            Self::BatteryLow => "Charge the robot and review the charging schedule",
            Self::SystemError => "Inspect system logs and restart the affected service",
        }
    }
}

const STOP_REASON_PATTERNS: &[(StopReason, &[&str])] = &[
    (
        StopReason::ObstacleBlocked,
        &[
            r"障碍物.*阻挡",
            r"obstacle.*block",
            r"路径.*阻塞",
            r"前方.*障碍",
            r"collision.*avoidance",
        ],
    ),
    (
        StopReason::NavigationError,
        &[
            r"导航.*错误",
            r"定位.*丢失",
            r"slam.*失败",
            r"地图.*错误",
            r"路径.*规划.*错误",
        ],
    ),
    (
        StopReason::SensorFailure,
        &[
            r"传感器.*失效",
            r"激光雷达.*掉线",
            r"相机.*断开",
            r"感知.*系统.*故障",
            r"sensor.*offline",
        ],
    ),
    (
        StopReason::BatteryLow,
        &[
            r"电池.*低",
            r"电量.*不足",
            r"需要充电",
            r"battery.*low",
            r"power.*critical",
        ],
    ),
    (
        StopReason::SystemError,
        &[
            r"系统.*错误",
            r"程序.*崩溃",
            r"软件.*异常",
            r"进程.*终止",
            r"system.*error",
        ],
    ),
];

static STOP_REASONS: LazyLock<PatternTable<StopReason>> =
    LazyLock::new(|| PatternTable::new(STOP_REASON_PATTERNS));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopReasonEvent {
    pub timestamp: NaiveDateTime,
    pub reason: StopReason,
    pub line: String,
    pub file: String,
}

/// One event per matching pattern.
#[must_use]
pub fn detect_stop_reasons(line: &LogLine<'_>, timestamp: NaiveDateTime) -> Vec<StopReasonEvent> {
    STOP_REASONS
        .all_matches(line.raw)
        .map(|reason| StopReasonEvent {
            timestamp,
            reason,
            line: line.trimmed().to_string(),
            file: line.file_name.to_string(),
        })
        .collect()
}
