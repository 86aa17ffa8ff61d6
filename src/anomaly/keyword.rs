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

use super::{assess_severity, AnomalyEvent, AnomalyKind};
use crate::parser::{LogLine, PatternTable};
use chrono::NaiveDateTime;
use std::sync::LazyLock;

const ANOMALY_PATTERNS: &[(AnomalyKind, &[&str])] = &[
    (
        AnomalyKind::SensorOffline,
        &[
            r"sensor.*offline",
            r"传感器.*掉线",
            r"motor offline",
            r"get transform.*fail",
            r"camera.*fail",
            r"激光雷达.*异常",
        ],
    ),
    (
        AnomalyKind::MechanicalIssue,
        &[
            r"脚落异常",
            r"机械.*异常",
            r"collision",
            r"碰撞",
            r"bump",
            r"卡住",
            r"stuck",
        ],
    ),
    (
        AnomalyKind::CpuHigh,
        &[
            r"cpu.*load.*[789]\d",
            r"cpu.*[789]\d%",
            r"cpu.*100%",
            r"系统.*负载",
            r"memory.*high",
        ],
    ),
    (
        AnomalyKind::SpeedAnomaly,
        &[
            r"速度异常",
            r"speed.*anomaly",
            r"VCLra",
            r"Ara",
            r"velocity.*abnormal",
        ],
    ),
    (
        AnomalyKind::LocalizationDrop,
        &[
            r"定位.*下降",
            r"localization.*drop",
            r"score.*0",
            r"定位.*丢失",
            r"slam.*fail",
        ],
    ),
    (
        AnomalyKind::BatteryLow,
        &[r"电池.*低", r"battery.*low", r"电量.*不足", r"需要充电"],
    ),
];

static ANOMALIES: LazyLock<PatternTable<AnomalyKind>> =
    LazyLock::new(|| PatternTable::new(ANOMALY_PATTERNS));

/// Run the fault-pattern bank over one timestamped line.
///
/// Every matching pattern yields its own event, so a line can report the
/// same kind more than once and several kinds at once.
#[must_use]
pub fn detect_anomalies(line: &LogLine<'_>, timestamp: NaiveDateTime) -> Vec<AnomalyEvent> {
    ANOMALIES
        .all_matches(line.raw)
        .map(|kind| AnomalyEvent {
            timestamp,
            kind,
            severity: assess_severity(kind, line.raw),
            description: line.trimmed().to_string(),
            file: line.file_name.to_string(),
            line_number: line.line_number,
        })
        .collect()
}
