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

//! Task phase and task outcome classification.

use super::PatternTable;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    TaskStart,
    TaskEnd,
    Charging,
    Debugging,
    MapMaintenance,
    Idle,
}

// Order matters: "navigation no task" is also a task_start hit and
// task_start wins.
const TASK_PHASE_PATTERNS: &[(TaskPhase, &[&str])] = &[
    (
        TaskPhase::TaskStart,
        &[
            r"wait_for_delivery_task entry",
            r"任务开始",
            r"clean.*start",
            r"mission.*start",
            r"navigation.*task",
            r"开始清洁",
            r"执行任务",
        ],
    ),
    (
        TaskPhase::TaskEnd,
        &[
            r"finish task",
            r"任务结束",
            r"clean.*finish",
            r"mission.*complete",
            r"navigation no task",
            r"清洁完成",
            r"任务完成",
        ],
    ),
    (
        TaskPhase::Charging,
        &[r"charging", r"充电", r"charge station", r"电桩", r"docking", r"对接"],
    ),
    (
        TaskPhase::Debugging,
        &[r"debug", r"调试", r"test mode", r"测试模式"],
    ),
    (
        TaskPhase::MapMaintenance,
        &[r"map.*maintenance", r"地图维护", r"slam.*build", r"建图", r"mapping"],
    ),
    (
        TaskPhase::Idle,
        &[r"idle", r"闲置", r"waiting", r"等待", r"standby"],
    ),
];

static TASK_PHASES: LazyLock<PatternTable<TaskPhase>> =
    LazyLock::new(|| PatternTable::new(TASK_PHASE_PATTERNS));

/// At most one phase per line; the first matching phase in table order.
#[must_use]
pub fn detect_task_phase(line: &str) -> Option<TaskPhase> {
    TASK_PHASES.first_match(line)
}

/// How a finished task ended, read from its closing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    Success,
    Failure,
}

const SUCCESS_PATTERNS: &[(TaskOutcome, &[&str])] = &[(
    TaskOutcome::Success,
    &[r"task.*success", r"任务.*成功", r"完成.*正常", r"success.*complete"],
)];

const FAILURE_PATTERNS: &[(TaskOutcome, &[&str])] = &[(
    TaskOutcome::Failure,
    &[
        r"task.*fail",
        r"任务.*失败",
        r"异常.*终止",
        r"error.*task",
        r"failed.*complete",
    ],
)];

static SUCCESS: LazyLock<PatternTable<TaskOutcome>> =
    LazyLock::new(|| PatternTable::new(SUCCESS_PATTERNS));
static FAILURE: LazyLock<PatternTable<TaskOutcome>> =
    LazyLock::new(|| PatternTable::new(FAILURE_PATTERNS));

/// Failure wins when a line carries both markers.
#[must_use]
pub fn detect_task_outcome(line: &str) -> Option<TaskOutcome> {
    FAILURE.first_match(line).or_else(|| SUCCESS.first_match(line))
}
