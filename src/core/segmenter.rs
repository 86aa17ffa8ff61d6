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

//! Per-file task state machine.
//!
//! `idle --task_start--> open --task_end--> idle`. A start while open is
//! ignored, and a task still open at end of file is dropped.

use crate::anomaly::AnomalyEvent;
use crate::parser::event_kind::EventKind;
use crate::parser::phase::{detect_task_outcome, TaskOutcome, TaskPhase};
use crate::parser::position::PositionRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Success,
    Failure,
    Unknown,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
        }
    }
}

impl From<Option<TaskOutcome>> for TaskStatus {
    fn from(outcome: Option<TaskOutcome>) -> Self {
        match outcome {
            Some(TaskOutcome::Success) => Self::Success,
            Some(TaskOutcome::Failure) => Self::Failure,
            None => Self::Unknown,
        }
    }
}

/// Annotation of one timestamped line seen while a task was open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: NaiveDateTime,
    pub line: String,
    pub line_number: usize,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub position: Option<PositionRecord>,
    #[serde(default)]
    pub anomalies: Vec<AnomalyEvent>,
}

impl Event {
    #[must_use]
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSegment {
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Seconds between start and end; `None` while the task is open
    pub duration_secs: Option<f64>,
    pub file: String,
    pub events: Vec<Event>,
    pub status: TaskStatus,
}

impl TaskSegment {
    fn open(start_time: NaiveDateTime, file: &str) -> Self {
        Self {
            start_time,
            end_time: None,
            duration_secs: None,
            file: file.to_string(),
            events: Vec::new(),
            status: TaskStatus::Running,
        }
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration_secs.unwrap_or(0.0)
    }

    /// End used for time-range joins: the real end, or one hour after start
    /// for an unbounded task.
    #[must_use]
    pub fn window_end(&self) -> NaiveDateTime {
        self.end_time
            .unwrap_or_else(|| self.start_time + chrono::Duration::hours(1))
    }

    #[must_use]
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start_time <= t && t <= self.window_end()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.events.iter().filter(|e| e.kind == EventKind::Error).count()
    }

    /// Events that carry at least one anomaly.
    #[must_use]
    pub fn anomaly_event_count(&self) -> usize {
        self.events.iter().filter(|e| e.has_anomalies()).count()
    }
}

#[derive(Debug, Default)]
pub struct TaskSegmenter {
    current: Option<TaskSegment>,
}

impl TaskSegmenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Feed a phase tag. Returns the segment closed by a `task_end`.
    pub fn observe(
        &mut self,
        phase: TaskPhase,
        raw: &str,
        timestamp: NaiveDateTime,
        file: &str,
    ) -> Option<TaskSegment> {
        match phase {
            TaskPhase::TaskStart => {
                if self.current.is_none() {
                    self.current = Some(TaskSegment::open(timestamp, file));
                }
                None
            }
            TaskPhase::TaskEnd => {
                let mut task = self.current.take()?;
                task.end_time = Some(timestamp);
                task.duration_secs =
                    Some((timestamp - task.start_time).num_milliseconds() as f64 / 1000.0);
                task.status = detect_task_outcome(raw).into();
                Some(task)
            }
            TaskPhase::Charging
            | TaskPhase::Debugging
            | TaskPhase::MapMaintenance
            | TaskPhase::Idle => None,
        }
    }

    /// Attach an event to the open task. Dropped when idle.
    pub fn record(&mut self, event: Event) {
        if let Some(task) = self.current.as_mut() {
            task.events.push(event);
        }
    }

    /// End of input. Returns the discarded open task, if any, so the caller
    /// can report it.
    #[must_use]
    pub fn finish(self) -> Option<TaskSegment> {
        self.current
    }
}
