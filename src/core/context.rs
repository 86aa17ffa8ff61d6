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

use super::segmenter::TaskSegment;
use crate::anomaly::AnomalyEvent;
use crate::parser::position::PositionRecord;
use crate::parser::status::StatusSample;
use crate::parser::stop_reason::StopReasonEvent;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything one analysis run accumulates. Owned by the run; call
/// [`AnalysisContext::reset`] before reusing it.
#[derive(Debug, Default, Clone)]
pub struct AnalysisContext {
    pub log_files: Vec<PathBuf>,
    pub failed_files: Vec<String>,
    pub task_segments: Vec<TaskSegment>,
    /// Insertion order, not time order
    pub positions: Vec<PositionRecord>,
    pub anomalies: Vec<AnomalyEvent>,
    pub status_samples: Vec<StatusSample>,
    pub stop_reasons: Vec<StopReasonEvent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub file_count: usize,
    pub segment_count: usize,
    pub position_count: usize,
    pub anomaly_count: usize,
    pub status_sample_count: usize,
    pub failed_file_count: usize,
}

impl AnalysisContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.log_files.clear();
        self.failed_files.clear();
        self.task_segments.clear();
        self.positions.clear();
        self.anomalies.clear();
        self.status_samples.clear();
        self.stop_reasons.clear();
    }

    #[must_use]
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            file_count: self.log_files.len(),
            segment_count: self.task_segments.len(),
            position_count: self.positions.len(),
            anomaly_count: self.anomalies.len(),
            status_sample_count: self.status_samples.len(),
            failed_file_count: self.failed_files.len(),
        }
    }

    /// Task segments ordered by start time. Stable, so equal starts keep
    /// file order.
    #[must_use]
    pub fn sorted_tasks(&self) -> Vec<&TaskSegment> {
        let mut tasks: Vec<&TaskSegment> = self.task_segments.iter().collect();
        tasks.sort_by_key(|t| t.start_time);
        tasks
    }
}
