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

//! Report assembly and JSON persistence.

use crate::analysis::{ComplaintAnalysis, StopPoint, TraceOutcome};
use crate::anomaly::{AnomalyKind, AnomalySummary, SystemHealth};
use crate::core::context::AnalysisContext;
use crate::core::segmenter::{TaskSegment, TaskStatus};
use crate::error::{AnalyzerError, Result};
use crate::parser::position::{PositionKind, PositionRecord};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const ON_CHARGER_METERS: f64 = 1.0;
const NEAR_CHARGER_METERS: f64 = 3.0;
const LONG_TASK_SECS: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_log_files: usize,
    pub total_task_segments: usize,
    pub total_position_records: usize,
    pub total_anomalies: usize,
    pub total_status_samples: usize,
    pub failed_files: Vec<String>,
    pub analysis_timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTask {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub duration_minutes: f64,
    pub status: TaskStatus,
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOverview {
    pub total_tasks: usize,
    pub total_duration_hours: f64,
    pub avg_task_duration_minutes: f64,
    pub status_counts: IndexMap<String, usize>,
    pub task_timeline: Vec<TimelineTask>,
}

impl TaskOverview {
    #[must_use]
    pub fn from_tasks(tasks: &[TaskSegment]) -> Self {
        let total_secs: f64 = tasks.iter().map(TaskSegment::duration).sum();
        let mut status_counts: IndexMap<String, usize> = IndexMap::new();
        for task in tasks {
            *status_counts.entry(task.status.as_str().to_string()).or_default() += 1;
        }

        Self {
            total_tasks: tasks.len(),
            total_duration_hours: total_secs / 3600.0,
            avg_task_duration_minutes: if tasks.is_empty() {
                0.0
            } else {
                total_secs / tasks.len() as f64 / 60.0
            },
            status_counts,
            task_timeline: tasks
                .iter()
                .map(|t| TimelineTask {
                    start: t.start_time,
                    end: t.end_time,
                    duration_minutes: t.duration() / 60.0,
                    status: t.status,
                    file: t.file.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargerProximity {
    OnCharger,
    NearCharger,
    Away,
    #[default]
    Unknown,
}

impl ChargerProximity {
    #[must_use]
    pub fn from_distance(meters: f64) -> Self {
        if meters < ON_CHARGER_METERS {
            Self::OnCharger
        } else if meters < NEAR_CHARGER_METERS {
            Self::NearCharger
        } else {
            Self::Away
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizationAnalysis {
    pub slam_records: usize,
    pub odometry_records: usize,
    pub reference_records: usize,
    pub latest_pose: Option<PositionRecord>,
    /// First reference point seen, used as the charger location
    pub charger_reference: Option<PositionRecord>,
    pub charger_distance_m: Option<f64>,
    pub charger_proximity: ChargerProximity,
}

impl LocalizationAnalysis {
    #[must_use]
    pub fn from_positions(positions: &[PositionRecord]) -> Self {
        let count = |kind: PositionKind| positions.iter().filter(|p| p.kind == kind).count();
        let latest_pose = positions
            .iter()
            .filter(|p| p.kind != PositionKind::Reference)
            .max_by_key(|p| p.timestamp)
            .cloned();
        let charger_reference = positions
            .iter()
            .find(|p| p.kind == PositionKind::Reference)
            .cloned();
        let charger_distance_m = latest_pose
            .as_ref()
            .zip(charger_reference.as_ref())
            .map(|(pose, charger)| pose.distance_to(charger));

        Self {
            slam_records: count(PositionKind::Slam),
            odometry_records: count(PositionKind::Odometry),
            reference_records: count(PositionKind::Reference),
            latest_pose,
            charger_reference,
            charger_distance_m,
            charger_proximity: charger_distance_m
                .map_or(ChargerProximity::Unknown, ChargerProximity::from_distance),
        }
    }
}

/// Fleet level advice from anomaly counts and task durations.
#[must_use]
pub fn fleet_recommendations(anomalies: &AnomalySummary, tasks: &[TaskSegment]) -> Vec<String> {
    let count = |kind: AnomalyKind| anomalies.by_type.get(kind.as_str()).copied().unwrap_or(0);
    let mut out = Vec::new();

    if count(AnomalyKind::SensorOffline) > 5 {
        out.push("Repeated sensor dropouts: check sensor connections and stability".to_string());
    }
    if count(AnomalyKind::CpuHigh) > 3 {
        out.push("High CPU load detected: optimize system resource usage".to_string());
    }
    if count(AnomalyKind::LocalizationDrop) > 2 {
        out.push("Localization quality drops: review SLAM configuration and environment features".to_string());
    }
    if count(AnomalyKind::BatteryLow) > 0 {
        out.push("Low battery detected: review the charging strategy".to_string());
    }
    if !tasks.is_empty() {
        let avg = tasks.iter().map(TaskSegment::duration).sum::<f64>() / tasks.len() as f64;
        if avg > LONG_TASK_SECS {
            out.push("Tasks run long on average: optimize task planning and routes".to_string());
        }
    }

    if out.is_empty() {
        out.push("System healthy, no obvious issues found".to_string());
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub analysis_summary: AnalysisSummary,
    pub task_overview: TaskOverview,
    pub localization_analysis: LocalizationAnalysis,
    pub anomaly_summary: AnomalySummary,
    pub stop_point_analysis: Vec<StopPoint>,
    pub historical_trace_analysis: TraceOutcome,
    #[serde(default)]
    pub complaint_analysis: Option<ComplaintAnalysis>,
    pub system_health: SystemHealth,
    pub recommendations: Vec<String>,
}

impl Report {
    #[must_use]
    pub fn assemble(
        ctx: &AnalysisContext,
        stop_points: Vec<StopPoint>,
        trace: TraceOutcome,
        complaint: Option<ComplaintAnalysis>,
    ) -> Self {
        profiling::scope!("Report::assemble");

        let anomaly_summary = AnomalySummary::from_events(&ctx.anomalies);
        let recommendations = fleet_recommendations(&anomaly_summary, &ctx.task_segments);

        Self {
            analysis_summary: AnalysisSummary {
                total_log_files: ctx.log_files.len(),
                total_task_segments: ctx.task_segments.len(),
                total_position_records: ctx.positions.len(),
                total_anomalies: ctx.anomalies.len(),
                total_status_samples: ctx.status_samples.len(),
                failed_files: ctx.failed_files.clone(),
                analysis_timestamp: chrono::Local::now().naive_local(),
            },
            task_overview: TaskOverview::from_tasks(&ctx.task_segments),
            localization_analysis: LocalizationAnalysis::from_positions(&ctx.positions),
            anomaly_summary,
            stop_point_analysis: stop_points,
            historical_trace_analysis: trace,
            complaint_analysis: complaint,
            system_health: SystemHealth::assess(&ctx.anomalies),
            recommendations,
        }
    }

    /// Pretty-printed UTF-8 JSON; non-ASCII text is written as is.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AnalyzerError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| AnalyzerError::io(path, e))?;
        info!("Report saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }
}
