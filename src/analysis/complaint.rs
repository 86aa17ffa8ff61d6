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

//! Joins the evidence around a user complaint: stops, stop reasons,
//! anomalies, poses and the task that was running.

use super::stop_points::{dedup_stop_points, StopPoint};
use super::Confidence;
use crate::anomaly::{AnomalyEvent, AnomalyKind, Severity};
use crate::core::context::AnalysisContext;
use crate::core::segmenter::TaskSegment;
use crate::parser::position::PositionRecord;
use crate::parser::stop_reason::{StopReason, StopReasonEvent};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementState {
    Moving,
    Stopped,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementTrend {
    StoppedAfterComplaint,
    ResumedAfterComplaint,
    ContinuousStop,
    #[default]
    Unknown,
}

impl MovementTrend {
    #[must_use]
    pub const fn from_states(pre: MovementState, post: MovementState) -> Self {
        match (pre, post) {
            (MovementState::Moving, MovementState::Stopped) => Self::StoppedAfterComplaint,
            (MovementState::Stopped, MovementState::Moving) => Self::ResumedAfterComplaint,
            (MovementState::Stopped, MovementState::Stopped) => Self::ContinuousStop,
            (MovementState::Moving, MovementState::Moving | MovementState::Unknown)
            | (MovementState::Stopped, MovementState::Unknown)
            | (MovementState::Unknown, _) => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementAnalysis {
    pub pre_complaint_movement: MovementState,
    pub post_complaint_movement: MovementState,
    pub movement_trend: MovementTrend,
    pub stop_duration_minutes: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskContext {
    pub in_task: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_into_task: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCauseKind {
    StopPoint,
    StopReason,
    SystemAnomaly,
    ContinuousStop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    #[serde(rename = "type")]
    pub kind: RootCauseKind,
    pub timestamp: NaiveDateTime,
    pub confidence: Confidence,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintAnalysis {
    pub complaint_time: NaiveDateTime,
    pub time_window_minutes: f64,
    /// Every detected stop point inside the window
    pub stop_events_nearby: Vec<StopPoint>,
    /// `stop_events_nearby` with near-duplicates of one physical stop removed
    pub distinct_stops: Vec<StopPoint>,
    pub stop_reasons_nearby: Vec<StopReasonEvent>,
    pub anomalies_nearby: Vec<AnomalyEvent>,
    pub position_data_nearby: Vec<PositionRecord>,
    pub movement_analysis: MovementAnalysis,
    pub task_context: TaskContext,
    pub root_cause_analysis: Vec<RootCause>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplaintCorrelator {
    pub window_minutes: f64,
    /// Meters per fix; the same threshold the stop detector uses
    pub movement_threshold: f64,
    pub dedup_minutes: f64,
}

impl Default for ComplaintCorrelator {
    fn default() -> Self {
        Self {
            window_minutes: 30.0,
            movement_threshold: 0.01,
            dedup_minutes: 5.0,
        }
    }
}

/// Saturates at `Duration::MAX`; negative and NaN inputs become zero.
fn minutes(m: f64) -> Duration {
    let millis = (m.max(0.0) * 60_000.0) as i64;
    Duration::try_milliseconds(millis).unwrap_or(Duration::MAX)
}

impl ComplaintCorrelator {
    #[must_use]
    pub const fn new(window_minutes: f64, movement_threshold: f64, dedup_minutes: f64) -> Self {
        Self {
            window_minutes,
            movement_threshold,
            dedup_minutes,
        }
    }

    #[must_use]
    pub fn correlate(
        &self,
        complaint_time: NaiveDateTime,
        ctx: &AnalysisContext,
        stop_points: &[StopPoint],
    ) -> ComplaintAnalysis {
        profiling::scope!("ComplaintCorrelator::correlate");

        let window = minutes(self.window_minutes);
        let near = |t: NaiveDateTime| (t - complaint_time).abs() <= window;

        let stop_events_nearby: Vec<StopPoint> = stop_points
            .iter()
            .filter(|s| near(s.timestamp))
            .cloned()
            .collect();
        let distinct_stops = dedup_stop_points(&stop_events_nearby, minutes(self.dedup_minutes));
        let stop_reasons_nearby: Vec<StopReasonEvent> = ctx
            .stop_reasons
            .iter()
            .filter(|e| near(e.timestamp))
            .cloned()
            .collect();
        let anomalies_nearby: Vec<AnomalyEvent> = ctx
            .anomalies
            .iter()
            .filter(|a| near(a.timestamp))
            .cloned()
            .collect();
        let position_data_nearby: Vec<PositionRecord> = ctx
            .positions
            .iter()
            .filter(|p| near(p.timestamp))
            .cloned()
            .collect();

        let movement_analysis = self.movement_around(complaint_time, &ctx.positions, &distinct_stops);
        let task_context = task_context(complaint_time, &ctx.task_segments);

        let mut analysis = ComplaintAnalysis {
            complaint_time,
            time_window_minutes: self.window_minutes,
            stop_events_nearby,
            distinct_stops,
            stop_reasons_nearby,
            anomalies_nearby,
            position_data_nearby,
            movement_analysis,
            task_context,
            root_cause_analysis: Vec::new(),
            recommendations: Vec::new(),
        };
        analysis.root_cause_analysis = root_causes(&analysis);
        analysis.recommendations = recommendations(&analysis);

        tracing::debug!(
            "Complaint at {complaint_time}: {} stops, {} anomalies, trend {:?}",
            analysis.distinct_stops.len(),
            analysis.anomalies_nearby.len(),
            analysis.movement_analysis.movement_trend
        );
        analysis
    }

    fn movement_around(
        &self,
        complaint_time: NaiveDateTime,
        positions: &[PositionRecord],
        distinct_stops: &[StopPoint],
    ) -> MovementAnalysis {
        let window = minutes(self.window_minutes);
        let from = complaint_time
            .checked_sub_signed(window)
            .unwrap_or(NaiveDateTime::MIN);
        let to = complaint_time
            .checked_add_signed(window)
            .unwrap_or(NaiveDateTime::MAX);

        let mut sorted: Vec<&PositionRecord> = positions.iter().collect();
        sorted.sort_by_key(|p| p.timestamp);

        let pre: Vec<&PositionRecord> = sorted
            .iter()
            .copied()
            .filter(|p| from <= p.timestamp && p.timestamp <= complaint_time)
            .collect();
        let post: Vec<&PositionRecord> = sorted
            .iter()
            .copied()
            .filter(|p| complaint_time <= p.timestamp && p.timestamp <= to)
            .collect();

        let pre_state = self.assess_movement(&pre);
        let post_state = self.assess_movement(&post);

        MovementAnalysis {
            pre_complaint_movement: pre_state,
            post_complaint_movement: post_state,
            movement_trend: MovementTrend::from_states(pre_state, post_state),
            stop_duration_minutes: distinct_stops
                .iter()
                .filter(|s| from <= s.timestamp && s.timestamp <= to)
                .map(|s| s.duration_minutes)
                .sum(),
        }
    }

    /// Total path length against `threshold * n`.
    #[must_use]
    pub fn assess_movement(&self, positions: &[&PositionRecord]) -> MovementState {
        if positions.len() < 2 {
            return MovementState::Unknown;
        }
        let travelled: f64 = positions.windows(2).map(|w| w[0].distance_to(w[1])).sum();
        if travelled < self.movement_threshold * positions.len() as f64 {
            MovementState::Stopped
        } else {
            MovementState::Moving
        }
    }
}

fn task_context(t: NaiveDateTime, tasks: &[TaskSegment]) -> TaskContext {
    tasks.iter().find(|task| task.contains(t)).map_or_else(
        TaskContext::default,
        |task| TaskContext {
            in_task: true,
            task_start: Some(task.start_time),
            minutes_into_task: Some((t - task.start_time).num_milliseconds() as f64 / 60_000.0),
            file: Some(task.file.clone()),
        },
    )
}

/// Distinct reasons in first-seen order.
fn distinct_reasons(events: &[StopReasonEvent]) -> Vec<&StopReasonEvent> {
    let mut seen: Vec<StopReason> = Vec::new();
    events
        .iter()
        .filter(|e| {
            if seen.contains(&e.reason) {
                false
            } else {
                seen.push(e.reason);
                true
            }
        })
        .collect()
}

fn root_causes(analysis: &ComplaintAnalysis) -> Vec<RootCause> {
    let mut causes = Vec::new();

    for stop in &analysis.distinct_stops {
        causes.push(RootCause {
            kind: RootCauseKind::StopPoint,
            timestamp: stop.timestamp,
            confidence: Confidence::High,
            description: format!(
                "Robot stationary at ({:.2}, {:.2}), average movement {:.4} m",
                stop.position.x, stop.position.y, stop.avg_movement
            ),
        });
    }

    for event in distinct_reasons(&analysis.stop_reasons_nearby) {
        causes.push(RootCause {
            kind: RootCauseKind::StopReason,
            timestamp: event.timestamp,
            confidence: Confidence::High,
            description: format!("Stop reason logged: {}", event.reason.as_str()),
        });
    }

    if let Some(anomaly) = analysis
        .anomalies_nearby
        .iter()
        .find(|a| a.severity == Severity::High)
    {
        causes.push(RootCause {
            kind: RootCauseKind::SystemAnomaly,
            timestamp: anomaly.timestamp,
            confidence: Confidence::Medium,
            description: format!("High severity anomaly: {}", anomaly.kind.as_str()),
        });
    }

    if analysis.movement_analysis.movement_trend == MovementTrend::ContinuousStop {
        causes.push(RootCause {
            kind: RootCauseKind::ContinuousStop,
            timestamp: analysis.complaint_time,
            confidence: Confidence::Medium,
            description: "Robot stayed stopped before and after the complaint".to_string(),
        });
    }

    causes
}

fn recommendations(analysis: &ComplaintAnalysis) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    if !analysis.distinct_stops.is_empty() {
        out.push("Stop detected near the complaint: check the motion system and obstacles on site".to_string());
    }
    for event in distinct_reasons(&analysis.stop_reasons_nearby) {
        out.push(event.reason.recommendation().to_string());
    }

    let high = analysis
        .anomalies_nearby
        .iter()
        .filter(|a| a.severity == Severity::High)
        .count();
    if high > 0 {
        out.push(format!("{high} high severity anomalies nearby, likely related to the complaint"));
    }
    let has_kind = |kind: AnomalyKind| analysis.anomalies_nearby.iter().any(|a| a.kind == kind);
    if has_kind(AnomalyKind::SensorOffline) {
        out.push("Sensor dropouts nearby: check sensor stability and connections".to_string());
    }
    if has_kind(AnomalyKind::CpuHigh) {
        out.push("High CPU load nearby: reduce system resource usage".to_string());
    }
    if analysis.movement_analysis.movement_trend == MovementTrend::ContinuousStop {
        out.push("Continuous stop: check the motion control chain".to_string());
    }

    if out.is_empty() {
        out.push("No obvious cause found, run an on-site inspection".to_string());
    }

    out.push(
        if analysis.task_context.in_task {
            "Happened during a task: review task planning and execution"
        } else {
            "Happened outside any task: review standby behaviour and automatic maintenance"
        }
        .to_string(),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stop_points::StopPointDetector;
    use crate::core::segmenter::TaskStatus;
    use crate::parser::position::{PositionKind, PositionSource};
    use chrono::NaiveDate;

    fn at(minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid test date")
            + Duration::minutes(minute)
    }

    fn fix(minute: i64, x: f64) -> PositionRecord {
        PositionRecord {
            timestamp: at(minute),
            x,
            y: 0.0,
            z: None,
            kind: PositionKind::Slam,
            source: PositionSource::SlamPose,
        }
    }

    fn anomaly(minute: i64, kind: AnomalyKind, severity: Severity) -> AnomalyEvent {
        AnomalyEvent {
            timestamp: at(minute),
            kind,
            severity,
            description: "x".to_string(),
            file: "robot.log".to_string(),
            line_number: 1,
        }
    }

    #[test]
    fn test_movement_trend_table() {
        use MovementState::{Moving, Stopped, Unknown};
        assert_eq!(MovementTrend::from_states(Moving, Stopped), MovementTrend::StoppedAfterComplaint);
        assert_eq!(MovementTrend::from_states(Stopped, Moving), MovementTrend::ResumedAfterComplaint);
        assert_eq!(MovementTrend::from_states(Stopped, Stopped), MovementTrend::ContinuousStop);
        assert_eq!(MovementTrend::from_states(Moving, Moving), MovementTrend::Unknown);
        assert_eq!(MovementTrend::from_states(Unknown, Stopped), MovementTrend::Unknown);
    }

    #[test]
    fn test_assess_movement() {
        let correlator = ComplaintCorrelator::default();
        let still = [fix(0, 1.0), fix(1, 1.0), fix(2, 1.0)];
        let still: Vec<_> = still.iter().collect();
        assert_eq!(correlator.assess_movement(&still), MovementState::Stopped);

        let moving = [fix(0, 0.0), fix(1, 1.0)];
        let moving: Vec<_> = moving.iter().collect();
        assert_eq!(correlator.assess_movement(&moving), MovementState::Moving);

        let single = [fix(0, 0.0)];
        let single: Vec<_> = single.iter().collect();
        assert_eq!(correlator.assess_movement(&single), MovementState::Unknown);
    }

    #[test]
    fn test_exact_stop_time_is_included() {
        let mut ctx = AnalysisContext::new();
        ctx.positions = (0..4).map(|m| fix(m, 2.0)).collect();
        let stops = StopPointDetector::default().detect(&ctx.positions);
        let target = stops[0].timestamp;

        let analysis = ComplaintCorrelator::new(0.0, 0.01, 5.0).correlate(target, &ctx, &stops);
        assert_eq!(analysis.stop_events_nearby.len(), 1);
        assert_eq!(analysis.stop_events_nearby[0].timestamp, target);
        assert_eq!(analysis.root_cause_analysis[0].kind, RootCauseKind::StopPoint);
        assert_eq!(analysis.root_cause_analysis[0].confidence, Confidence::High);
    }

    #[test]
    fn test_robot_stopping_after_complaint() {
        let mut ctx = AnalysisContext::new();
        ctx.positions = vec![fix(-10, 0.0), fix(-5, 5.0), fix(0, 10.0), fix(5, 10.0), fix(10, 10.0)];
        ctx.anomalies = vec![
            anomaly(-2, AnomalyKind::SensorOffline, Severity::High),
            anomaly(-90, AnomalyKind::CpuHigh, Severity::High),
        ];

        let analysis = ComplaintCorrelator::default().correlate(at(0), &ctx, &[]);
        let movement = analysis.movement_analysis;
        assert_eq!(movement.pre_complaint_movement, MovementState::Moving);
        assert_eq!(movement.post_complaint_movement, MovementState::Stopped);
        assert_eq!(movement.movement_trend, MovementTrend::StoppedAfterComplaint);
        assert_eq!(analysis.anomalies_nearby.len(), 1);
        assert_eq!(analysis.position_data_nearby.len(), 5);
        assert!(analysis
            .root_cause_analysis
            .iter()
            .any(|c| c.kind == RootCauseKind::SystemAnomaly && c.confidence == Confidence::Medium));
        assert!(!analysis.task_context.in_task);
    }

    #[test]
    fn test_dedup_and_stop_duration() {
        let mut ctx = AnalysisContext::new();
        ctx.positions = (0..12).map(|m| fix(m, 3.0)).collect();
        let stops = StopPointDetector::default().detect(&ctx.positions);

        let analysis = ComplaintCorrelator::default().correlate(at(6), &ctx, &stops);
        assert_eq!(analysis.stop_events_nearby.len(), 10);
        assert_eq!(analysis.distinct_stops.len(), 2);
        assert!((analysis.movement_analysis.stop_duration_minutes - 20.0).abs() < 1e-9);
        assert_eq!(
            analysis.movement_analysis.movement_trend,
            MovementTrend::ContinuousStop
        );
        assert!(analysis
            .root_cause_analysis
            .iter()
            .any(|c| c.kind == RootCauseKind::ContinuousStop));
    }

    #[test]
    fn test_task_context_and_stop_reasons() {
        let mut ctx = AnalysisContext::new();
        ctx.task_segments.push(TaskSegment {
            start_time: at(-20),
            end_time: Some(at(20)),
            duration_secs: Some(2400.0),
            file: "robot.log".to_string(),
            events: Vec::new(),
            status: TaskStatus::Unknown,
        });
        let logged = |minute, reason| StopReasonEvent {
            timestamp: at(minute),
            reason,
            line: "x".to_string(),
            file: "robot.log".to_string(),
        };
        ctx.stop_reasons = vec![
            logged(-1, StopReason::ObstacleBlocked),
            logged(1, StopReason::ObstacleBlocked),
            logged(2, StopReason::BatteryLow),
        ];

        let analysis = ComplaintCorrelator::default().correlate(at(0), &ctx, &[]);
        assert!(analysis.task_context.in_task);
        assert_eq!(analysis.task_context.minutes_into_task, Some(20.0));
        let reason_causes = analysis
            .root_cause_analysis
            .iter()
            .filter(|c| c.kind == RootCauseKind::StopReason)
            .count();
        assert_eq!(reason_causes, 2);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r == StopReason::BatteryLow.recommendation()));
    }

    #[test]
    fn test_unbounded_window_covers_everything() {
        let mut ctx = AnalysisContext::new();
        ctx.positions = (0..4).map(|m| fix(m * 600, 2.0)).collect();
        ctx.anomalies = vec![anomaly(-100_000, AnomalyKind::BatteryLow, Severity::Medium)];

        for window in [f64::INFINITY, 1e12] {
            let analysis = ComplaintCorrelator::new(window, 0.01, 5.0).correlate(at(0), &ctx, &[]);
            assert_eq!(analysis.position_data_nearby.len(), 4);
            assert_eq!(analysis.anomalies_nearby.len(), 1);
            assert_eq!(
                analysis.movement_analysis.post_complaint_movement,
                MovementState::Stopped
            );
        }

        let empty = ComplaintCorrelator::new(f64::INFINITY, 0.01, f64::INFINITY)
            .correlate(at(0), &AnalysisContext::new(), &[]);
        assert!(empty.distinct_stops.is_empty());
    }

    #[test]
    fn test_nan_and_negative_windows_are_empty() {
        let mut ctx = AnalysisContext::new();
        ctx.positions = vec![fix(1, 0.0)];
        for window in [f64::NAN, -30.0] {
            let analysis = ComplaintCorrelator::new(window, 0.01, 5.0).correlate(at(0), &ctx, &[]);
            assert!(analysis.position_data_nearby.is_empty());
            assert!((analysis.movement_analysis.stop_duration_minutes).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_fallback_recommendation() {
        let ctx = AnalysisContext::new();
        let analysis = ComplaintCorrelator::default().correlate(at(0), &ctx, &[]);
        assert_eq!(analysis.recommendations.len(), 2);
        assert!(analysis.recommendations[0].starts_with("No obvious cause"));
        assert!(analysis.root_cause_analysis.is_empty());
    }
}
