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

//! Cross-task history: success rate, OLS slopes and qualitative indicators
//! over a short run of consecutive tasks.

use super::Confidence;
use crate::core::segmenter::{TaskSegment, TaskStatus};
use crate::parser::status::StatusSample;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const SLOPE_THRESHOLD: f64 = 0.1;
const DEGRADATION_FACTOR: f64 = 1.2;
const RESOURCE_RISE_FACTOR: f64 = 1.1;
const RESOURCE_FALL_FACTOR: f64 = 0.9;
const CPU_SLOPE_THRESHOLD: f64 = 5.0;
/// Tasks (or resource means) needed before a pattern counts as a trend
const MIN_TREND_TASKS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

/// Ordinary least squares slope of `values` against `0..n`. Zero for fewer
/// than two values.
#[must_use]
pub fn linear_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_x2) = values.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sx2), (i, &y)| {
            let x = i as f64;
            (sx + x, sy + y, sxy + x * y, sx2 + x * x)
        },
    );
    (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x)
}

#[must_use]
pub fn classify_slope(slope: f64) -> Trend {
    if slope > SLOPE_THRESHOLD {
        Trend::Increasing
    } else if slope < -SLOPE_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn each_pair(values: &[f64], pred: impl Fn(f64, f64) -> bool) -> bool {
    values.windows(2).all(|w| pred(w[0], w[1]))
}

/// Which task anchors the lookback window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceTarget {
    #[default]
    Latest,
    Index(usize),
    /// Task whose start is closest to this time; the earliest wins ties
    NearestTo(NaiveDateTime),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub task_index: usize,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: f64,
    pub status: TaskStatus,
    pub event_count: usize,
    pub anomaly_count: usize,
    pub error_count: usize,
    pub event_types: IndexMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub sequence_id: String,
    pub tasks: Vec<TaskRow>,
    pub total_duration_hours: f64,
    pub avg_task_duration_minutes: f64,
    /// Fraction of tasks with status success, 0.0 to 1.0
    pub success_rate: f64,
    pub anomaly_count: usize,
    pub event_statistics: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTaskAnalysis {
    pub performance_degradation: bool,
    pub error_escalation: bool,
    pub resource_trend: Trend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub duration_slope: f64,
    pub duration_trend: Trend,
    pub error_slope: f64,
    pub error_trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    ErrorEscalation,
    PerformanceDegradation,
    CpuIncrease,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceIndicator {
    #[serde(rename = "type")]
    pub kind: IndicatorKind,
    pub description: String,
    pub confidence: Confidence,
    pub suggested_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTrace {
    pub target_task_index: usize,
    pub lookback_tasks: usize,
    pub target_task_time: Option<NaiveDateTime>,
    pub task_sequence: SequenceSummary,
    pub cross_task_analysis: CrossTaskAnalysis,
    pub trend_analysis: TrendAnalysis,
    pub root_cause_indicators: Vec<TraceIndicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceOutcome {
    Trace(Box<HistoricalTrace>),
    NoData { message: String },
}

impl TraceOutcome {
    fn no_data(message: &str) -> Self {
        Self::NoData {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn trace(&self) -> Option<&HistoricalTrace> {
        match self {
            Self::Trace(trace) => Some(trace.as_ref()),
            Self::NoData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalTraceAnalyzer {
    pub lookback_tasks: usize,
}

impl Default for HistoricalTraceAnalyzer {
    fn default() -> Self {
        Self { lookback_tasks: 2 }
    }
}

impl HistoricalTraceAnalyzer {
    #[must_use]
    pub const fn new(lookback_tasks: usize) -> Self {
        Self { lookback_tasks }
    }

    /// Analyze the window `[target - lookback, target]` of the tasks sorted
    /// by start time.
    #[must_use]
    pub fn trace(
        &self,
        tasks: &[TaskSegment],
        status_samples: &[StatusSample],
        target: TraceTarget,
    ) -> TraceOutcome {
        profiling::scope!("HistoricalTraceAnalyzer::trace");

        if tasks.is_empty() {
            return TraceOutcome::no_data("No task data found");
        }

        let mut sorted: Vec<&TaskSegment> = tasks.iter().collect();
        sorted.sort_by_key(|t| t.start_time);

        let target_index = match target {
            TraceTarget::Latest => sorted.len() - 1,
            TraceTarget::Index(i) => i,
            TraceTarget::NearestTo(when) => nearest_task(&sorted, when),
        };
        if target_index >= sorted.len() {
            return TraceOutcome::no_data("No task sequence matches the requested target");
        }
        let start = target_index.saturating_sub(self.lookback_tasks);
        let end = target_index + 1;
        let sequence = &sorted[start..end];

        let durations: Vec<f64> = sequence.iter().map(|t| t.duration()).collect();
        let error_counts: Vec<f64> = sequence.iter().map(|t| t.error_count() as f64).collect();
        let cpu_means = resource_means(sequence, status_samples, |s| s.cpu_usage);
        let memory_means = resource_means(sequence, status_samples, |s| s.memory_usage);

        let duration_slope = linear_slope(&durations);
        let error_slope = linear_slope(&error_counts);

        let cross = CrossTaskAnalysis {
            performance_degradation: is_degrading(&durations),
            error_escalation: error_counts.len() >= 2 && each_pair(&error_counts, |a, b| b > a),
            resource_trend: combined_resource_trend(&cpu_means, &memory_means),
        };

        TraceOutcome::Trace(Box::new(HistoricalTrace {
            target_task_index: target_index,
            lookback_tasks: self.lookback_tasks,
            target_task_time: match target {
                TraceTarget::NearestTo(when) => Some(when),
                TraceTarget::Latest | TraceTarget::Index(_) => None,
            },
            task_sequence: summarize_sequence(sequence, start, end),
            cross_task_analysis: cross,
            trend_analysis: TrendAnalysis {
                duration_slope,
                duration_trend: classify_slope(duration_slope),
                error_slope,
                error_trend: classify_slope(error_slope),
            },
            root_cause_indicators: indicators(&durations, &error_counts, &cpu_means),
        }))
    }
}

fn nearest_task(sorted: &[&TaskSegment], when: NaiveDateTime) -> usize {
    sorted
        .iter()
        .enumerate()
        .min_by_key(|(_, t)| (t.start_time - when).num_milliseconds().abs())
        .map_or(0, |(i, _)| i)
}

fn summarize_sequence(sequence: &[&TaskSegment], start: usize, end: usize) -> SequenceSummary {
    let mut event_statistics: IndexMap<String, usize> = IndexMap::new();
    let mut rows = Vec::with_capacity(sequence.len());

    for (task_index, task) in sequence.iter().enumerate() {
        let mut event_types: IndexMap<String, usize> = IndexMap::new();
        for event in &task.events {
            *event_types.entry(event.kind.as_str().to_string()).or_default() += 1;
            *event_statistics.entry(event.kind.as_str().to_string()).or_default() += 1;
        }
        rows.push(TaskRow {
            task_index,
            start_time: task.start_time,
            end_time: task.end_time,
            duration_minutes: task.duration() / 60.0,
            status: task.status,
            event_count: task.events.len(),
            anomaly_count: task.anomaly_event_count(),
            error_count: task.error_count(),
            event_types,
        });
    }

    let total_secs: f64 = sequence.iter().map(|t| t.duration()).sum();
    let count = sequence.len() as f64;
    let successes = sequence
        .iter()
        .filter(|t| t.status == TaskStatus::Success)
        .count();

    SequenceSummary {
        sequence_id: format!("tasks_{}_to_{end}", start + 1),
        anomaly_count: rows.iter().map(|r| r.anomaly_count).sum(),
        tasks: rows,
        total_duration_hours: total_secs / 3600.0,
        avg_task_duration_minutes: total_secs / count / 60.0,
        success_rate: successes as f64 / count,
        event_statistics,
    }
}

fn is_degrading(durations: &[f64]) -> bool {
    durations.len() >= MIN_TREND_TASKS && each_pair(durations, |a, b| b > a * DEGRADATION_FACTOR)
}

/// Mean of one resource field over the samples inside each task window.
/// Tasks with no samples contribute nothing; samples missing the field
/// count as zero.
fn resource_means(
    sequence: &[&TaskSegment],
    samples: &[StatusSample],
    field: impl Fn(&StatusSample) -> Option<u32>,
) -> Vec<f64> {
    sequence
        .iter()
        .filter_map(|task| {
            let values: Vec<f64> = samples
                .iter()
                .filter(|s| task.contains(s.timestamp))
                .map(|s| field(s).map_or(0.0, f64::from))
                .collect();
            (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
        })
        .collect()
}

fn resource_trend(means: &[f64]) -> Trend {
    if means.len() < MIN_TREND_TASKS {
        Trend::Stable
    } else if each_pair(means, |a, b| b > a * RESOURCE_RISE_FACTOR) {
        Trend::Increasing
    } else if each_pair(means, |a, b| b < a * RESOURCE_FALL_FACTOR) {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn combined_resource_trend(cpu: &[f64], memory: &[f64]) -> Trend {
    let (cpu, memory) = (resource_trend(cpu), resource_trend(memory));
    if cpu == Trend::Increasing || memory == Trend::Increasing {
        Trend::Increasing
    } else if cpu == Trend::Decreasing || memory == Trend::Decreasing {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn indicators(durations: &[f64], error_counts: &[f64], cpu_means: &[f64]) -> Vec<TraceIndicator> {
    let mut out = Vec::new();

    if error_counts.len() >= MIN_TREND_TASKS && each_pair(error_counts, |a, b| b > a) {
        out.push(TraceIndicator {
            kind: IndicatorKind::ErrorEscalation,
            description: "Error count grows from task to task".to_string(),
            confidence: Confidence::Medium,
            suggested_action: "Check system stability and error handling".to_string(),
        });
    }
    if is_degrading(durations) {
        out.push(TraceIndicator {
            kind: IndicatorKind::PerformanceDegradation,
            description: "Task duration keeps growing".to_string(),
            confidence: Confidence::Medium,
            suggested_action: "Check system performance and resource usage".to_string(),
        });
    }
    if cpu_means.len() >= MIN_TREND_TASKS && linear_slope(cpu_means) > CPU_SLOPE_THRESHOLD {
        out.push(TraceIndicator {
            kind: IndicatorKind::CpuIncrease,
            description: "CPU usage keeps rising across tasks".to_string(),
            confidence: Confidence::Low,
            suggested_action: "Optimize resource usage and process management".to_string(),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segmenter::Event;
    use crate::parser::event_kind::classify_event;
    use chrono::{Duration, NaiveDate};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid test date")
    }

    fn task(start_hour: i64, duration_secs: i64, errors: usize, status: TaskStatus) -> TaskSegment {
        let start = base() + Duration::hours(start_hour);
        let events = (0..errors)
            .map(|i| Event {
                timestamp: start + Duration::seconds(i as i64 + 1),
                line: "planner error".to_string(),
                line_number: i + 1,
                kind: classify_event("planner error"),
                position: None,
                anomalies: Vec::new(),
            })
            .collect();
        TaskSegment {
            start_time: start,
            end_time: Some(start + Duration::seconds(duration_secs)),
            duration_secs: Some(duration_secs as f64),
            file: "robot.log".to_string(),
            events,
            status,
        }
    }

    fn cpu(at: NaiveDateTime, value: u32) -> StatusSample {
        StatusSample {
            timestamp: at,
            file: "robot.log".to_string(),
            cpu_usage: Some(value),
            memory_usage: None,
            battery_level: None,
            temperature: None,
            sensor_status: None,
            network_status: None,
        }
    }

    #[test]
    fn test_linear_slope() {
        assert!((linear_slope(&[1.0, 2.0, 3.0]) - 1.0).abs() < 1e-12);
        assert!((linear_slope(&[5.0, 5.0, 5.0])).abs() < 1e-12);
        assert!(linear_slope(&[4.0]).abs() < f64::EPSILON);
        assert!(linear_slope(&[3.0, 1.0]) < 0.0);
    }

    #[test]
    fn test_classify_slope_thresholds() {
        assert_eq!(classify_slope(0.11), Trend::Increasing);
        assert_eq!(classify_slope(0.1), Trend::Stable);
        assert_eq!(classify_slope(-0.1), Trend::Stable);
        assert_eq!(classify_slope(-0.5), Trend::Decreasing);
    }

    #[test]
    fn test_degrading_durations() {
        let tasks: Vec<_> = [60, 80, 110, 150]
            .iter()
            .enumerate()
            .map(|(i, &d)| task(i as i64, d, 0, TaskStatus::Success))
            .collect();
        let outcome = HistoricalTraceAnalyzer::new(3).trace(&tasks, &[], TraceTarget::Latest);
        let trace = outcome.trace().expect("trace");
        assert!(trace.cross_task_analysis.performance_degradation);
        assert_eq!(trace.trend_analysis.duration_trend, Trend::Increasing);
        assert!(trace.trend_analysis.duration_slope > 0.0);
        assert_eq!(trace.task_sequence.sequence_id, "tasks_1_to_4");
        assert!((trace.task_sequence.success_rate - 1.0).abs() < f64::EPSILON);
        assert!(trace
            .root_cause_indicators
            .iter()
            .any(|i| i.kind == IndicatorKind::PerformanceDegradation));
    }

    #[test]
    fn test_default_lookback_window() {
        let tasks: Vec<_> = (0..5)
            .map(|i| task(i, 600, 0, TaskStatus::Unknown))
            .collect();
        let outcome = HistoricalTraceAnalyzer::default().trace(&tasks, &[], TraceTarget::Latest);
        let trace = outcome.trace().expect("trace");
        assert_eq!(trace.target_task_index, 4);
        assert_eq!(trace.task_sequence.tasks.len(), 3);
        assert_eq!(trace.task_sequence.sequence_id, "tasks_3_to_5");
        assert_eq!(trace.trend_analysis.duration_trend, Trend::Stable);
        assert!(trace.task_sequence.success_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_error_escalation() {
        let tasks = vec![
            task(0, 600, 0, TaskStatus::Success),
            task(1, 600, 1, TaskStatus::Failure),
            task(2, 600, 3, TaskStatus::Failure),
        ];
        let outcome = HistoricalTraceAnalyzer::default().trace(&tasks, &[], TraceTarget::Latest);
        let trace = outcome.trace().expect("trace");
        assert!(trace.cross_task_analysis.error_escalation);
        assert_eq!(trace.trend_analysis.error_trend, Trend::Increasing);
        assert_eq!(trace.task_sequence.tasks[2].error_count, 3);
        assert_eq!(trace.task_sequence.event_statistics["error"], 4);
        assert!(trace
            .root_cause_indicators
            .iter()
            .any(|i| i.kind == IndicatorKind::ErrorEscalation));
    }

    #[test]
    fn test_two_tasks_escalate_without_indicator() {
        let tasks = vec![
            task(0, 600, 0, TaskStatus::Success),
            task(1, 600, 2, TaskStatus::Success),
        ];
        let outcome = HistoricalTraceAnalyzer::default().trace(&tasks, &[], TraceTarget::Latest);
        let trace = outcome.trace().expect("trace");
        assert!(trace.cross_task_analysis.error_escalation);
        assert!(trace.root_cause_indicators.is_empty());
    }

    #[test]
    fn test_nearest_target_and_index() {
        let tasks: Vec<_> = (0..4)
            .map(|i| task(i * 2, 600, 0, TaskStatus::Success))
            .collect();
        let analyzer = HistoricalTraceAnalyzer::new(1);

        let near = analyzer.trace(&tasks, &[], TraceTarget::NearestTo(base() + Duration::hours(3)));
        // hours 2 and 4 are equally close; the earlier task wins
        let trace = near.trace().expect("trace");
        assert_eq!(trace.target_task_index, 1);
        assert!(trace.target_task_time.is_some());

        let indexed = analyzer.trace(&tasks, &[], TraceTarget::Index(0));
        assert_eq!(indexed.trace().expect("trace").task_sequence.tasks.len(), 1);

        assert!(matches!(
            analyzer.trace(&tasks, &[], TraceTarget::Index(10)),
            TraceOutcome::NoData { .. }
        ));
        // one past the end, even though the lookback reaches valid tasks
        assert!(analyzer.trace(&tasks, &[], TraceTarget::Index(4)).trace().is_none());
    }

    #[test]
    fn test_no_tasks() {
        let outcome = HistoricalTraceAnalyzer::default().trace(&[], &[], TraceTarget::Latest);
        assert!(matches!(outcome, TraceOutcome::NoData { .. }));
        let json = serde_json::to_value(&outcome).expect("serialize");
        assert!(json.get("message").is_some());
    }

    #[test]
    fn test_cpu_rise_across_tasks() {
        let tasks: Vec<_> = (0..3)
            .map(|i| task(i, 600, 0, TaskStatus::Success))
            .collect();
        let samples: Vec<_> = tasks
            .iter()
            .zip([20, 40, 70])
            .map(|(t, v)| cpu(t.start_time + Duration::seconds(30), v))
            .collect();
        let outcome = HistoricalTraceAnalyzer::default().trace(&tasks, &samples, TraceTarget::Latest);
        let trace = outcome.trace().expect("trace");
        assert_eq!(trace.cross_task_analysis.resource_trend, Trend::Increasing);
        assert!(trace
            .root_cause_indicators
            .iter()
            .any(|i| i.kind == IndicatorKind::CpuIncrease && i.confidence == Confidence::Low));
    }
}
