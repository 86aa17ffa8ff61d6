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

//! End-to-end runs over scratch log directories.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use robolog::analysis::{MovementTrend, TraceTarget, Trend};
use robolog::{AnalyzerConfig, AnalyzerError, Report, RobotLogAnalyzer, Severity};
use std::fmt::Write as _;
use std::path::Path;
use tempfile::TempDir;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .expect("valid test date")
}

fn log_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).expect("write log");
    }
    dir
}

fn analyzer_for(dir: &Path) -> RobotLogAnalyzer {
    let mut analyzer = RobotLogAnalyzer::new(AnalyzerConfig {
        log_directory: dir.to_path_buf(),
        ..AnalyzerConfig::default()
    });
    analyzer.analyze().expect("analysis");
    analyzer
}

#[test]
fn three_line_delivery_task() {
    let dir = log_dir(&[(
        "robot.log",
        "2025-01-01 10:00:00 wait_for_delivery_task entry\n\
         2025-01-01 10:05:00 Slam pose: [1.0,2.0,0.0]\n\
         2025-01-01 10:10:00 finish task\n",
    )]);
    let analyzer = analyzer_for(dir.path());
    let ctx = analyzer.context();

    assert_eq!(ctx.task_segments.len(), 1);
    let task = &ctx.task_segments[0];
    assert_eq!(task.duration_secs, Some(600.0));
    assert_eq!(task.events.iter().filter(|e| e.position.is_some()).count(), 1);
    assert!(task.events.iter().all(|e| e.anomalies.is_empty()));
    assert!(ctx.anomalies.is_empty());
}

#[test]
fn error_lines_are_high_severity() {
    let dir = log_dir(&[(
        "robot.log",
        "2025-01-01 10:00:00 [ERROR] lidar sensor offline\n\
         2025-01-01 10:00:01 [ERROR] battery low\n\
         2025-01-01 10:00:02 [WARN] collision detected\n",
    )]);
    let analyzer = analyzer_for(dir.path());
    let anomalies = &analyzer.context().anomalies;

    assert_eq!(anomalies.len(), 3);
    assert_eq!(anomalies[0].severity, Severity::High);
    assert_eq!(anomalies[1].severity, Severity::High);
    // WARN lowers mechanical_issue below its base severity
    assert_eq!(anomalies[2].severity, Severity::Medium);
}

#[test]
fn tasks_do_not_span_files() {
    let dir = log_dir(&[
        (
            "a.log",
            "2025-01-01 10:00:00 mission start\n2025-01-01 10:01:00 goal reached\n",
        ),
        ("b.log", "2025-01-01 10:02:00 finish task\n"),
    ]);
    let analyzer = analyzer_for(dir.path());
    assert!(analyzer.context().task_segments.is_empty());
    assert_eq!(analyzer.context().log_files.len(), 2);
}

#[test]
fn complete_pairs_only() {
    let dir = log_dir(&[(
        "robot.log",
        "2025-01-01 10:00:00 mission start\n\
         2025-01-01 10:01:00 mission start\n\
         2025-01-01 10:02:00 mission complete\n\
         2025-01-01 10:03:00 finish task\n\
         2025-01-01 10:04:00 mission start\n\
         2025-01-01 10:05:00 mission complete, task success\n\
         2025-01-01 10:06:00 mission start\n",
    )]);
    let analyzer = analyzer_for(dir.path());
    let tasks = &analyzer.context().task_segments;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].start_time, at(10, 0, 0));
    assert_eq!(tasks[1].status, robolog::TaskStatus::Success);
}

#[test]
fn report_round_trip_keeps_counts() {
    let dir = log_dir(&[
        (
            "robot.log",
            "2025-01-01 10:00:00 wait_for_delivery_task entry\n\
             2025-01-01 10:05:00 Slam pose: [1.0,2.0,0.0]\n\
             2025-01-01 10:06:00 传感器掉线 sensor offline\n\
             2025-01-01 10:10:00 finish task\n",
        ),
        ("robot.INFO", "1760202061275 odom pose(0.5,0.5,0.0) battery 20%\n"),
    ]);
    let analyzer = analyzer_for(dir.path());
    let report = analyzer.generate_report(Some(at(10, 6, 0)), TraceTarget::Latest);

    let out = tempfile::tempdir().expect("tempdir");
    let path = out.path().join("reports").join("report.json");
    report.save(&path).expect("save");

    let text = std::fs::read_to_string(&path).expect("read");
    assert!(text.contains("传感器掉线"), "non-ASCII text is written verbatim");

    let loaded = Report::load(&path).expect("load");
    assert_eq!(loaded.analysis_summary, report.analysis_summary);
    assert_eq!(loaded.analysis_summary.total_log_files, 2);
    assert_eq!(loaded.analysis_summary.total_task_segments, 1);
    assert_eq!(loaded.analysis_summary.total_position_records, 2);
    assert_eq!(loaded.analysis_summary.total_anomalies, 2);
    assert!(loaded.complaint_analysis.is_some());
    assert!(loaded.historical_trace_analysis.trace().is_some());
}

#[test]
fn degrading_task_history() {
    let mut text = String::new();
    let mut start = at(8, 0, 0);
    for secs in [60, 80, 110, 150] {
        let end = start + Duration::seconds(secs);
        writeln!(text, "{} mission start", start.format("%Y-%m-%d %H:%M:%S")).expect("fmt");
        writeln!(text, "{} finish task", end.format("%Y-%m-%d %H:%M:%S")).expect("fmt");
        start += Duration::hours(1);
    }
    let dir = log_dir(&[("robot.log", text.as_str())]);

    let mut config = AnalyzerConfig {
        log_directory: dir.path().to_path_buf(),
        lookback_tasks: 3,
        ..AnalyzerConfig::default()
    };
    config.file_patterns = vec!["*.log".to_string()];
    let mut analyzer = RobotLogAnalyzer::new(config);
    analyzer.analyze().expect("analysis");

    let outcome = analyzer.historical_trace(TraceTarget::Latest);
    let trace = outcome.trace().expect("trace");
    assert_eq!(trace.task_sequence.tasks.len(), 4);
    assert!(trace.cross_task_analysis.performance_degradation);
    assert_eq!(trace.trend_analysis.duration_trend, Trend::Increasing);
}

#[test]
fn complaint_at_a_parked_robot() {
    let mut text = String::new();
    for minute in 0..15 {
        writeln!(
            text,
            "2025-01-01 11:{minute:02}:00 Slam pose: [4.0,7.5,0.0]"
        )
        .expect("fmt");
    }
    let dir = log_dir(&[("robot.log", text.as_str())]);
    let analyzer = analyzer_for(dir.path());

    let stops = analyzer.detect_stop_points();
    assert_eq!(stops.len(), 13);

    let complaint = analyzer.analyze_complaint(at(11, 7, 0));
    assert_eq!(complaint.stop_events_nearby.len(), 13);
    assert!(complaint.stop_events_nearby.iter().any(|s| s.timestamp == at(11, 7, 0)));
    assert_eq!(complaint.distinct_stops.len(), 3);
    assert_eq!(complaint.movement_analysis.movement_trend, MovementTrend::ContinuousStop);
}

#[test]
fn missing_directory_is_a_hard_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut analyzer = RobotLogAnalyzer::new(AnalyzerConfig {
        log_directory: dir.path().join("absent"),
        ..AnalyzerConfig::default()
    });
    assert!(matches!(
        analyzer.analyze(),
        Err(AnalyzerError::DirectoryNotFound(_))
    ));
}

#[test]
fn empty_directory_reports_no_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let analyzer = analyzer_for(dir.path());
    let report = analyzer.generate_report(None, TraceTarget::Latest);
    assert_eq!(report.analysis_summary.total_log_files, 0);
    assert!(report.historical_trace_analysis.trace().is_none());
    assert!(report.stop_point_analysis.is_empty());
    assert_eq!(report.system_health.health_score, 100);
}
