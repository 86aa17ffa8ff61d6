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

use super::context::{AnalysisContext, ContextSummary};
use super::log_file::walk_all;
use crate::analysis::{
    ComplaintAnalysis, ComplaintCorrelator, HistoricalTraceAnalyzer, StopPoint, StopPointDetector,
    TraceOutcome, TraceTarget,
};
use crate::config::AnalyzerConfig;
use crate::discovery::discover_log_files;
use crate::error::Result;
use crate::report::Report;
use chrono::NaiveDateTime;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Runs the whole pipeline: discovery, the single-pass walk and the derived
/// analyses. Each `analyze_*` call starts from an empty context.
#[derive(Debug, Default)]
pub struct RobotLogAnalyzer {
    config: AnalyzerConfig,
    ctx: AnalysisContext,
}

impl RobotLogAnalyzer {
    #[must_use]
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            ctx: AnalysisContext::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    #[must_use]
    pub const fn context(&self) -> &AnalysisContext {
        &self.ctx
    }

    /// Discover and walk the configured log directory.
    pub fn analyze(&mut self) -> Result<ContextSummary> {
        let dir = self.config.log_directory.clone();
        self.analyze_directory(&dir)
    }

    pub fn analyze_directory(&mut self, dir: &Path) -> Result<ContextSummary> {
        self.ctx.reset();
        let files = discover_log_files(dir, &self.config.file_patterns)?;
        Ok(self.walk(&files))
    }

    /// Walk an explicit file list, skipping discovery.
    pub fn analyze_files(&mut self, files: &[impl AsRef<Path>]) -> ContextSummary {
        self.ctx.reset();
        self.walk(files)
    }

    fn walk(&mut self, files: &[impl AsRef<Path>]) -> ContextSummary {
        let start = Instant::now();
        walk_all(files, &mut self.ctx);
        let summary = self.ctx.summary();
        info!(
            "Analysis took {:?}: {} files, {} tasks, {} positions, {} anomalies",
            start.elapsed(),
            summary.file_count,
            summary.segment_count,
            summary.position_count,
            summary.anomaly_count
        );
        summary
    }

    #[must_use]
    pub fn detect_stop_points(&self) -> Vec<StopPoint> {
        StopPointDetector::new(self.config.stop_window_minutes, self.config.movement_threshold)
            .detect(&self.ctx.positions)
    }

    #[must_use]
    pub fn historical_trace(&self, target: TraceTarget) -> TraceOutcome {
        HistoricalTraceAnalyzer::new(self.config.lookback_tasks).trace(
            &self.ctx.task_segments,
            &self.ctx.status_samples,
            target,
        )
    }

    #[must_use]
    pub fn analyze_complaint(&self, complaint_time: NaiveDateTime) -> ComplaintAnalysis {
        let stops = self.detect_stop_points();
        self.correlator().correlate(complaint_time, &self.ctx, &stops)
    }

    fn correlator(&self) -> ComplaintCorrelator {
        ComplaintCorrelator::new(
            self.config.complaint_window_minutes,
            self.config.movement_threshold,
            self.config.stop_dedup_minutes,
        )
    }

    #[must_use]
    pub fn generate_report(
        &self,
        complaint_time: Option<NaiveDateTime>,
        target: TraceTarget,
    ) -> Report {
        let stops = self.detect_stop_points();
        let complaint =
            complaint_time.map(|t| self.correlator().correlate(t, &self.ctx, &stops));
        Report::assemble(&self.ctx, stops, self.historical_trace(target), complaint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_reset_between_runs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = dir.path().join("robot.log");
        std::fs::write(
            &log,
            "2025-01-01 10:00:00 mission start\n2025-01-01 10:00:05 sensor offline\n2025-01-01 10:01:00 mission complete\n",
        )
        .expect("write");

        let mut analyzer = RobotLogAnalyzer::default();
        let first = analyzer.analyze_directory(dir.path()).expect("first run");
        let second = analyzer.analyze_directory(dir.path()).expect("second run");
        assert_eq!(first, second);
        assert_eq!(second.file_count, 1);
        assert_eq!(second.segment_count, 1);
        assert_eq!(second.anomaly_count, 1);
    }

    #[test]
    fn test_missing_file_is_recorded_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("good.log");
        std::fs::write(&good, "2025-01-01 10:00:00 battery low\n").expect("write");

        let mut analyzer = RobotLogAnalyzer::default();
        let summary = analyzer.analyze_files(&[dir.path().join("gone.log"), good]);
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.failed_file_count, 1);
        assert_eq!(summary.anomaly_count, 1);
        assert_eq!(analyzer.context().failed_files, vec!["gone.log".to_string()]);
    }
}
