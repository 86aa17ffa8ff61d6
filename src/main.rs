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

use anyhow::Context;
use clap::Parser;
use robolog::analysis::TraceTarget;
use robolog::parser::parse_user_timestamp;
use robolog::{AnalyzerConfig, Report, RobotLogAnalyzer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "ram-profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Parser, Debug)]
#[command(name = "robolog")]
#[command(version)]
#[command(about = "Analyze robot fleet logs: tasks, poses, anomalies, stop points and complaints", long_about = None)]
struct Args {
    /// Directory containing the log files
    #[arg(short = 'd', long = "log-dir", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Where to write the JSON report
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Complaint time, "YYYY-MM-DD HH:MM:SS"
    #[arg(long = "complaint-time", value_name = "TIME")]
    complaint_time: Option<String>,

    /// Minutes on each side of the complaint time
    #[arg(long = "complaint-window", value_name = "MINUTES")]
    complaint_window: Option<f64>,

    /// Anchor the historical trace on the task starting closest to this time
    #[arg(long = "target-time", value_name = "TIME")]
    target_time: Option<String>,

    /// Tasks before the target to include in the historical trace
    #[arg(long = "lookback-tasks", value_name = "N")]
    lookback_tasks: Option<usize>,

    /// Stop detection window in minutes
    #[arg(long = "stop-window", value_name = "MINUTES")]
    stop_window: Option<f64>,

    /// Stop detection threshold in meters
    #[arg(long = "movement-threshold", value_name = "METERS")]
    movement_threshold: Option<f64>,

    /// Config file to use instead of the one in the user config directory
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path for the DHAT heap profiling output (only used when built with --features ram-profiling)
    #[cfg(feature = "ram-profiling")]
    #[arg(
        long = "profile-output",
        value_name = "PROFILE_FILE",
        default_value = "dhat-heap.json"
    )]
    profile_output: PathBuf,
}

impl Args {
    fn resolve_config(&self) -> anyhow::Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = AnalyzerConfig::load_from(path)
                    .with_context(|| format!("loading config {}", path.display()))?;
                config.apply_env();
                config
            }
            None => AnalyzerConfig::load(),
        };

        if let Some(dir) = &self.log_dir {
            config.log_directory.clone_from(dir);
        }
        if let Some(minutes) = self.complaint_window {
            config.complaint_window_minutes = minutes;
        }
        if let Some(n) = self.lookback_tasks {
            config.lookback_tasks = n;
        }
        if let Some(minutes) = self.stop_window {
            config.stop_window_minutes = minutes;
        }
        if let Some(meters) = self.movement_threshold {
            config.movement_threshold = meters;
        }
        Ok(config)
    }
}

fn print_summary(report: &Report) {
    let summary = &report.analysis_summary;
    println!("Log files:        {}", summary.total_log_files);
    println!("Task segments:    {}", summary.total_task_segments);
    println!("Position records: {}", summary.total_position_records);
    println!("Anomalies:        {}", summary.total_anomalies);
    println!("Stop points:      {}", report.stop_point_analysis.len());
    if !summary.failed_files.is_empty() {
        println!("Failed files:     {}", summary.failed_files.join(", "));
    }
    println!(
        "System health:    {} ({:?})",
        report.system_health.health_score, report.system_health.health_status
    );

    if !report.anomaly_summary.most_common.is_empty() {
        println!("\nMost common anomalies:");
        for (kind, count) in report.anomaly_summary.most_common.iter().take(3) {
            println!("  {kind}: {count}");
        }
    }

    if let Some(complaint) = &report.complaint_analysis {
        println!("\nComplaint at {}:", complaint.complaint_time);
        println!("  Distinct stops nearby: {}", complaint.distinct_stops.len());
        println!("  Anomalies nearby:      {}", complaint.anomalies_nearby.len());
        println!(
            "  Movement trend:        {:?}",
            complaint.movement_analysis.movement_trend
        );
        for rec in &complaint.recommendations {
            println!("  - {rec}");
        }
    }

    println!("\nRecommendations:");
    for rec in &report.recommendations {
        println!("  - {rec}");
    }
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to override (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("RoboLog starting up (version {})", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    #[cfg(feature = "ram-profiling")]
    let _profiler = {
        info!("RAM profiling enabled, output: {:?}", args.profile_output);
        dhat::Profiler::builder()
            .file_name(args.profile_output.clone())
            .build()
    };

    #[cfg(feature = "cpu-profiling")]
    {
        tracy_client::Client::start();
        info!("CPU profiling enabled with Tracy - run Tracy profiler to connect");
    }

    // Bad user times fail before any file is touched
    let complaint_time = args
        .complaint_time
        .as_deref()
        .map(parse_user_timestamp)
        .transpose()
        .context("invalid --complaint-time")?;
    let target = match args.target_time.as_deref() {
        Some(text) => {
            TraceTarget::NearestTo(parse_user_timestamp(text).context("invalid --target-time")?)
        }
        None => TraceTarget::Latest,
    };

    let config = args.resolve_config()?;
    let mut analyzer = RobotLogAnalyzer::new(config);
    analyzer
        .analyze()
        .with_context(|| format!("analyzing {}", analyzer.config().log_directory.display()))?;

    let report = analyzer.generate_report(complaint_time, target);

    let output = args.output.unwrap_or_else(|| {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        analyzer
            .config()
            .reports_directory
            .join(format!("robot_analysis_report_{stamp}.json"))
    });
    report
        .save(&output)
        .with_context(|| format!("saving report to {}", output.display()))?;

    print_summary(&report);
    println!("\nReport written to {}", output.display());
    Ok(())
}
