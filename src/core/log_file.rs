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

use super::context::AnalysisContext;
use super::segmenter::{Event, TaskSegmenter};
use crate::anomaly::detect_anomalies;
use crate::error::{AnalyzerError, Result};
use crate::parser::event_kind::classify_event;
use crate::parser::phase::detect_task_phase;
use crate::parser::position::extract_position;
use crate::parser::status::extract_status;
use crate::parser::stop_reason::detect_stop_reasons;
use crate::parser::{parse_timestamp, LogLine, TimestampParse};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};

/// Lines walked and lines that carried a usable timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub lines: usize,
    pub timestamped: usize,
}

/// Display name recorded on every record from this file.
#[must_use]
pub fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Single pass over one log stream, appending into `ctx`.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Invalid UTF-8 is replaced,
/// never fatal. On a read error the records already appended stay in `ctx`,
/// the open task (if any) is dropped and the error is returned.
pub fn walk_reader<R: BufRead>(
    mut reader: R,
    file_name: &str,
    ctx: &mut AnalysisContext,
) -> std::io::Result<WalkStats> {
    profiling::scope!("walk_reader");

    let mut segmenter = TaskSegmenter::new();
    let mut stats = WalkStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let decoded = String::from_utf8_lossy(&buf);
        for raw in split_lines(&decoded) {
            stats.lines += 1;
            let line = LogLine::new(raw, file_name, stats.lines);
            if walk_line(&line, &mut segmenter, ctx) {
                stats.timestamped += 1;
            }
        }
    }

    if let Some(open) = segmenter.finish() {
        debug!(
            "Discarding task opened at {} in {file_name}: no end marker before end of file",
            open.start_time
        );
    }

    Ok(stats)
}

/// Lines in one `read_until(b'\n')` chunk. The chunk holds at most one `\n`,
/// at its end, but any number of bare carriage returns.
fn split_lines(chunk: &str) -> std::str::Split<'_, char> {
    let body = chunk.strip_suffix('\n').unwrap_or(chunk);
    let body = body.strip_suffix('\r').unwrap_or(body);
    body.split('\r')
}

/// Classify one line. Returns false when it has no usable timestamp and was
/// skipped.
fn walk_line(
    line: &LogLine<'_>,
    segmenter: &mut TaskSegmenter,
    ctx: &mut AnalysisContext,
) -> bool {
    let raw = line.raw;
    let TimestampParse::Found(timestamp) = parse_timestamp(raw) else {
        return false;
    };

    if let Some(phase) = detect_task_phase(raw) {
        if let Some(task) = segmenter.observe(phase, raw, timestamp, line.file_name) {
            ctx.task_segments.push(task);
        }
    }

    let position = extract_position(raw, timestamp);
    if let Some(pos) = &position {
        ctx.positions.push(pos.clone());
    }

    let anomalies = detect_anomalies(line, timestamp);
    ctx.anomalies.extend(anomalies.iter().cloned());

    if let Some(sample) = extract_status(raw, timestamp, line.file_name) {
        ctx.status_samples.push(sample);
    }
    ctx.stop_reasons.extend(detect_stop_reasons(line, timestamp));

    if segmenter.is_open() {
        segmenter.record(Event {
            timestamp,
            line: line.trimmed().to_string(),
            line_number: line.line_number,
            kind: classify_event(raw),
            position,
            anomalies,
        });
    }
    true
}

pub fn walk_file(path: &Path, ctx: &mut AnalysisContext) -> Result<WalkStats> {
    let name = file_display_name(path);
    info!("Analyzing file: {name}");

    let start = Instant::now();
    let file = File::open(path).map_err(|e| AnalyzerError::io(path, e))?;
    let stats = walk_reader(BufReader::new(file), &name, ctx).map_err(|e| AnalyzerError::io(path, e))?;
    debug!(
        "Walked {} lines ({} timestamped) from {name} in {:?}",
        stats.lines,
        stats.timestamped,
        start.elapsed()
    );
    Ok(stats)
}

/// Walk every file in order. A failing file is logged and recorded in
/// `ctx.failed_files`; the batch carries on.
pub fn walk_all(paths: &[impl AsRef<Path>], ctx: &mut AnalysisContext) {
    profiling::scope!("walk_all");

    for path in paths {
        let path = path.as_ref();
        ctx.log_files.push(path.to_path_buf());
        if let Err(e) = walk_file(path, ctx) {
            error!("Failed to analyze {}: {e}", path.display());
            ctx.failed_files.push(file_display_name(path));
        }
    }
    info!("Log analysis complete: {} files", paths.len());
}
