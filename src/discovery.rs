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

//! Log file discovery by glob pattern.

use crate::error::{AnalyzerError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Non-recursive: each pattern is matched against the entries directly in
/// `dir`. Results are grouped by pattern, in pattern order, so a file that
/// matches two patterns is listed twice.
pub fn discover_log_files(dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AnalyzerError::DirectoryNotFound(dir.to_path_buf()));
    }
    info!("Discovering log files in {}", dir.display());

    let base = glob::Pattern::escape(&dir.to_string_lossy());
    // Hidden files only match patterns that spell out the dot
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };
    let mut files = Vec::new();

    for pattern in patterns {
        let full = format!("{base}/{pattern}");
        let entries = glob::glob_with(&full, options)
            .map_err(|e| AnalyzerError::Glob(pattern.clone(), e.to_string()))?;

        let mut matched: Vec<PathBuf> = entries
            .filter_map(|entry| {
                entry
                    .inspect_err(|e| warn!("Skipping unreadable entry: {e}"))
                    .ok()
            })
            .filter(|path| path.is_file())
            .collect();
        matched.sort();
        debug!("Pattern {pattern} matched {} files", matched.len());
        files.extend(matched);
    }

    info!("Found {} log files", files.len());
    Ok(files)
}
