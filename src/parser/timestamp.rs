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

//! Timestamp extraction from heterogeneous robot log lines.
//!
//! Candidates are tried in priority order and the first pattern that
//! matches decides the outcome. A match whose text fails conversion makes
//! the whole line `Malformed`; weaker candidates are not consulted.

use crate::error::{AnalyzerError, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use fancy_regex::Regex;
use std::sync::LazyLock;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// 2025-10-16 10:38:24
static STANDARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").expect("valid regex literal")
});

// ROS style [1760683956.753609073]
static BRACKETED_EPOCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\.(\d+)\]").expect("valid regex literal"));

// 2025-10-12 00:00:03:207
static COLON_MILLIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}:\d{3})").expect("valid regex literal")
});

// 1760202061275
static EPOCH_MILLIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{13})").expect("valid regex literal"));

/// Outcome of looking for a timestamp in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampParse {
    Found(NaiveDateTime),
    /// No candidate pattern matched
    NotFound,
    /// A candidate matched but its text is not a valid instant
    Malformed,
}

impl TimestampParse {
    #[must_use]
    pub const fn ok(self) -> Option<NaiveDateTime> {
        match self {
            Self::Found(ts) => Some(ts),
            Self::NotFound | Self::Malformed => None,
        }
    }
}

/// Extract the first usable timestamp from a raw log line.
#[must_use]
pub fn parse_timestamp(line: &str) -> TimestampParse {
    let candidates: [&Regex; 4] = [&STANDARD, &BRACKETED_EPOCH, &COLON_MILLIS, &EPOCH_MILLIS];

    for pattern in candidates {
        let Ok(Some(caps)) = pattern.captures(line) else {
            continue;
        };
        let Some(text) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if let Some(outcome) = convert(text) {
            return outcome;
        }
    }

    TimestampParse::NotFound
}

/// Convert matched text by its shape. `None` means the shape is not one we
/// convert (bare bracketed epoch seconds) and the next candidate is tried.
fn convert(text: &str) -> Option<TimestampParse> {
    let colons = text.matches(':').count();

    let parsed = if colons == 2 {
        NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).ok()
    } else if colons == 3 {
        // Milliseconds after a third colon are dropped
        text.get(..19)
            .and_then(|head| NaiveDateTime::parse_from_str(head, DATETIME_FORMAT).ok())
    } else if text.len() == 13 {
        text.parse::<i64>().ok().and_then(local_from_epoch_millis)
    } else {
        return None;
    };

    Some(parsed.map_or(TimestampParse::Malformed, TimestampParse::Found))
}

/// Millisecond epoch to naive local wall-clock time.
#[must_use]
pub fn local_from_epoch_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(&Local).naive_local())
}

/// Parse a caller supplied `YYYY-MM-DD HH:MM:SS` string (complaint or
/// target task time).
pub fn parse_user_timestamp(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT)
        .map_err(|_| AnalyzerError::InvalidTimestamp(input.to_string()))
}
