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

//! System status samples (CPU, memory, battery, temperature, sensor and
//! network state) scraped from free-form lines.

use chrono::NaiveDateTime;
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid regex literal")
}

static CPU_USAGE: LazyLock<Regex> = LazyLock::new(|| ci(r"CPU.*usage.*?(\d+)%"));
static MEMORY_USAGE: LazyLock<Regex> = LazyLock::new(|| ci(r"memory.*usage.*?(\d+)%"));
static BATTERY_LEVEL: LazyLock<Regex> = LazyLock::new(|| ci(r"battery.*?(\d+)%"));
static TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| ci(r"temperature.*?(\d+)"));
static SENSOR_STATUS: LazyLock<Regex> = LazyLock::new(|| ci(r"sensor.*?(online|offline|error)"));
static NETWORK_STATUS: LazyLock<Regex> =
    LazyLock::new(|| ci(r"network.*?(connected|disconnected|error)"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSample {
    pub timestamp: NaiveDateTime,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_status: Option<String>,
}

impl StatusSample {
    const fn is_empty(&self) -> bool {
        self.cpu_usage.is_none()
            && self.memory_usage.is_none()
            && self.battery_level.is_none()
            && self.temperature.is_none()
            && self.sensor_status.is_none()
            && self.network_status.is_none()
    }
}

fn capture<'t>(re: &Regex, line: &'t str) -> Option<&'t str> {
    re.captures(line).ok()??.get(1).map(|m| m.as_str())
}

fn capture_number(re: &Regex, line: &str) -> Option<u32> {
    capture(re, line)?.parse().ok()
}

fn capture_word(re: &Regex, line: &str) -> Option<String> {
    capture(re, line).map(str::to_lowercase)
}

/// `None` when the line carries none of the tracked fields.
#[must_use]
pub fn extract_status(line: &str, timestamp: NaiveDateTime, file: &str) -> Option<StatusSample> {
    let sample = StatusSample {
        timestamp,
        file: file.to_string(),
        cpu_usage: capture_number(&CPU_USAGE, line),
        memory_usage: capture_number(&MEMORY_USAGE, line),
        battery_level: capture_number(&BATTERY_LEVEL, line),
        temperature: capture_number(&TEMPERATURE, line),
        sensor_status: capture_word(&SENSOR_STATUS, line),
        network_status: capture_word(&NETWORK_STATUS, line),
    };
    (!sample.is_empty()).then_some(sample)
}
