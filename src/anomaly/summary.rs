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

//! Aggregate views over the anomaly list: counts, timeline, health score.

use super::{AnomalyEvent, Severity};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const TIMELINE_DESCRIPTION_CHARS: usize = 100;
const MOST_COMMON_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub file: String,
}

/// Counts keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub by_type: IndexMap<String, usize>,
    pub by_severity: IndexMap<String, usize>,
    pub by_file: IndexMap<String, usize>,
    pub timeline: Vec<TimelineEntry>,
    /// Up to five `(type, count)` pairs, most frequent first
    pub most_common: Vec<(String, usize)>,
}

impl AnomalySummary {
    #[must_use]
    pub fn from_events(anomalies: &[AnomalyEvent]) -> Self {
        profiling::scope!("AnomalySummary::from_events");

        let mut summary = Self::default();
        for anomaly in anomalies {
            *summary.by_type.entry(anomaly.kind.as_str().to_string()).or_default() += 1;
            *summary
                .by_severity
                .entry(anomaly.severity.as_str().to_string())
                .or_default() += 1;
            *summary.by_file.entry(anomaly.file.clone()).or_default() += 1;
            summary.timeline.push(TimelineEntry {
                timestamp: anomaly.timestamp,
                kind: anomaly.kind.as_str().to_string(),
                severity: anomaly.severity,
                description: anomaly
                    .description
                    .chars()
                    .take(TIMELINE_DESCRIPTION_CHARS)
                    .collect(),
                file: anomaly.file.clone(),
            });
        }

        let mut ranked: Vec<(String, usize)> = summary
            .by_type
            .iter()
            .map(|(kind, count)| (kind.clone(), *count))
            .collect();
        // stable sort: ties stay in first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(MOST_COMMON_LIMIT);
        summary.most_common = ranked;

        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthLevel {
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Fair,
            30..=49 => Self::Poor,
            _ => Self::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub health_score: u32,
    pub health_status: HealthLevel,
    pub anomaly_breakdown: SeverityBreakdown,
    pub recommendations: Vec<String>,
}

impl SystemHealth {
    #[must_use]
    pub fn assess(anomalies: &[AnomalyEvent]) -> Self {
        let mut breakdown = SeverityBreakdown {
            total: anomalies.len(),
            ..SeverityBreakdown::default()
        };
        for anomaly in anomalies {
            match anomaly.severity {
                Severity::Critical => breakdown.critical += 1,
                Severity::High => breakdown.high += 1,
                Severity::Medium => breakdown.medium += 1,
                Severity::Low => breakdown.low += 1,
            }
        }

        let penalty = breakdown.critical * 30 + breakdown.high * 15 + breakdown.medium * 5;
        let health_score = 100usize.saturating_sub(penalty) as u32;

        Self {
            health_score,
            health_status: HealthLevel::from_score(health_score),
            anomaly_breakdown: breakdown,
            recommendations: health_recommendations(health_score, &breakdown),
        }
    }
}

fn health_recommendations(score: u32, breakdown: &SeverityBreakdown) -> Vec<String> {
    let mut out = Vec::new();
    if breakdown.critical > 0 {
        out.push(format!(
            "{} critical issue(s) found, handle immediately",
            breakdown.critical
        ));
    }
    if breakdown.high > 0 {
        out.push(format!(
            "{} high priority issue(s) found, fix soon",
            breakdown.high
        ));
    }
    out.push(
        if score < 50 {
            "System in poor shape, run a full diagnosis and maintenance"
        } else if score < 70 {
            "Room for improvement, focus on the high priority issues"
        } else {
            "System running normally, keep monitoring"
        }
        .to_string(),
    );
    out
}
