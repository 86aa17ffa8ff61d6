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

//! Pose and coordinate extraction.

use chrono::NaiveDateTime;
use fancy_regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Which estimator produced a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionKind {
    Slam,
    Odometry,
    /// Fixed or planned points: charge station, goals, trajectory
    Reference,
}

/// The pattern a position was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    SlamPose,
    OdomPose,
    ChargeStation,
    GoalPose,
    RobotPosition,
    TrajectoryPoint,
}

impl PositionSource {
    #[must_use]
    pub const fn kind(self) -> PositionKind {
        match self {
            Self::SlamPose => PositionKind::Slam,
            Self::OdomPose => PositionKind::Odometry,
            Self::ChargeStation | Self::GoalPose | Self::RobotPosition | Self::TrajectoryPoint => {
                PositionKind::Reference
            }
        }
    }

    /// Whether the pattern captures a third (z or heading) component.
    const fn has_z(self) -> bool {
        matches!(self, Self::SlamPose | Self::OdomPose)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub timestamp: NaiveDateTime,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(rename = "type")]
    pub kind: PositionKind,
    pub source: PositionSource,
}

impl PositionRecord {
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

const NUM: &str = r"([-\d.]+)";

static POSITION_PATTERNS: LazyLock<Vec<(PositionSource, Regex)>> = LazyLock::new(|| {
    [
        (PositionSource::SlamPose, format!(r"Slam pose: \[{NUM},{NUM},{NUM}\]")),
        (PositionSource::OdomPose, format!(r"pose\({NUM},{NUM},{NUM}\)")),
        (PositionSource::ChargeStation, format!(r"Charge station pose.*\[{NUM},{NUM}\]")),
        (PositionSource::GoalPose, format!(r"goal_pose=\({NUM},{NUM}\)")),
        (PositionSource::RobotPosition, format!(r"position.*\[{NUM},{NUM}\]")),
        (PositionSource::TrajectoryPoint, format!(r"point.*\[{NUM},{NUM}\]")),
    ]
    .into_iter()
    .map(|(source, pattern)| {
        let re = Regex::new(&format!("(?i){pattern}")).expect("valid regex literal");
        (source, re)
    })
    .collect()
});

fn capture_f64(caps: &Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().parse().ok()
}

fn read_pose(source: PositionSource, caps: &Captures<'_>, timestamp: NaiveDateTime) -> Option<PositionRecord> {
    let x = capture_f64(caps, 1)?;
    let y = capture_f64(caps, 2)?;
    let z = if source.has_z() {
        Some(capture_f64(caps, 3)?)
    } else {
        None
    };
    Some(PositionRecord {
        timestamp,
        x,
        y,
        z,
        kind: source.kind(),
        source,
    })
}

/// First pattern (in table order) whose captures all convert wins. A
/// pattern that matches with non-numeric text such as `1.2.3` or `-` is
/// skipped and the next one is tried.
#[must_use]
pub fn extract_position(line: &str, timestamp: NaiveDateTime) -> Option<PositionRecord> {
    POSITION_PATTERNS.iter().find_map(|(source, re)| {
        let caps = re.captures(line).ok()??;
        read_pose(*source, &caps, timestamp)
    })
}
