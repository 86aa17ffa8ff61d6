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

//! Stationary interval detection over position fixes.

use crate::parser::position::PositionRecord;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Fewest fixes a window must hold before it is judged.
pub const MIN_WINDOW_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopPoint {
    pub timestamp: NaiveDateTime,
    pub position: PositionRecord,
    pub duration_minutes: f64,
    /// Mean of the average |dx| and average |dy| across the window
    pub avg_movement: f64,
    pub window_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopPointDetector {
    pub window_minutes: f64,
    /// Meters
    pub movement_threshold: f64,
}

impl Default for StopPointDetector {
    fn default() -> Self {
        Self {
            window_minutes: 10.0,
            movement_threshold: 0.01,
        }
    }
}

impl StopPointDetector {
    #[must_use]
    pub const fn new(window_minutes: f64, movement_threshold: f64) -> Self {
        Self {
            window_minutes,
            movement_threshold,
        }
    }

    /// Slide a trailing time window over the fixes sorted by time and emit a
    /// stop point wherever the mean successive |dx| and |dy| both stay under
    /// the threshold.
    #[must_use]
    pub fn detect(&self, positions: &[PositionRecord]) -> Vec<StopPoint> {
        profiling::scope!("StopPointDetector::detect");

        let mut sorted: Vec<&PositionRecord> = positions.iter().collect();
        sorted.sort_by_key(|p| p.timestamp);

        let window_secs = self.window_minutes * 60.0;
        let mut stops = Vec::new();
        let mut start = 0;

        for (i, current) in sorted.iter().enumerate() {
            while start < i && secs_between(sorted[start].timestamp, current.timestamp) > window_secs {
                start += 1;
            }

            let window = &sorted[start..=i];
            if window.len() < MIN_WINDOW_POINTS {
                continue;
            }

            let steps = (window.len() - 1) as f64;
            let (sum_dx, sum_dy) = window.windows(2).fold((0.0, 0.0), |(sx, sy), pair| {
                (sx + (pair[1].x - pair[0].x).abs(), sy + (pair[1].y - pair[0].y).abs())
            });
            let avg_x = sum_dx / steps;
            let avg_y = sum_dy / steps;

            if avg_x < self.movement_threshold && avg_y < self.movement_threshold {
                stops.push(StopPoint {
                    timestamp: current.timestamp,
                    position: (*current).clone(),
                    duration_minutes: self.window_minutes,
                    avg_movement: (avg_x + avg_y) / 2.0,
                    window_size: window.len(),
                });
            }
        }

        stops
    }
}

fn secs_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

/// Greedy in time order: keep a stop, then drop any later one less than
/// `interval` after the last kept stop.
#[must_use]
pub fn dedup_stop_points(stops: &[StopPoint], interval: Duration) -> Vec<StopPoint> {
    let mut sorted: Vec<&StopPoint> = stops.iter().collect();
    sorted.sort_by_key(|s| s.timestamp);

    let mut kept: Vec<StopPoint> = Vec::new();
    for stop in sorted {
        let is_duplicate = kept
            .last()
            .is_some_and(|last| stop.timestamp - last.timestamp < interval);
        if !is_duplicate {
            kept.push(stop.clone());
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::position::{PositionKind, PositionSource};
    use chrono::NaiveDate;

    fn fix(minute: i64, x: f64, y: f64) -> PositionRecord {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid test date");
        PositionRecord {
            timestamp: base + Duration::minutes(minute),
            x,
            y,
            z: Some(0.0),
            kind: PositionKind::Slam,
            source: PositionSource::SlamPose,
        }
    }

    #[test]
    fn test_identical_positions_yield_stop_at_last_point() {
        let fixes: Vec<_> = (0..5).map(|m| fix(m, 1.0, 2.0)).collect();
        let stops = StopPointDetector::default().detect(&fixes);
        let last = stops.last().expect("stop point");
        assert_eq!(last.timestamp, fixes[4].timestamp);
        assert_eq!(last.window_size, 5);
        assert!(last.avg_movement.abs() < f64::EPSILON);
        // first stop once the window holds three fixes
        assert_eq!(stops.len(), 3);
        assert_eq!(stops[0].timestamp, fixes[2].timestamp);
    }

    #[test]
    fn test_moving_robot_never_stops() {
        let fixes: Vec<_> = (0..20).map(|m| fix(m, m as f64 * 0.5, 0.0)).collect();
        assert!(StopPointDetector::default().detect(&fixes).is_empty());
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let fixes = vec![fix(2, 1.0, 1.0), fix(0, 1.0, 1.0), fix(1, 1.0, 1.0)];
        let stops = StopPointDetector::default().detect(&fixes);
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].timestamp, fix(2, 0.0, 0.0).timestamp);
    }

    #[test]
    fn test_window_drops_old_points() {
        // the two early fixes are far apart in space but fall out of a
        // 10 minute window by minute 30
        let mut fixes = vec![fix(0, 0.0, 0.0), fix(1, 50.0, 50.0)];
        fixes.extend((28..31).map(|m| fix(m, 3.0, 3.0)));
        let stops = StopPointDetector::new(10.0, 0.01).detect(&fixes);
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].window_size, 3);
    }

    #[test]
    fn test_too_few_points() {
        let fixes = vec![fix(0, 1.0, 1.0), fix(1, 1.0, 1.0)];
        assert!(StopPointDetector::default().detect(&fixes).is_empty());
        assert!(StopPointDetector::default().detect(&[]).is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_of_cluster() {
        let fixes: Vec<_> = (0..12).map(|m| fix(m, 1.0, 1.0)).collect();
        let stops = StopPointDetector::default().detect(&fixes);
        assert_eq!(stops.len(), 10);
        let distinct = dedup_stop_points(&stops, Duration::minutes(5));
        let minutes: Vec<_> = distinct
            .iter()
            .map(|s| (s.timestamp - fixes[0].timestamp).num_minutes())
            .collect();
        assert_eq!(minutes, vec![2, 7]);
    }
}
