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

//! Derived analyses run over a finished [`AnalysisContext`](crate::core::AnalysisContext).

pub mod complaint;
pub mod stop_points;
pub mod trend;

use serde::{Deserialize, Serialize};

pub use complaint::{ComplaintAnalysis, ComplaintCorrelator, MovementState, MovementTrend};
pub use stop_points::{dedup_stop_points, StopPoint, StopPointDetector};
pub use trend::{
    classify_slope, linear_slope, HistoricalTrace, HistoricalTraceAnalyzer, TraceOutcome,
    TraceTarget, Trend,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}
