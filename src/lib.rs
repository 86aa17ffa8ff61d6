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

//! Robot fleet log analysis.
//!
//! Log files are walked once, line by line. Each timestamped line runs
//! through the classifier banks in [`parser`] and the per-file task state
//! machine, filling an [`AnalysisContext`]. Stop points, historical task
//! trends and complaint correlation are derived afterwards from that context
//! (see [`analysis`]) and assembled into a [`Report`].

pub mod analysis;
pub mod anomaly;
pub mod config;
pub mod core;
pub mod discovery;
pub mod error;
pub mod parser;
pub mod report;

pub use crate::analysis::{ComplaintAnalysis, StopPoint, TraceOutcome, TraceTarget};
pub use crate::anomaly::{AnomalyEvent, AnomalyKind, Severity};
pub use crate::config::AnalyzerConfig;
pub use crate::core::{AnalysisContext, RobotLogAnalyzer, TaskSegment, TaskStatus};
pub use crate::error::{AnalyzerError, Result};
pub use crate::parser::position::{PositionKind, PositionRecord};
pub use crate::report::Report;
