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

pub mod analyzer;
pub mod context;
pub mod log_file;
pub mod segmenter;

pub use analyzer::RobotLogAnalyzer;
pub use context::{AnalysisContext, ContextSummary};
pub use log_file::{walk_all, walk_file, walk_reader};
pub use segmenter::{Event, TaskSegment, TaskSegmenter, TaskStatus};
