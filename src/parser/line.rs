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

/// One raw line as read from a log file.
///
/// Lines are ephemeral: they live only for the duration of classification.
/// Anything worth keeping is copied into the typed records.
#[derive(Debug, Clone, Copy)]
pub struct LogLine<'a> {
    pub raw: &'a str,
    pub file_name: &'a str,
    pub line_number: usize,
}

impl<'a> LogLine<'a> {
    #[must_use]
    pub const fn new(raw: &'a str, file_name: &'a str, line_number: usize) -> Self {
        Self {
            raw,
            file_name,
            line_number,
        }
    }

    /// The line without surrounding whitespace, as stored in descriptions.
    #[must_use]
    pub fn trimmed(&self) -> &'a str {
        self.raw.trim()
    }
}
