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

//! Line-level extraction: timestamps and the regex classifier banks.
//!
//! Every bank is an ordered list of `(label, patterns)` pairs. Iteration
//! order is part of the contract: single-label classifiers return the first
//! label whose pattern matches, so tables must never be rebuilt from a hash
//! map.

pub mod event_kind;
pub mod line;
pub mod phase;
pub mod position;
pub mod status;
pub mod stop_reason;
pub mod timestamp;

use fancy_regex::Regex;

pub use line::LogLine;
pub use timestamp::{parse_timestamp, parse_user_timestamp, TimestampParse};

/// An ordered table of labelled regex patterns.
pub struct PatternTable<L> {
    entries: Vec<(L, Vec<Regex>)>,
}

impl<L: Copy> PatternTable<L> {
    /// Compile a table from pattern literals. All patterns are matched
    /// case-insensitively.
    ///
    /// Patterns are compile-time literals, so a compile failure is a bug.
    #[must_use]
    pub fn new(table: &[(L, &[&str])]) -> Self {
        let entries = table
            .iter()
            .map(|(label, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex literal"))
                    .collect();
                (*label, compiled)
            })
            .collect();
        Self { entries }
    }

    /// Label of the first pattern that matches, in table order.
    #[must_use]
    pub fn first_match(&self, text: &str) -> Option<L> {
        self.entries.iter().find_map(|(label, patterns)| {
            patterns
                .iter()
                .any(|re| re.is_match(text).unwrap_or(false))
                .then_some(*label)
        })
    }

    /// One label per matching pattern, in table order. A label repeats when
    /// several of its patterns match.
    pub fn all_matches<'a>(&'a self, text: &'a str) -> impl Iterator<Item = L> + 'a {
        self.entries.iter().flat_map(move |(label, patterns)| {
            patterns
                .iter()
                .filter(move |re| re.is_match(text).unwrap_or(false))
                .map(move |_| *label)
        })
    }
}
