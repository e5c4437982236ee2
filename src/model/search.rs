// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Catalog search management.
//!
//! This module provides state for the search view, the last submitted query
//! and the tracks the catalog returned for it.

use crate::model::Track;

/// Queries shorter than this are not sent to the catalog.
pub(crate) const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug, Default)]
pub(crate) struct Search {
    query: String,
    tracks: Vec<Track>,
    in_flight: bool,
}

impl Search {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a new query, returning the trimmed query if it should be sent
    /// to the catalog.
    pub(crate) fn begin(&mut self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return None;
        }

        self.query = query.to_string();
        self.in_flight = true;

        Some(self.query.clone())
    }

    /// Stores results, ignoring results for a query that has since been
    /// replaced.
    pub(crate) fn finish(&mut self, query: &str, tracks: Vec<Track>) -> bool {
        if query != self.query {
            return false;
        }

        self.tracks = tracks;
        self.in_flight = false;

        true
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queries_are_not_sent() {
        let mut search = Search::new();
        assert_eq!(search.begin(" a "), None);
        assert!(!search.in_flight());
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut search = Search::new();
        search.begin("first");
        search.begin("second");

        assert!(!search.finish("first", vec![Track::new("x", "x", "y", 1)]));
        assert!(search.tracks().is_empty());
        assert!(search.in_flight());

        assert!(search.finish("second", vec![Track::new("z", "z", "y", 1)]));
        assert_eq!(search.tracks().len(), 1);
        assert!(!search.in_flight());
    }
}
