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

//! Search results view.
//!
//! This module coordinates the [`TrackTable`] for the results of the latest
//! catalog search.

mod event;
mod render;

use crate::{components::TrackTable, model::Track};

pub(crate) struct SearchView {
    pub(crate) track_table: TrackTable,
}

impl SearchView {
    pub(crate) fn new() -> Self {
        Self {
            track_table: TrackTable::new("Press / to search"),
        }
    }

    pub(crate) fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.track_table.clear_selection();
        self.track_table.set_tracks(tracks);
        self.track_table.select(0);
    }
}
