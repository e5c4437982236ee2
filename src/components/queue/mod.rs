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

//! The play queue view.
//!
//! This module coordinates the [`TrackTable`] for the upcoming tracks. The
//! rows are a copy of the orchestrator's queue, refreshed after every event.

mod event;
mod render;

use crate::{components::TrackTable, model::Track};

pub(crate) struct QueueView {
    pub(crate) track_table: TrackTable,
}

impl QueueView {
    pub(crate) fn new() -> Self {
        Self {
            track_table: TrackTable::new("The queue is empty, press / to search"),
        }
    }

    pub(crate) fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.track_table.set_tracks(tracks);
    }
}
