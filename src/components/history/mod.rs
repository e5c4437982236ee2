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

//! Recently played tracks.
//!
//! The orchestrator keeps history oldest first, this view shows it most
//! recent first.

mod event;
mod render;

use crate::{components::TrackTable, model::Track};

pub(crate) struct HistoryView {
    pub(crate) track_table: TrackTable,
}

impl HistoryView {
    pub(crate) fn new() -> Self {
        Self {
            track_table: TrackTable::new("Nothing played yet"),
        }
    }

    pub(crate) fn set_tracks(&mut self, history: &[Track]) {
        self.track_table
            .set_tracks(history.iter().rev().cloned().collect());
    }
}
