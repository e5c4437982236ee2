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

//! Interactive views composed from the track table.
//!
//! Each view owns a [`TrackTable`] and implements
//! [`AppEventProcessor`](crate::events::AppEventProcessor) to turn keyboard
//! input into application events, and [`Render`](crate::render::Render) to
//! draw itself.

mod history;
mod playlists;
mod queue;
mod search;
mod track_table;

pub(crate) use history::HistoryView;
pub(crate) use playlists::PlaylistsView;
pub(crate) use queue::QueueView;
pub(crate) use search::SearchView;
pub(crate) use track_table::{TrackTable, TrackTableAction};
