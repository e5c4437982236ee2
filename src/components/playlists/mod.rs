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

//! Playlist browser state management.
//!
//! This module provides state for the playlists view: the list of stored
//! playlists on the left and the tracks of the highlighted playlist on the
//! right, and navigation between the two panes.

mod event;
mod render;

#[cfg(test)]
mod tests;

use ratatui::widgets::ListState;

use crate::{components::TrackTable, model::Playlist};

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub(crate) enum PlaylistsPane {
    #[default]
    Playlists,
    Tracks,
}

pub(crate) struct PlaylistsView {
    pub(crate) active_pane: PlaylistsPane,
    playlists: Vec<Playlist>,
    list_state: ListState,
    pub(crate) track_table: TrackTable,
}

impl PlaylistsView {
    pub(crate) fn new() -> Self {
        Self {
            active_pane: PlaylistsPane::default(),
            playlists: vec![],
            list_state: ListState::default(),
            track_table: TrackTable::new("This playlist is empty"),
        }
    }

    /// Replaces the playlists, keeping the highlighted playlist if it still
    /// exists.
    pub(crate) fn set_playlists(&mut self, playlists: Vec<Playlist>) {
        let previous_id = self.selected_playlist().map(|p| p.id.clone());

        let index = previous_id
            .and_then(|id| playlists.iter().position(|p| p.id == id))
            .or_else(|| {
                let len = playlists.len();
                (len > 0).then(|| self.list_state.selected().unwrap_or(0).min(len - 1))
            });

        self.playlists = playlists;
        self.list_state.select(index);
        self.refresh_tracks();

        if self.playlists.is_empty() {
            self.active_pane = PlaylistsPane::Playlists;
        }
    }

    pub(crate) fn selected_playlist(&self) -> Option<&Playlist> {
        self.list_state
            .selected()
            .and_then(|i| self.playlists.get(i))
    }

    /// Finds a playlist by name, ignoring case and surrounding whitespace.
    pub(crate) fn find_by_name(&self, name: &str) -> Option<&Playlist> {
        let name = name.trim();
        self.playlists
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    fn set_pane(&mut self, pane: PlaylistsPane) {
        if pane == PlaylistsPane::Tracks && self.selected_playlist().is_none() {
            return;
        }
        self.active_pane = pane;
    }

    fn select_playlist(&mut self, index: usize) {
        if index < self.playlists.len() {
            self.list_state.select(Some(index));
            self.track_table.clear_selection();
            self.refresh_tracks();
            self.track_table.select(0);
        }
    }

    fn next_playlist(&mut self) {
        let len = self.playlists.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 >= len => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.select_playlist(i);
    }

    fn previous_playlist(&mut self) {
        let len = self.playlists.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select_playlist(i);
    }

    fn refresh_tracks(&mut self) {
        let tracks = self
            .selected_playlist()
            .map(|p| p.tracks.clone())
            .unwrap_or_default();
        self.track_table.set_tracks(tracks);
    }
}
