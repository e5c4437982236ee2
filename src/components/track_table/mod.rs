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

//! Interactive track table widget and state management.
//!
//! This module provides a reusable table component for displaying and
//! selecting tracks. The table owns its rows, which the owning view replaces
//! whenever the underlying data changes, and reports activation and commit
//! gestures back to the view as a [`TrackTableAction`].

mod event;
mod render;


use std::collections::HashSet;

use ratatui::widgets::TableState;

use crate::model::Track;

/// An action the owning view should carry out.
#[derive(Debug, PartialEq)]
pub(crate) enum TrackTableAction {
    /// The row at the given index was activated with `Enter`.
    ActivateCurrent(usize),
    /// The selected tracks, or the current row, should be queued.
    CommitSelection(Vec<Track>),
}

pub(crate) struct TrackTable {
    tracks: Vec<Track>,
    selection: HashSet<String>,
    table_state: TableState,
    /// Number of visible rows, updated on every render.
    page_size: usize,
    /// Shown in place of the table when there are no rows.
    placeholder: &'static str,
}

impl TrackTable {
    pub(crate) fn new(placeholder: &'static str) -> Self {
        Self {
            tracks: vec![],
            selection: HashSet::new(),
            table_state: TableState::new(),
            page_size: 1,
            placeholder,
        }
    }

    /// Replaces the rows, keeping the selection for tracks that are still
    /// present and clamping the current row.
    pub(crate) fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.selection
            .retain(|id| tracks.iter().any(|t| &t.id == id));

        let current = match tracks.len() {
            0 => None,
            len => Some(self.table_state.selected().unwrap_or(0).min(len - 1)),
        };
        self.table_state.select(current);

        self.tracks = tracks;
    }

    pub(crate) fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn selected_index(&self) -> Option<usize> {
        self.table_state
            .selected()
            .filter(|i| *i < self.tracks.len())
    }

    pub(crate) fn selected_track(&self) -> Option<&Track> {
        self.selected_index().and_then(|i| self.tracks.get(i))
    }

    pub(crate) fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// The marked tracks in table order, or the current row if nothing is
    /// marked.
    pub(crate) fn selected_tracks(&self) -> Vec<Track> {
        if self.selection.is_empty() {
            return self.selected_track().cloned().into_iter().collect();
        }

        self.tracks
            .iter()
            .filter(|t| self.selection.contains(&t.id))
            .cloned()
            .collect()
    }

    pub(crate) fn select(&mut self, index: usize) {
        if index < self.tracks.len() {
            self.table_state.select(Some(index));
        }
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn goto_next(&mut self) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 >= len => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn goto_previous(&mut self) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    fn goto_first(&mut self) {
        if !self.tracks.is_empty() {
            self.table_state.select(Some(0));
        }
    }

    fn goto_last(&mut self) {
        if let Some(last) = self.tracks.len().checked_sub(1) {
            self.table_state.select(Some(last));
        }
    }

    // The last row currently on screen.
    fn last_visible(&self) -> usize {
        let offset = self.table_state.offset();
        (offset + self.page_size.max(1) - 1).min(self.tracks.len().saturating_sub(1))
    }

    fn goto_high(&mut self) {
        if !self.tracks.is_empty() {
            let offset = self.table_state.offset().min(self.tracks.len() - 1);
            self.table_state.select(Some(offset));
        }
    }

    fn goto_middle(&mut self) {
        if !self.tracks.is_empty() {
            let offset = self.table_state.offset().min(self.tracks.len() - 1);
            let middle = offset + self.last_visible().saturating_sub(offset) / 2;
            self.table_state.select(Some(middle));
        }
    }

    fn goto_low(&mut self) {
        if !self.tracks.is_empty() {
            self.table_state.select(Some(self.last_visible()));
        }
    }

    fn goto_relative(&mut self, delta: isize) {
        let len = self.tracks.len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let target = current.saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(target));
    }

    fn goto_page_forward(&mut self) {
        self.goto_relative(self.page_size.max(1) as isize);
    }

    fn goto_page_back(&mut self) {
        self.goto_relative(-(self.page_size.max(1) as isize));
    }

    fn goto_half_page_forward(&mut self) {
        self.goto_relative((self.page_size / 2).max(1) as isize);
    }

    fn goto_half_page_back(&mut self) {
        self.goto_relative(-((self.page_size / 2).max(1) as isize));
    }

    fn toggle_select_current(&mut self) {
        if let Some(track) = self.selected_track() {
            let track_id = track.id.clone();
            if !self.selection.insert(track_id.clone()) {
                self.selection.remove(&track_id);
            }
        }
    }

    fn select_all(&mut self) {
        self.selection
            .extend(self.tracks.iter().map(|t| t.id.clone()));
    }

    fn select_inverse(&mut self) {
        for track in &self.tracks {
            if !self.selection.insert(track.id.clone()) {
                self.selection.remove(&track.id);
            }
        }
    }
}
