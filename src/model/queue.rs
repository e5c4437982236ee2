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

//! Play queue and history management.
//!
//! This module provides state for the upcoming tracks (the queue) and the
//! tracks already played and advanced past (the history). The currently
//! playing track belongs to neither, it is held by the playback orchestrator.

use std::collections::VecDeque;

use rand::{rng, seq::SliceRandom};

use crate::model::Track;

/// Maximum number of history entries that are persisted.
pub(crate) const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Default)]
pub(crate) struct PlayQueue {
    queued: VecDeque<Track>,
    played: Vec<Track>,
}

impl PlayQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub(crate) fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.queued.iter()
    }

    pub(crate) fn contains(&self, track_id: &str) -> bool {
        self.queued.iter().any(|track| track.id == track_id)
    }

    pub(crate) fn add(&mut self, track: Track) {
        self.queued.push_back(track);
    }

    /// Replaces the whole queue, history is left untouched.
    pub(crate) fn replace(&mut self, tracks: Vec<Track>) {
        self.queued = tracks.into();
    }

    pub(crate) fn pop_front(&mut self) -> Option<Track> {
        self.queued.pop_front()
    }

    pub(crate) fn push_front(&mut self, track: Track) {
        self.queued.push_front(track);
    }

    /// Moves the item at `from` so that it ends up at index `to`.
    ///
    /// Returns `false`, leaving the queue untouched, if either index is out of
    /// bounds.
    pub(crate) fn move_item(&mut self, from: usize, to: usize) -> bool {
        let len = self.queued.len();
        if from >= len || to >= len {
            return false;
        }

        if let Some(track) = self.queued.remove(from) {
            self.queued.insert(to, track);
        }

        true
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Track> {
        self.queued.remove(index)
    }

    /// Removes every queued occurrence of the given track.
    pub(crate) fn remove_id(&mut self, track_id: &str) -> usize {
        let before = self.queued.len();
        self.queued.retain(|track| track.id != track_id);
        before - self.queued.len()
    }

    /// Shuffles the queue in place, the previous order is not kept.
    pub(crate) fn shuffle(&mut self) {
        let mut rng = rng();
        let slice = self.queued.make_contiguous();
        slice.shuffle(&mut rng);
    }

    pub(crate) fn clear(&mut self) {
        self.queued.clear();
    }

    pub(crate) fn history(&self) -> &[Track] {
        &self.played
    }

    pub(crate) fn push_history(&mut self, track: Track) {
        self.played.push(track);
    }

    pub(crate) fn pop_history(&mut self) -> Option<Track> {
        self.played.pop()
    }

    pub(crate) fn take_history(&mut self) -> Vec<Track> {
        std::mem::take(&mut self.played)
    }

    pub(crate) fn set_history(&mut self, tracks: Vec<Track>) {
        self.played = tracks;
    }

    /// The most recent history entries, at most [`HISTORY_LIMIT`] of them.
    pub(crate) fn persisted_history(&self) -> Vec<Track> {
        let skip = self.played.len().saturating_sub(HISTORY_LIMIT);
        self.played[skip..].to_vec()
    }
}
