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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, such as
//! tracks, playlists and the playback mode flags, representing the data that
//! flows between the catalog, the store and the playback engine.

pub(crate) mod notice;
pub(crate) mod queue;
pub(crate) mod search;

use serde::{Deserialize, Serialize};

/// A single catalog track.
///
/// The identifier is the opaque catalog video id. A duration of zero means
/// the duration is not known yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Track {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) album: Option<String>,
    pub(crate) duration: u64,
    pub(crate) thumbnail: Option<String>,
}

impl Track {
    pub(crate) fn new(id: &str, title: &str, artist: &str, duration: u64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: None,
            duration,
            thumbnail: None,
        }
    }
}

/// A user curated, persisted, list of tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Playlist {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) tracks: Vec<Track>,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// Off, then all, then one, then back to off.
    pub(crate) fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Playback mode flags owned by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Modes {
    pub(crate) autoplay: bool,
    pub(crate) shuffle: bool,
    pub(crate) repeat: RepeatMode,
    /// Set while the queue was filled from recommendations rather than from a
    /// playlist.
    pub(crate) radio: bool,
    /// A reference to the playlist being played, the playlist itself lives in
    /// the store.
    pub(crate) current_playlist_id: Option<String>,
}
