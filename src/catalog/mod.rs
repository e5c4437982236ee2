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

//! The external music catalog.
//!
//! The catalog answers four questions: which tracks match a search, where
//! the audio stream of a track can be fetched from, which tracks are
//! related to a given track and what a published playlist holds. Every call
//! blocks, so callers run them on the task worker, never on the UI thread.

mod ytdlp;

pub(crate) use ytdlp::{YtDlp, catalog_url};

use thiserror::Error;
use tracing::{info, warn};

use crate::{model::Track, util::process::ProcessError};

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("catalog helper exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("no stream url returned for {0}")]
    NoStream(String),
}

pub(crate) trait Catalog: Send + Sync {
    /// Searches the catalog, returning at most `limit` tracks.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError>;

    /// Resolves a direct, playable, audio stream url for a track.
    fn resolve_stream_url(&self, track_id: &str) -> Result<String, CatalogError>;

    /// Lists the catalog's generated mix for a seed track, which usually
    /// includes the seed itself.
    fn mix(&self, seed_id: &str, limit: usize) -> Result<Vec<Track>, CatalogError>;

    /// Lists the tracks of a published catalog playlist.
    fn playlist(&self, playlist_id: &str) -> Result<PlaylistListing, CatalogError>;
}

/// The contents of a catalog playlist.
#[derive(Debug, Default)]
pub(crate) struct PlaylistListing {
    pub(crate) title: Option<String>,
    pub(crate) tracks: Vec<Track>,
}

/// Extracts the playlist id from the `list` query parameter of a playlist
/// url.
pub(crate) fn playlist_id(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    query
        .split(['&', '#'])
        .find_map(|pair| pair.strip_prefix("list="))
        .map(|value| {
            let end = value
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(value.len());
            &value[..end]
        })
        .filter(|id| !id.is_empty())
}

/// Fetches up to `limit` tracks related to the seed track.
///
/// The seed itself is never part of the result. Failures are logged and
/// produce an empty list, a missing recommendation must never get in the way
/// of playback.
pub(crate) fn get_recommendations(catalog: &dyn Catalog, seed_id: &str, limit: usize) -> Vec<Track> {
    match catalog.mix(seed_id, limit + 1) {
        Ok(tracks) => {
            let tracks: Vec<Track> = tracks
                .into_iter()
                .filter(|track| track.id != seed_id)
                .take(limit)
                .collect();
            info!(seed_id, count = tracks.len(), "fetched recommendations");
            tracks
        }
        Err(e) => {
            warn!(seed_id, error = %e, "recommendation fetch failed");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCatalog {
        mix: Result<Vec<Track>, ()>,
    }

    impl Catalog for FixedCatalog {
        fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Track>, CatalogError> {
            Ok(vec![])
        }

        fn resolve_stream_url(&self, track_id: &str) -> Result<String, CatalogError> {
            Err(CatalogError::NoStream(track_id.to_string()))
        }

        fn mix(&self, _seed_id: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
            match &self.mix {
                Ok(tracks) => Ok(tracks.iter().take(limit).cloned().collect()),
                Err(()) => Err(CatalogError::Failed {
                    status: "exit status: 1".to_string(),
                    stderr: "boom".to_string(),
                }),
            }
        }

        fn playlist(&self, _playlist_id: &str) -> Result<PlaylistListing, CatalogError> {
            Ok(PlaylistListing::default())
        }
    }

    fn track(id: &str) -> Track {
        Track::new(id, id, "artist", 200)
    }

    #[test]
    fn recommendations_exclude_the_seed() {
        let catalog = FixedCatalog {
            mix: Ok(vec![track("seed"), track("a"), track("b"), track("c")]),
        };

        let tracks = get_recommendations(&catalog, "seed", 2);
        let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn recommendations_truncate_when_seed_absent() {
        let catalog = FixedCatalog {
            mix: Ok(vec![track("a"), track("b"), track("c"), track("d")]),
        };

        let tracks = get_recommendations(&catalog, "seed", 2);
        assert_eq!(tracks.len(), 2);
    }

    #[test]
    fn recommendation_failure_is_empty() {
        let catalog = FixedCatalog { mix: Err(()) };
        assert!(get_recommendations(&catalog, "seed", 10).is_empty());
    }

    #[test]
    fn playlist_id_from_urls() {
        assert_eq!(
            playlist_id("https://www.youtube.com/playlist?list=PLabc_123-x"),
            Some("PLabc_123-x")
        );
        assert_eq!(
            playlist_id("https://music.youtube.com/watch?v=abc&list=RDabc&index=2"),
            Some("RDabc")
        );
        assert_eq!(
            playlist_id("https://www.youtube.com/playlist?list=PLx%20y"),
            Some("PLx")
        );
        assert_eq!(playlist_id("https://www.youtube.com/watch?v=abc"), None);
        assert_eq!(playlist_id("https://www.youtube.com/watch?v=abc&playlist=PLx"), None);
        assert_eq!(playlist_id("https://www.youtube.com/playlist?list="), None);
        assert_eq!(playlist_id("list=PLabc"), None);
    }
}
