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

//! A [`Catalog`] backed by the `yt-dlp` command line tool.
//!
//! Listings are requested with `--dump-json --flat-playlist`, which prints one
//! JSON object per line. Lines that fail to parse are skipped.

use std::{process::Command, time::Duration};

use serde::Deserialize;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError, PlaylistListing},
    model::Track,
    util::process::{self, ProcessOutput},
};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(15);
const MIX_TIMEOUT: Duration = Duration::from_secs(15);
const PLAYLIST_TIMEOUT: Duration = Duration::from_secs(60);

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// The generic catalog page for a track.
///
/// The audio engine can resolve this itself, so it doubles as the fallback
/// source when stream resolution fails.
pub(crate) fn catalog_url(track_id: &str) -> String {
    format!("https://music.youtube.com/watch?v={}", track_id)
}

fn mix_url(seed_id: &str) -> String {
    format!(
        "https://www.youtube.com/watch?v={}&list=RD{}",
        seed_id, seed_id
    )
}

fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

pub(crate) struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub(crate) fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    fn run(&self, args: &[&str], timeout: Duration) -> Result<ProcessOutput, CatalogError> {
        debug!(binary = %self.binary, ?args, "running catalog helper");

        let output = process::run(Command::new(&self.binary).args(args), timeout, None)?;

        Ok(output)
    }
}

impl Catalog for YtDlp {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let search = format!("ytsearch{}:{} music", limit, query);
        let output = self.run(
            &[
                &search,
                "--dump-json",
                "--flat-playlist",
                "--no-warnings",
                "--quiet",
            ],
            SEARCH_TIMEOUT,
        )?;

        let tracks = parse_entries(&output.stdout);

        // A partial listing is still useful, only fail if nothing came back.
        if !output.status.success() && tracks.is_empty() {
            return Err(CatalogError::Failed {
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(tracks)
    }

    fn resolve_stream_url(&self, track_id: &str) -> Result<String, CatalogError> {
        let url = catalog_url(track_id);
        let output = self.run(
            &["-f", "bestaudio", "-g", "--no-warnings", "--quiet", &url],
            RESOLVE_TIMEOUT,
        )?;

        if !output.status.success() {
            return Err(CatalogError::Failed {
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| CatalogError::NoStream(track_id.to_string()))
    }

    fn mix(&self, seed_id: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        let url = mix_url(seed_id);
        let end = limit.to_string();
        let output = self.run(
            &[
                &url,
                "--dump-json",
                "--flat-playlist",
                "--no-warnings",
                "--quiet",
                "--playlist-end",
                &end,
            ],
            MIX_TIMEOUT,
        )?;

        let tracks = parse_entries(&output.stdout);

        if !output.status.success() && tracks.is_empty() {
            return Err(CatalogError::Failed {
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(tracks)
    }

    fn playlist(&self, playlist_id: &str) -> Result<PlaylistListing, CatalogError> {
        let url = playlist_url(playlist_id);
        let output = self.run(
            &[
                &url,
                "--dump-json",
                "--flat-playlist",
                "--no-warnings",
                "--quiet",
            ],
            PLAYLIST_TIMEOUT,
        )?;

        let listing = parse_listing(&output.stdout);

        if !output.status.success() && listing.tracks.is_empty() {
            return Err(CatalogError::Failed {
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(listing)
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    playlist_title: Option<String>,
    id: Option<String>,
    url: Option<String>,
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    album: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    thumbnails: Option<Vec<Thumbnail>>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

impl Entry {
    fn into_track(self) -> Option<Track> {
        let id = self.id.or(self.url).filter(|id| !id.is_empty())?;

        Some(Track {
            id,
            title: self.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: self
                .channel
                .or(self.uploader)
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            album: self.album,
            duration: parse_duration(self.duration),
            thumbnail: self
                .thumbnail
                .or_else(|| self.thumbnails.into_iter().flatten().find_map(|t| t.url)),
        })
    }
}

// Whole, positive, seconds; anything else means unknown.
fn parse_duration(value: Option<f64>) -> u64 {
    match value {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => seconds.floor() as u64,
        _ => 0,
    }
}

/// Parses `--dump-json` output, one JSON object per line.
fn parse_entries(stdout: &str) -> Vec<Track> {
    parse_listing(stdout).tracks
}

/// As [`parse_entries`], also picking up the playlist title every entry of
/// a playlist listing carries.
fn parse_listing(stdout: &str) -> PlaylistListing {
    let mut listing = PlaylistListing::default();

    let entries = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Entry>(line).ok());
    for mut entry in entries {
        if listing.title.is_none() {
            listing.title = entry.playlist_title.take().filter(|t| !t.is_empty());
        }
        listing.tracks.extend(entry.into_track());
    }

    listing
}
