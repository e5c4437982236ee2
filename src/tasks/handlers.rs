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

use std::{sync::Arc, thread};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    catalog::{self, Catalog, catalog_url},
    db,
    events::AppEvent,
    model::Track,
    playback::RecommendationPurpose,
    tasks::TaskContext,
};

const IMPORTED_PLAYLIST_NAME: &str = "Imported Playlist";

// Runs a catalog request on its own thread.
fn spawn_request<F>(name: &str, ctx: &TaskContext, f: F) -> Result<()>
where
    F: FnOnce(&dyn Catalog) -> AppEvent + Send + 'static,
{
    let catalog = Arc::clone(ctx.catalog);
    let event_tx = ctx.event_tx.clone();

    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let event = f(catalog.as_ref());
            let _ = event_tx.send(event);
        })
        .with_context(|| format!("Failed to spawn {} thread", name))?;

    Ok(())
}

pub(super) fn search(ctx: &mut TaskContext, query: String, limit: usize) -> Result<()> {
    spawn_request("search", ctx, move |catalog| {
        match catalog.search(&query, limit) {
            Ok(tracks) => {
                info!(query = %query, count = tracks.len(), "search finished");
                AppEvent::SearchResultsReady { query, tracks }
            }
            Err(e) => {
                warn!(query = %query, error = %e, "search failed");
                AppEvent::SearchFailed {
                    query,
                    message: format!("Search failed: {}", e),
                }
            }
        }
    })
}

pub(super) fn resolve_stream(ctx: &mut TaskContext, token: u64, track_id: String) -> Result<()> {
    spawn_request("resolve", ctx, move |catalog| {
        let source = match catalog.resolve_stream_url(&track_id) {
            Ok(url) => url,
            Err(e) => {
                // The engine can usually still play the catalog page itself
                warn!(track_id = %track_id, error = %e, "stream resolution failed, using catalog url");
                catalog_url(&track_id)
            }
        };

        AppEvent::StreamResolved {
            token,
            track_id,
            source,
        }
    })
}

pub(super) fn fetch_recommendations(
    ctx: &mut TaskContext,
    token: u64,
    seed_id: String,
    limit: usize,
    purpose: RecommendationPurpose,
) -> Result<()> {
    spawn_request("recommendations", ctx, move |catalog| {
        let tracks = catalog::get_recommendations(catalog, &seed_id, limit);

        AppEvent::RecommendationsReady {
            token,
            seed_id,
            purpose,
            tracks,
        }
    })
}

pub(super) fn load_history(ctx: &mut TaskContext) -> Result<()> {
    let history = db::fetch_history(ctx.conn)?;
    ctx.event_tx.send(AppEvent::HistoryLoaded(history))?;

    Ok(())
}

pub(super) fn save_history(ctx: &mut TaskContext, history: Vec<Track>) -> Result<()> {
    db::save_history(ctx.conn, &history)?;

    Ok(())
}

pub(super) fn load_playlists(ctx: &mut TaskContext) -> Result<()> {
    let playlists = db::fetch_playlists(ctx.conn)?;
    ctx.event_tx.send(AppEvent::PlaylistsLoaded(playlists))?;

    Ok(())
}

pub(super) fn create_playlist(ctx: &mut TaskContext, name: String) -> Result<()> {
    let playlist = db::create_playlist(ctx.conn, &name)?;
    info!(playlist_id = %playlist.id, name = %name, "playlist created");

    ctx.event_tx
        .send(AppEvent::Notice(format!("Created playlist {}", name)))?;

    load_playlists(ctx)
}

pub(super) fn rename_playlist(ctx: &mut TaskContext, playlist_id: String, name: String) -> Result<()> {
    if !db::rename_playlist(ctx.conn, &playlist_id, &name)? {
        ctx.event_tx
            .send(AppEvent::Notice("Playlist no longer exists".to_string()))?;
    }

    load_playlists(ctx)
}

pub(super) fn delete_playlist(ctx: &mut TaskContext, playlist_id: String) -> Result<()> {
    if db::delete_playlist(ctx.conn, &playlist_id)? {
        info!(playlist_id = %playlist_id, "playlist deleted");
    }

    load_playlists(ctx)
}

pub(super) fn add_to_playlist(
    ctx: &mut TaskContext,
    playlist_id: String,
    tracks: Vec<Track>,
) -> Result<()> {
    let mut added = 0;
    for track in &tracks {
        if db::add_track_to_playlist(ctx.conn, &playlist_id, track)? {
            added += 1;
        }
    }

    let skipped = tracks.len() - added;
    let message = if skipped > 0 {
        format!("Added {} tracks, {} already present", added, skipped)
    } else {
        format!("Added {} tracks", added)
    };
    ctx.event_tx.send(AppEvent::Notice(message))?;

    load_playlists(ctx)
}

pub(super) fn remove_from_playlist(
    ctx: &mut TaskContext,
    playlist_id: String,
    track_id: String,
) -> Result<()> {
    db::remove_track_from_playlist(ctx.conn, &playlist_id, &track_id)?;

    load_playlists(ctx)
}

pub(super) fn import_playlist(
    ctx: &mut TaskContext,
    playlist_id: String,
    name: Option<String>,
) -> Result<()> {
    spawn_request("import", ctx, move |catalog| match catalog.playlist(&playlist_id) {
        Ok(listing) if listing.tracks.is_empty() => {
            warn!(playlist_id = %playlist_id, "imported playlist is empty");
            AppEvent::Notice("Could not fetch playlist or playlist is empty".to_string())
        }
        Ok(listing) => {
            info!(playlist_id = %playlist_id, count = listing.tracks.len(), "playlist fetched");
            let name = name
                .or(listing.title)
                .unwrap_or_else(|| IMPORTED_PLAYLIST_NAME.to_string());
            AppEvent::PlaylistFetched {
                name,
                tracks: listing.tracks,
            }
        }
        Err(e) => {
            warn!(playlist_id = %playlist_id, error = %e, "playlist import failed");
            AppEvent::Notice(format!("Import failed: {}", e))
        }
    })
}

pub(super) fn save_imported_playlist(
    ctx: &mut TaskContext,
    name: String,
    tracks: Vec<Track>,
) -> Result<()> {
    let playlist = db::import_playlist(ctx.conn, &name, &tracks)?;
    info!(playlist_id = %playlist.id, name = %name, count = playlist.tracks.len(), "playlist imported");

    ctx.event_tx.send(AppEvent::Notice(format!(
        "Imported {} tracks into {}",
        playlist.tracks.len(),
        name
    )))?;

    load_playlists(ctx)
}
