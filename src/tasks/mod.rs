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

//! Asynchronous application task processing.
//!
//! This module implements the command pattern used to offload tasks such as
//! potentially blocking database queries and catalog requests from the main UI
//! thread. It provides a dedicated worker loop that translates [`AppTask`]
//! requests into database and catalog operations and broadcasts the results
//! back to the application via [`AppEvent`]s.
//!
//! Database tasks run on the worker itself, one after the other, so writes are
//! applied in the order they were issued. Catalog requests can take many
//! seconds, each of those runs on a thread of its own so that a slow search
//! never holds up stream resolution for the next track.
//!
//! Only actions that may block, or may take more than a trivial amount of time
//! to process, should be implemented as tasks. Other actions are likely more
//! suited to by events.

mod handlers;

use std::{
    sync::{
        Arc,
        mpsc::{Receiver, Sender},
    },
    thread,
};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, error};

use crate::{
    catalog::Catalog, events::AppEvent, model::Track, playback::RecommendationPurpose,
};

#[derive(Debug)]
pub(crate) enum AppTask {
    Search {
        query: String,
        limit: usize,
    },

    /// Resolves the audio source for the track loading under `token`.
    ResolveStream {
        token: u64,
        track_id: String,
    },

    FetchRecommendations {
        token: u64,
        seed_id: String,
        limit: usize,
        purpose: RecommendationPurpose,
    },

    LoadHistory,
    SaveHistory(Vec<Track>),

    LoadPlaylists,
    CreatePlaylist(String),
    RenamePlaylist {
        playlist_id: String,
        name: String,
    },
    DeletePlaylist(String),
    AddToPlaylist {
        playlist_id: String,
        tracks: Vec<Track>,
    },
    RemoveFromPlaylist {
        playlist_id: String,
        track_id: String,
    },

    /// Fetches a catalog playlist, to be saved as a local playlist named
    /// `name` or, failing that, after the catalog's own title.
    ImportPlaylist {
        playlist_id: String,
        name: Option<String>,
    },
    SaveImportedPlaylist {
        name: String,
        tracks: Vec<Track>,
    },
}

/// Spawns a background thread to process application tasks.
///
/// The worker owns the database connection and enters a blocking loop,
/// listening for incoming [`AppTask`]s until every sender has gone.
///
/// # Arguments
///
/// * `conn` - The open database connection.
/// * `catalog` - The catalog used for searches, streams and recommendations.
/// * `task_rx` - The receiving end of the task channel.
/// * `event_tx` - The sending end of the channel for broadcasting results.
///
/// # Errors
///
/// Returns an error if the worker thread cannot be spawned.
pub(crate) fn spawn_task_worker(
    conn: Connection,
    catalog: Arc<dyn Catalog>,
    task_rx: Receiver<AppTask>,
    event_tx: Sender<AppEvent>,
) -> Result<()> {
    thread::Builder::new()
        .name("task-worker".to_string())
        .spawn(move || {
            let mut conn = conn;

            while let Ok(task) = task_rx.recv() {
                let mut ctx = TaskContext {
                    catalog: &catalog,
                    event_tx: &event_tx,
                    conn: &mut conn,
                };

                if let Err(e) = handle_task(task, &mut ctx) {
                    error!(error = %format!("{:#}", e), "task failed");
                    let _ = event_tx.send(AppEvent::Error(format!("{:#}", e)));
                }
            }

            debug!("task worker finished");
        })
        .context("Failed to spawn task worker")?;

    Ok(())
}

/// Bundles shared resources required by task handlers to simplify resource
/// passing when invoking those handler functions.
struct TaskContext<'a> {
    catalog: &'a Arc<dyn Catalog>,
    event_tx: &'a Sender<AppEvent>,
    conn: &'a mut Connection,
}

/// Orchestrates the execution of a single task.
///
/// This function implements the logic for each task and sends the result back
/// through the application event channel.
fn handle_task(task: AppTask, ctx: &mut TaskContext) -> Result<()> {
    match task {
        AppTask::Search { query, limit } => handlers::search(ctx, query, limit),
        AppTask::ResolveStream { token, track_id } => handlers::resolve_stream(ctx, token, track_id),
        AppTask::FetchRecommendations {
            token,
            seed_id,
            limit,
            purpose,
        } => handlers::fetch_recommendations(ctx, token, seed_id, limit, purpose),

        AppTask::LoadHistory => handlers::load_history(ctx),
        AppTask::SaveHistory(history) => handlers::save_history(ctx, history),

        AppTask::LoadPlaylists => handlers::load_playlists(ctx),
        AppTask::CreatePlaylist(name) => handlers::create_playlist(ctx, name),
        AppTask::RenamePlaylist { playlist_id, name } => {
            handlers::rename_playlist(ctx, playlist_id, name)
        }
        AppTask::DeletePlaylist(playlist_id) => handlers::delete_playlist(ctx, playlist_id),
        AppTask::AddToPlaylist {
            playlist_id,
            tracks,
        } => handlers::add_to_playlist(ctx, playlist_id, tracks),
        AppTask::RemoveFromPlaylist {
            playlist_id,
            track_id,
        } => handlers::remove_from_playlist(ctx, playlist_id, track_id),
        AppTask::ImportPlaylist { playlist_id, name } => {
            handlers::import_playlist(ctx, playlist_id, name)
        }
        AppTask::SaveImportedPlaylist { name, tracks } => {
            handlers::save_imported_playlist(ctx, name, tracks)
        }
    }
}

#[cfg(test)]
mod tests;
