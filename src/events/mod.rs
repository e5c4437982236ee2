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

//! Application events and the main event loop.
//!
//! Every thread in the application, the input and tick threads, the audio
//! worker, the task worker, downloads and timers, reports to the main thread
//! by sending an [`AppEvent`] on a single channel. The main thread owns all
//! application state, so the handlers here can mutate it freely without any
//! locking.
//!
//! # Organization
//!
//! * [`handlers`]: One function per event, applying it to the [`App`].
//! * [`key_handlers`]: Keyboard input routing.

mod handlers;
mod key_handlers;

use handlers::*;

use std::{io::Stdout, sync::mpsc::Sender};

use anyhow::Result;
use crossterm::event::{Event, KeyEvent};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tracing::info;

use crate::{
    App,
    model::{Playlist, Track},
    playback::RecommendationPurpose,
    player::PlayerEvent,
    render::draw,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MainView {
    Queue,
    Search,
    Playlists,
    History,
}

/// Playback control requested from the keyboard or the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PlaybackCommand {
    TogglePause,
    Stop,
    Next,
    Previous,
    Seek(f64),
    SetVolume(u8),
    AdjustVolume(i16),
    ToggleMute,
    ToggleShuffle,
    CycleRepeat,
    ToggleAutoplay,
    SetAdBlock(Option<bool>),
}

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),
    Tick,
    ExitApplication,

    Error(String),
    Notice(String),

    SetMainView(MainView),
    Playback(PlaybackCommand),

    /// An engine event about the file loaded by the `play` call with the
    /// given generation.
    Player {
        generation: u64,
        event: PlayerEvent,
    },
    DownloadFinished {
        track_id: String,
        ticket: u64,
        success: bool,
    },
    StreamResolved {
        token: u64,
        track_id: String,
        source: String,
    },
    RecommendationsReady {
        token: u64,
        seed_id: String,
        purpose: RecommendationPurpose,
        tracks: Vec<Track>,
    },
    LoadingTimeout(u64),
    AdvanceTimeout(u64),

    Search(String),
    SearchResultsReady {
        query: String,
        tracks: Vec<Track>,
    },
    SearchFailed {
        query: String,
        message: String,
    },

    /// Plays a track picked by hand, filling an empty queue with
    /// recommendations.
    PlayTrack(Track),
    PlayTracks {
        tracks: Vec<Track>,
        start_index: usize,
        playlist_id: Option<String>,
    },
    PlayQueueItem(usize),

    AddTracksToQueue(Vec<Track>),
    RemoveFromQueue(usize),
    MoveQueueItem {
        from: usize,
        to: usize,
    },
    ClearQueue,

    HistoryLoaded(Vec<Track>),
    PlaylistsLoaded(Vec<Playlist>),

    CreatePlaylist(String),
    RenameSelectedPlaylist(String),
    DeleteSelectedPlaylist,
    AddSelectionToPlaylist(String),
    RemoveFromPlaylist {
        playlist_id: String,
        track_id: String,
    },
    /// Imports the catalog playlist `playlist_id`, optionally under a name
    /// of our own.
    ImportPlaylist {
        playlist_id: String,
        name: Option<String>,
    },
    PlaylistFetched {
        name: String,
        tracks: Vec<Track>,
    },
}

/// Implemented by the views to translate keyboard input into application
/// events.
pub(crate) trait AppEventProcessor {
    fn process_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<()>;
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received or the event channel
/// is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    while let Ok(event) = app.event_rx.recv() {
        if matches!(event, AppEvent::ExitApplication) {
            info!("exit requested");
            break;
        }

        dispatch(app, event)?;

        app.sync_views();
        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}

fn dispatch(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => key_handlers::process_key_event(app, key)?,
        AppEvent::Tick => handle_tick(app),
        AppEvent::ExitApplication => {}

        AppEvent::Error(message) => handle_error(app, message),
        AppEvent::Notice(message) => app.playback.raise_notice(message),

        AppEvent::SetMainView(view) => handle_set_main_view(app, view),
        AppEvent::Playback(command) => handle_playback_command(app, command),

        AppEvent::Player { generation, event } => app.playback.on_player_event(generation, event),
        AppEvent::DownloadFinished {
            track_id,
            ticket,
            success,
        } => app.playback.on_download_finished(&track_id, ticket, success),
        AppEvent::StreamResolved {
            token,
            track_id,
            source,
        } => app.playback.on_stream_resolved(token, &track_id, source),
        AppEvent::RecommendationsReady {
            token,
            seed_id,
            purpose,
            tracks,
        } => app
            .playback
            .on_recommendations(token, &seed_id, purpose, tracks),
        AppEvent::LoadingTimeout(token) => app.playback.on_loading_timeout(token),
        AppEvent::AdvanceTimeout(advance) => app.playback.on_advance_timeout(advance),

        AppEvent::Search(query) => handle_search(app, query)?,
        AppEvent::SearchResultsReady { query, tracks } => {
            handle_search_results_ready(app, query, tracks)
        }
        AppEvent::SearchFailed { query, message } => handle_search_failed(app, query, message),

        AppEvent::PlayTrack(track) => app.playback.play_song(track, true),
        AppEvent::PlayTracks {
            tracks,
            start_index,
            playlist_id,
        } => app.playback.play_playlist(tracks, start_index, playlist_id),
        AppEvent::PlayQueueItem(index) => app.playback.play_queue_item(index),

        AppEvent::AddTracksToQueue(tracks) => handle_add_tracks_to_queue(app, tracks),
        AppEvent::RemoveFromQueue(index) => {
            app.playback.remove_from_queue(index);
        }
        AppEvent::MoveQueueItem { from, to } => handle_move_queue_item(app, from, to),
        AppEvent::ClearQueue => app.playback.clear_queue(),

        AppEvent::HistoryLoaded(history) => app.playback.restore_history(history),
        AppEvent::PlaylistsLoaded(playlists) => app.playlists_view.set_playlists(playlists),

        AppEvent::CreatePlaylist(name) => handle_create_playlist(app, name)?,
        AppEvent::RenameSelectedPlaylist(name) => handle_rename_selected_playlist(app, name)?,
        AppEvent::DeleteSelectedPlaylist => handle_delete_selected_playlist(app)?,
        AppEvent::AddSelectionToPlaylist(name) => handle_add_selection_to_playlist(app, name)?,
        AppEvent::RemoveFromPlaylist {
            playlist_id,
            track_id,
        } => handle_remove_from_playlist(app, playlist_id, track_id)?,
        AppEvent::ImportPlaylist { playlist_id, name } => {
            handle_import_playlist(app, playlist_id, name)?
        }
        AppEvent::PlaylistFetched { name, tracks } => handle_playlist_fetched(app, name, tracks)?,
    }

    Ok(())
}
