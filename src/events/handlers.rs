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

use std::time::Instant;

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::{
    App, config,
    events::{MainView, PlaybackCommand},
    model::{Track, search::MIN_SEARCH_LEN},
    tasks::AppTask,
};

pub(super) fn handle_tick(app: &mut App) {
    app.playback.tick(Instant::now());
}

pub(super) fn handle_error(app: &mut App, message: String) {
    error!("{}", message);
    app.playback.raise_notice(message);
}

pub(super) fn handle_set_main_view(app: &mut App, main_view: MainView) {
    app.main_view = main_view;
}

pub(super) fn handle_playback_command(app: &mut App, command: PlaybackCommand) {
    let playback = &mut app.playback;

    match command {
        PlaybackCommand::TogglePause => playback.toggle_pause(),
        PlaybackCommand::Stop => playback.stop(),
        PlaybackCommand::Next => playback.next_track(),
        PlaybackCommand::Previous => playback.prev_track(),
        PlaybackCommand::Seek(delta) => playback.seek(delta),
        PlaybackCommand::SetVolume(volume) => playback.set_volume(volume),
        PlaybackCommand::AdjustVolume(delta) => playback.adjust_volume(delta),
        PlaybackCommand::ToggleMute => playback.toggle_mute(),
        PlaybackCommand::ToggleShuffle => playback.toggle_shuffle(),
        PlaybackCommand::CycleRepeat => playback.cycle_repeat_mode(),
        PlaybackCommand::ToggleAutoplay => playback.toggle_autoplay(),
        PlaybackCommand::SetAdBlock(enabled) => {
            let enabled = enabled.unwrap_or(!playback.ad_block());
            playback.set_ad_block(enabled);
            let state = if enabled { "on" } else { "off" };
            playback.raise_notice(format!("Ad blocking {}", state));
        }
    }

    if matches!(
        command,
        PlaybackCommand::SetVolume(_)
            | PlaybackCommand::AdjustVolume(_)
            | PlaybackCommand::ToggleShuffle
            | PlaybackCommand::CycleRepeat
            | PlaybackCommand::ToggleAutoplay
            | PlaybackCommand::SetAdBlock(_)
    ) {
        save_settings(app);
    }
}

// Copies the persistent playback settings into the configuration and saves it.
fn save_settings(app: &mut App) {
    let modes = app.playback.modes();

    app.config.volume = app.playback.state().volume;
    app.config.shuffle = modes.shuffle;
    app.config.repeat_mode = modes.repeat;
    app.config.autoplay = modes.autoplay;
    app.config.ad_block = app.playback.ad_block();

    if let Err(e) = config::save_config(&app.config) {
        warn!(error = %e, "failed to save configuration");
    }
}

pub(super) fn handle_search(app: &mut App, query: String) -> Result<()> {
    let Some(query) = app.search.begin(&query) else {
        app.playback.raise_notice(format!(
            "Search needs at least {} characters",
            MIN_SEARCH_LEN
        ));
        return Ok(());
    };

    app.task_tx.send(AppTask::Search {
        query,
        limit: app.config.search_limit,
    })?;
    app.main_view = MainView::Search;

    Ok(())
}

pub(super) fn handle_search_results_ready(app: &mut App, query: String, tracks: Vec<Track>) {
    let tracks = app.playback.filter_ads(tracks);

    if app.search.finish(&query, tracks) {
        app.search_view.set_tracks(app.search.tracks().to_vec());
        if app.search.tracks().is_empty() {
            app.playback.raise_notice(format!("Nothing found for {}", query));
        }
    } else {
        debug!(query = %query, "ignoring results for an old search");
    }
}

pub(super) fn handle_search_failed(app: &mut App, query: String, message: String) {
    if app.search.finish(&query, vec![]) {
        app.search_view.set_tracks(vec![]);
        app.playback.raise_notice(message);
    }
}

pub(super) fn handle_add_tracks_to_queue(app: &mut App, tracks: Vec<Track>) {
    let mut count = 0;
    for track in tracks {
        if app.playback.add_to_queue(track) {
            count += 1;
        }
    }

    if count > 0 {
        app.playback.raise_notice(format!("Queued {} tracks", count));
    }
}

pub(super) fn handle_move_queue_item(app: &mut App, from: usize, to: usize) {
    if app.playback.move_queue_item(from, to) {
        app.queue_view.track_table.select(to);
    }
}

pub(super) fn handle_create_playlist(app: &mut App, name: String) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        app.playback.raise_notice("A playlist needs a name");
        return Ok(());
    }

    app.task_tx.send(AppTask::CreatePlaylist(name.to_string()))?;

    Ok(())
}

pub(super) fn handle_import_playlist(
    app: &mut App,
    playlist_id: String,
    name: Option<String>,
) -> Result<()> {
    app.task_tx.send(AppTask::ImportPlaylist { playlist_id, name })?;
    app.playback.raise_notice("Importing playlist...");

    Ok(())
}

pub(super) fn handle_playlist_fetched(app: &mut App, name: String, tracks: Vec<Track>) -> Result<()> {
    app.task_tx
        .send(AppTask::SaveImportedPlaylist { name, tracks })?;

    Ok(())
}

pub(super) fn handle_rename_selected_playlist(app: &mut App, name: String) -> Result<()> {
    let name = name.trim();
    let Some(playlist) = app.playlists_view.selected_playlist() else {
        app.playback.raise_notice("No playlist selected");
        return Ok(());
    };

    if name.is_empty() {
        app.playback.raise_notice("A playlist needs a name");
        return Ok(());
    }

    app.task_tx.send(AppTask::RenamePlaylist {
        playlist_id: playlist.id.clone(),
        name: name.to_string(),
    })?;

    Ok(())
}

pub(super) fn handle_delete_selected_playlist(app: &mut App) -> Result<()> {
    let Some(playlist) = app.playlists_view.selected_playlist() else {
        app.playback.raise_notice("No playlist selected");
        return Ok(());
    };

    app.task_tx
        .send(AppTask::DeletePlaylist(playlist.id.clone()))?;

    Ok(())
}

/// Adds the tracks selected in the current view to the playlist with the
/// given name.
pub(super) fn handle_add_selection_to_playlist(app: &mut App, name: String) -> Result<()> {
    let Some(playlist_id) = app
        .playlists_view
        .find_by_name(&name)
        .map(|playlist| playlist.id.clone())
    else {
        app.playback
            .raise_notice(format!("No playlist named {}", name.trim()));
        return Ok(());
    };

    let tracks = app.selected_tracks();
    if tracks.is_empty() {
        app.playback.raise_notice("Nothing selected");
        return Ok(());
    }

    app.task_tx.send(AppTask::AddToPlaylist {
        playlist_id,
        tracks,
    })?;

    Ok(())
}

pub(super) fn handle_remove_from_playlist(
    app: &mut App,
    playlist_id: String,
    track_id: String,
) -> Result<()> {
    app.task_tx.send(AppTask::RemoveFromPlaylist {
        playlist_id,
        track_id,
    })?;

    Ok(())
}
