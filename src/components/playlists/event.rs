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

//! Event routing for the playlists view.
//!
//! The playlist pane handles its own list navigation. The tracks pane
//! delegates to the track table, adding removal of a track from the playlist.

use std::sync::mpsc::Sender;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyModifiers};

use crate::{
    components::{PlaylistsView, TrackTableAction, playlists::PlaylistsPane},
    events::{AppEvent, AppEventProcessor},
};

impl AppEventProcessor for PlaylistsView {
    fn process_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<()> {
        let Event::Key(key_event) = event else {
            return Ok(());
        };

        if !key_event.modifiers.contains(KeyModifiers::CONTROL) {
            match key_event.code {
                KeyCode::Char('h') | KeyCode::Left => {
                    self.set_pane(PlaylistsPane::Playlists);
                    return Ok(());
                }
                KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                    self.set_pane(PlaylistsPane::Tracks);
                    return Ok(());
                }
                _ => {}
            }
        }

        match self.active_pane {
            PlaylistsPane::Playlists => self.process_playlists_event(key_event.code, event_tx),
            PlaylistsPane::Tracks => self.process_tracks_event(event, event_tx),
        }
    }
}

impl PlaylistsView {
    fn process_playlists_event(&mut self, code: KeyCode, event_tx: &Sender<AppEvent>) -> Result<()> {
        match code {
            KeyCode::Char('j') | KeyCode::Down => self.next_playlist(),
            KeyCode::Char('k') | KeyCode::Up => self.previous_playlist(),
            KeyCode::Char('g') | KeyCode::Home => self.select_playlist(0),
            KeyCode::Char('G') | KeyCode::End => {
                if let Some(last) = self.playlists.len().checked_sub(1) {
                    self.select_playlist(last);
                }
            }

            KeyCode::Enter => {
                if let Some(playlist) = self.selected_playlist()
                    && !playlist.tracks.is_empty()
                {
                    event_tx.send(AppEvent::PlayTracks {
                        tracks: playlist.tracks.clone(),
                        start_index: 0,
                        playlist_id: Some(playlist.id.clone()),
                    })?;
                }
            }

            KeyCode::Char('a') => {
                if let Some(playlist) = self.selected_playlist()
                    && !playlist.tracks.is_empty()
                {
                    event_tx.send(AppEvent::AddTracksToQueue(playlist.tracks.clone()))?;
                }
            }

            _ => {}
        }

        Ok(())
    }

    fn process_tracks_event(&mut self, event: &Event, event_tx: &Sender<AppEvent>) -> Result<()> {
        let Some(playlist_id) = self.selected_playlist().map(|p| p.id.clone()) else {
            return Ok(());
        };

        if let Event::Key(key_event) = event
            && matches!(key_event.code, KeyCode::Char('d') | KeyCode::Delete)
            && !key_event.modifiers.contains(KeyModifiers::CONTROL)
        {
            if let Some(track) = self.track_table.selected_track() {
                event_tx.send(AppEvent::RemoveFromPlaylist {
                    playlist_id,
                    track_id: track.id.clone(),
                })?;
            }
            return Ok(());
        }

        match self.track_table.process_event(event) {
            Some(TrackTableAction::ActivateCurrent(index)) => {
                event_tx.send(AppEvent::PlayTracks {
                    tracks: self.track_table.tracks().to_vec(),
                    start_index: index,
                    playlist_id: Some(playlist_id),
                })?;
            }

            Some(TrackTableAction::CommitSelection(tracks)) => {
                event_tx.send(AppEvent::AddTracksToQueue(tracks))?;
            }

            None => {}
        }

        Ok(())
    }
}
