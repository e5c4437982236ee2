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

use std::sync::mpsc::{self, Receiver, Sender};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use super::*;
use crate::{
    events::{AppEvent, AppEventProcessor},
    model::Track,
};

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn playlist(id: &str, name: &str, track_ids: &[&str]) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        tracks: track_ids
            .iter()
            .map(|t| Track::new(t, &format!("Song {t}"), "Artist", 150))
            .collect(),
        created_at: 0,
        updated_at: 0,
    }
}

fn view() -> (PlaylistsView, Sender<AppEvent>, Receiver<AppEvent>) {
    let (event_tx, event_rx) = mpsc::channel();
    let mut view = PlaylistsView::new();
    view.set_playlists(vec![
        playlist("p1", "Focus", &["a", "b"]),
        playlist("p2", "Road Trip", &["c", "d", "e"]),
    ]);
    (view, event_tx, event_rx)
}

#[test]
fn highlighted_playlist_survives_a_reload() {
    let (mut view, event_tx, _event_rx) = view();
    view.process_event(&key(KeyCode::Char('j')), &event_tx).unwrap();
    assert_eq!(view.selected_playlist().map(|p| p.id.as_str()), Some("p2"));

    // A new playlist sorts first
    view.set_playlists(vec![
        playlist("p0", "Acoustic", &[]),
        playlist("p1", "Focus", &["a", "b"]),
        playlist("p2", "Road Trip", &["c", "d", "e"]),
    ]);

    assert_eq!(view.selected_playlist().map(|p| p.id.as_str()), Some("p2"));
    assert_eq!(view.track_table.tracks().len(), 3);
}

#[test]
fn deleting_the_highlighted_playlist_clamps() {
    let (mut view, event_tx, _event_rx) = view();
    view.process_event(&key(KeyCode::Char('j')), &event_tx).unwrap();

    view.set_playlists(vec![playlist("p1", "Focus", &["a", "b"])]);
    assert_eq!(view.selected_playlist().map(|p| p.id.as_str()), Some("p1"));

    view.set_playlists(vec![]);
    assert!(view.selected_playlist().is_none());
    assert!(view.track_table.tracks().is_empty());
}

#[test]
fn names_match_ignoring_case_and_whitespace() {
    let (view, _event_tx, _event_rx) = view();

    assert_eq!(view.find_by_name("  road trip ").map(|p| p.id.as_str()), Some("p2"));
    assert!(view.find_by_name("Road").is_none());
}

#[test]
fn enter_plays_the_whole_playlist() {
    let (mut view, event_tx, event_rx) = view();

    view.process_event(&key(KeyCode::Enter), &event_tx).unwrap();

    match event_rx.try_recv() {
        Ok(AppEvent::PlayTracks {
            tracks,
            start_index,
            playlist_id,
        }) => {
            assert_eq!(tracks.len(), 2);
            assert_eq!(start_index, 0);
            assert_eq!(playlist_id.as_deref(), Some("p1"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn tracks_pane_plays_from_the_current_track() {
    let (mut view, event_tx, event_rx) = view();

    view.process_event(&key(KeyCode::Char('l')), &event_tx).unwrap();
    assert_eq!(view.active_pane, PlaylistsPane::Tracks);

    view.process_event(&key(KeyCode::Char('j')), &event_tx).unwrap();
    view.process_event(&key(KeyCode::Enter), &event_tx).unwrap();

    match event_rx.try_recv() {
        Ok(AppEvent::PlayTracks { start_index, .. }) => assert_eq!(start_index, 1),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn delete_in_tracks_pane_removes_from_playlist() {
    let (mut view, event_tx, event_rx) = view();

    view.process_event(&key(KeyCode::Right), &event_tx).unwrap();
    view.process_event(&key(KeyCode::Char('d')), &event_tx).unwrap();

    match event_rx.try_recv() {
        Ok(AppEvent::RemoveFromPlaylist {
            playlist_id,
            track_id,
        }) => {
            assert_eq!(playlist_id, "p1");
            assert_eq!(track_id, "a");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn tracks_pane_needs_a_playlist() {
    let (event_tx, _event_rx) = mpsc::channel();
    let mut view = PlaylistsView::new();

    view.process_event(&key(KeyCode::Char('l')), &event_tx).unwrap();

    assert_eq!(view.active_pane, PlaylistsPane::Playlists);
}
