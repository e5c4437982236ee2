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

//! Keyboard input routing.
//!
//! A key goes to the command line first if it is open, then to the active
//! view, and finally to the global key map. The views and the global map use
//! disjoint keys, so a key is only ever acted on once.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::{
    App,
    events::{AppEvent, AppEventProcessor, MainView, PlaybackCommand},
};

const FINE_VOLUME_DELTA: i16 = 1;
const VOLUME_DELTA: i16 = 5;

const FINE_SEEK_DELTA: f64 = 5.0;
const SEEK_DELTA: f64 = 20.0;

/// Maps keyboard input to application actions and playback commands.
///
/// This function acts as the primary input router for the TUI, translating
/// low-level [`KeyEvent`]s into high-level domain logic. It handles:
///
/// * **Application Control**: Life-cycle events like exiting the program.
/// * **Navigation**: Switching between the queue, search, playlists and
///   history views, and moving within them.
/// * **Playback**: Controlling the audio engine (play, pause, seek, volume)
///   and the playback modes.
///
/// # Arguments
///
/// * `app` - A mutable reference to the application state.
/// * `key` - The key event captured from the terminal backend.
///
/// # Errors
///
/// Returns an error if an event fails to send.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    let event = Event::Key(key);

    if app.commander.handle_event(&event, &app.event_tx) {
        return Ok(());
    }

    match app.main_view {
        MainView::Queue => app.queue_view.process_event(&event, &app.event_tx)?,
        MainView::Search => app.search_view.process_event(&event, &app.event_tx)?,
        MainView::Playlists => app.playlists_view.process_event(&event, &app.event_tx)?,
        MainView::History => app.history_view.process_event(&event, &app.event_tx)?,
    }

    process_global_key_event(app, key)
}

fn process_global_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.event_tx.send(AppEvent::ExitApplication)?;
        }
        return Ok(());
    }

    let event = match key.code {
        KeyCode::Char('q') => AppEvent::ExitApplication,

        KeyCode::Char('1') => AppEvent::SetMainView(MainView::Queue),
        KeyCode::Char('2') => AppEvent::SetMainView(MainView::Search),
        KeyCode::Char('3') => AppEvent::SetMainView(MainView::Playlists),
        KeyCode::Char('4') => AppEvent::SetMainView(MainView::History),

        KeyCode::Char('/') => {
            app.commander.open_with("search ");
            return Ok(());
        }

        KeyCode::Char(' ') => AppEvent::Playback(PlaybackCommand::TogglePause),
        KeyCode::Char('s') => AppEvent::Playback(PlaybackCommand::Stop),
        KeyCode::Char('n') => AppEvent::Playback(PlaybackCommand::Next),
        KeyCode::Char('b') => AppEvent::Playback(PlaybackCommand::Previous),

        KeyCode::Char(',') => AppEvent::Playback(PlaybackCommand::Seek(-FINE_SEEK_DELTA)),
        KeyCode::Char('.') => AppEvent::Playback(PlaybackCommand::Seek(FINE_SEEK_DELTA)),
        KeyCode::Char('<') => AppEvent::Playback(PlaybackCommand::Seek(-SEEK_DELTA)),
        KeyCode::Char('>') => AppEvent::Playback(PlaybackCommand::Seek(SEEK_DELTA)),

        KeyCode::Char('-') => AppEvent::Playback(PlaybackCommand::AdjustVolume(-FINE_VOLUME_DELTA)),
        KeyCode::Char('=') => AppEvent::Playback(PlaybackCommand::AdjustVolume(FINE_VOLUME_DELTA)),
        KeyCode::Char('_') => AppEvent::Playback(PlaybackCommand::AdjustVolume(-VOLUME_DELTA)),
        KeyCode::Char('+') => AppEvent::Playback(PlaybackCommand::AdjustVolume(VOLUME_DELTA)),
        KeyCode::Char('m') => AppEvent::Playback(PlaybackCommand::ToggleMute),

        KeyCode::Char('z') => AppEvent::Playback(PlaybackCommand::ToggleShuffle),
        KeyCode::Char('r') => AppEvent::Playback(PlaybackCommand::CycleRepeat),
        KeyCode::Char('A') => AppEvent::Playback(PlaybackCommand::ToggleAutoplay),

        KeyCode::Char('C') => AppEvent::ClearQueue,

        _ => return Ok(()),
    };

    app.event_tx.send(event)?;

    Ok(())
}
