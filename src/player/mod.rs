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

//! Audio playback control and state management.
//!
//! This module provides the high-level [`AudioPlayer`] interface used by the
//! playback orchestrator to control the audio engine. It manages a background
//! worker thread that owns the single MPV instance, ensuring that engine
//! operations do not block the main application thread.
//!
//! The orchestrator only ever sees the [`AudioControl`] trait, engine
//! lifecycle changes come back as [`PlayerEvent`]s on the application event
//! channel. Every event is tagged with the generation of the `play` call that
//! loaded the file it is about, so events of a replaced file can be told
//! apart from those of its successor.

mod commands;
pub(crate) mod lifecycle;

use std::sync::{
    Arc, Mutex,
    mpsc::{self, Sender},
};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::{
    events::AppEvent,
    player::{commands::AudioPlayerCommand, lifecycle::clamp_position},
};

/// Normalised engine lifecycle events.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlayerEvent {
    Started,
    Stopped,
    Paused,
    Resumed,
    /// The current file played to its end, sent once per file.
    SongEnd,
    Progress {
        position: f64,
        duration: Option<f64>,
    },
    VolumeChanged(u8),
}

/// Snapshot of the engine state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct EngineState {
    pub(crate) playing: bool,
    /// Whole seconds, for display.
    pub(crate) position: u64,
    pub(crate) precise_position: f64,
    pub(crate) duration: Option<f64>,
    pub(crate) volume: u8,
    /// Between issuing a load and the engine confirming playback started.
    pub(crate) transitioning: bool,
}

impl EngineState {
    fn set_position(&mut self, position: f64) {
        self.precise_position = position;
        self.position = position as u64;
    }
}

/// Control surface of the audio engine.
///
/// Apart from [`AudioControl::play`] every operation is best effort, there
/// may well be nothing loaded to pause or seek.
pub(crate) trait AudioControl {
    /// Stops anything playing and loads `source`.
    ///
    /// Returning only means the load was issued, [`PlayerEvent::Started`]
    /// reports when audio actually begins. Events about this file carry
    /// `generation` until the next call.
    fn play(&mut self, source: &str, known_duration: Option<f64>, generation: u64) -> Result<()>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    /// Seeks relative to the current position.
    fn seek(&mut self, delta: f64);

    fn set_volume(&mut self, volume: u8);

    fn set_muted(&mut self, muted: bool);

    /// Loops the current file indefinitely, used for repeat one.
    fn set_loop(&mut self, enabled: bool);

    fn state(&self) -> EngineState;
}

/// A handle to the audio playback engine.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but instead sends instructions to a background worker thread. If
/// the engine could not be initialised there is no worker, and every
/// operation does nothing.
pub(crate) struct AudioPlayer {
    /// Channel for sending commands to the background worker thread.
    command_tx: Option<Sender<AudioPlayerCommand>>,
    shared: Arc<Mutex<EngineState>>,
}

impl AudioPlayer {
    /// Spawns the audio worker thread and returns a new player handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send engine events back to the main event
    ///   loop.
    /// * `volume` - The initial volume.
    pub(crate) fn new(event_tx: Sender<AppEvent>, volume: u8) -> Self {
        let shared = Arc::new(Mutex::new(EngineState {
            volume,
            ..EngineState::default()
        }));

        let (command_tx, command_rx) = mpsc::channel::<AudioPlayerCommand>();

        match commands::spawn_player_worker(command_rx, event_tx, Arc::clone(&shared), volume) {
            Ok(()) => {
                info!("audio engine started");
                Self {
                    command_tx: Some(command_tx),
                    shared,
                }
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "audio engine unavailable, playback is silent");
                Self::silent(volume)
            }
        }
    }

    /// A player without an engine.
    pub(crate) fn silent(volume: u8) -> Self {
        Self {
            command_tx: None,
            shared: Arc::new(Mutex::new(EngineState {
                volume,
                ..EngineState::default()
            })),
        }
    }

    pub(crate) fn is_silent(&self) -> bool {
        self.command_tx.is_none()
    }

    fn send(&self, command: AudioPlayerCommand) {
        if let Some(command_tx) = &self.command_tx {
            if command_tx.send(command).is_err() {
                debug!("audio worker has gone away");
            }
        }
    }

    fn update_state(&self, f: impl FnOnce(&mut EngineState)) {
        if let Ok(mut state) = self.shared.lock() {
            f(&mut state);
        }
    }
}

impl AudioControl for AudioPlayer {
    fn play(&mut self, source: &str, known_duration: Option<f64>, generation: u64) -> Result<()> {
        let known_duration = known_duration.filter(|d| *d > 0.0);

        self.update_state(|state| {
            state.playing = false;
            state.set_position(0.0);
            state.duration = known_duration;
            state.transitioning = true;
        });

        if let Some(command_tx) = &self.command_tx {
            command_tx
                .send(AudioPlayerCommand::Play {
                    source: source.to_string(),
                    known_duration,
                    generation,
                })
                .context("Failed to send play command to audio worker")?;
        }

        Ok(())
    }

    fn pause(&mut self) {
        self.send(AudioPlayerCommand::Pause);
    }

    fn resume(&mut self) {
        self.send(AudioPlayerCommand::Resume);
    }

    fn stop(&mut self) {
        self.update_state(|state| {
            state.playing = false;
            state.transitioning = false;
        });
        self.send(AudioPlayerCommand::Stop);
    }

    fn seek(&mut self, delta: f64) {
        let mut target = None;

        // Update the estimate straight away, the engine confirms later
        self.update_state(|state| {
            let position = clamp_position(state.precise_position + delta, state.duration);
            state.set_position(position);
            target = Some(position);
        });

        if let Some(target) = target {
            self.send(AudioPlayerCommand::SeekTo(target));
        }
    }

    fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.update_state(|state| state.volume = volume);
        self.send(AudioPlayerCommand::SetVolume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.send(AudioPlayerCommand::SetMuted(muted));
    }

    fn set_loop(&mut self, enabled: bool) {
        self.send(AudioPlayerCommand::SetLoop(enabled));
    }

    fn state(&self) -> EngineState {
        self.shared.lock().map(|state| *state).unwrap_or_default()
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.send(AudioPlayerCommand::Shutdown);
    }
}
