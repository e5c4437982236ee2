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

//! MPV-backed audio playback engine and event processing.
//!
//! This module provides the core audio playback logic, leveraging `libmpv` for
//! decoding, streaming and playback control. It manages a background worker
//! thread that bridges the gap between the command-based [`AudioPlayer`]
//! interface and the low-level MPV event and property system.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`AudioPlayerCommand`]s from the
//!    orchestrator to control playback (play, pause, seek, etc.).
//! 2. **Event Channel**: Broadcasts [`PlayerEvent`]s to notify the
//!    orchestrator of lifecycle changes, progress and volume updates.
//!
//! MPV's own `time-pos` notifications are not reliable enough to drive the
//! position display, so the worker polls the real position every 200ms while
//! playing and falls back to extrapolation when a poll fails.
//!
//! [`AudioPlayer`]: crate::player::AudioPlayer

use std::{
    fmt,
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver, Sender, TryRecvError},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow};
use mpv::Format;
use tracing::{debug, trace, warn};

use crate::{
    events::AppEvent,
    player::{
        EngineState, PlayerEvent,
        lifecycle::{Lifecycle, Phase, PositionTracker, StopKind},
    },
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub(crate) enum AudioPlayerCommand {
    Play {
        source: String,
        known_duration: Option<f64>,
        generation: u64,
    },
    Pause,
    Resume,
    Stop,
    SeekTo(f64),
    SetVolume(u8),
    SetMuted(bool),
    SetLoop(bool),
    Shutdown,
}

/// Spawns the audio worker thread to process playback commands.
///
/// The MPV context is created on the worker thread itself. This function
/// waits until it has been initialised and fails if it could not be.
///
/// # Arguments
///
/// * `command_rx` - The receiving end of the player command channel.
/// * `event_tx` - The channel used to broadcast playback events.
/// * `shared` - Engine state shared with the player handle.
/// * `volume` - The initial volume.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned or MPV cannot be
/// initialised.
pub(crate) fn spawn_player_worker(
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
    shared: Arc<Mutex<EngineState>>,
    volume: u8,
) -> Result<()> {
    let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), String>>(1);

    thread::Builder::new()
        .name("audio-player".to_string())
        .spawn(move || {
            let handler = match create_handler(volume) {
                Ok(handler) => {
                    let _ = ready_tx.send(Ok(()));
                    handler
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(format!("{:#}", e)));
                    return;
                }
            };

            let mut worker = PlayerWorker {
                handler,
                event_tx,
                shared,
                lifecycle: Lifecycle::new(),
                tracker: PositionTracker::new(),
                generation: 0,
                looping: false,
                last_poll: Instant::now(),
            };

            if let Err(e) = worker.run(&command_rx) {
                warn!(error = %format!("{:#}", e), "audio worker failed");
            }
            debug!("audio worker finished");
        })
        .context("Failed to spawn audio worker thread")?;

    ready_rx
        .recv()
        .context("Audio worker exited during initialisation")?
        .map_err(|e| anyhow!(e))
}

fn create_handler(volume: u8) -> Result<mpv::MpvHandler> {
    let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
    builder
        .set_option("vo", "null")
        .context("Failed to set no video output")?;
    builder
        .set_option("video", "no")
        .context("Failed to disable video")?;
    builder
        .set_option("volume", volume as i64)
        .context("Failed to set initial volume")?;

    let mut handler = builder.build().context("Failed to build MPV handler")?;

    handler
        .observe_property::<bool>("pause", 0)
        .context("Failed to observe pause")?;
    handler
        .observe_property::<f64>("volume", 0)
        .context("Failed to observe volume")?;

    Ok(handler)
}

enum EngineEvent {
    Loaded,
    Ended,
    Pause(bool),
    Volume(f64),
}

struct PlayerWorker {
    handler: mpv::MpvHandler,
    event_tx: Sender<AppEvent>,
    shared: Arc<Mutex<EngineState>>,
    lifecycle: Lifecycle,
    tracker: PositionTracker,
    /// Generation of the file last loaded, echoed in every event.
    generation: u64,
    looping: bool,
    last_poll: Instant,
}

impl PlayerWorker {
    /// The primary execution loop for the audio player backend.
    ///
    /// Runs until a shutdown command is received or the player handle is
    /// dropped.
    fn run(&mut self, command_rx: &Receiver<AudioPlayerCommand>) -> Result<()> {
        loop {
            if !self.process_commands(command_rx) {
                return Ok(());
            }
            self.process_mpv_events()?;
            self.poll_position()?;
        }
    }

    /// Drains and executes all pending commands, returns `false` when the
    /// worker should exit.
    fn process_commands(&mut self, command_rx: &Receiver<AudioPlayerCommand>) -> bool {
        loop {
            let command = match command_rx.try_recv() {
                Ok(command) => command,
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            };

            match command {
                AudioPlayerCommand::Play {
                    source,
                    known_duration,
                    generation,
                } => self.play(&source, known_duration, generation),
                AudioPlayerCommand::Pause => {
                    self.best_effort("pause", |h| h.set_property("pause", true))
                }
                AudioPlayerCommand::Resume => {
                    self.best_effort("resume", |h| h.set_property("pause", false))
                }
                AudioPlayerCommand::Stop => {
                    self.lifecycle.request_stop();
                    self.tracker.hold();
                    self.best_effort("stop", |h| h.command(&["stop"]));
                }
                AudioPlayerCommand::SeekTo(target) => {
                    let target = self.tracker.seek_to(target, Instant::now());
                    self.best_effort("seek", |h| {
                        h.command(&["seek", &format!("{:.3}", target), "absolute"])
                    });
                }
                AudioPlayerCommand::SetVolume(volume) => {
                    self.best_effort("set volume", |h| h.set_property("volume", volume as f64))
                }
                AudioPlayerCommand::SetMuted(muted) => {
                    self.best_effort("set mute", |h| h.set_property("mute", muted))
                }
                AudioPlayerCommand::SetLoop(enabled) => {
                    self.looping = enabled;
                    self.apply_loop();
                }
                AudioPlayerCommand::Shutdown => return false,
            }
        }
    }

    fn play(&mut self, source: &str, known_duration: Option<f64>, generation: u64) {
        let replacing = self.lifecycle.phase() != Phase::Idle;

        self.generation = generation;
        self.lifecycle.begin_load();
        self.tracker.reset(known_duration);

        // Stop synchronously so the old file's end can never be mistaken for
        // the end of the new one.
        if replacing {
            self.best_effort("stop", |h| h.command(&["stop"]));
        }

        debug!(source, generation, "loading");
        match self.handler.command(&["loadfile", source, "replace"]) {
            Ok(()) => {
                self.best_effort("unpause", |h| h.set_property("pause", false));
                self.apply_loop();
            }
            Err(e) => {
                warn!(source, error = ?e, "failed to load");
                self.lifecycle.on_stopped();
                self.update_state(|state| {
                    state.playing = false;
                    state.transitioning = false;
                });
                self.send(PlayerEvent::Stopped);
            }
        }
    }

    // Loop state is per file in MPV, so it is applied again after each load.
    fn apply_loop(&mut self) {
        let value = if self.looping { "inf" } else { "no" };
        self.best_effort("set loop", |h| h.set_property("loop-file", value));
    }

    /// Polls for MPV events and translates them into [`PlayerEvent`]s.
    ///
    /// This function waits for up to 50ms for an event from the MPV context.
    fn process_mpv_events(&mut self) -> Result<()> {
        // The MPV event borrows the handler, so only copy out what is needed
        let engine_event = match self.handler.wait_event(0.05) {
            Some(mpv::Event::FileLoaded) => EngineEvent::Loaded,
            Some(mpv::Event::EndFile(_)) => EngineEvent::Ended,
            Some(mpv::Event::PropertyChange { name, change, .. }) => match (name, change) {
                ("pause", Format::Flag(paused)) => EngineEvent::Pause(paused),
                ("volume", Format::Double(volume)) => EngineEvent::Volume(volume),
                _ => return Ok(()),
            },
            _ => return Ok(()),
        };

        let player_event = match engine_event {
            EngineEvent::Loaded => {
                self.lifecycle.on_started();
                self.tracker.observe(0.0, None, Instant::now());
                self.update_state(|state| {
                    state.playing = true;
                    state.transitioning = false;
                });
                Some(PlayerEvent::Started)
            }
            EngineEvent::Ended => {
                self.tracker.hold();
                self.update_state(|state| state.playing = false);

                let kind = self.lifecycle.on_stopped();
                trace!(?kind, "end of file");
                match kind {
                    StopKind::NaturalEnd => {
                        self.send(PlayerEvent::Stopped);
                        Some(PlayerEvent::SongEnd)
                    }
                    StopKind::Glitch => {
                        debug!("playback stopped before it started");
                        Some(PlayerEvent::Stopped)
                    }
                    StopKind::Manual => Some(PlayerEvent::Stopped),
                }
            }
            EngineEvent::Pause(true) => {
                self.tracker.hold();
                if self.lifecycle.on_paused() {
                    self.update_state(|state| state.playing = false);
                    Some(PlayerEvent::Paused)
                } else {
                    None
                }
            }
            EngineEvent::Pause(false) => {
                if self.lifecycle.on_resumed() {
                    let position = self.tracker.position();
                    self.tracker.observe(position, None, Instant::now());
                    self.update_state(|state| state.playing = true);
                    Some(PlayerEvent::Resumed)
                } else {
                    None
                }
            }
            EngineEvent::Volume(volume) => {
                let volume = volume.round().clamp(0.0, 100.0) as u8;
                self.update_state(|state| state.volume = volume);
                Some(PlayerEvent::VolumeChanged(volume))
            }
        };

        if let Some(event) = player_event {
            self.try_send(event)?;
        }

        Ok(())
    }

    /// Samples the real playback position while playing.
    ///
    /// A failed poll is expected, for example while a stream is still
    /// buffering, and the position is then extrapolated.
    fn poll_position(&mut self) -> Result<()> {
        if !self.lifecycle.is_playing() || self.last_poll.elapsed() < POLL_INTERVAL {
            return Ok(());
        }

        let now = Instant::now();
        self.last_poll = now;

        let position = match self.handler.get_property::<f64>("time-pos") {
            Ok(position) => {
                let duration = self.handler.get_property::<f64>("duration").ok();
                self.tracker.observe(position, duration, now);
                position
            }
            Err(e) => {
                trace!(error = ?e, "position poll failed, extrapolating");
                self.tracker.extrapolate(now)
            }
        };

        self.lifecycle.on_progress(position);

        let duration = self.tracker.duration();
        self.update_state(|state| {
            state.set_position(position);
            if duration.is_some() {
                state.duration = duration;
            }
        });

        self.try_send(PlayerEvent::Progress { position, duration })?;

        Ok(())
    }

    fn best_effort<T, E: fmt::Debug>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut mpv::MpvHandler) -> Result<T, E>,
    ) {
        if let Err(e) = f(&mut self.handler) {
            debug!(error = ?e, "{} failed", what);
        }
    }

    fn try_send(&self, event: PlayerEvent) -> Result<()> {
        self.event_tx
            .send(AppEvent::Player {
                generation: self.generation,
                event,
            })
            .context("Failed to send player event")
    }

    fn send(&self, event: PlayerEvent) {
        let _ = self.try_send(event);
    }

    fn update_state(&self, f: impl FnOnce(&mut EngineState)) {
        if let Ok(mut state) = self.shared.lock() {
            f(&mut state);
        }
    }
}
