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

//! Playback and queue orchestration.
//!
//! [`Playback`] owns the current track, the play queue and history, and the
//! mode flags. It drives the audio engine and the prefetch cache in response
//! to user commands and to engine events, and decides what plays next when a
//! track ends.
//!
//! Everything here runs on the main event loop. Work that may block, stream
//! resolution and recommendation fetches, is handed to the task worker and
//! its result comes back as an [`AppEvent`] carrying the generation token it
//! was started with. Every [`Playback::play_song`] issues a new generation, a
//! result whose token is no longer current belongs to a track that has since
//! been replaced and is dropped. Safety timers work the same way.
//!
//! Engine events are tagged with the generation of the load they belong to,
//! events of any other generation are dropped, so a late start or stop of a
//! replaced file is never credited to its successor.
//!
//! Natural ends are serialised through a single advance slot. Only one
//! advance can be in flight, a song end arriving while the slot is taken is
//! dropped. The slot is released when the advance completes, or by a timer
//! if it never does.

use std::{
    borrow::Cow,
    path::PathBuf,
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::{
    adblock::AdFilter,
    cache::{CacheStats, PrefetchCache},
    config::AppConfig,
    events::AppEvent,
    model::{Modes, RepeatMode, Track, notice::Notices, queue::PlayQueue},
    player::{AudioControl, PlayerEvent},
    tasks::AppTask,
    util::timer,
};

/// How long a track may stay loading before it is given up on.
pub(crate) const LOADING_TIMEOUT: Duration = Duration::from_secs(15);

/// How long an advance may hold the advance slot.
pub(crate) const ADVANCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Why recommendations were requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecommendationPurpose {
    /// Fill an empty queue after a track was picked by hand.
    Prefill,
    /// The queue ran dry at the end of a track, part of the advance holding
    /// the given slot token.
    Radio { advance: u64 },
}

/// Externally observable playback state.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PlaybackState {
    pub(crate) current: Option<Track>,
    pub(crate) playing: bool,
    pub(crate) loading: bool,
    /// Between stopping the old track and the engine confirming the new one.
    pub(crate) transitioning: bool,
    pub(crate) position: f64,
    pub(crate) duration: f64,
    pub(crate) volume: u8,
    pub(crate) muted: bool,
}

/// Where the engine was told to play the current track from.
#[derive(Debug, Clone, PartialEq)]
enum Source {
    Cached(PathBuf),
    Stream(String),
}

impl Source {
    fn location(&self) -> Cow<'_, str> {
        match self {
            Source::Cached(path) => path.to_string_lossy(),
            Source::Stream(url) => Cow::Borrowed(url),
        }
    }

    /// Cached files are deleted once they leave the prefetch window.
    fn is_available(&self) -> bool {
        match self {
            Source::Cached(path) => path.is_file(),
            Source::Stream(_) => true,
        }
    }
}

pub(crate) struct Playback {
    engine: Box<dyn AudioControl>,
    cache: PrefetchCache,
    ad_filter: AdFilter,

    task_tx: Sender<AppTask>,
    event_tx: Sender<AppEvent>,

    state: PlaybackState,
    queue: PlayQueue,
    modes: Modes,
    notices: Notices,

    generation: u64,
    advancing: Option<u64>,
    next_advance: u64,

    /// What the engine was last asked to play for the current track.
    current_source: Option<Source>,

    recommendation_limit: usize,
}

impl Playback {
    pub(crate) fn new(
        mut engine: Box<dyn AudioControl>,
        cache: PrefetchCache,
        config: &AppConfig,
        task_tx: Sender<AppTask>,
        event_tx: Sender<AppEvent>,
    ) -> Self {
        let volume = config.volume.min(100);
        engine.set_volume(volume);

        let repeat = config.repeat_mode;
        engine.set_loop(repeat == RepeatMode::One);

        Self {
            engine,
            cache,
            ad_filter: AdFilter::new(config.ad_block),
            task_tx,
            event_tx,
            state: PlaybackState {
                volume,
                ..PlaybackState::default()
            },
            queue: PlayQueue::new(),
            modes: Modes {
                autoplay: config.autoplay,
                shuffle: config.shuffle,
                repeat,
                ..Modes::default()
            },
            notices: Notices::default(),
            generation: 0,
            advancing: None,
            next_advance: 0,
            current_source: None,
            recommendation_limit: config.recommendation_limit,
        }
    }

    pub(crate) fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub(crate) fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub(crate) fn modes(&self) -> &Modes {
        &self.modes
    }

    pub(crate) fn notices(&self) -> &Notices {
        &self.notices
    }

    pub(crate) fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub(crate) fn is_caching(&self, track_id: &str) -> bool {
        self.cache.is_caching(track_id)
    }

    pub(crate) fn is_cached(&self, track_id: &str) -> bool {
        self.cache.cached_path(track_id).is_some()
    }

    pub(crate) fn ad_block(&self) -> bool {
        self.ad_filter.is_enabled()
    }

    pub(crate) fn set_ad_block(&mut self, enabled: bool) {
        self.ad_filter.set_enabled(enabled);
    }

    /// Drops ad-like tracks from catalog results.
    pub(crate) fn filter_ads(&self, tracks: Vec<Track>) -> Vec<Track> {
        self.ad_filter.filter(tracks)
    }

    /// Plays `track`, replacing whatever is playing.
    ///
    /// Ad-like tracks are never played or recorded. If there is a queue it
    /// advances as [`Playback::next_track`] does, otherwise nothing changes.
    /// When `fetch_recommendations` is set, autoplay is on and nothing is
    /// queued, recommendations for the track are fetched to fill the queue.
    pub(crate) fn play_song(&mut self, track: Track, fetch_recommendations: bool) {
        if self.ad_filter.is_ad(&track) {
            info!(track_id = %track.id, title = %track.title, "skipping ad");
            if !self.queue.is_empty() {
                self.next_track();
            } else if self.state.current.is_none() {
                self.stop();
            }
            return;
        }

        if let Err(e) = self.load_track(track, fetch_recommendations) {
            self.fail(format!("Playback failed: {:#}", e));
        }
    }

    fn load_track(&mut self, track: Track, fetch_recommendations: bool) -> Result<()> {
        let cached = self.cache.cached_path(&track.id);

        self.generation += 1;
        let token = self.generation;

        self.queue.remove_id(&track.id);
        self.modes.radio = self.modes.radio && !self.queue.is_empty();

        info!(track_id = %track.id, title = %track.title, cached = cached.is_some(), "playing");

        self.state.current = Some(track.clone());
        self.state.playing = false;
        self.state.loading = cached.is_none();
        self.state.transitioning = true;
        self.state.position = 0.0;
        self.state.duration = track.duration as f64;
        self.current_source = None;

        timer::send_after(&self.event_tx, LOADING_TIMEOUT, AppEvent::LoadingTimeout(token));

        if fetch_recommendations && self.queue.is_empty() && self.modes.autoplay {
            self.send_task(AppTask::FetchRecommendations {
                token,
                seed_id: track.id.clone(),
                limit: self.recommendation_limit,
                purpose: RecommendationPurpose::Prefill,
            })?;
        }

        match cached {
            // The window slides once the engine has the file open
            Some(path) => self.start_engine(Source::Cached(path))?,
            None => {
                self.update_cache_window();

                // Nothing should keep playing while the stream is resolved
                self.engine.stop();
                self.send_task(AppTask::ResolveStream {
                    token,
                    track_id: track.id,
                })?;
            }
        }

        Ok(())
    }

    fn start_engine(&mut self, source: Source) -> Result<()> {
        let known_duration = Some(self.state.duration).filter(|d| *d > 0.0);
        let location = source.location().into_owned();
        self.current_source = Some(source);
        self.engine
            .play(&location, known_duration, self.generation)
            .with_context(|| format!("Failed to play {}", location))
    }

    /// Applies a resolved stream source, unless the track has since been
    /// replaced.
    pub(crate) fn on_stream_resolved(&mut self, token: u64, track_id: &str, source: String) {
        if !self.is_current(token, track_id) {
            debug!(track_id, token, "discarding stale stream");
            return;
        }

        if let Err(e) = self.start_engine(Source::Stream(source)) {
            self.fail(format!("Playback failed: {:#}", e));
        }
    }

    /// Skips to the head of the queue, the current track goes to history.
    pub(crate) fn next_track(&mut self) {
        match self.queue.pop_front() {
            Some(next) => self.advance_to(next),
            None => debug!("next track requested with an empty queue"),
        }
    }

    /// Plays the most recent history entry, the current track goes back to
    /// the front of the queue.
    pub(crate) fn prev_track(&mut self) {
        let Some(previous) = self.queue.pop_history() else {
            debug!("previous track requested with no history");
            return;
        };

        if let Some(current) = self.state.current.take() {
            self.queue.push_front(current);
        }
        self.save_history();

        self.play_song(previous, false);
    }

    /// Plays the queue entry at `index`, skipping the entries before it.
    ///
    /// The skipped entries stay queued.
    pub(crate) fn play_queue_item(&mut self, index: usize) {
        if let Some(track) = self.queue.remove(index) {
            self.advance_to(track);
        }
    }

    fn advance_to(&mut self, track: Track) {
        if let Some(outgoing) = self.state.current.take() {
            self.queue.push_history(outgoing);
            self.save_history();
        }

        self.play_song(track, false);
    }

    /// Plays `tracks` as the queue, starting with the track at `start_index`.
    pub(crate) fn play_playlist(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        playlist_id: Option<String>,
    ) {
        if start_index >= tracks.len() {
            debug!(start_index, len = tracks.len(), "playlist start out of range");
            return;
        }

        let mut tracks = tracks;
        let start = tracks.remove(start_index);
        tracks.retain(|t| t.id != start.id);

        self.queue.replace(tracks);
        if self.modes.shuffle {
            self.queue.shuffle();
        }

        self.modes.radio = false;
        self.modes.current_playlist_id = playlist_id;

        self.update_cache_window();
        self.play_song(start, false);
    }

    /// Handles the natural end of the current track.
    pub(crate) fn on_song_end(&mut self) {
        if self.advancing.is_some() {
            debug!("advance in progress, dropping song end");
            return;
        }

        let Some(current) = self.state.current.clone() else {
            return;
        };

        self.state.playing = false;

        if self.modes.repeat == RepeatMode::One {
            // The engine loops the file, this only happens if the loop was lost
            self.replay_current(current);
            return;
        }

        if !self.modes.autoplay {
            return;
        }

        let advance = self.next_advance;
        self.next_advance += 1;
        self.advancing = Some(advance);
        timer::send_after(&self.event_tx, ADVANCE_TIMEOUT, AppEvent::AdvanceTimeout(advance));

        if !self.queue.is_empty() {
            self.next_track();
        } else if self.modes.repeat == RepeatMode::All && !self.queue.history().is_empty() {
            self.replay_history();
        } else {
            info!(seed = %current.id, "queue finished, starting radio");
            let task = AppTask::FetchRecommendations {
                token: self.generation,
                seed_id: current.id,
                limit: self.recommendation_limit,
                purpose: RecommendationPurpose::Radio { advance },
            };
            if let Err(e) = self.send_task(task) {
                warn!(error = %format!("{:#}", e), "failed to start radio");
            } else {
                // Held until the recommendations arrive
                return;
            }
        }

        self.advancing = None;
    }

    // A source that is gone is looked up again like any other load.
    fn replay_current(&mut self, current: Track) {
        let Some(source) = self.current_source.clone().filter(Source::is_available) else {
            self.play_song(current, false);
            return;
        };

        debug!(track_id = %current.id, "replaying");
        self.generation += 1;
        self.state.position = 0.0;
        self.state.transitioning = true;
        timer::send_after(
            &self.event_tx,
            LOADING_TIMEOUT,
            AppEvent::LoadingTimeout(self.generation),
        );

        if let Err(e) = self.start_engine(source) {
            self.fail(format!("Playback failed: {:#}", e));
        }
    }

    // History and the current track, in play order, become the queue.
    fn replay_history(&mut self) {
        let mut tracks = self.queue.take_history();
        if let Some(current) = self.state.current.take() {
            tracks.push(current);
        }
        self.save_history();

        if tracks.is_empty() {
            return;
        }

        info!(len = tracks.len(), "repeating from history");
        let first = tracks.remove(0);
        self.queue.replace(tracks);
        self.play_song(first, false);
    }

    /// Applies fetched recommendations.
    ///
    /// Results are only used if the seed is still the current track of the
    /// same generation and the queue is still empty, so a queue filled by the
    /// user in the meantime is never replaced.
    pub(crate) fn on_recommendations(
        &mut self,
        token: u64,
        seed_id: &str,
        purpose: RecommendationPurpose,
        tracks: Vec<Track>,
    ) {
        if let RecommendationPurpose::Radio { advance } = purpose {
            if self.advancing == Some(advance) {
                self.advancing = None;
            }
        }

        if !self.is_current(token, seed_id) || !self.queue.is_empty() {
            debug!(seed_id, token, "discarding recommendations");
            return;
        }

        let mut tracks: Vec<Track> = self
            .ad_filter
            .filter(tracks)
            .into_iter()
            .filter(|t| t.id != seed_id)
            .collect();

        if tracks.is_empty() {
            if matches!(purpose, RecommendationPurpose::Radio { .. }) {
                self.notices.raise("No recommendations found");
            }
            return;
        }

        info!(seed_id, len = tracks.len(), ?purpose, "recommendations applied");

        self.modes.current_playlist_id = None;

        match purpose {
            RecommendationPurpose::Prefill => {
                self.queue.replace(tracks);
                if self.modes.shuffle {
                    self.queue.shuffle();
                }
                self.modes.radio = true;
                self.update_cache_window();
            }
            RecommendationPurpose::Radio { .. } => {
                let first = tracks.remove(0);
                self.queue.replace(tracks);
                self.queue.push_front(first);
                self.next_track();
                self.modes.radio = true;
            }
        }
    }

    /// Gives up on a track the engine never confirmed as started.
    pub(crate) fn on_loading_timeout(&mut self, token: u64) {
        if token != self.generation || !(self.state.loading || self.state.transitioning) {
            return;
        }

        warn!(token, "track did not start in time");
        self.state.loading = false;
        self.state.transitioning = false;

        if !self.state.playing && !self.queue.is_empty() {
            self.notices.raise("Track failed to load, skipping");
            self.next_track();
        } else if !self.state.playing {
            self.notices.raise("Track failed to load");
        }
    }

    /// Force releases an advance that never completed.
    pub(crate) fn on_advance_timeout(&mut self, advance: u64) {
        if self.advancing == Some(advance) {
            warn!(advance, "advance timed out, releasing");
            self.advancing = None;
        }
    }

    pub(crate) fn on_download_finished(&mut self, track_id: &str, ticket: u64, success: bool) {
        self.cache.finish_download(track_id, ticket, success);
    }

    /// Applies an engine lifecycle event about the load with `generation`.
    pub(crate) fn on_player_event(&mut self, generation: u64, event: PlayerEvent) {
        if let PlayerEvent::VolumeChanged(volume) = event {
            self.state.volume = volume;
            return;
        }

        if generation != self.generation {
            debug!(generation, current = self.generation, ?event, "dropping stale engine event");
            return;
        }

        match event {
            PlayerEvent::Started => {
                if self.state.current.is_some() {
                    self.state.loading = false;
                    self.state.transitioning = false;
                    self.state.playing = true;
                    self.update_cache_window();
                }
            }
            PlayerEvent::Stopped | PlayerEvent::Paused => {
                if !self.state.transitioning {
                    self.state.playing = false;
                }
            }
            PlayerEvent::Resumed => {
                if !self.state.transitioning && self.state.current.is_some() {
                    self.state.playing = true;
                }
            }
            PlayerEvent::SongEnd => self.on_song_end(),
            PlayerEvent::Progress { position, duration } => {
                if self.state.current.is_none() {
                    return;
                }
                self.state.position = position;
                if let Some(duration) = duration.filter(|d| *d > 0.0) {
                    self.state.duration = duration;
                }
            }
            PlayerEvent::VolumeChanged(_) => {}
        }
    }

    pub(crate) fn toggle_shuffle(&mut self) {
        self.modes.shuffle = !self.modes.shuffle;
        if self.modes.shuffle {
            self.queue.shuffle();
            self.update_cache_window();
        }
    }

    pub(crate) fn cycle_repeat_mode(&mut self) {
        self.modes.repeat = self.modes.repeat.next();
        self.engine.set_loop(self.modes.repeat == RepeatMode::One);
    }

    pub(crate) fn toggle_autoplay(&mut self) {
        self.modes.autoplay = !self.modes.autoplay;
    }

    pub(crate) fn toggle_pause(&mut self) {
        let Some(current) = self.state.current.clone() else {
            return;
        };

        if self.state.loading || self.state.transitioning {
            return;
        }

        if self.current_source.is_none() {
            // Stopped, start over
            self.play_song(current, false);
        } else if self.state.playing {
            self.engine.pause();
        } else {
            self.engine.resume();
        }
    }

    /// Stops playback, the current track stays selected.
    pub(crate) fn stop(&mut self) {
        // Late stream results and timers belong to the stopped track
        self.generation += 1;
        self.engine.stop();
        self.current_source = None;
        self.state.playing = false;
        self.state.loading = false;
        self.state.transitioning = false;
        self.state.position = 0.0;
    }

    pub(crate) fn seek(&mut self, delta: f64) {
        if self.state.current.is_none() || self.state.loading {
            return;
        }

        self.engine.seek(delta);
        self.state.position = self.engine.state().precise_position;
    }

    pub(crate) fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.engine.set_volume(volume);
        self.state.volume = volume;
    }

    pub(crate) fn adjust_volume(&mut self, delta: i16) {
        let volume = (self.state.volume as i16 + delta).clamp(0, 100) as u8;
        self.set_volume(volume);
    }

    pub(crate) fn toggle_mute(&mut self) {
        self.state.muted = !self.state.muted;
        self.engine.set_muted(self.state.muted);
    }

    pub(crate) fn move_queue_item(&mut self, from: usize, to: usize) -> bool {
        let moved = self.queue.move_item(from, to);
        if moved {
            self.update_cache_window();
        }
        moved
    }

    pub(crate) fn remove_from_queue(&mut self, index: usize) -> Option<Track> {
        let removed = self.queue.remove(index);
        if removed.is_some() {
            self.update_cache_window();
        }
        removed
    }

    /// Appends a track to the queue, the current track is refused.
    pub(crate) fn add_to_queue(&mut self, track: Track) -> bool {
        if self.state.current.as_ref().is_some_and(|c| c.id == track.id) {
            self.notices.raise(format!("{} is already playing", track.title));
            return false;
        }

        self.queue.add(track);
        self.update_cache_window();
        true
    }

    pub(crate) fn clear_queue(&mut self) {
        self.queue.clear();
        self.modes.radio = false;
        self.update_cache_window();
    }

    /// Restores the history loaded from the store.
    pub(crate) fn restore_history(&mut self, tracks: Vec<Track>) {
        self.queue.set_history(tracks);
    }

    pub(crate) fn raise_notice(&mut self, message: impl Into<String>) {
        self.notices.raise(message);
    }

    pub(crate) fn tick(&mut self, now: Instant) {
        self.notices.expire(now);
    }

    /// Stops playback and releases every download and cached file.
    pub(crate) fn shutdown(&mut self) {
        self.engine.stop();
        self.cache.cleanup();
    }

    fn is_current(&self, token: u64, track_id: &str) -> bool {
        token == self.generation
            && self
                .state
                .current
                .as_ref()
                .is_some_and(|current| current.id == track_id)
    }

    fn update_cache_window(&mut self) {
        self.cache.update_window(self.queue.tracks());
    }

    fn save_history(&self) {
        if let Err(e) = self.send_task(AppTask::SaveHistory(self.queue.persisted_history())) {
            warn!(error = %format!("{:#}", e), "failed to save history");
        }
    }

    fn send_task(&self, task: AppTask) -> Result<()> {
        self.task_tx
            .send(task)
            .context("Failed to send task to the task worker")
    }

    // Leaves the state machine in a safe state after a failure.
    fn fail(&mut self, message: String) {
        error!("{}", message);
        self.state.loading = false;
        self.state.playing = false;
        self.state.transitioning = false;
        self.notices.raise(message);
    }
}

#[cfg(test)]
mod tests;
