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

use std::{
    fs,
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver},
    },
};

use tempfile::TempDir;

use super::*;
use crate::{
    cache::{DownloadHandle, DownloadRequest, Downloader},
    model::queue::HISTORY_LIMIT,
    player::EngineState,
};

#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    Play(String, Option<f64>),
    Pause,
    Resume,
    Stop,
    Seek(f64),
    Volume(u8),
    Muted(bool),
    Loop(bool),
}

#[derive(Clone, Default)]
struct FakeEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    generation: Arc<Mutex<u64>>,
}

impl FakeEngine {
    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AudioControl for FakeEngine {
    fn play(&mut self, source: &str, known_duration: Option<f64>, generation: u64) -> Result<()> {
        self.record(EngineCall::Play(source.to_string(), known_duration));
        *self.generation.lock().unwrap() = generation;
        Ok(())
    }

    fn pause(&mut self) {
        self.record(EngineCall::Pause);
    }

    fn resume(&mut self) {
        self.record(EngineCall::Resume);
    }

    fn stop(&mut self) {
        self.record(EngineCall::Stop);
    }

    fn seek(&mut self, delta: f64) {
        self.record(EngineCall::Seek(delta));
    }

    fn set_volume(&mut self, volume: u8) {
        self.record(EngineCall::Volume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(EngineCall::Muted(muted));
    }

    fn set_loop(&mut self, enabled: bool) {
        self.record(EngineCall::Loop(enabled));
    }

    fn state(&self) -> EngineState {
        EngineState::default()
    }
}

#[derive(Clone, Default)]
struct FakeDownloader {
    requests: Arc<Mutex<Vec<DownloadRequest>>>,
}

impl Downloader for FakeDownloader {
    fn start(&self, request: DownloadRequest) -> Result<DownloadHandle> {
        self.requests.lock().unwrap().push(request);
        let handle = DownloadHandle::new();
        handle.finish();
        Ok(handle)
    }
}

struct Harness {
    playback: Playback,
    calls: Arc<Mutex<Vec<EngineCall>>>,
    engine_generation: Arc<Mutex<u64>>,
    downloads: Arc<Mutex<Vec<DownloadRequest>>>,
    task_rx: Receiver<AppTask>,
    _event_rx: Receiver<AppEvent>,
    _dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::default();
        let downloader = FakeDownloader::default();
        let calls = Arc::clone(&engine.calls);
        let engine_generation = Arc::clone(&engine.generation);
        let downloads = Arc::clone(&downloader.requests);

        let cache = PrefetchCache::new(&dir.path().join("cache"), 5, 3, Box::new(downloader)).unwrap();

        let (task_tx, task_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let playback = Playback::new(Box::new(engine), cache, &config, task_tx, event_tx);

        let harness = Self {
            playback,
            calls,
            engine_generation,
            downloads,
            task_rx,
            _event_rx: event_rx,
            _dir: dir,
        };
        harness.take_calls();
        harness
    }

    /// The generation of the file the engine was last asked to load.
    fn loaded_generation(&self) -> u64 {
        *self.engine_generation.lock().unwrap()
    }

    /// Delivers an engine event about the file the engine last loaded.
    fn engine_event(&mut self, event: PlayerEvent) {
        let generation = self.loaded_generation();
        self.playback.on_player_event(generation, event);
    }

    fn take_calls(&self) -> Vec<EngineCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn plays(&self) -> Vec<String> {
        self.take_calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Play(source, _) => Some(source),
                _ => None,
            })
            .collect()
    }

    fn take_tasks(&self) -> Vec<AppTask> {
        self.task_rx.try_iter().collect()
    }

    fn resolve_requests(tasks: &[AppTask]) -> Vec<(u64, String)> {
        tasks
            .iter()
            .filter_map(|task| match task {
                AppTask::ResolveStream { token, track_id } => Some((*token, track_id.clone())),
                _ => None,
            })
            .collect()
    }

    fn recommendation_requests(
        tasks: &[AppTask],
    ) -> Vec<(u64, String, RecommendationPurpose)> {
        tasks
            .iter()
            .filter_map(|task| match task {
                AppTask::FetchRecommendations {
                    token,
                    seed_id,
                    purpose,
                    ..
                } => Some((*token, seed_id.clone(), *purpose)),
                _ => None,
            })
            .collect()
    }

    /// Answers every pending stream resolution and starts playback.
    fn resolve_and_start(&mut self) {
        let tasks = self.take_tasks();
        for (token, track_id) in Self::resolve_requests(&tasks) {
            self.playback
                .on_stream_resolved(token, &track_id, stream_url(&track_id));
        }
        self.engine_event(PlayerEvent::Started);
    }

    /// Plays a track by hand and lets it start.
    fn play(&mut self, track: Track) {
        self.playback.play_song(track, false);
        self.resolve_and_start();
        self.take_calls();
    }

    /// Makes a ready cache entry for `track`.
    fn cache(&mut self, track: &Track) {
        self.playback.cache.update_window([track]);
        let request = self
            .downloads
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.track_id == track.id)
            .cloned()
            .unwrap();
        fs::write(&request.path, b"audio").unwrap();
        self.playback
            .on_download_finished(&request.track_id, request.ticket, true);
    }

    fn current_id(&self) -> Option<String> {
        self.playback.state().current.as_ref().map(|t| t.id.clone())
    }

    fn queue_ids(&self) -> Vec<String> {
        self.playback.queue().tracks().map(|t| t.id.clone()).collect()
    }

    fn history_ids(&self) -> Vec<String> {
        self.playback
            .queue()
            .history()
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    fn queue_all(&mut self, tracks: &[Track]) {
        for track in tracks {
            assert!(self.playback.add_to_queue(track.clone()));
        }
    }

    fn assert_queue_invariant(&self) {
        if let Some(current) = self.current_id() {
            assert!(
                !self.playback.queue().contains(&current),
                "current track {} is queued",
                current
            );
        }
    }
}

fn track(id: &str) -> Track {
    Track::new(id, &format!("Song {}", id), "Artist", 180)
}

fn ad() -> Track {
    Track::new("ad1", "Sponsored ad", "Brand", 10)
}

fn stream_url(id: &str) -> String {
    format!("https://stream.example/{}", id)
}

#[test]
fn basic_playback() {
    let mut h = Harness::new();

    h.playback.play_song(Track::new("abc", "Song", "Artist", 180), false);

    let state = h.playback.state().clone();
    assert!(state.loading);
    assert!(!state.playing);
    assert!(state.transitioning);
    assert_eq!(state.position, 0.0);
    assert_eq!(state.duration, 180.0);

    let tasks = h.take_tasks();
    let requests = Harness::resolve_requests(&tasks);
    assert_eq!(requests.len(), 1);
    let (token, track_id) = requests[0].clone();
    assert_eq!(track_id, "abc");

    h.playback.on_stream_resolved(token, "abc", stream_url("abc"));
    assert_eq!(
        h.take_calls(),
        [
            EngineCall::Stop,
            EngineCall::Play(stream_url("abc"), Some(180.0))
        ]
    );

    h.engine_event(PlayerEvent::Started);

    let state = h.playback.state();
    assert!(!state.loading);
    assert!(state.playing);
    assert!(!state.transitioning);
    assert_eq!(state.position, 0.0);
}

#[test]
fn skip_to_next() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.queue_all(&[track("B"), track("C")]);
    h.take_tasks();

    h.playback.next_track();

    assert_eq!(h.history_ids(), ["A"]);
    assert_eq!(h.queue_ids(), ["C"]);
    assert_eq!(h.current_id().as_deref(), Some("B"));

    let tasks = h.take_tasks();
    let requests = Harness::resolve_requests(&tasks);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].1, "B");

    let saved: Vec<&Vec<Track>> = tasks
        .iter()
        .filter_map(|t| match t {
            AppTask::SaveHistory(history) => Some(history),
            _ => None,
        })
        .collect();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0][0].id, "A");
}

#[test]
fn next_with_empty_queue_does_nothing() {
    let mut h = Harness::new();
    h.play(track("A"));

    h.playback.next_track();

    assert_eq!(h.current_id().as_deref(), Some("A"));
    assert!(h.history_ids().is_empty());
    assert!(h.take_calls().is_empty());
}

#[test]
fn previous_track_requeues_current() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.queue_all(&[track("B"), track("C")]);
    h.playback.next_track();
    h.resolve_and_start();

    h.playback.prev_track();

    assert_eq!(h.current_id().as_deref(), Some("A"));
    assert_eq!(h.queue_ids(), ["B", "C"]);
    assert!(h.history_ids().is_empty());
}

#[test]
fn natural_end_with_empty_queue_starts_radio() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.take_tasks();

    h.engine_event(PlayerEvent::SongEnd);

    let tasks = h.take_tasks();
    let requests = Harness::recommendation_requests(&tasks);
    assert_eq!(requests.len(), 1);
    let (token, seed, purpose) = requests[0].clone();
    assert_eq!(seed, "A");
    assert!(matches!(purpose, RecommendationPurpose::Radio { .. }));

    h.playback
        .on_recommendations(token, &seed, purpose, vec![track("X"), track("Y")]);

    assert_eq!(h.current_id().as_deref(), Some("X"));
    assert_eq!(h.queue_ids(), ["Y"]);
    assert_eq!(h.history_ids(), ["A"]);
    assert!(h.playback.modes().radio);
    assert_eq!(h.playback.advancing, None);
}

#[test]
fn song_end_during_advance_is_dropped() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.take_tasks();

    h.playback.on_song_end();
    h.playback.on_song_end();

    let tasks = h.take_tasks();
    assert_eq!(Harness::recommendation_requests(&tasks).len(), 1);
}

#[test]
fn advance_timeout_releases_the_slot() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.take_tasks();

    h.playback.on_song_end();
    let advance = h.playback.advancing.unwrap();

    h.playback.on_advance_timeout(advance + 1);
    assert_eq!(h.playback.advancing, Some(advance));

    h.playback.on_advance_timeout(advance);
    assert_eq!(h.playback.advancing, None);

    h.take_tasks();
    h.playback.on_song_end();
    assert_eq!(Harness::recommendation_requests(&h.take_tasks()).len(), 1);
}

#[test]
fn stale_radio_results_are_discarded() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.take_tasks();

    h.playback.on_song_end();
    let (token, seed, purpose) = Harness::recommendation_requests(&h.take_tasks())[0].clone();

    // The user picks something else while the fetch is running
    h.play(track("B"));

    h.playback
        .on_recommendations(token, &seed, purpose, vec![track("X"), track("Y")]);

    assert_eq!(h.current_id().as_deref(), Some("B"));
    assert!(h.queue_ids().is_empty());
    assert_eq!(h.playback.advancing, None);
}

#[test]
fn repeat_all_replays_history() {
    let mut h = Harness::new();
    h.playback.cycle_repeat_mode();
    assert_eq!(h.playback.modes().repeat, RepeatMode::All);

    h.playback.restore_history(vec![track("Z"), track("W")]);
    h.play(track("A"));

    h.engine_event(PlayerEvent::SongEnd);

    assert_eq!(h.current_id().as_deref(), Some("Z"));
    assert_eq!(h.queue_ids(), ["W", "A"]);
    assert!(h.history_ids().is_empty());
    assert_eq!(h.playback.advancing, None);
}

#[test]
fn repeat_one_replays_the_same_source() {
    let mut h = Harness::new();
    h.playback.cycle_repeat_mode();
    h.playback.cycle_repeat_mode();
    assert_eq!(h.playback.modes().repeat, RepeatMode::One);
    assert_eq!(h.take_calls(), [EngineCall::Loop(false), EngineCall::Loop(true)]);

    h.queue_all(&[track("B")]);
    h.play(track("A"));
    let history = h.history_ids();

    h.engine_event(PlayerEvent::SongEnd);

    assert_eq!(h.plays(), [stream_url("A")]);
    assert_eq!(h.current_id().as_deref(), Some("A"));
    assert_eq!(h.queue_ids(), ["B"]);
    assert_eq!(h.history_ids(), history);
}

#[test]
fn leaving_repeat_one_disengages_loop() {
    let mut h = Harness::new();
    for _ in 0..3 {
        h.playback.cycle_repeat_mode();
    }

    assert_eq!(h.playback.modes().repeat, RepeatMode::Off);
    assert_eq!(h.take_calls().last(), Some(&EngineCall::Loop(false)));
}

#[test]
fn autoplay_off_stops_at_the_end() {
    let mut h = Harness::new();
    h.playback.toggle_autoplay();
    h.queue_all(&[track("B")]);
    h.play(track("A"));
    h.take_tasks();

    h.engine_event(PlayerEvent::SongEnd);

    assert_eq!(h.current_id().as_deref(), Some("A"));
    assert_eq!(h.queue_ids(), ["B"]);
    assert!(!h.playback.state().playing);
    assert!(h.take_tasks().is_empty());
}

#[test]
fn natural_end_plays_next_queued_track() {
    let mut h = Harness::new();
    h.queue_all(&[track("B")]);
    h.play(track("A"));

    h.engine_event(PlayerEvent::SongEnd);

    assert_eq!(h.current_id().as_deref(), Some("B"));
    assert_eq!(h.history_ids(), ["A"]);
    assert_eq!(h.playback.advancing, None);
}

#[test]
fn cache_hit_skips_stream_resolution() {
    let mut h = Harness::new();
    let t = track("T");
    h.cache(&t);
    h.take_tasks();

    h.playback.play_song(t.clone(), false);

    assert!(!h.playback.state().loading);
    assert!(Harness::resolve_requests(&h.take_tasks()).is_empty());

    let plays = h.plays();
    assert_eq!(plays.len(), 1);
    assert!(plays[0].ends_with(".audio"));
    assert!(h.playback.is_cached("T"));

    // The playing track is not part of the window once the engine has it
    h.engine_event(PlayerEvent::Started);
    assert!(!h.playback.is_cached("T"));
    assert_eq!(h.playback.cache_stats().total, 0);
}

#[test]
fn ad_is_skipped_with_one_advance() {
    let mut h = Harness::new();
    h.queue_all(&[track("B"), track("C")]);

    h.playback.play_song(ad(), false);

    assert_eq!(h.current_id().as_deref(), Some("B"));
    assert_eq!(h.queue_ids(), ["C"]);
    assert!(!h.playback.state().playing);
    assert!(h.history_ids().is_empty());
}

#[test]
fn ad_with_empty_queue_is_ignored() {
    let mut h = Harness::new();
    h.play(track("A"));

    h.playback.play_song(ad(), false);

    assert_eq!(h.current_id().as_deref(), Some("A"));
    assert!(h.playback.state().playing);
    assert!(h.take_calls().is_empty());
}

#[test]
fn ads_play_when_filter_disabled() {
    let mut h = Harness::new();
    h.playback.set_ad_block(false);

    h.playback.play_song(ad(), false);

    assert_eq!(h.current_id().as_deref(), Some("ad1"));
}

#[test]
fn stale_stream_result_is_ignored() {
    let mut h = Harness::new();
    h.playback.play_song(track("A"), false);
    let first = Harness::resolve_requests(&h.take_tasks())[0].clone();

    h.playback.play_song(track("B"), false);
    h.take_calls();

    h.playback
        .on_stream_resolved(first.0, &first.1, stream_url("A"));

    assert!(h.plays().is_empty());
    assert!(h.playback.state().loading);
}

#[test]
fn loading_timeout_skips_to_next() {
    let mut h = Harness::new();
    h.queue_all(&[track("B")]);
    h.playback.play_song(track("A"), false);
    let (token, _) = Harness::resolve_requests(&h.take_tasks())[0].clone();

    h.playback.on_loading_timeout(token + 1);
    assert_eq!(h.current_id().as_deref(), Some("A"));

    h.playback.on_loading_timeout(token);

    assert_eq!(h.current_id().as_deref(), Some("B"));
    assert!(h.playback.notices().current().is_some());
}

#[test]
fn loading_timeout_after_start_does_nothing() {
    let mut h = Harness::new();
    h.queue_all(&[track("B")]);
    h.playback.play_song(track("A"), false);
    let (token, _) = Harness::resolve_requests(&h.take_tasks())[0].clone();
    h.playback.on_stream_resolved(token, "A", stream_url("A"));
    h.engine_event(PlayerEvent::Started);

    h.playback.on_loading_timeout(token);

    assert_eq!(h.current_id().as_deref(), Some("A"));
    assert!(h.playback.state().playing);
}

#[test]
fn prefill_populates_empty_queue() {
    let mut h = Harness::new();
    h.playback.play_song(track("A"), true);

    let tasks = h.take_tasks();
    let (token, seed, purpose) = Harness::recommendation_requests(&tasks)[0].clone();
    assert_eq!(purpose, RecommendationPurpose::Prefill);

    h.playback.on_recommendations(
        token,
        &seed,
        purpose,
        vec![track("A"), track("X"), ad(), track("Y")],
    );

    assert_eq!(h.current_id().as_deref(), Some("A"));
    assert_eq!(h.queue_ids(), ["X", "Y"]);
    assert!(h.playback.modes().radio);
    assert!(h.playback.is_caching("X"));
}

#[test]
fn prefill_never_replaces_a_user_queue() {
    let mut h = Harness::new();
    h.playback.play_song(track("A"), true);
    let (token, seed, purpose) = Harness::recommendation_requests(&h.take_tasks())[0].clone();

    h.queue_all(&[track("B")]);
    h.playback
        .on_recommendations(token, &seed, purpose, vec![track("X"), track("Y")]);

    assert_eq!(h.queue_ids(), ["B"]);
    assert!(!h.playback.modes().radio);
}

#[test]
fn prefill_needs_autoplay_and_empty_queue() {
    let mut h = Harness::new();
    h.queue_all(&[track("B")]);
    h.playback.play_song(track("A"), true);
    assert!(Harness::recommendation_requests(&h.take_tasks()).is_empty());

    h.playback.clear_queue();
    h.playback.toggle_autoplay();
    h.playback.play_song(track("C"), true);
    assert!(Harness::recommendation_requests(&h.take_tasks()).is_empty());
}

#[test]
fn radio_ends_when_the_queue_runs_out() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.take_tasks();
    h.playback.on_song_end();
    let (token, seed, purpose) = Harness::recommendation_requests(&h.take_tasks())[0].clone();
    h.playback
        .on_recommendations(token, &seed, purpose, vec![track("X"), track("Y")]);
    assert!(h.playback.modes().radio);

    h.playback.next_track();

    assert_eq!(h.current_id().as_deref(), Some("Y"));
    assert!(!h.playback.modes().radio);
}

#[test]
fn play_playlist_sets_queue_and_mode() {
    let mut h = Harness::new();
    h.playback.modes.radio = true;

    h.playback.play_playlist(
        vec![track("A"), track("B"), track("C")],
        1,
        Some("p1".to_string()),
    );

    assert_eq!(h.current_id().as_deref(), Some("B"));
    assert_eq!(h.queue_ids(), ["A", "C"]);
    assert!(!h.playback.modes().radio);
    assert_eq!(h.playback.modes().current_playlist_id.as_deref(), Some("p1"));
    assert_eq!(h.playback.cache_stats().total, 2);
}

#[test]
fn play_playlist_out_of_range_is_ignored() {
    let mut h = Harness::new();

    h.playback.play_playlist(vec![track("A")], 3, None);

    assert_eq!(h.current_id(), None);
    assert!(h.queue_ids().is_empty());
}

#[test]
fn shuffle_preserves_queued_tracks() {
    let mut h = Harness::new();
    let tracks: Vec<Track> = (0..20).map(|i| track(&format!("t{}", i))).collect();
    h.queue_all(&tracks);

    h.playback.toggle_shuffle();
    assert!(h.playback.modes().shuffle);

    let mut shuffled = h.queue_ids();
    shuffled.sort();
    let mut expected: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
    expected.sort();
    assert_eq!(shuffled, expected);

    // Turning shuffle off keeps the current order
    let order = h.queue_ids();
    h.playback.toggle_shuffle();
    assert_eq!(h.queue_ids(), order);
}

#[test]
fn current_track_is_never_queued() {
    let mut h = Harness::new();
    let tracks: Vec<Track> = ["A", "B", "C", "D"].iter().map(|id| track(id)).collect();

    h.play(tracks[0].clone());
    h.assert_queue_invariant();

    assert!(!h.playback.add_to_queue(tracks[0].clone()));
    h.assert_queue_invariant();

    h.queue_all(&tracks[1..]);
    h.playback.next_track();
    h.assert_queue_invariant();

    // Picking a queued track by hand takes it out of the queue
    h.playback.play_song(tracks[3].clone(), false);
    h.assert_queue_invariant();
    assert_eq!(h.queue_ids(), ["C"]);

    h.playback.prev_track();
    h.assert_queue_invariant();

    h.playback.next_track();
    h.assert_queue_invariant();

    h.playback.prev_track();
    h.playback.prev_track();
    h.assert_queue_invariant();
}

#[test]
fn persisted_history_is_bounded() {
    let mut h = Harness::new();
    let tracks: Vec<Track> = (0..60).map(|i| track(&format!("t{}", i))).collect();
    h.play(track("start"));
    h.queue_all(&tracks);

    for _ in 0..tracks.len() {
        h.playback.next_track();
    }

    let last_saved = h
        .take_tasks()
        .into_iter()
        .filter_map(|t| match t {
            AppTask::SaveHistory(history) => Some(history),
            _ => None,
        })
        .last()
        .unwrap();

    assert_eq!(last_saved.len(), HISTORY_LIMIT);
    assert_eq!(last_saved.last().map(|t| t.id.as_str()), Some("t58"));
}

#[test]
fn engine_events_are_ignored_while_transitioning() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.engine_event(PlayerEvent::Progress {
        position: 42.0,
        duration: Some(200.0),
    });
    assert_eq!(h.playback.state().position, 42.0);
    assert_eq!(h.playback.state().duration, 200.0);

    h.playback.play_song(track("B"), false);

    // Late events from the previous track
    h.engine_event(PlayerEvent::Progress {
        position: 43.0,
        duration: Some(200.0),
    });
    h.engine_event(PlayerEvent::Stopped);
    h.engine_event(PlayerEvent::Resumed);

    let state = h.playback.state();
    assert_eq!(state.position, 0.0);
    assert_eq!(state.duration, 180.0);
    assert!(!state.playing);
    assert!(state.transitioning);
}

#[test]
fn pause_resume_and_stop() {
    let mut h = Harness::new();
    h.play(track("A"));

    h.playback.toggle_pause();
    assert_eq!(h.take_calls(), [EngineCall::Pause]);
    h.engine_event(PlayerEvent::Paused);
    assert!(!h.playback.state().playing);

    h.playback.toggle_pause();
    assert_eq!(h.take_calls(), [EngineCall::Resume]);
    h.engine_event(PlayerEvent::Resumed);
    assert!(h.playback.state().playing);

    h.playback.stop();
    assert_eq!(h.take_calls(), [EngineCall::Stop]);
    assert!(!h.playback.state().playing);
    assert_eq!(h.current_id().as_deref(), Some("A"));

    // Starting again after a stop loads the track again
    h.take_tasks();
    h.playback.toggle_pause();
    assert_eq!(Harness::resolve_requests(&h.take_tasks()).len(), 1);
}

#[test]
fn stop_invalidates_pending_stream() {
    let mut h = Harness::new();
    h.playback.play_song(track("A"), false);
    let (token, track_id) = Harness::resolve_requests(&h.take_tasks())[0].clone();

    h.playback.stop();
    h.take_calls();
    h.playback.on_stream_resolved(token, &track_id, stream_url("A"));

    assert!(h.plays().is_empty());
}

#[test]
fn volume_is_clamped() {
    let mut h = Harness::new();

    h.playback.adjust_volume(80);
    assert_eq!(h.playback.state().volume, 100);

    h.playback.adjust_volume(-150);
    assert_eq!(h.playback.state().volume, 0);

    h.playback.toggle_mute();
    assert!(h.playback.state().muted);
    assert_eq!(
        h.take_calls(),
        [
            EngineCall::Volume(100),
            EngineCall::Volume(0),
            EngineCall::Muted(true)
        ]
    );
}

#[test]
fn seek_is_ignored_while_loading() {
    let mut h = Harness::new();
    h.playback.play_song(track("A"), false);
    h.take_calls();

    h.playback.seek(10.0);
    assert!(h.take_calls().is_empty());

    h.resolve_and_start();
    h.take_calls();
    h.playback.seek(10.0);
    assert_eq!(h.take_calls(), [EngineCall::Seek(10.0)]);
}

#[test]
fn queue_mutations_are_bounds_checked() {
    let mut h = Harness::new();
    h.queue_all(&[track("A"), track("B"), track("C")]);

    assert!(h.playback.move_queue_item(0, 2));
    assert_eq!(h.queue_ids(), ["B", "C", "A"]);
    assert!(!h.playback.move_queue_item(0, 3));

    assert_eq!(h.playback.remove_from_queue(1).map(|t| t.id), Some("C".to_string()));
    assert_eq!(h.playback.remove_from_queue(5), None);
    assert_eq!(h.queue_ids(), ["B", "A"]);
}

#[test]
fn queue_edits_slide_the_prefetch_window() {
    let mut h = Harness::new();
    let tracks: Vec<Track> = (0..6).map(|i| track(&format!("T{i}"))).collect();
    h.queue_all(&tracks);

    let in_window = |h: &Harness, id: &str| h.playback.cache.entry(id).is_some();

    // Only the first five queued tracks are fetched
    assert!(in_window(&h, "T4"));
    assert!(!in_window(&h, "T5"));

    h.playback.remove_from_queue(0);
    assert!(!in_window(&h, "T0"));
    assert!(in_window(&h, "T5"));

    assert!(h.playback.move_queue_item(4, 0));
    assert!(in_window(&h, "T5"));
    assert_eq!(h.playback.cache_stats().total, 5);
}

#[test]
fn play_queue_item_keeps_earlier_entries() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.queue_all(&[track("B"), track("C"), track("D")]);

    h.playback.play_queue_item(1);

    assert_eq!(h.current_id().as_deref(), Some("C"));
    assert_eq!(h.queue_ids(), ["B", "D"]);
    assert_eq!(h.history_ids(), ["A"]);
}

#[test]
fn shutdown_stops_and_cleans_cache() {
    let mut h = Harness::new();
    h.queue_all(&[track("A"), track("B")]);
    h.playback.play_playlist(vec![track("A"), track("B")], 0, None);
    assert_eq!(h.playback.cache_stats().total, 1);
    h.take_calls();

    h.playback.shutdown();

    assert_eq!(h.take_calls(), [EngineCall::Stop]);
    assert_eq!(h.playback.cache_stats(), CacheStats::default());
}

#[test]
fn late_start_of_a_replaced_track_is_dropped() {
    let mut h = Harness::new();
    let b = track("B");
    h.cache(&b);
    h.take_tasks();

    h.playback.play_song(b, false);
    assert_eq!(h.plays().len(), 1);

    // B's load is confirmed only after C was picked, C has no stream yet
    h.playback.play_song(track("C"), false);
    h.engine_event(PlayerEvent::Started);

    let state = h.playback.state();
    assert!(state.loading);
    assert!(state.transitioning);
    assert!(!state.playing);
    assert_eq!(h.current_id().as_deref(), Some("C"));

    h.resolve_and_start();

    let state = h.playback.state();
    assert!(!state.loading);
    assert!(!state.transitioning);
    assert!(state.playing);
}

#[test]
fn progress_of_the_new_load_refines_while_transitioning() {
    let mut h = Harness::new();
    h.playback.play_song(track("A"), false);
    let (token, track_id) = Harness::resolve_requests(&h.take_tasks())[0].clone();
    h.playback.on_stream_resolved(token, &track_id, stream_url("A"));

    h.engine_event(PlayerEvent::Progress {
        position: 0.4,
        duration: Some(182.5),
    });
    h.engine_event(PlayerEvent::Resumed);

    let state = h.playback.state();
    assert!(state.transitioning);
    assert!(!state.playing);
    assert_eq!(state.position, 0.4);
    assert_eq!(state.duration, 182.5);
}

#[test]
fn picking_an_ad_sends_the_current_track_to_history() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.queue_all(&[track("B")]);

    h.playback.play_song(ad(), false);

    assert_eq!(h.current_id().as_deref(), Some("B"));
    assert!(h.queue_ids().is_empty());
    assert_eq!(h.history_ids(), ["A"]);
}

#[test]
fn queued_ads_are_skipped_without_being_recorded() {
    let mut h = Harness::new();
    h.play(track("A"));
    h.queue_all(&[Track::new("ad2", "Promo", "Brand", 4), track("C")]);

    h.playback.play_song(ad(), false);

    assert_eq!(h.current_id().as_deref(), Some("C"));
    assert!(h.queue_ids().is_empty());
    assert_eq!(h.history_ids(), ["A"]);
}

#[test]
fn repeat_one_reloads_an_evicted_cached_file() {
    let mut h = Harness::new();
    h.playback.cycle_repeat_mode();
    h.playback.cycle_repeat_mode();
    let t = track("T");
    h.cache(&t);
    h.take_tasks();

    h.playback.play_song(t, false);
    h.engine_event(PlayerEvent::Started);
    assert!(!h.playback.is_cached("T"));
    h.take_calls();

    h.engine_event(PlayerEvent::SongEnd);

    // The deleted file is never handed to the engine
    assert!(h.plays().is_empty());
    let requests = Harness::resolve_requests(&h.take_tasks());
    assert_eq!(requests.len(), 1);
    assert!(h.playback.state().loading);

    let (token, track_id) = requests[0].clone();
    h.playback.on_stream_resolved(token, &track_id, stream_url("T"));
    assert_eq!(h.plays(), [stream_url("T")]);

    h.engine_event(PlayerEvent::Started);
    assert!(h.playback.state().playing);
    assert_eq!(h.current_id().as_deref(), Some("T"));
    assert!(h.history_ids().is_empty());
}

#[test]
fn replay_that_never_starts_is_released_by_the_timeout() {
    let mut h = Harness::new();
    h.playback.cycle_repeat_mode();
    h.playback.cycle_repeat_mode();
    h.queue_all(&[track("B")]);
    h.play(track("A"));

    h.engine_event(PlayerEvent::SongEnd);
    assert_eq!(h.plays(), [stream_url("A")]);
    assert!(h.playback.state().transitioning);

    let token = h.loaded_generation();
    h.engine_event(PlayerEvent::Stopped);
    h.playback.on_loading_timeout(token);

    assert_eq!(h.current_id().as_deref(), Some("B"));
    assert_eq!(h.history_ids(), ["A"]);
}
