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

//! Playback lifecycle and position tracking.
//!
//! MPV reports a file ending the same way whether it ran out of audio, was
//! replaced by a new file, or was stopped on request. [`Lifecycle`] keeps
//! enough state to tell those apart: a stop is only a natural end if nobody
//! asked for it and some of the track actually played, which filters out the
//! spurious stops MPV emits when a stream fails to start.
//!
//! Nothing here talks to MPV, the worker feeds engine events in and acts on
//! what comes back.

use std::time::Instant;

/// Playback time that must be observed before a stop counts as a natural end.
pub(crate) const MIN_PLAYED_SECS: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Phase {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

/// How an engine stop event was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopKind {
    /// Caused by a stop or a new load, never reported as a song end.
    Manual,
    /// The track played to its end.
    NaturalEnd,
    /// Stopped before any meaningful playback, typically a failed load.
    Glitch,
}

#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    phase: Phase,
    manual_stop: bool,
    played: f64,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// A new file is about to be loaded.
    ///
    /// Anything still loaded is going to be stopped first, so its stop event
    /// is flagged as manual.
    pub(crate) fn begin_load(&mut self) {
        if self.phase != Phase::Idle {
            self.manual_stop = true;
        }
        self.phase = Phase::Loading;
        self.played = 0.0;
    }

    /// A stop was requested.
    pub(crate) fn request_stop(&mut self) {
        if self.phase != Phase::Idle {
            self.manual_stop = true;
        }
        self.phase = Phase::Idle;
    }

    /// The engine started playing the loaded file.
    ///
    /// The stop event of a previous file always arrives before the new file
    /// starts, so any manual flag still raised here is left over and cleared.
    pub(crate) fn on_started(&mut self) {
        self.manual_stop = false;
        self.phase = Phase::Playing;
    }

    pub(crate) fn on_paused(&mut self) -> bool {
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            true
        } else {
            false
        }
    }

    pub(crate) fn on_resumed(&mut self) -> bool {
        if self.phase == Phase::Paused {
            self.phase = Phase::Playing;
            true
        } else {
            false
        }
    }

    /// Records playback progress of the current file.
    pub(crate) fn on_progress(&mut self, position: f64) {
        if self.phase == Phase::Playing || self.phase == Phase::Paused {
            self.played = self.played.max(position);
        }
    }

    /// Classifies a stop event from the engine.
    ///
    /// A natural end is reported at most once per loaded file, since the
    /// played time is reset when it is consumed.
    pub(crate) fn on_stopped(&mut self) -> StopKind {
        if self.manual_stop {
            self.manual_stop = false;
            // A new file may already be loading, that load is still pending
            if self.phase != Phase::Loading {
                self.phase = Phase::Idle;
            }
            return StopKind::Manual;
        }

        if self.phase == Phase::Idle {
            return StopKind::Manual;
        }

        let played = self.played;
        self.played = 0.0;
        self.phase = Phase::Idle;

        if played > MIN_PLAYED_SECS {
            StopKind::NaturalEnd
        } else {
            StopKind::Glitch
        }
    }
}

/// Tracks the playback position of the current file.
///
/// Real positions come from polling the engine. When a poll fails the
/// position is extrapolated from the last real sample and the wall time
/// elapsed since, which is accurate enough while playing.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PositionTracker {
    position: f64,
    duration: Option<f64>,
    sampled_at: Option<Instant>,
    precise: bool,
}

impl PositionTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Forgets everything, for a newly loaded file.
    pub(crate) fn reset(&mut self, known_duration: Option<f64>) {
        *self = Self {
            duration: known_duration.filter(|d| *d > 0.0),
            ..Self::default()
        };
    }

    /// Records a real position sample from the engine.
    pub(crate) fn observe(&mut self, position: f64, duration: Option<f64>, now: Instant) {
        self.position = position.max(0.0);
        if let Some(duration) = duration.filter(|d| *d > 0.0) {
            self.duration = Some(duration);
        }
        self.sampled_at = Some(now);
        self.precise = true;
    }

    /// Estimates the position from the last sample, while playing.
    pub(crate) fn extrapolate(&mut self, now: Instant) -> f64 {
        if let Some(sampled_at) = self.sampled_at {
            let elapsed = now.saturating_duration_since(sampled_at).as_secs_f64();
            self.position = self.clamp(self.position + elapsed);
        }
        self.sampled_at = Some(now);
        self.precise = false;
        self.position
    }

    /// Marks the clock as stopped, so time spent paused is not extrapolated.
    pub(crate) fn hold(&mut self) {
        self.sampled_at = None;
    }

    /// Jumps to `target`, clamped to the known duration.
    pub(crate) fn seek_to(&mut self, target: f64, now: Instant) -> f64 {
        self.position = self.clamp(target);
        if self.sampled_at.is_some() {
            self.sampled_at = Some(now);
        }
        self.position
    }

    pub(crate) fn position(&self) -> f64 {
        self.position
    }

    pub(crate) fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub(crate) fn is_precise(&self) -> bool {
        self.precise
    }

    fn clamp(&self, position: f64) -> f64 {
        clamp_position(position, self.duration)
    }
}

/// Clamps a position to `[0, duration]`, or only at zero if the duration is
/// not known.
pub(crate) fn clamp_position(position: f64, duration: Option<f64>) -> f64 {
    match duration.filter(|d| *d > 0.0) {
        Some(duration) => position.clamp(0.0, duration),
        None => position.max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn playing(played: f64) -> Lifecycle {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_load();
        lifecycle.on_started();
        lifecycle.on_progress(played);
        lifecycle
    }

    #[test]
    fn natural_end_after_playback() {
        let mut lifecycle = playing(120.0);

        assert_eq!(lifecycle.on_stopped(), StopKind::NaturalEnd);
        assert_eq!(lifecycle.phase(), Phase::Idle);
    }

    #[test]
    fn natural_end_is_reported_once() {
        let mut lifecycle = playing(120.0);

        assert_eq!(lifecycle.on_stopped(), StopKind::NaturalEnd);
        assert_eq!(lifecycle.on_stopped(), StopKind::Manual);
    }

    #[test]
    fn early_stop_is_a_glitch() {
        let mut lifecycle = playing(0.2);

        assert_eq!(lifecycle.on_stopped(), StopKind::Glitch);
    }

    #[test]
    fn failed_load_is_a_glitch() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_load();

        assert_eq!(lifecycle.on_stopped(), StopKind::Glitch);
        assert_eq!(lifecycle.phase(), Phase::Idle);
    }

    #[test]
    fn requested_stop_is_manual() {
        let mut lifecycle = playing(60.0);
        lifecycle.request_stop();

        assert_eq!(lifecycle.on_stopped(), StopKind::Manual);
        assert_eq!(lifecycle.phase(), Phase::Idle);
    }

    #[test]
    fn replacing_a_track_keeps_the_new_load_pending() {
        let mut lifecycle = playing(60.0);
        lifecycle.begin_load();

        assert_eq!(lifecycle.on_stopped(), StopKind::Manual);
        assert_eq!(lifecycle.phase(), Phase::Loading);

        lifecycle.on_started();
        assert!(lifecycle.is_playing());
    }

    #[test]
    fn stop_then_load_before_stop_event() {
        let mut lifecycle = playing(60.0);
        lifecycle.request_stop();
        lifecycle.begin_load();

        assert_eq!(lifecycle.on_stopped(), StopKind::Manual);
        assert_eq!(lifecycle.phase(), Phase::Loading);

        lifecycle.on_started();
        lifecycle.on_progress(30.0);
        assert_eq!(lifecycle.on_stopped(), StopKind::NaturalEnd);
    }

    #[test]
    fn leftover_manual_flag_is_cleared_on_start() {
        let mut lifecycle = playing(60.0);
        // Stop requested, but the engine never reports it
        lifecycle.request_stop();
        lifecycle.begin_load();
        lifecycle.on_started();
        lifecycle.on_progress(10.0);

        assert_eq!(lifecycle.on_stopped(), StopKind::NaturalEnd);
    }

    #[test]
    fn pause_and_resume() {
        let mut lifecycle = playing(1.0);

        assert!(lifecycle.on_paused());
        assert!(!lifecycle.on_paused());
        assert_eq!(lifecycle.phase(), Phase::Paused);
        assert!(lifecycle.on_resumed());
        assert!(!lifecycle.on_resumed());
        assert!(lifecycle.is_playing());
    }

    #[test]
    fn paused_natural_end_still_counts() {
        let mut lifecycle = playing(50.0);
        lifecycle.on_paused();

        assert_eq!(lifecycle.on_stopped(), StopKind::NaturalEnd);
    }

    #[test]
    fn tracker_extrapolates_from_last_sample() {
        let start = Instant::now();
        let mut tracker = PositionTracker::new();
        tracker.reset(Some(180.0));
        tracker.observe(10.0, None, start);
        assert!(tracker.is_precise());

        let position = tracker.extrapolate(start + Duration::from_millis(1500));

        assert!((position - 11.5).abs() < 1e-9);
        assert!(!tracker.is_precise());
        assert_eq!(tracker.duration(), Some(180.0));
    }

    #[test]
    fn tracker_extrapolation_stops_at_duration() {
        let start = Instant::now();
        let mut tracker = PositionTracker::new();
        tracker.reset(Some(20.0));
        tracker.observe(19.0, None, start);

        assert_eq!(tracker.extrapolate(start + Duration::from_secs(5)), 20.0);
    }

    #[test]
    fn tracker_does_not_extrapolate_while_held() {
        let start = Instant::now();
        let mut tracker = PositionTracker::new();
        tracker.observe(10.0, Some(100.0), start);
        tracker.hold();

        assert_eq!(tracker.extrapolate(start + Duration::from_secs(30)), 10.0);
    }

    #[test]
    fn seek_clamps_to_known_duration() {
        let now = Instant::now();
        let mut tracker = PositionTracker::new();
        tracker.reset(Some(100.0));
        tracker.observe(50.0, None, now);

        assert_eq!(tracker.seek_to(-30.0, now), 0.0);
        assert_eq!(tracker.seek_to(30.0, now), 30.0);
        assert_eq!(tracker.seek_to(550.0, now), 100.0);
    }

    #[test]
    fn seek_without_duration_only_clamps_at_zero() {
        let now = Instant::now();
        let mut tracker = PositionTracker::new();
        tracker.reset(None);

        assert_eq!(tracker.seek_to(-5.0, now), 0.0);
        assert_eq!(tracker.seek_to(500.0, now), 500.0);
        assert_eq!(clamp_position(500.0, Some(0.0)), 500.0);
    }

    #[test]
    fn reset_ignores_unknown_duration() {
        let mut tracker = PositionTracker::new();
        tracker.observe(42.0, Some(200.0), Instant::now());
        tracker.reset(Some(0.0));

        assert_eq!(tracker.position(), 0.0);
        assert_eq!(tracker.duration(), None);
    }
}
