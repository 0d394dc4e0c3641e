//! Playback module - the audio position source and its tempo tracks
//!
//! The core never outputs audio. It only needs to know where playback is
//! and how long the current clip is, and to swap the clip for a faster
//! recording of the same music. [`PlaybackSource`] is that seam;
//! [`LoopingPlayback`] is a simulated source advanced by game time.
//!
//! Tempo escalation is a ratchet: [`TempoTracks::escalate`] only ever moves
//! to a strictly shorter (faster) clip, picking the longest such clip so no
//! tier is skipped.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::beat_table::NOMINAL_DURATION_SECS;

/// A fixed-tempo recording of the theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoTrack {
    pub name: String,
    /// Clip length in seconds; shorter means faster.
    pub duration: f64,
}

impl TempoTrack {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }

    /// Recording of the nominal clip played `speed` times faster.
    pub fn at_speed(speed: f64) -> Self {
        Self::new(format!("theme@{speed:.2}x"), NOMINAL_DURATION_SECS / speed)
    }
}

/// Playback position provider polled once per frame.
pub trait PlaybackSource {
    /// Current position within the clip, in seconds.
    fn position(&self) -> f64;

    /// Length of the current clip, in seconds.
    fn clip_duration(&self) -> f64;

    /// Replace the clip, keeping the position proportional to the clip length.
    fn switch_clip(&mut self, track: &TempoTrack);
}

/// Simulated playback that loops a clip and advances with game time.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopingPlayback {
    track: TempoTrack,
    position: f64,
}

impl LoopingPlayback {
    pub fn new(track: TempoTrack) -> Self {
        Self {
            track,
            position: 0.0,
        }
    }

    pub fn track(&self) -> &TempoTrack {
        &self.track
    }

    /// Jump to an absolute clip position (wrapped into the clip).
    pub fn seek(&mut self, position: f64) {
        self.position = position.rem_euclid(self.track.duration);
    }

    /// Advance by `dt` seconds of game time, looping at clip end.
    pub fn advance(&mut self, dt: f64) {
        self.seek(self.position + dt);
    }
}

impl PlaybackSource for LoopingPlayback {
    fn position(&self) -> f64 {
        self.position
    }

    fn clip_duration(&self) -> f64 {
        self.track.duration
    }

    fn switch_clip(&mut self, track: &TempoTrack) {
        let relative = self.position / self.track.duration;
        self.track = track.clone();
        self.position = relative * self.track.duration;
    }
}

/// The set of alternate recordings available for escalation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TempoTracks {
    tracks: Vec<TempoTrack>,
}

impl TempoTracks {
    pub fn new(tracks: Vec<TempoTrack>) -> Self {
        Self { tracks }
    }

    /// Nominal clip plus six progressively faster recordings.
    pub fn theme_ladder() -> Self {
        Self::new(
            [1.0, 1.1, 1.2, 1.35, 1.5, 1.75, 2.0]
                .into_iter()
                .map(TempoTrack::at_speed)
                .collect(),
        )
    }

    pub fn tracks(&self) -> &[TempoTrack] {
        &self.tracks
    }

    /// The slowest track, used to start a session.
    pub fn slowest(&self) -> Option<&TempoTrack> {
        self.tracks
            .iter()
            .max_by(|a, b| a.duration.total_cmp(&b.duration))
    }

    /// Tracks strictly faster than a clip of `current_duration`.
    pub fn faster_than(&self, current_duration: f64) -> impl Iterator<Item = &TempoTrack> {
        self.tracks
            .iter()
            .filter(move |track| track.duration < current_duration)
    }

    /// The next tier up: the longest track still shorter than the current clip.
    pub fn next_faster(&self, current_duration: f64) -> Option<&TempoTrack> {
        self.faster_than(current_duration)
            .max_by(|a, b| a.duration.total_cmp(&b.duration))
    }

    /// Switch `playback` to the next tier. `None` when already at the fastest.
    pub fn escalate<P: PlaybackSource + ?Sized>(&self, playback: &mut P) -> Option<TempoTrack> {
        let current = playback.clip_duration();
        let Some(next) = self.next_faster(current) else {
            debug!(current, "no faster tempo track available");
            return None;
        };
        info!(
            track = %next.name,
            from = current,
            to = next.duration,
            "tempo up"
        );
        playback.switch_clip(next);
        Some(next.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks() -> TempoTracks {
        TempoTracks::new(vec![
            TempoTrack::new("slow", 60.0),
            TempoTrack::new("fastest", 30.0),
            TempoTrack::new("medium", 50.0),
            TempoTrack::new("fast", 40.0),
        ])
    }

    #[test]
    fn test_looping_playback_wraps() {
        let mut playback = LoopingPlayback::new(TempoTrack::new("t", 10.0));
        playback.advance(4.0);
        assert_eq!(playback.position(), 4.0);
        playback.advance(7.0);
        assert!((playback.position() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_switch_clip_rescales_position() {
        let mut playback = LoopingPlayback::new(TempoTrack::new("slow", 60.0));
        playback.seek(15.0);
        playback.switch_clip(&TempoTrack::new("fast", 40.0));
        assert_eq!(playback.clip_duration(), 40.0);
        assert!((playback.position() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_next_faster_never_skips_a_tier() {
        let tracks = tracks();
        assert_eq!(tracks.next_faster(60.0).unwrap().name, "medium");
        assert_eq!(tracks.next_faster(50.0).unwrap().name, "fast");
        assert_eq!(tracks.next_faster(40.0).unwrap().name, "fastest");
        assert!(tracks.next_faster(30.0).is_none());
    }

    #[test]
    fn test_escalate_ratchets_until_exhausted() {
        let tracks = tracks();
        let mut playback = LoopingPlayback::new(tracks.slowest().unwrap().clone());
        let mut previous = playback.clip_duration();
        let mut choices = tracks.faster_than(previous).count();

        while let Some(track) = tracks.escalate(&mut playback) {
            assert!(track.duration < previous);
            let remaining = tracks.faster_than(playback.clip_duration()).count();
            assert!(remaining < choices);
            previous = playback.clip_duration();
            choices = remaining;
        }

        assert_eq!(playback.track().name, "fastest");
        assert_eq!(choices, 0);
        // Exhausted: further requests are no-ops.
        assert!(tracks.escalate(&mut playback).is_none());
        assert_eq!(playback.track().name, "fastest");
    }

    #[test]
    fn test_theme_ladder_starts_at_nominal() {
        let ladder = TempoTracks::theme_ladder();
        let slowest = ladder.slowest().unwrap();
        assert!((slowest.duration - NOMINAL_DURATION_SECS).abs() < 1e-9);
        assert_eq!(ladder.faster_than(slowest.duration).count(), 6);
    }
}
