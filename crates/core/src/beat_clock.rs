//! Beat clock - maps playback position onto the music's beat grid
//!
//! The clock holds a table of reference beat offsets measured on the
//! nominal-tempo recording. When a faster recording is playing, every offset
//! is divided by the speed ratio `nominal_duration / clip_duration`, then
//! shifted by a configurable time offset.
//!
//! The clock is polled once per frame with the playback source. Each poll
//! samples position and clip length (so track swaps are picked up
//! immediately) and derives the number of beat boundaries crossed since the
//! previous poll. Every other query works on the sampled values.
//!
//! # Ticks
//!
//! - First poll: the current beat is recorded, 0 ticks.
//! - Paused: 0 ticks. The last recorded beat is kept, so boundaries crossed
//!   during a pause arrive as a burst on the first running poll.
//! - Otherwise: `(current - last) mod len`, so wrapping past the end of the
//!   table never produces a negative count.

use tracing::trace;

use crate::beat_table::{NOMINAL_BEAT_SECS, NOMINAL_DURATION_SECS, THEME_BEATS};
use crate::error::{CoreError, Result};
use crate::playback::PlaybackSource;
use crate::types::ON_BEAT_TOLERANCE_SECS;

/// One interval of the beat grid, in clip time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beat {
    pub start: f64,
    pub end: f64,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct BeatClock {
    offsets: Vec<f64>,
    nominal_duration: f64,
    reference_beat: f64,
    speed: f64,
    offset: f64,
    position: f64,
    clip_duration: f64,
    paused: bool,
    ticks: u32,
    last_beat: Option<Beat>,
}

impl BeatClock {
    /// Build a clock over `offsets` (seconds at nominal tempo).
    ///
    /// Offsets must be non-empty, strictly increasing and end before
    /// `nominal_duration`.
    pub fn new(offsets: Vec<f64>, nominal_duration: f64) -> Result<Self> {
        if !(nominal_duration.is_finite() && nominal_duration > 0.0) {
            return Err(CoreError::InvalidDuration {
                what: "nominal duration",
                value: nominal_duration,
            });
        }
        if offsets.is_empty() {
            return Err(CoreError::InvalidBeatTable { index: 0 });
        }
        for (index, pair) in offsets.windows(2).enumerate() {
            if !(pair[0] < pair[1]) {
                return Err(CoreError::InvalidBeatTable { index: index + 1 });
            }
        }
        let last = offsets.len() - 1;
        if !(offsets[last] < nominal_duration) {
            return Err(CoreError::InvalidBeatTable { index: last });
        }

        let reference_beat = nominal_duration / offsets.len() as f64;
        Ok(Self {
            offsets,
            nominal_duration,
            reference_beat,
            speed: 1.0,
            offset: 0.0,
            position: 0.0,
            clip_duration: nominal_duration,
            paused: false,
            ticks: 0,
            last_beat: None,
        })
    }

    /// Clock over the bundled theme's beat table.
    pub fn theme() -> Self {
        Self {
            offsets: THEME_BEATS.to_vec(),
            nominal_duration: NOMINAL_DURATION_SECS,
            reference_beat: NOMINAL_BEAT_SECS,
            speed: 1.0,
            offset: 0.0,
            position: 0.0,
            clip_duration: NOMINAL_DURATION_SECS,
            paused: false,
            ticks: 0,
            last_beat: None,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn beat_count(&self) -> usize {
        self.offsets.len()
    }

    /// Playback speed relative to the nominal recording.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Seconds per reference beat at the current speed.
    pub fn tempo(&self) -> f64 {
        self.reference_beat / self.speed
    }

    /// Clip position sampled by the last poll.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn clip_duration(&self) -> f64 {
        self.clip_duration
    }

    /// Beat boundaries crossed between the last two polls.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Forget the recorded beat; the next poll reports 0 ticks.
    pub fn restart(&mut self) {
        self.last_beat = None;
        self.ticks = 0;
    }

    /// Sample the playback source and derive this frame's tick count.
    pub fn poll<P: PlaybackSource + ?Sized>(&mut self, playback: &P) -> Result<u32> {
        let clip_duration = playback.clip_duration();
        if !(clip_duration.is_finite() && clip_duration > 0.0) {
            return Err(CoreError::InvalidDuration {
                what: "clip duration",
                value: clip_duration,
            });
        }
        self.clip_duration = clip_duration;
        self.speed = self.nominal_duration / clip_duration;
        self.position = playback.position();

        if self.paused {
            self.ticks = 0;
            return Ok(0);
        }

        let current = self.beat_at(self.position);
        let Some(last) = self.last_beat.replace(current) else {
            self.ticks = 0;
            return Ok(0);
        };

        let len = self.offsets.len() as i64;
        let mut delta = current.index as i64 - last.index as i64;
        if delta < 0 {
            delta += len;
        }
        self.ticks = delta as u32;
        if self.ticks > 0 {
            trace!(ticks = self.ticks, beat = current.index, "beat");
        }
        Ok(self.ticks)
    }

    fn beat_time(&self, index: usize) -> f64 {
        self.offsets[index] / self.speed + self.offset
    }

    fn track_end(&self) -> f64 {
        self.nominal_duration / self.speed + self.offset
    }

    /// The beat interval containing `time`.
    ///
    /// Times outside every interval resolve to the final interval.
    pub fn beat_at(&self, time: f64) -> Beat {
        let last = self.offsets.len() - 1;
        for index in 0..=last {
            let start = self.beat_time(index);
            let end = if index == last {
                self.track_end()
            } else {
                self.beat_time(index + 1)
            };
            if time >= start && time < end {
                return Beat { start, end, index };
            }
        }
        Beat {
            start: self.beat_time(last),
            end: self.track_end(),
            index: last,
        }
    }

    pub fn current_beat(&self) -> Beat {
        self.beat_at(self.position)
    }

    /// Seconds until the boundary `steps` beats after the current one.
    pub fn time_to_future_beat(&self, steps: usize) -> f64 {
        let current = self.current_beat();
        let boundary = self.beat_time((current.index + steps) % self.offsets.len());
        if boundary < self.position {
            // Wrapped past the end of the clip.
            self.clip_duration - self.position + boundary
        } else {
            boundary - self.position
        }
    }

    /// Seconds until the next beat boundary.
    pub fn time_to_next_beat(&self) -> f64 {
        self.time_to_future_beat(1)
    }

    /// Seconds until the end of the beat that contains `position + lookahead`.
    pub fn time_to_nearest_beat(&self, lookahead: f64) -> f64 {
        self.beat_at(self.position + lookahead).end - self.position
    }

    /// Whether playback sits just after a beat start.
    pub fn is_on_beat(&self) -> bool {
        self.position - self.current_beat().start < ON_BEAT_TOLERANCE_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{LoopingPlayback, TempoTrack};

    const EPS: f64 = 1e-9;

    fn clock() -> BeatClock {
        BeatClock::new(vec![0.0, 1.0, 2.0, 3.0], 4.0).unwrap()
    }

    fn playback(duration: f64) -> LoopingPlayback {
        LoopingPlayback::new(TempoTrack::new("test", duration))
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(
            BeatClock::new(vec![], 4.0),
            Err(CoreError::InvalidBeatTable { index: 0 })
        ));
        assert!(matches!(
            BeatClock::new(vec![0.0, 1.0, 1.0], 4.0),
            Err(CoreError::InvalidBeatTable { index: 2 })
        ));
        assert!(matches!(
            BeatClock::new(vec![0.0, 5.0], 4.0),
            Err(CoreError::InvalidBeatTable { index: 1 })
        ));
        assert!(matches!(
            BeatClock::new(vec![0.0], 0.0),
            Err(CoreError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_theme_table_is_strictly_increasing() {
        assert!(BeatClock::new(THEME_BEATS.to_vec(), NOMINAL_DURATION_SECS).is_ok());
        assert_eq!(BeatClock::theme().beat_count(), THEME_BEATS.len());
    }

    #[test]
    fn test_beat_at_nominal_speed() {
        let clock = clock();
        assert_eq!(
            clock.beat_at(1.5),
            Beat {
                start: 1.0,
                end: 2.0,
                index: 1
            }
        );
        // Final interval ends at the track end.
        assert_eq!(
            clock.beat_at(3.5),
            Beat {
                start: 3.0,
                end: 4.0,
                index: 3
            }
        );
        // Past the track end resolves to the final interval.
        assert_eq!(clock.beat_at(9.0).index, 3);
    }

    #[test]
    fn test_beat_at_scales_with_speed_and_offset() {
        let mut clock = clock().with_offset(0.25);
        clock.poll(&playback(2.0)).unwrap();
        assert!((clock.speed() - 2.0).abs() < EPS);

        let beat = clock.beat_at(1.0);
        assert_eq!(beat.index, 1);
        assert!((beat.start - 0.75).abs() < EPS);
        assert!((beat.end - 1.25).abs() < EPS);

        let last = clock.beat_at(2.0);
        assert_eq!(last.index, 3);
        assert!((last.end - 2.25).abs() < EPS);
    }

    #[test]
    fn test_ticks_count_crossings() {
        let mut clock = clock();
        let mut playback = playback(4.0);
        playback.seek(0.5);

        // First poll only records.
        assert_eq!(clock.poll(&playback).unwrap(), 0);

        let mut total = 0;
        for _ in 0..3 {
            playback.advance(1.0);
            total += clock.poll(&playback).unwrap();
        }
        assert_eq!(total, 3);

        // Two boundaries in a single frame arrive together.
        let mut clock = self::clock();
        playback.seek(0.5);
        clock.poll(&playback).unwrap();
        playback.advance(2.0);
        assert_eq!(clock.poll(&playback).unwrap(), 2);

        // No boundary, no tick.
        playback.advance(0.1);
        assert_eq!(clock.poll(&playback).unwrap(), 0);
    }

    #[test]
    fn test_ticks_wrap_without_going_negative() {
        let mut clock = clock();
        let mut playback = playback(4.0);
        playback.seek(3.5);
        clock.poll(&playback).unwrap();

        playback.advance(1.0); // 0.5, index 0
        assert_eq!(clock.poll(&playback).unwrap(), 1);

        playback.seek(2.5);
        clock.poll(&playback).unwrap();
        playback.advance(2.0); // 0.5 again: 2 -> 0 via the wrap
        assert_eq!(clock.poll(&playback).unwrap(), 2);
    }

    #[test]
    fn test_paused_clock_reports_zero_then_bursts() {
        let mut clock = clock();
        let mut playback = playback(4.0);
        playback.seek(0.5);
        clock.poll(&playback).unwrap();

        clock.pause();
        playback.advance(1.0);
        assert_eq!(clock.poll(&playback).unwrap(), 0);
        playback.advance(1.0);
        assert_eq!(clock.poll(&playback).unwrap(), 0);
        assert_eq!(clock.ticks(), 0);

        clock.resume();
        assert_eq!(clock.poll(&playback).unwrap(), 2);
    }

    #[test]
    fn test_restart_rebaselines() {
        let mut clock = clock();
        let mut playback = playback(4.0);
        clock.poll(&playback).unwrap();
        playback.advance(2.5);
        clock.restart();
        assert_eq!(clock.poll(&playback).unwrap(), 0);
    }

    #[test]
    fn test_time_to_next_beat() {
        let mut clock = clock();
        let mut playback = playback(4.0);
        playback.seek(1.25);
        clock.poll(&playback).unwrap();
        assert!((clock.time_to_next_beat() - 0.75).abs() < EPS);

        // The last beat wraps to the start of the table.
        playback.seek(3.5);
        clock.poll(&playback).unwrap();
        assert!((clock.time_to_next_beat() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_time_to_nearest_beat() {
        let mut clock = clock();
        let mut playback = playback(4.0);
        playback.seek(1.5);
        clock.poll(&playback).unwrap();
        assert!((clock.time_to_nearest_beat(0.0) - 0.5).abs() < EPS);
        assert!((clock.time_to_nearest_beat(0.6) - 1.5).abs() < EPS);
    }

    #[test]
    fn test_is_on_beat() {
        let mut clock = clock();
        let mut playback = playback(4.0);
        playback.seek(1.05);
        clock.poll(&playback).unwrap();
        assert!(clock.is_on_beat());

        playback.seek(1.2);
        clock.poll(&playback).unwrap();
        assert!(!clock.is_on_beat());
    }

    #[test]
    fn test_poll_rejects_empty_clip() {
        let mut clock = clock();
        let playback = playback(0.0);
        assert!(clock.poll(&playback).is_err());
    }
}
