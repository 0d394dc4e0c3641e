//! Beat clock and timer behaviour through the public API

use beat_tetris::core::{BeatClock, LoopingPlayback, PlaybackSource, TempoTrack, TempoTracks, Timer};

fn short_clock() -> (BeatClock, LoopingPlayback) {
    let clock = BeatClock::new(vec![0.0, 0.5, 1.0, 1.5], 2.0).unwrap();
    (clock, LoopingPlayback::new(TempoTrack::new("normal", 2.0)))
}

#[test]
fn test_one_tick_per_beat_over_a_full_loop() {
    let (mut clock, mut playback) = short_clock();
    clock.poll(&playback).unwrap();

    let mut ticks = 0;
    // 0.25 s steps over two full loops of the clip.
    for _ in 0..16 {
        playback.advance(0.25);
        ticks += clock.poll(&playback).unwrap();
    }
    assert_eq!(ticks, 8);
}

#[test]
fn test_pause_defers_ticks_to_resume() {
    let (mut clock, mut playback) = short_clock();
    playback.seek(0.25);
    clock.poll(&playback).unwrap();

    clock.pause();
    playback.seek(1.25);
    assert_eq!(clock.poll(&playback).unwrap(), 0);
    assert_eq!(clock.ticks(), 0);

    clock.resume();
    assert_eq!(clock.poll(&playback).unwrap(), 2);
}

#[test]
fn test_faster_clip_compresses_the_grid() {
    let (mut clock, mut playback) = short_clock();
    playback.switch_clip(&TempoTrack::new("double", 1.0));
    playback.seek(0.3);
    clock.poll(&playback).unwrap();

    assert_eq!(clock.speed(), 2.0);
    let beat = clock.current_beat();
    assert_eq!(beat.index, 1);
    assert_eq!(beat.start, 0.25);
    assert_eq!(beat.end, 0.5);
    assert!((clock.time_to_next_beat() - 0.2).abs() < 1e-9);
}

#[test]
fn test_tempo_ladder_ratchets_to_the_fastest() {
    let tracks = TempoTracks::theme_ladder();
    let mut playback = LoopingPlayback::new(tracks.slowest().unwrap().clone());

    let mut last = playback.clip_duration();
    let mut ups = 0;
    while let Some(track) = tracks.escalate(&mut playback) {
        assert!(track.duration < last);
        last = track.duration;
        ups += 1;
    }
    assert_eq!(ups, tracks.tracks().len() - 1);
    assert!(tracks.escalate(&mut playback).is_none());
}

#[test]
fn test_timer_pause_keeps_remaining_time() {
    let mut timer = Timer::new(1.0, true, 0.0);
    timer.pause(0.25);
    assert_eq!(timer.on_update(10.0), 0);

    timer.resume(4.0);
    assert_eq!(timer.on_update(4.5), 0);
    assert_eq!(timer.on_update(4.75), 1);
    assert_eq!(timer.on_update(5.0), 0);
}
