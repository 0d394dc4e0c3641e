use criterion::{black_box, criterion_group, criterion_main, Criterion};
use beat_tetris::core::{
    BeatClock, Board, GameConfig, LoopingPlayback, RowScanner, TempoTrack, TurnOrchestrator,
    UniformShapes,
};
use beat_tetris::types::{KeyState, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, FIXED_STEP_SECS};

fn bench_session_step(c: &mut Criterion) {
    let config = GameConfig::default();
    let mut game = TurnOrchestrator::simulated(&config, UniformShapes::new(12345));
    let input = KeyState::new();

    c.bench_function("session_step_20ms", |b| {
        b.iter(|| {
            if game.is_game_over() {
                game = TurnOrchestrator::simulated(&config, UniformShapes::new(12345));
            }
            black_box(game.advance(&input).unwrap());
        })
    });
}

fn bench_clock_poll(c: &mut Criterion) {
    let mut clock = BeatClock::theme();
    let mut playback = LoopingPlayback::new(TempoTrack::at_speed(1.0));

    c.bench_function("theme_clock_poll", |b| {
        b.iter(|| {
            playback.advance(FIXED_STEP_SECS);
            black_box(clock.poll(&playback).unwrap());
        })
    });
}

fn bench_row_clear(c: &mut Criterion) {
    let scanner = RowScanner::new(BOARD_WIDTH as usize);

    c.bench_function("scan_and_clear_4_rows", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for y in (BOARD_HEIGHT as i8 - 4)..BOARD_HEIGHT as i8 {
                board.fill_row_except(y, &[], PieceKind::I);
            }
            let rows: Vec<i8> = scanner
                .full_rows(&board, BOARD_HEIGHT)
                .into_iter()
                .map(|row| row.y)
                .collect();
            black_box(board.clear_rows(&rows));
        })
    });
}

criterion_group!(benches, bench_session_step, bench_clock_poll, bench_row_clear);
criterion_main!(benches);
