//! Beat Tetris runner (default binary).
//!
//! Interactive by default: crossterm raw mode for input and a plain ASCII
//! board redrawn every frame. Set `BEAT_TETRIS_HEADLESS=1` to let the
//! scripted bot play for a fixed number of frames and print a JSON summary.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use beat_tetris::bot::ScriptedBot;
use beat_tetris::core::{GameConfig, TurnEvent, TurnOrchestrator, UniformShapes};
use beat_tetris::input::{should_quit, KeyboardState};
use beat_tetris::term::{render_lines, TerminalRenderer};
use beat_tetris::types::FIXED_STEP_SECS;

const HEADLESS_ENV: &str = "BEAT_TETRIS_HEADLESS";
const FRAMES_ENV: &str = "BEAT_TETRIS_FRAMES";
const DEFAULT_HEADLESS_FRAMES: u32 = 30_000;

fn main() -> Result<()> {
    let headless = std::env::var(HEADLESS_ENV)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);
    init_tracing(if headless { "info" } else { "warn" });

    let config = GameConfig::from_env()?;
    info!(seed = config.seed, headless, "starting");

    if headless {
        return run_headless(&config);
    }

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_headless(config: &GameConfig) -> Result<()> {
    let frames = std::env::var(FRAMES_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_HEADLESS_FRAMES);

    let mut game = TurnOrchestrator::simulated(config, UniformShapes::new(config.seed));
    let mut bot = ScriptedBot::new(config.seed);

    let mut played = 0u32;
    for _ in 0..frames {
        let keys = *bot.plan(&game);
        if let Err(err) = game.advance(&keys) {
            if err.is_invariant_violation() {
                error!(%err, frame = played, "piece lock invariant broken");
            }
            return Err(err.into());
        }
        played += 1;
        if game.is_game_over() {
            break;
        }
    }

    let summary = json!({
        "seed": config.seed,
        "frames": played,
        "game_time": game.now(),
        "game_over": game.is_game_over(),
        "speed": game.clock().speed(),
        "track": game.playback().track().name,
        "stats": game.stats(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run(term: &mut TerminalRenderer, config: &GameConfig) -> Result<()> {
    let mut game = TurnOrchestrator::simulated(config, UniformShapes::new(config.seed));
    let mut keyboard = KeyboardState::new();

    let step = Duration::from_secs_f64(FIXED_STEP_SECS);
    let mut last_step = Instant::now();

    loop {
        term.draw(&render_lines(&game))?;

        // Input with timeout until next step.
        let timeout = step
            .checked_sub(last_step.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if should_quit(key) {
                    return Ok(());
                }
                keyboard.handle_key_event(key, game.now());
            }
        }

        if last_step.elapsed() >= step {
            last_step = Instant::now();

            keyboard.update(game.now());
            for event in game.advance(&keyboard)? {
                if let TurnEvent::TempoUp { track, speed } = &event {
                    info!(track = %track.name, speed, "tempo up");
                }
            }
            keyboard.end_frame();

            if game.is_game_over() {
                warn!("game over");
                term.draw(&render_lines(&game))?;
                // Leave the final board up until any key.
                loop {
                    if let Event::Key(_) = event::read()? {
                        return Ok(());
                    }
                }
            }
        }
    }
}
