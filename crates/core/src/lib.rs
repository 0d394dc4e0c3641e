//! Core game logic - a falling-block game driven by a music beat
//!
//! Everything here is single threaded and advanced once per fixed step with
//! an explicit game time. There is no rendering, audio or terminal code in
//! this crate: playback and animation are collaborator traits
//! ([`PlaybackSource`], [`Animator`]) with headless implementations used by
//! the demo runner and the tests.
//!
//! # Module Structure
//!
//! - [`beat_clock`]: beat table, tick detection and beat-relative queries
//! - [`timer`]: pausable single-tick countdown
//! - [`piece`]: the active shape, its lock and its request state machine
//! - [`rows`]: full-row detection
//! - [`turn`]: spawn, save, termination and row clearing
//! - [`board`]: 10x20 grid with collision queries
//! - [`shapes`]: shape layouts and counter-clockwise rotation with kicks
//! - [`playback`] and [`animation`]: collaborator seams
//! - [`config`]: JSON/env configuration
//!
//! # Game Rules
//!
//! - The active piece falls one row per beat.
//! - Holding Down falls `2, 4, 8, ...` rows per beat.
//! - Every mutation of a piece owns the piece's lock while its animation
//!   plays; requests are granted one at a time in arrival order.
//! - A grounded piece terminates after one quiet second (soft timer) or
//!   three seconds of contact (hard timer), whichever comes first.
//! - Clearing rows switches the music to a faster recording.
//!
//! # Example
//!
//! ```
//! use beat_tetris_core::{GameConfig, TurnOrchestrator, UniformShapes};
//! use beat_tetris_core::types::KeyState;
//!
//! let config = GameConfig::default();
//! let mut game = TurnOrchestrator::simulated(&config, UniformShapes::new(config.seed));
//! let input = KeyState::new();
//!
//! // A few seconds of game time is enough for the first piece to spawn.
//! for _ in 0..1000 {
//!     game.advance(&input).unwrap();
//!     if game.piece().is_some() {
//!         break;
//!     }
//! }
//! assert!(game.piece().is_some());
//! assert_eq!(game.stats().pieces_spawned, 1);
//! ```

pub mod animation;
pub mod beat_clock;
pub mod beat_table;
pub mod board;
pub mod config;
pub mod error;
pub mod piece;
pub mod playback;
pub mod rng;
pub mod rows;
pub mod shapes;
pub mod timer;
pub mod turn;

pub use beat_tetris_types as types;

// Re-export commonly used types for convenience
pub use animation::{AnimationHandle, AnimationStatus, Animator, TimedAnimator, Transition};
pub use beat_clock::{Beat, BeatClock};
pub use board::{Board, CollisionQuery};
pub use config::GameConfig;
pub use error::{CoreError, Result};
pub use piece::{
    Piece, PieceEvent, PieceOutcome, PieceRequest, PieceStatus, PieceTimings, RequestId,
    StepContext,
};
pub use playback::{LoopingPlayback, PlaybackSource, TempoTrack, TempoTracks};
pub use rng::{ScriptedShapes, ShapeGenerator, SimpleRng, UniformShapes};
pub use rows::{FullRow, Occupancy, RowScanner};
pub use shapes::{get_shape, try_rotate};
pub use timer::Timer;
pub use turn::{SaveRefusal, SessionStats, TurnEvent, TurnEvents, TurnOrchestrator, TurnPhase};
