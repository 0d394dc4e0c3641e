//! Beat Tetris (workspace facade crate).
//!
//! Re-exports the member crates under `beat_tetris::{core,input,types}` and
//! carries the pieces the demo binary shares with the tests: the ASCII view
//! and the scripted headless player.

pub mod bot;
pub mod term;

pub use beat_tetris_core as core;
pub use beat_tetris_input as input;
pub use beat_tetris_types as types;
