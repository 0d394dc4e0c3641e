//! Terminal input (engine-facing).
//!
//! Maps `crossterm` key events onto [`crate::types::GameKey`] and keeps a
//! frame-latched keyboard state that the core polls through
//! [`crate::types::InputSource`]. Works on terminals without key-release
//! events.

pub mod handler;
pub mod map;

pub use beat_tetris_types as types;

pub use handler::KeyboardState;
pub use map::{map_key, should_quit};
