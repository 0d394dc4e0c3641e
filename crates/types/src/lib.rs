//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, input mapping, demo runner).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: (3, 0) for every shape
//!
//! Everything above row 0 is open space: pieces may poke out of the top
//! after a rotation kick, but only rows `0..BOARD_HEIGHT` hold settled cells.
//!
//! # Timing Constants
//!
//! Game time is measured in seconds (`f64`). Beat pacing comes from the music
//! track; the values below are the wall-clock timers layered on top of it.
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FIXED_STEP_SECS` | 0.02 | Fixed simulation step (lock polling, settle waits) |
//! | `HARD_TERMINATE_SECS` | 3.0 | Grounded time before the turn ends regardless of movement |
//! | `SOFT_TERMINATE_SECS` | 1.0 | Grounded time without movement before the turn ends |
//! | `INPUT_REPEAT_SECS` | 0.1 | Repeat interval for held left/right |
//! | `ON_BEAT_TOLERANCE_SECS` | 0.1 | Window after a beat start that still counts as "on beat" |
//!
//! # Examples
//!
//! ```
//! use beat_tetris_types::{Direction, GameKey, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//!
//! assert_eq!(Direction::Down.delta(), (0, 1));
//! assert_eq!(GameKey::from_str("save"), Some(GameKey::Save));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Spawn origin for new pieces (x, y)
pub const SPAWN_POSITION: (i8, i8) = (3, 0);

/// Fixed simulation step in seconds.
pub const FIXED_STEP_SECS: f64 = 0.02;

/// Delay from first ground contact until the turn ends, even if the player keeps moving.
pub const HARD_TERMINATE_SECS: f64 = 3.0;

/// Delay from the last grounded movement until the turn ends.
pub const SOFT_TERMINATE_SECS: f64 = 1.0;

/// How often a held left/right key counts as a fresh input.
pub const INPUT_REPEAT_SECS: f64 = 0.1;

/// Tolerance after a beat start within which the clock reports "on beat".
pub const ON_BEAT_TOLERANCE_SECS: f64 = 0.1;

/// Bounds for a single move/rotate animation.
pub const MIN_MOVE_ANIMATION_SECS: f64 = 0.001;
pub const MAX_MOVE_ANIMATION_SECS: f64 = 0.1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_timers_are_ordered() {
        assert!(SOFT_TERMINATE_SECS < HARD_TERMINATE_SECS);
        assert!(INPUT_REPEAT_SECS < SOFT_TERMINATE_SECS);
        assert!(MIN_MOVE_ANIMATION_SECS < MAX_MOVE_ANIMATION_SECS);
    }

    #[test]
    fn key_round_trip_names() {
        for key in GameKey::ALL {
            assert_eq!(GameKey::from_str(key.as_str()), Some(key));
        }
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn key_state_edges_last_one_frame() {
        let mut keys = KeyState::new();
        keys.press(GameKey::Left);
        assert!(keys.pressed(GameKey::Left));
        assert!(keys.held(GameKey::Left));

        keys.end_frame();
        assert!(!keys.pressed(GameKey::Left));
        assert!(keys.held(GameKey::Left));

        keys.release(GameKey::Left);
        assert!(keys.released(GameKey::Left));
        assert!(!keys.held(GameKey::Left));

        keys.end_frame();
        assert!(!keys.released(GameKey::Left));
    }

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut keys = KeyState::new();
        keys.press(GameKey::Rotate);
        keys.end_frame();
        keys.press(GameKey::Rotate);
        assert!(!keys.pressed(GameKey::Rotate));
    }
}

/// The seven tetromino shapes
///
/// - **I**: horizontal bar
/// - **O**: 2x2 square
/// - **T**: T-shaped
/// - **S**: S-shaped
/// - **Z**: Z-shaped (mirror of S)
/// - **J**: J-shaped
/// - **L**: L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every shape, in declaration order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use beat_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// Orientation of an active piece, counted in counter-clockwise quarter turns.
///
/// The rotation cycle goes: North → West → South → East → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate counter-clockwise
    ///
    /// # Examples
    ///
    /// ```
    /// use beat_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_ccw(), Rotation::West);
    /// assert_eq!(Rotation::East.rotate_ccw(), Rotation::North);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }
}

/// Unit displacement directions on the board (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
}

impl Direction {
    /// Single-cell displacement `(dx, dy)`.
    pub fn delta(&self) -> (i8, i8) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
        }
    }

    /// Displacement of `steps` cells in this direction.
    pub fn scaled(&self, steps: i8) -> (i8, i8) {
        let (dx, dy) = self.delta();
        (dx * steps, dy * steps)
    }
}

/// Logical keys the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKey {
    Left,
    Right,
    Down,
    Rotate,
    Save,
}

impl GameKey {
    pub const ALL: [GameKey; 5] = [
        GameKey::Left,
        GameKey::Right,
        GameKey::Down,
        GameKey::Rotate,
        GameKey::Save,
    ];

    /// Parse key from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(GameKey::Left),
            "right" => Some(GameKey::Right),
            "down" => Some(GameKey::Down),
            "rotate" => Some(GameKey::Rotate),
            "save" | "hold" => Some(GameKey::Save),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKey::Left => "left",
            GameKey::Right => "right",
            GameKey::Down => "down",
            GameKey::Rotate => "rotate",
            GameKey::Save => "save",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Per-frame view of the player's keys.
///
/// `pressed` and `released` are edges that are true for exactly one frame;
/// `held` is the level between them.
pub trait InputSource {
    fn pressed(&self, key: GameKey) -> bool;
    fn held(&self, key: GameKey) -> bool;
    fn released(&self, key: GameKey) -> bool;
}

/// Frame-latched key state backed by three bitsets.
///
/// Feed it `press`/`release` as events arrive and call `end_frame` once the
/// core has consumed the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pressed: u8,
    held: u8,
    released: u8,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: GameKey) {
        if self.held & key.bit() == 0 {
            self.pressed |= key.bit();
        }
        self.held |= key.bit();
    }

    pub fn release(&mut self, key: GameKey) {
        if self.held & key.bit() != 0 {
            self.released |= key.bit();
        }
        self.held &= !key.bit();
    }

    /// Clear the one-frame edges.
    pub fn end_frame(&mut self) {
        self.pressed = 0;
        self.released = 0;
    }

    /// Release everything (edges included).
    pub fn release_all(&mut self) {
        for key in GameKey::ALL {
            self.release(key);
        }
    }
}

impl InputSource for KeyState {
    fn pressed(&self, key: GameKey) -> bool {
        self.pressed & key.bit() != 0
    }

    fn held(&self, key: GameKey) -> bool {
        self.held & key.bit() != 0
    }

    fn released(&self, key: GameKey) -> bool {
        self.released & key.bit() != 0
    }
}

/// Cell on the board (None = empty, Some = settled cell of a shape)
pub type Cell = Option<PieceKind>;

/// Absolute board coordinate `(x, y)`.
pub type CellPos = (i8, i8);
