//! Keyboard state for terminal environments.
//!
//! Feeds crossterm key events into a frame-latched [`KeyState`]. Terminals
//! that never emit key-release events are handled with a timeout: a key that
//! has not been pressed or repeated for a while counts as released.

use crossterm::event::{KeyEvent, KeyEventKind};

use crate::map::map_key;
use crate::types::{GameKey, InputSource, KeyState};

// Keys not pressed or repeated within this window count as released.
const DEFAULT_KEY_RELEASE_TIMEOUT_SECS: f64 = 0.15;

/// Tracks which game keys are down, with edges latched per frame.
#[derive(Debug, Clone)]
pub struct KeyboardState {
    keys: KeyState,
    /// Game time each held key was last seen, indexed like `GameKey::ALL`.
    last_seen: [Option<f64>; 5],
    key_release_timeout: f64,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardState {
    pub fn new() -> Self {
        Self {
            keys: KeyState::new(),
            last_seen: [None; 5],
            key_release_timeout: DEFAULT_KEY_RELEASE_TIMEOUT_SECS,
        }
    }

    pub fn with_key_release_timeout(mut self, seconds: f64) -> Self {
        self.key_release_timeout = seconds;
        self
    }

    pub fn key_release_timeout(&self) -> f64 {
        self.key_release_timeout
    }

    fn slot(key: GameKey) -> usize {
        GameKey::ALL
            .iter()
            .position(|&k| k == key)
            .unwrap_or_default()
    }

    /// Apply a terminal key event seen at game time `now`.
    ///
    /// Returns the game key it mapped to, if any.
    pub fn handle_key_event(&mut self, event: KeyEvent, now: f64) -> Option<GameKey> {
        let key = map_key(event.code)?;
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.press(key, now),
            KeyEventKind::Release => self.release(key),
        }
        Some(key)
    }

    pub fn press(&mut self, key: GameKey, now: f64) {
        self.keys.press(key);
        self.last_seen[Self::slot(key)] = Some(now);
    }

    pub fn release(&mut self, key: GameKey) {
        self.keys.release(key);
        self.last_seen[Self::slot(key)] = None;
    }

    /// Auto-release keys that went quiet for longer than the timeout.
    pub fn update(&mut self, now: f64) {
        for key in GameKey::ALL {
            let slot = Self::slot(key);
            if let Some(seen) = self.last_seen[slot] {
                if now - seen > self.key_release_timeout {
                    self.release(key);
                }
            }
        }
    }

    /// Clear this frame's edges once the core has consumed them.
    pub fn end_frame(&mut self) {
        self.keys.end_frame();
    }

    pub fn state(&self) -> &KeyState {
        &self.keys
    }
}

impl InputSource for KeyboardState {
    fn pressed(&self, key: GameKey) -> bool {
        self.keys.pressed(key)
    }

    fn held(&self, key: GameKey) -> bool {
        self.keys.held(key)
    }

    fn released(&self, key: GameKey) -> bool {
        self.keys.released(key)
    }
}
