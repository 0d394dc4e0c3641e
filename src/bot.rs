//! Scripted player for headless runs.
//!
//! For every new piece the bot picks a rotation count and a target column
//! from its own seeded generator, taps Rotate and Left/Right until it gets
//! there (or gives up), then holds Down. Now and then it saves a piece
//! instead.

use crate::core::{Animator, PlaybackSource, ShapeGenerator, SimpleRng, TurnOrchestrator};
use crate::types::{GameKey, InputSource, KeyState, BOARD_WIDTH};

/// Taps spent on sideways movement before the bot starts falling anyway.
const MAX_SIDEWAYS_TAPS: u8 = 12;

/// One save in this many pieces.
const SAVE_EVERY: u32 = 5;

#[derive(Debug, Clone)]
pub struct ScriptedBot {
    keys: KeyState,
    rng: SimpleRng,
    piece_id: Option<u32>,
    rotations_left: u8,
    target_x: i8,
    sideways_taps: u8,
    save_pending: bool,
}

impl ScriptedBot {
    pub fn new(seed: u32) -> Self {
        Self {
            keys: KeyState::new(),
            rng: SimpleRng::new(seed),
            piece_id: None,
            rotations_left: 0,
            target_x: 0,
            sideways_taps: 0,
            save_pending: false,
        }
    }

    /// Keys for the coming frame, planned from the session's current state.
    pub fn plan<P, G, A>(&mut self, game: &TurnOrchestrator<P, G, A>) -> &KeyState
    where
        P: PlaybackSource,
        G: ShapeGenerator,
        A: Animator,
    {
        self.keys.end_frame();

        let Some(piece) = game.piece() else {
            self.piece_id = None;
            self.keys.release_all();
            return &self.keys;
        };

        if self.piece_id != Some(piece.id()) {
            self.keys.release_all();
            self.piece_id = Some(piece.id());
            self.rotations_left = self.rng.next_range(4) as u8;
            self.target_x = self.rng.next_range(BOARD_WIDTH as u32 - 1) as i8;
            self.sideways_taps = 0;
            self.save_pending = !game.saved_since_spawn() && self.rng.next_range(SAVE_EVERY) == 0;
            return &self.keys;
        }

        if self.save_pending {
            self.save_pending = false;
            self.tap(GameKey::Save);
            return &self.keys;
        }

        // Wait for queued work so taps are not wasted on a busy piece.
        if piece.pending_requests() > 0 {
            return &self.keys;
        }

        if self.rotations_left > 0 {
            if self.tap(GameKey::Rotate) {
                self.rotations_left -= 1;
            }
            return &self.keys;
        }

        let left = piece.cells().iter().map(|&(x, _)| x).min().unwrap_or(0);
        if left != self.target_x && self.sideways_taps < MAX_SIDEWAYS_TAPS {
            let key = if left > self.target_x {
                GameKey::Left
            } else {
                GameKey::Right
            };
            if self.tap(key) {
                self.sideways_taps += 1;
            }
            return &self.keys;
        }

        self.keys.press(GameKey::Down);
        &self.keys
    }

    /// Press `key` if it is up, release it otherwise; true on the press.
    fn tap(&mut self, key: GameKey) -> bool {
        if self.keys.held(key) {
            self.keys.release(key);
            false
        } else {
            self.keys.press(key);
            true
        }
    }
}
