//! Piece module - the active falling shape and its lock
//!
//! Every mutation of a piece (move, rotate, terminate) is a request that
//! has to own the piece's lock before it runs. Requests queue up and the
//! piece grants the lock to one of them per fixed step, when the lock is
//! clear. A granted request keeps the lock across several steps while its
//! animation plays, its position snaps and its ground contact is checked.
//!
//! While the lock is held the three piece timers (hard terminate, soft
//! terminate, input repeat) and the beat clock's tick reporting are paused,
//! so a piece can never lock out in the middle of an animated move.
//!
//! # Grounding
//!
//! After every successful move or rotation, one step after the snap:
//!
//! - piece can still move down: both terminate timers are reset and stopped;
//! - otherwise the hard timer is started if it is not already running, and
//!   the soft timer is restarted.
//!
//! So movement buys time against the soft timer only; the hard timer keeps
//! counting from first contact.
//!
//! # Example
//!
//! ```
//! use beat_tetris_core::piece::{Piece, PieceTimings};
//! use beat_tetris_core::types::{Direction, PieceKind};
//!
//! let mut piece = Piece::spawn(1, PieceKind::T, PieceTimings::default(), 0.0);
//! let id = piece.move_if_possible(Direction::Left);
//! assert!(id.is_some());
//! assert_eq!(piece.pending_requests(), 1);
//! ```

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::{AnimationHandle, AnimationStatus, Animator, Transition};
use crate::beat_clock::BeatClock;
use crate::board::CollisionQuery;
use crate::error::{CoreError, Result};
use crate::shapes::{spawn_layout, translate, try_rotate, PieceShape};
use crate::timer::Timer;
use crate::types::{
    Direction, GameKey, InputSource, PieceKind, Rotation, BOARD_HEIGHT, HARD_TERMINATE_SECS,
    INPUT_REPEAT_SECS, MAX_MOVE_ANIMATION_SECS, MIN_MOVE_ANIMATION_SECS, SOFT_TERMINATE_SECS,
};

/// Largest fast-fall shift: a held Down never asks for more than `1 << 5` rows.
pub const MAX_FAST_FALL_SHIFT: u8 = 5;

/// Identifier handed out for every queued request.
pub type RequestId = u64;

/// Delays of the three per-piece timers, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceTimings {
    pub hard_terminate: f64,
    pub soft_terminate: f64,
    pub input_repeat: f64,
}

impl Default for PieceTimings {
    fn default() -> Self {
        Self {
            hard_terminate: HARD_TERMINATE_SECS,
            soft_terminate: SOFT_TERMINATE_SECS,
            input_repeat: INPUT_REPEAT_SECS,
        }
    }
}

/// Operations that need the piece lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceRequest {
    /// Single step, all or nothing.
    Move(Direction),
    /// Up to `at_most` steps, as many as fit.
    MoveAtMost { direction: Direction, at_most: u8 },
    /// Downward `MoveAtMost` issued by the fall cadence.
    Fall { at_most: u8 },
    Rotate,
    Terminate,
}

/// Result reported when a request releases the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceOutcome {
    Moved(bool),
    MovedBy(u8),
    Rotated(bool),
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceEvent {
    /// The request now owns the lock.
    Started {
        request_id: RequestId,
        request: PieceRequest,
    },
    /// The request released the lock.
    Finished {
        request_id: RequestId,
        outcome: PieceOutcome,
    },
}

/// Externally visible state of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceStatus {
    Idle,
    Moving,
    Rotating,
    Terminating,
    Terminated,
    Cancelled,
}

/// Everything a step needs from the piece's surroundings.
pub struct StepContext<'a> {
    pub now: f64,
    pub clock: &'a mut BeatClock,
    pub board: &'a dyn CollisionQuery,
    pub animator: &'a mut dyn Animator,
}

/// A granted move or rotation carried across steps.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Operation {
    request_id: RequestId,
    request: PieceRequest,
    outcome: PieceOutcome,
    cells: PieceShape,
    pivot: (i16, i16),
    rotation: Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Animating {
        operation: Operation,
        handle: AnimationHandle,
    },
    /// Snapped; the contact check runs on the next step.
    Settling { operation: Operation },
    Terminating {
        request_id: RequestId,
        deadline: f64,
    },
    Terminated,
    Cancelled,
}

/// The active falling shape.
#[derive(Debug, Clone)]
pub struct Piece {
    id: u32,
    kind: PieceKind,
    cells: PieceShape,
    /// Rotation pivot in doubled coordinates.
    pivot: (i16, i16),
    rotation: Rotation,
    hard_timer: Timer,
    soft_timer: Timer,
    repeat_timer: Timer,
    locked: bool,
    pending: VecDeque<(RequestId, PieceRequest)>,
    next_request_id: RequestId,
    fast_falling: bool,
    fast_fall_count: u8,
    state: State,
}

impl Piece {
    /// Instantiate `kind` at the spawn position.
    pub fn spawn(id: u32, kind: PieceKind, timings: PieceTimings, now: f64) -> Self {
        let (cells, pivot) = spawn_layout(kind);
        Self {
            id,
            kind,
            cells,
            pivot,
            rotation: Rotation::North,
            hard_timer: Timer::new(timings.hard_terminate, false, now),
            soft_timer: Timer::new(timings.soft_terminate, false, now),
            repeat_timer: Timer::new(timings.input_repeat, true, now),
            locked: false,
            pending: VecDeque::new(),
            next_request_id: 0,
            fast_falling: false,
            fast_fall_count: 1,
            state: State::Idle,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Absolute board cells.
    pub fn cells(&self) -> &PieceShape {
        &self.cells
    }

    pub fn pivot(&self) -> (i16, i16) {
        self.pivot
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Requests waiting for the lock.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn fast_fall_count(&self) -> u8 {
        self.fast_fall_count
    }

    pub fn hard_timer(&self) -> &Timer {
        &self.hard_timer
    }

    pub fn soft_timer(&self) -> &Timer {
        &self.soft_timer
    }

    pub fn status(&self) -> PieceStatus {
        match self.state {
            State::Idle => PieceStatus::Idle,
            State::Animating { operation, .. } | State::Settling { operation } => {
                match operation.request {
                    PieceRequest::Rotate => PieceStatus::Rotating,
                    _ => PieceStatus::Moving,
                }
            }
            State::Terminating { .. } => PieceStatus::Terminating,
            State::Terminated => PieceStatus::Terminated,
            State::Cancelled => PieceStatus::Cancelled,
        }
    }

    /// Still accepting requests.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, State::Terminated | State::Cancelled)
    }

    /// Whether the current cells are free on `board`.
    pub fn fits(&self, board: &dyn CollisionQuery) -> bool {
        board.fits(&self.cells, (0, 0))
    }

    /// Whether a single step in `direction` is free.
    pub fn can_move(&self, board: &dyn CollisionQuery, direction: Direction) -> bool {
        self.fits_path(board, direction, 1)
    }

    /// Every intermediate step up to `steps` is free, so nothing tunnels.
    fn fits_path(&self, board: &dyn CollisionQuery, direction: Direction, steps: u8) -> bool {
        (1..=steps.min(i8::MAX as u8) as i8).all(|step| board.fits(&self.cells, direction.scaled(step)))
    }

    fn enqueue(&mut self, request: PieceRequest) -> Option<RequestId> {
        if !self.is_active() {
            return None;
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending.push_back((request_id, request));
        trace!(piece = self.id, request_id, ?request, "request queued");
        Some(request_id)
    }

    pub fn move_if_possible(&mut self, direction: Direction) -> Option<RequestId> {
        self.enqueue(PieceRequest::Move(direction))
    }

    pub fn move_at_most(&mut self, direction: Direction, at_most: u8) -> Option<RequestId> {
        self.enqueue(PieceRequest::MoveAtMost { direction, at_most })
    }

    pub fn rotate_if_possible(&mut self) -> Option<RequestId> {
        self.enqueue(PieceRequest::Rotate)
    }

    /// Queue termination unless one is already queued or running.
    pub fn request_terminate(&mut self) -> Option<RequestId> {
        let queued = self
            .pending
            .iter()
            .any(|(_, request)| *request == PieceRequest::Terminate);
        if queued || matches!(self.state, State::Terminating { .. }) {
            return None;
        }
        self.enqueue(PieceRequest::Terminate)
    }

    /// React to this frame's input, beat ticks and timers by queueing requests.
    pub fn update(&mut self, now: f64, input: &dyn InputSource, clock: &BeatClock) {
        if !self.is_active() {
            return;
        }

        let repeat_tick = self.repeat_timer.on_update(now) > 0;
        for (key, direction) in [
            (GameKey::Left, Direction::Left),
            (GameKey::Right, Direction::Right),
        ] {
            if input.pressed(key) {
                self.move_if_possible(direction);
                self.repeat_timer.reset(now, false);
            } else if repeat_tick && input.held(key) {
                self.move_if_possible(direction);
            }
        }

        if input.pressed(GameKey::Down) {
            self.fast_fall_count = 1;
        }
        if input.held(GameKey::Down) {
            self.fast_falling = true;
        }
        if input.released(GameKey::Down) {
            self.fast_falling = false;
        }

        if input.pressed(GameKey::Rotate) {
            self.rotate_if_possible();
        }

        let ticks = clock.ticks();
        if ticks != 0 {
            let at_most = if self.fast_falling {
                1u8 << self.fast_fall_count
            } else {
                ticks.min(BOARD_HEIGHT as u32) as u8
            };
            self.enqueue(PieceRequest::Fall { at_most });
        }

        if self.soft_timer.on_update(now) > 0 {
            debug!(piece = self.id, "soft terminate timer fired");
            self.request_terminate();
        }
        if self.hard_timer.on_update(now) > 0 {
            debug!(piece = self.id, "hard terminate timer fired");
            self.request_terminate();
        }
    }

    /// Advance the in-flight request, or grant the lock to the next one.
    pub fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<ArrayVec<PieceEvent, 4>> {
        let mut events = ArrayVec::new();
        let state = self.state;
        self.state = match state {
            State::Idle => match self.pending.pop_front() {
                Some((request_id, request)) => self.grant(request_id, request, ctx, &mut events)?,
                None => State::Idle,
            },
            State::Animating { operation, handle } => {
                if !self.pending.is_empty() {
                    ctx.animator.finish(handle);
                }
                if ctx.animator.status(handle, ctx.now) == AnimationStatus::Completed {
                    self.cells = operation.cells;
                    self.pivot = operation.pivot;
                    self.rotation = operation.rotation;
                    State::Settling { operation }
                } else {
                    State::Animating { operation, handle }
                }
            }
            State::Settling { operation } => {
                self.check_contact(ctx);
                if let (PieceRequest::Fall { .. }, PieceOutcome::MovedBy(moved)) =
                    (operation.request, operation.outcome)
                {
                    if moved > 0 && self.fast_falling {
                        self.fast_fall_count = (self.fast_fall_count + 1).min(MAX_FAST_FALL_SHIFT);
                    }
                }
                self.finish(operation.request_id, operation.outcome, ctx, &mut events)?;
                State::Idle
            }
            State::Terminating {
                request_id,
                deadline,
            } => {
                if ctx.now >= deadline {
                    self.finish(request_id, PieceOutcome::Terminated, ctx, &mut events)?;
                    self.pending.clear();
                    debug!(piece = self.id, "terminated");
                    State::Terminated
                } else {
                    State::Terminating {
                        request_id,
                        deadline,
                    }
                }
            }
            State::Terminated => State::Terminated,
            State::Cancelled => State::Cancelled,
        };
        Ok(events)
    }

    /// Drop every request and stop reacting. Releases the lock if held.
    pub fn cancel(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        if let State::Animating { handle, .. } = self.state {
            ctx.animator.finish(handle);
        }
        if self.locked {
            self.release(ctx)?;
        }
        self.pending.clear();
        self.state = State::Cancelled;
        debug!(piece = self.id, "cancelled");
        Ok(())
    }

    fn grant(
        &mut self,
        request_id: RequestId,
        request: PieceRequest,
        ctx: &mut StepContext<'_>,
        events: &mut ArrayVec<PieceEvent, 4>,
    ) -> Result<State> {
        self.acquire(ctx)?;
        events.push(PieceEvent::Started {
            request_id,
            request,
        });
        trace!(piece = self.id, request_id, ?request, "lock granted");

        match request {
            PieceRequest::Move(direction) => {
                if !self.can_move(ctx.board, direction) {
                    self.finish(request_id, PieceOutcome::Moved(false), ctx, events)?;
                    return Ok(State::Idle);
                }
                let offset = direction.delta();
                Ok(self.animate(request_id, request, PieceOutcome::Moved(true), offset, None, ctx))
            }
            PieceRequest::MoveAtMost { direction, at_most } => {
                self.move_by_most(request_id, request, direction, at_most, ctx, events)
            }
            PieceRequest::Fall { at_most } => {
                self.move_by_most(request_id, request, Direction::Down, at_most, ctx, events)
            }
            PieceRequest::Rotate => {
                let board = ctx.board;
                match try_rotate(&self.cells, self.pivot, |pos| board.is_free(pos)) {
                    Some((cells, kick)) => Ok(self.animate(
                        request_id,
                        request,
                        PieceOutcome::Rotated(true),
                        kick,
                        Some(cells),
                        ctx,
                    )),
                    None => {
                        debug!(piece = self.id, "no rotation kick fits");
                        self.finish(request_id, PieceOutcome::Rotated(false), ctx, events)?;
                        Ok(State::Idle)
                    }
                }
            }
            PieceRequest::Terminate => Ok(State::Terminating {
                request_id,
                deadline: ctx.now + ctx.clock.time_to_next_beat(),
            }),
        }
    }

    fn move_by_most(
        &mut self,
        request_id: RequestId,
        request: PieceRequest,
        direction: Direction,
        at_most: u8,
        ctx: &mut StepContext<'_>,
        events: &mut ArrayVec<PieceEvent, 4>,
    ) -> Result<State> {
        let mut moved = at_most.min(i8::MAX as u8);
        while moved != 0 && !self.fits_path(ctx.board, direction, moved) {
            moved -= 1;
        }
        if moved == 0 {
            if matches!(request, PieceRequest::Fall { .. }) {
                self.touch_ground(ctx.now);
            }
            self.finish(request_id, PieceOutcome::MovedBy(0), ctx, events)?;
            return Ok(State::Idle);
        }
        let offset = direction.scaled(moved as i8);
        Ok(self.animate(request_id, request, PieceOutcome::MovedBy(moved), offset, None, ctx))
    }

    /// Start the transition towards the target placement.
    ///
    /// `rotated` holds the already turned and kicked cells; plain moves
    /// translate the current cells by `offset`.
    fn animate(
        &mut self,
        request_id: RequestId,
        request: PieceRequest,
        outcome: PieceOutcome,
        offset: (i8, i8),
        rotated: Option<PieceShape>,
        ctx: &mut StepContext<'_>,
    ) -> State {
        let pivot = (
            self.pivot.0 + 2 * offset.0 as i16,
            self.pivot.1 + 2 * offset.1 as i16,
        );
        let (cells, rotation, transition) = match rotated {
            Some(cells) => (
                cells,
                self.rotation.rotate_ccw(),
                Transition::Rotate {
                    piece_id: self.id,
                    dx: offset.0,
                    dy: offset.1,
                },
            ),
            None => (
                translate(&self.cells, offset),
                self.rotation,
                Transition::Move {
                    piece_id: self.id,
                    dx: offset.0,
                    dy: offset.1,
                },
            ),
        };
        let duration = ctx
            .clock
            .time_to_next_beat()
            .clamp(MIN_MOVE_ANIMATION_SECS, MAX_MOVE_ANIMATION_SECS);
        let handle = ctx.animator.play(transition, duration, ctx.now);
        State::Animating {
            operation: Operation {
                request_id,
                request,
                outcome,
                cells,
                pivot,
                rotation,
            },
            handle,
        }
    }

    fn check_contact(&mut self, ctx: &StepContext<'_>) {
        if self.can_move(ctx.board, Direction::Down) {
            self.hard_timer.reset(ctx.now, true);
            self.soft_timer.reset(ctx.now, true);
            return;
        }
        if !self.hard_timer.is_running() {
            self.hard_timer.start(ctx.now);
        }
        self.soft_timer.start(ctx.now);
    }

    /// A fall that could not move at all still counts as ground contact.
    fn touch_ground(&mut self, now: f64) {
        if !self.hard_timer.is_running() {
            self.hard_timer.start(now);
        }
        if !self.soft_timer.is_running() {
            self.soft_timer.start(now);
        }
    }

    fn finish(
        &mut self,
        request_id: RequestId,
        outcome: PieceOutcome,
        ctx: &mut StepContext<'_>,
        events: &mut ArrayVec<PieceEvent, 4>,
    ) -> Result<()> {
        self.release(ctx)?;
        events.push(PieceEvent::Finished {
            request_id,
            outcome,
        });
        trace!(piece = self.id, request_id, ?outcome, "lock released");
        Ok(())
    }

    fn acquire(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        if self.locked {
            return Err(CoreError::DoubleLock { piece_id: self.id });
        }
        self.locked = true;
        self.hard_timer.pause(ctx.now);
        self.soft_timer.pause(ctx.now);
        self.repeat_timer.pause(ctx.now);
        ctx.clock.pause();
        Ok(())
    }

    fn release(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        if !self.locked {
            return Err(CoreError::LockNotHeld { piece_id: self.id });
        }
        self.locked = false;
        self.hard_timer.resume(ctx.now);
        self.soft_timer.resume(ctx.now);
        self.repeat_timer.resume(ctx.now);
        ctx.clock.resume();
        Ok(())
    }
}
