//! Turn module - spawn, save, termination and row clearing
//!
//! [`TurnOrchestrator`] owns the session: the board, the beat clock, the
//! playback source, the active [`Piece`], the preview and saved shapes.
//! It is advanced once per fixed step with [`TurnOrchestrator::update`].
//!
//! Every multi-step sequence (turn start, save, termination) is a chain of
//! steps separated by explicit waits: a game time deadline (usually the
//! next beat), an animation event, an animation completion or a number of
//! fixed steps.
//!
//! # Turn sequence
//!
//! 1. First turn: wait for a beat, generate the preview and let it slide in.
//! 2. Turn start: slide a new preview in while the previewed shape jumps
//!    onto the board, wait for the landing, wait for the next beat, spawn
//!    the piece and immediately request one step down.
//! 3. Termination: decompose the piece into board cells, wait one step,
//!    clear every full row, speed the music up if anything cleared, start
//!    the next turn.
//! 4. Save (once per spawned piece): drop the active piece, animate it into
//!    the saved box on the beat, then spawn the previously saved shape or
//!    run a normal turn start if nothing was saved.

use arrayvec::ArrayVec;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::animation::{AnimationHandle, AnimationStatus, Animator, TimedAnimator, Transition};
use crate::beat_clock::BeatClock;
use crate::board::Board;
use crate::config::GameConfig;
use crate::error::Result;
use crate::piece::{Piece, PieceEvent, PieceOutcome, PieceTimings, StepContext};
use crate::playback::{LoopingPlayback, PlaybackSource, TempoTrack, TempoTracks};
use crate::rng::ShapeGenerator;
use crate::rows::RowScanner;
use crate::types::{
    Direction, GameKey, InputSource, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, FIXED_STEP_SECS,
};

/// Save presses queued within a single step beyond this are dropped.
const MAX_QUEUED_SAVES: u8 = 4;

/// Lookaheads used to land transitions on beat boundaries.
const PREVIEW_LOOKAHEAD_SECS: f64 = 5.0 / 6.0;
const JUMP_IN_LOOKAHEAD_SECS: f64 = 35.0 / 60.0;
const JUMP_OUT_LOOKAHEAD_SECS: f64 = 0.7;
const SLIDE_TO_SAVED_LOOKAHEAD_SECS: f64 = 0.5;
const JUMP_IN_FROM_SAVED_LOOKAHEAD_SECS: f64 = 34.0 / 60.0;

/// Share of the jump-out window spent travelling to the anchor; the rest is the hop.
const SAVE_TRAVEL_SHARE: f64 = 0.2 / 0.7;
const SAVE_HOP_SHARE: f64 = 0.5 / 0.7;

pub type TurnEvents = ArrayVec<TurnEvent, 16>;

/// Why a save request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRefusal {
    NoActivePiece,
    AlreadySaved,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// A new shape entered the preview box.
    PreviewReady { kind: PieceKind },
    Spawned {
        piece_id: u32,
        kind: PieceKind,
        from_save: bool,
    },
    Saved {
        kind: PieceKind,
        swapped_in: Option<PieceKind>,
    },
    SaveIgnored(SaveRefusal),
    /// A terminated piece became board cells.
    Decomposed {
        piece_id: u32,
        kind: PieceKind,
        placed: usize,
    },
    RowsCleared { rows: usize },
    TempoUp { track: TempoTrack, speed: f64 },
    GameOver,
    Piece(PieceEvent),
}

/// Coarse view of where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    NotStarted,
    /// Between pieces: animations and beat waits.
    Sequencing,
    Playing,
    GameOver,
}

/// Counters for the end-of-session summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub pieces_spawned: u32,
    pub pieces_settled: u32,
    pub rows_cleared: u32,
    pub tempo_ups: u32,
    pub saves: u32,
    pub saves_ignored: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Wait {
    Until(f64),
    Event(AnimationHandle),
    Completion(AnimationHandle),
    Steps(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    GenerateFirstPreview,
    /// `from_save` marks a turn started by saving into an empty slot.
    StartTurn {
        from_save: bool,
    },
    AwaitSpawnBeat {
        kind: PieceKind,
        from_save: bool,
    },
    Spawn {
        kind: PieceKind,
        from_save: bool,
    },
    SaveTravel {
        kind: PieceKind,
        old: Option<PieceKind>,
    },
    SaveHop {
        kind: PieceKind,
        old: Option<PieceKind>,
        window: f64,
    },
    SaveSlide {
        kind: PieceKind,
        old: Option<PieceKind>,
    },
    ScanRows,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    NotStarted,
    Waiting { wait: Wait, then: Step },
    Playing,
    GameOver,
}

/// The session driver.
pub struct TurnOrchestrator<P, G, A> {
    board: Board,
    clock: BeatClock,
    playback: P,
    tracks: TempoTracks,
    generator: G,
    animator: A,
    scanner: RowScanner,
    timings: PieceTimings,
    piece: Option<Piece>,
    next: Option<PieceKind>,
    saved: Option<PieceKind>,
    saved_since_spawn: bool,
    save_requests: u8,
    next_piece_id: u32,
    phase: Phase,
    now: f64,
    stats: SessionStats,
}

impl<P, G, A> TurnOrchestrator<P, G, A>
where
    P: PlaybackSource,
    G: ShapeGenerator,
    A: Animator,
{
    pub fn new(
        clock: BeatClock,
        playback: P,
        tracks: TempoTracks,
        generator: G,
        animator: A,
        timings: PieceTimings,
    ) -> Self {
        Self {
            board: Board::new(),
            clock,
            playback,
            tracks,
            generator,
            animator,
            scanner: RowScanner::new(BOARD_WIDTH as usize),
            timings,
            piece: None,
            next: None,
            saved: None,
            saved_since_spawn: false,
            save_requests: 0,
            next_piece_id: 1,
            phase: Phase::NotStarted,
            now: 0.0,
            stats: SessionStats::default(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable access to the board (for testing/setup)
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    pub fn piece_mut(&mut self) -> Option<&mut Piece> {
        self.piece.as_mut()
    }

    /// Shape waiting in the preview box.
    pub fn next(&self) -> Option<PieceKind> {
        self.next
    }

    pub fn saved(&self) -> Option<PieceKind> {
        self.saved
    }

    pub fn saved_since_spawn(&self) -> bool {
        self.saved_since_spawn
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    pub fn tracks(&self) -> &TempoTracks {
        &self.tracks
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Game time of the last update.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn phase(&self) -> TurnPhase {
        match self.phase {
            Phase::NotStarted => TurnPhase::NotStarted,
            Phase::Waiting { .. } => TurnPhase::Sequencing,
            Phase::Playing => TurnPhase::Playing,
            Phase::GameOver => TurnPhase::GameOver,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Ask to save the active piece; handled on the next update.
    pub fn request_save(&mut self) {
        self.save_requests = (self.save_requests + 1).min(MAX_QUEUED_SAVES);
    }

    /// Advance the session to game time `now`.
    ///
    /// The playback source must already reflect `now`. Only broken piece
    /// invariants and an unusable clip are errors.
    pub fn update(&mut self, now: f64, input: &dyn InputSource) -> Result<TurnEvents> {
        let mut events = TurnEvents::new();
        if self.phase == Phase::GameOver {
            return Ok(events);
        }
        self.now = now;
        self.clock.poll(&self.playback)?;

        if self.phase == Phase::NotStarted {
            info!("session started");
            self.phase = Phase::Waiting {
                wait: Wait::Until(now + self.clock.time_to_next_beat()),
                then: Step::GenerateFirstPreview,
            };
        }

        if input.pressed(GameKey::Save) {
            self.request_save();
        }
        while self.save_requests > 0 {
            self.save_requests -= 1;
            self.try_save(&mut events)?;
        }

        self.step_piece(input, &mut events)?;
        self.advance_phase(&mut events)?;
        Ok(events)
    }

    fn step_piece(&mut self, input: &dyn InputSource, events: &mut TurnEvents) -> Result<()> {
        let Some(piece) = self.piece.as_mut() else {
            return Ok(());
        };
        piece.update(self.now, input, &self.clock);
        let mut ctx = StepContext {
            now: self.now,
            clock: &mut self.clock,
            board: &self.board,
            animator: &mut self.animator,
        };
        let mut terminated = false;
        for event in piece.step(&mut ctx)? {
            if let PieceEvent::Finished {
                outcome: PieceOutcome::Terminated,
                ..
            } = event
            {
                terminated = true;
            }
            events.push(TurnEvent::Piece(event));
        }
        if terminated {
            self.decompose(events);
        }
        Ok(())
    }

    fn decompose(&mut self, events: &mut TurnEvents) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        let placed = self.board.place_cells(piece.cells(), piece.kind());
        info!(
            piece = piece.id(),
            kind = piece.kind().as_str(),
            placed,
            "piece decomposed"
        );
        self.stats.pieces_settled += 1;
        events.push(TurnEvent::Decomposed {
            piece_id: piece.id(),
            kind: piece.kind(),
            placed,
        });
        self.phase = Phase::Waiting {
            wait: Wait::Steps(1),
            then: Step::ScanRows,
        };
    }

    fn try_save(&mut self, events: &mut TurnEvents) -> Result<()> {
        if self.saved_since_spawn {
            debug!("already saved since last spawn");
            self.stats.saves_ignored += 1;
            events.push(TurnEvent::SaveIgnored(SaveRefusal::AlreadySaved));
            return Ok(());
        }
        let Some(piece) = self.piece.as_mut() else {
            warn!("save requested with no active piece");
            self.stats.saves_ignored += 1;
            events.push(TurnEvent::SaveIgnored(SaveRefusal::NoActivePiece));
            return Ok(());
        };

        let mut ctx = StepContext {
            now: self.now,
            clock: &mut self.clock,
            board: &self.board,
            animator: &mut self.animator,
        };
        piece.cancel(&mut ctx)?;
        let kind = piece.kind();
        self.piece = None;

        self.saved_since_spawn = true;
        let old = self.saved.replace(kind);
        self.stats.saves += 1;
        info!(
            kind = kind.as_str(),
            swapped_in = old.map(|k| k.as_str()),
            "piece saved"
        );
        events.push(TurnEvent::Saved {
            kind,
            swapped_in: old,
        });
        self.phase = Phase::Waiting {
            wait: Wait::Until(self.now + self.clock.time_to_next_beat()),
            then: Step::SaveTravel { kind, old },
        };
        Ok(())
    }

    fn advance_phase(&mut self, events: &mut TurnEvents) -> Result<()> {
        while let Phase::Waiting { wait, then } = self.phase {
            match self.poll_wait(wait) {
                Some(remaining) => {
                    self.phase = Phase::Waiting {
                        wait: remaining,
                        then,
                    };
                    return Ok(());
                }
                None => self.phase = self.run(then, events)?,
            }
        }
        Ok(())
    }

    /// `None` when the wait is over, otherwise the wait left to do.
    fn poll_wait(&self, wait: Wait) -> Option<Wait> {
        let done = match wait {
            Wait::Until(deadline) => self.now >= deadline,
            Wait::Event(handle) => self.animator.status(handle, self.now).event_reached(),
            Wait::Completion(handle) => {
                self.animator.status(handle, self.now) == AnimationStatus::Completed
            }
            Wait::Steps(0) => true,
            Wait::Steps(n) => return Some(Wait::Steps(n - 1)),
        };
        if done {
            None
        } else {
            Some(wait)
        }
    }

    fn beat_wait(&self, then: Step) -> Phase {
        Phase::Waiting {
            wait: Wait::Until(self.now + self.clock.time_to_next_beat()),
            then,
        }
    }

    fn generate_preview(&mut self, slide_in: f64, events: &mut TurnEvents) -> AnimationHandle {
        let kind = self.generator.random_shape();
        self.next = Some(kind);
        events.push(TurnEvent::PreviewReady { kind });
        self.animator
            .play(Transition::PreviewSlideIn { kind }, slide_in, self.now)
    }

    fn run(&mut self, step: Step, events: &mut TurnEvents) -> Result<Phase> {
        let phase = match step {
            Step::GenerateFirstPreview => {
                let slide_in = self.clock.time_to_nearest_beat(PREVIEW_LOOKAHEAD_SECS);
                let handle = self.generate_preview(slide_in, events);
                Phase::Waiting {
                    wait: Wait::Completion(handle),
                    then: Step::StartTurn { from_save: false },
                }
            }
            Step::StartTurn { from_save } => {
                if !self.clock.is_on_beat() {
                    warn!(position = self.clock.position(), "turn started off the beat");
                }
                let jump_in = self.clock.time_to_nearest_beat(JUMP_IN_LOOKAHEAD_SECS);
                let kind = match self.next {
                    Some(kind) => kind,
                    None => self.generator.random_shape(),
                };
                // The new preview slides in while the old one jumps onto the board.
                self.generate_preview(jump_in, events);
                let jump = Transition::JumpIn { kind };
                let handle = self
                    .animator
                    .play(jump, jump.duration_for_event(jump_in), self.now);
                Phase::Waiting {
                    wait: Wait::Event(handle),
                    then: Step::AwaitSpawnBeat { kind, from_save },
                }
            }
            Step::AwaitSpawnBeat { kind, from_save } => {
                self.beat_wait(Step::Spawn { kind, from_save })
            }
            Step::Spawn { kind, from_save } => self.spawn(kind, from_save, events),
            Step::SaveTravel { kind, old } => {
                let window = self.clock.time_to_nearest_beat(JUMP_OUT_LOOKAHEAD_SECS);
                let handle = self.animator.play(
                    Transition::SaveTravel { kind },
                    window * SAVE_TRAVEL_SHARE,
                    self.now,
                );
                Phase::Waiting {
                    wait: Wait::Completion(handle),
                    then: Step::SaveHop { kind, old, window },
                }
            }
            Step::SaveHop { kind, old, window } => {
                let handle = self.animator.play(
                    Transition::JumpOut { kind },
                    window * SAVE_HOP_SHARE,
                    self.now,
                );
                Phase::Waiting {
                    wait: Wait::Completion(handle),
                    then: Step::SaveSlide { kind, old },
                }
            }
            Step::SaveSlide { kind, old } => {
                let slide = self.clock.time_to_nearest_beat(SLIDE_TO_SAVED_LOOKAHEAD_SECS);
                self.animator
                    .play(Transition::SlideToSaved { kind }, slide, self.now);
                match old {
                    Some(old) => {
                        let until_event = self
                            .clock
                            .time_to_nearest_beat(JUMP_IN_FROM_SAVED_LOOKAHEAD_SECS);
                        let jump = Transition::JumpInFromSaved { kind: old };
                        let handle =
                            self.animator
                                .play(jump, jump.duration_for_event(until_event), self.now);
                        Phase::Waiting {
                            wait: Wait::Event(handle),
                            then: Step::Spawn {
                                kind: old,
                                from_save: true,
                            },
                        }
                    }
                    None => Phase::Waiting {
                        wait: Wait::Steps(0),
                        then: Step::StartTurn { from_save: true },
                    },
                }
            }
            Step::ScanRows => {
                self.clear_full_rows(events)?;
                Phase::Waiting {
                    wait: Wait::Steps(0),
                    then: Step::StartTurn { from_save: false },
                }
            }
        };
        Ok(phase)
    }

    fn spawn(&mut self, kind: PieceKind, from_save: bool, events: &mut TurnEvents) -> Phase {
        let piece_id = self.next_piece_id;
        self.next_piece_id += 1;
        let mut piece = Piece::spawn(piece_id, kind, self.timings, self.now);

        if !piece.fits(&self.board) {
            warn!(piece = piece_id, kind = kind.as_str(), "spawn blocked, game over");
            events.push(TurnEvent::GameOver);
            return Phase::GameOver;
        }

        // Spawns from the save flow keep the flag so the swapped-in piece
        // cannot be saved straight back.
        self.saved_since_spawn = from_save;
        // Spawning lands on a beat, so the first step down happens now.
        piece.move_if_possible(Direction::Down);
        self.piece = Some(piece);
        self.stats.pieces_spawned += 1;
        info!(piece = piece_id, kind = kind.as_str(), from_save, "spawned");
        events.push(TurnEvent::Spawned {
            piece_id,
            kind,
            from_save,
        });
        Phase::Playing
    }

    fn clear_full_rows(&mut self, events: &mut TurnEvents) -> Result<()> {
        let rows: Vec<i8> = self
            .scanner
            .full_rows(&self.board, BOARD_HEIGHT)
            .into_iter()
            .map(|row| row.y)
            .collect();
        if rows.is_empty() {
            return Ok(());
        }

        let cleared = self.board.clear_rows(&rows);
        self.stats.rows_cleared += cleared as u32;
        info!(?rows, "rows cleared");
        events.push(TurnEvent::RowsCleared { rows: cleared });

        if let Some(track) = self.tracks.escalate(&mut self.playback) {
            // Re-sample so the next turn's timings use the new clip.
            self.clock.poll(&self.playback)?;
            self.stats.tempo_ups += 1;
            events.push(TurnEvent::TempoUp {
                track,
                speed: self.clock.speed(),
            });
        }
        Ok(())
    }
}

impl<G: ShapeGenerator> TurnOrchestrator<LoopingPlayback, G, TimedAnimator> {
    /// Session over the bundled theme with simulated playback and animation.
    pub fn simulated(config: &GameConfig, generator: G) -> Self {
        let tracks = config.tempo_tracks();
        let first = tracks
            .slowest()
            .cloned()
            .unwrap_or_else(|| TempoTrack::at_speed(1.0));
        let clock = BeatClock::theme().with_offset(config.clock_offset);
        Self::new(
            clock,
            LoopingPlayback::new(first),
            tracks,
            generator,
            TimedAnimator::new(),
            config.timings,
        )
    }
}

impl<G: ShapeGenerator, A: Animator> TurnOrchestrator<LoopingPlayback, G, A> {
    /// Advance playback and game time by one fixed step.
    pub fn advance(&mut self, input: &dyn InputSource) -> Result<TurnEvents> {
        self.playback.advance(FIXED_STEP_SECS);
        let now = self.now + FIXED_STEP_SECS;
        self.update(now, input)
    }
}
