//! Animation seam - fire-and-signal visual transitions
//!
//! The core never interpolates anything itself. It asks an [`Animator`] to
//! play a named [`Transition`] for a target duration and then polls the
//! returned handle until the transition reports its event or completes.
//!
//! [`TimedAnimator`] is the headless implementation: a transition is
//! "playing" for exactly its duration of game time.

use crate::types::PieceKind;

/// Visual transitions the core can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Active piece slides by a displacement.
    Move { piece_id: u32, dx: i8, dy: i8 },
    /// Active piece turns a quarter counter-clockwise, then shifts by the kick.
    Rotate { piece_id: u32, dx: i8, dy: i8 },
    /// A freshly generated shape slides into the preview box.
    PreviewSlideIn { kind: PieceKind },
    /// The previewed shape jumps from the preview box onto the board.
    JumpIn { kind: PieceKind },
    /// A saved piece travels from the board to the jump-out anchor.
    SaveTravel { kind: PieceKind },
    /// The saved piece hops at the anchor.
    JumpOut { kind: PieceKind },
    /// The saved piece slides into the saved box.
    SlideToSaved { kind: PieceKind },
    /// The previously saved shape jumps from the saved box onto the board.
    JumpInFromSaved { kind: PieceKind },
}

impl Transition {
    /// Fraction of the duration at which the transition's event fires.
    ///
    /// Jump-ins signal when the shape lands on the board; everything else
    /// only signals completion.
    pub fn event_fraction(&self) -> f64 {
        match self {
            Transition::JumpIn { .. } | Transition::JumpInFromSaved { .. } => 0.5,
            _ => 1.0,
        }
    }

    /// Total duration so that the event fires `until_event` seconds in.
    pub fn duration_for_event(&self, until_event: f64) -> f64 {
        until_event / self.event_fraction()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transition::Move { .. } => "move",
            Transition::Rotate { .. } => "rotate",
            Transition::PreviewSlideIn { .. } => "preview_slide_in",
            Transition::JumpIn { .. } => "jump_in",
            Transition::SaveTravel { .. } => "save_travel",
            Transition::JumpOut { .. } => "jump_out",
            Transition::SlideToSaved { .. } => "slide_to_saved",
            Transition::JumpInFromSaved { .. } => "jump_in_from_saved",
        }
    }
}

/// Opaque ticket for a started transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Playing,
    /// Past the event point, still playing.
    EventReached,
    Completed,
}

impl AnimationStatus {
    /// Event fired or the transition is over.
    pub fn event_reached(&self) -> bool {
        !matches!(self, AnimationStatus::Playing)
    }
}

/// Visual playback collaborator.
pub trait Animator {
    /// Start `transition`, lasting `duration` seconds from `now`.
    fn play(&mut self, transition: Transition, duration: f64, now: f64) -> AnimationHandle;

    /// Unknown handles report `Completed`.
    fn status(&self, handle: AnimationHandle, now: f64) -> AnimationStatus;

    /// Jump straight to the final frame.
    fn finish(&mut self, handle: AnimationHandle);
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    handle: AnimationHandle,
    transition: Transition,
    start: f64,
    duration: f64,
    finished: bool,
}

impl Entry {
    fn status(&self, now: f64) -> AnimationStatus {
        let elapsed = now - self.start;
        if self.finished || elapsed >= self.duration {
            AnimationStatus::Completed
        } else if elapsed >= self.duration * self.transition.event_fraction() {
            AnimationStatus::EventReached
        } else {
            AnimationStatus::Playing
        }
    }
}

/// Animator that completes transitions purely by game time.
#[derive(Debug, Clone, Default)]
pub struct TimedAnimator {
    entries: Vec<Entry>,
    next_handle: u32,
    played: u32,
    finished_early: u32,
    last: Option<Transition>,
}

impl TimedAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions started so far.
    pub fn played(&self) -> u32 {
        self.played
    }

    /// Transitions cut short by [`Animator::finish`].
    pub fn finished_early(&self) -> u32 {
        self.finished_early
    }

    pub fn last_played(&self) -> Option<&Transition> {
        self.last.as_ref()
    }

    /// Transitions still playing at `now`.
    pub fn active(&self, now: f64) -> impl Iterator<Item = &Transition> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.status(now) != AnimationStatus::Completed)
            .map(|entry| &entry.transition)
    }
}

impl Animator for TimedAnimator {
    fn play(&mut self, transition: Transition, duration: f64, now: f64) -> AnimationHandle {
        self.entries
            .retain(|entry| entry.status(now) != AnimationStatus::Completed);

        let handle = AnimationHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.played += 1;
        self.last = Some(transition);
        self.entries.push(Entry {
            handle,
            transition,
            start: now,
            duration: duration.max(0.0),
            finished: false,
        });
        handle
    }

    fn status(&self, handle: AnimationHandle, now: f64) -> AnimationStatus {
        self.entries
            .iter()
            .find(|entry| entry.handle == handle)
            .map_or(AnimationStatus::Completed, |entry| entry.status(now))
    }

    fn finish(&mut self, handle: AnimationHandle) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.handle == handle && !entry.finished)
        {
            entry.finished = true;
            self.finished_early += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_game_time() {
        let mut animator = TimedAnimator::new();
        let handle = animator.play(Transition::PreviewSlideIn { kind: PieceKind::T }, 1.0, 10.0);

        assert_eq!(animator.status(handle, 10.0), AnimationStatus::Playing);
        assert_eq!(animator.status(handle, 10.99), AnimationStatus::Playing);
        assert_eq!(animator.status(handle, 11.0), AnimationStatus::Completed);
    }

    #[test]
    fn test_jump_in_reports_event_halfway() {
        let mut animator = TimedAnimator::new();
        let jump = Transition::JumpIn { kind: PieceKind::L };
        let duration = jump.duration_for_event(0.4);
        assert!((duration - 0.8).abs() < 1e-9);

        let handle = animator.play(jump, duration, 0.0);
        assert_eq!(animator.status(handle, 0.3), AnimationStatus::Playing);
        assert_eq!(animator.status(handle, 0.4), AnimationStatus::EventReached);
        assert!(animator.status(handle, 0.4).event_reached());
        assert_eq!(animator.status(handle, 0.8), AnimationStatus::Completed);
    }

    #[test]
    fn test_finish_short_circuits() {
        let mut animator = TimedAnimator::new();
        let handle = animator.play(
            Transition::Move {
                piece_id: 1,
                dx: -1,
                dy: 0,
            },
            0.1,
            0.0,
        );
        animator.finish(handle);
        animator.finish(handle);
        assert_eq!(animator.status(handle, 0.0), AnimationStatus::Completed);
        assert_eq!(animator.finished_early(), 1);
    }

    #[test]
    fn test_completed_entries_are_pruned() {
        let mut animator = TimedAnimator::new();
        let first = animator.play(Transition::JumpOut { kind: PieceKind::I }, 0.5, 0.0);
        animator.play(Transition::SlideToSaved { kind: PieceKind::I }, 0.5, 1.0);

        assert_eq!(animator.active(1.0).count(), 1);
        // Pruned entries still read as completed.
        assert_eq!(animator.status(first, 1.0), AnimationStatus::Completed);
        assert_eq!(animator.played(), 2);
        assert_eq!(
            animator.last_played(),
            Some(&Transition::SlideToSaved { kind: PieceKind::I })
        );
    }
}
