//! Error types for the core crate.
//!
//! Only two kinds of failure are errors here: broken invariants (a
//! programming error that must stop the frame) and bad construction inputs.
//! Everything the player can cause - a blocked move, a failed rotation, a
//! second save, no faster track - is reported as a plain result value.

/// Result alias that carries [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// The piece lock was granted while already held.
    #[error("double lock attempt on piece {piece_id}")]
    DoubleLock { piece_id: u32 },

    /// A locked-only step ran without the lock.
    #[error("piece {piece_id} mutated without holding its lock")]
    LockNotHeld { piece_id: u32 },

    /// Beat offsets must be non-empty and strictly increasing.
    #[error("beat table is invalid at index {index}")]
    InvalidBeatTable { index: usize },

    /// Durations and speed ratios must be finite and positive.
    #[error("{what} must be positive, got {value}")]
    InvalidDuration { what: &'static str, value: f64 },

    #[error("config: {0}")]
    Config(String),
}

impl CoreError {
    /// Whether this error is a broken invariant rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            CoreError::DoubleLock { .. } | CoreError::LockNotHeld { .. }
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Config(value.to_string())
    }
}
