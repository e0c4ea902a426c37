use thiserror::Error;

/// Errors produced by quiz generation, scoring and persistence.
#[derive(Debug, Error)]
pub enum QuizError {
    /// No words were available for quiz generation. Callers surface this as
    /// "nothing to quiz", not as a fatal condition.
    #[error("no words available in the selected lists")]
    EmptyCandidatePool,

    /// A word referenced by an answer entry no longer exists. Recovered
    /// locally during scoring by skipping the entry.
    #[error("word {0} not found")]
    WordNotFound(i64),

    /// A store-level failure. During finish-quiz the whole batch rolls back.
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// An unrecognized quiz direction at the boundary. Never silently
    /// replaced with a default.
    #[error("unrecognized quiz direction: {0:?}")]
    InvalidDirection(String),
}

impl QuizError {
    /// Returns `true` if the error means "nothing to practice" rather than
    /// a real failure.
    pub fn is_empty_pool(&self) -> bool {
        matches!(self, QuizError::EmptyCandidatePool)
    }
}
