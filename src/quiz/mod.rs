pub mod builder;
pub mod recorder;
pub mod sampler;

// Re-export the main types for convenience
pub use builder::{build_quiz, Direction, QuizQuestion};
pub use recorder::{finish_quiz, QuizSummary};
pub use sampler::{difficulty_weight, sample};
