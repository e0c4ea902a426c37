use std::collections::HashMap;
use std::str::FromStr;

use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::normalize::normalize;
use crate::quiz::sampler;
use crate::store::Word;

/// Which language is shown as the question and which is expected back.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Show the source text, expect the translation.
    SourceToTarget,
    /// Show the translation, expect the source text.
    TargetToSource,
    /// Flip a coin per question.
    Mixed,
}

impl FromStr for Direction {
    type Err = QuizError;

    // Unknown directions fail at the boundary; there is no silent fallback.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source-to-target" | "source_to_target" => Ok(Direction::SourceToTarget),
            "target-to-source" | "target_to_source" => Ok(Direction::TargetToSource),
            "mixed" => Ok(Direction::Mixed),
            other => Err(QuizError::InvalidDirection(other.to_string())),
        }
    }
}

/// One generated question. `word_id` identifies the sampled word for
/// scoring; `accepted_answers` holds the normalized forms of every valid
/// answer in the word's answer group.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub word_id: i64,
    pub prompt: String,
    pub accepted_answers: Vec<String>,
    pub display_answers: Vec<String>,
    pub wrong_count: i64,
    pub correct_count: i64,
}

impl QuizQuestion {
    /// Whether a free-text answer matches any accepted answer, after
    /// normalization.
    pub fn accepts(&self, answer: &str) -> bool {
        let answer = normalize(answer);
        self.accepted_answers.iter().any(|a| *a == answer)
    }
}

/// Build a quiz of `k` questions from the candidate pool.
///
/// Words are drawn by the weighted sampler. Every word sharing the sampled
/// word's source text within the pool forms its answer group, so parallel
/// translations recorded across lists are all accepted.
pub fn build_quiz<R: Rng + ?Sized>(
    pool: &[Word],
    k: usize,
    direction: Direction,
    rng: &mut R,
) -> Result<Vec<QuizQuestion>, QuizError> {
    if pool.is_empty() {
        return Err(QuizError::EmptyCandidatePool);
    }

    let sampled = sampler::sample(pool, k, rng)?;

    let mut groups: HashMap<&str, Vec<&Word>> = HashMap::new();
    for word in pool {
        groups.entry(word.original.as_str()).or_default().push(word);
    }

    let mut questions = Vec::with_capacity(k);
    for word in sampled {
        let ask_source = match direction {
            Direction::SourceToTarget => true,
            Direction::TargetToSource => false,
            Direction::Mixed => rng.gen_bool(0.5),
        };

        // The group always contains the sampled word itself, so its own
        // answer text is always accepted.
        let group = &groups[word.original.as_str()];
        let mut accepted = Vec::new();
        let mut display = Vec::new();
        for member in group {
            let answer_side = if ask_source {
                &member.translation
            } else {
                &member.original
            };
            let normalized = normalize(answer_side);
            if !accepted.contains(&normalized) {
                accepted.push(normalized);
                display.push(answer_side.trim().to_string());
            }
        }

        let prompt = if ask_source {
            word.original.trim().to_string()
        } else {
            word.translation.trim().to_string()
        };

        questions.push(QuizQuestion {
            word_id: word.id,
            prompt,
            accepted_answers: accepted,
            display_answers: display,
            wrong_count: word.wrong_count,
            correct_count: word.correct_count,
        });
    }

    Ok(questions)
}
