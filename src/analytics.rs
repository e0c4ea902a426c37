use chrono::NaiveDate;

use crate::error::QuizError;
use crate::store::{WordAnswerTally, WordStore};

/// Default number of entries in a hardest-words ranking.
pub const DEFAULT_HARDEST_LIMIT: usize = 20;

/// Accuracy for one calendar day of practice.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAccuracy {
    pub date: NaiveDate,
    pub correct: i64,
    pub wrong: i64,
    /// Percentage, rounded to one decimal.
    pub accuracy: f64,
}

/// Consecutive-day practice runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// The owner's most-missed words: answer-log tallies ranked by wrong count,
/// descending. Order among equal wrong counts follows the tally order the
/// store returned (no defined secondary key).
pub fn hardest_words<S: WordStore + ?Sized>(
    store: &S,
    owner_id: i64,
    limit: usize,
) -> Result<Vec<WordAnswerTally>, QuizError> {
    let mut tallies = store.word_answer_tallies(owner_id)?;
    tallies.sort_by_key(|t| std::cmp::Reverse(t.wrong));
    tallies.truncate(limit);
    Ok(tallies)
}

/// Per-day accuracy over the whole answer log, ascending by date.
pub fn accuracy_history<S: WordStore + ?Sized>(
    store: &S,
    owner_id: i64,
) -> Result<Vec<DailyAccuracy>, QuizError> {
    let history = store
        .daily_answer_counts(owner_id)?
        .into_iter()
        .map(|day| {
            let total = day.correct + day.wrong;
            let accuracy = if total > 0 {
                (day.correct as f64 / total as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            };
            DailyAccuracy {
                date: day.day,
                correct: day.correct,
                wrong: day.wrong,
                accuracy,
            }
        })
        .collect();
    Ok(history)
}

/// Current and longest streaks of consecutive practice days.
///
/// Days are UTC calendar days of the answer log. The current streak is the
/// run ending at `today` and drops to zero the moment a day is skipped.
pub fn streaks<S: WordStore + ?Sized>(
    store: &S,
    owner_id: i64,
    today: NaiveDate,
) -> Result<Streaks, QuizError> {
    let days = store.active_days(owner_id)?;
    if days.is_empty() {
        return Ok(Streaks::default());
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in days.windows(2) {
        if pair[0].succ_opt() == Some(pair[1]) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    let current = if days.last() == Some(&today) { run } else { 0 };
    Ok(Streaks { current, longest })
}
