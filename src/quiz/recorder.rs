use chrono::Utc;

use crate::analytics;
use crate::error::QuizError;
use crate::store::{AnswerEntry, WordAnswerTally, WordStore};

/// Aggregate feedback returned right after a quiz is recorded.
#[derive(Debug, Clone)]
pub struct QuizSummary {
    pub correct: i64,
    pub total: i64,
    pub total_lists: i64,
    pub total_words: i64,
    pub total_quizzes: i64,
    pub hardest_words: Vec<WordAnswerTally>,
}

/// Record one finished quiz session and return the owner's updated totals.
///
/// The batch is applied atomically by the store; the reported score is
/// trusted for the session summary but never overwrites the per-word
/// tallies, which come from the individual entries.
pub fn finish_quiz<S: WordStore>(
    store: &mut S,
    owner_id: i64,
    answers: &[AnswerEntry],
    reported_correct: i64,
    reported_total: i64,
) -> Result<QuizSummary, QuizError> {
    store.record_quiz(
        owner_id,
        answers,
        reported_correct,
        reported_total,
        Utc::now(),
    )?;

    Ok(QuizSummary {
        correct: reported_correct,
        total: reported_total,
        total_lists: store.count_lists(owner_id)?,
        total_words: store.count_words(owner_id)?,
        total_quizzes: store.count_quizzes(owner_id)?,
        hardest_words: analytics::hardest_words(
            store,
            owner_id,
            analytics::DEFAULT_HARDEST_LIMIT,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    const OWNER: i64 = 1;

    fn entry(word_id: i64, answer: &str, is_correct: bool) -> AnswerEntry {
        AnswerEntry {
            word_id,
            user_answer: answer.to_string(),
            is_correct,
        }
    }

    #[test]
    fn test_summary_reflects_totals_and_hardest_snapshot() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let list = store.create_list(OWNER, "animals").unwrap();
        let dog = store.add_word(list.id, "dog", "hund").unwrap();
        let cat = store.add_word(list.id, "cat", "katt").unwrap();

        let summary = finish_quiz(
            &mut store,
            OWNER,
            &[entry(dog.id, "hnud", false), entry(cat.id, "katt", true)],
            1,
            2,
        )
        .unwrap();

        assert_eq!(summary.correct, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.total_lists, 1);
        assert_eq!(summary.total_words, 2);
        assert_eq!(summary.total_quizzes, 1);
        assert_eq!(summary.hardest_words[0].word_id, dog.id);
        assert_eq!(summary.hardest_words[0].wrong, 1);
    }

    #[test]
    fn test_reported_score_does_not_touch_word_counters() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let list = store.create_list(OWNER, "animals").unwrap();
        let dog = store.add_word(list.id, "dog", "hund").unwrap();

        // A caller reporting an inflated score only affects the summary row,
        // never the per-word tallies.
        finish_quiz(&mut store, OWNER, &[entry(dog.id, "hund", true)], 5, 9).unwrap();

        let word = store.get_word(dog.id).unwrap().unwrap();
        assert_eq!(word.correct_count, 1);
        assert_eq!(word.wrong_count, 0);
    }
}
