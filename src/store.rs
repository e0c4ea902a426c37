use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::QuizError;

/// A word pair with its rolling answer statistics.
///
/// `correct_count`/`wrong_count`/`last_wrong_at` are a denormalized cache of
/// the answer log, maintained by `record_quiz`; the log itself stays the
/// source of truth.
#[derive(Debug, Clone)]
pub struct Word {
    pub id: i64,
    pub list_id: i64,
    pub original: String,
    pub translation: String,
    pub correct_count: i64,
    pub wrong_count: i64,
    pub last_wrong_at: Option<DateTime<Utc>>,
    pub is_global: bool,
}

/// A named word list. Deleting a list deletes its words.
#[derive(Debug, Clone)]
pub struct WordList {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Immutable summary of one finished quiz session.
#[derive(Debug, Clone)]
pub struct QuizResult {
    pub id: i64,
    pub owner_id: i64,
    pub correct_count: i64,
    pub total_questions: i64,
    pub created_at: DateTime<Utc>,
}

/// One answered question, as reported by the caller at the end of a session.
#[derive(Debug, Clone)]
pub struct AnswerEntry {
    pub word_id: i64,
    pub user_answer: String,
    pub is_correct: bool,
}

/// Per-word tally over the answer log, joined to the word's current text.
#[derive(Debug, Clone)]
pub struct WordAnswerTally {
    pub word_id: i64,
    pub original: String,
    pub translation: String,
    pub correct: i64,
    pub wrong: i64,
    pub last_wrong_at: Option<DateTime<Utc>>,
}

/// Correct/wrong totals for one calendar day (UTC) of the answer log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub correct: i64,
    pub wrong: i64,
}

/// Which of an owner's lists a quiz draws from.
#[derive(Debug, Clone)]
pub enum ListSelection {
    All,
    Only(Vec<i64>),
}

/// Candidate-pool selector for quiz generation.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    pub owner_id: i64,
    pub lists: ListSelection,
    /// Also include words published to the shared pool.
    pub include_global: bool,
}

impl ScopeFilter {
    pub fn all_lists(owner_id: i64) -> Self {
        Self {
            owner_id,
            lists: ListSelection::All,
            include_global: false,
        }
    }
}

/// Repository interface the quiz engine runs against.
pub trait WordStore {
    /// Candidate words for a quiz, per the scope filter.
    fn list_words(&self, scope: &ScopeFilter) -> Result<Vec<Word>, QuizError>;

    fn get_word(&self, id: i64) -> Result<Option<Word>, QuizError>;

    /// Atomically persist one finished session: the result row, one answer
    /// log row per entry, and the per-word counter updates. All writes
    /// commit together or none do. Entries whose word has vanished are
    /// skipped (and logged), never failing the batch.
    fn record_quiz(
        &mut self,
        owner_id: i64,
        entries: &[AnswerEntry],
        reported_correct: i64,
        reported_total: i64,
        now: DateTime<Utc>,
    ) -> Result<QuizResult, QuizError>;

    /// Answer-log tallies grouped by word, for hardest-word ranking.
    fn word_answer_tallies(&self, owner_id: i64) -> Result<Vec<WordAnswerTally>, QuizError>;

    /// Correct/wrong counts per UTC calendar day, ascending.
    fn daily_answer_counts(&self, owner_id: i64) -> Result<Vec<DailyCount>, QuizError>;

    /// Distinct UTC days with at least one logged answer, ascending.
    fn active_days(&self, owner_id: i64) -> Result<Vec<NaiveDate>, QuizError>;

    fn count_lists(&self, owner_id: i64) -> Result<i64, QuizError>;
    fn count_words(&self, owner_id: i64) -> Result<i64, QuizError>;
    fn count_quizzes(&self, owner_id: i64) -> Result<i64, QuizError>;
}

/// SQLite-backed store for words, lists and quiz history.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

// Timestamps are stored as fixed-width rfc3339 UTC strings so that string
// comparison (in SQL and in the monotonicity guard) matches time order.
fn fmt_ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                idx,
                "timestamp".to_string(),
                rusqlite::types::Type::Text,
            )
        })
}

fn parse_day(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::InvalidColumnType(idx, "day".to_string(), rusqlite::types::Type::Text)
    })
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories
    /// and the schema if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, QuizError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                QuizError::Persistence(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                ))
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open the database at the default application path.
    pub fn open_default() -> Result<Self, QuizError> {
        let path = crate::app_dirs::AppDirs::db_path()
            .unwrap_or_else(|| PathBuf::from("glosa.db"));
        Self::open(path)
    }

    /// In-memory store, used by tests and throwaway sessions.
    pub fn open_in_memory() -> Result<Self, QuizError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, QuizError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS word_lists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                list_id INTEGER NOT NULL REFERENCES word_lists(id) ON DELETE CASCADE,
                original TEXT NOT NULL,
                translation TEXT NOT NULL,
                correct_count INTEGER NOT NULL DEFAULT 0,
                wrong_count INTEGER NOT NULL DEFAULT 0,
                last_wrong_at TEXT,
                is_global INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS quiz_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                correct_count INTEGER NOT NULL,
                total_questions INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        // Append-only; one row per question answered.
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS quiz_answer_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                quiz_result_id INTEGER NOT NULL REFERENCES quiz_results(id) ON DELETE CASCADE,
                word_id INTEGER NOT NULL,
                user_answer TEXT NOT NULL,
                is_correct BOOLEAN NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_words_list ON words(list_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_words_original ON words(original)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_answer_log_owner ON quiz_answer_log(owner_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_answer_log_word ON quiz_answer_log(word_id)",
            [],
        )?;

        Ok(SqliteStore { conn })
    }

    // ---- list / word management (plain CRUD) ----

    pub fn create_list(&self, owner_id: i64, name: &str) -> Result<WordList, QuizError> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO word_lists (owner_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![owner_id, name, fmt_ts(now)],
        )?;
        Ok(WordList {
            id: self.conn.last_insert_rowid(),
            owner_id,
            name: name.to_string(),
            created_at: now,
        })
    }

    /// Delete a list the owner holds; cascades to its words. Returns whether
    /// a list was actually removed.
    pub fn delete_list(&self, owner_id: i64, list_id: i64) -> Result<bool, QuizError> {
        let n = self.conn.execute(
            "DELETE FROM word_lists WHERE id = ?1 AND owner_id = ?2",
            params![list_id, owner_id],
        )?;
        Ok(n > 0)
    }

    pub fn lists(&self, owner_id: i64) -> Result<Vec<WordList>, QuizError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, name, created_at FROM word_lists WHERE owner_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([owner_id], |row| {
            let ts: String = row.get(3)?;
            Ok(WordList {
                id: row.get(0)?,
                owner_id: row.get(1)?,
                name: row.get(2)?,
                created_at: parse_ts(3, &ts)?,
            })
        })?;
        let mut lists = Vec::new();
        for list in rows {
            lists.push(list?);
        }
        Ok(lists)
    }

    pub fn add_word(
        &self,
        list_id: i64,
        original: &str,
        translation: &str,
    ) -> Result<Word, QuizError> {
        self.conn.execute(
            "INSERT INTO words (list_id, original, translation) VALUES (?1, ?2, ?3)",
            params![list_id, original.trim(), translation.trim()],
        )?;
        Ok(Word {
            id: self.conn.last_insert_rowid(),
            list_id,
            original: original.trim().to_string(),
            translation: translation.trim().to_string(),
            correct_count: 0,
            wrong_count: 0,
            last_wrong_at: None,
            is_global: false,
        })
    }

    pub fn words_in_list(&self, list_id: i64) -> Result<Vec<Word>, QuizError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM words WHERE list_id = ?1 ORDER BY id",
            WORD_COLUMNS
        ))?;
        let rows = stmt.query_map([list_id], row_to_word)?;
        let mut words = Vec::new();
        for word in rows {
            words.push(word?);
        }
        Ok(words)
    }

    /// Publish (or retract) a word to the shared global pool.
    pub fn set_word_global(&self, word_id: i64, is_global: bool) -> Result<bool, QuizError> {
        let n = self.conn.execute(
            "UPDATE words SET is_global = ?2 WHERE id = ?1",
            params![word_id, is_global],
        )?;
        Ok(n > 0)
    }
}

const WORD_COLUMNS: &str =
    "id, list_id, original, translation, correct_count, wrong_count, last_wrong_at, is_global";

fn row_to_word(row: &rusqlite::Row<'_>) -> rusqlite::Result<Word> {
    let last_wrong: Option<String> = row.get(6)?;
    let last_wrong_at = match last_wrong {
        Some(s) => Some(parse_ts(6, &s)?),
        None => None,
    };
    Ok(Word {
        id: row.get(0)?,
        list_id: row.get(1)?,
        original: row.get(2)?,
        translation: row.get(3)?,
        correct_count: row.get(4)?,
        wrong_count: row.get(5)?,
        last_wrong_at,
        is_global: row.get(7)?,
    })
}

impl WordStore for SqliteStore {
    fn list_words(&self, scope: &ScopeFilter) -> Result<Vec<Word>, QuizError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM (
                 SELECT w.* FROM words w
                 JOIN word_lists wl ON wl.id = w.list_id
                 WHERE wl.owner_id = ?1
             ) ORDER BY id",
            WORD_COLUMNS
        ))?;
        let rows = stmt.query_map([scope.owner_id], row_to_word)?;
        let mut words = Vec::new();
        for word in rows {
            words.push(word?);
        }

        if let ListSelection::Only(ids) = &scope.lists {
            words.retain(|w| ids.contains(&w.list_id));
        }

        if scope.include_global {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM words WHERE is_global = 1 ORDER BY id",
                WORD_COLUMNS
            ))?;
            let rows = stmt.query_map([], row_to_word)?;
            for word in rows {
                let word = word?;
                if !words.iter().any(|w| w.id == word.id) {
                    words.push(word);
                }
            }
        }

        Ok(words)
    }

    fn get_word(&self, id: i64) -> Result<Option<Word>, QuizError> {
        let word = self
            .conn
            .query_row(
                &format!("SELECT {} FROM words WHERE id = ?1", WORD_COLUMNS),
                [id],
                row_to_word,
            )
            .optional()?;
        Ok(word)
    }

    fn record_quiz(
        &mut self,
        owner_id: i64,
        entries: &[AnswerEntry],
        reported_correct: i64,
        reported_total: i64,
        now: DateTime<Utc>,
    ) -> Result<QuizResult, QuizError> {
        let ts = fmt_ts(now);
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO quiz_results (owner_id, correct_count, total_questions, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, reported_correct, reported_total, ts],
        )?;
        let result_id = tx.last_insert_rowid();

        for entry in entries {
            let known: Option<i64> = tx
                .query_row(
                    "SELECT id FROM words WHERE id = ?1",
                    [entry.word_id],
                    |row| row.get(0),
                )
                .optional()?;
            if known.is_none() {
                // Lists can be deleted while a quiz is in flight; drop the
                // entry rather than failing the whole batch.
                let err = QuizError::WordNotFound(entry.word_id);
                warn!(word_id = entry.word_id, "{err}, skipping answer entry");
                continue;
            }

            tx.execute(
                "INSERT INTO quiz_answer_log
                     (owner_id, quiz_result_id, word_id, user_answer, is_correct, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    owner_id,
                    result_id,
                    entry.word_id,
                    entry.user_answer,
                    entry.is_correct,
                    ts
                ],
            )?;

            if entry.is_correct {
                tx.execute(
                    "UPDATE words SET correct_count = correct_count + 1 WHERE id = ?1",
                    [entry.word_id],
                )?;
            } else {
                // last_wrong_at never moves backward in time.
                tx.execute(
                    "UPDATE words SET wrong_count = wrong_count + 1,
                         last_wrong_at = CASE
                             WHEN last_wrong_at IS NULL OR last_wrong_at < ?2 THEN ?2
                             ELSE last_wrong_at
                         END
                     WHERE id = ?1",
                    params![entry.word_id, ts],
                )?;
            }
        }

        tx.commit()?;

        Ok(QuizResult {
            id: result_id,
            owner_id,
            correct_count: reported_correct,
            total_questions: reported_total,
            created_at: now,
        })
    }

    fn word_answer_tallies(&self, owner_id: i64) -> Result<Vec<WordAnswerTally>, QuizError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                l.word_id,
                w.original,
                w.translation,
                SUM(CASE WHEN l.is_correct THEN 1 ELSE 0 END) AS correct,
                SUM(CASE WHEN l.is_correct THEN 0 ELSE 1 END) AS wrong,
                MAX(CASE WHEN l.is_correct THEN NULL ELSE l.timestamp END) AS last_wrong
            FROM quiz_answer_log l
            JOIN words w ON w.id = l.word_id
            WHERE l.owner_id = ?1
            GROUP BY l.word_id
            "#,
        )?;
        let rows = stmt.query_map([owner_id], |row| {
            let last_wrong: Option<String> = row.get(5)?;
            let last_wrong_at = match last_wrong {
                Some(s) => Some(parse_ts(5, &s)?),
                None => None,
            };
            Ok(WordAnswerTally {
                word_id: row.get(0)?,
                original: row.get(1)?,
                translation: row.get(2)?,
                correct: row.get(3)?,
                wrong: row.get(4)?,
                last_wrong_at,
            })
        })?;
        let mut tallies = Vec::new();
        for tally in rows {
            tallies.push(tally?);
        }
        Ok(tallies)
    }

    fn daily_answer_counts(&self, owner_id: i64) -> Result<Vec<DailyCount>, QuizError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                substr(timestamp, 1, 10) AS day,
                SUM(CASE WHEN is_correct THEN 1 ELSE 0 END) AS correct,
                SUM(CASE WHEN is_correct THEN 0 ELSE 1 END) AS wrong
            FROM quiz_answer_log
            WHERE owner_id = ?1
            GROUP BY day
            ORDER BY day ASC
            "#,
        )?;
        let rows = stmt.query_map([owner_id], |row| {
            let day: String = row.get(0)?;
            Ok(DailyCount {
                day: parse_day(0, &day)?,
                correct: row.get(1)?,
                wrong: row.get(2)?,
            })
        })?;
        let mut days = Vec::new();
        for day in rows {
            days.push(day?);
        }
        Ok(days)
    }

    fn active_days(&self, owner_id: i64) -> Result<Vec<NaiveDate>, QuizError> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT substr(timestamp, 1, 10) AS day
             FROM quiz_answer_log WHERE owner_id = ?1 ORDER BY day ASC",
        )?;
        let rows = stmt.query_map([owner_id], |row| {
            let day: String = row.get(0)?;
            parse_day(0, &day)
        })?;
        let mut days = Vec::new();
        for day in rows {
            days.push(day?);
        }
        Ok(days)
    }

    fn count_lists(&self, owner_id: i64) -> Result<i64, QuizError> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM word_lists WHERE owner_id = ?1",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    fn count_words(&self, owner_id: i64) -> Result<i64, QuizError> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM words w
             JOIN word_lists wl ON wl.id = w.list_id
             WHERE wl.owner_id = ?1",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    fn count_quizzes(&self, owner_id: i64) -> Result<i64, QuizError> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM quiz_results WHERE owner_id = ?1",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
