use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use time_humanize::{Accuracy, HumanTime, Tense};
use tracing_subscriber::EnvFilter;

use glosa::analytics;
use glosa::config::{Config, ConfigStore, FileConfigStore};
use glosa::error::QuizError;
use glosa::quiz::{build_quiz, finish_quiz, Direction, QuizSummary};
use glosa::starter::StarterList;
use glosa::store::{AnswerEntry, ListSelection, ScopeFilter, SqliteStore, WordStore};

// Single-user install; the engine itself is owner-scoped.
const OWNER_ID: i64 = 1;

/// adaptive vocabulary drilling with weighted quizzes and progress analytics
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Drill your word lists with quizzes that adapt to your mistakes: words you keep getting wrong come up more often, and your progress is tracked per day."
)]
struct Cli {
    /// path to the database (defaults to ~/.local/state/glosa/glosa.db)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// take a quiz over your word lists
    Quiz {
        /// number of questions
        #[clap(short = 'n', long)]
        questions: Option<usize>,

        /// quiz direction
        #[clap(short, long, value_enum)]
        direction: Option<Direction>,

        /// draw only from these list ids (defaults to all your lists)
        #[clap(short, long, value_delimiter = ',')]
        lists: Vec<i64>,

        /// also draw from the shared global pool
        #[clap(long)]
        global: bool,
    },
    /// show your word lists
    Lists,
    /// create a new word list
    AddList { name: String },
    /// delete a word list and every word in it
    DeleteList { list_id: i64 },
    /// add a word pair to a list
    AddWord {
        list_id: i64,
        original: String,
        translation: String,
    },
    /// bulk-load "original,translation" rows from a csv file
    Import { list_id: i64, file: PathBuf },
    /// create a list from a bundled starter pack
    InitStarter { name: String },
    /// publish a word to the shared global pool
    Share { word_id: i64 },
    /// overall totals and per-day accuracy
    Stats,
    /// the words you miss the most
    Hardest {
        #[clap(short = 'n', long)]
        limit: Option<usize>,
    },
    /// current and longest consecutive-day practice streaks
    Streaks,
    /// show or update saved defaults
    Config {
        /// default number of questions
        #[clap(long)]
        questions: Option<usize>,

        /// default quiz direction
        #[clap(long, value_enum)]
        direction: Option<Direction>,

        /// include the shared global pool by default
        #[clap(long)]
        global: Option<bool>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("glosa=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FileConfigStore::new().load();

    let mut store = match &cli.db {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::open_default()?,
    };

    match cli.command {
        Command::Quiz {
            questions,
            direction,
            lists,
            global,
        } => run_quiz(&mut store, &config, questions, direction, lists, global)?,
        Command::Lists => show_lists(&store)?,
        Command::AddList { name } => {
            let list = store.create_list(OWNER_ID, &name)?;
            println!("Created list {} ({})", list.id, list.name);
        }
        Command::DeleteList { list_id } => {
            if store.delete_list(OWNER_ID, list_id)? {
                println!("Deleted list {list_id} and its words");
            } else {
                println!("No such list: {list_id}");
            }
        }
        Command::AddWord {
            list_id,
            original,
            translation,
        } => {
            let word = store.add_word(list_id, &original, &translation)?;
            println!("Added word {} ({} = {})", word.id, word.original, word.translation);
        }
        Command::Import { list_id, file } => {
            let n = import_csv(&store, list_id, &file)?;
            println!("Imported {n} words into list {list_id}");
        }
        Command::InitStarter { name } => init_starter(&store, &name)?,
        Command::Share { word_id } => {
            if store.set_word_global(word_id, true)? {
                println!("Word {word_id} published to the global pool");
            } else {
                println!("No such word: {word_id}");
            }
        }
        Command::Stats => show_stats(&store)?,
        Command::Hardest { limit } => {
            show_hardest(&store, limit.unwrap_or(config.hardest_limit))?
        }
        Command::Streaks => {
            let s = analytics::streaks(&store, OWNER_ID, Utc::now().date_naive())?;
            println!("Current streak: {} days", s.current);
            println!("Longest streak: {} days", s.longest);
        }
        Command::Config {
            questions,
            direction,
            global,
        } => update_config(config, questions, direction, global)?,
    }

    Ok(())
}

fn run_quiz(
    store: &mut SqliteStore,
    config: &Config,
    questions: Option<usize>,
    direction: Option<Direction>,
    lists: Vec<i64>,
    global: bool,
) -> Result<(), Box<dyn Error>> {
    let k = questions.unwrap_or(config.number_of_questions);
    let direction = direction.unwrap_or(config.direction);
    let scope = ScopeFilter {
        owner_id: OWNER_ID,
        lists: if lists.is_empty() {
            ListSelection::All
        } else {
            ListSelection::Only(lists)
        },
        include_global: global || config.include_global,
    };

    let pool = store.list_words(&scope)?;
    let quiz = match build_quiz(&pool, k, direction, &mut rand::thread_rng()) {
        Ok(quiz) => quiz,
        Err(err) if err.is_empty_pool() => {
            println!("No words available in the selected lists. Add some first.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!("Starting quiz: {} questions, direction {direction}", quiz.len());

    let stdin = io::stdin();
    let mut input = stdin.lock().lines();
    let mut answers = Vec::new();
    let mut correct: i64 = 0;

    for (i, question) in quiz.iter().enumerate() {
        println!();
        if question.wrong_count > 0 {
            println!(
                "Question {}/{}: {}   (missed {} times before)",
                i + 1,
                quiz.len(),
                question.prompt,
                question.wrong_count
            );
        } else {
            println!("Question {}/{}: {}", i + 1, quiz.len(), question.prompt);
        }
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = input.next() else { break };
        let answer = line?.trim().to_string();

        let is_correct = question.accepts(&answer);
        if is_correct {
            correct += 1;
            println!("Correct!");
        } else {
            println!("Wrong. Accepted: {}", question.display_answers.join(", "));
        }

        answers.push(AnswerEntry {
            word_id: question.word_id,
            user_answer: answer,
            is_correct,
        });
    }

    if answers.is_empty() {
        println!("\nNothing answered, nothing saved.");
        return Ok(());
    }

    let total = answers.len() as i64;
    let summary = match finish_quiz(store, OWNER_ID, &answers, correct, total) {
        Ok(summary) => summary,
        Err(err @ QuizError::Persistence(_)) => {
            eprintln!("could not save results");
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &QuizSummary) {
    println!();
    println!(
        "Score: {}/{} ({:.1}%)",
        summary.correct,
        summary.total,
        percentage(summary.correct, summary.total)
    );
    println!(
        "You have {} lists, {} words, {} quizzes taken.",
        summary.total_lists, summary.total_words, summary.total_quizzes
    );

    let misses: Vec<_> = summary
        .hardest_words
        .iter()
        .filter(|t| t.wrong > 0)
        .take(5)
        .collect();
    if !misses.is_empty() {
        println!("\nYour hardest words:");
        for t in misses {
            println!(
                "  {} = {}   {} wrong / {} correct   last missed {}",
                t.original,
                t.translation,
                t.wrong,
                t.correct,
                last_wrong_text(t.last_wrong_at)
            );
        }
    }
}

fn show_lists(store: &SqliteStore) -> Result<(), Box<dyn Error>> {
    let lists = store.lists(OWNER_ID)?;
    if lists.is_empty() {
        println!("No lists yet. Try `glosa add-list <name>` or `glosa init-starter swedish`.");
        return Ok(());
    }
    for list in lists {
        let words = store.words_in_list(list.id)?;
        println!("{:>4}  {}  ({} words)", list.id, list.name, words.len());
    }
    Ok(())
}

fn show_stats(store: &SqliteStore) -> Result<(), Box<dyn Error>> {
    println!(
        "Lists: {}   Words: {}   Quizzes: {}",
        store.count_lists(OWNER_ID)?,
        store.count_words(OWNER_ID)?,
        store.count_quizzes(OWNER_ID)?
    );

    let history = analytics::accuracy_history(store, OWNER_ID)?;
    if history.is_empty() {
        return Ok(());
    }
    println!("\n{:<12} {:>8} {:>7} {:>9}", "date", "correct", "wrong", "accuracy");
    for day in history {
        println!(
            "{:<12} {:>8} {:>7} {:>8.1}%",
            day.date.to_string(),
            day.correct,
            day.wrong,
            day.accuracy
        );
    }
    Ok(())
}

fn show_hardest(store: &SqliteStore, limit: usize) -> Result<(), Box<dyn Error>> {
    let hardest = analytics::hardest_words(store, OWNER_ID, limit)?;
    if hardest.is_empty() {
        println!("No answers recorded yet.");
        return Ok(());
    }
    for t in hardest {
        println!(
            "{} = {}   {} wrong / {} correct   last missed {}",
            t.original,
            t.translation,
            t.wrong,
            t.correct,
            last_wrong_text(t.last_wrong_at)
        );
    }
    Ok(())
}

fn update_config(
    mut config: Config,
    questions: Option<usize>,
    direction: Option<Direction>,
    global: Option<bool>,
) -> Result<(), Box<dyn Error>> {
    if questions.is_none() && direction.is_none() && global.is_none() {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    if let Some(n) = questions {
        config.number_of_questions = n;
    }
    if let Some(d) = direction {
        config.direction = d;
    }
    if let Some(g) = global {
        config.include_global = g;
    }
    FileConfigStore::new().save(&config)?;
    println!("Saved.");
    Ok(())
}

fn import_csv(
    store: &SqliteStore,
    list_id: i64,
    file: &std::path::Path,
) -> Result<usize, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file)?;

    let mut imported = 0;
    for record in reader.records() {
        let record = record?;
        if record.len() < 2 || record[0].is_empty() || record[1].is_empty() {
            tracing::warn!(row = imported + 1, "skipping malformed csv row");
            continue;
        }
        store.add_word(list_id, &record[0], &record[1])?;
        imported += 1;
    }
    Ok(imported)
}

fn init_starter(store: &SqliteStore, name: &str) -> Result<(), Box<dyn Error>> {
    let Some(pack) = StarterList::load(name) else {
        return Err(format!(
            "unknown starter pack {:?} (available: {})",
            name,
            StarterList::names().join(", ")
        )
        .into());
    };

    let list = store.create_list(OWNER_ID, &pack.name)?;
    for pair in &pack.pairs {
        store.add_word(list.id, &pair.original, &pair.translation)?;
    }
    println!(
        "Created list {} ({}) with {} words",
        list.id,
        list.name,
        pack.pairs.len()
    );
    Ok(())
}

fn percentage(correct: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

fn last_wrong_text(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => {
            let secs = (Utc::now() - at).num_seconds().max(0) as u64;
            HumanTime::from(Duration::from_secs(secs)).to_text_en(Accuracy::Rough, Tense::Past)
        }
        None => "–".to_string(),
    }
}
