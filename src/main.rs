use clap::{Parser, Subcommand};
use glossa::config::{Config, ConfigStore, FileConfigStore};
use glossa::error::Error;
use glossa::lookup::{CachedLookup, DictionaryApi, Lookup};
use glossa::progress::MasteryBand;
use glossa::scheduler::QuizQuestion;
use glossa::store::{NewWord, VocabDb};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use time_humanize::{Accuracy, HumanTime, Tense};

/// daily vocabulary trainer with spaced review and multiple-choice quizzes
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "A vocabulary trainer that schedules words by how recently you reviewed them, grades multiple-choice quizzes, and tracks a per-word mastery level over time."
)]
struct Cli {
    /// path to the vocabulary database (defaults to the state directory)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// add a word to the vocabulary, looking up the definition if omitted
    Add {
        word: String,
        definition: Option<String>,
        #[clap(long)]
        example: Option<String>,
        #[clap(long)]
        pronunciation: Option<String>,
        #[clap(long)]
        difficulty: Option<i64>,
        #[clap(long)]
        category: Option<String>,
    },
    /// show today's learning batch and record the session
    Learn {
        /// number of words to study
        #[clap(short = 'n', long)]
        count: Option<usize>,
    },
    /// list previously studied words, least recently reviewed first
    Review {
        #[clap(short = 'n', long)]
        count: Option<usize>,
    },
    /// take a multiple-choice quiz and update word mastery
    Quiz {
        /// number of questions
        #[clap(short = 'n', long)]
        count: Option<usize>,
    },
    /// show aggregate learning statistics
    Stats,
    /// export the quiz-result log as CSV
    Export { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    let config = FileConfigStore::default().load();

    if let Err(e) = run(cli, &config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &Config) -> glossa::Result<()> {
    let mut db = match &cli.db {
        Some(path) => VocabDb::open(path)?,
        None => VocabDb::open_default()?,
    };
    db.seed_if_empty()?;

    match cli.command {
        Command::Add {
            word,
            definition,
            example,
            pronunciation,
            difficulty,
            category,
        } => add(&mut db, config, word, definition, example, pronunciation, difficulty, category),
        Command::Learn { count } => learn(&mut db, count.unwrap_or(config.words_per_session)),
        Command::Review { count } => review(&db, count.unwrap_or(config.review_batch_size)),
        Command::Quiz { count } => quiz(&mut db, config, count.unwrap_or(config.quiz_length)),
        Command::Stats => stats(&db),
        Command::Export { path } => {
            let rows = glossa::export::export_quiz_results(&db, &path)?;
            println!("exported {rows} quiz results to {}", path.display());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn add(
    db: &mut VocabDb,
    config: &Config,
    word: String,
    definition: Option<String>,
    example: Option<String>,
    pronunciation: Option<String>,
    difficulty: Option<i64>,
    category: Option<String>,
) -> glossa::Result<()> {
    let definition = match definition {
        Some(d) => d,
        None => {
            let mut lookup = CachedLookup::new(DictionaryApi::new(config.lookup_timeout_secs)?);
            match lookup.lookup(&word)? {
                Some(d) => {
                    println!("definition: {d}");
                    d
                }
                None => {
                    eprintln!("no definition found for '{word}'; provide one explicitly");
                    return Ok(());
                }
            }
        }
    };

    let entry = NewWord {
        word: word.clone(),
        definition,
        example,
        pronunciation,
        difficulty,
        category,
    };
    let id = db.add_word(&entry)?;
    println!("added '{word}' (id {id})");
    Ok(())
}

fn learn(db: &mut VocabDb, count: usize) -> glossa::Result<()> {
    let session_id = db.start_or_get_todays_session()?;
    let batch = db.learning_batch(count)?;

    if batch.is_empty() {
        println!("nothing left to learn - every word is mastered");
        return Ok(());
    }

    for (i, word) in batch.iter().enumerate() {
        println!();
        println!("[{}/{}] {}", i + 1, batch.len(), word.word);
        if let Some(ref pron) = word.pronunciation {
            println!("      /{pron}/");
        }
        println!("      {}", word.definition);
        if let Some(ref example) = word.example {
            println!("      e.g. {example}");
        }
    }

    db.finalize_session(session_id, batch.len() as i64, 0.0)?;
    println!();
    println!("studied {} words today", batch.len());
    Ok(())
}

fn review(db: &VocabDb, count: usize) -> glossa::Result<()> {
    let batch = db.review_batch(count)?;
    if batch.is_empty() {
        println!("no words to review yet - learn some first");
        return Ok(());
    }

    for word in &batch {
        let progress = db.progress_for(word.id)?;
        let (band, seen) = match progress {
            Some(ref p) => (p.band(), humanize_since(p.last_reviewed)),
            None => (MasteryBand::New, "never".to_string()),
        };
        println!("{:<16} {:<10} last seen {}", word.word, band.to_string(), seen);
        println!("    {}", word.definition);
    }
    Ok(())
}

fn humanize_since(last: Option<chrono::DateTime<chrono::Local>>) -> String {
    match last {
        Some(ts) => {
            let elapsed = (chrono::Local::now() - ts).num_seconds().max(0) as u64;
            HumanTime::from(std::time::Duration::from_secs(elapsed))
                .to_text_en(Accuracy::Rough, Tense::Past)
        }
        None => "never".to_string(),
    }
}

fn quiz(db: &mut VocabDb, config: &Config, count: usize) -> glossa::Result<()> {
    let session_id = db.start_or_get_todays_session()?;
    let words = db.quiz_batch(count)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut correct_total = 0;
    let mut answered = 0;

    for (i, word) in words.iter().enumerate() {
        let question = db.build_quiz_choices(word, config.distractor_pool_size)?;
        println!();
        println!("[{}/{}] What does '{}' mean?", i + 1, words.len(), question.prompt);
        for (n, option) in question.options.iter().enumerate() {
            println!("  {}) {}", n + 1, option);
        }

        let started = Instant::now();
        let choice = match prompt_choice(&mut input, question.options.len())? {
            Some(choice) => choice,
            None => {
                // Unread questions are skipped, not graded
                println!();
                println!("input closed - ending the quiz early");
                break;
            }
        };
        let response_time = started.elapsed().as_secs_f64();

        let was_correct = answer_is_correct(&question, choice);
        db.record_answer(word.id, was_correct, response_time)?;
        answered += 1;

        if was_correct {
            correct_total += 1;
            println!("correct!");
        } else {
            println!("incorrect - the answer is: {}", question.answer);
        }
    }

    if answered == 0 {
        println!("quiz ended before any answers were given");
        return Ok(());
    }

    let score = correct_total as f64 / answered as f64 * 100.0;
    db.finalize_session(session_id, answered as i64, score)?;

    println!();
    println!("score: {correct_total}/{answered} ({score:.1}%)");
    Ok(())
}

fn answer_is_correct(question: &QuizQuestion, choice: usize) -> bool {
    question.options.get(choice).map(String::as_str) == Some(question.answer.as_str())
}

/// Reads a 1-based option number from `input`. Returns `None` on EOF.
fn prompt_choice<R: BufRead>(input: &mut R, options: usize) -> Result<Option<usize>, Error> {
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=options).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("enter a number between 1 and {options}"),
        }
    }
}

fn stats(db: &VocabDb) -> glossa::Result<()> {
    let stats = db.user_stats()?;
    println!("words practiced:   {}", stats.words_attempted);
    println!("words mastered:    {}", stats.mastered);
    println!("avg session score: {:.1}%", stats.average_session_score);
    println!("sessions (7 days): {}", stats.sessions_last_7_days);
    Ok(())
}
