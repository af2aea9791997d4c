use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub type WordId = i64;

/// A vocabulary entry as stored in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub id: WordId,
    pub word: String,
    pub definition: String,
    pub example: Option<String>,
    pub pronunciation: Option<String>,
    pub difficulty: i64,
    pub category: String,
    pub created_at: DateTime<Local>,
}

/// Fields for inserting a new vocabulary entry. `difficulty` defaults to 1
/// and `category` to "general" when left unset.
#[derive(Debug, Clone, Default)]
pub struct NewWord {
    pub word: String,
    pub definition: String,
    pub example: Option<String>,
    pub pronunciation: Option<String>,
    pub difficulty: Option<i64>,
    pub category: Option<String>,
}

impl NewWord {
    pub fn new(word: &str, definition: &str) -> Self {
        Self {
            word: word.to_string(),
            definition: definition.to_string(),
            ..Self::default()
        }
    }
}

/// Database manager for the vocabulary catalog, per-word progress,
/// the quiz-result log, and daily sessions
#[derive(Debug)]
pub struct VocabDb {
    pub(crate) conn: Connection,
}

impl VocabDb {
    /// Open (or create) the database at the default state directory
    pub fn open_default() -> Result<Self> {
        let db_path =
            crate::app_dirs::AppDirs::db_path().unwrap_or_else(|| PathBuf::from("glossa.db"));
        Self::open(&db_path)
    }

    /// Open (or create) the database at the given path and run the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS vocabulary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL UNIQUE,
                definition TEXT NOT NULL,
                example TEXT,
                pronunciation TEXT,
                difficulty INTEGER NOT NULL DEFAULT 1,
                category TEXT NOT NULL DEFAULT 'general',
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        // Exactly one progress row per word, ever
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word_id INTEGER NOT NULL UNIQUE,
                correct_count INTEGER NOT NULL DEFAULT 0,
                total_attempts INTEGER NOT NULL DEFAULT 0,
                mastery_level INTEGER NOT NULL DEFAULT 0,
                last_reviewed TEXT,
                FOREIGN KEY (word_id) REFERENCES vocabulary (id)
            )
            "#,
            [],
        )?;

        // Append-only answer log; rows are never updated or deleted
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS quiz_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word_id INTEGER NOT NULL,
                answered_at TEXT NOT NULL,
                was_correct BOOLEAN NOT NULL,
                response_time_secs REAL NOT NULL,
                FOREIGN KEY (word_id) REFERENCES vocabulary (id)
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS daily_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_date TEXT NOT NULL UNIQUE,
                words_learned INTEGER NOT NULL DEFAULT 0,
                quiz_score REAL NOT NULL DEFAULT 0.0,
                completed BOOLEAN NOT NULL DEFAULT 0
            )
            "#,
            [],
        )?;

        // Indexes for the scheduler's join and the answer log
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_quiz_results_word ON quiz_results(word_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_quiz_results_answered ON quiz_results(answered_at)",
            [],
        )?;

        Ok(VocabDb { conn })
    }

    /// Add a new vocabulary word and its zeroed progress row in one
    /// transaction. A word whose key already exists is rejected without
    /// touching the existing entry or its progress.
    pub fn add_word(&mut self, entry: &NewWord) -> Result<WordId> {
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            r#"
            INSERT INTO vocabulary (word, definition, example, pronunciation, difficulty, category, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.word,
                entry.definition,
                entry.example,
                entry.pronunciation,
                entry.difficulty.unwrap_or(1),
                entry.category.as_deref().unwrap_or("general"),
                Local::now().to_rfc3339(),
            ],
        );

        let word_id = match inserted {
            Ok(_) => tx.last_insert_rowid(),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::DuplicateWord(entry.word.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        tx.execute(
            r#"
            INSERT INTO progress (word_id) VALUES (?1)
            ON CONFLICT(word_id) DO NOTHING
            "#,
            params![word_id],
        )?;

        tx.commit()?;
        Ok(word_id)
    }

    /// Fetch a single word by id
    pub fn get_word(&self, id: WordId) -> Result<Option<Word>> {
        let word = self
            .conn
            .query_row(
                r#"
                SELECT id, word, definition, example, pronunciation, difficulty, category, created_at
                FROM vocabulary WHERE id = ?1
                "#,
                params![id],
                Self::word_from_row,
            )
            .optional()?;
        Ok(word)
    }

    /// Fetch a single word by its unique key
    pub fn find_word(&self, word: &str) -> Result<Option<Word>> {
        let word = self
            .conn
            .query_row(
                r#"
                SELECT id, word, definition, example, pronunciation, difficulty, category, created_at
                FROM vocabulary WHERE word = ?1
                "#,
                params![word],
                Self::word_from_row,
            )
            .optional()?;
        Ok(word)
    }

    pub fn word_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vocabulary", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub(crate) fn word_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Word> {
        Ok(Word {
            id: row.get(0)?,
            word: row.get(1)?,
            definition: row.get(2)?,
            example: row.get(3)?,
            pronunciation: row.get(4)?,
            difficulty: row.get(5)?,
            category: row.get(6)?,
            created_at: parse_timestamp(row, 7)?,
        })
    }
}

pub(crate) fn parse_timestamp(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<DateTime<Local>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "timestamp".to_string(), rusqlite::types::Type::Text)
        })
}

/// Starter vocabulary shipped with the app: (word, definition, example,
/// pronunciation)
pub const STARTER_WORDS: &[(&str, &str, &str, &str)] = &[
    (
        "abundance",
        "A very large quantity of something",
        "There was an abundance of food at the party.",
        "uh-BUHN-duhns",
    ),
    (
        "benevolent",
        "Well meaning and kindly",
        "The benevolent old man helped the lost child.",
        "buh-NEV-uh-luhnt",
    ),
    (
        "candid",
        "Truthful and straightforward; frank",
        "She gave a candid assessment of the situation.",
        "KAN-did",
    ),
    (
        "diligent",
        "Having or showing care and conscientiousness",
        "The diligent student completed all assignments.",
        "DIL-i-juhnt",
    ),
    (
        "eloquent",
        "Fluent or persuasive in speaking or writing",
        "The eloquent speaker moved the audience.",
        "EL-uh-kwuhnt",
    ),
    (
        "feasible",
        "Possible to do easily or conveniently",
        "The plan seems feasible given our resources.",
        "FEE-zuh-buhl",
    ),
    (
        "gregarious",
        "Fond of the company of others; sociable",
        "She has a gregarious personality.",
        "gri-GAIR-ee-uhs",
    ),
    (
        "hypothesis",
        "A supposition or proposed explanation",
        "The scientist tested her hypothesis carefully.",
        "hahy-POTH-uh-sis",
    ),
    (
        "inevitable",
        "Certain to happen; unavoidable",
        "Change is inevitable in life.",
        "in-EV-i-tuh-buhl",
    ),
    (
        "justify",
        "Show or prove to be right or reasonable",
        "Can you justify your decision?",
        "JUHS-tuh-fahy",
    ),
];

impl VocabDb {
    /// Seed the starter vocabulary when the catalog is empty. Returns the
    /// number of words added.
    pub fn seed_if_empty(&mut self) -> Result<usize> {
        if self.word_count()? > 0 {
            return Ok(0);
        }

        let mut added = 0;
        for (word, definition, example, pronunciation) in STARTER_WORDS {
            let entry = NewWord {
                word: word.to_string(),
                definition: definition.to_string(),
                example: Some(example.to_string()),
                pronunciation: Some(pronunciation.to_string()),
                ..NewWord::default()
            };
            self.add_word(&entry)?;
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn add_and_get_word_roundtrip() {
        let mut db = VocabDb::open_in_memory().unwrap();

        let entry = NewWord {
            word: "laconic".to_string(),
            definition: "Using very few words".to_string(),
            example: Some("His laconic reply ended the debate.".to_string()),
            pronunciation: Some("luh-KON-ik".to_string()),
            difficulty: Some(2),
            category: Some("adjectives".to_string()),
        };

        let id = db.add_word(&entry).unwrap();
        let word = db.get_word(id).unwrap().unwrap();

        assert_eq!(word.word, "laconic");
        assert_eq!(word.definition, "Using very few words");
        assert_eq!(word.example.as_deref(), Some("His laconic reply ended the debate."));
        assert_eq!(word.difficulty, 2);
        assert_eq!(word.category, "adjectives");
    }

    #[test]
    fn defaults_applied_for_optional_fields() {
        let mut db = VocabDb::open_in_memory().unwrap();

        let id = db.add_word(&NewWord::new("terse", "Sparing in the use of words")).unwrap();
        let word = db.get_word(id).unwrap().unwrap();

        assert_eq!(word.difficulty, 1);
        assert_eq!(word.category, "general");
        assert_eq!(word.example, None);
        assert_eq!(word.pronunciation, None);
    }

    #[test]
    fn duplicate_word_is_rejected() {
        let mut db = VocabDb::open_in_memory().unwrap();

        let id = db.add_word(&NewWord::new("candid", "Frank")).unwrap();
        let result = db.add_word(&NewWord::new("candid", "A different definition"));

        assert_matches!(result, Err(Error::DuplicateWord(w)) if w == "candid");

        // The original entry is untouched
        let word = db.get_word(id).unwrap().unwrap();
        assert_eq!(word.definition, "Frank");
        assert_eq!(db.word_count().unwrap(), 1);
    }

    #[test]
    fn adding_a_word_creates_a_zeroed_progress_row() {
        let mut db = VocabDb::open_in_memory().unwrap();

        let id = db.add_word(&NewWord::new("candid", "Frank")).unwrap();
        let progress = db.progress_for(id).unwrap().unwrap();

        assert_eq!(progress.total_attempts, 0);
        assert_eq!(progress.correct_count, 0);
        assert_eq!(progress.mastery_level, 0);
        assert_eq!(progress.last_reviewed, None);
    }

    #[test]
    fn get_word_missing_id_is_none() {
        let db = VocabDb::open_in_memory().unwrap();
        assert_eq!(db.get_word(42).unwrap(), None);
    }

    #[test]
    fn find_word_by_key() {
        let mut db = VocabDb::open_in_memory().unwrap();
        let id = db.add_word(&NewWord::new("candid", "Frank")).unwrap();

        assert_eq!(db.find_word("candid").unwrap().unwrap().id, id);
        assert_eq!(db.find_word("missing").unwrap(), None);
    }

    #[test]
    fn seed_populates_empty_catalog_once() {
        let mut db = VocabDb::open_in_memory().unwrap();

        assert_eq!(db.seed_if_empty().unwrap(), STARTER_WORDS.len());
        assert_eq!(db.word_count().unwrap(), STARTER_WORDS.len());

        // Second call is a no-op
        assert_eq!(db.seed_if_empty().unwrap(), 0);
        assert_eq!(db.word_count().unwrap(), STARTER_WORDS.len());
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vocab.db");

        let db = VocabDb::open(&path).unwrap();
        assert_eq!(db.word_count().unwrap(), 0);
        assert!(path.exists());
    }
}
