use crate::error::{Error, Result};
use crate::store::{VocabDb, Word, WordId};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rusqlite::params;

/// A quiz needs one correct answer plus this many distractors
pub const DISTRACTOR_COUNT: usize = 3;

/// Minimum distinct words before a quiz can be assembled
pub const MIN_QUIZ_WORDS: usize = 4;

/// Fallback answer options used when the store cannot supply enough
/// distinct definitions
pub const GENERIC_FILLERS: &[&str] = &[
    "A type of musical instrument",
    "A cooking utensil",
    "A building material",
    "A weather phenomenon",
];

/// A fully assembled multiple-choice question
#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub word_id: WordId,
    pub prompt: String,
    /// Exactly four distinct options in presentation order
    pub options: Vec<String>,
    pub answer: String,
}

impl VocabDb {
    /// Words for a learning pass: anything not yet mastered (or never
    /// attempted), least recently reviewed first. Never-reviewed words sort
    /// ahead of everything since their `last_reviewed` is NULL; ties break
    /// on insertion order.
    pub fn learning_batch(&self, count: usize) -> Result<Vec<Word>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT v.id, v.word, v.definition, v.example, v.pronunciation,
                   v.difficulty, v.category, v.created_at
            FROM vocabulary v
            LEFT JOIN progress p ON v.id = p.word_id
            WHERE p.mastery_level < 3 OR p.mastery_level IS NULL
            ORDER BY p.last_reviewed ASC, v.id ASC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![count as i64], Self::word_from_row)?;
        let mut words = Vec::new();
        for word in rows {
            words.push(word?);
        }
        Ok(words)
    }

    /// Words for a review pass: anything attempted at least once, least
    /// recently reviewed first, regardless of mastery.
    pub fn review_batch(&self, count: usize) -> Result<Vec<Word>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT v.id, v.word, v.definition, v.example, v.pronunciation,
                   v.difficulty, v.category, v.created_at
            FROM vocabulary v
            JOIN progress p ON v.id = p.word_id
            WHERE p.total_attempts > 0
            ORDER BY p.last_reviewed ASC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![count as i64], Self::word_from_row)?;
        let mut words = Vec::new();
        for word in rows {
            words.push(word?);
        }
        Ok(words)
    }

    /// Uniform random sample of learning-eligible words to quiz on. The pool
    /// is re-queried fresh each call, so repeated calls may resample the
    /// same words. Errors unless at least four words are still eligible;
    /// mastered words do not count towards the minimum.
    pub fn quiz_batch(&self, count: usize) -> Result<Vec<Word>> {
        let have = self.quizzable_count()?;
        if have < MIN_QUIZ_WORDS {
            return Err(Error::NotEnoughWords {
                have,
                need: MIN_QUIZ_WORDS,
            });
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT v.id, v.word, v.definition, v.example, v.pronunciation,
                   v.difficulty, v.category, v.created_at
            FROM vocabulary v
            LEFT JOIN progress p ON v.id = p.word_id
            WHERE p.mastery_level < 3 OR p.mastery_level IS NULL
            ORDER BY RANDOM()
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![count as i64], Self::word_from_row)?;
        let mut words = Vec::new();
        for word in rows {
            words.push(word?);
        }
        Ok(words)
    }

    /// Number of words still eligible for quizzing (mastery below 3 or
    /// never attempted).
    pub fn quizzable_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM vocabulary v
            LEFT JOIN progress p ON v.id = p.word_id
            WHERE p.mastery_level < 3 OR p.mastery_level IS NULL
            "#,
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Assemble the four answer options for a quiz question on `target`.
    ///
    /// Distractors are drawn from up to `pool_size` random other words'
    /// definitions, deduplicated against each other and the correct answer.
    /// When the store cannot supply three distinct distractors the generic
    /// filler pool pads out the set. The final options are uniformly
    /// shuffled.
    pub fn build_quiz_choices(&self, target: &Word, pool_size: usize) -> Result<QuizQuestion> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT definition FROM vocabulary
            WHERE id != ?1
            ORDER BY RANDOM()
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![target.id, pool_size as i64], |row| {
            row.get::<_, String>(0)
        })?;
        let mut candidates = Vec::new();
        for definition in rows {
            candidates.push(definition?);
        }

        let mut distractors: Vec<String> = candidates
            .into_iter()
            .unique()
            .filter(|definition| definition != &target.definition)
            .take(DISTRACTOR_COUNT)
            .collect();

        for filler in GENERIC_FILLERS {
            if distractors.len() >= DISTRACTOR_COUNT {
                break;
            }
            if *filler != target.definition && !distractors.iter().any(|d| d == filler) {
                distractors.push(filler.to_string());
            }
        }

        let mut options = Vec::with_capacity(DISTRACTOR_COUNT + 1);
        options.push(target.definition.clone());
        options.extend(distractors);
        options.shuffle(&mut rand::thread_rng());

        Ok(QuizQuestion {
            word_id: target.id,
            prompt: target.word.clone(),
            options,
            answer: target.definition.clone(),
        })
    }
}
