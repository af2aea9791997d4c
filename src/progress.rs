use crate::error::Result;
use crate::store::{parse_timestamp, VocabDb, WordId};
use chrono::{DateTime, Local};
use rusqlite::{params, OptionalExtension};

/// Per-word learning counters. Exactly one row per word; created zeroed when
/// the word is added (or lazily on the first recorded answer).
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub word_id: WordId,
    pub correct_count: i64,
    pub total_attempts: i64,
    pub mastery_level: i64,
    pub last_reviewed: Option<DateTime<Local>>,
}

impl Progress {
    pub fn accuracy(&self) -> f64 {
        if self.total_attempts > 0 {
            self.correct_count as f64 / self.total_attempts as f64
        } else {
            0.0
        }
    }

    pub fn band(&self) -> MasteryBand {
        MasteryBand::from_level(self.mastery_level)
    }
}

/// Human-readable rendering of the 0-3 mastery ratchet
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum MasteryBand {
    New,
    Learning,
    Familiar,
    Mastered,
}

impl MasteryBand {
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=0 => MasteryBand::New,
            1 => MasteryBand::Learning,
            2 => MasteryBand::Familiar,
            _ => MasteryBand::Mastered,
        }
    }
}

/// One graded answer from the append-only log
#[derive(Debug, Clone, PartialEq)]
pub struct QuizRecord {
    pub word_id: WordId,
    pub answered_at: DateTime<Local>,
    pub was_correct: bool,
    pub response_time_secs: f64,
}

/// Aggregate statistics, computed fresh from the store on every call
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub words_attempted: i64,
    pub mastered: i64,
    pub average_session_score: f64,
    pub sessions_last_7_days: i64,
}

/// Mastery transition applied after each graded answer, using the
/// post-increment counters.
///
/// Promotion needs at least three attempts at >= 80% accuracy; demotion
/// triggers whenever accuracy drops below 50%, including on the very first
/// answer. That asymmetry is deliberate and must not be smoothed out: a
/// brand-new word answered wrong takes the demotion branch and clamps at 0.
pub fn next_mastery(level: i64, total_attempts: i64, correct_count: i64) -> i64 {
    let accuracy = if total_attempts > 0 {
        correct_count as f64 / total_attempts as f64
    } else {
        0.0
    };

    if total_attempts >= 3 && accuracy >= 0.8 {
        (level + 1).min(3)
    } else if accuracy < 0.5 {
        (level - 1).max(0)
    } else {
        level
    }
}

impl VocabDb {
    /// Grade one answer for a word: append it to the quiz-result log, bump
    /// the word's counters, apply the mastery transition, and stamp
    /// `last_reviewed`. All of it commits in a single transaction.
    pub fn record_answer(
        &mut self,
        word_id: WordId,
        was_correct: bool,
        response_time_secs: f64,
    ) -> Result<Progress> {
        let response_time_secs = response_time_secs.max(0.0);
        let now = Local::now();
        let stamp = now.to_rfc3339();

        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO quiz_results (word_id, answered_at, was_correct, response_time_secs)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![word_id, stamp, was_correct, response_time_secs],
        )?;

        // Read-then-write inside the transaction keeps the one-row-per-word
        // invariant without relying on conflict resolution.
        let existing: Option<(i64, i64, i64)> = tx
            .query_row(
                "SELECT correct_count, total_attempts, mastery_level FROM progress WHERE word_id = ?1",
                params![word_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (correct, total, mastery) = existing.unwrap_or((0, 0, 0));
        let correct = correct + if was_correct { 1 } else { 0 };
        let total = total + 1;
        let mastery = next_mastery(mastery, total, correct);

        if existing.is_some() {
            tx.execute(
                r#"
                UPDATE progress
                SET correct_count = ?2, total_attempts = ?3, mastery_level = ?4, last_reviewed = ?5
                WHERE word_id = ?1
                "#,
                params![word_id, correct, total, mastery, stamp],
            )?;
        } else {
            tx.execute(
                r#"
                INSERT INTO progress (word_id, correct_count, total_attempts, mastery_level, last_reviewed)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![word_id, correct, total, mastery, stamp],
            )?;
        }

        tx.commit()?;

        Ok(Progress {
            word_id,
            correct_count: correct,
            total_attempts: total,
            mastery_level: mastery,
            last_reviewed: Some(now),
        })
    }

    /// Current progress for a word, if any has been recorded
    pub fn progress_for(&self, word_id: WordId) -> Result<Option<Progress>> {
        let progress = self
            .conn
            .query_row(
                r#"
                SELECT word_id, correct_count, total_attempts, mastery_level, last_reviewed
                FROM progress WHERE word_id = ?1
                "#,
                params![word_id],
                |row| {
                    let last_reviewed = match row.get::<_, Option<String>>(4)? {
                        Some(_) => Some(parse_timestamp(row, 4)?),
                        None => None,
                    };
                    Ok(Progress {
                        word_id: row.get(0)?,
                        correct_count: row.get(1)?,
                        total_attempts: row.get(2)?,
                        mastery_level: row.get(3)?,
                        last_reviewed,
                    })
                },
            )
            .optional()?;
        Ok(progress)
    }

    /// Full answer history for a word, oldest first
    pub fn quiz_history(&self, word_id: WordId) -> Result<Vec<QuizRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT word_id, answered_at, was_correct, response_time_secs
            FROM quiz_results
            WHERE word_id = ?1
            ORDER BY answered_at ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![word_id], |row| {
            Ok(QuizRecord {
                word_id: row.get(0)?,
                answered_at: parse_timestamp(row, 1)?,
                was_correct: row.get(2)?,
                response_time_secs: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    /// Aggregate user statistics across progress and sessions
    pub fn user_stats(&self) -> Result<UserStats> {
        let words_attempted: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM progress WHERE total_attempts > 0",
            [],
            |row| row.get(0),
        )?;

        let mastered: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM progress WHERE mastery_level >= 3",
            [],
            |row| row.get(0),
        )?;

        let average_session_score: f64 = self
            .conn
            .query_row(
                "SELECT AVG(quiz_score) FROM daily_sessions WHERE completed = 1",
                [],
                |row| row.get::<_, Option<f64>>(0),
            )?
            .unwrap_or(0.0);

        let sessions_last_7_days: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM daily_sessions
            WHERE completed = 1 AND session_date >= date('now', '-7 days')
            "#,
            [],
            |row| row.get(0),
        )?;

        Ok(UserStats {
            words_attempted,
            mastered,
            average_session_score,
            sessions_last_7_days,
        })
    }
}
