use crate::error::Result;
use crate::store::VocabDb;
use chrono::{Local, NaiveDate};
use rusqlite::{params, OptionalExtension};

pub type SessionId = i64;

/// One record per calendar date summarizing that day's activity
#[derive(Debug, Clone, PartialEq)]
pub struct DailySession {
    pub id: SessionId,
    pub date: NaiveDate,
    pub words_learned: i64,
    pub quiz_score: f64,
    pub completed: bool,
}

impl VocabDb {
    /// Return today's session id, creating a zeroed record if this is the
    /// first activity of the day. Safe to call repeatedly: the UNIQUE
    /// session_date column guarantees at most one row per date.
    pub fn start_or_get_todays_session(&mut self) -> Result<SessionId> {
        self.start_or_get_session(Local::now().date_naive())
    }

    pub(crate) fn start_or_get_session(&mut self, date: NaiveDate) -> Result<SessionId> {
        let date_key = date.to_string();

        self.conn.execute(
            "INSERT OR IGNORE INTO daily_sessions (session_date) VALUES (?1)",
            params![date_key],
        )?;

        let id = self.conn.query_row(
            "SELECT id FROM daily_sessions WHERE session_date = ?1",
            params![date_key],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Write the session's outcome and mark it completed.
    ///
    /// Known limitation: finalizing the same session twice is not guarded;
    /// the last write wins.
    pub fn finalize_session(
        &self,
        session_id: SessionId,
        words_learned: i64,
        quiz_score_percent: f64,
    ) -> Result<()> {
        let words_learned = words_learned.max(0);
        let quiz_score_percent = quiz_score_percent.clamp(0.0, 100.0);

        self.conn.execute(
            r#"
            UPDATE daily_sessions
            SET words_learned = ?2, quiz_score = ?3, completed = 1
            WHERE id = ?1
            "#,
            params![session_id, words_learned, quiz_score_percent],
        )?;
        Ok(())
    }

    pub fn session(&self, session_id: SessionId) -> Result<Option<DailySession>> {
        let session = self
            .conn
            .query_row(
                r#"
                SELECT id, session_date, words_learned, quiz_score, completed
                FROM daily_sessions WHERE id = ?1
                "#,
                params![session_id],
                Self::session_from_row,
            )
            .optional()?;
        Ok(session)
    }

    pub fn session_for_date(&self, date: NaiveDate) -> Result<Option<DailySession>> {
        let session = self
            .conn
            .query_row(
                r#"
                SELECT id, session_date, words_learned, quiz_score, completed
                FROM daily_sessions WHERE session_date = ?1
                "#,
                params![date.to_string()],
                Self::session_from_row,
            )
            .optional()?;
        Ok(session)
    }

    fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DailySession> {
        let raw_date: String = row.get(1)?;
        let date = raw_date.parse::<NaiveDate>().map_err(|_| {
            rusqlite::Error::InvalidColumnType(1, "session_date".to_string(), rusqlite::types::Type::Text)
        })?;
        Ok(DailySession {
            id: row.get(0)?,
            date,
            words_learned: row.get(2)?,
            quiz_score: row.get(3)?,
            completed: row.get(4)?,
        })
    }
}
