use crate::error::Result;
use crate::store::{parse_timestamp, VocabDb};
use chrono::{DateTime, Local};
use std::path::Path;

/// One quiz-log row joined with its word, ready for export
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub word: String,
    pub answered_at: DateTime<Local>,
    pub was_correct: bool,
    pub response_time_secs: f64,
}

impl VocabDb {
    /// The complete quiz-result log joined with word keys, oldest first
    pub fn export_rows(&self) -> Result<Vec<ExportRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT v.word, q.answered_at, q.was_correct, q.response_time_secs
            FROM quiz_results q
            JOIN vocabulary v ON v.id = q.word_id
            ORDER BY q.answered_at ASC, q.id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ExportRow {
                word: row.get(0)?,
                answered_at: parse_timestamp(row, 1)?,
                was_correct: row.get(2)?,
                response_time_secs: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

/// Write the quiz-result log as CSV. Returns the number of data rows written.
pub fn export_quiz_results<P: AsRef<Path>>(db: &VocabDb, path: P) -> Result<usize> {
    let rows = db.export_rows()?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["word", "answered_at", "was_correct", "response_time_secs"])?;
    for row in &rows {
        let answered_at = row.answered_at.to_rfc3339();
        let response_time = format!("{:.3}", row.response_time_secs);
        writer.write_record([
            row.word.as_str(),
            answered_at.as_str(),
            if row.was_correct { "true" } else { "false" },
            response_time.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(rows.len())
}
