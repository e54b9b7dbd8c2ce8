use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::PathBuf;

use crate::app_dirs::AppDirs;

/// One recorded guess: did this letter hit the secret word or not
#[derive(Debug, Clone)]
pub struct GuessStat {
    pub letter: char,
    pub was_hit: bool,
    pub word_list: String,
    pub timestamp: DateTime<Local>,
}

/// Per-letter aggregate used by the stats screen
#[derive(Debug, Clone, PartialEq)]
pub struct LetterSummary {
    pub letter: char,
    pub hit_rate: f64,
    pub attempts: i64,
}

/// Database manager for letter guess statistics
#[derive(Debug)]
pub struct GuessDb {
    conn: Connection,
}

impl GuessDb {
    /// Initialize the database connection and create tables if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("galge_stats.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(&db_path)?;
        Self::init_schema(&conn)?;
        Ok(GuessDb { conn })
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(GuessDb { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS guess_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                letter TEXT NOT NULL,
                was_hit BOOLEAN NOT NULL,
                word_list TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_guess_stats_letter ON guess_stats(letter)",
            [],
        )?;

        Ok(())
    }

    /// Record a single guess outcome
    pub fn record_guess(&self, stat: &GuessStat) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO guess_stats (letter, was_hit, word_list, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                stat.letter.to_string(),
                stat.was_hit,
                stat.word_list,
                stat.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Record a finished game's guesses in one transaction
    pub fn record_guesses_batch(&mut self, stats: &[GuessStat]) -> Result<()> {
        let tx = self.conn.transaction()?;

        for stat in stats {
            tx.execute(
                r#"
                INSERT INTO guess_stats (letter, was_hit, word_list, timestamp)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    stat.letter.to_string(),
                    stat.was_hit,
                    stat.word_list,
                    stat.timestamp.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Hit rate (percentage of guesses that revealed a letter) for one letter
    pub fn get_hit_rate(&self, letter: char) -> Result<f64> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                COUNT(*) as total,
                SUM(CASE WHEN was_hit = 1 THEN 1 ELSE 0 END) as hits
            FROM guess_stats
            WHERE letter = ?1
            "#,
        )?;

        let (total, hits): (i64, Option<i64>) =
            stmt.query_row([letter.to_string()], |row| Ok((row.get(0)?, row.get(1)?)))?;

        if total == 0 {
            Ok(0.0)
        } else {
            Ok((hits.unwrap_or(0) as f64 / total as f64) * 100.0)
        }
    }

    /// Aggregate hit rate and attempt count per letter, ordered by letter
    pub fn get_letter_summary(&self) -> Result<Vec<LetterSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                letter,
                (SUM(CASE WHEN was_hit = 1 THEN 1 ELSE 0 END) * 100.0 / COUNT(*)) as hit_rate,
                COUNT(*) as attempts
            FROM guess_stats
            GROUP BY letter
            ORDER BY letter
            "#,
        )?;

        let summary_iter = stmt.query_map([], |row| {
            let letter_str: String = row.get(0)?;
            Ok(LetterSummary {
                letter: letter_str.chars().next().unwrap_or('\0'),
                hit_rate: row.get(1)?,
                attempts: row.get(2)?,
            })
        })?;

        let mut summary = Vec::new();
        for item in summary_iter {
            summary.push(item?);
        }

        Ok(summary)
    }

    /// Clear all statistics (for testing or reset purposes)
    pub fn clear_all_stats(&self) -> Result<()> {
        self.conn.execute("DELETE FROM guess_stats", [])?;
        Ok(())
    }
}
