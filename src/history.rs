use chrono::prelude::*;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::game::WordGuessSession;

/// Outcome of one finished session, as logged to the history file
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub word_list: String,
    pub word: String,
    pub misses: u32,
    pub won: bool,
}

impl GameRecord {
    pub fn from_session(session: &WordGuessSession, word_list: &str) -> Self {
        Self {
            word_list: word_list.to_string(),
            word: session.secret().to_string(),
            misses: session.misses(),
            won: session.is_won(),
        }
    }
}

/// Append-only log of finished games, one CSV line per game
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: Option<PathBuf>,
}

impl HistoryLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::history_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: Some(p.as_ref().to_path_buf()),
        }
    }

    pub fn append(&self, record: &GameRecord) -> io::Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !path.exists();

        let mut log_file = OpenOptions::new().append(true).create(true).open(path)?;

        if needs_header {
            writeln!(log_file, "date,list,word,misses,result")?;
        }

        writeln!(
            log_file,
            "{},{},{},{},{}",
            Local::now().format("%c"),
            record.word_list,
            record.word,
            record.misses,
            if record.won { "won" } else { "lost" },
        )?;

        Ok(())
    }
}
