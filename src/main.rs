pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod game;
pub mod history;
pub mod motion;
pub mod runtime;
pub mod stats;
pub mod ui;
pub mod words;

use crate::{
    celebration::WinAnimation,
    config::{Config, ConfigStore, FileConfigStore},
    game::{SessionError, WordGuessSession},
    history::{GameRecord, HistoryLog},
    motion::{read_trace, MotionDebouncer, MotionSample},
    runtime::{spawn_motion_replay, GameEvent},
    stats::{GuessDb, GuessStat, LetterSummary},
    words::WordList,
};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::mpsc,
    thread,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// sleek hangman tui with a 7-stage gallows and letter analytics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A sleek hangman TUI: guess the word one letter at a time before the gallows drawing completes. Supports replayed accelerometer traces (shake to start a new game) and per-letter hit-rate analytics."
)]
pub struct Cli {
    /// word list to draw the secret from (defaults to the configured list)
    #[clap(short = 'l', long, value_enum)]
    word_list: Option<WordListChoice>,

    /// play a specific word instead of a random pick
    #[clap(short = 'w', long, value_parser = parse_secret_word)]
    word: Option<String>,

    /// replay an accelerometer trace (csv with a t_ms,x,y,z header); each detected shake starts a new game
    #[clap(short = 'm', long)]
    motion_trace: Option<PathBuf>,

    /// spike magnitude (in gravity units) that counts as a shake
    #[clap(long)]
    motion_threshold: Option<f64>,

    /// minimum gap between two reported shakes, in milliseconds
    #[clap(long)]
    motion_cooldown_ms: Option<u64>,

    /// reveal the word when the game is lost
    #[clap(long)]
    reveal_on_loss: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum WordListChoice {
    English,
    Animals,
    Science,
}

impl WordListChoice {
    fn as_word_list(&self) -> WordList {
        WordList::new(self.to_string().to_lowercase())
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "english" => Some(WordListChoice::English),
            "animals" => Some(WordListChoice::Animals),
            "science" => Some(WordListChoice::Science),
            _ => None,
        }
    }
}

/// CLI flag wins; otherwise the configured list, falling back to english
/// when the config names a list that doesn't exist
fn resolve_word_list(cli_choice: Option<WordListChoice>, config: &Config) -> WordListChoice {
    cli_choice
        .or_else(|| WordListChoice::from_name(&config.word_list))
        .unwrap_or(WordListChoice::English)
}

/// The secret must be guessable: non-empty, ascii letters only
fn parse_secret_word(s: &str) -> Result<String, String> {
    let word = s.to_lowercase();
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(String::from(
            "word must be one or more ascii letters (a-z)",
        ));
    }
    Ok(word)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Playing,
    Results,
    LetterStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortBy {
    Letter,
    HitRate,
    Attempts,
}

#[derive(Debug)]
pub struct LetterStatsState {
    pub scroll_offset: usize,
    pub sort_by: SortBy,
    pub sort_ascending: bool,
}

impl Default for LetterStatsState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            sort_by: SortBy::Letter,
            sort_ascending: true,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub word_list: WordListChoice,
    pub words: Vec<String>,
    pub fixed_word: Option<String>,
    pub session: WordGuessSession,
    pub state: AppState,
    pub reveal_on_loss: bool,
    pub celebration: WinAnimation,
    pub letter_stats_state: LetterStatsState,
    pub letter_summary: Vec<LetterSummary>,
    guess_db: Option<GuessDb>,
    history: HistoryLog,
    pending_guesses: Vec<GuessStat>,
}

impl App {
    pub fn new(cli: &Cli, config: &Config) -> Result<Self, SessionError> {
        let word_list = resolve_word_list(cli.word_list, config);
        let words = word_list.as_word_list().words;
        let session = Self::make_session(&words, cli.word.as_deref())?;

        Ok(Self {
            word_list,
            words,
            fixed_word: cli.word.clone(),
            session,
            state: AppState::Playing,
            reveal_on_loss: cli.reveal_on_loss || config.reveal_on_loss,
            celebration: WinAnimation::new(),
            letter_stats_state: LetterStatsState::default(),
            letter_summary: Vec::new(),
            guess_db: GuessDb::new().ok(),
            history: HistoryLog::new(),
            pending_guesses: Vec::new(),
        })
    }

    #[cfg(test)]
    pub fn for_tests(session: WordGuessSession) -> Self {
        Self {
            word_list: WordListChoice::English,
            words: Vec::new(),
            fixed_word: None,
            session,
            state: AppState::Playing,
            reveal_on_loss: true,
            celebration: WinAnimation::new(),
            letter_stats_state: LetterStatsState::default(),
            letter_summary: Vec::new(),
            guess_db: None,
            history: HistoryLog::with_path("/dev/null"),
            pending_guesses: Vec::new(),
        }
    }

    fn make_session(
        words: &[String],
        fixed_word: Option<&str>,
    ) -> Result<WordGuessSession, SessionError> {
        match fixed_word {
            Some(word) => Ok(WordGuessSession::with_secret(word.to_lowercase())),
            None => WordGuessSession::start(words, &mut rand::thread_rng()),
        }
    }

    /// Apply one keystroke as a guess; finishes the game when it ends
    pub fn guess(&mut self, c: char, term_width: u16, term_height: u16) {
        if self.state != AppState::Playing || self.session.is_over() {
            return;
        }

        let letter = c.to_ascii_lowercase();
        if !letter.is_ascii_alphabetic() {
            return;
        }

        // repeats are no-ops in the session and don't pollute the stats
        let is_new_guess = !self.session.guessed().contains(&letter);
        let was_hit = self.session.guess_letter(letter);

        if is_new_guess {
            self.pending_guesses.push(GuessStat {
                letter,
                was_hit,
                word_list: self.word_list.to_string().to_lowercase(),
                timestamp: Local::now(),
            });
        }

        if self.session.is_over() {
            self.finish_game(term_width, term_height);
        }
    }

    fn finish_game(&mut self, term_width: u16, term_height: u16) {
        let record = GameRecord::from_session(
            &self.session,
            &self.word_list.to_string().to_lowercase(),
        );
        let _ = self.history.append(&record);

        if let Some(ref mut db) = self.guess_db {
            let _ = db.record_guesses_batch(&self.pending_guesses);
        }
        self.pending_guesses.clear();

        if self.session.is_won() {
            self.celebration.start(term_width, term_height);
        }
        self.state = AppState::Results;
    }

    /// Start over with a fresh word (same word when `--word` pins it)
    pub fn new_game(&mut self) -> Result<(), SessionError> {
        self.session = Self::make_session(&self.words, self.fixed_word.as_deref())?;
        self.reset_round();
        Ok(())
    }

    /// Play the same secret again
    pub fn retry_word(&mut self) {
        self.session = WordGuessSession::with_secret(self.session.secret().to_string());
        self.reset_round();
    }

    fn reset_round(&mut self) {
        self.pending_guesses.clear();
        self.celebration = WinAnimation::new();
        self.state = AppState::Playing;
        self.letter_stats_state = LetterStatsState::default();
    }

    fn load_letter_summary(&mut self) {
        self.letter_summary = self
            .guess_db
            .as_ref()
            .and_then(|db| db.get_letter_summary().ok())
            .unwrap_or_default();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = config_store.load();

    let motion_samples = match cli.motion_trace {
        Some(ref path) => Some(read_trace(path)?),
        None => None,
    };
    let motion_threshold = cli.motion_threshold.unwrap_or(config.motion_threshold);
    let motion_cooldown_ms = cli.motion_cooldown_ms.unwrap_or(config.motion_cooldown_ms);
    let debouncer = MotionDebouncer::new(motion_threshold, motion_cooldown_ms);

    let mut app = App::new(&cli, &config)?;

    // persist the effective settings so the next plain `galge` reuses them
    let _ = config_store.save(&Config {
        word_list: app.word_list.to_string().to_lowercase(),
        reveal_on_loss: app.reveal_on_loss,
        motion_threshold,
        motion_cooldown_ms,
    });

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, motion_samples, debouncer);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

#[derive(Debug)]
enum ExitType {
    Retry,
    New,
    Quit,
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: &mut App,
    motion_samples: Option<Vec<MotionSample>>,
    debouncer: MotionDebouncer,
) -> Result<(), Box<dyn Error>> {
    let game_events = get_game_events(motion_samples, debouncer);

    loop {
        let mut exit_type: ExitType = ExitType::Quit;
        terminal.draw(|f| ui(app, f))?;

        loop {
            let app = &mut app;

            match game_events.recv()? {
                GameEvent::Tick => {
                    app.celebration.update();
                    if app.celebration.is_active {
                        terminal.draw(|f| ui(app, f))?;
                    }
                }
                GameEvent::Resize => {
                    terminal.draw(|f| ui(app, f))?;
                }
                GameEvent::Shake => {
                    // same gesture as the old shake-to-navigate: shake means new game
                    exit_type = ExitType::New;
                    break;
                }
                GameEvent::Key(key) => {
                    match key.code {
                        KeyCode::Esc => {
                            break;
                        }
                        KeyCode::Char(c) => {
                            if key.modifiers.contains(KeyModifiers::CONTROL)
                                && key.code == KeyCode::Char('c')
                            // ctrl+c to quit
                            {
                                break;
                            }

                            match app.state {
                                AppState::Playing => {
                                    let size = terminal.size().unwrap_or_default();
                                    app.guess(c, size.width, size.height);
                                }
                                AppState::Results => match key.code {
                                    KeyCode::Char('r') => {
                                        exit_type = ExitType::Retry;
                                        break;
                                    }
                                    KeyCode::Char('n') => {
                                        exit_type = ExitType::New;
                                        break;
                                    }
                                    KeyCode::Char('s') => {
                                        app.load_letter_summary();
                                        app.state = AppState::LetterStats;
                                    }
                                    _ => {}
                                },
                                AppState::LetterStats => match key.code {
                                    KeyCode::Char('r') => {
                                        exit_type = ExitType::Retry;
                                        break;
                                    }
                                    KeyCode::Char('n') => {
                                        exit_type = ExitType::New;
                                        break;
                                    }
                                    KeyCode::Char('b') => {
                                        app.state = AppState::Results;
                                    }
                                    KeyCode::Char('1') => {
                                        app.letter_stats_state.sort_by = SortBy::Letter;
                                        app.letter_stats_state.scroll_offset = 0;
                                    }
                                    KeyCode::Char('2') => {
                                        app.letter_stats_state.sort_by = SortBy::HitRate;
                                        app.letter_stats_state.scroll_offset = 0;
                                    }
                                    KeyCode::Char('3') => {
                                        app.letter_stats_state.sort_by = SortBy::Attempts;
                                        app.letter_stats_state.scroll_offset = 0;
                                    }
                                    KeyCode::Char(' ') => {
                                        app.letter_stats_state.sort_ascending =
                                            !app.letter_stats_state.sort_ascending;
                                        app.letter_stats_state.scroll_offset = 0;
                                    }
                                    _ => {}
                                },
                            }
                        }
                        KeyCode::Backspace => {
                            if app.state == AppState::LetterStats {
                                app.state = AppState::Results;
                            }
                        }
                        KeyCode::Up => {
                            if app.state == AppState::LetterStats {
                                app.letter_stats_state.scroll_offset =
                                    app.letter_stats_state.scroll_offset.saturating_sub(1);
                            }
                        }
                        KeyCode::Down => {
                            if app.state == AppState::LetterStats {
                                // max scroll is clamped in the render function
                                app.letter_stats_state.scroll_offset += 1;
                            }
                        }
                        _ => {}
                    }
                    terminal.draw(|f| ui(app, f))?;
                }
            }
        }

        match exit_type {
            ExitType::Retry => {
                app.retry_word();
            }
            ExitType::New => {
                app.new_game()?;
            }
            ExitType::Quit => {
                break;
            }
        }
    }

    Ok(())
}

fn get_game_events(
    motion_samples: Option<Vec<MotionSample>>,
    debouncer: MotionDebouncer,
) -> mpsc::Receiver<GameEvent> {
    let (tx, rx) = mpsc::channel();

    let tick_tx = tx.clone();
    thread::spawn(move || loop {
        if tick_tx.send(GameEvent::Tick).is_err() {
            break;
        }

        thread::sleep(Duration::from_millis(TICK_RATE_MS))
    });

    if let Some(samples) = motion_samples {
        spawn_motion_replay(samples, debouncer, tx.clone());
    }

    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(Event::Key(key)) => Some(GameEvent::Key(key)),
            Ok(Event::Resize(_, _)) => Some(GameEvent::Resize),
            Ok(_) => None,
            Err(_) => break,
        };

        if let Some(evt) = evt {
            if tx.send(evt).is_err() {
                break;
            }
        }
    });

    rx
}

fn ui(app: &mut App, f: &mut Frame) {
    match app.state {
        AppState::LetterStats => render_letter_stats(app, f),
        _ => f.render_widget(&*app, f.area()),
    }
}

fn render_letter_stats(app: &mut App, f: &mut Frame) {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Modifier, Style},
        widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    };

    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Stats table
            Constraint::Length(4), // Instructions
        ])
        .split(area);

    let sort_direction = if app.letter_stats_state.sort_ascending {
        "↑"
    } else {
        "↓"
    };
    let sort_by_text = match app.letter_stats_state.sort_by {
        SortBy::Letter => "Letter",
        SortBy::HitRate => "Hit Rate",
        SortBy::Attempts => "Attempts",
    };
    let title_text = format!("Letter Statistics (Sort: {} {})", sort_by_text, sort_direction);

    let title = Paragraph::new(title_text)
        .block(Block::default().borders(Borders::ALL).title("Stats"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let mut summary = app.letter_summary.clone();
    match app.letter_stats_state.sort_by {
        SortBy::Letter => summary.sort_by(|a, b| {
            let cmp = a.letter.cmp(&b.letter);
            if app.letter_stats_state.sort_ascending {
                cmp
            } else {
                cmp.reverse()
            }
        }),
        SortBy::HitRate => summary.sort_by(|a, b| {
            let cmp = a
                .hit_rate
                .partial_cmp(&b.hit_rate)
                .unwrap_or(std::cmp::Ordering::Equal);
            if app.letter_stats_state.sort_ascending {
                cmp
            } else {
                cmp.reverse()
            }
        }),
        SortBy::Attempts => summary.sort_by(|a, b| {
            let cmp = a.attempts.cmp(&b.attempts);
            if app.letter_stats_state.sort_ascending {
                cmp
            } else {
                cmp.reverse()
            }
        }),
    }

    let visible_rows = chunks[1].height.saturating_sub(2) as usize;
    let max_scroll = summary.len().saturating_sub(visible_rows);
    if app.letter_stats_state.scroll_offset > max_scroll {
        app.letter_stats_state.scroll_offset = max_scroll;
    }

    let rows: Vec<Row> = summary
        .iter()
        .skip(app.letter_stats_state.scroll_offset)
        .take(visible_rows)
        .map(|s| {
            let hit_style = if s.hit_rate >= 50.0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };
            Row::new(vec![
                Cell::from(s.letter.to_string()),
                Cell::from(format!("{:.1}%", s.hit_rate)).style(hit_style),
                Cell::from(s.attempts.to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Letter", "Hit Rate", "Attempts"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(table, chunks[1]);

    let instructions = Paragraph::new(
        "(1) sort by letter (2) hit rate (3) attempts (space) direction\n(b)ack / (r)etry word / (n)ew word / (esc)ape",
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}
