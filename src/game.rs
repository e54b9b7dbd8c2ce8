use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;

/// Wrong guesses allowed before the gallows drawing completes and the game is lost
pub const MAX_MISSES: u32 = 6;

/// Placeholder shown for letters that have not been guessed yet
pub const MASK_CHAR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    EmptyWordList,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyWordList => write!(f, "cannot start a game from an empty word list"),
        }
    }
}

impl Error for SessionError {}

/// One play-through of the guessing game, from start to a won/lost terminal state
#[derive(Debug, Clone)]
pub struct WordGuessSession {
    secret: String,
    guessed: HashSet<char>,
    misses: u32,
}

impl WordGuessSession {
    /// Start a new session with a secret drawn uniformly from `candidates`.
    ///
    /// The random source is passed in so callers (and tests) control determinism;
    /// use [`WordGuessSession::with_secret`] to pin the word outright.
    pub fn start<R: Rng + ?Sized>(
        candidates: &[String],
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        let secret = candidates.choose(rng).ok_or(SessionError::EmptyWordList)?;
        Ok(Self::with_secret(secret.clone()))
    }

    /// Start a session with a known secret. Used for deterministic tests and `--word`.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            guessed: HashSet::new(),
            misses: 0,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn guessed(&self) -> &HashSet<char> {
        &self.guessed
    }

    /// Apply a guess. Returns true only when `letter` is a new, correct guess.
    ///
    /// Repeats never change state and never count as a miss. Once the session
    /// is over every further guess is a no-op.
    pub fn guess_letter(&mut self, letter: char) -> bool {
        if self.is_over() || self.guessed.contains(&letter) {
            return false;
        }

        self.guessed.insert(letter);

        if !self.secret.contains(letter) {
            self.misses += 1;
            return false;
        }
        true
    }

    /// The partially revealed word, one entry per secret letter, in secret order
    pub fn mask(&self) -> Vec<char> {
        self.secret
            .chars()
            .map(|c| if self.guessed.contains(&c) { c } else { MASK_CHAR })
            .collect()
    }

    /// The mask rendered the way the board shows it: letters separated by spaces
    pub fn display_mask(&self) -> String {
        self.mask().iter().join(" ")
    }

    pub fn is_won(&self) -> bool {
        self.secret.chars().all(|c| self.guessed.contains(&c))
    }

    pub fn is_lost(&self) -> bool {
        self.misses >= MAX_MISSES
    }

    pub fn is_over(&self) -> bool {
        self.is_lost() || self.is_won()
    }

    /// Index of the gallows drawing to show, `0..=MAX_MISSES`; 0 means no misses yet
    pub fn gallows_stage(&self) -> usize {
        self.misses.min(MAX_MISSES) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_start_picks_from_candidates() {
        let candidates = words(&["alpha", "bravo", "charlie"]);
        let mut rng = StdRng::seed_from_u64(7);

        let session = WordGuessSession::start(&candidates, &mut rng).unwrap();

        assert!(candidates.contains(&session.secret().to_string()));
        assert_eq!(session.misses(), 0);
        assert!(session.guessed().is_empty());
    }

    #[test]
    fn test_start_empty_candidates_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = WordGuessSession::start(&[], &mut rng);

        assert_matches!(result, Err(SessionError::EmptyWordList));
    }

    #[test]
    fn test_start_is_deterministic_for_a_seed() {
        let candidates = words(&["alpha", "bravo", "charlie", "delta"]);

        let a = WordGuessSession::start(&candidates, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = WordGuessSession::start(&candidates, &mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(a.secret(), b.secret());
    }

    #[test]
    fn test_fresh_session_state() {
        let session = WordGuessSession::with_secret("cat");

        assert_eq!(session.misses(), 0);
        assert!(session.guessed().is_empty());
        assert!(!session.is_over());
        assert_eq!(session.gallows_stage(), 0);
    }

    #[test]
    fn test_correct_guess_returns_true_without_miss() {
        let mut session = WordGuessSession::with_secret("cat");

        assert!(session.guess_letter('c'));
        assert_eq!(session.misses(), 0);
        assert!(session.guessed().contains(&'c'));
    }

    #[test]
    fn test_wrong_guess_counts_one_miss() {
        let mut session = WordGuessSession::with_secret("cat");

        assert!(!session.guess_letter('x'));
        assert_eq!(session.misses(), 1);
        assert_eq!(session.gallows_stage(), 1);
    }

    #[test]
    fn test_repeated_guess_is_a_no_op() {
        let mut session = WordGuessSession::with_secret("cat");

        session.guess_letter('x');
        assert_eq!(session.misses(), 1);

        // same wrong letter again: no extra miss, returns false
        assert!(!session.guess_letter('x'));
        assert_eq!(session.misses(), 1);

        // repeating a correct letter also returns false
        session.guess_letter('c');
        assert!(!session.guess_letter('c'));
        assert_eq!(session.misses(), 1);
    }

    #[test]
    fn test_mask_length_matches_secret() {
        let session = WordGuessSession::with_secret("zebra");
        assert_eq!(session.mask().len(), session.secret().len());
    }

    #[test]
    fn test_mask_reveals_in_secret_order() {
        let mut session = WordGuessSession::with_secret("cat");

        assert_eq!(session.display_mask(), "_ _ _");

        session.guess_letter('x');
        assert_eq!(session.misses(), 1);
        assert_eq!(session.display_mask(), "_ _ _");

        session.guess_letter('c');
        assert_eq!(session.display_mask(), "c _ _");

        session.guess_letter('a');
        assert_eq!(session.display_mask(), "c a _");

        session.guess_letter('t');
        assert_eq!(session.display_mask(), "c a t");
        assert!(session.is_over());
        assert!(session.is_won());
        assert_eq!(session.misses(), 1);
    }

    #[test]
    fn test_repeated_letters_in_secret_reveal_together() {
        let mut session = WordGuessSession::with_secret("moon");

        session.guess_letter('o');
        assert_eq!(session.display_mask(), "_ o o _");
    }

    #[test]
    fn test_six_misses_loses() {
        let mut session = WordGuessSession::with_secret("go");

        for (i, c) in ['a', 'b', 'c', 'd', 'e', 'f'].into_iter().enumerate() {
            assert!(!session.is_over(), "game over too early at guess {}", i);
            session.guess_letter(c);
        }

        assert_eq!(session.misses(), MAX_MISSES);
        assert!(session.is_over());
        assert!(session.is_lost());
        assert!(!session.is_won());
        assert_eq!(session.gallows_stage(), MAX_MISSES as usize);
    }

    #[test]
    fn test_terminal_state_is_idempotent() {
        let mut session = WordGuessSession::with_secret("go");
        for c in ['a', 'b', 'c', 'd', 'e', 'f'] {
            session.guess_letter(c);
        }
        assert!(session.is_over());

        let misses_before = session.misses();
        let guessed_before = session.guessed().clone();

        // further guesses, right or wrong, change nothing
        assert!(!session.guess_letter('g'));
        assert!(!session.guess_letter('z'));
        assert_eq!(session.misses(), misses_before);
        assert_eq!(session.guessed(), &guessed_before);
    }

    #[test]
    fn test_won_game_ignores_further_guesses() {
        let mut session = WordGuessSession::with_secret("hi");
        session.guess_letter('h');
        session.guess_letter('i');
        assert!(session.is_won());

        assert!(!session.guess_letter('x'));
        assert_eq!(session.misses(), 0);
        assert_eq!(session.guessed().len(), 2);
    }

    #[test]
    fn test_gallows_stage_tracks_misses() {
        let mut session = WordGuessSession::with_secret("qqq");

        for (expected, c) in ['u', 'v', 'w', 'x'].into_iter().enumerate() {
            assert_eq!(session.gallows_stage(), expected);
            session.guess_letter(c);
        }
        assert_eq!(session.gallows_stage(), 4);
    }
}
