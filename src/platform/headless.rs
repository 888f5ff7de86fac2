//! Native collaborators: log output, an in-process score store and a fixed
//! player name. Used by the headless runner and by tests.

use std::cell::{Cell, RefCell};

use super::{Completion, Display, Identity, ScoreService, ScoreServiceError};
use crate::highscores::{HighScores, LeaderboardWindow, ScoreEntry, ScoreSubmission};

/// Display that writes to the log and remembers what it was shown
#[derive(Debug, Default)]
pub struct LogDisplay {
    stats: Cell<(u64, u32)>,
    messages: RefCell<Vec<String>>,
    leaderboard: RefCell<Vec<ScoreEntry>>,
    leaderboard_visible: Cell<bool>,
    restart_visible: Cell<bool>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last (score, health) published
    pub fn stats(&self) -> (u64, u32) {
        self.stats.get()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn leaderboard(&self) -> Vec<ScoreEntry> {
        self.leaderboard.borrow().clone()
    }

    pub fn leaderboard_visible(&self) -> bool {
        self.leaderboard_visible.get()
    }

    pub fn restart_visible(&self) -> bool {
        self.restart_visible.get()
    }
}

impl Display for LogDisplay {
    fn show_stats(&self, score: u64, health: u32) {
        if self.stats.replace((score, health)) != (score, health) {
            log::debug!("Score: {}  Server health: {}", score, health);
        }
    }

    fn show_message(&self, text: &str, duration_ms: u32) {
        log::info!("{} ({}ms)", text, duration_ms);
        self.messages.borrow_mut().push(text.to_string());
    }

    fn show_leaderboard(&self, entries: &[ScoreEntry]) {
        for (rank, entry) in entries.iter().enumerate() {
            log::info!("{:>2}. {}: {}", rank + 1, entry.player_name, entry.score);
        }
        *self.leaderboard.borrow_mut() = entries.to_vec();
    }

    fn set_leaderboard_visible(&self, visible: bool) {
        self.leaderboard_visible.set(visible);
    }

    fn set_restart_visible(&self, visible: bool) {
        self.restart_visible.set(visible);
    }
}

/// Score service backed by an in-process leaderboard; completes immediately
#[derive(Debug, Default)]
pub struct LocalScores {
    board: RefCell<HighScores>,
}

impl LocalScores {
    pub fn new(board: HighScores) -> Self {
        Self {
            board: RefCell::new(board),
        }
    }

    pub fn board(&self) -> HighScores {
        self.board.borrow().clone()
    }
}

impl ScoreService for LocalScores {
    fn submit_score(&self, submission: ScoreSubmission, done: Completion<()>) {
        let result = self.board.borrow_mut().submit(submission);
        done(result.map(|_| ()).map_err(|err| ScoreServiceError::Upstream {
            status: 400,
            message: Some(err.to_string()),
        }));
    }

    fn fetch_leaderboard(&self, done: Completion<Vec<ScoreEntry>>) {
        let entries = self.board.borrow().all().to_vec();
        done(Ok(entries));
    }

    fn fetch_top(&self, window: LeaderboardWindow, done: Completion<Vec<ScoreEntry>>) {
        let entries = self.board.borrow().top(window, super::now_ms());
        done(Ok(entries));
    }
}

/// Identity with a preset prompt answer
#[derive(Debug, Default)]
pub struct FixedIdentity {
    stored: RefCell<Option<String>>,
    answer: Option<String>,
}

impl FixedIdentity {
    /// `answer` is what the "prompt" returns; `None` means the player declined
    pub fn new(answer: Option<String>) -> Self {
        Self {
            stored: RefCell::new(None),
            answer,
        }
    }

    pub fn with_stored(name: impl Into<String>) -> Self {
        Self {
            stored: RefCell::new(Some(name.into())),
            answer: None,
        }
    }
}

impl Identity for FixedIdentity {
    fn stored_name(&self) -> Option<String> {
        self.stored.borrow().clone()
    }

    fn prompt_name(&self) -> Option<String> {
        self.answer.clone()
    }

    fn remember_name(&self, name: &str) {
        *self.stored.borrow_mut() = Some(name.to_string());
    }
}
