//! Platform abstraction layer
//!
//! The simulation talks to the outside world through these collaborators:
//! - `Display`: score/health readout, transient messages, leaderboard dialog
//! - `ScoreService`: fire-and-forget score submission and leaderboard fetch
//! - `Identity`: stored or prompted player name
//!
//! `headless` backs them with logging and an in-memory store; `web` (wasm32
//! only) backs them with the DOM, `fetch` and LocalStorage.

pub mod headless;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;

use crate::highscores::{LeaderboardWindow, ScoreEntry, ScoreSubmission};

pub use input::{Control, InputState};

/// Callback invoked once when an asynchronous service call settles
pub type Completion<T> = Box<dyn FnOnce(Result<T, ScoreServiceError>)>;

/// Failure talking to the score service
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreServiceError {
    /// Request never got a response
    Transport(String),
    /// Service answered with a non-success status
    Upstream { status: u16, message: Option<String> },
    /// Response body could not be decoded
    Decode(String),
}

impl fmt::Display for ScoreServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreServiceError::Transport(err) => write!(f, "score service transport error: {err}"),
            ScoreServiceError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "score service error {status}: {message}")
                } else {
                    write!(f, "score service error {status}")
                }
            }
            ScoreServiceError::Decode(err) => write!(f, "score response decode error: {err}"),
        }
    }
}

impl std::error::Error for ScoreServiceError {}

/// Presentation surface for everything except the play field itself
///
/// Methods take `&self`: completions from the score service hold a shared
/// handle and may fire after the frame that issued the request.
pub trait Display {
    fn show_stats(&self, score: u64, health: u32);
    fn show_message(&self, text: &str, duration_ms: u32);
    fn show_leaderboard(&self, entries: &[ScoreEntry]);
    fn set_leaderboard_visible(&self, visible: bool);
    fn set_restart_visible(&self, visible: bool);
}

/// Remote high score storage
pub trait ScoreService {
    fn submit_score(&self, submission: ScoreSubmission, done: Completion<()>);
    /// Entries arrive highest score first
    fn fetch_leaderboard(&self, done: Completion<Vec<ScoreEntry>>);
    /// Top 10 achieved inside `window`, highest score first
    fn fetch_top(&self, window: LeaderboardWindow, done: Completion<Vec<ScoreEntry>>);
}

/// Source of the player's display name
pub trait Identity {
    /// Name saved from an earlier session
    fn stored_name(&self) -> Option<String>;
    /// Ask the player; `None` if they decline
    fn prompt_name(&self) -> Option<String>;
    fn remember_name(&self, name: &str);
}

/// Wall clock in Unix milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall clock in Unix milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ScoreServiceError::Upstream {
            status: 400,
            message: Some("Invalid highscore entry".into()),
        };
        assert_eq!(err.to_string(), "score service error 400: Invalid highscore entry");
        let err = ScoreServiceError::Upstream {
            status: 503,
            message: None,
        };
        assert_eq!(err.to_string(), "score service error 503");
    }

    #[test]
    fn test_clock_is_after_epoch() {
        assert!(now_ms() > 0.0);
    }
}
