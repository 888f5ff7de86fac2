//! Pipeline Invaders - real-time core of a small shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, collisions, power-ups, per-tick update)
//! - `game`: Frame driver that feeds the simulation and talks to collaborators
//! - `platform`: Collaborator traits plus browser/native adapters
//! - `highscores`: In-memory high score store honouring the score API contract
//! - `settings`: Tuning and service configuration

pub mod game;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;

pub use game::{FrameRequest, Game};
pub use highscores::{HighScoreError, HighScores, LeaderboardWindow, ScoreEntry, ScoreSubmission};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default play area (matches the 800x600 canvas)
    pub const PLAY_WIDTH: f32 = 800.0;
    pub const PLAY_HEIGHT: f32 = 600.0;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    /// Distance from the bottom edge to the player's top edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 60.0;
    pub const PLAYER_BASE_SPEED: f32 = 7.0;

    /// Bullets travel upward this many pixels per tick
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 10.0;
    pub const BULLET_STEP: f32 = 5.0;

    /// Enemies fall this many pixels per tick
    pub const ENEMY_SIZE: f32 = 40.0;
    pub const ENEMY_STEP: f32 = 1.0;

    /// Power-ups fall this many pixels per tick
    pub const POWER_UP_SIZE: f32 = 30.0;
    pub const POWER_UP_STEP: f32 = 2.0;

    /// Server health
    pub const MAX_HEALTH: u32 = 100;
    /// Health lost when an enemy reaches the bottom
    pub const BREACH_PENALTY: u32 = 10;
    /// Score per destroyed enemy
    pub const KILL_SCORE: u64 = 10;

    /// Weapon cooldowns (ms)
    pub const BASE_FIRE_COOLDOWN_MS: f64 = 500.0;
    pub const BOOSTED_FIRE_COOLDOWN_MS: f64 = 200.0;

    /// Power-up effect magnitudes
    pub const POWER_UP_DURATION_MS: f64 = 5000.0;
    pub const HEAL_AMOUNT: u32 = 30;
    pub const BOOSTED_SPEED: f32 = 15.0;

    /// Per-tick spawn odds
    pub const ENEMY_SPAWN_CHANCE: f64 = 0.02;
    pub const POWER_UP_DROP_CHANCE: f64 = 0.2;

    /// How long transient messages stay on screen (ms)
    pub const MESSAGE_DURATION_MS: u32 = 2000;

    /// Name used when the player declines to give one
    pub const ANONYMOUS_PLAYER: &str = "Anonymous";
}
