//! Simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform dependencies:
//! - Timestamps come in from the caller
//! - Seeded RNG only
//! - Stable iteration order (insertion order, removals applied after a pass)

pub mod collision;
pub mod powerup;
pub mod state;
pub mod tick;

pub use collision::{Rect, overlaps};
pub use powerup::{AutoFire, PowerUpKind, PowerUpStatus};
pub use state::{
    Bullet, Enemy, EnemyKind, Entities, GameEvent, GamePhase, GameState, Player, PowerUp,
    SimConfig, Snapshot,
};
pub use tick::{TickInput, tick};
