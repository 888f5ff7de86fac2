//! Game state and core simulation types
//!
//! Entities are pure geometry plus a kind tag. Mapping a kind to an image is
//! the renderer's job; `asset_key` gives it a stable name to look up.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::powerup::{AutoFire, PowerUpKind, PowerUpStatus};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Server health ran out; only a reset leaves this phase
    GameOver,
}

/// Enemy categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Bug,
    Vulnerability,
    Misconfiguration,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [
        EnemyKind::Bug,
        EnemyKind::Vulnerability,
        EnemyKind::Misconfiguration,
    ];

    /// Name the renderer uses to pick a sprite; also the serialized tag
    pub fn asset_key(&self) -> &'static str {
        match self {
            EnemyKind::Bug => "bug",
            EnemyKind::Vulnerability => "vulnerability",
            EnemyKind::Misconfiguration => "misconfiguration",
        }
    }
}

/// Play area bounds and spawn odds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub width: f32,
    pub height: f32,
    /// Chance per tick that a new enemy appears
    pub enemy_spawn_chance: f64,
    /// Chance that a destroyed enemy drops a power-up
    pub power_up_drop_chance: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: PLAY_WIDTH,
            height: PLAY_HEIGHT,
            enemy_spawn_chance: ENEMY_SPAWN_CHANCE,
            power_up_drop_chance: POWER_UP_DROP_CHANCE,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub pos: Vec2,
    pub base_speed: f32,
    /// Current horizontal speed (pixels per tick)
    pub speed: f32,
    /// Timestamp (ms) of the last manual shot
    pub last_shot_at: f64,
}

impl Player {
    pub const SIZE: Vec2 = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);

    pub fn new(config: &SimConfig) -> Self {
        Self {
            pos: Self::spawn_point(config),
            base_speed: PLAYER_BASE_SPEED,
            speed: PLAYER_BASE_SPEED,
            last_shot_at: 0.0,
        }
    }

    /// Bottom-center of the play area
    pub fn spawn_point(config: &SimConfig) -> Vec2 {
        Vec2::new(
            config.width / 2.0 - PLAYER_WIDTH / 2.0,
            config.height - PLAYER_BOTTOM_OFFSET,
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Self::SIZE)
    }

    /// Where new bullets appear
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(
            self.pos.x + PLAYER_WIDTH / 2.0 - BULLET_WIDTH,
            self.pos.y - BULLET_HEIGHT,
        )
    }

    /// Move horizontally, staying inside the play area
    pub fn steer(&mut self, direction: f32, config: &SimConfig) {
        let max_x = (config.width - PLAYER_WIDTH).max(0.0);
        self.pos.x = (self.pos.x + direction * self.speed).clamp(0.0, max_x);
    }
}

/// A bullet travelling upward
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
}

impl Bullet {
    pub const SIZE: Vec2 = Vec2::new(BULLET_WIDTH, BULLET_HEIGHT);

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Self::SIZE)
    }

    pub fn advance(&mut self) {
        self.pos.y -= BULLET_STEP;
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.pos.y < 0.0
    }
}

/// An enemy falling toward the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
}

impl Enemy {
    pub const SIZE: Vec2 = Vec2::new(ENEMY_SIZE, ENEMY_SIZE);

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Self::SIZE)
    }

    pub fn advance(&mut self) {
        self.pos.y += ENEMY_STEP;
    }

    pub fn has_breached(&self, config: &SimConfig) -> bool {
        self.pos.y > config.height
    }
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
}

impl PowerUp {
    pub const SIZE: Vec2 = Vec2::new(POWER_UP_SIZE, POWER_UP_SIZE);

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Self::SIZE)
    }

    pub fn advance(&mut self) {
        self.pos.y += POWER_UP_STEP;
    }

    pub fn is_out_of_bounds(&self, config: &SimConfig) -> bool {
        self.pos.y > config.height
    }
}

/// Entity store: bullets, enemies and power-ups in insertion order
///
/// Removal is by id and is applied after the pass that decided it, so a pass
/// never skips or double-processes an entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub power_ups: Vec<PowerUp>,
    next_id: u32,
}

impl Entities {
    fn next_entity_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    pub fn spawn_bullet(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.bullets.push(Bullet { id, pos });
        id
    }

    pub fn spawn_enemy(&mut self, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy { id, kind, pos });
        id
    }

    pub fn spawn_power_up(&mut self, kind: PowerUpKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.power_ups.push(PowerUp { id, kind, pos });
        id
    }

    pub fn remove_bullets(&mut self, ids: &[u32]) {
        if !ids.is_empty() {
            self.bullets.retain(|b| !ids.contains(&b.id));
        }
    }

    pub fn remove_enemies(&mut self, ids: &[u32]) {
        if !ids.is_empty() {
            self.enemies.retain(|e| !ids.contains(&e.id));
        }
    }

    pub fn remove_power_ups(&mut self, ids: &[u32]) {
        if !ids.is_empty() {
            self.power_ups.retain(|p| !ids.contains(&p.id));
        }
    }

    pub fn clear(&mut self) {
        self.bullets.clear();
        self.enemies.clear();
        self.power_ups.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty() && self.enemies.is_empty() && self.power_ups.is_empty()
    }
}

/// Things that happened during a tick, drained by the frame driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired,
    EnemyDestroyed { kind: EnemyKind },
    /// An enemy reached the bottom and damaged the server
    ServerBreached { kind: EnemyKind },
    PowerUpCollected(PowerUpKind),
    PowerUpExpired,
    AutoFireEnded,
    GameOver { score: u64 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub score: u64,
    /// Server health, always within 0..=MAX_HEALTH
    pub health: u32,
    pub phase: GamePhase,
    /// Minimum gap between manual shots (ms)
    pub fire_cooldown: f64,
    pub player: Player,
    pub entities: Entities,
    pub power_up: PowerUpStatus,
    /// Running auto-fire task, if any
    pub auto_fire: Option<AutoFire>,
    /// Display name, resolved at game over
    pub player_name: Option<String>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            health: MAX_HEALTH,
            phase: GamePhase::Playing,
            fire_cooldown: BASE_FIRE_COOLDOWN_MS,
            player: Player::new(&config),
            entities: Entities::default(),
            power_up: PowerUpStatus::Inactive,
            auto_fire: None,
            player_name: None,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Credit one destroyed enemy
    pub fn award_kill(&mut self) {
        self.score += KILL_SCORE;
    }

    /// Apply breach damage; returns true once health is exhausted
    pub fn damage_server(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(MAX_HEALTH);
    }

    /// Enter the game-over phase. Returns false if it already happened.
    pub fn trigger_game_over(&mut self) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver { score: self.score });
        true
    }

    /// Restore weapon and engine to baseline
    pub fn restore_baseline(&mut self) {
        self.fire_cooldown = BASE_FIRE_COOLDOWN_MS;
        self.player.speed = self.player.base_speed;
    }

    /// Start a fresh run; keeps the RNG stream and the resolved player name
    pub fn reset(&mut self) {
        self.score = 0;
        self.health = MAX_HEALTH;
        self.phase = GamePhase::Playing;
        self.entities.clear();
        self.power_up = PowerUpStatus::Inactive;
        self.auto_fire = None;
        self.restore_baseline();
        self.player.pos = Player::spawn_point(&self.config);
        self.player.last_shot_at = 0.0;
        self.time_ticks = 0;
        self.events.clear();
    }

    /// Serializable view for an external renderer
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            score: self.score,
            health: self.health,
            game_over: self.is_game_over(),
            power_up: self.power_up.active_kind(),
            player: &self.player,
            bullets: &self.entities.bullets,
            enemies: &self.entities.enemies,
            power_ups: &self.entities.power_ups,
        }
    }
}

/// Borrowed frame snapshot handed to the renderer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub score: u64,
    pub health: u32,
    pub game_over: bool,
    pub power_up: Option<PowerUpKind>,
    pub player: &'a Player,
    pub bullets: &'a [Bullet],
    pub enemies: &'a [Enemy],
    pub power_ups: &'a [PowerUp],
}
