//! Per-frame simulation tick
//!
//! Core game loop that advances every entity by one step. Order matters and
//! is fixed: steer, fire, bullets, enemy spawn, enemies, hits, power-ups,
//! power-up expiry.

use glam::Vec2;
use rand::Rng;

use super::collision::overlaps;
use super::powerup::{self, PowerUpKind};
use super::state::{EnemyKind, GameEvent, GameState, Player};
use crate::consts::*;

/// Controls held during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    /// Idle/demo mode - autopilot steers and fires
    pub idle_mode: bool,
}

/// Advance the game state by one frame
///
/// `timestamp` is the frame time in milliseconds. Does nothing once the game
/// is over.
pub fn tick(state: &mut GameState, input: &TickInput, timestamp: f64) {
    if state.is_game_over() {
        return;
    }

    state.events.clear();
    state.time_ticks += 1;

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        *input
    };

    // Steer (holding both directions cancels out)
    let direction = match (input.left, input.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    if direction != 0.0 {
        state.player.steer(direction, &state.config);
    }

    // Manual fire, gated by the weapon cooldown
    if input.fire && timestamp - state.player.last_shot_at > state.fire_cooldown {
        let muzzle = state.player.muzzle();
        state.entities.spawn_bullet(muzzle);
        state.player.last_shot_at = timestamp;
        state.events.push(GameEvent::ShotFired);
    }
    powerup::poll_auto_fire(state, timestamp);

    // Bullets
    for bullet in &mut state.entities.bullets {
        bullet.advance();
    }
    state.entities.bullets.retain(|b| !b.is_out_of_bounds());

    // Enemies
    maybe_spawn_enemy(state);
    advance_enemies(state);
    if state.is_game_over() {
        return;
    }

    resolve_hits(state);
    advance_power_ups(state, timestamp);

    powerup::expire_if_due(state, timestamp);
}

/// Roll for a new enemy along the top edge
fn maybe_spawn_enemy(state: &mut GameState) {
    if state.rng.random::<f64>() >= state.config.enemy_spawn_chance {
        return;
    }
    let kind = EnemyKind::ALL[state.rng.random_range(0..EnemyKind::ALL.len())];
    let span = (state.config.width - ENEMY_SIZE).max(0.0);
    let x = state.rng.random::<f32>() * span;
    state.entities.spawn_enemy(kind, Vec2::new(x, 0.0));
    log::debug!("Spawned {:?} at x={:.1}", kind, x);
}

/// Move enemies down; any that pass the bottom edge damage the server
fn advance_enemies(state: &mut GameState) {
    let config = state.config;
    let mut breached: Vec<(u32, EnemyKind)> = Vec::new();
    for enemy in &mut state.entities.enemies {
        enemy.advance();
        if enemy.has_breached(&config) {
            breached.push((enemy.id, enemy.kind));
        }
    }
    if breached.is_empty() {
        return;
    }

    let ids: Vec<u32> = breached.iter().map(|(id, _)| *id).collect();
    state.entities.remove_enemies(&ids);

    for (_, kind) in breached {
        state.events.push(GameEvent::ServerBreached { kind });
        if state.damage_server(BREACH_PENALTY) && state.trigger_game_over() {
            log::info!("Server down! Final score: {}", state.score);
        }
    }
}

/// Test every (bullet, enemy) pair. Each bullet kills at most one enemy.
fn resolve_hits(state: &mut GameState) {
    let mut spent_bullets: Vec<u32> = Vec::new();
    let mut kills: Vec<(u32, EnemyKind, Vec2)> = Vec::new();

    for enemy in &state.entities.enemies {
        let enemy_rect = enemy.rect();
        let hit = state
            .entities
            .bullets
            .iter()
            .find(|b| !spent_bullets.contains(&b.id) && overlaps(b.rect(), enemy_rect));
        if let Some(bullet) = hit {
            spent_bullets.push(bullet.id);
            kills.push((enemy.id, enemy.kind, enemy.pos));
        }
    }
    if kills.is_empty() {
        return;
    }

    let dead: Vec<u32> = kills.iter().map(|(id, _, _)| *id).collect();
    state.entities.remove_bullets(&spent_bullets);
    state.entities.remove_enemies(&dead);

    for (_, kind, pos) in kills {
        state.award_kill();
        state.events.push(GameEvent::EnemyDestroyed { kind });

        // Deferred drop at the enemy's last position
        if state.rng.random::<f64>() < state.config.power_up_drop_chance {
            let drop = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
            state.entities.spawn_power_up(drop, pos);
        }
    }
}

/// Move power-ups down, drop the ones that fall out, collect the ones the
/// player touches
fn advance_power_ups(state: &mut GameState, timestamp: f64) {
    let config = state.config;
    let player_rect = state.player.rect();
    let mut removed: Vec<u32> = Vec::new();
    let mut collected: Vec<PowerUpKind> = Vec::new();

    for power_up in &mut state.entities.power_ups {
        power_up.advance();
        if power_up.is_out_of_bounds(&config) {
            removed.push(power_up.id);
        } else if overlaps(player_rect, power_up.rect()) {
            removed.push(power_up.id);
            collected.push(power_up.kind);
        }
    }
    state.entities.remove_power_ups(&removed);

    for kind in collected {
        powerup::activate(state, kind, timestamp);
    }
}

/// Demo input: chase falling power-ups, otherwise line up under the lowest
/// enemy, and keep the trigger held
fn autopilot(state: &GameState) -> TickInput {
    let player_center = state.player.pos.x + Player::SIZE.x / 2.0;
    let half_height = state.config.height / 2.0;

    let power_up_target = state
        .entities
        .power_ups
        .iter()
        .filter(|p| p.pos.y > half_height)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|p| p.rect());
    let enemy_target = state
        .entities
        .enemies
        .iter()
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|e| e.rect());

    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };
    if let Some(target) = power_up_target.or(enemy_target) {
        let delta = target.x + target.width / 2.0 - player_center;
        let dead_zone = state.player.speed / 2.0;
        input.left = delta < -dead_zone;
        input.right = delta > dead_zone;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GamePhase, SimConfig};

    /// No random spawns or drops unless a test asks for them
    fn quiet_state() -> GameState {
        let config = SimConfig {
            enemy_spawn_chance: 0.0,
            power_up_drop_chance: 0.0,
            ..SimConfig::default()
        };
        GameState::new(config, 12345)
    }

    #[test]
    fn test_move_left_and_right() {
        let mut state = quiet_state();
        state.player.pos.x = 100.0;
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        tick(&mut state, &left, 0.0);
        assert_eq!(state.player.pos.x, 93.0);

        state.player.pos.x = 100.0;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &right, 0.0);
        assert_eq!(state.player.pos.x, 107.0);
    }

    #[test]
    fn test_bullet_advances_then_leaves() {
        let mut state = quiet_state();
        state.entities.spawn_bullet(Vec2::new(100.0, 100.0));
        tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.entities.bullets[0].pos.y, 95.0);

        state.entities.bullets[0].pos.y = 3.0;
        tick(&mut state, &TickInput::default(), 0.0);
        assert!(state.entities.bullets.is_empty());
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = quiet_state();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };

        // 0 - 0 is not greater than the cooldown
        tick(&mut state, &fire, 0.0);
        assert!(state.entities.bullets.is_empty());

        tick(&mut state, &fire, 501.0);
        assert_eq!(state.entities.bullets.len(), 1);
        assert!(state.events.contains(&GameEvent::ShotFired));
        // Spawned at the muzzle, then moved once in the same tick
        let expected = state.player.muzzle() - Vec2::new(0.0, BULLET_STEP);
        assert_eq!(state.entities.bullets[0].pos, expected);

        tick(&mut state, &fire, 900.0);
        assert_eq!(state.entities.bullets.len(), 1);

        tick(&mut state, &fire, 1002.0);
        assert_eq!(state.entities.bullets.len(), 2);
    }

    #[test]
    fn test_enemy_spawn_follows_chance() {
        let mut state = quiet_state();
        tick(&mut state, &TickInput::default(), 0.0);
        assert!(state.entities.enemies.is_empty());

        state.config.enemy_spawn_chance = 1.0;
        tick(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.entities.enemies.len(), 1);
        let enemy = &state.entities.enemies[0];
        // Spawned at the top, then moved once
        assert_eq!(enemy.pos.y, ENEMY_STEP);
        assert!(enemy.pos.x >= 0.0 && enemy.pos.x <= state.config.width - ENEMY_SIZE);
    }

    #[test]
    fn test_breach_costs_health() {
        let mut state = quiet_state();
        let height = state.config.height;
        state
            .entities
            .spawn_enemy(EnemyKind::Bug, Vec2::new(0.0, height));
        tick(&mut state, &TickInput::default(), 0.0);
        assert!(state.entities.enemies.is_empty());
        assert_eq!(state.health, MAX_HEALTH - BREACH_PENALTY);
        assert!(state.events.contains(&GameEvent::ServerBreached {
            kind: EnemyKind::Bug
        }));
    }

    #[test]
    fn test_last_breach_ends_the_game() {
        let mut state = quiet_state();
        state.health = BREACH_PENALTY;
        let height = state.config.height;
        state
            .entities
            .spawn_enemy(EnemyKind::Misconfiguration, Vec2::new(0.0, height));
        state
            .entities
            .spawn_enemy(EnemyKind::Bug, Vec2::new(100.0, height));
        tick(&mut state, &TickInput::default(), 0.0);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.health, 0);
        // Every enemy past the edge is gone in the same tick
        assert!(state.entities.enemies.is_empty());
        let game_overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        // Further ticks do nothing
        let ticks = state.time_ticks;
        state.entities.spawn_bullet(Vec2::new(10.0, 10.0));
        tick(&mut state, &TickInput::default(), 100.0);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.entities.bullets[0].pos.y, 10.0);
    }

    #[test]
    fn test_bullet_destroys_enemy() {
        let mut state = quiet_state();
        state.entities.spawn_bullet(Vec2::new(100.0, 100.0));
        state
            .entities
            .spawn_enemy(EnemyKind::Vulnerability, Vec2::new(100.0, 100.0));
        tick(&mut state, &TickInput::default(), 0.0);

        assert!(state.entities.bullets.is_empty());
        assert!(state.entities.enemies.is_empty());
        assert_eq!(state.score, KILL_SCORE);
        assert!(state.entities.power_ups.is_empty());
    }

    #[test]
    fn test_kill_can_drop_power_up_at_enemy_position() {
        let mut state = quiet_state();
        state.config.power_up_drop_chance = 1.0;
        state.entities.spawn_bullet(Vec2::new(100.0, 100.0));
        state
            .entities
            .spawn_enemy(EnemyKind::Bug, Vec2::new(100.0, 100.0));
        tick(&mut state, &TickInput::default(), 0.0);

        assert_eq!(state.entities.power_ups.len(), 1);
        let drop = &state.entities.power_ups[0];
        // Dropped where the enemy died, then moved once
        assert_eq!(drop.pos, Vec2::new(100.0, 101.0 + POWER_UP_STEP));
    }

    #[test]
    fn test_one_bullet_kills_one_enemy() {
        let mut state = quiet_state();
        state.entities.spawn_bullet(Vec2::new(110.0, 120.0));
        state
            .entities
            .spawn_enemy(EnemyKind::Bug, Vec2::new(100.0, 100.0));
        state
            .entities
            .spawn_enemy(EnemyKind::Bug, Vec2::new(105.0, 110.0));
        tick(&mut state, &TickInput::default(), 0.0);

        assert_eq!(state.score, KILL_SCORE);
        assert_eq!(state.entities.enemies.len(), 1);
        assert!(state.entities.bullets.is_empty());
    }

    #[test]
    fn test_collect_power_up() {
        let mut state = quiet_state();
        let over_player = state.player.pos + Vec2::new(5.0, -10.0);
        state
            .entities
            .spawn_power_up(PowerUpKind::GithubActions, over_player);
        tick(&mut state, &TickInput::default(), 1000.0);

        assert!(state.entities.power_ups.is_empty());
        assert_eq!(state.fire_cooldown, BOOSTED_FIRE_COOLDOWN_MS);
        assert!(state.power_up.is_active());
        assert!(state
            .events
            .contains(&GameEvent::PowerUpCollected(PowerUpKind::GithubActions)));

        // Expires once the frame time passes the deadline
        tick(&mut state, &TickInput::default(), 6000.0);
        assert!(state.power_up.is_active());
        tick(&mut state, &TickInput::default(), 6001.0);
        assert!(!state.power_up.is_active());
        assert_eq!(state.fire_cooldown, BASE_FIRE_COOLDOWN_MS);
        assert!(state.events.contains(&GameEvent::PowerUpExpired));
    }

    #[test]
    fn test_power_up_falls_out() {
        let mut state = quiet_state();
        let height = state.config.height;
        state
            .entities
            .spawn_power_up(PowerUpKind::Kubernetes, Vec2::new(0.0, height - 1.0));
        tick(&mut state, &TickInput::default(), 0.0);
        assert!(state.entities.power_ups.is_empty());
        assert!(!state.power_up.is_active());
    }

    #[test]
    fn test_auto_fire_through_ticks() {
        let mut state = quiet_state();
        powerup::activate(&mut state, PowerUpKind::GithubCopilot, 0.0);
        tick(&mut state, &TickInput::default(), 499.0);
        assert!(state.entities.bullets.is_empty());
        tick(&mut state, &TickInput::default(), 500.0);
        assert_eq!(state.entities.bullets.len(), 1);
        tick(&mut state, &TickInput::default(), 5000.0);
        assert!(state.auto_fire.is_none());
    }

    #[test]
    fn test_invariants_over_long_run() {
        let config = SimConfig {
            enemy_spawn_chance: 0.2,
            power_up_drop_chance: 0.5,
            ..SimConfig::default()
        };
        let mut state = GameState::new(config, 4242);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        let mut last_score = 0;
        let mut kills = 0u64;
        for frame in 0..20_000u32 {
            tick(&mut state, &input, frame as f64 * 16.0);
            kills += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
                .count() as u64;

            assert!(state.score >= last_score);
            assert_eq!(state.score, kills * KILL_SCORE);
            assert!(state.health <= MAX_HEALTH);
            if state.health == 0 {
                assert!(state.is_game_over());
            }
            for enemy in &state.entities.enemies {
                assert!(enemy.pos.y <= state.config.height);
            }
            for bullet in &state.entities.bullets {
                assert!(bullet.pos.y >= 0.0);
            }
            for power_up in &state.entities.power_ups {
                assert!(power_up.pos.y <= state.config.height);
            }
            last_score = state.score;
        }
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let config = SimConfig {
            enemy_spawn_chance: 0.3,
            ..SimConfig::default()
        };
        let mut state1 = GameState::new(config, 99999);
        let mut state2 = GameState::new(config, 99999);

        let inputs = [
            TickInput {
                left: true,
                fire: true,
                ..Default::default()
            },
            TickInput {
                idle_mode: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for frame in 0..300u32 {
            let input = &inputs[frame as usize % inputs.len()];
            tick(&mut state1, input, frame as f64 * 16.0);
            tick(&mut state2, input, frame as f64 * 16.0);
        }

        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.health, state2.health);
        assert_eq!(
            state1.entities.enemies.len(),
            state2.entities.enemies.len()
        );
        assert_eq!(state1.player.pos, state2.player.pos);
    }
}
