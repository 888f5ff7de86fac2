//! Power-up effects and their activation/expiry state machine
//!
//! `Inactive --collect(K)--> Active(K, now + duration)` applies K's effect
//! immediately. `Active(K, t) --now > t--> Inactive` restores the baseline
//! fire cooldown and player speed. A new pickup while active replaces kind
//! and expiry; effects never stack.
//!
//! Auto-fire runs on its own clock: it keeps shooting until its own end
//! time even if the surrounding power-up has already expired. Any new
//! activation, or a reset, drops a running auto-fire task.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    /// Faster fire rate
    GithubActions,
    /// Temporary auto-fire
    GithubCopilot,
    /// Restores server health
    GithubAdvancedSecurity,
    /// Speed boost
    Kubernetes,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::GithubActions,
        PowerUpKind::GithubCopilot,
        PowerUpKind::GithubAdvancedSecurity,
        PowerUpKind::Kubernetes,
    ];

    /// Name the renderer uses to pick a sprite; also the serialized tag
    pub fn asset_key(&self) -> &'static str {
        match self {
            PowerUpKind::GithubActions => "githubactions",
            PowerUpKind::GithubCopilot => "githubcopilot",
            PowerUpKind::GithubAdvancedSecurity => "githubadvancedsecurity",
            PowerUpKind::Kubernetes => "kubernetes",
        }
    }

    /// Announcement shown when the power-up is collected
    pub fn message(&self) -> &'static str {
        match self {
            PowerUpKind::GithubActions => "GitHub Actions: Increased fire rate!",
            PowerUpKind::GithubCopilot => "GitHub Copilot: Auto-shoot activated!",
            PowerUpKind::GithubAdvancedSecurity => {
                "GitHub Advanced Security: Server health restored!"
            }
            PowerUpKind::Kubernetes => "Kubernetes: Speed boost activated!",
        }
    }
}

/// Whether a timed power-up is in effect
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PowerUpStatus {
    #[default]
    Inactive,
    Active { kind: PowerUpKind, expires_at: f64 },
}

impl PowerUpStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, PowerUpStatus::Active { .. })
    }

    pub fn active_kind(&self) -> Option<PowerUpKind> {
        match self {
            PowerUpStatus::Active { kind, .. } => Some(*kind),
            PowerUpStatus::Inactive => None,
        }
    }
}

/// Scheduled auto-fire task
///
/// Polled once per tick; emits one shot per elapsed interval until `ends_at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoFire {
    /// Gap between shots (ms), captured at activation
    pub interval: f64,
    pub next_shot_at: f64,
    pub ends_at: f64,
}

impl AutoFire {
    pub fn start(now: f64, interval: f64) -> Self {
        // A zero interval would never advance the schedule
        let interval = interval.max(1.0);
        Self {
            interval,
            next_shot_at: now + interval,
            ends_at: now + POWER_UP_DURATION_MS,
        }
    }

    /// Count the shots due by `now` and advance the schedule past them
    pub fn take_due_shots(&mut self, now: f64) -> u32 {
        let mut shots = 0;
        while self.next_shot_at <= now && self.next_shot_at < self.ends_at {
            shots += 1;
            self.next_shot_at += self.interval;
        }
        shots
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.ends_at
    }
}

/// Collect a power-up: replace any active one and apply its effect
pub fn activate(state: &mut GameState, kind: PowerUpKind, now: f64) {
    if state.auto_fire.take().is_some() {
        log::debug!("Cancelled running auto-fire for new power-up");
    }

    state.power_up = PowerUpStatus::Active {
        kind,
        expires_at: now + POWER_UP_DURATION_MS,
    };

    match kind {
        PowerUpKind::GithubActions => {
            state.fire_cooldown = BOOSTED_FIRE_COOLDOWN_MS;
        }
        PowerUpKind::GithubCopilot => {
            state.auto_fire = Some(AutoFire::start(now, state.fire_cooldown));
        }
        PowerUpKind::GithubAdvancedSecurity => {
            state.heal(HEAL_AMOUNT);
        }
        PowerUpKind::Kubernetes => {
            state.player.speed = BOOSTED_SPEED;
        }
    }

    state.events.push(GameEvent::PowerUpCollected(kind));
    log::info!("Power-up {:?} active until {:.0}ms", kind, now + POWER_UP_DURATION_MS);
}

/// Deactivate the current power-up once its expiry has passed.
/// Returns true if a deactivation happened.
pub fn expire_if_due(state: &mut GameState, now: f64) -> bool {
    let expires_at = match state.power_up {
        PowerUpStatus::Active { expires_at, .. } => expires_at,
        PowerUpStatus::Inactive => return false,
    };
    if now <= expires_at {
        return false;
    }

    state.power_up = PowerUpStatus::Inactive;
    state.restore_baseline();
    state.events.push(GameEvent::PowerUpExpired);
    log::debug!("Power-up expired at {:.0}ms", now);
    true
}

/// Fire any auto-fire shots that are due, and retire the task at its end
pub fn poll_auto_fire(state: &mut GameState, now: f64) {
    let Some(task) = state.auto_fire.as_mut() else {
        return;
    };
    let shots = task.take_due_shots(now);
    let finished = task.is_finished(now);

    for _ in 0..shots {
        let muzzle = state.player.muzzle();
        state.entities.spawn_bullet(muzzle);
        state.events.push(GameEvent::ShotFired);
    }

    if finished {
        state.auto_fire = None;
        state.events.push(GameEvent::AutoFireEnded);
        log::debug!("Auto-fire ended at {:.0}ms", now);
    }
}
