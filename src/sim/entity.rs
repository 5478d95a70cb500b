//! Movable bodies: player, enemies, projectiles, orbitals, shield

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::behavior::Behavior;
use super::stats::{Multipliers, PlayerStats};
use crate::direction_or_zero;
use crate::tuning::{EnemyStats, PlayerTuning};

/// Enemy kinds, in the fixed order used for weighted spawn draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Chaser,
    Giant,
    Sniper,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Basic,
        EnemyKind::Chaser,
        EnemyKind::Giant,
        EnemyKind::Sniper,
    ];

    /// Giants split into Basic enemies on death
    pub fn splits_on_death(&self) -> bool {
        *self == EnemyKind::Giant
    }
}

/// The player body. Health itself lives in the stat tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Seek target from the last move command
    pub target: Vec2,
    pub speed: f32,
    pub radius: f32,
    /// Seconds of invulnerability left
    pub invulnerability: f32,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &PlayerTuning) -> Self {
        let defaults = PlayerStats::default();
        Self {
            pos,
            target: pos,
            speed: defaults.speed,
            radius: tuning.radius,
            invulnerability: 0.0,
        }
    }

    /// Cache the tunables this tick will use
    pub fn sync(&mut self, stats: &PlayerStats) {
        self.speed = stats.speed;
    }

    pub fn move_to(&mut self, target: Vec2) {
        if target.is_finite() {
            self.target = target;
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability > 0.0
    }

    pub fn start_invulnerability(&mut self, secs: f32) {
        self.invulnerability = secs;
    }

    /// Seek toward the target without overshooting; tick down invulnerability
    pub fn update(&mut self, dt: f32, arrive_epsilon: f32) {
        if self.invulnerability > 0.0 {
            self.invulnerability = (self.invulnerability - dt).max(0.0);
        }

        let delta = self.target - self.pos;
        let distance = delta.length();
        if distance > arrive_epsilon {
            let step = (self.speed * dt).min(distance);
            self.pos += direction_or_zero(delta) * step;
        }
    }

    /// Return to `pos` with no pending movement or invulnerability
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.target = pos;
        self.invulnerability = 0.0;
    }
}

/// A hostile unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Post-difficulty speed
    pub speed: f32,
    /// Post-difficulty health; alive while positive
    pub health: f32,
    pub max_health: f32,
    /// Damage multiplier captured at spawn time (scales counter-fire)
    pub damage_scale: f32,
    pub behavior: Behavior,
}

impl Enemy {
    /// Build an enemy from base stats scaled by the current multipliers
    pub fn spawn(
        id: u32,
        kind: EnemyKind,
        pos: Vec2,
        base: &EnemyStats,
        scale: Multipliers,
    ) -> Self {
        let health = base.health * scale.health;
        Self {
            id,
            kind,
            pos,
            radius: base.radius,
            speed: base.speed * scale.speed,
            health,
            max_health: health,
            damage_scale: scale.damage,
            behavior: Behavior::for_kind(kind),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// A straight-line shot, friendly or hostile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub age: f32,
    pub max_lifetime: f32,
    pub is_enemy: bool,
}

impl Projectile {
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.age += dt;
    }

    pub fn expired(&self) -> bool {
        self.age >= self.max_lifetime
    }
}

/// One body circling the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitalBody {
    pub index: u32,
    /// Current absolute angle (radians)
    pub angle: f32,
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
}

/// Pulse weapon centred on the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shield {
    pub radius: f32,
    pub damage: f32,
    /// Seconds between pulses
    pub cooldown: f32,
    /// Seconds until the next pulse
    pub timer: f32,
}

impl Shield {
    pub fn ready(&self) -> bool {
        self.timer <= 0.0
    }
}
