//! The stat tree: nested numeric configuration for one run
//!
//! Pure data. Components copy the numbers they need out of it once per tick
//! (see `Player::sync` and `WeaponSystem::sync_to_stat_tree`) instead of
//! reading it mid-update.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::artifact::ArtifactId;
use crate::consts::*;
use crate::tuning::DifficultyTuning;

/// Player progression and body stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub health: f32,
    pub max_health: f32,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next: 100,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            x: 0.0,
            y: 0.0,
            speed: PLAYER_SPEED,
        }
    }
}

impl PlayerStats {
    /// Add experience and roll over thresholds.
    ///
    /// Keeps rolling while the pool still covers the next threshold, so one
    /// large gain can grant several levels. Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u32, growth: f32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience_to_next > 0 && self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            let next = (self.experience_to_next as f32 * growth).floor() as u32;
            // A growth below 1.0 must still make progress
            self.experience_to_next = next.max(self.experience_to_next + 1);
            self.level += 1;
            gained += 1;
        }
        gained
    }

    /// Restore `health <= max_health` and `health >= 0`
    pub fn clamp_health(&mut self) {
        self.health = self.health.clamp(0.0, self.max_health.max(0.0));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileStats {
    pub level: u32,
    pub damage: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalStats {
    pub level: u32,
    pub damage: f32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldStats {
    pub level: u32,
    pub damage: f32,
    pub radius: f32,
    /// Seconds between pulses
    pub cooldown: f32,
}

/// Per-weapon tunables. Weapons are level-driven singletons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapons {
    pub projectile: ProjectileStats,
    pub orbital: OrbitalStats,
    pub shield: ShieldStats,
}

impl Default for Weapons {
    fn default() -> Self {
        Self {
            projectile: ProjectileStats {
                level: 0,
                damage: 15.0,
                speed: 200.0,
            },
            orbital: OrbitalStats {
                level: 0,
                damage: 10.0,
                count: 0,
            },
            shield: ShieldStats {
                level: 0,
                damage: 5.0,
                radius: 50.0,
                cooldown: 1.0,
            },
        }
    }
}

/// Enemy scaling carried across rounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difficulty {
    pub level: u32,
    pub enemy_health_multiplier: f32,
    pub enemy_speed_multiplier: f32,
    pub enemy_damage_multiplier: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::for_level(0, &DifficultyTuning::default())
    }
}

impl Difficulty {
    /// Multipliers grow linearly with the difficulty level
    pub fn for_level(level: u32, tuning: &DifficultyTuning) -> Self {
        let l = level as f32;
        Self {
            level,
            enemy_health_multiplier: 1.0 + l * tuning.health_step,
            enemy_speed_multiplier: 1.0 + l * tuning.speed_step,
            enemy_damage_multiplier: 1.0 + l * tuning.damage_step,
        }
    }

    pub fn multipliers(&self) -> Multipliers {
        Multipliers {
            health: self.enemy_health_multiplier,
            speed: self.enemy_speed_multiplier,
            damage: self.enemy_damage_multiplier,
        }
    }
}

/// The `{health, speed, damage}` triple applied to newly spawned enemies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            health: 1.0,
            speed: 1.0,
            damage: 1.0,
        }
    }
}

/// Damage source identifiers for stat tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponId {
    Projectile,
    Orbital,
    Shield,
}

impl WeaponId {
    pub const ALL: [WeaponId; 3] = [WeaponId::Projectile, WeaponId::Orbital, WeaponId::Shield];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponId::Projectile => "projectile",
            WeaponId::Orbital => "orbital",
            WeaponId::Shield => "shield",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponRecord {
    pub kills: u32,
    pub damage: f32,
    pub max_single_damage: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestDamage {
    pub weapon_id: Option<WeaponId>,
    pub damage: f32,
}

/// Running combat statistics for a round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub enemies_killed: u32,
    pub experience_gained: u32,
    pub damage_dealt: f32,
    pub weapon_stats: BTreeMap<WeaponId, WeaponRecord>,
    pub highest_damage: HighestDamage,
}

impl RunStats {
    /// Record one landed hit
    pub fn record_hit(&mut self, weapon: WeaponId, amount: f32) {
        self.damage_dealt += amount;
        let record = self.weapon_stats.entry(weapon).or_default();
        record.damage += amount;
        if amount > record.max_single_damage {
            record.max_single_damage = amount;
        }
        if amount > self.highest_damage.damage {
            self.highest_damage = HighestDamage {
                weapon_id: Some(weapon),
                damage: amount,
            };
        }
    }

    /// Record a kill credited to `weapon`
    pub fn record_kill(&mut self, weapon: WeaponId, experience: u32) {
        self.enemies_killed += 1;
        self.experience_gained += experience;
        self.weapon_stats.entry(weapon).or_default().kills += 1;
    }
}

/// Complete stat tree for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatTree {
    pub player: PlayerStats,
    pub weapons: Weapons,
    pub difficulty: Difficulty,
    pub stats: RunStats,
    pub owned_artifacts: Vec<ArtifactId>,
}
