//! Data-driven game balance
//!
//! Every number the simulation reads at runtime lives here. Values default to
//! the reference tuning; a JSON file may override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::entity::EnemyKind;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Play area geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    pub spawn_margin: f32,
    pub despawn_margin: f32,
    pub projectile_margin: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            spawn_margin: SPAWN_MARGIN,
            despawn_margin: DESPAWN_MARGIN,
            projectile_margin: PROJECTILE_MARGIN,
        }
    }
}

impl ArenaTuning {
    /// True if `pos` lies beyond `margin` outside the visible screen
    pub fn is_outside(&self, pos: glam::Vec2, margin: f32) -> bool {
        pos.x < -margin
            || pos.x > self.width + margin
            || pos.y < -margin
            || pos.y > self.height + margin
    }

    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Round flow and progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub length_secs: f32,
    pub max_frame_dt: f32,
    /// Freeze the simulation while level-up choices are pending
    pub pause_on_level_up: bool,
    pub upgrade_offer_size: usize,
    pub artifact_offer_size: usize,
    pub experience_per_kill: u32,
    /// Threshold growth per level (`next = floor(current * growth)`)
    pub level_growth: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            length_secs: SESSION_LENGTH,
            max_frame_dt: MAX_FRAME_DT,
            pause_on_level_up: true,
            upgrade_offer_size: 3,
            artifact_offer_size: 3,
            experience_per_kill: EXPERIENCE_PER_KILL,
            level_growth: 1.2,
        }
    }
}

/// Player body and contact damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    pub invulnerability_secs: f32,
    pub arrive_epsilon: f32,
    pub contact_base_damage: f32,
    pub contact_damage_per_level: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            invulnerability_secs: INVULNERABILITY_SECS,
            arrive_epsilon: ARRIVE_EPSILON,
            contact_base_damage: 10.0,
            contact_damage_per_level: 0.5,
        }
    }
}

impl PlayerTuning {
    /// Damage dealt by touching an enemy: `floor((base + (level-1)*step) * multiplier)`
    pub fn contact_damage(&self, player_level: u32, damage_multiplier: f32) -> f32 {
        let base = self.contact_base_damage
            + player_level.saturating_sub(1) as f32 * self.contact_damage_per_level;
        (base * damage_multiplier).floor()
    }
}

/// Spawn probability per enemy kind.
///
/// Kinds missing from a JSON band default to zero; unknown keys are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    pub basic: f32,
    pub chaser: f32,
    pub giant: f32,
    pub sniper: f32,
}

impl KindWeights {
    pub const fn new(basic: f32, chaser: f32, giant: f32, sniper: f32) -> Self {
        Self {
            basic,
            chaser,
            giant,
            sniper,
        }
    }

    pub fn weight(&self, kind: EnemyKind) -> f32 {
        match kind {
            EnemyKind::Basic => self.basic,
            EnemyKind::Chaser => self.chaser,
            EnemyKind::Giant => self.giant,
            EnemyKind::Sniper => self.sniper,
        }
    }

    pub fn total(&self) -> f32 {
        self.basic + self.chaser + self.giant + self.sniper
    }
}

/// A spawn distribution that takes effect once `from_minutes` have elapsed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnBand {
    pub from_minutes: f32,
    pub weights: KindWeights,
}

/// Enemy spawn cadence, composition and splitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub interval: f32,
    pub max_enemies: usize,
    /// Sorted by `from_minutes` ascending
    pub bands: Vec<SpawnBand>,
    pub split_ring_radius: f32,
    pub split_base_children: u32,
    pub split_max_children: u32,
    /// Game seconds per extra split child
    pub split_step_secs: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            interval: SPAWN_INTERVAL,
            max_enemies: MAX_ENEMIES,
            bands: vec![
                SpawnBand {
                    from_minutes: 0.0,
                    weights: KindWeights::new(0.7, 0.3, 0.0, 0.0),
                },
                SpawnBand {
                    from_minutes: 2.0,
                    weights: KindWeights::new(0.4, 0.35, 0.15, 0.1),
                },
                SpawnBand {
                    from_minutes: 5.0,
                    weights: KindWeights::new(0.25, 0.3, 0.25, 0.2),
                },
            ],
            split_ring_radius: 30.0,
            split_base_children: 2,
            split_max_children: 4,
            split_step_secs: 60.0,
        }
    }
}

impl SpawnTuning {
    /// The band active at `minutes` (the last band whose start has passed)
    pub fn band_at(&self, minutes: f32) -> Option<&SpawnBand> {
        self.bands.iter().rev().find(|b| minutes >= b.from_minutes)
    }

    /// Number of Basic children a Giant splits into at `game_time` seconds
    pub fn split_count(&self, game_time: f32) -> u32 {
        // `as` saturates, so a tiny step or huge time lands on u32::MAX
        let steps = (game_time.max(0.0) / self.split_step_secs).floor() as u32;
        steps
            .saturating_add(self.split_base_children)
            .min(self.split_max_children)
    }
}

/// Base stats of one enemy kind, before difficulty scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub speed: f32,
    pub health: f32,
    pub radius: f32,
}

/// Base stats for every enemy kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    pub basic: EnemyStats,
    pub chaser: EnemyStats,
    pub giant: EnemyStats,
    pub sniper: EnemyStats,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            basic: EnemyStats {
                speed: 50.0,
                health: 30.0,
                radius: 10.0,
            },
            chaser: EnemyStats {
                speed: 80.0,
                health: 20.0,
                radius: 8.0,
            },
            giant: EnemyStats {
                speed: 30.0,
                health: 120.0,
                radius: 20.0,
            },
            sniper: EnemyStats {
                speed: 40.0,
                health: 25.0,
                radius: 10.0,
            },
        }
    }
}

impl EnemyTable {
    pub fn get(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Chaser => &self.chaser,
            EnemyKind::Giant => &self.giant,
            EnemyKind::Sniper => &self.sniper,
        }
    }
}

/// Ranged enemy behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperTuning {
    pub preferred_distance: f32,
    /// Half-width of the hold band around `preferred_distance`
    pub distance_band: f32,
    pub attack_range: f32,
    pub attack_interval: f32,
    pub projectile_damage: f32,
    pub projectile_speed: f32,
}

impl Default for SniperTuning {
    fn default() -> Self {
        Self {
            preferred_distance: 150.0,
            distance_band: 10.0,
            attack_range: 200.0,
            attack_interval: 2.0,
            projectile_damage: 10.0,
            projectile_speed: 150.0,
        }
    }
}

/// Weapon geometry that is not part of the stat tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub orbital_radius: f32,
    pub orbital_speed: f32,
    pub orbital_body_radius: f32,
    pub projectile_radius: f32,
    pub projectile_lifetime: f32,
    pub enemy_projectile_radius: f32,
    /// Fire rate bonus per projectile level (`interval = 1 / (1 + level * step)`)
    pub fire_rate_per_level: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            orbital_radius: ORBITAL_RADIUS,
            orbital_speed: ORBITAL_SPEED,
            orbital_body_radius: ORBITAL_BODY_RADIUS,
            projectile_radius: PROJECTILE_RADIUS,
            projectile_lifetime: PROJECTILE_LIFETIME,
            enemy_projectile_radius: ENEMY_PROJECTILE_RADIUS,
            fire_rate_per_level: 0.2,
        }
    }
}

/// Multiplier growth per difficulty level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub health_step: f32,
    pub speed_step: f32,
    pub damage_step: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            health_step: 0.25,
            speed_step: 0.1,
            damage_step: 0.2,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub session: SessionTuning,
    pub player: PlayerTuning,
    pub spawn: SpawnTuning,
    pub enemies: EnemyTable,
    pub sniper: SniperTuning,
    pub weapons: WeaponTuning,
    pub difficulty: DifficultyTuning,
}

impl Tuning {
    /// Parse and validate a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning
            .spawn
            .bands
            .sort_by(|a, b| a.from_minutes.total_cmp(&b.from_minutes));
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read a tuning file from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a tuning file, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("Using default tuning ({}): {err}", path.display());
                Self::default()
            }
        }
    }

    /// Reject tables the simulation cannot run on
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.spawn.interval > 0.0) {
            return Err(TuningError::Invalid(format!(
                "spawn interval must be positive, got {}",
                self.spawn.interval
            )));
        }
        if !(self.session.max_frame_dt > 0.0) {
            return Err(TuningError::Invalid("max_frame_dt must be positive".into()));
        }
        if self.spawn.split_step_secs <= 0.0 {
            return Err(TuningError::Invalid("split_step_secs must be positive".into()));
        }
        for band in &self.spawn.bands {
            let total = band.weights.total();
            if (total - 1.0).abs() > 1e-3 {
                return Err(TuningError::Invalid(format!(
                    "spawn band at {} min sums to {total}, expected 1.0",
                    band.from_minutes
                )));
            }
        }
        Ok(())
    }
}
