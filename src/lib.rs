//! Horde Survival - simulation core for a top-down survival-action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, enemy AI, weapons, collisions, run state)
//! - `persistence`: Owned-artifact storage
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod sim;
pub mod tuning;

pub use persistence::ArtifactStore;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation timestep (60 Hz host frame rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest delta a single tick will integrate (30 fps floor)
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;

    /// Visible play area
    pub const SCREEN_WIDTH: f32 = 375.0;
    pub const SCREEN_HEIGHT: f32 = 455.0;
    /// Distance outside the screen edge where enemies spawn
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Enemies beyond this margin are despawned
    pub const DESPAWN_MARGIN: f32 = 100.0;
    /// Projectiles beyond this margin are pruned
    pub const PROJECTILE_MARGIN: f32 = 50.0;

    /// Round length in seconds
    pub const SESSION_LENGTH: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_SPEED: f32 = 150.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    /// Invulnerability window after taking a hit (seconds)
    pub const INVULNERABILITY_SECS: f32 = 1.0;
    /// Player stops seeking once this close to the target
    pub const ARRIVE_EPSILON: f32 = 2.0;

    /// Enemy spawn cadence and population cap
    pub const SPAWN_INTERVAL: f32 = 0.67;
    pub const MAX_ENEMIES: usize = 50;

    /// Weapon geometry
    pub const ORBITAL_RADIUS: f32 = 40.0;
    pub const ORBITAL_SPEED: f32 = 3.0; // radians per second
    pub const ORBITAL_BODY_RADIUS: f32 = 8.0;
    pub const MAX_ORBITALS: u32 = 8;
    pub const PROJECTILE_RADIUS: f32 = 3.0;
    pub const PROJECTILE_LIFETIME: f32 = 3.0;
    pub const ENEMY_PROJECTILE_RADIUS: f32 = 4.0;

    /// Experience granted per kill
    pub const EXPERIENCE_PER_KILL: u32 = 10;
}

/// Centre of the default screen
#[inline]
pub fn screen_center() -> Vec2 {
    Vec2::new(consts::SCREEN_WIDTH / 2.0, consts::SCREEN_HEIGHT / 2.0)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Normalize a direction, collapsing zero-length and non-finite input to zero.
///
/// Steering code feeds the result straight into positions, so a NaN here would
/// poison an entity for the rest of the run.
#[inline]
pub fn direction_or_zero(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v / len
    } else {
        Vec2::ZERO
    }
}
