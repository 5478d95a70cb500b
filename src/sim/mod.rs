//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod artifact;
pub mod behavior;
pub mod collision;
pub mod entity;
pub mod spawner;
pub mod state;
pub mod stats;
pub mod tick;
pub mod upgrade;
pub mod weapons;

pub use artifact::{ArtifactDef, ArtifactId, CATALOG, EffectKind, StatEffect, apply_artifacts};
pub use behavior::{Behavior, EnemyCommand, TickContext};
pub use collision::{CollisionReport, HitSource, WeaponHit, check_collisions, circles_overlap};
pub use entity::{Enemy, EnemyKind, OrbitalBody, Player, Projectile, Shield};
pub use spawner::EnemySpawner;
pub use state::{GameEvent, GamePhase, Session, Snapshot};
pub use stats::{Difficulty, Multipliers, RunStats, StatTree, WeaponId};
pub use tick::{TickInput, TickReport, tick};
pub use upgrade::UpgradeId;
pub use weapons::WeaponSystem;
