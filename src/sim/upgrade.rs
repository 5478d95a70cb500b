//! Level-up upgrades offered between waves of enemies

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::stats::StatTree;
use crate::consts::MAX_ORBITALS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    OrbitalDamage,
    ProjectileSpeed,
    ShieldUpgrade,
    PlayerHealth,
    SpeedBoost,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 5] = [
        UpgradeId::OrbitalDamage,
        UpgradeId::ProjectileSpeed,
        UpgradeId::ShieldUpgrade,
        UpgradeId::PlayerHealth,
        UpgradeId::SpeedBoost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeId::OrbitalDamage => "Orbital Power",
            UpgradeId::ProjectileSpeed => "Projectile Power",
            UpgradeId::ShieldUpgrade => "Shield Power",
            UpgradeId::PlayerHealth => "Vitality",
            UpgradeId::SpeedBoost => "Swiftness",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeId::OrbitalDamage => "Orbitals hit harder and one more joins the ring",
            UpgradeId::ProjectileSpeed => "Projectiles fly faster and hit harder",
            UpgradeId::ShieldUpgrade => "Shield grows, hits harder and pulses sooner",
            UpgradeId::PlayerHealth => "+20 max health and heal 30",
            UpgradeId::SpeedBoost => "Move 10% faster",
        }
    }

    /// Apply this upgrade to the live stat tree
    pub fn apply(&self, tree: &mut StatTree) {
        match self {
            UpgradeId::OrbitalDamage => {
                let orbital = &mut tree.weapons.orbital;
                orbital.level += 1;
                orbital.damage += 5.0;
                orbital.count = (orbital.count + 1).min(MAX_ORBITALS);
            }
            UpgradeId::ProjectileSpeed => {
                let projectile = &mut tree.weapons.projectile;
                projectile.level += 1;
                projectile.damage += 3.0;
                projectile.speed += 20.0;
            }
            UpgradeId::ShieldUpgrade => {
                let shield = &mut tree.weapons.shield;
                shield.level += 1;
                shield.damage += 2.0;
                shield.radius += 10.0;
                shield.cooldown = (shield.cooldown * 0.95).max(0.1);
            }
            UpgradeId::PlayerHealth => {
                let player = &mut tree.player;
                player.max_health += 20.0;
                player.health = (player.health + 30.0).min(player.max_health);
            }
            UpgradeId::SpeedBoost => {
                tree.player.speed *= 1.1;
            }
        }
    }
}

/// Draw `size` distinct upgrades in random order
pub fn roll_offer<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Vec<UpgradeId> {
    let mut all = UpgradeId::ALL.to_vec();
    all.shuffle(rng);
    all.truncate(size);
    all
}
