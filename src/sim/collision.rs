//! Circle-circle overlap tests between every body category
//!
//! Stateless. `check_collisions` reads positions already advanced this tick
//! and reports pairs; it never resolves damage itself.

use glam::Vec2;

use super::entity::{Enemy, OrbitalBody, Player, Projectile};

/// Strict overlap: circles exactly touching do not collide
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// What struck an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    /// Friendly projectile, by projectile id
    Projectile(u32),
    /// Orbital body, by ring index
    Orbital(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponHit {
    pub source: HitSource,
    pub enemy_id: u32,
}

/// Pairs found by one collision pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Enemies touching the player
    pub player_enemy: Vec<u32>,
    pub weapon_enemy: Vec<WeaponHit>,
    /// Hostile projectiles touching the player
    pub enemy_projectile_player: Vec<u32>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.player_enemy.is_empty()
            && self.weapon_enemy.is_empty()
            && self.enemy_projectile_player.is_empty()
    }
}

/// Test every pairing that can matter this tick. Dead enemies are skipped.
pub fn check_collisions(
    player: &Player,
    enemies: &[Enemy],
    projectiles: &[Projectile],
    orbitals: &[OrbitalBody],
) -> CollisionReport {
    let mut report = CollisionReport::default();

    for enemy in enemies.iter().filter(|e| e.is_alive()) {
        if circles_overlap(player.pos, player.radius, enemy.pos, enemy.radius) {
            report.player_enemy.push(enemy.id);
        }
    }

    for shot in projectiles {
        if shot.is_enemy {
            if circles_overlap(shot.pos, shot.radius, player.pos, player.radius) {
                report.enemy_projectile_player.push(shot.id);
            }
            continue;
        }
        for enemy in enemies.iter().filter(|e| e.is_alive()) {
            if circles_overlap(shot.pos, shot.radius, enemy.pos, enemy.radius) {
                report.weapon_enemy.push(WeaponHit {
                    source: HitSource::Projectile(shot.id),
                    enemy_id: enemy.id,
                });
            }
        }
    }

    for body in orbitals {
        for enemy in enemies.iter().filter(|e| e.is_alive()) {
            if circles_overlap(body.pos, body.radius, enemy.pos, enemy.radius) {
                report.weapon_enemy.push(WeaponHit {
                    source: HitSource::Orbital(body.index),
                    enemy_id: enemy.id,
                });
            }
        }
    }

    report
}
