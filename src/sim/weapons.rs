//! Player weapons: auto-aimed projectiles, orbital bodies, shield pulse
//!
//! Weapons never touch enemy health. Hits are reported (collision pass,
//! `shield_targets`) and the session routes them through one damage path.

use glam::Vec2;

use super::entity::{Enemy, OrbitalBody, Projectile, Shield};
use super::stats::Weapons;
use crate::tuning::{ArenaTuning, WeaponTuning};
use crate::{direction_or_zero, polar_to_cartesian};

#[derive(Debug, Clone)]
pub struct WeaponSystem {
    pub projectiles: Vec<Projectile>,
    pub orbitals: Vec<OrbitalBody>,
    /// Present while the shield weapon has at least one level
    pub shield: Option<Shield>,
    /// Shared rotation of the orbital ring (radians)
    pub orbital_phase: f32,
    fire_timer: f32,
    /// Numbers copied from the stat tree at the start of the tick
    cached: Weapons,
    tuning: WeaponTuning,
    next_id: u32,
}

impl WeaponSystem {
    pub fn new(tuning: WeaponTuning) -> Self {
        Self {
            projectiles: Vec::new(),
            orbitals: Vec::new(),
            shield: None,
            orbital_phase: 0.0,
            fire_timer: 0.0,
            cached: Weapons::default(),
            tuning,
            next_id: 1,
        }
    }

    fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Current cached weapon numbers
    pub fn stats(&self) -> &Weapons {
        &self.cached
    }

    /// Reconcile orbital count/damage and shield presence with the stat tree
    pub fn sync_to_stat_tree(&mut self, weapons: &Weapons) {
        self.cached = weapons.clone();

        let count = weapons.orbital.count as usize;
        self.orbitals.truncate(count);
        while self.orbitals.len() < count {
            self.orbitals.push(OrbitalBody {
                index: self.orbitals.len() as u32,
                angle: 0.0,
                pos: Vec2::ZERO,
                radius: self.tuning.orbital_body_radius,
                damage: weapons.orbital.damage,
            });
        }
        for body in &mut self.orbitals {
            body.damage = weapons.orbital.damage;
        }

        let stats = &weapons.shield;
        if stats.level == 0 {
            self.shield = None;
        } else {
            // A new shield charges for one full cooldown before its first pulse
            let shield = self.shield.get_or_insert(Shield {
                radius: stats.radius,
                damage: stats.damage,
                cooldown: stats.cooldown,
                timer: stats.cooldown,
            });
            shield.radius = stats.radius;
            shield.damage = stats.damage;
            shield.cooldown = stats.cooldown;
            shield.timer = shield.timer.min(stats.cooldown);
        }
    }

    /// Advance orbitals, projectiles and the shield cooldown
    pub fn update(&mut self, dt: f32, player_pos: Vec2, arena: &ArenaTuning) {
        self.orbital_phase += self.tuning.orbital_speed * dt;
        let count = self.orbitals.len();
        if count > 0 {
            let spacing = std::f32::consts::TAU / count as f32;
            for body in &mut self.orbitals {
                body.angle = self.orbital_phase + body.index as f32 * spacing;
                body.pos = player_pos + polar_to_cartesian(self.tuning.orbital_radius, body.angle);
            }
        }

        let margin = arena.projectile_margin;
        self.projectiles.retain_mut(|p| {
            p.advance(dt);
            !p.expired() && !arena.is_outside(p.pos, margin)
        });

        if let Some(shield) = &mut self.shield {
            if shield.timer > 0.0 {
                shield.timer = (shield.timer - dt).max(0.0);
            }
        }
    }

    /// Seconds between automatic shots at the current projectile level
    pub fn fire_interval(&self) -> f32 {
        1.0 / (1.0 + self.cached.projectile.level as f32 * self.tuning.fire_rate_per_level)
    }

    /// Accumulate the fire timer and shoot at the nearest living enemy.
    /// Returns the id of the new projectile, if one was fired.
    pub fn fire_friendly(&mut self, dt: f32, player_pos: Vec2, enemies: &[Enemy]) -> Option<u32> {
        self.fire_timer += dt;
        if self.fire_timer < self.fire_interval() {
            return None;
        }

        let nearest = enemies
            .iter()
            .filter(|e| e.is_alive())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player_pos)
                    .total_cmp(&b.pos.distance_squared(player_pos))
            })?;
        self.fire_timer = 0.0;

        let dir = direction_or_zero(nearest.pos - player_pos);
        if dir == Vec2::ZERO {
            return None;
        }

        let id = self.next_projectile_id();
        self.projectiles.push(Projectile {
            id,
            pos: player_pos,
            vel: dir * self.cached.projectile.speed,
            radius: self.tuning.projectile_radius,
            damage: self.cached.projectile.damage,
            age: 0.0,
            max_lifetime: self.tuning.projectile_lifetime,
            is_enemy: false,
        });
        Some(id)
    }

    /// Spawn a hostile straight-line shot from `origin` toward `target`
    pub fn fire_enemy_projectile(
        &mut self,
        origin: Vec2,
        target: Vec2,
        damage: f32,
        speed: f32,
    ) -> Option<u32> {
        let dir = direction_or_zero(target - origin);
        if dir == Vec2::ZERO || !origin.is_finite() {
            return None;
        }
        let id = self.next_projectile_id();
        self.projectiles.push(Projectile {
            id,
            pos: origin,
            vel: dir * speed,
            radius: self.tuning.enemy_projectile_radius,
            damage,
            age: 0.0,
            max_lifetime: self.tuning.projectile_lifetime,
            is_enemy: true,
        });
        Some(id)
    }

    /// Enemies inside the shield when a pulse fires. Firing resets the
    /// cooldown; an empty result means no pulse this tick.
    pub fn shield_targets(&mut self, player_pos: Vec2, enemies: &[Enemy]) -> Vec<u32> {
        let Some(shield) = &mut self.shield else {
            return Vec::new();
        };
        if !shield.ready() {
            return Vec::new();
        }
        shield.timer = shield.cooldown;

        enemies
            .iter()
            .filter(|e| e.is_alive())
            .filter(|e| {
                super::collision::circles_overlap(player_pos, shield.radius, e.pos, e.radius)
            })
            .map(|e| e.id)
            .collect()
    }

    pub fn shield_damage(&self) -> f32 {
        self.shield.as_ref().map_or(0.0, |s| s.damage)
    }

    pub fn remove_projectile(&mut self, id: u32) {
        self.projectiles.retain(|p| p.id != id);
    }

    pub fn projectile(&self, id: u32) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Drop all live shots and reset timers. Orbitals and shield follow the stat tree.
    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.fire_timer = 0.0;
        self.orbital_phase = 0.0;
        if let Some(shield) = &mut self.shield {
            shield.timer = shield.cooldown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EnemyKind;
    use crate::sim::stats::Multipliers;
    use crate::tuning::EnemyStats;

    fn enemy(id: u32, pos: Vec2) -> Enemy {
        let base = EnemyStats {
            speed: 50.0,
            health: 30.0,
            radius: 10.0,
        };
        Enemy::spawn(id, EnemyKind::Basic, pos, &base, Multipliers::default())
    }

    fn system() -> WeaponSystem {
        WeaponSystem::new(WeaponTuning::default())
    }

    #[test]
    fn test_orbital_sync_and_positions() {
        let mut ws = system();
        let mut weapons = Weapons::default();
        weapons.orbital.count = 4;
        weapons.orbital.damage = 12.0;
        ws.sync_to_stat_tree(&weapons);
        assert_eq!(ws.orbitals.len(), 4);

        let center = Vec2::new(100.0, 100.0);
        ws.update(0.0, center, &ArenaTuning::default());
        for body in &ws.orbitals {
            assert!((body.pos.distance(center) - 40.0).abs() < 1e-3);
            assert_eq!(body.damage, 12.0);
        }
        // Evenly spaced: first and third are opposite
        let a = ws.orbitals[0].pos - center;
        let c = ws.orbitals[2].pos - center;
        assert!((a + c).length() < 1e-3);

        weapons.orbital.count = 1;
        ws.sync_to_stat_tree(&weapons);
        assert_eq!(ws.orbitals.len(), 1);
    }

    #[test]
    fn test_orbital_phase_advances() {
        let mut ws = system();
        let mut weapons = Weapons::default();
        weapons.orbital.count = 1;
        ws.sync_to_stat_tree(&weapons);
        ws.update(0.5, Vec2::ZERO, &ArenaTuning::default());
        assert!((ws.orbitals[0].angle - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_fire_interval_scales_with_level() {
        let mut ws = system();
        assert_eq!(ws.fire_interval(), 1.0);
        let mut weapons = Weapons::default();
        weapons.projectile.level = 5;
        ws.sync_to_stat_tree(&weapons);
        assert!((ws.fire_interval() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fire_targets_nearest_living_enemy() {
        let mut ws = system();
        ws.sync_to_stat_tree(&Weapons::default());
        let mut dead = enemy(1, Vec2::new(10.0, 0.0));
        dead.health = 0.0;
        let enemies = vec![dead, enemy(2, Vec2::new(0.0, 100.0)), enemy(3, Vec2::new(0.0, -50.0))];

        assert!(ws.fire_friendly(0.5, Vec2::ZERO, &enemies).is_none());
        let id = ws.fire_friendly(0.5, Vec2::ZERO, &enemies).expect("fired");
        let shot = ws.projectile(id).expect("projectile");
        assert!(!shot.is_enemy);
        assert_eq!(shot.damage, 15.0);
        assert!((shot.vel - Vec2::new(0.0, -200.0)).length() < 1e-3);
    }

    #[test]
    fn test_no_fire_without_enemies() {
        let mut ws = system();
        assert!(ws.fire_friendly(5.0, Vec2::ZERO, &[]).is_none());
        assert!(ws.projectiles.is_empty());
    }

    #[test]
    fn test_projectiles_pruned_by_lifetime_and_margin() {
        let mut ws = system();
        let arena = ArenaTuning::default();
        ws.fire_enemy_projectile(Vec2::new(100.0, 100.0), Vec2::new(100.0, 0.0), 10.0, 1.0);
        ws.fire_enemy_projectile(Vec2::new(100.0, 10.0), Vec2::new(100.0, -100.0), 10.0, 1000.0);
        ws.update(0.1, Vec2::ZERO, &arena);
        assert_eq!(ws.projectiles.len(), 1);
        ws.update(3.0, Vec2::ZERO, &arena);
        assert!(ws.projectiles.is_empty());
    }

    #[test]
    fn test_enemy_projectile_rejects_zero_direction() {
        let mut ws = system();
        let p = Vec2::new(5.0, 5.0);
        assert!(ws.fire_enemy_projectile(p, p, 10.0, 150.0).is_none());
        let id = ws.fire_enemy_projectile(p, Vec2::new(5.0, 50.0), 10.0, 150.0).expect("fired");
        assert!(ws.projectile(id).expect("shot").is_enemy);
    }

    #[test]
    fn test_shield_pulses_on_cooldown() {
        let mut ws = system();
        let mut weapons = Weapons::default();
        assert!(ws.shield_targets(Vec2::ZERO, &[enemy(1, Vec2::ZERO)]).is_empty());

        weapons.shield.level = 1;
        ws.sync_to_stat_tree(&weapons);
        let enemies = vec![enemy(1, Vec2::new(30.0, 0.0)), enemy(2, Vec2::new(200.0, 0.0))];
        let arena = ArenaTuning::default();

        // Starts charging
        assert!(ws.shield_targets(Vec2::ZERO, &enemies).is_empty());
        ws.update(1.0, Vec2::ZERO, &arena);
        assert_eq!(ws.shield_targets(Vec2::ZERO, &enemies), vec![1]);
        // Just fired: cooldown reset
        assert!(ws.shield_targets(Vec2::ZERO, &enemies).is_empty());
        ws.update(0.5, Vec2::ZERO, &arena);
        assert!(ws.shield_targets(Vec2::ZERO, &enemies).is_empty());
        ws.update(0.5, Vec2::ZERO, &arena);
        assert_eq!(ws.shield_targets(Vec2::ZERO, &enemies), vec![1]);
    }

    #[test]
    fn test_shield_removed_at_level_zero() {
        let mut ws = system();
        let mut weapons = Weapons::default();
        weapons.shield.level = 2;
        ws.sync_to_stat_tree(&weapons);
        assert!(ws.shield.is_some());
        weapons.shield.level = 0;
        ws.sync_to_stat_tree(&weapons);
        assert!(ws.shield.is_none());
        assert_eq!(ws.shield_damage(), 0.0);
    }
}
