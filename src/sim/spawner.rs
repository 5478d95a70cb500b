//! Enemy spawning, movement and removal
//!
//! Owns the enemy collection. Each tick: children queued by last tick's
//! Giant splits join, the spawn timer may add one enemy at a screen edge,
//! every enemy runs its behaviour, and enemies past the despawn margin are
//! dropped.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::behavior::{self, EnemyCommand, TickContext};
use super::entity::{Enemy, EnemyKind};
use super::stats::Multipliers;
use crate::polar_to_cartesian;
use crate::tuning::{ArenaTuning, KindWeights, Tuning};

/// Stream offset so spawn draws never share a sequence with other run RNG
const SPAWN_STREAM: u64 = 0x5eed_0f_e4e1;

/// Pick a kind from one uniform roll against cumulative weights in
/// `EnemyKind::ALL` order. Falls through to Basic.
pub fn select_kind(weights: &KindWeights, roll: f32) -> EnemyKind {
    let mut threshold = 0.0;
    for kind in EnemyKind::ALL {
        threshold += weights.weight(kind);
        if roll < threshold {
            return kind;
        }
    }
    EnemyKind::Basic
}

#[derive(Debug, Clone)]
pub struct EnemySpawner {
    pub enemies: Vec<Enemy>,
    /// Split children waiting to join at the start of the next tick
    pending: Vec<Enemy>,
    spawn_timer: f32,
    multipliers: Multipliers,
    rng: Pcg32,
    next_id: u32,
}

impl EnemySpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            enemies: Vec::new(),
            pending: Vec::new(),
            spawn_timer: 0.0,
            multipliers: Multipliers::default(),
            rng: Pcg32::seed_from_u64(seed ^ SPAWN_STREAM),
            next_id: 1,
        }
    }

    /// Set the scaling for enemies spawned from now on. Live enemies keep theirs.
    pub fn set_multipliers(&mut self, multipliers: Multipliers) {
        self.multipliers = multipliers;
    }

    pub fn multipliers(&self) -> Multipliers {
        self.multipliers
    }

    pub fn damage_multiplier(&self) -> f32 {
        self.multipliers.damage
    }

    /// Enemies waiting to appear next tick
    pub fn pending(&self) -> &[Enemy] {
        &self.pending
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn living(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    fn next_enemy_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Run one tick of spawning and behaviours; behaviour requests go to `out`
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        game_time: f32,
        tuning: &Tuning,
        out: &mut Vec<EnemyCommand>,
    ) {
        self.enemies.append(&mut self.pending);

        self.spawn_timer += dt;
        if self.spawn_timer >= tuning.spawn.interval
            && self.enemies.len() < tuning.spawn.max_enemies
        {
            let kind = self.roll_kind(game_time, tuning);
            let pos = self.edge_position(&tuning.arena);
            self.spawn(kind, pos, tuning);
            self.spawn_timer = 0.0;
        }

        let positions: Vec<Vec2> = self.enemies.iter().map(|e| e.pos).collect();
        for (i, enemy) in self.enemies.iter_mut().enumerate() {
            let ctx = TickContext {
                player_pos,
                positions: &positions,
                self_index: i,
                dt,
                sniper: &tuning.sniper,
            };
            behavior::update(enemy, &ctx, out);
        }

        self.remove_offscreen(&tuning.arena);
    }

    /// Draw an enemy kind from the band active at `game_time`
    pub fn roll_kind(&mut self, game_time: f32, tuning: &Tuning) -> EnemyKind {
        let minutes = game_time / 60.0;
        let roll: f32 = self.rng.random();
        match tuning.spawn.band_at(minutes) {
            Some(band) => select_kind(&band.weights, roll),
            None => EnemyKind::Basic,
        }
    }

    /// Uniform side, then uniform coordinate along it, just outside the screen
    pub fn edge_position(&mut self, arena: &ArenaTuning) -> Vec2 {
        let side = self.rng.random_range(0..4u32);
        let t: f32 = self.rng.random();
        let m = arena.spawn_margin;
        match side {
            0 => Vec2::new(t * arena.width, -m),
            1 => Vec2::new(arena.width + m, t * arena.height),
            2 => Vec2::new(t * arena.width, arena.height + m),
            _ => Vec2::new(-m, t * arena.height),
        }
    }

    /// Add one enemy with the current multipliers
    pub fn spawn(&mut self, kind: EnemyKind, pos: Vec2, tuning: &Tuning) -> u32 {
        let id = self.next_enemy_id();
        let enemy = Enemy::spawn(id, kind, pos, tuning.enemies.get(kind), self.multipliers);
        log::debug!("Spawned {:?} #{} at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
        self.enemies.push(enemy);
        id
    }

    fn remove_offscreen(&mut self, arena: &ArenaTuning) {
        let margin = arena.despawn_margin;
        self.enemies.retain(|e| !arena.is_outside(e.pos, margin));
    }

    /// Remove a dead enemy. Giants queue their split children for next tick.
    pub fn remove(&mut self, id: u32, game_time: f32, tuning: &Tuning) -> Option<Enemy> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        let enemy = self.enemies.remove(index);
        if enemy.kind.splits_on_death() {
            self.queue_split(enemy.pos, game_time, tuning);
        }
        Some(enemy)
    }

    fn queue_split(&mut self, center: Vec2, game_time: f32, tuning: &Tuning) {
        let count = tuning.spawn.split_count(game_time);
        let room = tuning
            .spawn
            .max_enemies
            .saturating_sub(self.enemies.len() + self.pending.len());
        let count = (count as usize).min(room);
        if count == 0 {
            return;
        }

        let step = std::f32::consts::TAU / count as f32;
        for i in 0..count {
            let pos = center + polar_to_cartesian(tuning.spawn.split_ring_radius, i as f32 * step);
            let id = self.next_enemy_id();
            let base = tuning.enemies.get(EnemyKind::Basic);
            self.pending
                .push(Enemy::spawn(id, EnemyKind::Basic, pos, base, self.multipliers));
        }
        log::debug!("Giant split into {count} at ({:.0}, {:.0})", center.x, center.y);
    }

    /// Drop every enemy, queued or live
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.pending.clear();
        self.spawn_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen_center;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    #[test]
    fn test_select_kind_cumulative_order() {
        let w = KindWeights::new(0.4, 0.35, 0.15, 0.1);
        assert_eq!(select_kind(&w, 0.0), EnemyKind::Basic);
        assert_eq!(select_kind(&w, 0.39), EnemyKind::Basic);
        assert_eq!(select_kind(&w, 0.4), EnemyKind::Chaser);
        assert_eq!(select_kind(&w, 0.74), EnemyKind::Chaser);
        assert_eq!(select_kind(&w, 0.76), EnemyKind::Giant);
        assert_eq!(select_kind(&w, 0.95), EnemyKind::Sniper);
    }

    #[test]
    fn test_select_kind_falls_through_to_basic() {
        let short = KindWeights::new(0.0, 0.2, 0.0, 0.0);
        assert_eq!(select_kind(&short, 0.5), EnemyKind::Basic);
        assert_eq!(select_kind(&KindWeights::default(), 0.1), EnemyKind::Basic);
    }

    #[test]
    fn test_early_band_never_rolls_giants_or_snipers() {
        let tuning = tuning();
        let mut spawner = EnemySpawner::new(3);
        for _ in 0..500 {
            let kind = spawner.roll_kind(30.0, &tuning);
            assert!(matches!(kind, EnemyKind::Basic | EnemyKind::Chaser));
        }
    }

    #[test]
    fn test_edge_positions_outside_screen() {
        let arena = ArenaTuning::default();
        let mut spawner = EnemySpawner::new(11);
        for _ in 0..200 {
            let p = spawner.edge_position(&arena);
            let margin = arena.spawn_margin;
            let on_horizontal = p.y == -margin || p.y == arena.height + margin;
            let on_vertical = p.x == -margin || p.x == arena.width + margin;
            assert!(on_horizontal || on_vertical, "{p:?} not on spawn ring");
            assert!(!arena.is_outside(p, arena.despawn_margin));
        }
    }

    #[test]
    fn test_spawn_cadence() {
        let tuning = tuning();
        let mut spawner = EnemySpawner::new(1);
        let mut out = Vec::new();
        spawner.update(0.5, screen_center(), 0.0, &tuning, &mut out);
        assert!(spawner.enemies.is_empty());
        spawner.update(0.2, screen_center(), 0.7, &tuning, &mut out);
        assert_eq!(spawner.enemies.len(), 1);
        spawner.update(0.2, screen_center(), 0.9, &tuning, &mut out);
        assert_eq!(spawner.enemies.len(), 1);
    }

    #[test]
    fn test_cap_skips_spawn() {
        let mut tuning = tuning();
        tuning.spawn.max_enemies = 2;
        let mut spawner = EnemySpawner::new(1);
        let mut out = Vec::new();
        for i in 0..10 {
            spawner.update(1.0, screen_center(), i as f32, &tuning, &mut out);
        }
        assert_eq!(spawner.enemies.len(), 2);
    }

    #[test]
    fn test_multipliers_apply_only_to_new_spawns() {
        let tuning = tuning();
        let mut spawner = EnemySpawner::new(1);
        let old = spawner.spawn(EnemyKind::Basic, screen_center(), &tuning);
        spawner.set_multipliers(Multipliers {
            health: 2.0,
            speed: 1.5,
            damage: 1.0,
        });
        let new = spawner.spawn(EnemyKind::Basic, screen_center(), &tuning);

        let old = spawner.get(old).expect("old enemy");
        assert_eq!(old.health, 30.0);
        assert_eq!(old.speed, 50.0);
        let new = spawner.get(new).expect("new enemy");
        assert_eq!(new.health, 60.0);
        assert_eq!(new.speed, 75.0);
    }

    #[test]
    fn test_offscreen_enemies_removed() {
        let tuning = tuning();
        let mut spawner = EnemySpawner::new(1);
        spawner.spawn(EnemyKind::Basic, Vec2::new(-500.0, 100.0), &tuning);
        spawner.spawn(EnemyKind::Basic, Vec2::new(100.0, 100.0), &tuning);
        let mut out = Vec::new();
        spawner.update(0.01, screen_center(), 0.0, &tuning, &mut out);
        assert_eq!(spawner.enemies.len(), 1);
        assert!(spawner.enemies[0].pos.x > 0.0);
    }

    #[test]
    fn test_giant_split_count_and_ring() {
        let tuning = tuning();
        for (time, expected) in [(10.0, 2), (60.0, 3), (130.0, 4), (500.0, 4)] {
            let mut spawner = EnemySpawner::new(1);
            let center = Vec2::new(150.0, 200.0);
            let id = spawner.spawn(EnemyKind::Giant, center, &tuning);
            let removed = spawner.remove(id, time, &tuning).expect("giant present");
            assert_eq!(removed.kind, EnemyKind::Giant);

            // Children wait for the next tick
            assert!(spawner.enemies.is_empty());
            assert_eq!(spawner.pending().len(), expected, "t={time}");
            for child in spawner.pending() {
                assert_eq!(child.kind, EnemyKind::Basic);
                let r = child.pos.distance(center);
                assert!((r - tuning.spawn.split_ring_radius).abs() < 1e-3);
            }

            let mut out = Vec::new();
            spawner.update(0.0, center, time, &tuning, &mut out);
            assert_eq!(spawner.enemies.len(), expected);
            assert!(spawner.pending().is_empty());
        }
    }

    #[test]
    fn test_non_giant_does_not_split() {
        let tuning = tuning();
        let mut spawner = EnemySpawner::new(1);
        let id = spawner.spawn(EnemyKind::Chaser, screen_center(), &tuning);
        spawner.remove(id, 300.0, &tuning);
        assert!(spawner.pending().is_empty());
        assert!(spawner.remove(id, 300.0, &tuning).is_none());
    }

    #[test]
    fn test_split_respects_cap() {
        let mut tuning = tuning();
        tuning.spawn.max_enemies = 3;
        let mut spawner = EnemySpawner::new(1);
        spawner.spawn(EnemyKind::Basic, screen_center(), &tuning);
        spawner.spawn(EnemyKind::Basic, screen_center(), &tuning);
        let id = spawner.spawn(EnemyKind::Giant, screen_center(), &tuning);
        spawner.remove(id, 300.0, &tuning);
        assert_eq!(spawner.pending().len(), 1);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let tuning = tuning();
        let mut a = EnemySpawner::new(42);
        let mut b = EnemySpawner::new(42);
        let mut out = Vec::new();
        for i in 0..40 {
            let t = 130.0 + i as f32;
            a.update(1.0, screen_center(), t, &tuning, &mut out);
            b.update(1.0, screen_center(), t, &tuning, &mut out);
        }
        let kinds_a: Vec<_> = a.enemies.iter().map(|e| (e.kind, e.pos)).collect();
        let kinds_b: Vec<_> = b.enemies.iter().map(|e| (e.kind, e.pos)).collect();
        assert_eq!(kinds_a, kinds_b);
    }
}
