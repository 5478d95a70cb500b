//! Enemy behaviours
//!
//! A closed set of behaviour tags, each paired with a plain update function.
//! Behaviours see the world only through a read-only [`TickContext`] and can
//! only affect it by pushing [`EnemyCommand`]s.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Enemy, EnemyKind};
use crate::direction_or_zero;
use crate::tuning::SniperTuning;

/// Weight of the separation vector relative to the seek vector
pub const SEPARATION_WEIGHT: f32 = 1.5;
/// Neighbours closer than `radius * SEPARATION_RANGE` push each other apart
pub const SEPARATION_RANGE: f32 = 2.5;

/// Per-enemy behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Chaser,
    Giant,
    Sniper {
        /// Seconds until the next shot is allowed
        cooldown: f32,
    },
}

impl Behavior {
    pub fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Basic | EnemyKind::Chaser => Behavior::Chaser,
            EnemyKind::Giant => Behavior::Giant,
            EnemyKind::Sniper => Behavior::Sniper { cooldown: 0.0 },
        }
    }

    fn update_fn(&self) -> BehaviorFn {
        match self {
            Behavior::Chaser => chase,
            Behavior::Giant => giant,
            Behavior::Sniper { .. } => snipe,
        }
    }
}

/// Requests a behaviour makes of the rest of the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyCommand {
    /// Fire a hostile straight-line projectile from `origin` toward `target`
    FireAtPlayer {
        origin: Vec2,
        target: Vec2,
        damage: f32,
        speed: f32,
    },
}

/// Everything a behaviour may read during one update
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub player_pos: Vec2,
    /// Positions of every enemy at the start of the pass, including this one
    pub positions: &'a [Vec2],
    /// Index of the updating enemy within `positions`
    pub self_index: usize,
    pub dt: f32,
    pub sniper: &'a SniperTuning,
}

type BehaviorFn = fn(&mut Enemy, &TickContext<'_>, &mut Vec<EnemyCommand>);

/// Advance one enemy by its behaviour
pub fn update(enemy: &mut Enemy, ctx: &TickContext<'_>, out: &mut Vec<EnemyCommand>) {
    let run = enemy.behavior.update_fn();
    run(enemy, ctx, out);
}

/// Inverse-square repulsion from neighbours inside `radius * SEPARATION_RANGE`,
/// averaged and normalized. Zero when nobody is close.
pub fn separation(pos: Vec2, radius: f32, positions: &[Vec2], self_index: usize) -> Vec2 {
    let desired = radius * SEPARATION_RANGE;
    let mut sum = Vec2::ZERO;
    let mut neighbors = 0u32;

    for (i, other) in positions.iter().enumerate() {
        if i == self_index {
            continue;
        }
        let diff = pos - *other;
        let distance = diff.length();
        if distance > 0.0 && distance < desired {
            sum += diff / (distance * distance);
            neighbors += 1;
        }
    }

    if neighbors == 0 {
        return Vec2::ZERO;
    }
    direction_or_zero(sum / neighbors as f32)
}

/// Blend a desired heading with separation and step at full speed
fn steer(enemy: &mut Enemy, heading: Vec2, ctx: &TickContext<'_>) {
    let away = separation(enemy.pos, enemy.radius, ctx.positions, ctx.self_index);
    let direction = direction_or_zero(heading + away * SEPARATION_WEIGHT);
    enemy.pos += direction * enemy.speed * ctx.dt;
}

fn chase(enemy: &mut Enemy, ctx: &TickContext<'_>, _out: &mut Vec<EnemyCommand>) {
    let heading = direction_or_zero(ctx.player_pos - enemy.pos);
    steer(enemy, heading, ctx);
}

// Giants move like chasers; their split lives in the spawner
fn giant(enemy: &mut Enemy, ctx: &TickContext<'_>, out: &mut Vec<EnemyCommand>) {
    chase(enemy, ctx, out);
}

fn snipe(enemy: &mut Enemy, ctx: &TickContext<'_>, out: &mut Vec<EnemyCommand>) {
    let tuning = ctx.sniper;
    let origin = enemy.pos;
    let to_player = ctx.player_pos - origin;
    let distance = to_player.length();

    let heading = if distance < tuning.preferred_distance - tuning.distance_band {
        direction_or_zero(-to_player)
    } else if distance > tuning.preferred_distance + tuning.distance_band {
        direction_or_zero(to_player)
    } else {
        Vec2::ZERO
    };
    steer(enemy, heading, ctx);

    let damage = tuning.projectile_damage * enemy.damage_scale;
    if let Behavior::Sniper { cooldown } = &mut enemy.behavior {
        *cooldown -= ctx.dt;
        if *cooldown <= 0.0 && distance <= tuning.attack_range {
            out.push(EnemyCommand::FireAtPlayer {
                origin,
                target: ctx.player_pos,
                damage,
                speed: tuning.projectile_speed,
            });
            *cooldown = tuning.attack_interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stats::Multipliers;
    use crate::tuning::EnemyTable;
    use proptest::prelude::*;

    fn enemy(kind: EnemyKind, pos: Vec2) -> Enemy {
        let table = EnemyTable::default();
        Enemy::spawn(1, kind, pos, table.get(kind), Multipliers::default())
    }

    fn ctx<'a>(
        player: Vec2,
        positions: &'a [Vec2],
        index: usize,
        sniper: &'a SniperTuning,
    ) -> TickContext<'a> {
        TickContext {
            player_pos: player,
            positions,
            self_index: index,
            dt: 0.1,
            sniper,
        }
    }

    #[test]
    fn test_dispatch_table() {
        assert_eq!(Behavior::for_kind(EnemyKind::Basic), Behavior::Chaser);
        assert_eq!(Behavior::for_kind(EnemyKind::Chaser), Behavior::Chaser);
        assert_eq!(Behavior::for_kind(EnemyKind::Giant), Behavior::Giant);
        assert!(matches!(
            Behavior::for_kind(EnemyKind::Sniper),
            Behavior::Sniper { .. }
        ));
    }

    #[test]
    fn test_chaser_moves_toward_player() {
        let sniper = SniperTuning::default();
        let mut e = enemy(EnemyKind::Basic, Vec2::ZERO);
        let positions = [e.pos];
        let mut out = Vec::new();
        update(&mut e, &ctx(Vec2::new(100.0, 0.0), &positions, 0, &sniper), &mut out);
        // speed 50 * dt 0.1
        assert!((e.pos.x - 5.0).abs() < 1e-4);
        assert!(e.pos.y.abs() < 1e-6);
        assert!(out.is_empty());
    }

    #[test]
    fn test_giant_matches_chaser() {
        let sniper = SniperTuning::default();
        let mut chaser = enemy(EnemyKind::Basic, Vec2::new(10.0, 20.0));
        let mut giant = enemy(EnemyKind::Giant, Vec2::new(10.0, 20.0));
        giant.speed = chaser.speed;
        giant.radius = chaser.radius;
        let positions = [chaser.pos, Vec2::new(15.0, 22.0)];
        let mut out = Vec::new();
        update(&mut chaser, &ctx(Vec2::new(200.0, 300.0), &positions, 0, &sniper), &mut out);
        update(&mut giant, &ctx(Vec2::new(200.0, 300.0), &positions, 0, &sniper), &mut out);
        assert_eq!(chaser.pos, giant.pos);
    }

    #[test]
    fn test_separation_pushes_apart() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0)];
        let push = separation(positions[0], 10.0, &positions, 0);
        assert!((push - Vec2::new(-1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_separation_ignores_far_and_overlapping() {
        // 25 is exactly 2.5 * radius: not a neighbour
        let positions = [Vec2::ZERO, Vec2::new(25.0, 0.0), Vec2::ZERO];
        assert_eq!(separation(Vec2::ZERO, 10.0, &positions, 0), Vec2::ZERO);
    }

    #[test]
    fn test_overlapping_enemies_stay_finite() {
        let sniper = SniperTuning::default();
        let mut e = enemy(EnemyKind::Chaser, Vec2::new(50.0, 50.0));
        let positions = [e.pos, e.pos, e.pos];
        let mut out = Vec::new();
        // Player exactly on top as well
        update(&mut e, &ctx(Vec2::new(50.0, 50.0), &positions, 0, &sniper), &mut out);
        assert!(e.pos.is_finite());
        assert_eq!(e.pos, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_sniper_keeps_distance() {
        let sniper = SniperTuning::default();
        let player = Vec2::ZERO;

        let mut close = enemy(EnemyKind::Sniper, Vec2::new(100.0, 0.0));
        let positions = [close.pos];
        let mut out = Vec::new();
        update(&mut close, &ctx(player, &positions, 0, &sniper), &mut out);
        assert!(close.pos.x > 100.0, "too close: backs off");

        let mut far = enemy(EnemyKind::Sniper, Vec2::new(300.0, 0.0));
        let positions = [far.pos];
        update(&mut far, &ctx(player, &positions, 0, &sniper), &mut out);
        assert!(far.pos.x < 300.0, "too far: closes in");

        let mut held = enemy(EnemyKind::Sniper, Vec2::new(155.0, 0.0));
        let positions = [held.pos];
        update(&mut held, &ctx(player, &positions, 0, &sniper), &mut out);
        assert_eq!(held.pos, Vec2::new(155.0, 0.0), "inside band: holds");
    }

    #[test]
    fn test_sniper_fires_on_cooldown_when_in_range() {
        let sniper = SniperTuning::default();
        let player = Vec2::ZERO;
        let mut e = enemy(EnemyKind::Sniper, Vec2::new(150.0, 0.0));
        e.damage_scale = 1.5;
        let mut out = Vec::new();

        let positions = [e.pos];
        update(&mut e, &ctx(player, &positions, 0, &sniper), &mut out);
        assert_eq!(out.len(), 1);
        match &out[0] {
            EnemyCommand::FireAtPlayer {
                origin,
                target,
                damage,
                speed,
            } => {
                assert_eq!(*origin, Vec2::new(150.0, 0.0));
                assert_eq!(*target, player);
                assert_eq!(*damage, 15.0);
                assert_eq!(*speed, sniper.projectile_speed);
            }
        }
        assert_eq!(e.behavior, Behavior::Sniper { cooldown: 2.0 });

        // 1.9 more seconds: still cooling down
        for _ in 0..19 {
            let positions = [e.pos];
            update(&mut e, &ctx(player, &positions, 0, &sniper), &mut out);
        }
        assert_eq!(out.len(), 1);
        for _ in 0..2 {
            let positions = [e.pos];
            update(&mut e, &ctx(player, &positions, 0, &sniper), &mut out);
        }
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_sniper_holds_fire_out_of_range() {
        let sniper = SniperTuning::default();
        let mut e = enemy(EnemyKind::Sniper, Vec2::new(400.0, 0.0));
        let positions = [e.pos];
        let mut out = Vec::new();
        update(&mut e, &ctx(Vec2::ZERO, &positions, 0, &sniper), &mut out);
        assert!(out.is_empty());
    }

    proptest! {
        #[test]
        fn prop_steering_never_produces_nan(
            px in -500.0f32..500.0, py in -500.0f32..500.0,
            coords in proptest::collection::vec((-5.0f32..5.0, -5.0f32..5.0), 1..8),
            kind in 0usize..4,
        ) {
            let sniper = SniperTuning::default();
            // Tight cluster with duplicates
            let positions: Vec<Vec2> = coords
                .iter()
                .map(|&(x, y)| Vec2::new(x.round(), y.round()))
                .collect();
            let mut out = Vec::new();
            for i in 0..positions.len() {
                let mut e = enemy(EnemyKind::ALL[kind], positions[i]);
                update(&mut e, &ctx(Vec2::new(px, py), &positions, i, &sniper), &mut out);
                prop_assert!(e.pos.is_finite());
            }
        }
    }
}
