//! Per-frame simulation step
//!
//! `tick` runs the fixed sequence: victory check, player, enemies, weapons,
//! collisions, then damage resolution. The order is part of the contract:
//! collisions read positions advanced this tick, and Giant split children
//! only join on the next tick.

use std::collections::HashSet;

use glam::Vec2;

use super::behavior::EnemyCommand;
use super::collision::{HitSource, check_collisions};
use super::state::{GameEvent, GamePhase, Session, Snapshot};
use super::stats::WeaponId;
use crate::direction_or_zero;

/// Distance the idle autopilot looks ahead when fleeing
const AUTOPILOT_STRIDE: f32 = 60.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move toward this point (from pointer/touch position)
    pub move_to: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - steer away from the nearest enemy
    pub idle_mode: bool,
}

/// Output of one advanced tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub snapshot: Snapshot,
}

fn report(session: &mut Session) -> TickReport {
    TickReport {
        events: session.take_events(),
        snapshot: session.snapshot(),
    }
}

/// Clamp a wall-clock delta to `[0, max]`; non-finite deltas become 0
pub fn sanitize_dt(dt: f32, max: f32) -> f32 {
    if !dt.is_finite() {
        log::warn!("Ignoring non-finite frame delta {dt}");
        return 0.0;
    }
    dt.clamp(0.0, max)
}

/// Pick a point away from the nearest living enemy, kept inside the arena
pub fn autopilot_target(session: &Session) -> Vec2 {
    let arena = &session.tuning.arena;
    let pos = session.player.pos;
    let nearest = session
        .spawner
        .living()
        .min_by(|a, b| a.pos.distance_squared(pos).total_cmp(&b.pos.distance_squared(pos)));

    let Some(enemy) = nearest else {
        return arena.center();
    };
    let mut away = direction_or_zero(pos - enemy.pos);
    if away == Vec2::ZERO {
        away = direction_or_zero(arena.center() - pos);
    }
    let r = session.player.radius;
    let target = pos + away * AUTOPILOT_STRIDE;
    Vec2::new(
        target.x.clamp(r, (arena.width - r).max(r)),
        target.y.clamp(r, (arena.height - r).max(r)),
    )
}

/// Advance the session by one frame.
///
/// Returns `None` when nothing advanced (paused, waiting on a choice, or
/// the run has ended).
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) -> Option<TickReport> {
    // Handle pause toggle
    if input.pause {
        match session.phase {
            GamePhase::Playing => {
                session.phase = GamePhase::Paused;
                return None;
            }
            GamePhase::Paused => session.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if !session.phase.is_running() {
        return None;
    }

    let dt = sanitize_dt(dt, session.tuning.session.max_frame_dt);

    // 1. Time and victory
    session.game_time += dt;
    if session.game_time >= session.tuning.session.length_secs {
        session.declare_victory();
        return Some(report(session));
    }

    // 2. Player
    let target = if input.idle_mode {
        Some(autopilot_target(session))
    } else {
        input.move_to
    };
    if let Some(target) = target {
        session.player.move_to(target);
    }
    session.player.sync(&session.stats.player);
    session
        .player
        .update(dt, session.tuning.player.arrive_epsilon);
    session.stats.player.x = session.player.pos.x;
    session.stats.player.y = session.player.pos.y;
    let player_pos = session.player.pos;

    // 3. Enemies
    let mut commands = Vec::new();
    session.spawner.update(
        dt,
        player_pos,
        session.game_time,
        &session.tuning,
        &mut commands,
    );
    for command in commands {
        match command {
            EnemyCommand::FireAtPlayer {
                origin,
                target,
                damage,
                speed,
            } => {
                session
                    .weapons
                    .fire_enemy_projectile(origin, target, damage, speed);
            }
        }
    }

    // 4. Weapons
    session.weapons.sync_to_stat_tree(&session.stats.weapons);
    session
        .weapons
        .update(dt, player_pos, &session.tuning.arena);
    session
        .weapons
        .fire_friendly(dt, player_pos, &session.spawner.enemies);

    // 5. Collisions
    let collisions = check_collisions(
        &session.player,
        &session.spawner.enemies,
        &session.weapons.projectiles,
        &session.weapons.orbitals,
    );

    // 6. Weapon hits. A projectile is spent on its first live target.
    let mut spent: HashSet<u32> = HashSet::new();
    for hit in &collisions.weapon_enemy {
        let target_alive = session
            .spawner
            .get(hit.enemy_id)
            .is_some_and(|e| e.is_alive());
        if !target_alive {
            continue;
        }
        match hit.source {
            HitSource::Projectile(id) => {
                if spent.contains(&id) {
                    continue;
                }
                let Some(damage) = session.weapons.projectile(id).map(|p| p.damage) else {
                    continue;
                };
                spent.insert(id);
                session.weapons.remove_projectile(id);
                session.apply_damage(hit.enemy_id, damage, WeaponId::Projectile);
            }
            HitSource::Orbital(_) => {
                let damage = session.weapons.stats().orbital.damage;
                session.apply_damage(hit.enemy_id, damage, WeaponId::Orbital);
            }
        }
    }

    // 7. Contact damage
    let touching = collisions.player_enemy.iter().any(|id| {
        session
            .spawner
            .get(*id)
            .is_some_and(|e| e.is_alive())
    });
    if touching {
        let damage = session.tuning.player.contact_damage(
            session.stats.player.level,
            session.spawner.damage_multiplier(),
        );
        session.damage_player(damage);
    }
    if session.phase == GamePhase::GameOver {
        return Some(report(session));
    }

    // 8. Shield pulse
    let targets = session
        .weapons
        .shield_targets(player_pos, &session.spawner.enemies);
    let shield_damage = session.weapons.shield_damage();
    for id in targets {
        session.apply_damage(id, shield_damage, WeaponId::Shield);
    }

    // 9. Enemy projectiles. Always consumed, even while invulnerable.
    for id in &collisions.enemy_projectile_player {
        let Some(damage) = session.weapons.projectile(*id).map(|p| p.damage) else {
            continue;
        };
        session.weapons.remove_projectile(*id);
        session.damage_player(damage);
    }

    // 10. Snapshot
    Some(report(session))
}
