//! Session state and the single damage-resolution path
//!
//! A `Session` owns one run: the stat tree, every entity, and the flow
//! between rounds (level-up choices, victory offers, restart). `tick` drives
//! it one frame at a time.

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::artifact::{ArtifactId, apply_artifacts};
use super::entity::{EnemyKind, Player};
use super::spawner::EnemySpawner;
use super::stats::{Difficulty, RunStats, StatTree, WeaponId};
use super::upgrade::{UpgradeId, roll_offer};
use super::weapons::WeaponSystem;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    Paused,
    /// Waiting for level-up upgrade choices
    LevelUp,
    /// Round survived; waiting for an artifact choice
    Victory,
    /// Player died; waiting for restart
    GameOver,
}

impl GamePhase {
    /// Phases in which `tick` advances the world
    pub fn is_running(&self) -> bool {
        *self == GamePhase::Playing
    }
}

/// One-shot signals for the surrounding application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelUp { level: u32 },
    /// Round survived. `offer` lists artifact candidates for the next round.
    Victory { difficulty_level: u32, offer: Vec<ArtifactId> },
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub health_fraction: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Vec2,
    pub is_enemy: bool,
}

/// Immutable per-tick view for rendering and UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub game_time: f32,
    pub round: u32,
    pub difficulty_level: u32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub orbital_angles: Vec<f32>,
    /// Shield radius while the shield weapon is owned
    pub shield_radius: Option<f32>,
    pub stats: RunStats,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct Session {
    pub seed: u64,
    pub tuning: Tuning,
    pub stats: StatTree,
    pub phase: GamePhase,
    /// Seconds survived in the current round
    pub game_time: f32,
    /// Rounds started, including the current one
    pub round: u32,
    pub player: Player,
    pub spawner: EnemySpawner,
    pub weapons: WeaponSystem,
    pending_upgrades: u32,
    upgrade_offer: Vec<UpgradeId>,
    artifact_offer: Vec<ArtifactId>,
    events: Vec<GameEvent>,
    rng: Pcg32,
}

impl Session {
    /// Start the first round with `owned` artifacts applied
    pub fn new(seed: u64, tuning: Tuning, owned: Vec<ArtifactId>) -> Self {
        let stats = apply_artifacts(&StatTree::default(), &owned);
        let center = tuning.arena.center();
        let mut session = Self {
            seed,
            player: Player::new(center, &tuning.player),
            spawner: EnemySpawner::new(seed),
            weapons: WeaponSystem::new(tuning.weapons.clone()),
            tuning,
            stats,
            phase: GamePhase::Playing,
            game_time: 0.0,
            round: 0,
            pending_upgrades: 0,
            upgrade_offer: Vec::new(),
            artifact_offer: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        session.begin_round();
        session
    }

    pub fn owned_artifacts(&self) -> &[ArtifactId] {
        &self.stats.owned_artifacts
    }

    pub fn upgrade_offer(&self) -> &[UpgradeId] {
        &self.upgrade_offer
    }

    pub fn pending_upgrades(&self) -> u32 {
        self.pending_upgrades
    }

    pub fn artifact_offer(&self) -> &[ArtifactId] {
        &self.artifact_offer
    }

    /// Victory or game over reached; only a choice or restart moves on
    pub fn is_halted(&self) -> bool {
        matches!(self.phase, GamePhase::Victory | GamePhase::GameOver)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain events emitted since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reset entities and timers around the current stat tree
    fn begin_round(&mut self) {
        self.round += 1;
        self.game_time = 0.0;
        self.phase = GamePhase::Playing;
        self.pending_upgrades = 0;
        self.upgrade_offer.clear();
        self.artifact_offer.clear();

        let center = self.tuning.arena.center();
        self.player.reset(center);
        self.player.sync(&self.stats.player);
        self.stats.player.x = center.x;
        self.stats.player.y = center.y;

        self.spawner.clear();
        self.spawner.set_multipliers(self.stats.difficulty.multipliers());
        self.weapons.clear();
        self.weapons.sync_to_stat_tree(&self.stats.weapons);

        log::info!(
            "Round {} started (difficulty {}, {} artifacts)",
            self.round,
            self.stats.difficulty.level,
            self.stats.owned_artifacts.len()
        );
    }

    /// Apply weapon damage to one enemy. Every hit, kill and experience
    /// gain goes through here. Returns true if the hit killed the enemy.
    pub fn apply_damage(&mut self, enemy_id: u32, amount: f32, weapon: WeaponId) -> bool {
        let Some(enemy) = self.spawner.get_mut(enemy_id) else {
            return false;
        };
        if !enemy.is_alive() {
            return false;
        }
        enemy.health = (enemy.health - amount).max(0.0);
        let killed = !enemy.is_alive();
        self.stats.stats.record_hit(weapon, amount);

        if killed {
            let experience = self.tuning.session.experience_per_kill;
            self.stats.stats.record_kill(weapon, experience);
            if let Some(dead) = self.spawner.remove(enemy_id, self.game_time, &self.tuning) {
                log::debug!("{:?} #{} killed by {}", dead.kind, dead.id, weapon.as_str());
            }
            self.gain_experience(experience);
        }
        killed
    }

    /// Add experience, emitting one LEVEL_UP per level gained
    pub fn gain_experience(&mut self, amount: u32) {
        let before = self.stats.player.level;
        let gained = self
            .stats
            .player
            .add_experience(amount, self.tuning.session.level_growth);
        if gained == 0 {
            return;
        }

        for level in before + 1..=before + gained {
            log::info!("Level up: {level}");
            self.emit(GameEvent::LevelUp { level });
        }
        self.pending_upgrades += gained;
        if self.upgrade_offer.is_empty() {
            self.upgrade_offer = roll_offer(&mut self.rng, self.tuning.session.upgrade_offer_size);
        }
        if self.tuning.session.pause_on_level_up && self.phase == GamePhase::Playing {
            self.phase = GamePhase::LevelUp;
        }
    }

    /// Damage the player unless invulnerable. Starts the invulnerability
    /// window and ends the run at zero health. Returns true if applied.
    pub fn damage_player(&mut self, amount: f32) -> bool {
        if self.player.is_invulnerable() || self.phase == GamePhase::GameOver {
            return false;
        }
        let health = &mut self.stats.player.health;
        *health = (*health - amount).max(0.0);
        self.player
            .start_invulnerability(self.tuning.player.invulnerability_secs);

        if self.stats.player.health <= 0.0 {
            self.phase = GamePhase::GameOver;
            log::info!(
                "Game over at {:.1}s ({} kills)",
                self.game_time,
                self.stats.stats.enemies_killed
            );
            self.emit(GameEvent::GameOver);
        }
        true
    }

    /// Freeze the round, raise difficulty and offer artifacts
    pub fn declare_victory(&mut self) {
        if self.is_halted() {
            return;
        }
        self.phase = GamePhase::Victory;

        let level = self.stats.difficulty.level + 1;
        self.stats.difficulty = Difficulty::for_level(level, &self.tuning.difficulty);
        self.spawner.set_multipliers(self.stats.difficulty.multipliers());

        let mut candidates: Vec<ArtifactId> = ArtifactId::ALL
            .into_iter()
            .filter(|id| !self.stats.owned_artifacts.contains(id))
            .collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(self.tuning.session.artifact_offer_size);
        self.artifact_offer = candidates.clone();

        log::info!("Victory! Difficulty now {level}, offering {:?}", candidates);
        self.emit(GameEvent::Victory {
            difficulty_level: level,
            offer: candidates,
        });
    }

    /// Resolve one pending level-up with an upgrade from the current offer
    pub fn choose_upgrade(&mut self, upgrade: UpgradeId) -> bool {
        if self.pending_upgrades == 0 || !self.upgrade_offer.contains(&upgrade) {
            log::warn!("Upgrade {:?} is not on offer", upgrade);
            return false;
        }
        upgrade.apply(&mut self.stats);
        self.stats.player.clamp_health();
        self.pending_upgrades -= 1;
        log::info!("Upgrade chosen: {}", upgrade.name());

        if self.pending_upgrades > 0 {
            self.upgrade_offer = roll_offer(&mut self.rng, self.tuning.session.upgrade_offer_size);
        } else {
            self.upgrade_offer.clear();
            if self.phase == GamePhase::LevelUp {
                self.phase = GamePhase::Playing;
            }
        }
        true
    }

    /// Take an offered artifact (or none) after victory and start the next round
    pub fn choose_artifact(&mut self, choice: Option<ArtifactId>) -> bool {
        if self.phase != GamePhase::Victory {
            log::warn!("No artifact choice pending");
            return false;
        }
        let mut owned = self.stats.owned_artifacts.clone();
        if let Some(id) = choice {
            if !self.artifact_offer.contains(&id) {
                log::warn!("Artifact {} is not on offer", id.as_str());
                return false;
            }
            owned.push(id);
            log::info!("Artifact chosen: {}", id.as_str());
        }
        self.stats = apply_artifacts(&self.stats, &owned);
        self.begin_round();
        true
    }

    /// Start over after a game over: same artifacts and difficulty, fresh stats
    pub fn restart(&mut self) {
        let base = StatTree {
            difficulty: self.stats.difficulty.clone(),
            ..StatTree::default()
        };
        let owned = self.stats.owned_artifacts.clone();
        self.stats = apply_artifacts(&base, &owned);
        self.events.clear();
        self.begin_round();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            game_time: self.game_time,
            round: self.round,
            difficulty_level: self.stats.difficulty.level,
            player: PlayerView {
                pos: self.player.pos,
                health: self.stats.player.health,
                max_health: self.stats.player.max_health,
                level: self.stats.player.level,
                invulnerable: self.player.is_invulnerable(),
            },
            enemies: self
                .spawner
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    radius: e.radius,
                    health_fraction: e.health_fraction(),
                })
                .collect(),
            projectiles: self
                .weapons
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    pos: p.pos,
                    is_enemy: p.is_enemy,
                })
                .collect(),
            orbital_angles: self.weapons.orbitals.iter().map(|o| o.angle).collect(),
            shield_radius: self.weapons.shield.as_ref().map(|s| s.radius),
            stats: self.stats.stats.clone(),
        }
    }
}
