//! Artifacts: permanent stat modifiers applied at round start
//!
//! Artifact definitions are static data. Each effect addresses a leaf of the
//! stat tree by a dotted path (`player.speed`, `weapons.orbital.damage`) or the
//! `all_damage` sentinel. Application is two-pass: every additive effect of
//! every owned artifact first, then every multiplicative effect, both in owned
//! order.

use serde::{Deserialize, Serialize};

use super::stats::StatTree;

/// Path sentinel addressing the damage field of every weapon
pub const ALL_DAMAGE: &str = "all_damage";

/// Artifact identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactId {
    RubyCrystal,
    PowerGauntlet,
    SwiftBoots,
    ProjectileAmplifier,
    OrbitalEnhancer,
    ShieldGenerator,
}

impl ArtifactId {
    pub const ALL: [ArtifactId; 6] = [
        ArtifactId::RubyCrystal,
        ArtifactId::PowerGauntlet,
        ArtifactId::SwiftBoots,
        ArtifactId::ProjectileAmplifier,
        ArtifactId::OrbitalEnhancer,
        ArtifactId::ShieldGenerator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactId::RubyCrystal => "RubyCrystal",
            ArtifactId::PowerGauntlet => "PowerGauntlet",
            ArtifactId::SwiftBoots => "SwiftBoots",
            ArtifactId::ProjectileAmplifier => "ProjectileAmplifier",
            ArtifactId::OrbitalEnhancer => "OrbitalEnhancer",
            ArtifactId::ShieldGenerator => "ShieldGenerator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

/// How an effect combines with the stat it targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    /// `stat += value`
    Additive,
    /// `stat *= 1 + value`
    Multiplicative,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatEffect {
    pub kind: EffectKind,
    pub stat_path: &'static str,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDef {
    pub id: ArtifactId,
    pub name: &'static str,
    pub description: &'static str,
    pub effects: &'static [StatEffect],
}

/// The artifact catalog
pub static CATALOG: [ArtifactDef; 6] = [
    ArtifactDef {
        id: ArtifactId::RubyCrystal,
        name: "Ruby Crystal",
        description: "Increases max health by 20.",
        effects: &[StatEffect {
            kind: EffectKind::Additive,
            stat_path: "player.maxHealth",
            value: 20.0,
        }],
    },
    ArtifactDef {
        id: ArtifactId::PowerGauntlet,
        name: "Power Gauntlet",
        description: "All weapons deal 10% more damage.",
        effects: &[StatEffect {
            kind: EffectKind::Multiplicative,
            stat_path: ALL_DAMAGE,
            value: 0.1,
        }],
    },
    ArtifactDef {
        id: ArtifactId::SwiftBoots,
        name: "Swift Boots",
        description: "Movement speed increased by 15%.",
        effects: &[StatEffect {
            kind: EffectKind::Multiplicative,
            stat_path: "player.speed",
            value: 0.15,
        }],
    },
    ArtifactDef {
        id: ArtifactId::ProjectileAmplifier,
        name: "Projectile Amplifier",
        description: "Projectile damage increased by 25%.",
        effects: &[StatEffect {
            kind: EffectKind::Multiplicative,
            stat_path: "weapons.projectile.damage",
            value: 0.25,
        }],
    },
    ArtifactDef {
        id: ArtifactId::OrbitalEnhancer,
        name: "Orbital Enhancer",
        description: "Orbital damage increased by 25%.",
        effects: &[StatEffect {
            kind: EffectKind::Multiplicative,
            stat_path: "weapons.orbital.damage",
            value: 0.25,
        }],
    },
    ArtifactDef {
        id: ArtifactId::ShieldGenerator,
        name: "Shield Generator",
        description: "Shield damage increased by 25%.",
        effects: &[StatEffect {
            kind: EffectKind::Multiplicative,
            stat_path: "weapons.shield.damage",
            value: 0.25,
        }],
    },
];

/// Look up an artifact definition
pub fn definition(id: ArtifactId) -> Option<&'static ArtifactDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// A mutable numeric leaf of the stat tree
pub enum StatSlot<'a> {
    Float(&'a mut f32),
    /// Integral leaves (levels, counts) round to the nearest non-negative value
    Count(&'a mut u32),
}

impl StatSlot<'_> {
    fn add(self, value: f32) {
        match self {
            StatSlot::Float(v) => *v += value,
            StatSlot::Count(c) => *c = (*c as f32 + value).round().max(0.0) as u32,
        }
    }

    fn scale(self, factor: f32) {
        match self {
            StatSlot::Float(v) => *v *= factor,
            StatSlot::Count(c) => *c = (*c as f32 * factor).round().max(0.0) as u32,
        }
    }
}

/// Resolve a 2- or 3-segment dotted path to a numeric leaf
pub fn resolve_path<'a>(tree: &'a mut StatTree, path: &str) -> Option<StatSlot<'a>> {
    let segments: Vec<&str> = path.split('.').collect();
    let slot = match segments.as_slice() {
        ["player", leaf] => {
            let p = &mut tree.player;
            match *leaf {
                "level" => StatSlot::Count(&mut p.level),
                "experience" => StatSlot::Count(&mut p.experience),
                "experienceToNext" => StatSlot::Count(&mut p.experience_to_next),
                "health" => StatSlot::Float(&mut p.health),
                "maxHealth" => StatSlot::Float(&mut p.max_health),
                "x" => StatSlot::Float(&mut p.x),
                "y" => StatSlot::Float(&mut p.y),
                "speed" => StatSlot::Float(&mut p.speed),
                _ => return None,
            }
        }
        ["difficulty", leaf] => {
            let d = &mut tree.difficulty;
            match *leaf {
                "level" => StatSlot::Count(&mut d.level),
                "enemyHealthMultiplier" => StatSlot::Float(&mut d.enemy_health_multiplier),
                "enemySpeedMultiplier" => StatSlot::Float(&mut d.enemy_speed_multiplier),
                "enemyDamageMultiplier" => StatSlot::Float(&mut d.enemy_damage_multiplier),
                _ => return None,
            }
        }
        ["stats", leaf] => {
            let s = &mut tree.stats;
            match *leaf {
                "enemiesKilled" => StatSlot::Count(&mut s.enemies_killed),
                "experienceGained" => StatSlot::Count(&mut s.experience_gained),
                "damageDealt" => StatSlot::Float(&mut s.damage_dealt),
                _ => return None,
            }
        }
        ["weapons", weapon, leaf] => {
            let w = &mut tree.weapons;
            match (*weapon, *leaf) {
                ("projectile", "level") => StatSlot::Count(&mut w.projectile.level),
                ("projectile", "damage") => StatSlot::Float(&mut w.projectile.damage),
                ("projectile", "speed") => StatSlot::Float(&mut w.projectile.speed),
                ("orbital", "level") => StatSlot::Count(&mut w.orbital.level),
                ("orbital", "damage") => StatSlot::Float(&mut w.orbital.damage),
                ("orbital", "count") => StatSlot::Count(&mut w.orbital.count),
                ("shield", "level") => StatSlot::Count(&mut w.shield.level),
                ("shield", "damage") => StatSlot::Float(&mut w.shield.damage),
                ("shield", "radius") => StatSlot::Float(&mut w.shield.radius),
                ("shield", "cooldown") => StatSlot::Float(&mut w.shield.cooldown),
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(slot)
}

fn apply_effect(tree: &mut StatTree, effect: &StatEffect) {
    if effect.stat_path == ALL_DAMAGE {
        let weapons = &mut tree.weapons;
        for damage in [
            &mut weapons.projectile.damage,
            &mut weapons.orbital.damage,
            &mut weapons.shield.damage,
        ] {
            match effect.kind {
                EffectKind::Additive => *damage += effect.value,
                EffectKind::Multiplicative => *damage *= 1.0 + effect.value,
            }
        }
        return;
    }

    match resolve_path(tree, effect.stat_path) {
        Some(slot) => match effect.kind {
            EffectKind::Additive => slot.add(effect.value),
            EffectKind::Multiplicative => slot.scale(1.0 + effect.value),
        },
        None => log::warn!("Ignoring artifact effect on unknown stat '{}'", effect.stat_path),
    }
}

/// Derive the round's stat tree from the owned artifact list.
///
/// Numeric stats always start from a fresh default tree so repeated calls are
/// idempotent; only difficulty and the running stats carry over from `base`.
/// The player always starts the round at full health.
pub fn apply_artifacts(base: &StatTree, owned: &[ArtifactId]) -> StatTree {
    let defs: Vec<&ArtifactDef> = owned.iter().filter_map(|id| definition(*id)).collect();
    let mut tree = apply_definitions(base, &defs);
    tree.owned_artifacts = owned.to_vec();
    tree
}

/// Two-pass application over an explicit definition list
pub fn apply_definitions(base: &StatTree, defs: &[&ArtifactDef]) -> StatTree {
    let mut tree = StatTree {
        difficulty: base.difficulty.clone(),
        stats: base.stats.clone(),
        owned_artifacts: base.owned_artifacts.clone(),
        ..StatTree::default()
    };

    for pass in [EffectKind::Additive, EffectKind::Multiplicative] {
        for def in defs {
            for effect in def.effects.iter().filter(|e| e.kind == pass) {
                apply_effect(&mut tree, effect);
            }
        }
    }

    tree.player.health = tree.player.max_health;
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stats::Difficulty;
    use proptest::prelude::*;

    static VITALITY_PERCENT: ArtifactDef = ArtifactDef {
        id: ArtifactId::RubyCrystal,
        name: "test",
        description: "",
        effects: &[StatEffect {
            kind: EffectKind::Multiplicative,
            stat_path: "player.maxHealth",
            value: 0.1,
        }],
    };

    static BROKEN_PATHS: ArtifactDef = ArtifactDef {
        id: ArtifactId::RubyCrystal,
        name: "broken",
        description: "",
        effects: &[
            StatEffect {
                kind: EffectKind::Additive,
                stat_path: "player.maxHealt",
                value: 20.0,
            },
            StatEffect {
                kind: EffectKind::Multiplicative,
                stat_path: "weapons.laser.damage",
                value: 1.0,
            },
            StatEffect {
                kind: EffectKind::Additive,
                stat_path: "a.b.c.d",
                value: 1.0,
            },
            StatEffect {
                kind: EffectKind::Additive,
                stat_path: "",
                value: 1.0,
            },
        ],
    };

    static MORE_ORBITALS: ArtifactDef = ArtifactDef {
        id: ArtifactId::OrbitalEnhancer,
        name: "more orbitals",
        description: "",
        effects: &[StatEffect {
            kind: EffectKind::Additive,
            stat_path: "weapons.orbital.count",
            value: 2.0,
        }],
    };

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_no_artifacts_is_default() {
        let tree = apply_artifacts(&StatTree::default(), &[]);
        assert_eq!(tree, StatTree::default());
    }

    #[test]
    fn test_additive_before_multiplicative() {
        let ruby = definition(ArtifactId::RubyCrystal).expect("catalog");
        // Multiplicative listed first; additive still lands first
        let tree = apply_definitions(&StatTree::default(), &[&VITALITY_PERCENT, ruby]);
        assert!(approx(tree.player.max_health, (100.0 + 20.0) * 1.1));
        assert!(!approx(tree.player.max_health, 100.0 * 1.1 + 20.0));
        assert_eq!(tree.player.health, tree.player.max_health);
    }

    #[test]
    fn test_all_damage_fans_out() {
        let tree = apply_artifacts(&StatTree::default(), &[ArtifactId::PowerGauntlet]);
        assert!(approx(tree.weapons.projectile.damage, 15.0 * 1.1));
        assert!(approx(tree.weapons.orbital.damage, 10.0 * 1.1));
        assert!(approx(tree.weapons.shield.damage, 5.0 * 1.1));
        assert_eq!(tree.owned_artifacts, vec![ArtifactId::PowerGauntlet]);
    }

    #[test]
    fn test_stacked_multipliers_compound_in_order() {
        let tree = apply_artifacts(
            &StatTree::default(),
            &[ArtifactId::PowerGauntlet, ArtifactId::ProjectileAmplifier],
        );
        assert!(approx(tree.weapons.projectile.damage, 15.0 * 1.1 * 1.25));
        assert!(approx(tree.weapons.orbital.damage, 11.0));
    }

    #[test]
    fn test_unresolvable_paths_are_ignored() {
        let tree = apply_definitions(&StatTree::default(), &[&BROKEN_PATHS]);
        let mut expected = StatTree::default();
        expected.player.health = expected.player.max_health;
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_count_leaf_rounds() {
        let tree = apply_definitions(&StatTree::default(), &[&MORE_ORBITALS]);
        assert_eq!(tree.weapons.orbital.count, 2);
    }

    #[test]
    fn test_numeric_base_is_ignored_but_carryover_kept() {
        let mut base = StatTree::default();
        base.player.max_health = 999.0;
        base.player.speed = 1.0;
        base.weapons.projectile.damage = 500.0;
        base.difficulty = Difficulty {
            level: 3,
            ..Difficulty::default()
        };
        base.stats.enemies_killed = 42;

        let tree = apply_artifacts(&base, &[ArtifactId::SwiftBoots]);
        assert_eq!(tree.player.max_health, 100.0);
        assert!(approx(tree.player.speed, 150.0 * 1.15));
        assert_eq!(tree.weapons.projectile.damage, 15.0);
        assert_eq!(tree.difficulty.level, 3);
        assert_eq!(tree.stats.enemies_killed, 42);
    }

    #[test]
    fn test_full_heal() {
        let mut base = StatTree::default();
        base.player.health = 3.0;
        let tree = apply_artifacts(&base, &[ArtifactId::RubyCrystal]);
        assert_eq!(tree.player.max_health, 120.0);
        assert_eq!(tree.player.health, 120.0);
    }

    #[test]
    fn test_parse_ids() {
        for id in ArtifactId::ALL {
            assert_eq!(ArtifactId::parse(id.as_str()), Some(id));
            assert!(definition(id).is_some());
        }
        assert_eq!(ArtifactId::parse("Excalibur"), None);
    }

    #[test]
    fn test_resolve_path_depths() {
        let mut tree = StatTree::default();
        assert!(resolve_path(&mut tree, "player.speed").is_some());
        assert!(resolve_path(&mut tree, "weapons.shield.cooldown").is_some());
        assert!(resolve_path(&mut tree, "weapons.shield").is_none());
        assert!(resolve_path(&mut tree, "player").is_none());
        assert!(resolve_path(&mut tree, "player.speed.x").is_none());
    }

    proptest! {
        #[test]
        fn prop_apply_is_idempotent(indices in proptest::collection::vec(0usize..6, 0..12)) {
            let owned: Vec<ArtifactId> = indices.iter().map(|&i| ArtifactId::ALL[i]).collect();
            let base = StatTree::default();
            let first = apply_artifacts(&base, &owned);
            let second = apply_artifacts(&first, &owned);
            let third = apply_artifacts(&base, &owned);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &third);
            prop_assert!(first.player.health <= first.player.max_health);
        }
    }
}
