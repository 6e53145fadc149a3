//! Data-driven game balance
//!
//! Every number the simulation uses lives here so balance passes never touch
//! the systems themselves. A partial JSON document overrides only the fields
//! it names.

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::sim::progression::UPGRADE_POOL;
use crate::sim::state::EntityKind;

/// Starting attributes of the hero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerBase {
    pub max_hp: i32,
    /// Pixels per tick at full stick deflection
    pub speed: f32,
    pub damage: i32,
    pub attack_interval_ticks: u32,
    /// Pixels per tick
    pub projectile_speed: f32,
    pub pickup_radius: f32,
    pub projectile_count: u32,
    pub xp_to_next_level: u32,
}

impl Default for PlayerBase {
    fn default() -> Self {
        Self {
            max_hp: 100,
            speed: 3.0,
            damage: 10,
            attack_interval_ticks: 60,
            projectile_speed: 6.0,
            pickup_radius: 100.0,
            projectile_count: 1,
            xp_to_next_level: 50,
        }
    }
}

/// Physical profile of one enemy tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    pub hp: i32,
    /// Pixels per tick
    pub speed: f32,
    pub contact_damage: i32,
    /// Square sprite edge length
    pub size: f32,
    /// Center distance at which a player projectile connects
    pub hit_radius: f32,
}

impl EnemyProfile {
    const fn new(hp: i32, speed: f32, contact_damage: i32, size: f32, hit_radius: f32) -> Self {
        Self {
            hp,
            speed,
            contact_damage,
            size,
            hit_radius,
        }
    }
}

/// Spawn interval curve: `max(min, base - elapsed_seconds * decay)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnCurve {
    pub base_interval_ticks: f32,
    pub decay_ticks_per_second: f32,
    pub min_interval_ticks: f32,
}

impl Default for SpawnCurve {
    fn default() -> Self {
        Self {
            base_interval_ticks: 90.0,
            decay_ticks_per_second: 0.5,
            min_interval_ticks: 20.0,
        }
    }
}

/// When regular spawns may be promoted to elites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliteGate {
    /// Player level must exceed this
    pub above_level: u32,
    pub first_step_seconds: f32,
    pub first_step_chance: f64,
    pub second_step_seconds: f32,
    pub second_step_chance: f64,
    /// Share of elites that attack from range
    pub ranged_share: f64,
}

impl Default for EliteGate {
    fn default() -> Self {
        Self {
            above_level: 1,
            first_step_seconds: 30.0,
            first_step_chance: 0.1,
            second_step_seconds: 90.0,
            second_step_chance: 0.25,
            ranged_share: 0.5,
        }
    }
}

/// How melee contact damage is rate limited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactCooldown {
    /// One window shared by every enemy: all overlapping enemies strike on
    /// the tick the window opens, then nobody strikes until it reopens.
    #[default]
    Shared,
    /// Each enemy tracks its own window.
    PerEnemy,
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerBase,

    pub mob: EnemyProfile,
    pub elite: EnemyProfile,
    pub elite_ranged: EnemyProfile,
    pub boss: EnemyProfile,

    pub spawn: SpawnCurve,
    pub elite_gate: EliteGate,

    pub boss_burst_count: u32,
    pub boss_attack_interval_ticks: u32,
    pub boss_projectile_speed: f32,
    pub boss_projectile_damage: i32,

    pub ranged_attack_interval_ticks: u32,
    pub ranged_projectile_speed: f32,
    pub ranged_projectile_damage: i32,

    /// Center distance at which an enemy projectile connects with the hero
    pub hero_hit_radius: f32,
    /// Max positional jitter applied to each fired player projectile
    pub projectile_jitter: f32,

    pub contact_cooldown_ticks: u32,
    pub contact_mode: ContactCooldown,

    pub xp_per_gem: u32,
    /// Added to the level threshold on every level transition
    pub threshold_increment: u32,
    /// Fraction of the remaining distance a gem closes each tick
    pub magnet_easing: f32,
    pub pickup_distance: f32,

    pub upgrade_choices: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerBase::default(),

            mob: EnemyProfile::new(20, 1.2, 10, 32.0, 20.0),
            elite: EnemyProfile::new(80, 1.8, 20, 44.0, 26.0),
            elite_ranged: EnemyProfile::new(60, 1.6, 15, 44.0, 26.0),
            boss: EnemyProfile::new(1500, 1.0, 40, 112.0, 60.0),

            spawn: SpawnCurve::default(),
            elite_gate: EliteGate::default(),

            boss_burst_count: 12,
            boss_attack_interval_ticks: 120,
            boss_projectile_speed: 3.5,
            boss_projectile_damage: 15,

            ranged_attack_interval_ticks: 150,
            ranged_projectile_speed: 4.5,
            ranged_projectile_damage: 10,

            hero_hit_radius: 20.0,
            projectile_jitter: 6.0,

            contact_cooldown_ticks: 30,
            contact_mode: ContactCooldown::Shared,

            xp_per_gem: 10,
            threshold_increment: 25,
            magnet_easing: 0.15,
            pickup_distance: 18.0,

            upgrade_choices: 3,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(ArenaError::InvalidTuning(msg.to_string()));

        if self.spawn.min_interval_ticks < 1.0 {
            return fail("spawn.min_interval_ticks must be at least 1");
        }
        if self.spawn.base_interval_ticks < self.spawn.min_interval_ticks {
            return fail("spawn.base_interval_ticks must not be below the floor");
        }
        if self.spawn.decay_ticks_per_second < 0.0 {
            return fail("spawn.decay_ticks_per_second must not be negative");
        }
        if self.player.attack_interval_ticks == 0
            || self.boss_attack_interval_ticks == 0
            || self.ranged_attack_interval_ticks == 0
        {
            return fail("attack intervals must be at least 1 tick");
        }
        if self.contact_cooldown_ticks == 0 {
            return fail("contact_cooldown_ticks must be at least 1");
        }
        if self.player.max_hp <= 0 {
            return fail("player.max_hp must be positive");
        }
        if self.xp_per_gem == 0 || self.player.xp_to_next_level == 0 {
            return fail("xp values must be positive");
        }
        if !(0.0..=1.0).contains(&self.magnet_easing) {
            return fail("magnet_easing must be within 0..=1");
        }
        if self.upgrade_choices == 0 || self.upgrade_choices > UPGRADE_POOL.len() {
            return fail("upgrade_choices must be between 1 and the pool size");
        }
        Ok(())
    }

    /// Profile for an enemy kind (non-enemies fall back to the mob profile)
    pub fn profile(&self, kind: EntityKind) -> &EnemyProfile {
        match kind {
            EntityKind::Elite => &self.elite,
            EntityKind::EliteRanged => &self.elite_ranged,
            EntityKind::Boss => &self.boss,
            _ => &self.mob,
        }
    }

    /// Spawn interval at a given session time
    pub fn spawn_interval_ticks(&self, elapsed_seconds: f32) -> f32 {
        let curve = &self.spawn;
        (curve.base_interval_ticks - elapsed_seconds.max(0.0) * curve.decay_ticks_per_second)
            .max(curve.min_interval_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let tuning = Tuning::from_json(r#"{ "xp_per_gem": 25, "spawn": { "min_interval_ticks": 10.0 } }"#)
            .expect("valid tuning");
        assert_eq!(tuning.xp_per_gem, 25);
        assert_eq!(tuning.spawn.min_interval_ticks, 10.0);
        assert_eq!(tuning.spawn.base_interval_ticks, 90.0);
        assert_eq!(tuning.mob, Tuning::default().mob);
    }

    #[test]
    fn test_rejects_zero_floor() {
        let err = Tuning::from_json(r#"{ "spawn": { "min_interval_ticks": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidTuning(_)));
    }

    #[test]
    fn test_rejects_oversized_choice_count() {
        let tuning = Tuning {
            upgrade_choices: UPGRADE_POOL.len() + 1,
            ..Tuning::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ArenaError::Json(_)));
    }

    #[test]
    fn test_spawn_interval_floor() {
        let tuning = Tuning::default();
        assert_eq!(tuning.spawn_interval_ticks(0.0), 90.0);
        assert_eq!(tuning.spawn_interval_ticks(20.0), 80.0);
        assert_eq!(tuning.spawn_interval_ticks(10_000.0), 20.0);
    }
}
