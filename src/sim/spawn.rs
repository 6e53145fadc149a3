//! Spawn director
//!
//! Decides when the next enemy appears and what it is. Spawn slots come
//! faster as the session goes on; once every vocabulary challenge has been
//! consumed, the next slot produces the boss instead.

use glam::Vec2;
use rand::Rng;

use super::state::{Arena, EntityKind, GameEvent};
use crate::consts::*;
use crate::tuning::Tuning;

/// Random point just outside one of the four arena edges
pub fn spawn_position<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let x = rng.random_range(0.0..ARENA_WIDTH);
    let y = rng.random_range(0.0..ARENA_HEIGHT);
    match rng.random_range(0..4) {
        0 => Vec2::new(x, -SPAWN_MARGIN),
        1 => Vec2::new(x, ARENA_HEIGHT + SPAWN_MARGIN),
        2 => Vec2::new(-SPAWN_MARGIN, y),
        _ => Vec2::new(ARENA_WIDTH + SPAWN_MARGIN, y),
    }
}

/// Chance that a regular spawn is promoted to an elite
pub fn elite_chance(tuning: &Tuning, level: u32, elapsed_seconds: f32) -> f64 {
    let gate = &tuning.elite_gate;
    if level <= gate.above_level {
        return 0.0;
    }
    let chance = if elapsed_seconds >= gate.second_step_seconds {
        gate.second_step_chance
    } else if elapsed_seconds >= gate.first_step_seconds {
        gate.first_step_chance
    } else {
        0.0
    };
    chance.clamp(0.0, 1.0)
}

/// Pick the tier of a regular (non-boss) spawn
pub fn roll_enemy_kind<R: Rng + ?Sized>(
    rng: &mut R,
    tuning: &Tuning,
    level: u32,
    elapsed_seconds: f32,
) -> EntityKind {
    let chance = elite_chance(tuning, level, elapsed_seconds);
    if chance > 0.0 && rng.random_bool(chance) {
        if rng.random_bool(tuning.elite_gate.ranged_share.clamp(0.0, 1.0)) {
            EntityKind::EliteRanged
        } else {
            EntityKind::Elite
        }
    } else {
        EntityKind::Mob
    }
}

/// Advance the spawn timer and fill the slot when it comes due
pub fn run_director(arena: &mut Arena) {
    arena.spawn_timer += 1.0;
    let interval = arena.tuning.spawn_interval_ticks(arena.session.elapsed_seconds);
    if arena.spawn_timer < interval {
        return;
    }
    arena.spawn_timer = 0.0;

    let pos = spawn_position(&mut arena.rng);

    if arena.session.challenges.is_empty() && !arena.session.boss_spawned {
        let id = arena
            .store
            .spawn_enemy(EntityKind::Boss, &arena.tuning.boss, pos);
        if let Some(boss) = arena.store.enemies.iter_mut().find(|e| e.id == id) {
            boss.attack_cooldown = arena.tuning.boss_attack_interval_ticks;
        }
        arena.session.boss_spawned = true;
        arena.events.push(GameEvent::BossSpawned);
        log::info!(
            "Boss spawned at ({:.0}, {:.0}) after {:.1}s",
            pos.x,
            pos.y,
            arena.session.elapsed_seconds
        );
        return;
    }

    let kind = roll_enemy_kind(
        &mut arena.rng,
        &arena.tuning,
        arena.stats.level,
        arena.session.elapsed_seconds,
    );
    let id = arena.store.spawn_enemy(kind, arena.tuning.profile(kind), pos);
    if kind == EntityKind::EliteRanged {
        if let Some(enemy) = arena.store.enemies.iter_mut().find(|e| e.id == id) {
            enemy.attack_cooldown = arena.tuning.ranged_attack_interval_ticks;
        }
    }
    arena.events.push(GameEvent::EnemySpawned { kind });
    log::debug!("Spawned {} (interval {:.1} ticks)", kind.as_str(), interval);
}
