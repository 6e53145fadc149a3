//! Combat resolution
//!
//! Firing, projectile travel, hit detection, melee contact and enemy death.
//! All hit tests are center-to-center distance checks against a per-tier
//! radius; there is no AABB overlap test.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::state::{Arena, Entity, EntityKind, GameEvent};
use crate::consts::*;
use crate::direction_from_angle;
use crate::tuning::ContactCooldown;

/// Whether a point has left the arena (plus culling margin)
#[inline]
pub fn out_of_bounds(pos: Vec2) -> bool {
    pos.x < -CULL_MARGIN
        || pos.y < -CULL_MARGIN
        || pos.x > ARENA_WIDTH + CULL_MARGIN
        || pos.y > ARENA_HEIGHT + CULL_MARGIN
}

/// Evenly spaced burst directions
pub fn burst_directions(count: u32) -> impl Iterator<Item = Vec2> {
    let step = TAU / count.max(1) as f32;
    (0..count).map(move |i| direction_from_angle(i as f32 * step))
}

/// Untargeted hero barrage on the attack interval
pub fn fire_hero(arena: &mut Arena) {
    arena.fire_cooldown = arena.fire_cooldown.saturating_sub(1);
    if arena.fire_cooldown > 0 {
        return;
    }
    arena.fire_cooldown = arena.stats.attack_interval_ticks.max(1);

    let origin = arena.store.hero.pos;
    let jitter = arena.tuning.projectile_jitter.max(0.0);
    let count = arena.stats.projectile_count;
    for _ in 0..count {
        let angle = arena.rng.random_range(0.0..TAU);
        let offset = if jitter > 0.0 {
            Vec2::new(
                arena.rng.random_range(-jitter..=jitter),
                arena.rng.random_range(-jitter..=jitter),
            )
        } else {
            Vec2::ZERO
        };
        let vel = direction_from_angle(angle) * arena.stats.projectile_speed;
        arena
            .store
            .spawn_projectile(false, origin + offset, vel, arena.stats.damage);
    }
    arena.events.push(GameEvent::PlayerFired { count });
}

/// Boss radial bursts and ranged-elite aimed shots
pub fn enemy_attacks(arena: &mut Arena) {
    let target = arena.store.hero.pos;
    let tuning = &arena.tuning;
    let mut shots: Vec<(Vec2, Vec2, i32)> = Vec::new();

    for enemy in arena.store.enemies.iter_mut().filter(|e| e.is_alive()) {
        let interval = match enemy.kind {
            EntityKind::Boss => tuning.boss_attack_interval_ticks,
            EntityKind::EliteRanged => tuning.ranged_attack_interval_ticks,
            _ => continue,
        };
        enemy.attack_cooldown = enemy.attack_cooldown.saturating_sub(1);
        if enemy.attack_cooldown > 0 {
            continue;
        }
        enemy.attack_cooldown = interval.max(1);

        if enemy.kind == EntityKind::Boss {
            for dir in burst_directions(tuning.boss_burst_count) {
                shots.push((enemy.pos, dir * tuning.boss_projectile_speed, tuning.boss_projectile_damage));
            }
        } else {
            let aim = target - enemy.pos;
            if aim.length_squared() == 0.0 {
                continue;
            }
            shots.push((
                enemy.pos,
                aim.normalize() * tuning.ranged_projectile_speed,
                tuning.ranged_projectile_damage,
            ));
        }
    }

    for (pos, vel, damage) in shots {
        arena.store.spawn_projectile(true, pos, vel, damage);
    }
}

/// Integrate projectiles and drop the ones that left the arena
pub fn move_projectiles(arena: &mut Arena) {
    for projectile in arena
        .store
        .projectiles
        .iter_mut()
        .chain(arena.store.enemy_projectiles.iter_mut())
    {
        projectile.pos += projectile.vel;
    }
    arena.store.projectiles.retain(|p| !out_of_bounds(p.pos));
    arena.store.enemy_projectiles.retain(|p| !out_of_bounds(p.pos));
}

/// Index of the nearest live enemy within its tier hit radius
fn nearest_target(arena: &Arena, enemies: &[Entity], pos: Vec2) -> Option<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive())
        .map(|(i, e)| (i, e.pos.distance(pos), arena.profile(e.kind).hit_radius))
        .filter(|(_, dist, radius)| dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _, _)| i)
}

/// Apply projectile hits: hero shots against enemies, enemy shots against the hero
pub fn resolve_projectile_hits(arena: &mut Arena) {
    let mut enemies = std::mem::take(&mut arena.store.enemies);
    let projectiles = std::mem::take(&mut arena.store.projectiles);

    let mut survivors = Vec::with_capacity(projectiles.len());
    for projectile in projectiles {
        match nearest_target(arena, &enemies, projectile.pos) {
            Some(i) => {
                enemies[i].apply_damage(projectile.contact_damage);
            }
            None => survivors.push(projectile),
        }
    }
    arena.store.projectiles = survivors;
    arena.store.enemies = enemies;

    let hero_pos = arena.store.hero.pos;
    let hit_radius = arena.tuning.hero_hit_radius;
    let mut damage_taken = Vec::new();
    arena.store.enemy_projectiles.retain(|p| {
        if p.pos.distance(hero_pos) <= hit_radius {
            damage_taken.push(p.contact_damage);
            false
        } else {
            true
        }
    });
    for damage in damage_taken {
        damage_hero(arena, damage);
    }
}

/// Melee contact damage, rate limited by the contact cooldown
pub fn resolve_contact(arena: &mut Arena) {
    let now = arena.time_ticks;
    let cooldown = arena.tuning.contact_cooldown_ticks.max(1) as u64;
    let hero_pos = arena.store.hero.pos;
    let hero_radius = arena.store.hero.radius();

    let overlapping = |e: &Entity| e.is_alive() && e.pos.distance(hero_pos) < hero_radius + e.radius();

    let mut hits = Vec::new();
    match arena.tuning.contact_mode {
        ContactCooldown::Shared => {
            if now < arena.contact_ready_tick {
                return;
            }
            hits.extend(
                arena
                    .store
                    .enemies
                    .iter()
                    .filter(|e| overlapping(*e))
                    .map(|e| e.contact_damage),
            );
            if !hits.is_empty() {
                arena.contact_ready_tick = now + cooldown;
            }
        }
        ContactCooldown::PerEnemy => {
            for enemy in arena.store.enemies.iter_mut() {
                if overlapping(&*enemy) && now >= enemy.contact_ready_tick {
                    enemy.contact_ready_tick = now + cooldown;
                    hits.push(enemy.contact_damage);
                }
            }
        }
    }

    for damage in hits {
        damage_hero(arena, damage);
    }
}

fn damage_hero(arena: &mut Arena, damage: i32) {
    if damage <= 0 {
        return;
    }
    arena.stats.hp = (arena.stats.hp - damage).max(0);
    arena.events.push(GameEvent::PlayerHit { damage });
}

/// Remove dead enemies, dropping one gem each. Returns true if the boss died.
pub fn sweep_dead(arena: &mut Arena) -> bool {
    let (dead, alive): (Vec<Entity>, Vec<Entity>) =
        std::mem::take(&mut arena.store.enemies)
            .into_iter()
            .partition(|e| !e.is_alive());
    arena.store.enemies = alive;

    let mut boss_killed = false;
    for enemy in dead {
        arena.store.spawn_gem(enemy.pos);
        if let Some(tier) = enemy.kind.tier() {
            arena.session.kills.record(tier);
        }
        if enemy.kind == EntityKind::Boss {
            boss_killed = true;
        }
        arena.events.push(GameEvent::EnemyKilled { kind: enemy.kind });
        log::trace!("{} {:?} destroyed", enemy.kind.as_str(), enemy.id);
    }
    boss_killed
}

/// Full combat step. Returns true if the boss was destroyed this tick.
pub fn resolve(arena: &mut Arena) -> bool {
    fire_hero(arena);
    enemy_attacks(arena);
    move_projectiles(arena);
    resolve_projectile_hits(arena);
    resolve_contact(arena);
    sweep_dead(arena)
}
