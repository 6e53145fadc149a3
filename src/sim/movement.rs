//! Hero movement and enemy pursuit

use glam::Vec2;

use super::input::{MoveIntent, facing_for};
use super::state::{Animation, Arena};
use crate::consts::*;
use crate::{angle_between, direction_from_angle};

/// Per-tick displacement for a movement request.
///
/// Vectors longer than 1 are normalized; shorter ones keep their magnitude so
/// partial stick deflection moves proportionally slower.
pub fn displacement(vector: Vec2, speed: f32) -> Vec2 {
    let len = vector.length();
    if len == 0.0 || !len.is_finite() {
        return Vec2::ZERO;
    }
    let dir = if len > 1.0 { vector / len } else { vector };
    dir * speed
}

/// Keep a box of `size` fully inside the arena
pub fn clamp_to_arena(pos: Vec2, size: Vec2) -> Vec2 {
    let half = size / 2.0;
    Vec2::new(
        pos.x.clamp(half.x, (ARENA_WIDTH - half.x).max(half.x)),
        pos.y.clamp(half.y, (ARENA_HEIGHT - half.y).max(half.y)),
    )
}

/// Advance the walk cycle on a wall-clock cadence while moving
pub fn advance_animation(anim: &mut Animation, moving: bool, now_ms: f64) {
    if !moving {
        anim.moving = false;
        anim.frame = 0;
        return;
    }
    if !anim.moving {
        anim.last_frame_ms = now_ms;
    }
    anim.moving = true;
    if now_ms - anim.last_frame_ms >= ANIMATION_FRAME_MS {
        anim.frame = (anim.frame + 1) % ANIMATION_FRAMES;
        anim.last_frame_ms = now_ms;
    }
}

/// Integrate hero movement for one tick
pub fn move_hero(arena: &mut Arena, intent: &MoveIntent, now_ms: f64) {
    let delta = displacement(intent.vector, arena.stats.speed);
    let hero = &mut arena.store.hero;

    hero.pos = clamp_to_arena(hero.pos + delta, hero.size);
    hero.vel = delta;
    if let Some(facing) = intent.facing {
        hero.anim.facing = facing;
    }
    advance_animation(&mut hero.anim, delta != Vec2::ZERO, now_ms);
}

/// Pure pursuit: every enemy heads straight for the hero's current position
pub fn steer_enemies(arena: &mut Arena) {
    let target = arena.store.hero.pos;
    let tuning = &arena.tuning;

    for enemy in &mut arena.store.enemies {
        let to_hero = target - enemy.pos;
        if to_hero.length_squared() == 0.0 {
            enemy.vel = Vec2::ZERO;
            continue;
        }
        let angle = angle_between(enemy.pos, target);
        enemy.vel = direction_from_angle(angle) * tuning.profile(enemy.kind).speed;
        enemy.pos += enemy.vel;
        if let Some(facing) = facing_for(enemy.vel) {
            enemy.anim.facing = facing;
        }
        enemy.anim.moving = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EntityKind, Facing};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn arena() -> Arena {
        Arena::new(1, Tuning::default(), Vec::new())
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let d = displacement(Vec2::new(1.0, 1.0), 3.0);
        assert!((d.length() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_partial_deflection_keeps_magnitude() {
        let d = displacement(Vec2::new(0.5, 0.0), 3.0);
        assert!((d.length() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_vector_is_no_movement() {
        assert_eq!(displacement(Vec2::ZERO, 3.0), Vec2::ZERO);
    }

    #[test]
    fn test_hero_clamped_at_edge() {
        let mut arena = arena();
        arena.store.hero.pos = Vec2::new(HERO_SIZE / 2.0 + 1.0, 300.0);
        let intent = MoveIntent {
            vector: Vec2::new(-1.0, 0.0),
            facing: Some(Facing::Left),
        };
        move_hero(&mut arena, &intent, 0.0);
        assert_eq!(arena.store.hero.pos.x, HERO_SIZE / 2.0);
        assert_eq!(arena.store.hero.anim.facing, Facing::Left);
    }

    #[test]
    fn test_walk_cycle_cadence() {
        let mut anim = Animation::default();
        advance_animation(&mut anim, true, 1000.0);
        assert_eq!(anim.frame, 0);
        advance_animation(&mut anim, true, 1100.0);
        assert_eq!(anim.frame, 0);
        advance_animation(&mut anim, true, 1125.0);
        assert_eq!(anim.frame, 1);
        advance_animation(&mut anim, false, 1300.0);
        assert_eq!(anim.frame, 0);
        assert!(!anim.moving);
    }

    #[test]
    fn test_enemies_pursue_at_tier_speed() {
        let mut arena = arena();
        let hero = arena.store.hero.pos;
        let tuning = arena.tuning.clone();
        arena
            .store
            .spawn_enemy(EntityKind::Mob, &tuning.mob, hero + Vec2::new(100.0, 0.0));
        arena
            .store
            .spawn_enemy(EntityKind::Elite, &tuning.elite, hero - Vec2::new(0.0, 100.0));

        steer_enemies(&mut arena);

        let mob = &arena.store.enemies[0];
        assert!((mob.pos.x - (hero.x + 100.0 - tuning.mob.speed)).abs() < 1e-3);
        assert_eq!(mob.anim.facing, Facing::Left);
        let elite = &arena.store.enemies[1];
        assert!((elite.pos.y - (hero.y - 100.0 + tuning.elite.speed)).abs() < 1e-3);
    }

    #[test]
    fn test_enemy_on_top_of_hero_stays_put() {
        let mut arena = arena();
        let hero = arena.store.hero.pos;
        let tuning = arena.tuning.clone();
        arena.store.spawn_enemy(EntityKind::Mob, &tuning.mob, hero);
        steer_enemies(&mut arena);
        assert_eq!(arena.store.enemies[0].pos, hero);
    }

    proptest! {
        #[test]
        fn prop_displacement_never_exceeds_speed(x in -2.0f32..2.0, y in -2.0f32..2.0, speed in 0.1f32..10.0) {
            let d = displacement(Vec2::new(x, y), speed);
            prop_assert!(d.length() <= speed * (1.0 + 1e-5));
            let magnitude = Vec2::new(x, y).length();
            if magnitude <= 1.0 {
                prop_assert!((d.length() - magnitude * speed).abs() < 1e-4);
            }
        }

        #[test]
        fn prop_hero_stays_inside_arena(
            start_x in 0.0f32..ARENA_WIDTH,
            start_y in 0.0f32..ARENA_HEIGHT,
            steps in proptest::collection::vec((-2.0f32..2.0, -2.0f32..2.0), 1..60),
        ) {
            let mut arena = arena();
            arena.store.hero.pos = Vec2::new(start_x, start_y);
            for (i, (x, y)) in steps.into_iter().enumerate() {
                let vector = Vec2::new(x, y);
                let intent = MoveIntent { vector, facing: facing_for(vector) };
                move_hero(&mut arena, &intent, i as f64 * 16.0);
                let hero = &arena.store.hero;
                let half = hero.size / 2.0;
                prop_assert!(hero.pos.x >= half.x && hero.pos.x <= ARENA_WIDTH - half.x);
                prop_assert!(hero.pos.y >= half.y && hero.pos.y <= ARENA_HEIGHT - half.y);
            }
        }
    }
}
