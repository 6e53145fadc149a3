//! Drawable surface abstraction
//!
//! The renderer walks the entity store in draw order and asks the host
//! surface to draw each entity's sprite. When a sprite is unavailable the
//! entity is drawn as a primitive shape coloured by kind instead, so a
//! missing asset never interrupts the session.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::state::{Arena, Entity, EntityId, EntityKind, Facing};

/// RGBA color
pub type Color = [f32; 4];

/// One entity as the host needs it for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub facing: Facing,
    pub frame: u8,
    pub moving: bool,
    /// Remaining health (1.0 for entities without meaningful hp)
    pub hp_ratio: f32,
}

impl DrawItem {
    pub fn from_entity(entity: &Entity) -> Self {
        let hp_ratio = if entity.kind.is_enemy() || entity.kind == EntityKind::Hero {
            entity.hp_ratio()
        } else {
            1.0
        };
        Self {
            id: entity.id,
            kind: entity.kind,
            pos: entity.pos,
            size: entity.size,
            facing: entity.anim.facing,
            frame: entity.anim.frame,
            moving: entity.anim.moving,
            hp_ratio,
        }
    }

    /// Asset key for this item's sprite
    pub fn sprite_key(&self) -> &'static str {
        self.kind.as_str()
    }
}

/// Primitive fallback geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Rect {
        center: Vec2,
        size: Vec2,
        color: Color,
    },
    /// Horizontal bar filled left to right
    Bar {
        center: Vec2,
        width: f32,
        fill: f32,
        color: Color,
    },
}

/// Host drawing target
pub trait Surface {
    /// Draw the item's sprite; false if the asset is not available
    fn draw_sprite(&mut self, item: &DrawItem) -> bool;
    fn draw_shape(&mut self, shape: Shape);
}

/// Fallback color for a kind
pub fn kind_color(kind: EntityKind) -> Color {
    match kind {
        EntityKind::Hero => [0.3, 0.6, 1.0, 1.0],
        EntityKind::Mob => [0.9, 0.3, 0.3, 1.0],
        EntityKind::Elite => [0.9, 0.5, 0.1, 1.0],
        EntityKind::EliteRanged => [0.8, 0.3, 0.9, 1.0],
        EntityKind::Boss => [0.6, 0.0, 0.1, 1.0],
        EntityKind::XpGem => [0.2, 1.0, 0.5, 1.0],
        EntityKind::Projectile => [1.0, 1.0, 0.6, 1.0],
        EntityKind::EnemyProjectile => [1.0, 0.4, 0.6, 1.0],
    }
}

/// Primitive shape standing in for a missing sprite
pub fn fallback_shape(item: &DrawItem) -> Shape {
    let color = kind_color(item.kind);
    match item.kind {
        EntityKind::Hero | EntityKind::Elite | EntityKind::EliteRanged | EntityKind::Boss => {
            Shape::Rect {
                center: item.pos,
                size: item.size,
                color,
            }
        }
        _ => Shape::Circle {
            center: item.pos,
            radius: item.size.x.max(item.size.y) / 2.0,
            color,
        },
    }
}

fn health_bar(item: &DrawItem) -> Option<Shape> {
    let shows_bar = item.kind == EntityKind::Boss || (item.kind.is_enemy() && item.hp_ratio < 1.0);
    if !shows_bar {
        return None;
    }
    Some(Shape::Bar {
        center: item.pos - Vec2::new(0.0, item.size.y / 2.0 + 6.0),
        width: item.size.x,
        fill: item.hp_ratio.clamp(0.0, 1.0),
        color: [0.9, 0.1, 0.1, 1.0],
    })
}

/// Counts from one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub sprites: usize,
    pub fallbacks: usize,
}

/// Walks the arena and draws it, remembering which sprites were missing
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    missing: HashSet<&'static str>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw every entity. Works in any session phase (paused and terminal
    /// frames are drawn frozen).
    pub fn draw(&mut self, arena: &Arena, surface: &mut dyn Surface) -> RenderStats {
        let mut stats = RenderStats::default();
        for entity in arena.store.iter() {
            let item = DrawItem::from_entity(entity);
            if surface.draw_sprite(&item) {
                stats.sprites += 1;
            } else {
                let key = item.sprite_key();
                if self.missing.insert(key) {
                    log::warn!("Sprite '{}' unavailable, drawing fallback shape", key);
                }
                surface.draw_shape(fallback_shape(&item));
                stats.fallbacks += 1;
            }
            if let Some(bar) = health_bar(&item) {
                surface.draw_shape(bar);
            }
        }
        stats
    }
}

/// Surface with no assets that just counts draw calls (headless runs)
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    /// Sprite keys treated as loaded
    pub loaded: HashSet<&'static str>,
    pub sprite_calls: usize,
    pub shapes: Vec<Shape>,
}

impl HeadlessSurface {
    pub fn with_sprites(keys: &[&'static str]) -> Self {
        Self {
            loaded: keys.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Forget the previous frame's draw calls
    pub fn clear(&mut self) {
        self.sprite_calls = 0;
        self.shapes.clear();
    }
}

impl Surface for HeadlessSurface {
    fn draw_sprite(&mut self, item: &DrawItem) -> bool {
        if self.loaded.contains(item.sprite_key()) {
            self.sprite_calls += 1;
            true
        } else {
            false
        }
    }

    fn draw_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}
