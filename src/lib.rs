//! Vocab Arena - survival arena simulation with vocabulary-gated leveling
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, combat, progression)
//! - `render`: Drawable surface abstraction with primitive-shape fallback
//! - `audio`: Fire-and-forget sound cue triggers
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (input, cadence, difficulty)
//! - `highscores`: Results-screen leaderboard

pub mod audio;
pub mod error;
pub mod highscores;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ArenaError;
pub use highscores::HighScores;
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical simulation rate (one tick per display refresh)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Arena dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 960.0;
    pub const ARENA_HEIGHT: f32 = 640.0;

    /// How far outside an edge enemies appear
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// Projectiles are culled once this far outside the arena
    pub const CULL_MARGIN: f32 = 20.0;

    /// Hero sprite size
    pub const HERO_SIZE: f32 = 48.0;
    /// Gem sprite size
    pub const GEM_SIZE: f32 = 12.0;
    /// Projectile sprite size
    pub const PROJECTILE_SIZE: f32 = 10.0;

    /// Wall-clock cadence of the walk cycle (ms per frame)
    pub const ANIMATION_FRAME_MS: f64 = 120.0;
    /// Frames in the walk cycle
    pub const ANIMATION_FRAMES: u8 = 4;

    /// Score weights per enemy tier
    pub const SCORE_MOB: u64 = 1;
    pub const SCORE_ELITE: u64 = 10;
    pub const SCORE_BOSS: u64 = 100;
}

/// Unit vector pointing along `angle` (radians)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle (radians) of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
