//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, periodic behavior counted in ticks
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies beyond the injected traits

pub mod clock;
pub mod combat;
pub mod input;
pub mod movement;
pub mod progression;
pub mod session;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::{ArenaDriver, FrameOutput};
pub use input::{
    DeviceSnapshot, GamepadSnapshot, InputAggregator, InputMethod, InputProvider, Key,
    KeyboardState, MenuCursor, MenuEvent, MoveIntent, ScriptedInput,
};
pub use progression::{
    ChallengeQueue, Interstitial, UPGRADE_POOL, UpgradeEffect, UpgradeOption, VocabChallenge,
};
pub use session::SessionSummary;
pub use snapshot::{SnapshotPublisher, UiSnapshot};
pub use state::{
    Arena, Entity, EntityId, EntityKind, EntityStore, Facing, GameEvent, KillCounts, PlayerStats,
    SessionResult, SessionState, Tier,
};
pub use tick::{TickInput, tick};
