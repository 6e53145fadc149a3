//! UI snapshot publishing
//!
//! The arena is the single owner of game state. Anything displayed outside
//! the play field reads a copied snapshot, published on its own cadence so
//! UI refresh never has to keep pace with the tick rate.

use serde::{Deserialize, Serialize};

use super::state::{Arena, SessionResult};

/// Display-facing copy of the numbers a HUD needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSnapshot {
    pub hp: i32,
    pub max_hp: i32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub level: u32,
    pub elapsed_seconds: f32,
    pub projectile_count: u32,
    pub score: u64,
    pub paused: bool,
    pub result: SessionResult,
}

impl UiSnapshot {
    pub fn capture(arena: &Arena) -> Self {
        Self {
            hp: arena.stats.hp,
            max_hp: arena.stats.max_hp,
            xp: arena.stats.xp,
            xp_to_next_level: arena.stats.xp_to_next_level,
            level: arena.stats.level,
            elapsed_seconds: arena.session.elapsed_seconds,
            projectile_count: arena.stats.projectile_count,
            score: arena.score(),
            paused: arena.session.paused,
            result: arena.session.result,
        }
    }

    /// Pause or outcome differs; these publish immediately
    fn phase_changed(&self, other: &UiSnapshot) -> bool {
        self.paused != other.paused || self.result != other.result
    }
}

/// Throttles snapshot publication to a fixed wall-clock interval
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    interval_ms: f64,
    last_ms: Option<f64>,
    last: Option<UiSnapshot>,
}

impl SnapshotPublisher {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_ms: None,
            last: None,
        }
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Option<&UiSnapshot> {
        self.last.as_ref()
    }

    /// Publish a fresh snapshot if the interval has elapsed or the session
    /// changed phase; otherwise None
    pub fn publish(&mut self, arena: &Arena, now_ms: f64) -> Option<UiSnapshot> {
        let snapshot = UiSnapshot::capture(arena);
        let due = match (self.last_ms, &self.last) {
            (Some(last_ms), Some(last)) => {
                now_ms - last_ms >= self.interval_ms || snapshot.phase_changed(last)
            }
            _ => true,
        };
        if !due {
            return None;
        }
        self.last_ms = Some(now_ms);
        self.last = Some(snapshot.clone());
        Some(snapshot)
    }
}
