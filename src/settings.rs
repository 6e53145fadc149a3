//! Player settings and preferences
//!
//! Persisted separately from session results as a small JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tuning::Tuning;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Multiplier on spawn intervals (larger = fewer enemies)
    pub fn spawn_interval_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.3,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.75,
        }
    }

    /// Multiplier on enemy hit points
    pub fn enemy_hp_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.4,
        }
    }
}

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === Input ===
    /// Analog stick deadzone
    pub gamepad_deadzone: f32,
    /// Mouse movement (px) needed to switch menus back to mouse mode
    pub mouse_jitter_px: f32,

    // === HUD ===
    /// Minimum time between published UI snapshots
    pub snapshot_interval_ms: f64,

    // === Audio ===
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            gamepad_deadzone: 0.2,
            mouse_jitter_px: 5.0,

            snapshot_interval_ms: 100.0,

            sound_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Balance table with the difficulty preset applied
    pub fn tuning(&self, base: &Tuning) -> Tuning {
        let mut tuning = base.clone();
        let spawn_scale = self.difficulty.spawn_interval_scale();
        tuning.spawn.base_interval_ticks *= spawn_scale;
        tuning.spawn.min_interval_ticks = (tuning.spawn.min_interval_ticks * spawn_scale).max(1.0);

        let hp_scale = self.difficulty.enemy_hp_scale();
        for profile in [
            &mut tuning.mob,
            &mut tuning.elite,
            &mut tuning.elite_ranged,
            &mut tuning.boss,
        ] {
            profile.hp = ((profile.hp as f32 * hp_scale).round() as i32).max(1);
        }
        tuning
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from disk, falling back to defaults when absent or unreadable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp values edited by hand back into range
    fn sanitize(&mut self) {
        self.gamepad_deadzone = self.gamepad_deadzone.clamp(0.0, 0.95);
        self.mouse_jitter_px = self.mouse_jitter_px.max(0.0);
        self.snapshot_interval_ms = self.snapshot_interval_ms.max(0.0);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
    }
}
