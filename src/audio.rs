//! Sound cue triggers
//!
//! The simulation never plays audio itself. Game events drained after each
//! frame map to `SoundCue`s, which are forwarded fire-and-forget to whatever
//! `AudioSink` the host provides. Each cue also carries a small procedural
//! recipe so a synth backend needs no sample files.

use crate::settings::Settings;
use crate::sim::state::{EntityKind, GameEvent, SessionResult};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Hero volley leaves
    Shoot,
    /// Mob or elite destroyed
    EnemyDown,
    /// Boss destroyed
    BossDown,
    /// Boss enters the arena
    BossAppears,
    /// Hero takes damage
    Hurt,
    /// XP gem collected
    Pickup,
    /// Level gate opened
    LevelGate,
    /// Upgrade applied
    LevelUp,
    /// Challenge answered wrong
    Wrong,
    Victory,
    Defeat,
}

/// Oscillator shape for a tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator voice: a frequency sweep under an exponential decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Seconds after the cue starts
    pub delay: f32,
    pub duration: f32,
    /// Peak gain before volume scaling
    pub gain: f32,
}

const fn tone(waveform: Waveform, start_hz: f32, end_hz: f32, delay: f32, duration: f32, gain: f32) -> Tone {
    Tone {
        waveform,
        start_hz,
        end_hz,
        delay,
        duration,
        gain,
    }
}

impl SoundCue {
    /// Cue for a game event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::EnemySpawned { .. } => None,
            GameEvent::BossSpawned => Some(SoundCue::BossAppears),
            GameEvent::PlayerFired { .. } => Some(SoundCue::Shoot),
            GameEvent::EnemyKilled { kind: EntityKind::Boss } => Some(SoundCue::BossDown),
            GameEvent::EnemyKilled { .. } => Some(SoundCue::EnemyDown),
            GameEvent::PlayerHit { .. } => Some(SoundCue::Hurt),
            GameEvent::GemCollected => Some(SoundCue::Pickup),
            GameEvent::LevelGate { .. } => Some(SoundCue::LevelGate),
            GameEvent::LevelUp { .. } => Some(SoundCue::LevelUp),
            GameEvent::ChallengeFailed => Some(SoundCue::Wrong),
            GameEvent::SessionEnded {
                result: SessionResult::Victory,
            } => Some(SoundCue::Victory),
            GameEvent::SessionEnded {
                result: SessionResult::Defeat,
            } => Some(SoundCue::Defeat),
            GameEvent::SessionEnded { .. } => None,
        }
    }

    /// Procedural recipe for this cue
    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundCue::Shoot => SHOOT,
            SoundCue::EnemyDown => ENEMY_DOWN,
            SoundCue::BossDown => BOSS_DOWN,
            SoundCue::BossAppears => BOSS_APPEARS,
            SoundCue::Hurt => HURT,
            SoundCue::Pickup => PICKUP,
            SoundCue::LevelGate => LEVEL_GATE,
            SoundCue::LevelUp => LEVEL_UP,
            SoundCue::Wrong => WRONG,
            SoundCue::Victory => VICTORY,
            SoundCue::Defeat => DEFEAT,
        }
    }
}

use Waveform::{Sawtooth, Sine, Square, Triangle};

const SHOOT: &[Tone] = &[tone(Square, 880.0, 440.0, 0.0, 0.06, 0.15)];
const ENEMY_DOWN: &[Tone] = &[
    tone(Sawtooth, 300.0, 80.0, 0.0, 0.12, 0.3),
    tone(Sine, 60.0, 40.0, 0.0, 0.1, 0.3),
];
const BOSS_DOWN: &[Tone] = &[
    tone(Sawtooth, 200.0, 30.0, 0.0, 0.8, 0.5),
    tone(Sine, 80.0, 20.0, 0.0, 1.0, 0.6),
    tone(Triangle, 523.0, 1046.0, 0.4, 0.6, 0.3),
];
const BOSS_APPEARS: &[Tone] = &[
    tone(Sawtooth, 60.0, 90.0, 0.0, 0.9, 0.5),
    tone(Square, 120.0, 110.0, 0.2, 0.7, 0.2),
];
const HURT: &[Tone] = &[tone(Square, 180.0, 90.0, 0.0, 0.15, 0.35)];
const PICKUP: &[Tone] = &[tone(Sine, 1200.0, 1800.0, 0.0, 0.08, 0.2)];
const LEVEL_GATE: &[Tone] = &[
    tone(Triangle, 523.0, 523.0, 0.0, 0.12, 0.3),
    tone(Triangle, 659.0, 659.0, 0.1, 0.12, 0.3),
    tone(Triangle, 784.0, 784.0, 0.2, 0.2, 0.3),
];
const LEVEL_UP: &[Tone] = &[tone(Sine, 440.0, 1320.0, 0.0, 0.35, 0.35)];
const WRONG: &[Tone] = &[tone(Square, 220.0, 110.0, 0.0, 0.3, 0.25)];
const VICTORY: &[Tone] = &[
    tone(Triangle, 523.0, 523.0, 0.0, 0.2, 0.4),
    tone(Triangle, 659.0, 659.0, 0.2, 0.2, 0.4),
    tone(Triangle, 784.0, 784.0, 0.4, 0.2, 0.4),
    tone(Triangle, 1046.0, 1046.0, 0.6, 0.5, 0.4),
];
const DEFEAT: &[Tone] = &[tone(Sawtooth, 300.0, 50.0, 0.0, 1.2, 0.4)];

/// Audio backend provided by the host
pub trait AudioSink {
    /// Start a cue at the given volume (0.0 - 1.0); never blocks
    fn play(&mut self, cue: SoundCue, volume: f32);
}

impl<F: FnMut(SoundCue, f32)> AudioSink for F {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        self(cue, volume)
    }
}

/// Silent backend
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue, _volume: f32) {}
}

/// Backend that only traces cues (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue, volume: f32) {
        log::trace!("cue {:?} at volume {:.2} ({} voices)", cue, volume, cue.tones().len());
    }
}

/// Volume control in front of an audio backend
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullAudio))
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Manager configured from player settings
    pub fn with_settings(sink: Box<dyn AudioSink>, settings: &Settings) -> Self {
        let mut manager = Self::new(sink);
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager.set_muted(!settings.sound_enabled);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a cue (dropped when muted)
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(cue, vol);
    }

    /// Forward cues for a batch of drained events; returns how many played
    pub fn handle_events(&mut self, events: &[GameEvent]) -> usize {
        let mut played = 0;
        for cue in events.iter().filter_map(SoundCue::for_event) {
            if self.effective_volume() > 0.0 {
                played += 1;
            }
            self.play(cue);
        }
        played
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording() -> (AudioManager, Rc<RefCell<Vec<(SoundCue, f32)>>>) {
        let played = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let played = Rc::clone(&played);
            move |cue: SoundCue, vol: f32| played.borrow_mut().push((cue, vol))
        };
        (AudioManager::new(Box::new(sink)), played)
    }

    #[test]
    fn test_events_map_to_cues() {
        assert_eq!(
            SoundCue::for_event(&GameEvent::EnemyKilled { kind: EntityKind::Boss }),
            Some(SoundCue::BossDown)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::EnemyKilled { kind: EntityKind::Mob }),
            Some(SoundCue::EnemyDown)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::EnemySpawned { kind: EntityKind::Mob }),
            None
        );
    }

    #[test]
    fn test_manager_scales_volume() {
        let (mut manager, played) = recording();
        manager.set_master_volume(0.5);
        manager.set_sfx_volume(0.5);
        manager.play(SoundCue::Pickup);
        assert_eq!(played.borrow().as_slice(), &[(SoundCue::Pickup, 0.25)]);
    }

    #[test]
    fn test_muted_manager_plays_nothing() {
        let (mut manager, played) = recording();
        manager.set_muted(true);
        let count = manager.handle_events(&[GameEvent::GemCollected, GameEvent::BossSpawned]);
        assert_eq!(count, 0);
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn test_handle_events_skips_silent_events() {
        let (mut manager, played) = recording();
        let count = manager.handle_events(&[
            GameEvent::EnemySpawned { kind: EntityKind::Elite },
            GameEvent::PlayerHit { damage: 10 },
        ]);
        assert_eq!(count, 1);
        assert_eq!(played.borrow()[0].0, SoundCue::Hurt);
    }

    #[test]
    fn test_recipes_are_static() {
        let victory: &'static [Tone] = SoundCue::Victory.tones();
        assert_eq!(victory.len(), 4);
        assert!(victory.windows(2).all(|w| w[0].delay < w[1].delay));
        assert_eq!(SoundCue::Shoot.tones()[0].waveform, Waveform::Square);
    }

    #[test]
    fn test_every_cue_has_a_recipe() {
        for cue in [
            SoundCue::Shoot,
            SoundCue::EnemyDown,
            SoundCue::BossDown,
            SoundCue::BossAppears,
            SoundCue::Hurt,
            SoundCue::Pickup,
            SoundCue::LevelGate,
            SoundCue::LevelUp,
            SoundCue::Wrong,
            SoundCue::Victory,
            SoundCue::Defeat,
        ] {
            assert!(!cue.tones().is_empty());
            assert!(cue.tones().iter().all(|t| t.duration > 0.0 && t.gain <= 1.0));
        }
    }
}
