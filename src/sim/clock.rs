//! Frame driver
//!
//! One `frame` call per display refresh: sample input, advance the arena by a
//! single tick unless an interstitial or a terminal result holds it, then
//! forward sound cues, draw, and publish the UI snapshot. Drawing happens on
//! every frame, paused or not.

use super::input::{InputAggregator, InputMethod, InputProvider, MenuCursor, MenuEvent};
use super::progression::{Interstitial, VocabChallenge};
use super::session::SessionSummary;
use super::snapshot::{SnapshotPublisher, UiSnapshot};
use super::state::{Arena, GameEvent};
use super::tick::{TickInput, tick};
use crate::audio::AudioManager;
use crate::error::Result;
use crate::render::{RenderStats, Renderer, Surface};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Everything a host needs from one frame
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Whether the simulation advanced this frame
    pub advanced: bool,
    /// Menu steps produced while an interstitial was open
    pub menu_events: Vec<MenuEvent>,
    /// Highlighted upgrade while the upgrade menu is open
    pub upgrade_cursor: Option<usize>,
    /// Upgrade id confirmed from the menu this frame
    pub chosen_upgrade: Option<&'static str>,
    pub events: Vec<GameEvent>,
    pub render: RenderStats,
    /// Present only when a snapshot was published this frame
    pub snapshot: Option<UiSnapshot>,
    pub input_method: InputMethod,
}

/// Owns the arena and drives it from an injected input provider
pub struct ArenaDriver<P: InputProvider> {
    arena: Arena,
    provider: P,
    aggregator: InputAggregator,
    renderer: Renderer,
    audio: AudioManager,
    publisher: SnapshotPublisher,
    upgrade_cursor: Option<MenuCursor>,
    was_paused: bool,
}

impl<P: InputProvider> ArenaDriver<P> {
    pub fn new(arena: Arena, provider: P, settings: &Settings, audio: AudioManager) -> Self {
        Self {
            arena,
            provider,
            aggregator: InputAggregator::new(settings.gamepad_deadzone, settings.mouse_jitter_px),
            renderer: Renderer::new(),
            audio,
            publisher: SnapshotPublisher::new(settings.snapshot_interval_ms),
            upgrade_cursor: None,
            was_paused: false,
        }
    }

    /// Start a fresh session with the settings' difficulty applied
    pub fn start(
        seed: u64,
        base: &Tuning,
        settings: &Settings,
        challenges: Vec<VocabChallenge>,
        provider: P,
        audio: AudioManager,
    ) -> Result<Self> {
        let tuning = settings.tuning(base);
        tuning.validate()?;
        log::info!("Starting {} session", settings.difficulty.as_str());
        let arena = Arena::new(seed, tuning, challenges);
        Ok(Self::new(arena, provider, settings, audio))
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access for collaborators (challenge results, enrichment)
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn latest_snapshot(&self) -> Option<&UiSnapshot> {
        self.publisher.latest()
    }

    /// Run one display frame
    pub fn frame(&mut self, now_ms: f64, surface: &mut dyn Surface) -> FrameOutput {
        let devices = self.provider.sample();
        let input_method = self.aggregator.observe(&devices);

        let mut output = FrameOutput {
            input_method,
            ..Default::default()
        };

        if self.arena.is_running() {
            let input = TickInput {
                movement: self.aggregator.movement(&devices),
                now_ms,
            };
            output.advanced = tick(&mut self.arena, &input);
        } else if self.arena.session.paused && self.was_paused {
            output.menu_events = self.aggregator.menu_events(&devices);
            output.chosen_upgrade = self.navigate_upgrades(&output.menu_events);
        }

        let paused = self.arena.session.paused;
        if paused && !self.was_paused {
            // Gameplay input held into the gate must not leak into menus
            self.provider.clear();
            self.aggregator.reset();
            self.aggregator.prime_menu(&devices);
        }
        if paused {
            self.aggregator.latch_gameplay(&devices);
        }
        self.was_paused = paused;
        self.sync_upgrade_cursor();
        output.upgrade_cursor = self.upgrade_cursor.map(|c| c.index);

        output.events = self.arena.drain_events();
        self.audio.handle_events(&output.events);
        output.render = self.renderer.draw(&self.arena, surface);
        output.snapshot = self.publisher.publish(&self.arena, now_ms);
        output
    }

    /// Move the upgrade cursor and apply a confirmed choice
    fn navigate_upgrades(&mut self, events: &[MenuEvent]) -> Option<&'static str> {
        let options = match self.arena.pending_interstitial() {
            Some(Interstitial::UpgradeChoice { options }) => options.clone(),
            _ => return None,
        };
        let cursor = self
            .upgrade_cursor
            .get_or_insert_with(|| MenuCursor::list(options.len()));

        let confirmed = events.iter().find_map(|e| cursor.apply(*e))?;
        let option = options.get(confirmed)?;
        match self.arena.choose_upgrade(option.id) {
            Ok(()) => Some(option.id),
            Err(e) => {
                log::warn!("Upgrade menu selection rejected: {}", e);
                None
            }
        }
    }

    /// Open a cursor when the upgrade menu appears, drop it when it closes
    fn sync_upgrade_cursor(&mut self) {
        match self.arena.pending_interstitial() {
            Some(Interstitial::UpgradeChoice { options }) => {
                if self.upgrade_cursor.map(|c| c.len) != Some(options.len()) {
                    self.upgrade_cursor = Some(MenuCursor::list(options.len()));
                }
            }
            _ => self.upgrade_cursor = None,
        }
    }

    /// Report the collaborator's verdict on the pending challenge
    pub fn resolve_challenge(&mut self, correct: bool) -> Result<()> {
        self.arena.resolve_challenge(correct)
    }

    /// Pick an upgrade by id (pointer-driven menus)
    pub fn choose_upgrade(&mut self, id: &str) -> Result<()> {
        self.arena.choose_upgrade(id)
    }

    /// Leave the arena: the input provider is dropped, the arena discarded,
    /// and the summary returned if the session reached a result
    pub fn stop(self) -> Option<SessionSummary> {
        let summary = self.arena.final_summary();
        log::info!(
            "Arena driver stopped at tick {} ({})",
            self.arena.time_ticks,
            if summary.is_some() { "finished" } else { "abandoned" }
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullAudio, SoundCue};
    use crate::render::HeadlessSurface;
    use crate::sim::input::{DeviceSnapshot, Key, ScriptedInput};
    use crate::sim::state::{EntityKind, SessionResult};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn driver(frames: Vec<DeviceSnapshot>, words: usize) -> ArenaDriver<ScriptedInput> {
        let challenges = (0..words)
            .map(|i| VocabChallenge::new(format!("w{}", i)))
            .collect();
        ArenaDriver::start(
            42,
            &Tuning::default(),
            &Settings::default(),
            challenges,
            ScriptedInput::new(frames),
            AudioManager::new(Box::new(NullAudio)),
        )
        .expect("valid tuning")
    }

    fn open_gate(driver: &mut ArenaDriver<ScriptedInput>) {
        let arena = driver.arena_mut();
        arena.stats.xp = arena.stats.xp_to_next_level - arena.tuning.xp_per_gem;
        let hero = arena.store.hero.pos;
        arena.store.spawn_gem(hero);
    }

    #[test]
    fn test_frame_moves_hero_from_scripted_keys() {
        let mut driver = driver(vec![DeviceSnapshot::keys(&[Key::D]); 10], 2);
        let mut surface = HeadlessSurface::default();
        let start = driver.arena().store.hero.pos;
        for i in 0..10 {
            let out = driver.frame(i as f64 * 16.0, &mut surface);
            assert!(out.advanced);
        }
        let end = driver.arena().store.hero.pos;
        assert!((end.x - start.x - 30.0).abs() < 1e-3);
        assert_eq!(end.y, start.y);
    }

    #[test]
    fn test_paused_frames_render_without_ticking() {
        let mut driver = driver(Vec::new(), 2);
        let mut surface = HeadlessSurface::default();
        open_gate(&mut driver);
        driver.frame(0.0, &mut surface);
        assert!(driver.arena().session.paused);

        let ticks = driver.arena().time_ticks;
        surface.clear();
        let out = driver.frame(16.0, &mut surface);
        assert!(!out.advanced);
        assert_eq!(driver.arena().time_ticks, ticks);
        assert!(out.render.fallbacks > 0, "paused frame still draws");
    }

    #[test]
    fn test_keys_held_into_gate_do_not_step_menu() {
        let held = DeviceSnapshot::keys(&[Key::Right]);
        let mut driver = driver(vec![held.clone(); 4], 0);
        let mut surface = HeadlessSurface::default();
        open_gate(&mut driver);

        driver.frame(0.0, &mut surface);
        assert!(matches!(
            driver.arena().pending_interstitial(),
            Some(Interstitial::UpgradeChoice { .. })
        ));
        let out = driver.frame(16.0, &mut surface);
        assert!(out.menu_events.is_empty());
        assert_eq!(out.upgrade_cursor, Some(0));
    }

    #[test]
    fn test_movement_held_through_gate_is_cleared() {
        let held = DeviceSnapshot::keys(&[Key::D]);
        let frames = vec![
            held.clone(),
            held.clone(),
            held.clone(),
            DeviceSnapshot::default(),
            held,
        ];
        let mut driver = driver(frames, 1);
        let mut surface = HeadlessSurface::default();
        open_gate(&mut driver);

        driver.frame(0.0, &mut surface);
        assert!(matches!(
            driver.arena().pending_interstitial(),
            Some(Interstitial::Challenge(_))
        ));
        driver.frame(16.0, &mut surface);
        driver.resolve_challenge(false).expect("challenge pending");
        assert!(driver.arena().is_running());

        let before = driver.arena().store.hero.pos;
        let out = driver.frame(32.0, &mut surface);
        assert!(out.advanced);
        assert_eq!(driver.arena().store.hero.pos, before, "held key ignored after resume");

        driver.frame(48.0, &mut surface);
        let before = driver.arena().store.hero.pos;
        driver.frame(64.0, &mut surface);
        assert!(driver.arena().store.hero.pos.x > before.x, "fresh press moves again");
    }

    #[test]
    fn test_upgrade_menu_navigation_applies_choice() {
        let frames = vec![
            DeviceSnapshot::default(),
            DeviceSnapshot::default(),
            DeviceSnapshot::keys(&[Key::Down]),
            DeviceSnapshot::default(),
            DeviceSnapshot::keys(&[Key::Enter]),
        ];
        let mut driver = driver(frames, 0);
        let mut surface = HeadlessSurface::default();
        open_gate(&mut driver);

        driver.frame(0.0, &mut surface);
        let options = match driver.arena().pending_interstitial() {
            Some(Interstitial::UpgradeChoice { options }) => options.clone(),
            other => panic!("expected upgrade choice, got {:?}", other),
        };
        driver.frame(16.0, &mut surface);
        let out = driver.frame(32.0, &mut surface);
        assert_eq!(out.menu_events, vec![MenuEvent::Down]);
        assert_eq!(out.upgrade_cursor, Some(1));
        driver.frame(48.0, &mut surface);

        let out = driver.frame(64.0, &mut surface);
        assert_eq!(out.chosen_upgrade, Some(options[1].id));
        assert!(!driver.arena().session.paused);
        assert_eq!(driver.arena().stats.level, 2);
        assert!(out.events.contains(&GameEvent::LevelUp { level: 2 }));
        assert_eq!(out.upgrade_cursor, None);
    }

    #[test]
    fn test_challenge_menu_events_are_forwarded() {
        let frames = vec![
            DeviceSnapshot::default(),
            DeviceSnapshot::keys(&[Key::Enter]),
        ];
        let mut driver = driver(frames, 1);
        let mut surface = HeadlessSurface::default();
        open_gate(&mut driver);
        driver.frame(0.0, &mut surface);
        let out = driver.frame(16.0, &mut surface);
        assert_eq!(out.menu_events, vec![MenuEvent::Confirm]);
        assert_eq!(out.chosen_upgrade, None);

        driver.resolve_challenge(true).expect("challenge pending");
        assert!(matches!(
            driver.arena().pending_interstitial(),
            Some(Interstitial::UpgradeChoice { .. })
        ));
    }

    #[test]
    fn test_events_reach_audio() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let played = Rc::clone(&played);
            move |cue: SoundCue, _vol: f32| played.borrow_mut().push(cue)
        };
        let arena = Arena::new(3, Tuning::default(), Vec::new());
        let mut driver = ArenaDriver::new(
            arena,
            ScriptedInput::new(Vec::new()),
            &Settings::default(),
            AudioManager::new(Box::new(sink)),
        );
        let hero = driver.arena().store.hero.pos;
        driver.arena_mut().store.spawn_gem(hero);

        let mut surface = HeadlessSurface::default();
        driver.frame(0.0, &mut surface);
        assert!(played.borrow().contains(&SoundCue::Pickup));
    }

    #[test]
    fn test_stop_returns_summary_only_when_finished() {
        let driver_a = driver(Vec::new(), 1);
        assert!(driver_a.stop().is_none());

        let mut driver_b = driver(Vec::new(), 1);
        let tuning = driver_b.arena().tuning.clone();
        let hero = driver_b.arena().store.hero.pos;
        {
            let arena = driver_b.arena_mut();
            arena.stats.hp = 1;
            arena.store.spawn_enemy(EntityKind::Mob, &tuning.mob, hero);
        }
        let mut surface = HeadlessSurface::default();
        let out = driver_b.frame(0.0, &mut surface);
        assert_eq!(out.snapshot.map(|s| s.result), Some(SessionResult::Defeat));

        let out = driver_b.frame(16.0, &mut surface);
        assert!(!out.advanced);
        let summary = driver_b.stop().expect("finished");
        assert_eq!(summary.result, SessionResult::Defeat);
        assert_eq!(summary.seed, 42);
    }

    #[test]
    fn test_stick_and_keys_share_movement() {
        let mut snapshot = DeviceSnapshot::stick(0.0, 1.0);
        snapshot.keyboard.press(Key::D);
        let mut driver = driver(vec![snapshot], 1);
        let mut surface = HeadlessSurface::default();
        let start = driver.arena().store.hero.pos;
        let out = driver.frame(0.0, &mut surface);
        assert_eq!(out.input_method, InputMethod::Gamepad);
        let moved = driver.arena().store.hero.pos - start;
        let expected = Vec2::new(1.0, 1.0).normalize() * driver.arena().stats.speed;
        assert!((moved - expected).length() < 1e-3);
    }
}
