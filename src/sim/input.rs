//! Input aggregation
//!
//! Device state is sampled once per frame through an injected
//! `InputProvider`, then folded into a gameplay movement vector and, while an
//! interstitial is open, into discrete menu-navigation events.

use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Facing;

/// Keys the arena listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Enter,
    Space,
    Escape,
}

/// Boolean key-down map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pressed: HashSet<Key>,
}

impl KeyboardState {
    pub fn with_keys(keys: &[Key]) -> Self {
        Self {
            pressed: keys.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn any_down(&self) -> bool {
        !self.pressed.is_empty()
    }

    /// Keys currently held
    pub fn held(&self) -> impl Iterator<Item = Key> + '_ {
        self.pressed.iter().copied()
    }

    fn axis(&self, negative: [Key; 2], positive: [Key; 2]) -> f32 {
        let neg = negative.iter().any(|k| self.is_down(*k));
        let pos = positive.iter().any(|k| self.is_down(*k));
        (pos as i32 - neg as i32) as f32
    }

    /// Screen-space direction (y grows downward)
    fn direction(&self) -> Vec2 {
        Vec2::new(
            self.axis([Key::Left, Key::A], [Key::Right, Key::D]),
            self.axis([Key::Up, Key::W], [Key::Down, Key::S]),
        )
    }
}

/// Polled state of one gamepad (standard mapping)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
}

impl GamepadSnapshot {
    pub const AXIS_LEFT_X: usize = 0;
    pub const AXIS_LEFT_Y: usize = 1;
    pub const BUTTON_SOUTH: usize = 0;
    pub const BUTTON_DPAD_UP: usize = 12;
    pub const BUTTON_DPAD_DOWN: usize = 13;
    pub const BUTTON_DPAD_LEFT: usize = 14;
    pub const BUTTON_DPAD_RIGHT: usize = 15;

    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Left stick with the deadzone applied per axis
    fn stick(&self, deadzone: f32) -> Vec2 {
        let dz = |v: f32| if v.abs() < deadzone { 0.0 } else { v };
        Vec2::new(dz(self.axis(Self::AXIS_LEFT_X)), dz(self.axis(Self::AXIS_LEFT_Y)))
    }

    fn dpad(&self) -> Vec2 {
        let axis = |neg: usize, pos: usize| (self.button(pos) as i32 - self.button(neg) as i32) as f32;
        Vec2::new(
            axis(Self::BUTTON_DPAD_LEFT, Self::BUTTON_DPAD_RIGHT),
            axis(Self::BUTTON_DPAD_UP, Self::BUTTON_DPAD_DOWN),
        )
    }

    /// Movement contribution (stick plus d-pad)
    fn movement(&self, deadzone: f32) -> Vec2 {
        self.stick(deadzone) + self.dpad()
    }

    fn is_active(&self, deadzone: f32) -> bool {
        self.buttons.iter().any(|b| *b) || self.stick(deadzone) != Vec2::ZERO
    }
}

/// Everything sampled from devices for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub keyboard: KeyboardState,
    pub gamepads: Vec<GamepadSnapshot>,
    /// Latest pointer position, if the pointer reported one
    pub mouse_pos: Option<Vec2>,
}

impl DeviceSnapshot {
    pub fn keys(keys: &[Key]) -> Self {
        Self {
            keyboard: KeyboardState::with_keys(keys),
            ..Default::default()
        }
    }

    pub fn stick(x: f32, y: f32) -> Self {
        Self {
            gamepads: vec![GamepadSnapshot {
                axes: vec![x, y],
                buttons: Vec::new(),
            }],
            ..Default::default()
        }
    }

    /// The pad whose state drives the arena
    fn primary_pad(&self) -> Option<&GamepadSnapshot> {
        self.gamepads.first()
    }
}

/// Source of device state, sampled by the frame driver
pub trait InputProvider {
    fn sample(&mut self) -> DeviceSnapshot;

    /// Forget held input (called when gameplay pauses)
    fn clear(&mut self) {}
}

impl<F: FnMut() -> DeviceSnapshot> InputProvider for F {
    fn sample(&mut self) -> DeviceSnapshot {
        self()
    }
}

/// Replays a fixed sequence of snapshots, then reports idle devices
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<DeviceSnapshot>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = DeviceSnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

}

impl InputProvider for ScriptedInput {
    fn sample(&mut self) -> DeviceSnapshot {
        self.frames.pop_front().unwrap_or_default()
    }
}

/// Which device family the menus should present hints for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMethod {
    #[default]
    Mouse,
    Gamepad,
}

/// Gameplay movement request for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveIntent {
    /// Sum of keyboard and gamepad contributions (not yet normalized)
    pub vector: Vec2,
    /// None when there is no movement
    pub facing: Option<Facing>,
}

/// Discrete menu navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuEvent {
    Up,
    Down,
    Left,
    Right,
    Confirm,
}

/// Stick deflection needed to count as a menu step
const MENU_STICK_THRESHOLD: f32 = 0.5;

/// Facing from the dominant axis; ties favor horizontal
pub fn facing_for(vector: Vec2) -> Option<Facing> {
    if vector == Vec2::ZERO {
        return None;
    }
    Some(if vector.x.abs() >= vector.y.abs() {
        if vector.x < 0.0 { Facing::Left } else { Facing::Right }
    } else if vector.y < 0.0 {
        Facing::Up
    } else {
        Facing::Down
    })
}

/// Folds device snapshots into movement, menu events and input-method tracking
#[derive(Debug, Clone)]
pub struct InputAggregator {
    deadzone: f32,
    mouse_jitter: f32,
    active_method: InputMethod,
    last_mouse: Option<Vec2>,
    held_menu: HashSet<MenuEvent>,
    /// Keys held across a pause, ignored for movement until released
    latched_keys: HashSet<Key>,
    /// Pad movement held across a pause, ignored until it returns to rest
    latched_pad: bool,
}

impl InputAggregator {
    pub fn new(deadzone: f32, mouse_jitter: f32) -> Self {
        Self {
            deadzone,
            mouse_jitter,
            active_method: InputMethod::default(),
            last_mouse: None,
            held_menu: HashSet::new(),
            latched_keys: HashSet::new(),
            latched_pad: false,
        }
    }

    pub fn active_method(&self) -> InputMethod {
        self.active_method
    }

    /// Movement vector for gameplay. Input latched by `latch_gameplay`
    /// contributes nothing until it has been released once.
    pub fn movement(&mut self, snapshot: &DeviceSnapshot) -> MoveIntent {
        self.latched_keys.retain(|k| snapshot.keyboard.is_down(*k));
        let mut keyboard = snapshot.keyboard.clone();
        for key in &self.latched_keys {
            keyboard.release(*key);
        }
        let mut vector = keyboard.direction();

        if let Some(pad) = snapshot.primary_pad() {
            let pad_vector = pad.movement(self.deadzone);
            if pad_vector == Vec2::ZERO {
                self.latched_pad = false;
            }
            if !self.latched_pad {
                vector += pad_vector;
            }
        } else {
            self.latched_pad = false;
        }
        MoveIntent {
            vector,
            facing: facing_for(vector),
        }
    }

    /// Update the active input method from this frame's activity
    pub fn observe(&mut self, snapshot: &DeviceSnapshot) -> InputMethod {
        if let Some(pos) = snapshot.mouse_pos {
            if let Some(last) = self.last_mouse {
                if last.distance(pos) > self.mouse_jitter {
                    self.active_method = InputMethod::Mouse;
                }
            }
            self.last_mouse = Some(pos);
        }

        let pad_active = snapshot.gamepads.iter().any(|p| p.is_active(self.deadzone));
        if snapshot.keyboard.any_down() || pad_active {
            if self.active_method != InputMethod::Gamepad {
                log::debug!("Input method -> gamepad/keyboard");
            }
            self.active_method = InputMethod::Gamepad;
        }
        self.active_method
    }

    /// Edge-triggered menu steps: each held direction fires once per press
    pub fn menu_events(&mut self, snapshot: &DeviceSnapshot) -> Vec<MenuEvent> {
        let held = self.menu_held(snapshot);
        let events: Vec<MenuEvent> = [
            MenuEvent::Up,
            MenuEvent::Down,
            MenuEvent::Left,
            MenuEvent::Right,
            MenuEvent::Confirm,
        ]
        .into_iter()
        .filter(|e| held.contains(e) && !self.held_menu.contains(e))
        .collect();
        self.held_menu = held;
        events
    }

    fn menu_held(&self, snapshot: &DeviceSnapshot) -> HashSet<MenuEvent> {
        let mut held = HashSet::new();
        let mut dir = snapshot.keyboard.direction();
        if let Some(pad) = snapshot.primary_pad() {
            dir += pad.dpad();
            let stick = pad.stick(self.deadzone);
            if stick.x.abs() >= MENU_STICK_THRESHOLD {
                dir.x += stick.x.signum();
            }
            if stick.y.abs() >= MENU_STICK_THRESHOLD {
                dir.y += stick.y.signum();
            }
            if pad.button(GamepadSnapshot::BUTTON_SOUTH) {
                held.insert(MenuEvent::Confirm);
            }
        }
        if dir.x < 0.0 {
            held.insert(MenuEvent::Left);
        } else if dir.x > 0.0 {
            held.insert(MenuEvent::Right);
        }
        if dir.y < 0.0 {
            held.insert(MenuEvent::Up);
        } else if dir.y > 0.0 {
            held.insert(MenuEvent::Down);
        }
        if snapshot.keyboard.is_down(Key::Enter) || snapshot.keyboard.is_down(Key::Space) {
            held.insert(MenuEvent::Confirm);
        }
        held
    }

    /// Clear gameplay input: everything held now stops driving movement
    /// until it is released. Called on every paused frame.
    pub fn latch_gameplay(&mut self, snapshot: &DeviceSnapshot) {
        self.latched_keys.extend(snapshot.keyboard.held());
        if let Some(pad) = snapshot.primary_pad() {
            self.latched_pad |= pad.movement(self.deadzone) != Vec2::ZERO;
        }
    }

    /// Forget held menu buttons so the next press registers fresh
    pub fn reset(&mut self) {
        self.held_menu.clear();
    }

    /// Treat everything currently held as already pressed, so keys carried
    /// over from gameplay do not fire menu steps
    pub fn prime_menu(&mut self, snapshot: &DeviceSnapshot) {
        self.held_menu = self.menu_held(snapshot);
    }
}

/// Cursor over a linear list (`columns == 1`) or a grid of options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCursor {
    pub index: usize,
    pub len: usize,
    pub columns: usize,
}

impl MenuCursor {
    pub fn list(len: usize) -> Self {
        Self::grid(len, 1)
    }

    pub fn grid(len: usize, columns: usize) -> Self {
        Self {
            index: 0,
            len,
            columns: columns.max(1),
        }
    }

    /// Move the cursor; returns the selected index on confirm
    pub fn apply(&mut self, event: MenuEvent) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let prev = (self.index + self.len - 1) % self.len;
        let next = (self.index + 1) % self.len;
        match (event, self.columns) {
            (MenuEvent::Confirm, _) => return Some(self.index),
            (MenuEvent::Up, 1) | (MenuEvent::Left, _) => self.index = prev,
            (MenuEvent::Down, 1) | (MenuEvent::Right, _) => self.index = next,
            (MenuEvent::Up, cols) => {
                if self.index >= cols {
                    self.index -= cols;
                }
            }
            (MenuEvent::Down, cols) => {
                if self.index + cols < self.len {
                    self.index += cols;
                }
            }
        }
        None
    }
}
