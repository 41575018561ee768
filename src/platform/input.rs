//! Direction input: arrow keys / WASD and the on-screen joystick

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::JOYSTICK_MAX_DISTANCE;

/// Held direction keys (arrows and WASD share a slot)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    /// Each held key contributes ±1 on its axis (screen y grows downward)
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        dir
    }

    /// Map a browser `KeyboardEvent.key` / `code` to a key slot; returns
    /// false for keys we don't care about.
    pub fn set_key(&mut self, key: &str, down: bool) -> bool {
        match key {
            "ArrowUp" | "w" | "W" | "KeyW" => self.up = down,
            "ArrowDown" | "s" | "S" | "KeyS" => self.down = down,
            "ArrowLeft" | "a" | "A" | "KeyA" => self.left = down,
            "ArrowRight" | "d" | "D" | "KeyD" => self.right = down,
            _ => return false,
        }
        true
    }
}

/// Touch joystick output: each axis in [-1, 1], `active` while a finger is down
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JoystickInput {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

impl JoystickInput {
    /// Released stick
    pub fn idle() -> Self {
        Self::default()
    }

    /// Stick dragged from `base` to `pointer`; travel is clamped to `max_distance`
    pub fn from_drag(base: Vec2, pointer: Vec2, max_distance: f32) -> Self {
        let offset = pointer - base;
        let distance = offset.length();
        if distance <= 0.0 || max_distance <= 0.0 {
            return Self {
                x: 0.0,
                y: 0.0,
                active: true,
            };
        }
        let clamped = distance.min(max_distance);
        let v = offset / distance * (clamped / max_distance);
        Self {
            x: v.x,
            y: v.y,
            active: true,
        }
    }

    /// Drag using the default thumb travel
    pub fn from_default_drag(base: Vec2, pointer: Vec2) -> Self {
        Self::from_drag(base, pointer, JOYSTICK_MAX_DISTANCE)
    }

    #[inline]
    pub fn vector(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// The frame's direction: an active joystick fully overrides the keys
pub fn resolve_direction(keys: &KeyState, joystick: &JoystickInput) -> Vec2 {
    if joystick.active {
        joystick.vector()
    } else {
        keys.direction()
    }
}
