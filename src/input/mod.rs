//! # Input Module
//!
//! Keyboard state sampling and its translation into a player velocity.
//!
//! Input is sampled, not queued: each tick the host reads which keys are held
//! into a [`Keypresses`] set, and the simulation derives the player's
//! velocity from that set on the player's turn.

use crate::Position;
use macroquad::prelude::{is_key_down, KeyCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Logical keys the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKey {
    Up,
    Down,
    Left,
    Right,
    Quit,
}

/// How held direction keys combine into a velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Horizontal wins when both axes are held
    FourWay,
    /// Both axes combine into diagonal steps
    #[default]
    EightWay,
}

/// Keys held down during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keypresses {
    held: HashSet<GameKey>,
}

impl Keypresses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a key set from a list of held keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GameKey, Keypresses, MovementMode, Position};
    ///
    /// let keys = Keypresses::with(&[GameKey::Right, GameKey::Up]);
    /// assert_eq!(keys.velocity(MovementMode::EightWay), Position::new(1, -1));
    /// assert_eq!(keys.velocity(MovementMode::FourWay), Position::new(1, 0));
    /// ```
    pub fn with(keys: &[GameKey]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, key: GameKey) {
        self.held.insert(key);
    }

    /// Adds every key held in `other`.
    pub fn merge(&mut self, other: &Keypresses) {
        self.held.extend(other.held.iter().copied());
    }

    pub fn is_down(&self, key: GameKey) -> bool {
        self.held.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn quit_requested(&self) -> bool {
        self.is_down(GameKey::Quit)
    }

    /// Velocity requested by the held direction keys. Opposite keys cancel.
    pub fn velocity(&self, mode: MovementMode) -> Position {
        let axis = |positive: GameKey, negative: GameKey| {
            self.is_down(positive) as i32 - self.is_down(negative) as i32
        };
        let dx = axis(GameKey::Right, GameKey::Left);
        let dy = axis(GameKey::Down, GameKey::Up);

        match mode {
            MovementMode::FourWay if dx != 0 => Position::new(dx, 0),
            _ => Position::new(dx, dy),
        }
    }
}

/// Samples the macroquad keyboard.
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl, yubn diagonals)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Reads the keys currently held down.
    pub fn poll(&self) -> Keypresses {
        let mut keys = Keypresses::new();
        for (code, key) in Self::bindings() {
            if is_key_down(*code) {
                keys.press(*key);
            }
        }

        if self.vi_keys_enabled {
            for (code, held) in Self::vi_bindings() {
                if is_key_down(*code) {
                    for key in *held {
                        keys.press(*key);
                    }
                }
            }
        }

        keys
    }

    fn bindings() -> &'static [(KeyCode, GameKey)] {
        &[
            (KeyCode::Up, GameKey::Up),
            (KeyCode::W, GameKey::Up),
            (KeyCode::Down, GameKey::Down),
            (KeyCode::S, GameKey::Down),
            (KeyCode::Left, GameKey::Left),
            (KeyCode::A, GameKey::Left),
            (KeyCode::Right, GameKey::Right),
            (KeyCode::D, GameKey::Right),
            (KeyCode::Escape, GameKey::Quit),
            (KeyCode::Q, GameKey::Quit),
        ]
    }

    fn vi_bindings() -> &'static [(KeyCode, &'static [GameKey])] {
        &[
            (KeyCode::H, &[GameKey::Left]),
            (KeyCode::J, &[GameKey::Down]),
            (KeyCode::K, &[GameKey::Up]),
            (KeyCode::L, &[GameKey::Right]),
            (KeyCode::Y, &[GameKey::Up, GameKey::Left]),
            (KeyCode::U, &[GameKey::Up, GameKey::Right]),
            (KeyCode::B, &[GameKey::Down, GameKey::Left]),
            (KeyCode::N, &[GameKey::Down, GameKey::Right]),
        ]
    }
}
