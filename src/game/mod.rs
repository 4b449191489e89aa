//! # Game Module
//!
//! Core simulation: grid storage, world cells, entities, visibility and the
//! tick-driven game state.
//!
//! This module contains the fundamental building blocks of Delve:
//! - Coordinates and colours
//! - The grid container and the two-layer cells stored in it
//! - Entities, actions, effects and monster behaviour
//! - Line-of-sight queries and fog-of-war memory

pub mod actions;
pub mod ai;
pub mod effects;
pub mod entities;
pub mod grid;
pub mod state;
pub mod visibility;
pub mod world;

pub use actions::*;
pub use ai::*;
pub use effects::*;
pub use entities::*;
pub use grid::*;
pub use state::*;
pub use visibility::*;
pub use world::*;

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use uuid::Uuid;

/// Represents a 2D coordinate in the game world.
///
/// Used both as a grid index and as a displacement.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos + Position::new(1, -1), Position::new(11, 4));
/// assert_eq!(-pos, Position::new(-10, -5));
/// assert_eq!(Position::new(-3, 7).div_floor(2), Position::new(-2, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Whether both components are zero.
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Component-wise floor division.
    pub fn div_floor(self, divisor: i32) -> Self {
        Self::new(self.x.div_euclid(divisor), self.y.div_euclid(divisor))
    }

    /// Calculates the Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Position {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<i32> for Position {
    type Output = Self;

    fn mul(self, scalar: i32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Mul for Position {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }
}

/// An opaque RGB colour handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREY: Rgb = Rgb(128, 128, 128);
    pub const BROWN: Rgb = Rgb(139, 90, 43);
    pub const ORANGE: Rgb = Rgb(255, 140, 0);
    pub const RED: Rgb = Rgb(220, 40, 40);
    pub const GREEN: Rgb = Rgb(60, 180, 75);
    pub const YELLOW: Rgb = Rgb(240, 220, 60);
    pub const PURPLE: Rgb = Rgb(150, 80, 200);
    pub const CYAN: Rgb = Rgb(70, 200, 220);
}

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_arithmetic() {
        let pos1 = Position::new(5, 10);
        let pos2 = Position::new(3, 2);
        assert_eq!(pos1 + pos2, Position::new(8, 12));
        assert_eq!(pos1 - pos2, Position::new(2, 8));
        assert_eq!(pos1 * 2, Position::new(10, 20));
        assert_eq!(pos1 * pos2, Position::new(15, 20));
        assert_eq!(-pos2, Position::new(-3, -2));

        let mut pos = pos1;
        pos += pos2;
        assert_eq!(pos, Position::new(8, 12));
    }

    #[test]
    fn test_position_floor_division() {
        assert_eq!(Position::new(7, 8).div_floor(2), Position::new(3, 4));
        assert_eq!(Position::new(-1, -4).div_floor(2), Position::new(-1, -2));
    }

    #[test]
    fn test_position_euclidean_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.euclidean_distance(pos2), 5.0);
        assert_eq!(pos1.manhattan_distance(pos2), 7);
    }

    #[test]
    fn test_entity_id_uniqueness() {
        let id1 = new_entity_id();
        let id2 = new_entity_id();
        assert_ne!(id1, id2);
    }
}
