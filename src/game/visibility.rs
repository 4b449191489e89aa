//! # Visibility
//!
//! Point-to-point line of sight. A target is visible when every cell strictly
//! between observer and target on the raster line is transparent; the
//! endpoints themselves never block.

use crate::{raster_line, Cell, Grid, Level, Position};

/// Anything that can answer "does this cell let light through".
pub trait Transparency {
    /// Out-of-bounds positions are opaque.
    fn is_transparent_at(&self, pos: Position) -> bool;
}

impl Transparency for Grid<Cell> {
    fn is_transparent_at(&self, pos: Position) -> bool {
        self.get(pos).map(Cell::is_transparent).unwrap_or(false)
    }
}

impl Transparency for Grid<bool> {
    fn is_transparent_at(&self, pos: Position) -> bool {
        self.get(pos).copied().unwrap_or(false)
    }
}

impl Transparency for Level {
    fn is_transparent_at(&self, pos: Position) -> bool {
        self.grid.is_transparent_at(pos)
    }
}

/// Outcome of a line-of-sight query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visibility {
    /// Some intermediate cell is opaque
    Blocked,
    /// Observer and target share a cell
    SameCell,
    /// Clear line, carrying the Euclidean distance
    Visible(f64),
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        !matches!(self, Visibility::Blocked)
    }

    /// Distance to a visible target; a shared cell is distance zero.
    pub fn distance(self) -> Option<f64> {
        match self {
            Visibility::Blocked => None,
            Visibility::SameCell => Some(0.0),
            Visibility::Visible(distance) => Some(distance),
        }
    }

    /// Visible and strictly closer than `limit`.
    pub fn within(self, limit: f64) -> bool {
        self.distance().map(|d| d < limit).unwrap_or(false)
    }
}

/// Whether `target` can be seen from `observer`.
///
/// # Examples
///
/// ```
/// use delve::{visible, Grid, Position, Visibility};
///
/// let mut open = Grid::new_filled(5, 1, true);
/// let here = Position::new(0, 0);
/// assert_eq!(visible(&open, here, here), Visibility::SameCell);
/// assert_eq!(visible(&open, here, Position::new(4, 0)), Visibility::Visible(4.0));
///
/// open.set(Position::new(2, 0), false).unwrap();
/// assert_eq!(visible(&open, here, Position::new(4, 0)), Visibility::Blocked);
/// ```
pub fn visible(map: &impl Transparency, observer: Position, target: Position) -> Visibility {
    if observer == target {
        return Visibility::SameCell;
    }

    let line = raster_line(observer, target);
    let interior = &line[1..line.len() - 1];
    if interior.iter().all(|&pos| map.is_transparent_at(pos)) {
        Visibility::Visible(observer.euclidean_distance(target))
    } else {
        Visibility::Blocked
    }
}
