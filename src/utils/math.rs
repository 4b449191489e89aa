//! # Game Mathematics
//!
//! Discrete line rasterization shared by line-of-sight and projectile travel.

use crate::Position;

/// Bresenham raster line from `start` to `end`, both endpoints included.
///
/// Steep lines are stepped along the y axis. Endpoints are normalised so the
/// line is always stepped left to right, and the result is reversed when that
/// swapped them, so the points run from `start` to `end` and the same cells are
/// produced whichever endpoint comes first.
///
/// # Examples
///
/// ```
/// use delve::{raster_line, Position};
///
/// let line = raster_line(Position::new(0, 0), Position::new(3, 1));
/// assert_eq!(
///     line,
///     vec![
///         Position::new(0, 0),
///         Position::new(1, 0),
///         Position::new(2, 1),
///         Position::new(3, 1),
///     ]
/// );
/// ```
pub fn raster_line(start: Position, end: Position) -> Vec<Position> {
    let (mut x1, mut y1) = (start.x, start.y);
    let (mut x2, mut y2) = (end.x, end.y);

    let is_steep = (y2 - y1).abs() > (x2 - x1).abs();
    if is_steep {
        std::mem::swap(&mut x1, &mut y1);
        std::mem::swap(&mut x2, &mut y2);
    }

    let swapped = x1 > x2;
    if swapped {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
    }

    let dx = x2 - x1;
    let dy = (y2 - y1).abs();
    let ystep = if y1 < y2 { 1 } else { -1 };
    let mut error = dx / 2;
    let mut y = y1;

    let mut points = Vec::with_capacity(dx as usize + 1);
    for x in x1..=x2 {
        points.push(if is_steep {
            Position::new(y, x)
        } else {
            Position::new(x, y)
        });
        error -= dy;
        if error < 0 {
            y += ystep;
            error += dx;
        }
    }

    if swapped {
        points.reverse();
    }
    points
}
