//! # Grid
//!
//! Fixed-size, row-major 2D storage addressed by [`Position`].
//!
//! Point reads come in two flavours: [`Grid::get`] returns `None` outside the
//! declared bounds, while indexing with `grid[pos]` treats an out-of-bounds
//! position as a programmer error and panics. Camera views use
//! [`Grid::window`], which wraps both axes with modular arithmetic so a
//! viewport centred near an edge continues on the opposite side.

use crate::{DelveError, DelveResult, Position};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Owning 2D container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn new_filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; (width * height) as usize],
        }
    }

    /// Copies a `width` x `height` camera window whose top-left corner is
    /// `origin`, wrapping around both axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Grid, Position};
    ///
    /// let grid = Grid::from_fn(4, 1, |pos| pos.x);
    /// let view = grid.window(Position::new(-1, 0), 3, 1);
    /// assert_eq!(view.iter().map(|(_, v)| *v).collect::<Vec<_>>(), vec![3, 0, 1]);
    /// ```
    pub fn window(&self, origin: Position, width: u32, height: u32) -> Grid<T> {
        self.window_map(origin, width, height, |_, value| value.clone())
    }
}

impl<T> Grid<T> {
    /// Creates a grid by evaluating `f` at every position, row by row.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(Position) -> T) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                cells.push(f(Position::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the position lies inside the declared bounds.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Reads the cell at `pos`.
    pub fn get(&self, pos: Position) -> Option<&T> {
        self.index_of(pos).map(|index| &self.cells[index])
    }

    /// Mutably borrows the cell at `pos`.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        self.index_of(pos).map(move |index| &mut self.cells[index])
    }

    /// Replaces the cell at `pos`.
    pub fn set(&mut self, pos: Position, value: T) -> DelveResult<()> {
        let cell = self
            .get_mut(pos)
            .ok_or(DelveError::OutOfBounds { position: pos })?;
        *cell = value;
        Ok(())
    }

    /// Maps `pos` onto the grid by wrapping both axes.
    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(
            pos.x.rem_euclid(self.width as i32),
            pos.y.rem_euclid(self.height as i32),
        )
    }

    /// Builds a wrapped camera window, handing each source position and cell
    /// to `f`.
    pub fn window_map<U>(
        &self,
        origin: Position,
        width: u32,
        height: u32,
        mut f: impl FnMut(Position, &T) -> U,
    ) -> Grid<U> {
        Grid::from_fn(width, height, |offset| {
            let source = self.wrap(origin + offset);
            f(source, &self[source])
        })
    }

    /// Iterates over every cell with its position, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(index, value)| {
            (
                Position::new((index % width) as i32, (index / width) as i32),
                value,
            )
        })
    }

    /// Iterates over every cell mutably with its position, row by row.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Position, &mut T)> + '_ {
        let width = self.width as usize;
        self.cells.iter_mut().enumerate().map(move |(index, value)| {
            (
                Position::new((index % width) as i32, (index / width) as i32),
                value,
            )
        })
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        match self.index_of(pos) {
            Some(index) => &self.cells[index],
            None => panic!(
                "grid read at ({}, {}) outside {}x{}",
                pos.x, pos.y, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        match self.index_of(pos) {
            Some(index) => &mut self.cells[index],
            None => panic!(
                "grid write at ({}, {}) outside {}x{}",
                pos.x, pos.y, self.width, self.height
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> Grid<i32> {
        Grid::from_fn(width, height, |pos| pos.y * 10 + pos.x)
    }

    #[test]
    fn test_point_access() {
        let mut grid = numbered(4, 3);
        assert_eq!(grid.get(Position::new(2, 1)), Some(&12));
        assert_eq!(grid[Position::new(3, 2)], 23);
        assert!(grid.get(Position::new(4, 0)).is_none());
        assert!(grid.get(Position::new(0, -1)).is_none());

        grid.set(Position::new(0, 0), 99).unwrap();
        assert_eq!(grid[Position::new(0, 0)], 99);
    }

    #[test]
    fn test_out_of_bounds_write_is_rejected() {
        let mut grid = numbered(4, 3);
        let result = grid.set(Position::new(4, 3), 1);
        assert!(matches!(
            result,
            Err(DelveError::OutOfBounds { position }) if position == Position::new(4, 3)
        ));
    }

    #[test]
    #[should_panic(expected = "outside 4x3")]
    fn test_out_of_bounds_index_panics() {
        let grid = numbered(4, 3);
        let _ = grid[Position::new(-1, 0)];
    }

    #[test]
    fn test_window_inside_bounds() {
        let grid = numbered(5, 5);
        let view = grid.window(Position::new(1, 2), 2, 2);
        assert_eq!(view.width(), 2);
        assert_eq!(view[Position::new(0, 0)], 21);
        assert_eq!(view[Position::new(1, 1)], 32);
    }

    #[test]
    fn test_window_wraps_negative_start() {
        let grid = numbered(5, 5);
        let view = grid.window(Position::new(-2, -1), 4, 2);
        let top: Vec<i32> = (0..4).map(|x| view[Position::new(x, 0)]).collect();
        let bottom: Vec<i32> = (0..4).map(|x| view[Position::new(x, 1)]).collect();
        assert_eq!(top, vec![43, 44, 40, 41]);
        assert_eq!(bottom, vec![3, 4, 0, 1]);
    }

    #[test]
    fn test_window_wraps_overflowing_stop() {
        let grid = numbered(5, 5);
        let view = grid.window(Position::new(3, 4), 3, 2);
        assert_eq!(view[Position::new(0, 0)], 43);
        assert_eq!(view[Position::new(2, 0)], 40);
        assert_eq!(view[Position::new(2, 1)], 0);
    }

    #[test]
    fn test_window_map_reports_source_positions() {
        let grid = numbered(3, 3);
        let view = grid.window_map(Position::new(2, 2), 2, 2, |pos, _| pos);
        assert_eq!(view[Position::new(0, 0)], Position::new(2, 2));
        assert_eq!(view[Position::new(1, 1)], Position::new(0, 0));
    }

    #[test]
    fn test_iter_visits_row_major() {
        let grid = numbered(2, 2);
        let positions: Vec<Position> = grid.iter().map(|(pos, _)| pos).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1)
            ]
        );
    }
}
