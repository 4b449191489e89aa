//! # Maze Generation
//!
//! Perfect mazes carved by randomized depth-first search.
//!
//! Logical maze cells sit on odd coordinates `(2i + 1, 2j + 1)`; the even
//! rows and columns between them start as wall and are knocked out when the
//! search passes from one cell to its neighbour. Every cell is visited once
//! and every carved passage joins a visited cell to an unvisited one, so the
//! open cells form a spanning tree: fully connected and without loops.
//!
//! The search keeps its own stack instead of recursing, so large mazes never
//! grow the call stack.

use crate::generation::{GenerationConfig, Generator, GeneratorVariant};
use crate::{reachable_from, DelveError, DelveResult, Grid, Level, Position, Tile};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Maze generator.
#[derive(Debug, Clone, Default)]
pub struct MazeGenerator;

impl MazeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Number of logical cells along each axis.
    pub fn cell_dimensions(config: &GenerationConfig) -> (u32, u32) {
        ((config.width - 1) / 2, (config.height - 1) / 2)
    }

    /// Map position of a logical cell.
    fn to_map(cell: Position) -> Position {
        cell * 2 + Position::new(1, 1)
    }

    fn unvisited_neighbours(visited: &Grid<bool>, cell: Position) -> Vec<Position> {
        cell.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&next| visited.get(next).map(|seen| !seen).unwrap_or(false))
            .collect()
    }

    /// Runs the search from `origin`, carving into `level`.
    fn carve_from(
        &self,
        level: &mut Level,
        origin: Position,
        visited: &mut Grid<bool>,
        rng: &mut StdRng,
    ) -> DelveResult<usize> {
        let mut carved = 1;
        visited.set(origin, true)?;
        level.set_tile(Self::to_map(origin), Tile::floor())?;

        let mut stack = vec![origin];
        while let Some(&current) = stack.last() {
            let neighbours = Self::unvisited_neighbours(visited, current);
            if neighbours.is_empty() {
                stack.pop();
                continue;
            }

            let next = neighbours[rng.gen_range(0..neighbours.len())];
            let from = Self::to_map(current);
            let to = Self::to_map(next);
            // The wall between two cells is their midpoint.
            let between = Position::new((from.x + to.x) / 2, (from.y + to.y) / 2);
            level.set_tile(between, Tile::floor())?;
            level.set_tile(to, Tile::floor())?;
            visited.set(next, true)?;
            carved += 2;
            stack.push(next);
        }

        Ok(carved)
    }
}

impl Generator<Level> for MazeGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<Level> {
        let (cells_wide, cells_high) = Self::cell_dimensions(config);
        if cells_wide == 0 || cells_high == 0 {
            return Err(DelveError::InvalidConfig(format!(
                "a {}x{} map is too small for a maze",
                config.width, config.height
            )));
        }

        let mut level = Level::new(0, GeneratorVariant::Maze, config.width, config.height);
        let mut visited = Grid::new_filled(cells_wide, cells_high, false);
        let origin = Position::new(
            rng.gen_range(0..cells_wide as i32),
            rng.gen_range(0..cells_high as i32),
        );
        let carved = self.carve_from(&mut level, origin, &mut visited, rng)?;
        debug!(
            "Carved {}x{} maze: {} open tiles",
            cells_wide, cells_high, carved
        );

        level.player_start = Self::to_map(Position::origin());
        Ok(level)
    }

    fn validate(&self, level: &Level, config: &GenerationConfig) -> DelveResult<()> {
        let (cells_wide, cells_high) = Self::cell_dimensions(config);
        // A spanning tree over n cells has n - 1 passages.
        let expected = (2 * cells_wide * cells_high - 1) as usize;
        let open = level.floor_count();
        if open != expected {
            return Err(DelveError::GenerationFailed(format!(
                "maze has {} open tiles, expected {}",
                open, expected
            )));
        }

        let reached = reachable_from(level.player_start, |pos| {
            level.get_tile(pos).map(|tile| !tile.is_solid()).unwrap_or(false)
        });
        if reached.len() != open {
            return Err(DelveError::GenerationFailed(format!(
                "only {} of {} maze tiles are reachable",
                reached.len(),
                open
            )));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "MazeGenerator"
    }
}
