//! # World Representation
//!
//! Tiles, the two-layer cells that hold them, and the level that owns the
//! cell grid.
//!
//! A cell keeps its static tile and an optional fighter standing on it as two
//! separate layers. Moving a fighter only touches the occupant layer, so the
//! tile underneath never has to be saved and restored.

use crate::generation::{GeneratorVariant, Room};
use crate::{EntityId, Grid, Position, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of static tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Solid rock
    Wall,
    /// Walkable dirt floor
    Floor,
    /// Checkpoint; entering it snapshots the inventory
    Bonfire,
}

impl TileType {
    pub fn glyph(self) -> char {
        match self {
            TileType::Wall => '#',
            TileType::Floor => '.',
            TileType::Bonfire => 'x',
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            TileType::Wall => Rgb::GREY,
            TileType::Floor => Rgb::BROWN,
            TileType::Bonfire => Rgb::ORANGE,
        }
    }

    /// Whether the tile blocks movement.
    pub fn is_solid(self) -> bool {
        matches!(self, TileType::Wall)
    }
}

/// Static tile content of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    /// `None` means "transparent exactly when not solid"
    transparency: Option<bool>,
    explored: bool,
}

impl Tile {
    pub fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            transparency: None,
            explored: false,
        }
    }

    pub fn wall() -> Self {
        Self::new(TileType::Wall)
    }

    pub fn floor() -> Self {
        Self::new(TileType::Floor)
    }

    /// Creates a tile whose transparency does not follow its solidity, such
    /// as a solid but see-through hazard.
    pub fn with_transparency(tile_type: TileType, transparent: bool) -> Self {
        Self {
            transparency: Some(transparent),
            ..Self::new(tile_type)
        }
    }

    pub fn is_solid(&self) -> bool {
        self.tile_type.is_solid()
    }

    pub fn is_transparent(&self) -> bool {
        self.transparency.unwrap_or(!self.is_solid())
    }

    /// Whether the player has ever seen this tile.
    pub fn is_explored(&self) -> bool {
        self.explored
    }

    /// Latches the exploration flag; it is never cleared.
    pub fn mark_explored(&mut self) {
        self.explored = true;
    }
}

/// One grid location: a tile plus at most one fighter standing on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub tile: Tile,
    pub occupant: Option<EntityId>,
}

impl Cell {
    pub fn new(tile: Tile) -> Self {
        Self {
            tile,
            occupant: None,
        }
    }

    /// Occupancy overrides tile solidity while a fighter is present.
    pub fn is_solid(&self) -> bool {
        self.occupant.is_some() || self.tile.is_solid()
    }

    /// Fighters never block sight, so only the tile layer matters.
    pub fn is_transparent(&self) -> bool {
        self.tile.is_transparent()
    }
}

/// A generated level: the cell grid plus generation artifacts needed to
/// spawn into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// Depth of this level, starting at 0
    pub depth: u32,
    /// Which generator built the level
    pub variant: GeneratorVariant,
    /// All cells of the level
    pub grid: Grid<Cell>,
    /// Rooms accepted during generation, in acceptance order
    pub rooms: Vec<Room>,
    /// Where the player enters
    pub player_start: Position,
    /// Where the ladder to the next level sits
    pub exit: Option<Position>,
}

impl Level {
    /// Creates a level filled with solid wall.
    pub fn new(depth: u32, variant: GeneratorVariant, width: u32, height: u32) -> Self {
        Self {
            depth,
            variant,
            grid: Grid::new_filled(width, height, Cell::new(Tile::wall())),
            rooms: Vec::new(),
            player_start: Position::origin(),
            exit: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.grid.in_bounds(pos)
    }

    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        self.grid.get(pos).map(|cell| &cell.tile)
    }

    /// Replaces the tile layer at `pos`, leaving any occupant in place.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> crate::DelveResult<()> {
        let cell = self
            .grid
            .get_mut(pos)
            .ok_or(crate::DelveError::OutOfBounds { position: pos })?;
        cell.tile = tile;
        Ok(())
    }

    /// Whether movement into `pos` is blocked. Outside the grid counts as blocked.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.grid.get(pos).map(Cell::is_solid).unwrap_or(true)
    }

    /// Number of non-solid tiles.
    pub fn floor_count(&self) -> usize {
        self.grid
            .iter()
            .filter(|(_, cell)| !cell.tile.is_solid())
            .count()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                let pos = Position::new(x, y);
                let glyph = if Some(pos) == self.exit {
                    'H'
                } else if self.grid[pos].occupant.is_some() {
                    'M'
                } else {
                    self.grid[pos].tile.tile_type.glyph()
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
