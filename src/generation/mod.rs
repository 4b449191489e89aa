//! # Generation Module
//!
//! Procedural level generation: room-and-corridor dungeons, perfect mazes,
//! and the population pass that spawns monsters and pickups into them.
//!
//! A generation pass keeps no state between calls. Given the same
//! configuration and the same seeded random number generator it produces the
//! same level.

pub mod dungeon;
pub mod encounters;
pub mod maze;

pub use dungeon::*;
pub use encounters::*;
pub use maze::*;

use crate::config::{
    DEFAULT_DUNGEON_HEIGHT, DEFAULT_DUNGEON_WIDTH, MAZE_MONSTERS, ROOM_MAX_SIZE, ROOM_MIN_SIZE,
};
use crate::game::{ConcreteEntity, Level, Position};
use crate::{DelveError, DelveResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which algorithm lays out a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorVariant {
    /// Non-overlapping rooms joined by L-shaped corridors
    #[default]
    RoomsAndCorridors,
    /// A perfect maze carved by randomized depth-first search
    Maze,
}

impl fmt::Display for GeneratorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorVariant::RoomsAndCorridors => write!(f, "rooms"),
            GeneratorVariant::Maze => write!(f, "maze"),
        }
    }
}

impl FromStr for GeneratorVariant {
    type Err = DelveError;

    fn from_str(s: &str) -> DelveResult<Self> {
        match s.to_lowercase().as_str() {
            "rooms" | "dungeon" | "rooms_and_corridors" => Ok(GeneratorVariant::RoomsAndCorridors),
            "maze" => Ok(GeneratorVariant::Maze),
            other => Err(DelveError::InvalidConfig(format!(
                "unknown generator variant '{}'",
                other
            ))),
        }
    }
}

/// How monsters and pickups are assigned to accepted rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationStrategy {
    /// Fixed species per room slot, ladder in the last room
    #[default]
    SlotIndexed,
    /// Pickups in the first rooms, random species everywhere else
    Scattered,
}

/// Configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Level width in tiles
    pub width: u32,
    /// Level height in tiles
    pub height: u32,
    /// Smallest room side (odd)
    pub room_min_size: u32,
    /// Exclusive upper bound on room sides
    pub room_max_size: u32,
    /// Room placement attempts; scales with map area when unset
    pub room_attempts: Option<u32>,
    /// Room population strategy
    pub population: PopulationStrategy,
    /// Monsters dropped into maze levels
    pub maze_monsters: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert!(config.validate().is_ok());
    /// assert_eq!(config.attempt_budget(), 41);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: DEFAULT_DUNGEON_WIDTH,
            height: DEFAULT_DUNGEON_HEIGHT,
            room_min_size: ROOM_MIN_SIZE,
            room_max_size: ROOM_MAX_SIZE,
            room_attempts: None,
            population: PopulationStrategy::SlotIndexed,
            maze_monsters: MAZE_MONSTERS,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 25,
            height: 25,
            room_min_size: 3,
            room_max_size: 7,
            maze_monsters: 1,
            ..Self::new(seed)
        }
    }

    /// Room placement attempts for one pass.
    pub fn attempt_budget(&self) -> u32 {
        self.room_attempts
            .unwrap_or_else(|| ((self.width * self.height) as f64).sqrt() as u32)
    }

    /// Checks that rooms can be placed at all and stay wall-separated.
    pub fn validate(&self) -> DelveResult<()> {
        if self.room_min_size < 3 || self.room_min_size % 2 == 0 {
            return Err(DelveError::InvalidConfig(format!(
                "room_min_size must be odd and at least 3, got {}",
                self.room_min_size
            )));
        }
        if self.room_max_size <= self.room_min_size {
            return Err(DelveError::InvalidConfig(format!(
                "room_max_size ({}) must exceed room_min_size ({})",
                self.room_max_size, self.room_min_size
            )));
        }
        if self.room_attempts == Some(0) {
            return Err(DelveError::InvalidConfig(
                "room_attempts must be at least 1".to_string(),
            ));
        }
        if self.width < self.room_min_size + 3 || self.height < self.room_min_size + 3 {
            return Err(DelveError::InvalidConfig(format!(
                "a {}x{} map cannot hold a room of side {}",
                self.width, self.height, self.room_min_size
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// An axis-aligned rectangle with inclusive corners.
///
/// Rooms only exist while a level is being built; afterwards they are kept on
/// the level for spawn placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub x2: i32,
    pub y1: i32,
    pub y2: i32,
}

impl Room {
    /// Creates a room from its top-left corner and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, Room};
    ///
    /// let room = Room::new(1, 3, 5, 3);
    /// assert_eq!((room.x2, room.y2), (5, 5));
    /// assert_eq!(room.center(), Position::new(3, 4));
    /// assert!(room.contains(Position::new(5, 5)));
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            x2: x + width - 1,
            y1: y,
            y2: y + height - 1,
        }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    /// Integer midpoint.
    pub fn center(&self) -> Position {
        Position::new(self.x1 + self.x2, self.y1 + self.y2).div_floor(2)
    }

    /// Separating-axis test; touching edges count as overlapping.
    pub fn overlaps(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.x1 <= pos.x && pos.x <= self.x2 && self.y1 <= pos.y && pos.y <= self.y2
    }

    /// All positions inside the room.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y1..=self.y2).flat_map(move |y| (self.x1..=self.x2).map(move |x| Position::new(x, y)))
    }

    /// A uniformly random position inside the room.
    pub fn random_position(&self, rng: &mut StdRng) -> Position {
        Position::new(
            rng.gen_range(self.x1..=self.x2),
            rng.gen_range(self.y1..=self.y2),
        )
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Everything a fresh level needs: the populated grid and the entities
/// spawned into it. The player start lives on the level.
#[derive(Debug, Clone)]
pub struct NewLevel {
    pub level: Level,
    pub entities: Vec<ConcreteEntity>,
}

impl NewLevel {
    pub fn player_start(&self) -> Position {
        self.level.player_start
    }
}

/// Runs one generator and checks its output.
fn build_with(
    generator: &impl Generator<Level>,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> DelveResult<(Level, &'static str)> {
    let level = generator.generate(config, rng)?;
    generator.validate(&level, config)?;
    debug!("{} carved {} open tiles", generator.generator_type(), level.floor_count());
    Ok((level, generator.generator_type()))
}

/// Builds and populates a level with the chosen generator.
pub fn new_level(
    variant: GeneratorVariant,
    depth: u32,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> DelveResult<NewLevel> {
    config.validate()?;

    let (mut level, generator_type) = match variant {
        GeneratorVariant::RoomsAndCorridors => {
            build_with(&RoomCorridorGenerator::new(), config, rng)?
        }
        GeneratorVariant::Maze => build_with(&MazeGenerator::new(), config, rng)?,
    };
    level.depth = depth;

    let entities = populate(&mut level, config, rng)?;
    utils::validate_level(&level)?;

    info!(
        "{} built {} level at depth {}: {} rooms, {} entities, start {:?}",
        generator_type,
        variant,
        depth,
        level.rooms.len(),
        entities.len(),
        level.player_start
    );

    Ok(NewLevel { level, entities })
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::reachable_from;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Checks that the player start and the exit are open and connected.
    pub fn validate_level(level: &Level) -> DelveResult<()> {
        let start = level.player_start;
        if level
            .get_tile(start)
            .map(|tile| tile.is_solid())
            .unwrap_or(true)
        {
            return Err(DelveError::GenerationFailed(format!(
                "player start {:?} is not open floor",
                start
            )));
        }

        let exit = level.exit.ok_or_else(|| {
            DelveError::GenerationFailed("level has no exit".to_string())
        })?;

        let reachable = reachable_from(start, |pos| {
            level.get_tile(pos).map(|tile| !tile.is_solid()).unwrap_or(false)
        });
        if !reachable.contains(&exit) {
            return Err(DelveError::GenerationFailed(format!(
                "exit {:?} is not reachable from {:?}",
                exit, start
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.width, 41);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing(1).validate().is_ok());
    }

    #[test]
    fn test_attempt_budget_scales_with_area() {
        let mut config = GenerationConfig::new(1);
        config.width = 80;
        config.height = 20;
        assert_eq!(config.attempt_budget(), 40);

        config.room_attempts = Some(10);
        assert_eq!(config.attempt_budget(), 10);
    }

    #[test]
    fn test_config_rejects_even_room_sizes() {
        let mut config = GenerationConfig::new(1);
        config.room_min_size = 4;
        assert!(matches!(config.validate(), Err(DelveError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_tiny_maps() {
        let mut config = GenerationConfig::new(1);
        config.width = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_room_geometry() {
        let room = Room::new(5, 5, 5, 3);
        assert_eq!(room.width(), 5);
        assert_eq!(room.height(), 3);
        assert_eq!(room.center(), Position::new(7, 6));
        assert!(room.contains(Position::new(9, 7)));
        assert!(!room.contains(Position::new(10, 7)));
        assert_eq!(room.positions().count(), 15);
    }

    #[test]
    fn test_room_overlap() {
        let room1 = Room::new(1, 1, 5, 5);
        let touching = Room::new(5, 1, 3, 3);
        let separate = Room::new(7, 1, 3, 3);

        assert!(room1.overlaps(&touching));
        assert!(touching.overlaps(&room1));
        assert!(!room1.overlaps(&separate));
        assert!(!separate.overlaps(&room1));
    }

    #[test]
    fn test_random_position_inside_room() {
        let room = Room::new(3, 7, 5, 5);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(room.contains(room.random_position(&mut rng)));
        }
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("maze".parse::<GeneratorVariant>().unwrap(), GeneratorVariant::Maze);
        assert_eq!(
            "Rooms".parse::<GeneratorVariant>().unwrap(),
            GeneratorVariant::RoomsAndCorridors
        );
        assert!("caves".parse::<GeneratorVariant>().is_err());
    }

    #[test]
    fn test_new_level_places_player_and_exit() {
        let config = GenerationConfig::new(2024);
        let mut rng = utils::create_rng(&config);
        for variant in [GeneratorVariant::RoomsAndCorridors, GeneratorVariant::Maze] {
            let built = new_level(variant, 3, &config, &mut rng).unwrap();
            assert_eq!(built.level.depth, 3);
            assert_eq!(built.level.variant, variant);
            assert!(built.level.exit.is_some());
            assert!(utils::validate_level(&built.level).is_ok());
        }
    }

    #[test]
    fn test_zero_room_attempts_rejected() {
        let mut config = GenerationConfig::new(1);
        config.room_attempts = Some(0);
        assert!(matches!(config.validate(), Err(DelveError::InvalidConfig(_))));

        let mut rng = utils::create_rng(&config);
        assert!(matches!(
            new_level(GeneratorVariant::RoomsAndCorridors, 0, &config, &mut rng),
            Err(DelveError::InvalidConfig(_))
        ));

        config.room_attempts = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_with_names_the_generator() {
        let config = GenerationConfig::for_testing(8);
        let mut rng = utils::create_rng(&config);
        let (_, rooms) = build_with(&RoomCorridorGenerator::new(), &config, &mut rng).unwrap();
        let (maze, name) = build_with(&MazeGenerator::new(), &config, &mut rng).unwrap();
        assert_eq!(rooms, "RoomCorridorGenerator");
        assert_eq!(name, "MazeGenerator");
        assert_eq!(maze.player_start, Position::new(1, 1));
    }
}
