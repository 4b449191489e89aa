//! # Dungeon Generation
//!
//! Room-and-corridor layouts.
//!
//! The generator works in one pass:
//! 1. Fill the level with wall
//! 2. Propose rooms for a fixed number of attempts, keeping only those that
//!    overlap no room kept so far
//! 3. Carve every kept room, joining each to the previously carved one with an
//!    L-shaped corridor between their centres
//!
//! Room sides are odd and anchors sit on odd coordinates, so two rooms that do
//! not overlap always keep at least one wall column or row between them.
//! Connectivity follows from carving corridors between consecutive rooms.

use crate::generation::{GenerationConfig, Generator, GeneratorVariant, Room};
use crate::{reachable_from, DelveError, DelveResult, Level, Position, Tile};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Primary dungeon generator using the room-and-corridor algorithm.
#[derive(Debug, Clone)]
pub struct RoomCorridorGenerator {
    /// Whether validation flood-fills the level to confirm every room is reachable
    pub ensure_connectivity: bool,
}

impl RoomCorridorGenerator {
    /// Creates a new dungeon generator with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GenerationConfig, Generator, RoomCorridorGenerator};
    /// use delve::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::new(9);
    /// let level = RoomCorridorGenerator::new()
    ///     .generate(&config, &mut create_rng(&config))
    ///     .unwrap();
    /// assert_eq!(level.player_start, level.rooms[0].center());
    /// ```
    pub fn new() -> Self {
        Self {
            ensure_connectivity: true,
        }
    }

    /// Samples an odd side length in `[min, max)`, stepping by two.
    fn sample_side(min: u32, max: u32, rng: &mut StdRng) -> i32 {
        let choices = (max - min + 1) / 2;
        (min + 2 * rng.gen_range(0..choices)) as i32
    }

    /// Samples an odd anchor in `[1, axis - side)`.
    fn sample_anchor(axis: u32, side: i32, rng: &mut StdRng) -> i32 {
        let choices = (axis as i32 - side) / 2;
        1 + 2 * rng.gen_range(0..choices)
    }

    /// Proposes rooms for the configured attempt budget. Attempts that overlap
    /// an accepted room are dropped, not retried.
    fn propose_rooms(&self, config: &GenerationConfig, rng: &mut StdRng) -> Vec<Room> {
        let max_width = config.room_max_size.min(config.width - 1);
        let max_height = config.room_max_size.min(config.height - 1);

        let mut rooms: Vec<Room> = Vec::new();
        let attempts = config.attempt_budget();
        for _ in 0..attempts {
            let width = Self::sample_side(config.room_min_size, max_width, rng);
            let height = Self::sample_side(config.room_min_size, max_height, rng);
            let x = Self::sample_anchor(config.width, width, rng);
            let y = Self::sample_anchor(config.height, height, rng);

            let room = Room::new(x, y, width, height);
            if !rooms.iter().any(|accepted| room.overlaps(accepted)) {
                rooms.push(room);
            }
        }

        debug!(
            "Accepted {} of {} room proposals",
            rooms.len(),
            attempts
        );
        rooms
    }

    /// Carves every position of a room to floor.
    fn carve_room(&self, level: &mut Level, room: &Room) -> DelveResult<()> {
        for pos in room.positions() {
            level.set_tile(pos, Tile::floor())?;
        }
        Ok(())
    }

    fn carve_horizontal(&self, level: &mut Level, from_x: i32, to_x: i32, y: i32) -> DelveResult<()> {
        for x in from_x.min(to_x)..=from_x.max(to_x) {
            level.set_tile(Position::new(x, y), Tile::floor())?;
        }
        Ok(())
    }

    fn carve_vertical(&self, level: &mut Level, from_y: i32, to_y: i32, x: i32) -> DelveResult<()> {
        for y in from_y.min(to_y)..=from_y.max(to_y) {
            level.set_tile(Position::new(x, y), Tile::floor())?;
        }
        Ok(())
    }

    /// Carves an L-shaped corridor between two room centres, turning at a
    /// randomly chosen corner.
    pub fn carve_l_corridor(
        &self,
        level: &mut Level,
        start: Position,
        end: Position,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        if rng.gen_bool(0.5) {
            self.carve_horizontal(level, start.x, end.x, start.y)?;
            self.carve_vertical(level, start.y, end.y, end.x)
        } else {
            self.carve_vertical(level, start.y, end.y, start.x)?;
            self.carve_horizontal(level, start.x, end.x, end.y)
        }
    }

    /// Carves rooms in acceptance order, each joined to the one before it.
    fn carve(&self, level: &mut Level, rooms: &[Room], rng: &mut StdRng) -> DelveResult<()> {
        let mut previous: Option<&Room> = None;
        for room in rooms {
            if let Some(previous) = previous {
                self.carve_l_corridor(level, previous.center(), room.center(), rng)?;
            }
            self.carve_room(level, room)?;
            previous = Some(room);
        }
        Ok(())
    }
}

impl Generator<Level> for RoomCorridorGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<Level> {
        config.validate()?;

        let mut level = Level::new(
            0,
            GeneratorVariant::RoomsAndCorridors,
            config.width,
            config.height,
        );

        let rooms = self.propose_rooms(config, rng);
        let first = rooms
            .first()
            .copied()
            .ok_or_else(|| DelveError::GenerationFailed("Failed to place any rooms".to_string()))?;

        self.carve(&mut level, &rooms, rng)?;

        level.player_start = first.center();
        level.rooms = rooms;
        Ok(level)
    }

    fn validate(&self, level: &Level, _config: &GenerationConfig) -> DelveResult<()> {
        for (i, room) in level.rooms.iter().enumerate() {
            if level.rooms[i + 1..].iter().any(|other| room.overlaps(other)) {
                return Err(DelveError::GenerationFailed(format!(
                    "room {} overlaps a later room",
                    i
                )));
            }
        }

        if !self.ensure_connectivity {
            return Ok(());
        }

        let start = match level.rooms.first() {
            Some(room) => room.center(),
            None => return Ok(()),
        };
        let reachable = reachable_from(start, |pos| {
            level.get_tile(pos).map(|tile| !tile.is_solid()).unwrap_or(false)
        });
        for (i, room) in level.rooms.iter().enumerate() {
            if !reachable.contains(&room.center()) {
                return Err(DelveError::GenerationFailed(format!(
                    "Room {} is not connected to other rooms",
                    i
                )));
            }
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

impl Default for RoomCorridorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;
    use crate::TileType;

    #[test]
    fn test_generation_with_small_level() {
        let generator = RoomCorridorGenerator::new();
        let config = GenerationConfig::for_testing(12345);
        let mut rng = create_rng(&config);

        let level = generator.generate(&config, &mut rng).unwrap();
        assert_eq!(level.width(), 25);
        assert_eq!(level.height(), 25);
        assert!(!level.rooms.is_empty());
        assert!(level.floor_count() > 0);
        assert!(generator.validate(&level, &config).is_ok());
    }

    #[test]
    fn test_rooms_keep_border_and_odd_alignment() {
        let generator = RoomCorridorGenerator::new();
        for seed in 0..20 {
            let config = GenerationConfig::new(seed);
            let level = generator.generate(&config, &mut create_rng(&config)).unwrap();
            for room in &level.rooms {
                assert_eq!(room.x1 % 2, 1);
                assert_eq!(room.y1 % 2, 1);
                assert_eq!(room.width() % 2, 1);
                assert!(room.x2 <= config.width as i32 - 2);
                assert!(room.y2 <= config.height as i32 - 2);
            }
            for x in 0..config.width as i32 {
                assert_eq!(
                    level.get_tile(Position::new(x, 0)).unwrap().tile_type,
                    TileType::Wall
                );
            }
        }
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let generator = RoomCorridorGenerator::new();
        let config = GenerationConfig::new(777);
        let a = generator.generate(&config, &mut create_rng(&config)).unwrap();
        let b = generator.generate(&config, &mut create_rng(&config)).unwrap();
        assert_eq!(a.rooms, b.rooms);
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn test_l_corridor_carving() {
        let generator = RoomCorridorGenerator::new();
        let config = GenerationConfig::for_testing(12345);
        let mut rng = create_rng(&config);
        let mut level = Level::new(0, GeneratorVariant::RoomsAndCorridors, 20, 20);

        let start = Position::new(5, 5);
        let end = Position::new(15, 12);
        generator
            .carve_l_corridor(&mut level, start, end, &mut rng)
            .unwrap();

        assert!(!level.is_blocked(start));
        assert!(!level.is_blocked(end));
        // One straight leg plus the other: exactly one corner cell is shared.
        assert_eq!(level.floor_count(), 10 + 7 + 1);
        let via_horizontal = !level.is_blocked(Position::new(15, 5));
        let via_vertical = !level.is_blocked(Position::new(5, 12));
        assert!(via_horizontal ^ via_vertical);
    }

    #[test]
    fn test_attempt_budget_is_respected() {
        let generator = RoomCorridorGenerator::new();
        let mut config = GenerationConfig::new(5);
        config.room_attempts = Some(1);
        let level = generator.generate(&config, &mut create_rng(&config)).unwrap();
        assert_eq!(level.rooms.len(), 1);
    }

    #[test]
    fn test_validation_detects_disconnected_rooms() {
        let generator = RoomCorridorGenerator::new();
        let config = GenerationConfig::for_testing(1);
        let mut level = Level::new(0, GeneratorVariant::RoomsAndCorridors, 20, 20);
        level.rooms = vec![Room::new(1, 1, 3, 3), Room::new(11, 11, 3, 3)];
        for room in level.rooms.clone() {
            generator.carve_room(&mut level, &room).unwrap();
        }
        assert!(matches!(
            generator.validate(&level, &config),
            Err(DelveError::GenerationFailed(_))
        ));
    }
}
