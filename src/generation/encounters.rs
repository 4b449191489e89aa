//! # Encounter Generation
//!
//! Spawns monsters and pickups into a freshly carved level and marks its
//! checkpoint and exit.
//!
//! Room-and-corridor levels are populated room by room according to a
//! [`PopulationStrategy`]; mazes have no rooms, so their monsters are dropped
//! onto open tiles away from the start and the ladder goes to the dead end
//! farthest from it.

use crate::generation::{GenerationConfig, PopulationStrategy, Room};
use crate::{
    farthest_reachable, ConcreteEntity, DelveError, DelveResult, Fighter, FighterKind, Level,
    Pickup, PickupKind, Position, Tile, TileType,
};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Monster species for the fixed room slots, starting with the second room.
pub const ROOM_SLOTS: [FighterKind; 3] = [FighterKind::Troll, FighterKind::Gorgon, FighterKind::Wizard];

/// Pickups placed in order into the rooms after the first under
/// [`PopulationStrategy::Scattered`].
pub const SCATTERED_PICKUPS: [PickupKind; 2] = [PickupKind::Ladder, PickupKind::Sword];

/// Monsters dropped into a maze keep at least this Manhattan distance from the start.
const MAZE_SPAWN_CLEARANCE: u32 = 4;

/// Places entities into a level.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    pub strategy: PopulationStrategy,
    pub maze_monsters: u32,
}

impl EncounterGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            strategy: config.population,
            maze_monsters: config.maze_monsters,
        }
    }

    /// Populates the level, writing fighter occupancy into its cells, and
    /// returns every spawned entity.
    pub fn populate(&self, level: &mut Level, rng: &mut StdRng) -> DelveResult<Vec<ConcreteEntity>> {
        let start = level.player_start;
        level.set_tile(start, Tile::new(TileType::Bonfire))?;

        let mut spawned = Vec::new();
        if level.rooms.is_empty() {
            self.populate_open(level, rng, &mut spawned)?;
        } else {
            match self.strategy {
                PopulationStrategy::SlotIndexed => self.populate_slots(level, &mut spawned)?,
                PopulationStrategy::Scattered => self.populate_scattered(level, rng, &mut spawned)?,
            }
        }

        if level.exit.is_none() {
            self.place_far_ladder(level, &mut spawned)?;
        }

        for entity in &spawned {
            if let ConcreteEntity::Fighter(fighter) = entity {
                let cell = level
                    .grid
                    .get_mut(fighter.position)
                    .ok_or(DelveError::OutOfBounds {
                        position: fighter.position,
                    })?;
                cell.occupant = Some(fighter.id);
            }
        }

        debug!("Spawned {} entities", spawned.len());
        Ok(spawned)
    }

    /// Fixed species per slot at room centres; the last room holds the
    /// ladder and never a monster.
    fn populate_slots(&self, level: &mut Level, spawned: &mut Vec<ConcreteEntity>) -> DelveResult<()> {
        let rooms = level.rooms.clone();
        if rooms.len() < 2 {
            warn!("Only one room accepted; ladder goes to the farthest open tile");
            return Ok(());
        }

        let last = rooms.len() - 1;
        let monster_rooms = &rooms[1..last];
        if monster_rooms.len() < ROOM_SLOTS.len() {
            warn!(
                "{} rooms accepted; skipping {} monster slot(s)",
                rooms.len(),
                ROOM_SLOTS.len() - monster_rooms.len()
            );
        }
        for (kind, room) in ROOM_SLOTS.iter().zip(monster_rooms) {
            spawned.push(Fighter::new(*kind, room.center()).into());
        }

        let ladder = rooms[last].center();
        spawned.push(Pickup::new(PickupKind::Ladder, ladder).into());
        level.exit = Some(ladder);
        Ok(())
    }

    /// Pickups in the first rooms after the start, one random monster in
    /// each room after those.
    fn populate_scattered(
        &self,
        level: &mut Level,
        rng: &mut StdRng,
        spawned: &mut Vec<ConcreteEntity>,
    ) -> DelveResult<()> {
        let rooms = level.rooms.clone();
        let start = level.player_start;
        let mut taken = vec![start];

        let pickup_rooms = rooms.iter().skip(1);
        if rooms.len() <= SCATTERED_PICKUPS.len() {
            warn!(
                "{} rooms accepted; not every pickup can be placed",
                rooms.len()
            );
        }
        for (kind, room) in SCATTERED_PICKUPS.iter().zip(pickup_rooms) {
            let pos = free_position(room, &taken, rng);
            taken.push(pos);
            spawned.push(Pickup::new(*kind, pos).into());
            if *kind == PickupKind::Ladder {
                level.exit = Some(pos);
            }
        }

        for room in rooms.iter().skip(SCATTERED_PICKUPS.len() + 1) {
            let kind = FighterKind::MONSTERS
                .choose(rng)
                .copied()
                .unwrap_or(FighterKind::Goblin);
            let pos = free_position(room, &taken, rng);
            taken.push(pos);
            spawned.push(Fighter::new(kind, pos).into());
        }
        Ok(())
    }

    /// Goblins on random open tiles clear of the start.
    fn populate_open(
        &self,
        level: &mut Level,
        rng: &mut StdRng,
        spawned: &mut Vec<ConcreteEntity>,
    ) -> DelveResult<()> {
        let start = level.player_start;
        let mut candidates: Vec<Position> = level
            .grid
            .iter()
            .filter(|(pos, cell)| {
                !cell.tile.is_solid() && pos.manhattan_distance(start) >= MAZE_SPAWN_CLEARANCE
            })
            .map(|(pos, _)| pos)
            .collect();

        self.place_far_ladder(level, spawned)?;
        candidates.retain(|&pos| Some(pos) != level.exit);
        candidates.shuffle(rng);

        let wanted = self.maze_monsters as usize;
        if candidates.len() < wanted {
            warn!(
                "Room for only {} of {} maze monsters",
                candidates.len(),
                wanted
            );
        }
        for pos in candidates.into_iter().take(wanted) {
            spawned.push(Fighter::new(FighterKind::Goblin, pos).into());
        }
        Ok(())
    }

    /// Puts the ladder on the open tile farthest from the start.
    fn place_far_ladder(&self, level: &mut Level, spawned: &mut Vec<ConcreteEntity>) -> DelveResult<()> {
        let (exit, steps) = farthest_reachable(level.player_start, |pos| {
            level.get_tile(pos).map(|tile| !tile.is_solid()).unwrap_or(false)
        })
        .ok_or_else(|| {
            DelveError::GenerationFailed("no open tile to place the ladder on".to_string())
        })?;

        debug!("Ladder placed {} steps from the start at {:?}", steps, exit);
        spawned.push(Pickup::new(PickupKind::Ladder, exit).into());
        level.exit = Some(exit);
        Ok(())
    }
}

/// A random position in `room` not in `taken`, falling back to the first
/// free one when random draws keep colliding.
fn free_position(room: &Room, taken: &[Position], rng: &mut StdRng) -> Position {
    for _ in 0..8 {
        let pos = room.random_position(rng);
        if !taken.contains(&pos) {
            return pos;
        }
    }
    room.positions()
        .find(|pos| !taken.contains(pos))
        .unwrap_or_else(|| room.center())
}

/// Populates a level using the population settings in `config`.
pub fn populate(
    level: &mut Level,
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> DelveResult<Vec<ConcreteEntity>> {
    EncounterGenerator::new(config).populate(level, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;
    use crate::{Entity, GeneratorVariant};

    fn room_level(rooms: Vec<Room>) -> Level {
        let mut level = Level::new(0, GeneratorVariant::RoomsAndCorridors, 41, 41);
        for room in &rooms {
            for pos in room.positions() {
                level.set_tile(pos, Tile::floor()).unwrap();
            }
        }
        // Straight corridor along row 3 keeps every test room connected.
        for x in 1..40 {
            level.set_tile(Position::new(x, 3), Tile::floor()).unwrap();
        }
        level.player_start = rooms[0].center();
        level.rooms = rooms;
        level
    }

    fn five_rooms() -> Vec<Room> {
        (0..5).map(|i| Room::new(1 + 8 * i, 1, 5, 5)).collect()
    }

    #[test]
    fn test_slot_population() {
        let rooms = five_rooms();
        let mut level = room_level(rooms.clone());
        let config = GenerationConfig::new(1);
        let entities = populate(&mut level, &config, &mut create_rng(&config)).unwrap();

        let kinds: Vec<FighterKind> = entities
            .iter()
            .filter_map(|e| e.as_fighter().map(|f| f.kind))
            .collect();
        assert_eq!(kinds, ROOM_SLOTS.to_vec());
        assert_eq!(level.exit, Some(rooms[4].center()));
        assert_eq!(
            level.get_tile(rooms[0].center()).unwrap().tile_type,
            TileType::Bonfire
        );
        for entity in &entities {
            if let Some(fighter) = entity.as_fighter() {
                assert_eq!(level.grid[fighter.position].occupant, Some(fighter.id));
            }
        }
    }

    #[test]
    fn test_missing_slots_are_skipped() {
        let rooms: Vec<Room> = five_rooms().into_iter().take(3).collect();
        let mut level = room_level(rooms.clone());
        let config = GenerationConfig::new(1);
        let entities = populate(&mut level, &config, &mut create_rng(&config)).unwrap();

        let fighters = entities.iter().filter(|e| e.as_fighter().is_some()).count();
        assert_eq!(fighters, 1);
        assert_eq!(level.exit, Some(rooms[2].center()));
    }

    #[test]
    fn test_single_room_uses_farthest_tile() {
        let rooms = vec![Room::new(1, 1, 5, 5)];
        let mut level = room_level(rooms);
        let config = GenerationConfig::new(1);
        let entities = populate(&mut level, &config, &mut create_rng(&config)).unwrap();

        assert_eq!(entities.len(), 1);
        assert_eq!(level.exit, Some(Position::new(39, 3)));
    }

    #[test]
    fn test_scattered_population() {
        let rooms = five_rooms();
        let mut level = room_level(rooms.clone());
        let mut config = GenerationConfig::new(9);
        config.population = PopulationStrategy::Scattered;
        let entities = populate(&mut level, &config, &mut create_rng(&config)).unwrap();

        let ladder = entities
            .iter()
            .filter_map(ConcreteEntity::as_pickup)
            .find(|p| p.kind == PickupKind::Ladder)
            .unwrap();
        assert!(rooms[1].contains(ladder.position));
        assert_eq!(level.exit, Some(ladder.position));

        let sword = entities
            .iter()
            .filter_map(ConcreteEntity::as_pickup)
            .find(|p| p.kind == PickupKind::Sword)
            .unwrap();
        assert!(rooms[2].contains(sword.position));

        let fighters: Vec<&Fighter> = entities.iter().filter_map(|e| e.as_fighter()).collect();
        assert_eq!(fighters.len(), 2);
        assert!(rooms[3].contains(fighters[0].position()));
        assert!(rooms[4].contains(fighters[1].position()));
    }

    #[test]
    fn test_maze_population() {
        let config = GenerationConfig::new(21);
        let mut rng = create_rng(&config);
        let built =
            crate::generation::new_level(GeneratorVariant::Maze, 0, &config, &mut rng).unwrap();

        let goblins: Vec<&Fighter> = built
            .entities
            .iter()
            .filter_map(|e| e.as_fighter())
            .collect();
        assert_eq!(goblins.len(), config.maze_monsters as usize);
        for goblin in goblins {
            assert_eq!(goblin.kind, FighterKind::Goblin);
            assert!(goblin.position.manhattan_distance(built.player_start()) >= MAZE_SPAWN_CLEARANCE);
            assert_ne!(Some(goblin.position), built.level.exit);
        }
        assert_eq!(
            built.level.get_tile(Position::new(1, 1)).unwrap().tile_type,
            TileType::Bonfire
        );
    }
}
