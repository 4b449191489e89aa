//! # Entities
//!
//! Positioned actors: fighters (the player and monsters) and pickups.
//!
//! Static tiles live in the grid's tile layer and are not entities. Each
//! entity kind advertises a [`Capabilities`] table so the simulation can ask
//! what an entity can do without matching on concrete types everywhere.

use crate::config::{BASE_PERIOD, CAST_PERIOD};
use crate::{new_entity_id, EntityId, Position, Rgb};
use serde::{Deserialize, Serialize};

/// What an entity is able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Resolves a velocity into movement each turn
    pub movable: bool,
    /// Has hit points and can be attacked
    pub damageable: bool,
    /// Only drawn while in the player's line of sight; otherwise kept on
    /// the map once its cell is explored
    pub needs_line_of_sight: bool,
    /// Occupies its cell and blocks movement into it
    pub solid: bool,
}

/// Common interface over every entity kind.
pub trait Entity {
    fn id(&self) -> EntityId;
    fn position(&self) -> Position;
    fn glyph(&self) -> char;
    fn color(&self) -> Rgb;
    fn capabilities(&self) -> Capabilities;

    fn is_alive(&self) -> bool {
        true
    }
}

/// Combat statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStats {
    pub max_hp: i32,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

impl EntityStats {
    pub fn new(max_hp: i32, attack: i32, defense: i32, speed: i32) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            attack,
            defense,
            speed,
        }
    }

    /// Damage this attacker deals to `defender`; never negative.
    pub fn damage_against(&self, defender: &EntityStats) -> i32 {
        (self.attack - defender.defense).max(0)
    }

    /// Applies damage and reports whether it was lethal.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.hp -= amount;
        self.hp <= 0
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Kinds of fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterKind {
    Player,
    /// Fast, fragile melee chaser
    Goblin,
    /// Slow, sturdy melee chaser
    Troll,
    /// Ranged caster throwing fireballs
    Wizard,
    /// Stationary gaze hazard that slows the player
    Gorgon,
}

impl FighterKind {
    /// Monster species that random population may choose from.
    pub const MONSTERS: [FighterKind; 4] = [
        FighterKind::Goblin,
        FighterKind::Troll,
        FighterKind::Wizard,
        FighterKind::Gorgon,
    ];

    /// Starting stats as (hp, attack, defense, speed).
    pub fn base_stats(self) -> EntityStats {
        match self {
            FighterKind::Player => EntityStats::new(99, 1, 0, 4),
            FighterKind::Goblin => EntityStats::new(1, 1, 0, 2),
            FighterKind::Troll => EntityStats::new(5, 2, 2, 1),
            FighterKind::Wizard => EntityStats::new(3, 1, 0, 2),
            FighterKind::Gorgon => EntityStats::new(5, 0, 5, 0),
        }
    }

    pub fn glyph(self) -> char {
        match self {
            FighterKind::Player => '@',
            FighterKind::Goblin => 'g',
            FighterKind::Troll => 'T',
            FighterKind::Wizard => 'W',
            FighterKind::Gorgon => 'G',
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            FighterKind::Player => Rgb::WHITE,
            FighterKind::Goblin => Rgb::GREEN,
            FighterKind::Troll => Rgb::BROWN,
            FighterKind::Wizard => Rgb::PURPLE,
            FighterKind::Gorgon => Rgb::CYAN,
        }
    }

    pub fn is_player(self) -> bool {
        self == FighterKind::Player
    }
}

/// A combat-capable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: EntityId,
    pub kind: FighterKind,
    pub position: Position,
    /// Displacement requested for the current turn
    pub velocity: Position,
    pub stats: EntityStats,
    /// Counts up to the speed-derived period; the fighter acts on zero
    pub move_counter: i32,
    /// Cycles every tick; wizards only cast when this is also zero
    pub cast_counter: i32,
}

impl Fighter {
    pub fn new(kind: FighterKind, position: Position) -> Self {
        Self {
            id: new_entity_id(),
            kind,
            position,
            velocity: Position::origin(),
            stats: kind.base_stats(),
            move_counter: 0,
            cast_counter: 0,
        }
    }

    pub fn player(position: Position) -> Self {
        Self::new(FighterKind::Player, position)
    }

    /// Ticks between actions; faster fighters act more often.
    pub fn period(&self) -> i32 {
        (BASE_PERIOD - self.stats.speed).max(1)
    }

    /// Whether this tick is one on which the fighter may act.
    pub fn is_turn(&self) -> bool {
        self.move_counter == 0
    }

    /// Advances the move and cast counters at the end of a tick.
    pub fn advance_counter(&mut self) {
        self.move_counter = (self.move_counter + 1) % self.period();
        self.cast_counter = (self.cast_counter + 1) % CAST_PERIOD;
    }
}

impl Entity for Fighter {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn glyph(&self) -> char {
        self.kind.glyph()
    }

    fn color(&self) -> Rgb {
        self.kind.color()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            movable: self.kind != FighterKind::Gorgon,
            damageable: true,
            needs_line_of_sight: true,
            solid: true,
        }
    }

    fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }
}

/// Kinds of pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Exit to the next level
    Ladder,
    /// +1 attack while carried
    Sword,
}

impl PickupKind {
    pub fn glyph(self) -> char {
        match self {
            PickupKind::Ladder => 'H',
            PickupKind::Sword => '/',
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            PickupKind::Ladder => Rgb::YELLOW,
            PickupKind::Sword => Rgb::WHITE,
        }
    }

    /// Whether standing on it moves it into the inventory.
    pub fn is_collectable(self) -> bool {
        matches!(self, PickupKind::Sword)
    }
}

/// An item lying on the floor. Pickups never occupy cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub kind: PickupKind,
    pub position: Position,
}

impl Pickup {
    pub fn new(kind: PickupKind, position: Position) -> Self {
        Self {
            id: new_entity_id(),
            kind,
            position,
        }
    }
}

impl Entity for Pickup {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn glyph(&self) -> char {
        self.kind.glyph()
    }

    fn color(&self) -> Rgb {
        self.kind.color()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            movable: false,
            damageable: false,
            // A seen ladder stays on the map like the walls around it.
            needs_line_of_sight: self.kind != PickupKind::Ladder,
            solid: false,
        }
    }
}

/// Concrete entity variants stored by the game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConcreteEntity {
    Fighter(Fighter),
    Pickup(Pickup),
}

impl ConcreteEntity {
    pub fn as_fighter(&self) -> Option<&Fighter> {
        match self {
            ConcreteEntity::Fighter(fighter) => Some(fighter),
            ConcreteEntity::Pickup(_) => None,
        }
    }

    pub fn as_fighter_mut(&mut self) -> Option<&mut Fighter> {
        match self {
            ConcreteEntity::Fighter(fighter) => Some(fighter),
            ConcreteEntity::Pickup(_) => None,
        }
    }

    pub fn as_pickup(&self) -> Option<&Pickup> {
        match self {
            ConcreteEntity::Pickup(pickup) => Some(pickup),
            ConcreteEntity::Fighter(_) => None,
        }
    }

    fn inner(&self) -> &dyn Entity {
        match self {
            ConcreteEntity::Fighter(fighter) => fighter,
            ConcreteEntity::Pickup(pickup) => pickup,
        }
    }
}

impl Entity for ConcreteEntity {
    fn id(&self) -> EntityId {
        self.inner().id()
    }

    fn position(&self) -> Position {
        self.inner().position()
    }

    fn glyph(&self) -> char {
        self.inner().glyph()
    }

    fn color(&self) -> Rgb {
        self.inner().color()
    }

    fn capabilities(&self) -> Capabilities {
        self.inner().capabilities()
    }

    fn is_alive(&self) -> bool {
        self.inner().is_alive()
    }
}

impl From<Fighter> for ConcreteEntity {
    fn from(fighter: Fighter) -> Self {
        ConcreteEntity::Fighter(fighter)
    }
}

impl From<Pickup> for ConcreteEntity {
    fn from(pickup: Pickup) -> Self {
        ConcreteEntity::Pickup(pickup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_never_negative() {
        let troll = FighterKind::Troll.base_stats();
        let gorgon = FighterKind::Gorgon.base_stats();
        assert_eq!(troll.damage_against(&gorgon), 0);
        assert_eq!(troll.damage_against(&FighterKind::Player.base_stats()), 2);
    }

    #[test]
    fn test_take_damage_reports_death() {
        let mut goblin = FighterKind::Goblin.base_stats();
        assert!(goblin.take_damage(1));
        assert!(!goblin.is_alive());

        let mut troll = FighterKind::Troll.base_stats();
        assert!(!troll.take_damage(1));
        assert_eq!(troll.hp, 4);
    }

    #[test]
    fn test_speed_throttles_turns() {
        let mut player = Fighter::player(Position::new(1, 1));
        assert_eq!(player.period(), 1);
        for _ in 0..3 {
            assert!(player.is_turn());
            player.advance_counter();
        }

        let mut gorgon = Fighter::new(FighterKind::Gorgon, Position::new(1, 1));
        assert_eq!(gorgon.period(), 5);
        let turns = (0..10)
            .filter(|_| {
                let acted = gorgon.is_turn();
                gorgon.advance_counter();
                acted
            })
            .count();
        assert_eq!(turns, 2);
    }

    #[test]
    fn test_period_never_reaches_zero() {
        let mut fighter = Fighter::player(Position::origin());
        fighter.stats.speed = 9;
        assert_eq!(fighter.period(), 1);
        fighter.advance_counter();
        assert!(fighter.is_turn());
    }

    #[test]
    fn test_capabilities() {
        let sword: ConcreteEntity = Pickup::new(PickupKind::Sword, Position::new(2, 2)).into();
        let caps = sword.capabilities();
        assert!(!caps.damageable && !caps.solid);
        assert!(caps.needs_line_of_sight);
        assert_eq!(sword.glyph(), '/');

        let ladder = Pickup::new(PickupKind::Ladder, Position::new(2, 2));
        assert!(!ladder.capabilities().needs_line_of_sight);

        let gorgon: ConcreteEntity = Fighter::new(FighterKind::Gorgon, Position::new(3, 3)).into();
        assert!(!gorgon.capabilities().movable);
        assert!(gorgon.capabilities().damageable);
        assert_eq!(gorgon.position(), Position::new(3, 3));
        assert!(gorgon.as_fighter().is_some());
        assert!(gorgon.as_pickup().is_none());
    }
}
