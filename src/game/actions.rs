//! # Actions
//!
//! Everything a fighter can do on its turn, expressed as values that are
//! validated and then executed against the [`GameState`].
//!
//! Intents are gathered as velocities first; during resolution each velocity
//! becomes either a [`MoveAction`] or, when the target cell holds another
//! damageable fighter, an [`AttackAction`].

use crate::{DelveError, DelveResult, Entity, EntityId, GameEvent, GameState, Position};
use serde::{Deserialize, Serialize};

/// Outcome of a successfully executed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionResult {
    /// The actor stepped from one cell to another
    Moved { from: Position, to: Position },
    /// The actor hit another fighter
    Attacked {
        target: EntityId,
        damage: i32,
        killed: bool,
    },
    /// The destination was solid; nothing happened
    Blocked,
}

/// A turn-consuming action.
pub trait Action {
    /// The fighter performing the action.
    fn actor(&self) -> EntityId;

    /// Checks that the action is well formed for the current state.
    fn validate(&self, state: &GameState) -> DelveResult<()>;

    /// Applies the action, queueing any resulting events on the state.
    fn execute(&self, state: &mut GameState) -> DelveResult<ActionResult>;
}

/// Steps one cell in the direction of `delta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAction {
    pub actor: EntityId,
    pub delta: Position,
}

impl MoveAction {
    pub fn new(actor: EntityId, delta: Position) -> Self {
        Self { actor, delta }
    }
}

impl Action for MoveAction {
    fn actor(&self) -> EntityId {
        self.actor
    }

    fn validate(&self, state: &GameState) -> DelveResult<()> {
        let fighter = state
            .fighter(self.actor)
            .ok_or_else(|| DelveError::InvalidAction(format!("no fighter {}", self.actor)))?;
        if !fighter.capabilities().movable {
            return Err(DelveError::InvalidAction(format!(
                "{:?} cannot move",
                fighter.kind
            )));
        }
        if self.delta.x.abs() > 1 || self.delta.y.abs() > 1 {
            return Err(DelveError::InvalidAction(format!(
                "step {:?} is longer than one cell",
                self.delta
            )));
        }
        Ok(())
    }

    fn execute(&self, state: &mut GameState) -> DelveResult<ActionResult> {
        self.validate(state)?;

        let from = state
            .fighter(self.actor)
            .map(|fighter| fighter.position)
            .ok_or_else(|| DelveError::InvalidAction(format!("no fighter {}", self.actor)))?;
        let to = from + self.delta;
        if self.delta.is_zero() || state.level.is_blocked(to) {
            return Ok(ActionResult::Blocked);
        }

        state.relocate(self.actor, from, to)?;
        state.push_event(GameEvent::EntityMoved {
            entity_id: self.actor,
            from,
            to,
        });
        Ok(ActionResult::Moved { from, to })
    }
}

/// Melee attack against an adjacent fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackAction {
    pub attacker: EntityId,
    pub target: EntityId,
}

impl AttackAction {
    pub fn new(attacker: EntityId, target: EntityId) -> Self {
        Self { attacker, target }
    }
}

impl Action for AttackAction {
    fn actor(&self) -> EntityId {
        self.attacker
    }

    fn validate(&self, state: &GameState) -> DelveResult<()> {
        if self.attacker == self.target {
            return Err(DelveError::InvalidAction(
                "a fighter cannot attack itself".to_string(),
            ));
        }
        let attacker = state
            .fighter(self.attacker)
            .ok_or_else(|| DelveError::InvalidAction(format!("no attacker {}", self.attacker)))?;
        let target = state
            .fighter(self.target)
            .ok_or_else(|| DelveError::InvalidAction(format!("no target {}", self.target)))?;

        let gap = target.position - attacker.position;
        if gap.x.abs() > 1 || gap.y.abs() > 1 {
            return Err(DelveError::InvalidAction(format!(
                "target at {:?} is out of reach from {:?}",
                target.position, attacker.position
            )));
        }
        Ok(())
    }

    fn execute(&self, state: &mut GameState) -> DelveResult<ActionResult> {
        self.validate(state)?;

        let damage = match (state.fighter(self.attacker), state.fighter(self.target)) {
            (Some(attacker), Some(target)) => attacker.stats.damage_against(&target.stats),
            _ => return Ok(ActionResult::Blocked),
        };
        let killed = state.apply_damage(self.target, damage, Some(self.attacker))?;
        Ok(ActionResult::Attacked {
            target: self.target,
            damage,
            killed,
        })
    }
}

/// Concrete action variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteAction {
    Move(MoveAction),
    Attack(AttackAction),
}

impl ConcreteAction {
    /// Turns a requested velocity into an action: an attack when the target
    /// cell holds another damageable fighter, a move otherwise. A zero
    /// velocity is no action at all.
    pub fn from_velocity(state: &GameState, actor: EntityId, velocity: Position) -> Option<Self> {
        if velocity.is_zero() {
            return None;
        }
        let position = state.fighter(actor)?.position;
        let target = position + velocity;

        let defender = state
            .level
            .grid
            .get(target)
            .and_then(|cell| cell.occupant)
            .filter(|&id| id != actor)
            .and_then(|id| state.fighter(id))
            .filter(|fighter| fighter.capabilities().damageable);

        Some(match defender {
            Some(defender) => ConcreteAction::Attack(AttackAction::new(actor, defender.id)),
            None => ConcreteAction::Move(MoveAction::new(actor, velocity)),
        })
    }
}

impl Action for ConcreteAction {
    fn actor(&self) -> EntityId {
        match self {
            ConcreteAction::Move(action) => action.actor(),
            ConcreteAction::Attack(action) => action.actor(),
        }
    }

    fn validate(&self, state: &GameState) -> DelveResult<()> {
        match self {
            ConcreteAction::Move(action) => action.validate(state),
            ConcreteAction::Attack(action) => action.validate(state),
        }
    }

    fn execute(&self, state: &mut GameState) -> DelveResult<ActionResult> {
        match self {
            ConcreteAction::Move(action) => action.execute(state),
            ConcreteAction::Attack(action) => action.execute(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fighter, FighterKind, GameConfig};

    /// A game on a small seeded map with every monster removed, so tests can
    /// place fighters by hand.
    fn quiet_game() -> GameState {
        let mut state = GameState::new(GameConfig::for_testing(7)).unwrap();
        state.clear_monsters();
        state
    }

    fn open_neighbour(state: &GameState, from: Position) -> Position {
        from.cardinal_adjacent_positions()
            .into_iter()
            .find(|&pos| !state.level.is_blocked(pos))
            .unwrap()
    }

    #[test]
    fn test_move_into_open_floor() {
        let mut state = quiet_game();
        let player = state.player_id;
        let from = state.player().unwrap().position;
        let to = open_neighbour(&state, from);

        let result = MoveAction::new(player, to - from).execute(&mut state).unwrap();
        assert_eq!(result, ActionResult::Moved { from, to });
        assert_eq!(state.level.grid[to].occupant, Some(player));
        assert_eq!(state.level.grid[from].occupant, None);
    }

    #[test]
    fn test_move_into_wall_is_blocked() {
        let mut state = quiet_game();
        let player = state.player_id;
        let from = state.player().unwrap().position;
        let wall = (-5..=5)
            .flat_map(|dy| (-5..=5).map(move |dx| Position::new(dx, dy)))
            .map(|d| from + d)
            .find(|&pos| state.level.is_blocked(pos) && (pos - from).x.abs() <= 1 && (pos - from).y.abs() <= 1);

        if let Some(wall) = wall {
            let result = MoveAction::new(player, wall - from).execute(&mut state).unwrap();
            assert_eq!(result, ActionResult::Blocked);
            assert_eq!(state.player().unwrap().position, from);
        }
    }

    #[test]
    fn test_long_steps_are_rejected() {
        let state = quiet_game();
        let action = MoveAction::new(state.player_id, Position::new(2, 0));
        assert!(matches!(
            action.validate(&state),
            Err(DelveError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_velocity_into_fighter_becomes_attack() {
        let mut state = quiet_game();
        let player = state.player_id;
        let from = state.player().unwrap().position;
        let spot = open_neighbour(&state, from);
        let troll = state
            .spawn_fighter(Fighter::new(FighterKind::Troll, spot))
            .unwrap();

        let action = ConcreteAction::from_velocity(&state, player, spot - from).unwrap();
        assert_eq!(action, ConcreteAction::Attack(AttackAction::new(player, troll)));

        // Player attack 1 against troll defense 2 does nothing.
        let result = action.execute(&mut state).unwrap();
        assert_eq!(
            result,
            ActionResult::Attacked {
                target: troll,
                damage: 0,
                killed: false
            }
        );
        assert_eq!(state.player().unwrap().position, from);
    }

    #[test]
    fn test_lethal_attack_frees_the_cell() {
        let mut state = quiet_game();
        let player = state.player_id;
        let from = state.player().unwrap().position;
        let spot = open_neighbour(&state, from);
        let goblin = state
            .spawn_fighter(Fighter::new(FighterKind::Goblin, spot))
            .unwrap();

        let result = AttackAction::new(player, goblin).execute(&mut state).unwrap();
        assert!(matches!(result, ActionResult::Attacked { killed: true, .. }));
        assert!(state.fighter(goblin).is_none());
        assert_eq!(state.level.grid[spot].occupant, None);
    }

    #[test]
    fn test_zero_velocity_is_no_action() {
        let state = quiet_game();
        assert!(ConcreteAction::from_velocity(&state, state.player_id, Position::origin()).is_none());
    }
}
