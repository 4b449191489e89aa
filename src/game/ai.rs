//! # Monster Behaviour
//!
//! Per-species decisions, made once per tick for every monster before any
//! movement is resolved. A decision only requests things: a velocity and
//! optionally a spell. The game state resolves them afterwards.

use crate::{visible, Fighter, FighterKind, Level, Position};
use rand::rngs::StdRng;
use rand::Rng;

/// Spells a monster can cast instead of moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spell {
    /// Wizard fireball aimed at the given cell
    Fireball { target: Position },
    /// Gorgon glare slowing the player
    StoneGlare,
}

/// What a monster wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub velocity: Position,
    pub spell: Option<Spell>,
}

impl Decision {
    fn step(velocity: Position) -> Self {
        Self {
            velocity,
            spell: None,
        }
    }

    fn cast(spell: Spell) -> Self {
        Self {
            velocity: Position::origin(),
            spell: Some(spell),
        }
    }
}

/// One unit step toward a target `distance` away along `delta`, rounding
/// each axis half to even.
///
/// # Examples
///
/// ```
/// use delve::{chase_step, Position};
///
/// let delta = Position::new(4, 3);
/// assert_eq!(chase_step(delta, 5.0), Position::new(1, 1));
/// assert_eq!(chase_step(Position::new(5, 0), 5.0), Position::new(1, 0));
/// ```
pub fn chase_step(delta: Position, distance: f64) -> Position {
    let axis = |d: i32| (d as f64 / distance).round_ties_even() as i32;
    Position::new(axis(delta.x), axis(delta.y))
}

/// A random step in any of the eight directions, or standing still.
pub fn wander(rng: &mut StdRng) -> Position {
    Position::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1))
}

/// Decides a monster's intent for this tick.
///
/// Only fighters whose turn it is get a non-idle decision, except that a
/// wizard's fireball additionally waits on its own cast counter.
pub fn decide(
    monster: &Fighter,
    player: &Fighter,
    level: &Level,
    cast_range: f64,
    rng: &mut StdRng,
) -> Decision {
    if !monster.is_turn() || !player.stats.is_alive() {
        return Decision::default();
    }

    let sight = visible(level, monster.position, player.position);
    let in_range = sight.distance().map(|d| d > 0.0 && d < cast_range).unwrap_or(false);

    match monster.kind {
        FighterKind::Goblin | FighterKind::Troll => match sight.distance() {
            Some(distance) if distance >= 2.0 => {
                Decision::step(chase_step(player.position - monster.position, distance))
            }
            // Adjacent: stepping into the player is an attack.
            Some(_) => Decision::step(player.position - monster.position),
            None => Decision::step(wander(rng)),
        },
        FighterKind::Wizard => {
            if in_range && monster.cast_counter == 0 {
                Decision::cast(Spell::Fireball {
                    target: player.position,
                })
            } else if sight.is_visible() {
                Decision::default()
            } else {
                Decision::step(wander(rng))
            }
        }
        FighterKind::Gorgon => {
            if in_range {
                Decision::cast(Spell::StoneGlare)
            } else {
                Decision::default()
            }
        }
        FighterKind::Player => Decision::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeneratorVariant, Tile};
    use rand::SeedableRng;

    fn arena() -> Level {
        let mut level = Level::new(0, GeneratorVariant::RoomsAndCorridors, 21, 9);
        for y in 1..8 {
            for x in 1..20 {
                level.set_tile(Position::new(x, y), Tile::floor()).unwrap();
            }
        }
        level
    }

    #[test]
    fn test_chase_step_rounds_half_to_even() {
        // 0.5 rounds down to the even neighbour.
        assert_eq!(chase_step(Position::new(2, 2), 4.0), Position::new(0, 0));
        assert_eq!(chase_step(Position::new(-6, 2), 40f64.sqrt()), Position::new(-1, 0));
    }

    #[test]
    fn test_goblin_chases_visible_player() {
        let level = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let goblin = Fighter::new(FighterKind::Goblin, Position::new(2, 4));
        let player = Fighter::player(Position::new(10, 4));

        let decision = decide(&goblin, &player, &level, 10.0, &mut rng);
        assert_eq!(decision.velocity, Position::new(1, 0));
        assert_eq!(decision.spell, None);
    }

    #[test]
    fn test_adjacent_troll_steps_into_player() {
        let level = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let troll = Fighter::new(FighterKind::Troll, Position::new(5, 5));
        let player = Fighter::player(Position::new(6, 4));

        let decision = decide(&troll, &player, &level, 10.0, &mut rng);
        assert_eq!(decision.velocity, Position::new(1, -1));
    }

    #[test]
    fn test_wizard_casts_in_range_and_waits_on_counter() {
        let level = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let mut wizard = Fighter::new(FighterKind::Wizard, Position::new(3, 4));
        let player = Fighter::player(Position::new(9, 4));

        let decision = decide(&wizard, &player, &level, 10.0, &mut rng);
        assert_eq!(
            decision.spell,
            Some(Spell::Fireball {
                target: player.position
            })
        );

        wizard.cast_counter = 2;
        let decision = decide(&wizard, &player, &level, 10.0, &mut rng);
        assert_eq!(decision, Decision::default());
    }

    #[test]
    fn test_gorgon_glares_but_never_moves() {
        let level = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let gorgon = Fighter::new(FighterKind::Gorgon, Position::new(3, 4));

        let near = Fighter::player(Position::new(8, 4));
        let decision = decide(&gorgon, &near, &level, 10.0, &mut rng);
        assert_eq!(decision.spell, Some(Spell::StoneGlare));
        assert!(decision.velocity.is_zero());

        let far = Fighter::player(Position::new(18, 4));
        assert_eq!(decide(&gorgon, &far, &level, 10.0, &mut rng), Decision::default());
    }

    #[test]
    fn test_hidden_player_means_wandering() {
        let mut level = arena();
        for y in 1..8 {
            level.set_tile(Position::new(10, y), Tile::wall()).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(5);
        let goblin = Fighter::new(FighterKind::Goblin, Position::new(5, 4));
        let player = Fighter::player(Position::new(15, 4));
        for _ in 0..20 {
            let step = decide(&goblin, &player, &level, 10.0, &mut rng).velocity;
            assert!(step.x.abs() <= 1 && step.y.abs() <= 1);
        }
    }

    #[test]
    fn test_off_turn_monsters_idle() {
        let level = arena();
        let mut rng = StdRng::seed_from_u64(1);
        let mut goblin = Fighter::new(FighterKind::Goblin, Position::new(2, 4));
        goblin.move_counter = 1;
        let player = Fighter::player(Position::new(10, 4));
        assert_eq!(decide(&goblin, &player, &level, 10.0, &mut rng), Decision::default());
    }
}
