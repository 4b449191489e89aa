//! # Rendering Module
//!
//! The render-state snapshot handed from the simulation to the presentation
//! layer, and the macroquad display that draws it.
//!
//! A [`RenderSnapshot`] is a fully resolved post-tick copy: the display never
//! reads the live [`GameState`].

pub mod display;

pub use display::*;

use crate::{ConcreteEntity, DelveResult, Entity, GameState, PickupKind, Position, Rgb};
use serde::{Deserialize, Serialize};

/// Whether a renderable is in sight or only remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityState {
    Visible,
    /// Explored earlier but out of sight now
    Remembered,
}

/// One glyph to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderable {
    /// World position of the thing drawn
    pub position: Position,
    /// Cell within the camera window
    pub screen: Position,
    pub glyph: char,
    pub color: Rgb,
    pub visibility: VisibilityState,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub turn: u64,
    pub depth: u32,
    pub player_position: Position,
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub inventory: Vec<PickupKind>,
    pub view_width: u32,
    pub view_height: u32,
    /// Layer order: tiles, pickups, fighters, effects
    pub renderables: Vec<Renderable>,
}

impl RenderSnapshot {
    /// Captures the camera window around the player.
    pub fn capture(state: &GameState) -> Self {
        let origin = state.camera_origin();
        let (view_width, view_height) = (state.config.view_width, state.config.view_height);
        let level = &state.level;

        let tiles = level.grid.window_map(origin, view_width, view_height, |world, cell| {
            let visibility = if state.is_visible(world) {
                VisibilityState::Visible
            } else if cell.tile.is_explored() {
                VisibilityState::Remembered
            } else {
                return None;
            };
            let tile_type = cell.tile.tile_type;
            Some((world, tile_type.glyph(), tile_type.color(), visibility))
        });

        let mut renderables: Vec<Renderable> = tiles
            .iter()
            .filter_map(|(screen, tile)| {
                tile.map(|(position, glyph, color, visibility)| Renderable {
                    position,
                    screen,
                    glyph,
                    color,
                    visibility,
                })
            })
            .collect();

        // Entities that do not need line of sight stay drawn on explored cells.
        let to_screen = |world: Position, needs_sight: bool| {
            let explored = level.get_tile(world).map_or(false, |t| t.is_explored());
            let visibility = if state.is_visible(world) {
                VisibilityState::Visible
            } else if !needs_sight && explored {
                VisibilityState::Remembered
            } else {
                return None;
            };
            let offset = world - origin;
            let screen = Position::new(
                offset.x.rem_euclid(level.width() as i32),
                offset.y.rem_euclid(level.height() as i32),
            );
            let inside = screen.x < view_width as i32 && screen.y < view_height as i32;
            inside.then_some((screen, visibility))
        };
        let glyph_for = |entity: &dyn Entity| {
            let position = entity.position();
            to_screen(position, entity.capabilities().needs_line_of_sight).map(
                |(screen, visibility)| Renderable {
                    position,
                    screen,
                    glyph: entity.glyph(),
                    color: entity.color(),
                    visibility,
                },
            )
        };

        let mut pickups: Vec<Renderable> = state
            .entities
            .values()
            .filter_map(ConcreteEntity::as_pickup)
            .filter_map(|pickup| glyph_for(pickup as &dyn Entity))
            .collect();
        let fighters = state
            .fighters()
            .filter(|fighter| fighter.stats.is_alive())
            .filter_map(|fighter| glyph_for(fighter as &dyn Entity));
        let effects = state.effects.iter().filter_map(|effect| {
            to_screen(effect.position, true).map(|(screen, visibility)| Renderable {
                position: effect.position,
                screen,
                glyph: effect.glyph(),
                color: effect.color(),
                visibility,
            })
        });

        pickups.sort_by_key(|r| (r.screen.y, r.screen.x));
        renderables.extend(pickups);
        renderables.extend(fighters);
        renderables.extend(effects);

        let player = state.player();
        Self {
            turn: state.turn_number,
            depth: level.depth,
            player_position: player.map(|p| p.position).unwrap_or(level.player_start),
            player_hp: player.map(|p| p.stats.hp).unwrap_or(0),
            player_max_hp: player.map(|p| p.stats.max_hp).unwrap_or(0),
            inventory: state.inventory.clone(),
            view_width,
            view_height,
            renderables,
        }
    }

    /// Serializes the snapshot for a renderer in another process.
    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The topmost renderable at a screen cell.
    pub fn top_at(&self, screen: Position) -> Option<&Renderable> {
        self.renderables.iter().rev().find(|r| r.screen == screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fighter, FighterKind, GameConfig, Pickup};

    fn quiet_game(seed: u64) -> GameState {
        let mut state = GameState::new(GameConfig::for_testing(seed)).unwrap();
        state.clear_monsters();
        state
    }

    #[test]
    fn test_player_drawn_at_window_centre() {
        let state = quiet_game(21);
        let snapshot = state.snapshot();
        let centre = Position::new(
            state.config.view_width as i32 / 2,
            state.config.view_height as i32 / 2,
        );
        let top = snapshot.top_at(centre).unwrap();
        assert_eq!(top.glyph, '@');
        assert_eq!(top.position, snapshot.player_position);
        assert_eq!(snapshot.player_hp, 99);
    }

    #[test]
    fn test_only_explored_tiles_are_drawn() {
        let state = quiet_game(21);
        let snapshot = state.snapshot();
        for renderable in &snapshot.renderables {
            let tile = state.level.get_tile(renderable.position).unwrap();
            assert!(tile.is_explored());
            assert!(renderable.screen.x < snapshot.view_width as i32);
            assert!(renderable.screen.y < snapshot.view_height as i32);
        }
    }

    #[test]
    fn test_hidden_monsters_are_not_drawn() {
        let mut state = quiet_game(21);
        let hidden = state
            .level
            .grid
            .iter()
            .find(|(pos, cell)| !cell.is_solid() && !state.is_visible(*pos))
            .map(|(pos, _)| pos)
            .unwrap();
        state
            .spawn_fighter(Fighter::new(FighterKind::Goblin, hidden))
            .unwrap();

        let snapshot = state.snapshot();
        assert!(snapshot.renderables.iter().all(|r| r.glyph != 'g'));
    }

    #[test]
    fn test_remembered_ladder_stays_drawn() {
        let mut state = quiet_game(21);
        let hidden = state
            .level
            .grid
            .iter()
            .find(|(pos, cell)| {
                !cell.is_solid() && !state.is_visible(*pos) && *pos != state.level.player_start
            })
            .map(|(pos, _)| pos)
            .unwrap();
        state.level.grid[hidden].tile.mark_explored();
        state.entities.retain(|_, e| e.as_pickup().is_none());
        state
            .spawn(Pickup::new(PickupKind::Ladder, hidden).into())
            .unwrap();
        state.spawn(Pickup::new(PickupKind::Sword, hidden).into()).unwrap();

        // Keep the hidden cell inside the window.
        state.config.view_width = state.level.width();
        state.config.view_height = state.level.height();
        let snapshot = state.snapshot();
        let drawn: Vec<&Renderable> = snapshot
            .renderables
            .iter()
            .filter(|r| {
                r.position == hidden && r.glyph != state.level.grid[hidden].tile.tile_type.glyph()
            })
            .collect();
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].glyph, PickupKind::Ladder.glyph());
        assert_eq!(drawn[0].visibility, VisibilityState::Remembered);
    }

    #[test]
    fn test_each_visible_fighter_drawn_once() {
        let state = GameState::new(GameConfig::for_testing(8)).unwrap();
        let snapshot = state.snapshot();
        for fighter in state.fighters().filter(|f| state.is_visible(f.position)) {
            let copies = snapshot
                .renderables
                .iter()
                .filter(|r| r.position == fighter.position && r.glyph == fighter.glyph())
                .count();
            assert_eq!(copies, 1);
        }
    }

    #[test]
    fn test_snapshot_json_export() {
        let snapshot = quiet_game(2).snapshot();
        let json = snapshot.to_json().unwrap();
        let back: RenderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
