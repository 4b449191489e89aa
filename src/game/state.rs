//! # Game State Module
//!
//! The tick-driven simulation and the host-facing event policy.
//!
//! [`GameState`] owns the current level, every entity on it, transient
//! effects and an event queue. One call to [`GameState::tick`] runs a fixed
//! sequence of phases:
//!
//! 1. Gather intents: the player's velocity from the held keys, monster
//!    velocities and spells from their behaviour
//! 2. Resolve movement and melee in turn order
//! 3. Update effects (fireballs, hit markers, stone glares)
//! 4. Collect pickups and detect checkpoints and exits
//! 5. Update exploration memory from the player's line of sight
//! 6. Hand back a render snapshot
//!
//! Level transitions never happen inside a tick. The tick only queues
//! events; [`GameState::process_events`] drains the queue and applies them.

use crate::config::{CAST_RANGE, TICK_SECONDS, VIEW_HEIGHT, VIEW_WIDTH};
use crate::generation::{new_level, GenerationConfig, GeneratorVariant, NewLevel};
use crate::input::{Keypresses, MovementMode};
use crate::rendering::RenderSnapshot;
use crate::{
    decide, visible, Action, ActionResult, ConcreteAction, ConcreteEntity, DelveError,
    DelveResult, Effect, EffectKind, Entity, EntityId, Fighter, FighterKind, Fireball, Level,
    PickupKind, Position, Spell, TileType,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

/// Runtime configuration, loadable from JSON. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Level generation settings, including the seed
    pub generation: GenerationConfig,
    /// Generator used for every level of the run
    pub variant: GeneratorVariant,
    /// How held direction keys combine
    pub movement: MovementMode,
    /// Camera window width in tiles
    pub view_width: u32,
    /// Camera window height in tiles
    pub view_height: u32,
    /// Distance inside which monsters cast at the player
    pub cast_range: f64,
    /// Seconds per tick for the interactive front-end
    pub tick_seconds: f32,
}

impl GameConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::new(seed),
            variant: GeneratorVariant::RoomsAndCorridors,
            movement: MovementMode::EightWay,
            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,
            cast_range: CAST_RANGE,
            tick_seconds: TICK_SECONDS,
        }
    }

    /// Small levels for fast tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::for_testing(seed),
            view_width: 21,
            view_height: 21,
            ..Self::new(seed)
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn load(path: &Path) -> DelveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` when given, falling back to defaults for `seed` when it
    /// is absent or unreadable.
    pub fn load_or_default(path: Option<&Path>, seed: u64) -> Self {
        match path.map(Self::load) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn!("Ignoring config file: {}", e);
                Self::new(seed)
            }
            None => Self::new(seed),
        }
    }

    pub fn validate(&self) -> DelveResult<()> {
        self.generation.validate()?;
        if self.view_width == 0 || self.view_height == 0 {
            return Err(DelveError::InvalidConfig(format!(
                "view must be at least 1x1, got {}x{}",
                self.view_width, self.view_height
            )));
        }
        // A wider window would show wrapped tiles twice but entities once.
        if self.view_width > self.generation.width || self.view_height > self.generation.height {
            return Err(DelveError::InvalidConfig(format!(
                "view {}x{} is larger than the {}x{} map",
                self.view_width, self.view_height, self.generation.width, self.generation.height
            )));
        }
        if !(self.tick_seconds > 0.0) {
            return Err(DelveError::InvalidConfig(format!(
                "tick_seconds must be positive, got {}",
                self.tick_seconds
            )));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Something that happened during a tick, for the host to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntityMoved {
        entity_id: EntityId,
        from: Position,
        to: Position,
    },
    EntityDamaged {
        entity_id: EntityId,
        damage: i32,
        source: Option<EntityId>,
    },
    /// A monster died and was removed
    EntityDied {
        entity_id: EntityId,
        killer: Option<EntityId>,
    },
    ItemPickedUp {
        kind: PickupKind,
    },
    /// The player stepped onto a bonfire
    CheckpointReached {
        position: Position,
    },
    /// The player stepped onto the ladder of the level at `depth`
    LevelExitReached {
        depth: u32,
    },
    PlayerDied,
    QuitRequested,
}

impl GameEvent {
    /// A one-line message for the host's log window, if the event merits one.
    pub fn describe(&self) -> Option<String> {
        match self {
            GameEvent::ItemPickedUp { kind } => Some(format!("You pick up the {:?}.", kind)),
            GameEvent::CheckpointReached { .. } => Some("The bonfire warms you.".to_string()),
            GameEvent::LevelExitReached { depth } => {
                Some(format!("You climb down to depth {}.", depth + 1))
            }
            GameEvent::PlayerDied => Some("You die... and wake at the last bonfire.".to_string()),
            GameEvent::EntityDied { .. } => Some("A monster falls.".to_string()),
            _ => None,
        }
    }
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Monsters killed by the player
    pub enemies_defeated: u32,
    /// Pickups moved into the inventory
    pub items_collected: u32,
    /// Damage the player inflicted
    pub damage_dealt: u64,
    /// Damage the player received
    pub damage_taken: u64,
    pub deaths: u32,
    pub checkpoints_reached: u32,
    /// Deepest level reached, starting at 0
    pub max_depth_reached: u32,
    /// Successful player moves
    pub steps_taken: u64,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics from an event; `player` tells the player's events
    /// apart from everyone else's.
    pub fn update_from_event(&mut self, event: &GameEvent, player: EntityId) {
        match event {
            GameEvent::EntityMoved { entity_id, .. } if *entity_id == player => {
                self.steps_taken += 1;
            }
            GameEvent::EntityDamaged {
                entity_id, damage, ..
            } if *entity_id == player => {
                self.damage_taken += *damage as u64;
            }
            GameEvent::EntityDamaged { damage, source, .. } if *source == Some(player) => {
                self.damage_dealt += *damage as u64;
            }
            GameEvent::EntityDied { killer, .. } if *killer == Some(player) => {
                self.enemies_defeated += 1;
            }
            GameEvent::ItemPickedUp { .. } => self.items_collected += 1,
            GameEvent::CheckpointReached { .. } => self.checkpoints_reached += 1,
            GameEvent::LevelExitReached { depth } => {
                self.max_depth_reached = self.max_depth_reached.max(depth + 1);
            }
            GameEvent::PlayerDied => self.deaths += 1,
            _ => {}
        }
    }
}

/// Whether the run is still going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCompletionState {
    Playing,
    /// The player asked to quit
    Quit,
}

/// Result of advancing one effect by a tick.
enum EffectTick {
    Keep,
    Expire,
    Hit {
        target: EntityId,
        attack: i32,
        caster: EntityId,
    },
}

/// Central game state.
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    /// The level being played
    pub level: Level,
    /// Every live entity on the level, by ID
    pub entities: HashMap<EntityId, ConcreteEntity>,
    /// Fighters in resolution order; the player always comes first
    pub turn_order: Vec<EntityId>,
    pub player_id: EntityId,
    pub effects: Vec<Effect>,
    /// Pickups carried by the player
    pub inventory: Vec<PickupKind>,
    /// Inventory as of the last bonfire, restored on death
    pub checkpoint_inventory: Vec<PickupKind>,
    pub turn_number: u64,
    pub statistics: GameStatistics,
    pub completion_state: GameCompletionState,
    events: VecDeque<GameEvent>,
    /// Cells in the player's line of sight as of the last tick
    visible: HashSet<Position>,
    rng: StdRng,
}

impl GameState {
    /// Starts a run on a freshly generated level at depth 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GameConfig, GameState};
    ///
    /// let state = GameState::new(GameConfig::for_testing(5)).unwrap();
    /// let player = state.player().unwrap();
    /// assert_eq!(player.position, state.level.player_start);
    /// assert!(state.is_visible(player.position));
    /// ```
    pub fn new(config: GameConfig) -> DelveResult<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.generation.seed);
        let NewLevel { level, entities } =
            new_level(config.variant, 0, &config.generation, &mut rng)?;
        let player = Fighter::player(level.player_start);

        let mut state = Self {
            config,
            level,
            entities: HashMap::new(),
            turn_order: Vec::new(),
            player_id: player.id,
            effects: Vec::new(),
            inventory: Vec::new(),
            checkpoint_inventory: Vec::new(),
            turn_number: 0,
            statistics: GameStatistics::new(),
            completion_state: GameCompletionState::Playing,
            events: VecDeque::new(),
            visible: HashSet::new(),
            rng,
        };
        state.spawn_all(player, entities)?;

        info!(
            "New {} game with seed {}",
            state.config.variant, state.config.generation.seed
        );
        Ok(state)
    }

    pub fn fighter(&self, id: EntityId) -> Option<&Fighter> {
        self.entities.get(&id).and_then(ConcreteEntity::as_fighter)
    }

    pub fn fighter_mut(&mut self, id: EntityId) -> Option<&mut Fighter> {
        self.entities
            .get_mut(&id)
            .and_then(ConcreteEntity::as_fighter_mut)
    }

    pub fn player(&self) -> Option<&Fighter> {
        self.fighter(self.player_id)
    }

    pub fn player_mut(&mut self) -> Option<&mut Fighter> {
        let id = self.player_id;
        self.fighter_mut(id)
    }

    /// Fighters in turn order.
    pub fn fighters(&self) -> impl Iterator<Item = &Fighter> + '_ {
        self.turn_order.iter().filter_map(|id| self.fighter(*id))
    }

    /// Whether `pos` was in the player's line of sight at the end of the last tick.
    pub fn is_visible(&self, pos: Position) -> bool {
        self.visible.contains(&pos)
    }

    pub fn visible_positions(&self) -> &HashSet<Position> {
        &self.visible
    }

    /// Events queued since the last [`process_events`](Self::process_events).
    pub fn pending_events(&self) -> impl Iterator<Item = &GameEvent> + '_ {
        self.events.iter()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    pub fn is_finished(&self) -> bool {
        self.completion_state != GameCompletionState::Playing
    }

    /// Top-left corner of the camera window centred on the player.
    pub fn camera_origin(&self) -> Position {
        let centre = self
            .player()
            .map(|player| player.position)
            .unwrap_or(self.level.player_start);
        let view = Position::new(self.config.view_width as i32, self.config.view_height as i32);
        centre - view.div_floor(2)
    }

    /// Places an entity on the level. Solid entities claim their cell and
    /// fighters get a turn slot.
    pub fn spawn(&mut self, entity: ConcreteEntity) -> DelveResult<EntityId> {
        let id = entity.id();
        let pos = entity.position();
        let cell = self
            .level
            .grid
            .get_mut(pos)
            .ok_or(DelveError::OutOfBounds { position: pos })?;
        if entity.capabilities().solid {
            if cell.tile.is_solid() || cell.occupant.map_or(false, |other| other != id) {
                return Err(DelveError::InvalidState(format!(
                    "cannot place '{}' on blocked cell {:?}",
                    entity.glyph(),
                    pos
                )));
            }
            cell.occupant = Some(id);
        }

        if entity.as_fighter().is_some() {
            self.turn_order.push(id);
        }
        self.entities.insert(id, entity);
        Ok(id)
    }

    pub fn spawn_fighter(&mut self, fighter: Fighter) -> DelveResult<EntityId> {
        self.spawn(fighter.into())
    }

    /// Removes every fighter except the player.
    pub fn clear_monsters(&mut self) {
        let monsters: Vec<EntityId> = self
            .turn_order
            .iter()
            .copied()
            .filter(|&id| id != self.player_id)
            .collect();
        for id in monsters {
            self.remove_fighter(id);
        }
    }

    fn remove_fighter(&mut self, id: EntityId) {
        if let Some(ConcreteEntity::Fighter(fighter)) = self.entities.remove(&id) {
            if let Some(cell) = self.level.grid.get_mut(fighter.position) {
                if cell.occupant == Some(id) {
                    cell.occupant = None;
                }
            }
        }
        self.turn_order.retain(|&other| other != id);
    }

    /// Moves a fighter's occupancy from one cell to another.
    pub fn relocate(&mut self, id: EntityId, from: Position, to: Position) -> DelveResult<()> {
        if !self.level.grid.in_bounds(to) {
            return Err(DelveError::OutOfBounds { position: to });
        }
        let fighter = self
            .fighter_mut(id)
            .ok_or_else(|| DelveError::InvalidState(format!("no fighter {}", id)))?;
        fighter.position = to;
        if !fighter.capabilities().solid {
            return Ok(());
        }

        if let Some(cell) = self.level.grid.get_mut(from) {
            if cell.occupant == Some(id) {
                cell.occupant = None;
            }
        }
        self.level
            .grid
            .get_mut(to)
            .ok_or(DelveError::OutOfBounds { position: to })?
            .occupant = Some(id);
        Ok(())
    }

    /// Deals damage to a fighter and reports whether it died.
    ///
    /// A dead monster is removed at once. A dead player stays on the level
    /// until [`process_events`](Self::process_events) handles `PlayerDied`.
    pub fn apply_damage(
        &mut self,
        target: EntityId,
        damage: i32,
        source: Option<EntityId>,
    ) -> DelveResult<bool> {
        let fighter = self
            .fighter_mut(target)
            .ok_or_else(|| DelveError::InvalidState(format!("no fighter {}", target)))?;
        let was_alive = fighter.stats.is_alive();
        let lethal = fighter.stats.take_damage(damage) && was_alive;
        let position = fighter.position;
        let is_player = fighter.kind.is_player();

        self.effects.push(Effect::hit_marker(position));
        self.push_event(GameEvent::EntityDamaged {
            entity_id: target,
            damage,
            source,
        });

        if lethal {
            if is_player {
                info!("Player died at {:?}", position);
                self.push_event(GameEvent::PlayerDied);
            } else {
                debug!("Fighter {} died at {:?}", target, position);
                self.remove_fighter(target);
                self.push_event(GameEvent::EntityDied {
                    entity_id: target,
                    killer: source,
                });
            }
        }
        Ok(lethal)
    }

    /// Runs one simulation tick and returns the resulting snapshot.
    pub fn tick(&mut self, keys: &Keypresses) -> DelveResult<RenderSnapshot> {
        if self.is_finished() {
            return Ok(self.snapshot());
        }
        if keys.quit_requested() {
            self.push_event(GameEvent::QuitRequested);
        }

        let entry = match self.player() {
            Some(player) if player.stats.is_alive() => player.position,
            // Waiting for the host to handle the death.
            _ => return Ok(self.snapshot()),
        };

        self.gather_intents(keys);
        self.resolve_turns()?;
        self.update_effects()?;
        self.collect_pickups(entry);
        self.update_exploration();
        self.turn_number += 1;

        Ok(self.snapshot())
    }

    fn gather_intents(&mut self, keys: &Keypresses) {
        let movement = self.config.movement;
        let player = match self.player_mut() {
            Some(player) => {
                if player.is_turn() {
                    player.velocity = keys.velocity(movement);
                }
                player.clone()
            }
            None => return,
        };

        let mut spells = Vec::new();
        for id in self.turn_order.clone() {
            if id == self.player_id {
                continue;
            }
            let decision = match self.entities.get(&id).and_then(ConcreteEntity::as_fighter) {
                Some(monster) => decide(
                    monster,
                    &player,
                    &self.level,
                    self.config.cast_range,
                    &mut self.rng,
                ),
                None => continue,
            };
            if let Some(monster) = self.fighter_mut(id) {
                monster.velocity = decision.velocity;
            }
            if let Some(spell) = decision.spell {
                spells.push((id, spell));
            }
        }

        for (caster, spell) in spells {
            self.cast(caster, spell);
        }
    }

    fn cast(&mut self, caster: EntityId, spell: Spell) {
        match spell {
            Spell::Fireball { target } => {
                let (from, attack) = match self.fighter(caster) {
                    Some(wizard) => (wizard.position, wizard.stats.attack),
                    None => return,
                };
                if let Some(ball) = Fireball::new(caster, attack, from, target) {
                    debug!("Fireball cast from {:?} at {:?}", from, target);
                    self.effects.push(Effect::fireball(from, ball));
                }
            }
            Spell::StoneGlare => {
                let (position, drained) = match self.player_mut() {
                    Some(player) if player.stats.speed > 0 => {
                        player.stats.speed -= 1;
                        (player.position, 1)
                    }
                    Some(player) => (player.position, 0),
                    None => return,
                };
                self.effects.push(Effect::stone_glare(position, drained));
            }
        }
    }

    fn resolve_turns(&mut self) -> DelveResult<()> {
        for id in self.turn_order.clone() {
            let (is_turn, velocity) = match self.fighter(id) {
                Some(fighter) if fighter.stats.is_alive() => (fighter.is_turn(), fighter.velocity),
                _ => continue,
            };

            if is_turn {
                if let Some(action) = ConcreteAction::from_velocity(self, id, velocity) {
                    match action.execute(self) {
                        Ok(ActionResult::Blocked) => debug!("Move by {} blocked", id),
                        Ok(_) => {}
                        Err(DelveError::InvalidAction(reason)) => {
                            debug!("Dropped action by {}: {}", id, reason)
                        }
                        Err(e) => return Err(e),
                    }
                }
            }

            if let Some(fighter) = self.fighter_mut(id) {
                fighter.velocity = Position::origin();
                fighter.advance_counter();
            }
        }
        Ok(())
    }

    fn update_effects(&mut self) -> DelveResult<()> {
        let mut kept = Vec::new();
        let mut hits = Vec::new();

        for mut effect in std::mem::take(&mut self.effects) {
            let outcome = match &mut effect.kind {
                EffectKind::HitMarker { ticks_left } => {
                    *ticks_left = ticks_left.saturating_sub(1);
                    if *ticks_left > 0 {
                        EffectTick::Keep
                    } else {
                        EffectTick::Expire
                    }
                }
                EffectKind::Fireball(ball) => {
                    let next = effect.position + ball.next_step();
                    match self.level.grid.get(next) {
                        Some(cell) if !cell.is_solid() => {
                            effect.position = next;
                            EffectTick::Keep
                        }
                        Some(cell) => match cell.occupant.filter(|&id| id != ball.caster) {
                            Some(target) => EffectTick::Hit {
                                target,
                                attack: ball.attack,
                                caster: ball.caster,
                            },
                            None => EffectTick::Expire,
                        },
                        None => EffectTick::Expire,
                    }
                }
                EffectKind::StoneGlare(glare) => {
                    glare.ticks_left = glare.ticks_left.saturating_sub(1);
                    let drained = glare.drained;
                    let expired = glare.ticks_left == 0;
                    if let Some(player) = self.player_mut() {
                        effect.position = player.position;
                        if expired {
                            player.stats.speed += drained;
                        }
                    }
                    if expired {
                        EffectTick::Expire
                    } else {
                        EffectTick::Keep
                    }
                }
            };

            match outcome {
                EffectTick::Keep => kept.push(effect),
                EffectTick::Expire => {}
                EffectTick::Hit {
                    target,
                    attack,
                    caster,
                } => hits.push((target, attack, caster)),
            }
        }

        self.effects = kept;
        for (target, attack, caster) in hits {
            let damage = match self.fighter(target) {
                Some(fighter) => (attack - fighter.stats.defense).max(0),
                None => continue,
            };
            self.apply_damage(target, damage, Some(caster))?;
        }
        Ok(())
    }

    /// Picks up what the player stands on, and flags bonfires and ladders
    /// the player has just stepped onto.
    fn collect_pickups(&mut self, entry: Position) {
        let position = match self.player() {
            Some(player) => player.position,
            None => return,
        };
        if position == entry {
            return;
        }

        let here: Vec<(EntityId, PickupKind)> = self
            .entities
            .values()
            .filter_map(ConcreteEntity::as_pickup)
            .filter(|pickup| pickup.position == position)
            .map(|pickup| (pickup.id, pickup.kind))
            .collect();

        for (id, kind) in here {
            if kind.is_collectable() {
                self.entities.remove(&id);
                self.inventory.push(kind);
                if kind == PickupKind::Sword {
                    if let Some(player) = self.player_mut() {
                        player.stats.attack += 1;
                    }
                }
                self.push_event(GameEvent::ItemPickedUp { kind });
            } else if kind == PickupKind::Ladder {
                self.push_event(GameEvent::LevelExitReached {
                    depth: self.level.depth,
                });
            }
        }

        let on_bonfire = self
            .level
            .get_tile(position)
            .map(|tile| tile.tile_type == TileType::Bonfire)
            .unwrap_or(false);
        if on_bonfire {
            self.push_event(GameEvent::CheckpointReached { position });
        }
    }

    /// Recomputes the visible set over the camera window and latches every
    /// visible tile as explored.
    pub fn update_exploration(&mut self) {
        let observer = match self.player() {
            Some(player) => player.position,
            None => return,
        };
        let origin = self.camera_origin();
        let level = &self.level;
        let window = level.grid.window_map(
            origin,
            self.config.view_width,
            self.config.view_height,
            |world, _| visible(level, observer, world).is_visible().then_some(world),
        );

        self.visible = window.iter().filter_map(|(_, seen)| *seen).collect();
        for &pos in &self.visible {
            if let Some(cell) = self.level.grid.get_mut(pos) {
                cell.tile.mark_explored();
            }
        }
    }

    /// Builds the render snapshot for the current state.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }

    /// Drains queued events, applies the host policy to each, and returns
    /// them:
    /// - `CheckpointReached` saves the inventory
    /// - `PlayerDied` rebuilds the current depth and restores the saved inventory
    /// - `LevelExitReached` builds the next depth, keeping the player as is
    /// - `QuitRequested` ends the run
    ///
    /// At most one level change happens per call.
    pub fn process_events(&mut self) -> DelveResult<Vec<GameEvent>> {
        let drained: Vec<GameEvent> = self.events.drain(..).collect();
        let mut level_changed = false;

        for event in &drained {
            self.statistics.update_from_event(event, self.player_id);
            match event {
                GameEvent::CheckpointReached { position } => {
                    debug!("Checkpoint at {:?}", position);
                    self.checkpoint_inventory = self.inventory.clone();
                }
                GameEvent::PlayerDied if !level_changed => {
                    self.respawn()?;
                    level_changed = true;
                }
                GameEvent::LevelExitReached { .. } if !level_changed => {
                    self.descend()?;
                    level_changed = true;
                }
                GameEvent::QuitRequested => {
                    info!("Quit requested on turn {}", self.turn_number);
                    self.completion_state = GameCompletionState::Quit;
                }
                _ => {}
            }
        }
        Ok(drained)
    }

    /// Rebuilds the current depth with a fresh player carrying the
    /// checkpoint inventory.
    fn respawn(&mut self) -> DelveResult<()> {
        let depth = self.level.depth;
        let variant = self.level.variant;
        let built = new_level(variant, depth, &self.config.generation, &mut self.rng)?;

        self.inventory = self.checkpoint_inventory.clone();
        let mut player = Fighter::player(built.player_start());
        player.stats.attack += self.sword_bonus();

        info!("Respawning at depth {} with {:?}", depth, self.inventory);
        self.install_level(built, player)
    }

    /// Moves the player to a freshly built level one deeper.
    fn descend(&mut self) -> DelveResult<()> {
        let depth = self.level.depth + 1;
        let variant = self.level.variant;
        let built = new_level(variant, depth, &self.config.generation, &mut self.rng)?;

        let mut player = self
            .player()
            .cloned()
            .ok_or_else(|| DelveError::InvalidState("no player to carry down".to_string()))?;
        // Pending glares are dropped with the old level's effects.
        for effect in &self.effects {
            if let EffectKind::StoneGlare(glare) = &effect.kind {
                player.stats.speed += glare.drained;
            }
        }

        info!("Descending to depth {}", depth);
        self.install_level(built, player)
    }

    fn sword_bonus(&self) -> i32 {
        self.inventory
            .iter()
            .filter(|&&kind| kind == PickupKind::Sword)
            .count() as i32
    }

    fn install_level(&mut self, built: NewLevel, mut player: Fighter) -> DelveResult<()> {
        let NewLevel { level, entities } = built;
        self.level = level;
        self.entities.clear();
        self.turn_order.clear();
        self.effects.clear();
        self.visible.clear();

        player.position = self.level.player_start;
        player.velocity = Position::origin();
        player.move_counter = 0;
        player.cast_counter = 0;
        self.spawn_all(player, entities)
    }

    fn spawn_all(&mut self, player: Fighter, entities: Vec<ConcreteEntity>) -> DelveResult<()> {
        debug_assert!(player.kind == FighterKind::Player);
        self.player_id = player.id;
        self.spawn_fighter(player)?;

        for entity in entities {
            self.spawn(entity)?;
        }

        self.statistics.max_depth_reached = self.statistics.max_depth_reached.max(self.level.depth);
        self.update_exploration();
        Ok(())
    }
}
