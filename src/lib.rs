//! # Delve
//!
//! A small dungeon crawl built around a procedural level generator and a
//! grid-based visibility and movement engine.
//!
//! ## Architecture Overview
//!
//! - **Game State**: the tick-driven simulation owning the current level,
//!   every entity, transient effects and the event queue
//! - **Grid**: fixed-size cell storage with a wrapping camera window
//! - **Visibility**: line-of-sight over per-cell transparency, built on a
//!   Bresenham raster line shared with projectile travel
//! - **Generation System**: room-and-corridor dungeons and perfect mazes
//! - **Rendering System**: a renderable snapshot per tick, drawn by a thin
//!   macroquad front-end
//!
//! A tick is strictly ordered: intents are gathered, movement and combat are
//! resolved, exploration memory is updated, and a snapshot is handed off.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod utils;

pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

pub use game::{
    // From actions
    Action,
    ActionResult,
    AttackAction,
    ConcreteAction,
    MoveAction,
    // From entities
    ConcreteEntity,
    Entity,
    EntityStats,
    Fighter,
    FighterKind,
    Pickup,
    PickupKind,
    // From state
    GameCompletionState,
    GameConfig,
    GameEvent,
    GameState,
    GameStatistics,
    // From world
    Cell,
    Level,
    Tile,
    TileType,
    // Core types
    EntityId,
    Grid,
    Position,
    Rgb,
    Visibility,
};

pub use generation::{
    GenerationConfig, Generator, GeneratorVariant, MazeGenerator, NewLevel, PopulationStrategy,
    Room, RoomCorridorGenerator,
};

pub use rendering::{RenderSnapshot, Renderable, VisibilityState};

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Configuration values are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A grid write landed outside the declared bounds
    #[error("Position ({}, {}) is out of bounds", position.x, position.y)]
    OutOfBounds { position: Position },
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 41;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 41;

    /// Smallest room side; must be odd so rooms on odd anchors keep a wall between them
    pub const ROOM_MIN_SIZE: u32 = 5;

    /// Exclusive upper bound for room sides
    pub const ROOM_MAX_SIZE: u32 = 11;

    /// Number of monsters dropped into a maze level
    pub const MAZE_MONSTERS: u32 = 3;

    /// Ticks between actions for a speed-zero fighter
    pub const BASE_PERIOD: i32 = 5;

    /// Ticks in one cycle of the wizard's cast counter
    pub const CAST_PERIOD: i32 = 5;

    /// Monsters only cast at the player inside this distance
    pub const CAST_RANGE: f64 = 10.0;

    /// Camera window width in tiles
    pub const VIEW_WIDTH: u32 = 31;

    /// Camera window height in tiles
    pub const VIEW_HEIGHT: u32 = 21;

    /// Seconds per simulation tick
    pub const TICK_SECONDS: f32 = 0.125;
}
