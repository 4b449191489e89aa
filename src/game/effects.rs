//! # Effects
//!
//! Short-lived overlays: hit markers, fireballs and the gorgon's stone glare.
//!
//! Effects never occupy cells and never block sight. Their per-tick logic
//! lives here; [`GameState`](crate::GameState) applies the outcomes that
//! touch fighters.

use crate::{raster_line, EntityId, Position, Rgb};
use serde::{Deserialize, Serialize};

/// Ticks a hit marker stays on screen.
pub const HIT_MARKER_TICKS: u32 = 3;

/// Ticks a stone glare keeps the player slowed.
pub const STONE_GLARE_TICKS: u32 = 5;

/// A fireball in flight.
///
/// The ball repeats the step pattern of the line from its caster to the
/// target forever, so it keeps flying past the target until it hits
/// something solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fireball {
    pub caster: EntityId,
    /// Caster's attack at cast time
    pub attack: i32,
    path: Vec<Position>,
    index: usize,
}

impl Fireball {
    /// Aims a fireball from `from` at `target`. Returns `None` when both are
    /// the same cell.
    pub fn new(caster: EntityId, attack: i32, from: Position, target: Position) -> Option<Self> {
        if from == target {
            return None;
        }
        Some(Self {
            caster,
            attack,
            path: raster_line(from, target),
            index: 0,
        })
    }

    /// The displacement for the next tick, cycling through the line's steps.
    pub fn next_step(&mut self) -> Position {
        self.index = (self.index + 1) % self.path.len();
        if self.index == 0 {
            self.index = 1;
        }
        self.path[self.index] - self.path[self.index - 1]
    }
}

/// A speed drain following the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneGlare {
    pub ticks_left: u32,
    /// Speed taken from the player, returned on expiry
    pub drained: i32,
}

/// Kinds of effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    HitMarker { ticks_left: u32 },
    Fireball(Fireball),
    StoneGlare(StoneGlare),
}

/// A positioned effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub position: Position,
    pub kind: EffectKind,
}

impl Effect {
    pub fn hit_marker(position: Position) -> Self {
        Self {
            position,
            kind: EffectKind::HitMarker {
                ticks_left: HIT_MARKER_TICKS,
            },
        }
    }

    pub fn fireball(position: Position, fireball: Fireball) -> Self {
        Self {
            position,
            kind: EffectKind::Fireball(fireball),
        }
    }

    /// A glare on the player that has already drained `drained` speed.
    pub fn stone_glare(position: Position, drained: i32) -> Self {
        Self {
            position,
            kind: EffectKind::StoneGlare(StoneGlare {
                ticks_left: STONE_GLARE_TICKS,
                drained,
            }),
        }
    }

    pub fn glyph(&self) -> char {
        match self.kind {
            EffectKind::HitMarker { .. } => '*',
            EffectKind::Fireball(_) => 'o',
            EffectKind::StoneGlare(_) => 'X',
        }
    }

    pub fn color(&self) -> Rgb {
        match self.kind {
            EffectKind::HitMarker { .. } => Rgb::RED,
            EffectKind::Fireball(_) => Rgb::ORANGE,
            EffectKind::StoneGlare(_) => Rgb::CYAN,
        }
    }
}
