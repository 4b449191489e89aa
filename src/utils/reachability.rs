//! # Reachability
//!
//! Flood fills over the grid, used to validate generated levels and to pick
//! exits far from the player start.

use crate::Position;
use pathfinding::prelude::{bfs_reach, dijkstra_all};
use std::cmp::Reverse;
use std::collections::HashSet;

fn passable_neighbours(
    pos: Position,
    passable: &impl Fn(Position) -> bool,
) -> impl Iterator<Item = Position> + '_ {
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter(move |&next| passable(next))
}

/// Every position reachable from `start` through cardinal steps onto cells
/// for which `passable` holds. `start` itself is always included.
pub fn reachable_from(start: Position, passable: impl Fn(Position) -> bool) -> HashSet<Position> {
    bfs_reach(start, |&pos| {
        passable_neighbours(pos, &passable).collect::<Vec<_>>()
    })
    .collect()
}

/// The reachable position with the longest shortest path from `start`,
/// together with that path length. Ties go to the topmost, then leftmost,
/// position so the result does not depend on hash order.
pub fn farthest_reachable(
    start: Position,
    passable: impl Fn(Position) -> bool,
) -> Option<(Position, u32)> {
    dijkstra_all(&start, |&pos| {
        passable_neighbours(pos, &passable)
            .map(|next| (next, 1u32))
            .collect::<Vec<_>>()
    })
    .into_iter()
    .map(|(pos, (_, cost))| (pos, cost))
    .max_by_key(|&(pos, cost)| (cost, Reverse(pos.y), Reverse(pos.x)))
}
