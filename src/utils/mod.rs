//! # Utilities Module
//!
//! Line rasterization and grid reachability helpers.

pub mod math;
pub mod reachability;

pub use math::*;
pub use reachability::*;
