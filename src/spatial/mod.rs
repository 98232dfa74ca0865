//! Tile grid planning
//!
//! This module contains the deterministic grid computation that both the
//! training-time extraction path and the inference-time stitching path
//! consume.

/// Tile grid planning with trailing-edge clamping
pub mod grid;

pub use grid::{GridConfig, TileGrid, TileSpec};
