//! Overlapping tile extraction and prediction stitching for oversized fundus photographs
//!
//! Fundus images (≈4288×2848 px) exceed the practical input size of a
//! lesion-segmentation model. This crate deterministically partitions an
//! image/mask pair into fixed-size overlapping tiles for training-set
//! construction, balances the severely imbalanced patch set, and — at
//! inference time — runs a per-tile predictor and reassembles its outputs
//! into a single full-resolution mask via overlap-max aggregation.

#![deny(unsafe_code)]

/// Patch extraction, manifests, and class balancing
pub mod dataset;
/// Per-tile prediction and overlap-max stitching
pub mod inference;
/// Input/output operations and error handling
pub mod io;
/// Tile grid planning utilities
pub mod spatial;

pub use io::error::{PipelineError, Result};
