//! Inference-time stitching
//!
//! This module contains the inference path: the external predictor boundary
//! and the overlap-max aggregation that reassembles per-tile predictions
//! into one full-resolution mask.

/// External predictor boundary
pub mod predictor;
/// Overlap-max stitching into a full-resolution mask
pub mod stitcher;

pub use predictor::TilePredictor;
pub use stitcher::{AggregationBuffer, StitchOutcome, stitch};
