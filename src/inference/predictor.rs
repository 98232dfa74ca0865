//! External predictor boundary

use crate::io::error::Result;
use ndarray::{Array2, ArrayView3};

/// Per-tile probability predictor consumed by the stitcher
///
/// Receives exactly one tile crop at a time and returns a same-shaped
/// single-channel probability map with values nominally in [0, 1]. Mapping
/// raw model output into that range (e.g. a logistic transform) is the
/// predictor's responsibility, not the stitcher's. No batching contract is
/// assumed; batching, if desired, is internal to an implementation.
pub trait TilePredictor {
    /// Predict the lesion probability map for one tile crop
    ///
    /// # Errors
    ///
    /// Implementations return an error when prediction fails for this tile.
    /// The stitcher records the failure with the tile coordinates and
    /// continues; the affected region contributes no probability mass.
    fn predict(&mut self, tile: &ArrayView3<'_, u8>) -> Result<Array2<f32>>;
}

impl<F> TilePredictor for F
where
    F: FnMut(&ArrayView3<'_, u8>) -> Result<Array2<f32>>,
{
    fn predict(&mut self, tile: &ArrayView3<'_, u8>) -> Result<Array2<f32>> {
        self(tile)
    }
}
