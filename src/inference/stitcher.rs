//! Overlap-max stitching of per-tile predictions into a full-resolution mask
//!
//! Per-tile probability maps are merged into one full-image buffer with an
//! elementwise maximum. Overlapping tiles may see a lesion boundary only
//! partially; taking the maximum keeps a true positive detected by a
//! neighboring tile instead of suppressing it. The maximum is also
//! commutative and associative, so merge order never changes the result.

use crate::inference::predictor::TilePredictor;
use crate::io::error::{Result, invalid_parameter, predictor_error};
use crate::spatial::grid::{TileGrid, TileSpec};
use ndarray::{Array2, Array3, s};

/// Full-image probability accumulator
///
/// Initialized to zero and mutated monotonically: every merge only raises
/// per-pixel values. Owned by one stitching pass and consumed once into a
/// thresholded binary mask.
#[derive(Debug, Clone)]
pub struct AggregationBuffer {
    values: Array2<f32>,
}

impl AggregationBuffer {
    /// Create a zeroed buffer of the image's full shape
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            values: Array2::zeros((height, width)),
        }
    }

    /// Merge one tile's probability map with an elementwise maximum
    ///
    /// # Errors
    ///
    /// Returns an error if the map's shape differs from the tile's, or if
    /// the tile rectangle falls outside the buffer.
    pub fn merge_max(&mut self, spec: &TileSpec, map: &Array2<f32>) -> Result<()> {
        let (map_height, map_width) = map.dim();
        if (map_height, map_width) != (spec.height, spec.width) {
            return Err(predictor_error(&format!(
                "probability map is {map_height}x{map_width}, tile is {}x{}",
                spec.height, spec.width
            )));
        }
        let (buffer_height, buffer_width) = self.values.dim();
        if spec.bottom() > buffer_height || spec.right() > buffer_width {
            return Err(invalid_parameter(
                "tile",
                &format!("({}, {})", spec.row, spec.col),
                &format!("tile rectangle exceeds the {buffer_height}x{buffer_width} buffer"),
            ));
        }

        let mut region = self
            .values
            .slice_mut(s![spec.y..spec.bottom(), spec.x..spec.right()]);
        region.zip_mut_with(map, |current, &incoming| {
            if incoming > *current {
                *current = incoming;
            }
        });
        Ok(())
    }

    /// Consume the buffer into a binary mask of {0, 1}
    pub fn threshold(&self, threshold: f32) -> Array2<u8> {
        self.values.map(|&value| u8::from(value > threshold))
    }

    /// The accumulated probability values
    pub const fn values(&self) -> &Array2<f32> {
        &self.values
    }
}

/// One tile whose prediction failed during a stitching pass
#[derive(Debug)]
pub struct TileFailure {
    /// Row index of the tile in the grid
    pub row: usize,
    /// Column index of the tile in the grid
    pub col: usize,
    /// Description of the failure
    pub reason: String,
}

/// Result of one stitching pass
#[derive(Debug)]
pub struct StitchOutcome {
    /// Thresholded binary mask of the image's shape
    pub mask: Array2<u8>,
    /// Tiles whose region contributed no probability mass
    pub failures: Vec<TileFailure>,
}

/// Run the predictor over every tile and stitch the outputs
///
/// A predictor failure leaves that tile's region at its current buffer
/// value and is recorded in the outcome; one failed tile never invalidates
/// the rest of the image.
///
/// # Errors
///
/// Returns an error if the grid was planned for a different image shape.
pub fn stitch<P: TilePredictor>(
    image: &Array3<u8>,
    grid: &TileGrid,
    predictor: &mut P,
    threshold: f32,
) -> Result<StitchOutcome> {
    let (image_height, image_width, _) = image.dim();
    if (image_height, image_width) != (grid.image_height(), grid.image_width()) {
        return Err(invalid_parameter(
            "grid",
            &format!("{}x{}", grid.image_height(), grid.image_width()),
            &format!("grid was planned for a different image than {image_height}x{image_width}"),
        ));
    }

    let mut buffer = AggregationBuffer::new(image_height, image_width);
    let mut failures = Vec::new();

    for spec in grid {
        let crop = image.slice(s![spec.y..spec.bottom(), spec.x..spec.right(), ..]);
        let merged = predictor
            .predict(&crop)
            .and_then(|map| buffer.merge_max(spec, &map));
        if let Err(error) = merged {
            failures.push(TileFailure {
                row: spec.row,
                col: spec.col,
                reason: error.to_string(),
            });
        }
    }

    Ok(StitchOutcome {
        mask: buffer.threshold(threshold),
        failures,
    })
}
