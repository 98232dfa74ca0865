//! Patch extraction: cropping image/mask pairs per tile and persisting them
//!
//! Every tile of the planned grid yields one patch: an image crop and a mask
//! crop taken at identical coordinates. The two crop files of a patch are
//! written all-or-nothing so no half-patch ever becomes visible to the
//! manifest or the balancer.

use crate::io::configuration::{PATCH_IMAGE_EXTENSION, PATCH_INDEX_SEPARATOR, PATCH_MASK_EXTENSION};
use crate::io::error::{PipelineError, Result};
use crate::io::image::{foreground_count, save_patch_image, save_patch_mask};
use crate::spatial::grid::{TileGrid, TileSpec};
use ndarray::{Array2, Array3, ArrayView2, s};
use std::path::{Path, PathBuf};

/// One extracted patch: tile geometry, persisted crop paths, and label
#[derive(Debug, Clone)]
pub struct PatchRecord {
    /// Identifier of the source pair
    pub source_id: String,
    /// Tile geometry within the source image
    pub spec: TileSpec,
    /// Zero-based row-major index within the grid
    pub linear_index: usize,
    /// Persisted image crop
    pub image_path: PathBuf,
    /// Persisted mask crop
    pub mask_path: PathBuf,
    /// Whether the mask crop exceeds the emptiness threshold
    pub positive: bool,
}

/// Extraction parameters and output locations
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Directory receiving image crops
    pub patch_dir: PathBuf,
    /// Directory receiving mask crops
    pub label_dir: PathBuf,
    /// Foreground pixel count above which a patch is positive
    pub emptiness_threshold: usize,
}

/// Crops image/mask pairs along a planned grid and persists the patches
pub struct PatchExtractor {
    config: ExtractionConfig,
}

impl PatchExtractor {
    /// Create an extractor with the given configuration
    pub const fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Verify that image and mask agree on pixel dimensions
    ///
    /// # Errors
    ///
    /// Returns a shape mismatch error when the dimensions disagree; batch
    /// drivers skip that source pair and continue.
    pub fn check_shapes(source_id: &str, image: &Array3<u8>, mask: &Array2<u8>) -> Result<()> {
        let (image_height, image_width, _) = image.dim();
        let (mask_height, mask_width) = mask.dim();
        if (image_height, image_width) == (mask_height, mask_width) {
            Ok(())
        } else {
            Err(PipelineError::ShapeMismatch {
                source_id: source_id.to_string(),
                image_dimensions: (image_height, image_width),
                mask_dimensions: (mask_height, mask_width),
            })
        }
    }

    /// Extract, classify, and persist the patch for one tile
    ///
    /// The caller is responsible for [`Self::check_shapes`] on the pair;
    /// the tile rectangle itself is in bounds by the grid's invariant.
    ///
    /// # Errors
    ///
    /// Returns an export error when a crop cannot be persisted. The
    /// partially written patch is rolled back first, so the pair stays
    /// all-or-nothing.
    pub fn extract_tile(
        &self,
        source_id: &str,
        image: &Array3<u8>,
        mask: &Array2<u8>,
        grid: &TileGrid,
        spec: &TileSpec,
    ) -> Result<PatchRecord> {
        let image_crop = image.slice(s![spec.y..spec.bottom(), spec.x..spec.right(), ..]);
        let mask_crop = mask.slice(s![spec.y..spec.bottom(), spec.x..spec.right()]);

        let positive = is_positive(&mask_crop, self.config.emptiness_threshold);
        let linear_index = grid.linear_index(spec);

        let image_path = self.config.patch_dir.join(patch_file_name(
            source_id,
            linear_index,
            PATCH_IMAGE_EXTENSION,
        ));
        let mask_path = self.config.label_dir.join(patch_file_name(
            source_id,
            linear_index,
            PATCH_MASK_EXTENSION,
        ));

        save_patch_image(&image_crop, &image_path)?;
        if let Err(error) = save_patch_mask(&mask_crop, &mask_path) {
            std::fs::remove_file(&image_path).ok();
            return Err(error);
        }

        Ok(PatchRecord {
            source_id: source_id.to_string(),
            spec: *spec,
            linear_index,
            image_path,
            mask_path,
            positive,
        })
    }

    /// Extract, classify, and persist every patch of one source pair
    ///
    /// # Errors
    ///
    /// Returns a shape mismatch error when image and mask dimensions
    /// disagree, or an export error when a crop cannot be persisted.
    pub fn extract_pair(
        &self,
        source_id: &str,
        image: &Array3<u8>,
        mask: &Array2<u8>,
        grid: &TileGrid,
    ) -> Result<Vec<PatchRecord>> {
        Self::check_shapes(source_id, image, mask)?;

        let mut records = Vec::with_capacity(grid.len());
        for spec in grid {
            records.push(self.extract_tile(source_id, image, mask, grid, spec)?);
        }
        Ok(records)
    }
}

/// Classify a mask crop against the emptiness threshold
///
/// The crop is normalized to {0, 1} before counting, so the label is
/// independent of the mask's raw sample values and bit depth.
pub fn is_positive(mask_crop: &ArrayView2<'_, u8>, emptiness_threshold: usize) -> bool {
    foreground_count(mask_crop) > emptiness_threshold
}

/// Build the file name of a persisted crop
///
/// Image and mask files of the same patch differ only in their extension,
/// so the two are always co-addressable.
pub fn patch_file_name(source_id: &str, linear_index: usize, extension: &str) -> String {
    format!("{source_id}{PATCH_INDEX_SEPARATOR}{linear_index}.{extension}")
}

/// Split a persisted crop file stem back into source id and linear index
///
/// Inverse of [`patch_file_name`]; returns `None` for stems that do not
/// follow the naming scheme.
pub fn parse_patch_stem(stem: &str) -> Option<(String, usize)> {
    let (source_id, index) = stem.rsplit_once(PATCH_INDEX_SEPARATOR)?;
    let linear_index = index.parse().ok()?;
    Some((source_id.to_string(), linear_index))
}

/// Derive the image crop path paired with a mask crop path
pub fn paired_image_path(mask_path: &Path, patch_dir: &Path) -> Option<PathBuf> {
    let stem = mask_path.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(PATCH_IMAGE_EXTENSION);
    Some(patch_dir.join(name))
}
