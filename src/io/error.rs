//! Error types for grid planning, patch extraction, and stitching

use std::fmt;
use std::path::PathBuf;

/// Main error type for all pipeline operations
#[derive(Debug)]
pub enum PipelineError {
    /// Failed to load a source image or mask from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a crop or prediction image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Grid or pipeline parameter validation failed
    ///
    /// Fatal: the caller must fix the configuration before retrying.
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Image and mask dimensions disagree for one source pair
    ///
    /// Fatal for that pair only; batch drivers skip it and continue.
    ShapeMismatch {
        /// Identifier of the source pair
        source_id: String,
        /// Image dimensions (height, width)
        image_dimensions: (usize, usize),
        /// Mask dimensions (height, width)
        mask_dimensions: (usize, usize),
    },

    /// A mask file has no corresponding image file (or vice versa)
    MissingPair {
        /// The file that was found
        present: PathBuf,
        /// The companion file that was expected
        expected: PathBuf,
    },

    /// The external predictor failed for one tile
    ///
    /// Recoverable: the affected region contributes no probability mass.
    Predictor {
        /// Description of the failure
        reason: String,
    },

    /// A patch pair could not be deleted as a unit
    ///
    /// Recoverable: reported and the balancing pass continues.
    OrphanedDeletion {
        /// File that could not be removed
        path: PathBuf,
        /// Companion crop file of the same patch
        companion: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::ShapeMismatch {
                source_id,
                image_dimensions,
                mask_dimensions,
            } => {
                write!(
                    f,
                    "Shape mismatch for '{source_id}': image is {}x{}, mask is {}x{}",
                    image_dimensions.0, image_dimensions.1, mask_dimensions.0, mask_dimensions.1
                )
            }
            Self::MissingPair { present, expected } => {
                write!(
                    f,
                    "No companion file for '{}' (expected '{}')",
                    present.display(),
                    expected.display()
                )
            }
            Self::Predictor { reason } => {
                write!(f, "Predictor failure: {reason}")
            }
            Self::OrphanedDeletion {
                path,
                companion,
                source,
            } => {
                write!(
                    f,
                    "Could not remove '{}' (companion '{}'): {source}",
                    path.display(),
                    companion.display()
                )
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } | Self::OrphanedDeletion { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PipelineError {
    PipelineError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a predictor failure error
pub fn predictor_error(reason: &impl ToString) -> PipelineError {
    PipelineError::Predictor {
        reason: reason.to_string(),
    }
}
