//! Pipeline constants and runtime configuration defaults

// Grid geometry for the reference 4288x2848 fundus photographs
/// Default tile edge length in pixels
pub const DEFAULT_TILE_SIZE: usize = 512;
/// Default stride between tile origins in pixels
pub const DEFAULT_STRIDE: usize = 256;
/// Default number of tile rows
pub const DEFAULT_GRID_ROWS: usize = 10;
/// Default number of tile columns
pub const DEFAULT_GRID_COLS: usize = 16;

// Classification and balancing
/// Foreground pixel count above which a patch is positive
///
/// Non-zero to tolerate scanning noise in the masks. An absolute count,
/// deliberately not scaled by tile area.
pub const DEFAULT_EMPTINESS_THRESHOLD: usize = 100;
/// Maximum retained negatives per positive patch
pub const DEFAULT_MAX_NEGATIVE_RATIO: usize = 4;

// Stitching
/// Probability above which a stitched pixel is foreground
pub const DEFAULT_BINARIZATION_THRESHOLD: f32 = 0.5;

// Reproducibility
/// Fixed seed for reproducible negative patch selection
pub const DEFAULT_SEED: u64 = 42;

// Persisted patch layout
/// Directory for extracted image crops
pub const DEFAULT_PATCH_DIR: &str = "patches";
/// Directory for extracted mask crops
pub const DEFAULT_LABEL_DIR: &str = "labels";
/// File extension for persisted image crops
pub const PATCH_IMAGE_EXTENSION: &str = "jpg";
/// File extension for persisted mask crops
pub const PATCH_MASK_EXTENSION: &str = "tif";
/// Separator between source id and linear patch index in file names
pub const PATCH_INDEX_SEPARATOR: &str = "_p";

// Source pair naming convention
/// Suffix stripped from a mask stem to obtain the image stem
pub const DEFAULT_MASK_SUFFIX: &str = "_EX";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
