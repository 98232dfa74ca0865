//! Command-line interface for dataset extraction and class balancing

use crate::dataset::balance::{execute, plan_deletions};
use crate::dataset::extraction::{ExtractionConfig, PatchExtractor, PatchRecord};
use crate::dataset::manifest::PatchManifest;
use crate::io::configuration::{
    DEFAULT_EMPTINESS_THRESHOLD, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, DEFAULT_LABEL_DIR,
    DEFAULT_MASK_SUFFIX, DEFAULT_MAX_NEGATIVE_RATIO, DEFAULT_PATCH_DIR, DEFAULT_SEED,
    DEFAULT_STRIDE, DEFAULT_TILE_SIZE, PATCH_IMAGE_EXTENSION, PATCH_MASK_EXTENSION,
};
use crate::io::error::{PipelineError, Result, invalid_parameter};
use crate::io::image::{load_mask, load_rgb_image};
use crate::io::progress::ProgressManager;
use crate::spatial::grid::{GridConfig, TileGrid};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lesiontile")]
#[command(
    author,
    version,
    about = "Cut oversized fundus photographs into overlapping patches for lesion segmentation"
)]
/// Command-line arguments for the dataset preparation tool
pub struct Cli {
    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Dataset preparation operations
#[derive(Subcommand)]
pub enum Command {
    /// Cut image/mask pairs into overlapping patches and persist them
    Extract(ExtractArgs),
    /// Shrink the persisted negative patch set to the configured ratio
    Balance(BalanceArgs),
}

/// Arguments for the extract subcommand
#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Directory containing source fundus images
    #[arg(value_name = "IMAGES")]
    pub images: PathBuf,

    /// Directory containing lesion masks
    #[arg(value_name = "MASKS")]
    pub masks: PathBuf,

    /// Output directory for image crops
    #[arg(long, default_value = DEFAULT_PATCH_DIR)]
    pub patch_dir: PathBuf,

    /// Output directory for mask crops
    #[arg(long, default_value = DEFAULT_LABEL_DIR)]
    pub label_dir: PathBuf,

    /// Tile edge length in pixels
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: usize,

    /// Stride between tile origins in pixels
    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    pub stride: usize,

    /// Number of tile rows
    #[arg(long, default_value_t = DEFAULT_GRID_ROWS)]
    pub rows: usize,

    /// Number of tile columns
    #[arg(long, default_value_t = DEFAULT_GRID_COLS)]
    pub cols: usize,

    /// Foreground pixel count above which a patch is positive
    #[arg(long, default_value_t = DEFAULT_EMPTINESS_THRESHOLD)]
    pub emptiness_threshold: usize,

    /// Suffix stripped from mask stems to find the paired image
    #[arg(long, default_value = DEFAULT_MASK_SUFFIX)]
    pub mask_suffix: String,

    /// File extension of the mask files to process
    #[arg(long, default_value = PATCH_MASK_EXTENSION)]
    pub mask_extension: String,

    /// File extension of the source images
    #[arg(long, default_value = PATCH_IMAGE_EXTENSION)]
    pub image_extension: String,

    /// Balance negatives to this ratio right after extraction
    #[arg(long, value_name = "RATIO")]
    pub max_ratio: Option<usize>,

    /// Random seed for reproducible negative selection
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the balance subcommand
#[derive(clap::Args)]
pub struct BalanceArgs {
    /// Directory containing persisted image crops
    #[arg(long, default_value = DEFAULT_PATCH_DIR)]
    pub patch_dir: PathBuf,

    /// Directory containing persisted mask crops
    #[arg(long, default_value = DEFAULT_LABEL_DIR)]
    pub label_dir: PathBuf,

    /// Maximum retained negatives per positive patch
    #[arg(long, default_value_t = DEFAULT_MAX_NEGATIVE_RATIO)]
    pub max_ratio: usize,

    /// Foreground pixel count above which a patch is positive
    #[arg(long, default_value_t = DEFAULT_EMPTINESS_THRESHOLD)]
    pub emptiness_threshold: usize,

    /// Random seed for reproducible negative selection
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// One matched image/mask source pair
struct SourcePair {
    source_id: String,
    image_path: PathBuf,
    mask_path: PathBuf,
}

/// Orchestrates the extract and balance subcommands
pub struct DatasetProcessor {
    cli: Cli,
}

impl DatasetProcessor {
    /// Create a processor for the parsed CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the requested subcommand
    ///
    /// # Errors
    ///
    /// Returns an error on invalid configuration or unrecoverable I/O
    /// failures; per-pair problems are reported and skipped instead.
    pub fn process(&mut self) -> Result<()> {
        match &self.cli.command {
            Command::Extract(args) => Self::run_extract(args),
            Command::Balance(args) => Self::run_balance(args),
        }
    }

    fn run_extract(args: &ExtractArgs) -> Result<()> {
        let pairs = Self::collect_pairs(args)?;
        if pairs.is_empty() {
            return Ok(());
        }

        let progress = (!args.quiet).then(|| ProgressManager::new(pairs.len()));
        let extractor = PatchExtractor::new(ExtractionConfig {
            patch_dir: args.patch_dir.clone(),
            label_dir: args.label_dir.clone(),
            emptiness_threshold: args.emptiness_threshold,
        });
        let grid_config = GridConfig {
            tile_size: args.tile_size,
            stride: args.stride,
            rows: args.rows,
            cols: args.cols,
        };

        let mut records = Vec::new();
        for pair in &pairs {
            match Self::extract_one(&extractor, &grid_config, pair, progress.as_ref()) {
                Ok(mut pair_records) => records.append(&mut pair_records),
                Err(error) => match error {
                    PipelineError::ShapeMismatch { .. } | PipelineError::ImageLoad { .. } => {
                        Self::warn(&format!("Skipping '{}': {error}", pair.source_id));
                    }
                    other => return Err(other),
                },
            }
            if let Some(ref pm) = progress {
                pm.complete_source();
            }
        }
        if let Some(ref pm) = progress {
            pm.finish();
        }

        let manifest = PatchManifest::from(records);
        if !args.quiet {
            Self::warn(&format!(
                "Extracted {} patches ({} positive, {} negative)",
                manifest.entries().len(),
                manifest.positive_count(),
                manifest.negative_count()
            ));
        }

        if let Some(max_ratio) = args.max_ratio {
            Self::balance_manifest(&manifest, max_ratio, args.seed, args.quiet);
        }
        Ok(())
    }

    fn run_balance(args: &BalanceArgs) -> Result<()> {
        let (manifest, warnings) = PatchManifest::from_directories(
            &args.patch_dir,
            &args.label_dir,
            args.emptiness_threshold,
        )?;
        for warning in &warnings {
            Self::warn(&warning.to_string());
        }
        Self::balance_manifest(&manifest, args.max_ratio, args.seed, args.quiet);
        Ok(())
    }

    fn extract_one(
        extractor: &PatchExtractor,
        grid_config: &GridConfig,
        pair: &SourcePair,
        progress: Option<&ProgressManager>,
    ) -> Result<Vec<PatchRecord>> {
        let mask = load_mask(&pair.mask_path)?;
        let image = load_rgb_image(&pair.image_path)?;
        PatchExtractor::check_shapes(&pair.source_id, &image, &mask)?;

        let (image_height, image_width, _) = image.dim();
        let grid = TileGrid::plan(image_height, image_width, grid_config)?;

        if let Some(pm) = progress {
            pm.start_source(&pair.source_id, grid.len());
        }

        let mut records = Vec::with_capacity(grid.len());
        for spec in &grid {
            records.push(extractor.extract_tile(&pair.source_id, &image, &mask, &grid, spec)?);
            if let Some(pm) = progress {
                pm.tile_done();
            }
        }
        Ok(records)
    }

    fn collect_pairs(args: &ExtractArgs) -> Result<Vec<SourcePair>> {
        if !args.masks.is_dir() {
            return Err(invalid_parameter(
                "masks",
                &args.masks.display(),
                &"mask target must be a directory",
            ));
        }

        let mut mask_paths = Vec::new();
        for entry in std::fs::read_dir(&args.masks)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some(args.mask_extension.as_str()) {
                mask_paths.push(path);
            }
        }
        mask_paths.sort();

        let mut pairs = Vec::new();
        for mask_path in mask_paths {
            let stem = mask_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let image_name = format!(
                "{}.{}",
                stem.replace(&args.mask_suffix, ""),
                args.image_extension
            );
            let image_path = args.images.join(image_name);

            if image_path.exists() {
                pairs.push(SourcePair {
                    source_id: stem,
                    image_path,
                    mask_path,
                });
            } else {
                Self::warn(
                    &PipelineError::MissingPair {
                        present: mask_path,
                        expected: image_path,
                    }
                    .to_string(),
                );
            }
        }
        Ok(pairs)
    }

    fn balance_manifest(manifest: &PatchManifest, max_ratio: usize, seed: u64, quiet: bool) {
        let plan = plan_deletions(manifest, max_ratio, seed);
        let report = execute(&plan);

        for orphan in &report.orphans {
            Self::warn(&orphan.to_string());
        }
        if !quiet {
            Self::warn(&format!(
                "Removed {} of {} negative patches (cap {} per positive)",
                report.deleted,
                manifest.negative_count(),
                max_ratio
            ));
        }
    }

    // Allow print for user feedback on skipped pairs and run summaries
    #[allow(clippy::print_stderr)]
    fn warn(message: &str) {
        eprintln!("{message}");
    }
}
