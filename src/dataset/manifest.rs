//! Immutable manifest of extracted patches
//!
//! The manifest separates classification from balancing: extraction produces
//! it once, and the balancer reads it as a pure function input. It can also
//! be rebuilt from the persisted patch directories, since classification is
//! idempotent over the mask crops on disk.

use crate::dataset::extraction::{PatchRecord, is_positive, paired_image_path, parse_patch_stem};
use crate::io::configuration::PATCH_MASK_EXTENSION;
use crate::io::error::{PipelineError, Result};
use crate::io::image::load_mask;
use std::path::{Path, PathBuf};

/// One manifest entry: the persisted pair and its label
#[derive(Debug, Clone)]
pub struct PatchEntry {
    /// Identifier of the source pair
    pub source_id: String,
    /// Zero-based row-major index within the source grid
    pub linear_index: usize,
    /// Persisted image crop
    pub image_path: PathBuf,
    /// Persisted mask crop
    pub mask_path: PathBuf,
    /// Whether the mask crop exceeds the emptiness threshold
    pub positive: bool,
}

/// Immutable classification output of one extraction run
#[derive(Debug, Clone, Default)]
pub struct PatchManifest {
    entries: Vec<PatchEntry>,
}

impl PatchManifest {
    /// Build a manifest from explicit entries
    pub const fn from_entries(entries: Vec<PatchEntry>) -> Self {
        Self { entries }
    }

    /// Rebuild a manifest by scanning the persisted patch directories
    ///
    /// Mask crops are re-read and re-classified, which reproduces the labels
    /// of the original extraction run. Crops whose companion image file is
    /// missing, or whose name does not follow the patch naming scheme, are
    /// skipped and reported in the warning list rather than aborting the
    /// scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the label directory cannot be read.
    pub fn from_directories(
        patch_dir: &Path,
        label_dir: &Path,
        emptiness_threshold: usize,
    ) -> Result<(Self, Vec<PipelineError>)> {
        let mut mask_paths = Vec::new();
        let dir = std::fs::read_dir(label_dir).map_err(|e| PipelineError::FileSystem {
            path: label_dir.to_path_buf(),
            operation: "read directory",
            source: e,
        })?;
        for entry in dir {
            let path = entry
                .map_err(|e| PipelineError::FileSystem {
                    path: label_dir.to_path_buf(),
                    operation: "read directory entry",
                    source: e,
                })?
                .path();
            if path.extension().and_then(|s| s.to_str()) == Some(PATCH_MASK_EXTENSION) {
                mask_paths.push(path);
            }
        }
        // Deterministic entry order keeps seeded balancing reproducible
        mask_paths.sort();

        let mut entries = Vec::with_capacity(mask_paths.len());
        let mut warnings = Vec::new();

        for mask_path in mask_paths {
            let stem = mask_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some((source_id, linear_index)) = parse_patch_stem(&stem) else {
                warnings.push(PipelineError::MissingPair {
                    present: mask_path.clone(),
                    expected: PathBuf::from("<patch-named companion>"),
                });
                continue;
            };

            let Some(image_path) = paired_image_path(&mask_path, patch_dir) else {
                continue;
            };
            if !image_path.exists() {
                warnings.push(PipelineError::MissingPair {
                    present: mask_path.clone(),
                    expected: image_path,
                });
                continue;
            }

            let mask = match load_mask(&mask_path) {
                Ok(mask) => mask,
                Err(error) => {
                    warnings.push(error);
                    continue;
                }
            };
            let positive = is_positive(&mask.view(), emptiness_threshold);

            entries.push(PatchEntry {
                source_id,
                linear_index,
                image_path,
                mask_path,
                positive,
            });
        }

        Ok((Self { entries }, warnings))
    }

    /// All entries in deterministic order
    pub fn entries(&self) -> &[PatchEntry] {
        &self.entries
    }

    /// Number of positive patches
    pub fn positive_count(&self) -> usize {
        self.entries.iter().filter(|e| e.positive).count()
    }

    /// Number of negative patches
    pub fn negative_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.positive).count()
    }

    /// The negative entries in manifest order
    pub fn negatives(&self) -> Vec<&PatchEntry> {
        self.entries.iter().filter(|e| !e.positive).collect()
    }

    /// The positive entries in manifest order
    pub fn positives(&self) -> Vec<&PatchEntry> {
        self.entries.iter().filter(|e| e.positive).collect()
    }
}

impl From<Vec<PatchRecord>> for PatchManifest {
    fn from(records: Vec<PatchRecord>) -> Self {
        let entries = records
            .into_iter()
            .map(|record| PatchEntry {
                source_id: record.source_id,
                linear_index: record.linear_index,
                image_path: record.image_path,
                mask_path: record.mask_path,
                positive: record.positive,
            })
            .collect();
        Self { entries }
    }
}
