//! Class balancing over the patch manifest
//!
//! Two phases: a pure deletion plan computed from the immutable manifest,
//! then the paired file deletions. Splitting policy from effect keeps the
//! selection independently testable and the deletions reproducible from a
//! single seed.

use crate::dataset::manifest::{PatchEntry, PatchManifest};
use crate::io::error::PipelineError;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Deletion plan computed from a manifest
#[derive(Debug, Clone)]
pub struct BalancePlan {
    /// Maximum retained negatives per positive patch
    pub max_ratio: usize,
    /// Number of negative patches over the cap
    pub excess: usize,
    /// Negative patches selected for deletion
    pub selected: Vec<PatchEntry>,
}

/// Outcome of executing a deletion plan
#[derive(Debug, Default)]
pub struct BalanceReport {
    /// Patch pairs whose both files were removed
    pub deleted: usize,
    /// Deletions that failed on one side of a pair
    pub orphans: Vec<PipelineError>,
}

/// Select the negative patches to delete so that
/// `negative_count ≤ max_ratio * positive_count`
///
/// Selection is uniform without replacement over the full negative set, not
/// first-N, so no source image or tile position is favored. The same seed
/// over the same manifest reproduces the same plan. Positives are never
/// selected; with zero positives the cap is zero and every negative is
/// selected.
pub fn plan_deletions(manifest: &PatchManifest, max_ratio: usize, seed: u64) -> BalancePlan {
    let negatives = manifest.negatives();
    let cap = max_ratio * manifest.positive_count();
    let excess = negatives.len().saturating_sub(cap);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut selected: Vec<PatchEntry> = rand::seq::index::sample(&mut rng, negatives.len(), excess)
        .into_iter()
        .filter_map(|index| negatives.get(index).map(|entry| (*entry).clone()))
        .collect();
    // Index order from sampling is arbitrary; sort for a stable plan
    selected.sort_by(|a, b| {
        (&a.source_id, a.linear_index).cmp(&(&b.source_id, b.linear_index))
    });

    BalancePlan {
        max_ratio,
        excess,
        selected,
    }
}

/// Delete the selected patch pairs
///
/// Deletion is paired: the mask crop is removed first, then the image crop.
/// When the mask removal fails neither file is touched further; when the
/// image removal fails after the mask is gone, the surviving file is
/// reported as an orphan. Either way the pass continues with the remaining
/// patches.
pub fn execute(plan: &BalancePlan) -> BalanceReport {
    let mut report = BalanceReport::default();

    for entry in &plan.selected {
        match std::fs::remove_file(&entry.mask_path) {
            Ok(()) => match std::fs::remove_file(&entry.image_path) {
                Ok(()) => report.deleted += 1,
                Err(source) => report.orphans.push(PipelineError::OrphanedDeletion {
                    path: entry.image_path.clone(),
                    companion: entry.mask_path.clone(),
                    source,
                }),
            },
            Err(source) => report.orphans.push(PipelineError::OrphanedDeletion {
                path: entry.mask_path.clone(),
                companion: entry.image_path.clone(),
                source,
            }),
        }
    }

    report
}
