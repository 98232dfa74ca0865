//! Progress display for batch extraction runs

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static SOURCE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Sources: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

static TILE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{msg}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} tiles"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Coordinates the two-level progress display of an extraction run
///
/// One bar tracks source pairs, a second tracks tiles within the pair
/// currently being cut.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    source_bar: ProgressBar,
    tile_bar: ProgressBar,
}

impl ProgressManager {
    /// Create the progress display for a batch of source pairs
    pub fn new(source_count: usize) -> Self {
        let multi_progress = MultiProgress::new();

        let source_bar = multi_progress.add(ProgressBar::new(source_count as u64));
        source_bar.set_style(SOURCE_STYLE.clone());

        let tile_bar = multi_progress.add(ProgressBar::new(0));
        tile_bar.set_style(TILE_STYLE.clone());

        Self {
            multi_progress,
            source_bar,
            tile_bar,
        }
    }

    /// Begin displaying progress for one source pair
    pub fn start_source(&self, name: &str, tile_count: usize) {
        self.tile_bar.set_length(tile_count as u64);
        self.tile_bar.set_position(0);
        self.tile_bar.set_message(name.to_string());
    }

    /// Record one extracted tile for the current source pair
    pub fn tile_done(&self) {
        self.tile_bar.inc(1);
    }

    /// Mark the current source pair as finished
    pub fn complete_source(&self) {
        self.source_bar.inc(1);
    }

    /// Clean up the progress display
    pub fn finish(&self) {
        self.source_bar.finish();
        let _ = self.multi_progress.clear();
    }
}
