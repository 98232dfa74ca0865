//! Tile grid planning with trailing-edge clamping
//!
//! Computes the deterministic set of tile origins covering an image. Origins
//! advance by a uniform stride except in the last row and column, whose
//! origins are clamped so the final tile touches the image edge exactly.
//! The clamp trades extra overlap at the trailing edge for total coverage:
//! every pixel is contained in at least one tile and no tile reads outside
//! the image bounds.

use crate::io::configuration::{
    DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, DEFAULT_STRIDE, DEFAULT_TILE_SIZE,
};
use crate::io::error::{Result, invalid_parameter};

/// Position and extent of one tile within an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpec {
    /// Row index in the grid
    pub row: usize,
    /// Column index in the grid
    pub col: usize,
    /// Left edge in pixels
    pub x: usize,
    /// Top edge in pixels
    pub y: usize,
    /// Tile width in pixels
    pub width: usize,
    /// Tile height in pixels
    pub height: usize,
}

impl TileSpec {
    /// One past the right edge in pixels
    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the bottom edge in pixels
    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Zero-based row-major index of this tile in its grid
    pub const fn linear_index(&self, cols: usize) -> usize {
        self.row * cols + self.col
    }
}

/// Grid geometry parameters
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    /// Tile edge length in pixels
    pub tile_size: usize,
    /// Distance between adjacent tile origins in pixels
    pub stride: usize,
    /// Number of tile rows
    pub rows: usize,
    /// Number of tile columns
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            stride: DEFAULT_STRIDE,
            rows: DEFAULT_GRID_ROWS,
            cols: DEFAULT_GRID_COLS,
        }
    }
}

/// Planned tile coverage of one image
///
/// Tiles are stored in row-major order, but the order carries no semantic
/// meaning; every consumer treats tiles as independent units of work.
#[derive(Debug, Clone)]
pub struct TileGrid {
    tiles: Vec<TileSpec>,
    rows: usize,
    cols: usize,
    tile_size: usize,
    image_height: usize,
    image_width: usize,
}

impl TileGrid {
    /// Plan the tile grid for an image of the given dimensions
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The tile size exceeds either image dimension
    /// - The stride is zero or the grid has zero rows or columns
    /// - The configured origins would leave part of the image uncovered
    pub fn plan(image_height: usize, image_width: usize, config: &GridConfig) -> Result<Self> {
        if config.stride == 0 {
            return Err(invalid_parameter(
                "stride",
                &config.stride,
                &"stride must be positive",
            ));
        }
        if config.rows == 0 || config.cols == 0 {
            return Err(invalid_parameter(
                "rows/cols",
                &format!("{}x{}", config.rows, config.cols),
                &"grid must have at least one row and one column",
            ));
        }
        if config.tile_size > image_height || config.tile_size > image_width {
            return Err(invalid_parameter(
                "tile_size",
                &config.tile_size,
                &format!("tile does not fit inside a {image_height}x{image_width} image"),
            ));
        }

        let row_origins = clamped_origins(config.rows, config.stride, image_height, config.tile_size);
        let col_origins = clamped_origins(config.cols, config.stride, image_width, config.tile_size);

        check_coverage(&row_origins, config.tile_size, image_height, "rows")?;
        check_coverage(&col_origins, config.tile_size, image_width, "cols")?;

        let mut tiles = Vec::with_capacity(config.rows * config.cols);
        for (row, &y) in row_origins.iter().enumerate() {
            for (col, &x) in col_origins.iter().enumerate() {
                tiles.push(TileSpec {
                    row,
                    col,
                    x,
                    y,
                    width: config.tile_size,
                    height: config.tile_size,
                });
            }
        }

        Ok(Self {
            tiles,
            rows: config.rows,
            cols: config.cols,
            tile_size: config.tile_size,
            image_height,
            image_width,
        })
    }

    /// All planned tiles in row-major order
    pub fn tiles(&self) -> &[TileSpec] {
        &self.tiles
    }

    /// Iterate over the planned tiles
    pub fn iter(&self) -> std::slice::Iter<'_, TileSpec> {
        self.tiles.iter()
    }

    /// Number of planned tiles
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Whether the grid contains no tiles
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tile rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of tile columns
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Tile edge length in pixels
    pub const fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Height of the image this grid was planned for
    pub const fn image_height(&self) -> usize {
        self.image_height
    }

    /// Width of the image this grid was planned for
    pub const fn image_width(&self) -> usize {
        self.image_width
    }

    /// Zero-based row-major index of a tile in this grid
    pub const fn linear_index(&self, spec: &TileSpec) -> usize {
        spec.linear_index(self.cols)
    }
}

impl<'a> IntoIterator for &'a TileGrid {
    type Item = &'a TileSpec;
    type IntoIter = std::slice::Iter<'a, TileSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

// Nominal origin i*stride everywhere except the last index, which is clamped
// to image_dim - tile_size so the final tile ends exactly at the image edge.
fn clamped_origins(count: usize, stride: usize, image_dim: usize, tile_size: usize) -> Vec<usize> {
    (0..count)
        .map(|i| {
            if i + 1 == count {
                image_dim - tile_size
            } else {
                i * stride
            }
        })
        .collect()
}

// A gap exists when consecutive origins are further apart than one tile
// length. The clamp guarantees the final tile reaches the image edge, so
// checking consecutive pairs is sufficient for full coverage.
fn check_coverage(
    origins: &[usize],
    tile_size: usize,
    image_dim: usize,
    axis: &'static str,
) -> Result<()> {
    let mut covered_to = 0;
    for &origin in origins {
        if origin > covered_to {
            return Err(invalid_parameter(
                axis,
                &origins.len(),
                &format!("grid leaves pixels {covered_to}..{origin} uncovered on the {axis} axis"),
            ));
        }
        covered_to = covered_to.max(origin + tile_size);
    }
    if covered_to < image_dim {
        return Err(invalid_parameter(
            axis,
            &origins.len(),
            &format!(
                "grid covers only {covered_to} of {image_dim} pixels on the {axis} axis"
            ),
        ));
    }
    Ok(())
}
