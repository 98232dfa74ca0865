//! Tests for overlap-max aggregation and full-pass stitching

#[cfg(test)]
mod tests {

    use lesiontile::inference::stitcher::{AggregationBuffer, stitch};
    use lesiontile::io::error::predictor_error;
    use lesiontile::spatial::grid::{GridConfig, TileGrid};
    use ndarray::{Array2, Array3, ArrayView3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn small_grid() -> TileGrid {
        let config = GridConfig {
            tile_size: 32,
            stride: 16,
            rows: 3,
            cols: 3,
        };
        TileGrid::plan(64, 64, &config).unwrap()
    }

    // Probability map whose values encode the tile's grid position, so
    // overlapping regions receive conflicting values from neighbors
    fn position_map(row: usize, col: usize, size: usize) -> Array2<f32> {
        let value = 0.1 + 0.1 * ((row * 3 + col) as f32);
        Array2::from_elem((size, size), value)
    }

    // Tests that the maximum wins over overlapping regions
    // Verified by replacing max with last-writer-wins
    #[test]
    fn test_overlap_keeps_stronger_response() {
        let grid = small_grid();
        let mut buffer = AggregationBuffer::new(64, 64);

        // Tiles (0,0) and (0,1) overlap on x in [16, 32)
        let strong = Array2::from_elem((32, 32), 0.9f32);
        let weak = Array2::from_elem((32, 32), 0.1f32);

        let first = grid.tiles().iter().find(|t| t.row == 0 && t.col == 0).unwrap();
        let second = grid.tiles().iter().find(|t| t.row == 0 && t.col == 1).unwrap();

        buffer.merge_max(first, &strong).unwrap();
        buffer.merge_max(second, &weak).unwrap();

        let overlap_value = buffer.values()[(8, 20)];
        assert!((overlap_value - 0.9).abs() < f32::EPSILON, "max, not average");

        let mask = buffer.threshold(0.5);
        assert_eq!(mask[(8, 20)], 1);
        assert_eq!(mask[(40, 40)], 0);
    }

    // Tests order independence of the merge: any permutation of the tiles
    // produces an identical buffer
    // Verified by replacing max with addition
    #[test]
    fn test_merge_order_irrelevant() {
        let grid = small_grid();

        let mut reference = AggregationBuffer::new(64, 64);
        for tile in &grid {
            reference
                .merge_max(tile, &position_map(tile.row, tile.col, 32))
                .unwrap();
        }

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..5 {
            let mut shuffled: Vec<_> = grid.tiles().to_vec();
            shuffled.shuffle(&mut rng);

            let mut buffer = AggregationBuffer::new(64, 64);
            for tile in &shuffled {
                buffer
                    .merge_max(tile, &position_map(tile.row, tile.col, 32))
                    .unwrap();
            }

            assert_eq!(buffer.values(), reference.values());
        }
    }

    // Tests that merges never lower a pixel
    // Verified by writing the incoming value unconditionally
    #[test]
    fn test_buffer_is_monotonic() {
        let grid = small_grid();
        let mut buffer = AggregationBuffer::new(64, 64);
        let tile = grid.tiles().first().unwrap();

        buffer
            .merge_max(tile, &Array2::from_elem((32, 32), 0.8f32))
            .unwrap();
        buffer
            .merge_max(tile, &Array2::from_elem((32, 32), 0.3f32))
            .unwrap();

        assert!((buffer.values()[(0, 0)] - 0.8).abs() < f32::EPSILON);
    }

    // Tests that a wrong-shaped probability map is rejected
    // Verified by trusting the predictor's output shape
    #[test]
    fn test_wrong_shape_map_rejected() {
        let grid = small_grid();
        let mut buffer = AggregationBuffer::new(64, 64);
        let tile = grid.tiles().first().unwrap();

        let result = buffer.merge_max(tile, &Array2::from_elem((16, 32), 0.5f32));
        assert!(result.is_err());
    }

    // Tests the full pass: one failing tile leaves its region empty and is
    // reported with its coordinates, while the rest of the image stitches
    // Verified by aborting the pass on the first predictor error
    #[test]
    fn test_stitch_survives_failed_tile() {
        let grid = small_grid();
        let image = Array3::from_elem((64, 64, 3), 50u8);

        let mut predictor = |tile: &ArrayView3<'_, u8>| {
            let (height, width, _) = tile.dim();
            // The bottom-right corner tile fails; everything else is confident
            if height == 32 && tile[(0, 0, 0)] == 255 {
                return Err(predictor_error(&"tile rejected"));
            }
            Ok(Array2::from_elem((height, width), 0.9f32))
        };

        // Mark the bottom-right tile's origin pixel so the stub can spot it
        let mut marked = image;
        marked[(32, 32, 0)] = 255u8;

        let outcome = stitch(&marked, &grid, &mut predictor, 0.5).unwrap();

        assert_eq!(outcome.failures.len(), 1);
        let failure = outcome.failures.first().unwrap();
        assert_eq!((failure.row, failure.col), (2, 2));

        // The failed tile's exclusive region stays background
        assert_eq!(outcome.mask[(60, 60)], 0);
        // Regions covered by successful tiles are foreground
        assert_eq!(outcome.mask[(10, 10)], 1);
        assert_eq!(outcome.mask[(40, 10)], 1);
    }

    // Tests rejection of a grid planned for a different image
    // Verified by dropping the dimension comparison
    #[test]
    fn test_stitch_rejects_foreign_grid() {
        let grid = small_grid();
        let image = Array3::<u8>::zeros((128, 128, 3));

        let mut predictor = |tile: &ArrayView3<'_, u8>| -> lesiontile::Result<Array2<f32>> {
            let (height, width, _) = tile.dim();
            Ok(Array2::from_elem((height, width), 0.0f32))
        };

        assert!(stitch(&image, &grid, &mut predictor, 0.5).is_err());
    }
}
