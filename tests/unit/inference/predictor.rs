//! Tests for the closure implementation of the predictor boundary

#[cfg(test)]
mod tests {

    use lesiontile::inference::predictor::TilePredictor;
    use lesiontile::io::error::predictor_error;
    use ndarray::{Array2, Array3, ArrayView3};

    fn predict_once<P: TilePredictor>(predictor: &mut P) -> lesiontile::Result<Array2<f32>> {
        let tile = Array3::<u8>::zeros((4, 4, 3));
        predictor.predict(&tile.view())
    }

    // Tests that a closure satisfies the predictor trait
    // Verified by removing the blanket FnMut implementation
    #[test]
    fn test_closure_is_a_predictor() {
        let mut calls = 0usize;
        let mut predictor = |tile: &ArrayView3<'_, u8>| -> lesiontile::Result<Array2<f32>> {
            calls += 1;
            let (height, width, _) = tile.dim();
            Ok(Array2::from_elem((height, width), 0.25f32))
        };

        let map = predict_once(&mut predictor).unwrap();
        assert_eq!(map.dim(), (4, 4));
        assert!(map.iter().all(|&p| (p - 0.25).abs() < f32::EPSILON));
        assert_eq!(calls, 1);
    }

    // Tests error propagation through the trait object boundary
    // Verified by mapping predictor errors to default maps
    #[test]
    fn test_predictor_error_propagates() {
        let mut failing =
            |_tile: &ArrayView3<'_, u8>| -> lesiontile::Result<Array2<f32>> {
                Err(predictor_error(&"session lost"))
            };

        let result = predict_once(&mut failing);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("session lost"));
    }
}
