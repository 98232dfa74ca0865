//! Tests for command-line parsing and the batch processing driver

#[cfg(test)]
mod tests {

    use clap::Parser;
    use lesiontile::io::cli::{Cli, Command, DatasetProcessor};
    use lesiontile::io::configuration::{
        DEFAULT_EMPTINESS_THRESHOLD, DEFAULT_MAX_NEGATIVE_RATIO, DEFAULT_SEED, DEFAULT_STRIDE,
        DEFAULT_TILE_SIZE,
    };
    use std::path::PathBuf;
    use tempfile::TempDir;

    // Tests extract parsing with only the required directory arguments
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_extract_parse_minimal_args() {
        let cli = Cli::parse_from(["lesiontile", "extract", "images", "mask"]);

        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.images, PathBuf::from("images"));
                assert_eq!(args.masks, PathBuf::from("mask"));
                assert_eq!(args.tile_size, DEFAULT_TILE_SIZE);
                assert_eq!(args.stride, DEFAULT_STRIDE);
                assert_eq!(args.emptiness_threshold, DEFAULT_EMPTINESS_THRESHOLD);
                assert_eq!(args.seed, DEFAULT_SEED);
                assert!(args.max_ratio.is_none());
                assert!(!args.quiet);
            }
            Command::Balance(_) => unreachable!("Expected the extract subcommand"),
        }
    }

    // Tests extract parsing with the full argument set
    // Verified by modifying argument names
    #[test]
    fn test_extract_parse_all_args() {
        let cli = Cli::parse_from([
            "lesiontile",
            "extract",
            "in/images",
            "in/masks",
            "--tile-size",
            "256",
            "--stride",
            "128",
            "--rows",
            "5",
            "--cols",
            "8",
            "--emptiness-threshold",
            "50",
            "--max-ratio",
            "3",
            "--seed",
            "7",
            "--quiet",
        ]);

        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.tile_size, 256);
                assert_eq!(args.stride, 128);
                assert_eq!(args.rows, 5);
                assert_eq!(args.cols, 8);
                assert_eq!(args.emptiness_threshold, 50);
                assert_eq!(args.max_ratio, Some(3));
                assert_eq!(args.seed, 7);
                assert!(args.quiet);
            }
            Command::Balance(_) => unreachable!("Expected the extract subcommand"),
        }
    }

    // Tests balance parsing defaults
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_balance_parse_defaults() {
        let cli = Cli::parse_from(["lesiontile", "balance"]);

        match cli.command {
            Command::Balance(args) => {
                assert_eq!(args.patch_dir, PathBuf::from("patches"));
                assert_eq!(args.label_dir, PathBuf::from("labels"));
                assert_eq!(args.max_ratio, DEFAULT_MAX_NEGATIVE_RATIO);
                assert_eq!(args.seed, DEFAULT_SEED);
            }
            Command::Extract(_) => unreachable!("Expected the balance subcommand"),
        }
    }

    // Tests that a missing subcommand is a parse error
    // Verified by making the subcommand optional
    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["lesiontile"]).is_err());
    }

    // Tests the driver's rejection of a non-directory mask target
    // Verified by treating files as single-entry directories
    #[test]
    fn test_extract_rejects_file_mask_target() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not_a_dir.tif");
        std::fs::write(&file, b"stub").unwrap();

        let cli = Cli::parse_from([
            "lesiontile",
            "extract",
            dir.path().to_str().unwrap(),
            file.to_str().unwrap(),
            "--quiet",
        ]);
        let mut processor = DatasetProcessor::new(cli);

        assert!(processor.process().is_err());
    }

    // Tests that an empty mask directory is a clean no-op
    // Verified by erroring on empty batches
    #[test]
    fn test_extract_empty_directory_is_noop() {
        let images = TempDir::new().unwrap();
        let masks = TempDir::new().unwrap();

        let cli = Cli::parse_from([
            "lesiontile",
            "extract",
            images.path().to_str().unwrap(),
            masks.path().to_str().unwrap(),
            "--quiet",
        ]);
        let mut processor = DatasetProcessor::new(cli);

        assert!(processor.process().is_ok());
    }
}
