//! CLI entry point for fundus patch extraction and class balancing

use clap::Parser;
use lesiontile::io::cli::{Cli, DatasetProcessor};

fn main() -> lesiontile::Result<()> {
    let cli = Cli::parse();
    let mut processor = DatasetProcessor::new(cli);
    processor.process()
}
