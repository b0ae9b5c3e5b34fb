use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Number of expansion steps to run
    #[arg(short = 'n', long, value_name = "STEPS", default_value_t = 8)]
    pub steps: usize,

    /// Seed for the random source (default: from entropy)
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Print every generation instead of only the last
    #[arg(short, long)]
    pub all: bool,
}
