//! tokscan - token counts for a whole directory tree
//!
//! tokscan provides:
//! - A pruning directory walk honoring the root .gitignore and hidden entries
//! - Per-file classification (processed / skipped / errored)
//! - cl100k_base token counts for every text file
//! - An optional bundle of the directory tree and all processed contents

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;
mod flows;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
