//! # labtrack CLI
//!
//! Command-line front end for the sample-tracking library: register samples,
//! ingest instrument files, list samples, export tables, manage users.
//!
//! ```bash
//! # Register a sample
//! labtrack register --prefix BIO --project "P1"
//!
//! # Ingest instrument files (format auto-detected)
//! labtrack ingest runs/chn_2024-03.txt runs/tga_2024-03.txt
//!
//! # Export means + raw tables
//! labtrack export --kind elemental --out exports/
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
