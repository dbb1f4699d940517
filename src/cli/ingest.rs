use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use labtrack::formats::{elemental, proximate, FormatError, InstrumentFormat};
use labtrack::ingest::{ingest_batch, IngestOutcome, MeasurementBatch};
use labtrack::store::{SqliteStore, Store};

use super::Config;

/// Ingest one or more instrument files.
///
/// Each file is independently validated and parsed; a file that fails its
/// header check or parse is reported and skipped, and the remaining files
/// continue. The merged outcome is printed at the end.
pub fn run(
    config: &Config,
    files: &[PathBuf],
    format: Option<InstrumentFormat>,
    json: bool,
) -> Result<()> {
    let store = SqliteStore::open(config.database_path())
        .with_context(|| format!("Failed to open database: {}", config.database_path().display()))?;

    let mut outcome = IngestOutcome::new();
    let mut skipped_files = 0usize;

    for path in files {
        match ingest_file(&store, path, format) {
            Ok(file_outcome) => outcome.merge(file_outcome),
            Err(e) => {
                warn!("skipping {}: {e:#}", path.display());
                skipped_files += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", outcome.format_colored());
    }
    if skipped_files > 0 {
        println!("{skipped_files} file(s) skipped due to format errors");
    }
    Ok(())
}

/// Validate, parse, and gate a single file.
fn ingest_file(
    store: &dyn Store,
    path: &Path,
    format: Option<InstrumentFormat>,
) -> Result<IngestOutcome> {
    // Decoding bytes to text happens here, outside the parsers.
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let format = match format {
        Some(format) => {
            if !format.matches_header(&content) {
                anyhow::bail!("not a valid {format} file");
            }
            format
        }
        None => InstrumentFormat::detect(&content)
            .context("unrecognized instrument format (header check failed)")?,
    };

    let batch = parse_batch(&content, format)
        .with_context(|| format!("Failed to parse as {format}"))?;
    info!(
        "{}: parsed {} {} records",
        path.display(),
        batch.len(),
        batch.kind()
    );

    Ok(ingest_batch(store, &batch))
}

fn parse_batch(content: &str, format: InstrumentFormat) -> Result<MeasurementBatch, FormatError> {
    match format {
        InstrumentFormat::Elemental => Ok(MeasurementBatch::Elemental(elemental::parse(content)?)),
        InstrumentFormat::Proximate => Ok(MeasurementBatch::Proximate(proximate::parse(content)?)),
    }
}
