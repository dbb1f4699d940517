use std::path::Path;

use anyhow::{Context, Result};

use labtrack::export::{export_elemental, export_proximate, ExportPaths};
use labtrack::model::MeasurementKind;
use labtrack::store::{SqliteStore, Store};

use super::Config;

/// Export per-sample means and raw rows for one measurement kind.
pub fn run(config: &Config, kind: MeasurementKind, out: &Path) -> Result<()> {
    let store = SqliteStore::open(config.database_path())
        .with_context(|| format!("Failed to open database: {}", config.database_path().display()))?;

    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?;

    let paths: ExportPaths = match kind {
        MeasurementKind::Elemental => {
            let records = store
                .elemental_measurements()
                .context("Failed to fetch elemental measurements")?;
            export_elemental(out, &records)?
        }
        MeasurementKind::Proximate => {
            let records = store
                .proximate_measurements()
                .context("Failed to fetch proximate measurements")?;
            export_proximate(out, &records)?
        }
    };

    println!("Wrote {}", paths.means.display());
    println!("Wrote {}", paths.raw.display());
    Ok(())
}
