//! Tabular hand-off for the spreadsheet export collaborator.
//!
//! Two delimited tables per measurement kind: per-sample means and all raw
//! rows, with the human-facing column labels the lab expects. The caller
//! points this at a directory; the downstream export step consumes the
//! tables as-is.

use std::path::{Path, PathBuf};

use crate::aggregate;
use crate::model::{ElementalMeasurement, MeasurementKind, ProximateMeasurement};

/// Errors while writing export tables.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing failure.
    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),
}

/// Paths of the two written tables.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    /// Per-sample means table.
    pub means: PathBuf,
    /// All raw rows table.
    pub raw: PathBuf,
}

const ELEMENTAL_MEAN_HEADER: [&str; 4] =
    ["Sample ID", "Carbon (wt%)", "Hydrogen (wt%)", "Nitrogen (wt%)"];

const ELEMENTAL_RAW_HEADER: [&str; 5] = [
    "Sample ID",
    "Analysis Date",
    "Carbon (wt%)",
    "Hydrogen (wt%)",
    "Nitrogen (wt%)",
];

const PROXIMATE_COLUMNS: [&str; 8] = [
    "Moisture (wt%)",
    "Volatiles ar (wt%)",
    "Volatiles dry (wt%)",
    "Ash LTA ar (wt%)",
    "Ash LTA dry (wt%)",
    "Ash HTA ar (wt%)",
    "Ash HTA dry (wt%)",
    "Fixed Carbon ar (wt%)",
];

/// Write the elemental means and raw tables into `dir`.
pub fn export_elemental(
    dir: &Path,
    records: &[ElementalMeasurement],
) -> Result<ExportPaths, ExportError> {
    let paths = paths_for(dir, MeasurementKind::Elemental);

    let mut means = csv::Writer::from_path(&paths.means)?;
    means.write_record(ELEMENTAL_MEAN_HEADER)?;
    for row in aggregate::elemental_means(records) {
        means.write_record([
            row.sample_id.clone(),
            cell(row.carbon_percentage),
            cell(row.hydrogen_percentage),
            cell(row.nitrogen_percentage),
        ])?;
    }
    means.flush()?;

    let mut raw = csv::Writer::from_path(&paths.raw)?;
    raw.write_record(ELEMENTAL_RAW_HEADER)?;
    for record in records {
        raw.write_record([
            record.sample_id.clone(),
            record.analysis_date.clone(),
            cell(record.carbon_percentage),
            cell(record.hydrogen_percentage),
            cell(record.nitrogen_percentage),
        ])?;
    }
    raw.flush()?;

    Ok(paths)
}

/// Write the proximate means and raw tables into `dir`.
pub fn export_proximate(
    dir: &Path,
    records: &[ProximateMeasurement],
) -> Result<ExportPaths, ExportError> {
    let paths = paths_for(dir, MeasurementKind::Proximate);

    let mut means = csv::Writer::from_path(&paths.means)?;
    let mut header = vec!["Sample ID"];
    header.extend(PROXIMATE_COLUMNS);
    means.write_record(&header)?;
    for row in aggregate::proximate_means(records) {
        means.write_record([
            row.sample_id.clone(),
            cell(row.moisture),
            cell(row.volatiles_ar),
            cell(row.volatiles_db),
            cell(row.ash_lta_ar),
            cell(row.ash_lta_db),
            cell(row.ash_hta_ar),
            cell(row.ash_hta_db),
            cell(row.fixed_c_ar),
        ])?;
    }
    means.flush()?;

    let mut raw = csv::Writer::from_path(&paths.raw)?;
    let mut header = vec!["Sample ID", "Analysis Date"];
    header.extend(PROXIMATE_COLUMNS);
    raw.write_record(&header)?;
    for record in records {
        raw.write_record([
            record.sample_id.clone(),
            record.analysis_date.clone(),
            cell(record.moisture),
            cell(record.volatiles_ar),
            cell(record.volatiles_db),
            cell(record.ash_lta_ar),
            cell(record.ash_lta_db),
            cell(record.ash_hta_ar),
            cell(record.ash_hta_db),
            cell(record.fixed_c_ar),
        ])?;
    }
    raw.flush()?;

    Ok(paths)
}

fn paths_for(dir: &Path, kind: MeasurementKind) -> ExportPaths {
    ExportPaths {
        means: dir.join(format!("{}_means.csv", kind.name())),
        raw: dir.join(format!("{}_raw.csv", kind.name())),
    }
}

/// Null cells export as empty strings.
fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
