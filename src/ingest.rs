//! Deduplication & persistence gate.
//!
//! A parsed batch is partitioned record by record: orphaned references
//! (sample not registered) are collected for reporting, duplicates are
//! skipped by the storage-level natural-key constraint, everything else is
//! persisted. Insertion is per-record, not all-or-nothing: a storage failure
//! is counted and logged, and already-inserted siblings stay committed.
//!
//! Duplicates and orphans are data, not errors; the `errors` count is
//! reserved for storage failures. Because check-and-insert is atomic at the
//! constraint, a record that loses a race against a concurrent upload is
//! indistinguishable from a duplicate and is reported as skipped.

use log::{error, info};
use serde::Serialize;

use crate::model::{ElementalMeasurement, MeasurementKind, ProximateMeasurement};
use crate::store::{InsertOutcome, Store, StoreError};

/// A parsed batch of one measurement kind, pending the gate.
///
/// The closed enum replaces dynamic entity dispatch: every batch flows
/// through a typed insert function selected here.
#[derive(Debug, Clone)]
pub enum MeasurementBatch {
    /// CHN elemental records.
    Elemental(Vec<ElementalMeasurement>),
    /// ELTRA TGA proximate records.
    Proximate(Vec<ProximateMeasurement>),
}

impl MeasurementBatch {
    /// The measurement kind carried by this batch.
    pub fn kind(&self) -> MeasurementKind {
        match self {
            MeasurementBatch::Elemental(_) => MeasurementKind::Elemental,
            MeasurementBatch::Proximate(_) => MeasurementKind::Proximate,
        }
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        match self {
            MeasurementBatch::Elemental(records) => records.len(),
            MeasurementBatch::Proximate(records) => records.len(),
        }
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Four-way outcome of gating a batch. Callers display each non-empty
/// category distinctly; nothing here is silently swallowed. Serializes to
/// JSON for machine-readable consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Records persisted.
    pub saved: usize,
    /// Records skipped as natural-key duplicates.
    pub skipped: usize,
    /// Records lost to storage failures.
    pub errors: usize,
    /// Distinct unregistered sample ids, in first-seen order.
    pub missing: Vec<String>,
}

impl IngestOutcome {
    /// Empty outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another outcome (e.g. from the next file of a multi-file upload)
    /// into this one, keeping the missing list deduplicated.
    pub fn merge(&mut self, other: IngestOutcome) {
        self.saved += other.saved;
        self.skipped += other.skipped;
        self.errors += other.errors;
        for id in other.missing {
            if !self.missing.contains(&id) {
                self.missing.push(id);
            }
        }
    }

    /// Whether every record was persisted.
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.errors == 0 && self.missing.is_empty()
    }

    fn note_missing(&mut self, sample_id: &str) {
        if !self.missing.iter().any(|id| id == sample_id) {
            self.missing.push(sample_id.to_string());
        }
    }

    /// Format the outcome with colors (requires the console feature).
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::style;

            let mut out = format!(
                "{}: {} saved, {} skipped, {} errors\n",
                style("Ingest summary").bold(),
                style(self.saved).green(),
                style(self.skipped).yellow(),
                style(self.errors).red(),
            );
            if !self.missing.is_empty() {
                out.push_str(&format!(
                    "{}: {}\n",
                    style("Unregistered sample ids").yellow().bold(),
                    self.missing.join(", ")
                ));
            }
            out
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{self}")
        }
    }
}

impl std::fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Ingest summary: {} saved, {} skipped, {} errors",
            self.saved, self.skipped, self.errors
        )?;
        if !self.missing.is_empty() {
            writeln!(f, "Unregistered sample ids: {}", self.missing.join(", "))?;
        }
        Ok(())
    }
}

/// Gate a parsed batch against the persisted state.
///
/// For each record: referential check, then constraint-gated insert. Orphans
/// are never persisted and never cause Samples to be created.
pub fn ingest_batch(store: &dyn Store, batch: &MeasurementBatch) -> IngestOutcome {
    let outcome = match batch {
        MeasurementBatch::Elemental(records) => gate(
            store,
            records,
            |r| r.sample_id.as_str(),
            |store, r| store.insert_elemental(r),
        ),
        MeasurementBatch::Proximate(records) => gate(
            store,
            records,
            |r| r.sample_id.as_str(),
            |store, r| store.insert_proximate(r),
        ),
    };

    info!(
        "{} batch of {} records: {} saved, {} skipped, {} errors, {} unregistered",
        batch.kind(),
        batch.len(),
        outcome.saved,
        outcome.skipped,
        outcome.errors,
        outcome.missing.len()
    );
    outcome
}

fn gate<R>(
    store: &dyn Store,
    records: &[R],
    sample_id: impl Fn(&R) -> &str,
    insert: impl Fn(&dyn Store, &R) -> Result<InsertOutcome, StoreError>,
) -> IngestOutcome {
    let mut outcome = IngestOutcome::new();

    for record in records {
        let id = sample_id(record);

        match store.sample_exists(id) {
            Ok(true) => {}
            Ok(false) => {
                outcome.note_missing(id);
                continue;
            }
            Err(e) => {
                error!("referential check failed for {id}: {e}");
                outcome.errors += 1;
                continue;
            }
        }

        match insert(store, record) {
            Ok(InsertOutcome::Inserted) => outcome.saved += 1,
            Ok(InsertOutcome::Duplicate) => outcome.skipped += 1,
            Err(e) => {
                error!("insert failed for {id}: {e}");
                outcome.errors += 1;
            }
        }
    }

    outcome
}
