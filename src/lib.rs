//! # labtrack - Laboratory Sample Tracking
//!
//! `labtrack` tracks physical laboratory samples and the instrument
//! measurements taken from them. Users register samples (each receiving a
//! generated `PREFIX_YY_NNNNN` identifier), upload fixed-format instrument
//! exports (CHN elemental analysis, ELTRA TGA proximate analysis), and the
//! pipeline parses, validates, deduplicates, and persists the measurements
//! keyed to sample identifiers.
//!
//! ## Pipeline
//!
//! Uploaded raw text flows through:
//!
//! 1. **Header validation** ([`formats`]): does the content match the
//!    expected instrument format? Pure check, never errors.
//! 2. **Record parsing** ([`formats::elemental`], [`formats::proximate`]):
//!    semi-structured delimited text becomes typed records; unparseable
//!    numeric cells become nulls, structural problems fail the file.
//! 3. **Deduplication & persistence gate** ([`ingest`]): records referencing
//!    unregistered samples are collected as "missing", natural-key
//!    duplicates are skipped by storage constraints, the rest is persisted.
//!    The caller receives a four-way [`ingest::IngestOutcome`].
//! 4. **Aggregation** ([`aggregate`]) and **export** ([`export`]): per-sample
//!    means and raw rows as plain tabular data.
//!
//! Sample id allocation ([`idgen`], [`store::Store::allocate_sample_id`])
//! runs independently at registration time and is atomic at the storage
//! layer, so concurrent registrations never collide.
//!
//! ## Quick Start
//!
//! ```rust
//! use labtrack::formats::{elemental, InstrumentFormat};
//! use labtrack::ingest::{ingest_batch, MeasurementBatch};
//! use labtrack::model::Sample;
//! use labtrack::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::open_in_memory()?;
//!
//! // Register a sample.
//! let sample_id = store.allocate_sample_id("BIO")?;
//! store.insert_sample(&Sample {
//!     sample_id: sample_id.clone(),
//!     sample_type: "biomass".into(),
//!     project: "P1".into(),
//!     registration_date: "2024-03-01".into(),
//!     sampling_date: "2024-02-28".into(),
//!     sampling_location: "site A".into(),
//!     sample_condition: "dry".into(),
//!     responsible_person: "rp".into(),
//! })?;
//!
//! // Ingest an uploaded CHN file.
//! let content = format!(
//!     "sample_id\tComments\tMass\tNitrogen %\tCarbon %\tHydrogen %\tAnalysis Date\n\
//!      {sample_id}\t\t2.0\t1.1\t40.0\t5.0\t2024-03-01\n"
//! );
//! assert_eq!(InstrumentFormat::detect(&content), Some(InstrumentFormat::Elemental));
//!
//! let records = elemental::parse(&content)?;
//! let outcome = ingest_batch(&store, &MeasurementBatch::Elemental(records));
//! assert_eq!(outcome.saved, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The web UI, login screen, and admin screens are external collaborators:
//! they decode uploaded bytes to text, perform the authorization check
//! against the user store, call into this pipeline, and display the
//! returned outcome. The bundled `labtrack` binary is a thin stand-in for
//! that collaborator.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aggregate;
pub mod export;
pub mod formats;
pub mod idgen;
pub mod ingest;
pub mod model;
pub mod store;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aggregate::{elemental_means, proximate_means, ElementalMean, ProximateMean};
    pub use crate::export::{export_elemental, export_proximate, ExportError, ExportPaths};
    pub use crate::formats::{FormatError, InstrumentFormat};
    pub use crate::ingest::{ingest_batch, IngestOutcome, MeasurementBatch};
    pub use crate::model::{
        ElementalMeasurement, MeasurementKind, ProximateMeasurement, Role, Sample, User,
    };
    pub use crate::store::{InsertOutcome, SqliteStore, Store, StoreError};
}
