//! Storage seam between the ingestion pipeline and the persisted state.
//!
//! The pipeline only talks to the [`Store`] trait; the SQLite backend in
//! [`sqlite`] is the production implementation. Uniqueness and id allocation
//! are enforced at the storage layer (constraints and transactions), not by
//! application-level pre-checks, so concurrent uploads cannot race past them.

use crate::model::{ElementalMeasurement, ProximateMeasurement, Sample};

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored role value that the application does not recognize.
    #[error("unknown role in store: {0}")]
    UnknownRole(String),

    /// Password hashing failure while adding or authenticating a user.
    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Result of a constraint-gated insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was persisted.
    Inserted,
    /// The row was rejected by the natural-key constraint; an equal row is
    /// already persisted.
    Duplicate,
}

/// Persisted state the ingestion pipeline reads and writes.
///
/// Measurement inserts use insert-or-reject semantics: the natural-key check
/// and the insert are one atomic storage operation, so a record that loses a
/// race against a concurrent upload is reported as [`InsertOutcome::Duplicate`]
/// rather than inserted twice.
pub trait Store {
    /// Whether a sample with this id is registered.
    fn sample_exists(&self, sample_id: &str) -> Result<bool, StoreError>;

    /// Persist a newly registered sample.
    fn insert_sample(&self, sample: &Sample) -> Result<InsertOutcome, StoreError>;

    /// All registered sample ids.
    fn list_sample_ids(&self) -> Result<Vec<String>, StoreError>;

    /// All registered samples.
    fn list_samples(&self) -> Result<Vec<Sample>, StoreError>;

    /// Allocate the next sample id for `prefix` in the current year.
    ///
    /// Atomic: two concurrent registrations never receive the same id.
    fn allocate_sample_id(&self, prefix: &str) -> Result<String, StoreError>;

    /// Insert an elemental measurement, rejecting natural-key duplicates.
    fn insert_elemental(&self, record: &ElementalMeasurement) -> Result<InsertOutcome, StoreError>;

    /// Insert a proximate measurement, rejecting natural-key duplicates.
    fn insert_proximate(&self, record: &ProximateMeasurement) -> Result<InsertOutcome, StoreError>;

    /// All persisted elemental measurements, ordered by sample id.
    fn elemental_measurements(&self) -> Result<Vec<ElementalMeasurement>, StoreError>;

    /// All persisted proximate measurements, ordered by sample id.
    fn proximate_measurements(&self) -> Result<Vec<ProximateMeasurement>, StoreError>;
}
