//! Instrument file formats: header validation and record parsing.
//!
//! Two fixed-format text exports are supported:
//!
//! - **Elemental (CHN)**: UTF-8 tab-delimited with a single header row.
//! - **Proximate (ELTRA TGA)**: UTF-8 free-text header block followed by a
//!   comma-delimited data table with a self-identifying header row.
//!
//! Header validation and parsing are pure functions of the decoded text;
//! receiving bytes and decoding them is the caller's job. Validation never
//! errors — a file that does not match is a normal negative result.

pub mod elemental;
pub mod proximate;

/// Errors produced while parsing a structurally validated instrument file.
///
/// A `FormatError` is scoped to one file; callers processing a multi-file
/// batch report it and continue with the remaining files.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A required column is absent from the header row.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// No data header row was found anywhere in the file.
    #[error("no header row found")]
    NoHeaderRow,

    /// Low-level CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

/// The two instrument formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentFormat {
    /// CHN elemental analyzer export.
    Elemental,
    /// ELTRA TGA proximate analyzer export.
    Proximate,
}

impl InstrumentFormat {
    /// Check whether `content` carries this format's required header tokens.
    ///
    /// Pure and infallible: any structural anomaly yields `false`.
    pub fn matches_header(&self, content: &str) -> bool {
        match self {
            InstrumentFormat::Elemental => elemental::has_required_headers(content),
            InstrumentFormat::Proximate => proximate::has_required_headers(content),
        }
    }

    /// Detect the format of `content` by trying each header check in turn.
    pub fn detect(content: &str) -> Option<Self> {
        if elemental::has_required_headers(content) {
            Some(InstrumentFormat::Elemental)
        } else if proximate::has_required_headers(content) {
            Some(InstrumentFormat::Proximate)
        } else {
            None
        }
    }
}

impl std::fmt::Display for InstrumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentFormat::Elemental => f.write_str("elemental (CHN)"),
            InstrumentFormat::Proximate => f.write_str("proximate (ELTRA TGA)"),
        }
    }
}
