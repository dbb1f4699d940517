//! CHN elemental analyzer export: tab-delimited with a single header row.
//!
//! The analyzer writes one row per combustion run. Only a fixed subset of the
//! columns is relevant; percentage cells may contain placeholder text that
//! coerces to null instead of failing the file.

use crate::model::ElementalMeasurement;

use super::FormatError;

/// Header tokens that must all appear in one tab-delimited row for the file
/// to be accepted as a CHN export.
pub const REQUIRED_HEADERS: [&str; 7] = [
    "sample_id",
    "Comments",
    "Mass",
    "Nitrogen %",
    "Carbon %",
    "Hydrogen %",
    "Analysis Date",
];

/// Check whether any tab-delimited line carries all required header tokens.
///
/// The header appears as one delimited row, so every line is a candidate.
/// Returns `false` on any anomaly; never errors.
pub fn has_required_headers(content: &str) -> bool {
    content.lines().any(|line| {
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        REQUIRED_HEADERS.iter().all(|h| fields.contains(h))
    })
}

/// Parse a validated CHN export into measurement records.
///
/// The first row is the header; column names are matched after trimming.
/// Percentage cells that fail to parse become `None`. The result is sorted
/// ascending by `sample_id` for determinism.
pub fn parse(content: &str) -> Result<Vec<ElementalMeasurement>, FormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let col = |name: &str| -> Result<usize, FormatError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FormatError::MissingColumn(name.to_string()))
    };

    let id_col = col("sample_id")?;
    let date_col = col("Analysis Date")?;
    let carbon_col = col("Carbon %")?;
    let hydrogen_col = col("Hydrogen %")?;
    let nitrogen_col = col("Nitrogen %")?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let sample_id = field(id_col).to_string();
        if sample_id.is_empty() {
            continue;
        }

        records.push(ElementalMeasurement {
            sample_id,
            analysis_date: field(date_col).to_string(),
            carbon_percentage: coerce(field(carbon_col)),
            hydrogen_percentage: coerce(field(hydrogen_col)),
            nitrogen_percentage: coerce(field(nitrogen_col)),
        });
    }

    records.sort_by(|a, b| a.sample_id.cmp(&b.sample_id));
    Ok(records)
}

/// Numeric coercion: unparseable cells become null, not a hard failure.
fn coerce(value: &str) -> Option<f64> {
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "\
sample_id\tComments\tMass\t Nitrogen % \t Carbon % \t Hydrogen % \tAnalysis Date
BIO_24_00002\tok\t2.01\t1.2\t42.0\t5.5\t2024-03-01
BIO_24_00001\t\t2.00\t1.1\t40.0\t5.0\t2024-03-01
BIO_24_00003\tflagged\t1.99\tn.d.\t41.5\t5.2\t2024-03-01
";

    #[test]
    fn header_check_accepts_valid_file() {
        assert!(has_required_headers(VALID));
    }

    #[test]
    fn header_check_is_idempotent() {
        assert_eq!(has_required_headers(VALID), has_required_headers(VALID));
    }

    #[test]
    fn header_check_rejects_missing_token() {
        let content = "sample_id\tComments\tMass\tNitrogen %\tCarbon %\tAnalysis Date\n";
        assert!(!has_required_headers(content));
    }

    #[test]
    fn parse_selects_renames_and_sorts() {
        let records = parse(VALID).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sample_id, "BIO_24_00001");
        assert_eq!(records[1].sample_id, "BIO_24_00002");
        assert_eq!(records[0].carbon_percentage, Some(40.0));
        assert_eq!(records[0].hydrogen_percentage, Some(5.0));
        assert_eq!(records[0].nitrogen_percentage, Some(1.1));
        assert_eq!(records[0].analysis_date, "2024-03-01");
    }

    #[test]
    fn unparseable_percentage_becomes_null() {
        let records = parse(VALID).unwrap();
        let flagged = records.iter().find(|r| r.sample_id == "BIO_24_00003").unwrap();
        assert_eq!(flagged.nitrogen_percentage, None);
        assert_eq!(flagged.carbon_percentage, Some(41.5));
    }

    #[test]
    fn missing_column_fails_the_file() {
        let content = "sample_id\tComments\tMass\tNitrogen %\tHydrogen %\tAnalysis Date
S1\t\t2.0\t1.0\t5.0\t2024-03-01
";
        match parse(content) {
            Err(FormatError::MissingColumn(col)) => assert_eq!(col, "Carbon %"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn rows_without_sample_id_are_dropped() {
        let content = "\
sample_id\tComments\tMass\tNitrogen %\tCarbon %\tHydrogen %\tAnalysis Date
\tblank run\t0.0\t\t\t\t2024-03-01
S1\t\t2.0\t1.0\t40.0\t5.0\t2024-03-01
";
        let records = parse(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sample_id, "S1");
    }
}
