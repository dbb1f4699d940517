//! ELTRA TGA proximate analyzer export.
//!
//! The instrument writes a free-text header block (version, user, caption,
//! analysis date) followed by a comma-delimited data table. The table's
//! header row identifies itself by containing both an `N ,` token and an
//! `Id` token; group/statistics lines ("Gruppe", "MW:", "STD:") are
//! interleaved with the data and must be skipped.

use crate::model::ProximateMeasurement;

use super::FormatError;

/// Line prefixes that must each start at least one of the first
/// [`HEADER_WINDOW`] lines for the file to be accepted as a TGA export.
/// Unlike the elemental case, the tokens may appear on different lines.
pub const REQUIRED_PREFIXES: [&str; 5] = [
    "Tga Version:",
    "Analyse durchgeführt:",
    "Benutzer:",
    "Caption:",
    "Applikation:",
];

/// Marker announcing the analysis date; the remainder of the line is the
/// date as the instrument formats it.
const ANALYSIS_DATE_PREFIX: &str = "Analyse durchgeführt:";

/// Markers for group/statistics lines that are not data rows.
const STATISTICS_MARKERS: [&str; 3] = ["Gruppe", "MW:", "STD:"];

/// Bounded scan window for the free-text header block.
pub const HEADER_WINDOW: usize = 15;

/// Check whether the first [`HEADER_WINDOW`] lines carry all required
/// header prefixes. Returns `false` on any anomaly; never errors.
pub fn has_required_headers(content: &str) -> bool {
    let head: Vec<&str> = content.lines().take(HEADER_WINDOW).map(str::trim).collect();
    REQUIRED_PREFIXES
        .iter()
        .all(|prefix| head.iter().any(|line| line.starts_with(prefix)))
}

/// Parse a validated TGA export into measurement records.
///
/// The analysis date is a soft condition: if no date line is found the
/// records carry an empty `analysis_date` and parsing continues. A file
/// without a data header row fails with [`FormatError::NoHeaderRow`].
/// Results are sorted ascending by `sample_id`.
pub fn parse(content: &str) -> Result<Vec<ProximateMeasurement>, FormatError> {
    let analysis_date = extract_analysis_date(content).unwrap_or_default();

    let mut columns: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in content.lines() {
        if columns.is_none() && line.contains("N ,") && line.contains("Id") {
            columns = Some(line.split(',').map(|c| c.trim().to_string()).collect());
            continue;
        }

        if STATISTICS_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }

        if let Some(cols) = &columns {
            let values: Vec<&str> = line.split(',').collect();
            if values.len() == cols.len() {
                rows.push(values.iter().map(|v| v.trim().to_string()).collect());
            }
        }
    }

    let columns = columns.ok_or(FormatError::NoHeaderRow)?;

    let col = |name: &str| -> Result<usize, FormatError> {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FormatError::MissingColumn(name.to_string()))
    };

    // Canonical mapping from instrument column names: `a` suffixes are
    // as-received, `d` suffixes are dry basis.
    let id_col = col("Id")?;
    let moisture_col = col("Moisture")?;
    let volatiles_ar_col = col("Va")?;
    let volatiles_db_col = col("Vd")?;
    let ash_lta_ar_col = col("Aa_LTA")?;
    let ash_lta_db_col = col("Ad_LTA")?;
    let ash_hta_ar_col = col("Aa_HTA")?;
    let ash_hta_db_col = col("Ad_HTA")?;
    let fixed_c_ar_col = col("FCa")?;

    let mut records: Vec<ProximateMeasurement> = rows
        .iter()
        .filter(|row| !row[id_col].is_empty())
        .map(|row| ProximateMeasurement {
            sample_id: row[id_col].clone(),
            analysis_date: analysis_date.clone(),
            moisture: coerce(&row[moisture_col]),
            volatiles_ar: coerce(&row[volatiles_ar_col]),
            volatiles_db: coerce(&row[volatiles_db_col]),
            ash_lta_ar: coerce(&row[ash_lta_ar_col]),
            ash_lta_db: coerce(&row[ash_lta_db_col]),
            ash_hta_ar: coerce(&row[ash_hta_ar_col]),
            ash_hta_db: coerce(&row[ash_hta_db_col]),
            fixed_c_ar: coerce(&row[fixed_c_ar_col]),
        })
        .collect();

    records.sort_by(|a, b| a.sample_id.cmp(&b.sample_id));
    Ok(records)
}

/// Scan the header block for the analysis date line and return the trailing
/// date text, trimmed.
fn extract_analysis_date(content: &str) -> Option<String> {
    content
        .lines()
        .take(HEADER_WINDOW)
        .map(str::trim)
        .find_map(|line| line.strip_prefix(ANALYSIS_DATE_PREFIX))
        .map(|rest| rest.trim().to_string())
}

fn coerce(value: &str) -> Option<f64> {
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "\
Tga Version: 9.23
Analyse durchgeführt: 12.03.2024 14:03
Benutzer: lab
Caption: Proximate run 42
Applikation: Proximate

N ,Id,Weight,Moisture,Va,Aa_LTA,Aa_HTA,Vd,Ad_LTA,Ad_HTA,FCa
1,BIO_24_00002,1.02,5.3,30.8,4.1,3.9,32.5,4.3,4.1,51.9
2,BIO_24_00001,1.01,5.1,30.2,4.0,3.8,32.0,4.2,4.0,52.3
Gruppe 1
MW:,,,5.2,30.5,4.05,3.85,32.25,4.25,4.05,52.1
STD:,,,0.1,0.3,0.05,0.05,0.25,0.05,0.05,0.2
3,BIO_24_00003,1.00,bad,29.9,3.9,3.7,31.8,4.1,3.9,52.6
";

    #[test]
    fn header_check_accepts_valid_file() {
        assert!(has_required_headers(VALID));
    }

    #[test]
    fn header_check_rejects_when_prefix_missing() {
        let content = VALID.replace("Benutzer:", "User:");
        assert!(!has_required_headers(&content));
    }

    #[test]
    fn header_check_ignores_tokens_outside_the_window() {
        let padding = "filler line\n".repeat(HEADER_WINDOW);
        let content = format!("{padding}{VALID}");
        assert!(!has_required_headers(&content));
    }

    #[test]
    fn parse_extracts_date_and_sorts() {
        let records = parse(VALID).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sample_id, "BIO_24_00001");
        assert_eq!(records[0].analysis_date, "12.03.2024 14:03");
        assert_eq!(records[0].moisture, Some(5.1));
        assert_eq!(records[0].volatiles_ar, Some(30.2));
        assert_eq!(records[0].volatiles_db, Some(32.0));
        assert_eq!(records[0].ash_lta_ar, Some(4.0));
        assert_eq!(records[0].ash_lta_db, Some(4.2));
        assert_eq!(records[0].ash_hta_ar, Some(3.8));
        assert_eq!(records[0].ash_hta_db, Some(4.0));
        assert_eq!(records[0].fixed_c_ar, Some(52.3));
    }

    #[test]
    fn statistics_lines_are_skipped() {
        let records = parse(VALID).unwrap();
        assert!(records.iter().all(|r| r.sample_id.starts_with("BIO_")));
    }

    #[test]
    fn unparseable_cell_becomes_null() {
        let records = parse(VALID).unwrap();
        let bad = records.iter().find(|r| r.sample_id == "BIO_24_00003").unwrap();
        assert_eq!(bad.moisture, None);
        assert_eq!(bad.volatiles_ar, Some(29.9));
    }

    #[test]
    fn missing_date_line_is_soft() {
        let content = VALID.replace("Analyse durchgeführt: 12.03.2024 14:03\n", "");
        let records = parse(&content).unwrap();
        assert_eq!(records[0].analysis_date, "");
    }

    #[test]
    fn missing_header_row_fails_the_file() {
        let content = "Tga Version: 9.23\nAnalyse durchgeführt: 12.03.2024\nno table here\n";
        assert!(matches!(parse(content), Err(FormatError::NoHeaderRow)));
    }

    #[test]
    fn mismatched_field_count_is_not_a_data_row() {
        let content = format!("{VALID}4,BIO_24_00004,1.0,5.0\n");
        let records = parse(&content).unwrap();
        assert!(!records.iter().any(|r| r.sample_id == "BIO_24_00004"));
    }
}
