//! Sample identifier format: `{prefix}_{YY}_{counter:05}`.
//!
//! One canonical rule, fixed here: counters are zero-padded to five digits,
//! the counter is the token after the last underscore, and allocation is
//! scoped per prefix and per two-digit year. Allocation itself lives in the
//! store so it can run inside a transaction; this module only formats and
//! extracts.

/// Fixed zero-padding width of the counter segment.
pub const COUNTER_WIDTH: usize = 5;

/// Two-digit year segment for newly allocated ids, e.g. `"24"`.
pub fn current_year_suffix() -> String {
    chrono::Local::now().format("%y").to_string()
}

/// Format a sample id from its three segments.
pub fn format_sample_id(prefix: &str, year: &str, counter: u32) -> String {
    format!("{prefix}_{year}_{counter:0width$}", width = COUNTER_WIDTH)
}

/// Extract the trailing counter from a sample id.
///
/// Canonical extraction rule: the token after the last underscore. Returns
/// `None` for ids that do not end in a numeric counter.
pub fn extract_counter(sample_id: &str) -> Option<u32> {
    sample_id.rsplit('_').next()?.parse().ok()
}

/// The `LIKE` pattern matching all ids of a prefix/year scope.
pub fn scope_pattern(prefix: &str, year: &str) -> String {
    format!("{prefix}_{year}_%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_with_fixed_width() {
        assert_eq!(format_sample_id("ABC", "24", 3), "ABC_24_00003");
        assert_eq!(format_sample_id("ABC", "24", 123456), "ABC_24_123456");
    }

    #[test]
    fn extracts_trailing_counter() {
        assert_eq!(extract_counter("ABC_24_00003"), Some(3));
        assert_eq!(extract_counter("XYZ_24_00009"), Some(9));
        assert_eq!(extract_counter("no-counter"), None);
        assert_eq!(extract_counter("ABC_24_"), None);
    }

    #[test]
    fn scope_pattern_matches_prefix_and_year() {
        assert_eq!(scope_pattern("ABC", "24"), "ABC_24_%");
    }

    proptest! {
        #[test]
        fn format_extract_roundtrip(prefix in "[A-Z]{1,6}", counter in 1u32..100_000) {
            let id = format_sample_id(&prefix, "24", counter);
            prop_assert_eq!(extract_counter(&id), Some(counter));
        }
    }
}
