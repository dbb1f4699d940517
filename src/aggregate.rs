//! Per-sample mean computation over repeated measurements.
//!
//! Stateless, pure transformations: group by `sample_id`, average each
//! numeric column over the values that are present (nulls are excluded from
//! both sum and count, so an all-null column stays null). Identifier and
//! date columns are excluded. Output carries one row per distinct sample,
//! sorted ascending by `sample_id`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{ElementalMeasurement, ProximateMeasurement};

/// Per-sample mean of elemental measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementalMean {
    /// Sample the means belong to.
    pub sample_id: String,
    /// Mean carbon mass fraction (wt%).
    pub carbon_percentage: Option<f64>,
    /// Mean hydrogen mass fraction (wt%).
    pub hydrogen_percentage: Option<f64>,
    /// Mean nitrogen mass fraction (wt%).
    pub nitrogen_percentage: Option<f64>,
}

/// Per-sample mean of proximate measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximateMean {
    /// Sample the means belong to.
    pub sample_id: String,
    /// Mean moisture (wt%).
    pub moisture: Option<f64>,
    /// Mean volatiles, as received (wt%).
    pub volatiles_ar: Option<f64>,
    /// Mean volatiles, dry basis (wt%).
    pub volatiles_db: Option<f64>,
    /// Mean low-temperature ash, as received (wt%).
    pub ash_lta_ar: Option<f64>,
    /// Mean low-temperature ash, dry basis (wt%).
    pub ash_lta_db: Option<f64>,
    /// Mean high-temperature ash, as received (wt%).
    pub ash_hta_ar: Option<f64>,
    /// Mean high-temperature ash, dry basis (wt%).
    pub ash_hta_db: Option<f64>,
    /// Mean fixed carbon, as received (wt%).
    pub fixed_c_ar: Option<f64>,
}

/// Running mean over present values only.
#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Group elemental records by sample and average the percentage columns.
pub fn elemental_means(records: &[ElementalMeasurement]) -> Vec<ElementalMean> {
    let mut groups: BTreeMap<&str, [MeanAcc; 3]> = BTreeMap::new();

    for record in records {
        let accs = groups.entry(&record.sample_id).or_default();
        accs[0].push(record.carbon_percentage);
        accs[1].push(record.hydrogen_percentage);
        accs[2].push(record.nitrogen_percentage);
    }

    groups
        .into_iter()
        .map(|(sample_id, accs)| ElementalMean {
            sample_id: sample_id.to_string(),
            carbon_percentage: accs[0].mean(),
            hydrogen_percentage: accs[1].mean(),
            nitrogen_percentage: accs[2].mean(),
        })
        .collect()
}

/// Group proximate records by sample and average the numeric columns.
pub fn proximate_means(records: &[ProximateMeasurement]) -> Vec<ProximateMean> {
    let mut groups: BTreeMap<&str, [MeanAcc; 8]> = BTreeMap::new();

    for record in records {
        let accs = groups.entry(&record.sample_id).or_default();
        accs[0].push(record.moisture);
        accs[1].push(record.volatiles_ar);
        accs[2].push(record.volatiles_db);
        accs[3].push(record.ash_lta_ar);
        accs[4].push(record.ash_lta_db);
        accs[5].push(record.ash_hta_ar);
        accs[6].push(record.ash_hta_db);
        accs[7].push(record.fixed_c_ar);
    }

    groups
        .into_iter()
        .map(|(sample_id, accs)| ProximateMean {
            sample_id: sample_id.to_string(),
            moisture: accs[0].mean(),
            volatiles_ar: accs[1].mean(),
            volatiles_db: accs[2].mean(),
            ash_lta_ar: accs[3].mean(),
            ash_lta_db: accs[4].mean(),
            ash_hta_ar: accs[5].mean(),
            ash_hta_db: accs[6].mean(),
            fixed_c_ar: accs[7].mean(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elemental(id: &str, carbon: Option<f64>) -> ElementalMeasurement {
        ElementalMeasurement {
            sample_id: id.to_string(),
            analysis_date: "2024-01-01".to_string(),
            carbon_percentage: carbon,
            hydrogen_percentage: Some(5.0),
            nitrogen_percentage: Some(1.0),
        }
    }

    #[test]
    fn means_over_repeated_measurements() {
        let records = vec![elemental("S1", Some(40.0)), elemental("S1", Some(42.0))];
        let means = elemental_means(&records);

        assert_eq!(means.len(), 1);
        assert_eq!(means[0].sample_id, "S1");
        assert_eq!(means[0].carbon_percentage, Some(41.0));
        assert_eq!(means[0].hydrogen_percentage, Some(5.0));
    }

    #[test]
    fn nulls_are_excluded_from_the_mean() {
        let records = vec![
            elemental("S1", Some(40.0)),
            elemental("S1", None),
            elemental("S1", Some(44.0)),
        ];
        let means = elemental_means(&records);
        assert_eq!(means[0].carbon_percentage, Some(42.0));
    }

    #[test]
    fn all_null_column_stays_null() {
        let records = vec![elemental("S1", None), elemental("S1", None)];
        let means = elemental_means(&records);
        assert_eq!(means[0].carbon_percentage, None);
    }

    #[test]
    fn one_row_per_sample_sorted() {
        let records = vec![
            elemental("S2", Some(40.0)),
            elemental("S1", Some(41.0)),
            elemental("S2", Some(42.0)),
        ];
        let means = elemental_means(&records);

        assert_eq!(means.len(), 2);
        assert_eq!(means[0].sample_id, "S1");
        assert_eq!(means[1].sample_id, "S2");
        assert_eq!(means[1].carbon_percentage, Some(41.0));
    }

    #[test]
    fn empty_input_yields_empty_result() {
        assert!(elemental_means(&[]).is_empty());
        assert!(proximate_means(&[]).is_empty());
    }

    #[test]
    fn proximate_means_cover_all_columns() {
        let rec = ProximateMeasurement {
            sample_id: "S1".to_string(),
            analysis_date: "".to_string(),
            moisture: Some(5.0),
            volatiles_ar: Some(30.0),
            volatiles_db: Some(32.0),
            ash_lta_ar: Some(4.0),
            ash_lta_db: Some(4.2),
            ash_hta_ar: Some(3.8),
            ash_hta_db: Some(4.0),
            fixed_c_ar: Some(52.0),
        };
        let mut other = rec.clone();
        other.moisture = Some(7.0);
        other.fixed_c_ar = None;

        let means = proximate_means(&[rec, other]);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].moisture, Some(6.0));
        assert_eq!(means[0].volatiles_ar, Some(30.0));
        assert_eq!(means[0].fixed_c_ar, Some(52.0));
    }
}
