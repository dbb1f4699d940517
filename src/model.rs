//! Core entities: samples, measurements, users.
//!
//! All date fields are stored as the text the source produced (ISO dates for
//! registration, instrument-formatted text for analysis dates). Numeric
//! measurement columns are optional: an unparseable instrument cell is a
//! null, not an error.

use serde::{Deserialize, Serialize};

/// A registered physical sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Generated identifier, `PREFIX_YY_NNNNN`.
    pub sample_id: String,
    /// Material type (e.g. "biomass").
    pub sample_type: String,
    /// Project the sample belongs to.
    pub project: String,
    /// Date the sample was registered (ISO 8601).
    pub registration_date: String,
    /// Date the sample was taken (ISO 8601).
    pub sampling_date: String,
    /// Where the sample was taken.
    pub sampling_location: String,
    /// Condition on arrival (e.g. "dry", "wet").
    pub sample_condition: String,
    /// Person responsible for the sample.
    pub responsible_person: String,
}

/// One CHN elemental analyzer run.
///
/// Natural key: (`sample_id`, `analysis_date`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementalMeasurement {
    /// Sample the run belongs to.
    pub sample_id: String,
    /// Analysis date as the instrument formatted it.
    pub analysis_date: String,
    /// Carbon mass fraction (wt%).
    pub carbon_percentage: Option<f64>,
    /// Hydrogen mass fraction (wt%).
    pub hydrogen_percentage: Option<f64>,
    /// Nitrogen mass fraction (wt%).
    pub nitrogen_percentage: Option<f64>,
}

/// One ELTRA TGA proximate analyzer run.
///
/// Natural key: (`sample_id`, `analysis_date`, `moisture`) — the export
/// carries no run identifier, so moisture disambiguates repeated runs on
/// the same day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximateMeasurement {
    /// Sample the run belongs to.
    pub sample_id: String,
    /// Analysis date taken from the file's header block.
    pub analysis_date: String,
    /// Moisture (wt%).
    pub moisture: Option<f64>,
    /// Volatiles, as received (wt%).
    pub volatiles_ar: Option<f64>,
    /// Volatiles, dry basis (wt%).
    pub volatiles_db: Option<f64>,
    /// Low-temperature ash, as received (wt%).
    pub ash_lta_ar: Option<f64>,
    /// Low-temperature ash, dry basis (wt%).
    pub ash_lta_db: Option<f64>,
    /// High-temperature ash, as received (wt%).
    pub ash_hta_ar: Option<f64>,
    /// High-temperature ash, dry basis (wt%).
    pub ash_hta_db: Option<f64>,
    /// Fixed carbon, as received (wt%).
    pub fixed_c_ar: Option<f64>,
}

/// The two measurement kinds the pipeline handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementKind {
    /// CHN elemental analysis.
    Elemental,
    /// ELTRA TGA proximate analysis.
    Proximate,
}

impl MeasurementKind {
    /// Short lowercase name, used for table names and export file names.
    pub fn name(&self) -> &'static str {
        match self {
            MeasurementKind::Elemental => "elemental",
            MeasurementKind::Proximate => "proximate",
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Application role of a stored user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Regular user: register samples, ingest and export data.
    User,
    /// Administrator: additionally manages users.
    Admin,
}

impl Role {
    /// Stored text form of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parse the stored text form back into a role.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name, unique.
    pub username: String,
    /// bcrypt hash of the password; the plaintext is never stored.
    pub password_hash: String,
    /// Application role.
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_text_roundtrip() {
        assert_eq!(Role::parse(Role::User.as_str()), Some(Role::User));
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn kind_names_are_table_safe() {
        assert_eq!(MeasurementKind::Elemental.name(), "elemental");
        assert_eq!(MeasurementKind::Proximate.to_string(), "proximate");
    }

    #[test]
    fn sample_serializes_with_field_names() {
        let sample = Sample {
            sample_id: "BIO_24_00001".to_string(),
            sample_type: "biomass".to_string(),
            project: "P1".to_string(),
            registration_date: "2024-03-01".to_string(),
            sampling_date: "2024-02-28".to_string(),
            sampling_location: "site A".to_string(),
            sample_condition: "dry".to_string(),
            responsible_person: "rp".to_string(),
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"sample_id\":\"BIO_24_00001\""));
        assert!(json.contains("\"responsible_person\""));
    }
}
