use anyhow::{bail, Context, Result};
use log::info;

use labtrack::model::Sample;
use labtrack::store::{InsertOutcome, SqliteStore, Store};

use super::Config;

/// Allocate the next id for `prefix` and persist the sample.
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &Config,
    prefix: &str,
    sample_type: &str,
    project: &str,
    sampling_date: &str,
    location: &str,
    condition: &str,
    responsible: &str,
) -> Result<()> {
    let store = SqliteStore::open(config.database_path())
        .with_context(|| format!("Failed to open database: {}", config.database_path().display()))?;

    let sample_id = store
        .allocate_sample_id(prefix)
        .context("Failed to allocate sample id")?;
    info!("allocated sample id {sample_id}");

    let sample = Sample {
        sample_id: sample_id.clone(),
        sample_type: sample_type.to_string(),
        project: project.to_string(),
        registration_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        sampling_date: sampling_date.to_string(),
        sampling_location: location.to_string(),
        sample_condition: condition.to_string(),
        responsible_person: responsible.to_string(),
    };

    match store.insert_sample(&sample)? {
        InsertOutcome::Inserted => {
            println!("Registered sample {sample_id}");
            Ok(())
        }
        // Allocation is atomic, so a collision here means someone registered
        // this exact id outside the allocator.
        InsertOutcome::Duplicate => bail!("sample id {sample_id} already exists"),
    }
}
