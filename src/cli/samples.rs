use anyhow::{Context, Result};

use labtrack::store::{SqliteStore, Store};

use super::Config;

/// List registered samples.
pub fn run(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config.database_path())
        .with_context(|| format!("Failed to open database: {}", config.database_path().display()))?;

    let samples = store.list_samples().context("Failed to list samples")?;
    if samples.is_empty() {
        println!("No samples registered.");
        return Ok(());
    }

    for sample in &samples {
        println!(
            "{}  {}  {}  registered {}  by {}",
            sample.sample_id,
            sample.sample_type,
            sample.project,
            sample.registration_date,
            sample.responsible_person
        );
    }
    println!("{} sample(s)", samples.len());
    Ok(())
}
