use anyhow::{bail, Context, Result};

use labtrack::model::Role;
use labtrack::store::{InsertOutcome, SqliteStore};

use super::Config;

/// Add a user with a bcrypt-hashed password.
pub fn add(config: &Config, username: &str, password: &str, role: Role) -> Result<()> {
    let store = SqliteStore::open(config.database_path())
        .with_context(|| format!("Failed to open database: {}", config.database_path().display()))?;

    match store.add_user(username, password, role)? {
        InsertOutcome::Inserted => {
            println!("Added user {username} ({})", role.as_str());
            Ok(())
        }
        InsertOutcome::Duplicate => bail!("username {username} already exists"),
    }
}

/// List users and their roles.
pub fn list(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config.database_path())
        .with_context(|| format!("Failed to open database: {}", config.database_path().display()))?;

    let users = store.list_users().context("Failed to list users")?;
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }
    for (username, role) in users {
        println!("{username}  {}", role.as_str());
    }
    Ok(())
}
