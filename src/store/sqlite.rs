//! SQLite-backed [`Store`].
//!
//! Natural keys are carried by unique constraints so check-then-insert is
//! atomic per record; id allocation runs in an immediate transaction against
//! a counters table, lazily seeded from legacy ids. The connection sits
//! behind a mutex so the store can be shared across request handlers.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use log::info;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::idgen;
use crate::model::{ElementalMeasurement, ProximateMeasurement, Role, Sample, User};

use super::{InsertOutcome, Store, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS samples (
    sample_id          TEXT PRIMARY KEY,
    sample_type        TEXT NOT NULL,
    project            TEXT NOT NULL,
    registration_date  TEXT NOT NULL,
    sampling_date      TEXT NOT NULL,
    sampling_location  TEXT NOT NULL,
    sample_condition   TEXT NOT NULL,
    responsible_person TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS elemental_measurements (
    sample_id           TEXT NOT NULL REFERENCES samples(sample_id),
    analysis_date       TEXT NOT NULL,
    carbon_percentage   REAL,
    hydrogen_percentage REAL,
    nitrogen_percentage REAL,
    UNIQUE (sample_id, analysis_date)
);

CREATE TABLE IF NOT EXISTS proximate_measurements (
    sample_id     TEXT NOT NULL REFERENCES samples(sample_id),
    analysis_date TEXT NOT NULL,
    moisture      REAL,
    volatiles_ar  REAL,
    volatiles_db  REAL,
    ash_lta_ar    REAL,
    ash_lta_db    REAL,
    ash_hta_ar    REAL,
    ash_hta_db    REAL,
    fixed_c_ar    REAL,
    UNIQUE (sample_id, analysis_date, moisture)
);

CREATE TABLE IF NOT EXISTS users (
    username      TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL CHECK (role IN ('user', 'admin'))
);

CREATE TABLE IF NOT EXISTS id_counters (
    prefix  TEXT NOT NULL,
    year    TEXT NOT NULL,
    counter INTEGER NOT NULL,
    PRIMARY KEY (prefix, year)
);
";

/// Production store backed by a SQLite database file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // journal_mode returns the resulting mode as a row.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.busy_timeout(std::time::Duration::from_millis(5_000))?;
        Self::from_connection(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Allocate the next id for `prefix` within an explicit year segment.
    ///
    /// Runs in an immediate transaction: the counter row is read, bumped, and
    /// committed as one unit, so concurrent registrations serialize here. The
    /// first allocation for a scope seeds the counter from the largest legacy
    /// id counter found in `samples`.
    pub fn allocate_for_year(&self, prefix: &str, year: &str) -> Result<String, StoreError> {
        let mut guard = self.conn();
        let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<u32> = tx
            .query_row(
                "SELECT counter FROM id_counters WHERE prefix = ?1 AND year = ?2",
                params![prefix, year],
                |row| row.get(0),
            )
            .optional()?;

        let next = match current {
            Some(counter) => {
                tx.execute(
                    "UPDATE id_counters SET counter = ?3 WHERE prefix = ?1 AND year = ?2",
                    params![prefix, year, counter + 1],
                )?;
                counter + 1
            }
            None => {
                let next = max_legacy_counter(&tx, prefix, year)? + 1;
                tx.execute(
                    "INSERT INTO id_counters (prefix, year, counter) VALUES (?1, ?2, ?3)",
                    params![prefix, year, next],
                )?;
                next
            }
        };

        tx.commit()?;
        Ok(idgen::format_sample_id(prefix, year, next))
    }

    /// Add a user with a bcrypt-hashed password.
    ///
    /// Returns [`InsertOutcome::Duplicate`] when the username is taken.
    pub fn add_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<InsertOutcome, StoreError> {
        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![username, hash, role.as_str()],
        )?;
        Ok(outcome(&conn))
    }

    /// Look up a user by name.
    pub fn get_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn();
        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT username, password_hash, role FROM users WHERE username = ?1",
                params![username],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((username, password_hash, role)) = row else {
            return Ok(None);
        };
        let role = Role::parse(&role).ok_or(StoreError::UnknownRole(role))?;
        Ok(Some(User {
            username,
            password_hash,
            role,
        }))
    }

    /// Verify a password and return the user's role on success.
    ///
    /// An unknown username and a wrong password are the same negative result.
    pub fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Role>, StoreError> {
        let Some(user) = self.get_user(username)? else {
            return Ok(None);
        };
        if !bcrypt::verify(password, &user.password_hash)? {
            return Ok(None);
        }
        Ok(Some(user.role))
    }

    /// All usernames with their roles, ordered by username.
    pub fn list_users(&self) -> Result<Vec<(String, Role)>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT username, role FROM users ORDER BY username")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut users = Vec::new();
        for row in rows {
            let (username, role) = row?;
            let role = Role::parse(&role).ok_or(StoreError::UnknownRole(role))?;
            users.push((username, role));
        }
        Ok(users)
    }
}

/// Largest counter among persisted ids in the given prefix/year scope.
fn max_legacy_counter(tx: &Transaction<'_>, prefix: &str, year: &str) -> Result<u32, StoreError> {
    let mut stmt = tx.prepare("SELECT sample_id FROM samples WHERE sample_id LIKE ?1")?;
    let ids = stmt.query_map(params![idgen::scope_pattern(prefix, year)], |row| {
        row.get::<_, String>(0)
    })?;

    let mut max = 0;
    for id in ids {
        if let Some(counter) = idgen::extract_counter(&id?) {
            max = max.max(counter);
        }
    }
    Ok(max)
}

/// Map the change count of an `INSERT OR IGNORE` to an outcome.
fn outcome(conn: &Connection) -> InsertOutcome {
    if conn.changes() == 0 {
        InsertOutcome::Duplicate
    } else {
        InsertOutcome::Inserted
    }
}

impl Store for SqliteStore {
    fn sample_exists(&self, sample_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM samples WHERE sample_id = ?1",
                params![sample_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_sample(&self, sample: &Sample) -> Result<InsertOutcome, StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO samples (sample_id, sample_type, project, registration_date,
                 sampling_date, sampling_location, sample_condition, responsible_person)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                sample.sample_id,
                sample.sample_type,
                sample.project,
                sample.registration_date,
                sample.sampling_date,
                sample.sampling_location,
                sample.sample_condition,
                sample.responsible_person,
            ],
        )?;
        let result = outcome(&conn);
        if result == InsertOutcome::Inserted {
            info!("registered sample {}", sample.sample_id);
        }
        Ok(result)
    }

    fn list_sample_ids(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT sample_id FROM samples ORDER BY sample_id")?;
        let ids = stmt.query_map([], |row| row.get(0))?;
        Ok(ids.collect::<Result<Vec<String>, _>>()?)
    }

    fn list_samples(&self) -> Result<Vec<Sample>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT sample_id, sample_type, project, registration_date, sampling_date,
                    sampling_location, sample_condition, responsible_person
             FROM samples ORDER BY sample_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Sample {
                sample_id: row.get(0)?,
                sample_type: row.get(1)?,
                project: row.get(2)?,
                registration_date: row.get(3)?,
                sampling_date: row.get(4)?,
                sampling_location: row.get(5)?,
                sample_condition: row.get(6)?,
                responsible_person: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn allocate_sample_id(&self, prefix: &str) -> Result<String, StoreError> {
        self.allocate_for_year(prefix, &idgen::current_year_suffix())
    }

    fn insert_elemental(&self, record: &ElementalMeasurement) -> Result<InsertOutcome, StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO elemental_measurements
                 (sample_id, analysis_date, carbon_percentage, hydrogen_percentage, nitrogen_percentage)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.sample_id,
                record.analysis_date,
                record.carbon_percentage,
                record.hydrogen_percentage,
                record.nitrogen_percentage,
            ],
        )?;
        Ok(outcome(&conn))
    }

    fn insert_proximate(&self, record: &ProximateMeasurement) -> Result<InsertOutcome, StoreError> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR IGNORE INTO proximate_measurements
                 (sample_id, analysis_date, moisture, volatiles_ar, volatiles_db,
                  ash_lta_ar, ash_lta_db, ash_hta_ar, ash_hta_db, fixed_c_ar)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.sample_id,
                record.analysis_date,
                record.moisture,
                record.volatiles_ar,
                record.volatiles_db,
                record.ash_lta_ar,
                record.ash_lta_db,
                record.ash_hta_ar,
                record.ash_hta_db,
                record.fixed_c_ar,
            ],
        )?;
        Ok(outcome(&conn))
    }

    fn elemental_measurements(&self) -> Result<Vec<ElementalMeasurement>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT sample_id, analysis_date, carbon_percentage, hydrogen_percentage, nitrogen_percentage
             FROM elemental_measurements ORDER BY sample_id, analysis_date",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ElementalMeasurement {
                sample_id: row.get(0)?,
                analysis_date: row.get(1)?,
                carbon_percentage: row.get(2)?,
                hydrogen_percentage: row.get(3)?,
                nitrogen_percentage: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn proximate_measurements(&self) -> Result<Vec<ProximateMeasurement>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT sample_id, analysis_date, moisture, volatiles_ar, volatiles_db,
                    ash_lta_ar, ash_lta_db, ash_hta_ar, ash_hta_db, fixed_c_ar
             FROM proximate_measurements ORDER BY sample_id, analysis_date",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProximateMeasurement {
                sample_id: row.get(0)?,
                analysis_date: row.get(1)?,
                moisture: row.get(2)?,
                volatiles_ar: row.get(3)?,
                volatiles_db: row.get(4)?,
                ash_lta_ar: row.get(5)?,
                ash_lta_db: row.get(6)?,
                ash_hta_ar: row.get(7)?,
                ash_hta_db: row.get(8)?,
                fixed_c_ar: row.get(9)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> Sample {
        Sample {
            sample_id: id.to_string(),
            sample_type: "biomass".to_string(),
            project: "P1".to_string(),
            registration_date: "2024-03-01".to_string(),
            sampling_date: "2024-02-28".to_string(),
            sampling_location: "site A".to_string(),
            sample_condition: "dry".to_string(),
            responsible_person: "rp".to_string(),
        }
    }

    fn elemental(id: &str, date: &str) -> ElementalMeasurement {
        ElementalMeasurement {
            sample_id: id.to_string(),
            analysis_date: date.to_string(),
            carbon_percentage: Some(40.0),
            hydrogen_percentage: Some(5.0),
            nitrogen_percentage: Some(1.0),
        }
    }

    #[test]
    fn sample_insert_and_exists() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(!store.sample_exists("S1").unwrap());
        assert_eq!(
            store.insert_sample(&sample("S1")).unwrap(),
            InsertOutcome::Inserted
        );
        assert!(store.sample_exists("S1").unwrap());
        assert_eq!(
            store.insert_sample(&sample("S1")).unwrap(),
            InsertOutcome::Duplicate
        );
        assert_eq!(store.list_sample_ids().unwrap(), vec!["S1"]);
    }

    #[test]
    fn elemental_natural_key_is_sample_and_date() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_sample(&sample("S1")).unwrap();

        let first = elemental("S1", "2024-01-01");
        assert_eq!(store.insert_elemental(&first).unwrap(), InsertOutcome::Inserted);

        // Same key, different values: still a duplicate.
        let mut again = elemental("S1", "2024-01-01");
        again.carbon_percentage = Some(99.0);
        assert_eq!(store.insert_elemental(&again).unwrap(), InsertOutcome::Duplicate);

        // Different date is a new row.
        let other = elemental("S1", "2024-01-02");
        assert_eq!(store.insert_elemental(&other).unwrap(), InsertOutcome::Inserted);

        assert_eq!(store.elemental_measurements().unwrap().len(), 2);
    }

    #[test]
    fn proximate_natural_key_includes_moisture() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_sample(&sample("S1")).unwrap();

        let rec = ProximateMeasurement {
            sample_id: "S1".to_string(),
            analysis_date: "2024-01-01".to_string(),
            moisture: Some(5.1),
            volatiles_ar: Some(30.0),
            volatiles_db: Some(32.0),
            ash_lta_ar: Some(4.0),
            ash_lta_db: Some(4.2),
            ash_hta_ar: Some(3.8),
            ash_hta_db: Some(4.0),
            fixed_c_ar: Some(52.0),
        };
        assert_eq!(store.insert_proximate(&rec).unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert_proximate(&rec).unwrap(), InsertOutcome::Duplicate);

        let mut other_moisture = rec.clone();
        other_moisture.moisture = Some(5.2);
        assert_eq!(
            store.insert_proximate(&other_moisture).unwrap(),
            InsertOutcome::Inserted
        );
    }

    #[test]
    fn allocation_is_scoped_per_prefix_and_year() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_sample(&sample("ABC_24_00001")).unwrap();
        store.insert_sample(&sample("ABC_24_00002")).unwrap();
        store.insert_sample(&sample("XYZ_24_00009")).unwrap();

        assert_eq!(store.allocate_for_year("ABC", "24").unwrap(), "ABC_24_00003");
        assert_eq!(store.allocate_for_year("ABC", "24").unwrap(), "ABC_24_00004");
        assert_eq!(store.allocate_for_year("XYZ", "24").unwrap(), "XYZ_24_00010");
        assert_eq!(store.allocate_for_year("ABC", "25").unwrap(), "ABC_25_00001");
    }

    #[test]
    fn allocation_starts_at_one_for_empty_scope() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.allocate_for_year("NEW", "24").unwrap(), "NEW_24_00001");
    }

    #[test]
    fn user_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(
            store.add_user("alice", "s3cret", Role::Admin).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.add_user("alice", "other", Role::User).unwrap(),
            InsertOutcome::Duplicate
        );

        assert_eq!(
            store.authenticate_user("alice", "s3cret").unwrap(),
            Some(Role::Admin)
        );
        assert_eq!(store.authenticate_user("alice", "wrong").unwrap(), None);
        assert_eq!(store.authenticate_user("bob", "s3cret").unwrap(), None);

        assert_eq!(
            store.list_users().unwrap(),
            vec![("alice".to_string(), Role::Admin)]
        );
    }
}
