use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, Row, params};
use tracing::{debug, warn};

use crate::entities::trial::{TrialRecord, fields};
use crate::error::TrialCheckError;

const TRIAL_ROWS_QUERY: &str = "SELECT id, title, location, zip_code, radius, conditions, status \
FROM trial_search_results ORDER BY rowid";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS trial_search_results (
    id TEXT NOT NULL,
    title TEXT,
    location TEXT,
    zip_code TEXT,
    radius INTEGER,
    conditions TEXT,
    status TEXT
)";

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrialRow {
    id: String,
    title: Option<String>,
    location: Option<String>,
    zip_code: Option<String>,
    radius: Option<i64>,
    conditions: Option<String>,
    status: Option<String>,
}

impl TrialRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            location: row.get(2)?,
            zip_code: row.get(3)?,
            radius: row.get(4)?,
            conditions: row.get(5)?,
            status: row.get(6)?,
        })
    }

    fn into_record(self) -> TrialRecord {
        let mut record = TrialRecord::default();
        record.insert(fields::SPONSORED_TRIAL_ACRONYM, self.id);
        record.insert(fields::SPONSORED_TRIAL_NAME, self.title);
        record.insert(fields::CLOSEST_SPONSORED_TRIAL_LOCATION_NAME, self.location);
        record.insert(fields::ZIP5_CODE, self.zip_code);
        record.insert(fields::RADIUS_IN_MILES, self.radius);
        record.insert(fields::SPONSORED_TRIAL_CONDITIONS, self.conditions);
        record.insert(fields::STATUS, self.status);
        record
    }
}

const CHICAGO_ROWS: &[(&str, &str, &str, &str, i64, &str, &str)] = &[
    (
        "trial123",
        "Cancer Study Phase 1",
        "Chicago, IL",
        "60616",
        6000,
        "Cancer",
        "Recruiting",
    ),
    (
        "trial124",
        "Diabetes Prevention Study",
        "Chicago, IL",
        "60616",
        6000,
        "Diabetes",
        "Completed",
    ),
];

/// Handle on a `trial_search_results` database file. No connection is held
/// between calls.
#[derive(Debug, Clone)]
pub struct TrialLibrary {
    path: PathBuf,
}

impl TrialLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every row, remapped to trial-record field names.
    ///
    /// The connection is closed before returning, whether or not the rows
    /// could be read.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or queried, when a
    /// row has unexpected column types, or when closing the connection fails.
    pub fn fetch_trial_rows(&self) -> Result<Vec<TrialRecord>, TrialCheckError> {
        let conn = Connection::open_with_flags(
            self.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let rows = read_rows(&conn);
        match conn.close() {
            Ok(()) => rows,
            Err((_, err)) if rows.is_ok() => Err(err.into()),
            Err((_, err)) => {
                warn!(path = %self.path().display(), "closing trial library failed: {err}");
                rows
            }
        }
    }

    /// Creates the results table if needed and inserts the two Chicago trials.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be created or written.
    pub fn seed_chicago(&self) -> Result<(), TrialCheckError> {
        let mut conn = Connection::open(self.path())?;
        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_TABLE)?;
        for (id, title, location, zip_code, radius, conditions, status) in CHICAGO_ROWS {
            tx.execute(
                "INSERT INTO trial_search_results \
(id, title, location, zip_code, radius, conditions, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![id, title, location, zip_code, radius, conditions, status],
            )?;
        }
        tx.commit()?;
        conn.close().map_err(|(_, err)| TrialCheckError::from(err))?;
        debug!(path = %self.path().display(), rows = CHICAGO_ROWS.len(), "seeded trial library");
        Ok(())
    }
}

fn read_rows(conn: &Connection) -> Result<Vec<TrialRecord>, TrialCheckError> {
    let mut stmt = conn.prepare(TRIAL_ROWS_QUERY)?;
    let rows = stmt
        .query_map([], TrialRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows.into_iter().map(TrialRow::into_record).collect())
}
