// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed store.
//!
//! Several `SqliteStore` handles may open the same file; SQLite's locking
//! serializes their write transactions.

use crate::{JobStore, StoreError, StoreSession};
use parking_lot::Mutex;
use pulse_core::{check_transition, JobId, JobRecord, JobState, JobType};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SCHEMA_VERSION: &str = "1";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const COLUMNS: &str = "id, dag_id, state, job_type, start_date, end_date, latest_heartbeat, \
                       heartrate_ms, executor_class, hostname, unixname";

#[derive(Debug)]
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        Self::init(conn, Some(path))
    }

    /// Private in-memory database, visible only through this handle.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrate(&conn)?;
        tracing::debug!(path = ?path, "opened job store");
        Ok(Self { path, conn: Mutex::new(conn) })
    }
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS job (
          id TEXT PRIMARY KEY,
          dag_id TEXT,
          state TEXT NOT NULL,
          job_type TEXT NOT NULL,
          start_date INTEGER NOT NULL,
          end_date INTEGER,
          latest_heartbeat INTEGER NOT NULL,
          heartrate_ms INTEGER NOT NULL,
          executor_class TEXT NOT NULL,
          hostname TEXT NOT NULL,
          unixname TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS job_type_heart ON job(job_type, latest_heartbeat);
        CREATE INDEX IF NOT EXISTS idx_job_state_heartbeat ON job(state, latest_heartbeat);
        CREATE INDEX IF NOT EXISTS idx_job_dag_id ON job(dag_id);
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION],
    )?;
    let found: String =
        conn.query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |r| r.get(0))?;
    if found != SCHEMA_VERSION {
        return Err(StoreError::SchemaVersion { found, expected: SCHEMA_VERSION });
    }
    Ok(())
}

fn to_sql_ms(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

fn from_sql_ms(idx: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

fn parse_tag<T>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = pulse_core::UnknownTag>,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
    Ok(JobRecord {
        id: JobId::from(row.get::<_, String>(0)?),
        dag_id: row.get(1)?,
        state: parse_tag(2, row.get(2)?)?,
        job_type: parse_tag(3, row.get(3)?)?,
        start_date_ms: from_sql_ms(4, row.get(4)?)?,
        end_date_ms: row.get::<_, Option<i64>>(5)?.map(|v| from_sql_ms(5, v)).transpose()?,
        latest_heartbeat_ms: from_sql_ms(6, row.get(6)?)?,
        heartrate: Duration::from_millis(from_sql_ms(7, row.get(7)?)?),
        executor_class: row.get(8)?,
        hostname: row.get(9)?,
        unixname: row.get(10)?,
    })
}

fn row_error(id: &str, err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(idx, _, source) => {
            StoreError::Corrupt { id: id.to_string(), reason: format!("column {idx}: {source}") }
        }
        other => other.into(),
    }
}

/// Like [`read_row`], but an unparsable row becomes `Corrupt` under its own id.
fn read_checked(row: &Row<'_>) -> rusqlite::Result<Result<JobRecord, StoreError>> {
    match read_row(row) {
        Ok(record) => Ok(Ok(record)),
        Err(err @ rusqlite::Error::FromSqlConversionFailure(..)) => {
            let id: String = row.get(0)?;
            Ok(Err(row_error(&id, err)))
        }
        Err(err) => Err(err),
    }
}

struct SqliteSession<'c> {
    conn: &'c Connection,
}

impl SqliteSession<'_> {
    fn write_insert(&self, record: &JobRecord) -> Result<(), StoreError> {
        let result = self.conn.execute(
            &format!("INSERT INTO job ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
            params![
                record.id.as_str(),
                record.dag_id,
                record.state.as_str(),
                record.job_type.as_str(),
                to_sql_ms(record.start_date_ms),
                record.end_date_ms.map(to_sql_ms),
                to_sql_ms(record.latest_heartbeat_ms),
                to_sql_ms(record.heartrate.as_millis() as u64),
                record.executor_class,
                record.hostname,
                record.unixname,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(err) if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                Err(StoreError::Duplicate(record.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_update(&self, record: &JobRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE job SET dag_id = ?2, state = ?3, end_date = ?4, latest_heartbeat = ?5, heartrate_ms = ?6
             WHERE id = ?1",
            params![
                record.id.as_str(),
                record.dag_id,
                record.state.as_str(),
                record.end_date_ms.map(to_sql_ms),
                to_sql_ms(record.latest_heartbeat_ms),
                to_sql_ms(record.heartrate.as_millis() as u64),
            ],
        )?;
        Ok(())
    }
}

impl StoreSession for SqliteSession<'_> {
    fn load(&mut self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        let record = self
            .conn
            .query_row(&format!("SELECT {COLUMNS} FROM job WHERE id = ?1"), params![id.as_str()], read_row)
            .optional()
            .map_err(|err| row_error(id.as_str(), err))?;
        Ok(record)
    }

    fn insert(&mut self, record: &JobRecord) -> Result<(), StoreError> {
        self.write_insert(record)
    }

    fn merge(&mut self, record: &JobRecord) -> Result<(), StoreError> {
        match self.load(&record.id)? {
            Some(prev) => {
                check_transition(&prev, record)
                    .map_err(|source| StoreError::Transition { id: record.id.clone(), source })?;
                self.write_update(record)
            }
            None => self.write_insert(record),
        }
    }

    fn most_recent_of_type(&mut self, job_type: JobType) -> Result<Option<JobRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM job WHERE job_type = ?1
                     ORDER BY CASE state WHEN ?2 THEN 0 ELSE 1 END, latest_heartbeat DESC, id
                     LIMIT 1"
                ),
                params![job_type.as_str(), JobState::Running.as_str()],
                read_checked,
            )
            .optional()?;
        record.transpose()
    }

    fn list_by_state(&mut self, state: JobState) -> Result<Vec<JobRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM job WHERE state = ?1 ORDER BY start_date, id"))?;
        let rows = stmt.query_map(params![state.as_str()], read_checked)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row??);
        }
        Ok(records)
    }
}

impl JobStore for SqliteStore {
    fn with_session<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let mut session = SqliteSession { conn: &*tx };
        let value = f(&mut session)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
