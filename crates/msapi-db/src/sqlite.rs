//! SQLite driver backed by an `r2d2` connection pool.

use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};

use crate::descriptor::ConnectionDescriptor;
use crate::driver::{Driver, Handle, PoolLimits, Transaction};
use crate::error::DbError;
use crate::row::{ExecResult, Row, RowSet};

// r2d2 rejects a zero connection timeout.
const MIN_CONNECT_TIMEOUT: Duration = Duration::from_millis(1);

// Connections a pending transaction keeps checked out.
const TRANSACTION_CONNECTIONS: u32 = 1;

const IN_MEMORY: &str = ":memory:";

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

/// Opens SQLite databases. The descriptor is the database file path.
///
/// `:memory:` is not supported behind an [`Executor`](crate::Executor):
/// each pooled connection, including one recycled after `max_lifetime`,
/// would see its own empty database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver {
    settings: SqliteSettings,
}

impl SqliteDriver {
    pub fn new(settings: SqliteSettings) -> Self {
        Self { settings }
    }
}

impl Driver for SqliteDriver {
    type Handle = SqliteHandle;

    fn open(
        &self,
        descriptor: &ConnectionDescriptor,
        limits: &PoolLimits,
    ) -> Result<SqliteHandle, DbError> {
        if descriptor.is_empty() {
            return Err(DbError::connection("connection descriptor is empty"));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let busy_timeout_ms = self.settings.busy_timeout_ms;

        if descriptor.as_str() == IN_MEMORY {
            tracing::warn!(
                "every pooled connection to :memory: opens its own private database"
            );
        }

        let manager = SqliteConnectionManager::file(descriptor.as_str())
            .with_flags(flags)
            .with_init(move |conn| init_connection(conn, busy_timeout_ms));

        // The pool holds the idle readers plus the connection pinned by a
        // pending transaction, so a read never waits on an open write.
        // `min_idle = 0` keeps `build` from connecting; the ping does that.
        // A zero lifetime means unlimited.
        let pool = Pool::builder()
            .max_size(pool_size(limits))
            .min_idle(Some(0))
            .max_lifetime(Some(limits.max_lifetime).filter(|d| !d.is_zero()))
            .connection_timeout(limits.connect_timeout.max(MIN_CONNECT_TIMEOUT))
            .build(manager)
            .map_err(DbError::connection)?;

        Ok(SqliteHandle { pool })
    }
}

/// Pooled connections: at least one reader next to the transaction's own.
fn pool_size(limits: &PoolLimits) -> u32 {
    limits
        .max_idle_connections
        .max(1)
        .saturating_add(TRANSACTION_CONNECTIONS)
}

fn init_connection(conn: &mut Connection, busy_timeout_ms: u64) -> Result<(), rusqlite::Error> {
    // In-memory databases report "memory" which is expected and acceptable.
    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if journal_mode != "wal" && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!(
                "failed to set WAL journal mode, got: {}",
                journal_mode
            )),
        ));
    }
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {};",
        busy_timeout_ms
    ))
}

/// An open SQLite pool.
pub struct SqliteHandle {
    pool: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for SqliteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteHandle")
            .field("state", &self.pool.state())
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

impl SqliteHandle {
    fn checkout(&self) -> Result<PooledConnection<SqliteConnectionManager>, DbError> {
        self.pool.get().map_err(DbError::connection)
    }

    /// Maximum number of pooled connections.
    pub fn max_size(&self) -> u32 {
        self.pool.max_size()
    }
}

impl Handle for SqliteHandle {
    type Transaction = SqliteTransaction;

    fn ping(&self) -> Result<(), DbError> {
        let conn = self.checkout()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(DbError::connection)?;
        Ok(())
    }

    fn query(&self, statement: &str) -> Result<RowSet, DbError> {
        let conn = self.checkout()?;
        let mut stmt = conn.prepare(statement).map_err(DbError::statement)?;
        let columns = column_names(&stmt);

        let mut rows = stmt.query([]).map_err(DbError::execution)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next().map_err(DbError::execution)? {
            collected.push(read_row(&columns, row)?);
        }

        Ok(RowSet::new(columns, collected))
    }

    fn query_row(&self, statement: &str) -> Result<Option<Row>, DbError> {
        let conn = self.checkout()?;
        let mut stmt = conn.prepare(statement).map_err(DbError::statement)?;
        let columns = column_names(&stmt);

        let mut rows = stmt.query([]).map_err(DbError::execution)?;
        let first = match rows.next().map_err(DbError::execution)? {
            Some(row) => Some(read_row(&columns, row)?),
            None => None,
        };
        Ok(first)
    }

    fn begin(&self) -> Result<SqliteTransaction, DbError> {
        let conn = self.pool.get().map_err(DbError::transaction)?;
        conn.execute_batch("BEGIN").map_err(DbError::transaction)?;
        Ok(SqliteTransaction { conn })
    }
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Arc<[String]> {
    stmt.column_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn read_row(columns: &Arc<[String]>, row: &rusqlite::Row<'_>) -> Result<Row, DbError> {
    let values = (0..columns.len())
        .map(|i| row.get::<_, Value>(i))
        .collect::<Result<Vec<_>, _>>()
        .map_err(DbError::execution)?;
    Ok(Row::new(Arc::clone(columns), values))
}

/// A transaction pinned to one pooled connection.
///
/// If the transaction is still open when dropped it is rolled back before
/// the connection goes back to the pool.
pub struct SqliteTransaction {
    conn: PooledConnection<SqliteConnectionManager>,
}

impl std::fmt::Debug for SqliteTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTransaction")
            .field("open", &!self.conn.is_autocommit())
            .finish()
    }
}

impl Transaction for SqliteTransaction {
    fn exec(&self, statement: &str) -> Result<ExecResult, DbError> {
        let mut stmt = self.conn.prepare(statement).map_err(DbError::statement)?;
        // `last_insert_rowid` is sticky across statements; only a change
        // made by this statement counts.
        let rowid_before = self.conn.last_insert_rowid();
        let rows_affected = stmt.execute([]).map_err(DbError::execution)?;
        let rowid_after = self.conn.last_insert_rowid();
        let last_insert_id = (rowid_after != rowid_before).then_some(rowid_after);

        Ok(ExecResult {
            rows_affected: rows_affected as u64,
            last_insert_id,
        })
    }

    fn commit(self) -> Result<(), DbError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(DbError::transaction)
    }

    fn rollback(self) -> Result<(), DbError> {
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(DbError::transaction)
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if self.conn.is_autocommit() {
            return;
        }
        tracing::warn!("rolling back abandoned transaction");
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!(error = %e, "failed to roll back abandoned transaction");
        }
    }
}
