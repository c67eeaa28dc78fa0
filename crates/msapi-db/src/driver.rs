//! The narrow interface the executor uses to reach a database driver.
//!
//! Drivers own the wire protocol and pooling. They are responsible for
//! classifying their failures into the [`DbError`] stages: a statement that
//! fails to parse is [`DbError::Statement`], one that fails while running is
//! [`DbError::Execution`].

use std::time::Duration;

use crate::descriptor::ConnectionDescriptor;
use crate::error::DbError;
use crate::row::{ExecResult, Row, RowSet};

/// Lifecycle limits applied to the driver's connection pool when it opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Maximum lifetime of a pooled connection before it is recycled.
    pub max_lifetime: Duration,

    /// Maximum number of idle connections kept by the pool.
    pub max_idle_connections: u32,

    /// How long to wait for a connection before giving up.
    pub connect_timeout: Duration,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_lifetime: Duration::from_secs(10),
            max_idle_connections: 5,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Opens live handles from a descriptor.
pub trait Driver {
    type Handle: Handle;

    /// Opens a handle with `limits` applied. Opening need not touch the
    /// network; liveness is checked separately with [`Handle::ping`].
    fn open(
        &self,
        descriptor: &ConnectionDescriptor,
        limits: &PoolLimits,
    ) -> Result<Self::Handle, DbError>;
}

/// A live, open database handle.
///
/// Dropping the handle releases it.
pub trait Handle {
    type Transaction: Transaction;

    /// Verifies the database is reachable.
    fn ping(&self) -> Result<(), DbError>;

    /// Prepares and runs a read, outside of any transaction.
    fn query(&self, statement: &str) -> Result<RowSet, DbError>;

    /// Prepares and runs a read, returning only its first row.
    fn query_row(&self, statement: &str) -> Result<Option<Row>, DbError>;

    /// Starts a new transaction.
    fn begin(&self) -> Result<Self::Transaction, DbError>;
}

/// An open transaction.
///
/// A transaction dropped without [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback) is abandoned and its writes are
/// discarded.
pub trait Transaction {
    /// Prepares and runs a write inside this transaction.
    fn exec(&self, statement: &str) -> Result<ExecResult, DbError>;

    /// Makes the writes durable. Consuming `self` ends the transaction.
    fn commit(self) -> Result<(), DbError>;

    /// Discards the writes. Consuming `self` ends the transaction.
    fn rollback(self) -> Result<(), DbError>;
}
