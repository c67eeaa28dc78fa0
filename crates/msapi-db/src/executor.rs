//! Reads, implicitly transactional writes, and explicit commit.

use crate::descriptor::ConnectionDescriptor;
use crate::driver::{Driver, Handle, PoolLimits, Transaction};
use crate::error::DbError;
use crate::manager::ConnectionManager;
use crate::row::{ExecResult, Row, RowSet};
use crate::sqlite::SqliteDriver;

type TransactionOf<D> = <<D as Driver>::Handle as Handle>::Transaction;

/// Runs statements against one lazily opened connection.
///
/// Reads never start a transaction. The first write after a commit begins
/// one, and every later write reuses it until [`save_change`] commits it.
///
/// An executor is meant for one logical caller at a time. Every operation
/// that reaches the database takes `&mut self`; sharing one across threads
/// requires external synchronization.
///
/// ```text
/// Disconnected      --query/exec-->  Connected-NoTxn
/// Connected-NoTxn   --exec-->        Connected-TxnOpen
/// Connected-TxnOpen --exec-->        Connected-TxnOpen
/// Connected-TxnOpen --save_change--> Connected-NoTxn
/// any               --close-->       Disconnected
/// ```
///
/// [`save_change`]: Executor::save_change
pub struct Executor<D: Driver = SqliteDriver> {
    manager: ConnectionManager<D>,
    pending: Option<TransactionOf<D>>,
}

impl Executor<SqliteDriver> {
    /// Creates a lazy executor over the bundled SQLite driver.
    ///
    /// Never fails; connection errors surface on first use.
    pub fn new(descriptor: impl Into<ConnectionDescriptor>) -> Self {
        Self::with_driver(SqliteDriver::default(), descriptor.into(), PoolLimits::default())
    }
}

impl<D: Driver> Executor<D> {
    pub fn with_driver(driver: D, descriptor: ConnectionDescriptor, limits: PoolLimits) -> Self {
        Self {
            manager: ConnectionManager::new(driver, descriptor, limits),
            pending: None,
        }
    }

    /// Creates an executor and connects immediately.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the database cannot be reached.
    pub fn connect(
        driver: D,
        descriptor: ConnectionDescriptor,
        limits: PoolLimits,
    ) -> Result<Self, DbError> {
        let mut executor = Self::with_driver(driver, descriptor, limits);
        executor.ensure_connected()?;
        Ok(executor)
    }

    /// Opens the connection if it is not already open.
    pub fn ensure_connected(&mut self) -> Result<(), DbError> {
        self.manager.ensure_connected().map(|_| ())
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    /// Returns `true` while writes are waiting for [`save_change`](Self::save_change).
    pub fn has_pending_transaction(&self) -> bool {
        self.pending.is_some()
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        self.manager.descriptor()
    }

    /// Runs a read outside of any transaction.
    ///
    /// Writes still pending in this executor's transaction are not visible
    /// to the read.
    ///
    /// # Errors
    ///
    /// [`DbError::Connection`] if connecting fails, [`DbError::Statement`] if
    /// the statement does not prepare, [`DbError::Execution`] if the read
    /// fails.
    pub fn query(&mut self, statement: &str) -> Result<RowSet, DbError> {
        self.manager.ensure_connected()?.query(statement)
    }

    /// Runs a read and returns its first row, if any.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query).
    pub fn query_single(&mut self, statement: &str) -> Result<Option<Row>, DbError> {
        self.manager.ensure_connected()?.query_row(statement)
    }

    /// Runs a write inside the pending transaction, beginning one if needed.
    ///
    /// On a statement or execution failure the transaction stays open. Call
    /// [`rollback`](Self::rollback) to discard the writes made so far, or
    /// [`save_change`](Self::save_change) to keep them.
    ///
    /// # Errors
    ///
    /// [`DbError::Connection`] if connecting fails, [`DbError::Transaction`]
    /// if the transaction cannot begin, [`DbError::Statement`] or
    /// [`DbError::Execution`] if the write fails.
    pub fn exec(&mut self, statement: &str) -> Result<ExecResult, DbError> {
        let txn = match self.pending.take() {
            Some(txn) => txn,
            None => {
                let txn = self.manager.ensure_connected()?.begin()?;
                tracing::debug!("transaction started");
                txn
            }
        };
        self.pending.insert(txn).exec(statement)
    }

    /// Commits the pending transaction. A no-op when nothing is pending.
    ///
    /// The pending handle is cleared even if the commit fails; the next
    /// write begins a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Transaction`] if the commit fails.
    pub fn save_change(&mut self) -> Result<(), DbError> {
        let Some(txn) = self.pending.take() else {
            return Ok(());
        };
        txn.commit()?;
        tracing::debug!("transaction committed");
        Ok(())
    }

    /// Rolls back the pending transaction. A no-op when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Transaction`] if the rollback fails.
    pub fn rollback(&mut self) -> Result<(), DbError> {
        let Some(txn) = self.pending.take() else {
            return Ok(());
        };
        txn.rollback()?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }

    /// Abandons any pending transaction and closes the connection.
    ///
    /// Uncommitted writes are discarded. The executor stays usable and
    /// reconnects on the next operation.
    pub fn close(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("pending transaction abandoned on close");
        }
        self.manager.close();
    }
}

impl<D: Driver + std::fmt::Debug> std::fmt::Debug for Executor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("manager", &self.manager)
            .field("pending_transaction", &self.has_pending_transaction())
            .finish()
    }
}
