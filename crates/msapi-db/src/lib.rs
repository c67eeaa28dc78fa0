//! Transactional database access for msapi services.
//!
//! Provides a lazily connected [`Executor`] that runs reads outside of any
//! transaction and wraps every write in an implicitly started transaction
//! that stays open until the caller commits it with
//! [`Executor::save_change`].
//!
//! # Design decisions
//!
//! - **Lazy connection**: constructing an executor never touches the
//!   database. The first query or write opens the pool and pings it, so an
//!   executor can be created before credentials are reachable.
//! - **One pending transaction**: every `exec` between two commits shares a
//!   single transaction. Failed writes leave it open; the caller decides
//!   whether to commit, roll back, or drop the executor.
//! - **Driver seam**: the database driver is reached through the
//!   [`Driver`], [`Handle`] and [`Transaction`] traits. [`SqliteDriver`]
//!   (`rusqlite` behind an `r2d2` pool) is the bundled implementation.

mod descriptor;
mod driver;
mod error;
mod executor;
mod manager;
mod row;
mod sqlite;

pub use descriptor::ConnectionDescriptor;
pub use driver::{Driver, Handle, PoolLimits, Transaction};
pub use error::{BoxError, DbError};
pub use executor::Executor;
pub use manager::ConnectionManager;
pub use row::{ExecResult, Row, RowSet};
pub use sqlite::{SqliteDriver, SqliteHandle, SqliteSettings, SqliteTransaction};
