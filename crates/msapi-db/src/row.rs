//! Result rows returned by reads and writes.

use std::fmt;
use std::sync::Arc;

use rusqlite::types::{FromSql, FromSqlError, Value, ValueRef};

/// A single result row.
///
/// Values are owned, so a row outlives the statement that produced it.
#[derive(Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts the value at `index` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FromSqlError::OutOfRange`] if the index is past the last
    /// column, or the conversion error if the value does not fit `T`.
    pub fn get<T: FromSql>(&self, index: usize) -> Result<T, FromSqlError> {
        let value = self
            .values
            .get(index)
            .ok_or(FromSqlError::OutOfRange(index as i64))?;
        T::column_result(ValueRef::from(value))
    }

    /// Converts the value of the named column into `T`.
    ///
    /// Returns `None` if no column has that name.
    pub fn get_by_name<T: FromSql>(&self, column: &str) -> Option<Result<T, FromSqlError>> {
        let index = self.columns.iter().position(|c| c == column)?;
        Some(self.get(index))
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.columns.iter().zip(self.values.iter()))
            .finish()
    }
}

/// A forward-only, single-pass sequence of rows from a read.
///
/// Iterating consumes the set; rows cannot be revisited.
#[derive(Debug)]
pub struct RowSet {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Row>,
}

impl RowSet {
    pub fn new(columns: Arc<[String]>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Iterator for RowSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Outcome of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of rows changed by the statement.
    pub rows_affected: u64,

    /// Row identifier of the most recent insert on the connection, if any.
    pub last_insert_id: Option<i64>,
}
