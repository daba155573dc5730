//! In-memory cursor over a fixed table of values.

use crate::cursor::RowCursor;
use crate::error::{Error, Result};
use crate::value::Value;
use alloc::string::String;
use alloc::vec::Vec;

/// A `RowCursor` backed by rows held in memory.
///
/// Rows are added before iteration starts; rows shorter than the column list
/// read as null in the missing columns.
#[derive(Clone, Debug)]
pub struct MatrixCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    /// Index of the current row; `None` before the first `advance()`.
    position: Option<usize>,
    closed: bool,
}

impl MatrixCursor {
    /// Creates an empty cursor with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            position: None,
            closed: false,
        }
    }

    /// Appends a row.
    pub fn add_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    /// Builder-style variant of `add_row`.
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.add_row(row);
        self
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn current(&self) -> Result<&[Value]> {
        if self.closed {
            return Err(Error::CursorClosed);
        }
        match self.position {
            Some(pos) if pos < self.rows.len() => Ok(&self.rows[pos]),
            _ => Err(Error::NoCurrentRow),
        }
    }
}

impl RowCursor for MatrixCursor {
    fn advance(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let next = self.position.map_or(0, |p| p + 1);
        // Park one past the end so later column reads fail.
        self.position = Some(next.min(self.rows.len()));
        next < self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    fn value(&self, index: usize) -> Result<Value> {
        let row = self.current()?;
        if index >= self.columns.len() {
            return Err(Error::ColumnOutOfRange {
                index,
                count: self.columns.len(),
            });
        }
        Ok(row.get(index).cloned().unwrap_or(Value::Null))
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.rows.len())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
