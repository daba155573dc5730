//! Row cursor contract and scoped cursor ownership.
//!
//! A `RowCursor` is a forward-only accessor over a query result. Cursors are
//! foreign resources: whoever obtains one must call `close()` exactly once,
//! however iteration ends. `CursorScope` enforces that by closing on drop.

use crate::error::{Error, Result};
use crate::types::ColumnType;
use crate::value::Value;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

/// Forward-only accessor over result rows.
///
/// A fresh cursor is positioned before the first row. Column access is only
/// valid between an `advance()` that returned `true` and the next
/// `advance()` or `close()`.
pub trait RowCursor {
    /// Moves to the next row. Returns false once the rows are exhausted.
    fn advance(&mut self) -> bool;

    /// Returns the number of columns in the result.
    fn column_count(&self) -> usize;

    /// Returns the name of the column at `index`.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Returns the value of column `index` at the current row.
    fn value(&self, index: usize) -> Result<Value>;

    /// Total number of rows, when the cursor knows it up front.
    ///
    /// Only ever used as a capacity hint.
    fn row_count(&self) -> Option<usize> {
        None
    }

    /// Releases the cursor. Calling it again has no effect.
    fn close(&mut self);

    /// Returns true once `close()` has been called.
    fn is_closed(&self) -> bool;

    /// Looks up a column by name.
    fn column_index(&self, name: &str) -> Option<usize> {
        (0..self.column_count()).find(|&i| self.column_name(i) == Some(name))
    }

    /// Looks up a column by name, failing with `ColumnNotFound`.
    fn column_index_or_err(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::column_not_found(name))
    }

    /// Returns the value of the named column at the current row.
    fn value_by_name(&self, name: &str) -> Result<Value> {
        self.value(self.column_index_or_err(name)?)
    }

    /// Returns true if the cell at `index` is null.
    fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.value(index)?.is_null())
    }

    /// Reads a cell as text. Numeric cells are formatted.
    fn get_string(&self, index: usize) -> Result<String> {
        match self.value(index)? {
            Value::Text(s) => Ok(s),
            Value::Integer(v) => Ok(v.to_string()),
            Value::Real(v) => Ok(v.to_string()),
            other => Err(Error::type_mismatch(
                index,
                ColumnType::Text,
                other.column_type(),
            )),
        }
    }

    /// Reads a cell as a 64-bit integer.
    fn get_i64(&self, index: usize) -> Result<i64> {
        let value = self.value(index)?;
        value.as_i64().ok_or_else(|| {
            Error::type_mismatch(index, ColumnType::Integer, value.column_type())
        })
    }

    /// Reads a numeric cell as f64.
    fn get_f64(&self, index: usize) -> Result<f64> {
        let value = self.value(index)?;
        value
            .as_f64()
            .ok_or_else(|| Error::type_mismatch(index, ColumnType::Real, value.column_type()))
    }

    /// Reads a cell as raw bytes.
    fn get_blob(&self, index: usize) -> Result<Vec<u8>> {
        match self.value(index)? {
            Value::Blob(b) => Ok(b),
            other => Err(Error::type_mismatch(
                index,
                ColumnType::Blob,
                other.column_type(),
            )),
        }
    }
}

/// A cursor that can be handed to the worker context.
pub type BoxCursor = Box<dyn RowCursor + Send>;

impl<C: RowCursor + ?Sized> RowCursor for Box<C> {
    #[inline]
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    #[inline]
    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    #[inline]
    fn column_name(&self, index: usize) -> Option<&str> {
        (**self).column_name(index)
    }

    #[inline]
    fn value(&self, index: usize) -> Result<Value> {
        (**self).value(index)
    }

    #[inline]
    fn row_count(&self) -> Option<usize> {
        (**self).row_count()
    }

    #[inline]
    fn close(&mut self) {
        (**self).close()
    }

    #[inline]
    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    #[inline]
    fn column_index(&self, name: &str) -> Option<usize> {
        (**self).column_index(name)
    }
}

/// Scoped ownership of an open cursor.
///
/// The wrapped cursor is closed exactly once: by `close()`, or on drop when
/// the scope is left early through `?`, a panic, or cancellation.
pub struct CursorScope<C: RowCursor = BoxCursor> {
    cursor: C,
    released: bool,
}

impl<C: RowCursor> CursorScope<C> {
    /// Takes ownership of an open cursor.
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            released: false,
        }
    }

    /// Borrows the cursor as a trait object for row mappers.
    #[inline]
    pub fn cursor(&self) -> &dyn RowCursor {
        &self.cursor
    }

    /// Closes the cursor now instead of at the end of the scope.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.cursor.close();
        }
    }
}

impl<C: RowCursor> Deref for CursorScope<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.cursor
    }
}

impl<C: RowCursor> DerefMut for CursorScope<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.cursor
    }
}

impl<C: RowCursor> Drop for CursorScope<C> {
    fn drop(&mut self) {
        self.release();
    }
}
