//! Query fixtures for unit tests.

use brook_core::{BoxCursor, MatrixCursor, Query, Result, RowCursor, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counters {
    advances: AtomicUsize,
    closes: AtomicUsize,
}

/// Integer rows in a single column `n`, counting cursor traffic.
#[derive(Clone)]
pub(crate) struct Rows {
    rows: Option<Vec<i64>>,
    counters: Arc<Counters>,
}

impl Rows {
    pub(crate) fn new(rows: &[i64]) -> Self {
        Self {
            rows: Some(rows.to_vec()),
            counters: Arc::default(),
        }
    }

    /// A query whose source declines to answer.
    pub(crate) fn absent() -> Self {
        Self {
            rows: None,
            counters: Arc::default(),
        }
    }

    pub(crate) fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    /// Rows actually fetched, not counting the final `advance()` returning false.
    pub(crate) fn fetched(&self) -> usize {
        let len = self.rows.as_ref().map_or(0, Vec::len);
        self.counters.advances.load(Ordering::SeqCst).min(len)
    }
}

struct Counted {
    inner: MatrixCursor,
    counters: Arc<Counters>,
}

impl RowCursor for Counted {
    fn advance(&mut self) -> bool {
        self.counters.advances.fetch_add(1, Ordering::SeqCst);
        self.inner.advance()
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.inner.column_name(index)
    }

    fn value(&self, index: usize) -> Result<Value> {
        self.inner.value(index)
    }

    fn row_count(&self) -> Option<usize> {
        self.inner.row_count()
    }

    fn close(&mut self) {
        if !self.inner.is_closed() {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.close();
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Query for Rows {
    fn run(&self) -> Option<BoxCursor> {
        let rows = self.rows.as_ref()?;
        let mut inner = MatrixCursor::new(["n"]);
        for &n in rows {
            inner.add_row(vec![Value::Integer(n)]);
        }
        Some(Box::new(Counted {
            inner,
            counters: self.counters.clone(),
        }))
    }
}

/// Mapper reading column `n`.
pub(crate) fn n(cursor: &dyn RowCursor) -> Result<i64> {
    cursor.get_i64(0)
}
