//! Cursor instrumentation and assertions.

use brook_core::{BoxCursor, CursorScope, Query, Result, RowCursor, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct ProbeState {
    advances: AtomicUsize,
    rows: AtomicUsize,
    closes: AtomicUsize,
    closed: Notify,
}

/// Shared view of how the cursors of a `CountingQuery` were used.
#[derive(Clone, Default)]
pub struct CursorProbe {
    state: Arc<ProbeState>,
}

impl CursorProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls to `advance()`.
    pub fn advances(&self) -> usize {
        self.state.advances.load(Ordering::SeqCst)
    }

    /// Calls to `advance()` that landed on a row.
    pub fn rows_fetched(&self) -> usize {
        self.state.rows.load(Ordering::SeqCst)
    }

    /// Calls to `close()` on an open cursor.
    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Waits until at least `count` cursors have been closed.
    ///
    /// Cursors are closed on the worker, so a test that just dropped a stream
    /// has to wait for this.
    pub async fn closed(&self, count: usize) {
        loop {
            let notified = self.state.closed.notified();
            if self.closes() >= count {
                return;
            }
            notified.await;
        }
    }
}

/// Wraps a cursor, reporting its traffic to a `CursorProbe`.
pub struct CountingCursor {
    inner: BoxCursor,
    probe: CursorProbe,
}

impl CountingCursor {
    pub fn new(inner: BoxCursor, probe: CursorProbe) -> Self {
        Self { inner, probe }
    }
}

impl RowCursor for CountingCursor {
    fn advance(&mut self) -> bool {
        let state = &self.probe.state;
        state.advances.fetch_add(1, Ordering::SeqCst);
        let moved = self.inner.advance();
        if moved {
            state.rows.fetch_add(1, Ordering::SeqCst);
        }
        moved
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
        if self.inner.is_closed() {
            return;
        }
        self.inner.close();
        self.probe.state.closes.fetch_add(1, Ordering::SeqCst);
        self.probe.state.closed.notify_waiters();
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// A query whose cursors all report to one probe.
#[derive(Clone)]
pub struct CountingQuery<Q> {
    inner: Q,
    probe: CursorProbe,
}

impl<Q: Query> CountingQuery<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner,
            probe: CursorProbe::new(),
        }
    }

    pub fn probe(&self) -> CursorProbe {
        self.probe.clone()
    }
}

impl<Q: Query> Query for CountingQuery<Q> {
    fn run(&self) -> Option<BoxCursor> {
        let cursor = self.inner.run()?;
        Some(Box::new(CountingCursor::new(cursor, self.probe.clone())))
    }
}

/// Row-by-row assertions over a query result.
///
/// ```
/// use brook_testing::{employees_query, CursorAssert};
///
/// CursorAssert::of(&employees_query(&["alice", "Alice Allison"]))
///     .has_row(&["alice", "Alice Allison"])
///     .is_exhausted();
/// ```
pub struct CursorAssert {
    cursor: CursorScope,
    row: usize,
}

impl CursorAssert {
    /// # Panics
    ///
    /// Panics if the result is absent.
    pub fn new(cursor: Option<BoxCursor>) -> Self {
        match cursor {
            Some(cursor) => Self {
                cursor: CursorScope::new(cursor),
                row: 0,
            },
            None => panic!("query returned no cursor"),
        }
    }

    /// Runs `query` and asserts on its result.
    pub fn of<Q: Query + ?Sized>(query: &Q) -> Self {
        Self::new(query.run())
    }

    /// Asserts the next row holds exactly `values`, read as text.
    pub fn has_row(mut self, values: &[&str]) -> Self {
        assert!(self.cursor.advance(), "row {} exists", self.row + 1);
        self.row += 1;
        assert_eq!(self.cursor.column_count(), values.len(), "column count");
        for (index, expected) in values.iter().enumerate() {
            let actual = self.cursor.get_string(index);
            assert_eq!(
                actual.as_deref(),
                Ok(*expected),
                "row {} column '{}'",
                self.row,
                self.cursor.column_name(index).unwrap_or_default()
            );
        }
        self
    }

    /// Asserts there are no more rows, then closes the cursor.
    pub fn is_exhausted(mut self) {
        if self.cursor.advance() {
            let data: Vec<String> = (0..self.cursor.column_count())
                .map(|i| self.cursor.get_string(i).unwrap_or_else(|e| e.to_string()))
                .collect();
            panic!("expected no more rows but was: {}", data.join(", "));
        }
        self.cursor.close();
    }
}
