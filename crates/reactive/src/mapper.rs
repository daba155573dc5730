//! Row mapping.
//!
//! Mappers are caller code running against a live cursor. A failing or
//! panicking mapper must still leave the cursor closed, and must surface as a
//! `Mapper` error on the stream rather than tearing down the worker thread.

use brook_core::{Error, Result, RowCursor};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Shared, type-erased row mapper.
pub type RowMapper<T> = Arc<dyn Fn(&dyn RowCursor) -> Result<T> + Send + Sync>;

/// Applies `mapper` to the current row, converting a panic into an error.
pub(crate) fn map_row<T, F>(mapper: &F, cursor: &dyn RowCursor) -> Result<T>
where
    F: Fn(&dyn RowCursor) -> Result<T> + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| mapper(cursor))) {
        Ok(result) => result,
        Err(payload) => Err(Error::mapper(format!(
            "mapper panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
