//! Cardinality operators.
//!
//! Each operator consumes a stream of queries and, for every query, runs it
//! on the worker context, maps the resulting rows and emits at most one value.
//! Queries are processed one at a time in arrival order.
//!
//! | Operator                | 0 rows            | 1 row      | 2+ rows                |
//! |-------------------------|-------------------|------------|------------------------|
//! | `map_to_one`            | nothing           | `T`        | `CardinalityViolation` |
//! | `map_to_one_or_default` | `default`         | `T`        | `CardinalityViolation` |
//! | `map_to_optional`       | `None`            | `Some(T)`  | `CardinalityViolation` |
//! | `map_to_list`           | `vec![]`          | `vec![T]`  | `vec![T; N]`           |
//!
//! An absent result (the query returned no cursor) emits nothing for every
//! operator.

use crate::mapper::map_row;
use crate::worker::{Cancellation, WorkerContext};
use brook_core::{CursorScope, Error, Query, Result, RowCursor};
use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};
use futures::Stream;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

type Job<Q, T> = Arc<dyn Fn(Q, &Cancellation) -> Result<Option<T>> + Send + Sync>;

/// Runs `query` and maps its only row.
///
/// Returns `Ok(None)` for an absent result, `Ok(default)` for zero rows and
/// `Err(CardinalityViolation)` when a second row exists. The cursor is closed
/// on every path before this returns.
pub fn execute_one<Q, T, F>(query: &Q, mapper: &F, default: Option<T>) -> Result<Option<T>>
where
    Q: Query + ?Sized,
    F: Fn(&dyn RowCursor) -> Result<T> + ?Sized,
{
    let Some(cursor) = query.run() else {
        trace!("query returned no cursor");
        return Ok(None);
    };
    let mut cursor = CursorScope::new(cursor);

    if !cursor.advance() {
        return Ok(default);
    }
    let item = map_row(mapper, cursor.cursor())?;
    if cursor.advance() {
        return Err(Error::CardinalityViolation);
    }
    cursor.close();
    Ok(Some(item))
}

/// Runs `query` and maps every row in order.
///
/// Returns `Ok(None)` for an absent result, or when `cancel` fires before the
/// walk finishes.
pub fn collect_list<Q, T, F>(query: &Q, mapper: &F, cancel: &Cancellation) -> Result<Option<Vec<T>>>
where
    Q: Query + ?Sized,
    F: Fn(&dyn RowCursor) -> Result<T> + ?Sized,
{
    let Some(cursor) = query.run() else {
        trace!("query returned no cursor");
        return Ok(None);
    };
    let mut cursor = CursorScope::new(cursor);

    let mut items = Vec::with_capacity(cursor.row_count().unwrap_or(0));
    loop {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        if !cursor.advance() {
            break;
        }
        items.push(map_row(mapper, cursor.cursor())?);
    }
    cursor.close();
    Ok(Some(items))
}

/// Stream adapter running one job per upstream query.
///
/// Built through [`QueryStreamExt`]. Errors, from upstream or from a job, are
/// terminal. Dropping the adapter cancels the job in flight without waiting
/// for it; the job still closes its cursor.
pub struct MapQuery<S, Q, T> {
    upstream: S,
    job: Job<Q, T>,
    worker: Option<WorkerContext>,
    cancel: Cancellation,
    in_flight: Option<JoinHandle<Result<Option<T>>>>,
    done: bool,
}

/// Stream returned by `map_to_one` and `map_to_one_or_default`.
pub type MapToOne<S, Q, T> = MapQuery<S, Q, T>;

/// Stream returned by `map_to_optional`.
pub type MapToOptional<S, Q, T> = MapQuery<S, Q, Option<T>>;

/// Stream returned by `map_to_list`.
pub type MapToList<S, Q, T> = MapQuery<S, Q, Vec<T>>;

impl<S, Q, T> MapQuery<S, Q, T> {
    fn new<F>(upstream: S, job: F) -> Self
    where
        F: Fn(Q, &Cancellation) -> Result<Option<T>> + Send + Sync + 'static,
    {
        Self {
            upstream,
            job: Arc::new(job),
            worker: None,
            cancel: Cancellation::new(),
            in_flight: None,
            done: false,
        }
    }

    /// Runs queries on `worker` instead of the runtime current at first poll.
    pub fn on(mut self, worker: WorkerContext) -> Self {
        self.worker = Some(worker);
        self
    }

    fn worker(&mut self) -> Result<WorkerContext> {
        match &self.worker {
            Some(worker) => Ok(worker.clone()),
            None => {
                let worker = WorkerContext::try_current()?;
                self.worker = Some(worker.clone());
                Ok(worker)
            }
        }
    }

    fn fail(&mut self, error: Error) -> Poll<Option<Result<T>>> {
        warn!(%error, "live query failed");
        self.done = true;
        Poll::Ready(Some(Err(error)))
    }
}

impl<S, Q, T> Stream for MapQuery<S, Q, T>
where
    S: Stream<Item = Result<Q>> + Unpin,
    Q: Send + 'static,
    T: Send + 'static,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if let Some(handle) = this.in_flight.as_mut() {
                let joined = ready!(Pin::new(handle).poll(cx));
                this.in_flight = None;
                match joined {
                    Ok(Ok(Some(item))) => return Poll::Ready(Some(Ok(item))),
                    Ok(Ok(None)) => continue,
                    Ok(Err(error)) => return this.fail(error),
                    Err(join) => return this.fail(Error::worker(join.to_string())),
                }
            }

            match ready!(Pin::new(&mut this.upstream).poll_next(cx)) {
                Some(Ok(query)) => {
                    let worker = match this.worker() {
                        Ok(worker) => worker,
                        Err(error) => return this.fail(error),
                    };
                    let job = this.job.clone();
                    let cancel = this.cancel.clone();
                    this.in_flight = Some(worker.spawn(move || {
                        if cancel.is_cancelled() {
                            return Ok(None);
                        }
                        job(query, &cancel)
                    }));
                }
                Some(Err(error)) => return this.fail(error),
                None => {
                    this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }
}

impl<S, Q, T> Drop for MapQuery<S, Q, T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Cardinality operators for streams of queries.
///
/// ```ignore
/// let names = resolver
///     .observe_query(descriptor, false)
///     .map_to_list(|row| row.get_string(0));
/// ```
pub trait QueryStreamExt<Q>: Stream<Item = Result<Q>> + Unpin + Sized
where
    Q: Query + Send + 'static,
{
    /// Emits the mapped row of every single-row result.
    ///
    /// Zero rows emit nothing; two or more fail with `CardinalityViolation`.
    fn map_to_one<T, F>(self, mapper: F) -> MapToOne<Self, Q, T>
    where
        T: Send + 'static,
        F: Fn(&dyn RowCursor) -> Result<T> + Send + Sync + 'static,
    {
        MapQuery::new(self, move |query: Q, _: &Cancellation| {
            execute_one(&query, &mapper, None)
        })
    }

    /// Like `map_to_one`, but zero rows emit `default`.
    fn map_to_one_or_default<T, F>(self, default: T, mapper: F) -> MapToOne<Self, Q, T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&dyn RowCursor) -> Result<T> + Send + Sync + 'static,
    {
        MapQuery::new(self, move |query: Q, _: &Cancellation| {
            execute_one(&query, &mapper, Some(default.clone()))
        })
    }

    /// Emits `Some(row)` for one row and `None` for zero rows.
    fn map_to_optional<T, F>(self, mapper: F) -> MapToOptional<Self, Q, T>
    where
        T: Send + 'static,
        F: Fn(&dyn RowCursor) -> Result<T> + Send + Sync + 'static,
    {
        MapQuery::new(self, move |query: Q, _: &Cancellation| {
            let present = |cursor: &dyn RowCursor| mapper(cursor).map(Some);
            execute_one(&query, &present, Some(None))
        })
    }

    /// Emits every row of each result as one list.
    fn map_to_list<T, F>(self, mapper: F) -> MapToList<Self, Q, T>
    where
        T: Send + 'static,
        F: Fn(&dyn RowCursor) -> Result<T> + Send + Sync + 'static,
    {
        MapQuery::new(self, move |query: Q, cancel: &Cancellation| {
            collect_list(&query, &mapper, cancel)
        })
    }
}

impl<S, Q> QueryStreamExt<Q> for S
where
    S: Stream<Item = Result<Q>> + Unpin,
    Q: Query + Send + 'static,
{
}
