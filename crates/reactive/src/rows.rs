//! Per-row streaming.
//!
//! `as_rows` runs a query once and emits one mapped value per row. Rows are
//! handed over on demand: the worker advances the cursor only after the
//! consumer has asked for the next item, so a consumer that stops early never
//! causes the whole result to be read.

use crate::mapper::{map_row, RowMapper};
use crate::worker::{Cancellation, WorkerContext};
use brook_core::{CursorScope, Error, Query, Result, RowCursor};
use core::future::Future;
use core::pin::Pin;
use core::task::{ready, Context, Poll};
use futures::Stream;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Creates a stream of `query`'s rows mapped through `mapper`.
///
/// Nothing runs until the first poll. An absent result completes the stream
/// without items. A mapper failure is the last item. Dropping the stream
/// closes the cursor on the worker.
pub fn as_rows<Q, T, F>(query: Q, mapper: F) -> RowStream<Q, T>
where
    Q: Query + Send + 'static,
    T: Send + 'static,
    F: Fn(&dyn RowCursor) -> Result<T> + Send + Sync + 'static,
{
    RowStream {
        query: Some(query),
        mapper: Arc::new(mapper),
        worker: None,
        cancel: Cancellation::new(),
        state: RowState::Idle,
    }
}

/// `as_rows` as a method on queries.
pub trait QueryExt: Query + Send + Sized + 'static {
    /// See [`as_rows`].
    fn as_rows<T, F>(self, mapper: F) -> RowStream<Self, T>
    where
        T: Send + 'static,
        F: Fn(&dyn RowCursor) -> Result<T> + Send + Sync + 'static,
    {
        as_rows(self, mapper)
    }
}

impl<Q: Query + Send + 'static> QueryExt for Q {}

enum RowState<T> {
    Idle,
    Streaming {
        demand: mpsc::Sender<()>,
        items: mpsc::Receiver<Result<T>>,
        producer: JoinHandle<()>,
        /// A demand is outstanding and its item has not been received.
        awaiting: bool,
    },
    /// Items are exhausted; only a producer panic is left to report.
    Draining(JoinHandle<()>),
    Done,
}

/// Stream of mapped rows from a single query execution.
pub struct RowStream<Q, T> {
    query: Option<Q>,
    mapper: RowMapper<T>,
    worker: Option<WorkerContext>,
    cancel: Cancellation,
    state: RowState<T>,
}

impl<Q, T> RowStream<Q, T>
where
    Q: Query + Send + 'static,
    T: Send + 'static,
{
    /// Runs the query on `worker` instead of the runtime current at first poll.
    pub fn on(mut self, worker: WorkerContext) -> Self {
        self.worker = Some(worker);
        self
    }

    fn start(&mut self) -> Result<RowState<T>> {
        let worker = match self.worker.take() {
            Some(worker) => worker,
            None => WorkerContext::try_current()?,
        };
        let Some(query) = self.query.take() else {
            return Ok(RowState::Done);
        };

        let (demand, demand_rx) = mpsc::channel(1);
        let (item_tx, items) = mpsc::channel(1);
        let mapper = self.mapper.clone();
        let cancel = self.cancel.clone();
        let producer = worker.spawn(move || produce(query, mapper, cancel, demand_rx, item_tx));

        Ok(RowState::Streaming {
            demand,
            items,
            producer,
            awaiting: false,
        })
    }
}

/// Worker side: one row per demand until the rows, the demand or the
/// consumer run out.
fn produce<Q, T>(
    query: Q,
    mapper: RowMapper<T>,
    cancel: Cancellation,
    mut demand: mpsc::Receiver<()>,
    items: mpsc::Sender<Result<T>>,
) where
    Q: Query,
{
    let Some(cursor) = query.run() else {
        trace!("query returned no cursor");
        return;
    };
    let mut cursor = CursorScope::new(cursor);

    while demand.blocking_recv().is_some() {
        if cancel.is_cancelled() || !cursor.advance() {
            break;
        }
        let item = map_row(&*mapper, cursor.cursor());
        let failed = item.is_err();
        if items.blocking_send(item).is_err() || failed {
            break;
        }
    }
    cursor.close();
}

impl<Q, T> Stream for RowStream<Q, T>
where
    Q: Query + Send + Unpin + 'static,
    T: Send + 'static,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match &mut this.state {
                RowState::Idle => match this.start() {
                    Ok(state) => this.state = state,
                    Err(error) => {
                        warn!(%error, "row stream failed to start");
                        this.state = RowState::Done;
                        return Poll::Ready(Some(Err(error)));
                    }
                },
                RowState::Streaming {
                    demand,
                    items,
                    awaiting,
                    ..
                } => {
                    if !*awaiting {
                        // Capacity one, and at most one demand is outstanding.
                        let _ = demand.try_send(());
                        *awaiting = true;
                    }
                    match ready!(items.poll_recv(cx)) {
                        Some(Ok(item)) => {
                            *awaiting = false;
                            return Poll::Ready(Some(Ok(item)));
                        }
                        Some(Err(error)) => {
                            warn!(%error, "row mapping failed");
                            this.state = RowState::Done;
                            return Poll::Ready(Some(Err(error)));
                        }
                        None => {
                            let state = core::mem::replace(&mut this.state, RowState::Done);
                            if let RowState::Streaming { producer, .. } = state {
                                this.state = RowState::Draining(producer);
                            }
                        }
                    }
                }
                RowState::Draining(producer) => {
                    let joined = ready!(Pin::new(producer).poll(cx));
                    this.state = RowState::Done;
                    if let Err(join) = joined {
                        let error = Error::worker(join.to_string());
                        warn!(%error, "row producer failed");
                        return Poll::Ready(Some(Err(error)));
                    }
                    return Poll::Ready(None);
                }
                RowState::Done => return Poll::Ready(None),
            }
        }
    }
}

impl<Q, T> Drop for RowStream<Q, T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{n, Rows};
    use futures::StreamExt;
    use std::time::Duration;

    async fn wait_closed(query: &Rows) {
        for _ in 0..200 {
            if query.closes() == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("cursor was not closed");
    }

    #[tokio::test]
    async fn test_all_rows_in_order() {
        let query = Rows::new(&[1, 2, 3]);
        let items: Vec<_> = as_rows(query.clone(), n).collect().await;
        assert_eq!(items, vec![Ok(1), Ok(2), Ok(3)]);
        wait_closed(&query).await;
    }

    #[tokio::test]
    async fn test_empty_and_absent_complete() {
        let empty = Rows::new(&[]);
        assert!(as_rows(empty.clone(), n).collect::<Vec<_>>().await.is_empty());
        wait_closed(&empty).await;

        let absent = Rows::absent();
        assert!(absent.clone().as_rows(n).collect::<Vec<_>>().await.is_empty());
        assert_eq!(absent.closes(), 0);
    }

    #[tokio::test]
    async fn test_early_stop_fetches_at_most_one_extra() {
        let query = Rows::new(&(0..100).collect::<Vec<_>>());
        let items: Vec<_> = as_rows(query.clone(), n).take(3).collect().await;
        assert_eq!(items, vec![Ok(0), Ok(1), Ok(2)]);

        wait_closed(&query).await;
        assert!(query.fetched() <= 4);
    }

    #[tokio::test]
    async fn test_mapper_error_is_last_item() {
        let query = Rows::new(&[1, 2, 3]);
        let items: Vec<_> = as_rows(query.clone(), |c: &dyn RowCursor| {
            let value = c.get_i64(0)?;
            if value == 2 {
                return Err(Error::mapper("two"));
            }
            Ok(value)
        })
        .collect()
        .await;

        assert_eq!(items, vec![Ok(1), Err(Error::mapper("two"))]);
        wait_closed(&query).await;
        assert_eq!(query.fetched(), 2);
    }

    #[tokio::test]
    async fn test_mapper_panic_is_last_item() {
        let query = Rows::new(&[1, 2, 3]);
        let items: Vec<_> = as_rows(query.clone(), |c: &dyn RowCursor| -> Result<i64> {
            let value = c.get_i64(0)?;
            if value == 2 {
                panic!("row two");
            }
            Ok(value)
        })
        .collect()
        .await;

        assert_eq!(
            items,
            vec![Ok(1), Err(Error::mapper("mapper panicked: row two"))]
        );
        wait_closed(&query).await;
        assert_eq!(query.closes(), 1);
        assert_eq!(query.fetched(), 2);
    }

    #[tokio::test]
    async fn test_nothing_runs_before_first_poll() {
        let query = Rows::new(&[1]);
        let stream = as_rows(query.clone(), n);
        drop(stream);
        assert_eq!(query.fetched(), 0);
        assert_eq!(query.closes(), 0);
    }

    #[tokio::test]
    async fn test_drop_mid_stream_closes() {
        let query = Rows::new(&[1, 2, 3]);
        let mut stream = as_rows(query.clone(), n);
        assert_eq!(stream.next().await, Some(Ok(1)));
        drop(stream);
        wait_closed(&query).await;
        assert!(query.fetched() <= 2);
    }

    #[test]
    fn test_no_runtime_is_worker_error() {
        let query = Rows::new(&[1]);
        let items: Vec<_> = futures::executor::block_on(as_rows(query, n).collect());
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Worker { .. })));
    }
}
