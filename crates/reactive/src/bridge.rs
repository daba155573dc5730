//! Change notification bridge.
//!
//! `observe` turns a callback-based `NotificationRegistry` into a stream of
//! queries: one immediately for the initial state, then one per (conflated)
//! change. The stream owns its registration and gives it back when dropped.

use crate::trigger::{self, TriggerReceiver, TriggerSender};
use brook_core::{
    ChangeCallback, NotificationRegistry, Query, RegistrationHandle, ResourceUri, Result,
};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::Stream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Creates a stream of `query` that re-emits whenever `uri` changes.
///
/// Nothing happens until the stream is first polled. The first poll
/// registers with `registry` and yields `query` for the initial state; every
/// later item is caused by at least one change notification. Dropping the
/// stream unregisters.
///
/// The stream never ends on its own. A registration failure is yielded as
/// the only item, after which the stream ends.
pub fn observe<Q>(
    registry: Arc<dyn NotificationRegistry>,
    uri: ResourceUri,
    notify_for_descendants: bool,
    query: Q,
) -> QueryStream<Q>
where
    Q: Query + Clone + Unpin,
{
    let (trigger, triggers) = trigger::conflated();
    QueryStream {
        query,
        uri,
        notify_for_descendants,
        registry,
        trigger,
        triggers,
        state: State::Idle,
        logging: Arc::new(AtomicBool::new(false)),
        emitted: 0,
    }
}

enum State {
    /// Not subscribed yet.
    Idle,
    /// Registered; waiting for triggers.
    Observing(Registration),
    /// Registration failed.
    Terminated,
}

/// Stream of queries driven by change notifications.
///
/// Created by [`observe`] or `ReactiveResolver::observe_query`.
pub struct QueryStream<Q> {
    query: Q,
    uri: ResourceUri,
    notify_for_descendants: bool,
    registry: Arc<dyn NotificationRegistry>,
    /// Kept so the trigger never reports closed while we are subscribed.
    trigger: TriggerSender,
    triggers: TriggerReceiver,
    state: State,
    logging: Arc<AtomicBool>,
    emitted: u64,
}

impl<Q> QueryStream<Q> {
    /// Shares a logging switch with this stream.
    pub(crate) fn with_logging(mut self, logging: Arc<AtomicBool>) -> Self {
        self.logging = logging;
        self
    }

    /// Returns the observed resource.
    #[inline]
    pub fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    /// Returns true while a change listener is registered.
    #[inline]
    pub fn is_registered(&self) -> bool {
        matches!(self.state, State::Observing(_))
    }

    /// Number of queries emitted so far, the initial one included.
    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn logging(&self) -> bool {
        self.logging.load(Ordering::Relaxed)
    }

    fn register(&self) -> Result<Registration> {
        let trigger = self.trigger.clone();
        let uri = self.uri.clone();
        let callback: ChangeCallback = Arc::new(move || {
            if !trigger.fire() {
                trace!(%uri, "change conflated into pending trigger");
            }
        });

        let handle =
            self.registry
                .register(&self.uri, self.notify_for_descendants, callback)?;
        Ok(Registration {
            registry: self.registry.clone(),
            handle,
            uri: self.uri.clone(),
            logging: self.logging.clone(),
        })
    }
}

impl<Q> Stream for QueryStream<Q>
where
    Q: Query + Clone + Unpin,
{
    type Item = Result<Q>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.state {
            State::Idle => match this.register() {
                Ok(registration) => {
                    if this.logging() {
                        debug!(
                            uri = %this.uri,
                            id = registration.handle.id(),
                            descendants = this.notify_for_descendants,
                            "query subscribed"
                        );
                    }
                    this.state = State::Observing(registration);
                    this.emitted += 1;
                    Poll::Ready(Some(Ok(this.query.clone())))
                }
                Err(e) => {
                    warn!(uri = %this.uri, error = %e, "change registration failed");
                    this.state = State::Terminated;
                    Poll::Ready(Some(Err(e)))
                }
            },
            State::Observing(_) => match this.triggers.poll_recv(cx) {
                Poll::Ready(Some(())) => {
                    this.emitted += 1;
                    if this.logging() {
                        debug!(uri = %this.uri, emission = this.emitted, "query triggered");
                    }
                    Poll::Ready(Some(Ok(this.query.clone())))
                }
                // We hold a sender ourselves, so the channel cannot close.
                Poll::Ready(None) | Poll::Pending => Poll::Pending,
            },
            State::Terminated => Poll::Ready(None),
        }
    }
}

/// A live registration, released exactly once on drop.
struct Registration {
    registry: Arc<dyn NotificationRegistry>,
    handle: RegistrationHandle,
    uri: ResourceUri,
    logging: Arc<AtomicBool>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.handle);
        if self.logging.load(Ordering::Relaxed) {
            debug!(uri = %self.uri, id = self.handle.id(), "query unsubscribed");
        }
    }
}
