//! Conflated change trigger.
//!
//! Change callbacks arrive on arbitrary threads at arbitrary rates, while a
//! change stream only needs to know "something changed since you last
//! looked". The trigger is a single slot: firing while a trigger is already
//! pending is a no-op, and the one consumer parks until the slot fills.

use core::pin::Pin;
use core::task::{Context, Poll};
use futures::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Creates a connected sender/receiver pair sharing one slot.
pub fn conflated() -> (TriggerSender, TriggerReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (TriggerSender { tx }, TriggerReceiver { rx })
}

/// Publishing half. Cheap to clone; safe to call from any thread.
#[derive(Clone, Debug)]
pub struct TriggerSender {
    tx: mpsc::Sender<()>,
}

impl TriggerSender {
    /// Posts a trigger without blocking.
    ///
    /// Returns false if a trigger was already pending (the new one is
    /// conflated into it) or the receiver is gone.
    pub fn fire(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) | Err(TrySendError::Closed(())) => false,
        }
    }

    /// Returns true once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consuming half. There is exactly one per trigger.
#[derive(Debug)]
pub struct TriggerReceiver {
    rx: mpsc::Receiver<()>,
}

impl TriggerReceiver {
    /// Waits for the next trigger. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Takes the pending trigger, if any, without waiting.
    pub fn try_take(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }

    /// Polls for the next trigger.
    pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<()>> {
        self.rx.poll_recv(cx)
    }
}

impl Stream for TriggerReceiver {
    type Item = ();

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<()>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
