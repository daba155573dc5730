//! In-process observer registry.
//!
//! This module provides `ObserverRegistry`, a `NotificationRegistry` that
//! routes resource changes to the observers interested in them. Data sources
//! that live in the same process call `notify_change` after every write.

use brook_core::{ChangeCallback, Error, NotificationRegistry, RegistrationHandle, ResourceUri};
use hashbrown::HashMap;
use parking_lot::Mutex;
use tracing::trace;

/// A registered observer.
struct Observer {
    uri: ResourceUri,
    notify_for_descendants: bool,
    callback: ChangeCallback,
}

impl Observer {
    /// Whether a change at `changed` concerns this observer.
    ///
    /// Exact matches always do. A change below the observed URI only does if
    /// the observer asked for descendants. A change above the observed URI
    /// always does, since it may cover the observed resource.
    fn wants(&self, changed: &ResourceUri) -> bool {
        self.uri == *changed
            || (self.notify_for_descendants && self.uri.is_ancestor_of(changed))
            || changed.is_ancestor_of(&self.uri)
    }
}

struct RegistryState {
    observers: HashMap<RegistrationHandle, Observer>,
    next_id: u64,
}

/// A thread-safe registry routing changes to observers.
///
/// # Example
///
/// ```ignore
/// use brook_reactive::ObserverRegistry;
///
/// let registry = ObserverRegistry::new();
/// let handle = registry.register(&uri, false, Arc::new(|| println!("changed")))?;
///
/// // Every observer of `uri` (or of an ancestor, with descendants on) runs.
/// registry.notify_change(&uri);
///
/// registry.unregister(handle);
/// ```
pub struct ObserverRegistry {
    state: Mutex<RegistryState>,
    /// Maximum number of live registrations; registering beyond it fails.
    limit: Option<usize>,
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObserverRegistry {
    /// Creates an empty registry without a registration limit.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                observers: HashMap::new(),
                next_id: 1,
            }),
            limit: None,
        }
    }

    /// Creates a registry that refuses registrations past `limit`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Notifies every observer interested in a change at `uri`.
    ///
    /// Callbacks run on the calling thread, after the registry lock has been
    /// released, so a callback may register or unregister freely.
    /// Returns the number of observers notified.
    pub fn notify_change(&self, uri: &ResourceUri) -> usize {
        let callbacks: Vec<ChangeCallback> = {
            let state = self.state.lock();
            state
                .observers
                .values()
                .filter(|observer| observer.wants(uri))
                .map(|observer| observer.callback.clone())
                .collect()
        };

        trace!(%uri, observers = callbacks.len(), "notify change");
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    /// Returns the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// Returns true if there are no registered observers.
    pub fn is_empty(&self) -> bool {
        self.state.lock().observers.is_empty()
    }

    /// Returns the number of observers a change at `uri` would reach.
    pub fn observers_for(&self, uri: &ResourceUri) -> usize {
        self.state
            .lock()
            .observers
            .values()
            .filter(|observer| observer.wants(uri))
            .count()
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.state.lock().observers.clear();
    }
}

impl NotificationRegistry for ObserverRegistry {
    fn register(
        &self,
        uri: &ResourceUri,
        notify_for_descendants: bool,
        callback: ChangeCallback,
    ) -> brook_core::Result<RegistrationHandle> {
        let mut state = self.state.lock();
        if let Some(limit) = self.limit {
            if state.observers.len() >= limit {
                return Err(Error::registration(
                    uri,
                    format!("observer limit of {} reached", limit),
                ));
            }
        }

        let handle = RegistrationHandle::new(state.next_id);
        state.next_id += 1;
        state.observers.insert(
            handle,
            Observer {
                uri: uri.clone(),
                notify_for_descendants,
                callback,
            },
        );
        trace!(%uri, id = handle.id(), notify_for_descendants, "observer registered");
        Ok(handle)
    }

    fn unregister(&self, handle: RegistrationHandle) {
        if self.state.lock().observers.remove(&handle).is_some() {
            trace!(id = handle.id(), "observer unregistered");
        }
    }
}
