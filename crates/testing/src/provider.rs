//! In-memory key/value provider.

use brook_core::{
    BoxCursor, ChangeCallback, DataSource, MatrixCursor, NotificationRegistry, QueryDescriptor,
    RegistrationHandle, ResourceUri, Result, Value,
};
use brook_reactive::ObserverRegistry;
use parking_lot::Mutex;
use std::sync::Arc;

/// Key column name.
pub const KEY: &str = "test_key";
/// Value column name.
pub const VALUE: &str = "test_value";

/// A two-column table kept in insertion order.
///
/// Every write notifies the observers of the written URI through the
/// provider's own `ObserverRegistry`, so the provider can be handed to a
/// `ReactiveResolver` as both source and registry.
pub struct InMemoryProvider {
    storage: Mutex<Vec<(String, String)>>,
    registry: Arc<ObserverRegistry>,
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ObserverRegistry::new()))
    }

    /// Notifies through `registry`, which may be shared with other sources.
    pub fn with_registry(registry: Arc<ObserverRegistry>) -> Self {
        Self {
            storage: Mutex::new(Vec::new()),
            registry,
        }
    }

    /// `content://test_authority`
    pub fn authority() -> ResourceUri {
        ResourceUri::from_parts("content", "test_authority")
    }

    /// `content://test_authority/test_table`
    pub fn table() -> ResourceUri {
        Self::authority().join("test_table")
    }

    pub fn registry(&self) -> Arc<ObserverRegistry> {
        self.registry.clone()
    }

    /// Inserts or replaces `key`. Returns the URI of the new row.
    pub fn insert(&self, uri: &ResourceUri, key: &str, value: &str) -> ResourceUri {
        {
            let mut storage = self.storage.lock();
            match storage.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.to_string(),
                None => storage.push((key.to_string(), value.to_string())),
            }
        }
        self.registry.notify_change(uri);
        Self::authority().join(key)
    }

    /// Sets every value to `value`. Returns the number of rows.
    pub fn update(&self, uri: &ResourceUri, value: &str) -> usize {
        let count = {
            let mut storage = self.storage.lock();
            for entry in storage.iter_mut() {
                entry.1 = value.to_string();
            }
            storage.len()
        };
        self.registry.notify_change(uri);
        count
    }

    /// Removes every row. Returns the number removed.
    pub fn delete(&self, uri: &ResourceUri) -> usize {
        let count = {
            let mut storage = self.storage.lock();
            let count = storage.len();
            storage.clear();
            count
        };
        self.registry.notify_change(uri);
        count
    }

    pub fn len(&self) -> usize {
        self.storage.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.lock().is_empty()
    }
}

impl DataSource for InMemoryProvider {
    fn query(&self, _descriptor: &QueryDescriptor) -> Option<BoxCursor> {
        let mut cursor = MatrixCursor::new([KEY, VALUE]);
        for (key, value) in self.storage.lock().iter() {
            cursor.add_row(vec![Value::from(key.as_str()), Value::from(value.as_str())]);
        }
        Some(Box::new(cursor))
    }
}

impl NotificationRegistry for InMemoryProvider {
    fn register(
        &self,
        uri: &ResourceUri,
        notify_for_descendants: bool,
        callback: ChangeCallback,
    ) -> Result<RegistrationHandle> {
        self.registry.register(uri, notify_for_descendants, callback)
    }

    fn unregister(&self, handle: RegistrationHandle) {
        self.registry.unregister(handle);
    }
}
