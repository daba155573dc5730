//! Change notification contract.
//!
//! The registry is owned by whoever owns the data. Interested parties
//! register a callback for a resource and are called back, with no payload,
//! whenever that resource changes.

use crate::error::Result;
use crate::uri::ResourceUri;
use alloc::sync::Arc;

/// Callback invoked on change. May run on any thread, at any frequency.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// Opaque handle identifying one registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationHandle(u64);

impl RegistrationHandle {
    /// Wraps a registry-assigned id.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the registry-assigned id.
    #[inline]
    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// Registry routing data changes to observers.
pub trait NotificationRegistry: Send + Sync {
    /// Registers `callback` for changes to `uri`.
    ///
    /// With `notify_for_descendants`, changes to URIs below `uri` are
    /// delivered as well.
    fn register(
        &self,
        uri: &ResourceUri,
        notify_for_descendants: bool,
        callback: ChangeCallback,
    ) -> Result<RegistrationHandle>;

    /// Removes a registration. Unknown handles are ignored.
    fn unregister(&self, handle: RegistrationHandle);
}

impl<R: NotificationRegistry + ?Sized> NotificationRegistry for Arc<R> {
    fn register(
        &self,
        uri: &ResourceUri,
        notify_for_descendants: bool,
        callback: ChangeCallback,
    ) -> Result<RegistrationHandle> {
        (**self).register(uri, notify_for_descendants, callback)
    }

    fn unregister(&self, handle: RegistrationHandle) {
        (**self).unregister(handle)
    }
}
