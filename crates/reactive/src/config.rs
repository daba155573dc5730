//! Resolver configuration.

/// Settings for a [`ReactiveResolver`](crate::ReactiveResolver).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ResolverConfig {
    /// Log subscriptions, emissions and unsubscriptions at `debug` level.
    pub logging: bool,
    /// Descendant matching used by `observe_query_default`.
    pub notify_for_descendants: bool,
}

impl ResolverConfig {
    /// Creates the default configuration: no logging, exact-match observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets query logging.
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the default descendant matching.
    pub fn with_notify_for_descendants(mut self, notify_for_descendants: bool) -> Self {
        self.notify_for_descendants = notify_for_descendants;
        self
    }
}
