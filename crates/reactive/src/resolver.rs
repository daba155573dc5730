//! Reactive resolver facade.

use crate::bridge::{observe, QueryStream};
use crate::config::ResolverConfig;
use crate::rows::{as_rows, RowStream};
use crate::worker::WorkerContext;
use brook_core::{DataSource, NotificationRegistry, QueryDescriptor, ResolverQuery, Result, RowCursor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Binds a data source to the registry that reports its changes.
///
/// ```ignore
/// let resolver = ReactiveResolver::new(provider.clone(), provider.registry());
/// let mut names = resolver
///     .observe_query(QueryDescriptor::new(uri), false)
///     .map_to_list(|row| row.get_string(1));
///
/// while let Some(list) = names.next().await {
///     println!("{:?}", list?);
/// }
/// ```
#[derive(Clone)]
pub struct ReactiveResolver {
    source: Arc<dyn DataSource>,
    registry: Arc<dyn NotificationRegistry>,
    worker: Option<WorkerContext>,
    config: ResolverConfig,
    /// Shared with every stream created here so toggling applies to live
    /// subscriptions too.
    logging: Arc<AtomicBool>,
}

impl ReactiveResolver {
    /// Creates a resolver with the default configuration.
    pub fn new(source: Arc<dyn DataSource>, registry: Arc<dyn NotificationRegistry>) -> Self {
        Self {
            source,
            registry,
            worker: None,
            config: ResolverConfig::default(),
            logging: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.logging.store(config.logging, Ordering::Relaxed);
        self.config = config;
        self
    }

    /// Sets the worker used by `rows`.
    ///
    /// Streams from `observe_query` carry no worker; pass
    /// `resolver.worker().cloned()` to the operator's `.on(..)` to run their
    /// queries here too.
    pub fn with_worker(mut self, worker: WorkerContext) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> ResolverConfig {
        ResolverConfig {
            logging: self.is_logging_enabled(),
            ..self.config
        }
    }

    /// Returns the configured worker, if any.
    ///
    /// ```ignore
    /// let names = resolver
    ///     .observe_query(descriptor, false)
    ///     .map_to_list(|row| row.get_string(0))
    ///     .on(resolver.worker().cloned().unwrap_or_else(WorkerContext::current));
    /// ```
    pub fn worker(&self) -> Option<&WorkerContext> {
        self.worker.as_ref()
    }

    /// Turns query logging on or off for this resolver and its live streams.
    pub fn set_logging_enabled(&self, enabled: bool) {
        self.logging.store(enabled, Ordering::Relaxed);
        debug!(enabled, "query logging toggled");
    }

    /// Returns true while query logging is on.
    pub fn is_logging_enabled(&self) -> bool {
        self.logging.load(Ordering::Relaxed)
    }

    /// Binds `descriptor` to this resolver's source.
    pub fn query(&self, descriptor: QueryDescriptor) -> ResolverQuery {
        ResolverQuery::new(self.source.clone(), descriptor)
    }

    /// Observes `descriptor`'s resource, emitting the bound query initially and
    /// after every change.
    pub fn observe_query(
        &self,
        descriptor: QueryDescriptor,
        notify_for_descendants: bool,
    ) -> QueryStream<ResolverQuery> {
        let uri = descriptor.uri().clone();
        observe(
            self.registry.clone(),
            uri,
            notify_for_descendants,
            self.query(descriptor),
        )
        .with_logging(self.logging.clone())
    }

    /// `observe_query` with the configured descendant matching.
    pub fn observe_query_default(&self, descriptor: QueryDescriptor) -> QueryStream<ResolverQuery> {
        self.observe_query(descriptor, self.config.notify_for_descendants)
    }

    /// Runs `descriptor` once and streams its mapped rows.
    pub fn rows<T, F>(&self, descriptor: QueryDescriptor, mapper: F) -> RowStream<ResolverQuery, T>
    where
        T: Send + 'static,
        F: Fn(&dyn RowCursor) -> Result<T> + Send + Sync + 'static,
    {
        let stream = as_rows(self.query(descriptor), mapper);
        match &self.worker {
            Some(worker) => stream.on(worker.clone()),
            None => stream,
        }
    }
}
