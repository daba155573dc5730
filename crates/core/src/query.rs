//! Re-runnable queries.
//!
//! A `QueryDescriptor` captures everything needed to run a query against a
//! `DataSource`: target resource plus projection, selection and ordering.
//! It is immutable; the same descriptor is executed again on every change.

use crate::cursor::BoxCursor;
use crate::uri::ResourceUri;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

/// Immutable description of a query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    uri: ResourceUri,
    projection: Option<Vec<String>>,
    selection: Option<String>,
    selection_args: Vec<String>,
    sort_order: Option<String>,
}

impl QueryDescriptor {
    /// Describes a query returning every column of every row at `uri`.
    pub fn new(uri: ResourceUri) -> Self {
        Self {
            uri,
            projection: None,
            selection: None,
            selection_args: Vec::new(),
            sort_order: None,
        }
    }

    /// Starts building a descriptor for `uri`.
    pub fn builder(uri: ResourceUri) -> QueryDescriptorBuilder {
        QueryDescriptorBuilder {
            descriptor: Self::new(uri),
        }
    }

    /// Target resource.
    #[inline]
    pub fn uri(&self) -> &ResourceUri {
        &self.uri
    }

    /// Requested columns; `None` means all columns.
    #[inline]
    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    /// Filter clause understood by the data source.
    #[inline]
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Positional arguments bound into the selection.
    #[inline]
    pub fn selection_args(&self) -> &[String] {
        &self.selection_args
    }

    /// Ordering clause understood by the data source.
    #[inline]
    pub fn sort_order(&self) -> Option<&str> {
        self.sort_order.as_deref()
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)?;
        if let Some(projection) = &self.projection {
            write!(f, " [{}]", projection.join(", "))?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " where {}", selection)?;
            if !self.selection_args.is_empty() {
                write!(f, " ({})", self.selection_args.join(", "))?;
            }
        }
        if let Some(sort_order) = &self.sort_order {
            write!(f, " order by {}", sort_order)?;
        }
        Ok(())
    }
}

/// Builder for `QueryDescriptor`.
pub struct QueryDescriptorBuilder {
    descriptor: QueryDescriptor,
}

impl QueryDescriptorBuilder {
    /// Restricts the result to the given columns.
    pub fn projection<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the filter clause.
    pub fn selection(mut self, selection: impl Into<String>) -> Self {
        self.descriptor.selection = Some(selection.into());
        self
    }

    /// Sets the selection arguments.
    pub fn selection_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.selection_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the ordering clause.
    pub fn sort_order(mut self, sort_order: impl Into<String>) -> Self {
        self.descriptor.sort_order = Some(sort_order.into());
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> QueryDescriptor {
        self.descriptor
    }
}

/// Something that can be executed to obtain a cursor, any number of times.
pub trait Query: Send + Sync {
    /// Executes the query.
    ///
    /// Returns `None` when the data source declined to answer this time. That
    /// is not an error and is distinct from an empty cursor. The caller owns
    /// the returned cursor and must close it.
    fn run(&self) -> Option<BoxCursor>;
}

impl<Q: Query + ?Sized> Query for Arc<Q> {
    fn run(&self) -> Option<BoxCursor> {
        (**self).run()
    }
}

impl<Q: Query + ?Sized> Query for Box<Q> {
    fn run(&self) -> Option<BoxCursor> {
        (**self).run()
    }
}

/// The external store that answers queries.
pub trait DataSource: Send + Sync {
    /// Executes `descriptor`. `None` means the store declined the request.
    fn query(&self, descriptor: &QueryDescriptor) -> Option<BoxCursor>;
}

/// A descriptor bound to the data source that executes it.
///
/// Cheap to clone; this is the value a change stream re-emits on every
/// notification.
#[derive(Clone)]
pub struct ResolverQuery {
    descriptor: Arc<QueryDescriptor>,
    source: Arc<dyn DataSource>,
}

impl ResolverQuery {
    /// Binds `descriptor` to `source`.
    pub fn new(source: Arc<dyn DataSource>, descriptor: QueryDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            source,
        }
    }

    /// Returns the bound descriptor.
    #[inline]
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }
}

impl Query for ResolverQuery {
    fn run(&self) -> Option<BoxCursor> {
        self.source.query(&self.descriptor)
    }
}

impl PartialEq for ResolverQuery {
    fn eq(&self, other: &Self) -> bool {
        let same_source = core::ptr::eq(
            Arc::as_ptr(&self.source) as *const (),
            Arc::as_ptr(&other.source) as *const (),
        );
        same_source && self.descriptor == other.descriptor
    }
}

impl Eq for ResolverQuery {}

impl fmt::Debug for ResolverQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverQuery")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
