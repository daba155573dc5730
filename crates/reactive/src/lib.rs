//! Brook Reactive - live query streams over change-notifying data sources.
//!
//! This crate turns a re-runnable query plus a change notification source into
//! a stream of fresh results. When the observed resource changes, the query is
//! run again on a worker and the mapped result is pushed downstream.
//!
//! # Core Concepts
//!
//! - `observe` / `QueryStream`: emits the query once on subscribe and again
//!   after every (conflated) change notification
//! - `QueryStreamExt`: cardinality operators `map_to_one`,
//!   `map_to_one_or_default`, `map_to_optional` and `map_to_list`
//! - `as_rows` / `RowStream`: one item per row of a single execution
//! - `ObserverRegistry`: in-process change routing by resource URI
//! - `ReactiveResolver`: binds a data source, a registry and a configuration
//!
//! # Example
//!
//! ```ignore
//! use brook_core::QueryDescriptor;
//! use brook_reactive::{QueryStreamExt, ReactiveResolver};
//! use futures::StreamExt;
//!
//! let resolver = ReactiveResolver::new(source, registry);
//! let mut employee = resolver
//!     .observe_query(QueryDescriptor::new(uri), false)
//!     .map_to_one(|row| row.get_string(0));
//!
//! // Initial result, then one per change.
//! while let Some(name) = employee.next().await {
//!     println!("{}", name?);
//! }
//! ```
//!
//! Dropping a stream unsubscribes and closes any cursor still open on the
//! worker.

pub mod bridge;
pub mod config;
pub mod mapper;
pub mod notify;
pub mod operators;
pub mod resolver;
pub mod rows;
pub mod trigger;
pub mod worker;

#[cfg(test)]
mod fixtures;

pub use bridge::{observe, QueryStream};
pub use config::ResolverConfig;
pub use mapper::RowMapper;
pub use notify::ObserverRegistry;
pub use operators::{
    collect_list, execute_one, MapQuery, MapToList, MapToOne, MapToOptional, QueryStreamExt,
};
pub use resolver::ReactiveResolver;
pub use rows::{as_rows, QueryExt, RowStream};
pub use worker::{Cancellation, WorkerContext};
