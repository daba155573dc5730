//! Brook Core - cursor, query and notification contracts for live queries.
//!
//! This crate provides the leaf types the reactive layer is built on:
//!
//! - `RowCursor`: forward-only accessor over result rows, with `CursorScope`
//!   guaranteeing the cursor is closed exactly once
//! - `MatrixCursor`: an in-memory cursor
//! - `QueryDescriptor` / `Query` / `DataSource`: re-runnable queries and the
//!   store that answers them
//! - `NotificationRegistry`: the external change-notification contract
//! - `Value`, `ResourceUri`, `Error`
//!
//! # Example
//!
//! ```rust
//! use brook_core::{CursorScope, MatrixCursor, RowCursor, Value};
//!
//! let cursor = MatrixCursor::new(["username", "name"])
//!     .with_row(vec![Value::from("alice"), Value::from("Alice Allison")]);
//!
//! let mut scope = CursorScope::new(cursor);
//! assert!(scope.advance());
//! let name = scope.get_string(scope.column_index_or_err("name").unwrap()).unwrap();
//! assert_eq!(name, "Alice Allison");
//! // The cursor is closed when `scope` goes out of scope.
//! ```

#![no_std]

extern crate alloc;

mod cursor;
mod error;
mod matrix;
mod notify;
mod query;
mod types;
mod uri;
mod value;

pub use cursor::{BoxCursor, CursorScope, RowCursor};
pub use error::{Error, Result};
pub use matrix::MatrixCursor;
pub use notify::{ChangeCallback, NotificationRegistry, RegistrationHandle};
pub use query::{DataSource, Query, QueryDescriptor, QueryDescriptorBuilder, ResolverQuery};
pub use types::ColumnType;
pub use uri::ResourceUri;
pub use value::Value;
