//! Brook Testing - fixtures for exercising live queries.
//!
//! - `InMemoryProvider`: a key/value table that notifies observers on every
//!   write
//! - `Employee`, `employees_query`, `NullQuery`: canned queries
//! - `CountingQuery` / `CursorProbe`: observe how a cursor was used
//! - `CursorAssert`: row-by-row assertions on a query result

mod cursor;
mod employee;
mod provider;

pub use cursor::{CountingCursor, CountingQuery, CursorAssert, CursorProbe};
pub use employee::{employees_query, Employee, EmployeesQuery, NullQuery, MAPPER};
pub use provider::{InMemoryProvider, KEY, VALUE};
