//! Employee fixture.

use brook_core::{BoxCursor, MatrixCursor, Query, Result, RowCursor, Value};
use std::sync::Arc;

const COLUMN_USERNAME: &str = "username";
const COLUMN_NAME: &str = "name";

/// A row of the employees fixture.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Employee {
    pub username: String,
    pub name: String,
}

impl Employee {
    pub fn new(username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
        }
    }

    /// Maps the current row, looking columns up by name.
    pub fn from_row(cursor: &dyn RowCursor) -> Result<Self> {
        Ok(Self {
            username: cursor.get_string(cursor.column_index_or_err(COLUMN_USERNAME)?)?,
            name: cursor.get_string(cursor.column_index_or_err(COLUMN_NAME)?)?,
        })
    }
}

/// Row mapper for [`Employee`].
pub const MAPPER: fn(&dyn RowCursor) -> Result<Employee> = Employee::from_row;

/// A query over a fixed list of employees.
#[derive(Clone, Debug)]
pub struct EmployeesQuery {
    rows: Arc<Vec<Employee>>,
}

impl EmployeesQuery {
    pub fn rows(&self) -> &[Employee] {
        &self.rows
    }
}

impl Query for EmployeesQuery {
    fn run(&self) -> Option<BoxCursor> {
        let mut cursor = MatrixCursor::new([COLUMN_USERNAME, COLUMN_NAME]);
        for employee in self.rows.iter() {
            cursor.add_row(vec![
                Value::from(employee.username.as_str()),
                Value::from(employee.name.as_str()),
            ]);
        }
        Some(Box::new(cursor))
    }
}

/// Builds an employees query from `username, name` pairs.
///
/// A trailing unpaired value is ignored.
///
/// ```
/// use brook_testing::employees_query;
///
/// let query = employees_query(&["alice", "Alice Allison", "bob", "Bob Bobberson"]);
/// assert_eq!(query.rows().len(), 2);
/// ```
pub fn employees_query(values: &[&str]) -> EmployeesQuery {
    let rows = values
        .chunks_exact(2)
        .map(|pair| Employee::new(pair[0], pair[1]))
        .collect();
    EmployeesQuery {
        rows: Arc::new(rows),
    }
}

/// A query whose source always declines to answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullQuery;

impl Query for NullQuery {
    fn run(&self) -> Option<BoxCursor> {
        None
    }
}
