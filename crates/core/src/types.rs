//! Column storage classes.
//!
//! Cursors expose loosely typed columns; `ColumnType` names the storage class
//! of a single cell so mismatches can be reported precisely.

use core::fmt;

/// Storage class of a cursor cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// SQL NULL
    Null,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point number
    Real,
    /// UTF-8 text
    Text,
    /// Opaque binary data
    Blob,
}

impl ColumnType {
    /// Returns the lowercase name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Null => "null",
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Blob => "blob",
        }
    }

    /// Returns whether values of this class are numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Real)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_column_type_display() {
        assert_eq!(ColumnType::Text.to_string(), "text");
        assert_eq!(ColumnType::Null.to_string(), "null");
    }

    #[test]
    fn test_numeric() {
        assert!(ColumnType::Integer.is_numeric());
        assert!(ColumnType::Real.is_numeric());
        assert!(!ColumnType::Text.is_numeric());
        assert!(!ColumnType::Blob.is_numeric());
        assert!(!ColumnType::Null.is_numeric());
    }
}
