//! Scalar column types.
//!
//! The type model the DDL parser resolves column definitions into. A column's
//! declared maximum length (for STRING and BYTES) is a column property, not
//! part of the type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    Int64,
    Float64,
    Bool,
    String,
    Bytes,
    Date,
    Timestamp,
    Array(Box<ScalarType>),
}

impl ScalarType {
    /// SQL spelling of the type, without any length clause.
    pub fn sql_name(&self) -> String {
        match self {
            ScalarType::Int64 => "INT64".to_string(),
            ScalarType::Float64 => "FLOAT64".to_string(),
            ScalarType::Bool => "BOOL".to_string(),
            ScalarType::String => "STRING".to_string(),
            ScalarType::Bytes => "BYTES".to_string(),
            ScalarType::Date => "DATE".to_string(),
            ScalarType::Timestamp => "TIMESTAMP".to_string(),
            ScalarType::Array(element) => format!("ARRAY<{}>", element.sql_name()),
        }
    }

    /// Whether a declared maximum length applies to this type.
    pub fn is_sized(&self) -> bool {
        match self {
            ScalarType::String | ScalarType::Bytes => true,
            ScalarType::Array(element) => element.is_sized(),
            _ => false,
        }
    }

    /// Whether a column of this type may be redeclared as `other`.
    ///
    /// A column's base type is fixed, except that STRING and BYTES may be
    /// converted into each other. Array columns follow the element rule.
    pub fn base_compatible(&self, other: &ScalarType) -> bool {
        match (self, other) {
            (ScalarType::String, ScalarType::Bytes) | (ScalarType::Bytes, ScalarType::String) => {
                true
            }
            (ScalarType::Array(a), ScalarType::Array(b)) => a.base_compatible(b),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_name())
    }
}
