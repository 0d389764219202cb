//! Schema identifier validation.
//!
//! Names of tables, columns, indexes and constraints must start with a
//! letter, contain only letters, digits and underscores, and stay within the
//! configured identifier length.

use crate::errors::{Result, SchemaError};
use crate::limits;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("identifier regex"));

/// Validates a user-supplied schema identifier.
pub fn validate_schema_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SchemaError::InvalidSchemaName(
            "identifier is empty".to_string(),
        ));
    }
    if name.len() > limits::MAX_SCHEMA_IDENTIFIER_LENGTH {
        return Err(SchemaError::InvalidSchemaName(format!(
            "{} exceeds the maximum identifier length of {}",
            name,
            limits::MAX_SCHEMA_IDENTIFIER_LENGTH
        )));
    }
    if !IDENTIFIER_RE.is_match(name) {
        return Err(SchemaError::InvalidSchemaName(format!(
            "{} must start with a letter and contain only letters, digits and underscores",
            name
        )));
    }
    Ok(())
}
