//! Shared leaf types for the spandb schema subsystem.
//!
//! This crate holds the types every other spandb crate builds on:
//! - [`errors`]: the `SchemaError` taxonomy and `Result` alias
//! - [`limits`]: configured schema limits
//! - [`ids`]: process-unique table and column identifiers
//! - [`datatypes`]: the scalar column type model
//! - [`value`]: row values passed across the storage boundary
//! - [`validation`]: schema identifier validation

pub mod datatypes;
pub mod errors;
pub mod ids;
pub mod limits;
pub mod validation;
pub mod value;

pub use datatypes::ScalarType;
pub use errors::{Result, SchemaError};
pub use ids::{ColumnId, ColumnIdGenerator, TableId, TableIdGenerator};
pub use value::Value;
