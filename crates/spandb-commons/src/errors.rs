//! Shared error types for spandb.
//!
//! Every error a schema change can produce is a variant of [`SchemaError`].
//! The taxonomy mirrors how errors propagate through a batch: parse and
//! not-found errors abort the statement (and with it the batch), validation
//! errors surface from canonicalization, and backfill errors stop the
//! deferred-action phase without undoing earlier statements.

use thiserror::Error;

/// Result type alias using [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Error type for schema change operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    // --- Parse ---
    #[error("Error parsing DDL statement: {0}")]
    DdlParse(String),

    #[error("Empty DDL statement.")]
    EmptyDdlStatement,

    #[error("Invalid schema name: {0}")]
    InvalidSchemaName(String),

    // --- Not found ---
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Table {table} does not have a constraint named {constraint}")]
    ConstraintNotFound { constraint: String, table: String },

    #[error("Index {index} is interleaved in table {table}, which does not exist")]
    IndexInterleaveTableNotFound { index: String, table: String },

    #[error("Column {column} referenced by foreign key {foreign_key} not found in table {table}")]
    ForeignKeyColumnNotFound {
        column: String,
        table: String,
        foreign_key: String,
    },

    #[error("Index {index} references non-existent column {column}")]
    IndexRefsNonExistentColumn { index: String, column: String },

    #[error("{object_kind} {object_name} references non-existent key column {column}")]
    NonExistentKeyColumn {
        object_kind: String,
        object_name: String,
        column: String,
    },

    // --- Duplicate name ---
    #[error("Duplicate name in schema: {0}")]
    DuplicateSchemaName(String),

    // --- Limits ---
    #[error("Cannot create table {table}: too many tables per database (limit: {limit})")]
    TooManyTablesPerDatabase { table: String, limit: usize },

    #[error("Cannot create index {index}: too many indexes per database (limit: {limit})")]
    TooManyIndicesPerDatabase { index: String, limit: usize },

    // --- Semantic validation ---
    #[error("Table {0} does not have a primary key")]
    MissingPrimaryKey(String),

    #[error("Cannot change type of column {column} from {from} to {to}")]
    CannotChangeColumnType {
        column: String,
        from: String,
        to: String,
    },

    #[error("Invalid length {length} for column {column}: must be between 1 and {max}")]
    InvalidColumnLength {
        column: String,
        length: i64,
        max: i64,
    },

    #[error("Option allow_commit_timestamp is not valid on column {column} of type {column_type}")]
    InvalidCommitTimestampOption {
        column: String,
        column_type: String,
    },

    #[error(
        "Foreign key {foreign_key} column lists differ in length: \
         {referencing} referencing vs {referenced} referenced"
    )]
    ForeignKeyColumnCount {
        foreign_key: String,
        referencing: usize,
        referenced: usize,
    },

    #[error(
        "Foreign key {foreign_key}: referencing column {referencing_column} and \
         referenced column {referenced_column} have incompatible types"
    )]
    ForeignKeyColumnTypeMismatch {
        foreign_key: String,
        referencing_column: String,
        referenced_column: String,
    },

    #[error("Cannot drop {dropped}: {dependent} depends on it")]
    CannotDrop { dropped: String, dependent: String },

    #[error("Schema validation failed: {0}")]
    Validation(String),

    // --- Internal ---
    #[error("Internal error: {0}")]
    Internal(String),

    // --- Backfill / storage ---
    #[error("Failed to backfill index {index}: {message}")]
    Backfill { index: String, message: String },

    #[error("Unique index {index} violation on duplicate key: {key}")]
    UniqueIndexViolation { index: String, key: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl SchemaError {
    /// Creates a DdlParse error with a message.
    pub fn ddl_parse(msg: impl Into<String>) -> Self {
        Self::DdlParse(msg.into())
    }

    /// Creates a Validation error with a message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates an Internal error with a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Creates a Storage error with a message.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
