//! Configured schema limits.
//!
//! Centralized limits consulted during schema changes. Values follow the
//! published Cloud Spanner limits.

/// Maximum number of tables in a database.
pub const MAX_TABLES_PER_DATABASE: usize = 2560;

/// Maximum number of indexes in a database.
pub const MAX_INDEXES_PER_DATABASE: usize = 4096;

/// Maximum number of columns in a table.
pub const MAX_COLUMNS_PER_TABLE: usize = 1024;

/// Maximum length of a schema identifier (table, column, index or
/// constraint name).
pub const MAX_SCHEMA_IDENTIFIER_LENGTH: usize = 128;

/// Maximum declared length of a STRING column, in characters.
pub const MAX_STRING_COLUMN_LENGTH: i64 = 2_621_440;

/// Maximum declared length of a BYTES column, in bytes.
pub const MAX_BYTES_COLUMN_LENGTH: i64 = 10_485_760;
