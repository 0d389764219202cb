//! Process-unique table and column identifiers.
//!
//! Schema objects keep their identity across schema changes through ids
//! handed out by these generators. Ids are monotone and never reused for the
//! lifetime of the process; a failed schema change does not return the ids it
//! consumed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(String);

impl TableId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generator for [`TableId`]s.
///
/// The name hint is embedded in the id for debuggability; uniqueness comes
/// from the sequence number alone.
#[derive(Debug, Default)]
pub struct TableIdGenerator {
    next: AtomicU64,
}

impl TableIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, name_hint: &str) -> TableId {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        TableId(format!("{}_{}", name_hint, seq))
    }
}

/// Generator for [`ColumnId`]s.
#[derive(Debug, Default)]
pub struct ColumnIdGenerator {
    next: AtomicU64,
}

impl ColumnIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, name_hint: &str) -> ColumnId {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        ColumnId(format!("{}_{}", name_hint, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids_are_unique() {
        let generator = TableIdGenerator::new();
        let a = generator.next_id("Users");
        let b = generator.next_id("Users");
        assert_ne!(a, b);
    }

    #[test]
    fn test_table_id_embeds_hint() {
        let generator = TableIdGenerator::new();
        let id = generator.next_id("Albums");
        assert!(id.as_str().starts_with("Albums_"));
    }

    #[test]
    fn test_column_ids_are_unique_across_hints() {
        let generator = ColumnIdGenerator::new();
        let a = generator.next_id("Users.Id");
        let b = generator.next_id("Users.Id");
        let c = generator.next_id("Albums.Id");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }
}
