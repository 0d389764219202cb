//! The global namespace of schema-visible names.
//!
//! Tables and indexes share a single namespace; foreign keys have their own.
//! Collisions are detected case-insensitively. Names claimed during a batch
//! are never released, matching the one-writer batch model: a name freed by
//! a DROP becomes available again only in the next batch.

use crate::graph::{NameKind, NameNamespace};
use spandb_commons::{limits, Result, SchemaError};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct GlobalSchemaNames {
    names: HashSet<(NameNamespace, String)>,
}

impl GlobalSchemaNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for `kind`, failing on a collision within the kind's
    /// shared namespace.
    pub fn add_name(&mut self, kind: NameKind, name: &str) -> Result<()> {
        let key = (kind.namespace(), name.to_ascii_lowercase());
        if !self.names.insert(key) {
            return Err(SchemaError::DuplicateSchemaName(name.to_string()));
        }
        Ok(())
    }

    pub fn contains(&self, kind: NameKind, name: &str) -> bool {
        self.names
            .contains(&(kind.namespace(), name.to_ascii_lowercase()))
    }

    /// Generates and claims a fresh synthetic foreign key name of the form
    /// `FK_<referencing>_<referenced>_<n>`, truncated to the identifier
    /// length limit. The suffix is chosen deterministically.
    pub fn generate_foreign_key_name(
        &mut self,
        referencing_table: &str,
        referenced_table: &str,
    ) -> Result<String> {
        let mut sequence: u64 = 1;
        loop {
            let suffix = format!("_{}", sequence);
            let mut base = format!("FK_{}_{}", referencing_table, referenced_table);
            let max_base = limits::MAX_SCHEMA_IDENTIFIER_LENGTH - suffix.len();
            if base.len() > max_base {
                base.truncate(max_base);
            }
            let candidate = format!("{}{}", base, suffix);
            if !self.contains(NameKind::ForeignKey, &candidate) {
                self.add_name(NameKind::ForeignKey, &candidate)?;
                return Ok(candidate);
            }
            sequence += 1;
        }
    }
}
