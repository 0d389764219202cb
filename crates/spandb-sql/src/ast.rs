//! DDL statement tree.
//!
//! The parser produces these values; the schema updater consumes them. The
//! tree is purely syntactic: name resolution and semantic checks happen in
//! the updater and at canonicalization.

use serde::{Deserialize, Serialize};
use spandb_commons::ScalarType;

/// A single parsed DDL statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DdlStatement {
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    AlterTable(AlterTable),
    DropTable(DropTable),
    DropIndex(DropIndex),
}

/// Column definition, as written in CREATE TABLE or ALTER TABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub column_name: String,
    pub column_type: ScalarType,
    /// NOT NULL was written.
    pub not_null: bool,
    /// Declared maximum length; `None` covers both `MAX` and sizeless types.
    pub max_length: Option<i64>,
    /// The OPTIONS clause, if one was written. An absent clause leaves a
    /// column's previous options untouched on ALTER COLUMN.
    pub options: Option<ColumnOptions>,
}

/// Recognized column options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOptions {
    /// `allow_commit_timestamp = true | false | null`; `None` is null.
    pub allow_commit_timestamp: Option<bool>,
}

/// One part of a PRIMARY KEY clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPart {
    pub column_name: String,
    pub descending: bool,
}

/// ON DELETE action of an interleave clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnDeleteAction {
    NoAction,
    Cascade,
}

/// INTERLEAVE clause of CREATE TABLE or CREATE INDEX.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterleaveClause {
    pub parent: String,
    /// Absent means the default (NO ACTION for tables; index data tables are
    /// always cascading).
    pub on_delete: Option<OnDeleteAction>,
}

/// FOREIGN KEY constraint clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyClause {
    /// Explicit `CONSTRAINT name`; a synthetic name is generated otherwise.
    pub constraint_name: Option<String>,
    pub referencing_columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// Table-level constraint of CREATE TABLE, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableConstraint {
    PrimaryKey(Vec<KeyPart>),
    Interleave(InterleaveClause),
    ForeignKey(ForeignKeyClause),
}

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

/// CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndex {
    pub index_name: String,
    pub table_name: String,
    pub unique: bool,
    pub null_filtered: bool,
    pub key_parts: Vec<KeyPart>,
    pub storing: Vec<String>,
    pub interleave: Option<InterleaveClause>,
}

/// ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTable {
    pub table_name: String,
    pub op: AlterTableOp,
}

/// The operation of an ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterTableOp {
    AddColumn(ColumnDef),
    AlterColumn { column_name: String, def: ColumnDef },
    DropColumn { column_name: String },
    SetOnDelete(OnDeleteAction),
    AddForeignKey(ForeignKeyClause),
    DropConstraint { constraint_name: String },
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub table_name: String,
}

/// DROP INDEX statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndex {
    pub index_name: String,
}
