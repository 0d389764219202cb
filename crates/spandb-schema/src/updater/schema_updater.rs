//! Application of DDL statement batches to schema snapshots.
//!
//! [`SchemaUpdater`] drives a batch: each statement is parsed, applied to a
//! fresh graph editor rooted at the latest snapshot, and canonicalized into
//! the next snapshot. Deferred actions (index backfills) run only after
//! every statement has been structurally applied.
//!
//! Semantic checks beyond the existence checks needed to wire the graph
//! belong in the nodes' `validate`/`validate_update` implementations, so
//! they run for both database creation and update.

use crate::catalog::{
    Column, ColumnBuilder, ColumnDefinitionModifier, ForeignKeyBuilder, IndexBuilder,
    KeyColumnBuilder, OnDeleteAction, Schema, Table, TableBuilder, INDEX_DATA_TABLE_PREFIX,
};
use crate::graph::{NameKind, NodeId, SchemaGraphEditor};
use crate::storage::Storage;
use crate::updater::{GlobalSchemaNames, SchemaChangeAction, SchemaValidationContext};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use spandb_commons::{limits, ColumnIdGenerator, Result, SchemaError, TableIdGenerator};
use spandb_sql::ast::{
    self, AlterTable, AlterTableOp, ColumnDef, CreateIndex, CreateTable, DdlStatement, DropIndex,
    DropTable, ForeignKeyClause, InterleaveClause, KeyPart, TableConstraint,
};
use spandb_sql::parse_ddl_statement;
use std::sync::Arc;

/// Everything a schema change needs from its environment.
pub struct SchemaChangeContext {
    pub storage: Arc<dyn Storage>,
    pub table_id_generator: Arc<TableIdGenerator>,
    pub column_id_generator: Arc<ColumnIdGenerator>,
    /// The timestamp at which changes are applied and validated against the
    /// database contents.
    pub schema_change_timestamp: DateTime<Utc>,
}

/// Outcome of a DDL batch whose structural apply succeeded.
pub struct SchemaChangeResult {
    /// Number of leading statements whose deferred actions all succeeded.
    pub num_successful_statements: usize,
    /// Snapshot after the last successful statement; `None` when no
    /// statement reached action success.
    pub updated_schema: Option<Arc<Schema>>,
    /// `Ok` or the first deferred-action failure.
    pub backfill_status: Result<()>,
}

/// Applies batches of DDL statements to schema snapshots.
#[derive(Default)]
pub struct SchemaUpdater {
    pending_work: Vec<SchemaValidationContext>,
    intermediate_schemas: Vec<Arc<Schema>>,
}

impl SchemaUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical empty schema.
    pub fn empty_schema() -> Arc<Schema> {
        Schema::empty()
    }

    /// Applies `statements` structurally, without running deferred actions.
    /// Returns the final snapshot, or `None` for an empty batch.
    pub fn validate_schema_from_ddl(
        &mut self,
        statements: &[String],
        context: &SchemaChangeContext,
        existing_schema: Option<Arc<Schema>>,
    ) -> Result<Option<Arc<Schema>>> {
        let existing = existing_schema.unwrap_or_else(Schema::empty);
        let mut updater = SchemaUpdaterImpl::build(context, existing)?;
        self.pending_work = updater.apply_ddl_statements(statements)?;
        self.intermediate_schemas = updater.into_intermediate_schemas();

        let new_schema = self.intermediate_schemas.last().cloned();
        self.pending_work.clear();
        self.intermediate_schemas.clear();
        Ok(new_schema)
    }

    /// Applies `statements` to `existing_schema` and runs the deferred
    /// actions of each statement in order.
    ///
    /// A structural error aborts the whole batch with an error and leaves
    /// the caller's snapshot untouched. A deferred-action failure stops the
    /// action phase: statements before the failing one stay effective, and
    /// the returned snapshot is the one after the last successful statement.
    /// Row-level effects of already-run actions are not rolled back.
    pub fn update_schema_from_ddl(
        &mut self,
        existing_schema: Arc<Schema>,
        statements: &[String],
        context: &SchemaChangeContext,
    ) -> Result<SchemaChangeResult> {
        let mut updater = SchemaUpdaterImpl::build(context, existing_schema)?;
        self.pending_work = updater.apply_ddl_statements(statements)?;
        self.intermediate_schemas = updater.into_intermediate_schemas();

        let mut num_successful = 0;
        let backfill_status = self.run_pending_actions(&mut num_successful);
        let updated_schema = if num_successful > 0 {
            Some(self.intermediate_schemas[num_successful - 1].clone())
        } else {
            None
        };
        self.pending_work.clear();
        self.intermediate_schemas.clear();
        Ok(SchemaChangeResult {
            num_successful_statements: num_successful,
            updated_schema,
            backfill_status,
        })
    }

    /// Creates a schema from scratch, failing if any deferred action fails.
    pub fn create_schema_from_ddl(
        &mut self,
        statements: &[String],
        context: &SchemaChangeContext,
    ) -> Result<Arc<Schema>> {
        let result = self.update_schema_from_ddl(Schema::empty(), statements, context)?;
        result.backfill_status?;
        Ok(result.updated_schema.unwrap_or_else(Schema::empty))
    }

    fn run_pending_actions(&self, num_successful: &mut usize) -> Result<()> {
        for pending_statement in &self.pending_work {
            pending_statement.run_schema_change_actions()?;
            *num_successful += 1;
        }
        Ok(())
    }
}

/// The referencing side of a foreign key under construction: either the
/// table being created by this statement, or an existing table.
enum ForeignKeyOwner<'a> {
    New(&'a mut TableBuilder),
    Existing(NodeId),
}

/// Per-batch application state: the latest snapshot, the per-statement graph
/// editor and validation context, and the global name registry.
struct SchemaUpdaterImpl<'a> {
    context: &'a SchemaChangeContext,
    latest_schema: Arc<Schema>,
    intermediate_schemas: Vec<Arc<Schema>>,
    statement_context: SchemaValidationContext,
    editor: SchemaGraphEditor,
    global_names: GlobalSchemaNames,
}

impl<'a> SchemaUpdaterImpl<'a> {
    /// Seeds the name registry from the existing snapshot's global names.
    fn build(context: &'a SchemaChangeContext, existing_schema: Arc<Schema>) -> Result<Self> {
        let mut global_names = GlobalSchemaNames::new();
        for node in existing_schema.graph().nodes_in_order() {
            if let Some(info) = node.schema_name_info() {
                if info.global {
                    global_names.add_name(info.kind, &info.name)?;
                }
            }
        }
        let editor = SchemaGraphEditor::new(existing_schema.graph());
        let statement_context = SchemaValidationContext::new(
            context.storage.clone(),
            context.schema_change_timestamp,
        );
        Ok(Self {
            context,
            latest_schema: existing_schema,
            intermediate_schemas: Vec::new(),
            statement_context,
            editor,
            global_names,
        })
    }

    fn into_intermediate_schemas(self) -> Vec<Arc<Schema>> {
        self.intermediate_schemas
    }

    /// Applies each statement in order against the latest snapshot. Every
    /// snapshot is retained so deferred actions can refer to the schema
    /// before and after their statement.
    fn apply_ddl_statements(
        &mut self,
        statements: &[String],
    ) -> Result<Vec<SchemaValidationContext>> {
        let mut pending_work = Vec::with_capacity(statements.len());
        for statement in statements {
            debug!("applying DDL statement: {}", statement);
            self.statement_context = SchemaValidationContext::new(
                self.context.storage.clone(),
                self.context.schema_change_timestamp,
            );
            self.editor = SchemaGraphEditor::new(self.latest_schema.graph());

            let new_schema = self.apply_ddl_statement(statement)?;

            let mut statement_context = std::mem::replace(
                &mut self.statement_context,
                SchemaValidationContext::new(
                    self.context.storage.clone(),
                    self.context.schema_change_timestamp,
                ),
            );
            statement_context.set_old_schema_snapshot(self.latest_schema.clone());
            statement_context.set_new_schema_snapshot(new_schema.clone());
            self.latest_schema = new_schema.clone();
            self.intermediate_schemas.push(new_schema);
            pending_work.push(statement_context);
        }
        Ok(pending_work)
    }

    /// Applies one statement and canonicalizes the result. Either the whole
    /// statement becomes visible in the returned snapshot, or none of it.
    fn apply_ddl_statement(&mut self, statement: &str) -> Result<Arc<Schema>> {
        if statement.trim().is_empty() {
            return Err(SchemaError::EmptyDdlStatement);
        }
        if self.editor.has_modifications() {
            return Err(SchemaError::internal(
                "graph editor carries modifications from a previous statement",
            ));
        }

        match &parse_ddl_statement(statement)? {
            DdlStatement::CreateTable(create_table) => self.create_table(create_table)?,
            DdlStatement::CreateIndex(create_index) => self.create_index(create_index)?,
            DdlStatement::AlterTable(alter_table) => self.alter_table(alter_table)?,
            DdlStatement::DropTable(drop_table) => self.drop_table(drop_table)?,
            DdlStatement::DropIndex(drop_index) => self.drop_index(drop_index)?,
        }

        let editor = std::mem::replace(
            &mut self.editor,
            SchemaGraphEditor::new(self.latest_schema.graph()),
        );
        let graph = editor.canonicalize()?;
        Ok(Arc::new(Schema::new(graph)))
    }

    /// Case-sensitive or -insensitive column lookup among `columns`,
    /// resolved through the working graph.
    fn find_column_in(
        &self,
        columns: &[NodeId],
        name: &str,
        case_sensitive: bool,
    ) -> Result<Option<NodeId>> {
        for &id in columns {
            let column = self.editor.working().column(id)?;
            let found = if case_sensitive {
                column.name() == name
            } else {
                column.name().eq_ignore_ascii_case(name)
            };
            if found {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn create_column(
        &mut self,
        ddl_column: &ColumnDef,
        table_name: &str,
        table_node: NodeId,
    ) -> Result<NodeId> {
        let id = self
            .context
            .column_id_generator
            .next_id(&format!("{}.{}", table_name, ddl_column.column_name));
        let mut builder = ColumnBuilder::new(
            id,
            &ddl_column.column_name,
            table_node,
            ddl_column.column_type.clone(),
        );
        set_column_definition(ddl_column, &mut builder);
        let column = builder.node_id();
        self.editor.add_node(builder.build())?;
        Ok(column)
    }

    /// Resolves one key part and inserts its KeyColumn node. References to
    /// columns in a primary key clause are case-sensitive.
    fn create_primary_key_column(
        &mut self,
        key_part: &KeyPart,
        table_columns: &[NodeId],
        owning_kind: &str,
        owning_name: &str,
    ) -> Result<NodeId> {
        let column = self
            .find_column_in(table_columns, &key_part.column_name, true)?
            .ok_or_else(|| SchemaError::NonExistentKeyColumn {
                object_kind: owning_kind.to_string(),
                object_name: owning_name.to_string(),
                column: key_part.column_name.clone(),
            })?;
        let mut builder = KeyColumnBuilder::new(column);
        builder.set_descending(key_part.descending);
        let key_column = builder.node_id();
        self.editor.add_node(builder.build())?;
        Ok(key_column)
    }

    fn create_primary_key_constraint(
        &mut self,
        key_parts: &[KeyPart],
        builder: &mut TableBuilder,
        owning_kind: &str,
        owning_name: &str,
    ) -> Result<()> {
        for key_part in key_parts {
            let columns = builder.get().columns().to_vec();
            let key_column =
                self.create_primary_key_column(key_part, &columns, owning_kind, owning_name)?;
            builder.add_key_column(key_column);
        }
        Ok(())
    }

    /// Wires an interleave: the parent gains the child within one edit, and
    /// the child's builder records the parent, so canonicalization sees both
    /// halves of the edge.
    fn create_interleave_constraint(
        &mut self,
        interleave: &InterleaveClause,
        builder: &mut TableBuilder,
        owning_index: Option<&str>,
    ) -> Result<()> {
        let parent = match self.latest_schema.find_table(&interleave.parent) {
            Some(parent) => parent.node_id(),
            None => {
                return Err(match owning_index {
                    Some(index) => SchemaError::IndexInterleaveTableNotFound {
                        index: index.to_string(),
                        table: interleave.parent.clone(),
                    },
                    None => SchemaError::TableNotFound(interleave.parent.clone()),
                });
            }
        };
        if builder.get().parent_table().is_some() {
            return Err(SchemaError::internal(format!(
                "table {} already has an interleave parent",
                builder.get().name()
            )));
        }

        let child = builder.node_id();
        self.editor.edit_node(parent, |_, parent_table: &mut Table| {
            parent_table.add_child_table(child);
            Ok(())
        })?;
        builder.set_parent_table(parent);
        builder.set_on_delete(translate_on_delete(
            interleave.on_delete.unwrap_or(ast::OnDeleteAction::NoAction),
        ));
        Ok(())
    }

    /// Builds a foreign key node and wires its four bidirectional edges.
    /// Only structural wiring happens here; column count and type rules run
    /// at canonicalization, and referential enforcement does not happen at
    /// all.
    fn create_foreign_key_constraint(
        &mut self,
        ddl_foreign_key: &ForeignKeyClause,
        mut owner: ForeignKeyOwner<'_>,
    ) -> Result<()> {
        warn!("foreign keys are recorded but not enforced against row data");
        let mut builder = ForeignKeyBuilder::new();
        let foreign_key = builder.node_id();

        let (referencing_node, referencing_name, referencing_columns) = match &mut owner {
            ForeignKeyOwner::New(table_builder) => {
                table_builder.add_foreign_key(foreign_key);
                (
                    table_builder.node_id(),
                    table_builder.get().name().to_string(),
                    table_builder.get().columns().to_vec(),
                )
            }
            ForeignKeyOwner::Existing(id) => {
                let id = *id;
                self.editor.edit_node(id, |_, table: &mut Table| {
                    table.add_foreign_key(foreign_key);
                    Ok(())
                })?;
                let table = self.editor.working().table(id)?;
                (id, table.name().to_string(), table.columns().to_vec())
            }
        };
        builder.set_referencing_table(referencing_node);

        // The referenced table is resolved case-sensitively; a miss can
        // still be a self-reference.
        let (referenced_node, referenced_name, referenced_columns) = match self
            .latest_schema
            .find_table_case_sensitive(&ddl_foreign_key.referenced_table)
        {
            Some(table) => (
                table.node_id(),
                table.name().to_string(),
                table.columns().to_vec(),
            ),
            None => {
                if ddl_foreign_key.referenced_table != referencing_name {
                    return Err(SchemaError::TableNotFound(
                        ddl_foreign_key.referenced_table.clone(),
                    ));
                }
                (
                    referencing_node,
                    referencing_name.clone(),
                    referencing_columns.clone(),
                )
            }
        };
        if referenced_node == referencing_node {
            match &mut owner {
                ForeignKeyOwner::New(table_builder) => {
                    table_builder.add_referencing_foreign_key(foreign_key);
                }
                ForeignKeyOwner::Existing(id) => {
                    self.editor.edit_node(*id, |_, table: &mut Table| {
                        table.add_referencing_foreign_key(foreign_key);
                        Ok(())
                    })?;
                }
            }
        } else {
            self.editor
                .edit_node(referenced_node, |_, table: &mut Table| {
                    table.add_referencing_foreign_key(foreign_key);
                    Ok(())
                })?;
        }
        builder.set_referenced_table(referenced_node);

        let foreign_key_name = match &ddl_foreign_key.constraint_name {
            Some(name) => {
                self.global_names.add_name(NameKind::ForeignKey, name)?;
                builder.set_constraint_name(name);
                name.clone()
            }
            None => {
                let generated = self
                    .global_names
                    .generate_foreign_key_name(&referencing_name, &referenced_name)?;
                builder.set_generated_name(&generated);
                generated
            }
        };

        // Foreign key column references are case-sensitive.
        for column_name in &ddl_foreign_key.referencing_columns {
            let column = self
                .find_column_in(&referencing_columns, column_name, true)?
                .ok_or_else(|| SchemaError::ForeignKeyColumnNotFound {
                    column: column_name.clone(),
                    table: referencing_name.clone(),
                    foreign_key: foreign_key_name.clone(),
                })?;
            builder.add_referencing_column(column);
        }
        for column_name in &ddl_foreign_key.referenced_columns {
            let column = self
                .find_column_in(&referenced_columns, column_name, true)?
                .ok_or_else(|| SchemaError::ForeignKeyColumnNotFound {
                    column: column_name.clone(),
                    table: referenced_name.clone(),
                    foreign_key: foreign_key_name.clone(),
                })?;
            builder.add_referenced_column(column);
        }

        self.editor.add_node(builder.build()?)
    }

    fn create_table(&mut self, ddl_table: &CreateTable) -> Result<()> {
        if self.latest_schema.table_count() >= limits::MAX_TABLES_PER_DATABASE {
            return Err(SchemaError::TooManyTablesPerDatabase {
                table: ddl_table.table_name.clone(),
                limit: limits::MAX_TABLES_PER_DATABASE,
            });
        }
        self.global_names
            .add_name(NameKind::Table, &ddl_table.table_name)?;

        let id = self
            .context
            .table_id_generator
            .next_id(&ddl_table.table_name);
        let mut builder = TableBuilder::new(id, &ddl_table.table_name);

        for ddl_column in &ddl_table.columns {
            let column =
                self.create_column(ddl_column, &ddl_table.table_name, builder.node_id())?;
            builder.add_column(column);
        }

        for constraint in &ddl_table.constraints {
            match constraint {
                TableConstraint::PrimaryKey(key_parts) => {
                    let name = builder.get().name().to_string();
                    self.create_primary_key_constraint(key_parts, &mut builder, "Table", &name)?;
                }
                TableConstraint::Interleave(interleave) => {
                    self.create_interleave_constraint(interleave, &mut builder, None)?;
                }
                TableConstraint::ForeignKey(foreign_key) => {
                    self.create_foreign_key_constraint(
                        foreign_key,
                        ForeignKeyOwner::New(&mut builder),
                    )?;
                }
            }
        }

        self.editor.add_node(builder.build())
    }

    /// Creates one column of an index data table as a projection of a column
    /// of the indexed table.
    fn create_index_data_table_column(
        &mut self,
        indexed_table_columns: &[NodeId],
        source_column_name: &str,
        data_table_name: &str,
        data_table_node: NodeId,
        index_name: &str,
        null_filtered_key_column: bool,
    ) -> Result<NodeId> {
        let source = self
            .find_column_in(indexed_table_columns, source_column_name, false)?
            .ok_or_else(|| SchemaError::IndexRefsNonExistentColumn {
                index: index_name.to_string(),
                column: source_column_name.to_string(),
            })?;
        let (source_name, source_type, source_length, source_nullable) = {
            let column = self.editor.working().column(source)?;
            (
                column.name().to_string(),
                column.column_type().clone(),
                column.declared_max_length(),
                column.nullable(),
            )
        };

        let id = self
            .context
            .column_id_generator
            .next_id(&format!("{}.{}", data_table_name, source_name));
        let mut builder = ColumnBuilder::new(id, &source_name, data_table_node, source_type);
        builder.set_declared_max_length(source_length);
        builder.set_source_column(source);
        // Declared keys of a null-filtered index are non-nullable regardless
        // of the source column.
        if null_filtered_key_column {
            builder.set_nullable(false);
        } else {
            builder.set_nullable(source_nullable);
        }

        let column = builder.node_id();
        self.editor.add_node(builder.build())?;
        Ok(column)
    }

    /// Builds the hidden data table of an index. Its primary key is the
    /// declared index keys followed by the indexed table's remaining key
    /// columns in their original order. Returns the data table node plus the
    /// index's key columns and stored columns.
    fn create_index_data_table(
        &mut self,
        ddl_index: &CreateIndex,
        index_node: NodeId,
        indexed_table_columns: &[NodeId],
        indexed_table_primary_key: &[NodeId],
    ) -> Result<(crate::graph::SchemaNode, Vec<NodeId>, Vec<NodeId>)> {
        let table_name = format!("{}{}", INDEX_DATA_TABLE_PREFIX, ddl_index.index_name);
        let id = self.context.table_id_generator.next_id(&table_name);
        let mut builder = TableBuilder::new(id, &table_name);
        builder.set_owner_index(index_node);

        let mut data_table_pk: Vec<KeyPart> = ddl_index.key_parts.clone();
        for key_part in &ddl_index.key_parts {
            let column = self.create_index_data_table_column(
                indexed_table_columns,
                &key_part.column_name,
                &table_name,
                builder.node_id(),
                &ddl_index.index_name,
                ddl_index.null_filtered,
            )?;
            builder.add_column(column);
        }

        for &key_column in indexed_table_primary_key {
            let (source_column, descending) = {
                let key_column = self.editor.working().key_column(key_column)?;
                (key_column.column(), key_column.descending())
            };
            let source_name = self.editor.working().column(source_column)?.name().to_string();
            let already_added = self
                .find_column_in(builder.get().columns(), &source_name, false)?
                .is_some();
            if already_added {
                continue;
            }
            let column = self.create_index_data_table_column(
                indexed_table_columns,
                &source_name,
                &table_name,
                builder.node_id(),
                &ddl_index.index_name,
                ddl_index.null_filtered,
            )?;
            builder.add_column(column);
            data_table_pk.push(KeyPart {
                column_name: source_name,
                descending,
            });
        }

        self.create_primary_key_constraint(
            &data_table_pk,
            &mut builder,
            "Index",
            &ddl_index.index_name,
        )?;
        let num_declared_keys = ddl_index.key_parts.len();
        let index_key_columns: Vec<NodeId> =
            builder.get().primary_key()[..num_declared_keys].to_vec();

        if let Some(interleave) = &ddl_index.interleave {
            // Index data tables always cascade with the parent row.
            let interleave = InterleaveClause {
                parent: interleave.parent.clone(),
                on_delete: Some(ast::OnDeleteAction::Cascade),
            };
            self.create_interleave_constraint(
                &interleave,
                &mut builder,
                Some(&ddl_index.index_name),
            )?;
        }

        let mut stored_columns = Vec::with_capacity(ddl_index.storing.len());
        for column_name in &ddl_index.storing {
            let column = self.create_index_data_table_column(
                indexed_table_columns,
                column_name,
                &table_name,
                builder.node_id(),
                &ddl_index.index_name,
                false,
            )?;
            builder.add_column(column);
            stored_columns.push(column);
        }

        Ok((builder.build(), index_key_columns, stored_columns))
    }

    fn create_index(&mut self, ddl_index: &CreateIndex) -> Result<()> {
        let (indexed_node, indexed_columns, indexed_primary_key) =
            match self.latest_schema.find_table(&ddl_index.table_name) {
                Some(table) => (
                    table.node_id(),
                    table.columns().to_vec(),
                    table.primary_key().to_vec(),
                ),
                None => return Err(SchemaError::TableNotFound(ddl_index.table_name.clone())),
            };
        if self.latest_schema.index_count() >= limits::MAX_INDEXES_PER_DATABASE {
            return Err(SchemaError::TooManyIndicesPerDatabase {
                index: ddl_index.index_name.clone(),
                limit: limits::MAX_INDEXES_PER_DATABASE,
            });
        }
        // Tables and indexes share a namespace.
        self.global_names
            .add_name(NameKind::Index, &ddl_index.index_name)?;

        let mut builder =
            IndexBuilder::new(&ddl_index.index_name, ddl_index.unique, ddl_index.null_filtered);
        let index_node = builder.node_id();

        let (data_table, key_columns, stored_columns) = self.create_index_data_table(
            ddl_index,
            index_node,
            &indexed_columns,
            &indexed_primary_key,
        )?;
        builder.set_index_data_table(data_table.node_id());
        for key_column in key_columns {
            builder.add_key_column(key_column);
        }
        for column in stored_columns {
            builder.add_stored_column(column);
        }

        self.editor.edit_node(indexed_node, |_, table: &mut Table| {
            table.add_index(index_node);
            Ok(())
        })?;
        builder.set_indexed_table(indexed_node);

        // The backfill runs after the whole batch is structurally applied.
        self.statement_context
            .add_action(SchemaChangeAction::BackfillIndex { index: index_node });

        // The data table is inserted after the index so validation resolves
        // the owner first.
        self.editor.add_node(builder.build()?)?;
        self.editor.add_node(data_table)
    }

    fn alter_table(&mut self, alter_table: &AlterTable) -> Result<()> {
        let (table_node, table_name, table_columns) =
            match self.latest_schema.find_table(&alter_table.table_name) {
                Some(table) => (
                    table.node_id(),
                    table.name().to_string(),
                    table.columns().to_vec(),
                ),
                None => return Err(SchemaError::TableNotFound(alter_table.table_name.clone())),
            };

        match &alter_table.op {
            AlterTableOp::AddColumn(ddl_column) => {
                let column = self.create_column(ddl_column, &table_name, table_node)?;
                self.editor.edit_node(table_node, |_, table: &mut Table| {
                    table.add_column(column);
                    Ok(())
                })
            }
            AlterTableOp::AlterColumn { column_name, def } => {
                let column = self
                    .find_column_in(&table_columns, column_name, false)?
                    .ok_or_else(|| SchemaError::ColumnNotFound {
                        table: table_name.clone(),
                        column: column_name.clone(),
                    })?;
                let def = def.clone();
                self.editor.edit_node(column, move |_, column: &mut Column| {
                    set_column_definition(&def, column);
                    Ok(())
                })
            }
            AlterTableOp::DropColumn { column_name } => {
                let column = self
                    .find_column_in(&table_columns, column_name, false)?
                    .ok_or_else(|| SchemaError::ColumnNotFound {
                        table: table_name.clone(),
                        column: column_name.clone(),
                    })?;
                self.editor.delete_node(column)
            }
            AlterTableOp::SetOnDelete(action) => {
                let action = translate_on_delete(*action);
                self.editor.edit_node(table_node, move |_, table: &mut Table| {
                    table.set_on_delete(action);
                    Ok(())
                })
            }
            AlterTableOp::AddForeignKey(foreign_key) => self
                .create_foreign_key_constraint(foreign_key, ForeignKeyOwner::Existing(table_node)),
            AlterTableOp::DropConstraint { constraint_name } => {
                let graph = self.latest_schema.graph();
                let foreign_key = graph
                    .table(table_node)?
                    .find_foreign_key(graph, constraint_name)
                    .map(|foreign_key| foreign_key.node_id());
                match foreign_key {
                    Some(foreign_key) => self.editor.delete_node(foreign_key),
                    None => Err(SchemaError::ConstraintNotFound {
                        constraint: constraint_name.clone(),
                        table: table_name,
                    }),
                }
            }
        }
    }

    fn drop_table(&mut self, drop_table: &DropTable) -> Result<()> {
        let table = self
            .latest_schema
            .find_table(&drop_table.table_name)
            .map(|table| table.node_id())
            .ok_or_else(|| SchemaError::TableNotFound(drop_table.table_name.clone()))?;
        self.editor.delete_node(table)
    }

    fn drop_index(&mut self, drop_index: &DropIndex) -> Result<()> {
        let index = self
            .latest_schema
            .find_index(&drop_index.index_name)
            .map(|index| index.node_id())
            .ok_or_else(|| SchemaError::IndexNotFound(drop_index.index_name.clone()))?;
        self.editor.delete_node(index)
    }
}

/// Applies a DDL column definition to a column draft: type, then the
/// defaults, then the declared constraints and options. Shared between the
/// builder (CREATE) and the editor clone (ALTER COLUMN).
fn set_column_definition<M: ColumnDefinitionModifier>(ddl_column: &ColumnDef, modifier: &mut M) {
    modifier.set_column_type(ddl_column.column_type.clone());
    modifier.set_nullable(true);
    modifier.set_declared_max_length(None);
    if ddl_column.not_null {
        modifier.set_nullable(false);
    }
    if let Some(length) = ddl_column.max_length {
        modifier.set_declared_max_length(Some(length));
    }
    // An absent OPTIONS clause leaves the previous options in place.
    if let Some(options) = &ddl_column.options {
        modifier.set_allows_commit_timestamp(options.allow_commit_timestamp);
    }
}

fn translate_on_delete(action: ast::OnDeleteAction) -> OnDeleteAction {
    match action {
        ast::OnDeleteAction::Cascade => OnDeleteAction::Cascade,
        ast::OnDeleteAction::NoAction => OnDeleteAction::NoAction,
    }
}
