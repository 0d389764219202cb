//! Integration tests for the schema update engine.
//!
//! Drives `SchemaUpdater` through literal DDL batches and checks the
//! resulting snapshots, error propagation, and backfill side effects.

use spandb_commons::{ScalarType, SchemaError, Value};
use spandb_schema::test_helpers::{change_context, MemoryStorage};
use spandb_schema::{
    Column, OnDeleteAction, Schema, SchemaChangeContext, SchemaChangeResult, SchemaNode,
    SchemaUpdater,
};
use std::sync::Arc;

fn apply_batch(
    existing: Arc<Schema>,
    statements: &[&str],
    context: &SchemaChangeContext,
) -> spandb_commons::Result<SchemaChangeResult> {
    let statements: Vec<String> = statements.iter().map(|s| s.to_string()).collect();
    SchemaUpdater::new().update_schema_from_ddl(existing, &statements, context)
}

/// Applies a batch that is expected to fully succeed, including actions.
fn apply_ok(
    existing: Arc<Schema>,
    statements: &[&str],
    context: &SchemaChangeContext,
) -> Arc<Schema> {
    let result = apply_batch(existing, statements, context).expect("batch failed structurally");
    result.backfill_status.expect("backfill failed");
    assert_eq!(result.num_successful_statements, statements.len());
    result.updated_schema.expect("no schema produced")
}

fn get_column<'a>(schema: &'a Schema, table: &str, column: &str) -> &'a Column {
    let table = schema.find_table(table).expect("table not found");
    table
        .find_column(schema.graph(), column)
        .expect("column not found")
}

// --- End-to-end scenarios ---

#[test]
fn test_simple_table() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64, B STRING(MAX)) PRIMARY KEY (A)"],
        &context,
    );

    let table = schema.find_table("T").expect("table T not found");
    assert_eq!(table.name(), "T");
    assert_eq!(table.columns().len(), 2);

    let a = get_column(&schema, "T", "A");
    assert_eq!(a.column_type(), &ScalarType::Int64);
    assert!(a.nullable());

    let b = get_column(&schema, "T", "B");
    assert_eq!(b.column_type(), &ScalarType::String);
    assert!(b.nullable());
    assert_eq!(b.declared_max_length(), None);

    let graph = schema.graph();
    assert_eq!(table.primary_key().len(), 1);
    let key = graph.key_column(table.primary_key()[0]).unwrap();
    assert!(!key.descending());
    assert_eq!(graph.column(key.column()).unwrap().name(), "A");
}

#[test]
fn test_interleave_child() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE P (K INT64) PRIMARY KEY (K)",
            "CREATE TABLE C (K INT64, V INT64) PRIMARY KEY (K), \
             INTERLEAVE IN PARENT P ON DELETE CASCADE",
        ],
        &context,
    );

    let parent = schema.find_table("P").unwrap();
    let child = schema.find_table("C").unwrap();
    assert_eq!(parent.child_tables(), &[child.node_id()]);
    assert_eq!(child.parent_table(), Some(parent.node_id()));
    assert_eq!(child.on_delete(), OnDeleteAction::Cascade);
}

#[test]
fn test_null_filtered_unique_index() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let base = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64, B STRING(MAX)) PRIMARY KEY (A)"],
        &context,
    );
    let schema = apply_ok(base, &["CREATE UNIQUE NULL_FILTERED INDEX I ON T (B)"], &context);

    let graph = schema.graph();
    let index = schema.find_index("I").expect("index I not found");
    assert!(index.unique());
    assert!(index.null_filtered());
    assert_eq!(index.indexed_table(), schema.find_table("T").unwrap().node_id());

    let data_table = graph.table(index.index_data_table()).unwrap();
    assert_eq!(data_table.name(), "_IDX_I");
    assert_eq!(data_table.owner_index(), Some(index.node_id()));
    assert!(schema.find_table("_IDX_I").is_none());

    // Columns: B (non-nullable from null filtering), then A (as in T).
    let columns: Vec<_> = data_table
        .columns()
        .iter()
        .map(|&id| graph.column(id).unwrap())
        .collect();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name(), "B");
    assert!(!columns[0].nullable());
    assert_eq!(columns[1].name(), "A");
    assert!(columns[1].nullable());

    // Primary key of the data table is (B, A).
    let pk_names: Vec<String> = data_table
        .primary_key()
        .iter()
        .map(|&id| {
            let key = graph.key_column(id).unwrap();
            graph.column(key.column()).unwrap().name().to_string()
        })
        .collect();
    assert_eq!(pk_names, vec!["B", "A"]);

    // The index's key columns are the first N of the data table's key.
    assert_eq!(index.key_columns(), &data_table.primary_key()[..1]);
}

#[test]
fn test_duplicate_name_in_shared_namespace() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let result = apply_batch(
        Schema::empty(),
        &[
            "CREATE TABLE X (K INT64) PRIMARY KEY (K)",
            "CREATE INDEX X ON X (K)",
        ],
        &context,
    );
    assert!(matches!(result, Err(SchemaError::DuplicateSchemaName(name)) if name == "X"));

    // Applied one at a time, only the first statement takes effect.
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE X (K INT64) PRIMARY KEY (K)"],
        &context,
    );
    let result = apply_batch(schema.clone(), &["CREATE INDEX X ON X (K)"], &context);
    assert!(matches!(result, Err(SchemaError::DuplicateSchemaName(_))));
    assert!(schema.find_table("X").is_some());
    assert_eq!(schema.index_count(), 0);
}

#[test]
fn test_drop_table_with_child_fails() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE P (K INT64) PRIMARY KEY (K)",
            "CREATE TABLE C (K INT64, V INT64) PRIMARY KEY (K), \
             INTERLEAVE IN PARENT P ON DELETE CASCADE",
        ],
        &context,
    );

    let result = apply_batch(schema.clone(), &["DROP TABLE P"], &context);
    assert!(matches!(result, Err(SchemaError::CannotDrop { .. })));
    // The caller's snapshot is untouched.
    assert!(schema.find_table("P").is_some());
    assert!(schema.find_table("C").is_some());

    // Dropping the referrer first makes the drop legal.
    let schema = apply_ok(schema, &["DROP TABLE C", "DROP TABLE P"], &context);
    assert_eq!(schema.table_count(), 0);
}

#[test]
fn test_partial_success_on_backfill() {
    let storage = Arc::new(MemoryStorage::new());
    let context = change_context(storage.clone());
    storage.set_fail_reads(true);

    let result = apply_batch(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64, B STRING(MAX)) PRIMARY KEY (A)",
            "CREATE INDEX I ON T (B)",
        ],
        &context,
    )
    .expect("structural apply should succeed");

    assert_eq!(result.num_successful_statements, 1);
    assert!(matches!(
        result.backfill_status,
        Err(SchemaError::Backfill { .. })
    ));
    let schema = result.updated_schema.expect("first statement is effective");
    assert!(schema.find_table("T").is_some());
    assert!(schema.find_index("I").is_none());
}

// --- Universal properties ---

#[test]
fn test_empty_batch_changes_nothing() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64) PRIMARY KEY (A)"],
        &context,
    );

    let result = apply_batch(schema.clone(), &[], &context).unwrap();
    assert_eq!(result.num_successful_statements, 0);
    assert!(result.updated_schema.is_none());
    assert!(result.backfill_status.is_ok());
    assert!(schema.find_table("T").is_some());
}

#[test]
fn test_failing_statement_leaves_snapshot_unchanged() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64) PRIMARY KEY (A)"],
        &context,
    );

    let result = apply_batch(
        schema.clone(),
        &[
            "CREATE TABLE U (A INT64) PRIMARY KEY (A)",
            "CREATE TABLE V (A INT64) PRIMARY KEY (Missing)",
        ],
        &context,
    );
    assert!(matches!(result, Err(SchemaError::NonExistentKeyColumn { .. })));
    assert_eq!(schema.table_count(), 1);
    assert!(schema.find_table("U").is_none());
}

/// Structural description of a snapshot, independent of node ids.
fn summarize(schema: &Schema) -> Vec<String> {
    let graph = schema.graph();
    let mut summary = Vec::new();
    for node in graph.nodes_in_order() {
        match node {
            SchemaNode::Table(table) => {
                let columns: Vec<String> = table
                    .columns()
                    .iter()
                    .map(|&id| {
                        let c = graph.column(id).unwrap();
                        format!(
                            "{}:{}:{}:{:?}",
                            c.name(),
                            c.column_type(),
                            c.nullable(),
                            c.declared_max_length()
                        )
                    })
                    .collect();
                let keys: Vec<String> = table
                    .primary_key()
                    .iter()
                    .map(|&id| {
                        let k = graph.key_column(id).unwrap();
                        let c = graph.column(k.column()).unwrap();
                        format!("{}:{}", c.name(), k.descending())
                    })
                    .collect();
                let parent = table
                    .parent_table()
                    .map(|id| graph.table(id).unwrap().name().to_string());
                summary.push(format!(
                    "table {} columns=[{}] key=[{}] parent={:?} on_delete={}",
                    table.name(),
                    columns.join(","),
                    keys.join(","),
                    parent,
                    table.on_delete()
                ));
            }
            SchemaNode::Index(index) => {
                let data_table = graph.table(index.index_data_table()).unwrap();
                summary.push(format!(
                    "index {} unique={} null_filtered={} data_table={}",
                    index.name(),
                    index.unique(),
                    index.null_filtered(),
                    data_table.name()
                ));
            }
            _ => {}
        }
    }
    summary
}

#[test]
fn test_batch_composition_is_associative() {
    let statements = [
        "CREATE TABLE P (K INT64, W STRING(64)) PRIMARY KEY (K)",
        "CREATE TABLE C (K INT64, V INT64) PRIMARY KEY (K, V DESC), \
         INTERLEAVE IN PARENT P ON DELETE NO ACTION",
        "CREATE INDEX ByV ON C (V)",
    ];

    let context = change_context(Arc::new(MemoryStorage::new()));
    let all_at_once = apply_ok(Schema::empty(), &statements, &context);

    let context = change_context(Arc::new(MemoryStorage::new()));
    let first_two = apply_ok(Schema::empty(), &statements[..2], &context);
    let split = apply_ok(first_two, &statements[2..], &context);

    assert_eq!(summarize(&all_at_once), summarize(&split));
}

#[test]
fn test_drop_index_then_table() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64, B STRING(MAX)) PRIMARY KEY (A)",
            "CREATE INDEX I ON T (B)",
        ],
        &context,
    );

    let result = apply_batch(schema.clone(), &["DROP TABLE T"], &context);
    assert!(matches!(result, Err(SchemaError::CannotDrop { .. })));

    let schema = apply_ok(schema, &["DROP INDEX I", "DROP TABLE T"], &context);
    assert_eq!(schema.table_count(), 0);
    assert_eq!(schema.index_count(), 0);
    assert!(schema.graph().is_empty());
}

#[test]
fn test_index_key_columns_prefix_composite_key() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64, B INT64, C INT64) PRIMARY KEY (A, B)",
            "CREATE INDEX ByC ON T (C DESC)",
        ],
        &context,
    );

    let graph = schema.graph();
    let index = schema.find_index("ByC").unwrap();
    let data_table = graph.table(index.index_data_table()).unwrap();

    let pk: Vec<(String, bool)> = data_table
        .primary_key()
        .iter()
        .map(|&id| {
            let key = graph.key_column(id).unwrap();
            let column = graph.column(key.column()).unwrap();
            (column.name().to_string(), key.descending())
        })
        .collect();
    assert_eq!(
        pk,
        vec![
            ("C".to_string(), true),
            ("A".to_string(), false),
            ("B".to_string(), false)
        ]
    );
    assert_eq!(index.key_columns(), &data_table.primary_key()[..1]);
}

// --- Backfill behavior ---

#[test]
fn test_index_backfill_populates_data_table() {
    let storage = Arc::new(MemoryStorage::new());
    let context = change_context(storage.clone());
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE Users (Id INT64, Name STRING(MAX)) PRIMARY KEY (Id)"],
        &context,
    );

    let users = schema.find_table("Users").unwrap();
    let users_id = users.id().clone();
    let id_column = get_column(&schema, "Users", "Id").id().clone();
    let name_column = get_column(&schema, "Users", "Name").id().clone();
    storage.insert_row(
        &users_id,
        vec![Value::Int64(1)],
        vec![
            (id_column.clone(), Value::Int64(1)),
            (name_column.clone(), Value::String("alice".into())),
        ],
    );
    storage.insert_row(
        &users_id,
        vec![Value::Int64(2)],
        vec![
            (id_column.clone(), Value::Int64(2)),
            (name_column.clone(), Value::String("bob".into())),
        ],
    );
    storage.insert_row(
        &users_id,
        vec![Value::Int64(3)],
        vec![(id_column.clone(), Value::Int64(3)), (name_column.clone(), Value::Null)],
    );

    let schema = apply_ok(
        schema,
        &["CREATE NULL_FILTERED INDEX ByName ON Users (Name)"],
        &context,
    );

    let graph = schema.graph();
    let index = schema.find_index("ByName").unwrap();
    let data_table = graph.table(index.index_data_table()).unwrap();

    // The null-named row is filtered out; keys are (Name, Id).
    let rows = storage.rows(data_table.id());
    let keys: Vec<Vec<Value>> = rows.iter().map(|(key, _)| key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            vec![Value::String("alice".into()), Value::Int64(1)],
            vec![Value::String("bob".into()), Value::Int64(2)],
        ]
    );
}

#[test]
fn test_unique_index_backfill_violation() {
    let storage = Arc::new(MemoryStorage::new());
    let context = change_context(storage.clone());
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE Users (Id INT64, Name STRING(MAX)) PRIMARY KEY (Id)"],
        &context,
    );

    let users_id = schema.find_table("Users").unwrap().id().clone();
    let id_column = get_column(&schema, "Users", "Id").id().clone();
    let name_column = get_column(&schema, "Users", "Name").id().clone();
    for key in [1, 2] {
        storage.insert_row(
            &users_id,
            vec![Value::Int64(key)],
            vec![
                (id_column.clone(), Value::Int64(key)),
                (name_column.clone(), Value::String("dup".into())),
            ],
        );
    }

    let result = apply_batch(
        schema.clone(),
        &["CREATE UNIQUE INDEX ByName ON Users (Name)"],
        &context,
    )
    .expect("structural apply should succeed");
    assert_eq!(result.num_successful_statements, 0);
    assert!(result.updated_schema.is_none());
    assert!(matches!(
        result.backfill_status,
        Err(SchemaError::UniqueIndexViolation { .. })
    ));
}

#[test]
fn test_validate_schema_from_ddl_skips_actions() {
    let storage = Arc::new(MemoryStorage::new());
    let context = change_context(storage.clone());
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE Users (Id INT64, Name STRING(MAX)) PRIMARY KEY (Id)"],
        &context,
    );
    let users_id = schema.find_table("Users").unwrap().id().clone();
    let id_column = get_column(&schema, "Users", "Id").id().clone();
    storage.insert_row(
        &users_id,
        vec![Value::Int64(1)],
        vec![(id_column, Value::Int64(1))],
    );

    let validated = SchemaUpdater::new()
        .validate_schema_from_ddl(
            &["CREATE INDEX ByName ON Users (Name)".to_string()],
            &context,
            Some(schema),
        )
        .unwrap()
        .expect("validated schema");

    let index = validated.find_index("ByName").unwrap();
    let data_table = validated.graph().table(index.index_data_table()).unwrap();
    // No backfill ran.
    assert_eq!(storage.row_count(data_table.id()), 0);
}

// --- ALTER TABLE ---

#[test]
fn test_add_and_drop_column() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64) PRIMARY KEY (A)",
            "ALTER TABLE T ADD COLUMN B STRING(10) NOT NULL",
        ],
        &context,
    );
    let b = get_column(&schema, "T", "B");
    assert_eq!(b.column_type(), &ScalarType::String);
    assert!(!b.nullable());
    assert_eq!(b.declared_max_length(), Some(10));

    let schema = apply_ok(schema, &["ALTER TABLE T DROP COLUMN B"], &context);
    let table = schema.find_table("T").unwrap();
    assert_eq!(table.columns().len(), 1);
    assert!(table.find_column(schema.graph(), "B").is_none());
}

#[test]
fn test_alter_column_redefinition() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64, B STRING(50) NOT NULL) PRIMARY KEY (A)"],
        &context,
    );

    let schema = apply_ok(schema, &["ALTER TABLE T ALTER COLUMN B STRING(MAX)"], &context);
    let b = get_column(&schema, "T", "B");
    assert_eq!(b.declared_max_length(), None);
    // The redefinition did not carry NOT NULL, so the column is nullable.
    assert!(b.nullable());
}

#[test]
fn test_alter_column_type_change_rejected() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64, B STRING(50)) PRIMARY KEY (A)"],
        &context,
    );

    let result = apply_batch(schema.clone(), &["ALTER TABLE T ALTER COLUMN B INT64"], &context);
    assert!(matches!(
        result,
        Err(SchemaError::CannotChangeColumnType { .. })
    ));

    // STRING to BYTES is a legal redeclaration.
    let schema = apply_ok(schema, &["ALTER TABLE T ALTER COLUMN B BYTES(50)"], &context);
    assert_eq!(
        get_column(&schema, "T", "B").column_type(),
        &ScalarType::Bytes
    );
}

#[test]
fn test_drop_key_column_rejected() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64, B INT64) PRIMARY KEY (A)"],
        &context,
    );
    let result = apply_batch(schema, &["ALTER TABLE T DROP COLUMN A"], &context);
    assert!(matches!(result, Err(SchemaError::CannotDrop { .. })));
}

#[test]
fn test_drop_column_used_by_index_rejected() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64, B STRING(MAX)) PRIMARY KEY (A)",
            "CREATE INDEX I ON T (B)",
        ],
        &context,
    );
    let result = apply_batch(schema, &["ALTER TABLE T DROP COLUMN B"], &context);
    assert!(matches!(result, Err(SchemaError::CannotDrop { .. })));
}

#[test]
fn test_set_on_delete() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE P (K INT64) PRIMARY KEY (K)",
            "CREATE TABLE C (K INT64) PRIMARY KEY (K), INTERLEAVE IN PARENT P",
        ],
        &context,
    );
    assert_eq!(
        schema.find_table("C").unwrap().on_delete(),
        OnDeleteAction::NoAction
    );

    let schema = apply_ok(schema, &["ALTER TABLE C SET ON DELETE CASCADE"], &context);
    let child = schema.find_table("C").unwrap();
    assert_eq!(child.on_delete(), OnDeleteAction::Cascade);
    // The interleave itself is untouched.
    assert_eq!(
        child.parent_table(),
        Some(schema.find_table("P").unwrap().node_id())
    );
}

// --- Foreign keys ---

#[test]
fn test_foreign_key_wiring() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE U (B INT64) PRIMARY KEY (B)",
            "CREATE TABLE T (A INT64, CONSTRAINT FK_T_U FOREIGN KEY (A) REFERENCES U (B)) \
             PRIMARY KEY (A)",
        ],
        &context,
    );

    let graph = schema.graph();
    let referencing = schema.find_table("T").unwrap();
    let referenced = schema.find_table("U").unwrap();
    assert_eq!(referencing.foreign_keys().len(), 1);
    assert_eq!(referenced.referencing_foreign_keys().len(), 1);

    let fk = graph.foreign_key(referencing.foreign_keys()[0]).unwrap();
    assert_eq!(fk.name(), "FK_T_U");
    assert_eq!(fk.constraint_name(), Some("FK_T_U"));
    assert_eq!(fk.referencing_table(), referencing.node_id());
    assert_eq!(fk.referenced_table(), referenced.node_id());
    assert_eq!(fk.referencing_columns().len(), 1);
    assert_eq!(graph.column(fk.referencing_columns()[0]).unwrap().name(), "A");
    assert_eq!(graph.column(fk.referenced_columns()[0]).unwrap().name(), "B");
}

#[test]
fn test_foreign_key_generated_name() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE U (B INT64) PRIMARY KEY (B)",
            "CREATE TABLE T (A INT64) PRIMARY KEY (A)",
            "ALTER TABLE T ADD FOREIGN KEY (A) REFERENCES U (B)",
        ],
        &context,
    );

    let graph = schema.graph();
    let table = schema.find_table("T").unwrap();
    let fk = graph.foreign_key(table.foreign_keys()[0]).unwrap();
    assert_eq!(fk.name(), "FK_T_U_1");
    assert_eq!(fk.constraint_name(), None);
    assert_eq!(fk.generated_name(), Some("FK_T_U_1"));
}

#[test]
fn test_foreign_key_self_reference() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64, B INT64, \
             CONSTRAINT FK_Self FOREIGN KEY (B) REFERENCES T (A)) PRIMARY KEY (A)",
        ],
        &context,
    );

    let graph = schema.graph();
    let table = schema.find_table("T").unwrap();
    let fk = graph.foreign_key(table.foreign_keys()[0]).unwrap();
    assert_eq!(fk.referencing_table(), table.node_id());
    assert_eq!(fk.referenced_table(), table.node_id());
    assert_eq!(table.referencing_foreign_keys(), table.foreign_keys());
}

#[test]
fn test_foreign_key_column_not_found() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE U (B INT64) PRIMARY KEY (B)",
            "CREATE TABLE T (A INT64) PRIMARY KEY (A)",
        ],
        &context,
    );

    // Column references are case-sensitive, so `a` does not resolve.
    let result = apply_batch(
        schema,
        &["ALTER TABLE T ADD FOREIGN KEY (a) REFERENCES U (B)"],
        &context,
    );
    assert!(matches!(
        result,
        Err(SchemaError::ForeignKeyColumnNotFound { column, .. }) if column == "a"
    ));
}

#[test]
fn test_drop_constraint() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE U (B INT64) PRIMARY KEY (B)",
            "CREATE TABLE T (A INT64, CONSTRAINT FK FOREIGN KEY (A) REFERENCES U (B)) \
             PRIMARY KEY (A)",
        ],
        &context,
    );

    let result = apply_batch(schema.clone(), &["ALTER TABLE T DROP CONSTRAINT Nope"], &context);
    assert!(matches!(result, Err(SchemaError::ConstraintNotFound { .. })));

    let schema = apply_ok(schema, &["ALTER TABLE T DROP CONSTRAINT FK"], &context);
    assert!(schema.find_table("T").unwrap().foreign_keys().is_empty());
    assert!(schema
        .find_table("U")
        .unwrap()
        .referencing_foreign_keys()
        .is_empty());
}

#[test]
fn test_foreign_key_column_count_mismatch() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE U (B INT64, C INT64) PRIMARY KEY (B)",
            "CREATE TABLE T (A INT64) PRIMARY KEY (A)",
        ],
        &context,
    );
    let result = apply_batch(
        schema,
        &["ALTER TABLE T ADD FOREIGN KEY (A) REFERENCES U (B, C)"],
        &context,
    );
    assert!(matches!(
        result,
        Err(SchemaError::ForeignKeyColumnCount { .. })
    ));
}

#[test]
fn test_foreign_key_column_type_mismatch() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE U (B STRING(MAX)) PRIMARY KEY (B)",
            "CREATE TABLE T (A INT64) PRIMARY KEY (A)",
        ],
        &context,
    );
    let result = apply_batch(
        schema,
        &["ALTER TABLE T ADD FOREIGN KEY (A) REFERENCES U (B)"],
        &context,
    );
    assert!(matches!(
        result,
        Err(SchemaError::ForeignKeyColumnTypeMismatch { .. })
    ));
}

#[test]
fn test_drop_referenced_table_rejected() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE U (B INT64) PRIMARY KEY (B)",
            "CREATE TABLE T (A INT64, CONSTRAINT FK FOREIGN KEY (A) REFERENCES U (B)) \
             PRIMARY KEY (A)",
        ],
        &context,
    );

    let result = apply_batch(schema.clone(), &["DROP TABLE U"], &context);
    assert!(matches!(result, Err(SchemaError::CannotDrop { .. })));

    // Dropping the referencing table takes its foreign key along.
    let schema = apply_ok(schema, &["DROP TABLE T", "DROP TABLE U"], &context);
    assert!(schema.graph().is_empty());
}

// --- Lookup rules and errors ---

#[test]
fn test_table_lookups_are_case_insensitive() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE Users (Id INT64) PRIMARY KEY (Id)"],
        &context,
    );
    let schema = apply_ok(
        schema,
        &["ALTER TABLE users ADD COLUMN Age INT64", "DROP TABLE USERS"],
        &context,
    );
    assert_eq!(schema.table_count(), 0);
}

#[test]
fn test_primary_key_reference_is_case_sensitive() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let result = apply_batch(
        Schema::empty(),
        &["CREATE TABLE T (A INT64) PRIMARY KEY (a)"],
        &context,
    );
    assert!(matches!(
        result,
        Err(SchemaError::NonExistentKeyColumn { column, .. }) if column == "a"
    ));
}

#[test]
fn test_empty_statement_rejected() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let result = apply_batch(Schema::empty(), &["   "], &context);
    assert!(matches!(result, Err(SchemaError::EmptyDdlStatement)));
}

#[test]
fn test_create_table_without_primary_key_rejected() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let result = apply_batch(Schema::empty(), &["CREATE TABLE T (A INT64)"], &context);
    assert!(matches!(result, Err(SchemaError::MissingPrimaryKey(_))));
}

#[test]
fn test_not_found_errors() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64) PRIMARY KEY (A)"],
        &context,
    );

    let result = apply_batch(schema.clone(), &["DROP TABLE Missing"], &context);
    assert!(matches!(result, Err(SchemaError::TableNotFound(_))));

    let result = apply_batch(schema.clone(), &["DROP INDEX Missing"], &context);
    assert!(matches!(result, Err(SchemaError::IndexNotFound(_))));

    let result = apply_batch(schema.clone(), &["CREATE INDEX I ON Missing (A)"], &context);
    assert!(matches!(result, Err(SchemaError::TableNotFound(_))));

    let result = apply_batch(schema.clone(), &["ALTER TABLE T DROP COLUMN Missing"], &context);
    assert!(matches!(result, Err(SchemaError::ColumnNotFound { .. })));

    let result = apply_batch(schema, &["CREATE INDEX I ON T (Missing)"], &context);
    assert!(matches!(
        result,
        Err(SchemaError::IndexRefsNonExistentColumn { .. })
    ));
}

#[test]
fn test_index_interleave_table_not_found() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &["CREATE TABLE T (A INT64, B INT64) PRIMARY KEY (A)"],
        &context,
    );
    let result = apply_batch(
        schema,
        &["CREATE INDEX I ON T (B), INTERLEAVE IN Missing"],
        &context,
    );
    assert!(matches!(
        result,
        Err(SchemaError::IndexInterleaveTableNotFound { index, table })
            if index == "I" && table == "Missing"
    ));
}

#[test]
fn test_index_interleaved_in_parent() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE P (K INT64) PRIMARY KEY (K)",
            "CREATE TABLE C (K INT64, V INT64) PRIMARY KEY (K), INTERLEAVE IN PARENT P",
            "CREATE INDEX ByV ON C (K, V), INTERLEAVE IN P",
        ],
        &context,
    );

    let graph = schema.graph();
    let parent = schema.find_table("P").unwrap();
    let index = schema.find_index("ByV").unwrap();
    let data_table = graph.table(index.index_data_table()).unwrap();
    assert_eq!(data_table.parent_table(), Some(parent.node_id()));
    assert!(parent.child_tables().contains(&data_table.node_id()));
    // Index data tables always cascade, regardless of the DDL.
    assert_eq!(data_table.on_delete(), OnDeleteAction::Cascade);
}

#[test]
fn test_index_storing_columns() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64, B INT64, C STRING(16) NOT NULL) PRIMARY KEY (A)",
            "CREATE INDEX ByB ON T (B) STORING (C)",
        ],
        &context,
    );

    let graph = schema.graph();
    let index = schema.find_index("ByB").unwrap();
    assert_eq!(index.stored_columns().len(), 1);
    let stored = graph.column(index.stored_columns()[0]).unwrap();
    assert_eq!(stored.name(), "C");
    // Stored columns keep the source column's nullability and length.
    assert!(!stored.nullable());
    assert_eq!(stored.declared_max_length(), Some(16));

    let data_table = graph.table(index.index_data_table()).unwrap();
    let names: Vec<&str> = data_table
        .columns()
        .iter()
        .map(|&id| graph.column(id).unwrap().name())
        .collect();
    assert_eq!(names, vec!["B", "A", "C"]);
}

#[test]
fn test_commit_timestamp_option() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = apply_ok(
        Schema::empty(),
        &[
            "CREATE TABLE T (A INT64, \
             At TIMESTAMP OPTIONS (allow_commit_timestamp = true)) PRIMARY KEY (A)",
        ],
        &context,
    );
    assert_eq!(
        get_column(&schema, "T", "At").allows_commit_timestamp(),
        Some(true)
    );

    // A redefinition without OPTIONS leaves the option alone.
    let schema = apply_ok(schema, &["ALTER TABLE T ALTER COLUMN At TIMESTAMP"], &context);
    assert_eq!(
        get_column(&schema, "T", "At").allows_commit_timestamp(),
        Some(true)
    );

    // Setting it to null clears it.
    let schema = apply_ok(
        schema,
        &["ALTER TABLE T ALTER COLUMN At TIMESTAMP OPTIONS (allow_commit_timestamp = null)"],
        &context,
    );
    assert_eq!(
        get_column(&schema, "T", "At").allows_commit_timestamp(),
        None
    );
}

#[test]
fn test_commit_timestamp_rejected_on_non_timestamp_column() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let result = apply_batch(
        Schema::empty(),
        &["CREATE TABLE T (A INT64 OPTIONS (allow_commit_timestamp = true)) PRIMARY KEY (A)"],
        &context,
    );
    assert!(matches!(
        result,
        Err(SchemaError::InvalidCommitTimestampOption { .. })
    ));
}

#[test]
fn test_create_schema_from_ddl() {
    let context = change_context(Arc::new(MemoryStorage::new()));
    let schema = SchemaUpdater::new()
        .create_schema_from_ddl(
            &[
                "CREATE TABLE T (A INT64, B STRING(MAX)) PRIMARY KEY (A)".to_string(),
                "CREATE INDEX I ON T (B)".to_string(),
            ],
            &context,
        )
        .unwrap();
    assert!(schema.find_table("T").is_some());
    assert!(schema.find_index("I").is_some());

    let empty = SchemaUpdater::new()
        .create_schema_from_ddl(&[], &context)
        .unwrap();
    assert_eq!(empty.table_count(), 0);
}
