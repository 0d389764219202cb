//! CREATE TABLE and CREATE INDEX parsing.

use super::common::{
    parse_column_def, parse_foreign_key_tail, parse_identifier_list, parse_key_parts,
    parse_on_delete_action, Tokens,
};
use crate::ast::{
    CreateIndex, CreateTable, DdlStatement, ForeignKeyClause, InterleaveClause, TableConstraint,
};
use spandb_commons::Result;

pub(crate) fn parse_create(t: &mut Tokens) -> Result<DdlStatement> {
    t.expect_keyword("CREATE")?;
    if t.eat_keyword("TABLE") {
        parse_create_table(t)
    } else {
        parse_create_index(t)
    }
}

fn parse_create_table(t: &mut Tokens) -> Result<DdlStatement> {
    let table_name = t.identifier()?;
    let mut columns = Vec::new();
    let mut constraints = Vec::new();

    t.expect_punct("(")?;
    if !t.eat_punct(")") {
        loop {
            if t.peek_keyword("CONSTRAINT") || t.peek_keyword("FOREIGN") {
                constraints.push(TableConstraint::ForeignKey(parse_table_foreign_key(t)?));
            } else {
                columns.push(parse_column_def(t)?);
            }
            if !t.eat_punct(",") {
                break;
            }
        }
        t.expect_punct(")")?;
    }

    if t.eat_keyword("PRIMARY") {
        t.expect_keyword("KEY")?;
        constraints.push(TableConstraint::PrimaryKey(parse_key_parts(t)?));
    }

    if t.eat_punct(",") {
        t.expect_keyword("INTERLEAVE")?;
        t.expect_keyword("IN")?;
        t.expect_keyword("PARENT")?;
        let parent = t.identifier()?;
        let mut on_delete = None;
        if t.eat_keyword("ON") {
            t.expect_keyword("DELETE")?;
            on_delete = Some(parse_on_delete_action(t)?);
        }
        constraints.push(TableConstraint::Interleave(InterleaveClause {
            parent,
            on_delete,
        }));
    }

    Ok(DdlStatement::CreateTable(CreateTable {
        table_name,
        columns,
        constraints,
    }))
}

fn parse_table_foreign_key(t: &mut Tokens) -> Result<ForeignKeyClause> {
    let constraint_name = if t.eat_keyword("CONSTRAINT") {
        Some(t.identifier()?)
    } else {
        None
    };
    t.expect_keyword("FOREIGN")?;
    t.expect_keyword("KEY")?;
    parse_foreign_key_tail(t, constraint_name)
}

fn parse_create_index(t: &mut Tokens) -> Result<DdlStatement> {
    let mut unique = false;
    let mut null_filtered = false;
    loop {
        if t.eat_keyword("UNIQUE") {
            unique = true;
        } else if t.eat_keyword("NULL_FILTERED") {
            null_filtered = true;
        } else {
            break;
        }
    }
    t.expect_keyword("INDEX")?;
    let index_name = t.identifier()?;
    t.expect_keyword("ON")?;
    let table_name = t.identifier()?;
    let key_parts = parse_key_parts(t)?;

    let mut storing = Vec::new();
    if t.eat_keyword("STORING") {
        storing = parse_identifier_list(t)?;
    }

    let mut interleave = None;
    if t.eat_punct(",") {
        t.expect_keyword("INTERLEAVE")?;
        t.expect_keyword("IN")?;
        let parent = t.identifier()?;
        interleave = Some(InterleaveClause {
            parent,
            on_delete: None,
        });
    }

    Ok(DdlStatement::CreateIndex(CreateIndex {
        index_name,
        table_name,
        unique,
        null_filtered,
        key_parts,
        storing,
        interleave,
    }))
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::parse_ddl_statement;
    use spandb_commons::ScalarType;

    #[test]
    fn test_parse_create_table() {
        let stmt =
            parse_ddl_statement("CREATE TABLE T (A INT64, B STRING(MAX)) PRIMARY KEY (A)").unwrap();
        let DdlStatement::CreateTable(create) = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(create.table_name, "T");
        assert_eq!(create.columns.len(), 2);
        assert_eq!(create.columns[0].column_name, "A");
        assert_eq!(create.columns[0].column_type, ScalarType::Int64);
        assert_eq!(create.columns[1].column_name, "B");
        assert_eq!(create.columns[1].max_length, None);
        assert_eq!(
            create.constraints,
            vec![TableConstraint::PrimaryKey(vec![KeyPart {
                column_name: "A".to_string(),
                descending: false,
            }])]
        );
    }

    #[test]
    fn test_parse_create_table_desc_key() {
        let stmt =
            parse_ddl_statement("CREATE TABLE T (A INT64, B INT64) PRIMARY KEY (A, B DESC)")
                .unwrap();
        let DdlStatement::CreateTable(create) = stmt else {
            panic!("expected CreateTable");
        };
        let TableConstraint::PrimaryKey(parts) = &create.constraints[0] else {
            panic!("expected primary key constraint");
        };
        assert!(!parts[0].descending);
        assert!(parts[1].descending);
    }

    #[test]
    fn test_parse_create_table_interleave() {
        let stmt = parse_ddl_statement(
            "CREATE TABLE C (K INT64, V INT64) PRIMARY KEY (K), \
             INTERLEAVE IN PARENT P ON DELETE CASCADE",
        )
        .unwrap();
        let DdlStatement::CreateTable(create) = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(
            create.constraints[1],
            TableConstraint::Interleave(InterleaveClause {
                parent: "P".to_string(),
                on_delete: Some(OnDeleteAction::Cascade),
            })
        );
    }

    #[test]
    fn test_parse_create_table_interleave_default_action() {
        let stmt = parse_ddl_statement(
            "CREATE TABLE C (K INT64) PRIMARY KEY (K), INTERLEAVE IN PARENT P",
        )
        .unwrap();
        let DdlStatement::CreateTable(create) = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(
            create.constraints[1],
            TableConstraint::Interleave(InterleaveClause {
                parent: "P".to_string(),
                on_delete: None,
            })
        );
    }

    #[test]
    fn test_parse_create_table_foreign_key() {
        let stmt = parse_ddl_statement(
            "CREATE TABLE T (A INT64, CONSTRAINT FK_A FOREIGN KEY (A) REFERENCES U (B)) \
             PRIMARY KEY (A)",
        )
        .unwrap();
        let DdlStatement::CreateTable(create) = stmt else {
            panic!("expected CreateTable");
        };
        assert_eq!(create.columns.len(), 1);
        assert_eq!(
            create.constraints[0],
            TableConstraint::ForeignKey(ForeignKeyClause {
                constraint_name: Some("FK_A".to_string()),
                referencing_columns: vec!["A".to_string()],
                referenced_table: "U".to_string(),
                referenced_columns: vec!["B".to_string()],
            })
        );
    }

    #[test]
    fn test_parse_create_table_unnamed_foreign_key() {
        let stmt = parse_ddl_statement(
            "CREATE TABLE T (A INT64, FOREIGN KEY (A) REFERENCES U (B)) PRIMARY KEY (A)",
        )
        .unwrap();
        let DdlStatement::CreateTable(create) = stmt else {
            panic!("expected CreateTable");
        };
        let TableConstraint::ForeignKey(fk) = &create.constraints[0] else {
            panic!("expected foreign key constraint");
        };
        assert_eq!(fk.constraint_name, None);
    }

    #[test]
    fn test_parse_create_table_missing_primary_key_clause() {
        // Grammatically tolerated; the updater rejects key-less tables.
        let stmt = parse_ddl_statement("CREATE TABLE T (A INT64)").unwrap();
        let DdlStatement::CreateTable(create) = stmt else {
            panic!("expected CreateTable");
        };
        assert!(create.constraints.is_empty());
    }

    #[test]
    fn test_parse_create_index() {
        let stmt = parse_ddl_statement("CREATE UNIQUE NULL_FILTERED INDEX I ON T (B)").unwrap();
        let DdlStatement::CreateIndex(index) = stmt else {
            panic!("expected CreateIndex");
        };
        assert_eq!(index.index_name, "I");
        assert_eq!(index.table_name, "T");
        assert!(index.unique);
        assert!(index.null_filtered);
        assert_eq!(index.key_parts.len(), 1);
        assert!(index.storing.is_empty());
        assert_eq!(index.interleave, None);
    }

    #[test]
    fn test_parse_create_index_storing_and_interleave() {
        let stmt =
            parse_ddl_statement("CREATE INDEX I ON C (V DESC) STORING (W, X), INTERLEAVE IN P")
                .unwrap();
        let DdlStatement::CreateIndex(index) = stmt else {
            panic!("expected CreateIndex");
        };
        assert!(!index.unique);
        assert!(index.key_parts[0].descending);
        assert_eq!(index.storing, vec!["W".to_string(), "X".to_string()]);
        assert_eq!(
            index.interleave,
            Some(InterleaveClause {
                parent: "P".to_string(),
                on_delete: None,
            })
        );
    }

    #[test]
    fn test_parse_create_rejects_bad_identifier() {
        assert!(parse_ddl_statement("CREATE TABLE 1T (A INT64) PRIMARY KEY (A)").is_err());
    }
}
